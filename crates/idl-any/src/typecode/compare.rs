// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Structural equality and equivalence over possibly cyclic TypeCode graphs.
//!
//! Both relations are co-inductive: a pair of nodes already under
//! comparison is assumed equal when reached again. Every check is a
//! conjunction, so a pair that is assumed equal and later found different
//! still makes the whole comparison fail.

use super::{Named, Node, TypeCode};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Names, ids and member names must match.
    Equal,
    /// Names and ids are ignored; aliases are transparent.
    Equivalent,
}

struct Comparison {
    mode: Mode,
    assumed: HashSet<(*const Node, *const Node)>,
}

impl TypeCode {
    /// Exact structural equality, including ids, names and member names.
    pub fn equal(&self, other: &TypeCode) -> bool {
        Comparison::new(Mode::Equal).types(self, other)
    }

    /// Shape equality: ids and names are ignored, aliases and recursive
    /// placeholders are looked through.
    pub fn equivalent(&self, other: &TypeCode) -> bool {
        Comparison::new(Mode::Equivalent).types(self, other)
    }

    /// Id used to match an unresolved placeholder against another node.
    fn identity(&self) -> Option<String> {
        match self.node() {
            Node::Recursive { id, .. } => Some(id.clone()),
            node => node.named().map(|n| n.id.clone()),
        }
    }
}

impl Comparison {
    fn new(mode: Mode) -> Self {
        Self {
            mode,
            assumed: HashSet::new(),
        }
    }

    /// Strip placeholders (and aliases when comparing shapes).
    fn normalize(&self, tc: &TypeCode) -> Option<TypeCode> {
        match self.mode {
            Mode::Equal => tc.resolved().ok(),
            Mode::Equivalent => tc.unaliased().ok(),
        }
    }

    fn types(&mut self, a: &TypeCode, b: &TypeCode) -> bool {
        if std::ptr::eq(a.as_ptr(), b.as_ptr()) {
            return true;
        }

        let (a, b) = match (self.normalize(a), self.normalize(b)) {
            (Some(a), Some(b)) => (a, b),
            // At least one side is an unresolved placeholder.
            _ => return a.identity().is_some() && a.identity() == b.identity(),
        };

        if !self.assumed.insert((a.as_ptr(), b.as_ptr())) {
            return true;
        }
        self.nodes(&a, &b)
    }

    fn named(&self, a: &Named, b: &Named) -> bool {
        match self.mode {
            Mode::Equal => a.id == b.id && a.name == b.name,
            Mode::Equivalent => true,
        }
    }

    fn member_name(&self, a: &str, b: &str) -> bool {
        self.mode == Mode::Equivalent || a == b
    }

    fn nodes(&mut self, a: &TypeCode, b: &TypeCode) -> bool {
        let (left, right) = (a.node(), b.node());
        if left.kind() != right.kind() {
            return false;
        }

        match (left, right) {
            (Node::Basic(x), Node::Basic(y)) => x == y,
            (Node::String { bound: x }, Node::String { bound: y })
            | (Node::WString { bound: x }, Node::WString { bound: y }) => x == y,
            (
                Node::Fixed {
                    digits: d1,
                    scale: s1,
                },
                Node::Fixed {
                    digits: d2,
                    scale: s2,
                },
            ) => d1 == d2 && s1 == s2,
            (Node::ObjRef(x), Node::ObjRef(y))
            | (Node::Native(x), Node::Native(y))
            | (Node::AbstractInterface(x), Node::AbstractInterface(y)) => self.named(x, y),
            (
                Node::Struct {
                    named: n1,
                    members: m1,
                },
                Node::Struct {
                    named: n2,
                    members: m2,
                },
            )
            | (
                Node::Except {
                    named: n1,
                    members: m1,
                },
                Node::Except {
                    named: n2,
                    members: m2,
                },
            ) => {
                self.named(n1, n2)
                    && m1.len() == m2.len()
                    && m1.iter().zip(m2).all(|(x, y)| {
                        self.member_name(&x.name, &y.name) && self.types(&a.link(x.ty), &b.link(y.ty))
                    })
            }
            (
                Node::Union {
                    named: n1,
                    discriminator: d1,
                    members: m1,
                    default_index: i1,
                },
                Node::Union {
                    named: n2,
                    discriminator: d2,
                    members: m2,
                    default_index: i2,
                },
            ) => {
                self.named(n1, n2)
                    && i1 == i2
                    && m1.len() == m2.len()
                    && self.types(&a.link(*d1), &b.link(*d2))
                    && m1.iter().zip(m2).all(|(x, y)| {
                        self.member_name(&x.name, &y.name)
                            && x.label == y.label
                            && self.types(&a.link(x.ty), &b.link(y.ty))
                    })
            }
            (
                Node::Enum {
                    named: n1,
                    members: m1,
                },
                Node::Enum {
                    named: n2,
                    members: m2,
                },
            ) => {
                self.named(n1, n2)
                    && m1.len() == m2.len()
                    && m1.iter().zip(m2).all(|(x, y)| self.member_name(x, y))
            }
            (
                Node::Sequence {
                    bound: x,
                    content: c1,
                },
                Node::Sequence {
                    bound: y,
                    content: c2,
                },
            )
            | (
                Node::Array {
                    length: x,
                    content: c1,
                },
                Node::Array {
                    length: y,
                    content: c2,
                },
            ) => x == y && self.types(&a.link(*c1), &b.link(*c2)),
            (
                Node::Alias {
                    named: n1,
                    content: c1,
                },
                Node::Alias {
                    named: n2,
                    content: c2,
                },
            )
            | (
                Node::ValueBox {
                    named: n1,
                    content: c1,
                },
                Node::ValueBox {
                    named: n2,
                    content: c2,
                },
            ) => self.named(n1, n2) && self.types(&a.link(*c1), &b.link(*c2)),
            (
                Node::Value {
                    named: n1,
                    modifier: v1,
                    concrete_base: b1,
                    members: m1,
                },
                Node::Value {
                    named: n2,
                    modifier: v2,
                    concrete_base: b2,
                    members: m2,
                },
            ) => {
                let bases = match (b1, b2) {
                    (None, None) => true,
                    (Some(x), Some(y)) => self.types(&a.link(*x), &b.link(*y)),
                    _ => false,
                };
                self.named(n1, n2)
                    && v1 == v2
                    && bases
                    && m1.len() == m2.len()
                    && m1.iter().zip(m2).all(|(x, y)| {
                        self.member_name(&x.name, &y.name)
                            && x.visibility == y.visibility
                            && self.types(&a.link(x.ty), &b.link(y.ty))
                    })
            }
            _ => false,
        }
    }
}
