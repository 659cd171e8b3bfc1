// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Compact form: the same type with optional names removed.

use super::{Field, Named, Node, StructMember, TypeCode, UnionMember, ValueMember};
use std::collections::HashMap;

impl TypeCode {
    /// Copy of this TypeCode with type names and member names emptied.
    ///
    /// Repository ids are kept so recursive placeholders still resolve.
    /// Alias nodes are returned untouched.
    pub fn compact_form(&self) -> TypeCode {
        Compactor::default().compact(self)
    }
}

#[derive(Default)]
struct Compactor {
    done: HashMap<*const Node, TypeCode>,
    /// Ids of the aggregates currently being rebuilt.
    enclosing: Vec<String>,
}

fn stripped(named: &Named) -> Named {
    Named::new(named.id.clone(), String::new())
}

impl Compactor {
    fn compact(&mut self, tc: &TypeCode) -> TypeCode {
        if let Some(done) = self.done.get(&tc.as_ptr()) {
            return done.clone();
        }
        let compacted = self.rebuild(tc);
        self.done.insert(tc.as_ptr(), compacted.clone());
        compacted
    }

    fn rebuild(&mut self, tc: &TypeCode) -> TypeCode {
        match tc.node() {
            Node::Basic(_)
            | Node::String { .. }
            | Node::WString { .. }
            | Node::Fixed { .. }
            | Node::Alias { .. } => tc.clone(),
            Node::ObjRef(named) => TypeCode::leaf(Node::ObjRef(stripped(named))),
            Node::Native(named) => TypeCode::leaf(Node::Native(stripped(named))),
            Node::AbstractInterface(named) => {
                TypeCode::leaf(Node::AbstractInterface(stripped(named)))
            }
            Node::Recursive { id, .. } => {
                // A fresh placeholder is rebound by the rebuilt aggregate;
                // outside of it the original binding is kept.
                if self.enclosing.iter().any(|open| open == id) {
                    TypeCode::recursive(id.clone())
                } else {
                    tc.clone()
                }
            }
            Node::Struct { named, members } => {
                self.enclosing.push(named.id.clone());
                let members = self.struct_members(tc, members);
                self.enclosing.pop();
                TypeCode::struct_tc(named.id.clone(), "", members)
            }
            Node::Except { named, members } => {
                self.enclosing.push(named.id.clone());
                let members = self.struct_members(tc, members);
                self.enclosing.pop();
                TypeCode::exception_tc(named.id.clone(), "", members)
            }
            Node::Union {
                named,
                discriminator,
                members,
                ..
            } => {
                self.enclosing.push(named.id.clone());
                let discriminator = self.compact(&tc.link(*discriminator));
                let members = members
                    .iter()
                    .map(|m| UnionMember {
                        name: String::new(),
                        label: m.label.clone(),
                        type_code: self.compact(&tc.link(m.ty)),
                    })
                    .collect();
                self.enclosing.pop();
                TypeCode::union_unchecked(stripped(named), discriminator, members)
            }
            Node::Enum { named, members } => TypeCode::leaf(Node::Enum {
                named: stripped(named),
                members: vec![String::new(); members.len()],
            }),
            Node::Sequence { bound, content } => {
                TypeCode::sequence(*bound, self.compact(&tc.link(*content)))
            }
            Node::Array { length, content } => TypeCode::array(*length, self.compact(&tc.link(*content))),
            Node::ValueBox { named, content } => {
                TypeCode::value_box(named.id.clone(), "", self.compact(&tc.link(*content)))
            }
            Node::Value {
                named,
                modifier,
                concrete_base,
                members,
            } => {
                self.enclosing.push(named.id.clone());
                let base = (*concrete_base).map(|b| self.compact(&tc.link(b)));
                let members = members
                    .iter()
                    .map(|m| ValueMember::new("", self.compact(&tc.link(m.ty)), m.visibility))
                    .collect();
                self.enclosing.pop();
                TypeCode::value_tc(named.id.clone(), "", *modifier, base, members)
            }
        }
    }

    fn struct_members(&mut self, tc: &TypeCode, members: &[Field]) -> Vec<StructMember> {
        members
            .iter()
            .map(|m| StructMember::new("", self.compact(&tc.link(m.ty))))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typecode::TCKind;

    fn long() -> TypeCode {
        TypeCode::primitive(TCKind::Long).unwrap()
    }

    #[test]
    fn test_names_are_stripped() {
        let tc = TypeCode::struct_tc(
            "IDL:Point:1.0",
            "Point",
            vec![
                StructMember::new("x", long()),
                StructMember::new("y", long()),
            ],
        );
        let compact = tc.compact_form();
        assert_eq!(compact.id().unwrap(), "IDL:Point:1.0");
        assert_eq!(compact.name().unwrap(), "");
        assert_eq!(compact.member_name(0).unwrap(), "");
        assert!(!compact.equal(&tc));
        assert!(compact.equivalent(&tc));
    }

    #[test]
    fn test_alias_untouched() {
        let alias = TypeCode::alias("IDL:Count:1.0", "Count", long());
        let tc = TypeCode::struct_tc(
            "IDL:Holder:1.0",
            "Holder",
            vec![StructMember::new("count", alias.clone())],
        );
        let compact = tc.compact_form();
        let member = compact.member_type(0).unwrap();
        assert_eq!(member.name().unwrap(), "Count");
        assert!(member.equal(&alias));
        assert!(alias.compact_form().equal(&alias));
    }

    #[test]
    fn test_recursive_compact_resolves() {
        let tc = TypeCode::struct_tc(
            "IDL:Node:1.0",
            "Node",
            vec![StructMember::new(
                "children",
                TypeCode::sequence(0, TypeCode::recursive("IDL:Node:1.0")),
            )],
        );
        let compact = tc.compact_form();
        let element = compact.member_type(0).unwrap().content_type().unwrap();
        assert_eq!(element.kind(), TCKind::Struct);
        assert_eq!(element.name().unwrap(), "");
        assert!(compact.equivalent(&tc));
        assert!(compact.equal(&compact.compact_form()));
    }

    #[test]
    fn test_enum_member_names_stripped() {
        let tc = TypeCode::enum_tc("IDL:Color:1.0", "Color", ["RED", "GREEN"]);
        let compact = tc.compact_form();
        assert_eq!(compact.member_count().unwrap(), 2);
        assert_eq!(compact.member_name(1).unwrap(), "");
    }
}
