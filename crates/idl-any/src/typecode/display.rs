// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! IDL-flavoured rendering of TypeCodes.
//!
//! The top-level node prints as a definition; nested named types print by
//! name (or id when the name is empty) and placeholders print their id, so
//! output is finite for recursive graphs.

use super::{Named, Node, TCKind, TypeCode, ValueModifier, Visibility};
use std::fmt;

fn primitive_name(kind: TCKind) -> &'static str {
    match kind {
        TCKind::UShort => "unsigned short",
        TCKind::ULong => "unsigned long",
        TCKind::LongLong => "long long",
        TCKind::ULongLong => "unsigned long long",
        TCKind::LongDouble => "long double",
        TCKind::TypeCode => "TypeCode",
        TCKind::Principal => "Principal",
        other => other.name(),
    }
}

fn label(named: &Named) -> &str {
    if named.name.is_empty() {
        &named.id
    } else {
        &named.name
    }
}

/// Write `tc` the way it appears when used as a member type.
fn reference(tc: &TypeCode, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match tc.node() {
        Node::Basic(kind) => f.write_str(primitive_name(*kind)),
        Node::String { bound: 0 } => f.write_str("string"),
        Node::String { bound } => write!(f, "string<{}>", bound),
        Node::WString { bound: 0 } => f.write_str("wstring"),
        Node::WString { bound } => write!(f, "wstring<{}>", bound),
        Node::Fixed { digits, scale } => write!(f, "fixed<{}, {}>", digits, scale),
        Node::Sequence { bound, content } => {
            f.write_str("sequence<")?;
            reference(&tc.link(*content), f)?;
            if *bound > 0 {
                write!(f, ", {}", bound)?;
            }
            f.write_str(">")
        }
        Node::Array { length, content } => {
            reference(&tc.link(*content), f)?;
            write!(f, "[{}]", length)
        }
        Node::Recursive { id, .. } => f.write_str(id),
        node => match node.named() {
            Some(named) => f.write_str(label(named)),
            None => f.write_str(node.kind().name()),
        },
    }
}

fn modifier_prefix(modifier: ValueModifier) -> &'static str {
    match modifier {
        ValueModifier::Custom => "custom ",
        ValueModifier::Abstract => "abstract ",
        ValueModifier::None | ValueModifier::Truncatable => "",
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node() {
            Node::ObjRef(named) => write!(f, "interface {}", label(named)),
            Node::Native(named) => write!(f, "native {}", label(named)),
            Node::AbstractInterface(named) => write!(f, "abstract interface {}", label(named)),
            Node::Struct { named, members } | Node::Except { named, members } => {
                let keyword = if matches!(self.node(), Node::Except { .. }) {
                    "exception"
                } else {
                    "struct"
                };
                write!(f, "{} {} {{", keyword, label(named))?;
                for member in members {
                    f.write_str(" ")?;
                    reference(&self.link(member.ty), f)?;
                    write!(f, " {};", member.name)?;
                }
                f.write_str(" }")
            }
            Node::Union {
                named,
                discriminator,
                members,
                ..
            } => {
                write!(f, "union {} switch (", label(named))?;
                reference(&self.link(*discriminator), f)?;
                f.write_str(") {")?;
                for member in &members[..] {
                    write!(f, " {}: ", member.label)?;
                    reference(&self.link(member.ty), f)?;
                    write!(f, " {};", member.name)?;
                }
                f.write_str(" }")
            }
            Node::Enum { named, members } => {
                write!(f, "enum {} {{ {} }}", label(named), members.join(", "))
            }
            Node::Alias { named, content } => {
                f.write_str("typedef ")?;
                reference(&self.link(*content), f)?;
                write!(f, " {}", label(named))
            }
            Node::ValueBox { named, content } => {
                write!(f, "valuetype {} ", label(named))?;
                reference(&self.link(*content), f)
            }
            Node::Value {
                named,
                modifier,
                concrete_base,
                members,
            } => {
                write!(f, "{}valuetype {}", modifier_prefix(*modifier), label(named))?;
                if let Some(base) = concrete_base {
                    f.write_str(" : ")?;
                    if *modifier == ValueModifier::Truncatable {
                        f.write_str("truncatable ")?;
                    }
                    reference(&self.link(*base), f)?;
                }
                f.write_str(" {")?;
                for member in members {
                    let visibility = match member.visibility {
                        Visibility::Public => "public",
                        Visibility::Private => "private",
                    };
                    write!(f, " {} ", visibility)?;
                    reference(&self.link(member.ty), f)?;
                    write!(f, " {};", member.name)?;
                }
                f.write_str(" }")
            }
            Node::Recursive { id, .. } => write!(f, "recursive {}", id),
            _ => reference(self, f),
        }
    }
}
