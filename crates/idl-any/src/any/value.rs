// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Payload values carried by an [`Any`](super::Any).

use super::Any;
use crate::typecode::TypeCode;
use std::fmt;

/// Tagged profile of an object reference.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaggedProfile {
    pub tag: u32,
    pub data: Vec<u8>,
}

/// Interoperable object reference: a type id plus transport profiles.
///
/// A reference with an empty type id and no profiles is the nil reference.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ObjectRef {
    pub type_id: String,
    pub profiles: Vec<TaggedProfile>,
}

impl ObjectRef {
    pub fn new(type_id: impl Into<String>, profiles: Vec<TaggedProfile>) -> Self {
        Self {
            type_id: type_id.into(),
            profiles,
        }
    }

    /// The nil reference.
    pub fn nil() -> Self {
        Self::default()
    }

    pub fn is_nil(&self) -> bool {
        self.type_id.is_empty() && self.profiles.is_empty()
    }
}

/// A value shaped by a TypeCode.
///
/// Aggregates hold their members positionally, in TypeCode member order.
/// Enums hold the ordinal. Union discriminators of enum type are
/// `Value::Enum` ordinals.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Void,
    Short(i16),
    Long(i32),
    UShort(u16),
    ULong(u32),
    LongLong(i64),
    ULongLong(u64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    /// Narrow character, ISO-8859-1 on the wire.
    Char(char),
    WChar(char),
    Octet(u8),
    String(String),
    WString(String),
    Any(Box<Any>),
    TypeCode(TypeCode),
    ObjRef(ObjectRef),
    Enum(u32),
    /// Struct or exception members.
    Struct(Vec<Value>),
    Union {
        discriminator: Box<Value>,
        value: Box<Value>,
    },
    Sequence(Vec<Value>),
    Array(Vec<Value>),
    /// Boxed value; `None` is the null value.
    ValueBox(Option<Box<Value>>),
    /// Value type state (base members first); `None` is the null value.
    ValueType(Option<Vec<Value>>),
}

impl Value {
    /// Union payload selecting the branch for `discriminator`.
    pub fn union(discriminator: Value, value: Value) -> Self {
        Self::Union {
            discriminator: Box::new(discriminator),
            value: Box::new(value),
        }
    }

    /// Short name of the variant, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Void => "void",
            Value::Short(_) => "short",
            Value::Long(_) => "long",
            Value::UShort(_) => "ushort",
            Value::ULong(_) => "ulong",
            Value::LongLong(_) => "longlong",
            Value::ULongLong(_) => "ulonglong",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Boolean(_) => "boolean",
            Value::Char(_) => "char",
            Value::WChar(_) => "wchar",
            Value::Octet(_) => "octet",
            Value::String(_) => "string",
            Value::WString(_) => "wstring",
            Value::Any(_) => "any",
            Value::TypeCode(_) => "typecode",
            Value::ObjRef(_) => "objref",
            Value::Enum(_) => "enum",
            Value::Struct(_) => "struct",
            Value::Union { .. } => "union",
            Value::Sequence(_) => "sequence",
            Value::Array(_) => "array",
            Value::ValueBox(_) => "valueBox",
            Value::ValueType(_) => "value",
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Short(v) => Some(i64::from(*v)),
            Value::Long(v) => Some(i64::from(*v)),
            Value::UShort(v) => Some(i64::from(*v)),
            Value::ULong(v) => Some(i64::from(*v)),
            Value::LongLong(v) => Some(*v),
            Value::ULongLong(v) => i64::try_from(*v).ok(),
            Value::Octet(v) => Some(i64::from(*v)),
            Value::Enum(v) => Some(i64::from(*v)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::WString(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(
            self,
            Value::Null | Value::ValueBox(None) | Value::ValueType(None)
        )
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, open: &str, items: &[Value], close: &str) -> fmt::Result {
    f.write_str(open)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    f.write_str(close)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null | Value::ValueBox(None) | Value::ValueType(None) => f.write_str("null"),
            Value::Void => f.write_str("void"),
            Value::Short(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
            Value::UShort(v) => write!(f, "{}", v),
            Value::ULong(v) => write!(f, "{}", v),
            Value::LongLong(v) => write!(f, "{}", v),
            Value::ULongLong(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Boolean(v) => write!(f, "{}", if *v { "TRUE" } else { "FALSE" }),
            Value::Char(c) | Value::WChar(c) => write!(f, "'{}'", c.escape_default()),
            Value::Octet(v) => write!(f, "0x{:02x}", v),
            Value::String(s) | Value::WString(s) => write!(f, "{:?}", s),
            Value::Any(any) => write!(f, "any({})", any.type_code()),
            Value::TypeCode(tc) => write!(f, "TypeCode({})", tc),
            Value::ObjRef(obj) if obj.is_nil() => f.write_str("nil"),
            Value::ObjRef(obj) => write!(f, "<{}>", obj.type_id),
            Value::Enum(ordinal) => write!(f, "#{}", ordinal),
            Value::Struct(members) => write_list(f, "{", members, "}"),
            Value::Union {
                discriminator,
                value,
            } => write!(f, "{{{}: {}}}", discriminator, value),
            Value::Sequence(items) | Value::Array(items) => write_list(f, "[", items, "]"),
            Value::ValueBox(Some(inner)) => write!(f, "{}", inner),
            Value::ValueType(Some(state)) => write_list(f, "value{", state, "}"),
        }
    }
}
