// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Member descriptors for aggregate TypeCodes.

use crate::any::Value;
use crate::typecode::TypeCode;
use std::fmt;

/// Struct or exception member.
#[derive(Debug, Clone)]
pub struct StructMember {
    /// Member name (may be empty in compact form).
    pub name: String,
    /// Member type.
    pub type_code: TypeCode,
}

impl StructMember {
    /// Create a struct member.
    pub fn new(name: impl Into<String>, type_code: TypeCode) -> Self {
        Self {
            name: name.into(),
            type_code,
        }
    }
}

/// Union branch label.
#[derive(Debug, Clone, PartialEq)]
pub enum UnionLabel {
    /// The `default:` branch.
    Default,
    /// An explicit `case` value of the discriminator type.
    Value(Value),
}

impl UnionLabel {
    /// True for the `default:` sentinel.
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }
}

impl fmt::Display for UnionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("default"),
            Self::Value(v) => write!(f, "case {}", v),
        }
    }
}

/// Union branch.
#[derive(Debug, Clone)]
pub struct UnionMember {
    /// Branch name.
    pub name: String,
    /// Label selecting this branch.
    pub label: UnionLabel,
    /// Branch type.
    pub type_code: TypeCode,
}

impl UnionMember {
    /// Create a branch selected by `label`.
    pub fn new(name: impl Into<String>, label: Value, type_code: TypeCode) -> Self {
        Self {
            name: name.into(),
            label: UnionLabel::Value(label),
            type_code,
        }
    }

    /// Create the `default:` branch.
    pub fn default_branch(name: impl Into<String>, type_code: TypeCode) -> Self {
        Self {
            name: name.into(),
            label: UnionLabel::Default,
            type_code,
        }
    }
}

/// Visibility of a value type state member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i16)]
pub enum Visibility {
    Private = 0,
    Public = 1,
}

impl Visibility {
    /// Wire value.
    pub const fn to_i16(self) -> i16 {
        self as i16
    }

    /// Convert from a wire value.
    pub const fn from_i16(value: i16) -> Option<Self> {
        match value {
            0 => Some(Self::Private),
            1 => Some(Self::Public),
            _ => None,
        }
    }
}

/// Value type modifier (`VM_*` constants).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i16)]
pub enum ValueModifier {
    #[default]
    None = 0,
    Custom = 1,
    Abstract = 2,
    Truncatable = 3,
}

impl ValueModifier {
    /// Wire value.
    pub const fn to_i16(self) -> i16 {
        self as i16
    }

    /// Convert from a wire value.
    pub const fn from_i16(value: i16) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Custom),
            2 => Some(Self::Abstract),
            3 => Some(Self::Truncatable),
            _ => None,
        }
    }
}

/// Value type state member.
#[derive(Debug, Clone)]
pub struct ValueMember {
    /// Member name.
    pub name: String,
    /// Member type.
    pub type_code: TypeCode,
    /// Public or private state member.
    pub visibility: Visibility,
}

impl ValueMember {
    /// Create a value type member.
    pub fn new(name: impl Into<String>, type_code: TypeCode, visibility: Visibility) -> Self {
        Self {
            name: name.into(),
            type_code,
            visibility,
        }
    }
}
