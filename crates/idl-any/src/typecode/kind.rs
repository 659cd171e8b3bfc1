// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! TCKind constants per OMG CORBA 3.0 (Section 4.11.1, TypeCode interface)
//!
//! Wire values follow the CDR TypeCode encoding table (Section 15.3.5.1).

use std::fmt;

/// Kind tag of a TypeCode.
///
/// The discriminants are the CDR wire values. `Recursive` is the
/// indirection marker (`0xffffffff`) and never appears as a resolved kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum TCKind {
    Null = 0,
    Void = 1,
    Short = 2,
    Long = 3,
    UShort = 4,
    ULong = 5,
    Float = 6,
    Double = 7,
    Boolean = 8,
    Char = 9,
    Octet = 10,
    Any = 11,
    TypeCode = 12,
    /// Legacy object-identity principal. Parsed, never marshaled.
    Principal = 13,
    ObjRef = 14,
    Struct = 15,
    Union = 16,
    Enum = 17,
    String = 18,
    Sequence = 19,
    Array = 20,
    Alias = 21,
    Except = 22,
    LongLong = 23,
    ULongLong = 24,
    LongDouble = 25,
    WChar = 26,
    WString = 27,
    Fixed = 28,
    Value = 29,
    ValueBox = 30,
    Native = 31,
    AbstractInterface = 32,
    /// Recursive placeholder (unresolved indirection).
    Recursive = 0xffff_ffff,
}

/// How the parameters of a kind are laid out in the CDR TypeCode encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLayout {
    /// No parameters.
    Empty,
    /// Parameters written inline (string bound, fixed digits/scale).
    Simple,
    /// Parameters written inside an encapsulation.
    Complex,
}

impl TCKind {
    /// All kinds with a wire value in `0..=32`, in wire order.
    pub const ALL: [TCKind; 33] = [
        TCKind::Null,
        TCKind::Void,
        TCKind::Short,
        TCKind::Long,
        TCKind::UShort,
        TCKind::ULong,
        TCKind::Float,
        TCKind::Double,
        TCKind::Boolean,
        TCKind::Char,
        TCKind::Octet,
        TCKind::Any,
        TCKind::TypeCode,
        TCKind::Principal,
        TCKind::ObjRef,
        TCKind::Struct,
        TCKind::Union,
        TCKind::Enum,
        TCKind::String,
        TCKind::Sequence,
        TCKind::Array,
        TCKind::Alias,
        TCKind::Except,
        TCKind::LongLong,
        TCKind::ULongLong,
        TCKind::LongDouble,
        TCKind::WChar,
        TCKind::WString,
        TCKind::Fixed,
        TCKind::Value,
        TCKind::ValueBox,
        TCKind::Native,
        TCKind::AbstractInterface,
    ];

    /// Wire value of this kind.
    pub const fn to_u32(self) -> u32 {
        self as u32
    }

    /// Convert from a wire value.
    pub fn from_u32(value: u32) -> Option<Self> {
        if value == TCKind::Recursive.to_u32() {
            return Some(TCKind::Recursive);
        }
        Self::ALL.get(value as usize).copied()
    }

    /// Parameter layout used by the CDR TypeCode encoding.
    pub const fn param_layout(self) -> ParamLayout {
        match self {
            TCKind::String | TCKind::WString | TCKind::Fixed => ParamLayout::Simple,
            TCKind::ObjRef
            | TCKind::Struct
            | TCKind::Union
            | TCKind::Enum
            | TCKind::Sequence
            | TCKind::Array
            | TCKind::Alias
            | TCKind::Except
            | TCKind::Value
            | TCKind::ValueBox
            | TCKind::Native
            | TCKind::AbstractInterface
            | TCKind::Recursive => ParamLayout::Complex,
            _ => ParamLayout::Empty,
        }
    }

    /// True for kinds whose TypeCode carries no parameters at all.
    pub const fn is_empty_kind(self) -> bool {
        matches!(self.param_layout(), ParamLayout::Empty)
    }

    /// True for kinds that carry a repository id and a name.
    pub const fn has_id(self) -> bool {
        matches!(
            self,
            TCKind::ObjRef
                | TCKind::Struct
                | TCKind::Union
                | TCKind::Enum
                | TCKind::Alias
                | TCKind::Except
                | TCKind::Value
                | TCKind::ValueBox
                | TCKind::Native
                | TCKind::AbstractInterface
        )
    }

    /// True for kinds that carry members.
    pub const fn has_members(self) -> bool {
        matches!(
            self,
            TCKind::Struct | TCKind::Union | TCKind::Enum | TCKind::Except | TCKind::Value
        )
    }

    /// True for kinds that are legal union discriminators.
    pub const fn is_discriminator(self) -> bool {
        matches!(
            self,
            TCKind::Short
                | TCKind::Long
                | TCKind::UShort
                | TCKind::ULong
                | TCKind::LongLong
                | TCKind::ULongLong
                | TCKind::Boolean
                | TCKind::Char
                | TCKind::WChar
                | TCKind::Enum
        )
    }

    /// IDL spelling of the kind.
    pub const fn name(self) -> &'static str {
        match self {
            TCKind::Null => "null",
            TCKind::Void => "void",
            TCKind::Short => "short",
            TCKind::Long => "long",
            TCKind::UShort => "ushort",
            TCKind::ULong => "ulong",
            TCKind::Float => "float",
            TCKind::Double => "double",
            TCKind::Boolean => "boolean",
            TCKind::Char => "char",
            TCKind::Octet => "octet",
            TCKind::Any => "any",
            TCKind::TypeCode => "typecode",
            TCKind::Principal => "principal",
            TCKind::ObjRef => "objref",
            TCKind::Struct => "struct",
            TCKind::Union => "union",
            TCKind::Enum => "enum",
            TCKind::String => "string",
            TCKind::Sequence => "sequence",
            TCKind::Array => "array",
            TCKind::Alias => "alias",
            TCKind::Except => "exception",
            TCKind::LongLong => "longlong",
            TCKind::ULongLong => "ulonglong",
            TCKind::LongDouble => "longdouble",
            TCKind::WChar => "wchar",
            TCKind::WString => "wstring",
            TCKind::Fixed => "fixed",
            TCKind::Value => "value",
            TCKind::ValueBox => "valueBox",
            TCKind::Native => "native",
            TCKind::AbstractInterface => "abstractInterface",
            TCKind::Recursive => "recursive",
        }
    }
}

impl fmt::Display for TCKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
