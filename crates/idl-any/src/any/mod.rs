// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Any: a value tagged with its TypeCode.
//!
//! An [`Any`] is either untyped and empty, or typed with an optional
//! payload. Every typed insert replaces the TypeCode and the payload
//! together; a failed operation leaves the Any unchanged.
//!
//! ```rust
//! use idl_any::{Any, Error, TCKind};
//!
//! let mut any = Any::new();
//! assert_eq!(any.extract_long(), Err(Error::ValueNotSet));
//!
//! any.insert_long(42);
//! assert_eq!(any.type_code().kind(), TCKind::Long);
//! assert_eq!(any.extract_long(), Ok(42));
//! assert!(matches!(any.extract_short(), Err(Error::WrongValueKind { .. })));
//! ```

pub(crate) mod check;
pub(crate) mod marshal;
mod value;

pub use value::{ObjectRef, TaggedProfile, Value};

use crate::cdr::{InputStream, OutputStream, Streamable};
use crate::error::{Error, Result};
use crate::typecode::{TCKind, TypeCode};
use std::fmt;

#[derive(Debug, Clone, Default)]
enum AnyState {
    #[default]
    Empty,
    Typed {
        type_code: TypeCode,
        payload: Option<Value>,
    },
}

/// Container pairing a [`Value`] with its [`TypeCode`].
///
/// Cloning copies the payload; TypeCodes are shared.
#[derive(Clone, Default)]
pub struct Any {
    state: AnyState,
}

/// Generate insert/extract pairs for kinds with a canonical TypeCode.
macro_rules! impl_primitive_ops {
    ($($insert:ident, $extract:ident, $type:ty, $kind:ident, $variant:ident;)*) => {
        $(
            #[doc = concat!("Store a `", stringify!($kind), "` value.")]
            pub fn $insert(&mut self, value: $type) {
                self.put(TypeCode::canonical(TCKind::$kind), Value::$variant(value));
            }

            #[doc = concat!("Read back a `", stringify!($kind), "` value.")]
            pub fn $extract(&self) -> Result<$type> {
                match self.payload_of(TCKind::$kind)? {
                    Value::$variant(value) => Ok(value.clone()),
                    other => Err(Error::value_kind(TCKind::$kind, other.kind_name())),
                }
            }
        )*
    };
}

impl Any {
    /// Untyped, empty Any. Its TypeCode is `tk_null`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Any holding `value`, checked against `type_code`.
    pub fn with_value(type_code: TypeCode, value: Value) -> Result<Self> {
        let mut any = Self::new();
        any.insert(type_code, value)?;
        Ok(any)
    }

    /// Current TypeCode; `tk_null` while untyped.
    pub fn type_code(&self) -> TypeCode {
        match &self.state {
            AnyState::Empty => TypeCode::null(),
            AnyState::Typed { type_code, .. } => type_code.clone(),
        }
    }

    pub fn is_typed(&self) -> bool {
        matches!(self.state, AnyState::Typed { .. })
    }

    pub fn has_value(&self) -> bool {
        self.payload().is_some()
    }

    /// Declare the type and drop any payload (out-parameter use).
    pub fn set_type(&mut self, type_code: TypeCode) {
        self.state = AnyState::Typed {
            type_code,
            payload: None,
        };
    }

    /// Back to the untyped, empty state.
    pub fn reset(&mut self) {
        self.state = AnyState::Empty;
    }

    /// Store an arbitrary value after checking it against `type_code`.
    pub fn insert(&mut self, type_code: TypeCode, value: Value) -> Result<()> {
        check::conforms(&type_code, &value)?;
        self.put(type_code, value);
        Ok(())
    }

    /// Payload, if one has been inserted.
    pub fn value(&self) -> Result<&Value> {
        self.payload().ok_or(Error::ValueNotSet)
    }

    pub(crate) fn payload(&self) -> Option<&Value> {
        match &self.state {
            AnyState::Typed {
                payload: Some(value),
                ..
            } => Some(value),
            _ => None,
        }
    }

    fn put(&mut self, type_code: TypeCode, value: Value) {
        self.state = AnyState::Typed {
            type_code,
            payload: Some(value),
        };
    }

    /// Payload for an extract of `kind`: aliases are looked through.
    fn payload_of(&self, kind: TCKind) -> Result<&Value> {
        let (type_code, payload) = match &self.state {
            AnyState::Empty => return Err(Error::ValueNotSet),
            AnyState::Typed { type_code, payload } => (type_code, payload),
        };
        let actual = type_code.unaliased()?.kind();
        if actual != kind {
            return Err(Error::value_kind(kind, actual));
        }
        payload.as_ref().ok_or(Error::ValueNotSet)
    }

    impl_primitive_ops! {
        insert_short, extract_short, i16, Short, Short;
        insert_long, extract_long, i32, Long, Long;
        insert_ushort, extract_ushort, u16, UShort, UShort;
        insert_ulong, extract_ulong, u32, ULong, ULong;
        insert_longlong, extract_longlong, i64, LongLong, LongLong;
        insert_ulonglong, extract_ulonglong, u64, ULongLong, ULongLong;
        insert_float, extract_float, f32, Float, Float;
        insert_double, extract_double, f64, Double, Double;
        insert_boolean, extract_boolean, bool, Boolean, Boolean;
        insert_char, extract_char, char, Char, Char;
        insert_wchar, extract_wchar, char, WChar, WChar;
        insert_octet, extract_octet, u8, Octet, Octet;
        insert_string, extract_string, String, String, String;
        insert_wstring, extract_wstring, String, WString, WString;
        insert_typecode, extract_typecode, TypeCode, TypeCode, TypeCode;
        insert_object, extract_object, ObjectRef, ObjRef, ObjRef;
    }

    /// Store a nested Any.
    pub fn insert_any(&mut self, value: Any) {
        self.put(TypeCode::canonical(TCKind::Any), Value::Any(Box::new(value)));
    }

    pub fn extract_any(&self) -> Result<Any> {
        match self.payload_of(TCKind::Any)? {
            Value::Any(inner) => Ok((**inner).clone()),
            other => Err(Error::value_kind(TCKind::Any, other.kind_name())),
        }
    }

    /// Store a value type or value box. `type_code` must be of kind
    /// `Value` or `ValueBox`.
    pub fn insert_value_box(&mut self, type_code: TypeCode, value: Value) -> Result<()> {
        let kind = type_code.unaliased()?.kind();
        if !matches!(kind, TCKind::Value | TCKind::ValueBox) {
            return Err(Error::wrong_kind("insert_value_box", kind));
        }
        self.insert(type_code, value)
    }

    pub fn extract_value_box(&self) -> Result<Value> {
        let kind = match &self.state {
            AnyState::Empty => return Err(Error::ValueNotSet),
            AnyState::Typed { type_code, .. } => type_code.unaliased()?.kind(),
        };
        if !matches!(kind, TCKind::Value | TCKind::ValueBox) {
            return Err(Error::value_kind("value or valueBox", kind));
        }
        self.value().cloned()
    }

    /// Principals are not supported.
    pub fn insert_principal(&mut self, _principal: &[u8]) -> Result<()> {
        Err(Error::Unsupported {
            op: "insert_principal",
        })
    }

    pub fn extract_principal(&self) -> Result<Vec<u8>> {
        Err(Error::Unsupported {
            op: "extract_principal",
        })
    }

    /// Fixed-point values are not supported.
    pub fn insert_fixed(&mut self, _digits: &str, _type_code: TypeCode) -> Result<()> {
        Err(Error::Unsupported { op: "insert_fixed" })
    }

    pub fn extract_fixed(&self) -> Result<String> {
        Err(Error::Unsupported { op: "extract_fixed" })
    }

    /// Streamables are not supported; use [`Any::insert`] with a TypeCode.
    pub fn insert_streamable(&mut self, _value: &dyn Streamable) -> Result<()> {
        Err(Error::Unsupported {
            op: "insert_streamable",
        })
    }

    pub fn extract_streamable(&self) -> Result<Box<dyn Streamable>> {
        Err(Error::Unsupported {
            op: "extract_streamable",
        })
    }

    /// Same TypeCode (exact equality) and equal payloads.
    pub fn equal(&self, other: &Any) -> bool {
        self.type_code().equal(&other.type_code()) && self.payload() == other.payload()
    }

    /// Write the payload (not the TypeCode) to `out`.
    ///
    /// Fails with [`Error::ValueNotSet`] when no value has been inserted,
    /// even if the declared type is `null` or `void`. Insert
    /// [`Value::Null`] or [`Value::Void`] to marshal those.
    pub fn write_value<W: OutputStream + ?Sized>(&self, out: &mut W) -> Result<()> {
        if !self.is_typed() {
            return Err(Error::ValueNotSet);
        }
        marshal::write_payload(out, self)
    }

    /// Read a payload shaped by `type_code` and take that type.
    ///
    /// On failure the Any keeps its previous state.
    pub fn read_value<R: InputStream + ?Sized>(
        &mut self,
        input: &mut R,
        type_code: TypeCode,
    ) -> Result<()> {
        let value = marshal::read(input, &type_code).map_err(|e| {
            log::debug!("[any] read_value failed for {}: {}", type_code.kind(), e);
            e
        })?;
        self.put(type_code, value);
        Ok(())
    }
}

impl PartialEq for Any {
    fn eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}

impl fmt::Debug for Any {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            AnyState::Empty => f.write_str("Any(empty)"),
            AnyState::Typed { type_code, payload } => f
                .debug_struct("Any")
                .field("type_code", &type_code.to_string())
                .field("payload", payload)
                .finish(),
        }
    }
}

impl fmt::Display for Any {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.payload() {
            Some(value) => write!(f, "{}", value),
            None => write!(f, "<{}>", self.type_code()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdr::{CdrInputStream, CdrOutputStream};
    use crate::typecode::StructMember;

    #[test]
    fn test_primitive_round_trips() {
        let mut any = Any::new();
        any.insert_ushort(7);
        assert_eq!(any.extract_ushort(), Ok(7));
        any.insert_double(2.5);
        assert_eq!(any.extract_double(), Ok(2.5));
        any.insert_wchar('\u{3b1}');
        assert_eq!(any.extract_wchar(), Ok('\u{3b1}'));
        any.insert_string("hello".to_string());
        assert_eq!(any.extract_string().unwrap(), "hello");
        assert_eq!(any.type_code().length().unwrap(), 0);
    }

    #[test]
    fn test_char_and_wchar_are_distinct() {
        let mut any = Any::new();
        any.insert_char('a');
        assert!(matches!(any.extract_wchar(), Err(Error::WrongValueKind { .. })));
        assert_eq!(any.extract_char(), Ok('a'));
    }

    #[test]
    fn test_untyped_any() {
        let any = Any::new();
        assert_eq!(any.type_code().kind(), TCKind::Null);
        assert!(!any.is_typed());
        assert_eq!(any.extract_string(), Err(Error::ValueNotSet));
        assert_eq!(any.value(), Err(Error::ValueNotSet));
    }

    #[test]
    fn test_set_type_clears_payload() {
        let mut any = Any::new();
        any.insert_long(1);
        any.set_type(TypeCode::primitive(TCKind::Long).unwrap());
        assert!(any.is_typed());
        assert!(!any.has_value());
        assert_eq!(any.extract_long(), Err(Error::ValueNotSet));
        assert!(matches!(any.extract_short(), Err(Error::WrongValueKind { .. })));
    }

    #[test]
    fn test_reset() {
        let mut any = Any::new();
        any.insert_boolean(true);
        any.reset();
        assert!(!any.is_typed());
        assert_eq!(any.type_code().kind(), TCKind::Null);
    }

    #[test]
    fn test_extract_through_alias() {
        let alias = TypeCode::alias("IDL:Count:1.0", "Count", TypeCode::primitive(TCKind::Long).unwrap());
        let any = Any::with_value(alias, Value::Long(3)).unwrap();
        assert_eq!(any.type_code().kind(), TCKind::Alias);
        assert_eq!(any.extract_long(), Ok(3));
    }

    #[test]
    fn test_failed_insert_keeps_state() {
        let mut any = Any::new();
        any.insert_long(5);
        let err = any
            .insert(TypeCode::string(2), Value::String("abc".into()))
            .unwrap_err();
        assert!(matches!(err, Error::WrongValueKind { .. }));
        assert_eq!(any.extract_long(), Ok(5));
    }

    #[test]
    fn test_failed_read_keeps_state() {
        let mut any = Any::new();
        any.insert_long(5);
        let bytes = [1u8];
        let mut input = CdrInputStream::new(&bytes);
        let err = any
            .read_value(&mut input, TypeCode::primitive(TCKind::Double).unwrap())
            .unwrap_err();
        assert!(matches!(err, Error::EncodingMismatch { .. }));
        assert_eq!(any.extract_long(), Ok(5));
    }

    #[test]
    fn test_nested_any() {
        let mut inner = Any::new();
        inner.insert_string("in".to_string());
        let mut outer = Any::new();
        outer.insert_any(inner.clone());
        assert_eq!(outer.extract_any().unwrap(), inner);

        let mut out = CdrOutputStream::new();
        outer.write_value(&mut out).unwrap();
        let bytes = out.into_bytes();
        let mut copy = Any::new();
        copy.read_value(&mut CdrInputStream::new(&bytes), outer.type_code())
            .unwrap();
        assert_eq!(copy, outer);
    }

    #[test]
    fn test_write_without_value() {
        let mut out = CdrOutputStream::new();
        assert_eq!(Any::new().write_value(&mut out), Err(Error::ValueNotSet));

        let mut any = Any::new();
        any.set_type(TypeCode::primitive(TCKind::Short).unwrap());
        assert_eq!(any.write_value(&mut out), Err(Error::ValueNotSet));

        any.set_type(TypeCode::null());
        assert_eq!(any.write_value(&mut out), Err(Error::ValueNotSet));
        any.set_type(TypeCode::primitive(TCKind::Void).unwrap());
        assert_eq!(any.write_value(&mut out), Err(Error::ValueNotSet));
        assert!(out.is_empty());

        any.insert(TypeCode::null(), Value::Null).unwrap();
        assert!(any.write_value(&mut out).is_ok());
        assert!(out.is_empty());
    }

    #[test]
    fn test_equal_compares_type_and_payload() {
        let tc = TypeCode::struct_tc(
            "IDL:P:1.0",
            "P",
            vec![StructMember::new("a", TypeCode::primitive(TCKind::Short).unwrap())],
        );
        let a = Any::with_value(tc.clone(), Value::Struct(vec![Value::Short(1)])).unwrap();
        let b = Any::with_value(tc.clone(), Value::Struct(vec![Value::Short(1)])).unwrap();
        let c = Any::with_value(tc, Value::Struct(vec![Value::Short(2)])).unwrap();
        assert!(a.equal(&b));
        assert!(!a.equal(&c));

        let mut short = Any::new();
        short.insert_short(1);
        let mut ushort = Any::new();
        ushort.insert_ushort(1);
        assert_ne!(short, ushort);
    }

    #[test]
    fn test_value_box_ops() {
        let tc = TypeCode::value_box("IDL:Name:1.0", "Name", TypeCode::string(0));
        let mut any = Any::new();
        any.insert_value_box(tc, Value::ValueBox(Some(Box::new(Value::String("n".into())))))
            .unwrap();
        assert_eq!(
            any.extract_value_box().unwrap(),
            Value::ValueBox(Some(Box::new(Value::String("n".into()))))
        );

        let err = any
            .insert_value_box(TypeCode::string(0), Value::String("x".into()))
            .unwrap_err();
        assert_eq!(err, Error::wrong_kind("insert_value_box", TCKind::String));

        any.insert_long(1);
        assert!(matches!(any.extract_value_box(), Err(Error::WrongValueKind { .. })));
    }

    #[test]
    fn test_unsupported_ops_leave_state() {
        let mut any = Any::new();
        any.insert_octet(4);
        assert_eq!(
            any.insert_principal(&[1, 2]),
            Err(Error::Unsupported { op: "insert_principal" })
        );
        assert!(matches!(any.extract_fixed(), Err(Error::Unsupported { .. })));
        assert!(matches!(
            any.insert_fixed("1.5", TypeCode::fixed(2, 1)),
            Err(Error::Unsupported { .. })
        ));
        assert!(matches!(any.extract_principal(), Err(Error::Unsupported { .. })));
        assert_eq!(any.extract_octet(), Ok(4));
    }
}
