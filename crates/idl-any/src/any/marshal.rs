// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! TypeCode-driven value encoding over the stream traits.

use super::check::state_members;
use super::{Any, Value};
use crate::cdr::{len_u32, InputStream, OutputStream, MAX_NESTING_DEPTH};
use crate::error::{Error, Result};
use crate::typecode::{TCKind, TypeCode};

/// Value tag of a non-null value type or value box.
const VALUE_TAG: u32 = 0x7fff_ff00;
/// Value tag of a null value.
const NULL_TAG: u32 = 0;

/// Cap on speculative preallocation driven by stream lengths.
const MAX_PREALLOC: usize = 4096;

/// Largest unbounded sequence accepted from a stream; catches allocation
/// bombs in malformed input.
const MAX_SEQUENCE_LENGTH: usize = 1_000_000;

fn wrong_value(tc: &TypeCode, value: &Value) -> Error {
    Error::value_kind(tc.kind(), value.kind_name())
}

/// Write the payload of `any`. A missing payload is `ValueNotSet` for
/// every type, `null` and `void` included.
pub(crate) fn write_payload<W: OutputStream + ?Sized>(out: &mut W, any: &Any) -> Result<()> {
    let value = any.payload().ok_or(Error::ValueNotSet)?;
    write(out, &any.type_code(), value)
}

/// Write `value` shaped by `tc`.
pub(crate) fn write<W: OutputStream + ?Sized>(out: &mut W, tc: &TypeCode, value: &Value) -> Result<()> {
    let tc = tc.unaliased()?;
    match (tc.kind(), value) {
        (TCKind::Null, Value::Null) | (TCKind::Void, Value::Void) => Ok(()),
        (TCKind::Short, Value::Short(v)) => out.write_short(*v),
        (TCKind::Long, Value::Long(v)) => out.write_long(*v),
        (TCKind::UShort, Value::UShort(v)) => out.write_ushort(*v),
        (TCKind::ULong, Value::ULong(v)) => out.write_ulong(*v),
        (TCKind::LongLong, Value::LongLong(v)) => out.write_longlong(*v),
        (TCKind::ULongLong, Value::ULongLong(v)) => out.write_ulonglong(*v),
        (TCKind::Float, Value::Float(v)) => out.write_float(*v),
        (TCKind::Double, Value::Double(v)) => out.write_double(*v),
        (TCKind::Boolean, Value::Boolean(v)) => out.write_boolean(*v),
        (TCKind::Char, Value::Char(v)) => out.write_char(*v),
        (TCKind::WChar, Value::WChar(v)) => out.write_wchar(*v),
        (TCKind::Octet, Value::Octet(v)) => out.write_octet(*v),
        (TCKind::String, Value::String(s)) => {
            let bound = tc.length()?;
            if bound > 0 && s.chars().count() > bound as usize {
                return Err(Error::value_kind(format!("string<{}>", bound), "longer string"));
            }
            out.write_string(s)
        }
        (TCKind::WString, Value::WString(s)) => {
            let bound = tc.length()?;
            if bound > 0 && s.encode_utf16().count() > bound as usize {
                return Err(Error::value_kind(format!("wstring<{}>", bound), "longer wstring"));
            }
            out.write_wstring(s)
        }
        (TCKind::Any, Value::Any(inner)) => out.write_any(inner),
        (TCKind::TypeCode, Value::TypeCode(inner)) => out.write_typecode(inner),
        (TCKind::ObjRef | TCKind::AbstractInterface, Value::ObjRef(obj)) => out.write_object(obj),
        (TCKind::Enum, Value::Enum(ordinal)) => {
            if *ordinal as usize >= tc.member_count()? {
                return Err(wrong_value(&tc, value));
            }
            out.write_ulong(*ordinal)
        }
        (TCKind::Struct | TCKind::Except, Value::Struct(members)) => {
            if members.len() != tc.member_count()? {
                return Err(wrong_value(&tc, value));
            }
            for (index, member) in members.iter().enumerate() {
                write(out, &tc.member_type(index)?, member)?;
            }
            Ok(())
        }
        (
            TCKind::Union,
            Value::Union {
                discriminator,
                value: branch,
            },
        ) => {
            let index = tc
                .member_index_for(discriminator)?
                .ok_or_else(|| Error::value_kind("union branch", format!("label {}", discriminator)))?;
            write(out, &tc.discriminator_type()?, discriminator)?;
            write(out, &tc.member_type(index)?, branch)
        }
        (TCKind::Sequence, Value::Sequence(items)) => {
            let bound = tc.length()?;
            if bound > 0 && items.len() > bound as usize {
                return Err(Error::value_kind(
                    format!("at most {} elements", bound),
                    format!("{} elements", items.len()),
                ));
            }
            out.write_ulong(len_u32(items.len())?)?;
            write_elements(out, &tc.content_type()?, items)
        }
        (TCKind::Array, Value::Array(items)) => {
            if items.len() != tc.length()? as usize {
                return Err(wrong_value(&tc, value));
            }
            write_elements(out, &tc.content_type()?, items)
        }
        (TCKind::ValueBox, Value::ValueBox(boxed)) => match boxed {
            None => out.write_ulong(NULL_TAG),
            Some(inner) => {
                out.write_ulong(VALUE_TAG)?;
                write(out, &tc.content_type()?, inner)
            }
        },
        (TCKind::Value, Value::ValueType(state)) => match state {
            None => out.write_ulong(NULL_TAG),
            Some(state) => {
                let members = state_members(&tc)?;
                if members.len() != state.len() {
                    return Err(wrong_value(&tc, value));
                }
                out.write_ulong(VALUE_TAG)?;
                for (member_tc, member) in members.iter().zip(state) {
                    write(out, member_tc, member)?;
                }
                Ok(())
            }
        },
        (TCKind::LongDouble, _) => Err(Error::Unsupported { op: "long double marshaling" }),
        (TCKind::Fixed, _) => Err(Error::Unsupported { op: "fixed marshaling" }),
        (TCKind::Principal, _) => Err(Error::Unsupported { op: "principal marshaling" }),
        (TCKind::Native, _) => Err(Error::Unsupported { op: "native marshaling" }),
        _ => Err(wrong_value(&tc, value)),
    }
}

fn write_elements<W: OutputStream + ?Sized>(out: &mut W, content: &TypeCode, items: &[Value]) -> Result<()> {
    if content.unaliased()?.kind() == TCKind::Octet {
        let bytes = items
            .iter()
            .map(|item| match item {
                Value::Octet(b) => Ok(*b),
                other => Err(wrong_value(content, other)),
            })
            .collect::<Result<Vec<u8>>>()?;
        return out.write_octets(&bytes);
    }
    items.iter().try_for_each(|item| write(out, content, item))
}

/// Read a value shaped by `tc`.
pub(crate) fn read<R: InputStream + ?Sized>(input: &mut R, tc: &TypeCode) -> Result<Value> {
    read_nested(input, tc, 0)
}

fn read_nested<R: InputStream + ?Sized>(input: &mut R, tc: &TypeCode, depth: usize) -> Result<Value> {
    if depth > MAX_NESTING_DEPTH {
        return Err(Error::mismatch(format!(
            "value nesting exceeds {} levels",
            MAX_NESTING_DEPTH
        )));
    }
    let nested = |input: &mut R, tc: &TypeCode| read_nested(input, tc, depth + 1);
    let tc = tc.unaliased()?;
    let value = match tc.kind() {
        TCKind::Null => Value::Null,
        TCKind::Void => Value::Void,
        TCKind::Short => Value::Short(input.read_short()?),
        TCKind::Long => Value::Long(input.read_long()?),
        TCKind::UShort => Value::UShort(input.read_ushort()?),
        TCKind::ULong => Value::ULong(input.read_ulong()?),
        TCKind::LongLong => Value::LongLong(input.read_longlong()?),
        TCKind::ULongLong => Value::ULongLong(input.read_ulonglong()?),
        TCKind::Float => Value::Float(input.read_float()?),
        TCKind::Double => Value::Double(input.read_double()?),
        TCKind::Boolean => Value::Boolean(input.read_boolean()?),
        TCKind::Char => Value::Char(input.read_char()?),
        TCKind::WChar => Value::WChar(input.read_wchar()?),
        TCKind::Octet => Value::Octet(input.read_octet()?),
        TCKind::String => {
            let s = input.read_string()?;
            check_bound(&tc, s.chars().count(), "string")?;
            Value::String(s)
        }
        TCKind::WString => {
            let s = input.read_wstring()?;
            check_bound(&tc, s.encode_utf16().count(), "wstring")?;
            Value::WString(s)
        }
        TCKind::Any => {
            let inner_tc = input.read_typecode()?;
            let inner = nested(input, &inner_tc)?;
            let mut any = Any::new();
            any.put(inner_tc, inner);
            Value::Any(Box::new(any))
        }
        TCKind::TypeCode => Value::TypeCode(input.read_typecode()?),
        TCKind::ObjRef | TCKind::AbstractInterface => Value::ObjRef(input.read_object()?),
        TCKind::Enum => {
            let ordinal = input.read_ulong()?;
            let count = tc.member_count()?;
            if ordinal as usize >= count {
                return Err(Error::mismatch(format!(
                    "enum ordinal {} with {} enumerators",
                    ordinal, count
                )));
            }
            Value::Enum(ordinal)
        }
        TCKind::Struct | TCKind::Except => {
            let count = tc.member_count()?;
            let mut members = Vec::with_capacity(count);
            for index in 0..count {
                members.push(nested(input, &tc.member_type(index)?)?);
            }
            Value::Struct(members)
        }
        TCKind::Union => {
            let discriminator = nested(input, &tc.discriminator_type()?)?;
            let index = tc.member_index_for(&discriminator)?.ok_or_else(|| {
                Error::mismatch(format!("no union branch for discriminator {}", discriminator))
            })?;
            let branch = nested(input, &tc.member_type(index)?)?;
            Value::union(discriminator, branch)
        }
        TCKind::Sequence => {
            let len = input.read_ulong()? as usize;
            check_bound(&tc, len, "sequence")?;
            if len > MAX_SEQUENCE_LENGTH {
                return Err(Error::mismatch(format!(
                    "sequence length {} exceeds maximum allowed ({})",
                    len, MAX_SEQUENCE_LENGTH
                )));
            }
            Value::Sequence(read_elements(input, &tc.content_type()?, len, depth + 1)?)
        }
        TCKind::Array => {
            let len = tc.length()? as usize;
            Value::Array(read_elements(input, &tc.content_type()?, len, depth + 1)?)
        }
        TCKind::ValueBox => match read_value_tag(input)? {
            false => Value::ValueBox(None),
            true => Value::ValueBox(Some(Box::new(nested(input, &tc.content_type()?)?))),
        },
        TCKind::Value => match read_value_tag(input)? {
            false => Value::ValueType(None),
            true => {
                let members = state_members(&tc)?;
                let mut state = Vec::with_capacity(members.len());
                for member_tc in &members {
                    state.push(nested(input, member_tc)?);
                }
                Value::ValueType(Some(state))
            }
        },
        TCKind::LongDouble => return Err(Error::Unsupported { op: "long double marshaling" }),
        TCKind::Fixed => return Err(Error::Unsupported { op: "fixed marshaling" }),
        TCKind::Principal => return Err(Error::Unsupported { op: "principal marshaling" }),
        TCKind::Native => return Err(Error::Unsupported { op: "native marshaling" }),
        kind @ (TCKind::Alias | TCKind::Recursive) => {
            return Err(Error::mismatch(format!("unexpected {} after resolution", kind)))
        }
    };
    Ok(value)
}

fn check_bound(tc: &TypeCode, len: usize, what: &str) -> Result<()> {
    let bound = tc.length()?;
    if bound > 0 && len > bound as usize {
        return Err(Error::mismatch(format!(
            "{} length {} exceeds bound {}",
            what, len, bound
        )));
    }
    Ok(())
}

fn read_elements<R: InputStream + ?Sized>(
    input: &mut R,
    content: &TypeCode,
    len: usize,
    depth: usize,
) -> Result<Vec<Value>> {
    if content.unaliased()?.kind() == TCKind::Octet {
        let bytes = input.read_octets(len)?;
        return Ok(bytes.into_iter().map(Value::Octet).collect());
    }
    let mut items = Vec::with_capacity(len.min(MAX_PREALLOC));
    for _ in 0..len {
        items.push(read_nested(input, content, depth)?);
    }
    Ok(items)
}

/// `true` for a present value, `false` for null.
fn read_value_tag<R: InputStream + ?Sized>(input: &mut R) -> Result<bool> {
    match input.read_ulong()? {
        NULL_TAG => Ok(false),
        VALUE_TAG => Ok(true),
        other => Err(Error::mismatch(format!("value tag 0x{:08x}", other))),
    }
}
