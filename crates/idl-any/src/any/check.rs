// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shape check of a [`Value`] against a [`TypeCode`].

use super::Value;
use crate::error::{Error, Result};
use crate::typecode::{TCKind, TypeCode};

fn mismatch(tc: &TypeCode, value: &Value) -> Error {
    Error::value_kind(tc.kind(), value.kind_name())
}

fn within_bound(bound: u32, len: usize) -> bool {
    bound == 0 || len <= bound as usize
}

/// Member types of a value type's state, concrete base chain first.
pub(crate) fn state_members(tc: &TypeCode) -> Result<Vec<TypeCode>> {
    let mut chain = Vec::new();
    let mut current = Some(tc.unaliased()?);
    while let Some(value_tc) = current {
        if value_tc.kind() != TCKind::Value {
            return Err(Error::wrong_kind("state_members", value_tc.kind()));
        }
        let base = value_tc.concrete_base_type()?;
        chain.push(value_tc);
        current = base.map(|b| b.unaliased()).transpose()?;
    }

    let mut members = Vec::new();
    for value_tc in chain.iter().rev() {
        for index in 0..value_tc.member_count()? {
            members.push(value_tc.member_type(index)?);
        }
    }
    Ok(members)
}

/// Verify that `value` is shaped like `tc`.
///
/// Reports `WrongValueKind` on a mismatch and `Unsupported` for kinds that
/// cannot carry a value (native, principal, fixed, long double).
pub(crate) fn conforms(tc: &TypeCode, value: &Value) -> Result<()> {
    let tc = tc.unaliased()?;
    let kind = tc.kind();
    let ok = match (kind, value) {
        (TCKind::Null, Value::Null)
        | (TCKind::Void, Value::Void)
        | (TCKind::Short, Value::Short(_))
        | (TCKind::Long, Value::Long(_))
        | (TCKind::UShort, Value::UShort(_))
        | (TCKind::ULong, Value::ULong(_))
        | (TCKind::LongLong, Value::LongLong(_))
        | (TCKind::ULongLong, Value::ULongLong(_))
        | (TCKind::Float, Value::Float(_))
        | (TCKind::Double, Value::Double(_))
        | (TCKind::Boolean, Value::Boolean(_))
        | (TCKind::Char, Value::Char(_))
        | (TCKind::WChar, Value::WChar(_))
        | (TCKind::Octet, Value::Octet(_))
        | (TCKind::Any, Value::Any(_))
        | (TCKind::TypeCode, Value::TypeCode(_))
        | (TCKind::ObjRef, Value::ObjRef(_))
        | (TCKind::AbstractInterface, Value::ObjRef(_)) => true,
        (TCKind::String, Value::String(s)) => within_bound(tc.length()?, s.chars().count()),
        (TCKind::WString, Value::WString(s)) => within_bound(tc.length()?, s.encode_utf16().count()),
        (TCKind::Enum, Value::Enum(ordinal)) => (*ordinal as usize) < tc.member_count()?,
        (TCKind::Struct | TCKind::Except, Value::Struct(members)) => {
            if members.len() != tc.member_count()? {
                return Err(Error::value_kind(
                    format!("{} members", tc.member_count()?),
                    format!("{} members", members.len()),
                ));
            }
            for (index, member) in members.iter().enumerate() {
                conforms(&tc.member_type(index)?, member)?;
            }
            true
        }
        (
            TCKind::Union,
            Value::Union {
                discriminator,
                value,
            },
        ) => {
            conforms(&tc.discriminator_type()?, discriminator)?;
            let index = tc
                .member_index_for(discriminator)?
                .ok_or_else(|| Error::value_kind("union branch", format!("label {}", discriminator)))?;
            conforms(&tc.member_type(index)?, value)?;
            true
        }
        (TCKind::Sequence, Value::Sequence(items)) => {
            if !within_bound(tc.length()?, items.len()) {
                return Err(Error::value_kind(
                    format!("at most {} elements", tc.length()?),
                    format!("{} elements", items.len()),
                ));
            }
            let content = tc.content_type()?;
            items.iter().try_for_each(|item| conforms(&content, item))?;
            true
        }
        (TCKind::Array, Value::Array(items)) => {
            if items.len() != tc.length()? as usize {
                return Err(Error::value_kind(
                    format!("{} elements", tc.length()?),
                    format!("{} elements", items.len()),
                ));
            }
            let content = tc.content_type()?;
            items.iter().try_for_each(|item| conforms(&content, item))?;
            true
        }
        (TCKind::ValueBox, Value::ValueBox(boxed)) => {
            if let Some(inner) = boxed {
                conforms(&tc.content_type()?, inner)?;
            }
            true
        }
        (TCKind::Value, Value::ValueType(state)) => {
            if let Some(state) = state {
                let members = state_members(&tc)?;
                if members.len() != state.len() {
                    return Err(Error::value_kind(
                        format!("{} state members", members.len()),
                        format!("{} state members", state.len()),
                    ));
                }
                for (member_tc, member) in members.iter().zip(state) {
                    conforms(member_tc, member)?;
                }
            }
            true
        }
        (TCKind::Native, _) => return Err(Error::Unsupported { op: "native value" }),
        (TCKind::Principal, _) => return Err(Error::Unsupported { op: "principal value" }),
        (TCKind::Fixed, _) => return Err(Error::Unsupported { op: "fixed value" }),
        (TCKind::LongDouble, _) => return Err(Error::Unsupported { op: "long double value" }),
        _ => false,
    };

    if ok {
        Ok(())
    } else {
        Err(mismatch(&tc, value))
    }
}
