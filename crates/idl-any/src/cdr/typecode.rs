// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! CDR encoding of TypeCodes.
//!
//! Layout per kind:
//!
//! | Kind                       | Parameters                                      |
//! |----------------------------|-------------------------------------------------|
//! | parameterless              | none                                            |
//! | string, wstring            | ulong bound                                     |
//! | fixed                      | ushort digits, short scale                      |
//! | objref, native, abstract   | encapsulation { id, name }                      |
//! | struct, exception          | encapsulation { id, name, count, {name, type} } |
//! | union                      | encapsulation { id, name, discriminator,        |
//! |                            |   long default, count, {label, name, type} }    |
//! | enum                       | encapsulation { id, name, count, {name} }       |
//! | sequence, array            | encapsulation { content, ulong bound }          |
//! | alias, value box           | encapsulation { id, name, content }             |
//! | value                      | encapsulation { id, name, short modifier, base, |
//! |                            |   count, {name, type, short visibility} }       |
//!
//! A recursive reference is the kind `0xffffffff` followed by a long
//! offset, relative to the offset field, back to the kind field of the
//! enclosing TypeCode.

use super::stream::{CdrInputStream, CdrOutputStream};
use super::{len_u32, InputStream, OutputStream, MAX_NESTING_DEPTH};
use crate::any::marshal;
use crate::error::{Error, Result};
use crate::typecode::{
    ParamLayout, StructMember, TCKind, TypeCode, UnionLabel, UnionMember, ValueMember,
    ValueModifier, Visibility,
};
use std::collections::HashMap;

const INDIRECTION: u32 = TCKind::Recursive.to_u32();

pub(crate) fn write(out: &mut CdrOutputStream, tc: &TypeCode) -> Result<()> {
    Encoder {
        out,
        positions: HashMap::new(),
    }
    .write(tc)
}

pub(crate) fn read(input: &mut CdrInputStream<'_>) -> Result<TypeCode> {
    Decoder {
        input,
        slots: HashMap::new(),
        depth: 0,
    }
    .read()
}

struct Encoder<'s> {
    out: &'s mut CdrOutputStream,
    /// Repository id -> position of the kind field.
    positions: HashMap<String, usize>,
}

impl Encoder<'_> {
    fn write(&mut self, tc: &TypeCode) -> Result<()> {
        if let Ok(id) = tc.recursive_id() {
            if let Some(&target) = self.positions.get(id) {
                return self.write_indirection(target);
            }
            // Reference to an aggregate outside this TypeCode: inline it.
            return self.write(&tc.resolved()?);
        }

        let kind = tc.kind();
        match kind {
            TCKind::Principal => return Err(Error::Unsupported { op: "principal TypeCode" }),
            TCKind::Native => return Err(Error::Unsupported { op: "native TypeCode" }),
            _ => {}
        }

        self.out.align(4);
        let position = self.out.position();
        self.out.write_ulong(kind.to_u32())?;

        match kind.param_layout() {
            ParamLayout::Empty => Ok(()),
            ParamLayout::Simple => {
                if kind == TCKind::Fixed {
                    self.out.write_ushort(tc.fixed_digits()?)?;
                    self.out.write_short(tc.fixed_scale()?)
                } else {
                    self.out.write_ulong(tc.length()?)
                }
            }
            ParamLayout::Complex => {
                if kind.has_id() {
                    self.positions.insert(tc.id()?, position);
                }
                let length_at = self.out.begin_encapsulation();
                self.write_body(tc, kind)?;
                self.out.end_encapsulation(length_at)
            }
        }
    }

    fn write_indirection(&mut self, target: usize) -> Result<()> {
        self.out.align(4);
        self.out.write_ulong(INDIRECTION)?;
        let at = self.out.position();
        let offset = i32::try_from(target as i64 - at as i64)
            .map_err(|_| Error::mismatch("indirection offset out of range"))?;
        self.out.write_long(offset)
    }

    fn write_body(&mut self, tc: &TypeCode, kind: TCKind) -> Result<()> {
        if kind.has_id() {
            self.out.write_string(&tc.id()?)?;
            self.out.write_string(&tc.name()?)?;
        }

        match kind {
            TCKind::Struct | TCKind::Except => {
                let count = tc.member_count()?;
                self.out.write_ulong(len_u32(count)?)?;
                for index in 0..count {
                    self.out.write_string(&tc.member_name(index)?)?;
                    self.write(&tc.member_type(index)?)?;
                }
            }
            TCKind::Union => {
                let discriminator = tc.discriminator_type()?;
                self.write(&discriminator)?;
                self.out.write_long(tc.default_index()?)?;
                let count = tc.member_count()?;
                self.out.write_ulong(len_u32(count)?)?;
                for index in 0..count {
                    match tc.member_label(index)? {
                        UnionLabel::Default => self.out.write_octet(0)?,
                        UnionLabel::Value(label) => {
                            marshal::write(&mut *self.out, &discriminator, &label)?
                        }
                    }
                    self.out.write_string(&tc.member_name(index)?)?;
                    self.write(&tc.member_type(index)?)?;
                }
            }
            TCKind::Enum => {
                let count = tc.member_count()?;
                self.out.write_ulong(len_u32(count)?)?;
                for index in 0..count {
                    self.out.write_string(&tc.member_name(index)?)?;
                }
            }
            TCKind::Sequence | TCKind::Array => {
                self.write(&tc.content_type()?)?;
                self.out.write_ulong(tc.length()?)?;
            }
            TCKind::Alias | TCKind::ValueBox => {
                self.write(&tc.content_type()?)?;
            }
            TCKind::Value => {
                self.out.write_short(tc.type_modifier()?.to_i16())?;
                match tc.concrete_base_type()? {
                    Some(base) => self.write(&base)?,
                    None => self.write(&TypeCode::null())?,
                }
                let count = tc.member_count()?;
                self.out.write_ulong(len_u32(count)?)?;
                for index in 0..count {
                    self.out.write_string(&tc.member_name(index)?)?;
                    self.write(&tc.member_type(index)?)?;
                    self.out.write_short(tc.member_visibility(index)?.to_i16())?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

enum Slot {
    /// Still being decoded; indirections yield a placeholder.
    Pending(String),
    Done(TypeCode),
}

struct Decoder<'s, 'a> {
    input: &'s mut CdrInputStream<'a>,
    /// Position of the kind field -> TypeCode started there.
    slots: HashMap<usize, Slot>,
    depth: usize,
}

impl Decoder<'_, '_> {
    fn read(&mut self) -> Result<TypeCode> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(Error::mismatch(format!(
                "TypeCode nesting exceeds {} levels",
                MAX_NESTING_DEPTH
            )));
        }
        self.depth += 1;
        let tc = self.read_kind();
        self.depth -= 1;
        tc
    }

    fn read_kind(&mut self) -> Result<TypeCode> {
        self.input.align(4);
        let position = self.input.position();
        let raw = self.input.read_ulong()?;

        if raw == INDIRECTION {
            return self.read_indirection();
        }

        let kind = TCKind::from_u32(raw)
            .ok_or_else(|| Error::mismatch(format!("unknown TypeCode kind {}", raw)))?;

        match kind.param_layout() {
            ParamLayout::Empty if kind == TCKind::Principal => {
                Err(Error::Unsupported { op: "principal TypeCode" })
            }
            ParamLayout::Empty => Ok(TypeCode::canonical(kind)),
            ParamLayout::Simple => match kind {
                TCKind::Fixed => {
                    let digits = self.input.read_ushort()?;
                    let scale = self.input.read_short()?;
                    Ok(TypeCode::fixed(digits, scale))
                }
                TCKind::WString => Ok(TypeCode::wstring(self.input.read_ulong()?)),
                _ => Ok(TypeCode::string(self.input.read_ulong()?)),
            },
            ParamLayout::Complex if kind == TCKind::Native => {
                Err(Error::Unsupported { op: "native TypeCode" })
            }
            ParamLayout::Complex => {
                let end = self.input.begin_encapsulation()?;
                let tc = self.read_body(kind, position)?;
                self.input.end_encapsulation(end)?;
                self.slots.insert(position, Slot::Done(tc.clone()));
                Ok(tc)
            }
        }
    }

    fn read_indirection(&mut self) -> Result<TypeCode> {
        let at = self.input.position();
        let offset = self.input.read_long()?;
        if offset > -4 {
            return Err(Error::mismatch(format!("indirection offset {}", offset)));
        }
        let target = usize::try_from(at as i64 + i64::from(offset))
            .map_err(|_| Error::mismatch("indirection before start of stream"))?;
        match self.slots.get(&target) {
            Some(Slot::Pending(id)) => {
                log::debug!("[cdr] indirection to enclosing TypeCode '{}'", id);
                Ok(TypeCode::recursive(id.clone()))
            }
            Some(Slot::Done(tc)) => Ok(tc.clone()),
            None => Err(Error::mismatch(format!(
                "indirection to offset {} does not start a TypeCode",
                target
            ))),
        }
    }

    fn read_named(&mut self, position: usize) -> Result<(String, String)> {
        let id = self.input.read_string()?;
        let name = self.input.read_string()?;
        self.slots.insert(position, Slot::Pending(id.clone()));
        Ok((id, name))
    }

    fn read_count(&mut self) -> Result<usize> {
        let count = self.input.read_ulong()? as usize;
        // Every member needs at least one byte.
        if count > self.input.remaining() {
            return Err(Error::mismatch(format!("member count {} exceeds stream", count)));
        }
        Ok(count)
    }

    fn read_body(&mut self, kind: TCKind, position: usize) -> Result<TypeCode> {
        match kind {
            TCKind::ObjRef => {
                let (id, name) = self.read_named(position)?;
                Ok(TypeCode::object_ref(id, name))
            }
            TCKind::AbstractInterface => {
                let (id, name) = self.read_named(position)?;
                Ok(TypeCode::abstract_interface(id, name))
            }
            TCKind::Struct | TCKind::Except => {
                let (id, name) = self.read_named(position)?;
                let count = self.read_count()?;
                let mut members = Vec::with_capacity(count);
                for _ in 0..count {
                    let member = self.input.read_string()?;
                    members.push(StructMember::new(member, self.read()?));
                }
                if kind == TCKind::Struct {
                    Ok(TypeCode::struct_tc(id, name, members))
                } else {
                    Ok(TypeCode::exception_tc(id, name, members))
                }
            }
            TCKind::Union => {
                let (id, name) = self.read_named(position)?;
                let discriminator = self.read()?;
                let default_index = self.input.read_long()?;
                let count = self.read_count()?;
                let mut members = Vec::with_capacity(count);
                for index in 0..count {
                    let is_default = usize::try_from(default_index).ok() == Some(index);
                    let label = if is_default {
                        self.input.read_octet()?;
                        UnionLabel::Default
                    } else {
                        UnionLabel::Value(marshal::read(&mut *self.input, &discriminator)?)
                    };
                    let member = self.input.read_string()?;
                    members.push(UnionMember {
                        name: member,
                        label,
                        type_code: self.read()?,
                    });
                }
                TypeCode::union_tc(id, name, discriminator, members)
                    .map_err(|e| Error::mismatch(format!("invalid union TypeCode: {}", e)))
            }
            TCKind::Enum => {
                let (id, name) = self.read_named(position)?;
                let count = self.read_count()?;
                let mut members = Vec::with_capacity(count);
                for _ in 0..count {
                    members.push(self.input.read_string()?);
                }
                Ok(TypeCode::enum_tc(id, name, members))
            }
            TCKind::Sequence => {
                let content = self.read()?;
                Ok(TypeCode::sequence(self.input.read_ulong()?, content))
            }
            TCKind::Array => {
                let content = self.read()?;
                Ok(TypeCode::array(self.input.read_ulong()?, content))
            }
            TCKind::Alias => {
                let (id, name) = self.read_named(position)?;
                Ok(TypeCode::alias(id, name, self.read()?))
            }
            TCKind::ValueBox => {
                let (id, name) = self.read_named(position)?;
                Ok(TypeCode::value_box(id, name, self.read()?))
            }
            TCKind::Value => {
                let (id, name) = self.read_named(position)?;
                let raw = self.input.read_short()?;
                let modifier = ValueModifier::from_i16(raw)
                    .ok_or_else(|| Error::mismatch(format!("value modifier {}", raw)))?;
                let base = self.read()?;
                let base = (base.kind() != TCKind::Null).then_some(base);
                let count = self.read_count()?;
                let mut members = Vec::with_capacity(count);
                for _ in 0..count {
                    let member = self.input.read_string()?;
                    let type_code = self.read()?;
                    let raw = self.input.read_short()?;
                    let visibility = Visibility::from_i16(raw)
                        .ok_or_else(|| Error::mismatch(format!("member visibility {}", raw)))?;
                    members.push(ValueMember::new(member, type_code, visibility));
                }
                Ok(TypeCode::value_tc(id, name, modifier, base, members))
            }
            other => Err(Error::mismatch(format!(
                "kind {} has no encapsulated parameters",
                other
            ))),
        }
    }
}
