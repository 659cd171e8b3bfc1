// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Stream contract used by [`Any`] marshaling, and a CDR implementation.
//!
//! [`OutputStream`] and [`InputStream`] are ordered, typed primitive
//! writers/readers. [`Any`] never assumes a byte layout beyond what these
//! traits expose; [`CdrOutputStream`]/[`CdrInputStream`] are the
//! little-endian CDR implementations shipped with the crate.

mod stream;
mod typecode;

pub use stream::{CdrInputStream, CdrOutputStream};

use crate::any::{Any, ObjectRef, TaggedProfile};
use crate::error::Result;
use crate::typecode::TypeCode;

/// Ordered writer of IDL primitives.
pub trait OutputStream {
    fn write_boolean(&mut self, value: bool) -> Result<()>;
    /// Narrow char; fails for characters outside ISO-8859-1.
    fn write_char(&mut self, value: char) -> Result<()>;
    /// Wide char; fails for characters outside the basic multilingual plane.
    fn write_wchar(&mut self, value: char) -> Result<()>;
    fn write_octet(&mut self, value: u8) -> Result<()>;
    fn write_short(&mut self, value: i16) -> Result<()>;
    fn write_ushort(&mut self, value: u16) -> Result<()>;
    fn write_long(&mut self, value: i32) -> Result<()>;
    fn write_ulong(&mut self, value: u32) -> Result<()>;
    fn write_longlong(&mut self, value: i64) -> Result<()>;
    fn write_ulonglong(&mut self, value: u64) -> Result<()>;
    fn write_float(&mut self, value: f32) -> Result<()>;
    fn write_double(&mut self, value: f64) -> Result<()>;
    fn write_string(&mut self, value: &str) -> Result<()>;
    fn write_wstring(&mut self, value: &str) -> Result<()>;
    /// Raw octets, no length prefix.
    fn write_octets(&mut self, value: &[u8]) -> Result<()>;
    fn write_typecode(&mut self, tc: &TypeCode) -> Result<()>;

    /// Nested Any: its TypeCode followed by its value.
    fn write_any(&mut self, any: &Any) -> Result<()> {
        self.write_typecode(&any.type_code())?;
        crate::any::marshal::write_payload(self, any)
    }

    /// Object reference: type id, then `{tag, octet sequence}` profiles.
    fn write_object(&mut self, obj: &ObjectRef) -> Result<()> {
        self.write_string(&obj.type_id)?;
        self.write_ulong(len_u32(obj.profiles.len())?)?;
        for profile in &obj.profiles {
            self.write_ulong(profile.tag)?;
            self.write_ulong(len_u32(profile.data.len())?)?;
            self.write_octets(&profile.data)?;
        }
        Ok(())
    }
}

/// Ordered reader of IDL primitives, symmetric to [`OutputStream`].
pub trait InputStream {
    fn read_boolean(&mut self) -> Result<bool>;
    fn read_char(&mut self) -> Result<char>;
    fn read_wchar(&mut self) -> Result<char>;
    fn read_octet(&mut self) -> Result<u8>;
    fn read_short(&mut self) -> Result<i16>;
    fn read_ushort(&mut self) -> Result<u16>;
    fn read_long(&mut self) -> Result<i32>;
    fn read_ulong(&mut self) -> Result<u32>;
    fn read_longlong(&mut self) -> Result<i64>;
    fn read_ulonglong(&mut self) -> Result<u64>;
    fn read_float(&mut self) -> Result<f32>;
    fn read_double(&mut self) -> Result<f64>;
    fn read_string(&mut self) -> Result<String>;
    fn read_wstring(&mut self) -> Result<String>;
    /// Exactly `len` raw octets.
    fn read_octets(&mut self, len: usize) -> Result<Vec<u8>>;
    fn read_typecode(&mut self) -> Result<TypeCode>;

    fn read_any(&mut self) -> Result<Any> {
        let tc = self.read_typecode()?;
        let mut any = Any::new();
        any.read_value(self, tc)?;
        Ok(any)
    }

    fn read_object(&mut self) -> Result<ObjectRef> {
        let type_id = self.read_string()?;
        let count = self.read_ulong()?;
        let mut profiles = Vec::with_capacity((count as usize).min(16));
        for _ in 0..count {
            let tag = self.read_ulong()?;
            let len = self.read_ulong()? as usize;
            let data = self.read_octets(len)?;
            profiles.push(TaggedProfile { tag, data });
        }
        Ok(ObjectRef { type_id, profiles })
    }
}

/// Statically generated holder for a value of a known IDL type.
///
/// [`Any`] does not accept streamables; see [`Any::insert_streamable`].
pub trait Streamable {
    fn type_code(&self) -> TypeCode;
    fn write_to(&self, out: &mut dyn OutputStream) -> Result<()>;
    fn read_from(&mut self, input: &mut dyn InputStream) -> Result<()>;
}

/// Deepest nesting of TypeCodes or values accepted from a stream.
pub(crate) const MAX_NESTING_DEPTH: usize = 256;

pub(crate) fn len_u32(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| crate::error::Error::mismatch("length exceeds ulong range"))
}
