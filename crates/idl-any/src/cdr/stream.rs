// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Little-endian CDR streams backed by a byte buffer.
//!
//! Primitives are aligned to their natural size relative to the current
//! alignment origin (the start of the buffer, or the byte-order octet of
//! the innermost encapsulation).

use super::{len_u32, InputStream, OutputStream};
use crate::error::{Error, Result};
use crate::typecode::TypeCode;

/// Byte-order flag of a little-endian encapsulation.
pub(crate) const LITTLE_ENDIAN: u8 = 1;

/// Generate aligned little-endian write methods.
macro_rules! impl_write_le {
    ($name:ident, $type:ty, $size:expr) => {
        fn $name(&mut self, value: $type) -> Result<()> {
            self.align($size);
            self.buffer.extend_from_slice(&value.to_le_bytes());
            Ok(())
        }
    };
}

/// Generate aligned little-endian read methods.
macro_rules! impl_read_le {
    ($name:ident, $type:ty, $size:expr) => {
        fn $name(&mut self) -> Result<$type> {
            self.align($size);
            let bytes = self.read_bytes($size)?;
            let mut raw = [0u8; $size];
            raw.copy_from_slice(bytes);
            Ok(<$type>::from_le_bytes(raw))
        }
    };
}

/// Growable CDR writer.
#[derive(Debug, Default)]
pub struct CdrOutputStream {
    buffer: Vec<u8>,
    origins: Vec<usize>,
}

impl CdrOutputStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writer whose content starts with a little-endian byte-order octet,
    /// suitable for [`CdrInputStream::from_encapsulation`].
    pub fn encapsulated() -> Self {
        Self {
            buffer: vec![LITTLE_ENDIAN],
            origins: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    fn origin(&self) -> usize {
        self.origins.last().copied().unwrap_or(0)
    }

    pub(crate) fn align(&mut self, alignment: usize) {
        let relative = self.buffer.len() - self.origin();
        let padding = (alignment - (relative % alignment)) % alignment;
        self.buffer.resize(self.buffer.len() + padding, 0);
    }

    pub(crate) fn position(&self) -> usize {
        self.buffer.len()
    }

    /// Open an encapsulation; returns the position of its length field.
    pub(crate) fn begin_encapsulation(&mut self) -> usize {
        self.align(4);
        let length_at = self.buffer.len();
        self.buffer.extend_from_slice(&[0; 4]);
        self.origins.push(self.buffer.len());
        self.buffer.push(LITTLE_ENDIAN);
        length_at
    }

    /// Close the innermost encapsulation and patch its length.
    pub(crate) fn end_encapsulation(&mut self, length_at: usize) -> Result<()> {
        self.origins.pop();
        let length = len_u32(self.buffer.len() - length_at - 4)?;
        self.buffer[length_at..length_at + 4].copy_from_slice(&length.to_le_bytes());
        Ok(())
    }
}

impl OutputStream for CdrOutputStream {
    impl_write_le!(write_short, i16, 2);
    impl_write_le!(write_ushort, u16, 2);
    impl_write_le!(write_long, i32, 4);
    impl_write_le!(write_ulong, u32, 4);
    impl_write_le!(write_longlong, i64, 8);
    impl_write_le!(write_ulonglong, u64, 8);
    impl_write_le!(write_float, f32, 4);
    impl_write_le!(write_double, f64, 8);

    fn write_boolean(&mut self, value: bool) -> Result<()> {
        self.buffer.push(u8::from(value));
        Ok(())
    }

    fn write_char(&mut self, value: char) -> Result<()> {
        let byte = u8::try_from(u32::from(value))
            .map_err(|_| Error::mismatch(format!("char {:?} is not ISO-8859-1", value)))?;
        self.buffer.push(byte);
        Ok(())
    }

    fn write_wchar(&mut self, value: char) -> Result<()> {
        let mut units = [0u16; 2];
        let encoded = value.encode_utf16(&mut units);
        if encoded.len() != 1 {
            return Err(Error::mismatch(format!(
                "wchar {:?} needs a surrogate pair",
                value
            )));
        }
        self.write_ushort(encoded[0])
    }

    fn write_octet(&mut self, value: u8) -> Result<()> {
        self.buffer.push(value);
        Ok(())
    }

    fn write_string(&mut self, value: &str) -> Result<()> {
        let bytes = value.as_bytes();
        // Length includes the terminator.
        self.write_ulong(len_u32(bytes.len() + 1)?)?;
        self.buffer.extend_from_slice(bytes);
        self.buffer.push(0);
        Ok(())
    }

    fn write_wstring(&mut self, value: &str) -> Result<()> {
        let units: Vec<u16> = value.encode_utf16().collect();
        self.write_ulong(len_u32(units.len())?)?;
        for unit in units {
            self.buffer.extend_from_slice(&unit.to_le_bytes());
        }
        Ok(())
    }

    fn write_octets(&mut self, value: &[u8]) -> Result<()> {
        self.buffer.extend_from_slice(value);
        Ok(())
    }

    fn write_typecode(&mut self, tc: &TypeCode) -> Result<()> {
        super::typecode::write(self, tc)
    }
}

/// CDR reader over a borrowed buffer.
#[derive(Debug)]
pub struct CdrInputStream<'a> {
    buffer: &'a [u8],
    offset: usize,
    origins: Vec<usize>,
}

impl<'a> CdrInputStream<'a> {
    /// Reader over a plain CDR body aligned from the first byte.
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            offset: 0,
            origins: Vec::new(),
        }
    }

    /// Reader over an encapsulation: a byte-order octet followed by the
    /// body. Only little-endian encapsulations are accepted.
    pub fn from_encapsulation(buffer: &'a [u8]) -> Result<Self> {
        let mut stream = Self::new(buffer);
        let order = stream.read_octet()?;
        if order != LITTLE_ENDIAN {
            return Err(Error::mismatch("big-endian encapsulation"));
        }
        Ok(stream)
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    pub(crate) fn position(&self) -> usize {
        self.offset
    }

    fn origin(&self) -> usize {
        self.origins.last().copied().unwrap_or(0)
    }

    /// Skip padding; never moves past the end of the buffer.
    pub(crate) fn align(&mut self, alignment: usize) {
        let relative = self.offset - self.origin();
        let padding = (alignment - (relative % alignment)) % alignment;
        self.offset = (self.offset + padding).min(self.buffer.len());
    }

    fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        if count > self.remaining() {
            return Err(Error::mismatch(format!(
                "need {} bytes at offset {}, have {}",
                count,
                self.offset,
                self.remaining()
            )));
        }
        let slice = &self.buffer[self.offset..self.offset + count];
        self.offset += count;
        Ok(slice)
    }

    /// Enter an encapsulation; returns the offset just past its end.
    pub(crate) fn begin_encapsulation(&mut self) -> Result<usize> {
        let length = self.read_ulong()? as usize;
        if length == 0 || length > self.remaining() {
            return Err(Error::mismatch(format!(
                "encapsulation length {} with {} bytes left",
                length,
                self.remaining()
            )));
        }
        let start = self.offset;
        if self.read_octet()? != LITTLE_ENDIAN {
            return Err(Error::mismatch("big-endian encapsulation"));
        }
        self.origins.push(start);
        Ok(start + length)
    }

    pub(crate) fn end_encapsulation(&mut self, end: usize) -> Result<()> {
        self.origins.pop();
        if self.offset > end {
            return Err(Error::mismatch("encapsulation overrun"));
        }
        self.offset = end;
        Ok(())
    }
}

impl InputStream for CdrInputStream<'_> {
    impl_read_le!(read_short, i16, 2);
    impl_read_le!(read_ushort, u16, 2);
    impl_read_le!(read_long, i32, 4);
    impl_read_le!(read_ulong, u32, 4);
    impl_read_le!(read_longlong, i64, 8);
    impl_read_le!(read_ulonglong, u64, 8);
    impl_read_le!(read_float, f32, 4);
    impl_read_le!(read_double, f64, 8);

    fn read_boolean(&mut self) -> Result<bool> {
        match self.read_octet()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(Error::mismatch(format!("boolean octet {}", other))),
        }
    }

    fn read_char(&mut self) -> Result<char> {
        self.read_octet().map(char::from)
    }

    fn read_wchar(&mut self) -> Result<char> {
        let unit = self.read_ushort()?;
        char::from_u32(u32::from(unit))
            .ok_or_else(|| Error::mismatch(format!("unpaired surrogate 0x{:04x}", unit)))
    }

    fn read_octet(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    fn read_string(&mut self) -> Result<String> {
        let length = self.read_ulong()? as usize;
        let bytes = self.read_bytes(length)?;
        match bytes.split_last() {
            Some((&0, text)) => String::from_utf8(text.to_vec())
                .map_err(|e| Error::mismatch(format!("string is not UTF-8: {}", e))),
            _ => Err(Error::mismatch("string without terminator")),
        }
    }

    fn read_wstring(&mut self) -> Result<String> {
        let count = self.read_ulong()? as usize;
        let bytes = self.read_bytes(count.saturating_mul(2))?;
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16(&units).map_err(|e| Error::mismatch(format!("wstring: {}", e)))
    }

    fn read_octets(&mut self, len: usize) -> Result<Vec<u8>> {
        self.read_bytes(len).map(<[u8]>::to_vec)
    }

    fn read_typecode(&mut self) -> Result<TypeCode> {
        super::typecode::read(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment() {
        let mut out = CdrOutputStream::new();
        out.write_octet(7).unwrap();
        out.write_long(-2).unwrap();
        out.write_octet(1).unwrap();
        out.write_double(1.5).unwrap();
        assert_eq!(out.len(), 24);
        assert_eq!(&out.as_bytes()[..8], &[7, 0, 0, 0, 0xfe, 0xff, 0xff, 0xff]);

        let bytes = out.into_bytes();
        let mut input = CdrInputStream::new(&bytes);
        assert_eq!(input.read_octet().unwrap(), 7);
        assert_eq!(input.read_long().unwrap(), -2);
        assert_eq!(input.read_octet().unwrap(), 1);
        assert_eq!(input.read_double().unwrap(), 1.5);
        assert_eq!(input.remaining(), 0);
    }

    #[test]
    fn test_string_layout() {
        let mut out = CdrOutputStream::new();
        out.write_string("ab").unwrap();
        assert_eq!(out.as_bytes(), &[3, 0, 0, 0, b'a', b'b', 0]);

        let bytes = out.into_bytes();
        let mut input = CdrInputStream::new(&bytes);
        assert_eq!(input.read_string().unwrap(), "ab");
    }

    #[test]
    fn test_string_without_terminator() {
        let bytes = [2, 0, 0, 0, b'a', b'b'];
        let mut input = CdrInputStream::new(&bytes);
        assert!(matches!(
            input.read_string(),
            Err(Error::EncodingMismatch { .. })
        ));
    }

    #[test]
    fn test_wide_text() {
        let mut out = CdrOutputStream::new();
        out.write_wchar('\u{e9}').unwrap();
        out.write_wstring("h\u{e9}").unwrap();
        let bytes = out.into_bytes();
        let mut input = CdrInputStream::new(&bytes);
        assert_eq!(input.read_wchar().unwrap(), '\u{e9}');
        assert_eq!(input.read_wstring().unwrap(), "h\u{e9}");
    }

    #[test]
    fn test_char_outside_latin1() {
        let mut out = CdrOutputStream::new();
        assert!(out.write_char('\u{20ac}').is_err());
        assert!(out.write_wchar('\u{1f600}').is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn test_underflow() {
        let bytes = [1, 2];
        let mut input = CdrInputStream::new(&bytes);
        assert!(matches!(
            input.read_long(),
            Err(Error::EncodingMismatch { .. })
        ));
    }

    #[test]
    fn test_invalid_boolean() {
        let bytes = [2];
        let mut input = CdrInputStream::new(&bytes);
        assert!(input.read_boolean().is_err());
    }

    #[test]
    fn test_encapsulation_alignment_and_length() {
        let mut out = CdrOutputStream::new();
        out.write_octet(9).unwrap();
        let length_at = out.begin_encapsulation();
        // Body: byte order at origin, then a long aligned from the origin.
        out.write_long(5).unwrap();
        out.end_encapsulation(length_at).unwrap();

        let bytes = out.into_bytes();
        assert_eq!(&bytes[4..8], &[8, 0, 0, 0]);
        assert_eq!(bytes[8], LITTLE_ENDIAN);

        let mut input = CdrInputStream::new(&bytes);
        input.read_octet().unwrap();
        let end = input.begin_encapsulation().unwrap();
        assert_eq!(input.read_long().unwrap(), 5);
        input.end_encapsulation(end).unwrap();
        assert_eq!(input.remaining(), 0);
    }

    #[test]
    fn test_big_endian_rejected() {
        let bytes = [0, 1, 0, 0, 0];
        assert!(matches!(
            CdrInputStream::from_encapsulation(&bytes),
            Err(Error::EncodingMismatch { .. })
        ));

        let bytes = [LITTLE_ENDIAN, 0, 0, 0, 5, 0, 0, 0];
        let mut input = CdrInputStream::from_encapsulation(&bytes).unwrap();
        assert_eq!(input.read_long().unwrap(), 5);
    }

    #[test]
    fn test_padding_stops_at_end_of_buffer() {
        let bytes = [9, 0];
        let mut input = CdrInputStream::new(&bytes);
        assert_eq!(input.read_octet().unwrap(), 9);
        assert!(matches!(
            input.read_double(),
            Err(Error::EncodingMismatch { .. })
        ));
        assert_eq!(input.position(), bytes.len());
        assert_eq!(input.remaining(), 0);
        assert_eq!(input.read_octets(0).unwrap(), Vec::<u8>::new());
        assert!(input.read_octet().is_err());
    }
}
