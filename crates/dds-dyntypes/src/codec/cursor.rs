// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Read/write cursors for CDR buffer manipulation.

use super::{CodecError, CodecResult};

/// Generate write methods for primitive types.
///
/// Each generated method converts the value to little-endian bytes via
/// `to_le_bytes()` and appends them; the buffer grows as needed.
macro_rules! impl_write_le {
    ($name:ident, $type:ty) => {
        pub fn $name(&mut self, value: $type) {
            self.buffer.extend_from_slice(&value.to_le_bytes());
        }
    };
}

/// Generate read methods for primitive types.
///
/// Each generated method:
/// 1. Checks buffer bounds (returns `CodecError::ReadFailed` if short)
/// 2. Reads N bytes and converts via `from_le_bytes()`
/// 3. Advances the offset
macro_rules! impl_read_le {
    ($name:ident, $type:ty, $size:expr) => {
        pub fn $name(&mut self) -> CodecResult<$type> {
            if self.offset + $size > self.buffer.len() {
                return Err(CodecError::ReadFailed {
                    offset: self.offset,
                    reason: "unexpected end of buffer".into(),
                });
            }
            let mut bytes = [0u8; $size];
            bytes.copy_from_slice(&self.buffer[self.offset..self.offset + $size]);
            self.offset += $size;
            Ok(<$type>::from_le_bytes(bytes))
        }
    };
}

/// Growable write cursor. Writes are infallible; alignment pads with
/// zero bytes so the cursor position stays the source of truth.
#[derive(Default)]
pub struct Writer {
    buffer: Vec<u8>,
}

impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    impl_write_le!(write_u8, u8);
    impl_write_le!(write_u16_le, u16);
    impl_write_le!(write_u32_le, u32);
    impl_write_le!(write_u64_le, u64);
    impl_write_le!(write_i8, i8);
    impl_write_le!(write_i16_le, i16);
    impl_write_le!(write_i32_le, i32);
    impl_write_le!(write_i64_le, i64);

    pub fn write_f32_le(&mut self, value: f32) {
        self.write_u32_le(value.to_bits());
    }

    pub fn write_f64_le(&mut self, value: f64) {
        self.write_u64_le(value.to_bits());
    }

    pub fn write_bytes(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    pub fn position(&self) -> usize {
        self.buffer.len()
    }

    /// Pad with zeros up to the given power-of-two boundary.
    pub fn align(&mut self, alignment: usize) {
        if alignment <= 1 {
            return;
        }
        let mask = alignment - 1;
        let aligned = (self.buffer.len() + mask) & !mask;
        self.buffer.resize(aligned, 0);
    }

    /// Overwrite a previously reserved u32 slot.
    pub fn patch_u32_le(&mut self, position: usize, value: u32) -> CodecResult<()> {
        if position + 4 > self.buffer.len() {
            return Err(CodecError::WriteFailed {
                offset: position,
                reason: "patch past end of buffer".into(),
            });
        }
        self.buffer[position..position + 4].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buffer
    }
}

/// Immutable read cursor over a received buffer.
pub struct Reader<'a> {
    buffer: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, offset: 0 }
    }

    impl_read_le!(read_u8, u8, 1);
    impl_read_le!(read_u16_le, u16, 2);
    impl_read_le!(read_u32_le, u32, 4);
    impl_read_le!(read_u64_le, u64, 8);
    impl_read_le!(read_i8, i8, 1);
    impl_read_le!(read_i16_le, i16, 2);
    impl_read_le!(read_i32_le, i32, 4);
    impl_read_le!(read_i64_le, i64, 8);

    pub fn read_f32_le(&mut self) -> CodecResult<f32> {
        Ok(f32::from_bits(self.read_u32_le()?))
    }

    pub fn read_f64_le(&mut self) -> CodecResult<f64> {
        Ok(f64::from_bits(self.read_u64_le()?))
    }

    pub fn read_bytes(&mut self, len: usize) -> CodecResult<&'a [u8]> {
        if self.offset + len > self.buffer.len() {
            return Err(CodecError::ReadFailed {
                offset: self.offset,
                reason: "unexpected end of buffer".into(),
            });
        }
        let slice = &self.buffer[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    pub fn skip(&mut self, len: usize) -> CodecResult<()> {
        self.read_bytes(len).map(|_| ())
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    /// Advance to the given power-of-two boundary.
    pub fn align(&mut self, alignment: usize) -> CodecResult<()> {
        if alignment <= 1 {
            return Ok(());
        }
        let mask = alignment - 1;
        let aligned = (self.offset + mask) & !mask;
        if aligned > self.buffer.len() {
            return Err(CodecError::ReadFailed {
                offset: self.offset,
                reason: "alignment past end of buffer".into(),
            });
        }
        self.offset = aligned;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_alignment_pads_zeros() {
        let mut w = Writer::new();
        w.write_u8(0xFF);
        w.align(4);
        w.write_u32_le(0x1122_3344);
        assert_eq!(w.into_vec(), [0xFF, 0, 0, 0, 0x44, 0x33, 0x22, 0x11]);
    }

    #[test]
    fn test_reader_round_trip() {
        let mut w = Writer::new();
        w.write_u16_le(7);
        w.align(8);
        w.write_f64_le(1.5);
        let buf = w.into_vec();

        let mut r = Reader::new(&buf);
        assert_eq!(r.read_u16_le(), Ok(7));
        r.align(8).expect("align");
        assert_eq!(r.read_f64_le(), Ok(1.5));
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_reader_bounds() {
        let buf = [1u8, 2];
        let mut r = Reader::new(&buf);
        assert!(r.read_u32_le().is_err());
        assert_eq!(r.read_u16_le(), Ok(0x0201));
    }

    #[test]
    fn test_patch_u32() {
        let mut w = Writer::new();
        w.write_u32_le(0);
        w.write_u8(9);
        w.patch_u32_le(0, 42).expect("patch");
        assert_eq!(w.into_vec(), [42, 0, 0, 0, 9]);
        let mut w = Writer::new();
        assert!(w.patch_u32_le(0, 1).is_err());
    }
}
