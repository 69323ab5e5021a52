//! Bit cursor over an in-memory buffer.
//!
//! [`DwgBitReader`] implements [`DwgStreamReader`] over a borrowed byte slice.
//! The reader never touches bytes outside its slice: the limit is clamped to
//! the slice length at construction and every read is checked against it.
//! Errors report absolute file positions, so a reader built over a section
//! payload is given the payload's file offset as its origin.

use encoding_rs::Encoding;

use crate::error::{DwgError, Result};

use super::stream_reader::DwgStreamReader;

/// Bit-level reader over a byte slice.
#[derive(Debug, Clone)]
pub struct DwgBitReader<'a> {
    data: &'a [u8],
    /// Bit position from the start of `data`.
    position: u64,
    /// Exclusive bit limit, never past `data.len() * 8`.
    limit: u64,
    /// File byte offset of `data[0]`.
    origin: u64,
    encoding: &'static Encoding,
}

impl<'a> DwgBitReader<'a> {
    /// Reader over the whole slice, positioned at bit 0.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            position: 0,
            limit: data.len() as u64 * 8,
            origin: 0,
            encoding: encoding_rs::WINDOWS_1252,
        }
    }

    /// Set the file byte offset of the first byte, used in error positions.
    pub fn with_origin(mut self, origin: u64) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Restrict reads to the first `limit` bits (clamped to the slice).
    pub fn with_limit_in_bits(mut self, limit: u64) -> Self {
        self.limit = limit.min(self.data.len() as u64 * 8);
        self.position = self.position.min(self.limit);
        self
    }

    /// Sub-reader over `[start_bit, limit)` of the same slice.
    pub fn sub_reader(&self, start_bit: u64, limit: u64) -> Result<DwgBitReader<'a>> {
        let mut reader = self.clone().with_limit_in_bits(limit);
        reader.set_position_in_bits(start_bit)?;
        Ok(reader)
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn origin(&self) -> u64 {
        self.origin
    }

    /// Skip to the next byte boundary.
    pub fn align_to_byte(&mut self) {
        let aligned = (self.position + 7) & !7;
        self.position = aligned.min(self.limit);
    }
}

impl DwgStreamReader for DwgBitReader<'_> {
    fn position_in_bits(&self) -> u64 {
        self.position
    }

    fn set_position_in_bits(&mut self, position: u64) -> Result<()> {
        if position > self.limit {
            return Err(self.error_here(format!(
                "seek to bit {position} past the limit of {} bits",
                self.limit
            )));
        }
        self.position = position;
        Ok(())
    }

    fn limit_in_bits(&self) -> u64 {
        self.limit
    }

    fn read_bits(&mut self, count: u32) -> Result<u64> {
        if count > 64 {
            return Err(self.error_here(format!("cannot read {count} bits at once")));
        }
        let end = self.position + u64::from(count);
        if end > self.limit {
            return Err(self.error_here(format!(
                "read of {count} bits overruns the {}-bit limit",
                self.limit
            )));
        }

        let mut value = 0u64;
        let mut pos = self.position;
        while pos < end {
            let byte = self.data[(pos >> 3) as usize];
            let offset = (pos & 7) as u32;
            // Take as many bits as possible from the current byte.
            let take = (8 - offset).min((end - pos) as u32);
            let bits = (u32::from(byte) >> (8 - offset - take)) & ((1u32 << take) - 1);
            value = (value << take) | u64::from(bits);
            pos += u64::from(take);
        }
        self.position = end;
        Ok(value)
    }

    fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    fn error_here(&self, reason: String) -> DwgError {
        DwgError::format_at_bit(reason, self.origin * 8 + self.position)
    }
}

/// Map a DWG code page index (preamble `codepage` field) to an encoding.
///
/// Indices without an `encoding_rs` counterpart (the DOS code pages) fall back
/// to Windows-1252.
pub fn encoding_for_code_page(code_page: u16) -> &'static Encoding {
    match code_page {
        3 => encoding_rs::ISO_8859_2,
        4 => encoding_rs::ISO_8859_3,
        5 => encoding_rs::ISO_8859_4,
        6 => encoding_rs::ISO_8859_5,
        7 => encoding_rs::ISO_8859_6,
        8 => encoding_rs::ISO_8859_7,
        9 => encoding_rs::ISO_8859_8,
        10 => encoding_rs::WINDOWS_1254,
        22 | 38 => encoding_rs::SHIFT_JIS,
        23 => encoding_rs::MACINTOSH,
        24 | 41 => encoding_rs::BIG5,
        25 | 40 => encoding_rs::EUC_KR,
        27 => encoding_rs::IBM866,
        28 => encoding_rs::WINDOWS_1250,
        29 => encoding_rs::WINDOWS_1251,
        31 | 39 => encoding_rs::GBK,
        32 => encoding_rs::WINDOWS_1253,
        33 => encoding_rs::WINDOWS_1254,
        34 => encoding_rs::WINDOWS_1255,
        35 => encoding_rs::WINDOWS_1256,
        36 => encoding_rs::WINDOWS_1257,
        37 => encoding_rs::WINDOWS_874,
        43 => encoding_rs::UTF_16LE,
        44 => encoding_rs::WINDOWS_1258,
        _ => encoding_rs::WINDOWS_1252,
    }
}
