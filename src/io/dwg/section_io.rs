//! Sentinel framing of the header, class and preview sections.
//!
//! ```text
//! | start sentinel (16) | RL size | payload (size) | [RS crc] | end sentinel (16) |
//! ```
//!
//! The header and class sections carry a CRC over the size field and the
//! payload; the preview section does not.

use byteorder::{ByteOrder, LittleEndian};
use log::trace;

use crate::error::{DwgError, Result};

use super::constants::{section_names, sentinels, CRC_SEED};
use super::crc::crc8;

/// Sentinel pair and trailer layout of one framed section kind.
#[derive(Debug, Clone, Copy)]
pub struct SectionFrame {
    pub name: &'static str,
    pub start: &'static [u8; 16],
    pub end: &'static [u8; 16],
    pub has_crc: bool,
}

pub const HEADER_FRAME: SectionFrame = SectionFrame {
    name: section_names::HEADER,
    start: &sentinels::HEADER_START,
    end: &sentinels::HEADER_END,
    has_crc: true,
};

pub const CLASSES_FRAME: SectionFrame = SectionFrame {
    name: section_names::CLASSES,
    start: &sentinels::CLASSES_START,
    end: &sentinels::CLASSES_END,
    has_crc: true,
};

pub const PREVIEW_FRAME: SectionFrame = SectionFrame {
    name: section_names::PREVIEW,
    start: &sentinels::PREVIEW_START,
    end: &sentinels::PREVIEW_END,
    has_crc: false,
};

/// Payload of a framed section, borrowed from the file buffer.
#[derive(Debug, Clone, Copy)]
pub struct FramedSection<'a> {
    pub payload: &'a [u8],
    /// File byte offset of `payload[0]`.
    pub payload_offset: u64,
    /// Stored CRC, for sections that carry one.
    pub crc: Option<u16>,
}

/// Compare two 16-byte sentinels.
pub fn check_sentinel(actual: &[u8], expected: &[u8; 16]) -> bool {
    actual == expected.as_slice()
}

/// Fail with a format error unless `actual` equals `expected`.
pub fn validate_sentinel(
    actual: &[u8],
    expected: &[u8; 16],
    what: &str,
    offset: u64,
) -> Result<()> {
    if check_sentinel(actual, expected) {
        Ok(())
    } else {
        Err(DwgError::format_at_byte(
            format!("{what} sentinel mismatch: found {actual:02X?}"),
            offset,
        ))
    }
}

/// Bounds-checked `file[offset..offset + len]`.
pub(crate) fn slice_at<'a>(file: &'a [u8], offset: u64, len: u64, what: &str) -> Result<&'a [u8]> {
    let end = offset.checked_add(len).filter(|&e| e <= file.len() as u64);
    match end {
        Some(end) => Ok(&file[offset as usize..end as usize]),
        None => Err(DwgError::format_at_byte(
            format!(
                "{what} ({len} bytes) extends past the end of the file ({} bytes)",
                file.len()
            ),
            offset,
        )),
    }
}

impl SectionFrame {
    /// Validate the framing at `offset` and return the payload.
    ///
    /// With `validate_crc` the stored CRC must match the one computed over the
    /// size field and payload.
    pub fn read<'a>(&self, file: &'a [u8], offset: u64, validate_crc: bool) -> Result<FramedSection<'a>> {
        let start = slice_at(file, offset, 16, self.name)?;
        validate_sentinel(start, self.start, &format!("{} start", self.name), offset)?;

        let size_bytes = slice_at(file, offset + 16, 4, self.name)?;
        let size = u64::from(LittleEndian::read_u32(size_bytes));
        let payload_offset = offset + 20;
        let payload = slice_at(file, payload_offset, size, self.name)?;

        let mut cursor = payload_offset + size;
        let crc = if self.has_crc {
            let stored = LittleEndian::read_u16(slice_at(file, cursor, 2, self.name)?);
            if validate_crc {
                let computed = crc8(crc8(CRC_SEED, size_bytes), payload);
                if computed != stored {
                    return Err(DwgError::format_at_byte(
                        format!(
                            "{} CRC mismatch: stored {stored:#06X}, computed {computed:#06X}",
                            self.name
                        ),
                        cursor,
                    ));
                }
            }
            cursor += 2;
            Some(stored)
        } else {
            None
        };

        let end = slice_at(file, cursor, 16, self.name)?;
        validate_sentinel(end, self.end, &format!("{} end", self.name), cursor)?;

        trace!("{}: {size} payload bytes at {payload_offset:#X}", self.name);
        Ok(FramedSection {
            payload,
            payload_offset,
            crc,
        })
    }
}
