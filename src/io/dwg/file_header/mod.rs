//! The AC1015 file preamble and its section directory.
//!
//! ```text
//! 0x00  "AC1015"                 version tag
//! 0x06  7 bytes                  zeros; byte 0x0B is the maintenance version
//! 0x0D  RL                       preview (image section) address, 0 = none
//! 0x11  2 bytes                  undocumented
//! 0x13  RS                       drawing code page
//! 0x15  RL                       number of locator records
//! 0x19  N × (RC, RL, RL)         number, seeker, size
//!       RS                       CRC
//!       16 bytes                 FILE_HEADER_END sentinel
//! ```

mod section_locator;

pub use section_locator::{DwgSectionLocatorRecord, RawSection, SectionKind};

use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use indexmap::IndexMap;
use log::debug;

use crate::error::{DwgError, Result};

use super::constants::{sentinels, VERSION_TAG};
use super::crc::crc8;
use super::section_io::validate_sentinel;

/// Offset of the first locator record.
const RECORDS_OFFSET: u64 = 0x19;
/// Bytes per locator record.
const RECORD_SIZE: u64 = 9;

/// Parsed preamble: drawing metadata plus the section map.
#[derive(Debug, Clone)]
pub struct SectionDirectory {
    pub maintenance_version: u8,
    /// File offset of the image section, if present.
    pub preview_address: Option<u64>,
    pub code_page: u16,
    /// Sections by kind, in file order of the locator records.
    pub sections: IndexMap<SectionKind, RawSection>,
    pub crc: u16,
}

impl SectionDirectory {
    /// Parse the preamble at the start of `file`.
    pub fn read(file: &[u8], validate_crc: bool) -> Result<Self> {
        if file.len() < 6 || &file[..6] != VERSION_TAG.as_slice() {
            let found = String::from_utf8_lossy(&file[..file.len().min(6)]).into_owned();
            return Err(DwgError::format_at_byte(
                format!("invalid version tag {found:?}, expected \"AC1015\""),
                0,
            ));
        }
        if (file.len() as u64) < RECORDS_OFFSET {
            return Err(DwgError::format_at_byte("truncated file preamble", file.len() as u64));
        }

        let mut cursor = Cursor::new(file);
        cursor.set_position(6);

        let mut padding = [0u8; 7];
        cursor.read_exact(&mut padding)?;
        let maintenance_version = padding[5];

        let preview = cursor.read_i32::<LittleEndian>()?;
        let mut _undocumented = [0u8; 2];
        cursor.read_exact(&mut _undocumented)?;
        let code_page = cursor.read_u16::<LittleEndian>()?;
        let count = cursor.read_i32::<LittleEndian>()?;

        let count = u64::try_from(count).map_err(|_| {
            DwgError::format_at_byte(format!("negative section record count {count}"), 0x15)
        })?;
        let crc_offset = RECORDS_OFFSET + count * RECORD_SIZE;
        if crc_offset + 18 > file.len() as u64 {
            return Err(DwgError::format_at_byte(
                format!("{count} section records do not fit in a {}-byte file", file.len()),
                0x15,
            ));
        }

        let mut sections = IndexMap::new();
        for _ in 0..count {
            let record_offset = cursor.position();
            let record = DwgSectionLocatorRecord::new(
                cursor.read_u8()?,
                cursor.read_i32::<LittleEndian>()?,
                cursor.read_i32::<LittleEndian>()?,
            );
            let raw = record.raw_section().ok_or_else(|| {
                DwgError::format_at_byte(
                    format!("section record {} has a negative offset or size", record.number),
                    record_offset,
                )
            })?;
            sections.insert(record.kind(), raw);
        }

        let crc = cursor.read_u16::<LittleEndian>()?;
        if validate_crc {
            let computed = crc8(0, &file[..crc_offset as usize]) ^ preamble_crc_mask(count);
            if computed != crc {
                return Err(DwgError::format_at_byte(
                    format!("preamble CRC mismatch: stored {crc:#06X}, computed {computed:#06X}"),
                    crc_offset,
                ));
            }
        }

        let sentinel_offset = crc_offset + 2;
        let sentinel = &file[sentinel_offset as usize..sentinel_offset as usize + 16];
        validate_sentinel(sentinel, &sentinels::FILE_HEADER_END, "file header end", sentinel_offset)?;

        let preview_address = match preview {
            0 => None,
            p if p < 0 => {
                return Err(DwgError::format_at_byte(
                    format!("negative preview address {p}"),
                    0x0D,
                ))
            }
            p => Some(p as u64),
        };

        debug!(
            "AC1015 preamble: maintenance {maintenance_version}, code page {code_page}, {} sections",
            sections.len()
        );

        Ok(Self {
            maintenance_version,
            preview_address,
            code_page,
            sections,
            crc,
        })
    }

    pub fn section(&self, kind: SectionKind) -> Option<RawSection> {
        self.sections.get(&kind).copied()
    }

    /// The section of `kind`, or a format error naming it.
    pub fn require(&self, kind: SectionKind) -> Result<RawSection> {
        self.section(kind)
            .ok_or_else(|| DwgError::format(format!("section directory has no {kind} record")))
    }
}

/// Value XORed into the preamble CRC, selected by the record count.
pub fn preamble_crc_mask(record_count: u64) -> u16 {
    match record_count {
        3 => 0xA598,
        4 => 0x8101,
        5 => 0x3CC4,
        6 => 0x8461,
        _ => 0,
    }
}
