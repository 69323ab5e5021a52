//! Section locator records of the AC1015 preamble.

use std::fmt;

use crate::io::dwg::constants::section_names;

/// Kind of section a locator record points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SectionKind {
    Header,
    Classes,
    /// The object map (`AcDb:Handles`).
    Handles,
    ObjFreeSpace,
    Template,
    AuxHeader,
    /// A record number AutoCAD does not write for R2000.
    Other(u8),
}

impl SectionKind {
    pub fn from_number(number: u8) -> Self {
        match number {
            0 => Self::Header,
            1 => Self::Classes,
            2 => Self::Handles,
            3 => Self::ObjFreeSpace,
            4 => Self::Template,
            5 => Self::AuxHeader,
            n => Self::Other(n),
        }
    }

    pub fn number(&self) -> u8 {
        match self {
            Self::Header => 0,
            Self::Classes => 1,
            Self::Handles => 2,
            Self::ObjFreeSpace => 3,
            Self::Template => 4,
            Self::AuxHeader => 5,
            Self::Other(n) => *n,
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header => f.write_str(section_names::HEADER),
            Self::Classes => f.write_str(section_names::CLASSES),
            Self::Handles => f.write_str(section_names::HANDLES),
            Self::ObjFreeSpace => f.write_str(section_names::OBJ_FREE_SPACE),
            Self::Template => f.write_str(section_names::TEMPLATE),
            Self::AuxHeader => f.write_str(section_names::AUX_HEADER),
            Self::Other(n) => write!(f, "section #{n}"),
        }
    }
}

/// Byte range of one section in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawSection {
    pub byte_offset: u64,
    pub byte_size: u64,
}

impl RawSection {
    pub const fn new(byte_offset: u64, byte_size: u64) -> Self {
        Self {
            byte_offset,
            byte_size,
        }
    }

    /// Exclusive end offset.
    pub fn end(&self) -> u64 {
        self.byte_offset.saturating_add(self.byte_size)
    }
}

/// A locator record as stored: number, seeker and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DwgSectionLocatorRecord {
    pub number: u8,
    /// Byte offset into the file.
    pub seeker: i32,
    /// Size of the section in bytes.
    pub size: i32,
}

impl DwgSectionLocatorRecord {
    pub fn new(number: u8, seeker: i32, size: i32) -> Self {
        Self {
            number,
            seeker,
            size,
        }
    }

    pub fn kind(&self) -> SectionKind {
        SectionKind::from_number(self.number)
    }

    /// The byte range, or `None` when seeker or size is negative.
    pub fn raw_section(&self) -> Option<RawSection> {
        let offset = u64::try_from(self.seeker).ok()?;
        let size = u64::try_from(self.size).ok()?;
        Some(RawSection::new(offset, size))
    }
}
