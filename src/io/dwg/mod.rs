//! DWG R2000 (AC1015) file format support.
//!
//! # Module Structure
//!
//! - [`constants`]: version tag, sentinels, section numbers, fixed limits
//! - [`crc`]: CRC-16 used by the preamble, sections and records
//! - [`section_io`]: sentinel-framed section reading
//! - [`file_header`]: preamble and section directory
//! - [`object_type`]: record kinds and their type codes
//! - [`reference_type`]: handle reference codes and resolution
//! - [`reader`]: bit stream and section readers

pub mod constants;
pub mod crc;
pub mod file_header;
pub mod object_type;
pub mod reader;
pub mod reference_type;
pub mod section_io;

// Re-export commonly used types
pub use file_header::{RawSection, SectionDirectory, SectionKind};
pub use object_type::EntityKind;
pub use reader::{DwgReader, DwgReaderConfiguration, EntityRecord};
pub use reference_type::{resolve_handle, DwgReferenceType};
