//! # dwgr15
//!
//! A pure Rust decoder for AutoCAD R2000 (AC1015) DWG drawings.
//!
//! The decoder turns a complete file into an immutable [`DwgDocument`]: the
//! section directory, the header variables, the class table, the object map
//! and one [`EntityRecord`] per object in the map.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dwgr15::{DwgReader, EntityKind};
//!
//! let doc = DwgReader::from_file("sample.dwg")?.read()?;
//!
//! for line in doc.entities_of_kind(EntityKind::Line) {
//!     println!("{} {:?} {:?}", line.handle(), line.field("p1"), line.field("p2"));
//! }
//! # Ok::<(), dwgr15::DwgError>(())
//! ```
//!
//! ## Architecture
//!
//! - `DwgStreamReader` - bit-coded primitives over a byte slice
//! - `SectionDirectory` - preamble and section byte ranges
//! - `DwgObjectReader` - one record from its object-map offset
//! - `DwgReader` - the decode pipeline, optionally parallel over records
//! - `DwgDocument` - the read-only result
//!
//! Structural problems abort the decode with [`DwgError::Format`]. Anything
//! that does not desynchronize the bit cursor is reported as a
//! [`Notification`] instead.

#![allow(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod classes;
pub mod document;
pub mod error;
pub mod io;
pub mod notification;
pub mod preview;
pub mod types;

// Re-export commonly used types
pub use classes::{ClassDescriptor, ClassTable};
pub use document::{DecodeStats, DwgDocument, HeaderVariables};
pub use error::{DwgError, ErrorOffset, Result};
pub use notification::{
    LogSink, Notification, NotificationCollection, NotificationSink, NotificationType,
};
pub use preview::{DwgPreview, PreviewImage, PreviewImageKind};
pub use types::{Handle, HandleRef, Value, Vector2, Vector3};

// Re-export I/O types
pub use io::dwg::{DwgReader, DwgReaderConfiguration, EntityKind, EntityRecord};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
