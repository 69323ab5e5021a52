//! DWG bit-level stream readers and section readers.
//!
//! ## Stream readers
//! - [`stream_reader`]: the `DwgStreamReader` trait with the bit-coded primitives
//! - [`stream_reader_base`]: the concrete reader over a byte slice
//!
//! ## Section readers
//! - [`header_reader`]: header section (system variables)
//! - [`classes_reader`]: classes section (class number to DXF name)
//! - [`handle_reader`]: handles section (object map)
//! - [`preview_reader`]: image section (thumbnail)
//! - [`object_reader`]: per-record decoders
//! - [`dwg_reader`]: the orchestrator tying them together

pub mod stream_reader;
pub mod stream_reader_base;

pub mod classes_reader;
pub mod dwg_reader;
pub mod handle_reader;
pub mod header_reader;
pub mod object_reader;
pub mod preview_reader;

pub use stream_reader::DwgStreamReader;
pub use stream_reader_base::{encoding_for_code_page, DwgBitReader};

pub use classes_reader::DwgClassesReader;
pub use dwg_reader::{DwgReader, DwgReaderConfiguration};
pub use handle_reader::{DwgHandleReader, ObjectMap};
pub use header_reader::DwgHeaderReader;
pub use object_reader::{DwgObjectReader, EntityRecord};
pub use preview_reader::DwgPreviewReader;
