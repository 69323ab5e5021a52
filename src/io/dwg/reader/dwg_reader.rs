//! DWG reader orchestrator, the main entry point for decoding AC1015 files.
//!
//! Reads the preamble, the framed sections and the object map, then decodes
//! every record listed in the map and assembles the final [`DwgDocument`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use dwgr15::io::dwg::reader::DwgReader;
//!
//! let doc = DwgReader::from_file("sample.dwg")?.read()?;
//! ```

use std::fs;
use std::io::Read;
use std::path::Path;

use indexmap::IndexMap;
use log::{debug, trace};
use rayon::prelude::*;

use crate::document::{DecodeStats, DwgDocument};
use crate::error::Result;
use crate::notification::{Notification, NotificationCollection, NotificationSink, NotificationType};

use super::super::file_header::{SectionDirectory, SectionKind};
use super::object_reader::{DwgObjectReader, RecordOutcome};
use super::stream_reader_base::encoding_for_code_page;
use super::{DwgClassesReader, DwgHandleReader, DwgHeaderReader, DwgPreviewReader};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration options for the DWG reader.
#[derive(Debug, Clone)]
pub struct DwgReaderConfiguration {
    /// Decode object records on the rayon thread pool once the class table
    /// and header are known.
    ///
    /// Default: `true`.
    pub parallel: bool,

    /// Verify the CRC stored after the preamble, each framed section, each
    /// object-map chunk and each object record. CRCs are always consumed.
    ///
    /// Default: `false`.
    pub validate_crc: bool,

    /// Keep records of recognized kinds that have no field decoder as opaque
    /// records. When `false` they are left out of the document and reported
    /// with a `NotSupported` notification.
    ///
    /// Default: `true`.
    pub keep_opaque: bool,
}

impl Default for DwgReaderConfiguration {
    fn default() -> Self {
        Self {
            parallel: true,
            validate_crc: false,
            keep_opaque: true,
        }
    }
}

// ---------------------------------------------------------------------------
// DwgReader
// ---------------------------------------------------------------------------

/// DWG file reader, decodes an AC1015 file into a [`DwgDocument`].
///
/// # Architecture
///
/// The read pipeline is:
///
/// 1. Validate the version tag and read the section directory.
/// 2. Pick the text encoding from the preamble code page.
/// 3. Read each framed section from the whole-file buffer:
///    - Header (system variables)
///    - Classes (class number to DXF name)
///    - Handles (object map: handle to file offset)
///    - Preview (thumbnail), when the preamble addresses one
/// 4. Decode every record in the object map, in parallel when configured.
/// 5. Assemble the document, notifications and counters.
///
/// Any format error aborts the whole read; no partial document is returned.
pub struct DwgReader {
    /// Whole file contents.
    data: Vec<u8>,

    /// User configuration.
    config: DwgReaderConfiguration,

    /// Optional receiver for notifications in addition to the document's
    /// own collection.
    sink: Option<Box<dyn NotificationSink + Send>>,
}

impl DwgReader {
    /// Open a DWG file by path. The file is read into memory at once.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read(path.as_ref())?;
        Ok(Self::from_bytes(data))
    }

    /// Create a reader over bytes already in memory.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        Self {
            data,
            config: DwgReaderConfiguration::default(),
            sink: None,
        }
    }

    /// Create a reader by draining any byte stream.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Ok(Self::from_bytes(data))
    }

    /// Set the reader configuration.
    pub fn with_config(mut self, config: DwgReaderConfiguration) -> Self {
        self.config = config;
        self
    }

    /// Forward every notification to `sink` as well.
    pub fn with_notification_sink(mut self, sink: impl NotificationSink + Send + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn config(&self) -> &DwgReaderConfiguration {
        &self.config
    }

    /// Decode the file.
    ///
    /// Notifications produced before a format error still reach the sink.
    pub fn read(mut self) -> Result<DwgDocument> {
        let mut pending: Vec<Notification> = Vec::new();
        let result = decode(&self.data, &self.config, &mut pending);

        if let Some(sink) = self.sink.as_mut() {
            for notification in &pending {
                sink.notify(notification);
            }
        }
        let mut document = result?;

        for notification in pending {
            if notification.notification_type == NotificationType::Warning {
                document.stats.warnings += 1;
            }
            document.notifications.push(notification);
        }
        let stats = &document.stats;
        debug!(
            "records: {} decoded, {} opaque, {} dropped, {} warnings",
            stats.records, stats.opaque, stats.dropped, stats.warnings
        );
        Ok(document)
    }
}

/// Run the decode pipeline, appending notifications to `pending` as each
/// stage produces them.
fn decode(
    file: &[u8],
    config: &DwgReaderConfiguration,
    pending: &mut Vec<Notification>,
) -> Result<DwgDocument> {
    let validate = config.validate_crc;

    let directory = SectionDirectory::read(file, validate)?;
    let encoding = encoding_for_code_page(directory.code_page);
    debug!(
        "AC1015 maintenance {}, code page {} ({}), {} sections",
        directory.maintenance_version,
        directory.code_page,
        encoding.name(),
        directory.sections.len()
    );

    let header = DwgHeaderReader::new(
        file,
        directory.require(SectionKind::Header)?,
        encoding,
        validate,
    )
    .read(pending)?;
    debug!("header: {} variables", header.len());

    let classes = DwgClassesReader::new(
        file,
        directory.require(SectionKind::Classes)?,
        encoding,
        validate,
    )
    .read()?;
    debug!("classes: {} definitions", classes.len());

    let object_map = DwgHandleReader::new(file, directory.require(SectionKind::Handles)?, validate)
        .read(pending)?;
    debug!("object map: {} entries", object_map.len());

    let preview = match directory.preview_address {
        Some(address) => Some(DwgPreviewReader::new(file, address).read()?),
        None => None,
    };

    let object_reader = DwgObjectReader::new(file, &classes, encoding)
        .with_crc_validation(validate)
        .with_opaque_records(config.keep_opaque);
    let entries = object_map.entries();
    // Sequential decoding stops at the first failure; parallel decoding
    // finishes the batch and is cut at the same record below.
    let outcomes: Vec<Result<RecordOutcome>> = if config.parallel {
        entries
            .par_iter()
            .map(|&(handle, offset)| object_reader.read_record(handle, offset))
            .collect()
    } else {
        let mut outcomes = Vec::with_capacity(entries.len());
        for &(handle, offset) in &entries {
            let outcome = object_reader.read_record(handle, offset);
            let failed = outcome.is_err();
            outcomes.push(outcome);
            if failed {
                break;
            }
        }
        outcomes
    };

    let mut stats = DecodeStats::default();
    let mut records = IndexMap::with_capacity_and_hasher(outcomes.len(), Default::default());
    for ((handle, _), outcome) in entries.iter().zip(outcomes) {
        let outcome = outcome?;
        pending.extend(outcome.notifications);
        match outcome.record {
            Some(record) => {
                trace!("{handle}: {}", record.kind());
                stats.count(&record);
                records.insert(*handle, record);
            }
            None => stats.dropped += 1,
        }
    }

    Ok(DwgDocument {
        directory,
        header,
        classes,
        object_map,
        records,
        preview,
        notifications: NotificationCollection::new(),
        stats,
    })
}
