//! The decoded drawing.
//!
//! A [`DwgDocument`] is produced by one pass of
//! [`DwgReader`](crate::io::dwg::reader::DwgReader) and never changes
//! afterward. It owns the section directory, the header variables, the class
//! table, the object map and every decoded record.

use ahash::RandomState;
use indexmap::IndexMap;

use crate::classes::{ClassDescriptor, ClassTable};
use crate::error::Result;
use crate::io::dwg::file_header::{RawSection, SectionDirectory, SectionKind};
use crate::io::dwg::object_type::EntityKind;
use crate::io::dwg::reader::handle_reader::ObjectMap;
use crate::io::dwg::reader::object_reader::EntityRecord;
use crate::io::dwg::reader::DwgReader;
use crate::notification::NotificationCollection;
use crate::preview::DwgPreview;
use crate::types::{Handle, HandleRef, Value};

/// Header variables in decode order, keyed by system variable name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderVariables {
    values: IndexMap<&'static str, Value>,
}

impl HeaderVariables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a variable; a later value under the same name replaces the
    /// earlier one but keeps its position.
    pub fn insert(&mut self, name: &'static str, value: Value) {
        self.values.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> + '_ {
        self.values.iter().map(|(k, v)| (*k, v))
    }
}

/// Counters gathered while decoding the object data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Records decoded and kept, opaque ones included.
    pub records: usize,
    /// Records kept without field decoding.
    pub opaque: usize,
    /// Opaque records dropped by configuration.
    pub dropped: usize,
    pub warnings: usize,
    /// Kept records per kind, in order of first appearance.
    pub per_kind: IndexMap<EntityKind, usize>,
}

impl DecodeStats {
    /// Count one kept record.
    pub fn count(&mut self, record: &EntityRecord) {
        self.records += 1;
        if record.is_opaque() {
            self.opaque += 1;
        }
        *self.per_kind.entry(record.kind()).or_insert(0) += 1;
    }

    /// Kept records of `kind`.
    pub fn kind_count(&self, kind: EntityKind) -> usize {
        self.per_kind.get(&kind).copied().unwrap_or(0)
    }
}

/// A decoded AC1015 drawing.
#[derive(Debug, Clone)]
pub struct DwgDocument {
    pub(crate) directory: SectionDirectory,
    pub(crate) header: HeaderVariables,
    pub(crate) classes: ClassTable,
    pub(crate) object_map: ObjectMap,
    pub(crate) records: IndexMap<Handle, EntityRecord, RandomState>,
    pub(crate) preview: Option<DwgPreview>,
    pub(crate) notifications: NotificationCollection,
    pub(crate) stats: DecodeStats,
}

impl DwgDocument {
    /// Decode a complete file held in memory with the default configuration.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        DwgReader::from_bytes(bytes.to_vec()).read()
    }

    // -----------------------------------------------------------------------
    // Records
    // -----------------------------------------------------------------------

    /// Records in object-map order.
    pub fn entities(&self) -> impl Iterator<Item = &EntityRecord> + '_ {
        self.records.values()
    }

    pub fn entities_of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &EntityRecord> + '_ {
        self.records.values().filter(move |r| r.kind() == kind)
    }

    /// Number of decoded records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record listed under `handle` in the object map.
    pub fn entity(&self, handle: Handle) -> Option<&EntityRecord> {
        self.records.get(&handle)
    }

    /// Target of a reference. Null references resolve to `None`.
    pub fn resolve(&self, reference: &HandleRef) -> Option<&EntityRecord> {
        if reference.is_null() {
            return None;
        }
        self.entity(reference.handle)
    }

    // -----------------------------------------------------------------------
    // Header, classes, file structure
    // -----------------------------------------------------------------------

    pub fn header(&self) -> &HeaderVariables {
        &self.header
    }

    pub fn header_variable(&self, name: &str) -> Option<&Value> {
        self.header.get(name)
    }

    pub fn classes(&self) -> &ClassTable {
        &self.classes
    }

    pub fn class_by_number(&self, class_number: u16) -> Option<&ClassDescriptor> {
        self.classes.by_number(class_number)
    }

    pub fn class_by_dxf_name(&self, dxf_name: &str) -> Option<&ClassDescriptor> {
        self.classes.by_dxf_name(dxf_name)
    }

    pub fn object_map(&self) -> &ObjectMap {
        &self.object_map
    }

    /// Section byte ranges from the preamble.
    pub fn sections(&self) -> &IndexMap<SectionKind, RawSection> {
        &self.directory.sections
    }

    pub fn maintenance_version(&self) -> u8 {
        self.directory.maintenance_version
    }

    /// Drawing code page from the preamble.
    pub fn code_page(&self) -> u16 {
        self.directory.code_page
    }

    pub fn preview(&self) -> Option<&DwgPreview> {
        self.preview.as_ref()
    }

    // -----------------------------------------------------------------------
    // Diagnostics
    // -----------------------------------------------------------------------

    pub fn notifications(&self) -> &NotificationCollection {
        &self.notifications
    }

    pub fn stats(&self) -> &DecodeStats {
        &self.stats
    }
}
