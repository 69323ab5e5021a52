//! Decoded records.
//!
//! Every per-kind decoder fills a [`RecordBuilder`]; the object reader turns
//! it into an immutable [`EntityRecord`] once the whole record has been read.
//! A decoder that fails leaves nothing behind.

use indexmap::IndexMap;

use crate::io::dwg::object_type::EntityKind;
use crate::notification::Notification;
use crate::types::{Handle, HandleRef, Value, Vector3};

/// One application's extended entity data (EED) group, kept undecoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedDataGroup {
    /// Handle of the APPID that owns the group.
    pub app_handle: Handle,
    pub data: Vec<u8>,
}

/// A record decoded from the object data.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
    pub(crate) type_code: u16,
    pub(crate) kind: EntityKind,
    pub(crate) handle: Handle,
    pub(crate) size_in_bits: u32,
    pub(crate) dxf_name: Option<String>,
    pub(crate) extended_data: Option<Vec<ExtendedDataGroup>>,
    pub(crate) graphics_data: Option<Vec<u8>>,
    pub(crate) fields: IndexMap<&'static str, Value>,
}

impl EntityRecord {
    /// Type code as stored in the record.
    pub fn type_code(&self) -> u16 {
        self.type_code
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Handle stored in the record itself.
    pub fn handle(&self) -> Handle {
        self.handle
    }

    /// Size of the data stream in bits; handles follow it.
    pub fn size_in_bits(&self) -> u32 {
        self.size_in_bits
    }

    /// DXF name of the class, for records typed by class number.
    pub fn dxf_name(&self) -> Option<&str> {
        self.dxf_name.as_deref()
    }

    /// Record name: the class DXF name when there is one, the kind name
    /// otherwise.
    pub fn name(&self) -> &str {
        self.dxf_name.as_deref().unwrap_or_else(|| self.kind.name())
    }

    pub fn extended_data(&self) -> Option<&[ExtendedDataGroup]> {
        self.extended_data.as_deref()
    }

    /// Embedded graphics blob of an entity, when present.
    pub fn graphics_data(&self) -> Option<&[u8]> {
        self.graphics_data.as_deref()
    }

    /// Fields in decode order.
    pub fn fields(&self) -> &IndexMap<&'static str, Value> {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Handle-valued field.
    pub fn handle_field(&self, name: &str) -> Option<HandleRef> {
        self.field(name).and_then(Value::as_handle)
    }

    pub fn is_graphical(&self) -> bool {
        self.fields.contains_key("entity_mode")
    }

    /// Whether the record was kept without field decoding.
    pub fn is_opaque(&self) -> bool {
        self.kind.is_opaque()
    }
}

/// Accumulates the fields of one record while it is decoded.
#[derive(Debug, Default)]
pub(crate) struct RecordBuilder {
    fields: IndexMap<&'static str, Value>,
    pub(crate) extended_data: Option<Vec<ExtendedDataGroup>>,
    pub(crate) graphics_data: Option<Vec<u8>>,
    pub(crate) notifications: Vec<Notification>,
}

impl RecordBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &'static str, value: impl Into<Value>) {
        self.fields.insert(name, value.into());
    }

    /// Store a direction (extrusion, axis, tangent) rather than a position.
    pub fn set_vector(&mut self, name: &'static str, value: Vector3) {
        self.fields.insert(name, Value::Vector3(value));
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    pub fn build(
        self,
        type_code: u16,
        kind: EntityKind,
        handle: Handle,
        size_in_bits: u32,
        dxf_name: Option<String>,
    ) -> (EntityRecord, Vec<Notification>) {
        let record = EntityRecord {
            type_code,
            kind,
            handle,
            size_in_bits,
            dxf_name,
            extended_data: self.extended_data,
            graphics_data: self.graphics_data,
            fields: self.fields,
        };
        (record, self.notifications)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Vector2;

    #[test]
    fn test_builder_keeps_insertion_order() {
        let mut builder = RecordBuilder::new();
        builder.set("p1", Vector2::new(0.0, 0.0));
        builder.set("p2", Vector2::new(10.0, 5.0));
        builder.set_vector("extrusion", Vector3::UNIT_Z);
        builder.set("p1", Vector2::new(1.0, 1.0));

        let (record, notes) = builder.build(0x13, EntityKind::Line, Handle::new(0x2A), 128, None);
        assert!(notes.is_empty());
        let names: Vec<_> = record.fields().keys().copied().collect();
        assert_eq!(names, vec!["p1", "p2", "extrusion"]);
        assert_eq!(record.field("p1"), Some(&Value::Point2(Vector2::new(1.0, 1.0))));
        assert_eq!(record.field("extrusion"), Some(&Value::Vector3(Vector3::UNIT_Z)));
        assert_eq!(record.name(), "LINE");
        assert!(!record.is_graphical());
    }

    #[test]
    fn test_class_name_wins() {
        let builder = RecordBuilder::new();
        let (record, _) = builder.build(
            500,
            EntityKind::Opaque,
            Handle::new(1),
            0,
            Some("ACAD_TABLE".into()),
        );
        assert_eq!(record.name(), "ACAD_TABLE");
        assert!(record.is_opaque());
    }
}
