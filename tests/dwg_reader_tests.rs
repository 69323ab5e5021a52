//! DWG Reader Tests
//!
//! End-to-end decoding of synthetic AC1015 files:
//!
//! 1. **Records**: LINE geometry, dictionaries, handle resolution
//! 2. **Classes**: class-numbered records, opaque kinds, unknown codes
//! 3. **Header**: variables and the values derived from `FLAGS`
//! 4. **Framing**: sentinels, CRCs, truncation
//! 5. **Object map**: multiple chunks, handle mismatches
//! 6. **Configuration**: parallel vs sequential, notification sink

mod common;

use std::sync::{Arc, Mutex};

use common::builders::{HeaderOverride, PREAMBLE_SENTINEL_OFFSET};
use common::{dictionary_streams, line_streams, read_doc, read_with, BitWriter, DwgFileBuilder};
use dwgr15::{
    DwgReader, DwgReaderConfiguration, EntityKind, Handle, HandleRef, Notification,
    NotificationSink, NotificationType, PreviewImageKind, Value, Vector2,
};

fn single_line() -> DwgFileBuilder {
    let (data, handles) = line_streams((0.0, 0.0), (10.0, 5.0), 0x10);
    DwgFileBuilder::new().record(0x51, 0x13, &data, &handles)
}

fn strict() -> DwgReaderConfiguration {
    DwgReaderConfiguration {
        validate_crc: true,
        ..Default::default()
    }
}

// ===========================================================================
// Records
// ===========================================================================

#[test]
fn test_line_end_to_end() {
    let built = single_line().build();
    let doc = read_doc(&built.bytes);

    assert_eq!(doc.len(), 1);
    let line = doc.entity(Handle::new(0x51)).expect("line record");
    assert_eq!(line.kind(), EntityKind::Line);
    assert_eq!(line.type_code(), 0x13);
    assert_eq!(line.name(), "LINE");
    assert!(line.is_graphical());
    assert!(!line.is_opaque());
    assert_eq!(line.field("p1"), Some(&Value::Point2(Vector2::new(0.0, 0.0))));
    assert_eq!(line.field("p2"), Some(&Value::Point2(Vector2::new(10.0, 5.0))));
    assert_eq!(line.handle_field("layer"), Some(HandleRef::new(5, Handle::new(0x10))));

    assert_eq!(doc.entities_of_kind(EntityKind::Line).count(), 1);
    for other in [EntityKind::Arc, EntityKind::Circle, EntityKind::Ray, EntityKind::Xline] {
        assert_eq!(doc.entities_of_kind(other).count(), 0);
    }
    assert!(doc.notifications().is_empty(), "{:?}", doc.notifications());
}

#[test]
fn test_valid_file_passes_crc_validation() {
    let built = single_line().preview_png(b"\x89PNG\r\n\x1a\n").build();
    let doc = read_with(&built.bytes, strict()).unwrap();
    assert_eq!(doc.len(), 1);
}

#[test]
fn test_resolve_dictionary_entry() {
    let (line, line_handles) = line_streams((1.0, 1.0), (2.0, 2.0), 0x10);
    let (dict, dict_handles) = dictionary_streams(0, &[("FIRST", 0x51)]);
    let built = DwgFileBuilder::new()
        .record(0x0C, 0x2A, &dict, &dict_handles)
        .record(0x51, 0x13, &line, &line_handles)
        .build();
    let doc = read_doc(&built.bytes);

    let dictionary = doc.entity(Handle::new(0x0C)).unwrap();
    assert_eq!(dictionary.kind(), EntityKind::Dictionary);
    assert!(!dictionary.is_graphical());
    let entries = dictionary.field("entries").and_then(Value::as_list).unwrap();
    let Value::List(entry) = &entries[0] else {
        panic!("entry is not a list: {:?}", entries[0]);
    };
    assert_eq!(entry[0], Value::Str("FIRST".into()));
    let Value::HandleRef(target) = entry[1] else {
        panic!("entry target is not a handle: {:?}", entry[1]);
    };
    assert_eq!(doc.resolve(&target).map(|r| r.kind()), Some(EntityKind::Line));
    assert!(doc.resolve(&HandleRef::new(5, Handle::NULL)).is_none());
}

#[test]
fn test_entities_follow_object_map_order() {
    let mut builder = DwgFileBuilder::new().pairs_per_chunk(2);
    for handle in [0x60u64, 0x52, 0x58, 0x51, 0x70] {
        let (data, handles) = line_streams((0.0, 0.0), (handle as f64, 1.0), 0x10);
        builder = builder.record(handle, 0x13, &data, &handles);
    }
    let built = builder.build();
    let doc = read_doc(&built.bytes);

    let order: Vec<u64> = doc.entities().map(|r| r.handle().value()).collect();
    assert_eq!(order, vec![0x51, 0x52, 0x58, 0x60, 0x70]);

    let offsets: Vec<u64> = doc.object_map().iter().map(|(_, offset)| offset).collect();
    assert_eq!(offsets.len(), 5);
    assert!(offsets.iter().all(|&o| o > 0));
    let mut distinct = offsets.clone();
    distinct.sort_unstable();
    distinct.dedup();
    assert_eq!(distinct.len(), 5);

    for (handle, offset) in &built.record_offsets {
        assert_eq!(doc.object_map().get(Handle::new(*handle)), Some(*offset as u64));
    }
}

// ===========================================================================
// Classes
// ===========================================================================

#[test]
fn test_class_numbered_record() {
    let mut data = BitWriter::new();
    let mut handles = BitWriter::new();
    data.object_common(&mut handles, 0x0C);
    let built = DwgFileBuilder::new()
        .class(500, "ACDBPLACEHOLDER", "AcDbPlaceHolder", false)
        .record(0x40, 500, &data, &handles)
        .build();
    let doc = read_doc(&built.bytes);

    let class = doc.class_by_number(500).unwrap();
    assert_eq!(class.dxf_name, "ACDBPLACEHOLDER");
    assert!(!class.is_entity());
    assert_eq!(doc.class_by_dxf_name("ACDBPLACEHOLDER").map(|c| c.class_number), Some(500));
    assert!(doc.class_by_number(501).is_none());

    let record = doc.entity(Handle::new(0x40)).unwrap();
    assert_eq!(record.kind(), EntityKind::Placeholder);
    assert_eq!(record.type_code(), 500);
    assert_eq!(record.dxf_name(), Some("ACDBPLACEHOLDER"));
    assert_eq!(record.handle_field("owner"), Some(HandleRef::new(4, Handle::new(0x0C))));
}

fn widget_file() -> Vec<u8> {
    let (line, line_handles) = line_streams((0.0, 0.0), (1.0, 1.0), 0x10);
    let mut data = BitWriter::new();
    let mut handles = BitWriter::new();
    data.entity_common(&mut handles, 0x10);
    data.rc(0xAB);
    DwgFileBuilder::new()
        .class(501, "ACME_WIDGET", "AcmeWidget", true)
        .record(0x51, 0x13, &line, &line_handles)
        .record(0x52, 501, &data, &handles)
        .build()
        .bytes
}

#[test]
fn test_unknown_class_kept_opaque() {
    let doc = read_doc(&widget_file());
    let widget = doc.entity(Handle::new(0x52)).unwrap();
    assert_eq!(widget.kind(), EntityKind::Opaque);
    assert!(widget.is_opaque());
    assert!(widget.is_graphical());
    assert_eq!(widget.name(), "ACME_WIDGET");
    assert_eq!(widget.field("data").and_then(Value::as_list).map(|d| d.len()), Some(1));
    assert_eq!(widget.field("data_bits"), Some(&Value::Int(8)));

    assert!(doc.notifications().has_type(NotificationType::NotImplemented));
    assert_eq!(doc.stats().records, 2);
    assert_eq!(doc.stats().opaque, 1);
    assert_eq!(doc.stats().kind_count(EntityKind::Line), 1);
    assert_eq!(doc.stats().kind_count(EntityKind::Opaque), 1);
}

#[test]
fn test_unknown_class_dropped_when_configured() {
    let config = DwgReaderConfiguration {
        keep_opaque: false,
        ..Default::default()
    };
    let doc = read_with(&widget_file(), config).unwrap();
    assert_eq!(doc.len(), 1);
    assert!(doc.entity(Handle::new(0x52)).is_none());
    assert_eq!(doc.stats().dropped, 1);
    assert!(doc.notifications().has_type(NotificationType::NotSupported));
}

#[test]
fn test_unknown_type_code_is_format_error() {
    let (data, handles) = line_streams((0.0, 0.0), (1.0, 1.0), 0x10);
    for code in [0x7F_i16, 0x1F0, 600] {
        let built = DwgFileBuilder::new().record(0x51, code, &data, &handles).build();
        let err = DwgReader::from_bytes(built.bytes).read().unwrap_err();
        assert!(err.is_format(), "type code {code:#X}: {err}");
    }
}

// ===========================================================================
// Header
// ===========================================================================

#[test]
fn test_header_variables() {
    let built = DwgFileBuilder::new()
        .maintenance_version(8)
        .header("INSUNITS", HeaderOverride::Int(4))
        .header("FLAGS", HeaderOverride::Int(0x0200 | 0x0800 | 0x19))
        .header("FINGERPRINTGUID", HeaderOverride::Text("{ABC}".into()))
        .header("MODEL_SPACE_BLOCK_RECORD", HeaderOverride::Int(0x1F))
        .build();
    let doc = read_doc(&built.bytes);

    assert_eq!(doc.maintenance_version(), 8);
    assert_eq!(doc.code_page(), 30);
    assert_eq!(doc.header_variable("INSUNITS"), Some(&Value::Int(4)));
    assert_eq!(doc.header_variable("CELWEIGHT"), Some(&Value::Int(0x19)));
    assert_eq!(doc.header_variable("LWDISPLAY"), Some(&Value::Bool(false)));
    assert_eq!(doc.header_variable("EXTNAMES"), Some(&Value::Bool(true)));
    assert_eq!(doc.header_variable("XEDIT"), Some(&Value::Bool(true)));
    assert_eq!(doc.header_variable("FINGERPRINTGUID"), Some(&Value::Str("{ABC}".into())));
    assert_eq!(
        doc.header_variable("MODEL_SPACE_BLOCK_RECORD"),
        Some(&Value::HandleRef(HandleRef::new(5, Handle::new(0x1F))))
    );
    assert!(doc.header_variable("CPSNID").is_none());
    assert!(doc.is_empty());
}

// ===========================================================================
// Framing
// ===========================================================================

#[test]
fn test_sentinel_flips_are_format_errors() {
    let built = single_line().preview_png(b"png").build();
    let mut sentinel_starts = vec![
        PREAMBLE_SENTINEL_OFFSET,
        built.header_offset,
        built.framed_end_sentinel(built.header_offset),
        built.classes_offset,
        built.framed_end_sentinel(built.classes_offset),
    ];
    if let Some(preview) = built.preview_offset {
        sentinel_starts.push(preview);
    }

    for start in sentinel_starts {
        for i in 0..16 {
            let mut bytes = built.bytes.clone();
            bytes[start + i] ^= 0x01;
            let result = DwgReader::from_bytes(bytes).read();
            match result {
                Err(e) => assert!(e.is_format(), "byte {:#X}: {e}", start + i),
                Ok(_) => panic!("flipped sentinel byte {:#X} decoded", start + i),
            }
        }
    }
}

#[test]
fn test_version_tag_mismatch() {
    let mut bytes = single_line().build().bytes;
    bytes[5] = b'8';
    assert!(DwgReader::from_bytes(bytes).read().unwrap_err().is_format());
}

#[test]
fn test_record_crc_is_opt_in() {
    let built = single_line().build();
    let record_end = built.handles_offset;
    let mut bytes = built.bytes.clone();
    bytes[record_end - 1] ^= 0xFF;

    assert_eq!(read_doc(&bytes).len(), 1);
    let err = read_with(&bytes, strict()).unwrap_err();
    assert!(err.is_format(), "{err}");
}

#[test]
fn test_truncated_file_is_format_error() {
    let bytes = single_line().build().bytes;
    for keep in [10usize, 100, bytes.len() - 1] {
        let err = DwgReader::from_bytes(bytes[..keep].to_vec()).read().unwrap_err();
        assert!(err.is_format(), "truncated to {keep}: {err}");
    }
}

// ===========================================================================
// Object map and records
// ===========================================================================

#[test]
fn test_handle_mismatch_warns() {
    let (data, handles) = line_streams((0.0, 0.0), (3.0, 4.0), 0x10);
    let built = DwgFileBuilder::new()
        .record_with_own_handle(0x60, 0x61, 0x13, &data, &handles)
        .build();
    let doc = read_doc(&built.bytes);

    let record = doc.entity(Handle::new(0x60)).unwrap();
    assert_eq!(record.handle(), Handle::new(0x61));
    assert_eq!(doc.stats().warnings, 1);
    assert_eq!(doc.notifications().of_type(NotificationType::Warning).len(), 1);
}

#[test]
fn test_preview_section() {
    let png = b"\x89PNG\r\n\x1a\n-thumbnail-";
    let doc = read_doc(&single_line().preview_png(png).build().bytes);
    let preview = doc.preview().unwrap();
    assert_eq!(preview.kind(), Some(PreviewImageKind::Png));
    assert_eq!(preview.header.len(), 80);
    assert_eq!(preview.image.as_ref().unwrap().data, png.to_vec());

    let doc = read_doc(&single_line().build().bytes);
    assert!(doc.preview().is_none());
}

// ===========================================================================
// Configuration
// ===========================================================================

#[test]
fn test_sequential_matches_parallel() {
    let mut builder = DwgFileBuilder::new();
    for i in 0..40u64 {
        let (data, handles) = line_streams((i as f64, 0.5), (i as f64 * 2.0, -3.25), 0x10);
        builder = builder.record(0x100 + i, 0x13, &data, &handles);
    }
    let bytes = builder.build().bytes;

    let parallel = read_doc(&bytes);
    let sequential = read_with(
        &bytes,
        DwgReaderConfiguration {
            parallel: false,
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(parallel.len(), 40);
    let a: Vec<_> = parallel.entities().collect();
    let b: Vec<_> = sequential.entities().collect();
    assert_eq!(a, b);
    assert_eq!(parallel.stats(), sequential.stats());
}

#[derive(Clone, Default)]
struct SharedSink(Arc<Mutex<Vec<Notification>>>);

impl NotificationSink for SharedSink {
    fn notify(&mut self, notification: &Notification) {
        if let Ok(mut items) = self.0.lock() {
            items.push(notification.clone());
        }
    }
}

#[test]
fn test_notification_sink_receives_everything() {
    let sink = SharedSink::default();
    let doc = DwgReader::from_bytes(widget_file())
        .with_notification_sink(sink.clone())
        .read()
        .unwrap();

    let received = sink.0.lock().unwrap();
    assert_eq!(received.len(), doc.notifications().len());
    assert!(!received.is_empty());
}

#[test]
fn test_sink_keeps_warnings_from_failed_read() {
    let (line, line_handles) = line_streams((0.0, 0.0), (3.0, 4.0), 0x10);
    let bytes = DwgFileBuilder::new()
        .record_with_own_handle(0x60, 0x61, 0x13, &line, &line_handles)
        .record(0x70, 0x7F, &line, &line_handles)
        .build()
        .bytes;

    for parallel in [false, true] {
        let sink = SharedSink::default();
        let config = DwgReaderConfiguration {
            parallel,
            ..Default::default()
        };
        let err = DwgReader::from_bytes(bytes.clone())
            .with_config(config)
            .with_notification_sink(sink.clone())
            .read()
            .unwrap_err();
        assert!(err.is_format(), "{err}");

        let received = sink.0.lock().unwrap();
        assert_eq!(received.len(), 1, "parallel = {parallel}: {received:?}");
        assert_eq!(received[0].notification_type, NotificationType::Warning);
    }
}

#[test]
fn test_from_file_and_reader() {
    let bytes = single_line().build().bytes;
    let path = std::env::temp_dir().join(format!("dwgr15_reader_{}.dwg", std::process::id()));
    std::fs::write(&path, &bytes).unwrap();

    let from_file = DwgReader::from_file(&path).unwrap().read().unwrap();
    let from_reader = DwgReader::from_reader(std::io::Cursor::new(bytes)).unwrap().read().unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(from_file.len(), 1);
    assert_eq!(
        from_file.entities().collect::<Vec<_>>(),
        from_reader.entities().collect::<Vec<_>>()
    );
    assert!(DwgReader::from_file(std::env::temp_dir().join("dwgr15_missing.dwg")).is_err());
}
