//! DWG Object Reader: decodes single records of the object data.
//!
//! # Record layout
//!
//! Each object-map offset points at a record:
//!
//! ```text
//! | MS size | data stream ... | handle stream ... | RS crc |
//!           |<------------- size bytes ------------>|
//! ```
//!
//! The data stream starts with the type code (BS) and the bit size of the
//! data stream (RL). Everything from that bit onward up to `size * 8` is the
//! handle stream. Both streams are read forward only, each through its own
//! [`DwgBitReader`], so a decoder may interleave reads from the two in
//! whatever order is convenient as long as the order within each stream is
//! kept.
//!
//! Decoding a record only depends on the file bytes and the class table,
//! which makes [`DwgObjectReader::read_record`] safe to call from many threads
//! at once.

pub mod common;
pub mod read_entities;
pub mod read_objects;
pub mod read_tables;
pub mod record;

use byteorder::{ByteOrder, LittleEndian};
use encoding_rs::Encoding;
use log::trace;

use crate::classes::ClassTable;
use crate::error::{DwgError, Result};
use crate::io::dwg::constants::{CRC_SEED, FIRST_CLASS_NUMBER};
use crate::io::dwg::crc::crc8;
use crate::io::dwg::object_type::EntityKind;
use crate::io::dwg::reader::stream_reader::DwgStreamReader;
use crate::io::dwg::reader::stream_reader_base::DwgBitReader;
use crate::io::dwg::section_io::slice_at;
use crate::notification::{Notification, NotificationType};
use crate::types::{Handle, HandleRef};

pub use self::record::{EntityRecord, ExtendedDataGroup};
use self::record::RecordBuilder;

/// Result of decoding one record.
#[derive(Debug)]
pub struct RecordOutcome {
    /// The record, or `None` when it was dropped by configuration.
    pub record: Option<EntityRecord>,
    pub notifications: Vec<Notification>,
}

/// Decoder for the records of one file.
pub struct DwgObjectReader<'a> {
    file: &'a [u8],
    classes: &'a ClassTable,
    encoding: &'static Encoding,
    validate_crc: bool,
    keep_opaque: bool,
}

impl<'a> DwgObjectReader<'a> {
    pub fn new(file: &'a [u8], classes: &'a ClassTable, encoding: &'static Encoding) -> Self {
        Self {
            file,
            classes,
            encoding,
            validate_crc: false,
            keep_opaque: true,
        }
    }

    /// Check each record's trailing CRC.
    pub fn with_crc_validation(mut self, validate_crc: bool) -> Self {
        self.validate_crc = validate_crc;
        self
    }

    /// Keep records of kinds that have no field decoder.
    pub fn with_opaque_records(mut self, keep_opaque: bool) -> Self {
        self.keep_opaque = keep_opaque;
        self
    }

    /// Decode the record at file offset `offset`, listed under `handle` in
    /// the object map.
    pub fn read_record(&self, handle: Handle, offset: u64) -> Result<RecordOutcome> {
        let (body, body_offset) = self.record_body(offset)?;
        let size_bits = body.len() as u64 * 8;

        let mut object_reader = DwgBitReader::new(body)
            .with_origin(body_offset)
            .with_encoding(self.encoding);

        let type_code = object_reader.read_bit_short()? as u16;
        let size_in_bits = object_reader.read_raw_ulong()?;
        let data_end = u64::from(size_in_bits);
        if data_end > size_bits || data_end < object_reader.position_in_bits() {
            return Err(object_reader.error_here(format!(
                "data stream of {size_in_bits} bits does not fit a {}-byte record",
                body.len()
            )));
        }
        let handles_reader = object_reader.sub_reader(data_end, size_bits)?;
        let object_reader = object_reader.with_limit_in_bits(data_end);

        let (kind, dxf_name, graphical) = self.resolve_kind(type_code, &object_reader)?;

        let mut streams = StreamSet {
            object_reader,
            handles_reader,
            current_handle: Handle::NULL,
        };
        let mut builder = RecordBuilder::new();

        let own_handle = streams.object_reader.handle_reference()?.handle;
        streams.current_handle = own_handle;
        if own_handle != handle {
            builder.notify(Notification::warning(format!(
                "record at {offset:#X} carries handle {own_handle}, object map lists {handle}"
            )));
        }
        builder.extended_data = self.read_extended_data(&mut streams)?;

        if graphical {
            self.read_common_entity_data(&mut streams, &mut builder)?;
        } else {
            self.read_common_non_entity_data(&mut streams, &mut builder)?;
        }

        if kind.is_opaque() && !self.keep_opaque {
            trace!("dropping {} record {handle}", kind);
            let mut notifications = builder.notifications;
            notifications.push(Notification::new(
                NotificationType::NotSupported,
                format!("{} record {handle} dropped", dxf_name.as_deref().unwrap_or(kind.name())),
            ));
            return Ok(RecordOutcome {
                record: None,
                notifications,
            });
        }

        self.read_object(kind, &mut streams, &mut builder)?;

        let unread = streams.object_reader.remaining_bits();
        if unread > 7 {
            builder.notify(Notification::warning(format!(
                "{} record {handle}: {unread} data bits left unread",
                kind
            )));
        }

        let (record, notifications) =
            builder.build(type_code, kind, own_handle, size_in_bits, dxf_name);
        Ok(RecordOutcome {
            record: Some(record),
            notifications,
        })
    }

    /// Size prefix, body and CRC of the record at `offset`. Returns the body
    /// and its file offset.
    fn record_body(&self, offset: u64) -> Result<(&'a [u8], u64)> {
        let mut size_reader = DwgBitReader::new(self.file);
        size_reader
            .set_position_in_bits(offset.saturating_mul(8))
            .map_err(|_| DwgError::format_at_byte("record offset past the end of the file", offset))?;

        let size = size_reader.read_modular_short()?;
        if size == 0 {
            return Err(DwgError::format_at_byte("record of size 0", offset));
        }
        let body_offset = size_reader.position_in_bits() / 8;
        let body = slice_at(self.file, body_offset, size, "object record")?;
        let crc_bytes = slice_at(self.file, body_offset + size, 2, "object record CRC")?;

        if self.validate_crc {
            let stored = LittleEndian::read_u16(crc_bytes);
            let covered = &self.file[offset as usize..(body_offset + size) as usize];
            let computed = crc8(CRC_SEED, covered);
            if stored != computed {
                return Err(DwgError::format_at_byte(
                    format!("record CRC mismatch: stored {stored:#06X}, computed {computed:#06X}"),
                    body_offset + size,
                ));
            }
        }
        Ok((body, body_offset))
    }

    /// Kind, class DXF name and graphical flag of a type code.
    fn resolve_kind(
        &self,
        type_code: u16,
        reader: &DwgBitReader<'_>,
    ) -> Result<(EntityKind, Option<String>, bool)> {
        if let Some(kind) = EntityKind::from_type_code(type_code) {
            return Ok((kind, None, kind.is_graphical()));
        }
        if type_code < FIRST_CLASS_NUMBER {
            return Err(reader.error_here(format!("unknown type code {type_code:#X}")));
        }
        let class = self.classes.by_number(type_code).ok_or_else(|| {
            reader.error_here(format!("type code {type_code} has no class definition"))
        })?;
        let kind = EntityKind::from_dxf_name(&class.dxf_name).unwrap_or(EntityKind::Opaque);
        let graphical = kind.is_graphical() || (kind == EntityKind::Opaque && class.is_entity());
        Ok((kind, Some(class.dxf_name.clone()), graphical))
    }

    /// Dispatch to the kind decoder.
    fn read_object(
        &self,
        kind: EntityKind,
        streams: &mut StreamSet<'_>,
        record: &mut RecordBuilder,
    ) -> Result<()> {
        use EntityKind::*;

        match kind {
            Text => self.read_text(streams, record),
            Attrib => self.read_attribute(streams, record),
            Attdef => self.read_attribute_definition(streams, record),
            Block => self.read_block(streams, record),
            Endblk | Seqend => Ok(()),
            Insert => self.read_insert(streams, record, false),
            Minsert => self.read_insert(streams, record, true),
            Vertex2D => self.read_vertex_2d(streams, record),
            Vertex3D | VertexMesh | VertexPface => self.read_vertex_3d(streams, record),
            VertexPfaceFace => self.read_pface_face(streams, record),
            Polyline2D => self.read_polyline_2d(streams, record),
            Polyline3D => self.read_polyline_3d(streams, record),
            PolylinePface => self.read_polyface_mesh(streams, record),
            PolylineMesh => self.read_polygon_mesh(streams, record),
            Arc => self.read_arc(streams, record),
            Circle => self.read_circle(streams, record),
            Line => self.read_line(streams, record),
            DimensionOrdinate => self.read_dim_ordinate(streams, record),
            DimensionLinear => self.read_dim_linear(streams, record),
            DimensionAligned => self.read_dim_aligned(streams, record),
            DimensionAng3Pt => self.read_dim_angular_3pt(streams, record),
            DimensionAng2Ln => self.read_dim_angular_2ln(streams, record),
            DimensionRadius | DimensionDiameter => self.read_dim_radial(streams, record),
            Point => self.read_point(streams, record),
            Face3D => self.read_3d_face(streams, record),
            Solid | Trace => self.read_solid(streams, record),
            Shape => self.read_shape(streams, record),
            Viewport => self.read_viewport(streams, record),
            Ellipse => self.read_ellipse(streams, record),
            Spline => self.read_spline(streams, record),
            Region | Solid3D | Body => self.read_modeler_geometry(streams, record),
            Ray | Xline => self.read_ray(streams, record),
            Mtext => self.read_mtext(streams, record),
            Leader => self.read_leader(streams, record),
            Tolerance => self.read_tolerance(streams, record),
            Mline => self.read_mline(streams, record),
            LwPolyline => self.read_lwpolyline(streams, record),
            Hatch => self.read_hatch(streams, record),
            Ole2Frame => self.read_ole2frame(streams, record),
            Image | Wipeout => self.read_image(streams, record),

            BlockControl => self.read_block_control(streams, record),
            LtypeControl => self.read_ltype_control(streams, record),
            DimstyleControl => self.read_dimstyle_control(streams, record),
            LayerControl | StyleControl | ViewControl | UcsControl | VportControl
            | AppidControl | VpEntHdrControl => self.read_table_control(streams, record),
            BlockHeader => self.read_block_header(streams, record),
            Layer => self.read_layer(streams, record),
            Style => self.read_text_style(streams, record),
            Ltype => self.read_ltype(streams, record),
            View => self.read_view(streams, record),
            Ucs => self.read_ucs(streams, record),
            Vport => self.read_vport(streams, record),
            Appid => self.read_appid(streams, record),
            Dimstyle => self.read_dimstyle(streams, record),
            VpEntHdr => self.read_viewport_entity_header(streams, record),

            Dictionary => self.read_dictionary(streams, record),
            DictionaryWithDefault => self.read_dictionary_with_default(streams, record),
            DictionaryVar => self.read_dictionary_var(streams, record),
            Group => self.read_group(streams, record),
            MlineStyle => self.read_mline_style(streams, record),
            XRecord => self.read_xrecord(streams, record),
            Placeholder => Ok(()),
            Layout => self.read_layout(streams, record),
            IdBuffer => self.read_id_buffer(streams, record),
            ImageDef => self.read_image_definition(streams, record),
            ImageDefReactor => self.read_image_definition_reactor(streams, record),
            LayerIndex => self.read_layer_index(streams, record),
            RasterVariables => self.read_raster_variables(streams, record),
            SortEntsTable => self.read_sort_entities_table(streams, record),
            SpatialFilter => self.read_spatial_filter(streams, record),
            SpatialIndex => self.read_spatial_index(streams, record),
            WipeoutVariables => self.read_wipeout_variables(streams, record),

            OleFrame | Dummy | LongTransaction | VbaProject | ProxyEntity | ProxyObject
            | Opaque => self.read_opaque(kind, streams, record),
        }
    }
}

// ---------------------------------------------------------------------------
// Stream set: the two sub-readers of one record
// ---------------------------------------------------------------------------

/// The data and handle streams of the record being decoded.
pub struct StreamSet<'a> {
    pub object_reader: DwgBitReader<'a>,
    pub handles_reader: DwgBitReader<'a>,
    /// Handle of the record, the base of relative handle codes.
    pub current_handle: Handle,
}

impl StreamSet<'_> {
    /// Read the next reference from the handle stream.
    pub fn handle_ref(&mut self) -> Result<HandleRef> {
        self.handles_reader.handle_reference_resolved(self.current_handle)
    }

    /// Read `count` references from the handle stream.
    pub fn handle_refs(&mut self, count: usize) -> Result<Vec<HandleRef>> {
        (0..count).map(|_| self.handle_ref()).collect()
    }

    pub fn read_text(&mut self) -> Result<String> {
        self.object_reader.read_variable_text()
    }
}
