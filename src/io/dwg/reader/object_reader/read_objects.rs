//! Decoders for non-graphical objects: dictionaries, groups, styles,
//! layouts, extension records and the raster/filter support objects.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{DwgError, Result};
use crate::io::dwg::reader::stream_reader::DwgStreamReader;
use crate::notification::Notification;
use crate::types::{Handle, HandleRef, Value, Vector3};

use super::record::RecordBuilder;
use super::{DwgObjectReader, StreamSet};

/// Storage of an XRECORD value, selected by its group code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum XRecordValueKind {
    Str,
    Point,
    Double,
    Int8,
    Int16,
    Int32,
    Int64,
    Bool,
    Binary,
    Handle,
}

impl XRecordValueKind {
    fn from_code(code: i16) -> Option<Self> {
        use XRecordValueKind::*;

        Some(match code {
            0..=9 | 100 | 102 | 300..=309 | 410..=419 | 430..=439 | 470..=479 | 999
            | 1000..=1003 | 1005..=1009 => Str,
            10..=39 | 110..=139 | 210..=239 | 1010..=1039 => Point,
            40..=59 | 140..=149 | 460..=469 | 1040..=1059 => Double,
            60..=79 | 170..=179 | 270..=279 | 370..=389 | 400..=409 | 1060..=1070 => Int16,
            90..=99 | 420..=429 | 440..=459 | 1071 => Int32,
            160..=169 => Int64,
            280..=289 => Int8,
            290..=299 => Bool,
            310..=319 | 1004 => Binary,
            105 | 320..=369 | 390..=399 | 480..=481 => Handle,
            _ => return None,
        })
    }
}

/// Byte cursor over the raw XRECORD data block.
struct XRecordCursor<'a> {
    data: &'a [u8],
    position: usize,
    /// File offset of `data[0]`, for errors.
    origin: u64,
}

impl<'a> XRecordCursor<'a> {
    fn take(&mut self, count: usize) -> Result<&'a [u8]> {
        let end = self.position + count;
        let bytes = self.data.get(self.position..end).ok_or_else(|| {
            DwgError::format_at_byte(
                format!("XRECORD value of {count} bytes overruns its data block"),
                self.origin,
            )
        })?;
        self.position = end;
        Ok(bytes)
    }

    fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }

    fn rest(&mut self) -> &'a [u8] {
        let rest = &self.data[self.position.min(self.data.len())..];
        self.position = self.data.len();
        rest
    }

    fn byte(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn short(&mut self) -> Result<i16> {
        Ok(LittleEndian::read_i16(self.take(2)?))
    }

    fn double(&mut self) -> Result<f64> {
        Ok(LittleEndian::read_f64(self.take(8)?))
    }
}

impl DwgObjectReader<'_> {
    // -----------------------------------------------------------------------
    // Dictionaries
    // -----------------------------------------------------------------------

    /// Names in the data stream, one soft- or hard-owner handle per name.
    pub(super) fn read_dictionary(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        let reader = &mut streams.object_reader;
        let count = reader.read_count()?;
        record.set("cloning_flags", reader.read_bit_short()?);
        record.set("hard_owner", reader.read_byte()?);

        let mut entries = Vec::new();
        for _ in 0..count {
            let name = streams.read_text()?;
            let handle = streams.handle_ref()?;
            entries.push(Value::List(vec![Value::Str(name), Value::HandleRef(handle)]));
        }
        record.set("entries", Value::List(entries));
        Ok(())
    }

    pub(super) fn read_dictionary_with_default(
        &self,
        streams: &mut StreamSet<'_>,
        record: &mut RecordBuilder,
    ) -> Result<()> {
        self.read_dictionary(streams, record)?;
        record.set("default_entry", streams.handle_ref()?);
        Ok(())
    }

    pub(super) fn read_dictionary_var(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        record.set("schema", streams.object_reader.read_byte()?);
        record.set("value", streams.read_text()?);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Groups and styles
    // -----------------------------------------------------------------------

    pub(super) fn read_group(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        record.set("description", streams.read_text()?);
        let reader = &mut streams.object_reader;
        record.set("unnamed", reader.read_bit_short_as_bool()?);
        record.set("selectable", reader.read_bit_short_as_bool()?);
        let count = reader.read_count()?;
        let entities = streams.handle_refs(count)?;
        record.set("entities", entities);
        Ok(())
    }

    pub(super) fn read_mline_style(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        record.set("name", streams.read_text()?);
        record.set("description", streams.read_text()?);

        let reader = &mut streams.object_reader;
        record.set("flags", reader.read_bit_short()?);
        record.set("fill_color", reader.read_cm_color()?);
        record.set("start_angle", reader.read_bit_double()?);
        record.set("end_angle", reader.read_bit_double()?);

        let count = reader.read_byte()?;
        let mut elements = Vec::new();
        for _ in 0..count {
            let offset = reader.read_bit_double()?;
            let color = reader.read_cm_color()?;
            let linetype_index = reader.read_bit_short()?;
            elements.push(Value::List(vec![
                Value::Float(offset),
                Value::from(color),
                Value::from(linetype_index),
            ]));
        }
        record.set("elements", Value::List(elements));
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Layout
    // -----------------------------------------------------------------------

    /// Plot settings followed by the layout's own fields.
    pub(super) fn read_layout(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        record.set("page_name", streams.read_text()?);
        record.set("printer_name", streams.read_text()?);

        let reader = &mut streams.object_reader;
        record.set("plot_flags", reader.read_bit_short()?);
        record.set("left_margin", reader.read_bit_double()?);
        record.set("bottom_margin", reader.read_bit_double()?);
        record.set("right_margin", reader.read_bit_double()?);
        record.set("top_margin", reader.read_bit_double()?);
        record.set("paper_width", reader.read_bit_double()?);
        record.set("paper_height", reader.read_bit_double()?);
        record.set("paper_size", streams.read_text()?);

        let reader = &mut streams.object_reader;
        record.set("plot_origin", reader.read_2bit_double()?);
        record.set("paper_units", reader.read_bit_short()?);
        record.set("paper_rotation", reader.read_bit_short()?);
        record.set("plot_type", reader.read_bit_short()?);
        record.set("window_lower_left", reader.read_2bit_double()?);
        record.set("window_upper_right", reader.read_2bit_double()?);
        record.set("plot_view_name", streams.read_text()?);

        let reader = &mut streams.object_reader;
        record.set("numerator_scale", reader.read_bit_double()?);
        record.set("denominator_scale", reader.read_bit_double()?);
        record.set("style_sheet", streams.read_text()?);

        let reader = &mut streams.object_reader;
        record.set("scale_type", reader.read_bit_short()?);
        record.set("scale_factor", reader.read_bit_double()?);
        record.set("paper_image_origin", reader.read_2bit_double()?);

        record.set("name", streams.read_text()?);
        let reader = &mut streams.object_reader;
        record.set("tab_order", reader.read_bit_long()?);
        record.set("layout_flags", reader.read_bit_short()?);
        record.set("ucs_origin", reader.read_3bit_double()?);
        record.set("limits_min", reader.read_2raw_double()?);
        record.set("limits_max", reader.read_2raw_double()?);
        record.set("insertion_base", reader.read_3bit_double()?);
        record.set_vector("ucs_x_axis", reader.read_3bit_double()?);
        record.set_vector("ucs_y_axis", reader.read_3bit_double()?);
        record.set("elevation", reader.read_bit_double()?);
        record.set("ortho_view_type", reader.read_bit_short()?);
        record.set("extents_min", reader.read_3bit_double()?);
        record.set("extents_max", reader.read_3bit_double()?);

        record.set("paper_space_block", streams.handle_ref()?);
        record.set("active_viewport", streams.handle_ref()?);
        record.set("base_ucs", streams.handle_ref()?);
        record.set("named_ucs", streams.handle_ref()?);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // XRECORD
    // -----------------------------------------------------------------------

    /// Group-code/value pairs stored byte-wise inside the bit stream.
    pub(super) fn read_xrecord(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        let reader = &mut streams.object_reader;
        let size = reader.read_count()?;
        let origin = reader.origin() + reader.position_in_bits() / 8;
        let data = reader.read_bytes(size)?;

        let mut cursor = XRecordCursor {
            data: &data,
            position: 0,
            origin,
        };
        let mut entries = Vec::new();
        while !cursor.is_empty() {
            let code = cursor.short()?;
            let Some(kind) = XRecordValueKind::from_code(code) else {
                let rest = cursor.rest();
                record.notify(Notification::warning(format!(
                    "XRECORD {}: unknown group code {code}, {} bytes kept raw",
                    streams.current_handle,
                    rest.len()
                )));
                entries.push(Value::List(vec![Value::from(code), Value::bytes(rest)]));
                break;
            };
            let value = self.read_xrecord_value(&mut cursor, kind)?;
            entries.push(Value::List(vec![Value::from(code), value]));
        }
        record.set("entries", Value::List(entries));

        record.set("cloning_flags", streams.object_reader.read_bit_short()?);

        // Any handles left belong to the record.
        let mut handles = Vec::new();
        while streams.handles_reader.remaining_bits() >= 8 {
            handles.push(streams.handle_ref()?);
        }
        record.set("object_handles", handles);
        Ok(())
    }

    fn read_xrecord_value(&self, cursor: &mut XRecordCursor<'_>, kind: XRecordValueKind) -> Result<Value> {
        Ok(match kind {
            XRecordValueKind::Str => {
                let length = cursor.short()?;
                let _code_page = cursor.byte()?;
                let bytes = cursor.take(usize::try_from(length).unwrap_or(0))?;
                Value::Str(self.encoding.decode(bytes).0.trim_end_matches('\0').to_string())
            }
            XRecordValueKind::Point => {
                Value::Point3(Vector3::new(cursor.double()?, cursor.double()?, cursor.double()?))
            }
            XRecordValueKind::Double => Value::Float(cursor.double()?),
            XRecordValueKind::Int8 => Value::from(cursor.byte()?),
            XRecordValueKind::Int16 => Value::from(cursor.short()?),
            XRecordValueKind::Int32 => Value::from(LittleEndian::read_i32(cursor.take(4)?)),
            XRecordValueKind::Int64 => Value::Int(LittleEndian::read_i64(cursor.take(8)?)),
            XRecordValueKind::Bool => Value::Bool(cursor.byte()? != 0),
            XRecordValueKind::Binary => {
                let length = usize::from(cursor.byte()?);
                Value::bytes(cursor.take(length)?)
            }
            XRecordValueKind::Handle => {
                let value = LittleEndian::read_u64(cursor.take(8)?);
                Value::HandleRef(HandleRef::new(0, Handle::new(value)))
            }
        })
    }

    // -----------------------------------------------------------------------
    // Support objects
    // -----------------------------------------------------------------------

    pub(super) fn read_id_buffer(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        let reader = &mut streams.object_reader;
        record.set("class_version", reader.read_byte()?);
        let count = reader.read_count()?;
        let ids = streams.handle_refs(count)?;
        record.set("object_ids", ids);
        Ok(())
    }

    pub(super) fn read_image_definition(
        &self,
        streams: &mut StreamSet<'_>,
        record: &mut RecordBuilder,
    ) -> Result<()> {
        let reader = &mut streams.object_reader;
        record.set("class_version", reader.read_bit_long()?);
        record.set("size", reader.read_2raw_double()?);
        record.set("file_name", streams.read_text()?);
        let reader = &mut streams.object_reader;
        record.set("is_loaded", reader.read_bit()?);
        record.set("resolution_units", reader.read_byte()?);
        record.set("pixel_size", reader.read_2raw_double()?);
        Ok(())
    }

    pub(super) fn read_image_definition_reactor(
        &self,
        streams: &mut StreamSet<'_>,
        record: &mut RecordBuilder,
    ) -> Result<()> {
        record.set("class_version", streams.object_reader.read_bit_long()?);
        Ok(())
    }

    pub(super) fn read_layer_index(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        let reader = &mut streams.object_reader;
        record.set("timestamp", reader.read_date_time()?);
        let count = reader.read_count()?;
        let mut names = Vec::new();
        for _ in 0..count {
            let index = streams.object_reader.read_bit_long()?;
            let name = streams.read_text()?;
            names.push(Value::List(vec![Value::from(index), Value::Str(name)]));
        }
        record.set("layers", Value::List(names));
        let buffers = streams.handle_refs(count)?;
        record.set("id_buffers", buffers);
        Ok(())
    }

    pub(super) fn read_raster_variables(
        &self,
        streams: &mut StreamSet<'_>,
        record: &mut RecordBuilder,
    ) -> Result<()> {
        let reader = &mut streams.object_reader;
        record.set("class_version", reader.read_bit_long()?);
        record.set("display_frame", reader.read_bit_short()?);
        record.set("display_quality", reader.read_bit_short()?);
        record.set("units", reader.read_bit_short()?);
        Ok(())
    }

    /// Sort handles live in the data stream, entity handles in the handle
    /// stream.
    pub(super) fn read_sort_entities_table(
        &self,
        streams: &mut StreamSet<'_>,
        record: &mut RecordBuilder,
    ) -> Result<()> {
        record.set("block_owner", streams.handle_ref()?);
        let count = streams.object_reader.read_count()?;
        let mut entries = Vec::new();
        for _ in 0..count {
            let sort_handle = streams.object_reader.handle_reference()?;
            let entity = streams.handle_ref()?;
            entries.push(Value::List(vec![
                Value::HandleRef(sort_handle),
                Value::HandleRef(entity),
            ]));
        }
        record.set("entries", Value::List(entries));
        Ok(())
    }

    pub(super) fn read_spatial_filter(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        let reader = &mut streams.object_reader;
        let count = reader.read_bit_short()?;
        if count < 0 {
            return Err(reader.error_here(format!("negative clip point count {count}")));
        }
        let points = (0..count)
            .map(|_| reader.read_2raw_double())
            .collect::<Result<Vec<_>>>()?;
        record.set("boundary", points);
        record.set_vector("extrusion", reader.read_3bit_double()?);
        record.set("origin", reader.read_3bit_double()?);
        record.set("display_boundary", reader.read_bit_short_as_bool()?);

        if reader.read_bit_short_as_bool()? {
            record.set("front_distance", reader.read_bit_double()?);
        }
        if reader.read_bit_short_as_bool()? {
            record.set("back_distance", reader.read_bit_double()?);
        }

        let inverse = (0..12)
            .map(|_| reader.read_bit_double())
            .collect::<Result<Vec<_>>>()?;
        record.set("inverse_insert_transform", inverse);
        let transform = (0..12)
            .map(|_| reader.read_bit_double())
            .collect::<Result<Vec<_>>>()?;
        record.set("insert_transform", transform);
        Ok(())
    }

    pub(super) fn read_spatial_index(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        record.set("timestamp", streams.object_reader.read_date_time()?);
        self.read_remaining_data(streams, record)
    }

    pub(super) fn read_wipeout_variables(
        &self,
        streams: &mut StreamSet<'_>,
        record: &mut RecordBuilder,
    ) -> Result<()> {
        record.set("display_frame", streams.object_reader.read_bit_short()?);
        Ok(())
    }
}
