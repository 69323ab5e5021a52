//! Decoders for symbol-table controls and entries.

use crate::error::Result;
use crate::io::dwg::reader::stream_reader::DwgStreamReader;
use crate::types::{Value, Vector2};

use super::record::RecordBuilder;
use super::{DwgObjectReader, StreamSet};

/// Size of the LTYPE text area holding shape-dash strings.
const LTYPE_STRING_AREA: usize = 256;

/// LTYPE shape flag: the dash carries text stored in the string area.
const LTYPE_DASH_IS_TEXT: i16 = 0x02;

impl DwgObjectReader<'_> {
    // -----------------------------------------------------------------------
    // Controls
    // -----------------------------------------------------------------------

    /// Entry count, then one soft-owner handle per entry.
    pub(super) fn read_table_control(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        let count = streams.object_reader.read_count()?;
        let entries = streams.handle_refs(count)?;
        record.set("entries", entries);
        Ok(())
    }

    pub(super) fn read_block_control(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        self.read_table_control(streams, record)?;
        record.set("model_space", streams.handle_ref()?);
        record.set("paper_space", streams.handle_ref()?);
        Ok(())
    }

    pub(super) fn read_ltype_control(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        self.read_table_control(streams, record)?;
        record.set("bylayer", streams.handle_ref()?);
        record.set("byblock", streams.handle_ref()?);
        Ok(())
    }

    /// The DIMSTYLE control lists extra handles after its entries.
    pub(super) fn read_dimstyle_control(
        &self,
        streams: &mut StreamSet<'_>,
        record: &mut RecordBuilder,
    ) -> Result<()> {
        let count = streams.object_reader.read_count()?;
        let extra = usize::from(streams.object_reader.read_byte()?);
        let entries = streams.handle_refs(count)?;
        record.set("entries", entries);
        let extra = streams.handle_refs(extra)?;
        record.set("extra_handles", extra);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Entries
    // -----------------------------------------------------------------------

    pub(super) fn read_block_header(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        self.read_table_entry_common(streams, record)?;

        let reader = &mut streams.object_reader;
        record.set("anonymous", reader.read_bit()?);
        record.set("has_attributes", reader.read_bit()?);
        let is_xref = reader.read_bit()?;
        let is_overlay = reader.read_bit()?;
        record.set("is_xref", is_xref);
        record.set("is_xref_overlay", is_overlay);
        record.set("loaded_xref", reader.read_bit()?);
        record.set("base_point", reader.read_3bit_double()?);
        record.set("xref_path", streams.read_text()?);

        // Inserts are counted as a run of non-zero bytes.
        let reader = &mut streams.object_reader;
        let mut insert_count = 0usize;
        while reader.read_byte()? != 0 {
            insert_count += 1;
        }
        record.set("description", streams.read_text()?);

        let reader = &mut streams.object_reader;
        let preview_size = reader.read_count()?;
        let preview = reader.read_bytes(preview_size)?;
        record.set("preview", Value::bytes(&preview));

        record.set("block_entity", streams.handle_ref()?);
        if !is_xref && !is_overlay {
            record.set("first_entity", streams.handle_ref()?);
            record.set("last_entity", streams.handle_ref()?);
        }
        record.set("end_block", streams.handle_ref()?);
        let inserts = streams.handle_refs(insert_count)?;
        record.set("inserts", inserts);
        record.set("layout", streams.handle_ref()?);
        Ok(())
    }

    pub(super) fn read_layer(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        self.read_table_entry_common(streams, record)?;

        let reader = &mut streams.object_reader;
        let values = reader.read_bit_short()?;
        record.set("frozen", values & 0x01 != 0);
        record.set("off", values & 0x02 != 0);
        record.set("frozen_in_new_viewports", values & 0x04 != 0);
        record.set("locked", values & 0x08 != 0);
        record.set("plot", values & 0x10 != 0);
        record.set("lineweight", (values & 0x03E0) >> 5);
        record.set("color", reader.read_cm_color()?);

        record.set("plotstyle", streams.handle_ref()?);
        record.set("linetype", streams.handle_ref()?);
        Ok(())
    }

    pub(super) fn read_text_style(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        self.read_table_entry_common(streams, record)?;

        let reader = &mut streams.object_reader;
        record.set("vertical", reader.read_bit()?);
        record.set("is_shape_file", reader.read_bit()?);
        record.set("fixed_height", reader.read_bit_double()?);
        record.set("width_factor", reader.read_bit_double()?);
        record.set("oblique_angle", reader.read_bit_double()?);
        record.set("generation", reader.read_byte()?);
        record.set("last_height", reader.read_bit_double()?);
        record.set("font_file", streams.read_text()?);
        record.set("bigfont_file", streams.read_text()?);
        Ok(())
    }

    /// LTYPE: dashes, then the fixed text area shared by text dashes.
    pub(super) fn read_ltype(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        self.read_table_entry_common(streams, record)?;
        record.set("description", streams.read_text()?);

        let reader = &mut streams.object_reader;
        record.set("pattern_length", reader.read_bit_double()?);
        record.set("alignment", reader.read_byte()?);
        let dash_count = usize::from(reader.read_byte()?);

        struct Dash {
            length: f64,
            shape_code: i16,
            offset: Vector2,
            scale: f64,
            rotation: f64,
            shape_flag: i16,
        }

        let mut dashes = Vec::new();
        for _ in 0..dash_count {
            let length = reader.read_bit_double()?;
            let shape_code = reader.read_bit_short()?;
            let offset_x = reader.read_raw_double()?;
            let offset_y = reader.read_raw_double()?;
            let scale = reader.read_bit_double()?;
            let rotation = reader.read_bit_double()?;
            let shape_flag = reader.read_bit_short()?;
            dashes.push(Dash {
                length,
                shape_code,
                offset: Vector2::new(offset_x, offset_y),
                scale,
                rotation,
                shape_flag,
            });
        }

        let strings = reader.read_bytes(LTYPE_STRING_AREA)?;
        let encoding = self.encoding;
        let mut values = Vec::new();
        for dash in &dashes {
            let text = if dash.shape_flag & LTYPE_DASH_IS_TEXT != 0 {
                let start = usize::try_from(dash.shape_code).unwrap_or(0).min(LTYPE_STRING_AREA);
                let tail = &strings[start..];
                let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
                encoding.decode(&tail[..end]).0.into_owned()
            } else {
                String::new()
            };
            let style = streams.handle_ref()?;
            values.push(Value::List(vec![
                Value::Float(dash.length),
                Value::from(dash.shape_code),
                Value::Point2(dash.offset),
                Value::Float(dash.scale),
                Value::Float(dash.rotation),
                Value::from(dash.shape_flag),
                Value::Str(text),
                Value::HandleRef(style),
            ]));
        }
        record.set("dashes", Value::List(values));
        Ok(())
    }

    pub(super) fn read_view(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        self.read_table_entry_common(streams, record)?;

        let reader = &mut streams.object_reader;
        record.set("height", reader.read_bit_double()?);
        record.set("width", reader.read_bit_double()?);
        record.set("center", reader.read_2raw_double()?);
        record.set("target", reader.read_3bit_double()?);
        record.set_vector("direction", reader.read_3bit_double()?);
        record.set("twist_angle", reader.read_bit_double()?);
        record.set("lens_length", reader.read_bit_double()?);
        record.set("front_clip", reader.read_bit_double()?);
        record.set("back_clip", reader.read_bit_double()?);
        record.set("view_mode", reader.read_bits(4)? as i64);
        record.set("render_mode", reader.read_byte()?);
        record.set("paper_space", reader.read_bit()?);

        let associated_ucs = reader.read_bit()?;
        record.set("associated_ucs", associated_ucs);
        if associated_ucs {
            record.set("ucs_origin", reader.read_3bit_double()?);
            record.set_vector("ucs_x_axis", reader.read_3bit_double()?);
            record.set_vector("ucs_y_axis", reader.read_3bit_double()?);
            record.set("ucs_elevation", reader.read_bit_double()?);
            record.set("ucs_ortho_type", reader.read_bit_short()?);
            record.set("base_ucs", streams.handle_ref()?);
            record.set("named_ucs", streams.handle_ref()?);
        }
        Ok(())
    }

    pub(super) fn read_ucs(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        self.read_table_entry_common(streams, record)?;

        let reader = &mut streams.object_reader;
        record.set("origin", reader.read_3bit_double()?);
        record.set_vector("x_axis", reader.read_3bit_double()?);
        record.set_vector("y_axis", reader.read_3bit_double()?);
        record.set("elevation", reader.read_bit_double()?);
        record.set("ortho_view_type", reader.read_bit_short()?);
        record.set("ortho_type", reader.read_bit_short()?);

        record.set("base_ucs", streams.handle_ref()?);
        record.set("named_ucs", streams.handle_ref()?);
        Ok(())
    }

    pub(super) fn read_vport(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        self.read_table_entry_common(streams, record)?;

        let reader = &mut streams.object_reader;
        record.set("view_height", reader.read_bit_double()?);
        record.set("aspect_ratio", reader.read_bit_double()?);
        record.set("view_center", reader.read_2raw_double()?);
        record.set("view_target", reader.read_3bit_double()?);
        record.set_vector("view_direction", reader.read_3bit_double()?);
        record.set("twist_angle", reader.read_bit_double()?);
        record.set("lens_length", reader.read_bit_double()?);
        record.set("front_clip", reader.read_bit_double()?);
        record.set("back_clip", reader.read_bit_double()?);
        record.set("view_mode", reader.read_bits(4)? as i64);
        record.set("render_mode", reader.read_byte()?);

        record.set("lower_left", reader.read_2raw_double()?);
        record.set("upper_right", reader.read_2raw_double()?);
        record.set("ucs_follow", reader.read_bit()?);
        record.set("circle_zoom", reader.read_bit_short()?);
        record.set("fast_zoom", reader.read_bit()?);
        record.set("ucs_icon", i64::from(reader.read_2bits()?));
        record.set("grid_on", reader.read_bit()?);
        record.set("grid_spacing", reader.read_2raw_double()?);
        record.set("snap_on", reader.read_bit()?);
        record.set("snap_style", reader.read_bit()?);
        record.set("snap_isopair", reader.read_bit_short()?);
        record.set("snap_rotation", reader.read_bit_double()?);
        record.set("snap_base", reader.read_2raw_double()?);
        record.set("snap_spacing", reader.read_2raw_double()?);

        record.set("unknown_bit", reader.read_bit()?);
        record.set("ucs_per_viewport", reader.read_bit()?);
        record.set("ucs_origin", reader.read_3bit_double()?);
        record.set_vector("ucs_x_axis", reader.read_3bit_double()?);
        record.set_vector("ucs_y_axis", reader.read_3bit_double()?);
        record.set("ucs_elevation", reader.read_bit_double()?);
        record.set("ucs_ortho_type", reader.read_bit_short()?);

        record.set("named_ucs", streams.handle_ref()?);
        record.set("base_ucs", streams.handle_ref()?);
        Ok(())
    }

    pub(super) fn read_appid(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        self.read_table_entry_common(streams, record)?;
        record.set("unknown_byte", streams.object_reader.read_byte()?);
        Ok(())
    }

    pub(super) fn read_dimstyle(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        self.read_table_entry_common(streams, record)?;

        record.set("DIMPOST", streams.read_text()?);
        record.set("DIMAPOST", streams.read_text()?);

        let reader = &mut streams.object_reader;
        for name in ["DIMSCALE", "DIMASZ", "DIMEXO", "DIMDLI", "DIMEXE", "DIMRND", "DIMDLE", "DIMTP", "DIMTM"] {
            record.set(name, reader.read_bit_double()?);
        }
        for name in ["DIMTOL", "DIMLIM", "DIMTIH", "DIMTOH", "DIMSE1", "DIMSE2"] {
            record.set(name, reader.read_bit()?);
        }
        for name in ["DIMTAD", "DIMZIN", "DIMAZIN"] {
            record.set(name, reader.read_bit_short()?);
        }
        for name in [
            "DIMTXT", "DIMCEN", "DIMTSZ", "DIMALTF", "DIMLFAC", "DIMTVP", "DIMTFAC", "DIMGAP",
            "DIMALTRND",
        ] {
            record.set(name, reader.read_bit_double()?);
        }
        record.set("DIMALT", reader.read_bit()?);
        record.set("DIMALTD", reader.read_bit_short()?);
        for name in ["DIMTOFL", "DIMSAH", "DIMTIX", "DIMSOXD"] {
            record.set(name, reader.read_bit()?);
        }
        for name in ["DIMCLRD", "DIMCLRE", "DIMCLRT"] {
            record.set(name, reader.read_cm_color()?);
        }
        for name in [
            "DIMADEC", "DIMDEC", "DIMTDEC", "DIMALTU", "DIMALTTD", "DIMAUNIT", "DIMFRAC",
            "DIMLUNIT", "DIMDSEP", "DIMTMOVE", "DIMJUST",
        ] {
            record.set(name, reader.read_bit_short()?);
        }
        record.set("DIMSD1", reader.read_bit()?);
        record.set("DIMSD2", reader.read_bit()?);
        for name in ["DIMTOLJ", "DIMTZIN", "DIMALTZ", "DIMALTTZ"] {
            record.set(name, reader.read_bit_short()?);
        }
        record.set("DIMUPT", reader.read_bit()?);
        record.set("DIMFIT", reader.read_bit_short()?);
        record.set("DIMLWD", reader.read_bit_short()?);
        record.set("DIMLWE", reader.read_bit_short()?);

        for name in ["DIMTXSTY", "DIMLDRBLK", "DIMBLK", "DIMBLK1", "DIMBLK2"] {
            record.set(name, streams.handle_ref()?);
        }
        Ok(())
    }

    pub(super) fn read_viewport_entity_header(
        &self,
        streams: &mut StreamSet<'_>,
        record: &mut RecordBuilder,
    ) -> Result<()> {
        self.read_table_entry_common(streams, record)?;
        record.set("active", streams.object_reader.read_bit()?);
        record.set("viewport", streams.handle_ref()?);
        Ok(())
    }
}
