//! Decoders for graphical records.
//!
//! Each decoder runs after the common entity data and reads the kind's own
//! fields from the data stream and its handles from the handle stream.

use bitflags::bitflags;

use crate::error::Result;
use crate::io::dwg::reader::stream_reader::DwgStreamReader;
use crate::io::dwg::reader::stream_reader_base::DwgBitReader;
use crate::types::{Value, Vector2, Vector3};

use super::record::RecordBuilder;
use super::{DwgObjectReader, StreamSet};

bitflags! {
    /// LWPOLYLINE flag word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LwPolylineFlags: u16 {
        const HAS_EXTRUSION = 0x0001;
        const HAS_THICKNESS = 0x0002;
        const HAS_CONST_WIDTH = 0x0004;
        const HAS_ELEVATION = 0x0008;
        const HAS_BULGES = 0x0010;
        const HAS_WIDTHS = 0x0020;
        const PLINEGEN = 0x0100;
        const CLOSED = 0x0200;
    }
}

fn read_points3(reader: &mut DwgBitReader<'_>, count: usize) -> Result<Vec<Vector3>> {
    (0..count).map(|_| reader.read_3bit_double()).collect()
}

fn read_doubles(reader: &mut DwgBitReader<'_>, count: usize) -> Result<Vec<f64>> {
    (0..count).map(|_| reader.read_bit_double()).collect()
}

fn read_raw_points2(reader: &mut DwgBitReader<'_>, count: usize) -> Result<Vec<Vector2>> {
    (0..count).map(|_| reader.read_2raw_double()).collect()
}

/// Decode an ACIS SAT block: bytes above 32 are stored as `159 - c`.
fn decode_sat(data: &[u8]) -> String {
    data.iter()
        .map(|&c| if c <= 32 { c } else { 159u8.wrapping_sub(c) })
        .map(char::from)
        .collect()
}

impl DwgObjectReader<'_> {
    // -----------------------------------------------------------------------
    // Text, attributes, blocks
    // -----------------------------------------------------------------------

    pub(super) fn read_text(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        self.read_text_data(streams, record)
    }

    /// TEXT body shared by ATTRIB and ATTDEF. Absent fields are flagged in
    /// the leading data-flags byte.
    fn read_text_data(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        let reader = &mut streams.object_reader;
        let flags = reader.read_byte()?;
        record.set("data_flags", flags);

        let elevation = if flags & 0x01 == 0 { reader.read_raw_double()? } else { 0.0 };
        let insertion = reader.read_2raw_double()?;
        let alignment = if flags & 0x02 == 0 {
            reader.read_2bit_double_with_default(insertion)?
        } else {
            insertion
        };
        record.set("insertion", insertion.with_z(elevation));
        record.set("alignment", alignment.with_z(elevation));
        record.set_vector("extrusion", reader.read_bit_extrusion()?);
        record.set("thickness", reader.read_bit_thickness()?);

        let oblique = if flags & 0x04 == 0 { reader.read_raw_double()? } else { 0.0 };
        let rotation = if flags & 0x08 == 0 { reader.read_raw_double()? } else { 0.0 };
        let height = reader.read_raw_double()?;
        let width_factor = if flags & 0x10 == 0 { reader.read_raw_double()? } else { 1.0 };
        record.set("oblique_angle", oblique);
        record.set("rotation", rotation);
        record.set("height", height);
        record.set("width_factor", width_factor);

        record.set("value", streams.read_text()?);

        let reader = &mut streams.object_reader;
        let generation = if flags & 0x20 == 0 { reader.read_bit_short()? } else { 0 };
        let horizontal = if flags & 0x40 == 0 { reader.read_bit_short()? } else { 0 };
        let vertical = if flags & 0x80 == 0 { reader.read_bit_short()? } else { 0 };
        record.set("generation", generation);
        record.set("horizontal_alignment", horizontal);
        record.set("vertical_alignment", vertical);

        record.set("style", streams.handle_ref()?);
        Ok(())
    }

    fn read_attribute_data(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        self.read_text_data(streams, record)?;
        record.set("tag", streams.read_text()?);
        record.set("field_length", streams.object_reader.read_bit_short()?);
        record.set("attribute_flags", streams.object_reader.read_byte()?);
        Ok(())
    }

    pub(super) fn read_attribute(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        self.read_attribute_data(streams, record)
    }

    pub(super) fn read_attribute_definition(
        &self,
        streams: &mut StreamSet<'_>,
        record: &mut RecordBuilder,
    ) -> Result<()> {
        self.read_attribute_data(streams, record)?;
        record.set("prompt", streams.read_text()?);
        Ok(())
    }

    pub(super) fn read_block(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        record.set("name", streams.read_text()?);
        Ok(())
    }

    /// INSERT and MINSERT.
    pub(super) fn read_insert(
        &self,
        streams: &mut StreamSet<'_>,
        record: &mut RecordBuilder,
        multiple: bool,
    ) -> Result<()> {
        let reader = &mut streams.object_reader;
        record.set("insertion", reader.read_3bit_double()?);

        let scale = match reader.read_2bits()? {
            0 => {
                let x = reader.read_raw_double()?;
                let y = reader.read_bit_double_with_default(x)?;
                let z = reader.read_bit_double_with_default(x)?;
                Vector3::new(x, y, z)
            }
            1 => {
                let y = reader.read_bit_double_with_default(1.0)?;
                let z = reader.read_bit_double_with_default(1.0)?;
                Vector3::new(1.0, y, z)
            }
            2 => {
                let x = reader.read_raw_double()?;
                Vector3::new(x, x, x)
            }
            _ => Vector3::new(1.0, 1.0, 1.0),
        };
        record.set_vector("scale", scale);
        record.set("rotation", reader.read_bit_double()?);
        record.set_vector("extrusion", reader.read_3bit_double()?);
        let has_attributes = reader.read_bit()?;
        record.set("has_attributes", has_attributes);

        if multiple {
            record.set("column_count", reader.read_bit_short()?);
            record.set("row_count", reader.read_bit_short()?);
            record.set("column_spacing", reader.read_bit_double()?);
            record.set("row_spacing", reader.read_bit_double()?);
        }

        record.set("block_header", streams.handle_ref()?);
        if has_attributes {
            record.set("first_attribute", streams.handle_ref()?);
            record.set("last_attribute", streams.handle_ref()?);
            record.set("seqend", streams.handle_ref()?);
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Polylines and vertices
    // -----------------------------------------------------------------------

    pub(super) fn read_vertex_2d(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        let reader = &mut streams.object_reader;
        record.set("flags", reader.read_byte()?);
        record.set("point", reader.read_3bit_double()?);

        // A negative start width stands for equal start and end widths.
        let start_width = reader.read_bit_double()?;
        let end_width = if start_width < 0.0 {
            start_width.abs()
        } else {
            reader.read_bit_double()?
        };
        record.set("start_width", start_width.abs());
        record.set("end_width", end_width);
        record.set("bulge", reader.read_bit_double()?);
        record.set("tangent_direction", reader.read_bit_double()?);
        Ok(())
    }

    /// VERTEX_3D, VERTEX_MESH and VERTEX_PFACE.
    pub(super) fn read_vertex_3d(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        let reader = &mut streams.object_reader;
        record.set("flags", reader.read_byte()?);
        record.set("point", reader.read_3bit_double()?);
        Ok(())
    }

    pub(super) fn read_pface_face(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        let reader = &mut streams.object_reader;
        let indices = (0..4)
            .map(|_| reader.read_bit_short())
            .collect::<Result<Vec<_>>>()?;
        record.set("vertex_indices", indices);
        Ok(())
    }

    fn read_polyline_handles(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        record.set("first_vertex", streams.handle_ref()?);
        record.set("last_vertex", streams.handle_ref()?);
        record.set("seqend", streams.handle_ref()?);
        Ok(())
    }

    pub(super) fn read_polyline_2d(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        let reader = &mut streams.object_reader;
        record.set("flags", reader.read_bit_short()?);
        record.set("curve_type", reader.read_bit_short()?);
        record.set("start_width", reader.read_bit_double()?);
        record.set("end_width", reader.read_bit_double()?);
        record.set("thickness", reader.read_bit_thickness()?);
        record.set("elevation", reader.read_bit_double()?);
        record.set_vector("extrusion", reader.read_bit_extrusion()?);
        self.read_polyline_handles(streams, record)
    }

    pub(super) fn read_polyline_3d(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        let reader = &mut streams.object_reader;
        record.set("spline_flags", reader.read_byte()?);
        record.set("closed_flags", reader.read_byte()?);
        self.read_polyline_handles(streams, record)
    }

    pub(super) fn read_polyface_mesh(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        let reader = &mut streams.object_reader;
        record.set("vertex_count", reader.read_bit_short()?);
        record.set("face_count", reader.read_bit_short()?);
        self.read_polyline_handles(streams, record)
    }

    pub(super) fn read_polygon_mesh(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        let reader = &mut streams.object_reader;
        record.set("flags", reader.read_bit_short()?);
        record.set("curve_type", reader.read_bit_short()?);
        record.set("m_vertex_count", reader.read_bit_short()?);
        record.set("n_vertex_count", reader.read_bit_short()?);
        record.set("m_density", reader.read_bit_short()?);
        record.set("n_density", reader.read_bit_short()?);
        self.read_polyline_handles(streams, record)
    }

    pub(super) fn read_lwpolyline(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        let reader = &mut streams.object_reader;
        let flags = LwPolylineFlags::from_bits_retain(reader.read_bit_short()? as u16);
        record.set("flags", flags.bits());
        record.set("closed", flags.contains(LwPolylineFlags::CLOSED));

        if flags.contains(LwPolylineFlags::HAS_CONST_WIDTH) {
            record.set("constant_width", reader.read_bit_double()?);
        }
        if flags.contains(LwPolylineFlags::HAS_ELEVATION) {
            record.set("elevation", reader.read_bit_double()?);
        }
        if flags.contains(LwPolylineFlags::HAS_THICKNESS) {
            record.set("thickness", reader.read_bit_double()?);
        }
        if flags.contains(LwPolylineFlags::HAS_EXTRUSION) {
            record.set_vector("extrusion", reader.read_3bit_double()?);
        }

        let point_count = reader.read_count()?;
        let bulge_count = if flags.contains(LwPolylineFlags::HAS_BULGES) {
            reader.read_count()?
        } else {
            0
        };
        let width_count = if flags.contains(LwPolylineFlags::HAS_WIDTHS) {
            reader.read_count()?
        } else {
            0
        };

        // Points after the first are stored as DD against the previous one.
        let mut points: Vec<Vector2> = Vec::new();
        for _ in 0..point_count {
            let point = match points.last() {
                Some(&previous) => reader.read_2bit_double_with_default(previous)?,
                None => reader.read_2raw_double()?,
            };
            points.push(point);
        }
        record.set("points", points);
        record.set("bulges", read_doubles(reader, bulge_count)?);

        let mut widths = Vec::new();
        for _ in 0..width_count {
            let start = reader.read_bit_double()?;
            let end = reader.read_bit_double()?;
            widths.push(Value::List(vec![Value::Float(start), Value::Float(end)]));
        }
        record.set("widths", Value::List(widths));
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Curves and points
    // -----------------------------------------------------------------------

    pub(super) fn read_arc(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        self.read_circle(streams, record)?;
        let reader = &mut streams.object_reader;
        record.set("start_angle", reader.read_bit_double()?);
        record.set("end_angle", reader.read_bit_double()?);
        Ok(())
    }

    pub(super) fn read_circle(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        let reader = &mut streams.object_reader;
        record.set("center", reader.read_3bit_double()?);
        record.set("radius", reader.read_bit_double()?);
        record.set("thickness", reader.read_bit_thickness()?);
        record.set_vector("extrusion", reader.read_bit_extrusion()?);
        Ok(())
    }

    /// LINE endpoints are stored coordinate by coordinate, the end point as
    /// DD against the start point. `p1`/`p2` are 2D when the z-zero bit is
    /// set.
    pub(super) fn read_line(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        let reader = &mut streams.object_reader;
        let z_is_zero = reader.read_bit()?;
        let x1 = reader.read_raw_double()?;
        let x2 = reader.read_bit_double_with_default(x1)?;
        let y1 = reader.read_raw_double()?;
        let y2 = reader.read_bit_double_with_default(y1)?;
        if z_is_zero {
            record.set("p1", Vector2::new(x1, y1));
            record.set("p2", Vector2::new(x2, y2));
        } else {
            let z1 = reader.read_raw_double()?;
            let z2 = reader.read_bit_double_with_default(z1)?;
            record.set("p1", Vector3::new(x1, y1, z1));
            record.set("p2", Vector3::new(x2, y2, z2));
        }
        record.set("thickness", reader.read_bit_thickness()?);
        record.set_vector("extrusion", reader.read_bit_extrusion()?);
        Ok(())
    }

    pub(super) fn read_point(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        let reader = &mut streams.object_reader;
        record.set("location", reader.read_3bit_double()?);
        record.set("thickness", reader.read_bit_thickness()?);
        record.set_vector("extrusion", reader.read_bit_extrusion()?);
        record.set("x_axis_angle", reader.read_bit_double()?);
        Ok(())
    }

    pub(super) fn read_3d_face(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        let reader = &mut streams.object_reader;
        let no_flags = reader.read_bit()?;
        let z_is_zero = reader.read_bit()?;
        let x = reader.read_raw_double()?;
        let y = reader.read_raw_double()?;
        let z = if z_is_zero { 0.0 } else { reader.read_raw_double()? };

        let mut corners = vec![Vector3::new(x, y, z)];
        for _ in 1..4 {
            let previous = corners[corners.len() - 1];
            let corner = Vector3::new(
                reader.read_bit_double_with_default(previous.x)?,
                reader.read_bit_double_with_default(previous.y)?,
                reader.read_bit_double_with_default(previous.z)?,
            );
            corners.push(corner);
        }
        for (name, corner) in ["first_corner", "second_corner", "third_corner", "fourth_corner"]
            .into_iter()
            .zip(corners)
        {
            record.set(name, corner);
        }

        let invisible_edges = if no_flags { 0 } else { reader.read_bit_short()? };
        record.set("invisible_edges", invisible_edges);
        Ok(())
    }

    /// SOLID and TRACE: four 2D corners at one elevation.
    pub(super) fn read_solid(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        let reader = &mut streams.object_reader;
        record.set("thickness", reader.read_bit_thickness()?);
        let elevation = reader.read_bit_double()?;
        for name in ["first_corner", "second_corner", "third_corner", "fourth_corner"] {
            record.set(name, reader.read_2raw_double()?.with_z(elevation));
        }
        record.set_vector("extrusion", reader.read_bit_extrusion()?);
        Ok(())
    }

    pub(super) fn read_shape(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        let reader = &mut streams.object_reader;
        record.set("insertion", reader.read_3bit_double()?);
        record.set("size", reader.read_bit_double()?);
        record.set("rotation", reader.read_bit_double()?);
        record.set("width_factor", reader.read_bit_double()?);
        record.set("oblique_angle", reader.read_bit_double()?);
        record.set("thickness", reader.read_bit_double()?);
        record.set("shape_number", reader.read_bit_short()?);
        record.set_vector("extrusion", reader.read_3bit_double()?);
        record.set("style", streams.handle_ref()?);
        Ok(())
    }

    pub(super) fn read_ellipse(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        let reader = &mut streams.object_reader;
        record.set("center", reader.read_3bit_double()?);
        record.set_vector("major_axis", reader.read_3bit_double()?);
        record.set_vector("extrusion", reader.read_3bit_double()?);
        record.set("axis_ratio", reader.read_bit_double()?);
        record.set("start_parameter", reader.read_bit_double()?);
        record.set("end_parameter", reader.read_bit_double()?);
        Ok(())
    }

    /// Scenario 1 stores control points, scenario 2 fit points.
    pub(super) fn read_spline(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        let reader = &mut streams.object_reader;
        let scenario = reader.read_bit_long()?;
        record.set("scenario", scenario);
        record.set("degree", reader.read_bit_long()?);

        let mut knot_count = 0;
        let mut control_count = 0;
        let mut fit_count = 0;
        let mut weighted = false;
        match scenario {
            2 => {
                record.set("fit_tolerance", reader.read_bit_double()?);
                record.set_vector("begin_tangent", reader.read_3bit_double()?);
                record.set_vector("end_tangent", reader.read_3bit_double()?);
                fit_count = reader.read_count()?;
            }
            1 => {
                record.set("rational", reader.read_bit()?);
                record.set("closed", reader.read_bit()?);
                record.set("periodic", reader.read_bit()?);
                record.set("knot_tolerance", reader.read_bit_double()?);
                record.set("control_tolerance", reader.read_bit_double()?);
                knot_count = reader.read_count()?;
                control_count = reader.read_count()?;
                weighted = reader.read_bit()?;
            }
            other => {
                return Err(reader.error_here(format!("unknown spline scenario {other}")));
            }
        }

        record.set("knots", read_doubles(reader, knot_count)?);
        let mut control_points = Vec::new();
        let mut weights = Vec::new();
        for _ in 0..control_count {
            control_points.push(reader.read_3bit_double()?);
            if weighted {
                weights.push(reader.read_bit_double()?);
            }
        }
        record.set("control_points", control_points);
        record.set("weights", weights);
        record.set("fit_points", read_points3(reader, fit_count)?);
        Ok(())
    }

    /// RAY and XLINE.
    pub(super) fn read_ray(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        let reader = &mut streams.object_reader;
        record.set("base_point", reader.read_3bit_double()?);
        record.set_vector("direction", reader.read_3bit_double()?);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Dimensions
    // -----------------------------------------------------------------------

    /// Fields shared by every dimension kind, read before the kind's points.
    fn read_dimension_common(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        let reader = &mut streams.object_reader;
        record.set_vector("extrusion", reader.read_3bit_double()?);
        record.set("text_midpoint", reader.read_2raw_double()?);
        record.set("elevation", reader.read_bit_double()?);
        record.set("dimension_flags", reader.read_byte()?);
        record.set("user_text", streams.read_text()?);

        let reader = &mut streams.object_reader;
        record.set("text_rotation", reader.read_bit_double()?);
        record.set("horizontal_direction", reader.read_bit_double()?);
        record.set_vector("insertion_scale", reader.read_3bit_double()?);
        record.set("insertion_rotation", reader.read_bit_double()?);
        record.set("attachment_point", reader.read_bit_short()?);
        record.set("line_spacing_style", reader.read_bit_short()?);
        record.set("line_spacing_factor", reader.read_bit_double()?);
        record.set("actual_measurement", reader.read_bit_double()?);
        record.set("insertion_point", reader.read_2raw_double()?);

        record.set("dimension_style", streams.handle_ref()?);
        record.set("block", streams.handle_ref()?);
        Ok(())
    }

    pub(super) fn read_dim_ordinate(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        self.read_dimension_common(streams, record)?;
        let reader = &mut streams.object_reader;
        record.set("definition_point", reader.read_3bit_double()?);
        record.set("feature_location", reader.read_3bit_double()?);
        record.set("leader_endpoint", reader.read_3bit_double()?);
        record.set("ordinate_flags", reader.read_byte()?);
        Ok(())
    }

    pub(super) fn read_dim_linear(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        self.read_dim_aligned(streams, record)?;
        record.set("rotation", streams.object_reader.read_bit_double()?);
        Ok(())
    }

    pub(super) fn read_dim_aligned(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        self.read_dimension_common(streams, record)?;
        let reader = &mut streams.object_reader;
        record.set("first_point", reader.read_3bit_double()?);
        record.set("second_point", reader.read_3bit_double()?);
        record.set("definition_point", reader.read_3bit_double()?);
        record.set("extension_line_rotation", reader.read_bit_double()?);
        Ok(())
    }

    pub(super) fn read_dim_angular_3pt(
        &self,
        streams: &mut StreamSet<'_>,
        record: &mut RecordBuilder,
    ) -> Result<()> {
        self.read_dimension_common(streams, record)?;
        let reader = &mut streams.object_reader;
        record.set("definition_point", reader.read_3bit_double()?);
        record.set("first_point", reader.read_3bit_double()?);
        record.set("second_point", reader.read_3bit_double()?);
        record.set("angle_vertex", reader.read_3bit_double()?);
        Ok(())
    }

    pub(super) fn read_dim_angular_2ln(
        &self,
        streams: &mut StreamSet<'_>,
        record: &mut RecordBuilder,
    ) -> Result<()> {
        self.read_dimension_common(streams, record)?;
        let reader = &mut streams.object_reader;
        record.set("dimension_arc", reader.read_2raw_double()?);
        record.set("first_point", reader.read_3bit_double()?);
        record.set("second_point", reader.read_3bit_double()?);
        record.set("angle_vertex", reader.read_3bit_double()?);
        record.set("definition_point", reader.read_3bit_double()?);
        Ok(())
    }

    /// RADIUS and DIAMETER.
    pub(super) fn read_dim_radial(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        self.read_dimension_common(streams, record)?;
        let reader = &mut streams.object_reader;
        record.set("definition_point", reader.read_3bit_double()?);
        record.set("angle_vertex", reader.read_3bit_double()?);
        record.set("leader_length", reader.read_bit_double()?);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Viewport
    // -----------------------------------------------------------------------

    pub(super) fn read_viewport(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        let reader = &mut streams.object_reader;
        record.set("center", reader.read_3bit_double()?);
        record.set("width", reader.read_bit_double()?);
        record.set("height", reader.read_bit_double()?);

        record.set("view_target", reader.read_3bit_double()?);
        record.set_vector("view_direction", reader.read_3bit_double()?);
        record.set("twist_angle", reader.read_bit_double()?);
        record.set("view_height", reader.read_bit_double()?);
        record.set("lens_length", reader.read_bit_double()?);
        record.set("front_clip", reader.read_bit_double()?);
        record.set("back_clip", reader.read_bit_double()?);
        record.set("snap_angle", reader.read_bit_double()?);
        record.set("view_center", reader.read_2raw_double()?);
        record.set("snap_base", reader.read_2raw_double()?);
        record.set("snap_spacing", reader.read_2raw_double()?);
        record.set("grid_spacing", reader.read_2raw_double()?);
        record.set("circle_zoom", reader.read_bit_short()?);

        let frozen_count = reader.read_count()?;
        record.set("status_flags", reader.read_bit_long()?);
        record.set("style_sheet", streams.read_text()?);

        let reader = &mut streams.object_reader;
        record.set("render_mode", reader.read_byte()?);
        record.set("ucs_at_origin", reader.read_bit()?);
        record.set("ucs_per_viewport", reader.read_bit()?);
        record.set("ucs_origin", reader.read_3bit_double()?);
        record.set_vector("ucs_x_axis", reader.read_3bit_double()?);
        record.set_vector("ucs_y_axis", reader.read_3bit_double()?);
        record.set("ucs_elevation", reader.read_bit_double()?);
        record.set("ucs_ortho_type", reader.read_bit_short()?);

        let frozen = streams.handle_refs(frozen_count)?;
        record.set("frozen_layers", frozen);
        record.set("clip_boundary", streams.handle_ref()?);
        record.set("viewport_header", streams.handle_ref()?);
        record.set("named_ucs", streams.handle_ref()?);
        record.set("base_ucs", streams.handle_ref()?);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Modeler geometry
    // -----------------------------------------------------------------------

    /// REGION, 3DSOLID and BODY.
    pub(super) fn read_modeler_geometry(
        &self,
        streams: &mut StreamSet<'_>,
        record: &mut RecordBuilder,
    ) -> Result<()> {
        let reader = &mut streams.object_reader;
        let empty = reader.read_bit()?;
        record.set("acis_empty", empty);
        if empty {
            return Ok(());
        }
        record.set("unknown_bit", reader.read_bit()?);
        let version = reader.read_bit_short()?;
        record.set("modeler_version", version);
        if version != 1 {
            // Binary SAB data has no block framing in this format version.
            return self.read_remaining_data(streams, record);
        }

        let mut sat = String::new();
        loop {
            let size = reader.read_bit_long()?;
            if size <= 0 {
                break;
            }
            let block = reader.read_bytes(size as usize)?;
            sat.push_str(&decode_sat(&block));
        }
        record.set("sat", sat);

        let wireframe = reader.read_bit()?;
        record.set("has_wireframe", wireframe);
        if wireframe {
            if reader.read_bit()? {
                record.set("wireframe_point", reader.read_3bit_double()?);
            }
            record.set("isolines", reader.read_bit_long()?);
            let isolines_present = reader.read_bit()?;
            if isolines_present {
                let wire_count = reader.read_count()?;
                let wires = (0..wire_count)
                    .map(|_| read_wire(reader))
                    .collect::<Result<Vec<_>>>()?;
                record.set("wires", Value::List(wires));

                let silhouette_count = reader.read_count()?;
                let mut silhouettes = Vec::new();
                for _ in 0..silhouette_count {
                    silhouettes.push(read_silhouette(reader)?);
                }
                record.set("silhouettes", Value::List(silhouettes));
            }
        }
        record.set("acis_empty_bit", reader.read_bit()?);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Annotation
    // -----------------------------------------------------------------------

    pub(super) fn read_mtext(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        let reader = &mut streams.object_reader;
        record.set("insertion", reader.read_3bit_double()?);
        record.set_vector("extrusion", reader.read_3bit_double()?);
        record.set_vector("x_direction", reader.read_3bit_double()?);
        record.set("rectangle_width", reader.read_bit_double()?);
        record.set("height", reader.read_bit_double()?);
        record.set("attachment_point", reader.read_bit_short()?);
        record.set("drawing_direction", reader.read_bit_short()?);
        record.set("extents_height", reader.read_bit_double()?);
        record.set("extents_width", reader.read_bit_double()?);
        record.set("value", streams.read_text()?);

        let reader = &mut streams.object_reader;
        record.set("line_spacing_style", reader.read_bit_short()?);
        record.set("line_spacing_factor", reader.read_bit_double()?);
        record.set("unknown_bit", reader.read_bit()?);
        record.set("style", streams.handle_ref()?);
        Ok(())
    }

    pub(super) fn read_leader(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        let reader = &mut streams.object_reader;
        record.set("unknown_bit", reader.read_bit()?);
        record.set("annotation_type", reader.read_bit_short()?);
        record.set("path_type", reader.read_bit_short()?);
        let count = reader.read_count()?;
        record.set("vertices", read_points3(reader, count)?);
        record.set("origin", reader.read_3bit_double()?);
        record.set_vector("extrusion", reader.read_3bit_double()?);
        record.set_vector("horizontal_direction", reader.read_3bit_double()?);
        record.set_vector("block_offset", reader.read_3bit_double()?);
        record.set_vector("annotation_offset", reader.read_3bit_double()?);
        record.set("box_height", reader.read_bit_double()?);
        record.set("box_width", reader.read_bit_double()?);
        record.set("hookline_direction", reader.read_bit()?);
        record.set("arrowhead_on", reader.read_bit()?);
        record.set("arrowhead_type", reader.read_bit_short()?);
        record.set("unknown_bit_2", reader.read_bit()?);
        record.set("unknown_bit_3", reader.read_bit()?);

        record.set("annotation", streams.handle_ref()?);
        record.set("dimension_style", streams.handle_ref()?);
        Ok(())
    }

    pub(super) fn read_tolerance(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        let reader = &mut streams.object_reader;
        record.set("insertion", reader.read_3bit_double()?);
        record.set_vector("x_direction", reader.read_3bit_double()?);
        record.set_vector("extrusion", reader.read_3bit_double()?);
        record.set("text", streams.read_text()?);
        record.set("dimension_style", streams.handle_ref()?);
        Ok(())
    }

    pub(super) fn read_mline(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        let reader = &mut streams.object_reader;
        record.set("scale", reader.read_bit_double()?);
        record.set("justification", reader.read_byte()?);
        record.set("base_point", reader.read_3bit_double()?);
        record.set_vector("extrusion", reader.read_3bit_double()?);
        record.set("flags", reader.read_bit_short()?);
        let line_count = usize::from(reader.read_byte()?);
        record.set("line_count", line_count as i64);
        let vertex_count = reader.read_bit_short()?;
        if vertex_count < 0 {
            return Err(reader.error_here(format!("negative MLINE vertex count {vertex_count}")));
        }

        let mut vertices = Vec::new();
        for _ in 0..vertex_count {
            let position = reader.read_3bit_double()?;
            let direction = reader.read_3bit_double()?;
            let miter = reader.read_3bit_double()?;
            let mut segments = Vec::new();
            for _ in 0..line_count {
                let parameters = read_short_counted_doubles(reader)?;
                let fills = read_short_counted_doubles(reader)?;
                segments.push(Value::List(vec![parameters, fills]));
            }
            vertices.push(Value::List(vec![
                Value::Point3(position),
                Value::Vector3(direction),
                Value::Vector3(miter),
                Value::List(segments),
            ]));
        }
        record.set("vertices", Value::List(vertices));
        record.set("mline_style", streams.handle_ref()?);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Hatch
    // -----------------------------------------------------------------------

    pub(super) fn read_hatch(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        let reader = &mut streams.object_reader;
        record.set("elevation", reader.read_bit_double()?);
        record.set_vector("extrusion", reader.read_3bit_double()?);
        record.set("pattern_name", streams.read_text()?);

        let reader = &mut streams.object_reader;
        let solid = reader.read_bit()?;
        record.set("solid_fill", solid);
        record.set("associative", reader.read_bit()?);

        let path_count = reader.read_count()?;
        let mut paths = Vec::new();
        let mut has_derived = false;
        for _ in 0..path_count {
            let (path, flags, boundary_count) = read_boundary_path(&mut streams.object_reader)?;
            has_derived |= flags & 0x04 != 0;
            let boundary = streams.handle_refs(boundary_count)?;
            paths.push(Value::List(vec![path, Value::from(boundary)]));
        }
        record.set("paths", Value::List(paths));

        let reader = &mut streams.object_reader;
        record.set("hatch_style", reader.read_bit_short()?);
        record.set("pattern_type", reader.read_bit_short()?);
        if !solid {
            record.set("pattern_angle", reader.read_bit_double()?);
            record.set("pattern_scale", reader.read_bit_double()?);
            record.set("pattern_double", reader.read_bit()?);
            let line_count = reader.read_bit_short()?;
            let mut lines = Vec::new();
            for _ in 0..line_count.max(0) {
                let angle = reader.read_bit_double()?;
                let base = reader.read_2bit_double()?;
                let offset = reader.read_2bit_double()?;
                let dashes = read_short_counted_doubles(reader)?;
                lines.push(Value::List(vec![
                    Value::Float(angle),
                    Value::Point2(base),
                    Value::Point2(offset),
                    dashes,
                ]));
            }
            record.set("pattern_lines", Value::List(lines));
        }
        if has_derived {
            record.set("pixel_size", reader.read_bit_double()?);
        }
        let seed_count = reader.read_count()?;
        record.set("seed_points", read_raw_points2(reader, seed_count)?);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // OLE and raster
    // -----------------------------------------------------------------------

    pub(super) fn read_ole2frame(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        let reader = &mut streams.object_reader;
        record.set("ole_flags", reader.read_bit_short()?);
        record.set("mode", reader.read_bit_short()?);
        let length = reader.read_count()?;
        let data = reader.read_bytes(length)?;
        record.set("data", Value::bytes(&data));
        record.set("unknown_byte", reader.read_byte()?);
        Ok(())
    }

    /// IMAGE and WIPEOUT.
    pub(super) fn read_image(&self, streams: &mut StreamSet<'_>, record: &mut RecordBuilder) -> Result<()> {
        let reader = &mut streams.object_reader;
        record.set("class_version", reader.read_bit_long()?);
        record.set("insertion", reader.read_3bit_double()?);
        record.set_vector("u_vector", reader.read_3bit_double()?);
        record.set_vector("v_vector", reader.read_3bit_double()?);
        record.set("size", reader.read_2raw_double()?);
        record.set("display_flags", reader.read_bit_short()?);
        record.set("clipping", reader.read_bit()?);
        record.set("brightness", reader.read_byte()?);
        record.set("contrast", reader.read_byte()?);
        record.set("fade", reader.read_byte()?);

        // 1: rectangle from two corners, 2: polygon
        let clip_type = reader.read_bit_short()?;
        record.set("clip_type", clip_type);
        let clip_vertices = if clip_type == 1 {
            read_raw_points2(reader, 2)?
        } else {
            let count = reader.read_count()?;
            read_raw_points2(reader, count)?
        };
        record.set("clip_boundary", clip_vertices);

        record.set("image_definition", streams.handle_ref()?);
        record.set("image_definition_reactor", streams.handle_ref()?);
        Ok(())
    }
}

/// `BS count` followed by that many BDs.
fn read_short_counted_doubles(reader: &mut DwgBitReader<'_>) -> Result<Value> {
    let count = reader.read_bit_short()?;
    if count < 0 {
        return Err(reader.error_here(format!("negative element count {count}")));
    }
    Ok(Value::from(read_doubles(reader, count as usize)?))
}

/// One wire of a modeler wireframe.
fn read_wire(reader: &mut DwgBitReader<'_>) -> Result<Value> {
    let mut wire = vec![
        Value::from(reader.read_byte()?),
        Value::from(reader.read_bit_long()?),
        Value::from(reader.read_bit_short()?),
        Value::from(reader.read_bit_long()?),
    ];
    let count = reader.read_count()?;
    wire.push(Value::from(read_points3(reader, count)?));

    if reader.read_bit()? {
        let x_axis = reader.read_3bit_double()?;
        let y_axis = reader.read_3bit_double()?;
        let z_axis = reader.read_3bit_double()?;
        let translation = reader.read_3bit_double()?;
        let scale = reader.read_bit_double()?;
        let has_rotation = reader.read_bit()?;
        let has_reflection = reader.read_bit()?;
        let has_shear = reader.read_bit()?;
        wire.push(Value::List(vec![
            Value::Vector3(x_axis),
            Value::Vector3(y_axis),
            Value::Vector3(z_axis),
            Value::Vector3(translation),
            Value::Float(scale),
            Value::Bool(has_rotation),
            Value::Bool(has_reflection),
            Value::Bool(has_shear),
        ]));
    }
    Ok(Value::List(wire))
}

fn read_silhouette(reader: &mut DwgBitReader<'_>) -> Result<Value> {
    let viewport_id = reader.read_bit_long()?;
    let target = reader.read_3bit_double()?;
    let direction = reader.read_3bit_double()?;
    let up = reader.read_3bit_double()?;
    let perspective = reader.read_bit()?;
    let count = reader.read_count()?;
    let wires = (0..count)
        .map(|_| read_wire(reader))
        .collect::<Result<Vec<_>>>()?;
    Ok(Value::List(vec![
        Value::from(viewport_id),
        Value::Point3(target),
        Value::Vector3(direction),
        Value::Vector3(up),
        Value::Bool(perspective),
        Value::List(wires),
    ]))
}

/// One hatch boundary path. Returns the path, its flags and the number of
/// boundary object handles that belong to it.
fn read_boundary_path(reader: &mut DwgBitReader<'_>) -> Result<(Value, i32, usize)> {
    let flags = reader.read_bit_long()?;
    let mut path = vec![Value::from(flags)];

    if flags & 0x02 != 0 {
        let has_bulge = reader.read_bit()?;
        let closed = reader.read_bit()?;
        let count = reader.read_count()?;
        let mut vertices = Vec::new();
        for _ in 0..count {
            let point = reader.read_2raw_double()?;
            let bulge = if has_bulge { reader.read_bit_double()? } else { 0.0 };
            vertices.push(Value::List(vec![Value::Point2(point), Value::Float(bulge)]));
        }
        path.push(Value::Bool(closed));
        path.push(Value::List(vertices));
    } else {
        let count = reader.read_count()?;
        let mut edges = Vec::new();
        for _ in 0..count {
            edges.push(read_hatch_edge(reader)?);
        }
        path.push(Value::List(edges));
    }

    let boundary_count = reader.read_count()?;
    Ok((Value::List(path), flags, boundary_count))
}

/// Hatch edge: the type byte followed by the edge's own fields.
fn read_hatch_edge(reader: &mut DwgBitReader<'_>) -> Result<Value> {
    let edge_type = reader.read_byte()?;
    let mut edge = vec![Value::from(edge_type)];
    match edge_type {
        1 => {
            edge.push(Value::Point2(reader.read_2raw_double()?));
            edge.push(Value::Point2(reader.read_2raw_double()?));
        }
        2 => {
            edge.push(Value::Point2(reader.read_2raw_double()?));
            edge.push(Value::Float(reader.read_bit_double()?));
            edge.push(Value::Float(reader.read_bit_double()?));
            edge.push(Value::Float(reader.read_bit_double()?));
            edge.push(Value::Bool(reader.read_bit()?));
        }
        3 => {
            edge.push(Value::Point2(reader.read_2raw_double()?));
            edge.push(Value::Point2(reader.read_2raw_double()?));
            edge.push(Value::Float(reader.read_bit_double()?));
            edge.push(Value::Float(reader.read_bit_double()?));
            edge.push(Value::Float(reader.read_bit_double()?));
            edge.push(Value::Bool(reader.read_bit()?));
        }
        4 => {
            edge.push(Value::from(reader.read_bit_long()?));
            let rational = reader.read_bit()?;
            edge.push(Value::Bool(rational));
            edge.push(Value::Bool(reader.read_bit()?));
            let knot_count = reader.read_count()?;
            let control_count = reader.read_count()?;
            edge.push(Value::from(read_doubles(reader, knot_count)?));
            let mut control_points = Vec::new();
            for _ in 0..control_count {
                let point = reader.read_2raw_double()?;
                let weight = if rational { reader.read_bit_double()? } else { 1.0 };
                control_points.push(Value::List(vec![Value::Point2(point), Value::Float(weight)]));
            }
            edge.push(Value::List(control_points));
        }
        other => return Err(reader.error_here(format!("unknown hatch edge type {other}"))),
    }
    Ok(Value::List(edge))
}

#[cfg(test)]
mod tests {
    use crate::classes::ClassTable;
    use crate::io::dwg::object_type::EntityKind;
    use crate::types::{Handle, HandleRef, Value, Vector2, Vector3};

    use super::super::test_support::{record_file, Bits};
    use super::super::{DwgObjectReader, EntityRecord};

    fn decode(type_code: i16, data: &Bits, handles: &Bits) -> EntityRecord {
        let file = record_file(0x20, type_code, 0x51, data, handles);
        let classes = ClassTable::new();
        let outcome = DwgObjectReader::new(&file, &classes, encoding_rs::WINDOWS_1252)
            .with_crc_validation(true)
            .read_record(Handle::new(0x51), 0x20)
            .unwrap();
        assert!(outcome.notifications.is_empty(), "{:?}", outcome.notifications);
        outcome.record.unwrap()
    }

    fn entity() -> (Bits, Bits) {
        let mut data = Bits::new();
        let mut handles = Bits::new();
        data.entity_common(&mut handles, 0x10);
        (data, handles)
    }

    #[test]
    fn test_line_2d() {
        let (mut data, handles) = entity();
        data.b(true).rd(0.0).dd(10.0).rd(0.0).dd(5.0).bt_zero().be_default();
        let record = decode(0x13, &data, &handles);

        assert_eq!(record.kind(), EntityKind::Line);
        assert!(record.is_graphical());
        assert_eq!(record.field("p1"), Some(&Value::Point2(Vector2::new(0.0, 0.0))));
        assert_eq!(record.field("p2"), Some(&Value::Point2(Vector2::new(10.0, 5.0))));
        assert_eq!(record.field("extrusion"), Some(&Value::Vector3(Vector3::UNIT_Z)));
        assert_eq!(record.handle_field("layer"), Some(HandleRef::new(5, Handle::new(0x10))));
        assert_eq!(record.field("color"), Some(&Value::Int(256)));
    }

    #[test]
    fn test_line_3d_uses_defaults() {
        let (mut data, handles) = entity();
        data.b(false)
            .rd(1.0)
            .dd_default()
            .rd(2.0)
            .dd(4.0)
            .rd(3.0)
            .dd_default()
            .bt_zero()
            .be_default();
        let record = decode(0x13, &data, &handles);
        assert_eq!(record.field("p1"), Some(&Value::Point3(Vector3::new(1.0, 2.0, 3.0))));
        assert_eq!(record.field("p2"), Some(&Value::Point3(Vector3::new(1.0, 4.0, 3.0))));
    }

    #[test]
    fn test_circle_and_arc() {
        let (mut data, handles) = entity();
        data.bd3(1.0, 2.0, 0.0).bd(2.5).bt_zero().be_default().bd(0.0).bd(1.5);
        let record = decode(0x11, &data, &handles);
        assert_eq!(record.kind(), EntityKind::Arc);
        assert_eq!(record.field("center"), Some(&Value::Point3(Vector3::new(1.0, 2.0, 0.0))));
        assert_eq!(record.field("radius"), Some(&Value::Float(2.5)));
        assert_eq!(record.field("end_angle"), Some(&Value::Float(1.5)));
    }

    #[test]
    fn test_text_with_defaults() {
        let (mut data, mut handles) = entity();
        // elevation, alignment, oblique, rotation, width, generation and
        // both alignments omitted
        data.rc(0xFF).rd2(3.0, 4.0).be_default().bt_zero().rd(2.5).tv("HELLO");
        handles.h(5, 0x11);
        let record = decode(0x01, &data, &handles);
        assert_eq!(record.field("insertion"), Some(&Value::Point3(Vector3::new(3.0, 4.0, 0.0))));
        assert_eq!(record.field("alignment"), record.field("insertion"));
        assert_eq!(record.field("height"), Some(&Value::Float(2.5)));
        assert_eq!(record.field("width_factor"), Some(&Value::Float(1.0)));
        assert_eq!(record.field("value"), Some(&Value::Str("HELLO".into())));
        assert_eq!(record.handle_field("style"), Some(HandleRef::new(5, Handle::new(0x11))));
    }

    #[test]
    fn test_attribute_reads_style_once() {
        let (mut data, mut handles) = entity();
        data.rc(0xFF).rd2(0.0, 0.0).be_default().bt_zero().rd(1.0).tv("V");
        data.tv("TAG").bs(0).rc(0);
        handles.h(5, 0x11);
        let record = decode(0x02, &data, &handles);
        assert_eq!(record.field("tag"), Some(&Value::Str("TAG".into())));
        assert_eq!(record.field("value"), Some(&Value::Str("V".into())));
    }

    #[test]
    fn test_insert_uniform_scale_with_attributes() {
        let (mut data, mut handles) = entity();
        data.bd3(5.0, 6.0, 0.0).bb(2).rd(2.0).bd(0.0).bd3(0.0, 0.0, 1.0).b(true);
        handles.h(5, 0x1F).h(4, 0x60).h(4, 0x61).h(3, 0x62);
        let record = decode(0x07, &data, &handles);
        assert_eq!(record.field("scale"), Some(&Value::Vector3(Vector3::new(2.0, 2.0, 2.0))));
        assert_eq!(record.handle_field("block_header"), Some(HandleRef::new(5, Handle::new(0x1F))));
        assert_eq!(record.handle_field("seqend"), Some(HandleRef::new(3, Handle::new(0x62))));
    }

    #[test]
    fn test_lwpolyline_with_bulges() {
        let (mut data, handles) = entity();
        data.bs(0x0210)
            .bl(3)
            .bl(3)
            .rd2(0.0, 0.0)
            .dd(10.0)
            .dd_default()
            .dd_default()
            .dd(5.0)
            .bd(0.0)
            .bd(1.0)
            .bd(0.0);
        let record = decode(0x4D, &data, &handles);
        assert_eq!(record.field("closed"), Some(&Value::Bool(true)));
        let points: Vec<_> = record
            .field("points")
            .and_then(Value::as_list)
            .unwrap()
            .iter()
            .filter_map(Value::as_point2)
            .collect();
        assert_eq!(
            points,
            vec![Vector2::new(0.0, 0.0), Vector2::new(10.0, 0.0), Vector2::new(10.0, 5.0)]
        );
        assert_eq!(record.field("bulges").and_then(Value::as_list).map(|b| b.len()), Some(3));
    }

    #[test]
    fn test_spline_control_points() {
        let (mut data, handles) = entity();
        data.bl(1).bl(1).b(false).b(false).b(false).bd(0.0).bd(0.0);
        data.bl(4).bl(2).b(false);
        data.bd(0.0).bd(0.0).bd(1.0).bd(1.0);
        data.bd3(0.0, 0.0, 0.0).bd3(1.0, 1.0, 0.0);
        let record = decode(0x24, &data, &handles);
        assert_eq!(record.field("degree"), Some(&Value::Int(1)));
        assert_eq!(record.field("knots").and_then(Value::as_list).map(|k| k.len()), Some(4));
        assert_eq!(
            record.field("control_points").and_then(Value::as_list).map(|c| c.len()),
            Some(2)
        );
    }

    #[test]
    fn test_unknown_spline_scenario_fails() {
        let (mut data, handles) = entity();
        data.bl(7).bl(3);
        let file = record_file(0x20, 0x24, 0x51, &data, &handles);
        let classes = ClassTable::new();
        let err = DwgObjectReader::new(&file, &classes, encoding_rs::WINDOWS_1252)
            .read_record(Handle::new(0x51), 0x20)
            .unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn test_solid_hatch_with_polyline_path() {
        let (mut data, mut handles) = entity();
        data.bd(0.0).bd3(0.0, 0.0, 1.0).tv("SOLID").b(true).b(false);
        data.bl(1).bl(0x02).b(false).b(true).bl(3);
        data.rd2(0.0, 0.0).rd2(4.0, 0.0).rd2(4.0, 3.0);
        data.bl(1);
        data.bs(0).bs(1);
        data.bl(0);
        handles.h(4, 0x70);
        let record = decode(0x4E, &data, &handles);
        assert_eq!(record.field("pattern_name"), Some(&Value::Str("SOLID".into())));
        let paths = record.field("paths").and_then(Value::as_list).unwrap();
        assert_eq!(paths.len(), 1);
        let path = paths[0].as_list().unwrap();
        let boundary = path[1].as_list().unwrap();
        assert_eq!(boundary, &[Value::HandleRef(HandleRef::new(4, Handle::new(0x70)))]);
        assert!(record.field("pixel_size").is_none());
    }

    #[test]
    fn test_3d_face_corner_defaults() {
        let (mut data, handles) = entity();
        data.b(true).b(true).rd(1.0).rd(1.0);
        data.dd(2.0).dd_default().dd_default();
        data.dd_default().dd(2.0).dd_default();
        data.dd(1.0).dd_default().dd_default();
        let record = decode(0x1C, &data, &handles);
        assert_eq!(
            record.field("third_corner"),
            Some(&Value::Point3(Vector3::new(2.0, 2.0, 0.0)))
        );
        assert_eq!(
            record.field("fourth_corner"),
            Some(&Value::Point3(Vector3::new(1.0, 2.0, 0.0)))
        );
        assert_eq!(record.field("invisible_edges"), Some(&Value::Int(0)));
    }

    #[test]
    fn test_decode_sat() {
        assert_eq!(super::decode_sat(&[159 - b'a', b' ', 159 - b'1']), "a 1");
    }
}
