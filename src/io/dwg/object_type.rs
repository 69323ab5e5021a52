//! DWG record kinds.
//!
//! Records carry a type code. Codes up to 0x52, plus 0x1F2 and 0x1F3, are
//! fixed; codes from 500 upward are class numbers, resolved to a kind through
//! the DXF name declared in the `AcDb:Classes` section.

use std::fmt;

/// Kind of a decoded record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Text,
    Attrib,
    Attdef,
    Block,
    Endblk,
    Seqend,
    Insert,
    Minsert,
    Vertex2D,
    Vertex3D,
    VertexMesh,
    VertexPface,
    VertexPfaceFace,
    Polyline2D,
    Polyline3D,
    Arc,
    Circle,
    Line,
    DimensionOrdinate,
    DimensionLinear,
    DimensionAligned,
    DimensionAng3Pt,
    DimensionAng2Ln,
    DimensionRadius,
    DimensionDiameter,
    Point,
    Face3D,
    PolylinePface,
    PolylineMesh,
    Solid,
    Trace,
    Shape,
    Viewport,
    Ellipse,
    Spline,
    Region,
    Solid3D,
    Body,
    Ray,
    Xline,
    Dictionary,
    OleFrame,
    Mtext,
    Leader,
    Tolerance,
    Mline,
    BlockControl,
    BlockHeader,
    LayerControl,
    Layer,
    StyleControl,
    Style,
    LtypeControl,
    Ltype,
    ViewControl,
    View,
    UcsControl,
    Ucs,
    VportControl,
    Vport,
    AppidControl,
    Appid,
    DimstyleControl,
    Dimstyle,
    VpEntHdrControl,
    VpEntHdr,
    Group,
    MlineStyle,
    Ole2Frame,
    Dummy,
    LongTransaction,
    LwPolyline,
    Hatch,
    XRecord,
    Placeholder,
    VbaProject,
    Layout,
    ProxyEntity,
    ProxyObject,
    // Class-only kinds
    DictionaryVar,
    DictionaryWithDefault,
    IdBuffer,
    Image,
    ImageDef,
    ImageDefReactor,
    LayerIndex,
    RasterVariables,
    SortEntsTable,
    SpatialFilter,
    SpatialIndex,
    Wipeout,
    WipeoutVariables,
    /// Class-table kind with no field decoder.
    Opaque,
}

impl EntityKind {
    /// Kind of a fixed type code; `None` for unused codes and class numbers.
    pub fn from_type_code(code: u16) -> Option<Self> {
        use EntityKind::*;
        Some(match code {
            0x01 => Text,
            0x02 => Attrib,
            0x03 => Attdef,
            0x04 => Block,
            0x05 => Endblk,
            0x06 => Seqend,
            0x07 => Insert,
            0x08 => Minsert,
            0x0A => Vertex2D,
            0x0B => Vertex3D,
            0x0C => VertexMesh,
            0x0D => VertexPface,
            0x0E => VertexPfaceFace,
            0x0F => Polyline2D,
            0x10 => Polyline3D,
            0x11 => Arc,
            0x12 => Circle,
            0x13 => Line,
            0x14 => DimensionOrdinate,
            0x15 => DimensionLinear,
            0x16 => DimensionAligned,
            0x17 => DimensionAng3Pt,
            0x18 => DimensionAng2Ln,
            0x19 => DimensionRadius,
            0x1A => DimensionDiameter,
            0x1B => Point,
            0x1C => Face3D,
            0x1D => PolylinePface,
            0x1E => PolylineMesh,
            0x1F => Solid,
            0x20 => Trace,
            0x21 => Shape,
            0x22 => Viewport,
            0x23 => Ellipse,
            0x24 => Spline,
            0x25 => Region,
            0x26 => Solid3D,
            0x27 => Body,
            0x28 => Ray,
            0x29 => Xline,
            0x2A => Dictionary,
            0x2B => OleFrame,
            0x2C => Mtext,
            0x2D => Leader,
            0x2E => Tolerance,
            0x2F => Mline,
            0x30 => BlockControl,
            0x31 => BlockHeader,
            0x32 => LayerControl,
            0x33 => Layer,
            0x34 => StyleControl,
            0x35 => Style,
            0x38 => LtypeControl,
            0x39 => Ltype,
            0x3C => ViewControl,
            0x3D => View,
            0x3E => UcsControl,
            0x3F => Ucs,
            0x40 => VportControl,
            0x41 => Vport,
            0x42 => AppidControl,
            0x43 => Appid,
            0x44 => DimstyleControl,
            0x45 => Dimstyle,
            0x46 => VpEntHdrControl,
            0x47 => VpEntHdr,
            0x48 => Group,
            0x49 => MlineStyle,
            0x4A => Ole2Frame,
            0x4B => Dummy,
            0x4C => LongTransaction,
            0x4D => LwPolyline,
            0x4E => Hatch,
            0x4F => XRecord,
            0x50 => Placeholder,
            0x51 => VbaProject,
            0x52 => Layout,
            0x1F2 => ProxyEntity,
            0x1F3 => ProxyObject,
            _ => return None,
        })
    }

    /// Kind selected by a class DXF name; `None` if no decoder handles it.
    pub fn from_dxf_name(name: &str) -> Option<Self> {
        use EntityKind::*;
        Some(match name.to_ascii_uppercase().as_str() {
            "ACDBDICTIONARYWDFLT" => DictionaryWithDefault,
            "ACDBPLACEHOLDER" => Placeholder,
            "DICTIONARYVAR" => DictionaryVar,
            "DICTIONARYWDFLT" => DictionaryWithDefault,
            "HATCH" => Hatch,
            "IDBUFFER" => IdBuffer,
            "IMAGE" => Image,
            "IMAGEDEF" => ImageDef,
            "IMAGEDEF_REACTOR" => ImageDefReactor,
            "LAYER_INDEX" => LayerIndex,
            "LAYOUT" => Layout,
            "LWPOLYLINE" => LwPolyline,
            "OLE2FRAME" => Ole2Frame,
            "RASTERVARIABLES" => RasterVariables,
            "SORTENTSTABLE" => SortEntsTable,
            "SPATIAL_FILTER" => SpatialFilter,
            "SPATIAL_INDEX" => SpatialIndex,
            "WIPEOUT" => Wipeout,
            "WIPEOUTVARIABLES" => WipeoutVariables,
            "XRECORD" => XRecord,
            _ => return None,
        })
    }

    /// Whether records of this kind start with the entity common data
    /// (graphics flag, entity mode, color, linetype and plot style data).
    ///
    /// [`EntityKind::Opaque`] records take this from their class instead.
    pub fn is_graphical(self) -> bool {
        use EntityKind::*;
        matches!(
            self,
            Text | Attrib
                | Attdef
                | Block
                | Endblk
                | Seqend
                | Insert
                | Minsert
                | Vertex2D
                | Vertex3D
                | VertexMesh
                | VertexPface
                | VertexPfaceFace
                | Polyline2D
                | Polyline3D
                | Arc
                | Circle
                | Line
                | DimensionOrdinate
                | DimensionLinear
                | DimensionAligned
                | DimensionAng3Pt
                | DimensionAng2Ln
                | DimensionRadius
                | DimensionDiameter
                | Point
                | Face3D
                | PolylinePface
                | PolylineMesh
                | Solid
                | Trace
                | Shape
                | Viewport
                | Ellipse
                | Spline
                | Region
                | Solid3D
                | Body
                | Ray
                | Xline
                | OleFrame
                | Mtext
                | Leader
                | Tolerance
                | Mline
                | Ole2Frame
                | LwPolyline
                | Hatch
                | ProxyEntity
                | Image
                | Wipeout
        )
    }

    /// Whether the kind is kept as an opaque record rather than decoded
    /// field by field.
    pub fn is_opaque(self) -> bool {
        use EntityKind::*;
        matches!(
            self,
            OleFrame | Dummy | LongTransaction | VbaProject | ProxyEntity | ProxyObject | Opaque
        )
    }

    /// Upper-case record name, e.g. `LINE` or `DIMENSION_LINEAR`.
    pub fn name(self) -> &'static str {
        use EntityKind::*;
        match self {
            Text => "TEXT",
            Attrib => "ATTRIB",
            Attdef => "ATTDEF",
            Block => "BLOCK",
            Endblk => "ENDBLK",
            Seqend => "SEQEND",
            Insert => "INSERT",
            Minsert => "MINSERT",
            Vertex2D => "VERTEX_2D",
            Vertex3D => "VERTEX_3D",
            VertexMesh => "VERTEX_MESH",
            VertexPface => "VERTEX_PFACE",
            VertexPfaceFace => "VERTEX_PFACE_FACE",
            Polyline2D => "POLYLINE_2D",
            Polyline3D => "POLYLINE_3D",
            Arc => "ARC",
            Circle => "CIRCLE",
            Line => "LINE",
            DimensionOrdinate => "DIMENSION_ORDINATE",
            DimensionLinear => "DIMENSION_LINEAR",
            DimensionAligned => "DIMENSION_ALIGNED",
            DimensionAng3Pt => "DIMENSION_ANG3PT",
            DimensionAng2Ln => "DIMENSION_ANG2LN",
            DimensionRadius => "DIMENSION_RADIUS",
            DimensionDiameter => "DIMENSION_DIAMETER",
            Point => "POINT",
            Face3D => "3DFACE",
            PolylinePface => "POLYLINE_PFACE",
            PolylineMesh => "POLYLINE_MESH",
            Solid => "SOLID",
            Trace => "TRACE",
            Shape => "SHAPE",
            Viewport => "VIEWPORT",
            Ellipse => "ELLIPSE",
            Spline => "SPLINE",
            Region => "REGION",
            Solid3D => "3DSOLID",
            Body => "BODY",
            Ray => "RAY",
            Xline => "XLINE",
            Dictionary => "DICTIONARY",
            OleFrame => "OLEFRAME",
            Mtext => "MTEXT",
            Leader => "LEADER",
            Tolerance => "TOLERANCE",
            Mline => "MLINE",
            BlockControl => "BLOCK_CONTROL",
            BlockHeader => "BLOCK_HEADER",
            LayerControl => "LAYER_CONTROL",
            Layer => "LAYER",
            StyleControl => "STYLE_CONTROL",
            Style => "STYLE",
            LtypeControl => "LTYPE_CONTROL",
            Ltype => "LTYPE",
            ViewControl => "VIEW_CONTROL",
            View => "VIEW",
            UcsControl => "UCS_CONTROL",
            Ucs => "UCS",
            VportControl => "VPORT_CONTROL",
            Vport => "VPORT",
            AppidControl => "APPID_CONTROL",
            Appid => "APPID",
            DimstyleControl => "DIMSTYLE_CONTROL",
            Dimstyle => "DIMSTYLE",
            VpEntHdrControl => "VP_ENT_HDR_CONTROL",
            VpEntHdr => "VP_ENT_HDR",
            Group => "GROUP",
            MlineStyle => "MLINESTYLE",
            Ole2Frame => "OLE2FRAME",
            Dummy => "DUMMY",
            LongTransaction => "LONG_TRANSACTION",
            LwPolyline => "LWPOLYLINE",
            Hatch => "HATCH",
            XRecord => "XRECORD",
            Placeholder => "ACDBPLACEHOLDER",
            VbaProject => "VBA_PROJECT",
            Layout => "LAYOUT",
            ProxyEntity => "ACAD_PROXY_ENTITY",
            ProxyObject => "ACAD_PROXY_OBJECT",
            DictionaryVar => "DICTIONARYVAR",
            DictionaryWithDefault => "ACDBDICTIONARYWDFLT",
            IdBuffer => "IDBUFFER",
            Image => "IMAGE",
            ImageDef => "IMAGEDEF",
            ImageDefReactor => "IMAGEDEF_REACTOR",
            LayerIndex => "LAYER_INDEX",
            RasterVariables => "RASTERVARIABLES",
            SortEntsTable => "SORTENTSTABLE",
            SpatialFilter => "SPATIAL_FILTER",
            SpatialIndex => "SPATIAL_INDEX",
            Wipeout => "WIPEOUT",
            WipeoutVariables => "WIPEOUTVARIABLES",
            Opaque => "OPAQUE",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_codes() {
        assert_eq!(EntityKind::from_type_code(0x13), Some(EntityKind::Line));
        assert_eq!(EntityKind::from_type_code(0x2A), Some(EntityKind::Dictionary));
        assert_eq!(EntityKind::from_type_code(0x52), Some(EntityKind::Layout));
        assert_eq!(EntityKind::from_type_code(0x1F2), Some(EntityKind::ProxyEntity));
    }

    #[test]
    fn test_unused_codes() {
        for code in [0x00, 0x09, 0x36, 0x37, 0x3A, 0x3B, 0x53, 0x1F1, 500, 999] {
            assert_eq!(EntityKind::from_type_code(code), None, "code {code:#X}");
        }
    }

    #[test]
    fn test_class_names() {
        assert_eq!(EntityKind::from_dxf_name("lwpolyline"), Some(EntityKind::LwPolyline));
        assert_eq!(
            EntityKind::from_dxf_name("ACDBDICTIONARYWDFLT"),
            Some(EntityKind::DictionaryWithDefault)
        );
        assert_eq!(EntityKind::from_dxf_name("ACAD_TABLE"), None);
    }

    #[test]
    fn test_graphical_split() {
        assert!(EntityKind::Line.is_graphical());
        assert!(EntityKind::Image.is_graphical());
        assert!(!EntityKind::Dictionary.is_graphical());
        assert!(!EntityKind::Layer.is_graphical());
        assert!(!EntityKind::ImageDef.is_graphical());
        assert!(EntityKind::ProxyObject.is_opaque());
        assert!(!EntityKind::Hatch.is_opaque());
    }
}
