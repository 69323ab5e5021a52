//! DWG Header section reader.
//!
//! Reads the system variables from the `AcDb:Header` section. The R2000
//! layout is a single fixed sequence of reads, so it is kept as data: each
//! entry of [`R2000_VARIABLES`] names a variable and the primitive that
//! encodes it, and [`DwgHeaderReader::read_variables`] walks the table.
//!
//! The only conditional field is `CPSNID`, present when `CEPSNTYPE == 3`;
//! the table is split around it.

use encoding_rs::Encoding;
use log::debug;

use crate::document::HeaderVariables;
use crate::error::Result;
use crate::io::dwg::file_header::RawSection;
use crate::io::dwg::reader::stream_reader::DwgStreamReader;
use crate::io::dwg::reader::stream_reader_base::DwgBitReader;
use crate::io::dwg::section_io::HEADER_FRAME;
use crate::notification::Notification;
use crate::types::Value;

/// Primitive used to encode one header variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderValueKind {
    /// B
    Bit,
    /// BS
    BitShort,
    /// BL
    BitLong,
    /// BD
    BitDouble,
    /// 2RD
    Point2Raw,
    /// 3BD
    Point3,
    /// TV
    Text,
    /// H, absolute
    Handle,
    /// CMC
    Color,
    /// Two BLs: julian day and milliseconds
    Date,
    /// Two BLs: days and milliseconds
    TimeSpan,
}

impl HeaderValueKind {
    fn read(self, reader: &mut impl DwgStreamReader) -> Result<Value> {
        Ok(match self {
            Self::Bit => Value::Bool(reader.read_bit()?),
            Self::BitShort => Value::Int(i64::from(reader.read_bit_short()?)),
            Self::BitLong => Value::Int(i64::from(reader.read_bit_long()?)),
            Self::BitDouble => Value::Float(reader.read_bit_double()?),
            Self::Point2Raw => Value::Point2(reader.read_2raw_double()?),
            Self::Point3 => Value::Point3(reader.read_3bit_double()?),
            Self::Text => Value::Str(reader.read_variable_text()?),
            Self::Handle => Value::HandleRef(reader.handle_reference()?),
            Self::Color => Value::Int(i64::from(reader.read_cm_color()?)),
            Self::Date => Value::Float(reader.read_date_time()?),
            Self::TimeSpan => Value::Float(reader.read_time_span()?),
        })
    }
}

use HeaderValueKind::*;

/// R2000 variables up to and including `CEPSNTYPE`, in file order.
pub const R2000_VARIABLES: &[(&str, HeaderValueKind)] = &[
    ("UNKNOWN_BD_1", BitDouble),
    ("UNKNOWN_BD_2", BitDouble),
    ("UNKNOWN_BD_3", BitDouble),
    ("UNKNOWN_BD_4", BitDouble),
    ("UNKNOWN_TV_1", Text),
    ("UNKNOWN_TV_2", Text),
    ("UNKNOWN_TV_3", Text),
    ("UNKNOWN_TV_4", Text),
    ("UNKNOWN_BL_1", BitLong),
    ("UNKNOWN_BL_2", BitLong),
    ("CURRENT_VIEWPORT_ENTITY_HEADER", Handle),
    ("DIMASO", Bit),
    ("DIMSHO", Bit),
    ("PLINEGEN", Bit),
    ("ORTHOMODE", Bit),
    ("REGENMODE", Bit),
    ("FILLMODE", Bit),
    ("QTEXTMODE", Bit),
    ("PSLTSCALE", Bit),
    ("LIMCHECK", Bit),
    ("USRTIMER", Bit),
    ("SKPOLY", Bit),
    ("ANGDIR", Bit),
    ("SPLFRAME", Bit),
    ("MIRRTEXT", Bit),
    ("WORLDVIEW", Bit),
    ("TILEMODE", Bit),
    ("PLIMCHECK", Bit),
    ("VISRETAIN", Bit),
    ("DISPSILH", Bit),
    ("PELLIPSE", Bit),
    ("PROXYGRAPHICS", BitShort),
    ("TREEDEPTH", BitShort),
    ("LUNITS", BitShort),
    ("LUPREC", BitShort),
    ("AUNITS", BitShort),
    ("AUPREC", BitShort),
    ("ATTMODE", BitShort),
    ("PDMODE", BitShort),
    ("USERI1", BitShort),
    ("USERI2", BitShort),
    ("USERI3", BitShort),
    ("USERI4", BitShort),
    ("USERI5", BitShort),
    ("SPLINESEGS", BitShort),
    ("SURFU", BitShort),
    ("SURFV", BitShort),
    ("SURFTYPE", BitShort),
    ("SURFTAB1", BitShort),
    ("SURFTAB2", BitShort),
    ("SPLINETYPE", BitShort),
    ("SHADEDGE", BitShort),
    ("SHADEDIF", BitShort),
    ("UNITMODE", BitShort),
    ("MAXACTVP", BitShort),
    ("ISOLINES", BitShort),
    ("CMLJUST", BitShort),
    ("TEXTQLTY", BitShort),
    ("LTSCALE", BitDouble),
    ("TEXTSIZE", BitDouble),
    ("TRACEWID", BitDouble),
    ("SKETCHINC", BitDouble),
    ("FILLETRAD", BitDouble),
    ("THICKNESS", BitDouble),
    ("ANGBASE", BitDouble),
    ("PDSIZE", BitDouble),
    ("PLINEWID", BitDouble),
    ("USERR1", BitDouble),
    ("USERR2", BitDouble),
    ("USERR3", BitDouble),
    ("USERR4", BitDouble),
    ("USERR5", BitDouble),
    ("CHAMFERA", BitDouble),
    ("CHAMFERB", BitDouble),
    ("CHAMFERC", BitDouble),
    ("CHAMFERD", BitDouble),
    ("FACETRES", BitDouble),
    ("CMLSCALE", BitDouble),
    ("CELTSCALE", BitDouble),
    ("MENU", Text),
    ("TDCREATE", Date),
    ("TDUPDATE", Date),
    ("TDINDWG", TimeSpan),
    ("TDUSRTIMER", TimeSpan),
    ("CECOLOR", Color),
    ("HANDSEED", Handle),
    ("CLAYER", Handle),
    ("TEXTSTYLE", Handle),
    ("CELTYPE", Handle),
    ("DIMSTYLE", Handle),
    ("CMLSTYLE", Handle),
    ("PSVPSCALE", BitDouble),
    // Paper space
    ("PINSBASE", Point3),
    ("PEXTMIN", Point3),
    ("PEXTMAX", Point3),
    ("PLIMMIN", Point2Raw),
    ("PLIMMAX", Point2Raw),
    ("PELEVATION", BitDouble),
    ("PUCSORG", Point3),
    ("PUCSXDIR", Point3),
    ("PUCSYDIR", Point3),
    ("PUCSNAME", Handle),
    ("PUCSORTHOREF", Handle),
    ("PUCSORTHOVIEW", BitShort),
    ("PUCSBASE", Handle),
    ("PUCSORGTOP", Point3),
    ("PUCSORGBOTTOM", Point3),
    ("PUCSORGLEFT", Point3),
    ("PUCSORGRIGHT", Point3),
    ("PUCSORGFRONT", Point3),
    ("PUCSORGBACK", Point3),
    // Model space
    ("INSBASE", Point3),
    ("EXTMIN", Point3),
    ("EXTMAX", Point3),
    ("LIMMIN", Point2Raw),
    ("LIMMAX", Point2Raw),
    ("ELEVATION", BitDouble),
    ("UCSORG", Point3),
    ("UCSXDIR", Point3),
    ("UCSYDIR", Point3),
    ("UCSNAME", Handle),
    ("UCSORTHOREF", Handle),
    ("UCSORTHOVIEW", BitShort),
    ("UCSBASE", Handle),
    ("UCSORGTOP", Point3),
    ("UCSORGBOTTOM", Point3),
    ("UCSORGLEFT", Point3),
    ("UCSORGRIGHT", Point3),
    ("UCSORGFRONT", Point3),
    ("UCSORGBACK", Point3),
    // Dimension defaults
    ("DIMPOST", Text),
    ("DIMAPOST", Text),
    ("DIMSCALE", BitDouble),
    ("DIMASZ", BitDouble),
    ("DIMEXO", BitDouble),
    ("DIMDLI", BitDouble),
    ("DIMEXE", BitDouble),
    ("DIMRND", BitDouble),
    ("DIMDLE", BitDouble),
    ("DIMTP", BitDouble),
    ("DIMTM", BitDouble),
    ("DIMTOL", Bit),
    ("DIMLIM", Bit),
    ("DIMTIH", Bit),
    ("DIMTOH", Bit),
    ("DIMSE1", Bit),
    ("DIMSE2", Bit),
    ("DIMTAD", BitShort),
    ("DIMZIN", BitShort),
    ("DIMAZIN", BitShort),
    ("DIMTXT", BitDouble),
    ("DIMCEN", BitDouble),
    ("DIMTSZ", BitDouble),
    ("DIMALTF", BitDouble),
    ("DIMLFAC", BitDouble),
    ("DIMTVP", BitDouble),
    ("DIMTFAC", BitDouble),
    ("DIMGAP", BitDouble),
    ("DIMALTRND", BitDouble),
    ("DIMALT", Bit),
    ("DIMALTD", BitShort),
    ("DIMTOFL", Bit),
    ("DIMSAH", Bit),
    ("DIMTIX", Bit),
    ("DIMSOXD", Bit),
    ("DIMCLRD", Color),
    ("DIMCLRE", Color),
    ("DIMCLRT", Color),
    ("DIMADEC", BitShort),
    ("DIMDEC", BitShort),
    ("DIMTDEC", BitShort),
    ("DIMALTU", BitShort),
    ("DIMALTTD", BitShort),
    ("DIMAUNIT", BitShort),
    ("DIMFRAC", BitShort),
    ("DIMLUNIT", BitShort),
    ("DIMDSEP", BitShort),
    ("DIMTMOVE", BitShort),
    ("DIMJUST", BitShort),
    ("DIMSD1", Bit),
    ("DIMSD2", Bit),
    ("DIMTOLJ", BitShort),
    ("DIMTZIN", BitShort),
    ("DIMALTZ", BitShort),
    ("DIMALTTZ", BitShort),
    ("DIMUPT", Bit),
    ("DIMFIT", BitShort),
    ("DIMTXSTY", Handle),
    ("DIMLDRBLK", Handle),
    ("DIMBLK", Handle),
    ("DIMBLK1", Handle),
    ("DIMBLK2", Handle),
    ("DIMLWD", BitShort),
    ("DIMLWE", BitShort),
    // Table controls and root dictionaries
    ("BLOCK_CONTROL_OBJECT", Handle),
    ("LAYER_CONTROL_OBJECT", Handle),
    ("STYLE_CONTROL_OBJECT", Handle),
    ("LINETYPE_CONTROL_OBJECT", Handle),
    ("VIEW_CONTROL_OBJECT", Handle),
    ("UCS_CONTROL_OBJECT", Handle),
    ("VPORT_CONTROL_OBJECT", Handle),
    ("APPID_CONTROL_OBJECT", Handle),
    ("DIMSTYLE_CONTROL_OBJECT", Handle),
    ("VIEWPORT_ENTITY_HEADER_CONTROL_OBJECT", Handle),
    ("DICTIONARY_ACAD_GROUP", Handle),
    ("DICTIONARY_ACAD_MLINESTYLE", Handle),
    ("DICTIONARY_NAMED_OBJECTS", Handle),
    ("TSTACKALIGN", BitShort),
    ("TSTACKSIZE", BitShort),
    ("HYPERLINKBASE", Text),
    ("STYLESHEET", Text),
    ("DICTIONARY_LAYOUTS", Handle),
    ("DICTIONARY_PLOTSETTINGS", Handle),
    ("DICTIONARY_PLOTSTYLES", Handle),
    ("FLAGS", BitLong),
    ("INSUNITS", BitShort),
    ("CEPSNTYPE", BitShort),
];

/// R2000 variables after the conditional `CPSNID`, in file order.
pub const R2000_TRAILING_VARIABLES: &[(&str, HeaderValueKind)] = &[
    ("FINGERPRINTGUID", Text),
    ("VERSIONGUID", Text),
    ("PAPER_SPACE_BLOCK_RECORD", Handle),
    ("MODEL_SPACE_BLOCK_RECORD", Handle),
    ("BYLAYER_LTYPE", Handle),
    ("BYBLOCK_LTYPE", Handle),
    ("CONTINUOUS_LTYPE", Handle),
];

/// `CEPSNTYPE` value that adds the `CPSNID` handle.
const PLOT_STYLE_BY_HANDLE: i64 = 3;

/// Reader for the DWG `AcDb:Header` section.
pub struct DwgHeaderReader<'a> {
    file: &'a [u8],
    section: RawSection,
    encoding: &'static Encoding,
    validate_crc: bool,
}

impl<'a> DwgHeaderReader<'a> {
    pub fn new(
        file: &'a [u8],
        section: RawSection,
        encoding: &'static Encoding,
        validate_crc: bool,
    ) -> Self {
        Self {
            file,
            section,
            encoding,
            validate_crc,
        }
    }

    /// Read the framed section and decode every variable.
    ///
    /// Padding of up to 7 bits after the last variable is normal; anything
    /// more is reported as a warning.
    pub fn read(&self, notifications: &mut Vec<Notification>) -> Result<HeaderVariables> {
        let framed = HEADER_FRAME.read(self.file, self.section.byte_offset, self.validate_crc)?;
        let mut reader = DwgBitReader::new(framed.payload)
            .with_origin(framed.payload_offset)
            .with_encoding(self.encoding);

        let header = Self::read_variables(&mut reader)?;

        let unread = reader.remaining_bits();
        if unread > 7 {
            notifications.push(Notification::warning(format!(
                "header section has {unread} unread bits after the last variable"
            )));
        }
        debug!("{} header variables", header.len());
        Ok(header)
    }

    /// Decode the R2000 variable sequence and the values derived from `FLAGS`.
    pub fn read_variables(reader: &mut impl DwgStreamReader) -> Result<HeaderVariables> {
        let mut header = HeaderVariables::new();
        for &(name, kind) in R2000_VARIABLES {
            header.insert(name, kind.read(reader)?);
        }

        let plot_style_type = header.get("CEPSNTYPE").and_then(Value::as_int);
        if plot_style_type == Some(PLOT_STYLE_BY_HANDLE) {
            header.insert("CPSNID", Handle.read(reader)?);
        }

        for &(name, kind) in R2000_TRAILING_VARIABLES {
            header.insert(name, kind.read(reader)?);
        }

        if let Some(flags) = header.get("FLAGS").and_then(Value::as_int) {
            Self::derive_from_flags(&mut header, flags);
        }
        Ok(header)
    }

    fn derive_from_flags(header: &mut HeaderVariables, flags: i64) {
        // CELWEIGHT Flags & 0x001F
        header.insert("CELWEIGHT", Value::Int(flags & 0x1F));
        // ENDCAPS Flags & 0x0060
        header.insert("ENDCAPS", Value::Int((flags & 0x60) >> 5));
        // JOINSTYLE Flags & 0x0180
        header.insert("JOINSTYLE", Value::Int((flags & 0x180) >> 7));
        // LWDISPLAY !(Flags & 0x0200)
        header.insert("LWDISPLAY", Value::Bool(flags & 0x200 == 0));
        // XEDIT !(Flags & 0x0400)
        header.insert("XEDIT", Value::Bool(flags & 0x400 == 0));
        // EXTNAMES Flags & 0x0800
        header.insert("EXTNAMES", Value::Bool(flags & 0x800 != 0));
        // PSTYLEMODE Flags & 0x2000
        header.insert("PSTYLEMODE", Value::Bool(flags & 0x2000 != 0));
        // OLESTARTUP Flags & 0x4000
        header.insert("OLESTARTUP", Value::Bool(flags & 0x4000 != 0));
    }
}
