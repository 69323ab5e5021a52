//! DWG Classes section reader.
//!
//! Reads class definitions from the framed `AcDb:Classes` section. The
//! payload is a tight run of class records with no count; the loop stops once
//! no more than one byte of (padding) bits is left.

use encoding_rs::Encoding;
use log::debug;

use crate::classes::{ClassDescriptor, ClassTable};
use crate::error::Result;
use crate::io::dwg::file_header::RawSection;
use crate::io::dwg::reader::stream_reader::DwgStreamReader;
use crate::io::dwg::reader::stream_reader_base::DwgBitReader;
use crate::io::dwg::section_io::CLASSES_FRAME;

/// Reader for the DWG `AcDb:Classes` section.
pub struct DwgClassesReader<'a> {
    file: &'a [u8],
    section: RawSection,
    encoding: &'static Encoding,
    validate_crc: bool,
}

impl<'a> DwgClassesReader<'a> {
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

    /// Read all class definitions from the section.
    pub fn read(&self) -> Result<ClassTable> {
        let framed = CLASSES_FRAME.read(self.file, self.section.byte_offset, self.validate_crc)?;
        let mut reader = DwgBitReader::new(framed.payload)
            .with_origin(framed.payload_offset)
            .with_encoding(self.encoding);

        let mut classes = ClassTable::new();
        while reader.remaining_bits() > 8 {
            classes.insert(Self::read_class(&mut reader)?);
        }

        debug!("{} classes", classes.len());
        Ok(classes)
    }

    /// Read a single class definition from the stream.
    fn read_class(reader: &mut impl DwgStreamReader) -> Result<ClassDescriptor> {
        Ok(ClassDescriptor {
            // BS: classnum
            class_number: reader.read_bit_short()? as u16,
            // BS: version, used as proxy capability flags
            version: reader.read_bit_short()? as u16,
            // TV: appname
            application_name: reader.read_variable_text()?,
            // TV: cplusplusclassname
            native_name: reader.read_variable_text()?,
            // TV: classdxfname
            dxf_name: reader.read_variable_text()?,
            // B: wasazombie
            is_zombie: reader.read_bit()?,
            // BS: itemclassid
            item_class_id: reader.read_bit_short()? as u16,
        })
    }
}
