//! Synthetic AC1015 file builder.
//!
//! Lays out a complete drawing the way AutoCAD does for R2000: preamble with
//! three section records, header and class sections, object records, the
//! object map and an optional image section.
//!
//! ```ignore
//! let (data, handles) = line_streams((0.0, 0.0), (10.0, 5.0), 0x10);
//! let built = DwgFileBuilder::new().record(0x51, 0x13, &data, &handles).build();
//! let doc = read_doc(&built.bytes);
//! ```

use std::collections::HashMap;

use dwgr15::io::dwg::constants::{sentinels, CRC_SEED, VERSION_TAG};
use dwgr15::io::dwg::crc::crc8;
use dwgr15::io::dwg::file_header::preamble_crc_mask;
use dwgr15::io::dwg::reader::header_reader::{
    HeaderValueKind, R2000_TRAILING_VARIABLES, R2000_VARIABLES,
};
use dwgr15::ClassDescriptor;

use super::{modular_char, signed_modular_char, BitWriter};

/// Bytes before the first section: tag, metadata, three locator records,
/// CRC and the closing sentinel.
pub const PREAMBLE_SIZE: usize = 0x19 + 3 * 9 + 2 + 16;

/// Offset of the preamble's closing sentinel.
pub const PREAMBLE_SENTINEL_OFFSET: usize = PREAMBLE_SIZE - 16;

/// Value overriding the default encoding of one header variable.
#[derive(Debug, Clone)]
pub enum HeaderOverride {
    Int(i32),
    Float(f64),
    Text(String),
}

#[derive(Debug, Clone)]
struct PendingRecord {
    map_handle: u64,
    own_handle: u64,
    type_code: i16,
    data: BitWriter,
    handles: BitWriter,
}

/// A synthesized file and where its parts landed.
#[derive(Debug, Clone)]
pub struct BuiltDwg {
    pub bytes: Vec<u8>,
    pub header_offset: usize,
    pub classes_offset: usize,
    pub handles_offset: usize,
    pub preview_offset: Option<usize>,
    /// Object-map handle and file offset of every record, in insertion order.
    pub record_offsets: Vec<(u64, usize)>,
}

impl BuiltDwg {
    /// Offset of the section's closing sentinel, given its payload size.
    pub fn framed_end_sentinel(&self, section_offset: usize) -> usize {
        let size = u32::from_le_bytes([
            self.bytes[section_offset + 16],
            self.bytes[section_offset + 17],
            self.bytes[section_offset + 18],
            self.bytes[section_offset + 19],
        ]) as usize;
        section_offset + 20 + size + 2
    }
}

/// Builder for a synthetic drawing.
#[derive(Debug, Clone)]
pub struct DwgFileBuilder {
    maintenance_version: u8,
    code_page: u16,
    header: HashMap<&'static str, HeaderOverride>,
    classes: Vec<ClassDescriptor>,
    records: Vec<PendingRecord>,
    preview_png: Option<Vec<u8>>,
    pairs_per_chunk: usize,
}

impl Default for DwgFileBuilder {
    fn default() -> Self {
        Self {
            maintenance_version: 0,
            code_page: 30,
            header: HashMap::new(),
            classes: Vec::new(),
            records: Vec::new(),
            preview_png: None,
            pairs_per_chunk: 64,
        }
    }
}

impl DwgFileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn maintenance_version(mut self, version: u8) -> Self {
        self.maintenance_version = version;
        self
    }

    pub fn code_page(mut self, code_page: u16) -> Self {
        self.code_page = code_page;
        self
    }

    pub fn header(mut self, name: &'static str, value: HeaderOverride) -> Self {
        self.header.insert(name, value);
        self
    }

    pub fn class(
        mut self,
        class_number: u16,
        dxf_name: &str,
        native_name: &str,
        is_entity: bool,
    ) -> Self {
        self.classes.push(ClassDescriptor {
            class_number,
            version: 0,
            application_name: "ObjectDBX Classes".to_string(),
            native_name: native_name.to_string(),
            dxf_name: dxf_name.to_string(),
            is_zombie: false,
            item_class_id: if is_entity { 0x1F2 } else { 0x1F3 },
        });
        self
    }

    /// Add a record whose own handle matches its object-map key.
    pub fn record(self, handle: u64, type_code: i16, data: &BitWriter, handles: &BitWriter) -> Self {
        self.record_with_own_handle(handle, handle, type_code, data, handles)
    }

    /// Add a record listed under `map_handle` that stores `own_handle`.
    pub fn record_with_own_handle(
        mut self,
        map_handle: u64,
        own_handle: u64,
        type_code: i16,
        data: &BitWriter,
        handles: &BitWriter,
    ) -> Self {
        self.records.push(PendingRecord {
            map_handle,
            own_handle,
            type_code,
            data: data.clone(),
            handles: handles.clone(),
        });
        self
    }

    /// Attach an image section holding `png`.
    pub fn preview_png(mut self, png: &[u8]) -> Self {
        self.preview_png = Some(png.to_vec());
        self
    }

    /// Object-map pairs per chunk before a new chunk starts.
    pub fn pairs_per_chunk(mut self, pairs: usize) -> Self {
        self.pairs_per_chunk = pairs.max(1);
        self
    }

    pub fn build(&self) -> BuiltDwg {
        let mut file = vec![0u8; PREAMBLE_SIZE];

        let header_offset = file.len();
        let header = framed(
            &sentinels::HEADER_START,
            &sentinels::HEADER_END,
            &self.header_payload(),
            true,
        );
        file.extend_from_slice(&header);

        let classes_offset = file.len();
        let classes = framed(
            &sentinels::CLASSES_START,
            &sentinels::CLASSES_END,
            &self.classes_payload(),
            true,
        );
        file.extend_from_slice(&classes);

        let mut record_offsets = Vec::with_capacity(self.records.len());
        for record in &self.records {
            record_offsets.push((record.map_handle, file.len()));
            file.extend_from_slice(&encode_record(record));
        }

        let handles_offset = file.len();
        let map = object_map(&record_offsets, self.pairs_per_chunk);
        file.extend_from_slice(&map);

        let preview_offset = self.preview_png.as_ref().map(|png| {
            let offset = file.len();
            file.extend_from_slice(&preview_section(offset, png));
            offset
        });

        self.write_preamble(
            &mut file,
            [
                (0u8, header_offset, header.len()),
                (1, classes_offset, classes.len()),
                (2, handles_offset, map.len()),
            ],
            preview_offset,
        );

        BuiltDwg {
            bytes: file,
            header_offset,
            classes_offset,
            handles_offset,
            preview_offset,
            record_offsets,
        }
    }

    fn write_preamble(
        &self,
        file: &mut [u8],
        sections: [(u8, usize, usize); 3],
        preview_offset: Option<usize>,
    ) {
        let mut pre = Vec::with_capacity(PREAMBLE_SIZE);
        pre.extend_from_slice(VERSION_TAG);
        let mut padding = [0u8; 7];
        padding[5] = self.maintenance_version;
        padding[6] = 1;
        pre.extend_from_slice(&padding);
        pre.extend_from_slice(&(preview_offset.unwrap_or(0) as i32).to_le_bytes());
        pre.extend_from_slice(&[0x1B, 0x19]);
        pre.extend_from_slice(&self.code_page.to_le_bytes());
        pre.extend_from_slice(&(sections.len() as i32).to_le_bytes());
        for (number, offset, size) in sections {
            pre.push(number);
            pre.extend_from_slice(&(offset as i32).to_le_bytes());
            pre.extend_from_slice(&(size as i32).to_le_bytes());
        }
        let crc = crc8(0, &pre) ^ preamble_crc_mask(sections.len() as u64);
        pre.extend_from_slice(&crc.to_le_bytes());
        pre.extend_from_slice(&sentinels::FILE_HEADER_END);
        assert_eq!(pre.len(), PREAMBLE_SIZE);
        file[..PREAMBLE_SIZE].copy_from_slice(&pre);
    }

    fn header_payload(&self) -> Vec<u8> {
        let mut bits = BitWriter::new();
        for &(name, kind) in R2000_VARIABLES.iter().chain(R2000_TRAILING_VARIABLES) {
            encode_header_value(&mut bits, kind, self.header.get(name));
        }
        bits.into_bytes()
    }

    fn classes_payload(&self) -> Vec<u8> {
        let mut bits = BitWriter::new();
        for class in &self.classes {
            bits.bs(class.class_number as i16)
                .bs(class.version as i16)
                .tv(&class.application_name)
                .tv(&class.native_name)
                .tv(&class.dxf_name)
                .b(class.is_zombie)
                .bs(class.item_class_id as i16);
        }
        bits.into_bytes()
    }
}

fn encode_header_value(bits: &mut BitWriter, kind: HeaderValueKind, value: Option<&HeaderOverride>) {
    let int = match value {
        Some(HeaderOverride::Int(i)) => *i,
        _ => 0,
    };
    match kind {
        HeaderValueKind::Bit => {
            bits.b(int != 0);
        }
        HeaderValueKind::BitShort | HeaderValueKind::Color => {
            bits.bs(int as i16);
        }
        HeaderValueKind::BitLong => {
            bits.bl(int);
        }
        HeaderValueKind::BitDouble => {
            let v = match value {
                Some(HeaderOverride::Float(f)) => *f,
                _ => f64::from(int),
            };
            bits.bd(v);
        }
        HeaderValueKind::Point2Raw => {
            bits.rd(0.0).rd(0.0);
        }
        HeaderValueKind::Point3 => {
            bits.bd3(0.0, 0.0, 0.0);
        }
        HeaderValueKind::Text => {
            let text = match value {
                Some(HeaderOverride::Text(t)) => t.as_str(),
                _ => "",
            };
            bits.tv(text);
        }
        HeaderValueKind::Handle => {
            bits.h(5, int as u64);
        }
        HeaderValueKind::Date | HeaderValueKind::TimeSpan => {
            bits.bl(0).bl(0);
        }
    }
}

/// Sentinel-framed section with an optional CRC over size and payload.
fn framed(start: &[u8; 16], end: &[u8; 16], payload: &[u8], with_crc: bool) -> Vec<u8> {
    let size = (payload.len() as u32).to_le_bytes();
    let mut out = start.to_vec();
    out.extend_from_slice(&size);
    out.extend_from_slice(payload);
    if with_crc {
        let crc = crc8(crc8(CRC_SEED, &size), payload);
        out.extend_from_slice(&crc.to_le_bytes());
    }
    out.extend_from_slice(end);
    out
}

fn modular_short(mut value: usize) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        let chunk = value & 0x7FFF;
        value >>= 15;
        out.push((chunk & 0xFF) as u8);
        let more = if value != 0 { 0x80 } else { 0 };
        out.push((chunk >> 8) as u8 | more);
        if value == 0 {
            return out;
        }
    }
}

/// `MS size | type, sizeInBits, own handle, empty EED, data | handles | CRC`.
fn encode_record(record: &PendingRecord) -> Vec<u8> {
    let mut prefix = BitWriter::new();
    prefix.h(0, record.own_handle).bs(0);

    let mut head = BitWriter::new();
    head.bs(record.type_code);
    let data_bits = head.len() + 32 + prefix.len() + record.data.len();
    head.rl(data_bits as u32)
        .append(&prefix)
        .append(&record.data)
        .append(&record.handles);
    let body = head.into_bytes();

    let mut out = modular_short(body.len());
    out.extend_from_slice(&body);
    let crc = crc8(CRC_SEED, &out);
    out.extend_from_slice(&crc.to_le_bytes());
    out
}

/// Object map: chunks of (handle delta, location delta) pairs with running
/// totals restarting per chunk, closed by an empty chunk.
fn object_map(offsets: &[(u64, usize)], pairs_per_chunk: usize) -> Vec<u8> {
    let mut sorted = offsets.to_vec();
    sorted.sort_by_key(|(handle, _)| *handle);

    let mut out = Vec::new();
    for chunk in sorted.chunks(pairs_per_chunk) {
        let mut body = Vec::new();
        let mut last_handle = 0u64;
        let mut last_loc = 0i64;
        for &(handle, offset) in chunk {
            body.extend(modular_char(handle - last_handle));
            body.extend(signed_modular_char(offset as i64 - last_loc));
            last_handle = handle;
            last_loc = offset as i64;
        }
        let mut framed = ((body.len() + 2) as u16).to_be_bytes().to_vec();
        framed.extend_from_slice(&body);
        let crc = crc8(CRC_SEED, &framed);
        framed.extend_from_slice(&crc.to_be_bytes());
        out.extend(framed);
    }
    out.extend_from_slice(&[0x00, 0x02]);
    out
}

/// Image section at `offset` with an 80-byte header entry and a PNG entry.
fn preview_section(offset: usize, png: &[u8]) -> Vec<u8> {
    const ENTRY_SIZE: usize = 9;
    let data_start = (offset + 16 + 4 + 1 + 2 * ENTRY_SIZE) as u32;
    let mut payload = vec![2u8];
    payload.push(1);
    payload.extend_from_slice(&data_start.to_le_bytes());
    payload.extend_from_slice(&80u32.to_le_bytes());
    payload.push(6);
    payload.extend_from_slice(&(data_start + 80).to_le_bytes());
    payload.extend_from_slice(&(png.len() as u32).to_le_bytes());
    payload.extend_from_slice(&[0u8; 80]);
    payload.extend_from_slice(png);
    framed(&sentinels::PREVIEW_START, &sentinels::PREVIEW_END, &payload, false)
}
