//! DWG Handle/Object Map section reader.
//!
//! Reads the handle-to-file-offset map from the `AcDb:Handles` section.
//!
//! The section is a series of chunks:
//!
//! ```text
//! | size (2 bytes, big-endian) | body (min(size - 2, 2032) bytes) | crc (2 bytes, big-endian) |
//! ```
//!
//! The body is a run of `(handle delta: MC, location delta: signed MC)`
//! pairs. Both running totals start at zero in every chunk. A chunk whose
//! size is exactly 2 ends the map.

use ahash::RandomState;
use indexmap::IndexMap;
use log::{debug, trace};

use crate::error::Result;
use crate::io::dwg::constants::{CRC_SEED, MAX_CHUNK_SIZE};
use crate::io::dwg::crc::crc8;
use crate::io::dwg::file_header::RawSection;
use crate::io::dwg::reader::stream_reader::DwgStreamReader;
use crate::io::dwg::reader::stream_reader_base::DwgBitReader;
use crate::io::dwg::section_io::slice_at;
use crate::notification::Notification;
use crate::types::Handle;

/// Handle → file offset index, in section order.
#[derive(Debug, Clone, Default)]
pub struct ObjectMap {
    entries: IndexMap<Handle, u64, RandomState>,
}

impl ObjectMap {
    pub fn get(&self, handle: Handle) -> Option<u64> {
        self.entries.get(&handle).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(handle, file offset)` pairs in section order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, u64)> + '_ {
        self.entries.iter().map(|(h, o)| (*h, *o))
    }

    pub fn entries(&self) -> Vec<(Handle, u64)> {
        self.iter().collect()
    }

    fn insert(&mut self, handle: Handle, offset: u64) -> bool {
        self.entries.insert(handle, offset).is_none()
    }
}

/// Reader for the DWG `AcDb:Handles` (object map) section.
pub struct DwgHandleReader<'a> {
    file: &'a [u8],
    section: RawSection,
    validate_crc: bool,
}

impl<'a> DwgHandleReader<'a> {
    pub fn new(file: &'a [u8], section: RawSection, validate_crc: bool) -> Self {
        Self {
            file,
            section,
            validate_crc,
        }
    }

    /// Read the handle-to-offset map. Skipped pairs are reported through
    /// `notifications`.
    pub fn read(&self, notifications: &mut Vec<Notification>) -> Result<ObjectMap> {
        let data = slice_at(
            self.file,
            self.section.byte_offset,
            self.section.byte_size,
            "object map",
        )?;
        let mut reader = DwgBitReader::new(data).with_origin(self.section.byte_offset);
        let mut map = ObjectMap::default();
        let mut chunk_index = 0usize;

        loop {
            let chunk_start = reader.position_in_bits() / 8;
            // Size of this chunk, most significant byte first.
            let size = (u16::from(reader.read_byte()?) << 8) | u16::from(reader.read_byte()?);
            if size == 2 {
                break;
            }
            if size < 2 {
                return Err(reader.error_here(format!("object map chunk size {size}")));
            }

            let body_len = usize::from(size) - 2;
            if body_len > MAX_CHUNK_SIZE {
                return Err(reader.error_here(format!(
                    "object map chunk size {size} exceeds {} bytes",
                    MAX_CHUNK_SIZE + 2
                )));
            }
            let body_len = body_len as u64;
            let body_start = reader.position_in_bits();
            let body_end = body_start + body_len * 8;
            if body_end > reader.limit_in_bits() {
                return Err(reader.error_here(format!(
                    "object map chunk of {body_len} bytes overruns the section"
                )));
            }

            // Running totals reset for every chunk.
            let mut last_handle: u64 = 0;
            let mut last_loc: i64 = 0;
            let mut chunk = reader.sub_reader(body_start, body_end)?;
            while chunk.position_in_bits() < body_end {
                let handle_delta = chunk.read_modular_char()?;
                let loc_delta = chunk.read_signed_modular_char()?;

                last_handle = last_handle
                    .checked_add(handle_delta)
                    .ok_or_else(|| chunk.error_here("object map handle overflow".into()))?;
                last_loc = last_loc.saturating_add(loc_delta);
                if last_loc < 0 {
                    return Err(chunk.error_here(format!(
                        "object map location went negative ({last_loc})"
                    )));
                }

                if handle_delta == 0 {
                    notifications.push(Notification::warning(format!(
                        "object map chunk {chunk_index}: pair with zero handle delta skipped"
                    )));
                    continue;
                }
                if !map.insert(Handle::new(last_handle), last_loc as u64) {
                    return Err(chunk.error_here(format!(
                        "handle {:#X} appears twice in the object map",
                        last_handle
                    )));
                }
            }
            reader.set_position_in_bits(body_end)?;

            // CRC, most significant byte first.
            let crc = (u16::from(reader.read_byte()?) << 8) | u16::from(reader.read_byte()?);
            if self.validate_crc {
                let covered = &data[chunk_start as usize..(body_end / 8) as usize];
                let computed = crc8(CRC_SEED, covered);
                if computed != crc {
                    return Err(reader.error_here(format!(
                        "object map chunk {chunk_index} CRC mismatch: stored {crc:#06X}, computed {computed:#06X}"
                    )));
                }
            }

            trace!("object map chunk {chunk_index}: {body_len} bytes");
            chunk_index += 1;
        }

        debug!("object map: {} handles in {chunk_index} chunks", map.len());
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(body: &[u8]) -> Vec<u8> {
        let size = (body.len() + 2) as u16;
        let mut out = size.to_be_bytes().to_vec();
        out.extend_from_slice(body);
        let crc = crc8(CRC_SEED, &out);
        out.extend_from_slice(&crc.to_be_bytes());
        out
    }

    fn read(section: &[u8]) -> Result<(ObjectMap, Vec<Notification>)> {
        let mut notes = Vec::new();
        let reader = DwgHandleReader::new(section, RawSection::new(0, section.len() as u64), true);
        reader.read(&mut notes).map(|m| (m, notes))
    }

    #[test]
    fn test_empty_section() {
        let (map, _) = read(&[0x00, 0x02]).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_accumulators_reset_per_chunk() {
        let mut data = chunk(&[0x01, 0x20, 0x02, 0x10]);
        // Second chunk restarts from zero: handle 5 at 0x18.
        data.extend(chunk(&[0x05, 0x18]));
        data.extend_from_slice(&[0x00, 0x02]);

        let (map, notes) = read(&data).unwrap();
        assert!(notes.is_empty());
        assert_eq!(
            map.entries(),
            vec![
                (Handle::new(1), 0x20),
                (Handle::new(3), 0x30),
                (Handle::new(5), 0x18),
            ]
        );
    }

    #[test]
    fn test_negative_location_delta() {
        // +0x40 takes two bytes; -8 is the sign bit | 8.
        let mut data = chunk(&[0x01, 0xC0, 0x00, 0x02, 0x48]);
        data.extend_from_slice(&[0x00, 0x02]);
        let (map, _) = read(&data).unwrap();
        assert_eq!(map.get(Handle::new(1)), Some(0x40));
        assert_eq!(map.get(Handle::new(3)), Some(0x38));
    }

    #[test]
    fn test_negative_total_is_rejected() {
        let mut data = chunk(&[0x01, 0x45]);
        data.extend_from_slice(&[0x00, 0x02]);
        assert!(read(&data).unwrap_err().is_format());
    }

    #[test]
    fn test_duplicate_handle_is_rejected() {
        let mut data = chunk(&[0x04, 0x10]);
        data.extend(chunk(&[0x04, 0x20]));
        data.extend_from_slice(&[0x00, 0x02]);
        assert!(read(&data).unwrap_err().is_format());
    }

    #[test]
    fn test_zero_handle_delta_is_skipped() {
        let mut data = chunk(&[0x00, 0x10, 0x01, 0x01]);
        data.extend_from_slice(&[0x00, 0x02]);
        let (map, notes) = read(&data).unwrap();
        assert_eq!(map.entries(), vec![(Handle::new(1), 0x11)]);
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn test_chunk_at_size_limit_is_read_whole() {
        let body: Vec<u8> = [0x01, 0x01].repeat(MAX_CHUNK_SIZE / 2);
        let mut data = chunk(&body);
        data.extend_from_slice(&[0x00, 0x02]);
        let (map, _) = read(&data).unwrap();
        assert_eq!(map.len(), MAX_CHUNK_SIZE / 2);
        assert_eq!(map.get(Handle::new(1016)), Some(1016));
    }

    #[test]
    fn test_oversized_chunk_is_rejected() {
        let body: Vec<u8> = [0x01, 0x01].repeat(MAX_CHUNK_SIZE / 2 + 4);
        let mut data = chunk(&body);
        data.extend_from_slice(&[0x00, 0x02]);
        let err = read(&data).unwrap_err();
        assert!(err.is_format());
        assert!(err.to_string().contains("exceeds"));
    }

    #[test]
    fn test_missing_terminator_is_rejected() {
        let data = chunk(&[0x01, 0x10]);
        assert!(read(&data).unwrap_err().is_format());
    }

    #[test]
    fn test_chunk_crc_checked() {
        let mut data = chunk(&[0x01, 0x10]);
        let last = data.len() - 1;
        data[last] ^= 0xFF;
        data.extend_from_slice(&[0x00, 0x02]);
        assert!(read(&data).is_err());
    }
}
