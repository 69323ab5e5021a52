//! DWG Preview (thumbnail) section reader.
//!
//! The image section sits at the address stored in the file preamble:
//!
//! ```text
//! | start sentinel | RL overall size | RC entry count | entries | image bytes | end sentinel |
//! ```
//!
//! Each entry is `RC code, RL start, RL size`; code 1 is the header block,
//! other codes are images (2 = BMP, 3 = WMF, 6 = PNG). Start offsets are
//! absolute file positions. The section carries no CRC.

use byteorder::{ByteOrder, LittleEndian};
use log::debug;

use crate::error::{DwgError, Result};
use crate::io::dwg::section_io::{slice_at, PREVIEW_FRAME};
use crate::preview::{DwgPreview, PreviewImage, PreviewImageKind};

/// Bytes per entry: RC code, RL start, RL size.
const ENTRY_SIZE: usize = 9;
const HEADER_ENTRY: u8 = 1;

/// Reader for the DWG image (thumbnail) section.
pub struct DwgPreviewReader<'a> {
    file: &'a [u8],
    address: u64,
}

impl<'a> DwgPreviewReader<'a> {
    /// Create a reader for the section starting at `address`.
    pub fn new(file: &'a [u8], address: u64) -> Self {
        Self { file, address }
    }

    /// Read the preview entries and copy their bytes out of the file.
    pub fn read(&self) -> Result<DwgPreview> {
        let framed = PREVIEW_FRAME.read(self.file, self.address, false)?;
        let payload = framed.payload;
        let count = *payload.first().ok_or_else(|| {
            DwgError::format_at_byte("empty image section", framed.payload_offset)
        })? as usize;

        let entries = payload.get(1..1 + count * ENTRY_SIZE).ok_or_else(|| {
            DwgError::format_at_byte(
                format!("{count} image entries do not fit in {} bytes", payload.len()),
                framed.payload_offset,
            )
        })?;

        let mut preview = DwgPreview::default();
        for entry in entries.chunks_exact(ENTRY_SIZE) {
            let code = entry[0];
            let start = LittleEndian::read_u32(&entry[1..5]);
            let size = LittleEndian::read_u32(&entry[5..9]);
            let bytes = slice_at(self.file, u64::from(start), u64::from(size), "preview entry")?;

            if code == HEADER_ENTRY {
                preview.header = bytes.to_vec();
            } else {
                preview.image = Some(PreviewImage {
                    kind: PreviewImageKind::from_code(code),
                    data: bytes.to_vec(),
                });
            }
        }

        debug!(
            "preview: {} header bytes, image {:?}",
            preview.header.len(),
            preview.kind()
        );
        Ok(preview)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::dwg::constants::sentinels;

    /// Image section at `base` with an 80-byte header and a PNG body.
    fn section(base: u32, body: &[u8]) -> Vec<u8> {
        let data_start = base + 16 + 4 + 1 + 2 * ENTRY_SIZE as u32;
        let mut payload = vec![2u8];
        payload.push(1);
        payload.extend_from_slice(&data_start.to_le_bytes());
        payload.extend_from_slice(&80u32.to_le_bytes());
        payload.push(6);
        payload.extend_from_slice(&(data_start + 80).to_le_bytes());
        payload.extend_from_slice(&(body.len() as u32).to_le_bytes());
        payload.extend_from_slice(&[0u8; 80]);
        payload.extend_from_slice(body);

        let mut out = vec![0u8; base as usize];
        out.extend_from_slice(&sentinels::PREVIEW_START);
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(&payload);
        out.extend_from_slice(&sentinels::PREVIEW_END);
        out
    }

    #[test]
    fn test_read_png_preview() {
        let body = b"\x89PNG\r\n\x1a\n-image-";
        let file = section(0x40, body);
        let preview = DwgPreviewReader::new(&file, 0x40).read().unwrap();
        assert_eq!(preview.header.len(), 80);
        assert_eq!(preview.kind(), Some(PreviewImageKind::Png));
        assert_eq!(preview.image.unwrap().data, body.to_vec());
    }

    #[test]
    fn test_entry_out_of_file_is_rejected() {
        let mut file = section(0, b"abc");
        // Point the image entry far past the end of the file.
        let entry_start = 16 + 4 + 1 + ENTRY_SIZE + 1;
        file[entry_start..entry_start + 4].copy_from_slice(&0x00FF_0000u32.to_le_bytes());
        assert!(DwgPreviewReader::new(&file, 0).read().unwrap_err().is_format());
    }

    #[test]
    fn test_bad_sentinel_is_rejected() {
        let mut file = section(0, b"abc");
        file[3] ^= 0x20;
        assert!(DwgPreviewReader::new(&file, 0).read().is_err());
    }
}
