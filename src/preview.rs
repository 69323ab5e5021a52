//! DWG preview/thumbnail image data.
//!
//! The image section addressed by the file preamble holds an optional
//! thumbnail of the drawing, stored as a BMP, a WMF or a PNG.

/// Type of media stored in the preview image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewImageKind {
    /// BMP bitmap (DIB without file header).
    Bmp,
    /// Windows Metafile.
    Wmf,
    Png,
    /// Any other entry code.
    Unknown(u8),
}

impl PreviewImageKind {
    /// Create from the entry code of the image section.
    pub fn from_code(code: u8) -> Self {
        match code {
            2 => Self::Bmp,
            3 => Self::Wmf,
            6 => Self::Png,
            other => Self::Unknown(other),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Bmp => 2,
            Self::Wmf => 3,
            Self::Png => 6,
            Self::Unknown(code) => code,
        }
    }
}

/// Image bytes of a preview entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewImage {
    pub kind: PreviewImageKind,
    pub data: Vec<u8>,
}

/// Preview/thumbnail data from a DWG file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DwgPreview {
    /// Raw header entry bytes, usually 80 zeros.
    pub header: Vec<u8>,
    pub image: Option<PreviewImage>,
}

impl DwgPreview {
    /// Returns `true` if the preview carries no image.
    pub fn is_empty(&self) -> bool {
        self.image.as_ref().map_or(true, |i| i.data.is_empty())
    }

    pub fn kind(&self) -> Option<PreviewImageKind> {
        self.image.as_ref().map(|i| i.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_default() {
        let preview = DwgPreview::default();
        assert!(preview.is_empty());
        assert_eq!(preview.kind(), None);
    }

    #[test]
    fn test_kind_from_code() {
        assert_eq!(PreviewImageKind::from_code(2), PreviewImageKind::Bmp);
        assert_eq!(PreviewImageKind::from_code(3), PreviewImageKind::Wmf);
        assert_eq!(PreviewImageKind::from_code(6), PreviewImageKind::Png);
        assert_eq!(PreviewImageKind::from_code(9), PreviewImageKind::Unknown(9));
        assert_eq!(PreviewImageKind::Unknown(9).code(), 9);
        assert_eq!(PreviewImageKind::Png.code(), 6);
    }
}
