//! Error types for the DWG decoder.
//!
//! Every structural problem in a file surfaces as [`DwgError::Format`]; the
//! only other failure is the byte source itself failing.

use std::fmt;
use std::io;
use thiserror::Error;

/// Position in the file at which a format error was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorOffset {
    /// Absolute byte offset.
    Byte(u64),
    /// Absolute bit offset (byte offset × 8 + bit index).
    Bit(u64),
}

impl fmt::Display for ErrorOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorOffset::Byte(b) => write!(f, "byte {b:#X}"),
            ErrorOffset::Bit(b) => write!(f, "bit {b} (byte {:#X}.{})", b / 8, b % 8),
        }
    }
}

/// Main error type for DWG decoding.
#[derive(Debug, Error)]
pub enum DwgError {
    /// IO error occurred while reading the byte source
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The file is not a well-formed AC1015 drawing
    #[error(
        "Format error: {reason}{}",
        .offset.map(|o| format!(" at {o}")).unwrap_or_default()
    )]
    Format {
        reason: String,
        offset: Option<ErrorOffset>,
    },
}

/// Result type alias for DWG decoding.
pub type Result<T> = std::result::Result<T, DwgError>;

impl DwgError {
    /// Format error without a known position.
    pub fn format(reason: impl Into<String>) -> Self {
        DwgError::Format {
            reason: reason.into(),
            offset: None,
        }
    }

    /// Format error detected at an absolute byte offset.
    pub fn format_at_byte(reason: impl Into<String>, offset: u64) -> Self {
        DwgError::Format {
            reason: reason.into(),
            offset: Some(ErrorOffset::Byte(offset)),
        }
    }

    /// Format error detected at an absolute bit offset.
    pub fn format_at_bit(reason: impl Into<String>, offset: u64) -> Self {
        DwgError::Format {
            reason: reason.into(),
            offset: Some(ErrorOffset::Bit(offset)),
        }
    }

    /// Returns `true` for [`DwgError::Format`].
    pub fn is_format(&self) -> bool {
        matches!(self, DwgError::Format { .. })
    }

    /// Offset carried by a format error, if any.
    pub fn offset(&self) -> Option<ErrorOffset> {
        match self {
            DwgError::Format { offset, .. } => *offset,
            DwgError::Io(_) => None,
        }
    }
}
