//! Handle reference codes.
//!
//! A stored handle is `|CODE (4 bits)|COUNTER (4 bits)|HANDLE bytes (COUNTER)|`.
//! Codes 2..=5 carry an absolute handle with ownership/pointer semantics;
//! codes 6, 8, 0xA and 0xC are offsets from the handle of the record being
//! decoded.

use crate::error::{DwgError, Result};
use crate::types::Handle;

/// DWG handle reference code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DwgReferenceType {
    /// Plain handle, used for a record's own handle (code 0)
    Undefined = 0,
    /// Soft ownership reference (code 2)
    SoftOwnership = 2,
    /// Hard ownership reference (code 3)
    HardOwnership = 3,
    /// Soft pointer reference (code 4)
    SoftPointer = 4,
    /// Hard pointer reference (code 5)
    HardPointer = 5,
    /// Reference handle + 1 (code 6)
    PlusOne = 6,
    /// Reference handle - 1 (code 8)
    MinusOne = 8,
    /// Reference handle + offset (code 0xA)
    PlusOffset = 0xA,
    /// Reference handle - offset (code 0xC)
    MinusOffset = 0xC,
}

impl DwgReferenceType {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Self::Undefined),
            2 => Some(Self::SoftOwnership),
            3 => Some(Self::HardOwnership),
            4 => Some(Self::SoftPointer),
            5 => Some(Self::HardPointer),
            6 => Some(Self::PlusOne),
            8 => Some(Self::MinusOne),
            0xA => Some(Self::PlusOffset),
            0xC => Some(Self::MinusOffset),
            _ => None,
        }
    }

    /// Whether the stored value is an offset from the reference handle.
    pub fn is_relative(&self) -> bool {
        matches!(
            self,
            Self::PlusOne | Self::MinusOne | Self::PlusOffset | Self::MinusOffset
        )
    }
}

/// Turn a stored `(code, value)` pair into an absolute handle.
///
/// Codes 1, 7, 9, 0xB and 0xD..=0xF are not produced by AutoCAD; their value
/// is taken as absolute. A relative reference that would step below zero or
/// past `u64::MAX` is a format error.
pub fn resolve_handle(code: u8, value: u64, reference: Handle) -> Result<Handle> {
    let base = reference.value();
    let resolved = match DwgReferenceType::from_code(code) {
        Some(DwgReferenceType::PlusOne) => base.checked_add(1),
        Some(DwgReferenceType::MinusOne) => base.checked_sub(1),
        Some(DwgReferenceType::PlusOffset) => base.checked_add(value),
        Some(DwgReferenceType::MinusOffset) => base.checked_sub(value),
        _ => Some(value),
    };
    resolved.map(Handle::new).ok_or_else(|| {
        DwgError::format(format!(
            "relative handle code {code:#X} with offset {value:#X} leaves the handle range from {reference}"
        ))
    })
}
