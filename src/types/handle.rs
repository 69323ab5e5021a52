//! Object handles.
//!
//! Every record in a drawing is identified by a 64-bit handle. Records refer
//! to one another through [`HandleRef`]s: a handle plus the reference code it
//! was stored with. References are weak; resolving one is a lookup in the
//! document, never an ownership relation.

use std::fmt;

use crate::io::dwg::reference_type::DwgReferenceType;

/// A unique identifier for a drawing record
///
/// Handle 0 is reserved and never identifies a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u64);

impl Handle {
    /// The null/invalid handle (0)
    pub const NULL: Handle = Handle(0);

    #[inline]
    pub const fn new(value: u64) -> Self {
        Handle(value)
    }

    #[inline]
    pub const fn value(&self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Handle {
    fn default() -> Self {
        Handle::NULL
    }
}

impl From<u64> for Handle {
    fn from(value: u64) -> Self {
        Handle(value)
    }
}

impl From<Handle> for u64 {
    fn from(handle: Handle) -> Self {
        handle.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#X}", self.0)
    }
}

impl fmt::UpperHex for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.0, f)
    }
}

/// A reference from one record to another.
///
/// `handle` is always absolute: references stored relative to the owning
/// record (codes 6, 8, 0xA, 0xC) are resolved while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HandleRef {
    /// Reference code as stored in the file (upper nibble of the handle byte).
    pub code: u8,
    /// Absolute handle of the referenced record.
    pub handle: Handle,
}

impl HandleRef {
    pub const fn new(code: u8, handle: Handle) -> Self {
        Self { code, handle }
    }

    pub fn is_null(&self) -> bool {
        self.handle.is_null()
    }

    /// Ownership/pointer kind of the reference, if the code is a known one.
    pub fn reference_type(&self) -> Option<DwgReferenceType> {
        DwgReferenceType::from_code(self.code)
    }
}

impl fmt::Display for HandleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:X}", self.code, self.handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_handle() {
        assert!(Handle::NULL.is_null());
        assert!(Handle::default().is_null());
        assert!(!Handle::new(0x1F).is_null());
    }

    #[test]
    fn test_handle_display() {
        let handle = Handle::new(0xABCD);
        assert_eq!(format!("{}", handle), "0xABCD");
        assert_eq!(format!("{:X}", handle), "ABCD");
    }

    #[test]
    fn test_handle_ref_display() {
        let r = HandleRef::new(5, Handle::new(0x2F));
        assert_eq!(r.to_string(), "5.2F");
        assert_eq!(r.reference_type(), Some(DwgReferenceType::HardPointer));
        assert!(HandleRef::default().is_null());
    }
}
