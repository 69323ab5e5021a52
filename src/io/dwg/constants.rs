//! Constants, sentinel bytes, and magic numbers for the AC1015 format.

/// Version tag at the start of every R2000 drawing.
pub const VERSION_TAG: &[u8; 6] = b"AC1015";

/// Largest body of one object-map chunk, excluding the size prefix and CRC.
pub const MAX_CHUNK_SIZE: usize = 2032;

/// CRC seed for the preamble, the framed sections and object records.
pub const CRC_SEED: u16 = 0xC0C1;

/// Class numbers start here; lower type codes are fixed kinds.
pub const FIRST_CLASS_NUMBER: u16 = 500;

/// Class `item_class_id` marking entity classes.
pub const ENTITY_CLASS_ID: u16 = 0x1F2;

/// Class `item_class_id` marking non-graphical object classes.
pub const OBJECT_CLASS_ID: u16 = 0x1F3;

/// Section names as used in diagnostics.
pub mod section_names {
    pub const HEADER: &str = "AcDb:Header";
    pub const CLASSES: &str = "AcDb:Classes";
    pub const HANDLES: &str = "AcDb:Handles";
    pub const OBJ_FREE_SPACE: &str = "AcDb:ObjFreeSpace";
    pub const TEMPLATE: &str = "AcDb:Template";
    pub const AUX_HEADER: &str = "AcDb:AuxHeader";
    pub const PREVIEW: &str = "AcDb:Preview";
}

/// Sentinel bytes for section boundaries (16-byte markers).
pub mod sentinels {
    /// AcDb:Header section start sentinel
    pub const HEADER_START: [u8; 16] = [
        0xCF, 0x7B, 0x1F, 0x23, 0xFD, 0xDE, 0x38, 0xA9, 0x5F, 0x7C, 0x68, 0xB8, 0x4E, 0x6D,
        0x33, 0x5F,
    ];
    /// AcDb:Header section end sentinel
    pub const HEADER_END: [u8; 16] = [
        0x30, 0x84, 0xE0, 0xDC, 0x02, 0x21, 0xC7, 0x56, 0xA0, 0x83, 0x97, 0x47, 0xB1, 0x92,
        0xCC, 0xA0,
    ];
    /// AcDb:Classes section start sentinel
    pub const CLASSES_START: [u8; 16] = [
        0x8D, 0xA1, 0xC4, 0xB8, 0xC4, 0xA9, 0xF8, 0xC5, 0xC0, 0xDC, 0xF4, 0x5F, 0xE7, 0xCF,
        0xB6, 0x8A,
    ];
    /// AcDb:Classes section end sentinel
    pub const CLASSES_END: [u8; 16] = [
        0x72, 0x5E, 0x3B, 0x47, 0x3B, 0x56, 0x07, 0x3A, 0x3F, 0x23, 0x0B, 0xA0, 0x18, 0x30,
        0x49, 0x75,
    ];
    /// AcDb:Preview section start sentinel
    pub const PREVIEW_START: [u8; 16] = [
        0x1F, 0x25, 0x6D, 0x07, 0xD4, 0x36, 0x28, 0x28, 0x9D, 0x57, 0xCA, 0x3F, 0x9D, 0x44,
        0x10, 0x2B,
    ];
    /// AcDb:Preview section end sentinel
    pub const PREVIEW_END: [u8; 16] = [
        0xE0, 0xDA, 0x92, 0xF8, 0x2B, 0xC9, 0xD7, 0xD7, 0x62, 0xA8, 0x35, 0xC0, 0x62, 0xBB,
        0xEF, 0xD4,
    ];
    /// Closes the file preamble
    pub const FILE_HEADER_END: [u8; 16] = [
        0x95, 0xA0, 0x4E, 0x28, 0x99, 0x82, 0x1A, 0xE5, 0x5E, 0x41, 0xE0, 0x5F, 0x9D, 0x3A,
        0x4D, 0x00,
    ];
}
