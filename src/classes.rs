//! Class-extension table.
//!
//! Record kinds added after the fixed set of built-in type codes are declared
//! in the `AcDb:Classes` section: each class gets a number (≥ 500) that
//! records use as their type code, plus the DXF name that identifies the kind.

use std::collections::HashMap;

use bitflags::bitflags;
use indexmap::IndexMap;

use crate::io::dwg::constants::ENTITY_CLASS_ID;

bitflags! {
    /// Operations allowed on proxies of a class (the class `version` field).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ProxyFlags: u16 {
        const ERASE_ALLOWED = 0x0001;
        const TRANSFORM_ALLOWED = 0x0002;
        const COLOR_CHANGE_ALLOWED = 0x0004;
        const LAYER_CHANGE_ALLOWED = 0x0008;
        const LINETYPE_CHANGE_ALLOWED = 0x0010;
        const LINETYPE_SCALE_CHANGE_ALLOWED = 0x0020;
        const VISIBILITY_CHANGE_ALLOWED = 0x0040;
        const CLONING_ALLOWED = 0x0080;
        const LINEWEIGHT_CHANGE_ALLOWED = 0x0100;
        const PLOT_STYLE_NAME_CHANGE_ALLOWED = 0x0200;
        const DISABLES_PROXY_WARNING_DIALOG = 0x0400;
        const R13_FORMAT_PROXY = 0x8000;
    }
}

/// One class record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClassDescriptor {
    /// Type code used by records of this class.
    pub class_number: u16,
    /// Proxy capability bits; see [`ClassDescriptor::proxy_flags`].
    pub version: u16,
    pub application_name: String,
    /// C++ class name, e.g. `AcDbDictionaryWithDefault`.
    pub native_name: String,
    /// DXF name selecting the decoder, e.g. `ACDBDICTIONARYWDFLT`.
    pub dxf_name: String,
    pub is_zombie: bool,
    /// 0x1F2 for entity classes, 0x1F3 for object classes.
    pub item_class_id: u16,
}

impl ClassDescriptor {
    pub fn proxy_flags(&self) -> ProxyFlags {
        ProxyFlags::from_bits_retain(self.version)
    }

    /// Whether records of this class are graphical entities.
    pub fn is_entity(&self) -> bool {
        self.item_class_id == ENTITY_CLASS_ID
    }
}

/// Classes keyed by class number, with a secondary index by DXF name.
#[derive(Debug, Clone, Default)]
pub struct ClassTable {
    by_number: IndexMap<u16, ClassDescriptor>,
    by_name: HashMap<String, u16>,
}

impl ClassTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a class, replacing any earlier class with the same number.
    pub fn insert(&mut self, class: ClassDescriptor) {
        if let Some(previous) = self.by_number.get(&class.class_number) {
            self.by_name.remove(&previous.dxf_name.to_uppercase());
        }
        self.by_name
            .insert(class.dxf_name.to_uppercase(), class.class_number);
        self.by_number.insert(class.class_number, class);
    }

    pub fn by_number(&self, class_number: u16) -> Option<&ClassDescriptor> {
        self.by_number.get(&class_number)
    }

    /// Case-insensitive lookup by DXF name.
    pub fn by_dxf_name(&self, dxf_name: &str) -> Option<&ClassDescriptor> {
        self.by_name
            .get(&dxf_name.to_uppercase())
            .and_then(|n| self.by_number.get(n))
    }

    pub fn len(&self) -> usize {
        self.by_number.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_number.is_empty()
    }

    /// Classes in section order.
    pub fn iter(&self) -> impl Iterator<Item = &ClassDescriptor> {
        self.by_number.values()
    }
}
