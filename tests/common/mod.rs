//! Shared test utilities for dwgr15 integration tests.
//!
//! Holds a bit-level encoder for the DWG primitives and a builder that
//! synthesizes complete AC1015 files, imported by every test crate via
//! `mod common;`.

#![allow(dead_code)]

pub mod builders;

pub use builders::DwgFileBuilder;

use dwgr15::{DwgDocument, DwgReader, DwgReaderConfiguration};

// ===========================================================================
// Bit writer
// ===========================================================================

/// MSB-first bit encoder mirroring the reader's primitives.
#[derive(Debug, Default, Clone)]
pub struct BitWriter {
    bytes: Vec<u8>,
    len: u64,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bits written.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn bit_at(&self, index: u64) -> bool {
        self.bytes[(index / 8) as usize] & (0x80 >> (index % 8)) != 0
    }

    /// Write the low `count` bits of `value`, most significant first.
    pub fn push(&mut self, value: u64, count: u32) -> &mut Self {
        for i in (0..count).rev() {
            if self.len % 8 == 0 {
                self.bytes.push(0);
            }
            if (value >> i) & 1 == 1 {
                let last = self.bytes.len() - 1;
                self.bytes[last] |= 0x80 >> (self.len % 8);
            }
            self.len += 1;
        }
        self
    }

    pub fn append(&mut self, other: &BitWriter) -> &mut Self {
        for i in 0..other.len {
            self.push(u64::from(other.bit_at(i)), 1);
        }
        self
    }

    pub fn b(&mut self, v: bool) -> &mut Self {
        self.push(u64::from(v), 1)
    }

    pub fn bb(&mut self, v: u8) -> &mut Self {
        self.push(u64::from(v), 2)
    }

    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        for b in bytes {
            self.push(u64::from(*b), 8);
        }
        self
    }

    pub fn rc(&mut self, v: u8) -> &mut Self {
        self.raw(&[v])
    }

    pub fn rs(&mut self, v: i16) -> &mut Self {
        self.raw(&v.to_le_bytes())
    }

    pub fn rl(&mut self, v: u32) -> &mut Self {
        self.raw(&v.to_le_bytes())
    }

    pub fn rd(&mut self, v: f64) -> &mut Self {
        self.raw(&v.to_le_bytes())
    }

    pub fn bs(&mut self, v: i16) -> &mut Self {
        match v {
            0 => self.bb(2),
            256 => self.bb(3),
            1..=255 => self.bb(1).rc(v as u8),
            _ => self.bb(0).rs(v),
        }
    }

    pub fn bl(&mut self, v: i32) -> &mut Self {
        match v {
            0 => self.bb(2),
            1..=255 => self.bb(1).rc(v as u8),
            _ => self.bb(0).raw(&v.to_le_bytes()),
        }
    }

    pub fn bd(&mut self, v: f64) -> &mut Self {
        if v == 0.0 {
            self.bb(2)
        } else if v == 1.0 {
            self.bb(1)
        } else {
            self.bb(0).rd(v)
        }
    }

    /// DD stored as a full double.
    pub fn dd(&mut self, v: f64) -> &mut Self {
        self.bb(3).rd(v)
    }

    pub fn bd3(&mut self, x: f64, y: f64, z: f64) -> &mut Self {
        self.bd(x).bd(y).bd(z)
    }

    /// BE for the default (0, 0, 1) extrusion.
    pub fn be_default(&mut self) -> &mut Self {
        self.b(true)
    }

    /// BT of zero.
    pub fn bt_zero(&mut self) -> &mut Self {
        self.b(true)
    }

    pub fn tv(&mut self, s: &str) -> &mut Self {
        self.bs(s.len() as i16).raw(s.as_bytes())
    }

    /// Handle reference with the minimum number of value bytes.
    pub fn h(&mut self, code: u8, value: u64) -> &mut Self {
        let bytes: Vec<u8> = value
            .to_be_bytes()
            .iter()
            .copied()
            .skip_while(|b| *b == 0)
            .collect();
        self.rc((code << 4) | bytes.len() as u8).raw(&bytes)
    }

    /// Entity common data for a model-space entity on layer `layer`, with
    /// the handle-stream counterpart written to `handles`.
    pub fn entity_common(&mut self, handles: &mut BitWriter, layer: u64) -> &mut Self {
        self.b(false) // no graphics
            .bb(2) // model space
            .bl(0) // reactors
            .b(true) // no links
            .bs(256) // color BYLAYER
            .bd(1.0) // linetype scale
            .bb(0) // linetype BYLAYER
            .bb(0) // plotstyle BYLAYER
            .bs(0) // visible
            .rc(29); // lineweight BYLAYER
        handles.h(3, 0).h(5, layer);
        self
    }

    /// Non-entity common data: no reactors, owner `owner`.
    pub fn object_common(&mut self, handles: &mut BitWriter, owner: u64) -> &mut Self {
        self.bl(0);
        handles.h(4, owner).h(3, 0);
        self
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Unsigned modular char.
pub fn modular_char(mut value: u64) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        if value < 0x80 {
            out.push(value as u8);
            return out;
        }
        out.push((value & 0x7F) as u8 | 0x80);
        value >>= 7;
    }
}

/// Signed modular char: 6 data bits and the sign in the final byte.
pub fn signed_modular_char(value: i64) -> Vec<u8> {
    let sign = if value < 0 { 0x40 } else { 0 };
    let mut magnitude = value.unsigned_abs();
    let mut out = Vec::new();
    loop {
        if magnitude < 0x40 {
            out.push(magnitude as u8 | sign);
            return out;
        }
        out.push((magnitude & 0x7F) as u8 | 0x80);
        magnitude >>= 7;
    }
}

// ===========================================================================
// Record helpers
// ===========================================================================

/// LINE data and handle streams with a 2D segment from `p1` to `p2`.
pub fn line_streams(p1: (f64, f64), p2: (f64, f64), layer: u64) -> (BitWriter, BitWriter) {
    let mut data = BitWriter::new();
    let mut handles = BitWriter::new();
    data.entity_common(&mut handles, layer);
    data.b(true)
        .rd(p1.0)
        .dd(p2.0)
        .rd(p1.1)
        .dd(p2.1)
        .bt_zero()
        .be_default();
    (data, handles)
}

/// DICTIONARY data and handle streams naming `entries`.
pub fn dictionary_streams(owner: u64, entries: &[(&str, u64)]) -> (BitWriter, BitWriter) {
    let mut data = BitWriter::new();
    let mut handles = BitWriter::new();
    data.object_common(&mut handles, owner);
    data.bl(entries.len() as i32).bs(0).rc(0);
    for (name, handle) in entries {
        data.tv(name);
        handles.h(2, *handle);
    }
    (data, handles)
}

// ===========================================================================
// Read helpers
// ===========================================================================

/// Decode with the default configuration, panicking on failure.
pub fn read_doc(file: &[u8]) -> DwgDocument {
    DwgReader::from_bytes(file.to_vec())
        .read()
        .unwrap_or_else(|e| panic!("Failed to read synthetic DWG: {e}"))
}

/// Decode with `config`.
pub fn read_with(file: &[u8], config: DwgReaderConfiguration) -> dwgr15::Result<DwgDocument> {
    DwgReader::from_bytes(file.to_vec()).with_config(config).read()
}
