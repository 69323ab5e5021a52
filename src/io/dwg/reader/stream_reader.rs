//! DWG bit-level stream reader trait.
//!
//! DWG data is **bit-aligned**: a field starts wherever the previous one
//! ended. Implementors supply positioning and raw bit extraction; every
//! typed read is provided on top of [`DwgStreamReader::read_bits`], so all
//! reads share one bounds check against the reader's limit.
//!
//! Codes used in method docs:
//!
//! - **B**: bit (1 bit)
//! - **BB**: 2-bit code
//! - **BS**: BitShort (2 + 0/8/16 bits)
//! - **BL**: BitLong (2 + 0/8/32 bits)
//! - **BD**: BitDouble (2 + 0/64 bits)
//! - **DD**: BitDouble with default (2 + 0/32/48/64 bits)
//! - **MC**: Modular Char (7-bit chunks), **MS**: Modular Short (15-bit chunks)
//! - **H**: Handle reference
//! - **TV**: Variable text
//! - **RC**: Raw Char, **RS**: Raw Short, **RL**: Raw Long, **RD**: Raw Double
//! - **SN**: Sentinel (16 bytes)
//! - **BE**: BitExtrusion, **BT**: BitThickness
//! - **CMC**: CmColor (a BS color index in R2000)

use encoding_rs::Encoding;

use crate::error::{DwgError, Result};
use crate::io::dwg::reference_type::resolve_handle;
use crate::types::{Handle, HandleRef, Vector2, Vector3};

/// Raw `(code, value)` handle as stored, before relative codes are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawHandle {
    pub code: u8,
    /// Number of value bytes that followed the code byte.
    pub counter: u8,
    pub value: u64,
}

/// Trait for bit-level DWG stream reading.
pub trait DwgStreamReader {
    /// Current position, in bits from the start of the buffer.
    fn position_in_bits(&self) -> u64;

    /// Move the cursor. Positions past the limit are a format error.
    fn set_position_in_bits(&mut self, position: u64) -> Result<()>;

    /// Exclusive upper bound of readable bits.
    fn limit_in_bits(&self) -> u64;

    /// Read `count` (≤ 64) bits MSB-first into the low bits of the result.
    fn read_bits(&mut self, count: u32) -> Result<u64>;

    /// Text encoding for **TV** strings.
    fn encoding(&self) -> &'static Encoding;

    /// Format error located at the current cursor.
    fn error_here(&self, reason: String) -> DwgError;

    fn remaining_bits(&self) -> u64 {
        self.limit_in_bits().saturating_sub(self.position_in_bits())
    }

    // ---------------------------------------------------------------
    // Bits and raw values
    // ---------------------------------------------------------------

    /// **B**
    fn read_bit(&mut self) -> Result<bool> {
        Ok(self.read_bits(1)? == 1)
    }

    /// **BB**
    fn read_2bits(&mut self) -> Result<u8> {
        Ok(self.read_bits(2)? as u8)
    }

    fn read_byte(&mut self) -> Result<u8> {
        Ok(self.read_bits(8)? as u8)
    }

    /// Read `length` whole bytes from the current bit position.
    fn read_bytes(&mut self, length: usize) -> Result<Vec<u8>> {
        let needed = (length as u64).saturating_mul(8);
        if needed > self.remaining_bits() {
            return Err(self.error_here(format!(
                "{length} bytes requested but only {} bits remain",
                self.remaining_bits()
            )));
        }
        let mut bytes = Vec::with_capacity(length);
        for _ in 0..length {
            bytes.push(self.read_byte()?);
        }
        Ok(bytes)
    }

    fn read_le_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut arr = [0u8; N];
        for b in arr.iter_mut() {
            *b = self.read_byte()?;
        }
        Ok(arr)
    }

    /// **RC**
    fn read_raw_char(&mut self) -> Result<u8> {
        self.read_byte()
    }

    /// **RS**
    fn read_raw_short(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.read_le_array()?))
    }

    /// **RS**, unsigned
    fn read_raw_ushort(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_le_array()?))
    }

    /// **RL**
    fn read_raw_long(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_le_array()?))
    }

    /// **RL**, unsigned
    fn read_raw_ulong(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_le_array()?))
    }

    /// **RD**
    fn read_raw_double(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.read_le_array()?))
    }

    /// **2RD**
    fn read_2raw_double(&mut self) -> Result<Vector2> {
        let x = self.read_raw_double()?;
        let y = self.read_raw_double()?;
        Ok(Vector2::new(x, y))
    }

    /// **3RD**
    fn read_3raw_double(&mut self) -> Result<Vector3> {
        let x = self.read_raw_double()?;
        let y = self.read_raw_double()?;
        let z = self.read_raw_double()?;
        Ok(Vector3::new(x, y, z))
    }

    // ---------------------------------------------------------------
    // Compressed numbers
    // ---------------------------------------------------------------

    /// **BS**: 00: RS follows, 01: unsigned RC follows, 10: 0, 11: 256.
    fn read_bit_short(&mut self) -> Result<i16> {
        match self.read_2bits()? {
            0 => self.read_raw_short(),
            1 => Ok(i16::from(self.read_byte()?)),
            2 => Ok(0),
            _ => Ok(256),
        }
    }

    /// **BS** read as a boolean (nonzero = true).
    fn read_bit_short_as_bool(&mut self) -> Result<bool> {
        Ok(self.read_bit_short()? != 0)
    }

    /// **BL**: 00: RL follows, 01: unsigned RC follows, 10: 0, 11: unused.
    fn read_bit_long(&mut self) -> Result<i32> {
        match self.read_2bits()? {
            0 => self.read_raw_long(),
            1 => Ok(i32::from(self.read_byte()?)),
            2 => Ok(0),
            _ => Err(self.error_here("bit long selector 3 is not used".into())),
        }
    }

    /// **BL** used as an element count; negative counts are a format error.
    fn read_count(&mut self) -> Result<usize> {
        let count = self.read_bit_long()?;
        usize::try_from(count)
            .map_err(|_| self.error_here(format!("negative element count {count}")))
    }

    /// **BD**: 00: RD follows, 01: 1.0, 10: 0.0, 11: unused.
    fn read_bit_double(&mut self) -> Result<f64> {
        match self.read_2bits()? {
            0 => self.read_raw_double(),
            1 => Ok(1.0),
            2 => Ok(0.0),
            _ => Err(self.error_here("bit double selector 3 is not used".into())),
        }
    }

    /// **DD**: patches the little-endian image of `def`.
    ///
    /// 00: `def`; 01: 4 bytes replace bytes 0..4; 10: 6 bytes replace bytes
    /// 4..6 then 0..4; 11: a full RD.
    fn read_bit_double_with_default(&mut self, def: f64) -> Result<f64> {
        let mut arr = def.to_le_bytes();
        match self.read_2bits()? {
            0 => Ok(def),
            1 => {
                for b in arr.iter_mut().take(4) {
                    *b = self.read_byte()?;
                }
                Ok(f64::from_le_bytes(arr))
            }
            2 => {
                arr[4] = self.read_byte()?;
                arr[5] = self.read_byte()?;
                for b in arr.iter_mut().take(4) {
                    *b = self.read_byte()?;
                }
                Ok(f64::from_le_bytes(arr))
            }
            _ => self.read_raw_double(),
        }
    }

    /// **2DD**
    fn read_2bit_double_with_default(&mut self, def: Vector2) -> Result<Vector2> {
        let x = self.read_bit_double_with_default(def.x)?;
        let y = self.read_bit_double_with_default(def.y)?;
        Ok(Vector2::new(x, y))
    }

    /// **2BD**
    fn read_2bit_double(&mut self) -> Result<Vector2> {
        let x = self.read_bit_double()?;
        let y = self.read_bit_double()?;
        Ok(Vector2::new(x, y))
    }

    /// **3BD**
    fn read_3bit_double(&mut self) -> Result<Vector3> {
        let x = self.read_bit_double()?;
        let y = self.read_bit_double()?;
        let z = self.read_bit_double()?;
        Ok(Vector3::new(x, y, z))
    }

    /// **BE**: set bit: (0, 0, 1); otherwise 3BD.
    fn read_bit_extrusion(&mut self) -> Result<Vector3> {
        if self.read_bit()? {
            Ok(Vector3::UNIT_Z)
        } else {
            self.read_3bit_double()
        }
    }

    /// **BT**: set bit: 0.0; otherwise BD.
    fn read_bit_thickness(&mut self) -> Result<f64> {
        if self.read_bit()? {
            Ok(0.0)
        } else {
            self.read_bit_double()
        }
    }

    /// **MC**: unsigned; 7 data bits per byte, high bit continues.
    fn read_modular_char(&mut self) -> Result<u64> {
        let mut value = 0u64;
        let mut shift = 0u32;
        loop {
            let byte = self.read_byte()?;
            if shift > 63 {
                return Err(self.error_here("modular char exceeds 64 bits".into()));
            }
            value |= u64::from(byte & 0b0111_1111) << shift;
            if byte & 0b1000_0000 == 0 {
                return Ok(value);
            }
            shift += 7;
        }
    }

    /// **MC**: signed; the final byte carries 6 data bits and the sign (0x40).
    fn read_signed_modular_char(&mut self) -> Result<i64> {
        let mut value = 0i64;
        let mut shift = 0u32;
        loop {
            let byte = self.read_byte()?;
            if shift > 56 {
                return Err(self.error_here("signed modular char exceeds 64 bits".into()));
            }
            if byte & 0b1000_0000 != 0 {
                value |= i64::from(byte & 0b0111_1111) << shift;
                shift += 7;
                continue;
            }
            value |= i64::from(byte & 0b0011_1111) << shift;
            if byte & 0b0100_0000 != 0 {
                value = -value;
            }
            return Ok(value);
        }
    }

    /// **MS**: 15 data bits per little-endian byte pair; the high bit of the
    /// second byte continues.
    fn read_modular_short(&mut self) -> Result<u64> {
        let mut value = 0u64;
        let mut shift = 0u32;
        loop {
            let lo = self.read_byte()?;
            let hi = self.read_byte()?;
            if shift > 45 {
                return Err(self.error_here("modular short exceeds 60 bits".into()));
            }
            value |= (u64::from(lo) | (u64::from(hi & 0b0111_1111) << 8)) << shift;
            if hi & 0b1000_0000 == 0 {
                return Ok(value);
            }
            shift += 15;
        }
    }

    // ---------------------------------------------------------------
    // Handles
    // ---------------------------------------------------------------

    /// **H**: `|CODE (4)|COUNTER (4)|` then COUNTER big-endian bytes.
    fn read_raw_handle(&mut self) -> Result<RawHandle> {
        let form = self.read_byte()?;
        let code = form >> 4;
        let counter = form & 0x0F;
        if counter > 8 {
            return Err(self.error_here(format!("handle with {counter} value bytes")));
        }
        let mut value = 0u64;
        for _ in 0..counter {
            value = (value << 8) | u64::from(self.read_byte()?);
        }
        Ok(RawHandle {
            code,
            counter,
            value,
        })
    }

    /// **H** resolved against the handle of the record being decoded.
    fn handle_reference_resolved(&mut self, reference: Handle) -> Result<HandleRef> {
        let raw = self.read_raw_handle()?;
        match resolve_handle(raw.code, raw.value, reference) {
            Ok(handle) => Ok(HandleRef::new(raw.code, handle)),
            Err(DwgError::Format { reason, .. }) => Err(self.error_here(reason)),
            Err(e) => Err(e),
        }
    }

    /// **H** with no reference record (absolute codes only).
    fn handle_reference(&mut self) -> Result<HandleRef> {
        self.handle_reference_resolved(Handle::NULL)
    }

    // ---------------------------------------------------------------
    // Text, colors, dates
    // ---------------------------------------------------------------

    /// **TV**: BS byte length, then that many code-page bytes.
    fn read_variable_text(&mut self) -> Result<String> {
        let length = self.read_bit_short()?;
        if length < 0 {
            return Err(self.error_here(format!("negative text length {length}")));
        }
        if length == 0 {
            return Ok(String::new());
        }
        let bytes = self.read_bytes(length as usize)?;
        let (text, _, _) = self.encoding().decode(&bytes);
        Ok(text.trim_end_matches('\0').to_string())
    }

    /// **SN**
    fn read_sentinel(&mut self) -> Result<[u8; 16]> {
        self.read_le_array()
    }

    /// **CMC**: R2000 stores the ACI index as a BS.
    fn read_cm_color(&mut self) -> Result<i16> {
        self.read_bit_short()
    }

    /// Julian date as two BLs (day, milliseconds), returned as fractional days.
    fn read_date_time(&mut self) -> Result<f64> {
        let day = self.read_bit_long()?;
        let ms = self.read_bit_long()?;
        Ok(f64::from(day) + f64::from(ms) / 86_400_000.0)
    }

    /// Elapsed time as two BLs (days, milliseconds), returned as fractional days.
    fn read_time_span(&mut self) -> Result<f64> {
        self.read_date_time()
    }
}
