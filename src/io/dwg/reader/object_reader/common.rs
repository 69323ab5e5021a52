//! Data shared by every record kind.
//!
//! - extended entity data (EED) after the record handle
//! - the common entity block of graphical records
//! - the common block of non-graphical records
//! - the name and xref bits of table entries
//! - opaque payloads of kinds without a field decoder

use log::trace;

use crate::error::Result;
use crate::io::dwg::object_type::EntityKind;
use crate::io::dwg::reader::stream_reader::DwgStreamReader;
use crate::notification::Notification;
use crate::types::Value;

use super::record::{ExtendedDataGroup, RecordBuilder};
use super::{DwgObjectReader, StreamSet};

/// Upper bound for the graphics blob of one entity.
const MAX_GRAPHICS_SIZE: u32 = 0x0100_0000;

impl DwgObjectReader<'_> {
    // -----------------------------------------------------------------------
    // Extended entity data
    // -----------------------------------------------------------------------

    /// EED groups: `BS size` (0 ends the list), `H app handle`, `size` bytes.
    pub(super) fn read_extended_data(
        &self,
        streams: &mut StreamSet<'_>,
    ) -> Result<Option<Vec<ExtendedDataGroup>>> {
        let reader = &mut streams.object_reader;
        let mut groups = Vec::new();
        loop {
            let size = reader.read_bit_short()?;
            if size == 0 {
                break;
            }
            if size < 0 {
                return Err(reader.error_here(format!("negative EED size {size}")));
            }
            let app_handle = reader.handle_reference()?.handle;
            let data = reader.read_bytes(size as usize)?;
            trace!("EED group of {size} bytes for app {app_handle}");
            groups.push(ExtendedDataGroup { app_handle, data });
        }
        Ok((!groups.is_empty()).then_some(groups))
    }

    // -----------------------------------------------------------------------
    // Common entity data
    // -----------------------------------------------------------------------

    /// Common block of graphical records.
    pub(super) fn read_common_entity_data(
        &self,
        streams: &mut StreamSet<'_>,
        record: &mut RecordBuilder,
    ) -> Result<()> {
        if streams.object_reader.read_bit()? {
            let size = streams.object_reader.read_raw_ulong()?;
            if size > MAX_GRAPHICS_SIZE {
                return Err(streams
                    .object_reader
                    .error_here(format!("graphics blob of {size} bytes")));
            }
            record.graphics_data = Some(streams.object_reader.read_bytes(size as usize)?);
        }

        // 0: owner follows, 1: paper space, 2: model space
        let entity_mode = streams.object_reader.read_2bits()?;
        record.set("entity_mode", i64::from(entity_mode));
        if entity_mode == 0 {
            record.set("owner", streams.handle_ref()?);
        }

        self.read_reactors_and_dictionary(streams, record)?;

        let no_links = streams.object_reader.read_bit()?;
        if !no_links {
            record.set("prev_entity", streams.handle_ref()?);
            record.set("next_entity", streams.handle_ref()?);
        }

        record.set("color", streams.object_reader.read_cm_color()?);
        record.set("linetype_scale", streams.object_reader.read_bit_double()?);
        record.set("layer", streams.handle_ref()?);

        // 0: BYLAYER, 1: BYBLOCK, 2: CONTINUOUS, 3: handle follows
        let linetype_flags = streams.object_reader.read_2bits()?;
        record.set("linetype_flags", i64::from(linetype_flags));
        if linetype_flags == 3 {
            record.set("linetype", streams.handle_ref()?);
        }
        let plotstyle_flags = streams.object_reader.read_2bits()?;
        record.set("plotstyle_flags", i64::from(plotstyle_flags));
        if plotstyle_flags == 3 {
            record.set("plotstyle", streams.handle_ref()?);
        }

        record.set("invisibility", streams.object_reader.read_bit_short()?);
        record.set("lineweight", i64::from(streams.object_reader.read_byte()?));
        Ok(())
    }

    /// Common block of non-graphical records: reactors, owner and extension
    /// dictionary.
    pub(super) fn read_common_non_entity_data(
        &self,
        streams: &mut StreamSet<'_>,
        record: &mut RecordBuilder,
    ) -> Result<()> {
        let reactor_count = streams.object_reader.read_count()?;
        record.set("owner", streams.handle_ref()?);
        let reactors = streams.handle_refs(reactor_count)?;
        record.set("reactors", reactors);
        record.set("xdictionary", streams.handle_ref()?);
        Ok(())
    }

    fn read_reactors_and_dictionary(
        &self,
        streams: &mut StreamSet<'_>,
        record: &mut RecordBuilder,
    ) -> Result<()> {
        let reactor_count = streams.object_reader.read_count()?;
        let reactors = streams.handle_refs(reactor_count)?;
        record.set("reactors", reactors);
        record.set("xdictionary", streams.handle_ref()?);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Table entries
    // -----------------------------------------------------------------------

    /// Entry name and xref bits, then the xref block handle.
    ///
    /// Called by every table-entry decoder before its own fields; the xref
    /// block handle is the first handle after the common ones.
    pub(super) fn read_table_entry_common(
        &self,
        streams: &mut StreamSet<'_>,
        record: &mut RecordBuilder,
    ) -> Result<()> {
        record.set("name", streams.read_text()?);
        self.read_xref_dependant_bits(streams, record)?;
        record.set("xref_block", streams.handle_ref()?);
        Ok(())
    }

    /// 64-flag, xref index and xref-dependent bit.
    pub(super) fn read_xref_dependant_bits(
        &self,
        streams: &mut StreamSet<'_>,
        record: &mut RecordBuilder,
    ) -> Result<()> {
        let reader = &mut streams.object_reader;
        record.set("referenced", reader.read_bit()?);
        record.set("xref_index", i64::from(reader.read_bit_short()?) - 1);
        record.set("xref_dependent", reader.read_bit()?);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Opaque payloads
    // -----------------------------------------------------------------------

    /// Keep the rest of the data stream undecoded.
    pub(super) fn read_opaque(
        &self,
        kind: EntityKind,
        streams: &mut StreamSet<'_>,
        record: &mut RecordBuilder,
    ) -> Result<()> {
        self.read_remaining_data(streams, record)?;
        record.notify(Notification::not_implemented(format!(
            "{kind} record {} kept undecoded",
            streams.current_handle
        )));
        Ok(())
    }

    /// Store the unread data bits as `data` and their count as `data_bits`.
    pub(super) fn read_remaining_data(
        &self,
        streams: &mut StreamSet<'_>,
        record: &mut RecordBuilder,
    ) -> Result<()> {
        let reader = &mut streams.object_reader;
        let bits = reader.remaining_bits();
        let mut data = reader.read_bytes((bits / 8) as usize)?;
        let tail = (bits % 8) as u32;
        if tail > 0 {
            data.push((reader.read_bits(tail)? as u8) << (8 - tail));
        }
        record.set("data", Value::bytes(&data));
        record.set("data_bits", bits as i64);
        Ok(())
    }
}
