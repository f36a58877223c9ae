//! Base types for structure of a serialized assets file.

use std::io::Cursor;

use binrw::{BinRead, BinWrite};
use byteorder::{ByteOrder, LittleEndian};
use tracing::instrument;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Size of the big-endian header at the start of the file
pub const HEADER_SIZE: usize = 20;

/// The only serialized file version handled
pub const SUPPORTED_VERSION: u32 = 6;

/// Serialized file header
///
/// Five big-endian words. Version 6 files written by the FusionFall client leave the data offset at
/// zero, in which case the metadata size tells where the object data starts.
#[derive(BinRead, BinWrite, Debug, Copy, Clone, Default, PartialEq, Eq)]
#[brw(big)]
pub struct AssetsHeader {
    /// Size of the metadata block
    pub metadata_size: u32,
    /// Size of the whole file
    pub file_size: u32,
    /// Serialized file version
    pub version: u32,
    /// Offset of the object data, zero when unset
    pub data_offset: u32,
    /// Endianness marker and reserved bytes
    pub endian_tag: u32,
}

impl AssetsHeader {
    /// Offset where the object data starts
    pub fn data_base(&self) -> u32 {
        if self.data_offset != 0 {
            self.data_offset
        } else {
            self.metadata_size
        }
    }

    /// Parse the header from the start of `data`
    #[instrument(skip_all, fields(len = data.len()), err)]
    pub fn from_bytes(data: &[u8]) -> Result<AssetsHeader> {
        if data.len() < HEADER_SIZE {
            return Err(Error::InvalidHeaderLength { actual: data.len() });
        }

        Ok(AssetsHeader::read(&mut Cursor::new(&data[..HEADER_SIZE]))?)
    }

    /// Serialize into the fixed size header block
    pub fn to_bytes(&self) -> Result<[u8; HEADER_SIZE]> {
        let mut out = [0u8; HEADER_SIZE];
        self.write(&mut Cursor::new(&mut out[..]))?;
        Ok(out)
    }
}

/// Width of the path id in each object table record
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PathIdWidth {
    /// 64 bit path ids, 20 byte records
    Wide,
    /// 32 bit path ids, 16 byte records
    Narrow,
}

impl PathIdWidth {
    /// Both widths, in the order they are tried
    pub const ALL: [PathIdWidth; 2] = [PathIdWidth::Wide, PathIdWidth::Narrow];

    /// Size of one table record
    pub const fn entry_size(&self) -> usize {
        match self {
            PathIdWidth::Wide => 20,
            PathIdWidth::Narrow => 16,
        }
    }

    /// Width matching a manifest's `PathIdIs64`
    pub fn from_is64(is64: bool) -> PathIdWidth {
        if is64 {
            PathIdWidth::Wide
        } else {
            PathIdWidth::Narrow
        }
    }
}

/// A record of the object table
///
/// Integers are stored little endian inside the metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase"))]
pub struct ObjectEntry {
    /// Identifier of the object
    pub path_id: i64,
    /// Offset of the object from the start of the data
    pub offset_rel: u32,
    /// Size of the object
    pub size: u32,
    /// Index into the type tree
    pub type_index: i32,
    /// Not read from version 6 files, kept for manifest compatibility
    #[cfg_attr(feature = "serde", serde(default))]
    pub class_id: Option<i32>,
    /// Not read from version 6 files, kept for manifest compatibility
    #[cfg_attr(feature = "serde", serde(default))]
    pub flags: Option<i32>,
}

impl ObjectEntry {
    /// Decode one record, `record` must be at least `width.entry_size()` long
    pub fn read_record(record: &[u8], width: PathIdWidth) -> ObjectEntry {
        let (path_id, rest) = match width {
            PathIdWidth::Wide => (LittleEndian::read_i64(&record[0..8]), &record[8..]),
            PathIdWidth::Narrow => (LittleEndian::read_i32(&record[0..4]) as i64, &record[4..]),
        };

        ObjectEntry {
            path_id,
            offset_rel: LittleEndian::read_u32(&rest[0..4]),
            size: LittleEndian::read_u32(&rest[4..8]),
            type_index: LittleEndian::read_i32(&rest[8..12]),
            class_id: None,
            flags: None,
        }
    }

    /// Encode one record into `record`
    pub fn write_record(&self, record: &mut [u8], width: PathIdWidth) -> Result<()> {
        let rest = match width {
            PathIdWidth::Wide => {
                LittleEndian::write_i64(&mut record[0..8], self.path_id);
                &mut record[8..]
            }
            PathIdWidth::Narrow => {
                let path_id =
                    i32::try_from(self.path_id).map_err(|_| Error::PathIdOverflow(self.path_id))?;
                LittleEndian::write_i32(&mut record[0..4], path_id);
                &mut record[4..]
            }
        };

        LittleEndian::write_u32(&mut rest[0..4], self.offset_rel);
        LittleEndian::write_u32(&mut rest[4..8], self.size);
        LittleEndian::write_i32(&mut rest[8..12], self.type_index);
        Ok(())
    }

    /// Name of the file holding this object once unpacked
    pub fn file_name(&self, index: usize) -> String {
        format!(
            "{index:05}__pid-{}__typ-{}.bin",
            self.path_id, self.type_index
        )
    }
}

/// The object table found inside the metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectTable {
    /// Offset of the object count, from the start of the file
    pub table_offset: usize,
    /// Layout of each record
    pub width: PathIdWidth,
    /// The records
    pub entries: Vec<ObjectEntry>,
}

/// Description of an unpacked assets file, stored as `manifest.json`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase"))]
pub struct AssetsManifest {
    /// Serialized file version
    pub version: u32,
    /// Metadata size from the header
    pub meta_size: u32,
    /// File size from the header
    pub file_size: u64,
    /// Where the object data started
    pub data_base: u32,
    /// Offset of the object table, from the start of the file
    pub table_offset: usize,
    /// Size of one table record
    pub entry_size: usize,
    /// Whether path ids are 64 bit
    pub path_id_is64: bool,
    /// Number of objects
    pub count: usize,
    /// The object table
    pub entries: Vec<ObjectEntry>,
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::error::Result;
    use crate::types::{AssetsHeader, ObjectEntry, PathIdWidth};

    #[test]
    fn header_round_trip() -> Result<()> {
        #[rustfmt::skip]
        let data = [
            0x00, 0x00, 0x00, 0x38,
            0x00, 0x00, 0x00, 0x5A,
            0x00, 0x00, 0x00, 0x06,
            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
        ];

        let header = AssetsHeader::from_bytes(&data)?;
        assert_eq!(header.metadata_size, 56);
        assert_eq!(header.file_size, 90);
        assert_eq!(header.version, 6);
        assert_eq!(header.data_base(), 56);
        assert_eq!(header.to_bytes()?, data);

        Ok(())
    }

    #[test]
    fn data_offset_wins_over_metadata_size() {
        let header = AssetsHeader {
            metadata_size: 56,
            data_offset: 76,
            ..Default::default()
        };
        assert_eq!(header.data_base(), 76);
    }

    #[test]
    fn records() -> Result<()> {
        let entry = ObjectEntry {
            path_id: -2,
            offset_rel: 8,
            size: 6,
            type_index: 3,
            ..Default::default()
        };

        let mut wide = [0u8; 20];
        entry.write_record(&mut wide, PathIdWidth::Wide)?;
        assert_eq!(&wide[..8], &[0xFE, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(ObjectEntry::read_record(&wide, PathIdWidth::Wide), entry);

        let mut narrow = [0u8; 16];
        entry.write_record(&mut narrow, PathIdWidth::Narrow)?;
        assert_eq!(&narrow[4..], &[8, 0, 0, 0, 6, 0, 0, 0, 3, 0, 0, 0]);
        assert_eq!(ObjectEntry::read_record(&narrow, PathIdWidth::Narrow), entry);

        Ok(())
    }

    #[test]
    fn narrow_path_id_overflow() {
        let entry = ObjectEntry {
            path_id: i64::from(i32::MAX) + 1,
            ..Default::default()
        };
        assert!(entry.write_record(&mut [0u8; 16], PathIdWidth::Narrow).is_err());
    }

    #[test]
    fn object_file_name() {
        let entry = ObjectEntry {
            path_id: 12,
            type_index: 4,
            ..Default::default()
        };
        assert_eq!(entry.file_name(7), "00007__pid-12__typ-4.bin");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn manifest_json_shape() -> core::result::Result<(), serde_json::Error> {
        let manifest = crate::types::AssetsManifest {
            version: 6,
            path_id_is64: true,
            entries: vec![ObjectEntry::default()],
            ..Default::default()
        };
        let json = serde_json::to_value(&manifest)?;

        assert_eq!(json["Version"], 6);
        assert_eq!(json["PathIdIs64"], true);
        assert_eq!(json["Entries"][0]["OffsetRel"], 0);
        assert_eq!(json["Entries"][0]["ClassId"], serde_json::Value::Null);

        let parsed: crate::types::AssetsManifest = serde_json::from_value(json)?;
        assert_eq!(parsed, manifest);

        Ok(())
    }
}
