//! Building and parsing the raw payload: the file table followed by the file data.

use byteorder::{BigEndian, ByteOrder};
use tracing::{debug, instrument, Level};

use crate::error::{Error, Result};

/// Offset in the raw payload where file data starts, the table must fit in front of it
pub const DATA_START: usize = 512;

/// Base value of the header's unzip size before file data is added
pub const RAW_SIZE_BASE: usize = DATA_START + 1;

/// Index of the entry followed by an extra `0x01` byte in the data region
pub const MARKER_INDEX: usize = 15;

const TERMINATOR: [u8; 2] = [0x01, 0x00];

/// An entry of the file table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileEntry {
    /// Name of the file
    pub name: Box<str>,
    /// Raw file name. To be used when name was incorrectly decoded.
    pub name_raw: Box<[u8]>,
    /// Offset of the file data from the start of the raw payload
    pub offset: u32,
    /// Size of the file data
    pub size: u32,
}

impl FileEntry {
    /// Byte range of this entry inside the raw payload
    pub fn range(&self) -> std::ops::Range<usize> {
        let start = self.offset as usize;
        start..start + self.size as usize
    }
}

/// A raw payload ready to be compressed or stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPayload {
    /// The whole buffer, including the two terminator bytes
    pub data: Vec<u8>,
    /// Size recorded as the header's unzip size, which leaves out the terminator
    pub raw_len: u32,
}

fn ascii_name(name: &str) -> Result<&[u8]> {
    if name.is_ascii() && !name.contains('\0') {
        Ok(name.as_bytes())
    } else {
        Err(Error::NameEncoding {
            name: name.to_owned(),
        })
    }
}

fn to_u32(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::PayloadTooLarge(value as u64))
}

/// Lay out `files` into a raw payload.
///
/// The table is written from byte 4 and the data from [`DATA_START`], each with its own cursor.
#[instrument(skip_all, fields(files = files.len()), err)]
pub fn build_payload<N, D>(files: &[(N, D)]) -> Result<RawPayload>
where
    N: AsRef<str>,
    D: AsRef<[u8]>,
{
    let mut table_len = 4usize;
    let mut data_len = 0usize;
    for (name, data) in files {
        table_len += ascii_name(name.as_ref())?.len() + 1 + 8;
        data_len += data.as_ref().len();
    }
    if table_len > DATA_START {
        return Err(Error::TableOverflow {
            required: table_len,
        });
    }

    let raw_len = to_u32(RAW_SIZE_BASE + data_len)?;
    to_u32(RAW_SIZE_BASE + data_len + TERMINATOR.len())?;

    let mut buffer = vec![0u8; raw_len as usize + TERMINATOR.len()];
    BigEndian::write_u32(&mut buffer[0..4], to_u32(files.len())?);

    let mut table = 4usize;
    let mut cursor = DATA_START;
    for (index, (name, data)) in files.iter().enumerate() {
        let name = name.as_ref().as_bytes();
        let data = data.as_ref();

        buffer[table..table + name.len()].copy_from_slice(name);
        table += name.len() + 1;
        BigEndian::write_u32(&mut buffer[table..table + 4], cursor as u32);
        BigEndian::write_u32(&mut buffer[table + 4..table + 8], data.len() as u32);
        table += 8;

        buffer[cursor..cursor + data.len()].copy_from_slice(data);
        cursor += data.len();

        // Format quirk: the client expects one 0x01 byte after the 16th file (mainData).
        // It belongs to no entry but shifts every later offset.
        if index == MARKER_INDEX {
            buffer[cursor] = 0x01;
            cursor += 1;
        }
    }

    buffer[cursor..cursor + TERMINATOR.len()].copy_from_slice(&TERMINATOR);

    debug!(table_end = table, data_end = cursor, raw_len, "built payload");

    Ok(RawPayload {
        data: buffer,
        raw_len,
    })
}

fn read_u32(data: &[u8], at: usize) -> Result<u32> {
    data.get(at..at + 4)
        .map(BigEndian::read_u32)
        .ok_or(Error::TruncatedTable { offset: at })
}

/// Parse the file table at the start of a raw payload.
///
/// Every returned entry is checked to lie within `data`.
#[instrument(skip_all, fields(len = data.len()), err, ret(level = Level::TRACE))]
pub fn parse_table(data: &[u8]) -> Result<Vec<FileEntry>> {
    let count = read_u32(data, 0)?;

    let mut entries = Vec::new();
    let mut cursor = 4usize;
    for _ in 0..count {
        let name_len = data
            .get(cursor..)
            .and_then(|rest| rest.iter().position(|b| *b == 0))
            .ok_or(Error::TruncatedTable { offset: cursor })?;
        let name_raw = &data[cursor..cursor + name_len];
        cursor += name_len + 1;

        let offset = read_u32(data, cursor)?;
        let size = read_u32(data, cursor + 4)?;
        cursor += 8;

        let name: Box<str> = String::from_utf8_lossy(name_raw).into();
        if offset as u64 + size as u64 > data.len() as u64 {
            return Err(Error::OutOfRange {
                name: name.into(),
                offset,
                size,
                len: data.len(),
            });
        }

        entries.push(FileEntry {
            name,
            name_raw: name_raw.into(),
            offset,
            size,
        });
    }

    Ok(entries)
}

/// Parse a raw payload into its entries and their data, in table order.
pub fn parse_payload(data: &[u8]) -> Result<Vec<(FileEntry, &[u8])>> {
    Ok(parse_table(data)?
        .into_iter()
        .map(|entry| {
            let range = entry.range();
            (entry, &data[range])
        })
        .collect())
}
