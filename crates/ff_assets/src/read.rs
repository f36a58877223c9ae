//! Unpacking version 6 assets files

use byteorder::{ByteOrder, LittleEndian};
use tracing::{debug, instrument};

use crate::{
    error::{Error, Result},
    types::{
        AssetsHeader, AssetsManifest, ObjectEntry, ObjectTable, PathIdWidth, HEADER_SIZE,
        SUPPORTED_VERSION,
    },
};

/// Largest object count considered while scanning for the table
pub const MAX_OBJECTS: i32 = 200_000;

/// Largest type index accepted in a table record
pub const MAX_TYPE_INDEX: i32 = 4096;

/// Parse `count` records of `width` after the count at `pos`, if they all point into the file
fn table_at(
    metadata: &[u8],
    pos: usize,
    count: usize,
    width: PathIdWidth,
    file_len: u64,
    data_base: u64,
) -> Option<Vec<ObjectEntry>> {
    let start = pos + 4;
    let mut entries = Vec::new();

    for i in 0..count {
        let record = metadata.get(start + i * width.entry_size()..start + (i + 1) * width.entry_size())?;
        let entry = ObjectEntry::read_record(record, width);

        // Sizes are signed in the table
        if entry.size as i32 <= 0 || !(0..=MAX_TYPE_INDEX).contains(&entry.type_index) {
            return None;
        }
        if data_base + entry.offset_rel as u64 + entry.size as u64 > file_len {
            return None;
        }
        entries.push(entry);
    }

    Some(entries)
}

/// Search the metadata for the object table.
///
/// The table is an object count followed by that many records. Every plausible position after the
/// header is tried with both record layouts, the table with the most records wins.
#[instrument(skip(metadata), fields(len = metadata.len()))]
pub fn find_object_table(metadata: &[u8], file_len: u64, data_base: u64) -> Option<ObjectTable> {
    let limit = metadata.len().min(data_base as usize);
    let mut best: Option<ObjectTable> = None;

    let mut pos = HEADER_SIZE;
    while pos + 4 < limit {
        let count = LittleEndian::read_i32(&metadata[pos..pos + 4]);
        if count > 0 && count <= MAX_OBJECTS {
            for width in PathIdWidth::ALL {
                let beats_best = best
                    .as_ref()
                    .map_or(true, |b| count as usize > b.entries.len());
                if !beats_best {
                    continue;
                }

                if let Some(entries) = table_at(
                    &metadata[..limit],
                    pos,
                    count as usize,
                    width,
                    file_len,
                    data_base,
                ) {
                    debug!(pos, count, ?width, "found object table candidate");
                    best = Some(ObjectTable {
                        table_offset: pos,
                        width,
                        entries,
                    });
                }
            }
        }
        pos += 1;
    }

    best
}

/// An assets file split into its metadata, objects and manifest
#[derive(Debug, Clone)]
pub struct UnpackedAssets<'a> {
    /// Everything in front of the object data, header included
    pub metadata: &'a [u8],
    /// Object data in table order
    pub objects: Vec<&'a [u8]>,
    /// Description used to pack the file again
    pub manifest: AssetsManifest,
}

impl UnpackedAssets<'_> {
    /// Names of the object files, in table order
    pub fn object_names(&self) -> impl Iterator<Item = String> + '_ {
        self.manifest
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| entry.file_name(i))
    }
}

/// Split a version 6 assets file.
#[instrument(skip_all, fields(len = data.len()), err)]
pub fn unpack_assets(data: &[u8]) -> Result<UnpackedAssets<'_>> {
    let header = AssetsHeader::from_bytes(data)?;
    if header.version != SUPPORTED_VERSION {
        return Err(Error::UnsupportedVersion(header.version));
    }

    let data_base = header.data_base() as usize;
    if data_base == 0 || data_base > data.len() {
        return Err(Error::InvalidDataBase {
            data_base: data_base as u64,
            len: data.len(),
        });
    }

    let metadata = &data[..data_base];
    let table = find_object_table(metadata, data.len() as u64, data_base as u64)
        .ok_or(Error::ObjectTableNotFound)?;

    let objects = table
        .entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let start = data_base + entry.offset_rel as usize;
            data.get(start..start + entry.size as usize)
                .ok_or(Error::ObjectOutOfRange { index })
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(
        objects = objects.len(),
        table_offset = table.table_offset,
        "unpacked assets"
    );

    Ok(UnpackedAssets {
        metadata,
        objects,
        manifest: AssetsManifest {
            version: header.version,
            meta_size: header.metadata_size,
            file_size: header.file_size as u64,
            data_base: data_base as u32,
            table_offset: table.table_offset,
            entry_size: table.width.entry_size(),
            path_id_is64: table.width == PathIdWidth::Wide,
            count: table.entries.len(),
            entries: table.entries,
        },
    })
}
