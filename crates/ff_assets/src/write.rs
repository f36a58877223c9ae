//! Packing version 6 assets files

use byteorder::{ByteOrder, LittleEndian};
use tracing::{debug, info, instrument};

use crate::{
    error::{Error, Result},
    types::{AssetsHeader, AssetsManifest, PathIdWidth, HEADER_SIZE, SUPPORTED_VERSION},
};

/// Objects start on a four byte boundary of the file
const OBJECT_ALIGNMENT: usize = 4;

fn to_u32(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::FileTooLarge(value as u64))
}

/// Strip whatever precedes the metadata block, returns the skipped length and the block
fn metadata_block<'a>(metadata: &'a [u8], meta_size: usize) -> Result<(usize, &'a [u8])> {
    let skip = match metadata.len() {
        len if len == meta_size => 0,
        len if len == meta_size + HEADER_SIZE => HEADER_SIZE,
        len if len > meta_size => len - meta_size,
        len => {
            return Err(Error::MetadataSize {
                actual: len,
                expected: meta_size,
            })
        }
    };

    Ok((skip, &metadata[skip..skip + meta_size]))
}

fn table_fits(block: &[u8], pos: usize, count: usize, width: PathIdWidth) -> bool {
    let recorded = block
        .get(pos..pos + 4)
        .map(|c| LittleEndian::read_i32(c) as i64 == count as i64);

    recorded == Some(true) && pos + 4 + count * width.entry_size() <= block.len()
}

/// Find the object table in the metadata block, returns its offset inside the block
fn locate_table(
    block: &[u8],
    manifest: &AssetsManifest,
    skip: usize,
) -> Option<(usize, PathIdWidth)> {
    let width = PathIdWidth::from_is64(manifest.path_id_is64);
    if let Some(pos) = manifest.table_offset.checked_sub(skip) {
        if table_fits(block, pos, manifest.count, width) {
            return Some((pos, width));
        }
    }

    // Fall back to the first position holding the expected count
    if manifest.count == 0 {
        return None;
    }
    (0..=block.len().saturating_sub(20)).find_map(|pos| {
        PathIdWidth::ALL
            .into_iter()
            .find(|width| table_fits(block, pos, manifest.count, *width))
            .map(|width| (pos, width))
    })
}

/// Rebuild an assets file from its unpacked parts.
///
/// `metadata` is the `metadata.bin` written on unpack, `objects` are in table order. Objects are laid
/// out after the metadata block, each aligned to four bytes, and the table records are rewritten to
/// match. Paths ids and type indices come from the manifest.
#[instrument(skip_all, fields(objects = objects.len()), err)]
pub fn pack_assets<D: AsRef<[u8]>>(
    manifest: &AssetsManifest,
    metadata: &[u8],
    objects: &[D],
) -> Result<Vec<u8>> {
    if objects.len() != manifest.count || manifest.entries.len() != manifest.count {
        return Err(Error::ObjectCountMismatch {
            found: objects.len(),
            expected: manifest.count,
        });
    }

    let (skip, block) = metadata_block(metadata, manifest.meta_size as usize)?;
    let (table_pos, width) =
        locate_table(block, manifest, skip).ok_or(Error::ObjectTableNotFound)?;
    debug!(skip, table_pos, ?width, "located object table");

    let mut out = vec![0u8; HEADER_SIZE];
    out.extend_from_slice(block);
    let data_base = out.len();

    let mut entries = manifest.entries.clone();
    for (entry, object) in entries.iter_mut().zip(objects) {
        let object = object.as_ref();
        out.resize(out.len().next_multiple_of(OBJECT_ALIGNMENT), 0);

        entry.offset_rel = to_u32(out.len() - data_base)?;
        entry.size = to_u32(object.len())?;
        out.extend_from_slice(object);
    }

    let table = HEADER_SIZE + table_pos;
    LittleEndian::write_i32(&mut out[table..table + 4], manifest.count as i32);
    for (i, entry) in entries.iter().enumerate() {
        let start = table + 4 + i * width.entry_size();
        entry.write_record(&mut out[start..start + width.entry_size()], width)?;
    }

    let header = AssetsHeader {
        metadata_size: to_u32(block.len())?,
        file_size: to_u32(out.len())?,
        version: SUPPORTED_VERSION,
        data_offset: to_u32(data_base)?,
        endian_tag: 0,
    };
    out[..HEADER_SIZE].copy_from_slice(&header.to_bytes()?);

    info!(len = out.len(), objects = entries.len(), "packed assets");

    Ok(out)
}
