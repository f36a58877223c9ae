//! Payload compression and decompression handling.

use std::io::{Read, Write};

use tracing::instrument;
use xz2::{
    read::XzDecoder,
    stream::{LzmaOptions, Stream},
    write::XzEncoder,
};

use crate::error::{Error, Result};
use crate::payload::parse_table;
use crate::types::ArchiveHeader;

/// Preset used for the `.lzma` stream, the same default as `xz --format=lzma`
const LZMA_PRESET: u32 = 6;

/// Identifies how the payload is stored after the header
///
/// When creating archives, you may choose the method via [`crate::write::UnityWebWriterOptions`].
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum CompressionMethod {
    /// Stores the raw payload as it is
    None,

    /// Compress the payload into an LZMA "alone" stream
    #[default]
    Lzma,
}

impl CompressionMethod {
    /// Guess how the payload of an archive was stored.
    ///
    /// Uncompressed archives store the whole raw payload buffer, which is two bytes longer than the
    /// recorded unzip size. A compressed stream can have that length too, so the stored bytes must
    /// also hold a readable file table.
    pub fn detect(header: &ArchiveHeader, stored: &[u8]) -> CompressionMethod {
        let sizes_match = header.file_unzip_size.checked_add(2) == Some(header.file_zip_size)
            && stored.len() == header.file_zip_size as usize;

        if sizes_match && parse_table(stored).is_ok() {
            CompressionMethod::None
        } else {
            CompressionMethod::Lzma
        }
    }

    /// Encode a raw payload with this method
    pub fn encode(&self, data: Vec<u8>) -> Result<Vec<u8>> {
        match self {
            CompressionMethod::None => Ok(data),
            CompressionMethod::Lzma => compress(&data),
        }
    }

    /// Decode a stored payload with this method
    pub fn decode(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self {
            CompressionMethod::None => Ok(data.to_vec()),
            CompressionMethod::Lzma => decompress(data),
        }
    }
}

/// Compress `data` into an LZMA "alone" stream
#[instrument(skip_all, fields(len = data.len()), err)]
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let options = LzmaOptions::new_preset(LZMA_PRESET)?;
    let stream = Stream::new_lzma_encoder(&options)?;

    let mut encoder = XzEncoder::new_stream(Vec::new(), stream);
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Decompress an LZMA "alone" stream
#[instrument(skip_all, fields(len = data.len()), err)]
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let stream = Stream::new_lzma_decoder(u64::MAX)?;

    let mut decoder = XzDecoder::new_stream(data, stream);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out).map_err(Error::Decompress)?;
    Ok(out)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use crate::compression::{compress, decompress, CompressionMethod};
    use crate::error::{Error, Result};
    use crate::payload::build_payload;
    use crate::types::{ArchiveHeader, HeaderFlag};

    #[test]
    fn lzma_round_trip() -> Result<()> {
        let data: Vec<u8> = (0..4096u32).map(|i| (i * 7 % 251) as u8).collect();
        let compressed = compress(&data)?;

        // lc=3 lp=0 pb=2
        assert_eq!(compressed[0], 0x5D);
        assert_eq!(decompress(&compressed)?, data);

        Ok(())
    }

    #[test]
    fn lzma_round_trip_empty() -> Result<()> {
        let compressed = compress(&[])?;
        assert!(decompress(&compressed)?.is_empty());

        Ok(())
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            decompress(&[0xFF; 32]),
            Err(Error::Decompress(_))
        ));
    }

    #[test]
    fn truncated_stream_is_rejected() -> Result<()> {
        let data: Vec<u8> = (0..4096u32).map(|i| (i * 13 % 256) as u8).collect();
        let compressed = compress(&data)?;

        assert!(decompress(&compressed[..compressed.len() / 2]).is_err());

        Ok(())
    }

    #[test]
    fn detect_method() -> Result<()> {
        let payload = build_payload(&[("a.txt", b"AB".as_slice())])?;

        let stored = ArchiveHeader::new(HeaderFlag::UnityWeb, 520, 518)?;
        assert_eq!(
            CompressionMethod::detect(&stored, &payload.data),
            CompressionMethod::None
        );

        let compressed = ArchiveHeader::new(HeaderFlag::UnityWeb, 120, 518)?;
        assert_eq!(
            CompressionMethod::detect(&compressed, &payload.data),
            CompressionMethod::Lzma
        );

        Ok(())
    }

    #[test]
    fn detect_lzma_with_stored_length() -> Result<()> {
        let payload = build_payload(&[("mainData", vec![0x5A; 64].as_slice())])?;
        let compressed = compress(&payload.data)?;

        // Recorded sizes look like a stored payload, the bytes do not
        let len = compressed.len() as u32;
        let header = ArchiveHeader::new(HeaderFlag::UnityWeb, len, len - 2)?;
        assert_eq!(
            CompressionMethod::detect(&header, &compressed),
            CompressionMethod::Lzma
        );

        Ok(())
    }
}
