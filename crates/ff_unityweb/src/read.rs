//! Types for reading UnityWeb archives
//!

use std::{
    fmt::{self, Debug},
    io::Read,
};

use tracing::{debug, instrument, warn};

use crate::{
    compression::CompressionMethod,
    error::{Error, FileNotFoundError, Result},
    payload::{parse_table, FileEntry},
    types::{ArchiveHeader, HEADER_SIZE},
};

/// A borrowed view of one file inside a [`UnityWebArchive`]
pub struct ArchiveFile<'a> {
    entry: &'a FileEntry,
    data: &'a [u8],
}

impl Debug for ArchiveFile<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ArchiveFile({:#?})", self.entry)
    }
}

impl<'a> ArchiveFile<'a> {
    /// Get the name of the file
    ///
    /// # Warnings
    ///
    /// It is dangerous to use this name directly when extracting an archive.
    /// It may contain an absolute path (`/etc/shadow`), or break out of the
    /// current directory (`../runtime`).
    pub fn name(&self) -> &'a str {
        &self.entry.name
    }

    /// Get the name of the file, in the raw (internal) byte representation.
    pub fn name_raw(&self) -> &'a [u8] {
        &self.entry.name_raw
    }

    /// Get the offset of the file's data inside the raw payload
    pub fn offset(&self) -> u32 {
        self.entry.offset
    }

    /// Get the size of the file, in bytes
    pub fn size(&self) -> u32 {
        self.entry.size
    }

    /// Get the contents of the file
    pub fn data(&self) -> &'a [u8] {
        self.data
    }
}

/// UnityWeb archive reader
///
/// The whole archive is held in memory, the payload decompressed once when opening it.
///
/// ```no_run
/// use std::io::prelude::*;
///
/// fn list_contents(reader: impl Read) -> ff_unityweb::error::Result<()> {
///     let archive = ff_unityweb::UnityWebArchive::new(reader)?;
///
///     for i in 0..archive.len() {
///         let file = archive.by_index(i)?;
///         println!("Filename: {}", file.name());
///         std::io::stdout().write_all(file.data())?;
///     }
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct UnityWebArchive {
    header: ArchiveHeader,
    compression: CompressionMethod,
    payload: Vec<u8>,
    files: Vec<FileEntry>,
}

impl UnityWebArchive {
    /// Read a UnityWeb archive collecting the files it contains.
    pub fn new<R: Read>(mut reader: R) -> Result<UnityWebArchive> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    /// Parse a UnityWeb archive held in memory.
    #[instrument(skip_all, fields(len = data.len()), err)]
    pub fn from_bytes(data: &[u8]) -> Result<UnityWebArchive> {
        let (header, compression, payload) = open_payload(data)?;
        let files = parse_table(&payload)?;
        debug!(files = files.len(), ?compression, "opened archive");

        Ok(UnityWebArchive {
            header,
            compression,
            payload,
            files,
        })
    }

    /// Number of entries contained in this archive.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether this archive contains no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The outer header
    pub fn header(&self) -> &ArchiveHeader {
        &self.header
    }

    /// Returns how the payload was stored.
    pub fn compression_method(&self) -> CompressionMethod {
        self.compression
    }

    /// The decompressed payload, table and terminator included
    pub fn raw_payload(&self) -> &[u8] {
        &self.payload
    }

    /// The parsed file table
    pub fn entries(&self) -> &[FileEntry] {
        &self.files
    }

    /// Returns an iterator over all the file names in this archive, in table order.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|f| f.name.as_ref())
    }

    /// Returns an iterator over all the files in this archive, in table order.
    pub fn files(&self) -> impl Iterator<Item = ArchiveFile<'_>> {
        self.files.iter().map(|entry| self.view(entry))
    }

    /// Get the index of the first file entry with this name, if it's present.
    pub fn index_for_name(&self, name: &str) -> Option<usize> {
        self.files.iter().position(|f| f.name.as_ref() == name)
    }

    /// Get the name of a file entry, if it's present.
    pub fn name_for_index(&self, index: usize) -> Option<&str> {
        self.files.get(index).map(|f| f.name.as_ref())
    }

    /// Search for a file entry by name
    pub fn by_name(&self, name: &str) -> Result<ArchiveFile<'_>> {
        let Some(index) = self.index_for_name(name) else {
            return Err(Error::FileNotFound(FileNotFoundError::Name(
                name.to_owned(),
            )));
        };
        self.by_index(index)
    }

    /// Get a contained file by index
    pub fn by_index(&self, file_number: usize) -> Result<ArchiveFile<'_>> {
        let entry = self
            .files
            .get(file_number)
            .ok_or(Error::FileNotFound(FileNotFoundError::Index(file_number)))?;

        Ok(self.view(entry))
    }

    /// Unwrap and return the decompressed payload
    pub fn into_raw_payload(self) -> Vec<u8> {
        self.payload
    }

    fn view<'a>(&'a self, entry: &'a FileEntry) -> ArchiveFile<'a> {
        ArchiveFile {
            entry,
            data: &self.payload[entry.range()],
        }
    }
}

/// Decompress the payload of an archive without parsing its file table.
pub fn extract_raw_payload(data: &[u8]) -> Result<Vec<u8>> {
    let (_, _, payload) = open_payload(data)?;
    Ok(payload)
}

fn stored_sizes(header: &ArchiveHeader) -> bool {
    header.file_unzip_size.checked_add(2) == Some(header.file_zip_size)
}

fn open_payload(data: &[u8]) -> Result<(ArchiveHeader, CompressionMethod, Vec<u8>)> {
    let header = ArchiveHeader::from_bytes(data)?;
    if header.header_flag().is_none() {
        warn!(flag = %header.flag, "unknown header flag");
    }

    let rest = &data[HEADER_SIZE..];
    let stored = match rest.get(..header.file_zip_size as usize) {
        Some(stored) => stored,
        None => {
            warn!(
                recorded = header.file_zip_size,
                available = rest.len(),
                "payload is shorter than recorded, using the rest of the file"
            );
            rest
        }
    };

    let detected = CompressionMethod::detect(&header, stored);
    let (compression, payload) = match detected.decode(stored) {
        Ok(payload) => (detected, payload),
        Err(error) if stored_sizes(&header) => {
            warn!(%error, "payload is not an lzma stream, reading it as stored");
            (CompressionMethod::None, stored.to_vec())
        }
        Err(error) => return Err(error),
    };

    if payload.len() < header.file_unzip_size as usize {
        warn!(
            recorded = header.file_unzip_size,
            actual = payload.len(),
            "payload is shorter than recorded"
        );
    }

    Ok((header, compression, payload))
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use crate::compression::{compress, CompressionMethod};
    use crate::error::{Error, FileNotFoundError, Result};
    use crate::payload::build_payload;
    use crate::read::{extract_raw_payload, UnityWebArchive};
    use crate::types::{ArchiveHeader, HeaderFlag};

    fn archive_bytes(compression: CompressionMethod) -> Result<Vec<u8>> {
        let payload = build_payload(&[
            ("hello.txt", b"Hello World".as_slice()),
            ("world.txt", b"World Hello".as_slice()),
        ])?;
        let stored = compression.encode(payload.data)?;

        let header = ArchiveHeader::new(HeaderFlag::UnityWeb, stored.len() as u32, payload.raw_len)?;
        let mut data = header.to_bytes()?.to_vec();
        data.extend_from_slice(&stored);
        Ok(data)
    }

    #[test]
    fn read_compressed_archive() -> Result<()> {
        let archive = UnityWebArchive::from_bytes(&archive_bytes(CompressionMethod::Lzma)?)?;

        assert_eq!(archive.compression_method(), CompressionMethod::Lzma);
        assert_eq!(archive.len(), 2);
        assert_eq!(
            archive.file_names().collect::<Vec<_>>(),
            vec!["hello.txt", "world.txt"]
        );

        let hello = archive.by_index(0)?;
        assert_eq!(hello.offset(), 512);
        assert_eq!(hello.size(), 11);
        assert_eq!(hello.data(), b"Hello World");

        let world = archive.by_name("world.txt")?;
        assert_eq!(world.offset(), 523);
        assert_eq!(world.data(), b"World Hello");

        Ok(())
    }

    #[test]
    fn read_uncompressed_archive() -> Result<()> {
        let archive = UnityWebArchive::from_bytes(&archive_bytes(CompressionMethod::None)?)?;

        assert_eq!(archive.compression_method(), CompressionMethod::None);
        assert_eq!(archive.header().file_zip_size, archive.header().file_unzip_size + 2);
        assert_eq!(archive.by_name("hello.txt")?.data(), b"Hello World");

        Ok(())
    }

    #[test]
    fn raw_payload_matches_built_payload() -> Result<()> {
        let payload = build_payload(&[
            ("hello.txt", b"Hello World".as_slice()),
            ("world.txt", b"World Hello".as_slice()),
        ])?;

        let raw = extract_raw_payload(&archive_bytes(CompressionMethod::Lzma)?)?;
        assert_eq!(raw, payload.data);

        Ok(())
    }

    #[test]
    fn missing_files() -> Result<()> {
        let archive = UnityWebArchive::from_bytes(&archive_bytes(CompressionMethod::None)?)?;

        assert!(matches!(
            archive.by_index(2),
            Err(Error::FileNotFound(FileNotFoundError::Index(2)))
        ));
        assert!(matches!(
            archive.by_name("mainData"),
            Err(Error::FileNotFound(FileNotFoundError::Name(_)))
        ));

        Ok(())
    }

    #[test]
    fn read_short_input() {
        assert!(matches!(
            UnityWebArchive::from_bytes(&[0u8; 10]),
            Err(Error::InvalidHeaderLength { actual: 10 })
        ));
    }

    #[test]
    fn read_corrupt_payload() -> Result<()> {
        let header = ArchiveHeader::new(HeaderFlag::UnityWeb, 16, 600)?;
        let mut data = header.to_bytes()?.to_vec();
        data.extend_from_slice(&[0xFF; 16]);

        assert!(matches!(
            UnityWebArchive::from_bytes(&data),
            Err(Error::Decompress(_))
        ));

        Ok(())
    }

    #[test]
    fn read_lzma_payload_with_stored_sizes() -> Result<()> {
        let payload = build_payload(&[("mainData", b"compressed anyway".as_slice())])?;
        let stored = compress(&payload.data)?;

        let len = stored.len() as u32;
        let header = ArchiveHeader::new(HeaderFlag::UnityWeb, len, len - 2)?;
        let mut data = header.to_bytes()?.to_vec();
        data.extend_from_slice(&stored);

        let archive = UnityWebArchive::from_bytes(&data)?;
        assert_eq!(archive.compression_method(), CompressionMethod::Lzma);
        assert_eq!(archive.by_name("mainData")?.data(), b"compressed anyway");
        assert_eq!(extract_raw_payload(&data)?, payload.data);

        Ok(())
    }

    #[traced_test]
    #[test]
    fn read_stored_payload_with_broken_table() -> Result<()> {
        // Stored sizes, but the table claims more entries than there are
        let mut raw = build_payload(&[("a.txt", b"AB".as_slice())])?;
        raw.data[0] = 0xFF;

        let header = ArchiveHeader::new(HeaderFlag::UnityWeb, raw.raw_len + 2, raw.raw_len)?;
        let mut data = header.to_bytes()?.to_vec();
        data.extend_from_slice(&raw.data);

        assert_eq!(extract_raw_payload(&data)?, raw.data);
        assert!(logs_contain("reading it as stored"));

        Ok(())
    }

    #[traced_test]
    #[test]
    fn read_with_short_recorded_size() -> Result<()> {
        let payload = build_payload(&[("a.txt", b"AB".as_slice())])?;
        let stored = compress(&payload.data)?;

        // Record more bytes than the file holds
        let header = ArchiveHeader::new(HeaderFlag::Streamed, stored.len() as u32 + 100, payload.raw_len)?;
        let mut data = header.to_bytes()?.to_vec();
        data.extend_from_slice(&stored);

        let archive = UnityWebArchive::from_bytes(&data)?;
        assert_eq!(archive.by_index(0)?.data(), b"AB");
        assert!(logs_contain("payload is shorter than recorded"));

        Ok(())
    }
}
