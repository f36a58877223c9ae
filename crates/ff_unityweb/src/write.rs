//! Types for writing UnityWeb archives
//!

use bon::Builder;
use std::io::{self, Write};
use tracing::{info, instrument, Level};

use crate::compression::CompressionMethod;
use crate::error::Result;
use crate::payload::build_payload;
use crate::types::{ArchiveHeader, HeaderFlag, VersionInfo};

/// Options for how the UnityWeb file should be written
#[derive(Debug, Clone, Builder)]
pub struct UnityWebWriterOptions {
    /// The signature written at the start of the header
    #[builder(default)]
    pub flag: HeaderFlag,

    /// How the payload is stored after the header
    #[builder(default)]
    pub compression: CompressionMethod,

    /// The version triple written into the header
    #[builder(default)]
    pub version: VersionInfo,
}

impl Default for UnityWebWriterOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug)]
struct PendingFile {
    name: String,
    data: Vec<u8>,
}

/// UnityWeb archive generator
///
/// Files are collected in memory, the archive is laid out when calling [`UnityWebWriter::finish`].
///
/// ```
/// # fn doit() -> ff_unityweb::error::Result<()>
/// # {
/// # use ff_unityweb::UnityWebWriter;
/// use std::io::Write;
/// use ff_unityweb::write::UnityWebWriterOptions;
///
/// let mut archive = UnityWebWriter::new(Vec::new(), UnityWebWriterOptions::builder()
///            .compression(ff_unityweb::CompressionMethod::None)
///            .build());
///
/// archive.start_file("hello_world.txt");
/// archive.write_all(b"Hello, World!")?;
///
/// // Apply the changes you've made.
/// let bytes = archive.finish()?;
/// assert_eq!(bytes.len(), 64 + 513 + 13 + 2);
///
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
pub struct UnityWebWriter<W: Write> {
    inner: W,
    files: Vec<PendingFile>,
    options: UnityWebWriterOptions,
    writing_to_file: bool,
}

impl<W: Write> UnityWebWriter<W> {
    /// Initializes the archive.
    ///
    /// Before writing to this object, the [`UnityWebWriter::start_file`] function should be called.
    pub fn new(inner: W, options: UnityWebWriterOptions) -> UnityWebWriter<W> {
        UnityWebWriter {
            inner,
            files: Vec::new(),
            options,
            writing_to_file: false,
        }
    }

    /// Returns true if a file is currently open for writing.
    pub fn is_writing_file(&self) -> bool {
        self.writing_to_file
    }

    /// Number of files added so far
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether no file has been added yet
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Start a new file, following writes go to it.
    ///
    /// Files keep the order they are started in.
    #[instrument(skip(self, name), fields(name = %name.to_string()))]
    pub fn start_file(&mut self, name: impl ToString) {
        self.files.push(PendingFile {
            name: name.to_string(),
            data: Vec::new(),
        });
        self.writing_to_file = true;
    }

    /// Add a whole file at once
    ///
    /// This closes the file opened by [`UnityWebWriter::start_file`], if any.
    pub fn add_file(&mut self, name: impl ToString, data: impl Into<Vec<u8>>) {
        self.files.push(PendingFile {
            name: name.to_string(),
            data: data.into(),
        });
        self.writing_to_file = false;
    }

    /// Lay out the payload, write the header and the stored payload
    ///
    /// This will return the writer, but one should normally not append any data to the end of the file.
    #[instrument(skip(self), fields(files = self.files.len()), err)]
    pub fn finish(mut self) -> Result<W> {
        let files: Vec<(String, Vec<u8>)> = self
            .files
            .into_iter()
            .map(|f| (f.name, f.data))
            .collect();

        let payload = build_payload(&files)?;
        let raw_len = payload.raw_len;
        let stored = self.options.compression.encode(payload.data)?;

        let stored_len = u32::try_from(stored.len())
            .map_err(|_| crate::error::Error::PayloadTooLarge(stored.len() as u64))?;
        let header = ArchiveHeader::new(self.options.flag, stored_len, raw_len)?
            .with_version(&self.options.version);

        self.inner.write_all(&header.to_bytes()?)?;
        self.inner.write_all(&stored)?;
        self.inner.flush()?;

        info!(
            stored = stored_len,
            raw = raw_len,
            compression = ?self.options.compression,
            "wrote archive"
        );

        Ok(self.inner)
    }
}

impl<W: Write> Write for UnityWebWriter<W> {
    #[instrument(skip_all, err, ret(level = Level::TRACE), fields(size = buf.len()))]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let current = match self.files.last_mut() {
            Some(current) if self.writing_to_file => current,
            _ => {
                return Err(io::Error::new(
                    io::ErrorKind::Other,
                    crate::error::Error::NoFileStarted,
                ))
            }
        };
        current.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::{assert_eq, assert_str_eq};
    use tracing_test::traced_test;

    use crate::error::{Error, Result};
    use crate::{
        compression::CompressionMethod,
        types::{HeaderFlag, VersionInfo},
        write::{UnityWebWriter, UnityWebWriterOptions},
    };
    use std::io::Write;

    fn stored_options() -> UnityWebWriterOptions {
        UnityWebWriterOptions::builder()
            .compression(CompressionMethod::None)
            .build()
    }

    #[traced_test]
    #[test]
    fn uncompressed_empty_write() -> Result<()> {
        let writer = UnityWebWriter::new(Vec::new(), stored_options());
        let result = writer.finish()?;

        assert_eq!(result.len(), 64 + 515);
        // zip size 515, unzip size 513
        assert_eq!(&result[50..54], &[0x00, 0x00, 0x02, 0x03]);
        assert_eq!(&result[54..58], &[0x00, 0x00, 0x02, 0x01]);
        assert_eq!(&result[64..68], &[0x00, 0x00, 0x00, 0x00]);
        assert_eq!(&result[64 + 512..], &[0x01, 0x00, 0x00]);

        Ok(())
    }

    #[traced_test]
    #[test]
    fn uncompressed_with_data_write() -> Result<()> {
        let mut writer = UnityWebWriter::new(
            Vec::new(),
            UnityWebWriterOptions::builder()
                .flag(HeaderFlag::Streamed)
                .compression(CompressionMethod::None)
                .build(),
        );
        writer.start_file("a.txt");
        writer.write_all(b"A")?;
        writer.write_all(b"B")?;
        writer.add_file("b.txt", b"CDE".to_vec());

        let result = writer.finish()?;

        #[rustfmt::skip]
        let expected_header = [
            0x73, 0x74, 0x72, 0x65, 0x61, 0x6D, 0x65, 0x64,
            0x00, 0x00, 0x00, 0x00,
            0x02,
            0x66, 0x75, 0x73, 0x69, 0x6F, 0x6E, 0x2D, 0x32, 0x2E, 0x78, 0x2E, 0x78,
            0x00,
            0x32, 0x2E, 0x35, 0x2E, 0x34, 0x62, 0x35,
            0x00,
            // 64 + 520
            0x00, 0x00, 0x02, 0x48,
            0x00, 0x00, 0x00, 0x40,
            0x00, 0x00, 0x00, 0x01,
            0x00, 0x00, 0x00, 0x01,
            // 520, 518
            0x00, 0x00, 0x02, 0x08,
            0x00, 0x00, 0x02, 0x06,
            0x00, 0x00, 0x02, 0x48,
            0x00, 0x00,
        ];

        assert_eq!(result.len(), 64 + 520);
        assert_str_eq!(
            format!("{:02X?}", &result[..64]),
            format!("{:02X?}", expected_header)
        );
        assert_eq!(&result[64 + 512..64 + 520], b"ABCDE\x01\x00\x00");

        Ok(())
    }

    #[traced_test]
    #[test]
    fn compressed_write_records_sizes() -> Result<()> {
        let mut writer = UnityWebWriter::new(Vec::new(), UnityWebWriterOptions::default());
        writer.add_file("mainData", vec![0xAB; 4096]);

        let result = writer.finish()?;
        let stored = (result.len() - 64) as u32;

        assert_eq!(&result[..8], b"UnityWeb");
        assert_eq!(&result[34..38], &(64 + stored).to_be_bytes());
        assert_eq!(&result[50..54], &stored.to_be_bytes());
        assert_eq!(&result[54..58], &(513u32 + 4096).to_be_bytes());
        assert_eq!(&result[58..62], &(64 + stored).to_be_bytes());
        assert!(stored < 4096);
        assert!(logs_contain("wrote archive"));

        Ok(())
    }

    #[test]
    fn custom_version_is_written() -> Result<()> {
        let writer = UnityWebWriter::new(
            Vec::new(),
            UnityWebWriterOptions::builder()
                .compression(CompressionMethod::None)
                .version(VersionInfo {
                    major_version: 3,
                    version_info: "beta-1.0.0".to_owned(),
                    build_info: "3.5.7f6".to_owned(),
                })
                .build(),
        );
        let result = writer.finish()?;

        assert_eq!(result[12], 3);
        assert_eq!(&result[13..25], b"beta-1.0.0\0\0");
        assert_eq!(&result[26..33], b"3.5.7f6");

        Ok(())
    }

    #[test]
    fn write_before_start_fails() {
        let mut writer = UnityWebWriter::new(Vec::new(), stored_options());
        assert!(writer.write_all(b"data").is_err());
    }

    #[test]
    fn write_after_add_file_fails() -> Result<()> {
        let mut writer = UnityWebWriter::new(Vec::new(), stored_options());
        writer.start_file("a.txt");
        assert!(writer.is_writing_file());

        writer.add_file("b.txt", b"AB".to_vec());
        assert!(!writer.is_writing_file());
        assert!(writer.write_all(b"ZZ").is_err());

        let result = writer.finish()?;
        assert_eq!(&result[64 + 512..64 + 515], b"AB\x01");

        Ok(())
    }

    #[test]
    fn invalid_name_fails_on_finish() {
        let mut writer = UnityWebWriter::new(Vec::new(), stored_options());
        writer.add_file("\u{444}\u{430}\u{439}\u{43B}", b"data".to_vec());

        assert!(matches!(
            writer.finish(),
            Err(Error::NameEncoding { .. })
        ));
    }
}
