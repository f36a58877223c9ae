//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent warpper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// input is {actual} bytes, shorter than the 20 byte header
    #[error("input is {actual} bytes, shorter than the 20 byte header")]
    InvalidHeaderLength {
        /// Length of the rejected input
        actual: usize,
    },

    /// serialized file version {0} is not supported
    #[error("serialized file version {0} is not supported")]
    #[diagnostic(help("only version 6 files can be unpacked"))]
    UnsupportedVersion(u32),

    /// data starts at {data_base}, outside the {len} byte file
    #[error("data starts at {data_base}, outside the {len} byte file")]
    InvalidDataBase {
        /// Start of the object data
        data_base: u64,
        /// Length of the file
        len: usize,
    },

    /// no object table found in the metadata
    #[error("no object table found in the metadata")]
    ObjectTableNotFound,

    /// object {index} lies outside the file
    #[error("object {index} lies outside the file")]
    ObjectOutOfRange {
        /// Position of the object in the table
        index: usize,
    },

    /// metadata is {actual} bytes, expected at least {expected}
    #[error("metadata is {actual} bytes, expected at least {expected}")]
    MetadataSize {
        /// Length of the given metadata
        actual: usize,
        /// Metadata size recorded in the manifest
        expected: usize,
    },

    /// found {found} objects, the manifest lists {expected}
    #[error("found {found} objects, the manifest lists {expected}")]
    ObjectCountMismatch {
        /// Number of objects given
        found: usize,
        /// Number of objects in the manifest
        expected: usize,
    },

    /// path id {0} does not fit a 32 bit table
    #[error("path id {0} does not fit a 32 bit table")]
    PathIdOverflow(i64),

    /// file of {0} bytes does not fit the 32 bit header fields
    #[error("file of {0} bytes does not fit the 32 bit header fields")]
    FileTooLarge(u64),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
