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

    /// Transparent warpper for [`xz2::stream::Error`]
    #[error(transparent)]
    Lzma(#[from] xz2::stream::Error),

    /// input is {actual} bytes, shorter than the 64 byte header
    #[error("input is {actual} bytes, shorter than the 64 byte header")]
    InvalidHeaderLength {
        /// Length of the rejected input
        actual: usize,
    },

    /// file name {name:?} is not plain ascii
    #[error("file name {name:?} is not plain ascii")]
    #[diagnostic(help("names may not contain non-ascii characters or NUL bytes"))]
    NameEncoding {
        /// The rejected name
        name: String,
    },

    /// file table needs {required} bytes, only 512 are reserved
    #[error("file table needs {required} bytes, only 512 are reserved")]
    TableOverflow {
        /// Offset the table cursor would have reached
        required: usize,
    },

    /// file table is truncated at offset {offset}
    #[error("file table is truncated at offset {offset}")]
    TruncatedTable {
        /// Position in the payload where the table ran out
        offset: usize,
    },

    /// entry {name:?} spans {offset}+{size} past the {len} byte payload
    #[error("entry {name:?} spans {offset}+{size} past the {len} byte payload")]
    OutOfRange {
        /// Name of the offending entry
        name: String,
        /// Recorded offset
        offset: u32,
        /// Recorded size
        size: u32,
        /// Length of the payload
        len: usize,
    },

    /// unable to decompress payload
    #[error("unable to decompress payload")]
    Decompress(#[source] std::io::Error),

    /// payload of {0} bytes does not fit the archive's 32 bit fields
    #[error("payload of {0} bytes does not fit the archive's 32 bit fields")]
    PayloadTooLarge(u64),

    /// unable to find requested file
    #[error("unable to find requested file")]
    FileNotFound(#[from] FileNotFoundError),

    /// no file has been started
    #[error("no file has been started")]
    NoFileStarted,

    /// {0}
    #[error("{0}")]
    CustomError(String),
}

/// Error type to provide further information when a file has not been found
#[derive(Error, Diagnostic, Debug)]
pub enum FileNotFoundError {
    /// at index {0}
    #[error("at index {0}")]
    Index(usize),

    /// by name {0}
    #[error("by name {0}")]
    Name(String),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
