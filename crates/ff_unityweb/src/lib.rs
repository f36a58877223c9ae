//! This library handles reading from and creating **UnityWeb** archives used by *FusionFall*.
//!
//! # UnityWeb Archive Format Documentation
//!
//! The client downloads its assemblies and assets as a single `.unity3d` file: a fixed size header
//! followed by a payload which is usually compressed with LZMA.
//!
//! ## File Structure
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Flag                   | 8 bytes: `UnityWeb` or `streamed`                          |
//! | 0x0008         | Reserved               | 4 bytes: Always zero                                       |
//! | 0x000C         | Major Version          | 1 byte: Fixed value `2`                                    |
//! | 0x000D         | Version Info           | 12 bytes: `fusion-2.x.x`, zero padded                      |
//! | 0x001A         | Build Info             | 7 bytes: `2.5.4b5`, zero padded                            |
//! | 0x0022         | File Size              | 4 bytes: Header size plus stored payload size              |
//! | 0x0026         | First Offset           | 4 bytes: Fixed value `64`                                  |
//! | 0x002A         | Markers                | 8 bytes: Two words of value `1`                            |
//! | 0x0032         | Zip Size               | 4 bytes: Size of the payload as stored                     |
//! | 0x0036         | Unzip Size             | 4 bytes: Size of the raw payload                           |
//! | 0x003A         | Last Offset            | 4 bytes: Header size plus stored payload size              |
//!
//! The remaining bytes of the 64 byte header are zero.
//!
//! ### Payload
//!
//! The payload is either the raw payload itself or the raw payload compressed into an LZMA "alone"
//! stream. An uncompressed payload is recognised by its zip size being the unzip size plus two.
//!
//! ### Raw Payload
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | File Count             | 4 bytes: Number of entries in the file table            |
//! | 0x0004         | File Table             | Entries: name, NUL, 4 byte offset, 4 byte size          |
//! | 0x0200         | File Data              | The contents of every entry in table order              |
//!
//! - **Offsets** are relative to the start of the raw payload.
//! - The 16th entry (`mainData` in client builds) is followed by a single `0x01` byte which belongs to no
//!   entry.
//! - The data ends with the bytes `0x01 0x00`.
//! - The unzip size in the header is `513` plus the sum of all entry sizes.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.unity3d`
//! - **Endianness**: Big-endian for all multi-byte integers
//!

pub mod compression;
pub mod error;
pub mod payload;
pub mod read;
pub mod types;
pub mod write;

pub use compression::CompressionMethod;
pub use read::UnityWebArchive;
pub use types::{ArchiveHeader, HeaderFlag, VersionInfo};
pub use write::UnityWebWriter;
