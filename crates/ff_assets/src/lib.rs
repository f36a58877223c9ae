//! This library unpacks and repacks the version 6 **serialized assets** files (`sharedassets*.assets`)
//! shipped inside FusionFall's UnityWeb archives.
//!
//! # Serialized Assets Documentation
//!
//! ## File Structure
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Metadata Size          | 4 bytes: Size of the metadata block                        |
//! | 0x0004         | File Size              | 4 bytes: Size of the whole file                            |
//! | 0x0008         | Version                | 4 bytes: Fixed value `6`                                   |
//! | 0x000C         | Data Offset            | 4 bytes: Start of the object data, `0` when unset          |
//! | 0x0010         | Endianness             | 4 bytes: Endianness marker and reserved bytes              |
//! | 0x0014         | Metadata               | Type tree and object table                                 |
//! | Data Offset    | Objects                | Object data referenced by the table                        |
//!
//! The header is big-endian. When the data offset is unset the metadata size is used in its place.
//!
//! ### Object Table
//!
//! A little-endian object count followed by one record per object. Its position inside the metadata
//! is not recorded anywhere, it is found by scanning for a count whose records all point into the file.
//!
//! | Field          | Wide     | Narrow   | Description                               |
//! |----------------|----------|----------|-------------------------------------------|
//! | Path Id        | 8 bytes  | 4 bytes  | Object identifier                         |
//! | Offset         | 4 bytes  | 4 bytes  | Offset of the object from the data start  |
//! | Size           | 4 bytes  | 4 bytes  | Size of the object                        |
//! | Type Index     | 4 bytes  | 4 bytes  | Index into the type tree                  |
//!
//! ## Unpacked Layout
//!
//! - `metadata.bin`: every byte in front of the object data, header included
//! - `objects/NNNNN__pid-P__typ-T.bin`: one file per object, in table order
//! - `manifest.json`: an [`AssetsManifest`] describing the header and the table
//!

pub mod error;
pub mod read;
pub mod types;
pub mod write;

pub use read::{unpack_assets, UnpackedAssets};
pub use types::{AssetsHeader, AssetsManifest, ObjectEntry};
pub use write::pack_assets;
