//! Base types for structure of UnityWeb file.

use std::fmt;
use std::io::Cursor;

use binrw::{BinRead, BinWrite};
use tracing::{instrument, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Size of the outer header, which is also where the payload starts
pub const HEADER_SIZE: usize = 64;

/// Major version written by the FusionFall client builds
pub const DEFAULT_MAJOR_VERSION: u8 = 2;

/// Player version string written by the FusionFall client builds
pub const DEFAULT_VERSION_INFO: &str = "fusion-2.x.x";

/// Engine build string written by the FusionFall client builds
pub const DEFAULT_BUILD_INFO: &str = "2.5.4b5";

/// Signature stored in the first eight bytes of the header
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum HeaderFlag {
    /// `UnityWeb`, used by the original client
    #[default]
    UnityWeb,

    /// `streamed`, used by the retro client
    Streamed,
}

impl HeaderFlag {
    /// Strictly match one of the two accepted literals
    pub fn parse(value: &str) -> Option<HeaderFlag> {
        match value {
            "UnityWeb" => Some(HeaderFlag::UnityWeb),
            "streamed" => Some(HeaderFlag::Streamed),
            _ => None,
        }
    }

    /// The literal stored in the header
    pub const fn as_str(&self) -> &'static str {
        match self {
            HeaderFlag::UnityWeb => "UnityWeb",
            HeaderFlag::Streamed => "streamed",
        }
    }
}

/// Unknown flags fall back to [`HeaderFlag::UnityWeb`] instead of failing.
impl From<&str> for HeaderFlag {
    fn from(value: &str) -> Self {
        HeaderFlag::parse(value).unwrap_or_else(|| {
            warn!(flag = value, "unsupported header flag, using UnityWeb");
            HeaderFlag::default()
        })
    }
}

impl fmt::Display for HeaderFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Version triple stored in the header
///
/// With the `serde` feature this maps onto the `header.json` sidecar written next to extracted files.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "PascalCase"))]
pub struct VersionInfo {
    /// Single byte format version
    pub major_version: u8,

    /// Player version, at most 12 bytes are stored
    pub version_info: String,

    /// Engine build, at most 7 bytes are stored
    pub build_info: String,
}

impl Default for VersionInfo {
    fn default() -> Self {
        Self {
            major_version: DEFAULT_MAJOR_VERSION,
            version_info: DEFAULT_VERSION_INFO.to_owned(),
            build_info: DEFAULT_BUILD_INFO.to_owned(),
        }
    }
}

/// UnityWeb file header
///
/// A fixed 64 byte block in front of the payload. Strings are zero padded ASCII and all integers are stored
/// in big endian format. Unused bytes are always zero.
#[derive(BinRead, BinWrite, Debug, Clone, PartialEq, Eq)]
#[brw(big)]
pub struct ArchiveHeader {
    /// Signature, either `UnityWeb` or `streamed`
    #[br(map = |raw: [u8; 8]| trim_ascii(&raw))]
    #[bw(map = |flag: &String| pad_ascii::<8>(flag))]
    pub flag: String,

    /// Single byte format version
    #[brw(pad_before = 4)]
    pub major_version: u8,

    /// Player version
    #[br(map = |raw: [u8; 12]| trim_ascii(&raw))]
    #[bw(map = |info: &String| pad_ascii::<12>(info))]
    pub version_info: String,

    /// Engine build
    #[brw(pad_before = 1)]
    #[br(map = |raw: [u8; 7]| trim_ascii(&raw))]
    #[bw(map = |info: &String| pad_ascii::<7>(info))]
    pub build_info: String,

    /// Size of the whole file, header included
    #[brw(pad_before = 1)]
    pub file_size: u32,

    /// Offset from the start of the file where the payload begins
    pub first_offset: u32,

    /// Two words always written as `1`, their meaning is unknown
    pub markers: [u32; 2],

    /// Size of the payload as stored in the file
    pub file_zip_size: u32,

    /// Size of the payload once decompressed, without its two terminator bytes
    pub file_unzip_size: u32,

    /// Offset of the end of the payload
    #[brw(pad_after = 2)]
    pub last_offset: u32,
}

impl Default for ArchiveHeader {
    fn default() -> Self {
        let version = VersionInfo::default();
        Self {
            flag: HeaderFlag::default().as_str().to_owned(),
            major_version: version.major_version,
            version_info: version.version_info,
            build_info: version.build_info,
            file_size: HEADER_SIZE as u32,
            first_offset: HEADER_SIZE as u32,
            markers: [1, 1],
            file_zip_size: 0,
            file_unzip_size: 0,
            last_offset: HEADER_SIZE as u32,
        }
    }
}

impl ArchiveHeader {
    /// Describe a payload of `payload_len` stored bytes which expands to `raw_len` bytes.
    pub fn new(flag: HeaderFlag, payload_len: u32, raw_len: u32) -> Result<ArchiveHeader> {
        let end = (HEADER_SIZE as u32)
            .checked_add(payload_len)
            .ok_or(Error::PayloadTooLarge(payload_len as u64 + HEADER_SIZE as u64))?;

        Ok(ArchiveHeader {
            flag: flag.as_str().to_owned(),
            file_size: end,
            file_zip_size: payload_len,
            file_unzip_size: raw_len,
            last_offset: end,
            ..Default::default()
        })
    }

    /// Replace the version triple
    pub fn with_version(mut self, version: &VersionInfo) -> ArchiveHeader {
        self.major_version = version.major_version;
        self.version_info = version.version_info.clone();
        self.build_info = version.build_info.clone();
        self
    }

    /// The version triple stored in this header
    pub fn version(&self) -> VersionInfo {
        VersionInfo {
            major_version: self.major_version,
            version_info: self.version_info.clone(),
            build_info: self.build_info.clone(),
        }
    }

    /// The signature, if it is one of the accepted literals
    pub fn header_flag(&self) -> Option<HeaderFlag> {
        HeaderFlag::parse(&self.flag)
    }

    /// Serialize into the fixed size header block
    #[instrument(skip(self), err)]
    pub fn to_bytes(&self) -> Result<[u8; HEADER_SIZE]> {
        let mut out = [0u8; HEADER_SIZE];
        self.write(&mut Cursor::new(&mut out[..]))?;
        Ok(out)
    }

    /// Parse the header from the start of `data`
    ///
    /// Only the length is checked, any 64 byte prefix produces a header.
    #[instrument(skip_all, fields(len = data.len()), err)]
    pub fn from_bytes(data: &[u8]) -> Result<ArchiveHeader> {
        if data.len() < HEADER_SIZE {
            return Err(Error::InvalidHeaderLength { actual: data.len() });
        }

        Ok(ArchiveHeader::read(&mut Cursor::new(&data[..HEADER_SIZE]))?)
    }
}

fn trim_ascii(raw: &[u8]) -> String {
    let end = raw.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

fn pad_ascii<const N: usize>(value: &str) -> [u8; N] {
    let mut out = [0u8; N];
    let bytes = value.as_bytes();
    let len = bytes.len().min(N);
    out[..len].copy_from_slice(&bytes[..len]);
    out
}
