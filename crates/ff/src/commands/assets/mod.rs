use miette::Result;

pub mod pack;
pub mod unpack;

/// Metadata block of an unpacked assets file
pub const METADATA_BIN: &str = "metadata.bin";

/// Directory holding the objects of an unpacked assets file
pub const OBJECTS_DIR: &str = "objects";

/// Description of an unpacked assets file
pub const MANIFEST_JSON: &str = "manifest.json";

#[derive(clap::Subcommand)]
pub enum AssetsCommands {
    /// Pack an unpacked directory into an assets file
    Pack(pack::PackArgs),
    /// Unpack an assets file into a directory
    Unpack(unpack::UnpackArgs),
}

impl AssetsCommands {
    pub fn handle(&self) -> Result<()> {
        match self {
            AssetsCommands::Pack(pack) => pack.handle(),
            AssetsCommands::Unpack(unpack) => unpack.handle(),
        }
    }
}
