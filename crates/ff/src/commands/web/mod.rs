use miette::Result;

pub mod extract;
pub mod extract_raw;
pub mod inspect;
pub mod order;
pub mod pack;

/// Name of the version sidecar kept next to extracted files
pub const HEADER_JSON: &str = "header.json";

#[derive(clap::Subcommand)]
pub enum WebCommands {
    /// Pack a directory into a UnityWeb archive
    Pack(pack::PackArgs),
    /// Extract a UnityWeb archive into a directory
    Extract(extract::ExtractArgs),
    /// Write the decompressed payload of a UnityWeb archive as it is
    ExtractRaw(extract_raw::ExtractRawArgs),
    /// Print the header and file table of a UnityWeb archive
    Inspect(inspect::InspectArgs),
}

impl WebCommands {
    pub fn handle(&self) -> Result<()> {
        match self {
            WebCommands::Pack(pack) => pack.handle(),
            WebCommands::Extract(extract) => extract.handle(),
            WebCommands::ExtractRaw(extract_raw) => extract_raw.handle(),
            WebCommands::Inspect(inspect) => inspect.handle(),
        }
    }
}
