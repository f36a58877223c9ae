use clap::{Args, ValueEnum};
use ff_unityweb::{
    write::UnityWebWriterOptions, CompressionMethod, HeaderFlag, UnityWebWriter, VersionInfo,
};
use miette::{miette, Context, IntoDiagnostic, Result};
use std::{
    fs::File,
    path::{Path, PathBuf},
};
use tracing::{info, warn};
use walkdir::WalkDir;

use super::{
    order::{sort_names, Layout, FUSIONFALL_MANIFEST},
    HEADER_JSON,
};
use crate::commands::create_output;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum FlagArg {
    /// `UnityWeb`, read by the original client
    #[default]
    UnityWeb,
    /// `streamed`, read by the retro client
    Streamed,
}

impl From<FlagArg> for HeaderFlag {
    fn from(value: FlagArg) -> Self {
        match value {
            FlagArg::UnityWeb => HeaderFlag::UnityWeb,
            FlagArg::Streamed => HeaderFlag::Streamed,
        }
    }
}

#[derive(Args)]
pub struct PackArgs {
    /// An input directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// A target UnityWeb file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Signature written at the start of the header
    #[arg(long, value_enum, default_value_t = FlagArg::UnityWeb)]
    flag: FlagArg,

    /// Store the payload without LZMA compression
    #[arg(long, default_value_t = false)]
    uncompressed: bool,

    /// Which files are packed and in what order
    #[arg(long, value_enum, default_value_t = Layout::Natural)]
    layout: Layout,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

/// Read the version triple from `header.json`, falling back to the defaults.
pub fn read_version(directory: &Path) -> VersionInfo {
    let path = directory.join(HEADER_JSON);
    if !path.is_file() {
        return VersionInfo::default();
    }

    let parsed = std::fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|json| serde_json::from_str::<VersionInfo>(&json).map_err(|e| e.to_string()));

    match parsed {
        Ok(version) => {
            info!("using version from {}", path.display());
            version
        }
        Err(error) => {
            warn!(%error, "unable to read {}, using default version", path.display());
            VersionInfo::default()
        }
    }
}

/// Names of the regular files directly inside `directory`, `header.json` excluded
pub fn directory_files(directory: &Path) -> Result<Vec<String>> {
    WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| !e.file_name().eq_ignore_ascii_case(HEADER_JSON))
        .map(|e| {
            e.file_name()
                .to_str()
                .map(str::to_owned)
                .ok_or(miette!("unable to convert {} to a string", e.path().display()))
        })
        .collect()
}

/// Pick the files to pack for `layout`, in archive order.
pub fn select_files(directory: &Path, layout: Layout) -> Result<Vec<String>> {
    let found = directory_files(directory)?;

    match layout {
        Layout::Natural => Ok(sort_names(found)),
        Layout::FusionFall => {
            for name in found.iter().filter(|n| !FUSIONFALL_MANIFEST.contains(&n.as_str())) {
                warn!("skipping {name}, it is not part of the fusion-fall layout");
            }

            FUSIONFALL_MANIFEST
                .iter()
                .map(|name| {
                    if found.iter().any(|n| n == name) {
                        Ok(name.to_string())
                    } else {
                        Err(miette!(
                            "{} is missing {name}",
                            directory.display()
                        ))
                    }
                })
                .collect()
        }
    }
}

impl PackArgs {
    pub fn handle(&self) -> Result<()> {
        info!("creating {}", &self.file.display());

        let files = select_files(&self.directory, self.layout)?;
        if files.is_empty() {
            return Err(miette!("directory is empty"));
        }

        let version = read_version(&self.directory);
        let compression = if self.uncompressed {
            CompressionMethod::None
        } else {
            CompressionMethod::Lzma
        };

        let mut out = create_output(&self.file, self.overwrite)?;

        let mut archive = UnityWebWriter::new(
            &mut out,
            UnityWebWriterOptions::builder()
                .flag(self.flag.into())
                .compression(compression)
                .version(version)
                .build(),
        );

        for name in files {
            let path = self.directory.join(&name);
            info!("packing {name}");

            archive.start_file(&name);

            let mut f = File::open(&path)
                .into_diagnostic()
                .context(format!("opening {}", path.display()))?;

            std::io::copy(&mut f, &mut archive)
                .into_diagnostic()
                .context(format!("copying {}", path.display()))?;
        }

        archive.finish().context("finalizing archive")?;

        Ok(())
    }
}
