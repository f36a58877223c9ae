use clap::Args;
use ff_assets::{pack_assets, AssetsManifest};
use miette::{Context, IntoDiagnostic, Result};
use std::{io::Write, path::PathBuf};
use tracing::info;
use walkdir::WalkDir;

use super::{MANIFEST_JSON, METADATA_BIN, OBJECTS_DIR};
use crate::commands::create_output;

#[derive(Args)]
pub struct PackArgs {
    /// An unpacked assets directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// A target assets file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl PackArgs {
    pub fn handle(&self) -> Result<()> {
        info!("creating {}", &self.file.display());

        let manifest_path = self.directory.join(MANIFEST_JSON);
        let json = std::fs::read_to_string(&manifest_path)
            .into_diagnostic()
            .context(format!("path: {}", manifest_path.display()))?;
        let manifest: AssetsManifest = serde_json::from_str(&json)
            .into_diagnostic()
            .context(format!("parsing {}", manifest_path.display()))?;

        let metadata_path = self.directory.join(METADATA_BIN);
        let metadata = std::fs::read(&metadata_path)
            .into_diagnostic()
            .context(format!("path: {}", metadata_path.display()))?;

        let objects = WalkDir::new(self.directory.join(OBJECTS_DIR))
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "bin"))
            .map(|e| {
                std::fs::read(e.path())
                    .into_diagnostic()
                    .context(format!("reading {}", e.path().display()))
            })
            .collect::<Result<Vec<_>>>()?;

        let packed = pack_assets(&manifest, &metadata, &objects)?;

        let mut out = create_output(&self.file, self.overwrite)?;
        out.write_all(&packed)
            .into_diagnostic()
            .context(format!("writing {}", &self.file.display()))?;

        info!("packed {} objects", objects.len());

        Ok(())
    }
}
