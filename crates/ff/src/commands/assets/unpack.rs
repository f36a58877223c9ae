use clap::Args;
use ff_assets::unpack_assets;
use miette::{Context, IntoDiagnostic, Result};
use std::{
    io::Write,
    path::{Path, PathBuf},
};
use tracing::info;

use super::{MANIFEST_JSON, METADATA_BIN, OBJECTS_DIR};
use crate::commands::create_output;

#[derive(Args)]
pub struct UnpackArgs {
    /// An input assets file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A target directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl UnpackArgs {
    fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let mut out = create_output(path, self.overwrite)?;
        out.write_all(data)
            .into_diagnostic()
            .context(format!("writing {}", path.display()))
    }

    pub fn handle(&self) -> Result<()> {
        let data = std::fs::read(&self.file)
            .into_diagnostic()
            .context(format!("path: {}", &self.file.display()))?;
        let unpacked = unpack_assets(&data)?;

        let objects = self.directory.join(OBJECTS_DIR);
        std::fs::create_dir_all(&objects)
            .into_diagnostic()
            .context(format!("creating {}", objects.display()))?;

        self.write(&self.directory.join(METADATA_BIN), unpacked.metadata)?;

        for (name, object) in unpacked.object_names().zip(&unpacked.objects) {
            let p = objects.join(name);
            info!("writing {}", p.display());
            self.write(&p, object)?;
        }

        let json = serde_json::to_string_pretty(&unpacked.manifest).into_diagnostic()?;
        self.write(&self.directory.join(MANIFEST_JSON), json.as_bytes())?;

        info!("unpacked {} objects", unpacked.objects.len());

        Ok(())
    }
}
