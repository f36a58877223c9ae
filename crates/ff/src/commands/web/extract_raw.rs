use clap::Args;
use ff_unityweb::read::extract_raw_payload;
use miette::{Context, IntoDiagnostic, Result};
use std::{io::Write, path::PathBuf};
use tracing::info;

use crate::commands::create_output;

#[derive(Args)]
pub struct ExtractRawArgs {
    /// An input UnityWeb file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A target file for the decompressed payload
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl ExtractRawArgs {
    pub fn handle(&self) -> Result<()> {
        let data = std::fs::read(&self.file)
            .into_diagnostic()
            .context(format!("path: {}", &self.file.display()))?;

        let payload = extract_raw_payload(&data)?;
        info!("writing {} bytes to {}", payload.len(), self.output.display());

        let mut out = create_output(&self.output, self.overwrite)?;
        out.write_all(&payload)
            .into_diagnostic()
            .context(format!("writing {}", &self.output.display()))?;

        Ok(())
    }
}
