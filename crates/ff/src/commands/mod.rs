use std::{fs::File, path::Path};

use miette::{Context, IntoDiagnostic, Result};

pub mod assets;
pub mod web;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Handle serialized assets files
    Assets {
        #[command(subcommand)]
        command: assets::AssetsCommands,
    },
    /// Handle UnityWeb archives
    Web {
        #[command(subcommand)]
        command: web::WebCommands,
    },
}

impl Commands {
    pub fn handle(&self) -> Result<()> {
        match self {
            Commands::Assets { command } => command.handle(),
            Commands::Web { command } => command.handle(),
        }
    }
}

fn create_output(path: &Path, overwrite: bool) -> Result<File> {
    if !overwrite {
        File::create_new(path)
            .into_diagnostic()
            .context(format!("creating {}", path.display()))
    } else {
        File::create(path)
            .into_diagnostic()
            .context(format!("creating {}", path.display()))
    }
}
