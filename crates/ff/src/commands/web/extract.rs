use clap::Args;
use ff_unityweb::UnityWebArchive;
use miette::{miette, Context, IntoDiagnostic, Result};
use std::{
    fs::File,
    io::Write,
    path::{Component, Path, PathBuf},
};
use tracing::info;

use super::HEADER_JSON;
use crate::commands::create_output;

#[derive(Args)]
pub struct ExtractArgs {
    /// An input UnityWeb file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A target directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// Allow overwriting the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

/// Turn an entry name into a path below the target directory.
///
/// Absolute names, prefixes and `..` are refused.
pub fn entry_path(name: &str) -> Option<PathBuf> {
    let path = Path::new(name);
    let safe = path.components().next().is_some()
        && path.components().all(|c| matches!(c, Component::Normal(_)));

    safe.then(|| path.to_path_buf())
}

impl ExtractArgs {
    pub fn handle(&self) -> Result<()> {
        let mut f = File::open(&self.file)
            .into_diagnostic()
            .context(format!("path: {}", &self.file.display()))?;
        let archive = UnityWebArchive::new(&mut f)?;

        std::fs::create_dir_all(&self.directory)
            .into_diagnostic()
            .context(format!("creating {}", &self.directory.display()))?;

        for file in archive.files() {
            let relative = entry_path(file.name())
                .ok_or(miette!("refusing to extract unsafe entry {:?}", file.name()))?;

            let p = self.directory.join(relative);
            info!("writing {}", p.display());

            if let Some(parent) = p.parent() {
                std::fs::create_dir_all(parent)
                    .into_diagnostic()
                    .context(format!("creating {}", parent.display()))?;
            }

            let mut out = create_output(&p, self.overwrite)?;
            out.write_all(file.data())
                .into_diagnostic()
                .context(format!("writing {}", p.display()))?;
        }

        let p = self.directory.join(HEADER_JSON);
        info!("writing {}", p.display());

        let json = serde_json::to_string_pretty(&archive.header().version()).into_diagnostic()?;
        let mut out = create_output(&p, self.overwrite)?;
        out.write_all(json.as_bytes())
            .into_diagnostic()
            .context(format!("writing {}", p.display()))?;

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    use super::entry_path;

    #[test]
    fn plain_names_are_accepted() {
        assert_eq!(entry_path("mainData"), Some(PathBuf::from("mainData")));
        assert_eq!(
            entry_path("Assembly - CSharp.dll"),
            Some(PathBuf::from("Assembly - CSharp.dll"))
        );
        assert_eq!(entry_path("data/level0"), Some(PathBuf::from("data/level0")));
    }

    #[test]
    fn unsafe_names_are_refused() {
        assert_eq!(entry_path(""), None);
        assert_eq!(entry_path("/etc/shadow"), None);
        assert_eq!(entry_path("../runtime"), None);
        assert_eq!(entry_path("data/../../runtime"), None);
        assert_eq!(entry_path("./mainData"), None);
    }
}
