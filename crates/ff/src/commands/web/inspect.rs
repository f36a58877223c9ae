use clap::Args;
use ff_unityweb::UnityWebArchive;
use miette::{Context, IntoDiagnostic, Result};
use owo_colors::OwoColorize;
use std::{fs::File, path::PathBuf};

#[derive(Args)]
pub struct InspectArgs {
    /// An input UnityWeb file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,
}

impl InspectArgs {
    pub fn handle(&self) -> Result<()> {
        let f = File::open(&self.file)
            .into_diagnostic()
            .context(format!("path: {}", &self.file.display()))?;
        let archive = UnityWebArchive::new(f)?;
        let header = archive.header();

        println!("{}", self.file.display().blue());
        println!("* flag: {}", header.flag);
        println!(
            "* version: {} {} {}",
            header.major_version, header.version_info, header.build_info
        );
        println!("* file size: {}", header.file_size);
        println!("* first offset: {}", header.first_offset);
        println!("* markers: {:?}", header.markers);
        println!("* zip size: {}", header.file_zip_size);
        println!("* unzip size: {}", header.file_unzip_size);
        println!("* last offset: {}", header.last_offset);
        println!("* compression: {:?}", archive.compression_method());

        println!("{} {}", "files:".blue(), archive.len());
        for (i, file) in archive.files().enumerate() {
            println!(
                "  {:>3} {} {} {}",
                i.dimmed(),
                file.name().green(),
                file.offset(),
                file.size()
            );
        }

        Ok(())
    }
}
