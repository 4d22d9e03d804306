use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::CliOverrides;

#[derive(Parser)]
#[command(
    name = "pixgrade",
    about = "Compare two images and grade how different they are"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create .pixgrade/settings.toml with default settings
    Init {
        /// Overwrite an existing settings file (reset to defaults)
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Normalize, diff, and grade two images; writes a diff PNG
    Compare {
        /// First image
        left: PathBuf,
        /// Second image
        right: PathBuf,
        /// Where to write the rendered diff image
        #[arg(long, short = 'o', default_value = "diff.png")]
        output: PathBuf,
        #[command(flatten)]
        overrides: CliOverrides,
    },
}
