//! Root CLI structure for spl-rs

use clap::{Parser, Subcommand};

use crate::commands::{export::ExportArgs, info::InfoArgs, simulate::SimulateArgs};

#[derive(Parser)]
#[command(name = "spl-rs")]
#[command(about = "Command-line tools for Nintendo DS SPL particle archives", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Display the header, resources and textures of an SPA archive
    Info(InfoArgs),

    /// Export decoded textures as image files
    Export(ExportArgs),

    /// Run an emitter headless and report its lifecycle
    Simulate(SimulateArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
