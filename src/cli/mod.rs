pub mod commands;

use clap::{Parser, Subcommand};

use crate::domain::{Category, Platform};

#[derive(Parser)]
#[command(name = "rankscout")]
#[command(about = "Collects top-app rankings and delivers them to an ingestion endpoint", long_about = None)]
pub struct Cli {
    /// Path to the config file (default: ~/.config/rankscout/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Collect every category of each platform and deliver the results
    Run {
        /// Only run this platform (apple or google)
        #[arg(short, long)]
        platform: Option<Platform>,

        /// Collect and report without delivering
        #[arg(long)]
        dry_run: bool,

        /// Categories fetched at once per platform
        #[arg(long)]
        concurrency: Option<usize>,
    },
    /// Collect one platform and print the ranked entries, without delivering
    Show {
        /// Platform to collect (apple or google)
        platform: Platform,

        /// Only this category (label such as 게임, or name such as games)
        #[arg(long)]
        category: Option<Category>,
    },
    /// Print the config path and effective settings
    Config,
}
