use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub mod report;
pub mod run;

#[derive(Clone, Debug, Parser)]
#[command(name = "isoshelf", version = env!("CARGO_PKG_VERSION"), about, long_about = None, propagate_version = true)]
pub struct App {
    #[command(subcommand)]
    pub cmd: Commands,

    /// Configuration file.
    #[arg(short, long, global = true, default_value = "isoshelf.toml")]
    pub config: PathBuf,

    /// Log filter used when RUST_LOG is unset.
    #[arg(short = 'l', long, global = true, default_value = "info")]
    pub log_level: String,

    /// Write logs to this file instead of stderr.
    #[arg(short = 'f', long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Hide progress bars.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Print results as JSON.
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Report which images have a newer release, without downloading.
    #[command(alias = "c", name = "check")]
    Check(RunArg),
    /// Download, verify and install newer images.
    #[command(alias = "u", name = "update")]
    Update(RunArg),
    /// List the built-in vendors and their editions.
    #[command(alias = "ls", name = "vendors")]
    Vendors,
}

#[derive(Clone, Debug, Args)]
pub struct RunArg {
    /// Library root; overrides `library.root` from the configuration.
    pub root: Option<PathBuf>,

    /// Only run these vendors.
    #[arg(short, long = "vendor", value_name = "NAME")]
    pub vendors: Vec<String>,
}
