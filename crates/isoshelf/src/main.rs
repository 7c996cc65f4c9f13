use std::process::ExitCode;

use clap::Parser;

use crate::cli::App;

mod cli;
mod config;
mod logging;
mod tracker;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let app = App::parse();
    let _guard = logging::init_logging(&app.log_level, app.log_file.as_deref())?;

    let ok = cli::run::run(app).await?;
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
