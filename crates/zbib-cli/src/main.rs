//! zbib - keep a local mirror of a Zotero library and report record defects.

mod cli;
mod commands;
mod error;


use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::bibtex::run_bibtex;
use crate::commands::check::{run_check, CheckOutcome};
use crate::commands::completions::run_completions;
use crate::commands::pdfs::run_pdfs;
use crate::commands::sync::run_sync;
use crate::error::CliError;

const EXIT_DEFECTS: i32 = 2;

#[tokio::main]
async fn main() {
    match run().await {
        Ok(CheckOutcome::Clean) => {}
        Ok(CheckOutcome::DefectsFound) => std::process::exit(EXIT_DEFECTS),
        Err(error) => {
            eprintln!("Error: {error}");
            std::process::exit(1);
        }
    }
}

async fn run() -> Result<CheckOutcome, CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("zbib=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Sync {
            file,
            version_file,
            tag,
            check,
            report,
        } => {
            let check = check.then_some(report);
            return run_sync(file.as_deref(), version_file.as_deref(), tag, check).await;
        }
        Commands::Check { file, report } => return run_check(file.as_deref(), report),
        Commands::Bibtex { file, tag, output } => {
            run_bibtex(file.as_deref(), tag, output.as_deref())?;
        }
        Commands::Pdfs {
            file,
            tag,
            output_dir,
        } => run_pdfs(file.as_deref(), tag, &output_dir).await?,
        Commands::Completions { shell, output } => {
            run_completions(shell, output.as_deref())?;
        }
    }

    Ok(CheckOutcome::Clean)
}
