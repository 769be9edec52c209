//! # web2md CLI
//!
//! Command-line entry point.
//!
//! ```text
//! web2md run <URL> [--clean-transcripts]
//! ```
//!
//! The output root comes from `BASE_OUTPUT_DIR` (default `./output`). Any
//! fatal error exits with a non-zero status.

mod telemetry;

use clap::{Args, CommandFactory, Parser, Subcommand};
use tracing::instrument;
use web2md::{Config, RunOptions};

#[derive(Parser)]
#[command(author, version, about = "Save a single web page as Markdown", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch a page and save it as Markdown with its images
    Run(RunArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// URL of the page to convert
    #[arg(required = true)]
    url: String,

    /// Put each speaker turn of run-together transcripts on its own line
    #[arg(long)]
    clean_transcripts: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    telemetry::init_tracing_subscriber();

    // Resolved once; everything below receives it explicitly
    let config = Config::from_env();

    match cli.command {
        Some(Commands::Run(args)) => {
            run_command(args, &config).await?;
        }
        None => {
            Cli::command().print_help()?;
        }
    }

    Ok(())
}

#[instrument(skip(config))]
async fn run_command(args: RunArgs, config: &Config) -> anyhow::Result<()> {
    let options = RunOptions {
        clean_transcripts: args.clean_transcripts,
        ..RunOptions::default()
    };

    let report = web2md::run(&args.url, &options, config).await?;

    println!("Markdown saved to: {}", report.markdown_path.display());
    if report.images_saved > 0 {
        println!("Saved {} images", report.images_saved);
    }

    Ok(())
}
