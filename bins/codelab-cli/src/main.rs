mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "codelab-cli")]
#[command(about = "Codelab CLI - Run JavaScript submissions against test cases locally", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a submission against a JSON file of test cases
    Run {
        /// JavaScript source file
        #[arg(short, long)]
        code: PathBuf,

        /// JSON array of test cases ({name?, input, expected})
        #[arg(short, long)]
        tests: PathBuf,

        /// Per-test timeout in milliseconds (defaults to the runtime config)
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Runtime config path
        #[arg(long, default_value = codelab_sandbox::config::DEFAULT_CONFIG_PATH)]
        config: PathBuf,

        /// Print {"results": [...]} instead of the report
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Print the entry point that would be called for a submission
    Resolve {
        /// JavaScript source file
        #[arg(short, long)]
        code: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let all_passed = match cli.command {
        Commands::Run {
            code,
            tests,
            timeout_ms,
            config,
            json,
        } => commands::run_suite(&code, &tests, timeout_ms, &config, json).await?,
        Commands::Resolve { code } => commands::resolve(&code)?,
    };

    if !all_passed {
        std::process::exit(1);
    }
    Ok(())
}
