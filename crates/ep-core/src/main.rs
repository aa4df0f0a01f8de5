//! `ep` command-line entry point.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use ep_common::{OutputFormat, Result, RunId};
use ep_config::Config;
use ep_core::exit_codes::ExitCode;
use ep_core::pipeline;
use ep_store::{inspect, reject_log, source, writer::RunArtifacts};

#[derive(Parser)]
#[command(name = "ep", version, about = "Batch event analytics pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate, flatten, and aggregate a raw event batch
    Run {
        /// Raw JSON batch file
        #[arg(long)]
        input: Option<PathBuf>,

        /// Directory receiving the artifacts
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Render persisted artifacts for review
    Inspect {
        /// Directory holding the artifacts
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Rendering format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Command::Run { input, output_dir } => cmd_run(input, output_dir),
        Command::Inspect { output_dir, format } => cmd_inspect(output_dir, format),
    };

    let code = match outcome {
        Ok(code) => code,
        Err(err) => {
            error!(code = err.code(), "{err}");
            ExitCode::from_error(&err)
        }
    };
    std::process::exit(code.as_i32());
}

fn cmd_run(input: Option<PathBuf>, output_dir: Option<PathBuf>) -> Result<ExitCode> {
    let config = Config::resolve(input, output_dir);
    config.validate()?;

    let run_id = RunId::new();
    info!(%run_id, input = %config.input_path.display(), "starting batch run");

    let records = source::load_records(&config.input_path)?;
    let output = pipeline::run_batch(records)?;

    let artifacts = RunArtifacts::encode(
        &output.table,
        &output.daily_counts,
        &output.active_users,
        output.most_active.as_ref(),
        &run_id,
    )?;
    artifacts.persist(&config.output_dir)?;
    reject_log::write_rejections(&config.reject_log_path(), &output.rejections)?;

    info!(
        rows = output.table.len(),
        rejected = output.rejections.len(),
        output_dir = %config.output_dir.display(),
        "run complete"
    );
    Ok(if output.rejections.is_empty() {
        ExitCode::Clean
    } else {
        ExitCode::Rejections
    })
}

fn cmd_inspect(output_dir: Option<PathBuf>, format: OutputFormat) -> Result<ExitCode> {
    let config = Config::resolve(None, output_dir);
    let rendered = inspect::render_artifacts(&config.output_dir, format)?;
    println!("{rendered}");
    Ok(ExitCode::Clean)
}
