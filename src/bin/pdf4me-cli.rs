//! # PDF4me CLI
//!
//! Runs one PDF4me operation against local files, polling until the result
//! is ready. Ctrl-C cancels the in-flight job; nothing is written unless the
//! job succeeds.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use pdf4me_client::logging::init_structured_logging;
use pdf4me_client::payload::parse_param;
use pdf4me_client::{
    AsyncJobClient, ClientConfig, ClientError, JobOutput, Operation, PayloadBuilder, ResultKind,
};

/// Exit status when the job was cancelled (128 + SIGINT)
const EXIT_CANCELLED: u8 = 130;
/// Exit status when polling gave up while the job was still running
const EXIT_POLL_TIMEOUT: u8 = 124;

#[derive(Parser, Debug)]
#[command(name = "pdf4me-cli")]
#[command(about = "Run PDF4me document operations from the command line")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Configuration file path (default: $PDF4ME_CONFIG or ./pdf4me.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output level (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Submit a job and wait for its result
    Run {
        /// Operation name, e.g. ConvertToPdf or Merge (case-insensitive)
        #[arg(value_name = "OPERATION")]
        operation: String,
        /// Input document(s); repeat for multi-document operations
        #[arg(short, long = "input", value_name = "FILE")]
        inputs: Vec<PathBuf>,
        /// Output file (default: <input-stem>.<operation>.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Document name sent as docName (default: first input's file name)
        #[arg(long)]
        doc_name: Option<String>,
        /// Operation parameter as key=value; JSON values keep their type
        #[arg(short, long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
        params: Vec<(String, Value)>,
        /// Ask the server to answer synchronously
        #[arg(long)]
        sync: bool,
        /// Decode the result as text (for operations not in the catalog)
        #[arg(long)]
        text: bool,
    },
    /// Resume polling a status URL from an earlier run
    Poll {
        /// Status URL from a previous 202 response
        #[arg(value_name = "URL")]
        poll_url: String,
        /// Output file; text results print to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Decode the result as text
        #[arg(long)]
        text: bool,
    },
    /// List cataloged operations
    Operations,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_structured_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            match e.downcast_ref::<ClientError>() {
                Some(ClientError::Cancelled) => ExitCode::from(EXIT_CANCELLED),
                Some(ClientError::PollTimeout { poll_url, .. }) => {
                    eprintln!("The job may still finish; resume with: pdf4me-cli poll {poll_url}");
                    ExitCode::from(EXIT_POLL_TIMEOUT)
                }
                _ => ExitCode::FAILURE,
            }
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Commands::Operations = cli.command {
        list_operations();
        return Ok(());
    }

    let config = match &cli.config {
        Some(path) => ClientConfig::load_from_file(path)?,
        None => ClientConfig::load()?,
    };
    let client = AsyncJobClient::new(&config)?;

    info!(base_url = %config.base_url, "PDF4me CLI starting");

    let cancel = CancellationToken::new();
    spawn_ctrl_c_handler(cancel.clone());

    match cli.command {
        Commands::Run {
            operation,
            inputs,
            output,
            doc_name,
            params,
            sync,
            text,
        } => {
            let known = operation.parse::<Operation>().ok();
            let mut builder = match known {
                Some(op) => PayloadBuilder::for_operation(op),
                None => {
                    warn!(operation = %operation, "Operation not in catalog, sending as-is");
                    PayloadBuilder::for_endpoint(&operation, ResultKind::Binary)
                }
            };
            if text {
                builder = builder.result_kind(ResultKind::Text);
            }

            for input in &inputs {
                let bytes = tokio::fs::read(input)
                    .await
                    .with_context(|| format!("Failed to read input {}", input.display()))?;
                builder = builder.document(bytes);
            }

            let doc_name = doc_name.or_else(|| {
                inputs
                    .first()
                    .and_then(|p| p.file_name())
                    .map(|n| n.to_string_lossy().into_owned())
            });
            if let Some(name) = doc_name {
                builder = builder.doc_name(name);
            }
            for (key, value) in params {
                builder = builder.param(key, value);
            }

            let request = builder.async_hint(!sync).build();
            let result = client.execute(&request, &cancel).await?;

            // Text results go to stdout unless an output file was named
            let output = output.or_else(|| {
                (request.result_kind == ResultKind::Binary).then(|| {
                    default_output_path(known, &operation, inputs.first().map(PathBuf::as_path))
                })
            });
            emit(&result, output.as_deref()).await
        }
        Commands::Poll {
            poll_url,
            output,
            text,
        } => {
            let kind = if text {
                ResultKind::Text
            } else {
                ResultKind::Binary
            };
            if kind == ResultKind::Binary && output.is_none() {
                bail!("--output is required for binary results");
            }
            let result = client.poll(&poll_url, kind, &cancel).await?;
            emit(&result, output.as_deref()).await
        }
        Commands::Operations => Ok(()),
    }
}

fn default_output_path(known: Option<Operation>, operation: &str, input: Option<&Path>) -> PathBuf {
    match (known, input) {
        (Some(op), Some(input)) => PathBuf::from(op.default_output_name(input)),
        (Some(op), None) => PathBuf::from(format!(
            "{}.{}",
            op.name().to_ascii_lowercase(),
            op.output_extension().unwrap_or("bin")
        )),
        (None, _) => {
            let name = operation.rsplit('/').next().unwrap_or(operation);
            PathBuf::from(format!("{}.bin", name.to_ascii_lowercase()))
        }
    }
}

async fn emit(result: &JobOutput, output: Option<&Path>) -> Result<()> {
    match (result, output) {
        (_, Some(path)) => {
            result
                .write_to(path)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {} bytes to {}", result.len(), path.display());
        }
        (JobOutput::Text(text), None) => println!("{text}"),
        (JobOutput::Bytes(_), None) => bail!("--output is required for binary results"),
    }
    Ok(())
}

fn list_operations() {
    println!("{:<32} {:<8} OUTPUT", "OPERATION", "RESULT");
    for op in Operation::ALL {
        println!(
            "{:<32} {:<8} {}",
            op.name(),
            op.result_kind().to_string(),
            op.output_extension().unwrap_or("(input)")
        );
    }
}

fn spawn_ctrl_c_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling job");
            cancel.cancel();
        }
    });
}
