use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use keyquorum::cli::{Cli, Workflow};
use keyquorum::commands::{combine_secrets, create_secrets, custom_generate_keys, generate_keys};
use keyquorum::provider::CryptoProvider;

/// Exit status for invalid arguments, matching clap's usage errors
const EXIT_VALIDATION: u8 = 2;

fn init_tracing(log_level: tracing::Level) -> anyhow::Result<()> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(log_level.into())
        .from_env_lossy();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_filter(env_filter);

    tracing_subscriber::registry()
        .with(stderr_layer)
        .try_init()
        .context("failed to initialize logging")
}

/// Runs the workflow and returns the line reported on success
fn run(
    provider: &dyn CryptoProvider,
    workflow: Workflow,
) -> keyquorum::Result<(String, Vec<PathBuf>)> {
    let mut rng = rand::rng();

    match workflow {
        Workflow::Create(opts) => {
            let written = create_secrets(provider, &mut rng, &opts)?;
            Ok((
                format!("secrets successfully created on dir {}", opts.output.display()),
                written,
            ))
        }
        Workflow::Generate(opts) => {
            let written = generate_keys(provider, &mut rng, &opts)?;
            Ok((
                format!("keys successfully created on dir {}", opts.output.display()),
                written,
            ))
        }
        Workflow::CustomGenerate(opts) => {
            let written = custom_generate_keys(provider, &opts)?;
            Ok((
                format!("keys successfully created on dir {}", opts.output.display()),
                written,
            ))
        }
        Workflow::Combine(opts) => {
            let written = combine_secrets(provider, &opts)?;
            Ok((
                format!("secrets successfully combined on dir {}", opts.output.display()),
                written,
            ))
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.log_level) {
        eprintln!("error: {e:#}");
        return ExitCode::FAILURE;
    }

    let provider = cli.command.algorithm().provider();
    match Workflow::try_from(cli.command).and_then(|workflow| run(provider, workflow)) {
        Ok((summary, written)) => {
            tracing::debug!(files = written.len(), "workflow finished");
            println!("{summary}");
            println!("keep private key safe :)");
            ExitCode::SUCCESS
        }
        Err(e) if e.is_validation() => {
            eprintln!("error: {e}");
            ExitCode::from(EXIT_VALIDATION)
        }
        Err(e) => {
            eprintln!("error: {:#}", anyhow::Error::from(e));
            ExitCode::FAILURE
        }
    }
}
