//! kubectl plugin listing MapR ticket secrets and the volumes that mount them.

#![forbid(unsafe_code)]

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use mapr_ticket_application::ListContext;
use mapr_ticket_core::AppResult;
use mapr_ticket_infrastructure::{EnvelopeTicketDecoder, KubeClusterClient};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod cli_config;
mod commands;
mod render;

use cli_config::CliConfig;
use commands::CommandRuntime;

/// Inspect MapR tickets stored in Kubernetes secrets
#[derive(Parser, Debug)]
#[command(name = "kubectl-mapr-ticket")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log level used when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Request timeout in seconds; 0 disables the deadline
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List secrets holding a MapR ticket
    Secret(commands::secret::SecretArgs),

    /// List persistent volumes mounting ticket secrets
    Volume(commands::volume::VolumeArgs),

    /// List bound claims backed by MapR CSI volumes
    Claim(commands::claim::ClaimArgs),

    /// Show the decoded ticket of one secret
    Inspect(commands::inspect::InspectArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_str());

    match run(cli).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

impl Commands {
    fn validate(&self) -> AppResult<()> {
        match self {
            Self::Secret(args) => args.validate(),
            Self::Volume(args) => args.validate(),
            Self::Claim(args) => args.validate(),
            Self::Inspect(_) => Ok(()),
        }
    }
}

async fn run(cli: Cli) -> AppResult<String> {
    cli.command.validate()?;

    let config = CliConfig::load()?.with_timeout_override(cli.timeout);
    debug!(
        default_namespace = %config.default_namespace,
        request_timeout = ?config.request_timeout,
        "loaded configuration"
    );

    let (mut context, cancel) = ListContext::background().with_cancel();
    if let Some(timeout) = config.request_timeout {
        context = context.with_timeout(timeout);
    }
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let runtime = CommandRuntime {
        client: Arc::new(KubeClusterClient::try_default().await?),
        decoder: Arc::new(EnvelopeTicketDecoder::new()),
        context,
        config,
    };

    match &cli.command {
        Commands::Secret(args) => commands::secret::run(args, &runtime).await,
        Commands::Volume(args) => commands::volume::run(args, &runtime).await,
        Commands::Claim(args) => commands::claim::run(args, &runtime).await,
        Commands::Inspect(args) => commands::inspect::run(args, &runtime).await,
    }
}

fn init_tracing(log_level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
