//! Binary entry point for the Gangway CLI.

use std::io::{self, Write};
use std::process;

use clap::Parser;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use gangway::{
    CodespaceClient, CodespaceConnectionBuilder, ConnectConfig, ConnectError,
    ConnectOrchestrator, Codespace, RestClient, RestError, StderrProgress,
};

#[derive(Debug, Parser)]
#[command(
    name = "gangway",
    about = "Bring a remote codespace to a connectable state and open a tunnel",
    arg_required_else_help = true
)]
enum Cli {
    #[command(name = "start", about = "Start the codespace if needed and wait until it is connectable")]
    Start(CodespaceArgs),
    #[command(name = "connect", about = "Wait for readiness and establish a tunnel connection")]
    Connect(CodespaceArgs),
}

#[derive(Debug, Parser)]
struct CodespaceArgs {
    /// Name of the codespace, as listed by the service.
    name: String,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("api error: {0}")]
    Api(String),
    #[error(transparent)]
    Connect(#[from] ConnectError<RestError>),
}

impl CliError {
    /// Exit code for the process: 130 for user interruption, 1 otherwise.
    const fn exit_code(&self) -> i32 {
        match self {
            Self::Connect(ConnectError::Canceled) => 130,
            Self::Config(_) | Self::Api(_) | Self::Connect(_) => 1,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let exit_code = match dispatch(cli).await {
        Ok(code) => code,
        Err(err) => {
            report_error(&err);
            err.exit_code()
        }
    };

    process::exit(exit_code);
}

async fn dispatch(cli: Cli) -> Result<i32, CliError> {
    match cli {
        Cli::Start(args) => start_command(&args).await,
        Cli::Connect(args) => connect_command(&args).await,
    }
}

struct Session {
    orchestrator: ConnectOrchestrator<RestClient, StderrProgress>,
    codespace: Codespace,
    cancel: CancellationToken,
}

/// Loads configuration, fetches the initial snapshot, and wires Ctrl-C into
/// the cancellation token governing the wait.
async fn prepare(name: &str) -> Result<Session, CliError> {
    let config =
        ConnectConfig::load_without_cli_args().map_err(|err| CliError::Config(err.to_string()))?;
    let client = RestClient::new(&config).map_err(|err| CliError::Api(err.to_string()))?;
    let codespace = client
        .fetch_codespace(name, true)
        .await
        .map_err(|err| CliError::Api(err.to_string()))?;
    let orchestrator = ConnectOrchestrator::new(client, StderrProgress)
        .with_backoff_policy(config.backoff_policy());

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            trigger.cancel();
        }
    });

    Ok(Session {
        orchestrator,
        codespace,
        cancel,
    })
}

async fn start_command(args: &CodespaceArgs) -> Result<i32, CliError> {
    let session = prepare(&args.name).await?;
    let ready = session
        .orchestrator
        .ensure_ready(&session.cancel, session.codespace)
        .await?;

    writeln!(io::stdout(), "codespace {} is ready", ready.name).ok();
    Ok(0)
}

async fn connect_command(args: &CodespaceArgs) -> Result<i32, CliError> {
    let session = prepare(&args.name).await?;
    let connection = session
        .orchestrator
        .connect(
            &session.cancel,
            session.codespace,
            &CodespaceConnectionBuilder,
        )
        .await?;

    writeln!(
        io::stdout(),
        "connected to tunnel {} on {}",
        connection.tunnel().tunnel_id,
        connection.tunnel().domain
    )
    .ok();
    Ok(0)
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}
