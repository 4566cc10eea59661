mod auth;
mod client;
mod commands;
mod config;
mod error;
mod middleware;
mod model;
mod mutate;
mod output;
mod patch;

use clap::{Parser, Subcommand};
use commands::{
    config_cmd::ConfigCommand, offers::OffersCommand, operations::OperationsCommand,
    publishers::PublishersCommand, skus::SkusCommand, versions::VersionsCommand,
};
use error::{CliError, Result};
use output::{Format, StdPrinter};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// pub: a command line interface for the Azure Cloud Partner Portal.
///
/// Manage marketplace offers, their SKUs (plans) and image versions, and
/// drive publishing operations.
///
/// Authentication (one of):
///   export AZURE_TOKEN=$(az account get-access-token --resource https://cloudpartner.azure.com --query accessToken -o tsv)
///   export AZURE_TENANT_ID=... AZURE_CLIENT_ID=... AZURE_CLIENT_SECRET=...
///
/// Typical flow:
///   pub offers show -p contoso -o contoso-vm > offer.json
///   pub offers put -f offer.json --set definition.displayText="Contoso VM"
///   pub versions put image -p contoso -o contoso-vm -s gen2 --version 2020.1.1 --vhd-uri URI
///   pub offers publish -p contoso -o contoso-vm -e ops@contoso.com
///   pub operations get -u OPERATION_LOCATION
///
/// Output formats (--format):
///   json   - Pretty JSON (default)
///   table  - Human-readable table
///   plain  - Key=value pairs for piping
///
/// Set DEBUG=true to dump every HTTP request and response to stderr.
#[derive(Parser, Debug)]
#[command(name = "pub", version, about, long_about)]
struct Cli {
    /// Cloud Partner Portal API version [default: 2017-10-31]
    #[arg(short = 'a', long, global = true, env = "PUB_API_VERSION")]
    api_version: Option<String>,

    /// API host [default: https://cloudpartner.azure.com/]
    #[arg(long, global = true, env = "PUB_HOST")]
    host: Option<String>,

    /// Config file [default: ~/.pub/config.json]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format: json (default), table, plain
    #[arg(long, global = true, env = "PUB_FORMAT")]
    format: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage offers: list, show, status, publish, live, put
    Offers {
        #[command(subcommand)]
        cmd: OffersCommand,
    },
    /// Track and cancel publishing operations
    Operations {
        #[command(subcommand)]
        cmd: OperationsCommand,
    },
    /// List publishers
    Publishers {
        #[command(subcommand)]
        cmd: PublishersCommand,
    },
    /// Manage the SKUs (plans) of an offer
    Skus {
        #[command(subcommand)]
        cmd: SkusCommand,
    },
    /// Manage the image versions of a SKU
    Versions {
        #[command(subcommand)]
        cmd: VersionsCommand,
    },
    /// Manage CLI configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommand,
    },
}

fn init_tracing() {
    let default = if std::env::var("DEBUG").map(|v| v == "true").unwrap_or(false) {
        concat!(env!("CARGO_CRATE_NAME"), "=debug,warn")
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let path = cli.config.unwrap_or_else(config::Config::default_path);
    let resolved = config::Config::load(&path)?.resolve(
        path,
        cli.api_version.as_deref(),
        cli.host.as_deref(),
        cli.format.as_deref(),
    );
    let printer = StdPrinter::new(Format::from_str(&resolved.format));

    if let Command::Config { cmd } = cli.command {
        return commands::config_cmd::handle(cmd, &resolved, &printer);
    }

    tracing::debug!(host = %resolved.host, api_version = %resolved.api_version, "resolved configuration");
    let client = client::PartnerClient::from_env(&resolved.host, &resolved.api_version)?
        .with_middleware(Arc::new(middleware::UserAgent::default()));

    match cli.command {
        Command::Offers { cmd } => commands::offers::handle(cmd, &client, &printer).await,
        Command::Operations { cmd } => commands::operations::handle(cmd, &client, &printer).await,
        Command::Publishers { cmd } => commands::publishers::handle(cmd, &client, &printer).await,
        Command::Skus { cmd } => commands::skus::handle(cmd, &client, &printer).await,
        Command::Versions { cmd } => commands::versions::handle(cmd, &client, &printer).await,
        Command::Config { .. } => Ok(()),
    }
}

/// Resolves on Ctrl-C or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "unable to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "unable to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    // dropping the command future aborts any request in flight
    let result = tokio::select! {
        res = run(cli) => res,
        _ = shutdown_signal() => Err(CliError::Interrupted),
    };

    if let Err(e) = result {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_versions_put_corevm() {
        let cli = Cli::try_parse_from([
            "pub", "versions", "put", "corevm", "-p", "contoso", "-o", "vm", "-s", "gen2",
            "--version", "2020.1.1", "--vhd-uri", "https://blob/os.vhd", "--show",
        ])
        .unwrap();
        match cli.command {
            Command::Versions {
                cmd: VersionsCommand::Put { .. },
            } => {}
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_offers_show_version_conflicts_with_slot() {
        let result = Cli::try_parse_from([
            "pub", "offers", "show", "-p", "contoso", "-o", "vm", "--version", "2", "--slot", "preview",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "pub", "publishers", "list", "-a", "2020-01-01", "--format", "table",
        ])
        .unwrap();
        assert_eq!(cli.api_version.as_deref(), Some("2020-01-01"));
        assert_eq!(cli.format.as_deref(), Some("table"));
    }
}
