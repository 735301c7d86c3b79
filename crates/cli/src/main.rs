mod config_commands;
mod connect_commands;

use std::path::PathBuf;

use {
    clap::{Parser, Subcommand},
    conduit_config::ConduitConfig,
    tracing::debug,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "conduit", about = "Conduit: set up data-source connections")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Load this config file instead of searching the default locations.
    #[arg(long, global = true, env = "CONDUIT_CONFIG")]
    config: Option<PathBuf>,

    /// Backend base URL (overrides config and environment).
    #[arg(long, global = true)]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactively create a connection for a source.
    Connect {
        /// Source identifier, e.g. `zendesk`.
        short_name: String,
    },
    /// Show the configuration form a source asks for.
    Schema {
        short_name: String,
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: config_commands::ConfigAction,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so they never interleave with wizard prompts.
    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// Config file (explicit or discovered), then environment, then `--api-url`.
fn resolve_config(cli: &Cli) -> anyhow::Result<ConduitConfig> {
    let mut config = match &cli.config {
        Some(path) => conduit_config::load_config(path)?,
        None => conduit_config::discover_and_load(),
    };
    conduit_config::apply_env_overrides(&mut config);
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    debug!(base_url = %config.api.base_url, "configuration resolved");
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    debug!(version = env!("CARGO_PKG_VERSION"), "conduit starting");

    match &cli.command {
        Commands::Connect { short_name } => {
            let config = resolve_config(&cli)?;
            connect_commands::handle_connect(&config, short_name).await
        },
        Commands::Schema { short_name, json } => {
            let config = resolve_config(&cli)?;
            connect_commands::handle_schema(&config, short_name, *json).await
        },
        Commands::Config { action } => config_commands::handle_config(action, cli.config.as_deref()),
    }
}
