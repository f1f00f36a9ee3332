use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kquery::{ClientConfig, FetchRequest, FilterValue, QueryClient};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "kquery")]
#[command(about = "Query benchmark results from Elasticsearch via SQL")]
#[command(version)]
struct Cli {
    /// TOML file with host, timeout_ms and index
    #[arg(long, global = true, env = "KQUERY_CONFIG")]
    config: Option<PathBuf>,

    /// Elasticsearch base URL
    #[arg(long, global = true, env = "KQUERY_HOST")]
    host: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Index name or pattern
    #[arg(long, global = true, env = "KQUERY_INDEX")]
    index: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch rows, newest first, one JSON array per line
    Fetch {
        /// Field to select (repeatable, in output order)
        #[arg(short, long = "field", required = true)]
        fields: Vec<String>,

        /// Equality filter as KEY=VALUE; `s_` keys are compared as strings,
        /// values are passed through unchanged
        #[arg(short = 'w', long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, FilterValue)>,

        /// Maximum rows to return (0 = no limit)
        #[arg(short, long, default_value = "1")]
        limit: u64,

        /// Inclusive lower bound on ts_created
        #[arg(long)]
        start_date: Option<String>,

        /// Inclusive upper bound on ts_created
        #[arg(long)]
        end_date: Option<String>,

        /// Log the request body before sending it
        #[arg(short, long)]
        verbose: bool,
    },

    /// Check whether the configured index exists
    Exists,
}

/// Parse `KEY=VALUE`. The value is kept exactly as typed; quoting is
/// decided later from the key prefix alone.
fn parse_filter(s: &str) -> std::result::Result<(String, FilterValue), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid filter '{}', expected KEY=VALUE", s))?;
    if key.is_empty() {
        return Err(format!("invalid filter '{}', empty key", s));
    }

    Ok((key.to_string(), FilterValue::Text(value.to_string())))
}

fn resolve_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = match &cli.config {
        Some(path) => ClientConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ClientConfig::default(),
    };

    if let Some(host) = &cli.host {
        config.host = host.clone();
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    if let Some(index) = &cli.index {
        config.index = index.clone();
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    let client = QueryClient::from_config(&config)?;

    match cli.command {
        Commands::Fetch {
            fields,
            filters,
            limit,
            start_date,
            end_date,
            verbose,
        } => {
            let mut request = FetchRequest::new(fields)
                .filters(filters.into_iter().collect())
                .limit(limit)
                .verbose(verbose);
            if let Some(date) = start_date {
                request = request.start_date(date);
            }
            if let Some(date) = end_date {
                request = request.end_date(date);
            }

            let rows = match client.fetch_results(&request).await {
                Ok(rows) => rows,
                Err(kquery::Error::IndexNotFound(index)) => {
                    println!("Index {} not exists", index);
                    std::process::exit(1);
                }
                Err(e) => return Err(e.into()),
            };

            for row in &rows {
                println!("{}", serde_json::to_string(row)?);
            }
            tracing::info!("Fetched {} rows from {}", rows.len(), client.index());
        }
        Commands::Exists => {
            let exists = client.index_exists().await?;
            println!("{}", exists);
        }
    }

    client.close();
    Ok(())
}
