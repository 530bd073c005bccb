//! SafeHttp - Privacy-Aware Outbound HTTP Client
//!
//! Command line front end for sending requests through the executor and for
//! inspecting masking, trust routing and configuration.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use safehttp::{
    client::HttpExecutor,
    config::SafeHttpConfig,
    privacy::{JsonBodyMasker, PiiClassifier, RegexPiiDetector},
    tls::TlsRouteResolver,
    HttpMethod, HttpResponse,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "safehttp")]
#[command(author = "A3S Lab Team")]
#[command(version)]
#[command(about = "Privacy-aware outbound HTTP client")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "SAFEHTTP_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Enable TRACE logging (masked request/response dumps)
    #[arg(long)]
    trace: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a request and print the response envelope
    Request {
        /// HTTP method (GET, POST, PUT, PATCH, DELETE)
        method: String,

        /// Target URL
        url: String,

        /// Query parameter as key=value (repeatable)
        #[arg(short = 'q', long = "query")]
        query: Vec<String>,

        /// Header as "Name: value" (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// JSON request body
        #[arg(short, long)]
        data: Option<String>,
    },

    /// Mask a JSON document from a file or stdin
    Mask {
        /// Input file (stdin when omitted)
        file: Option<PathBuf>,
    },

    /// Show the trust route resolved for a host
    Route {
        /// Target host
        host: String,
    },

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.trace, cli.json_logs);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Request {
            method,
            url,
            query,
            headers,
            data,
        } => {
            run_request(config, &method, &url, &query, &headers, data.as_deref()).await?;
        }
        Commands::Mask { file } => {
            run_mask(&config, file.as_deref()).await?;
        }
        Commands::Route { host } => {
            show_route(&config, &host)?;
        }
        Commands::Config { default } => {
            show_config(if default { None } else { Some(&config) })?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool, trace: bool, json: bool) {
    let log_level = if trace {
        "trace"
    } else if verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("safehttp={}", log_level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Explicit path, else `<config_dir>/safehttp/config.toml` when present,
/// else defaults
fn load_config(path: Option<&Path>) -> Result<SafeHttpConfig> {
    if let Some(path) = path {
        return SafeHttpConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()));
    }

    let default_path = dirs_next::config_dir().map(|p| p.join("safehttp").join("config.toml"));
    match default_path {
        Some(path) if path.exists() => {
            tracing::debug!("Using configuration file {}", path.display());
            SafeHttpConfig::load(&path)
                .with_context(|| format!("Failed to load config from {}", path.display()))
        }
        _ => Ok(SafeHttpConfig::default()),
    }
}

async fn run_request(
    config: SafeHttpConfig,
    method: &str,
    url: &str,
    query: &[String],
    headers: &[String],
    data: Option<&str>,
) -> Result<()> {
    let method: HttpMethod = method.parse()?;

    let params = query
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .ok_or_else(|| anyhow!("Query parameter must be key=value: {}", pair))
        })
        .collect::<Result<Vec<_>>>()?;

    let headers = headers
        .iter()
        .map(|line| {
            line.split_once(':')
                .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
                .ok_or_else(|| anyhow!("Header must be \"Name: value\": {}", line))
        })
        .collect::<Result<HashMap<_, _>>>()?;

    let body: Option<Value> = data
        .map(serde_json::from_str::<Value>)
        .transpose()
        .context("Request body is not valid JSON")?;

    let executor = HttpExecutor::builder().config(config).build()?;
    let response: HttpResponse<Value> = executor
        .execute(method, url, &params, &headers, body.as_ref())
        .await;

    if response.is_transport_failure() {
        tracing::warn!(cid = %response.correlation_id, "No response received");
    }
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

async fn run_mask(config: &SafeHttpConfig, file: Option<&Path>) -> Result<()> {
    let input = match file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut input = String::new();
            tokio::io::stdin().read_to_string(&mut input).await?;
            input
        }
    };

    let masker = JsonBodyMasker::new(
        Arc::new(PiiClassifier::from_config(&config.pii)),
        Arc::new(RegexPiiDetector::new(&config.pii.content_rules)?),
        config.pii.mask.clone(),
    );

    // Non-JSON input is masked as a plain string
    let result = match serde_json::from_str::<Value>(&input) {
        Ok(value) => masker.mask_value(&value),
        Err(_) => masker.mask(Some(input.trim())),
    };

    let masked = result
        .masked_value()
        .map(|text| serde_json::from_str::<Value>(text).unwrap_or_else(|_| json!(text)));
    let output = json!({
        "masked": masked,
        "pii_level": result.highest_level(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn show_route(config: &SafeHttpConfig, host: &str) -> Result<()> {
    let resolver = TlsRouteResolver::new(&config.tls, &config.client);
    let route = resolver.resolve(host);
    println!("{}", serde_json::to_string_pretty(&route)?);
    Ok(())
}

fn show_config(config: Option<&SafeHttpConfig>) -> Result<()> {
    let config = config.cloned().unwrap_or_default();
    let toml = toml::to_string_pretty(&config)?;
    println!("{}", toml);
    Ok(())
}
