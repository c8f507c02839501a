//! `realty`: serve the analytics API, or answer one query from the terminal.

mod display;

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use realty_ai::{DEFAULT_MODEL, GeminiClient, SummaryGenerator};
use realty_api::Pipeline;
use realty_core::ColumnNames;
use realty_store::Dataset;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "realty", version, about = "Real-estate query analytics")]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct Config {
    /// Dataset file (.parquet or .csv)
    #[arg(long, env = "REALTY_DATA", default_value = "data/realestate.parquet", global = true)]
    data: PathBuf,

    /// Gemini API key; summaries use the built-in template when unset
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    gemini_api_key: Option<String>,

    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL, global = true)]
    gemini_model: String,

    /// Override the Gemini endpoint root
    #[arg(long, env = "GEMINI_BASE_URL", global = true)]
    gemini_base_url: Option<String>,

    #[command(flatten)]
    columns: ColumnArgs,
}

/// Dataset column names, when they differ from the defaults.
#[derive(Args, Debug, Default)]
struct ColumnArgs {
    #[arg(long, env = "REALTY_AREA_COLUMN", global = true)]
    area_column: Option<String>,

    #[arg(long, env = "REALTY_YEAR_COLUMN", global = true)]
    year_column: Option<String>,

    #[arg(long, env = "REALTY_PRICE_COLUMN", global = true)]
    price_column: Option<String>,

    #[arg(long, env = "REALTY_DEMAND_COLUMN", global = true)]
    demand_column: Option<String>,
}

impl ColumnArgs {
    fn resolve(&self) -> ColumnNames {
        let defaults = ColumnNames::default();
        ColumnNames {
            area: self.area_column.clone().unwrap_or(defaults.area),
            year: self.year_column.clone().unwrap_or(defaults.year),
            price: self.price_column.clone().unwrap_or(defaults.price),
            demand: self.demand_column.clone().unwrap_or(defaults.demand),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API
    Serve {
        #[arg(long, env = "REALTY_HOST", default_value = "0.0.0.0")]
        host: IpAddr,

        #[arg(long, env = "REALTY_PORT", default_value_t = 8000)]
        port: u16,
    },
    /// Answer one query and print the analysis
    Ask {
        query: String,

        /// Print the response body as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the localities in the dataset
    Areas,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    info!("realty v{}", env!("CARGO_PKG_VERSION"));

    let pipeline = Arc::new(build_pipeline(&cli.config));

    match cli.command {
        Command::Serve { host, port } => {
            realty_api::serve(pipeline, SocketAddr::new(host, port))
                .await
                .context("HTTP server failed")?;
        }
        Command::Ask { query, json } => {
            let analysis = pipeline.analyze(&query).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                print!("{}", display::AnalysisCard(&analysis));
            }
        }
        Command::Areas => {
            for area in pipeline.areas()? {
                println!("{area}");
            }
        }
    }
    Ok(())
}

/// A failed dataset load is logged, not fatal: the server still starts and
/// answers every query with a dataset-unavailable error.
fn build_pipeline(config: &Config) -> Pipeline {
    let dataset = match Dataset::load(&config.data) {
        Ok(ds) => Some(Arc::new(ds)),
        Err(e) => {
            error!(path = %config.data.display(), error = %e, "failed to load dataset");
            None
        }
    };
    Pipeline::new(dataset, config.columns.resolve(), summarizer(config))
}

fn summarizer(config: &Config) -> SummaryGenerator {
    let key = config
        .gemini_api_key
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty());
    let Some(key) = key else {
        info!("no Gemini API key, using template summaries");
        return SummaryGenerator::Unconfigured;
    };

    let mut client = GeminiClient::new(key).with_model(config.gemini_model.as_str());
    if let Some(base) = &config.gemini_base_url {
        client = client.with_base_url(base);
    }
    info!(model = client.model(), "Gemini summaries enabled");
    SummaryGenerator::configured(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use realty_ai::SummaryMode;

    fn config(api_key: Option<&str>) -> Config {
        Config {
            data: PathBuf::from("data/sample.csv"),
            gemini_api_key: api_key.map(String::from),
            gemini_model: DEFAULT_MODEL.to_string(),
            gemini_base_url: None,
            columns: ColumnArgs::default(),
        }
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_ask_with_overrides() {
        let cli = Cli::try_parse_from([
            "realty",
            "--data",
            "sales.csv",
            "ask",
            "Wakad prices",
            "--json",
            "--area-column",
            "locality",
        ])
        .unwrap();
        assert_eq!(cli.config.data, PathBuf::from("sales.csv"));
        let columns = cli.config.columns.resolve();
        assert_eq!(columns.area, "locality");
        assert_eq!(columns.year, "year");
        match cli.command {
            Command::Ask { query, json } => {
                assert_eq!(query, "Wakad prices");
                assert!(json);
            }
            other => panic!("expected ask, got {other:?}"),
        }
    }

    #[test]
    fn parse_serve_with_explicit_address() {
        let cli =
            Cli::try_parse_from(["realty", "serve", "--host", "127.0.0.1", "--port", "9001"])
                .unwrap();
        match cli.command {
            Command::Serve { host, port } => {
                assert_eq!(host, IpAddr::from([127, 0, 0, 1]));
                assert_eq!(port, 9001);
            }
            other => panic!("expected serve, got {other:?}"),
        }
    }

    #[test]
    fn serve_address_reads_namespaced_env() {
        let cmd = Cli::command();
        let serve = cmd.find_subcommand("serve").unwrap();
        let env_of = |id: &str| {
            serve
                .get_arguments()
                .find(|a| a.get_id() == id)
                .and_then(|a| a.get_env())
                .and_then(|e| e.to_str())
                .map(String::from)
        };
        // A shell-level HOST holds a hostname, not an address.
        assert_eq!(env_of("host").as_deref(), Some("REALTY_HOST"));
        assert_eq!(env_of("port").as_deref(), Some("REALTY_PORT"));
    }

    #[test]
    fn ask_requires_query() {
        assert!(Cli::try_parse_from(["realty", "ask"]).is_err());
    }

    #[test]
    fn column_defaults() {
        assert_eq!(ColumnArgs::default().resolve(), ColumnNames::default());
    }

    #[test]
    fn summarizer_mode_follows_api_key() {
        assert_eq!(summarizer(&config(None)).mode(), SummaryMode::Mock);
        assert_eq!(summarizer(&config(Some("  "))).mode(), SummaryMode::Mock);
        assert_eq!(summarizer(&config(Some("abc"))).mode(), SummaryMode::Remote);
    }

    #[test]
    fn missing_dataset_still_builds_pipeline() {
        let mut cfg = config(None);
        cfg.data = PathBuf::from("/nonexistent/realestate.parquet");
        let pipeline = build_pipeline(&cfg);
        assert!(!pipeline.health().dataset_loaded);
    }
}
