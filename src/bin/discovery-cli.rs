//! Discovery CLI Tool
//!
//! Runs catalog queries, pairing and ratings against a JSON data set (or the
//! built-in demo data) without starting the HTTP service.
//!
//! Usage:
//!   cargo run --bin discovery-cli -- --help
//!   cargo run --bin discovery-cli query venues --rating-min 4.3 --sort price
//!   cargo run --bin discovery-cli query tournaments --fee-band medium
//!   cargo run --bin discovery-cli pair --skill-level advanced
//!   cargo run --bin discovery-cli --data data.json rate venue-1 5
//!   FEE_BAND_LOW_MAX=150 cargo run --bin discovery-cli query tournaments --fee-band low

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use court_finder::catalog::FilterParams;
use court_finder::config::AppConfig;
use court_finder::repository::InMemoryRepository;
use court_finder::service::DiscoveryService;
use court_finder::types::{CatalogKind, RatingObservation, SkillLevel};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "discovery-cli")]
#[command(about = "Query, pair and rate against a court-finder data set")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file; environment variables otherwise
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// JSON data set; overrides the configured data file
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Print compact instead of pretty JSON
    #[arg(long, global = true)]
    compact: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List venues, matches or tournaments
    Query {
        /// venues, matches or tournaments
        kind: CatalogKind,
        #[command(flatten)]
        filters: FilterParams,
    },
    /// Propose pairings for the available players
    Pair {
        /// Only pair players of this level
        #[arg(short, long)]
        skill_level: Option<SkillLevel>,
    },
    /// Submit a star rating (1-5) for a catalog item
    Rate {
        /// Catalog item id
        entity_id: String,
        value: i64,
    },
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    let output = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{}", output);
    Ok(())
}

/// Same configuration sources as the server, with `--data` taking precedence
fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::from_env().context("Failed to load configuration")?,
    };
    if let Some(data) = &cli.data {
        config.discovery.data_file = Some(data.clone());
    }
    Ok(config)
}

fn build_service(config: &AppConfig) -> Result<DiscoveryService> {
    let repository = match &config.discovery.data_file {
        Some(path) => InMemoryRepository::from_json_file(path)
            .with_context(|| format!("Failed to load data set {}", path.display()))?,
        None => InMemoryRepository::demo()?,
    };
    Ok(DiscoveryService::new(Arc::new(repository), &config.discovery))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = load_config(&cli)?;
    let service = build_service(&config)?;

    match cli.command {
        Commands::Query { kind, filters } => {
            let (spec, sort) = filters.into_request()?;
            let items = service.query_catalog(kind, &spec, sort).await?;
            print_json(&items, cli.compact)?;
        }
        Commands::Pair { skill_level } => {
            let proposal = service.propose_pairs(skill_level).await?;
            print_json(&proposal, cli.compact)?;
        }
        Commands::Rate { entity_id, value } => {
            let update = service
                .submit_rating(RatingObservation::new(entity_id, value))
                .await?;
            print_json(&update, cli.compact)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use court_finder::catalog::{FeeBand, FilterSpec, SortKey};

    async fn tournament_ids(config: &AppConfig, band: FeeBand) -> Vec<String> {
        let service = build_service(config).unwrap();
        let spec = FilterSpec::new().with_fee_band(band);
        service
            .query_catalog(CatalogKind::Tournament, &spec, Some(SortKey::Price))
            .await
            .unwrap()
            .into_iter()
            .map(|item| item.id)
            .collect()
    }

    #[tokio::test]
    async fn test_service_uses_configured_fee_bands() {
        let config = AppConfig::from_toml_str(
            r#"
            [discovery.fee_bands]
            low_max = 100.0
            medium_max = 400.0
            "#,
        )
        .unwrap();

        // 200 is low under the default bands but medium here
        assert_eq!(
            tournament_ids(&config, FeeBand::Medium).await,
            vec!["tournament-2"]
        );
        assert_eq!(
            tournament_ids(&AppConfig::default(), FeeBand::Medium).await,
            vec!["tournament-1"]
        );
    }

    #[tokio::test]
    async fn test_service_uses_configured_default_sort() {
        let config = AppConfig::from_toml_str(
            r#"
            [discovery]
            default_sort = "price"
            "#,
        )
        .unwrap();
        let service = build_service(&config).unwrap();

        let listing = service
            .query_catalog(CatalogKind::Tournament, &FilterSpec::new(), None)
            .await
            .unwrap();
        let prices: Vec<f64> = listing.iter().map(|item| item.price).collect();
        assert_eq!(prices, vec![200.0, 500.0, 1000.0]);
    }

    #[test]
    fn test_data_flag_overrides_configured_file() {
        let cli = Cli::parse_from([
            "discovery-cli",
            "--data",
            "/tmp/court-finder-data.json",
            "pair",
        ]);
        let config = load_config(&cli).unwrap();
        assert_eq!(
            config.discovery.data_file,
            Some(PathBuf::from("/tmp/court-finder-data.json"))
        );
    }

    #[test]
    fn test_missing_data_file_is_reported() {
        let mut config = AppConfig::default();
        config.discovery.data_file = Some(PathBuf::from("/nonexistent/court-finder.json"));
        let error = build_service(&config).err().unwrap();
        assert!(error.to_string().contains("Failed to load data set"));
    }
}
