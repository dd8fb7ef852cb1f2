use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use vitegrenier_scraper::apis::ExtractorRegistry;
use vitegrenier_scraper::logging;
use vitegrenier_scraper::{Config, Pipeline};

#[derive(Parser)]
#[command(name = "vitegrenier_scraper")]
#[command(about = "Collects flea-market announcements from French listing pages")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the TOML config; defaults apply when the file is missing
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a listing page and print the normalized records as JSON
    Run {
        /// Listing page URL, overrides `source_url` from config and env
        #[arg(long)]
        url: Option<String>,
        /// Run-wide cap on detail-page fetches
        #[arg(long)]
        max_detail_fetches: Option<usize>,
        /// Treat the URL as a site home page and follow its listing links
        #[arg(long)]
        site: bool,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// List the registered candidate extractors
    Extractors,
}

fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = if path.exists() {
        Config::load(path).with_context(|| format!("loading {}", path.display()))?
    } else {
        Config::default()
    };
    Ok(config.with_env_overrides()?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _guard = logging::init_logging("logs");
    let cli = Cli::parse();
    let mut config = load_config(&cli.config)?;

    match cli.command {
        Commands::Run {
            url,
            max_detail_fetches,
            site,
            pretty,
        } => {
            if let Some(cap) = max_detail_fetches {
                config.max_detail_fetches = cap;
            }
            let Some(source_url) = url.or_else(|| config.source_url.clone()) else {
                bail!("no listing URL: pass --url or set SOURCE_URL");
            };

            let pipeline = Pipeline::with_defaults(config)?;
            let run = if site {
                pipeline.normalize_site(&source_url).await
            } else {
                pipeline.normalize(&source_url).await
            };
            let records = match run {
                Ok(records) => records,
                Err(e) => {
                    error!("Run failed for {}: {}", source_url, e);
                    return Err(e.into());
                }
            };
            info!("Collected {} records from {}", records.len(), source_url);

            let json = if pretty {
                serde_json::to_string_pretty(&records)?
            } else {
                serde_json::to_string(&records)?
            };
            println!("{}", json);
        }
        Commands::Extractors => {
            let registry = ExtractorRegistry::new(config.max_candidates);
            for name in registry.list_extractors() {
                println!("{}", name);
            }
        }
    }
    Ok(())
}
