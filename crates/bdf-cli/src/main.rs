use std::sync::Arc;

use anyhow::Result;
use bdf_agg::{AggregatorConfig, DealQueryRequest, DealService};
use bdf_store::CuratedDealStore;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "bdf-cli")]
#[command(about = "Bargain Deal Finder command-line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one aggregation pass and print the merged deals.
    Fetch {
        #[arg(long)]
        query: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Serve the JSON API (with periodic auto-refresh).
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Commands::Fetch {
        query: None,
        category: None,
        limit: None,
    }) {
        Commands::Fetch {
            query,
            category,
            limit,
        } => {
            let curated_path = std::env::var("BDF_CURATED_PATH")
                .unwrap_or_else(|_| "curated.json".to_string());
            let store = Arc::new(CuratedDealStore::load(curated_path).await?);
            let service = DealService::new(AggregatorConfig::from_env(), store);

            let page = service
                .get_deals(&DealQueryRequest {
                    query,
                    category,
                    platform: None,
                    limit,
                    use_cache: false,
                })
                .await?;

            println!("fetched {} deals after dedup", page.total_results);
            for deal in &page.deals {
                println!(
                    "  [{:>3}%] {} on {} ({} -> {})",
                    deal.discount_percentage,
                    deal.title,
                    deal.platform,
                    deal.original_price,
                    deal.discounted_price
                );
            }
        }
        Commands::Serve { port } => {
            bdf_web::serve(port).await?;
        }
    }

    Ok(())
}
