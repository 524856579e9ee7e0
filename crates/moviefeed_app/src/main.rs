//! Terminal front end for browsing the movie catalog.
mod commands;
mod config;
mod logging;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use feed_logging::feed_info;
use moviefeed_core::FilterSpec;
use moviefeed_engine::{CatalogClient, TmdbCatalogClient};

#[derive(Debug, Parser)]
#[command(name = "moviefeed", about = "Browse and search the movie catalog")]
struct Cli {
    /// RON configuration file (defaults to ./moviefeed.ron when present).
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Page through a filtered discover feed.
    Feed {
        #[arg(long)]
        genre: Option<u32>,
        #[arg(long, default_value = "popularity.desc")]
        sort: String,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long, default_value_t = 2)]
        pages: u32,
    },
    /// Search movies by title.
    Search {
        /// Feed the query one keystroke at a time through the debouncer.
        #[arg(long)]
        typed: bool,
        #[arg(required = true)]
        query: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref())?;
    logging::initialize(config.log.destination, config.log.level_filter());
    feed_info!("Catalog at {}", config.catalog.base_url);

    let client: Arc<dyn CatalogClient> =
        Arc::new(TmdbCatalogClient::new(config.catalog_settings())?);

    match cli.command {
        Command::Feed {
            genre,
            sort,
            year,
            pages,
        } => {
            let mut filters = FilterSpec::new().sorted_by(sort);
            if let Some(genre) = genre {
                filters = filters.with_genre(genre);
            }
            if let Some(year) = year {
                filters = filters.released_in(year);
            }
            commands::run_feed(client, filters, pages.max(1)).await;
        }
        Command::Search { typed, query } => {
            commands::run_search(client, config.search_settings(), query.join(" "), typed).await;
        }
    }
    Ok(())
}
