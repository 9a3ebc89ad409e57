//! Phim Search CLI
//!
//! Local entry point: load the catalog, run queries and inspect the
//! snapshot. Query results are printed to stdout as JSON.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use phim_search::{
    MovieSearch,
    error::Result,
    models::{Config, LoadReport, SearchOptions, SearchResult},
    utils::report,
};
use serde::Serialize;

/// Phim Search - movie catalog search index
#[derive(Parser, Debug)]
#[command(
    name = "phim-search",
    version,
    about = "In-memory movie catalog search"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "phim-search.toml")]
    config: PathBuf,

    /// Override the snapshot directory from the configuration
    #[arg(short, long)]
    storage_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Suppress progress and summary output
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the catalog (snapshot, else quick preload or full crawl)
    Init {
        /// Crawl the whole catalog when no snapshot is usable
        #[arg(long)]
        full: bool,
    },

    /// Crawl the whole catalog and write a fresh snapshot
    Crawl {
        /// Ignore and delete the existing snapshot first
        #[arg(long)]
        force: bool,
    },

    /// Search the loaded working set
    Search {
        keyword: String,

        /// Fall back to extended and remote stages when nothing matches
        #[arg(long)]
        staged: bool,

        /// Remote list used as the last stage of a staged search
        #[arg(long, requires = "staged")]
        list: Option<String>,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// Search the working set plus the next block of remote pages
    Extended {
        keyword: String,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// Browse the whole working set with facet filters
    List {
        #[command(flatten)]
        query: QueryArgs,
    },

    /// Fetch one page of a remote list (e.g. phim-bo, phim-le)
    Remote {
        list_slug: String,

        #[command(flatten)]
        query: QueryArgs,
    },

    /// Show working set statistics
    Stats,

    /// Show snapshot and query cache state
    CacheStatus,

    /// Delete stored snapshots
    ClearCache,

    /// Validate the configuration file
    Validate,
}

#[derive(Args, Debug)]
struct QueryArgs {
    #[arg(long, default_value_t = 1)]
    page: usize,

    #[arg(long, default_value_t = 20)]
    limit: usize,

    #[arg(long)]
    category: Option<String>,

    #[arg(long)]
    country: Option<String>,

    #[arg(long)]
    year: Option<String>,

    /// `series` or `single`
    #[arg(long = "type")]
    movie_type: Option<String>,

    /// `modified.time`, `_id` or `year`
    #[arg(long)]
    sort: Option<String>,

    /// `asc` or `desc`
    #[arg(long)]
    sort_type: Option<String>,

    /// Load the whole catalog before querying
    #[arg(long)]
    full: bool,
}

impl QueryArgs {
    fn options(&self) -> SearchOptions {
        SearchOptions {
            page: self.page,
            limit: self.limit,
            category: self.category.clone(),
            country: self.country.clone(),
            year: self.year.clone(),
            movie_type: self.movie_type.clone(),
            sort: self.sort.clone(),
            sort_type: self.sort_type.clone(),
        }
    }
}

/// Initialize logging based on verbosity flag and configured level.
fn init_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_load_report(load: &LoadReport) {
    report::summary(
        "Load",
        &[
            ("Origin", format!("{:?}", load.origin)),
            ("Movies", load.total_movies.to_string()),
            ("From cache", load.from_cache.to_string()),
            (
                "Cache age",
                load.cache_age_secs
                    .map(|s| format!("{s}s"))
                    .unwrap_or_else(|| "-".into()),
            ),
            ("Pages fetched", load.pages_fetched.to_string()),
        ],
    );
    if let Some(error) = &load.error {
        report::warn(&format!("Load error: {}", error));
    }
}

fn print_result_summary(result: &SearchResult) {
    report::summary(
        "Query",
        &[
            ("Mode", result.mode.as_str().to_string()),
            ("Matches", result.total_items.to_string()),
            (
                "Page",
                format!("{}/{}", result.current_page, result.total_pages),
            ),
            ("Searched", result.search_stats.total_movies.to_string()),
        ],
    );
}

async fn load(search: &MovieSearch, full: bool) -> LoadReport {
    let load = if full {
        search
            .load_full_database_with_progress(|p| report::progress(&p))
            .await
    } else {
        search.initialize(false).await
    };
    print_load_report(&load);
    load
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    report::set_quiet(cli.quiet);

    let loaded = Config::load(&cli.config);
    let mut config = match &loaded {
        Ok(config) => config.clone(),
        Err(_) => Config::default(),
    };
    init_logging(cli.verbose, &config.logging.level);
    if let Err(e) = &loaded {
        log::warn!(
            "Config load failed from {}: {}. Using defaults.",
            cli.config.display(),
            e
        );
    }

    if let Some(dir) = &cli.storage_dir {
        config.storage.dir = dir.display().to_string();
    }

    if let Command::Validate = cli.command {
        log::info!("Validating configuration...");
        if let Err(e) = config.validate() {
            log::error!("Config validation failed: {}", e);
            return Err(e);
        }
        log::info!("✓ Config OK ({})", config.source.base_url);
        return Ok(());
    }

    let search = MovieSearch::from_config(config)?;

    match cli.command {
        Command::Init { full } => {
            report::header("Loading movie catalog");
            let loaded = load(&search, full).await;
            print_json(&loaded)?;
        }

        Command::Crawl { force } => {
            report::header("Crawling full catalog");
            if force && !search.clear_persistent_cache().await {
                report::warn("Could not clear the existing snapshot");
            }
            let loaded = load(&search, true).await;
            print_json(&loaded)?;
        }

        Command::Search {
            keyword,
            staged,
            list,
            query,
        } => {
            load(&search, query.full).await;
            let options = query.options();
            let result = if staged {
                search
                    .staged_search(&keyword, &options, list.as_deref())
                    .await
            } else {
                search.instant_search(&keyword, &options).await
            };
            print_result_summary(&result);
            print_json(&result)?;
        }

        Command::Extended { keyword, query } => {
            load(&search, query.full).await;
            let result = search.extended_search(&keyword, &query.options()).await;
            print_result_summary(&result);
            print_json(&result)?;
        }

        Command::List { query } => {
            load(&search, query.full).await;
            let result = search.get_all_movies(&query.options()).await;
            print_result_summary(&result);
            print_json(&result)?;
        }

        Command::Remote { list_slug, query } => {
            let result = search.remote_list(&list_slug, &query.options()).await;
            print_result_summary(&result);
            print_json(&result)?;
        }

        Command::Stats => {
            load(&search, false).await;
            print_json(&search.get_stats().await)?;
        }

        Command::CacheStatus => {
            print_json(&search.get_cache_status().await)?;
        }

        Command::ClearCache => {
            if search.clear_persistent_cache().await {
                report::info("Snapshots cleared");
            } else {
                report::warn("Failed to clear snapshots");
            }
        }

        Command::Validate => {}
    }

    Ok(())
}
