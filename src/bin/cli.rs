//! Storefront watcher CLI
//!
//! Local execution entry point. For AWS Lambda, use `watch-lambda`.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use storefront_watch::{
    error::Result,
    models::Config,
    pipeline::WatchOptions,
    runner,
    storage::open_store,
    utils::console,
};

/// Watch a storefront page for added and removed items
#[derive(Parser, Debug)]
#[command(name = "watch", version, about = "Storefront item watcher")]
struct Cli {
    /// TOML config file; environment variables override its values
    #[arg(short, long, default_value = "watch.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl once, notify on changes and store the new snapshot
    Run {
        /// Report changes without notifying or writing the snapshot
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate configuration without touching the network
    Check,

    /// Show the stored snapshot
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn load_config(path: &Path) -> Result<Config> {
    let mut config = if path.exists() {
        Config::load(path)?
    } else {
        log::debug!("No config file at {}, using environment only", path.display());
        Config::default()
    };
    config.apply_env()?;
    Ok(config)
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli.config)?;

    match cli.command {
        Command::Run { dry_run } => {
            console::header(&format!("Watching {}", config.page_url));
            let options = WatchOptions { dry_run };
            match runner::run_configured(&config, options).await {
                Ok(outcome) => console::report(&outcome),
                Err(e) => {
                    log::error!("Watch run failed: {}", e);
                    if e.needs_reconciliation() {
                        log::error!("The notification was delivered; update the snapshot by hand.");
                    }
                    return Err(e);
                }
            }
        }

        Command::Check => {
            config.validate()?;
            log::info!("✓ Config OK");
            log::info!("Page: {}", config.page_url);
            log::info!("Item prefix: {}", config.crawler.item_prefix);
            log::info!("Snapshot: {:?}", config.snapshot.location()?);
            log::info!(
                "Diff mode: {:?}, baseline: {:?}",
                config.policy.diff_mode,
                config.policy.baseline
            );
            if config.notify.needs_decryption() {
                log::info!("Notification settings are encrypted and will be decrypted at run time");
            }
        }

        Command::Info => {
            let store = open_store(&config).await?;
            let urls = store.load().await?;
            console::summary(
                &store.location(),
                &[("Known urls", urls.len().to_string())],
            );
            console::url_list("Snapshot", &urls);
        }
    }

    Ok(())
}
