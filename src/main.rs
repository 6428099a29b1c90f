use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

mod config;
mod media;
mod utils;

use config::Config;
use media::{FetchError, MediaFetcher, MediaResult};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Instagram post / reel / story URL to resolve
    url: String,

    /// Path to the config file
    #[arg(short, long)]
    config: Option<String>,

    /// Override the extraction endpoint from the config
    #[arg(long)]
    endpoint: Option<String>,

    /// Save the media file into this directory after resolving
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Extra attempts after a transient failure (network error or garbled reply)
    #[arg(long, default_value_t = 0)]
    retries: u32,
}

fn get_config_path(args: &Args) -> Option<String> {
    if let Some(path) = &args.config {
        return Some(path.clone());
    }

    if let Ok(path) = std::env::var("CONFIG_FILE") {
        return Some(path);
    }

    if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
        let config_path = format!("{}/reelgrab/config.toml", xdg_config_home);
        if std::path::Path::new(&config_path).exists() {
            return Some(config_path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        let config_path = format!("{}/.config/reelgrab/config.toml", home.display());
        if std::path::Path::new(&config_path).exists() {
            return Some(config_path);
        }
    }

    None
}

async fn fetch_with_retries(
    fetcher: &MediaFetcher,
    url: &str,
    retries: u32,
) -> Result<MediaResult, FetchError> {
    let mut attempt = 0;
    loop {
        match fetcher.fetch(url).await {
            Ok(result) => return Ok(result),
            Err(err) if err.is_retryable() && attempt < retries => {
                attempt += 1;
                warn!("Attempt {} failed ({}), retrying", attempt, err);
            }
            Err(err) => return Err(err),
        }
    }
}

fn print_summary(result: &MediaResult) {
    println!(
        "Title:    {}",
        result.title.as_deref().unwrap_or("Instagram Reel")
    );
    println!(
        "Author:   {}",
        result.author.as_deref().unwrap_or("Unknown User")
    );
    println!(
        "Duration: {}",
        result
            .duration_seconds
            .map_or_else(|| "-- seconds".to_string(), |d| format!("{} seconds", d))
    );
    println!(
        "Views:    {}",
        utils::format_count(result.views.unwrap_or(0))
    );
    println!("Quality:  {}", result.quality);
    if let Some(size) = &result.size_label {
        println!("Size:     {}", size);
    }
    println!("URL:      {}", result.media_url);

    if result.variants.len() > 1 {
        println!("Variants:");
        for variant in &result.variants {
            println!("  {:10} {}", variant.quality, variant.url);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = if let Some(config_path) = get_config_path(&args) {
        Config::from_file(&config_path)
            .with_context(|| format!("Failed to load config from {}", config_path))?
    } else {
        Config::default()
    };

    if let Some(endpoint) = &args.endpoint {
        config.api.endpoint = endpoint.clone();
    }

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    if config.get_logging_format() == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    info!("Starting reelgrab...");

    let fetcher = MediaFetcher::new(&config)?;
    let result = fetch_with_retries(&fetcher, args.url.trim(), args.retries).await?;

    print_summary(&result);

    if let Some(dir) = &args.output {
        let path = media::download_to_file(&result, dir).await?;
        println!("Saved to {}", path.display());
    }

    Ok(())
}
