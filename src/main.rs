use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use m3u_loader::{
    config::Config,
    models::LoadedPlaylist,
    pipeline::PlaylistLoader,
    sources::AccessDeniedPolicy,
};

#[derive(Parser)]
#[command(name = "m3u-loader")]
#[command(version)]
#[command(about = "Fetch an extended M3U playlist and list its entries")]
#[command(long_about = None)]
struct Cli {
    /// Playlist URL
    url: String,

    /// Configuration file path
    #[arg(short, long, default_value = "m3u-loader.toml")]
    config: String,

    /// Log level
    #[arg(short = 'v', long, default_value = "warn")]
    log_level: String,

    /// Print entries as JSON
    #[arg(long)]
    json: bool,

    /// Try the proxies even when the direct fetch answers 401/403
    #[arg(long)]
    cascade_on_access_denied: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("m3u_loader={}", cli.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting m3u-loader v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_from_file(&cli.config)?;
    if cli.cascade_on_access_denied {
        config.fetch.access_denied = AccessDeniedPolicy::Cascade;
    }

    let loader = PlaylistLoader::from_config(&config)?;

    match loader.load_detailed(&cli.url).await {
        Ok(loaded) => {
            print_playlist(&loaded, cli.json)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!("Failed to load playlist: {}", e);
            eprintln!("{}: {}", e.kind(), e.message());
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_playlist(loaded: &LoadedPlaylist, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&loaded.entries)?);
    } else {
        for entry in &loaded.entries {
            println!("{}\t{}", entry.title, entry.url);
        }
    }

    for skipped in &loaded.skipped {
        eprintln!(
            "skipped line {}: {} ({})",
            skipped.line_number, skipped.content, skipped.reason
        );
    }
    eprintln!(
        "{} entries via '{}'",
        loaded.entries.len(),
        loaded.served_by
    );

    Ok(())
}
