//! `drradio` CLI - resolve DR radio pages into playable formats

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use drradio::{default_router, DrRadioProvider, MediaRecord, ResolveError, ResolverConfig};

#[derive(Parser)]
#[command(name = "drradio")]
#[command(about = "Resolve DR radio on-demand pages into playable media formats")]
#[command(version)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the provider base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the item id of a page URL (no network access)
    Id {
        /// Page URL
        url: String,
    },

    /// Resolve a page and show its metadata
    Info {
        /// Page URL
        url: String,

        /// Print the full record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve a page and list its formats in sorted order
    Formats {
        /// Page URL
        url: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "drradio=debug" } else { "drradio=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => ResolverConfig::load(path)?,
        None => ResolverConfig::default(),
    };
    if let Some(base_url) = cli.base_url {
        config = config.with_base_url(base_url);
    }

    match cli.command {
        Commands::Id { url } => {
            println!("{}", DrRadioProvider::extract_id(&url)?);
        }
        Commands::Info { url, json } => {
            let record = default_router(&config)?.resolve(&url).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                print_info(&record);
            }
        }
        Commands::Formats { url } => {
            let record = default_router(&config)?.resolve(&url).await?;
            print_formats(&record);
        }
    }

    Ok(())
}

fn report(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<ResolveError>() {
        Some(geo) if geo.is_expected() => {
            eprintln!("🌍 {geo}");
            ExitCode::from(2)
        }
        _ => {
            eprintln!("❌ Could not resolve: {err:#}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn print_info(record: &MediaRecord) {
    println!("📻 {}", record.title);
    println!("   Id: {}", record.id);
    if let Some(ref desc) = record.description {
        println!("   Description: {desc}");
    }
    if let Some(ts) = record.timestamp {
        println!("   Published: {}", ts.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    if let Some(dur) = record.duration {
        let secs = dur.round() as u64;
        println!("   Duration: {}:{:02}", secs / 60, secs % 60);
    }
    println!("   Thumbnail: {}", record.thumbnail);
    println!("   Formats: {}", record.formats.len());
}

fn print_formats(record: &MediaRecord) {
    println!("{:<20} {:<5} {:>7} {:>5} {:<12} URL", "ID", "EXT", "KBIT/S", "PREF", "PROTOCOL");
    for f in &record.formats {
        println!(
            "{:<20} {:<5} {:>7} {:>5} {:<12} {}",
            f.format_id,
            f.ext.as_deref().unwrap_or("-"),
            f.bitrate.map_or_else(|| "-".to_string(), |b| b.to_string()),
            f.preference.map_or_else(|| "-".to_string(), |p| p.to_string()),
            f.protocol.as_deref().unwrap_or("-"),
            f.url
        );
    }
}
