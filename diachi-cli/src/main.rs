//! Diachi CLI
//!
//! Runs the address service and offers one-shot lookups against the same
//! providers for diagnosing configuration.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use diachi_api::{ApiConfig, ApiServer, AppState};
use diachi_core::traits::{Geocoder, StreetSuggester};
use diachi_core::types::StreetQuery;

/// Diachi - Vietnamese address lookup, geocoding and street autocomplete
#[derive(Parser)]
#[command(name = "diachi")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API server
    Serve {
        /// Port to listen on (defaults to PORT, then 5000)
        #[arg(short, long)]
        port: Option<u16>,
        /// Bind address
        #[arg(short, long, default_value = "0.0.0.0")]
        bind: String,
    },

    /// Geocode an address
    Geocode {
        /// Free-form address
        address: String,
        /// Print the provider's raw diagnostic payload instead
        #[arg(short, long)]
        diagnose: bool,
    },

    /// Suggest street names
    Streets {
        /// Partial street name
        query: String,
        /// Ward code
        #[arg(long, default_value = "")]
        ward: String,
        /// District code
        #[arg(long, default_value = "")]
        district: String,
        /// Province code
        #[arg(long, default_value = "")]
        province: String,
    },

    /// List provinces
    Provinces {
        /// 1 = provinces only, 2 = with districts
        #[arg(short, long, default_value = "1")]
        depth: u8,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ApiConfig::from_env();

    // Initialize logging
    let filter = if cli.verbose || !config.is_production() {
        "diachi=debug,info"
    } else {
        "diachi=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Serve { port, bind } => cmd_serve(config, port, &bind).await,
        Commands::Geocode { address, diagnose } => cmd_geocode(config, &address, diagnose).await,
        Commands::Streets {
            query,
            ward,
            district,
            province,
        } => {
            let request = StreetQuery::new(query)
                .ward(ward)
                .district(district)
                .province(province);
            cmd_streets(config, &request).await
        }
        Commands::Provinces { depth } => cmd_provinces(config, depth).await,
    }
}

fn build_state(config: ApiConfig) -> Result<AppState> {
    AppState::new(config).context("Failed to initialise provider clients")
}

/// Run the API server
async fn cmd_serve(config: ApiConfig, port: Option<u16>, bind: &str) -> Result<()> {
    let port = port.unwrap_or(config.port);

    println!("{}", "🚀 Starting diachi API server...".cyan().bold());
    println!("   {} http://{}:{}", "Listening on:".green(), bind, port);
    println!("   {} http://{}:{}/api/health", "Health check:".dimmed(), bind, port);
    println!("   {} {}", "Environment:".dimmed(), config.environment);
    for key in config.missing_keys() {
        println!("   {} {} is not set", "⚠️ ".yellow(), key);
    }
    println!("\n   Press Ctrl+C to stop.\n");

    let server = ApiServer::new(config).context("Failed to initialise provider clients")?;

    let addr: SocketAddr = format!("{}:{}", bind, port).parse()?;
    server.run(addr).await?;

    Ok(())
}

/// Geocode one address
async fn cmd_geocode(config: ApiConfig, address: &str, diagnose: bool) -> Result<()> {
    println!("{} {}", "📍 Geocoding:".cyan().bold(), address);
    let state = build_state(config)?;

    if diagnose {
        let diagnostic = state
            .geocoder
            .test_geocode(address)
            .await
            .context("Geocoder diagnostic failed")?;
        println!("{}", serde_json::to_string_pretty(&diagnostic)?);
        return Ok(());
    }

    let coordinates = state
        .geocoder
        .geocode(address)
        .await
        .context("Failed to geocode address")?;

    println!("\n{}", "✅ Found:".green().bold());
    println!("   {} {}", "Latitude:".dimmed(), coordinates.lat);
    println!("   {} {}", "Longitude:".dimmed(), coordinates.lng);

    Ok(())
}

/// Suggest streets for a partial name
async fn cmd_streets(config: ApiConfig, request: &StreetQuery) -> Result<()> {
    println!("{} {}", "🔍 Searching streets:".cyan().bold(), request.query);
    let state = build_state(config)?;

    let suggestions = state.suggester.suggest(request).await;
    if suggestions.is_empty() {
        println!("\n{}", "No suggestions.".yellow());
        return Ok(());
    }

    println!("\n{}", format!("✅ {} suggestion(s):", suggestions.len()).green().bold());
    for (i, name) in suggestions.iter().enumerate() {
        println!("   {:>2}. {}", i + 1, name);
    }

    Ok(())
}

/// List provinces
async fn cmd_provinces(config: ApiConfig, depth: u8) -> Result<()> {
    let state = build_state(config)?;

    let provinces = state
        .provinces
        .list_provinces(depth)
        .await
        .context("Failed to fetch provinces")?;

    let Some(list) = provinces.as_array() else {
        println!("{}", serde_json::to_string_pretty(&provinces)?);
        return Ok(());
    };

    println!("{}", format!("🏙️  {} provinces", list.len()).cyan().bold());
    for province in list {
        let code = &province["code"];
        let name = province["name"].as_str().unwrap_or("?");
        println!("   {:>3}  {}", code, name);

        if let Some(districts) = province["districts"].as_array() {
            for district in districts {
                let name = district["name"].as_str().unwrap_or("?");
                println!("          {} {}", "-".dimmed(), name);
            }
        }
    }

    Ok(())
}
