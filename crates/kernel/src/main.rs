//! Folio server binary.
//!
//! `folio serve` runs the HTTP API; `folio check-catalog` verifies the page
//! type placement rules and prints them.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use axum::http::{HeaderValue, Method};
use clap::{Parser, Subcommand};
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use folio_kernel::catalog::Catalog;
use folio_kernel::config::Config;
use folio_kernel::routes;
use folio_kernel::state::AppState;

/// Content backend for the publisher site.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server (default).
    Serve,
    /// Check page type placement rules and print them.
    CheckCatalog,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    let args = Args::parse();
    let catalog = Catalog::standard();

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(catalog).await,
        Command::CheckCatalog => check_catalog(&catalog),
    }
}

async fn serve(catalog: Catalog) -> Result<()> {
    info!("Starting Folio");

    let defects = catalog.check_consistency();
    if !defects.is_empty() {
        for defect in &defects {
            error!(%defect, "page catalog defect");
        }
        bail!("page catalog has {} defect(s)", defects.len());
    }

    let config = Config::from_env().context("failed to load configuration")?;
    info!(port = config.port, "Configuration loaded");

    let state = AppState::new(&config, Arc::new(catalog))
        .await
        .context("failed to initialize application state")?;

    info!(
        page_types = state.catalog().len(),
        storage = state.storage_backend(),
        "Page catalog loaded"
    );

    let cors = build_cors_layer(&config);
    let app = routes::app(state).layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind to address")?;

    info!(%addr, "Server listening");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

fn check_catalog(catalog: &Catalog) -> Result<()> {
    let mut definitions: Vec<_> = catalog.definitions().collect();
    definitions.sort_by_key(|def| def.kind.as_str());

    for def in definitions {
        let parents: Vec<&str> = def.parent_types.iter().map(|k| k.as_str()).collect();
        let parents = if parents.is_empty() {
            "(root)".to_string()
        } else {
            parents.join(", ")
        };
        println!("{:<28} parents: {parents}", def.kind.as_str());
        if !def.subpage_types.is_empty() {
            println!("{:<28} subpages: {}", "", def.subpage_types.len());
        }
    }

    let defects = catalog.check_consistency();
    if defects.is_empty() {
        println!("catalog OK: {} page types", catalog.len());
        return Ok(());
    }
    for defect in &defects {
        println!("defect: {defect}");
    }
    bail!("page catalog has {} defect(s)", defects.len())
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    if config.cors_allowed_origins.len() == 1 && config.cors_allowed_origins[0] == "*" {
        CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(methods)
            .allow_headers(tower_http::cors::Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_allowed_origins
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(origin = %o, "ignoring unparseable CORS origin");
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(tower_http::cors::Any)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
