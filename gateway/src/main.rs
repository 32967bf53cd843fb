use anyhow::{Context, Result};
use clap::Parser;
use flag_lookup::{AliasTable, FlagClient, FlagResolver};
use nation_ranker::{choropleth, loader};
use tower_http::services::ServeDir;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod routes;

use config::GatewayConfig;
use routes::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "nation_gateway=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GatewayConfig::parse();

    let records = loader::load_records(&config.data)
        .with_context(|| format!("loading {}", config.data.display()))?;
    tracing::info!("   Loaded {} country rows", records.len());

    let aliases = match &config.aliases {
        Some(path) => AliasTable::load(path)
            .with_context(|| format!("loading aliases {}", path.display()))?,
        None => AliasTable::default(),
    };
    tracing::info!("   {} flag aliases", aliases.len());

    let client = FlagClient::new(config.flag_client())?;
    tracing::info!("   Flag directory: {}", client.config().base_url);

    let mut state = AppState::new(
        records,
        FlagResolver::new(client, aliases),
        config.display(),
        config.name_property.clone(),
    );

    if let Some(path) = &config.geometry {
        let geometry = choropleth::load_geometry(path)
            .with_context(|| format!("loading geometry {}", path.display()))?;
        state = state.with_geometry(geometry);
    } else {
        tracing::warn!("   No geometry configured - /api/v1/map returns the series only");
    }

    state.render_initial().await;

    let api_routes = routes::api_routes(state);

    // Static file serving for UI (if dist exists)
    let app = if config.ui_dir.exists() {
        tracing::info!("   Serving UI from {}", config.ui_dir.display());
        api_routes.fallback_service(ServeDir::new(&config.ui_dir))
    } else {
        api_routes
    };

    let addr = format!("0.0.0.0:{}", config.resolved_port());
    tracing::info!("Nation Gateway starting on {}", addr);
    tracing::info!(
        "   Lists: {} entries, score field {:?}",
        config.list_size,
        config.score_field
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
