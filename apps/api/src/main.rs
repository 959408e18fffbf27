mod config;
mod errors;
mod layout;
mod routes;
mod settings;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::layout::FontRegistry;
use crate::routes::build_router;
use crate::settings::SettingsStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting gridprint v{}", env!("CARGO_PKG_VERSION"));

    // Fonts folder must exist before it is scanned.
    std::fs::create_dir_all(&config.fonts_dir).with_context(|| {
        format!(
            "Failed to create fonts folder {}",
            config.fonts_dir.display()
        )
    })?;
    let fonts = FontRegistry::load_dir(&config.fonts_dir, config.default_font.as_deref())?;

    let settings = SettingsStore::open(&config.settings_dir)?;
    info!(
        "Settings presets in {} ({} found)",
        settings.dir().display(),
        settings.list()?.len()
    );

    let state = AppState {
        config: config.clone(),
        fonts: Arc::new(fonts),
        settings: Arc::new(settings),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
