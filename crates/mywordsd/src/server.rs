//! HTTP server wiring

use anyhow::{Context, Result};
use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    middleware,
    routing::{get, post},
};
use mywords_core::traits::{IdentityProvider, TextOracle};
use mywords_core::{LookupService, ProviderRegistry, RouteGate, StoryService};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::{middleware as gate, routes};

/// Application state shared across handlers
pub struct AppState {
    pub identity: Arc<dyn IdentityProvider>,
    pub lookup: LookupService,
    pub story: StoryService,
    pub gate: RouteGate,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        oracle: Arc<dyn TextOracle>,
        meaning_language: &str,
    ) -> Self {
        Self {
            identity,
            lookup: LookupService::new(oracle.clone()).with_meaning_language(meaning_language),
            story: StoryService::new(oracle).with_target_language(meaning_language),
            gate: RouteGate::default(),
        }
    }
}

/// Build the router: API routes, the auth callback and an optional static frontend
pub fn router(state: SharedState, static_dir: Option<&Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let mut app = Router::new()
        .route("/api/word", get(routes::word_handler))
        .route("/api/generate-story", post(routes::story_handler))
        .route("/auth/callback", get(routes::auth_callback_handler));

    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(middleware::from_fn_with_state(state.clone(), gate::gate))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Create backends from configuration and serve until a shutdown signal
pub async fn run(config: Config) -> Result<()> {
    let core = config.core();

    let registry = ProviderRegistry::new();
    mywords_provider_supabase::register(&registry);
    mywords_oracle_deepseek::register(&registry);

    let identity = registry
        .create_identity_provider(&core.backend)
        .context("Failed to create identity provider")?;
    let oracle = registry
        .create_oracle(&core.oracle)
        .context("Failed to create text oracle")?;

    info!(
        identity = identity.provider_name(),
        oracle = oracle.oracle_name(),
        language = %core.client.meaning_language,
        "Backends ready"
    );

    let state = Arc::new(AppState::new(
        identity,
        oracle,
        &core.client.meaning_language,
    ));
    let app = router(state, config.static_dir.as_deref());

    let address = config.socket_addr()?;
    let listener = TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, shutting down"),
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received SIGTERM, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
