use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use deckrec_core::catalog::{CardCatalog, ClashApiClient};
use deckrec_core::recommend::Recommender;

mod routes;

const DEFAULT_PORT: u16 = 8000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_path = dotenvy::dotenv().ok();

    let settings = deckrec_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    // The catalog is fetched exactly once, before the listener binds.
    let source = ClashApiClient::from_settings(&settings)?;
    let catalog = CardCatalog::load(&source).await;
    if catalog.is_empty() {
        tracing::warn!(
            error = catalog.last_error().unwrap_or("empty response"),
            "starting without card data; icons are empty and the AI endpoint is unavailable"
        );
    }

    let llm = deckrec_core::llm::backend_from_settings(&settings)?;
    let recommender = Recommender::new(Arc::new(catalog), llm);

    let static_dir = settings
        .static_dir
        .clone()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/static")));

    let state = routes::AppState {
        recommender: Arc::new(recommender),
        settings: Arc::new(settings),
        env_path: env_path.map(Arc::new),
        static_dir: Arc::new(static_dir),
    };

    let app = routes::router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &deckrec_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
