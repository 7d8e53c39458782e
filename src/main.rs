use std::sync::Arc;

use tokio::sync::broadcast;

use sharptracker::api::router::create_router;
use sharptracker::api::ws_types::WsMessage;
use sharptracker::config::{AppConfig, StoreBackend};
use sharptracker::staging::SessionRegistry;
use sharptracker::store::{CsvFileStore, HttpTableStore, LedgerStore, MemoryStore, PgTableStore};
use sharptracker::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);
    let metrics_handle = sharptracker::metrics::init_metrics()?;

    let store = build_store(&config.store).await?;
    let sessions = Arc::new(SessionRegistry::new(store, config.limits.clone()));

    if !config.auth_enabled() {
        tracing::warn!("API_TOKEN is not set; API is open to anyone who can reach it");
    }

    let (ws_tx, _) = broadcast::channel::<WsMessage>(256);

    let state = AppState {
        sessions,
        config,
        ws_tx,
        metrics_handle,
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}

async fn build_store(backend: &StoreBackend) -> anyhow::Result<Arc<dyn LedgerStore>> {
    let store: Arc<dyn LedgerStore> = match backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; ledger is lost on exit");
            Arc::new(MemoryStore::new())
        }
        StoreBackend::Csv { dir } => {
            tracing::info!(dir = %dir.display(), "Using CSV file store");
            Arc::new(CsvFileStore::new(dir.clone()))
        }
        StoreBackend::Postgres { database_url } => {
            tracing::info!("Connecting to database...");
            let store = PgTableStore::connect(database_url).await?;
            tracing::info!("Database connected");
            Arc::new(store)
        }
        StoreBackend::Http { base_url, api_key } => {
            tracing::info!(base_url = %base_url, "Using remote table store");
            Arc::new(HttpTableStore::new(
                reqwest::Client::new(),
                base_url.clone(),
                api_key.clone(),
            ))
        }
    };
    Ok(store)
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();
}
