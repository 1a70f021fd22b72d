//! Event ticket catalog HTTP server.
//!
//! Serves the catalog under `/api/event-tickets` from the store picked in configuration.

use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ticketdesk::{
    api::{build_router, TICKETS_PATH},
    bootstrap::{ensure_indexes, seed_from_file},
    catalog::TicketCatalog,
    config::{Config, StoreKind},
    memory::InMemoryStore,
    store::{DocumentStore, DynDocumentStore, IntoDynDocumentStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is optional
    let dotenv = dotenvy::dotenv();

    let config = Config::from_env().context("invalid configuration")?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_new(&config.log_filter)
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Ok(path) = dotenv {
        info!(path = %path.display(), "Loaded environment file");
    }

    info!(
        address = %config.bind_address(),
        store = %config.store,
        display_offset = ?config.display_offset,
        "Configuration loaded"
    );

    let store = Arc::new(connect(&config).await?);

    ensure_indexes(&store)
        .await
        .context("failed to prepare the event ticket collection")?;

    if let Some(path) = &config.seed_file {
        if config.store == StoreKind::MongoDb {
            warn!(path = %path.display(), "Seeding a MongoDB store, documents are inserted as new tickets");
        }
        seed_from_file(&store, path)
            .await
            .with_context(|| format!("failed to seed from {}", path.display()))?;
    }

    let mut catalog = TicketCatalog::new(store.clone());
    if let Some(offset) = config.display_offset {
        catalog = catalog.with_display_zone(offset);
    }

    let listener = tokio::net::TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address()))?;
    info!(address = %config.bind_address(), path = TICKETS_PATH, "Listening");

    axum::serve(listener, build_router(catalog))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router and its clones of the catalog are gone once serve returns
    match Arc::try_unwrap(store) {
        Ok(store) => store.shutdown().await?,
        Err(_) => warn!("Store still in use, skipping shutdown"),
    }

    info!("Server stopped");
    Ok(())
}

async fn connect(config: &Config) -> anyhow::Result<DynDocumentStore> {
    match config.store {
        StoreKind::Memory => {
            info!("Using in-memory store");
            Ok(DocumentStore::new(InMemoryStore::new()).into_dyn())
        }
        #[cfg(feature = "mongodb")]
        StoreKind::MongoDb => {
            use ticketdesk::{backend::StoreBackendBuilder, mongodb::MongoDbStore};

            info!(database = %config.mongodb_database, "Connecting to MongoDB");
            let backend = MongoDbStore::builder(&config.mongodb_uri, &config.mongodb_database)
                .build()
                .await
                .context("failed to connect to MongoDB")?;

            Ok(DocumentStore::new(backend).into_dyn())
        }
        #[cfg(not(feature = "mongodb"))]
        StoreKind::MongoDb => {
            anyhow::bail!("TICKETDESK_STORE=mongodb requires building with the `mongodb` feature")
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
