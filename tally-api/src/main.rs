use std::net::SocketAddr;
use std::sync::Arc;
use anyhow::Context;
use tally_api::{app, AppState};
use tally_order::{MockPaymentGateway, ServiceContext, TransitionPolicy};
use tally_store::app_config::Config;
use tally_store::{DbClient, StoreOrderRepository, StoreProductCatalog};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tally_api=debug,tally_order=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Tally API on port {}", config.server.port);

    let db = DbClient::new(&config.database)
        .await
        .context("Failed to connect to Postgres")?;
    if config.database.run_migrations {
        db.migrate().await.context("Failed to run migrations")?;
    }

    let payments = MockPaymentGateway::new(
        config.payment.checkout_base_url.clone(),
        config.payment.success_url.clone(),
        config.payment.cancel_url.clone(),
    );

    let ctx = ServiceContext::new(
        Arc::new(StoreOrderRepository::new(db.pool.clone())),
        Arc::new(StoreProductCatalog::new(db.pool.clone())),
        Arc::new(payments),
    )
    .with_timeouts(config.remote.catalog_timeout(), config.remote.payment_timeout())
    .with_transitions(TransitionPolicy::from_strict_flag(config.orders.strict_transitions));

    let app = app(AppState::new(ctx));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
