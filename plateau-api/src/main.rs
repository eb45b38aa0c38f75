use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use plateau_api::{
    app,
    state::{AppState, AuthConfig, CatalogPaging},
};
use plateau_order::{LogNotifier, OrderService};
use plateau_store::{Config, DbClient, PgCatalogRepository, PgOrderRepository};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "plateau_api=debug,tower_http=debug,axum::rejection=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!(
        "Starting Plateau Potatoes API on port {}",
        config.server.port
    );

    let db = DbClient::new(&config.database.url)
        .await
        .context("Failed to connect to Postgres")?;
    db.migrate().await.context("Failed to run migrations")?;

    let catalog = Arc::new(PgCatalogRepository::new(db.pool.clone()));
    let order_repo = Arc::new(PgOrderRepository::new(db.pool.clone()));
    let service = Arc::new(OrderService::new(
        catalog.clone(),
        order_repo,
        Arc::new(LogNotifier),
    ));

    let app_state = AppState {
        catalog,
        orders: service,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
        paging: CatalogPaging {
            page_size: config.catalog.page_size,
            max_page_size: config.catalog.max_page_size,
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind listener")?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
