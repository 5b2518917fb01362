use std::sync::Arc;

use tracing::info;

use salesdesk_api as api;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = api::config::AppConfig::load()?;
    api::logging::init_tracing(&cfg);

    let db_pool = api::db::establish_connection(&cfg.database_url).await?;
    api::db::run_migrations(&db_pool).await?;

    let db_arc = Arc::new(db_pool);

    let (event_sender, event_rx) = api::events::channel(1024);
    tokio::spawn(api::events::log_events(event_rx));

    let state = api::AppState::new(db_arc, cfg, Some(Arc::new(event_sender)));

    let summary = state.services.dashboard.summary().await?;
    info!(
        total_products = summary.total_products,
        total_customers = summary.total_customers,
        orders_today = summary.orders_today,
        low_stock_count = summary.low_stock_count,
        "salesdesk ready"
    );

    Ok(())
}
