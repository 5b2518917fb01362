// Core services
pub mod inventory;
pub mod order_status;
pub mod orders;

// Catalog and customer book
pub mod customers;
pub mod products;

// Read-only aggregation
pub mod dashboard;

use std::sync::Arc;

use crate::{config::AppConfig, db::DbPool, events::EventSender};

/// Bundle of all constructed services, for injection into the presentation
/// layer.
#[derive(Clone)]
pub struct AppServices {
    pub orders: orders::OrderService,
    pub order_status: order_status::OrderStatusService,
    pub inventory: inventory::InventoryService,
    pub products: products::ProductService,
    pub customers: customers::CustomerService,
    pub dashboard: dashboard::DashboardService,
}

impl AppServices {
    pub fn build(
        db_pool: Arc<DbPool>,
        config: AppConfig,
        event_sender: Option<Arc<EventSender>>,
    ) -> Self {
        let inventory = inventory::InventoryService::new(db_pool.clone(), event_sender.clone());

        Self {
            orders: orders::OrderService::new(
                db_pool.clone(),
                config.clone(),
                event_sender.clone(),
            ),
            order_status: order_status::OrderStatusService::new(
                db_pool.clone(),
                inventory.clone(),
                event_sender.clone(),
            ),
            products: products::ProductService::new(
                db_pool.clone(),
                config.clone(),
                event_sender.clone(),
            ),
            customers: customers::CustomerService::new(
                db_pool.clone(),
                config.clone(),
                event_sender,
            ),
            dashboard: dashboard::DashboardService::new(db_pool, config, inventory.clone()),
            inventory,
        }
    }
}
