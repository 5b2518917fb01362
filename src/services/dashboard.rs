use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde::Serialize;
use tracing::instrument;

use crate::{
    config::AppConfig,
    db::DbPool,
    entities::{customer, product, sales_order, stock_movement},
    errors::ServiceError,
    services::inventory::InventoryService,
};

/// The numbers the back-office landing page shows.
#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub total_products: u64,
    pub total_customers: u64,
    pub orders_today: u64,
    pub low_stock_count: u64,
    pub low_stock_products: Vec<product::Model>,
    pub recent_movements: Vec<stock_movement::Model>,
}

/// Read-only aggregation over the other services' tables.
#[derive(Clone)]
pub struct DashboardService {
    db_pool: Arc<DbPool>,
    config: AppConfig,
    inventory: InventoryService,
}

impl DashboardService {
    pub fn new(db_pool: Arc<DbPool>, config: AppConfig, inventory: InventoryService) -> Self {
        Self {
            db_pool,
            config,
            inventory,
        }
    }

    #[instrument(skip(self))]
    pub async fn summary(&self) -> Result<DashboardSummary, ServiceError> {
        let db = &*self.db_pool;

        let total_products = product::Entity::find().count(db).await?;
        let total_customers = customer::Entity::find().count(db).await?;

        let midnight = Utc::now()
            .date_naive()
            .and_time(chrono::NaiveTime::MIN)
            .and_utc();
        let orders_today = sales_order::Entity::find()
            .filter(sales_order::Column::OrderDate.gte(midnight))
            .count(db)
            .await?;

        let low_stock_products = self
            .inventory
            .low_stock_products(self.config.low_stock_threshold)
            .await?;
        let recent_movements = self
            .inventory
            .recent_movements(self.config.recent_movements_limit)
            .await?;

        Ok(DashboardSummary {
            total_products,
            total_customers,
            orders_today,
            low_stock_count: low_stock_products.len() as u64,
            low_stock_products,
            recent_movements,
        })
    }
}
