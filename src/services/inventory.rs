use std::sync::Arc;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{Actor, Permission},
    db::DbPool,
    entities::{product, stock_movement},
    errors::ServiceError,
    events::{Event, EventSender},
};

/// Service owning the product stock ledger and its append-only movement log.
///
/// The two write operations are connection-generic so the order state
/// machine can compose them into its own transaction; they apply no bounds
/// checking, so stock may go negative. Policy, if any, belongs to callers.
#[derive(Clone)]
pub struct InventoryService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl InventoryService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Applies a signed delta to a product's stock quantity as one atomic
    /// in-place UPDATE. The read-modify-write happens inside the database,
    /// so concurrent adjustments to the same product serialize there.
    pub async fn adjust_stock<C: ConnectionTrait>(
        &self,
        conn: &C,
        product_id: Uuid,
        delta: i32,
    ) -> Result<(), ServiceError> {
        let result = product::Entity::update_many()
            .col_expr(
                product::Column::StockQty,
                Expr::col(product::Column::StockQty).add(delta),
            )
            .col_expr(product::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(product::Column::Id.eq(product_id))
            .exec(conn)
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Product {} not found",
                product_id
            )));
        }

        Ok(())
    }

    /// Appends one immutable entry to the stock movement log. Negative
    /// quantity records stock leaving, positive records stock returning.
    pub async fn record_movement<C: ConnectionTrait>(
        &self,
        conn: &C,
        product_id: Uuid,
        quantity: i32,
        created_by: Option<Uuid>,
        notes: &str,
    ) -> Result<stock_movement::Model, ServiceError> {
        let movement = stock_movement::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            quantity: Set(quantity),
            created_by: Set(created_by),
            notes: Set(Some(notes.to_string())),
            created_at: Set(Utc::now()),
        };

        let model = movement.insert(conn).await?;
        Ok(model)
    }

    /// Manual stock correction: adjusts the quantity and records the
    /// movement as one transaction, then emits a `StockAdjusted` event.
    #[instrument(skip(self, actor), fields(product_id = %product_id, delta = delta))]
    pub async fn adjust_stock_with_audit(
        &self,
        product_id: Uuid,
        delta: i32,
        actor: &Actor,
        notes: &str,
    ) -> Result<stock_movement::Model, ServiceError> {
        actor.require(Permission::ProductEdit)?;

        let txn = self.db_pool.begin().await?;
        self.adjust_stock(&txn, product_id, delta).await?;
        let movement = self
            .record_movement(&txn, product_id, delta, actor.user_id, notes)
            .await?;
        txn.commit().await?;

        info!(product_id = %product_id, delta = delta, "stock adjusted manually");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::StockAdjusted {
                    product_id,
                    quantity_delta: delta,
                })
                .await
            {
                warn!(error = %e, product_id = %product_id, "failed to send stock adjusted event");
            }
        }

        Ok(movement)
    }

    /// Products whose stock has fallen below `threshold`, lowest first.
    #[instrument(skip(self))]
    pub async fn low_stock_products(
        &self,
        threshold: i32,
    ) -> Result<Vec<product::Model>, ServiceError> {
        let products = product::Entity::find()
            .filter(product::Column::StockQty.lt(threshold))
            .order_by_asc(product::Column::StockQty)
            .all(&*self.db_pool)
            .await?;

        Ok(products)
    }

    /// The `limit` most recent stock movements, newest first.
    #[instrument(skip(self))]
    pub async fn recent_movements(
        &self,
        limit: u64,
    ) -> Result<Vec<stock_movement::Model>, ServiceError> {
        let movements = stock_movement::Entity::find()
            .order_by_desc(stock_movement::Column::CreatedAt)
            .limit(limit)
            .all(&*self.db_pool)
            .await?;

        Ok(movements)
    }

    /// Movement history for one product, newest first.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn movements_for_product(
        &self,
        product_id: Uuid,
        limit: u64,
    ) -> Result<Vec<stock_movement::Model>, ServiceError> {
        let movements = stock_movement::Entity::find()
            .filter(stock_movement::Column::ProductId.eq(product_id))
            .order_by_desc(stock_movement::Column::CreatedAt)
            .limit(limit)
            .all(&*self.db_pool)
            .await?;

        Ok(movements)
    }

    /// Current stock quantity for a product.
    pub async fn get_stock(&self, product_id: Uuid) -> Result<i32, ServiceError> {
        let product = product::Entity::find_by_id(product_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))?;

        Ok(product.stock_qty)
    }
}
