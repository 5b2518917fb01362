use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QuerySelect, Set, TransactionTrait,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{Actor, Permission},
    db::DbPool,
    entities::{
        sales_order::{self, ActiveModel as OrderActiveModel, Entity as OrderEntity},
        sales_order_item, OrderStatus, StockEffect,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::inventory::InventoryService,
};

/// State machine for sales order status transitions.
///
/// A transition is decided by comparing the previously *persisted* status,
/// re-read under an exclusive row lock, against the incoming one. The status
/// write, the per-item stock adjustments, and the movement log entries all
/// commit or roll back as one unit, so a failure on the third item of five
/// leaves no partial deduction behind.
#[derive(Clone)]
pub struct OrderStatusService {
    db_pool: Arc<DbPool>,
    inventory: InventoryService,
    event_sender: Option<Arc<EventSender>>,
}

impl OrderStatusService {
    pub fn new(
        db_pool: Arc<DbPool>,
        inventory: InventoryService,
        event_sender: Option<Arc<EventSender>>,
    ) -> Self {
        Self {
            db_pool,
            inventory,
            event_sender,
        }
    }

    /// Moves an order to `new_status`, applying whatever stock side effect
    /// the transition implies. Writing the current status again is a no-op.
    #[instrument(skip(self, actor), fields(order_id = %order_id, new_status = %new_status, actor = %actor.username))]
    pub async fn set_status(
        &self,
        order_id: Uuid,
        new_status: OrderStatus,
        actor: &Actor,
    ) -> Result<sales_order::Model, ServiceError> {
        actor.require(Permission::OrderChange)?;

        let txn = self.db_pool.begin().await?;

        // The old status must come from durable storage, not from whatever
        // the caller last saw; the row lock serializes concurrent
        // transitions on the same order.
        let order = OrderEntity::find_by_id(order_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let old_status = order.status;

        if old_status == new_status {
            txn.commit().await?;
            return Ok(order);
        }

        let effect = OrderStatus::stock_effect(old_status, new_status);

        if let Some(effect) = effect {
            self.apply_stock_effect(&txn, &order, effect).await?;
        }

        let version = order.version;
        let mut active: OrderActiveModel = order.into();
        active.status = Set(new_status);
        active.updated_at = Set(Some(Utc::now()));
        active.version = Set(version + 1);

        let updated = active.update(&txn).await?;

        txn.commit().await?;

        info!(
            order_id = %order_id,
            old_status = %old_status,
            new_status = %new_status,
            stock_effect = ?effect,
            "order status updated"
        );

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::OrderStatusChanged {
                    order_id,
                    old_status,
                    new_status,
                })
                .await
            {
                warn!(error = %e, order_id = %order_id, "failed to send order status changed event");
            }
        }

        Ok(updated)
    }

    /// Walks the order's line items, adjusting stock and appending one
    /// movement per item, all on the caller's transaction.
    async fn apply_stock_effect(
        &self,
        txn: &sea_orm::DatabaseTransaction,
        order: &sales_order::Model,
        effect: StockEffect,
    ) -> Result<(), ServiceError> {
        let items = sales_order_item::Entity::find()
            .filter(sales_order_item::Column::OrderId.eq(order.id))
            .all(txn)
            .await?;

        for item in items {
            let delta = match effect {
                StockEffect::Deduct => -item.quantity,
                StockEffect::Restore => item.quantity,
            };
            let notes = match effect {
                StockEffect::Deduct => format!("Order {} Confirmed", order.order_number),
                StockEffect::Restore => format!("Order {} Cancelled", order.order_number),
            };

            self.inventory
                .adjust_stock(txn, item.product_id, delta)
                .await?;
            self.inventory
                .record_movement(txn, item.product_id, delta, order.created_by, &notes)
                .await?;
        }

        Ok(())
    }

    /// The persisted status of an order.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_status(&self, order_id: Uuid) -> Result<OrderStatus, ServiceError> {
        let order = OrderEntity::find_by_id(order_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        Ok(order.status)
    }
}
