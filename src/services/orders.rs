use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{Actor, Permission},
    config::AppConfig,
    db::DbPool,
    entities::{
        customer, order_counter,
        sales_order::{self, ActiveModel as OrderActiveModel, Entity as OrderEntity},
        sales_order_item::{self, Entity as OrderItemEntity},
        product, OrderStatus,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};

/// One requested line on a new order.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderItemRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be a positive integer"))]
    pub quantity: i32,
}

/// Request to create an order together with its line items.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateOrderRequest {
    pub customer_id: Uuid,
    #[validate(length(min = 1, message = "Order must contain at least one item"))]
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_number: String,
    pub customer_id: Uuid,
    pub status: OrderStatus,
    pub order_date: chrono::DateTime<Utc>,
    pub created_by: Option<Uuid>,
    pub total_amount: Decimal,
    pub version: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total: Decimal,
}

/// An order with its line items, as returned by creation and detail reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetails {
    pub order: OrderResponse,
    pub items: Vec<OrderItemResponse>,
}

/// Search/filter parameters for the order list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderSearchQuery {
    /// Substring matched against the order number or the customer name.
    pub q: Option<String>,
    pub status: Option<OrderStatus>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    pub orders: Vec<OrderResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Service for creating, reading, and deleting sales orders.
#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
    config: AppConfig,
    event_sender: Option<Arc<EventSender>>,
}

impl OrderService {
    pub fn new(
        db_pool: Arc<DbPool>,
        config: AppConfig,
        event_sender: Option<Arc<EventSender>>,
    ) -> Self {
        Self {
            db_pool,
            config,
            event_sender,
        }
    }

    /// Creates an order and its line items as one atomic unit.
    ///
    /// Inside a single transaction: the next order number is allocated from
    /// the locked counter row, the order is inserted as PENDING, every item
    /// snapshots the product's current selling price, and the accumulated
    /// total is written back to the header. Any failure rolls the whole
    /// thing back, so no half-created order is ever visible.
    #[instrument(skip(self, request, actor), fields(customer_id = %request.customer_id, actor = %actor.username))]
    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
        actor: &Actor,
    ) -> Result<OrderDetails, ServiceError> {
        actor.require(Permission::OrderCreate)?;
        request.validate()?;
        for item in &request.items {
            item.validate()?;
        }

        let txn = self.db_pool.begin().await?;
        let now = Utc::now();
        let order_id = Uuid::new_v4();

        customer::Entity::find_by_id(request.customer_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Customer {} not found", request.customer_id))
            })?;

        let order_number = self.allocate_order_number(&txn).await?;

        let order = OrderActiveModel {
            id: Set(order_id),
            order_number: Set(order_number.clone()),
            customer_id: Set(request.customer_id),
            order_date: Set(now),
            created_by: Set(actor.user_id),
            status: Set(OrderStatus::Pending),
            total_amount: Set(Decimal::ZERO),
            created_at: Set(now),
            updated_at: Set(Some(now)),
            version: Set(1),
        };
        let order = order.insert(&txn).await?;

        let mut total = Decimal::ZERO;
        let mut items = Vec::with_capacity(request.items.len());

        for item in &request.items {
            let product = product::Entity::find_by_id(item.product_id)
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Product {} not found", item.product_id))
                })?;

            // Snapshot the selling price; later catalog edits must not
            // reprice already-sold lines.
            let unit_price = product.selling_price;
            let line_total = unit_price * Decimal::from(item.quantity);

            let item_model = sales_order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                product_id: Set(item.product_id),
                quantity: Set(item.quantity),
                unit_price: Set(unit_price),
                total: Set(line_total),
                created_at: Set(now),
                updated_at: Set(Some(now)),
            };
            let item_model = item_model.insert(&txn).await?;

            total += item_model.total;
            items.push(item_model);
        }

        if total <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "Order total must be positive, got {}",
                total
            )));
        }

        let mut active: OrderActiveModel = order.into();
        active.total_amount = Set(total);
        let order = active.update(&txn).await?;

        txn.commit().await?;

        info!(
            order_id = %order_id,
            order_number = %order_number,
            total = %total,
            item_count = items.len(),
            "order created"
        );

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::OrderCreated(order_id)).await {
                warn!(error = %e, order_id = %order_id, "failed to send order created event");
            }
        }

        Ok(OrderDetails {
            order: order_to_response(order),
            items: items.into_iter().map(item_to_response).collect(),
        })
    }

    /// Claims the next value from the single-row order number counter.
    /// The exclusive lock serializes concurrent allocations.
    async fn allocate_order_number(
        &self,
        txn: &sea_orm::DatabaseTransaction,
    ) -> Result<String, ServiceError> {
        let counter = order_counter::Entity::find_by_id(1)
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or_else(|| {
                ServiceError::InternalError("order number counter row is missing".to_string())
            })?;

        let next = counter.last_value + 1;

        let mut active: order_counter::ActiveModel = counter.into();
        active.last_value = Set(next);
        active.update(txn).await?;

        Ok(format_order_number(
            &self.config.order_number_prefix,
            self.config.order_number_width,
            next,
        ))
    }

    /// Fetches an order with its line items.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: Uuid) -> Result<Option<OrderDetails>, ServiceError> {
        let order = OrderEntity::find_by_id(order_id).one(&*self.db_pool).await?;

        let Some(order) = order else {
            return Ok(None);
        };

        let items = OrderItemEntity::find()
            .filter(sales_order_item::Column::OrderId.eq(order_id))
            .order_by_asc(sales_order_item::Column::CreatedAt)
            .all(&*self.db_pool)
            .await?;

        Ok(Some(OrderDetails {
            order: order_to_response(order),
            items: items.into_iter().map(item_to_response).collect(),
        }))
    }

    /// Lists orders newest-first, filtered by order number / customer name
    /// substring and by status.
    #[instrument(skip(self, query))]
    pub async fn search_orders(
        &self,
        query: OrderSearchQuery,
    ) -> Result<OrderListResponse, ServiceError> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(self.config.default_page_size);

        let mut select = OrderEntity::find();

        if let Some(q) = query.q.as_deref().filter(|q| !q.is_empty()) {
            select = select.inner_join(customer::Entity).filter(
                Condition::any()
                    .add(sales_order::Column::OrderNumber.contains(q))
                    .add(customer::Column::Name.contains(q)),
            );
        }

        if let Some(status) = query.status {
            select = select.filter(sales_order::Column::Status.eq(status));
        }

        let paginator = select
            .order_by_desc(sales_order::Column::OrderDate)
            .order_by_desc(sales_order::Column::CreatedAt)
            .paginate(&*self.db_pool, per_page);

        let total = paginator.num_items().await?;
        let orders = paginator.fetch_page(page - 1).await?;

        Ok(OrderListResponse {
            orders: orders.into_iter().map(order_to_response).collect(),
            total,
            page,
            per_page,
        })
    }

    /// Deletes an order; line items go with it via the cascade. The order's
    /// number is never handed out again because the counter only moves
    /// forward.
    #[instrument(skip(self, actor), fields(order_id = %order_id, actor = %actor.username))]
    pub async fn delete_order(&self, order_id: Uuid, actor: &Actor) -> Result<(), ServiceError> {
        actor.require(Permission::OrderDelete)?;

        let result = OrderEntity::delete_by_id(order_id)
            .exec(&*self.db_pool)
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Order {} not found",
                order_id
            )));
        }

        info!(order_id = %order_id, "order deleted");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::OrderDeleted(order_id)).await {
                warn!(error = %e, order_id = %order_id, "failed to send order deleted event");
            }
        }

        Ok(())
    }
}

fn order_to_response(model: sales_order::Model) -> OrderResponse {
    OrderResponse {
        id: model.id,
        order_number: model.order_number,
        customer_id: model.customer_id,
        status: model.status,
        order_date: model.order_date,
        created_by: model.created_by,
        total_amount: model.total_amount,
        version: model.version,
    }
}

fn item_to_response(model: sales_order_item::Model) -> OrderItemResponse {
    OrderItemResponse {
        id: model.id,
        product_id: model.product_id,
        quantity: model.quantity,
        unit_price: model.unit_price,
        total: model.total,
    }
}

/// Formats a sequence value as `PREFIX-NNNN`, zero-padded to `width`.
fn format_order_number(prefix: &str, width: usize, sequence: i64) -> String {
    format!("{}-{:0width$}", prefix, sequence, width = width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_numbers_are_zero_padded() {
        assert_eq!(format_order_number("ORD", 4, 1), "ORD-0001");
        assert_eq!(format_order_number("ORD", 4, 42), "ORD-0042");
        assert_eq!(format_order_number("ORD", 4, 9999), "ORD-9999");
    }

    #[test]
    fn order_numbers_outgrow_the_padding_without_truncation() {
        assert_eq!(format_order_number("ORD", 4, 10001), "ORD-10001");
    }

    #[test]
    fn order_number_prefix_is_configurable() {
        assert_eq!(format_order_number("SO", 6, 7), "SO-000007");
    }

    #[test]
    fn empty_item_list_fails_validation() {
        let request = CreateOrderRequest {
            customer_id: Uuid::new_v4(),
            items: vec![],
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn non_positive_quantity_fails_validation() {
        let item = OrderItemRequest {
            product_id: Uuid::new_v4(),
            quantity: 0,
        };
        assert!(item.validate().is_err());

        let item = OrderItemRequest {
            product_id: Uuid::new_v4(),
            quantity: -3,
        };
        assert!(item.validate().is_err());
    }
}
