use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{Actor, Permission},
    config::AppConfig,
    db::DbPool,
    entities::product::{self, Entity as ProductEntity},
    errors::ServiceError,
    events::{Event, EventSender},
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 50, message = "SKU must be between 1 and 50 characters"))]
    pub sku: String,
    #[validate(length(
        min = 1,
        max = 200,
        message = "Product name must be between 1 and 200 characters"
    ))]
    pub name: String,
    #[validate(length(max = 100, message = "Category cannot exceed 100 characters"))]
    pub category: String,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub stock_qty: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Product name must be between 1 and 200 characters"
    ))]
    pub name: Option<String>,
    #[validate(length(max = 100, message = "Category cannot exceed 100 characters"))]
    pub category: Option<String>,
    pub cost_price: Option<Decimal>,
    pub selling_price: Option<Decimal>,
}

/// Search/filter parameters for the product list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductSearchQuery {
    /// Substring matched against name or SKU.
    pub q: Option<String>,
    /// Substring matched against the category label.
    pub category: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub products: Vec<product::Model>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Catalog CRUD. Stock quantities are owned by the inventory service; this
/// service only seeds the opening quantity at creation.
#[derive(Clone)]
pub struct ProductService {
    db_pool: Arc<DbPool>,
    config: AppConfig,
    event_sender: Option<Arc<EventSender>>,
}

impl ProductService {
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

    #[instrument(skip(self, request, actor), fields(sku = %request.sku, actor = %actor.username))]
    pub async fn create_product(
        &self,
        request: CreateProductRequest,
        actor: &Actor,
    ) -> Result<product::Model, ServiceError> {
        actor.require(Permission::ProductEdit)?;
        request.validate()?;
        validate_prices(request.cost_price, request.selling_price)?;

        let existing = ProductEntity::find()
            .filter(product::Column::Sku.eq(request.sku.clone()))
            .one(&*self.db_pool)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "SKU '{}' already exists",
                request.sku
            )));
        }

        let now = Utc::now();
        let model = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            sku: Set(request.sku),
            name: Set(request.name),
            category: Set(request.category),
            cost_price: Set(request.cost_price),
            selling_price: Set(request.selling_price),
            stock_qty: Set(request.stock_qty),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };
        let model = model.insert(&*self.db_pool).await?;

        info!(product_id = %model.id, sku = %model.sku, "product created");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::ProductCreated(model.id)).await {
                warn!(error = %e, product_id = %model.id, "failed to send product created event");
            }
        }

        Ok(model)
    }

    #[instrument(skip(self, request, actor), fields(product_id = %product_id, actor = %actor.username))]
    pub async fn update_product(
        &self,
        product_id: Uuid,
        request: UpdateProductRequest,
        actor: &Actor,
    ) -> Result<product::Model, ServiceError> {
        actor.require(Permission::ProductEdit)?;
        request.validate()?;

        let model = ProductEntity::find_by_id(product_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))?;

        let cost = request.cost_price.unwrap_or(model.cost_price);
        let selling = request.selling_price.unwrap_or(model.selling_price);
        validate_prices(cost, selling)?;

        let mut active: product::ActiveModel = model.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(category) = request.category {
            active.category = Set(category);
        }
        if let Some(cost_price) = request.cost_price {
            active.cost_price = Set(cost_price);
        }
        if let Some(selling_price) = request.selling_price {
            active.selling_price = Set(selling_price);
        }

        let updated = active.update(&*self.db_pool).await?;
        Ok(updated)
    }

    #[instrument(skip(self, actor), fields(product_id = %product_id, actor = %actor.username))]
    pub async fn delete_product(&self, product_id: Uuid, actor: &Actor) -> Result<(), ServiceError> {
        actor.require(Permission::ProductDelete)?;

        let result = ProductEntity::delete_by_id(product_id)
            .exec(&*self.db_pool)
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Product {} not found",
                product_id
            )));
        }

        info!(product_id = %product_id, "product deleted");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::ProductDeleted(product_id)).await {
                warn!(error = %e, product_id = %product_id, "failed to send product deleted event");
            }
        }

        Ok(())
    }

    pub async fn get_product(&self, product_id: Uuid) -> Result<Option<product::Model>, ServiceError> {
        let model = ProductEntity::find_by_id(product_id)
            .one(&*self.db_pool)
            .await?;
        Ok(model)
    }

    pub async fn get_by_sku(&self, sku: &str) -> Result<Option<product::Model>, ServiceError> {
        let model = ProductEntity::find()
            .filter(product::Column::Sku.eq(sku))
            .one(&*self.db_pool)
            .await?;
        Ok(model)
    }

    /// Lists products filtered by name/SKU substring and category substring.
    #[instrument(skip(self, query))]
    pub async fn search_products(
        &self,
        query: ProductSearchQuery,
    ) -> Result<ProductListResponse, ServiceError> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(self.config.default_page_size);

        let mut select = ProductEntity::find();

        if let Some(q) = query.q.as_deref().filter(|q| !q.is_empty()) {
            select = select.filter(
                Condition::any()
                    .add(product::Column::Name.contains(q))
                    .add(product::Column::Sku.contains(q)),
            );
        }

        if let Some(category) = query.category.as_deref().filter(|c| !c.is_empty()) {
            select = select.filter(product::Column::Category.contains(category));
        }

        let paginator = select
            .order_by_asc(product::Column::Name)
            .paginate(&*self.db_pool, per_page);

        let total = paginator.num_items().await?;
        let products = paginator.fetch_page(page - 1).await?;

        Ok(ProductListResponse {
            products,
            total,
            page,
            per_page,
        })
    }

    /// Distinct category labels, for the list view's filter dropdown.
    pub async fn list_categories(&self) -> Result<Vec<String>, ServiceError> {
        let categories: Vec<String> = ProductEntity::find()
            .select_only()
            .column(product::Column::Category)
            .distinct()
            .order_by_asc(product::Column::Category)
            .into_tuple()
            .all(&*self.db_pool)
            .await?;

        Ok(categories)
    }
}

fn validate_prices(cost_price: Decimal, selling_price: Decimal) -> Result<(), ServiceError> {
    if cost_price < Decimal::ZERO {
        return Err(ServiceError::ValidationError(
            "Cost price cannot be negative".to_string(),
        ));
    }
    if selling_price < Decimal::ZERO {
        return Err(ServiceError::ValidationError(
            "Selling price cannot be negative".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn negative_prices_are_rejected() {
        assert!(validate_prices(dec!(-1), dec!(10)).is_err());
        assert!(validate_prices(dec!(1), dec!(-10)).is_err());
        assert!(validate_prices(Decimal::ZERO, Decimal::ZERO).is_ok());
    }

    #[test]
    fn blank_sku_fails_validation() {
        let request = CreateProductRequest {
            sku: String::new(),
            name: "Widget".to_string(),
            category: "General".to_string(),
            cost_price: dec!(1.00),
            selling_price: dec!(2.00),
            stock_qty: 0,
        };
        assert!(request.validate().is_err());
    }
}
