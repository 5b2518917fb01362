use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{Actor, Permission},
    config::AppConfig,
    db::DbPool,
    entities::customer::{self, Entity as CustomerEntity},
    errors::ServiceError,
    events::{Event, EventSender},
};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCustomerRequest {
    #[validate(length(min = 1, max = 50, message = "Code must be between 1 and 50 characters"))]
    pub code: String,
    #[validate(length(
        min = 1,
        max = 200,
        message = "Customer name must be between 1 and 200 characters"
    ))]
    pub name: String,
    #[validate(length(max = 20, message = "Phone cannot exceed 20 characters"))]
    pub phone: String,
    pub address: String,
    #[validate(email(message = "Email must be a valid address"))]
    pub email: Option<String>,
    pub opening_balance: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateCustomerRequest {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Customer name must be between 1 and 200 characters"
    ))]
    pub name: Option<String>,
    #[validate(length(max = 20, message = "Phone cannot exceed 20 characters"))]
    pub phone: Option<String>,
    pub address: Option<String>,
    #[validate(email(message = "Email must be a valid address"))]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerSearchQuery {
    /// Substring matched against name or code.
    pub q: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct CustomerListResponse {
    pub customers: Vec<customer::Model>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

/// Customer book CRUD.
#[derive(Clone)]
pub struct CustomerService {
    db_pool: Arc<DbPool>,
    config: AppConfig,
    event_sender: Option<Arc<EventSender>>,
}

impl CustomerService {
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

    #[instrument(skip(self, request, actor), fields(code = %request.code, actor = %actor.username))]
    pub async fn create_customer(
        &self,
        request: CreateCustomerRequest,
        actor: &Actor,
    ) -> Result<customer::Model, ServiceError> {
        actor.require(Permission::CustomerEdit)?;
        request.validate()?;

        let existing = CustomerEntity::find()
            .filter(customer::Column::Code.eq(request.code.clone()))
            .one(&*self.db_pool)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Customer code '{}' already exists",
                request.code
            )));
        }

        let now = Utc::now();
        let model = customer::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(request.code),
            name: Set(request.name),
            phone: Set(request.phone),
            address: Set(request.address),
            email: Set(request.email),
            opening_balance: Set(request.opening_balance.unwrap_or(Decimal::ZERO)),
            created_at: Set(now),
            updated_at: Set(Some(now)),
        };
        let model = model.insert(&*self.db_pool).await?;

        info!(customer_id = %model.id, code = %model.code, "customer created");

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(Event::CustomerCreated(model.id)).await {
                warn!(error = %e, customer_id = %model.id, "failed to send customer created event");
            }
        }

        Ok(model)
    }

    #[instrument(skip(self, request, actor), fields(customer_id = %customer_id, actor = %actor.username))]
    pub async fn update_customer(
        &self,
        customer_id: Uuid,
        request: UpdateCustomerRequest,
        actor: &Actor,
    ) -> Result<customer::Model, ServiceError> {
        actor.require(Permission::CustomerEdit)?;
        request.validate()?;

        let model = CustomerEntity::find_by_id(customer_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Customer {} not found", customer_id))
            })?;

        let mut active: customer::ActiveModel = model.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(phone) = request.phone {
            active.phone = Set(phone);
        }
        if let Some(address) = request.address {
            active.address = Set(address);
        }
        if let Some(email) = request.email {
            active.email = Set(Some(email));
        }
        active.updated_at = Set(Some(Utc::now()));

        let updated = active.update(&*self.db_pool).await?;
        Ok(updated)
    }

    #[instrument(skip(self, actor), fields(customer_id = %customer_id, actor = %actor.username))]
    pub async fn delete_customer(
        &self,
        customer_id: Uuid,
        actor: &Actor,
    ) -> Result<(), ServiceError> {
        actor.require(Permission::CustomerDelete)?;

        let result = CustomerEntity::delete_by_id(customer_id)
            .exec(&*self.db_pool)
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Customer {} not found",
                customer_id
            )));
        }

        info!(customer_id = %customer_id, "customer deleted");
        Ok(())
    }

    pub async fn get_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Option<customer::Model>, ServiceError> {
        let model = CustomerEntity::find_by_id(customer_id)
            .one(&*self.db_pool)
            .await?;
        Ok(model)
    }

    /// Lists customers filtered by name/code substring.
    #[instrument(skip(self, query))]
    pub async fn search_customers(
        &self,
        query: CustomerSearchQuery,
    ) -> Result<CustomerListResponse, ServiceError> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(self.config.default_page_size);

        let mut select = CustomerEntity::find();

        if let Some(q) = query.q.as_deref().filter(|q| !q.is_empty()) {
            select = select.filter(
                Condition::any()
                    .add(customer::Column::Name.contains(q))
                    .add(customer::Column::Code.contains(q)),
            );
        }

        let paginator = select
            .order_by_asc(customer::Column::Name)
            .paginate(&*self.db_pool, per_page);

        let total = paginator.num_items().await?;
        let customers = paginator.fetch_page(page - 1).await?;

        Ok(CustomerListResponse {
            customers,
            total,
            page,
            per_page,
        })
    }
}
