use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use salesdesk_api::{
    auth::{Actor, Role},
    config::AppConfig,
    db::{self, DbConfig},
    entities::{customer, product},
    events,
    services::{customers::CreateCustomerRequest, products::CreateProductRequest},
    AppState,
};

/// Harness wrapping an application state backed by an in-memory SQLite
/// database with the full migration set applied.
pub struct TestApp {
    pub state: AppState,
    pub admin: Actor,
    pub sales: Actor,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Constructs a fresh application with its own empty database.
    pub async fn new() -> Self {
        // A single connection keeps the in-memory database alive and shared
        // for the lifetime of the test.
        let db_config = DbConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        };

        let pool = db::establish_connection_with_config(&db_config)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations");

        let (event_sender, event_rx) = events::channel(256);
        let event_task = tokio::spawn(events::log_events(event_rx));

        let config = AppConfig {
            database_url: db_config.url.clone(),
            ..Default::default()
        };

        let state = AppState::new(Arc::new(pool), config, Some(Arc::new(event_sender)));

        Self {
            state,
            admin: Actor::new(Uuid::new_v4(), "admin", Role::Admin),
            sales: Actor::new(Uuid::new_v4(), "pat", Role::SalesUser),
            _event_task: event_task,
        }
    }

    /// Inserts a product through the catalog service.
    pub async fn seed_product(
        &self,
        sku: &str,
        name: &str,
        selling_price: Decimal,
        stock_qty: i32,
    ) -> product::Model {
        self.state
            .services
            .products
            .create_product(
                CreateProductRequest {
                    sku: sku.to_string(),
                    name: name.to_string(),
                    category: "General".to_string(),
                    cost_price: selling_price / Decimal::from(2),
                    selling_price,
                    stock_qty,
                },
                &self.admin,
            )
            .await
            .expect("failed to seed product")
    }

    /// Inserts a customer through the customer service.
    pub async fn seed_customer(&self, code: &str, name: &str) -> customer::Model {
        self.state
            .services
            .customers
            .create_customer(
                CreateCustomerRequest {
                    code: code.to_string(),
                    name: name.to_string(),
                    phone: "555-0100".to_string(),
                    address: "1 Main St".to_string(),
                    email: None,
                    opening_balance: None,
                },
                &self.admin,
            )
            .await
            .expect("failed to seed customer")
    }
}
