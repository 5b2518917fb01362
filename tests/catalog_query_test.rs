mod common;

use assert_matches::assert_matches;
use rust_decimal_macros::dec;

use common::TestApp;
use salesdesk_api::{
    entities::OrderStatus,
    errors::ServiceError,
    services::{
        customers::CustomerSearchQuery,
        orders::{CreateOrderRequest, OrderItemRequest, OrderSearchQuery},
        products::{CreateProductRequest, ProductSearchQuery},
    },
};

#[tokio::test]
async fn duplicate_sku_is_rejected() {
    let app = TestApp::new().await;
    app.seed_product("SKU-1", "Widget", dec!(10), 5).await;

    let duplicate = app
        .state
        .services
        .products
        .create_product(
            CreateProductRequest {
                sku: "SKU-1".to_string(),
                name: "Other Widget".to_string(),
                category: "General".to_string(),
                cost_price: dec!(1),
                selling_price: dec!(2),
                stock_qty: 0,
            },
            &app.admin,
        )
        .await;
    assert_matches!(duplicate, Err(ServiceError::Conflict(_)));
}

#[tokio::test]
async fn duplicate_customer_code_is_rejected() {
    let app = TestApp::new().await;
    app.seed_customer("C001", "Acme Traders").await;

    let duplicate = app
        .state
        .services
        .customers
        .create_customer(
            salesdesk_api::services::customers::CreateCustomerRequest {
                code: "C001".to_string(),
                name: "Copycat".to_string(),
                phone: String::new(),
                address: String::new(),
                email: None,
                opening_balance: None,
            },
            &app.admin,
        )
        .await;
    assert_matches!(duplicate, Err(ServiceError::Conflict(_)));
}

#[tokio::test]
async fn product_search_matches_name_sku_and_category() {
    let app = TestApp::new().await;
    let products = &app.state.services.products;

    for (sku, name, category) in [
        ("PEN-01", "Blue Pen", "Stationery"),
        ("PEN-02", "Red Pen", "Stationery"),
        ("NB-01", "Notebook", "Stationery"),
        ("USB-01", "USB Cable", "Electronics"),
    ] {
        products
            .create_product(
                CreateProductRequest {
                    sku: sku.to_string(),
                    name: name.to_string(),
                    category: category.to_string(),
                    cost_price: dec!(1),
                    selling_price: dec!(2),
                    stock_qty: 10,
                },
                &app.admin,
            )
            .await
            .unwrap();
    }

    let by_name = products
        .search_products(ProductSearchQuery {
            q: Some("Pen".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_name.total, 2);

    let by_sku = products
        .search_products(ProductSearchQuery {
            q: Some("USB".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_sku.total, 1);
    assert_eq!(by_sku.products[0].name, "USB Cable");

    let by_category = products
        .search_products(ProductSearchQuery {
            category: Some("Electronics".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_category.total, 1);

    let categories = products.list_categories().await.unwrap();
    assert_eq!(categories, vec!["Electronics", "Stationery"]);
}

#[tokio::test]
async fn product_search_paginates() {
    let app = TestApp::new().await;
    for i in 0..7 {
        app.seed_product(&format!("SKU-{i}"), &format!("Item {i}"), dec!(5), 10)
            .await;
    }

    let page1 = app
        .state
        .services
        .products
        .search_products(ProductSearchQuery {
            page: Some(1),
            per_page: Some(3),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page1.total, 7);
    assert_eq!(page1.products.len(), 3);

    let page3 = app
        .state
        .services
        .products
        .search_products(ProductSearchQuery {
            page: Some(3),
            per_page: Some(3),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(page3.products.len(), 1);
}

#[tokio::test]
async fn customer_search_matches_name_and_code() {
    let app = TestApp::new().await;
    app.seed_customer("C001", "Acme Traders").await;
    app.seed_customer("C002", "Beta Retail").await;
    app.seed_customer("D001", "Acme Wholesale").await;

    let customers = &app.state.services.customers;

    let by_name = customers
        .search_customers(CustomerSearchQuery {
            q: Some("Acme".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_name.total, 2);

    let by_code = customers
        .search_customers(CustomerSearchQuery {
            q: Some("C00".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_code.total, 2);
}

#[tokio::test]
async fn order_search_filters_by_text_and_status() {
    let app = TestApp::new().await;
    let acme = app.seed_customer("C001", "Acme Traders").await;
    let beta = app.seed_customer("C002", "Beta Retail").await;
    let product = app.seed_product("SKU-1", "Widget", dec!(10), 100).await;

    let orders = &app.state.services.orders;
    let acme_order = orders
        .create_order(
            CreateOrderRequest {
                customer_id: acme.id,
                items: vec![OrderItemRequest {
                    product_id: product.id,
                    quantity: 1,
                }],
            },
            &app.sales,
        )
        .await
        .unwrap();
    orders
        .create_order(
            CreateOrderRequest {
                customer_id: beta.id,
                items: vec![OrderItemRequest {
                    product_id: product.id,
                    quantity: 2,
                }],
            },
            &app.sales,
        )
        .await
        .unwrap();

    app.state
        .services
        .order_status
        .set_status(acme_order.order.id, OrderStatus::Confirmed, &app.admin)
        .await
        .unwrap();

    let by_customer = orders
        .search_orders(OrderSearchQuery {
            q: Some("Acme".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_customer.total, 1);
    assert_eq!(by_customer.orders[0].id, acme_order.order.id);

    let by_number = orders
        .search_orders(OrderSearchQuery {
            q: Some("ORD-0002".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_number.total, 1);

    let confirmed = orders
        .search_orders(OrderSearchQuery {
            status: Some(OrderStatus::Confirmed),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(confirmed.total, 1);

    let pending = orders
        .search_orders(OrderSearchQuery {
            status: Some(OrderStatus::Pending),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(pending.total, 1);
}

#[tokio::test]
async fn dashboard_summary_reflects_the_data() {
    let app = TestApp::new().await;
    let customer = app.seed_customer("C001", "Acme Traders").await;
    app.seed_customer("C002", "Beta Retail").await;
    let scarce = app.seed_product("SKU-1", "Scarce", dec!(10), 2).await;
    app.seed_product("SKU-2", "Plenty", dec!(10), 99).await;

    app.state
        .services
        .orders
        .create_order(
            CreateOrderRequest {
                customer_id: customer.id,
                items: vec![OrderItemRequest {
                    product_id: scarce.id,
                    quantity: 1,
                }],
            },
            &app.sales,
        )
        .await
        .unwrap();

    app.state
        .services
        .inventory
        .adjust_stock_with_audit(scarce.id, 1, &app.admin, "intake")
        .await
        .unwrap();

    let summary = app.state.services.dashboard.summary().await.unwrap();
    assert_eq!(summary.total_products, 2);
    assert_eq!(summary.total_customers, 2);
    assert_eq!(summary.orders_today, 1);
    assert_eq!(summary.low_stock_count, 1);
    assert_eq!(summary.low_stock_products[0].id, scarce.id);
    assert_eq!(summary.recent_movements.len(), 1);
}
