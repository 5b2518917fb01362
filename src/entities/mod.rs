pub mod customer;
pub mod order_counter;
pub mod product;
pub mod sales_order;
pub mod sales_order_item;
pub mod stock_movement;

pub use sales_order::{OrderStatus, StockEffect};
