use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Sales order header. `order_number` is assigned exactly once at first
/// persistence and never changes afterwards, even if the order is deleted.
/// `total_amount` is the sum of the line item totals as of order creation.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "sales_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[validate(length(
        min = 1,
        max = 50,
        message = "Order number must be between 1 and 50 characters"
    ))]
    pub order_number: String,

    pub customer_id: Uuid,
    pub order_date: DateTime<Utc>,

    /// Actor who created the order. Nullable so the order survives removal
    /// of the user account.
    pub created_by: Option<Uuid>,

    pub status: OrderStatus,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub version: i32,
}

/// Order lifecycle status, persisted as its SCREAMING_SNAKE_CASE name.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[sea_orm(string_value = "PENDING")]
    #[strum(serialize = "PENDING")]
    Pending,
    #[sea_orm(string_value = "CONFIRMED")]
    #[strum(serialize = "CONFIRMED")]
    Confirmed,
    #[sea_orm(string_value = "CANCELLED")]
    #[strum(serialize = "CANCELLED")]
    Cancelled,
}

/// Stock side effect implied by a status change.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StockEffect {
    /// Stock leaves: every line item's quantity is subtracted.
    Deduct,
    /// Stock returns: every line item's quantity is added back.
    Restore,
}

impl OrderStatus {
    /// Pure transition function: given the previously persisted status and
    /// the incoming status, decide what (if anything) happens to stock.
    ///
    /// Stock is deducted exactly when an order becomes CONFIRMED from any
    /// non-CONFIRMED status, and restored exactly when a CONFIRMED order
    /// becomes CANCELLED. Every other pair, including an unchanged status,
    /// is a plain status write with no stock effect.
    pub fn stock_effect(old: OrderStatus, new: OrderStatus) -> Option<StockEffect> {
        if old == new {
            return None;
        }
        match (old, new) {
            (old, OrderStatus::Confirmed) if old != OrderStatus::Confirmed => {
                Some(StockEffect::Deduct)
            }
            (OrderStatus::Confirmed, OrderStatus::Cancelled) => Some(StockEffect::Restore),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
    #[sea_orm(has_many = "super::sales_order_item::Entity")]
    Items,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::sales_order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    use OrderStatus::*;
    use StockEffect::*;

    #[test]
    fn confirming_a_pending_order_deducts_stock() {
        assert_eq!(OrderStatus::stock_effect(Pending, Confirmed), Some(Deduct));
    }

    #[test]
    fn cancelling_a_confirmed_order_restores_stock() {
        assert_eq!(
            OrderStatus::stock_effect(Confirmed, Cancelled),
            Some(Restore)
        );
    }

    #[test]
    fn cancelling_a_pending_order_has_no_stock_effect() {
        assert_eq!(OrderStatus::stock_effect(Pending, Cancelled), None);
    }

    #[test]
    fn unchanged_status_is_a_no_op() {
        assert_eq!(OrderStatus::stock_effect(Pending, Pending), None);
        assert_eq!(OrderStatus::stock_effect(Confirmed, Confirmed), None);
        assert_eq!(OrderStatus::stock_effect(Cancelled, Cancelled), None);
    }

    #[test]
    fn reconfirming_a_cancelled_order_deducts_again() {
        // Deduction triggers whenever the new status is CONFIRMED and the
        // old one was not, regardless of which non-confirmed state it was.
        assert_eq!(
            OrderStatus::stock_effect(Cancelled, Confirmed),
            Some(Deduct)
        );
    }

    #[test]
    fn reverting_to_pending_never_touches_stock() {
        assert_eq!(OrderStatus::stock_effect(Confirmed, Pending), None);
        assert_eq!(OrderStatus::stock_effect(Cancelled, Pending), None);
    }

    #[test]
    fn status_round_trips_through_its_string_form() {
        for status in [Pending, Confirmed, Cancelled] {
            let text = status.to_string();
            assert_eq!(text.parse::<OrderStatus>().unwrap(), status);
        }
    }
}
