use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Single-row allocator for order numbers. Order creation locks this row,
/// increments `last_value`, and formats the result; the sequence is
/// monotonic and never reused, so order numbers stay unique even after an
/// order is deleted.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_number_counters")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub last_value: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
