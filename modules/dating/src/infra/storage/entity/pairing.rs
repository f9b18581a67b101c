use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// Row in `matches`. `pair_low`/`pair_high` hold the sorted member ids and
/// carry the unique index that makes a pairing side-order independent.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "matches")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: String,
    pub other_user_id: String,
    pub pair_low: String,
    pub pair_high: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
