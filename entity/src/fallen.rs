use sea_orm::entity::prelude::*;
use serde::Serialize;

use crate::users;

/// A fallen service member's record. `owner_id` is the account that created
/// the record and may edit or delete it; `deleted_at` marks a soft delete.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "fallen")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub nickname: Option<String>,
    pub rank: Option<String>,
    pub unit: Option<String>,
    pub born_on: Option<Date>,
    pub fell_on: Option<Date>,
    pub birth_place: Option<String>,
    pub burial_place: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub biography: Option<String>,
    pub photo_url: Option<String>,
    pub grave_lat: Option<f64>,
    pub grave_lon: Option<f64>,
    #[sea_orm(indexed)]
    pub owner_id: Uuid,
    pub deleted_at: Option<DateTimeWithTimeZone>,
    pub deleted_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "users::Entity",
        from = "Column::OwnerId",
        to = "users::Column::Id"
    )]
    Owner,
}

impl Related<users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
