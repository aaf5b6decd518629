use sea_orm::entity::prelude::*;
use serde::Serialize;

use crate::{fallen, users};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "comments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub fallen_id: Uuid,
    #[sea_orm(indexed)]
    pub author_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub deleted_at: Option<DateTimeWithTimeZone>,
    pub deleted_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "fallen::Entity",
        from = "Column::FallenId",
        to = "fallen::Column::Id",
        on_delete = "Cascade"
    )]
    Fallen,
    #[sea_orm(
        belongs_to = "users::Entity",
        from = "Column::AuthorId",
        to = "users::Column::Id"
    )]
    Author,
}

impl Related<fallen::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Fallen.def()
    }
}

impl Related<users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
