use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "activities")]
pub struct Model {
    #[sea_orm(primary_key, column_name = "_id")]
    pub id: i32,
    pub object: i32,
    #[sea_orm(column_type = "String(StringLen::N(50))")]
    pub object_type: String,
    pub context_object: i32,
    #[sea_orm(column_type = "String(StringLen::N(50))")]
    pub verb: String,
    pub actor_user: i32,
    #[sea_orm(column_name = "_created")]
    pub created: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ActorUser",
        to = "super::user::Column::Id"
    )]
    Actor,
}

impl ActiveModelBehavior for ActiveModel {}
