use itsm_db::secure::Scopable;
use sea_orm::entity::prelude::*;

/// Append-only; rows are never updated or deleted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Scopable)]
#[sea_orm(table_name = "audit_entries")]
#[secure(
    resource_col = "id",
    department_col = "department_id",
    filiale_col = "filiale_id",
    owner_col = "actor_id",
    no_soft_delete
)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub entity_type: String,
    pub entity_id: Uuid,
    pub action: String,
    pub actor_id: Option<Uuid>,
    pub department_id: Option<i64>,
    pub filiale_id: Option<i64>,
    pub details: Json,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
