use itsm_db::CodedEntity;
use itsm_db::secure::Scopable;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Scopable)]
#[sea_orm(table_name = "projects")]
#[secure(
    resource_col = "id",
    department_col = "department_id",
    no_filiale,
    owner_col = "manager_id",
    soft_delete_col = "deleted_at"
)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub department_id: i64,
    pub manager_id: Uuid,
    pub starts_on: Option<Date>,
    pub ends_on: Option<Date>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl CodedEntity for Entity {
    fn code_col() -> Column {
        Column::Code
    }
}
