use itsm_db::CodedEntity;
use itsm_db::secure::Scopable;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Scopable)]
#[sea_orm(table_name = "assets")]
#[secure(
    resource_col = "id",
    department_col = "department_id",
    filiale_col = "filiale_id",
    owner_col = "owner_id",
    soft_delete_col = "deleted_at"
)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    pub asset_type: String,
    pub status: String,
    pub serial_number: Option<String>,
    pub department_id: Option<i64>,
    pub filiale_id: i64,
    pub owner_id: Option<Uuid>,
    pub purchased_at: Option<Date>,
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
