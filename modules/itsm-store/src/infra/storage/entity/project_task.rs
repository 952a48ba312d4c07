use itsm_db::CodedEntity;
use itsm_db::secure::Scopable;
use sea_orm::entity::prelude::*;

/// Tasks carry no department of their own; they are visible to their
/// assignee and to whoever can see the parent project.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Scopable)]
#[sea_orm(table_name = "project_tasks")]
#[secure(
    resource_col = "id",
    no_department,
    no_filiale,
    no_owner,
    assignee_col = "assignee_id",
    soft_delete_col = "deleted_at"
)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub project_id: Uuid,
    pub title: String,
    pub status: String,
    pub assignee_id: Option<Uuid>,
    pub due_on: Option<Date>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::project::Entity",
        from = "Column::ProjectId",
        to = "super::project::Column::Id"
    )]
    Project,
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl CodedEntity for Entity {
    fn code_col() -> Column {
        Column::Code
    }
}
