use itsm_db::CodedEntity;
use itsm_db::secure::Scopable;
use sea_orm::entity::prelude::*;

/// Tickets are visible to their department, filiale, requester, assignee
/// and watchers. The permission namespace depends on `category`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Scopable)]
#[sea_orm(table_name = "tickets")]
#[secure(
    resource_col = "id",
    department_col = "department_id",
    filiale_col = "filiale_id",
    owner_col = "requester_id",
    assignee_col = "assignee_id",
    soft_delete_col = "deleted_at",
    member_table = "ticket_watchers",
    member_fk = "ticket_id",
    member_user = "user_id"
)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub category: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub department_id: i64,
    pub filiale_id: Option<i64>,
    pub requester_id: Uuid,
    pub assignee_id: Option<Uuid>,
    pub sla_id: Option<Uuid>,
    pub response_due_at: Option<DateTimeUtc>,
    pub resolution_due_at: Option<DateTimeUtc>,
    pub resolved_at: Option<DateTimeUtc>,
    pub closed_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sla::Entity",
        from = "Column::SlaId",
        to = "super::sla::Column::Id"
    )]
    Sla,
}

impl Related<super::sla::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sla.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl CodedEntity for Entity {
    fn code_col() -> Column {
        Column::Code
    }
}
