#![allow(clippy::unwrap_used, clippy::expect_used)]
#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use itsm_db::{DbConfig, SecureConn};
use itsm_security::{Action, Namespace, Role, ScopeDescriptor};
use itsm_store::Repositories;
use itsm_store::domain::{NewTicket, Priority, Ticket, TicketCategory};
use itsm_store::infra::storage::entity::ticket;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

pub struct World {
    pub db: SecureConn,
    pub repos: Repositories,
    pub cfg: DbConfig,
}

/// Fresh in-memory database with the schema applied. A single pooled
/// connection keeps every query on the same in-memory file.
pub async fn setup() -> World {
    let cfg = DbConfig {
        dsn: "sqlite::memory:".to_owned(),
        max_conns: Some(1),
        min_conns: Some(1),
        ..DbConfig::default()
    };
    let db = itsm_db::connect(&cfg).await.expect("connect");
    itsm_store::migrate(&db).await.expect("migrate");
    let repos = Repositories::new(&db, &cfg);
    World { db, repos, cfg }
}

pub fn manager(department: i64) -> ScopeDescriptor {
    ScopeDescriptor::builder()
        .user_id(Uuid::new_v4())
        .role(Role::Manager)
        .department(department)
        .build()
}

pub fn requester(user: Uuid) -> ScopeDescriptor {
    ScopeDescriptor::builder()
        .user_id(user)
        .role(Role::Requester)
        .build()
}

pub fn agent(user: Uuid, grants: &[(Namespace, Action)]) -> ScopeDescriptor {
    grants
        .iter()
        .fold(
            ScopeDescriptor::builder().user_id(user).role(Role::Agent),
            |b, (ns, action)| b.permission(*ns, action.clone()),
        )
        .build()
}

pub fn new_ticket(department: i64, requester: Uuid) -> NewTicket {
    NewTicket {
        category: TicketCategory::Incident,
        title: "Printer on floor 3 is jammed".to_owned(),
        description: String::new(),
        priority: Priority::Medium,
        department_id: department,
        filiale_id: None,
        requester_id: requester,
        assignee_id: None,
    }
}

pub async fn open_ticket(world: &World, department: i64) -> Ticket {
    world
        .repos
        .tickets
        .create(new_ticket(department, Uuid::new_v4()))
        .await
        .unwrap()
}

/// Insert a ticket row with a fixed code, bypassing the generator.
pub async fn seed_ticket_row(db: &SecureConn, code: &str, deleted: bool) -> Uuid {
    let now = Utc::now();
    let id = Uuid::new_v4();
    ticket::ActiveModel {
        id: Set(id),
        code: Set(code.to_owned()),
        category: Set("incident".to_owned()),
        title: Set(format!("seeded {code}")),
        description: Set(String::new()),
        status: Set("new".to_owned()),
        priority: Set("low".to_owned()),
        department_id: Set(1),
        filiale_id: Set(None),
        requester_id: Set(Uuid::new_v4()),
        assignee_id: Set(None),
        sla_id: Set(None),
        response_due_at: Set(None),
        resolution_due_at: Set(None),
        resolved_at: Set(None),
        closed_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(deleted.then_some(now)),
    }
    .insert(db.conn())
    .await
    .unwrap();
    id
}

/// Move a ticket's resolution deadline `hours` into the past.
pub async fn overdue(db: &SecureConn, id: Uuid, hours: i64) {
    let due: DateTime<Utc> = Utc::now() - Duration::hours(hours);
    ticket::Entity::update_many()
        .col_expr(ticket::Column::ResolutionDueAt, Expr::value(due))
        .filter(ticket::Column::Id.eq(id))
        .exec(db.conn())
        .await
        .unwrap();
}
