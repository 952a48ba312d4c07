use async_trait::async_trait;
use chrono::{DateTime, Utc};
use itsm_db::secure::{Scoped, SecureQuery, Unscoped};
use itsm_db::{
    CodeSeries, CodegenConfig, DbConfig, DbResultExt, Page, PageRequest, PagingConfig, RepoError,
    SecureConn, insert_with_code,
};
use itsm_security::ScopeDescriptor;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel, Order, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::entity::{sla, ticket, ticket_watcher};
use super::mapper::try_collect;
use super::slas_sea_repo::applicable_sla;
use super::{search_term, text_contains, ticket_visibility};
use crate::domain::repos::TicketsRepository;
use crate::domain::ticket::TICKET_CODE_PREFIX;
use crate::domain::{
    NewTicket, Ticket, TicketFilter, TicketListItem, TicketPatch, TicketStatus, require_text,
};

use ticket::Column as C;

pub struct OrmTicketsRepository {
    db: SecureConn,
    paging: PagingConfig,
    codegen: CodegenConfig,
}

impl OrmTicketsRepository {
    #[must_use]
    pub fn new(db: SecureConn, cfg: &DbConfig) -> Self {
        Self {
            db,
            paging: cfg.paging,
            codegen: cfg.codegen,
        }
    }

    fn query(scope: Option<&ScopeDescriptor>) -> SecureQuery<ticket::Entity, Scoped> {
        SecureQuery::<ticket::Entity, Unscoped>::new().scoped_by(ticket_visibility(scope))
    }

    fn filtered(
        scope: Option<&ScopeDescriptor>,
        filter: &TicketFilter,
        now: DateTime<Utc>,
    ) -> SecureQuery<ticket::Entity, Scoped> {
        Self::query(scope)
            .filter(filter_condition(filter, now))
            .include_deleted(filter.include_deleted)
    }

    async fn visible(
        &self,
        scope: Option<&ScopeDescriptor>,
        id: Uuid,
    ) -> Result<ticket::Model, RepoError> {
        Self::query(scope)
            .and_id(id)
            .one(self.db.conn())
            .await
            .op("tickets.get")?
            .ok_or_else(|| RepoError::not_found("ticket", id))
    }

    async fn save(&self, am: ticket::ActiveModel, op: &'static str) -> Result<Ticket, RepoError> {
        am.update(self.db.conn()).await.op(op)?.try_into()
    }
}

fn filter_condition(filter: &TicketFilter, now: DateTime<Utc>) -> Condition {
    let mut cond = Condition::all();
    if !filter.categories.is_empty() {
        cond = cond.add(C::Category.is_in(filter.categories.iter().map(|c| c.as_str())));
    }
    if !filter.statuses.is_empty() {
        cond = cond.add(C::Status.is_in(filter.statuses.iter().map(|s| s.as_str())));
    }
    if let Some(priority) = filter.priority {
        cond = cond.add(C::Priority.eq(priority.as_str()));
    }
    if let Some(department) = filter.department_id {
        cond = cond.add(C::DepartmentId.eq(department));
    }
    if let Some(assignee) = filter.assignee_id {
        cond = cond.add(C::AssigneeId.eq(assignee));
    }
    if let Some(requester) = filter.requester_id {
        cond = cond.add(C::RequesterId.eq(requester));
    }
    if let Some(text) = search_term(filter.search.as_deref()) {
        cond = cond.add(text_contains::<ticket::Entity>(C::Title, text));
    }
    if filter.breached {
        let done = TicketStatus::ALL
            .iter()
            .filter(|s| s.is_done())
            .map(|s| s.as_str());
        cond = cond
            .add(C::ResolutionDueAt.lt(now))
            .add(C::Status.is_not_in(done));
    }
    cond
}

#[async_trait]
impl TicketsRepository for OrmTicketsRepository {
    #[instrument(skip(self, new), fields(category = %new.category, department = new.department_id))]
    async fn create(&self, new: NewTicket) -> Result<Ticket, RepoError> {
        require_text("title", &new.title)?;
        let conn = self.db.conn();

        let sla = applicable_sla(conn, new.category, new.priority).await?;
        let now = Utc::now();
        let due = sla.as_ref().map(|s| s.due_dates(now));
        let series = CodeSeries::current(TICKET_CODE_PREFIX)?;

        let model = insert_with_code::<ticket::Entity, _, _>(
            conn,
            &series,
            self.codegen.max_attempts,
            |code| ticket::ActiveModel {
                id: Set(Uuid::new_v4()),
                code: Set(code.to_string()),
                category: Set(new.category.as_str().to_owned()),
                title: Set(new.title.trim().to_owned()),
                description: Set(new.description.clone()),
                status: Set(TicketStatus::New.as_str().to_owned()),
                priority: Set(new.priority.as_str().to_owned()),
                department_id: Set(new.department_id),
                filiale_id: Set(new.filiale_id),
                requester_id: Set(new.requester_id),
                assignee_id: Set(new.assignee_id),
                sla_id: Set(sla.as_ref().map(|s| s.id)),
                response_due_at: Set(due.map(|(response, _)| response)),
                resolution_due_at: Set(due.map(|(_, resolution)| resolution)),
                resolved_at: Set(None),
                closed_at: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
                deleted_at: Set(None),
            },
        )
        .await?;

        info!(code = %model.code, sla = ?model.sla_id, "ticket created");
        model.try_into()
    }

    #[instrument(skip(self, scope))]
    async fn get(&self, scope: Option<&ScopeDescriptor>, id: Uuid) -> Result<Ticket, RepoError> {
        self.visible(scope, id).await?.try_into()
    }

    #[instrument(skip(self, scope))]
    async fn get_by_code(
        &self,
        scope: Option<&ScopeDescriptor>,
        code: &str,
    ) -> Result<Ticket, RepoError> {
        Self::query(scope)
            .filter(C::Code.eq(code))
            .one(self.db.conn())
            .await
            .op("tickets.get_by_code")?
            .ok_or_else(|| RepoError::not_found("ticket", code))?
            .try_into()
    }

    #[instrument(skip(self, scope, filter, page), fields(page = page.page, page_size = page.page_size))]
    async fn list(
        &self,
        scope: Option<&ScopeDescriptor>,
        filter: &TicketFilter,
        page: PageRequest,
    ) -> Result<Page<TicketListItem>, RepoError> {
        let window = page.window(&self.paging)?;
        let (rows, total) = Self::filtered(scope, filter, Utc::now())
            .order_by(C::CreatedAt, Order::Desc)
            .page_also_related::<sla::Entity, _>(self.db.conn(), window)
            .await
            .op("tickets.list")?;
        debug!(total, returned = rows.len(), "tickets listed");
        Ok(Page::new(try_collect(rows)?, total, window))
    }

    #[instrument(skip(self, scope, filter))]
    async fn count(
        &self,
        scope: Option<&ScopeDescriptor>,
        filter: &TicketFilter,
    ) -> Result<u64, RepoError> {
        Self::filtered(scope, filter, Utc::now())
            .count(self.db.conn())
            .await
            .op("tickets.count")
    }

    #[instrument(skip(self, scope, patch))]
    async fn update(
        &self,
        scope: Option<&ScopeDescriptor>,
        id: Uuid,
        patch: TicketPatch,
    ) -> Result<Ticket, RepoError> {
        let current = self.visible(scope, id).await?;
        let ticket = Ticket::try_from(current.clone())?;
        if patch.is_empty() {
            return Ok(ticket);
        }
        if let Some(title) = &patch.title {
            require_text("title", title)?;
        }

        let mut am = current.into_active_model();
        if let Some(title) = patch.title {
            am.title = Set(title.trim().to_owned());
        }
        if let Some(description) = patch.description {
            am.description = Set(description);
        }
        if let Some(department) = patch.department_id {
            am.department_id = Set(department);
        }
        if let Some(filiale) = patch.filiale_id {
            am.filiale_id = Set(filiale);
        }
        if let Some(priority) = patch.priority
            && priority != ticket.priority
        {
            let sla = applicable_sla(self.db.conn(), ticket.category, priority).await?;
            let due = sla.as_ref().map(|s| s.due_dates(ticket.created_at));
            am.priority = Set(priority.as_str().to_owned());
            am.sla_id = Set(sla.as_ref().map(|s| s.id));
            am.response_due_at = Set(due.map(|(response, _)| response));
            am.resolution_due_at = Set(due.map(|(_, resolution)| resolution));
            debug!(code = %ticket.code, %priority, "sla re-applied after priority change");
        }
        am.updated_at = Set(Utc::now());
        self.save(am, "tickets.update").await
    }

    #[instrument(skip(self, scope))]
    async fn assign(
        &self,
        scope: Option<&ScopeDescriptor>,
        id: Uuid,
        assignee: Option<Uuid>,
    ) -> Result<Ticket, RepoError> {
        let mut am = self.visible(scope, id).await?.into_active_model();
        am.assignee_id = Set(assignee);
        am.updated_at = Set(Utc::now());
        self.save(am, "tickets.assign").await
    }

    #[instrument(skip(self, scope))]
    async fn change_status(
        &self,
        scope: Option<&ScopeDescriptor>,
        id: Uuid,
        status: TicketStatus,
    ) -> Result<Ticket, RepoError> {
        let current = self.visible(scope, id).await?;
        let ticket = Ticket::try_from(current.clone())?;
        if ticket.status == status {
            return Ok(ticket);
        }
        if ticket.status.is_final() {
            return Err(RepoError::malformed(
                "status",
                format!("ticket {} is {} and cannot change", ticket.code, ticket.status),
            ));
        }

        let now = Utc::now();
        let mut am = current.into_active_model();
        am.status = Set(status.as_str().to_owned());
        match status {
            TicketStatus::Resolved => am.resolved_at = Set(Some(now)),
            TicketStatus::Closed => {
                am.resolved_at = Set(Some(ticket.resolved_at.unwrap_or(now)));
                am.closed_at = Set(Some(now));
            }
            TicketStatus::Cancelled => {}
            TicketStatus::New
            | TicketStatus::Open
            | TicketStatus::InProgress
            | TicketStatus::Pending => {
                am.resolved_at = Set(None);
                am.closed_at = Set(None);
            }
        }
        am.updated_at = Set(now);
        let saved = self.save(am, "tickets.change_status").await?;
        info!(code = %saved.code, from = %ticket.status, to = %status, "ticket status changed");
        Ok(saved)
    }

    #[instrument(skip(self, scope))]
    async fn soft_delete(
        &self,
        scope: Option<&ScopeDescriptor>,
        id: Uuid,
    ) -> Result<(), RepoError> {
        let affected = Self::query(scope)
            .and_id(id)
            .soft_delete(self.db.conn(), Utc::now())
            .await
            .op("tickets.soft_delete")?;
        if affected == 0 {
            return Err(RepoError::not_found("ticket", id));
        }
        Ok(())
    }

    #[instrument(skip(self, scope))]
    async fn restore(
        &self,
        scope: Option<&ScopeDescriptor>,
        id: Uuid,
    ) -> Result<Ticket, RepoError> {
        let affected = Self::query(scope)
            .include_deleted(true)
            .and_id(id)
            .restore(self.db.conn())
            .await
            .op("tickets.restore")?;
        if affected == 0 {
            return Err(RepoError::not_found("ticket", id));
        }
        self.get(scope, id).await
    }

    #[instrument(skip(self, scope))]
    async fn add_watcher(
        &self,
        scope: Option<&ScopeDescriptor>,
        ticket_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), RepoError> {
        if user_id.is_nil() {
            return Err(RepoError::malformed("user_id", "watcher must be a real user"));
        }
        self.visible(scope, ticket_id).await?;

        ticket_watcher::Entity::insert(ticket_watcher::ActiveModel {
            ticket_id: Set(ticket_id),
            user_id: Set(user_id),
            created_at: Set(Utc::now()),
        })
        .on_conflict(
            OnConflict::columns([ticket_watcher::Column::TicketId, ticket_watcher::Column::UserId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(self.db.conn())
        .await
        .op("tickets.add_watcher")?;
        Ok(())
    }

    #[instrument(skip(self, scope))]
    async fn remove_watcher(
        &self,
        scope: Option<&ScopeDescriptor>,
        ticket_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, RepoError> {
        self.visible(scope, ticket_id).await?;
        let res = ticket_watcher::Entity::delete_many()
            .filter(ticket_watcher::Column::TicketId.eq(ticket_id))
            .filter(ticket_watcher::Column::UserId.eq(user_id))
            .exec(self.db.conn())
            .await
            .op("tickets.remove_watcher")?;
        Ok(res.rows_affected > 0)
    }

    #[instrument(skip(self, scope))]
    async fn list_watchers(
        &self,
        scope: Option<&ScopeDescriptor>,
        ticket_id: Uuid,
    ) -> Result<Vec<Uuid>, RepoError> {
        self.visible(scope, ticket_id).await?;
        ticket_watcher::Entity::find()
            .select_only()
            .column(ticket_watcher::Column::UserId)
            .filter(ticket_watcher::Column::TicketId.eq(ticket_id))
            .order_by_asc(ticket_watcher::Column::CreatedAt)
            .order_by_asc(ticket_watcher::Column::UserId)
            .into_tuple()
            .all(self.db.conn())
            .await
            .op("tickets.list_watchers")
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DbBackend, QueryTrait};

    use super::*;
    use crate::domain::{Priority, TicketCategory};

    fn sql(filter: &TicketFilter) -> String {
        ticket::Entity::find()
            .filter(filter_condition(filter, Utc::now()))
            .build(DbBackend::Sqlite)
            .to_string()
    }

    #[test]
    fn empty_filter_adds_nothing() {
        let out = sql(&TicketFilter::default());
        let (_, predicate) = out.split_once(" WHERE ").unwrap();
        assert_eq!(predicate, "TRUE", "{out}");
    }

    #[test]
    fn breached_excludes_finished_tickets() {
        let out = sql(&TicketFilter {
            breached: true,
            ..TicketFilter::default()
        });
        assert!(out.contains(r#""resolution_due_at" <"#), "{out}");
        assert!(out.contains("NOT IN ('resolved', 'closed', 'cancelled')"), "{out}");
    }

    #[test]
    fn sets_become_in_lists() {
        let out = sql(&TicketFilter {
            categories: vec![TicketCategory::Incident, TicketCategory::Problem],
            priority: Some(Priority::High),
            ..TicketFilter::default()
        });
        assert!(out.contains("IN ('incident', 'problem')"), "{out}");
        assert!(out.contains(r#""priority" = 'high'"#), "{out}");
    }
}
