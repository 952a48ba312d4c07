use async_trait::async_trait;
use chrono::Utc;
use itsm_db::secure::{Scoped, SecureQuery, Unscoped, scope_via_parent};
use itsm_db::{DbConfig, DbResultExt, Page, PageRequest, PagingConfig, RepoError, SecureConn};
use itsm_security::{Namespace, ScopeDescriptor};
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, Order, QueryFilter, QuerySelect, Set};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::entity::{ticket, time_entry};
use super::ticket_visibility;
use crate::domain::repos::TimeEntriesRepository;
use crate::domain::{NewTimeEntry, TimeEntry};

use time_entry::Column as C;

pub struct OrmTimeEntriesRepository {
    db: SecureConn,
    paging: PagingConfig,
}

impl OrmTimeEntriesRepository {
    #[must_use]
    pub fn new(db: SecureConn, cfg: &DbConfig) -> Self {
        Self {
            db,
            paging: cfg.paging,
        }
    }

    /// Own entries, plus every entry on a ticket the caller can see.
    fn query(scope: Option<&ScopeDescriptor>) -> SecureQuery<time_entry::Entity, Scoped> {
        let visibility = scope_via_parent::<time_entry::Entity, ticket::Entity>(
            scope,
            Namespace::TIMESHEETS,
            C::TicketId,
            ticket_visibility(scope),
        );
        SecureQuery::<time_entry::Entity, Unscoped>::new().scoped_by(visibility)
    }
}

#[async_trait]
impl TimeEntriesRepository for OrmTimeEntriesRepository {
    #[instrument(skip(self, new), fields(ticket_id = %new.ticket_id, minutes = new.minutes))]
    async fn create(&self, new: NewTimeEntry) -> Result<TimeEntry, RepoError> {
        if new.minutes <= 0 {
            return Err(RepoError::malformed("minutes", "must be positive"));
        }
        let conn = self.db.conn();
        let ticket_live = SecureQuery::<ticket::Entity, Unscoped>::new()
            .scoped_by(None)
            .and_id(new.ticket_id)
            .exists(conn)
            .await
            .op("time_entries.create")?;
        if !ticket_live {
            return Err(RepoError::not_found("ticket", new.ticket_id));
        }

        let model = time_entry::ActiveModel {
            id: Set(Uuid::new_v4()),
            ticket_id: Set(new.ticket_id),
            user_id: Set(new.user_id),
            minutes: Set(new.minutes),
            work_date: Set(new.work_date),
            description: Set(new.description),
            created_at: Set(Utc::now()),
        }
        .insert(conn)
        .await
        .op("time_entries.create")?;
        info!(entry_id = %model.id, "time logged");
        Ok(model.into())
    }

    #[instrument(skip(self, scope))]
    async fn get(
        &self,
        scope: Option<&ScopeDescriptor>,
        id: Uuid,
    ) -> Result<TimeEntry, RepoError> {
        Self::query(scope)
            .and_id(id)
            .one(self.db.conn())
            .await
            .op("time_entries.get")?
            .map(TimeEntry::from)
            .ok_or_else(|| RepoError::not_found("time entry", id))
    }

    #[instrument(skip(self, scope, page), fields(page = page.page, page_size = page.page_size))]
    async fn list_for_ticket(
        &self,
        scope: Option<&ScopeDescriptor>,
        ticket_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<TimeEntry>, RepoError> {
        let window = page.window(&self.paging)?;
        let (rows, total) = Self::query(scope)
            .filter(C::TicketId.eq(ticket_id))
            .order_by(C::WorkDate, Order::Desc)
            .order_by(C::CreatedAt, Order::Desc)
            .page(self.db.conn(), window)
            .await
            .op("time_entries.list_for_ticket")?;
        Ok(Page::new(
            rows.into_iter().map(TimeEntry::from).collect(),
            total,
            window,
        ))
    }

    #[instrument(skip(self, scope))]
    async fn total_minutes_for_ticket(
        &self,
        scope: Option<&ScopeDescriptor>,
        ticket_id: Uuid,
    ) -> Result<i64, RepoError> {
        // Aggregate over the scoped predicate without the listing's ORDER BY.
        let condition = Self::query(scope)
            .filter(C::TicketId.eq(ticket_id))
            .condition();
        let total: Option<Option<i64>> = time_entry::Entity::find()
            .select_only()
            .column_as(Expr::col((time_entry::Entity, C::Minutes)).sum(), "total")
            .filter(condition)
            .into_tuple()
            .one(self.db.conn())
            .await
            .op("time_entries.total_minutes")?;
        let total = total.flatten().unwrap_or(0);
        debug!(total, "summed time entries");
        Ok(total)
    }

    #[instrument(skip(self, scope))]
    async fn delete(&self, scope: Option<&ScopeDescriptor>, id: Uuid) -> Result<(), RepoError> {
        let res = Self::query(scope)
            .and_id(id)
            .delete_many()
            .exec(self.db.conn())
            .await
            .op("time_entries.delete")?;
        if res.rows_affected == 0 {
            return Err(RepoError::not_found("time entry", id));
        }
        Ok(())
    }
}
