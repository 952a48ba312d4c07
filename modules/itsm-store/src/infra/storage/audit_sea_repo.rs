use async_trait::async_trait;
use chrono::Utc;
use itsm_db::{DbConfig, DbResultExt, Page, PageRequest, PagingConfig, RepoError, SecureConn};
use itsm_security::{Namespace, ScopeDescriptor};
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, Order, Set};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::entity::audit_entry;
use crate::domain::repos::AuditRepository;
use crate::domain::{AuditEntry, AuditFilter, NewAuditEntry, require_text};

use audit_entry::Column as C;

pub struct OrmAuditRepository {
    db: SecureConn,
    paging: PagingConfig,
}

impl OrmAuditRepository {
    #[must_use]
    pub fn new(db: SecureConn, cfg: &DbConfig) -> Self {
        Self {
            db,
            paging: cfg.paging,
        }
    }
}

fn filter_condition(filter: &AuditFilter) -> Result<Condition, RepoError> {
    if let (Some(from), Some(to)) = (filter.from, filter.to)
        && from >= to
    {
        return Err(RepoError::malformed(
            "to",
            format!("{to} is not after {from}"),
        ));
    }

    let mut cond = Condition::all();
    if let Some(entity_type) = filter.entity_type.as_deref() {
        cond = cond.add(C::EntityType.eq(entity_type));
    }
    if let Some(entity_id) = filter.entity_id {
        cond = cond.add(C::EntityId.eq(entity_id));
    }
    if let Some(actor) = filter.actor_id {
        cond = cond.add(C::ActorId.eq(actor));
    }
    if let Some(from) = filter.from {
        cond = cond.add(C::CreatedAt.gte(from));
    }
    if let Some(to) = filter.to {
        cond = cond.add(C::CreatedAt.lt(to));
    }
    Ok(cond)
}

#[async_trait]
impl AuditRepository for OrmAuditRepository {
    #[instrument(skip(self, entry), fields(entity_type = %entry.entity_type, action = %entry.action))]
    async fn record(&self, entry: NewAuditEntry) -> Result<AuditEntry, RepoError> {
        require_text("entity_type", &entry.entity_type)?;
        require_text("action", &entry.action)?;
        let details = if entry.details.is_null() {
            serde_json::json!({})
        } else {
            entry.details
        };

        let model = audit_entry::ActiveModel {
            id: Set(Uuid::new_v4()),
            entity_type: Set(entry.entity_type),
            entity_id: Set(entry.entity_id),
            action: Set(entry.action),
            actor_id: Set(entry.actor_id),
            department_id: Set(entry.department_id),
            filiale_id: Set(entry.filiale_id),
            details: Set(details),
            created_at: Set(Utc::now()),
        }
        .insert(self.db.conn())
        .await
        .op("audit.record")?;
        debug!(entry_id = %model.id, "audit entry recorded");
        Ok(model.into())
    }

    #[instrument(skip(self, scope, filter, page), fields(page = page.page, page_size = page.page_size))]
    async fn list(
        &self,
        scope: Option<&ScopeDescriptor>,
        filter: &AuditFilter,
        page: PageRequest,
    ) -> Result<Page<AuditEntry>, RepoError> {
        let window = page.window(&self.paging)?;
        let (rows, total) = self
            .db
            .find::<audit_entry::Entity>(scope, Namespace::AUDIT)
            .filter(filter_condition(filter)?)
            .order_by(C::CreatedAt, Order::Desc)
            .page(self.db.conn(), window)
            .await
            .op("audit.list")?;
        Ok(Page::new(
            rows.into_iter().map(AuditEntry::from).collect(),
            total,
            window,
        ))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn inverted_time_range_is_rejected() {
        let now = Utc::now();
        let filter = AuditFilter {
            from: Some(now),
            to: Some(now - Duration::hours(1)),
            ..AuditFilter::default()
        };
        assert!(matches!(
            filter_condition(&filter),
            Err(RepoError::MalformedInput { field: "to", .. })
        ));
    }
}
