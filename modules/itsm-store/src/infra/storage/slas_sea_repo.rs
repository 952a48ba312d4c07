use async_trait::async_trait;
use chrono::Utc;
use itsm_db::secure::{Scoped, SecureQuery, Unscoped};
use itsm_db::{DbConfig, DbResultExt, Page, PageRequest, PagingConfig, RepoError, SecureConn};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, IntoActiveModel, Order, Set,
};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::entity::sla;
use super::mapper::try_collect;
use crate::domain::repos::SlasRepository;
use crate::domain::{NewSla, Priority, Sla, SlaPatch, TicketCategory, require_text};

pub struct OrmSlasRepository {
    db: SecureConn,
    paging: PagingConfig,
}

impl OrmSlasRepository {
    #[must_use]
    pub fn new(db: SecureConn, cfg: &DbConfig) -> Self {
        Self {
            db,
            paging: cfg.paging,
        }
    }

    async fn load(&self, id: Uuid) -> Result<sla::Model, RepoError> {
        catalogue()
            .and_id(id)
            .one(self.db.conn())
            .await
            .op("slas.get")?
            .ok_or_else(|| RepoError::not_found("sla", id))
    }
}

/// The catalogue is global; no caller is ever filtered out of it.
fn catalogue() -> SecureQuery<sla::Entity, Scoped> {
    SecureQuery::<sla::Entity, Unscoped>::new().scoped_by(None)
}

fn check_targets(response_minutes: i32, resolution_minutes: i32) -> Result<(), RepoError> {
    if response_minutes <= 0 {
        return Err(RepoError::malformed("response_minutes", "must be positive"));
    }
    if resolution_minutes <= 0 {
        return Err(RepoError::malformed("resolution_minutes", "must be positive"));
    }
    if response_minutes > resolution_minutes {
        return Err(RepoError::malformed(
            "response_minutes",
            format!("{response_minutes} exceeds resolution target {resolution_minutes}"),
        ));
    }
    Ok(())
}

/// Newest active SLA for `(category, priority)`.
pub(super) async fn applicable_sla<C>(
    conn: &C,
    category: TicketCategory,
    priority: Priority,
) -> Result<Option<Sla>, RepoError>
where
    C: ConnectionTrait,
{
    let found = catalogue()
        .filter(sla::Column::Category.eq(category.as_str()))
        .filter(sla::Column::Priority.eq(priority.as_str()))
        .filter(sla::Column::Active.eq(true))
        .order_by(sla::Column::CreatedAt, Order::Desc)
        .one(conn)
        .await
        .op("slas.find_applicable")?;
    debug!(%category, %priority, found = found.is_some(), "sla lookup");
    found.map(Sla::try_from).transpose()
}

#[async_trait]
impl SlasRepository for OrmSlasRepository {
    #[instrument(skip(self, new), fields(category = %new.category, priority = %new.priority))]
    async fn create(&self, new: NewSla) -> Result<Sla, RepoError> {
        require_text("name", &new.name)?;
        check_targets(new.response_minutes, new.resolution_minutes)?;

        let now = Utc::now();
        let model = sla::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(new.name.trim().to_owned()),
            category: Set(new.category.as_str().to_owned()),
            priority: Set(new.priority.as_str().to_owned()),
            response_minutes: Set(new.response_minutes),
            resolution_minutes: Set(new.resolution_minutes),
            active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db.conn())
        .await
        .op("slas.create")?;
        info!(sla_id = %model.id, "sla created");
        model.try_into()
    }

    #[instrument(skip(self))]
    async fn get(&self, id: Uuid) -> Result<Sla, RepoError> {
        self.load(id).await?.try_into()
    }

    #[instrument(skip(self))]
    async fn list(&self, active_only: bool, page: PageRequest) -> Result<Page<Sla>, RepoError> {
        let window = page.window(&self.paging)?;
        let mut query = catalogue();
        if active_only {
            query = query.filter(sla::Column::Active.eq(true));
        }
        let (rows, total) = query
            .order_by(sla::Column::CreatedAt, Order::Desc)
            .page(self.db.conn(), window)
            .await
            .op("slas.list")?;
        Ok(Page::new(try_collect(rows)?, total, window))
    }

    #[instrument(skip(self))]
    async fn find_applicable(
        &self,
        category: TicketCategory,
        priority: Priority,
    ) -> Result<Option<Sla>, RepoError> {
        applicable_sla(self.db.conn(), category, priority).await
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, id: Uuid, patch: SlaPatch) -> Result<Sla, RepoError> {
        let current = self.load(id).await?;
        if let Some(name) = &patch.name {
            require_text("name", name)?;
        }
        check_targets(
            patch.response_minutes.unwrap_or(current.response_minutes),
            patch.resolution_minutes.unwrap_or(current.resolution_minutes),
        )?;

        let mut am = current.into_active_model();
        if let Some(name) = patch.name {
            am.name = Set(name.trim().to_owned());
        }
        if let Some(minutes) = patch.response_minutes {
            am.response_minutes = Set(minutes);
        }
        if let Some(minutes) = patch.resolution_minutes {
            am.resolution_minutes = Set(minutes);
        }
        if let Some(active) = patch.active {
            am.active = Set(active);
        }
        am.updated_at = Set(Utc::now());
        am.update(self.db.conn()).await.op("slas.update")?.try_into()
    }

    #[instrument(skip(self))]
    async fn deactivate(&self, id: Uuid) -> Result<Sla, RepoError> {
        self.update(
            id,
            SlaPatch {
                active: Some(false),
                ..SlaPatch::default()
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets_must_be_positive_and_ordered() {
        assert!(check_targets(30, 480).is_ok());
        assert!(check_targets(60, 60).is_ok());
        assert!(matches!(
            check_targets(0, 60),
            Err(RepoError::MalformedInput { field: "response_minutes", .. })
        ));
        assert!(matches!(
            check_targets(30, -1),
            Err(RepoError::MalformedInput { field: "resolution_minutes", .. })
        ));
        assert!(check_targets(120, 60).is_err());
    }
}
