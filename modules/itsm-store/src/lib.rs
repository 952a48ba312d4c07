//! ITSM repositories: tickets, assets, SLAs, time tracking, projects and
//! the audit log, persisted with `SeaORM` through the scoped query layer of
//! `itsm-db`.
//!
//! ```ignore
//! let db = itsm_db::connect(&cfg).await?;
//! itsm_store::migrate(&db).await?;
//! let repos = itsm_store::Repositories::new(&db, &cfg);
//! let page = repos.tickets.list(Some(&scope), &filter, PageRequest::first(20)).await?;
//! ```

pub mod domain;
pub mod infra;

use std::sync::Arc;

use itsm_db::{DbConfig, SecureConn};
use sea_orm::DbErr;
use sea_orm_migration::MigratorTrait;
use tracing::info;

pub use domain::repos::{
    AssetsRepository, AuditRepository, ProjectsRepository, SlasRepository, TicketsRepository,
    TimeEntriesRepository,
};
pub use infra::storage::migrations::Migrator;
pub use infra::storage::{
    OrmAssetsRepository, OrmAuditRepository, OrmProjectsRepository, OrmSlasRepository,
    OrmTicketsRepository, OrmTimeEntriesRepository,
};

/// Apply every pending migration.
///
/// # Errors
/// Propagates the failing migration's `DbErr`.
pub async fn migrate(db: &SecureConn) -> Result<(), DbErr> {
    let pending = Migrator::get_pending_migrations(db.conn()).await?.len();
    Migrator::up(db.conn(), None).await?;
    info!(applied = pending, "migrations applied");
    Ok(())
}

/// Every repository over one shared connection pool.
#[derive(Clone)]
pub struct Repositories {
    pub tickets: Arc<dyn TicketsRepository>,
    pub assets: Arc<dyn AssetsRepository>,
    pub slas: Arc<dyn SlasRepository>,
    pub time_entries: Arc<dyn TimeEntriesRepository>,
    pub projects: Arc<dyn ProjectsRepository>,
    pub audit: Arc<dyn AuditRepository>,
}

impl Repositories {
    #[must_use]
    pub fn new(db: &SecureConn, cfg: &DbConfig) -> Self {
        Self {
            tickets: Arc::new(OrmTicketsRepository::new(db.clone(), cfg)),
            assets: Arc::new(OrmAssetsRepository::new(db.clone(), cfg)),
            slas: Arc::new(OrmSlasRepository::new(db.clone(), cfg)),
            time_entries: Arc::new(OrmTimeEntriesRepository::new(db.clone(), cfg)),
            projects: Arc::new(OrmProjectsRepository::new(db.clone(), cfg)),
            audit: Arc::new(OrmAuditRepository::new(db.clone(), cfg)),
        }
    }
}
