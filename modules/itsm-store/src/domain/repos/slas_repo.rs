use async_trait::async_trait;
use itsm_db::{Page, PageRequest, RepoError};
use uuid::Uuid;

use crate::domain::{NewSla, Priority, Sla, SlaPatch, TicketCategory};

/// SLA catalogue. Not scoped: every caller reads the same rows.
#[async_trait]
pub trait SlasRepository: Send + Sync {
    async fn create(&self, new: NewSla) -> Result<Sla, RepoError>;

    async fn get(&self, id: Uuid) -> Result<Sla, RepoError>;

    async fn list(&self, active_only: bool, page: PageRequest) -> Result<Page<Sla>, RepoError>;

    /// Newest active SLA for the pair, if any.
    async fn find_applicable(
        &self,
        category: TicketCategory,
        priority: Priority,
    ) -> Result<Option<Sla>, RepoError>;

    /// Does not touch due dates of tickets already opened.
    async fn update(&self, id: Uuid, patch: SlaPatch) -> Result<Sla, RepoError>;

    async fn deactivate(&self, id: Uuid) -> Result<Sla, RepoError>;
}
