use async_trait::async_trait;
use itsm_db::{Page, PageRequest, RepoError};
use itsm_security::ScopeDescriptor;
use uuid::Uuid;

use crate::domain::{NewTimeEntry, TimeEntry};

#[async_trait]
pub trait TimeEntriesRepository: Send + Sync {
    /// The ticket must exist and be live.
    async fn create(&self, new: NewTimeEntry) -> Result<TimeEntry, RepoError>;

    async fn get(&self, scope: Option<&ScopeDescriptor>, id: Uuid)
    -> Result<TimeEntry, RepoError>;

    async fn list_for_ticket(
        &self,
        scope: Option<&ScopeDescriptor>,
        ticket_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<TimeEntry>, RepoError>;

    /// Sum over the entries the caller can see.
    async fn total_minutes_for_ticket(
        &self,
        scope: Option<&ScopeDescriptor>,
        ticket_id: Uuid,
    ) -> Result<i64, RepoError>;

    async fn delete(&self, scope: Option<&ScopeDescriptor>, id: Uuid) -> Result<(), RepoError>;
}
