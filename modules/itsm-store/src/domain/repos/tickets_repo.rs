use async_trait::async_trait;
use itsm_db::{Page, PageRequest, RepoError};
use itsm_security::ScopeDescriptor;
use uuid::Uuid;

use crate::domain::{NewTicket, Ticket, TicketFilter, TicketListItem, TicketPatch, TicketStatus};

/// Ticket persistence. `scope = None` is the trusted system context; every
/// other call sees only rows the descriptor grants, and rows it cannot see
/// are reported as `NotFound`.
#[async_trait]
pub trait TicketsRepository: Send + Sync {
    /// Allocate a `TKT` code, attach the matching active SLA and store.
    async fn create(&self, new: NewTicket) -> Result<Ticket, RepoError>;

    async fn get(&self, scope: Option<&ScopeDescriptor>, id: Uuid) -> Result<Ticket, RepoError>;

    async fn get_by_code(
        &self,
        scope: Option<&ScopeDescriptor>,
        code: &str,
    ) -> Result<Ticket, RepoError>;

    async fn list(
        &self,
        scope: Option<&ScopeDescriptor>,
        filter: &TicketFilter,
        page: PageRequest,
    ) -> Result<Page<TicketListItem>, RepoError>;

    async fn count(
        &self,
        scope: Option<&ScopeDescriptor>,
        filter: &TicketFilter,
    ) -> Result<u64, RepoError>;

    /// A priority change re-applies the SLA for the new priority.
    async fn update(
        &self,
        scope: Option<&ScopeDescriptor>,
        id: Uuid,
        patch: TicketPatch,
    ) -> Result<Ticket, RepoError>;

    async fn assign(
        &self,
        scope: Option<&ScopeDescriptor>,
        id: Uuid,
        assignee: Option<Uuid>,
    ) -> Result<Ticket, RepoError>;

    /// Stamps `resolved_at` / `closed_at`; reopening clears them.
    async fn change_status(
        &self,
        scope: Option<&ScopeDescriptor>,
        id: Uuid,
        status: TicketStatus,
    ) -> Result<Ticket, RepoError>;

    async fn soft_delete(&self, scope: Option<&ScopeDescriptor>, id: Uuid)
    -> Result<(), RepoError>;

    async fn restore(&self, scope: Option<&ScopeDescriptor>, id: Uuid)
    -> Result<Ticket, RepoError>;

    /// Idempotent.
    async fn add_watcher(
        &self,
        scope: Option<&ScopeDescriptor>,
        ticket_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), RepoError>;

    /// Returns whether a watcher row was removed.
    async fn remove_watcher(
        &self,
        scope: Option<&ScopeDescriptor>,
        ticket_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, RepoError>;

    async fn list_watchers(
        &self,
        scope: Option<&ScopeDescriptor>,
        ticket_id: Uuid,
    ) -> Result<Vec<Uuid>, RepoError>;
}
