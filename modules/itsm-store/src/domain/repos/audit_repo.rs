use async_trait::async_trait;
use itsm_db::{Page, PageRequest, RepoError};
use itsm_security::ScopeDescriptor;

use crate::domain::{AuditEntry, AuditFilter, NewAuditEntry};

#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Unscoped append.
    async fn record(&self, entry: NewAuditEntry) -> Result<AuditEntry, RepoError>;

    /// Newest first.
    async fn list(
        &self,
        scope: Option<&ScopeDescriptor>,
        filter: &AuditFilter,
        page: PageRequest,
    ) -> Result<Page<AuditEntry>, RepoError>;
}
