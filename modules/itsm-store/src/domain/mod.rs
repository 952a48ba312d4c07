//! Domain models and repository contracts.

pub(crate) mod text_enum;

pub mod asset;
pub mod audit;
pub mod project;
pub mod repos;
pub mod sla;
pub mod ticket;
pub mod time_entry;

pub use asset::{Asset, AssetFilter, AssetPatch, AssetStatus, NewAsset};
pub use audit::{AuditEntry, AuditFilter, NewAuditEntry};
pub use project::{
    NewProject, NewProjectTask, Project, ProjectFilter, ProjectPatch, ProjectStatus, ProjectTask,
    TaskStatus,
};
pub use sla::{NewSla, Sla, SlaPatch};
pub use text_enum::UnknownVariant;
pub use ticket::{
    NewTicket, Priority, Ticket, TicketCategory, TicketFilter, TicketListItem, TicketPatch,
    TicketStatus,
};
pub use time_entry::{NewTimeEntry, TimeEntry};

use itsm_db::RepoError;

/// Reject blank required text.
pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), RepoError> {
    if value.trim().is_empty() {
        return Err(RepoError::malformed(field, "must not be empty"));
    }
    Ok(())
}
