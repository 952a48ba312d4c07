mod assets_repo;
mod audit_repo;
mod projects_repo;
mod slas_repo;
mod tickets_repo;
mod time_entries_repo;

pub use assets_repo::AssetsRepository;
pub use audit_repo::AuditRepository;
pub use projects_repo::ProjectsRepository;
pub use slas_repo::SlasRepository;
pub use tickets_repo::TicketsRepository;
pub use time_entries_repo::TimeEntriesRepository;
