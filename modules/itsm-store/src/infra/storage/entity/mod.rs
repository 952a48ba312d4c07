pub mod asset;
pub mod audit_entry;
pub mod project;
pub mod project_task;
pub mod sla;
pub mod ticket;
pub mod ticket_watcher;
pub mod time_entry;
