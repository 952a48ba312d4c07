//! `SeaORM` persistence for the ITSM domain.
//!
//! - `entity/`: table definitions with their `#[secure(..)]` visibility columns
//! - `mapper.rs`: row to domain conversions
//! - `migrations/`: schema
//! - `*_sea_repo.rs`: repository implementations

pub mod entity;
pub mod mapper;
pub mod migrations;

mod assets_sea_repo;
mod audit_sea_repo;
mod projects_sea_repo;
mod slas_sea_repo;
mod tickets_sea_repo;
mod time_entries_sea_repo;

pub use assets_sea_repo::OrmAssetsRepository;
pub use audit_sea_repo::OrmAuditRepository;
pub use projects_sea_repo::OrmProjectsRepository;
pub use slas_sea_repo::OrmSlasRepository;
pub use tickets_sea_repo::OrmTicketsRepository;
pub use time_entries_sea_repo::OrmTimeEntriesRepository;

use itsm_db::secure::scope_by_discriminator;
use itsm_security::{Namespace, ScopeDescriptor};
use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{Condition, EntityTrait};

use crate::domain::TicketCategory;
use entity::ticket;

/// Ticket visibility across every category, each under its own namespace.
pub(crate) fn ticket_visibility(scope: Option<&ScopeDescriptor>) -> Option<Condition> {
    let partitions: Vec<(&'static str, Namespace)> = TicketCategory::ALL
        .iter()
        .map(|c| (c.as_str(), c.namespace()))
        .collect();
    scope_by_discriminator::<ticket::Entity, _>(scope, ticket::Column::Category, &partitions)
}

/// Case-insensitive substring match, with LIKE wildcards in `needle`
/// taken literally.
///
/// Only ASCII letters are folded. SQLite's `LOWER` leaves other characters
/// untouched, so the needle is folded the same way to keep both sides
/// comparable; non-ASCII letters therefore match case-sensitively.
pub(crate) fn text_contains<E>(col: E::Column, needle: &str) -> SimpleExpr
where
    E: EntityTrait,
{
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.to_ascii_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    Expr::expr(Func::lower(Expr::col((E::default(), col))))
        .like(LikeExpr::new(pattern).escape('\\'))
}

/// Trimmed search text, `None` when blank.
pub(crate) fn search_term(search: Option<&str>) -> Option<&str> {
    search.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use sea_orm::{DbBackend, QueryFilter, QueryTrait};

    use super::*;
    use itsm_security::{Action, Role};

    #[test]
    fn search_escapes_wildcards() {
        let sql = ticket::Entity::find()
            .filter(text_contains::<ticket::Entity>(ticket::Column::Title, "50%_Off"))
            .build(DbBackend::Sqlite)
            .to_string();
        assert!(sql.contains(r#"LOWER("tickets"."title") LIKE"#), "{sql}");
        assert!(sql.contains("ESCAPE"), "{sql}");
        assert!(!sql.contains("50%_"), "wildcards left unescaped: {sql}");
    }

    #[test]
    fn search_folds_ascii_only() {
        let sql = ticket::Entity::find()
            .filter(text_contains::<ticket::Entity>(ticket::Column::Title, "CAF\u{c9} Menu"))
            .build(DbBackend::Sqlite)
            .to_string();
        assert!(sql.contains("%caf\u{c9} menu%"), "{sql}");
    }

    #[test]
    fn blank_search_is_ignored() {
        assert_eq!(search_term(Some("   ")), None);
        assert_eq!(search_term(Some(" vpn ")), Some("vpn"));
        assert_eq!(search_term(None), None);
    }

    #[test]
    fn ticket_visibility_partitions_by_category() {
        let scope = ScopeDescriptor::builder()
            .user_id(uuid::Uuid::new_v4())
            .role(Role::Agent)
            .permission(Namespace::INCIDENTS, Action::ViewAll)
            .build();
        let sql = ticket::Entity::find()
            .filter(ticket_visibility(Some(&scope)).unwrap())
            .build(DbBackend::Sqlite)
            .to_string();
        for category in TicketCategory::ALL {
            assert!(sql.contains(&format!("'{category}'")), "{category} missing: {sql}");
        }
        assert!(sql.contains("ticket_watchers"), "{sql}");
    }

    #[test]
    fn admin_sees_every_category() {
        let scope = ScopeDescriptor::builder().role(Role::Admin).build();
        assert!(ticket_visibility(Some(&scope)).is_none());
        assert!(ticket_visibility(None).is_none());
    }
}
