//! Conversions from stored rows to domain models.
//!
//! Enum columns are stored as text; a value this build does not know is a
//! storage fault rather than caller input, so it surfaces as
//! `RepoError::Storage`.

use std::str::FromStr;

use itsm_db::RepoError;
use sea_orm::DbErr;

use super::entity::{asset, audit_entry, project, project_task, sla, ticket, time_entry};
use crate::domain::{
    Asset, AuditEntry, Project, ProjectTask, Sla, Ticket, TicketListItem, TimeEntry,
    UnknownVariant,
};

fn decode<T>(table: &'static str, raw: &str) -> Result<T, RepoError>
where
    T: FromStr<Err = UnknownVariant>,
{
    raw.parse().map_err(|e: UnknownVariant| {
        RepoError::from_db("decode", DbErr::Type(format!("{table}: {e}")))
    })
}

impl TryFrom<ticket::Model> for Ticket {
    type Error = RepoError;

    fn try_from(m: ticket::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            category: decode("tickets", &m.category)?,
            status: decode("tickets", &m.status)?,
            priority: decode("tickets", &m.priority)?,
            id: m.id,
            code: m.code,
            title: m.title,
            description: m.description,
            department_id: m.department_id,
            filiale_id: m.filiale_id,
            requester_id: m.requester_id,
            assignee_id: m.assignee_id,
            sla_id: m.sla_id,
            response_due_at: m.response_due_at,
            resolution_due_at: m.resolution_due_at,
            resolved_at: m.resolved_at,
            closed_at: m.closed_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
            deleted_at: m.deleted_at,
        })
    }
}

impl TryFrom<(ticket::Model, Option<sla::Model>)> for TicketListItem {
    type Error = RepoError;

    fn try_from((ticket, sla): (ticket::Model, Option<sla::Model>)) -> Result<Self, Self::Error> {
        Ok(Self {
            ticket: ticket.try_into()?,
            sla_name: sla.map(|s| s.name),
        })
    }
}

impl TryFrom<sla::Model> for Sla {
    type Error = RepoError;

    fn try_from(m: sla::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            category: decode("slas", &m.category)?,
            priority: decode("slas", &m.priority)?,
            id: m.id,
            name: m.name,
            response_minutes: m.response_minutes,
            resolution_minutes: m.resolution_minutes,
            active: m.active,
            created_at: m.created_at,
            updated_at: m.updated_at,
        })
    }
}

impl TryFrom<asset::Model> for Asset {
    type Error = RepoError;

    fn try_from(m: asset::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            status: decode("assets", &m.status)?,
            id: m.id,
            code: m.code,
            name: m.name,
            asset_type: m.asset_type,
            serial_number: m.serial_number,
            department_id: m.department_id,
            filiale_id: m.filiale_id,
            owner_id: m.owner_id,
            purchased_at: m.purchased_at,
            created_at: m.created_at,
            updated_at: m.updated_at,
            deleted_at: m.deleted_at,
        })
    }
}

impl From<time_entry::Model> for TimeEntry {
    fn from(m: time_entry::Model) -> Self {
        Self {
            id: m.id,
            ticket_id: m.ticket_id,
            user_id: m.user_id,
            minutes: m.minutes,
            work_date: m.work_date,
            description: m.description,
            created_at: m.created_at,
        }
    }
}

impl TryFrom<project::Model> for Project {
    type Error = RepoError;

    fn try_from(m: project::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            status: decode("projects", &m.status)?,
            id: m.id,
            code: m.code,
            name: m.name,
            description: m.description,
            department_id: m.department_id,
            manager_id: m.manager_id,
            starts_on: m.starts_on,
            ends_on: m.ends_on,
            created_at: m.created_at,
            updated_at: m.updated_at,
            deleted_at: m.deleted_at,
        })
    }
}

impl TryFrom<project_task::Model> for ProjectTask {
    type Error = RepoError;

    fn try_from(m: project_task::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            status: decode("project_tasks", &m.status)?,
            id: m.id,
            code: m.code,
            project_id: m.project_id,
            title: m.title,
            assignee_id: m.assignee_id,
            due_on: m.due_on,
            created_at: m.created_at,
            updated_at: m.updated_at,
            deleted_at: m.deleted_at,
        })
    }
}

impl From<audit_entry::Model> for AuditEntry {
    fn from(m: audit_entry::Model) -> Self {
        Self {
            id: m.id,
            entity_type: m.entity_type,
            entity_id: m.entity_id,
            action: m.action,
            actor_id: m.actor_id,
            department_id: m.department_id,
            filiale_id: m.filiale_id,
            details: m.details,
            created_at: m.created_at,
        }
    }
}

/// Convert a batch of rows, failing on the first undecodable one.
pub(crate) fn try_collect<M, T>(rows: Vec<M>) -> Result<Vec<T>, RepoError>
where
    T: TryFrom<M, Error = RepoError>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::domain::{TicketCategory, TicketStatus};

    fn row(status: &str) -> ticket::Model {
        let now = Utc::now();
        ticket::Model {
            id: Uuid::new_v4(),
            code: "TKT-2025-0001".to_owned(),
            category: "service_request".to_owned(),
            title: "Laptop".to_owned(),
            description: String::new(),
            status: status.to_owned(),
            priority: "high".to_owned(),
            department_id: 5,
            filiale_id: None,
            requester_id: Uuid::new_v4(),
            assignee_id: None,
            sla_id: None,
            response_due_at: None,
            resolution_due_at: None,
            resolved_at: None,
            closed_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn decodes_text_columns() {
        let ticket = Ticket::try_from(row("in_progress")).unwrap();
        assert_eq!(ticket.category, TicketCategory::ServiceRequest);
        assert_eq!(ticket.status, TicketStatus::InProgress);
    }

    #[test]
    fn unknown_stored_value_is_a_storage_fault() {
        let err = Ticket::try_from(row("escalated")).unwrap_err();
        assert!(matches!(err, RepoError::Storage { op: "decode", .. }), "{err:?}");
        assert!(format!("{err:?}").contains("escalated"));
    }
}
