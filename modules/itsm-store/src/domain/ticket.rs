use chrono::{DateTime, Utc};
use itsm_security::Namespace;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::text_enum::text_enum;

/// Business code prefix shared by every ticket category.
pub const TICKET_CODE_PREFIX: &str = "TKT";

text_enum! {
    pub enum TicketCategory: "ticket category" {
        Incident => "incident",
        Change => "change",
        ServiceRequest => "service_request",
        Problem => "problem",
    }
}

impl TicketCategory {
    /// Permission namespace guarding tickets of this category.
    #[must_use]
    pub const fn namespace(self) -> Namespace {
        match self {
            Self::Incident => Namespace::INCIDENTS,
            Self::Change => Namespace::CHANGES,
            Self::ServiceRequest => Namespace::REQUESTS,
            Self::Problem => Namespace::PROBLEMS,
        }
    }
}

text_enum! {
    pub enum TicketStatus: "ticket status" {
        New => "new",
        Open => "open",
        InProgress => "in_progress",
        Pending => "pending",
        Resolved => "resolved",
        Closed => "closed",
        Cancelled => "cancelled",
    }
}

impl TicketStatus {
    /// No further work is expected; SLA clocks no longer apply.
    #[must_use]
    pub const fn is_done(self) -> bool {
        matches!(self, Self::Resolved | Self::Closed | Self::Cancelled)
    }

    /// Closed and cancelled tickets accept no further status changes.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Closed | Self::Cancelled)
    }
}

text_enum! {
    pub enum Priority: "priority" {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Uuid,
    pub code: String,
    pub category: TicketCategory,
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: Priority,
    pub department_id: i64,
    pub filiale_id: Option<i64>,
    pub requester_id: Uuid,
    pub assignee_id: Option<Uuid>,
    pub sla_id: Option<Uuid>,
    pub response_due_at: Option<DateTime<Utc>>,
    pub resolution_due_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Ticket {
    /// Resolution deadline passed while the ticket is still open.
    #[must_use]
    pub fn is_breached(&self, now: DateTime<Utc>) -> bool {
        !self.status.is_done() && self.resolution_due_at.is_some_and(|due| due < now)
    }
}

/// Listing row: the ticket plus display fields from related tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TicketListItem {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub sla_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewTicket {
    pub category: TicketCategory,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub priority: Priority,
    pub department_id: i64,
    #[serde(default)]
    pub filiale_id: Option<i64>,
    pub requester_id: Uuid,
    #[serde(default)]
    pub assignee_id: Option<Uuid>,
}

/// Partial update. `None` leaves a field untouched; for nullable columns
/// `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TicketPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub department_id: Option<i64>,
    pub filiale_id: Option<Option<i64>>,
}

impl TicketPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TicketFilter {
    /// Empty means every category.
    pub categories: Vec<TicketCategory>,
    /// Empty means every status.
    pub statuses: Vec<TicketStatus>,
    pub priority: Option<Priority>,
    pub department_id: Option<i64>,
    pub assignee_id: Option<Uuid>,
    pub requester_id: Option<Uuid>,
    /// Case-insensitive substring of the title.
    pub search: Option<String>,
    pub breached: bool,
    pub include_deleted: bool,
}
