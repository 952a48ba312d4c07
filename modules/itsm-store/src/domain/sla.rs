use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ticket::{Priority, TicketCategory};

/// Response and resolution targets for one (category, priority) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sla {
    pub id: Uuid,
    pub name: String,
    pub category: TicketCategory,
    pub priority: Priority,
    pub response_minutes: i32,
    pub resolution_minutes: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Sla {
    /// `(response_due_at, resolution_due_at)` for a ticket opened at `opened`.
    #[must_use]
    pub fn due_dates(&self, opened: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        (
            opened + Duration::minutes(i64::from(self.response_minutes)),
            opened + Duration::minutes(i64::from(self.resolution_minutes)),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewSla {
    pub name: String,
    pub category: TicketCategory,
    pub priority: Priority,
    pub response_minutes: i32,
    pub resolution_minutes: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SlaPatch {
    pub name: Option<String>,
    pub response_minutes: Option<i32>,
    pub resolution_minutes: Option<i32>,
    pub active: Option<bool>,
}
