use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub user_id: Uuid,
    pub minutes: i32,
    pub work_date: NaiveDate,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewTimeEntry {
    pub ticket_id: Uuid,
    pub user_id: Uuid,
    pub minutes: i32,
    pub work_date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
}
