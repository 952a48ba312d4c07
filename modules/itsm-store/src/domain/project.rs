use chrono::{DateTime, NaiveDate, Utc};
use itsm_db::RepoError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::text_enum::text_enum;

pub const PROJECT_CODE_PREFIX: &str = "PRJ";
pub const TASK_CODE_PREFIX: &str = "TAP";

text_enum! {
    pub enum ProjectStatus: "project status" {
        Planned => "planned",
        Active => "active",
        OnHold => "on_hold",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

text_enum! {
    pub enum TaskStatus: "task status" {
        Todo => "todo",
        InProgress => "in_progress",
        Done => "done",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub department_id: i64,
    pub manager_id: Uuid,
    pub starts_on: Option<NaiveDate>,
    pub ends_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewProject {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub department_id: i64,
    pub manager_id: Uuid,
    #[serde(default)]
    pub starts_on: Option<NaiveDate>,
    #[serde(default)]
    pub ends_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<ProjectStatus>,
    pub department_id: Option<i64>,
    pub manager_id: Option<Uuid>,
    pub starts_on: Option<Option<NaiveDate>>,
    pub ends_on: Option<Option<NaiveDate>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProjectFilter {
    pub statuses: Vec<ProjectStatus>,
    pub department_id: Option<i64>,
    pub manager_id: Option<Uuid>,
    pub search: Option<String>,
    pub include_deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectTask {
    pub id: Uuid,
    pub code: String,
    pub project_id: Uuid,
    pub title: String,
    pub status: TaskStatus,
    pub assignee_id: Option<Uuid>,
    pub due_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewProjectTask {
    pub project_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub assignee_id: Option<Uuid>,
    #[serde(default)]
    pub due_on: Option<NaiveDate>,
}

/// A project may not end before it starts.
pub(crate) fn check_schedule(
    starts_on: Option<NaiveDate>,
    ends_on: Option<NaiveDate>,
) -> Result<(), RepoError> {
    if let (Some(start), Some(end)) = (starts_on, ends_on)
        && end < start
    {
        return Err(RepoError::malformed(
            "ends_on",
            format!("{end} is before starts_on {start}"),
        ));
    }
    Ok(())
}
