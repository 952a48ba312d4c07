use async_trait::async_trait;
use itsm_db::{Page, PageRequest, RepoError};
use itsm_security::ScopeDescriptor;
use uuid::Uuid;

use crate::domain::{
    NewProject, NewProjectTask, Project, ProjectFilter, ProjectPatch, ProjectTask, TaskStatus,
};

#[async_trait]
pub trait ProjectsRepository: Send + Sync {
    async fn create(&self, new: NewProject) -> Result<Project, RepoError>;

    async fn get(&self, scope: Option<&ScopeDescriptor>, id: Uuid) -> Result<Project, RepoError>;

    async fn list(
        &self,
        scope: Option<&ScopeDescriptor>,
        filter: &ProjectFilter,
        page: PageRequest,
    ) -> Result<Page<Project>, RepoError>;

    async fn update(
        &self,
        scope: Option<&ScopeDescriptor>,
        id: Uuid,
        patch: ProjectPatch,
    ) -> Result<Project, RepoError>;

    async fn soft_delete(&self, scope: Option<&ScopeDescriptor>, id: Uuid)
    -> Result<(), RepoError>;

    /// The parent project must be visible to the caller.
    async fn create_task(
        &self,
        scope: Option<&ScopeDescriptor>,
        new: NewProjectTask,
    ) -> Result<ProjectTask, RepoError>;

    async fn list_tasks(
        &self,
        scope: Option<&ScopeDescriptor>,
        project_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<ProjectTask>, RepoError>;

    async fn set_task_status(
        &self,
        scope: Option<&ScopeDescriptor>,
        task_id: Uuid,
        status: TaskStatus,
    ) -> Result<ProjectTask, RepoError>;
}
