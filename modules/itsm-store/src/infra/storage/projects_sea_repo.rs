use async_trait::async_trait;
use chrono::Utc;
use itsm_db::secure::{
    Scoped, SecureQuery, Unscoped, build_scope_condition, scope_via_parent,
};
use itsm_db::{
    CodeSeries, CodegenConfig, DbConfig, DbResultExt, Page, PageRequest, PagingConfig, RepoError,
    SecureConn, insert_with_code,
};
use itsm_security::{Namespace, ScopeDescriptor};
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, IntoActiveModel, Order, Set};
use tracing::{info, instrument};
use uuid::Uuid;

use super::entity::{project, project_task};
use super::mapper::try_collect;
use super::{search_term, text_contains};
use crate::domain::project::{PROJECT_CODE_PREFIX, TASK_CODE_PREFIX, check_schedule};
use crate::domain::repos::ProjectsRepository;
use crate::domain::{
    NewProject, NewProjectTask, Project, ProjectFilter, ProjectPatch, ProjectStatus, ProjectTask,
    TaskStatus, require_text,
};

pub struct OrmProjectsRepository {
    db: SecureConn,
    paging: PagingConfig,
    codegen: CodegenConfig,
}

impl OrmProjectsRepository {
    #[must_use]
    pub fn new(db: SecureConn, cfg: &DbConfig) -> Self {
        Self {
            db,
            paging: cfg.paging,
            codegen: cfg.codegen,
        }
    }

    fn projects(&self, scope: Option<&ScopeDescriptor>) -> SecureQuery<project::Entity, Scoped> {
        self.db.find::<project::Entity>(scope, Namespace::PROJECTS)
    }

    /// Tasks assigned to the caller, plus every task of a visible project.
    fn tasks(scope: Option<&ScopeDescriptor>) -> SecureQuery<project_task::Entity, Scoped> {
        let visibility = scope_via_parent::<project_task::Entity, project::Entity>(
            scope,
            Namespace::PROJECTS,
            project_task::Column::ProjectId,
            build_scope_condition::<project::Entity>(scope, Namespace::PROJECTS),
        );
        SecureQuery::<project_task::Entity, Unscoped>::new().scoped_by(visibility)
    }

    async fn visible(
        &self,
        scope: Option<&ScopeDescriptor>,
        id: Uuid,
    ) -> Result<project::Model, RepoError> {
        self.projects(scope)
            .and_id(id)
            .one(self.db.conn())
            .await
            .op("projects.get")?
            .ok_or_else(|| RepoError::not_found("project", id))
    }
}

fn filter_condition(filter: &ProjectFilter) -> Condition {
    use project::Column as C;

    let mut cond = Condition::all();
    if !filter.statuses.is_empty() {
        cond = cond.add(C::Status.is_in(filter.statuses.iter().map(|s| s.as_str())));
    }
    if let Some(department) = filter.department_id {
        cond = cond.add(C::DepartmentId.eq(department));
    }
    if let Some(manager) = filter.manager_id {
        cond = cond.add(C::ManagerId.eq(manager));
    }
    if let Some(text) = search_term(filter.search.as_deref()) {
        cond = cond.add(text_contains::<project::Entity>(C::Name, text));
    }
    cond
}

#[async_trait]
impl ProjectsRepository for OrmProjectsRepository {
    #[instrument(skip(self, new), fields(department = new.department_id))]
    async fn create(&self, new: NewProject) -> Result<Project, RepoError> {
        require_text("name", &new.name)?;
        check_schedule(new.starts_on, new.ends_on)?;

        let now = Utc::now();
        let series = CodeSeries::current(PROJECT_CODE_PREFIX)?;
        let model = insert_with_code::<project::Entity, _, _>(
            self.db.conn(),
            &series,
            self.codegen.max_attempts,
            |code| project::ActiveModel {
                id: Set(Uuid::new_v4()),
                code: Set(code.to_string()),
                name: Set(new.name.trim().to_owned()),
                description: Set(new.description.clone()),
                status: Set(ProjectStatus::Planned.as_str().to_owned()),
                department_id: Set(new.department_id),
                manager_id: Set(new.manager_id),
                starts_on: Set(new.starts_on),
                ends_on: Set(new.ends_on),
                created_at: Set(now),
                updated_at: Set(now),
                deleted_at: Set(None),
            },
        )
        .await?;
        info!(code = %model.code, "project created");
        model.try_into()
    }

    #[instrument(skip(self, scope))]
    async fn get(&self, scope: Option<&ScopeDescriptor>, id: Uuid) -> Result<Project, RepoError> {
        self.visible(scope, id).await?.try_into()
    }

    #[instrument(skip(self, scope, filter, page), fields(page = page.page, page_size = page.page_size))]
    async fn list(
        &self,
        scope: Option<&ScopeDescriptor>,
        filter: &ProjectFilter,
        page: PageRequest,
    ) -> Result<Page<Project>, RepoError> {
        let window = page.window(&self.paging)?;
        let (rows, total) = self
            .projects(scope)
            .filter(filter_condition(filter))
            .include_deleted(filter.include_deleted)
            .order_by(project::Column::CreatedAt, Order::Desc)
            .page(self.db.conn(), window)
            .await
            .op("projects.list")?;
        Ok(Page::new(try_collect(rows)?, total, window))
    }

    #[instrument(skip(self, scope, patch))]
    async fn update(
        &self,
        scope: Option<&ScopeDescriptor>,
        id: Uuid,
        patch: ProjectPatch,
    ) -> Result<Project, RepoError> {
        let current = self.visible(scope, id).await?;
        if patch == ProjectPatch::default() {
            return current.try_into();
        }
        if let Some(name) = &patch.name {
            require_text("name", name)?;
        }
        check_schedule(
            patch.starts_on.unwrap_or(current.starts_on),
            patch.ends_on.unwrap_or(current.ends_on),
        )?;

        let mut am = current.into_active_model();
        if let Some(name) = patch.name {
            am.name = Set(name.trim().to_owned());
        }
        if let Some(description) = patch.description {
            am.description = Set(description);
        }
        if let Some(status) = patch.status {
            am.status = Set(status.as_str().to_owned());
        }
        if let Some(department) = patch.department_id {
            am.department_id = Set(department);
        }
        if let Some(manager) = patch.manager_id {
            am.manager_id = Set(manager);
        }
        if let Some(starts_on) = patch.starts_on {
            am.starts_on = Set(starts_on);
        }
        if let Some(ends_on) = patch.ends_on {
            am.ends_on = Set(ends_on);
        }
        am.updated_at = Set(Utc::now());
        am.update(self.db.conn())
            .await
            .op("projects.update")?
            .try_into()
    }

    #[instrument(skip(self, scope))]
    async fn soft_delete(
        &self,
        scope: Option<&ScopeDescriptor>,
        id: Uuid,
    ) -> Result<(), RepoError> {
        let affected = self
            .projects(scope)
            .and_id(id)
            .soft_delete(self.db.conn(), Utc::now())
            .await
            .op("projects.soft_delete")?;
        if affected == 0 {
            return Err(RepoError::not_found("project", id));
        }
        Ok(())
    }

    #[instrument(skip(self, scope, new), fields(project_id = %new.project_id))]
    async fn create_task(
        &self,
        scope: Option<&ScopeDescriptor>,
        new: NewProjectTask,
    ) -> Result<ProjectTask, RepoError> {
        require_text("title", &new.title)?;
        let conn = self.db.conn();
        let parent_visible = self
            .projects(scope)
            .and_id(new.project_id)
            .exists(conn)
            .await
            .op("projects.create_task")?;
        if !parent_visible {
            return Err(RepoError::not_found("project", new.project_id));
        }

        let now = Utc::now();
        let series = CodeSeries::current(TASK_CODE_PREFIX)?;
        let model = insert_with_code::<project_task::Entity, _, _>(
            conn,
            &series,
            self.codegen.max_attempts,
            |code| project_task::ActiveModel {
                id: Set(Uuid::new_v4()),
                code: Set(code.to_string()),
                project_id: Set(new.project_id),
                title: Set(new.title.trim().to_owned()),
                status: Set(TaskStatus::Todo.as_str().to_owned()),
                assignee_id: Set(new.assignee_id),
                due_on: Set(new.due_on),
                created_at: Set(now),
                updated_at: Set(now),
                deleted_at: Set(None),
            },
        )
        .await?;
        info!(code = %model.code, "project task created");
        model.try_into()
    }

    #[instrument(skip(self, scope, page), fields(page = page.page, page_size = page.page_size))]
    async fn list_tasks(
        &self,
        scope: Option<&ScopeDescriptor>,
        project_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<ProjectTask>, RepoError> {
        let window = page.window(&self.paging)?;
        let (rows, total) = Self::tasks(scope)
            .filter(project_task::Column::ProjectId.eq(project_id))
            .order_by(project_task::Column::CreatedAt, Order::Desc)
            .page(self.db.conn(), window)
            .await
            .op("projects.list_tasks")?;
        Ok(Page::new(try_collect(rows)?, total, window))
    }

    #[instrument(skip(self, scope))]
    async fn set_task_status(
        &self,
        scope: Option<&ScopeDescriptor>,
        task_id: Uuid,
        status: TaskStatus,
    ) -> Result<ProjectTask, RepoError> {
        let task = Self::tasks(scope)
            .and_id(task_id)
            .one(self.db.conn())
            .await
            .op("projects.set_task_status")?
            .ok_or_else(|| RepoError::not_found("project task", task_id))?;

        let mut am = task.into_active_model();
        am.status = Set(status.as_str().to_owned());
        am.updated_at = Set(Utc::now());
        am.update(self.db.conn())
            .await
            .op("projects.set_task_status")?
            .try_into()
    }
}
