use std::{future::Future, sync::Arc};

use serde::{de::DeserializeOwned, Serialize};
use validator::Validate;

use crate::{
    cache::page_cache::PageCache,
    constants::{
        ADMIN_PROJECTS_PATH, DASHBOARD_PROJECT_LIMIT, HOME_PATH, HOME_PROJECT_LIMIT,
        REVALIDATE_ON_DELETE, REVALIDATE_ON_WRITE,
    },
    entities::project::{
        DashboardResponse, HomePageResponse, NewProjectRequest, Project, ProjectCreatedResponse,
        ProjectInsert, ProjectListResponse,
    },
    errors::{field_errors, AppError},
    repositories::{blob_store::BlobStore, project::ProjectRepository},
    utils::valid_uuid::valid_uuid,
};

pub struct ProjectHandler<R>
where
    R: ProjectRepository,
{
    pub project_repo: R,
    pub page_cache: Arc<dyn PageCache>,
    pub blob_store: Arc<dyn BlobStore>,
}

impl<R> ProjectHandler<R>
where
    R: ProjectRepository,
{
    pub fn new(project_repo: R, page_cache: Arc<dyn PageCache>, blob_store: Arc<dyn BlobStore>) -> Self {
        ProjectHandler { project_repo, page_cache, blob_store }
    }

    /// Editing-surface check: reports every failing field, writes nothing.
    pub fn validate_draft(&self, draft: &NewProjectRequest) -> Result<(), AppError> {
        draft.validate()?;
        Ok(())
    }

    /// Creates a project after authoritative validation
    pub async fn create_project(&self, request: NewProjectRequest) -> Result<ProjectCreatedResponse, AppError> {
        let insert = authoritative(request)?;

        let id = self.project_repo.create_project(&insert).await?;
        tracing::info!("Created project {} ({})", id, insert.title);

        self.page_cache.invalidate(&REVALIDATE_ON_WRITE);

        Ok(ProjectCreatedResponse {
            id,
            redirect_to: ADMIN_PROJECTS_PATH.to_string(),
        })
    }

    /// Retrieves a project by its ID
    pub async fn get_project(&self, id: &str) -> Result<Project, AppError> {
        let valid_id = valid_uuid(id)?;
        self.project_repo.get_project_by_id(&valid_id).await
    }

    /// Replaces every mutable field of an existing project
    pub async fn replace_project(&self, id: &str, request: NewProjectRequest) -> Result<Project, AppError> {
        let valid_id = valid_uuid(id)?;
        let insert = authoritative(request)?;

        let previous = self.project_repo.get_project_by_id(&valid_id).await?;
        let updated = self.project_repo.replace_project(&valid_id, &insert).await?;
        tracing::info!("Replaced project {}", valid_id);

        self.page_cache.invalidate(&REVALIDATE_ON_WRITE);

        if previous.image_url != updated.image_url {
            self.remove_image(&previous.image_url).await;
        }

        Ok(updated)
    }

    /// Deletes a project and, best effort, its uploaded image
    pub async fn delete_project(&self, id: &str) -> Result<(), AppError> {
        let valid_id = valid_uuid(id)?;

        let removed = self.project_repo.delete_project(&valid_id).await?;
        tracing::info!("Deleted project {} ({})", removed.id, removed.title);

        self.page_cache.invalidate(&REVALIDATE_ON_DELETE);
        self.remove_image(&removed.image_url).await;

        Ok(())
    }

    pub async fn home_page(&self) -> Result<HomePageResponse, AppError> {
        self.cached_page(HOME_PATH, || async {
            let projects = self.project_repo
                .list_recent_projects(Some(HOME_PROJECT_LIMIT))
                .await?;
            Ok(HomePageResponse { projects })
        })
        .await
    }

    /// Always read through; the dashboard is not part of the delete
    /// revalidation set.
    pub async fn dashboard(&self) -> Result<DashboardResponse, AppError> {
        let total_projects = self.project_repo.count_projects().await?;
        let recent_projects = self.project_repo
            .list_recent_projects(Some(DASHBOARD_PROJECT_LIMIT))
            .await?;
        Ok(DashboardResponse { total_projects, recent_projects })
    }

    pub async fn list_projects(&self) -> Result<ProjectListResponse, AppError> {
        self.cached_page(ADMIN_PROJECTS_PATH, || async {
            let projects = self.project_repo.list_recent_projects(None).await?;
            let total = projects.len();
            Ok(ProjectListResponse { projects, total })
        })
        .await
    }

    pub async fn check_connection(&self) -> Result<(), AppError> {
        self.project_repo.check_connection().await
    }

    async fn cached_page<T, F, Fut>(&self, path: &str, load: F) -> Result<T, AppError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        if let Some(hit) = self.page_cache.get(path) {
            match serde_json::from_value(hit) {
                Ok(page) => return Ok(page),
                Err(e) => tracing::warn!("Discarding unreadable cached page {}: {}", path, e),
            }
        }

        let generation = self.page_cache.generation(path);
        let page = load().await?;
        match serde_json::to_value(&page) {
            Ok(value) => {
                if !self.page_cache.put_if_generation(path, generation, value) {
                    tracing::debug!("Page {} changed while loading, not cached", path);
                }
            }
            Err(e) => tracing::warn!("Could not cache page {}: {}", path, e),
        }
        Ok(page)
    }

    async fn remove_image(&self, image_url: &str) {
        if !self.blob_store.owns(image_url) {
            return;
        }
        if let Err(e) = self.blob_store.delete(image_url).await {
            tracing::warn!("Orphaned blob {} left behind: {}", image_url, e);
        }
    }
}

/// The server-side pass. Failures collapse to one generic error.
fn authoritative(request: NewProjectRequest) -> Result<ProjectInsert, AppError> {
    ProjectInsert::try_from(request).map_err(|errors| {
        tracing::warn!("Rejected project submission: {:?}", field_errors(&errors));
        AppError::InvalidData
    })
}
