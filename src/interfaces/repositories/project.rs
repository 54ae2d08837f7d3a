use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;
use sqlx::PgPool;

use crate::{
    entities::project::{Project, ProjectInsert},
    errors::AppError,
    repositories::sqlx_repo::SqlxProjectRepo,
};

const PROJECT_COLUMNS: &str =
    "id, title, description, image_url, link, deploy_url, color, tags, created_at, updated_at";

#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn create_project(&self, project: &ProjectInsert) -> Result<Uuid, AppError>;
    /// Newest first. `None` means no limit.
    async fn list_recent_projects(&self, limit: Option<u32>) -> Result<Vec<Project>, AppError>;
    async fn count_projects(&self) -> Result<i64, AppError>;
    async fn get_project_by_id(&self, id: &Uuid) -> Result<Project, AppError>;
    async fn replace_project(&self, id: &Uuid, project: &ProjectInsert) -> Result<Project, AppError>;
    /// Returns the removed row.
    async fn delete_project(&self, id: &Uuid) -> Result<Project, AppError>;
    async fn check_connection(&self) -> Result<(), AppError>;
}

#[async_trait]
impl<T> ProjectRepository for Arc<T>
where
    T: ProjectRepository + ?Sized,
{
    async fn create_project(&self, project: &ProjectInsert) -> Result<Uuid, AppError> {
        (**self).create_project(project).await
    }

    async fn list_recent_projects(&self, limit: Option<u32>) -> Result<Vec<Project>, AppError> {
        (**self).list_recent_projects(limit).await
    }

    async fn count_projects(&self) -> Result<i64, AppError> {
        (**self).count_projects().await
    }

    async fn get_project_by_id(&self, id: &Uuid) -> Result<Project, AppError> {
        (**self).get_project_by_id(id).await
    }

    async fn replace_project(&self, id: &Uuid, project: &ProjectInsert) -> Result<Project, AppError> {
        (**self).replace_project(id, project).await
    }

    async fn delete_project(&self, id: &Uuid) -> Result<Project, AppError> {
        (**self).delete_project(id).await
    }

    async fn check_connection(&self) -> Result<(), AppError> {
        (**self).check_connection().await
    }
}

impl SqlxProjectRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxProjectRepo { pool }
    }
}

#[async_trait]
impl ProjectRepository for SqlxProjectRepo {
    async fn create_project(&self, project: &ProjectInsert) -> Result<Uuid, AppError> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO projects (title, description, image_url, link, deploy_url, color, tags)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
            "#,
        )
        .bind(&project.title)
        .bind(&project.description)
        .bind(&project.image_url)
        .bind(&project.link)
        .bind(&project.deploy_url)
        .bind(&project.color)
        .bind(&project.tags)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn list_recent_projects(&self, limit: Option<u32>) -> Result<Vec<Project>, AppError> {
        // LIMIT NULL is LIMIT ALL in Postgres.
        let projects = sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY created_at DESC, id DESC LIMIT $1"
        ))
        .bind(limit.map(i64::from))
        .fetch_all(&self.pool)
        .await?;

        Ok(projects)
    }

    async fn count_projects(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn get_project_by_id(&self, id: &Uuid) -> Result<Project, AppError> {
        sqlx::query_as::<_, Project>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))
    }

    async fn replace_project(&self, id: &Uuid, project: &ProjectInsert) -> Result<Project, AppError> {
        sqlx::query_as::<_, Project>(&format!(
            r#"
            UPDATE projects SET
                title = $2,
                description = $3,
                image_url = $4,
                link = $5,
                deploy_url = $6,
                color = $7,
                tags = $8,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&project.title)
        .bind(&project.description)
        .bind(&project.image_url)
        .bind(&project.link)
        .bind(&project.deploy_url)
        .bind(&project.color)
        .bind(&project.tags)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))
    }

    async fn delete_project(&self, id: &Uuid) -> Result<Project, AppError> {
        sqlx::query_as::<_, Project>(&format!(
            "DELETE FROM projects WHERE id = $1 RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))
    }

    async fn check_connection(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
