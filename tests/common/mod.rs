#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use actix_web::web;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use once_cell::sync::Lazy;
use serde_json::Value;
use uuid::Uuid;

use portfolio_site::{
    auth::password::hash_password,
    cache::page_cache::PageCache,
    entities::project::{NewProjectRequest, Project, ProjectInsert},
    errors::AppError,
    repositories::{blob_store::BlobStore, project::ProjectRepository},
    settings::{AppConfig, AppEnvironment},
    AppState,
};

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "correct horse battery staple";
pub const BLOB_TOKEN: &str = "vercel_blob_rw_test_store_secret";
pub const BLOB_HOST: &str = "public.blob.vercel-storage.com";

static ADMIN_HASH: Lazy<String> = Lazy::new(|| {
    hash_password(ADMIN_PASSWORD).expect("hash test password")
});

pub fn test_config() -> AppConfig {
    AppConfig {
        env: AppEnvironment::Testing,
        name: "portfolio-site-test".into(),
        port: 0,
        host: "127.0.0.1".into(),
        worker_count: 1,
        database_url: "postgres://unused/test".into(),
        cors_allowed_origins: vec!["*".into()],
        jwt_secret: "test_jwt_secret_that_is_long_enough_for_hs512".into(),
        jwt_expiration_minutes: 15,
        admin_email: ADMIN_EMAIL.into(),
        admin_password_hash: ADMIN_HASH.clone(),
        blob_read_write_token: BLOB_TOKEN.into(),
        blob_public_host: BLOB_HOST.into(),
        blob_api_url: "https://blob.vercel-storage.com".into(),
        public_base_url: "https://portfolio.test".into(),
        upload_token_ttl_secs: 600,
        upload_max_bytes: 4_718_592,
        page_cache_ttl_secs: 60,
    }
}

pub fn sample_request() -> NewProjectRequest {
    NewProjectRequest {
        title: "Portfolio".into(),
        description: "A site that lists my work".into(),
        image_url: format!("https://store.{}/portfolio.png", BLOB_HOST),
        link: "https://github.com/someone/portfolio".into(),
        deploy_url: "https://portfolio.test".into(),
        color: "#3b82f6".into(),
        tags: vec!["rust".into(), "actix".into()],
    }
}

pub fn project_from(id: Uuid, insert: &ProjectInsert) -> Project {
    let now = Utc::now();
    Project {
        id,
        title: insert.title.clone(),
        description: insert.description.clone(),
        image_url: insert.image_url.clone(),
        link: insert.link.clone(),
        deploy_url: insert.deploy_url.clone(),
        color: insert.color.clone(),
        tags: insert.tags.clone(),
        created_at: now,
        updated_at: now,
    }
}

/// Vec-backed repository. Rows are kept in insertion order and each one
/// gets a strictly later `created_at` than the previous.
#[derive(Default)]
pub struct InMemoryProjectRepo {
    rows: Mutex<Vec<Project>>,
}

impl InMemoryProjectRepo {
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn all(&self) -> Vec<Project> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepo {
    async fn create_project(&self, project: &ProjectInsert) -> Result<Uuid, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let id = Uuid::new_v4();
        let mut row = project_from(id, project);
        row.created_at = Utc::now() + Duration::milliseconds(rows.len() as i64);
        row.updated_at = row.created_at;
        rows.push(row);
        Ok(id)
    }

    async fn list_recent_projects(&self, limit: Option<u32>) -> Result<Vec<Project>, AppError> {
        let rows = self.rows.lock().unwrap();
        let newest_first = rows.iter().rev().cloned();
        Ok(match limit {
            Some(n) => newest_first.take(n as usize).collect(),
            None => newest_first.collect(),
        })
    }

    async fn count_projects(&self) -> Result<i64, AppError> {
        Ok(self.rows.lock().unwrap().len() as i64)
    }

    async fn get_project_by_id(&self, id: &Uuid) -> Result<Project, AppError> {
        self.rows.lock().unwrap()
            .iter()
            .find(|p| &p.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Project not found".into()))
    }

    async fn replace_project(&self, id: &Uuid, project: &ProjectInsert) -> Result<Project, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows.iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| AppError::NotFound("Project not found".into()))?;

        let created_at = row.created_at;
        *row = project_from(*id, project);
        row.created_at = created_at;
        Ok(row.clone())
    }

    async fn delete_project(&self, id: &Uuid) -> Result<Project, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let index = rows.iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| AppError::NotFound("Project not found".into()))?;
        Ok(rows.remove(index))
    }

    async fn check_connection(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// Remembers every invalidation and never serves a hit.
#[derive(Default)]
pub struct RecordingPageCache {
    pub invalidations: Mutex<Vec<Vec<String>>>,
}

impl RecordingPageCache {
    pub fn invalidations(&self) -> Vec<Vec<String>> {
        self.invalidations.lock().unwrap().clone()
    }
}

impl PageCache for RecordingPageCache {
    fn get(&self, _path: &str) -> Option<Value> {
        None
    }

    fn generation(&self, _path: &str) -> u64 {
        0
    }

    fn put_if_generation(&self, _path: &str, _generation: u64, _page: Value) -> bool {
        false
    }

    fn invalidate(&self, paths: &[&str]) {
        self.invalidations.lock().unwrap()
            .push(paths.iter().map(|p| p.to_string()).collect());
    }
}

#[derive(Default)]
pub struct RecordingBlobStore {
    pub deleted: Mutex<Vec<String>>,
}

impl RecordingBlobStore {
    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl BlobStore for RecordingBlobStore {
    fn owns(&self, url: &str) -> bool {
        url.contains(BLOB_HOST)
    }

    async fn delete(&self, url: &str) -> Result<(), AppError> {
        self.deleted.lock().unwrap().push(url.to_string());
        Ok(())
    }
}

pub struct TestContext {
    pub state: web::Data<AppState>,
    pub repo: Arc<InMemoryProjectRepo>,
    pub blobs: Arc<RecordingBlobStore>,
}

impl TestContext {
    pub fn new() -> Self {
        let repo = Arc::new(InMemoryProjectRepo::default());
        let blobs = Arc::new(RecordingBlobStore::default());
        let cache = Arc::new(portfolio_site::cache::page_cache::InMemoryPageCache::new(
            std::time::Duration::from_secs(60),
        ));

        let state = AppState::with_parts(&test_config(), repo.clone(), cache, blobs.clone());

        TestContext {
            state: web::Data::new(state),
            repo,
            blobs,
        }
    }

    pub fn admin_token(&self) -> String {
        self.state.auth_handler.token_service
            .create_admin_jwt(ADMIN_EMAIL)
            .expect("sign admin token")
    }

    pub fn bearer(&self) -> (&'static str, String) {
        ("Authorization", format!("Bearer {}", self.admin_token()))
    }
}

/// Builds the service the way `main` assembles it, minus CORS and logging.
#[macro_export]
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($state.clone())
                .wrap(portfolio_site::middlewares::auth::AuthMiddleware)
                .wrap(actix_web::middleware::NormalizePath::trim())
                .configure(portfolio_site::routes::configure_routes),
        )
        .await
    };
}
