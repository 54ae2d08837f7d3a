use std::{sync::Arc, time::Duration};

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod telemetry;

pub use domain::{entities, use_cases};
pub use interfaces::{handlers, repositories, middlewares, routes};
pub use infrastructure::{auth, blob, cache, db, utils};

use auth::jwt::JwtService;
use blob::client_token::ClientTokenService;
use cache::page_cache::{InMemoryPageCache, PageCache};
use repositories::{
    blob_store::{BlobStore, VercelBlobStore},
    project::ProjectRepository,
    sqlx_repo::SqlxProjectRepo,
};
use use_cases::{auth::AuthHandler, projects::ProjectHandler, upload::UploadHandler};

pub struct AppState {
    pub project_handler: AppProjectHandler,
    pub upload_handler: UploadHandler,
    pub auth_handler: AuthHandler,
}

pub type SharedProjectRepo = Arc<dyn ProjectRepository>;
pub type AppProjectHandler = ProjectHandler<SharedProjectRepo>;

impl AppState {
    pub fn new(config: &settings::AppConfig, pool: sqlx::PgPool) -> Self {
        let page_cache = Arc::new(InMemoryPageCache::new(Duration::from_secs(config.page_cache_ttl_secs)));
        let blob_store = Arc::new(VercelBlobStore::new(config, reqwest::Client::new()));

        Self::with_parts(config, Arc::new(SqlxProjectRepo::new(pool)), page_cache, blob_store)
    }

    /// Assembles the state around an arbitrary repository, cache and store.
    pub fn with_parts(
        config: &settings::AppConfig,
        project_repo: SharedProjectRepo,
        page_cache: Arc<dyn PageCache>,
        blob_store: Arc<dyn BlobStore>,
    ) -> Self {
        AppState {
            project_handler: ProjectHandler::new(project_repo, page_cache, blob_store),
            upload_handler: UploadHandler::new(ClientTokenService::new(config)),
            auth_handler: AuthHandler::new(config, JwtService::new(config)),
        }
    }
}
