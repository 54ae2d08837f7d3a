pub mod blob_store;
pub mod project;
pub mod sqlx_repo;
