pub mod auth;
pub mod blob;
pub mod cache;
pub mod db;
pub mod utils;
