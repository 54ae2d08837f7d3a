use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

pub const HOME_PATH: &str = "/";
pub const ADMIN_PATH: &str = "/admin";
pub const ADMIN_PROJECTS_PATH: &str = "/admin/projects";

/// Pages that render project data and go stale after a create or replace.
pub const REVALIDATE_ON_WRITE: [&str; 3] = [HOME_PATH, ADMIN_PATH, ADMIN_PROJECTS_PATH];
/// Pages that go stale after a delete.
pub const REVALIDATE_ON_DELETE: [&str; 2] = [ADMIN_PROJECTS_PATH, HOME_PATH];

pub const HOME_PROJECT_LIMIT: u32 = 5;
pub const DASHBOARD_PROJECT_LIMIT: u32 = 5;

pub const ALLOWED_IMAGE_CONTENT_TYPES: [&str; 4] =
    ["image/jpeg", "image/png", "image/gif", "image/webp"];
