use std::borrow::Cow;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{constants::ALLOWED_IMAGE_CONTENT_TYPES, entities::tag_set::TagSet};

// ───── Constants ──────────────────────────────────────────────────────
pub const MIN_TITLE_LENGTH: u64 = 2;
pub const MIN_DESCRIPTION_LENGTH: u64 = 10;
pub const MIN_TAGS: u64 = 1;
pub const DEFAULT_COLOR: &str = "#3b82f6";

static HEX_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^#([0-9A-F]{3}){1,2}$").expect("hex color pattern is valid")
});

// ───── Database Models ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub link: String,
    pub deploy_url: String,
    pub color: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A record that passed authoritative validation and may be written.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct ProjectInsert {
    #[validate(length(min = MIN_TITLE_LENGTH))]
    pub title: String,

    #[validate(length(min = MIN_DESCRIPTION_LENGTH))]
    pub description: String,

    #[validate(custom(function = "validate_absolute_url"))]
    pub image_url: String,

    #[validate(custom(function = "validate_absolute_url"))]
    pub link: String,

    #[validate(custom(function = "validate_absolute_url"))]
    pub deploy_url: String,

    #[validate(custom(function = "validate_hex_color"))]
    pub color: String,

    #[validate(length(min = MIN_TAGS))]
    pub tags: Vec<String>,
}

// ───── Input & Validation Requests ──────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewProjectRequest {
    #[validate(length(min = MIN_TITLE_LENGTH, message = "Title must be at least 2 characters"))]
    pub title: String,

    #[validate(length(
        min = MIN_DESCRIPTION_LENGTH,
        message = "Description must be at least 10 characters"
    ))]
    pub description: String,

    #[validate(custom(function = "validate_absolute_url"))]
    pub image_url: String,

    #[validate(custom(function = "validate_absolute_url"))]
    pub link: String,

    #[validate(custom(function = "validate_absolute_url"))]
    pub deploy_url: String,

    #[validate(custom(function = "validate_hex_color"))]
    pub color: String,

    #[validate(length(min = MIN_TAGS, message = "Add at least one tag"))]
    pub tags: Vec<String>,
}

// ───── API Response Models ──────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCreatedResponse {
    pub id: Uuid,
    pub redirect_to: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectListResponse {
    pub projects: Vec<Project>,
    pub total: usize,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub total_projects: i64,
    pub recent_projects: Vec<Project>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomePageResponse {
    pub projects: Vec<Project>,
}

/// Defaults and rules the new-project form renders with.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFormResponse {
    pub defaults: ProjectFormDefaults,
    pub rules: ProjectFormRules,
    pub allowed_image_types: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct ProjectFormDefaults {
    pub color: &'static str,
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFormRules {
    pub title_min_length: u64,
    pub description_min_length: u64,
    pub min_tags: u64,
    pub color_pattern: &'static str,
}

impl ProjectFormResponse {
    pub fn new() -> Self {
        ProjectFormResponse {
            defaults: ProjectFormDefaults {
                color: DEFAULT_COLOR,
                tags: Vec::new(),
            },
            rules: ProjectFormRules {
                title_min_length: MIN_TITLE_LENGTH,
                description_min_length: MIN_DESCRIPTION_LENGTH,
                min_tags: MIN_TAGS,
                color_pattern: "^#([0-9A-F]{3}){1,2}$",
            },
            allowed_image_types: ALLOWED_IMAGE_CONTENT_TYPES.to_vec(),
        }
    }
}

impl Default for ProjectFormResponse {
    fn default() -> Self {
        Self::new()
    }
}

// ───── Validation Helpers ───────────────────────────────────────────

pub fn validate_absolute_url(url: &str) -> Result<(), ValidationError> {
    // `Url::parse` rejects relative references outright.
    match url::Url::parse(url) {
        Ok(parsed) if parsed.has_host() => Ok(()),
        Ok(_) => Err(new_validation_error("invalid_url", "URL must include a host")),
        Err(_) => Err(new_validation_error("invalid_url", "Enter a valid URL")),
    }
}

pub fn validate_hex_color(color: &str) -> Result<(), ValidationError> {
    if HEX_COLOR.is_match(color) {
        Ok(())
    } else {
        Err(new_validation_error("invalid_color", "Enter a valid hex code (e.g. #3b82f6)"))
    }
}

fn new_validation_error(code: &'static str, msg: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(msg));
    err
}

// ───── Conversions ──────────────────────────────────────────────────

impl TryFrom<NewProjectRequest> for ProjectInsert {
    type Error = ValidationErrors;

    fn try_from(value: NewProjectRequest) -> Result<Self, Self::Error> {
        value.validate()?;

        let tags = value.tags.iter().collect::<TagSet>().into_vec();

        let insert = ProjectInsert {
            title: value.title,
            description: value.description,
            image_url: value.image_url,
            link: value.link,
            deploy_url: value.deploy_url,
            color: value.color,
            tags,
        };

        // Tags may have collapsed to nothing once blanks were dropped.
        insert.validate()?;
        Ok(insert)
    }
}
