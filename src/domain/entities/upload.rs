use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

const MAX_PATHNAME_LENGTH: u64 = 255;

pub const GENERATE_CLIENT_TOKEN: &str = "blob.generate-client-token";
pub const UPLOAD_COMPLETED: &str = "blob.upload-completed";

/// Body of `POST /api/upload`, discriminated by `type`.
#[derive(Debug, Deserialize, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum HandleUploadBody {
    #[serde(rename = "blob.generate-client-token")]
    GenerateClientToken(GenerateClientTokenPayload),

    #[serde(rename = "blob.upload-completed")]
    UploadCompleted(UploadCompletedPayload),
}

#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateClientTokenPayload {
    #[validate(
        length(min = 1, max = MAX_PATHNAME_LENGTH),
        custom(function = "validate_pathname")
    )]
    pub pathname: String,

    // Sent by the upload client; accepted for wire compatibility, the
    // callback always comes from configuration.
    #[serde(default)]
    pub callback_url: Option<String>,

    #[serde(default)]
    pub client_payload: Option<String>,

    #[serde(default)]
    pub multipart: bool,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadCompletedPayload {
    pub blob: BlobResult,

    #[serde(default)]
    pub token_payload: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobResult {
    pub url: String,
    pub pathname: String,

    #[serde(default)]
    pub download_url: Option<String>,

    #[serde(default)]
    pub content_type: Option<String>,

    #[serde(default)]
    pub content_disposition: Option<String>,
}

/// JSON payload signed into a client upload token. Field names are the
/// ones the storage provider reads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClientTokenPayload {
    pub pathname: String,
    pub allowed_content_types: Vec<String>,
    pub maximum_size_in_bytes: u64,
    /// Milliseconds since the epoch.
    pub valid_until: i64,
    pub add_random_suffix: bool,
    pub on_upload_completed: OnUploadCompleted,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OnUploadCompleted {
    pub callback_url: String,
    pub token_payload: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientTokenResponse {
    #[serde(rename = "type")]
    pub kind: String,
    pub client_token: String,
    pub allowed_content_types: Vec<String>,
    pub token_payload: String,
    pub valid_until: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadCompletedResponse {
    #[serde(rename = "type")]
    pub kind: String,
    pub response: String,
}

impl UploadCompletedResponse {
    pub fn ok() -> Self {
        UploadCompletedResponse {
            kind: UPLOAD_COMPLETED.to_string(),
            response: "ok".to_string(),
        }
    }
}

pub fn validate_pathname(pathname: &str) -> Result<(), ValidationError> {
    let mut err = ValidationError::new("invalid_pathname");
    if pathname.starts_with('/') {
        err.message = Some("Pathname must be relative".into());
        return Err(err);
    }
    if pathname.split('/').any(|segment| segment.is_empty() || segment == "." || segment == "..") {
        err.message = Some("Pathname contains an empty or dot segment".into());
        return Err(err);
    }
    if pathname.chars().any(|c| c.is_control() || c == '\\') {
        err.message = Some("Pathname contains forbidden characters".into());
        return Err(err);
    }
    Ok(())
}
