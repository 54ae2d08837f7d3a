use actix_web::{post, web, HttpRequest, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    entities::upload::HandleUploadBody,
    errors::AppError,
    use_cases::extractors::AdminClaims,
    AppState,
};

const SIGNATURE_HEADER: &str = "x-vercel-signature";

/// Single endpoint for both halves of the direct-upload handshake.
#[post("/upload")]
#[instrument(skip_all)]
pub async fn handle_upload(
    req: HttpRequest,
    admin: Option<AdminClaims>,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<impl Responder, AppError> {
    let event: HandleUploadBody = serde_json::from_slice(&body)
        .map_err(|e| AppError::UploadError(format!("Invalid upload request: {}", e)))?;

    let response = match event {
        HandleUploadBody::GenerateClientToken(payload) => {
            if admin.is_none() {
                return Err(AppError::UnauthorizedAccess);
            }
            let token = state.upload_handler.generate_client_token(payload)?;
            serde_json::to_value(token)
        }
        HandleUploadBody::UploadCompleted(payload) => {
            let signature = req.headers()
                .get(SIGNATURE_HEADER)
                .and_then(|value| value.to_str().ok());
            let ack = state.upload_handler.upload_completed(&body, signature, payload)?;
            serde_json::to_value(ack)
        }
    }
    .map_err(|e| AppError::InternalError(format!("Failed to encode upload response: {}", e)))?;

    Ok(HttpResponse::Ok().json(response))
}
