use validator::Validate;

use crate::{
    blob::client_token::ClientTokenService,
    entities::upload::{
        ClientTokenResponse, GenerateClientTokenPayload, UploadCompletedPayload,
        UploadCompletedResponse, GENERATE_CLIENT_TOKEN,
    },
    errors::{field_errors, AppError},
};

/// Metadata attached to every token; echoed back on completion.
const TOKEN_PAYLOAD: &str = "{}";

pub struct UploadHandler {
    pub token_service: ClientTokenService,
}

impl UploadHandler {
    pub fn new(token_service: ClientTokenService) -> Self {
        UploadHandler { token_service }
    }

    /// Issues a scoped token the browser uses to upload straight to storage.
    /// The caller must already be authorized.
    pub fn generate_client_token(&self, payload: GenerateClientTokenPayload) -> Result<ClientTokenResponse, AppError> {
        payload.validate().map_err(|errors| {
            let reason = field_errors(&errors)
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join(", ");
            AppError::UploadError(format!("Invalid upload request: {}", reason))
        })?;

        let (client_token, signed) = self.token_service.issue(&payload.pathname, TOKEN_PAYLOAD)?;
        tracing::info!("Issued upload token for {}", signed.pathname);

        Ok(ClientTokenResponse {
            kind: GENERATE_CLIENT_TOKEN.to_string(),
            client_token,
            allowed_content_types: signed.allowed_content_types,
            token_payload: signed.on_upload_completed.token_payload,
            valid_until: signed.valid_until,
        })
    }

    /// Storage webhook. Authenticity comes from the body signature, and the
    /// event is only logged.
    pub fn upload_completed(
        &self,
        raw_body: &[u8],
        signature: Option<&str>,
        payload: UploadCompletedPayload,
    ) -> Result<UploadCompletedResponse, AppError> {
        let signature = signature
            .ok_or_else(|| AppError::UploadError("Missing callback signature".into()))?;

        if !self.token_service.verify_body(raw_body, signature) {
            tracing::warn!("Rejected upload callback for {} with a bad signature", payload.blob.pathname);
            return Err(AppError::UploadError("Invalid callback signature".into()));
        }

        tracing::info!(
            "Upload completed: {} ({})",
            payload.blob.url,
            payload.blob.content_type.as_deref().unwrap_or("unknown type")
        );

        Ok(UploadCompletedResponse::ok())
    }
}
