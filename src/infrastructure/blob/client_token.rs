use base64::{engine::general_purpose, Engine};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::{
    constants::ALLOWED_IMAGE_CONTENT_TYPES,
    entities::upload::{ClientTokenPayload, OnUploadCompleted},
    errors::AppError,
    settings::AppConfig,
};

const CLIENT_TOKEN_PREFIX: &str = "vercel_blob_client_";

/// Store id embedded in a `vercel_blob_rw_<store>_<secret>` token.
pub fn store_id(read_write_token: &str) -> Option<&str> {
    read_write_token
        .strip_prefix("vercel_blob_rw_")
        .and_then(|rest| rest.split('_').next())
        .filter(|id| !id.is_empty())
}

/// Signs scoped direct-to-storage upload tokens and checks the signature
/// on upload-completed callbacks. Both are keyed by the store's read-write
/// token.
///
/// A client token is
/// `vercel_blob_client_<store>_<base64("<hex hmac>.<base64 json payload>")>`,
/// where the HMAC-SHA256 covers the base64 payload text.
#[derive(Clone)]
pub struct ClientTokenService {
    secret: Zeroizing<String>,
    ttl: Duration,
    maximum_size_in_bytes: u64,
    callback_url: String,
}

impl ClientTokenService {
    pub fn new(config: &AppConfig) -> Self {
        ClientTokenService {
            secret: Zeroizing::new(config.blob_read_write_token.clone()),
            ttl: Duration::seconds(config.upload_token_ttl_secs),
            maximum_size_in_bytes: config.upload_max_bytes,
            callback_url: config.upload_callback_url(),
        }
    }

    pub fn issue(&self, pathname: &str, token_payload: &str) -> Result<(String, ClientTokenPayload), AppError> {
        let store = store_id(&self.secret).ok_or_else(|| {
            tracing::error!("Blob read-write token does not carry a store id");
            AppError::InternalError("Malformed blob read-write token".into())
        })?;

        let payload = ClientTokenPayload {
            pathname: pathname.to_string(),
            allowed_content_types: ALLOWED_IMAGE_CONTENT_TYPES.iter().map(|t| t.to_string()).collect(),
            maximum_size_in_bytes: self.maximum_size_in_bytes,
            valid_until: (Utc::now() + self.ttl).timestamp_millis(),
            add_random_suffix: true,
            on_upload_completed: OnUploadCompleted {
                callback_url: self.callback_url.clone(),
                token_payload: token_payload.to_string(),
            },
        };

        let json = serde_json::to_vec(&payload)
            .map_err(|e| AppError::InternalError(format!("Failed to encode upload token: {}", e)))?;
        let encoded_payload = general_purpose::STANDARD.encode(json);

        let signature = self.sign_body(encoded_payload.as_bytes())
            .ok_or_else(|| AppError::InternalError("Could not sign upload token".into()))?;

        let token = format!(
            "{}{}_{}",
            CLIENT_TOKEN_PREFIX,
            store,
            general_purpose::STANDARD.encode(format!("{}.{}", signature, encoded_payload))
        );

        Ok((token, payload))
    }

    /// Checks signature and expiry of a token issued by [`issue`](Self::issue).
    pub fn verify_client_token(&self, token: &str) -> Result<ClientTokenPayload, AppError> {
        let invalid = || AppError::UploadError("Invalid upload token".into());

        let (store, encoded) = token
            .strip_prefix(CLIENT_TOKEN_PREFIX)
            .and_then(|rest| rest.split_once('_'))
            .ok_or_else(invalid)?;
        if Some(store) != store_id(&self.secret) {
            return Err(invalid());
        }

        let inner = general_purpose::STANDARD.decode(encoded).map_err(|_| invalid())?;
        let inner = String::from_utf8(inner).map_err(|_| invalid())?;
        let (signature, encoded_payload) = inner.split_once('.').ok_or_else(invalid)?;

        if !self.verify_body(encoded_payload.as_bytes(), signature) {
            return Err(invalid());
        }

        let json = general_purpose::STANDARD.decode(encoded_payload).map_err(|_| invalid())?;
        let payload: ClientTokenPayload = serde_json::from_slice(&json).map_err(|_| invalid())?;

        if payload.valid_until <= Utc::now().timestamp_millis() {
            return Err(AppError::UploadError("Upload token has expired".into()));
        }
        Ok(payload)
    }

    fn mac(&self) -> Option<Hmac<Sha256>> {
        Hmac::<Sha256>::new_from_slice(self.secret.as_bytes()).ok()
    }

    /// Hex HMAC-SHA256 of `body`, as sent in `x-vercel-signature`.
    pub fn sign_body(&self, body: &[u8]) -> Option<String> {
        let mut mac = self.mac()?;
        mac.update(body);
        Some(hex::encode(mac.finalize().into_bytes()))
    }

    pub fn verify_body(&self, body: &[u8], signature: &str) -> bool {
        let (Ok(expected), Some(mut mac)) = (hex::decode(signature.trim()), self.mac()) else {
            return false;
        };
        mac.update(body);
        mac.verify_slice(&expected).is_ok()
    }
}
