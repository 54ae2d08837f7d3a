use validator::Validate;
use zeroize::Zeroizing;

use crate::auth::{jwt::JwtService, password::verify_password};
use crate::entities::token::{AuthResponse, LoginRequest};
use crate::errors::AuthError;
use crate::settings::AppConfig;

/// Single-admin authentication against the configured credentials.
pub struct AuthHandler {
    pub token_service: JwtService,
    admin_email: String,
    admin_password_hash: Zeroizing<String>,
}

impl AuthHandler {
    pub fn new(config: &AppConfig, token_service: JwtService) -> Self {
        AuthHandler {
            token_service,
            admin_email: config.admin_email.trim().to_lowercase(),
            admin_password_hash: Zeroizing::new(config.admin_password_hash.clone()),
        }
    }

    pub fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse, AuthError> {
        credentials.validate()?;

        let email = credentials.email.trim().to_lowercase();
        // Verify even on an unknown email so both paths cost the same.
        let password_ok = verify_password(&credentials.password, &self.admin_password_hash)?;

        if email != self.admin_email || !password_ok {
            tracing::warn!("Failed admin login for {}", email);
            return Err(AuthError::WrongCredentials);
        }

        let access_token = self.token_service.create_admin_jwt(&email)?;
        tracing::info!("Admin {} logged in", email);

        Ok(AuthResponse::new(access_token, self.token_service.access_expiration_secs()))
    }
}
