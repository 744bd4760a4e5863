//! API key authentication extractor.
//!
//! Extracts and verifies API keys from:
//! - `Authorization: Bearer <key>` header
//! - `X-API-Key: <key>` header
//!
//! Verification goes through `UserService::authenticate`, which looks the
//! key up by its SHA-256 digest.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use tally_types::error::AuthError;
use tally_types::user::UserId;

use crate::http::error::AppError;
use crate::state::AppState;

/// The authenticated caller. Extracting this validates the API key.
pub struct AuthUser {
    pub user_id: UserId,
    /// The plaintext key the request was made with (needed for logout).
    pub api_key: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let api_key = extract_api_key(parts)?;

        match state.user_service.authenticate(&api_key).await {
            Ok(user_id) => Ok(AuthUser { user_id, api_key }),
            Err(AuthError::InvalidApiKey) => Err(AppError::Unauthorized(
                "Invalid API key. Provide a valid key via 'Authorization: Bearer <key>' or 'X-API-Key: <key>' header.".to_string(),
            )),
            Err(e) => Err(AppError::Auth(e)),
        }
    }
}

/// Extract the API key from request headers.
fn extract_api_key(parts: &Parts) -> Result<String, AppError> {
    // Try Authorization: Bearer <key>
    if let Some(auth) = parts.headers.get("authorization") {
        let auth_str = auth.to_str().map_err(|_| {
            AppError::Unauthorized("Invalid Authorization header encoding".to_string())
        })?;
        if let Some(key) = auth_str.strip_prefix("Bearer ") {
            return Ok(key.trim().to_string());
        }
    }

    // Try X-API-Key header
    if let Some(key) = parts.headers.get("x-api-key") {
        let key_str = key.to_str().map_err(|_| {
            AppError::Unauthorized("Invalid X-API-Key header encoding".to_string())
        })?;
        return Ok(key_str.trim().to_string());
    }

    Err(AppError::Unauthorized(
        "Missing API key. Provide via 'Authorization: Bearer <key>' or 'X-API-Key: <key>' header.".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(header: &str, value: &str) -> Parts {
        let (parts, _) = Request::builder()
            .header(header, value)
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    #[test]
    fn test_extract_bearer_key() {
        let parts = parts_with("Authorization", "Bearer tally_abc ");
        assert_eq!(extract_api_key(&parts).unwrap(), "tally_abc");
    }

    #[test]
    fn test_extract_x_api_key() {
        let parts = parts_with("X-API-Key", "tally_xyz");
        assert_eq!(extract_api_key(&parts).unwrap(), "tally_xyz");
    }

    #[test]
    fn test_missing_key_is_unauthorized() {
        let (parts, _) = Request::builder().body(()).unwrap().into_parts();
        assert!(matches!(extract_api_key(&parts), Err(AppError::Unauthorized(_))));

        // Non-bearer schemes are not accepted.
        let parts = parts_with("Authorization", "Basic dXNlcjpwYXNz");
        assert!(matches!(extract_api_key(&parts), Err(AppError::Unauthorized(_))));
    }
}
