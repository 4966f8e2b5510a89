use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::api::AppState;
use crate::error::AppError;
use crate::services::token_verifier::{self, AuthError};

pub use crate::services::token_verifier::Claims;

/// Verified token claims as an extractor: a handler taking `Claims`
/// only runs once the bearer token has passed the full verification
/// flow. The handler itself states the permission it needs via
/// [`Claims::require`].
#[async_trait]
impl FromRequestParts<AppState> for Claims {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingHeader)?
            .to_str()
            .map_err(|_| AuthError::MalformedHeader)?;

        let token = token_verifier::parse_bearer(header)?;

        let claims = token_verifier::verify(
            &state.http,
            &state.config.jwks_url(),
            &state.config.issuer(),
            &state.config.auth_audience,
            token,
        )
        .await?;

        tracing::debug!(sub = %claims.sub, "bearer token verified");

        Ok(claims)
    }
}
