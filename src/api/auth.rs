use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::AppState;
use crate::{error::AppError, models::UserProfile};

const BEARER_PREFIX: &str = "Bearer ";

/// Authenticated caller, taken from a signed `Authorization: Bearer` token
///
/// Rejects with [`AppError::Unauthorized`] when the header is missing,
/// malformed, or carries a token that is expired or signed with another key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

impl AuthUser {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id.clone(),
            email: self.email.clone(),
        }
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix(BEARER_PREFIX)?.trim();
    (!token.is_empty()).then_some(token)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AppError::Unauthorized)?;
        let claims = state.auth.tokens().verify(token)?;

        tracing::Span::current().record("user_id", claims.sub.as_str());

        Ok(AuthUser {
            id: claims.sub,
            email: claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::User,
        services::{Authenticator, HashParams, TokenSigner},
    };
    use axum::http::Request;
    use chrono::Utc;

    fn state() -> AppState {
        AppState::new().with_auth(Authenticator::new(
            TokenSigner::new(b"test-secret", 60),
            HashParams::fast(),
        ))
    }

    fn token(state: &AppState) -> String {
        let user = User {
            id: "user-42".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: String::new(),
            created_at: Utc::now(),
        };
        state.auth.tokens().issue(&user).unwrap()
    }

    async fn extract(state: &AppState, header: Option<&str>) -> Result<AuthUser, AppError> {
        let mut builder = Request::builder().uri("/items");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        AuthUser::from_request_parts(&mut parts, state).await
    }

    #[tokio::test]
    async fn test_reads_bearer_token() {
        let state = state();
        let header = format!("Bearer {}", token(&state));

        let user = extract(&state, Some(&header)).await.unwrap();
        assert_eq!(user.id(), "user-42");
        assert_eq!(user.email, "alice@example.com");
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        assert!(matches!(
            extract(&state(), None).await,
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_non_bearer_schemes_are_unauthorized() {
        let state = state();
        let token = token(&state);

        for header in [token.clone(), format!("Basic {}", token), "Bearer   ".to_string()] {
            assert!(matches!(
                extract(&state, Some(&header)).await,
                Err(AppError::Unauthorized)
            ));
        }
    }

    #[tokio::test]
    async fn test_token_from_another_server_is_unauthorized() {
        let header = format!("Bearer {}", token(&AppState::new()));
        assert!(matches!(
            extract(&state(), Some(&header)).await,
            Err(AppError::Unauthorized)
        ));
    }
}
