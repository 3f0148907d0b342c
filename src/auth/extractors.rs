use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use crate::auth::dto::{JwtKeys, TokenKind};
use crate::auth::repo_types::Role;
use crate::error::ApiError;

/// Caller identity taken from a valid access token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

impl AuthUser {
    /// 403 unless the caller has one of `allowed`.
    pub fn require(&self, allowed: &[Role]) -> Result<(), ApiError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            warn!(user_id = %self.id, role = ?self.role, "role not permitted");
            Err(ApiError::forbidden("You do not have permission to perform this action"))
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".into()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header".into()))?;

        let claims = match keys.verify(token) {
            Ok(c) => c,
            Err(_) => {
                warn!("invalid or expired token");
                return Err(ApiError::Unauthorized("Invalid or expired token".into()));
            }
        };

        if claims.kind != TokenKind::Access {
            return Err(ApiError::Unauthorized("Access token required".into()));
        }

        Ok(AuthUser {
            id: claims.sub,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;
    use axum::http::{header::AUTHORIZATION, Request};

    async fn extract(header: Option<String>) -> Result<AuthUser, ApiError> {
        let state = AppState::fake();
        let mut req = Request::builder().uri("/");
        if let Some(h) = header {
            req = req.header(AUTHORIZATION, h);
        }
        let (mut parts, _) = req.body(()).unwrap().into_parts();
        AuthUser::from_request_parts(&mut parts, &state).await
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        assert!(matches!(extract(None).await, Err(ApiError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn refresh_token_is_not_accepted() {
        let keys = JwtKeys::from_ref(&AppState::fake());
        let token = keys.sign_refresh(Uuid::new_v4(), Role::Customer).unwrap();
        let res = extract(Some(format!("Bearer {token}"))).await;
        assert!(matches!(res, Err(ApiError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn access_token_yields_identity() {
        let keys = JwtKeys::from_ref(&AppState::fake());
        let id = Uuid::new_v4();
        let token = keys.sign_access(id, Role::Provider).unwrap();
        let user = extract(Some(format!("Bearer {token}"))).await.unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.role, Role::Provider);
        assert!(user.require(&[Role::Provider]).is_ok());
        assert!(matches!(
            user.require(&[Role::Admin]),
            Err(ApiError::Forbidden(_))
        ));
    }
}
