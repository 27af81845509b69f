//! The "caller is admin" capability.
//!
//! Authentication lives outside this service; handlers only need a yes/no answer. [`AdminCheck`]
//! is that seam, and [`AdminCaller`] is the extractor that enforces it.

use crate::server::response::ApiError;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::{HeaderMap, StatusCode, header, request::Parts};
use axum::response::{IntoResponse, Response};
use std::fmt::Debug;
use std::sync::Arc;
use tracing::debug;

/// Decides whether the request was made by an administrator.
pub trait AdminCheck: Debug + Send + Sync + 'static {
    fn is_admin(&self, headers: &HeaderMap) -> bool;
}

/// Shared, type-erased admin check stored in the app state.
pub type SharedAdminCheck = Arc<dyn AdminCheck>;

/// Grants admin to requests carrying `Authorization: Bearer <token>` with the configured token.
///
/// Without a configured token nobody is admin.
#[derive(Clone)]
pub struct TokenAdminCheck {
    token: Option<String>,
}

impl TokenAdminCheck {
    #[must_use]
    pub fn new(token: Option<String>) -> Self {
        Self { token: token.filter(|t| !t.is_empty()) }
    }
}

impl Debug for TokenAdminCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenAdminCheck").field("configured", &self.token.is_some()).finish()
    }
}

impl AdminCheck for TokenAdminCheck {
    fn is_admin(&self, headers: &HeaderMap) -> bool {
        let Some(expected) = self.token.as_deref() else {
            return false;
        };
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .is_some_and(|presented| {
                constant_time_eq(presented.trim().as_bytes(), expected.as_bytes())
            })
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Extractor that only succeeds for admin callers.
#[derive(Debug, Clone, Copy)]
pub struct AdminCaller;

/// Rejection of [`AdminCaller`]: `403` with the standard error body.
#[derive(Debug)]
pub struct AdminRequired;

impl IntoResponse for AdminRequired {
    fn into_response(self) -> Response {
        ApiError::new(StatusCode::FORBIDDEN, "Admin access required").into_response()
    }
}

impl<S> FromRequestParts<S> for AdminCaller
where
    S: Send + Sync,
    SharedAdminCheck: FromRef<S>,
{
    type Rejection = AdminRequired;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let check = SharedAdminCheck::from_ref(state);
        if check.is_admin(&parts.headers) {
            Ok(Self)
        } else {
            debug!(uri = %parts.uri.path(), "Admin capability denied");
            Err(AdminRequired)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(auth: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(auth).expect("header"));
        headers
    }

    #[test]
    fn matching_bearer_token_is_admin() {
        let check = TokenAdminCheck::new(Some("s3cret".to_owned()));
        assert!(check.is_admin(&headers("Bearer s3cret")));
        assert!(!check.is_admin(&headers("Bearer s3cre")));
        assert!(!check.is_admin(&headers("Basic s3cret")));
        assert!(!check.is_admin(&HeaderMap::new()));
    }

    #[test]
    fn no_configured_token_denies_everyone() {
        for token in [None, Some(String::new())] {
            let check = TokenAdminCheck::new(token);
            assert!(!check.is_admin(&headers("Bearer ")));
            assert!(!check.is_admin(&headers("Bearer anything")));
        }
    }

    #[tokio::test]
    async fn extractor_rejects_non_admins_with_forbidden() {
        let check: SharedAdminCheck = Arc::new(TokenAdminCheck::new(Some("t".to_owned())));
        let (mut parts, ()) = axum::http::Request::builder()
            .uri("/api/files/list")
            .body(())
            .expect("request")
            .into_parts();

        let rejection = AdminCaller::from_request_parts(&mut parts, &check).await.unwrap_err();
        assert_eq!(rejection.into_response().status(), StatusCode::FORBIDDEN);

        parts.headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer t"));
        assert!(AdminCaller::from_request_parts(&mut parts, &check).await.is_ok());
    }
}
