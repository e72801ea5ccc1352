//! Caller resolution middleware

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::AppState;

/// Identity of the caller, stored in request extensions.
///
/// `None` means the request carried no usable token. Handlers pass the inner
/// value to the core operations, which decide whether that is an error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Caller(pub Option<Uuid>);

impl Caller {
    pub fn user_id(&self) -> Option<Uuid> {
        self.0
    }
}

/// Require an identity for mutations.
pub fn require(caller: Option<Uuid>) -> Result<Uuid> {
    caller.ok_or(ApiError::NotAuthenticated)
}

/// Extract the bearer token from the Authorization header, if well-formed.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolve the caller from the Authorization header.
///
/// Never rejects: an absent, malformed or unknown token resolves to an
/// anonymous caller.
pub async fn resolve_caller(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response> {
    let mut caller = Caller::default();

    if let Some(token) = bearer_token(request.headers()) {
        match state.db.get_user_by_token(token).await? {
            Some(user) => {
                state.db.update_last_seen(user.id).await?;
                caller = Caller(Some(user.id));
            }
            None => tracing::debug!("Unknown bearer token, treating caller as anonymous"),
        }
    }

    request.extensions_mut().insert(caller);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extracted() {
        assert_eq!(bearer_token(&headers("Bearer abc-123")), Some("abc-123"));
    }

    #[test]
    fn test_bearer_token_wrong_scheme() {
        assert_eq!(bearer_token(&headers("Basic abc")), None);
    }

    #[test]
    fn test_bearer_token_empty() {
        assert_eq!(bearer_token(&headers("Bearer   ")), None);
    }

    #[test]
    fn test_bearer_token_missing_header() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn test_require_anonymous_caller_fails() {
        assert!(matches!(require(None), Err(ApiError::NotAuthenticated)));
    }

    #[test]
    fn test_require_known_caller() {
        let id = Uuid::new_v4();
        assert_eq!(require(Some(id)).unwrap(), id);
        assert_eq!(Caller(Some(id)).user_id(), Some(id));
    }
}
