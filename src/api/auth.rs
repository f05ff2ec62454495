//! Shared-secret authentication middleware.

use axum::extract::{Request, State};
use axum::http::{HeaderMap, Method};
use axum::middleware::Next;
use axum::response::Response;

use crate::app_state::AppState;
use crate::config::Secret;
use crate::error::GatewayError;

/// Header carrying the shared secret.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Which requests must present the shared secret.
#[derive(Debug, Clone, Default)]
pub struct AuthPolicy {
    api_key: Option<Secret>,
    protect_reads: bool,
}

impl AuthPolicy {
    /// Requires `api_key` on writes, and on reads too when `protect_reads`.
    /// With no key configured every request is admitted.
    #[must_use]
    pub fn new(api_key: Option<Secret>, protect_reads: bool) -> Self {
        Self {
            api_key,
            protect_reads,
        }
    }

    /// Admits every request.
    #[must_use]
    pub fn open() -> Self {
        Self::default()
    }

    /// Returns `true` if a request with `method` and `headers` may proceed.
    #[must_use]
    pub fn admits(&self, method: &Method, headers: &HeaderMap) -> bool {
        let Some(expected) = &self.api_key else {
            return true;
        };
        let is_read = method == Method::GET || method == Method::HEAD;
        if is_read && !self.protect_reads {
            return true;
        }
        headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|presented| presented == expected.expose())
    }
}

/// Rejects requests that fail the [`AuthPolicy`] before they reach the
/// body decoder or any service.
///
/// # Errors
///
/// Returns [`GatewayError::Unauthorized`] when the secret is missing or
/// wrong.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, GatewayError> {
    if !state.auth.admits(request.method(), request.headers()) {
        tracing::warn!(method = %request.method(), uri = %request.uri(), "rejected request without valid api key");
        return Err(GatewayError::Unauthorized);
    }
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers_with_key(key: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_static(key));
        headers
    }

    #[test]
    fn open_policy_admits_everything() {
        let policy = AuthPolicy::open();
        assert!(policy.admits(&Method::POST, &HeaderMap::new()));
    }

    #[test]
    fn writes_need_matching_key() {
        let policy = AuthPolicy::new(Some(Secret::new("k1")), false);
        assert!(!policy.admits(&Method::POST, &HeaderMap::new()));
        assert!(!policy.admits(&Method::POST, &headers_with_key("k2")));
        assert!(policy.admits(&Method::POST, &headers_with_key("k1")));
    }

    #[test]
    fn reads_are_open_unless_protected() {
        let relaxed = AuthPolicy::new(Some(Secret::new("k1")), false);
        assert!(relaxed.admits(&Method::GET, &HeaderMap::new()));

        let strict = AuthPolicy::new(Some(Secret::new("k1")), true);
        assert!(!strict.admits(&Method::GET, &HeaderMap::new()));
        assert!(strict.admits(&Method::GET, &headers_with_key("k1")));
    }
}
