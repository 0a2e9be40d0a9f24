//! Authentication middleware for protected routes.

use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use serde_json::json;
use tracing::warn;

use crate::AppState;
use finwise_shared::types::UserId;
use finwise_shared::{Claims, Role};

/// Cookie that carries the access token for browser clients.
pub const TOKEN_COOKIE: &str = "token";

/// Prefix the API is mounted under.
const API_PREFIX: &str = "/api/v1";

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Finds the access token: Authorization header first, then the cookie.
fn find_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_bearer_token)
        .map(str::to_string);

    bearer.or_else(|| {
        CookieJar::from_headers(headers)
            .get(TOKEN_COOKIE)
            .map(|c| c.value().to_string())
    })
}

fn reject(status: StatusCode, error: &str, message: &str) -> Response {
    (status, Json(json!({ "error": error, "message": message }))).into_response()
}

/// Authentication middleware that validates JWT tokens and enforces the
/// role access table.
///
/// This middleware:
/// 1. Reads the token from the Authorization header or the `token` cookie
/// 2. Validates the token using the JWT service
/// 3. Checks the role may reach the requested path
/// 4. Stores the claims in request extensions for handlers to access
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = find_token(request.headers()) else {
        return reject(
            StatusCode::UNAUTHORIZED,
            "missing_token",
            "Bearer token or token cookie is required",
        );
    };

    let claims = match state.jwt_service.validate_token(&token) {
        Ok(claims) => claims,
        Err(finwise_shared::JwtError::Expired) => {
            return reject(
                StatusCode::UNAUTHORIZED,
                "token_expired",
                "Token has expired",
            );
        }
        Err(_) => {
            return reject(
                StatusCode::UNAUTHORIZED,
                "invalid_token",
                "Invalid or malformed token",
            );
        }
    };

    let path = request.uri().path();
    let path = path.strip_prefix(API_PREFIX).unwrap_or(path);
    let allowed = claims.role().is_some_and(|role| role.can_access(path));

    if !allowed {
        warn!(user_id = %claims.sub, role = %claims.role, path, "Route denied for role");
        return reject(
            StatusCode::FORBIDDEN,
            "forbidden",
            "Your role cannot access this resource",
        );
    }

    request.extensions_mut().insert(claims);
    next.run(request).await
}

/// Extractor for authenticated user claims.
///
/// Use this in handlers to get the authenticated user's claims:
///
/// ```ignore
/// async fn handler(auth: AuthUser) -> impl IntoResponse {
///     let user_id = auth.user_id();
///     // ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Returns the user ID from the claims.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.0.user_id()
    }

    /// Returns the user's role, if it is a known one.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.0.role()
    }

    /// Returns the inner claims.
    #[must_use]
    pub const fn claims(&self) -> &Claims {
        &self.0
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({
                        "error": "unauthorized",
                        "message": "Authentication required"
                    })),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, header::COOKIE};
    use rstest::rstest;

    #[rstest]
    #[case("Bearer abc", Some("abc"))]
    #[case("bearer abc", Some("abc"))]
    #[case("Basic abc", None)]
    fn test_extract_bearer_token(#[case] header: &str, #[case] expected: Option<&str>) {
        assert_eq!(extract_bearer_token(header), expected);
    }

    #[test]
    fn test_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        headers.insert(COOKIE, HeaderValue::from_static("token=from-cookie"));

        assert_eq!(find_token(&headers).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_cookie_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; token=from-cookie"));

        assert_eq!(find_token(&headers).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_no_token() {
        assert!(find_token(&HeaderMap::new()).is_none());
    }
}
