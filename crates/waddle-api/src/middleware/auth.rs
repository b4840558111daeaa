//! Access gate for protected routes.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::extractors::AuthUser;

/// Rejects the request with 401 unless it carries the caller's live
/// access token. Admitted callers are stashed in the request extensions.
pub async fn require_auth(user: AuthUser, mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(user);
    next.run(request).await
}
