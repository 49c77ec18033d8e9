use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::CookieJar;

use super::error::AuthError;
use super::state::AuthState;
use crate::session::{AuthUser, SessionIdentity};

/// Resolve the session cookie into a [`SessionIdentity`] request extension.
///
/// Install once with `axum::middleware::from_fn_with_state`; every request
/// then carries an identity, [`Anonymous`](SessionIdentity::Anonymous) when
/// the cookie is absent or fails verification. Handlers read it through
/// `Extension<SessionIdentity>` or the [`AuthUser`] extractor instead of
/// touching the cookie themselves.
pub async fn resolve_identity(
    State(state): State<AuthState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = identity_from_jar(&state, &jar);
    request.extensions_mut().insert(identity);
    next.run(request).await
}

/// Resolve the identity carried by a cookie jar.
///
/// The building block behind [`resolve_identity`], exposed for hosts with
/// custom middleware stacks.
#[must_use]
pub fn identity_from_jar(state: &AuthState, jar: &CookieJar) -> SessionIdentity {
    match jar.get(&state.settings.session_cookie_name) {
        Some(cookie) => state.session_key.verify(cookie.value()),
        None => SessionIdentity::Anonymous,
    }
}

/// Extractor for handlers that require an authenticated caller.
///
/// Reads the identity injected by [`resolve_identity`] and rejects with
/// `401 Unauthorized` when it is anonymous — or when the middleware is not
/// installed at all, so a missing layer fails closed.
///
/// # Example
///
/// ```rust,ignore
/// async fn profile(user: AuthUser) -> impl IntoResponse {
///     format!("signed in as {}", user.sub)
/// }
///
/// // Optional: accessible to both authenticated and anonymous callers
/// async fn greet(Extension(identity): Extension<SessionIdentity>) -> impl IntoResponse {
///     match identity.user() {
///         Some(user) => format!("hello, {}", user.sub),
///         None => "hello, stranger".to_string(),
///     }
/// }
/// ```
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionIdentity>()
            .and_then(|identity| identity.user().cloned())
            .ok_or(AuthError::Unauthenticated)
    }
}
