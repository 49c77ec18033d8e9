use axum::extract::{Query, State};
use axum::response::Redirect;
use axum::routing::get;
use axum::{Json, Router};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use super::cookies;
use super::error::AuthError;
use super::identity;
use super::state::AuthState;
use crate::oidc;
use crate::pkce;
use crate::session::AuthUser;

/// Create the authentication router.
///
/// Mounts `login`, `callback`, `logout` and `me` under the configured auth
/// path. The same [`AuthState`] should be handed to
/// [`resolve_identity`](super::resolve_identity) so the rest of the
/// application sees the sessions these routes create.
pub fn auth_routes(state: AuthState) -> Router {
    let auth_path = state.settings.auth_path.clone();

    Router::new()
        .route(&format!("{auth_path}/login"), get(login))
        .route(&format!("{auth_path}/callback"), get(callback))
        .route(&format!("{auth_path}/logout"), get(logout).post(logout))
        .route(&format!("{auth_path}/me"), get(me))
        .with_state(state)
}

// ── Login ──────────────────────────────────────────────────────────

async fn login(State(state): State<AuthState>, jar: CookieJar) -> (CookieJar, Redirect) {
    let oauth_state = pkce::generate_state();
    let code_verifier = pkce::generate_code_verifier();

    let authorize_url = state.client.authorization_url(&oauth_state, &code_verifier);

    let (state_cookie, verifier_cookie) = cookies::transient_cookies(
        &oauth_state,
        &code_verifier,
        state.settings.secure_cookies,
        &state.settings.auth_path,
    );

    let jar = jar.add(state_cookie).add(verifier_cookie);
    (jar, Redirect::to(authorize_url.as_str()))
}

// ── Callback ───────────────────────────────────────────────────────

#[derive(Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

async fn callback(
    State(state): State<AuthState>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<(CookieJar, Redirect), AuthError> {
    if let Some(error) = params.error {
        let desc = params.error_description.as_deref().unwrap_or("unknown");
        tracing::warn!(error = %error, description = %desc, "provider returned an error");
        return Err(AuthError::Provider(error));
    }

    let code = params.code.ok_or(AuthError::MissingParams)?;
    let received_state = params.state.ok_or(AuthError::MissingParams)?;

    let stored_state = cookies::get_state(&jar).ok_or_else(|| {
        tracing::warn!("authorization state cookie missing");
        AuthError::StateMismatch
    })?;
    if received_state != stored_state {
        tracing::warn!("authorization state mismatch");
        return Err(AuthError::StateMismatch);
    }

    let code_verifier = cookies::get_code_verifier(&jar).ok_or(AuthError::MissingVerifier)?;

    let token_response = state
        .client
        .exchange_code(&code, &code_verifier)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "token exchange failed");
            AuthError::Exchange(e)
        })?;

    let claims = oidc::decode_id_token_claims(&token_response.id_token).map_err(|e| {
        tracing::warn!(error = %e, "undecodable ID token from provider");
        AuthError::IdToken(e)
    })?;
    if claims.sub.is_empty() {
        return Err(AuthError::MissingSubject);
    }

    let user = AuthUser {
        sub: claims.sub,
        username: claims.preferred_username,
        email: claims.email,
    };
    let token = state.session_key.issue(&user).map_err(AuthError::Session)?;

    let session_cookie = cookies::session_cookie(
        &state.settings.session_cookie_name,
        &token,
        state.settings.secure_cookies,
    );
    let (clear_state, clear_verifier) = cookies::clear_transient_cookies(&state.settings.auth_path);

    let jar = jar.add(session_cookie).add(clear_state).add(clear_verifier);

    tracing::info!(sub = %user.sub, "login successful");

    Ok((jar, Redirect::to(state.settings.frontend_origin.as_str())))
}

// ── Logout ─────────────────────────────────────────────────────────

async fn logout(State(state): State<AuthState>, jar: CookieJar) -> (CookieJar, Redirect) {
    let jar = jar.remove(cookies::clear_session_cookie(
        &state.settings.session_cookie_name,
    ));

    // Session is gone either way; discovery failure only costs the
    // provider-side logout.
    let target = match state.client.end_session_endpoint().await {
        Ok(end_session) => {
            let mut url = end_session.clone();
            url.query_pairs_mut().append_pair(
                "post_logout_redirect_uri",
                state.settings.frontend_origin.as_str(),
            );
            url.to_string()
        }
        Err(e) => {
            tracing::warn!(error = %e, "end-session discovery failed, skipping provider logout");
            state.settings.frontend_origin.to_string()
        }
    };

    (jar, Redirect::to(&target))
}

// ── Me ─────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct MeResponse {
    user: Option<AuthUser>,
}

async fn me(State(state): State<AuthState>, jar: CookieJar) -> Json<MeResponse> {
    let identity = identity::identity_from_jar(&state, &jar);
    Json(MeResponse {
        user: identity.into_user(),
    })
}
