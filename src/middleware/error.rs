use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::error::Error;

/// Authentication flow errors, mapped to client responses.
///
/// The `Display` text of each variant is exactly what the client receives;
/// provider and signing internals stay in the server log.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No valid session found.
    #[error("Not authenticated")]
    Unauthenticated,

    /// The provider redirected back with an error instead of a code.
    #[error("Authentication error: {0}")]
    Provider(String),

    #[error("Missing code or state parameter")]
    MissingParams,

    /// Callback `state` does not match the `oauth_state` cookie.
    #[error("Invalid state parameter")]
    StateMismatch,

    #[error("Missing code verifier")]
    MissingVerifier,

    /// Code-for-token exchange failed; detail is logged, never sent.
    #[error("Token exchange failed")]
    Exchange(#[source] Error),

    /// The ID token could not be decoded.
    #[error("Invalid ID token")]
    IdToken(#[source] Error),

    #[error("Invalid ID token: missing sub claim")]
    MissingSubject,

    /// Session token could not be issued.
    #[error("Internal error")]
    Session(#[source] Error),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::Provider(_)
            | Self::MissingParams
            | Self::StateMismatch
            | Self::MissingVerifier => StatusCode::BAD_REQUEST,
            Self::Unauthenticated | Self::IdToken(_) | Self::MissingSubject => {
                StatusCode::UNAUTHORIZED
            }
            Self::Exchange(_) | Self::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "auth internal error");
        }

        (status, self.to_string()).into_response()
    }
}
