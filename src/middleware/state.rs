use std::sync::Arc;

use super::config::{AuthSettings, OidcAuthConfig};
use crate::oidc::OidcClient;
use crate::session::SessionKey;

/// Shared state for the auth routes and the identity middleware.
///
/// Built once at startup from [`OidcAuthConfig`] and passed explicitly to
/// [`auth_routes`](super::auth_routes) and
/// [`resolve_identity`](super::resolve_identity); there is no global. Clones
/// share the underlying client, key and discovery cache.
#[derive(Clone)]
pub struct AuthState {
    pub(super) client: Arc<OidcClient>,
    pub(super) session_key: Arc<SessionKey>,
    pub(super) settings: AuthSettings,
}

impl AuthState {
    #[must_use]
    pub fn new(config: OidcAuthConfig) -> Self {
        Self {
            client: Arc::new(config.client),
            session_key: Arc::new(config.session_key),
            settings: config.settings,
        }
    }
}
