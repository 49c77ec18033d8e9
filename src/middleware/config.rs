use url::Url;

use crate::error::Error;
use crate::oidc::{OidcClient, OidcConfig};
use crate::session::SessionKey;

/// Shared auth settings used by both config and runtime state.
#[derive(Clone)]
pub(crate) struct AuthSettings {
    pub(crate) session_cookie_name: String,
    pub(crate) secure_cookies: bool,
    pub(crate) auth_path: String,
    pub(crate) frontend_origin: Url,
}

impl AuthSettings {
    fn defaults(frontend_origin: Url) -> Self {
        Self {
            session_cookie_name: "session".into(),
            secure_cookies: true,
            auth_path: "/auth".into(),
            frontend_origin,
        }
    }
}

/// OIDC authentication configuration.
///
/// Required pieces are constructor parameters — no runtime "missing field"
/// errors. Use [`from_env()`](OidcAuthConfig::from_env) for convention-based
/// setup, or [`new()`](OidcAuthConfig::new) with `with_*` methods for full
/// control.
pub struct OidcAuthConfig {
    pub(super) client: OidcClient,
    pub(super) session_key: SessionKey,
    pub(super) settings: AuthSettings,
}

impl OidcAuthConfig {
    /// Create config from the required provider client, session key and
    /// post-login redirect target.
    ///
    /// All optional fields use sensible defaults. Override with `with_*`
    /// methods.
    #[must_use]
    pub fn new(client: OidcClient, session_key: SessionKey, frontend_origin: Url) -> Self {
        Self {
            client,
            session_key,
            settings: AuthSettings::defaults(frontend_origin),
        }
    }

    /// Create config from environment variables.
    ///
    /// # Required env vars
    /// - `OIDC_ISSUER_URL`: provider issuer (must be a valid URL)
    /// - `OIDC_CLIENT_ID`: OAuth2 client ID
    /// - `OIDC_CLIENT_SECRET`: OAuth2 client secret
    /// - `OIDC_REDIRECT_URI`: OAuth2 callback URI (must be a valid URL)
    /// - `OIDC_AUTH_SECRET`: session signing secret, at least 32 bytes
    /// - `FRONTEND_URL`: where the browser lands after login/logout
    ///
    /// # Optional env vars
    /// - `OIDC_AUTH_PATH`: route prefix (default `/auth`)
    /// - `SESSION_COOKIE_NAME`: default `session`
    /// - `APP_ENV`: `production` marks cookies `Secure`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a required var is missing, a URL does not
    /// parse, or the secret is too short. Callers should treat this as fatal
    /// at startup.
    pub fn from_env() -> Result<Self, Error> {
        let issuer = required_url("OIDC_ISSUER_URL")?;
        let client_id = required("OIDC_CLIENT_ID")?;
        let client_secret = required("OIDC_CLIENT_SECRET")?;
        let redirect_uri = required_url("OIDC_REDIRECT_URI")?;
        let secret = required("OIDC_AUTH_SECRET")?;
        let frontend_origin = required_url("FRONTEND_URL")?;

        let client = OidcClient::new(OidcConfig::new(
            issuer,
            client_id,
            client_secret,
            redirect_uri,
        ));
        let session_key = SessionKey::from_secret(&secret)?;

        let mut config = Self::new(client, session_key, frontend_origin);
        if let Ok(path) = std::env::var("OIDC_AUTH_PATH") {
            config = config.with_auth_path(path);
        }
        if let Ok(name) = std::env::var("SESSION_COOKIE_NAME") {
            config = config.with_session_cookie_name(name);
        }

        let production = matches!(std::env::var("APP_ENV").as_deref(), Ok("production"));
        Ok(config.with_secure_cookies(production))
    }

    #[must_use]
    pub fn with_session_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.settings.session_cookie_name = name.into();
        self
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.settings.secure_cookies = secure;
        self
    }

    #[must_use]
    pub fn with_auth_path(mut self, path: impl Into<String>) -> Self {
        self.settings.auth_path = path.into();
        self
    }
}

fn required(name: &'static str) -> Result<String, Error> {
    std::env::var(name).map_err(|_| Error::Config(format!("{name} is required")))
}

fn required_url(name: &'static str) -> Result<Url, Error> {
    required(name)?
        .parse()
        .map_err(|e| Error::Config(format!("{name}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENV_VARS: [&str; 9] = [
        "OIDC_ISSUER_URL",
        "OIDC_CLIENT_ID",
        "OIDC_CLIENT_SECRET",
        "OIDC_REDIRECT_URI",
        "OIDC_AUTH_SECRET",
        "FRONTEND_URL",
        "OIDC_AUTH_PATH",
        "SESSION_COOKIE_NAME",
        "APP_ENV",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    fn set_required_env() {
        std::env::set_var("OIDC_ISSUER_URL", "https://id.example.com/realms/main");
        std::env::set_var("OIDC_CLIENT_ID", "web-client");
        std::env::set_var("OIDC_CLIENT_SECRET", "shhh");
        std::env::set_var("OIDC_REDIRECT_URI", "https://app.example.com/auth/callback");
        std::env::set_var("OIDC_AUTH_SECRET", "test-secret-key-minimum-32-chars!!");
        std::env::set_var("FRONTEND_URL", "https://app.example.com");
    }

    // One test function: from_env reads process-global state, and parallel
    // mutation would race.
    #[test]
    fn test_from_env() {
        clear_env();

        let err = OidcAuthConfig::from_env().err().expect("empty env should fail");
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("OIDC_ISSUER_URL")));

        set_required_env();
        let config = OidcAuthConfig::from_env().expect("full env should succeed");
        assert_eq!(config.settings.session_cookie_name, "session");
        assert_eq!(config.settings.auth_path, "/auth");
        assert_eq!(config.settings.frontend_origin.as_str(), "https://app.example.com/");
        assert!(!config.settings.secure_cookies);

        std::env::set_var("APP_ENV", "production");
        std::env::set_var("OIDC_AUTH_PATH", "/api/auth");
        std::env::set_var("SESSION_COOKIE_NAME", "sid");
        let config = OidcAuthConfig::from_env().expect("full env should succeed");
        assert!(config.settings.secure_cookies);
        assert_eq!(config.settings.auth_path, "/api/auth");
        assert_eq!(config.settings.session_cookie_name, "sid");

        std::env::set_var("OIDC_AUTH_SECRET", "too-short");
        let err = OidcAuthConfig::from_env().err().expect("short secret should fail");
        assert!(matches!(err, Error::Config(_)));

        set_required_env();
        std::env::set_var("OIDC_ISSUER_URL", "not a url");
        let err = OidcAuthConfig::from_env().err().expect("bad issuer URL should fail");
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("OIDC_ISSUER_URL")));

        clear_env();
    }
}
