//! OIDC provider client: authorization URLs, code exchange, ID-token claims
//! and end-session discovery.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;
use tokio::sync::OnceCell;
use url::Url;

use crate::error::Error;
use crate::pkce;

/// Applied to every outbound provider request; exchanges are never retried.
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// OIDC provider configuration.
///
/// Required fields are constructor parameters — no runtime "missing field"
/// errors. Endpoints default to the Keycloak layout under the issuer and can
/// be overridden for other providers.
///
/// ```rust,ignore
/// use oidc_session::OidcConfig;
///
/// let config = OidcConfig::new(
///     "https://id.example.com/realms/main".parse()?,
///     "my-client-id",
///     "my-client-secret",
///     "https://my-app.com/auth/callback".parse()?,
/// );
/// // Optional overrides via chaining:
/// let config = config.with_scopes(vec!["openid".into()]);
/// ```
#[derive(Clone)]
#[non_exhaustive]
pub struct OidcConfig {
    pub(crate) issuer: Url,
    pub(crate) client_id: String,
    pub(crate) client_secret: String,
    pub(crate) redirect_uri: Url,
    pub(crate) auth_url: Url,
    pub(crate) token_url: Url,
    pub(crate) scopes: Vec<String>,
}

impl OidcConfig {
    /// Create a new provider configuration.
    ///
    /// Authorization and token endpoints are derived from the issuer
    /// Keycloak-style (`{issuer}/protocol/openid-connect/auth` and `…/token`);
    /// override them with [`with_auth_url`](Self::with_auth_url) and
    /// [`with_token_url`](Self::with_token_url) for other providers.
    #[must_use]
    pub fn new(
        issuer: Url,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: Url,
    ) -> Self {
        let auth_url = issuer_endpoint(&issuer, "/protocol/openid-connect/auth");
        let token_url = issuer_endpoint(&issuer, "/protocol/openid-connect/token");
        Self {
            issuer,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri,
            auth_url,
            token_url,
            scopes: vec!["openid".into(), "profile".into(), "email".into()],
        }
    }

    /// Override the authorization endpoint.
    #[must_use]
    pub fn with_auth_url(mut self, url: Url) -> Self {
        self.auth_url = url;
        self
    }

    /// Override the token endpoint.
    #[must_use]
    pub fn with_token_url(mut self, url: Url) -> Self {
        self.token_url = url;
        self
    }

    /// Override the OAuth2 scopes (default: `["openid", "profile", "email"]`).
    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Provider issuer URL.
    #[must_use]
    pub fn issuer(&self) -> &Url {
        &self.issuer
    }

    /// OAuth2 client ID.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// OAuth2 redirect URI.
    #[must_use]
    pub fn redirect_uri(&self) -> &Url {
        &self.redirect_uri
    }

    /// Authorization endpoint URL.
    #[must_use]
    pub fn auth_url(&self) -> &Url {
        &self.auth_url
    }

    /// Token exchange endpoint URL.
    #[must_use]
    pub fn token_url(&self) -> &Url {
        &self.token_url
    }

    /// Requested OAuth2 scopes.
    #[must_use]
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }
}

impl std::fmt::Debug for OidcConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OidcConfig")
            .field("issuer", &self.issuer.as_str())
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri.as_str())
            .field("auth_url", &self.auth_url.as_str())
            .field("token_url", &self.token_url.as_str())
            .field("scopes", &self.scopes)
            .finish()
    }
}

/// Appends a path to the issuer. `Url::join` is unsuitable here: it drops the
/// last path segment of an issuer without a trailing slash.
fn issuer_endpoint(issuer: &Url, suffix: &str) -> Url {
    let base = issuer.as_str().trim_end_matches('/');
    format!("{base}{suffix}")
        .parse()
        .expect("issuer with appended path is a valid URL")
}

/// Token response from the provider's token endpoint.
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Always present when the `openid` scope was requested.
    pub id_token: String,
}

/// Identity claims carried in an ID token's payload.
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct IdTokenClaims {
    #[serde(default)]
    pub sub: String,
    #[serde(default)]
    pub preferred_username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// The subset of the provider's discovery document this crate consumes.
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct DiscoveryDocument {
    #[serde(default)]
    pub end_session_endpoint: Option<String>,
}

/// OIDC client for a single provider.
///
/// Holds the HTTP connection pool and a process-lifetime cache of the
/// discovered end-session endpoint; construct once and share.
pub struct OidcClient {
    config: OidcConfig,
    http: reqwest::Client,
    end_session: OnceCell<Url>,
}

impl OidcClient {
    #[must_use]
    pub fn new(config: OidcConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            end_session: OnceCell::new(),
        }
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    /// Build the authorization URL for one login attempt.
    ///
    /// Pure function of the configuration and the caller's `state` and
    /// `code_verifier`; the caller keeps both (in transient cookies) to check
    /// the callback against. The S256 challenge is derived here so the
    /// verifier itself never leaves the caller.
    #[must_use]
    pub fn authorization_url(&self, state: &str, code_verifier: &str) -> Url {
        let code_challenge = pkce::generate_code_challenge(code_verifier);
        let scope = self.config.scopes.join(" ");

        let mut url = self.config.auth_url.clone();
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", self.config.redirect_uri.as_str())
            .append_pair("state", state)
            .append_pair("code_challenge", &code_challenge)
            .append_pair("code_challenge_method", "S256")
            .append_pair("scope", &scope);
        url
    }

    /// Exchange an authorization code for tokens using PKCE.
    ///
    /// Authorization codes are single-use, so a failed exchange is terminal
    /// for the login attempt; nothing here retries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on network failure or an undecodable response
    /// body, or [`Error::TokenExchange`] if the provider rejects the exchange.
    pub async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &str,
    ) -> Result<TokenResponse, Error> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code_verifier", code_verifier),
        ];

        let response = self
            .http
            .post(self.config.token_url.clone())
            .timeout(HTTP_TIMEOUT)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::TokenExchange {
                status: status.as_u16(),
                detail,
            });
        }

        response.json::<TokenResponse>().await.map_err(Into::into)
    }

    /// The provider's end-session (logout) endpoint, from OIDC discovery.
    ///
    /// Fetched from `{issuer}/.well-known/openid-configuration` on first use
    /// and cached for the lifetime of the client; a failed fetch leaves the
    /// cache empty so a later call can retry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on network failure, or [`Error::Discovery`]
    /// if the document cannot be fetched or lacks `end_session_endpoint`.
    pub async fn end_session_endpoint(&self) -> Result<&Url, Error> {
        self.end_session
            .get_or_try_init(|| async {
                let document = self.fetch_discovery().await?;
                let endpoint = document.end_session_endpoint.ok_or_else(|| Error::Discovery {
                    status: None,
                    detail: "document has no end_session_endpoint".to_string(),
                })?;
                endpoint.parse().map_err(|e| Error::Discovery {
                    status: None,
                    detail: format!("invalid end_session_endpoint: {e}"),
                })
            })
            .await
    }

    async fn fetch_discovery(&self) -> Result<DiscoveryDocument, Error> {
        let base = self.config.issuer.as_str().trim_end_matches('/');
        let url = format!("{base}/.well-known/openid-configuration");

        let response = self.http.get(url).timeout(HTTP_TIMEOUT).send().await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::Discovery {
                status: Some(status.as_u16()),
                detail,
            });
        }

        response.json::<DiscoveryDocument>().await.map_err(Into::into)
    }
}

/// Decode the identity claims from an ID token without verifying it.
///
/// The token is trusted because it arrives in the TLS-authenticated response
/// of [`OidcClient::exchange_code`], directly from the provider. It is NOT
/// checked against the provider's published signing keys; do not call this
/// with tokens obtained from the browser or any other untrusted path.
///
/// # Errors
///
/// Returns [`Error::MalformedIdToken`] if the token is not a three-segment
/// JWT with a base64url JSON payload.
pub fn decode_id_token_claims(id_token: &str) -> Result<IdTokenClaims, Error> {
    let segments: Vec<&str> = id_token.split('.').collect();
    if segments.len() != 3 {
        return Err(Error::MalformedIdToken(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    }

    let payload = URL_SAFE_NO_PAD
        .decode(segments[1])
        .map_err(|e| Error::MalformedIdToken(format!("payload is not base64url: {e}")))?;

    serde_json::from_slice(&payload)
        .map_err(|e| Error::MalformedIdToken(format!("payload is not a claims object: {e}")))
}
