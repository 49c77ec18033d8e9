#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Missing or invalid startup configuration (secrets, URLs).
    #[error("configuration error: {0}")]
    Config(String),
    #[cfg(feature = "client")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// The provider's token endpoint rejected the code exchange.
    #[error("token exchange rejected with status {status}: {detail}")]
    TokenExchange { status: u16, detail: String },
    /// OIDC discovery failed or the document is unusable.
    #[error("provider discovery failed: {detail}")]
    Discovery { status: Option<u16>, detail: String },
    /// The ID token is not a decodable JWT.
    #[error("malformed ID token: {0}")]
    MalformedIdToken(String),
    /// Session token signing failed.
    #[error("token error: {0}")]
    Token(String),
}
