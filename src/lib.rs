#![doc = include_str!("../README.md")]

pub mod error;
#[cfg(feature = "middleware")]
pub mod middleware;
#[cfg(feature = "client")]
pub mod oidc;
pub mod pkce;
pub mod session;

// Re-exports for convenient access
pub use error::Error;
#[cfg(feature = "client")]
pub use oidc::{
    DiscoveryDocument, IdTokenClaims, OidcClient, OidcConfig, TokenResponse,
    decode_id_token_claims,
};
pub use pkce::{generate_code_challenge, generate_code_verifier, generate_state};
pub use session::{AuthUser, SESSION_TTL_SECS, SessionIdentity, SessionKey};
