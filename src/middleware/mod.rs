//! Plug-and-play OIDC authentication for axum.
//!
//! Mounts the login/callback/logout/me routes and resolves the session
//! cookie into a request identity, so application handlers never touch the
//! protocol.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use oidc_session::middleware::{auth_routes, resolve_identity, AuthState, OidcAuthConfig};
//!
//! // 1. Configure from environment (or OidcAuthConfig::new for full control)
//! let auth = AuthState::new(OidcAuthConfig::from_env()?);
//!
//! // 2. Mount the auth routes and the identity middleware
//! let app = axum::Router::new()
//!     .merge(auth_routes(auth.clone()))
//!     .layer(axum::middleware::from_fn_with_state(auth, resolve_identity));
//!
//! // 3. Handlers take `user: AuthUser` (401 when anonymous) or
//! //    `Extension<SessionIdentity>` (always available)
//! ```

mod config;
mod cookies;
mod error;
mod identity;
mod routes;
mod state;

pub use config::OidcAuthConfig;
pub use error::AuthError;
pub use identity::{identity_from_jar, resolve_identity};
pub use routes::auth_routes;
pub use state::AuthState;
