//! Authentication module
//!
//! OAuth2 client-credentials flow against the stack's token endpoint.
//!
//! The `Authenticator` manages token caching and re-fetches on expiry. The
//! ledger API has no refresh-token support, so the token request body never
//! carries a `refresh_token` parameter.

mod authenticator;
mod types;

pub use authenticator::Authenticator;
pub use types::{CachedToken, OAuthConfig};
