//! Authentication hook for resolving a token to an identity.
//!
//! Gambit ships one implementation, the in-memory [`TokenStore`], but the
//! HTTP layer only depends on this trait, so a deployment can put an
//! external identity provider behind it and tests can use a fixed table.
//!
//! [`TokenStore`]: crate::TokenStore

use gambit_protocol::AccessToken;

use crate::AuthError;

/// Validates an access token and returns the identity it was issued to.
///
/// `Send + Sync + 'static` because a single authenticator is shared by
/// every request handler for the life of the server.
///
/// # Example
///
/// ```rust
/// use gambit_auth::{AuthError, Authenticator};
/// use gambit_protocol::AccessToken;
///
/// /// Treats the token itself as the identity. Development only.
/// struct EchoAuthenticator;
///
/// impl Authenticator for EchoAuthenticator {
///     async fn authenticate(
///         &self,
///         token: &AccessToken,
///     ) -> Result<String, AuthError> {
///         if token.as_str().is_empty() {
///             return Err(AuthError::Unauthorized);
///         }
///         Ok(token.as_str().to_string())
///     }
/// }
/// ```
pub trait Authenticator: Send + Sync + 'static {
    /// Resolves `token` to an identity.
    ///
    /// # Errors
    /// [`AuthError::Unauthorized`] if the token is unknown.
    fn authenticate(
        &self,
        token: &AccessToken,
    ) -> impl std::future::Future<Output = Result<String, AuthError>> + Send;
}
