//! Error types for the auth layer.

/// Errors that can occur while issuing or checking tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The token is missing or was never issued.
    #[error("unknown or missing access token")]
    Unauthorized,

    /// A login was attempted with an unusable identity (empty, or only
    /// whitespace).
    #[error("invalid identity: {0:?}")]
    InvalidIdentity(String),
}
