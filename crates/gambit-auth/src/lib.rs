//! Participant authentication for Gambit.
//!
//! This crate answers one question for the layers above it: "which
//! identity does this access token belong to?"
//!
//! 1. **Issuance**: [`TokenStore::login`] hands out a fresh random token
//!    for an identity string.
//! 2. **Validation**: the [`Authenticator`] trait resolves a token back
//!    to its identity, or rejects it.
//!
//! # How it fits in the stack
//!
//! ```text
//! HTTP Layer (above)  ← authenticates the `token` query parameter
//!     ↕
//! Auth Layer (this crate)  ← token → identity
//!     ↕
//! Protocol Layer (below)  ← provides AccessToken
//! ```

mod auth;
mod error;
mod store;

pub use auth::Authenticator;
pub use error::AuthError;
pub use store::TokenStore;
