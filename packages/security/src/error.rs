// ABOUTME: Error types for account security coordination
// ABOUTME: Lockout-guard rejections carry the actionable remedy text verbatim

use thiserror::Error;

use signon_provider::ProviderKind;

pub type SecurityResult<T> = Result<T, SecurityError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SecurityError {
    /// Rejected client-side before any network call: removing this method
    /// would leave the account with no way to sign in.
    #[error("cannot remove your only sign-in method: set up email authentication first")]
    LockoutGuard,

    /// Business-rule failure reported by the backend (email mismatch on
    /// link, wrong password on unlink); shown to the user verbatim.
    #[error("{0}")]
    Backend(String),

    #[error("no sign-in session registered for {}", .0.display_name())]
    SessionMissing(ProviderKind),

    #[error("a {} operation is already in progress", .0.display_name())]
    InProgress(ProviderKind),
}
