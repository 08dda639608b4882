// ABOUTME: Error types for cross-tab broadcasting
// ABOUTME: Publish failures are swallowed with logging; they must never block the local flow

use thiserror::Error;

pub type CrosstabResult<T> = Result<T, CrosstabError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CrosstabError {
    /// The broadcast primitive does not exist in this execution
    /// environment; the initiating tab's flow still completes.
    #[error("broadcast channel unavailable")]
    ChannelUnavailable,

    /// No sibling tab is listening; not a failure for the sender.
    #[error("no subscribers to receive broadcast")]
    NoSubscribers,
}
