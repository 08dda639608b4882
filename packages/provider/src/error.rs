// ABOUTME: Error types for provider session management
// ABOUTME: Covers configuration, SDK availability, prompt dismissal, and credential failures

use thiserror::Error;

use crate::provider::ProviderKind;

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Failures in the provider sign-in lifecycle.
///
/// Every variant renders to the exact string shown to the user; the
/// controller never throws these across its async boundary, it reports
/// them through the observer's error channel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("{} sign-in is not configured", .0.display_name())]
    NotConfigured(ProviderKind),

    #[error("{} sign-in failed to load after {} seconds", .0.display_name(), .1)]
    SdkUnavailable(ProviderKind, u64),

    #[error("{} sign-in is not available", .0.display_name())]
    NotReady(ProviderKind),

    #[error("{} sign-in prompt was dismissed", .0.display_name())]
    PromptDismissed(ProviderKind),

    #[error("failed to process {} sign-in credential", .0.display_name())]
    CredentialMissing(ProviderKind),

    #[error("SDK error: {0}")]
    Sdk(String),

    #[error("Unknown provider: {0}. Supported: google, microsoft, github")]
    UnknownProvider(String),
}
