// ABOUTME: Backend collaborator trait for account link/unlink calls
// ABOUTME: Consumed as black-box async functions; response shaping lives elsewhere

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::Deserialize;

use signon_provider::ProviderKind;

use crate::error::SecurityResult;
use crate::methods::AccountSecurityStatus;

/// Backend response for a successful provider link.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkOutcome {
    pub message: String,
    pub provider_email: Option<String>,
}

/// Backend response for a successful provider unlink.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UnlinkOutcome {
    pub message: String,
}

/// Account-linking backend calls.
///
/// Business-rule failures (email mismatch, wrong password) arrive as
/// `SecurityError::Backend` with the user-facing message.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AccountLinkApi: Send + Sync {
    /// Exchange a provider credential to link that provider to the account.
    async fn link_provider(
        &self,
        provider: ProviderKind,
        credential: &str,
    ) -> SecurityResult<LinkOutcome>;

    /// Remove a linked provider after re-authenticating with the password.
    async fn unlink_provider(
        &self,
        provider: ProviderKind,
        password: &str,
    ) -> SecurityResult<UnlinkOutcome>;

    /// Current link state as reported by the server.
    async fn account_security_status(&self) -> SecurityResult<AccountSecurityStatus>;
}
