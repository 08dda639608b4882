// ABOUTME: Linked login method model and the lockout guard math
// ABOUTME: An account's method count must never be reduced to zero

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use signon_provider::ProviderKind;

use crate::error::SecurityError;

/// One way an account can sign in: email/password or a linked provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum AuthMethodKind {
    Email,
    Provider(ProviderKind),
}

impl fmt::Display for AuthMethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email => write!(f, "email"),
            Self::Provider(kind) => write!(f, "{kind}"),
        }
    }
}

impl From<AuthMethodKind> for String {
    fn from(kind: AuthMethodKind) -> Self {
        kind.to_string()
    }
}

impl TryFrom<String> for AuthMethodKind {
    type Error = SecurityError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s.eq_ignore_ascii_case("email") {
            return Ok(Self::Email);
        }
        s.parse::<ProviderKind>()
            .map(Self::Provider)
            .map_err(|e| SecurityError::Backend(e.to_string()))
    }
}

/// Server-reported linked login method for the current account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkedAuthMethod {
    pub kind: AuthMethodKind,
    pub linked_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_email: Option<String>,
}

impl LinkedAuthMethod {
    pub fn email(linked_at: DateTime<Utc>) -> Self {
        Self {
            kind: AuthMethodKind::Email,
            linked_at,
            provider_email: None,
        }
    }

    pub fn provider(
        provider: ProviderKind,
        linked_at: DateTime<Utc>,
        provider_email: Option<String>,
    ) -> Self {
        Self {
            kind: AuthMethodKind::Provider(provider),
            linked_at,
            provider_email,
        }
    }
}

/// Backend account security status response shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSecurityStatus {
    pub email_linked: bool,
    pub provider_linked: bool,
    pub provider_email: Option<String>,
}

/// Whether the account still has its email/password method.
pub fn has_email_method(methods: &[LinkedAuthMethod]) -> bool {
    methods.iter().any(|m| m.kind == AuthMethodKind::Email)
}

/// The lockout guard: an unlink may proceed only if the email method
/// remains or more than one method is linked. Always evaluated against
/// the current reported set, never a render-time snapshot.
pub fn can_unlink(methods: &[LinkedAuthMethod]) -> bool {
    has_email_method(methods) || methods.len() > 1
}
