// ABOUTME: Verification broadcast message model
// ABOUTME: Ephemeral redirect instructions, idempotent by construction

use serde::{Deserialize, Serialize};

/// Where a receiving tab should navigate when no explicit URL is given
pub const DEFAULT_REDIRECT_URL: &str = "/";

/// What the receiving tab should do. Redirect is the only action today;
/// the enum keeps the wire shape open for more.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BroadcastAction {
    Redirect,
}

/// How the publishing tab's verification exchange ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedirectReason {
    Success,
    Failure,
    Error,
}

/// Ephemeral cross-tab message, constructed the instant a tab's
/// verification completes and never persisted.
///
/// Receiving handlers must be idempotent: a slow tab may process a stale
/// copy after the user already navigated away, and duplicate delivery
/// performs the same navigation again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationBroadcast {
    pub action: BroadcastAction,
    pub reason: RedirectReason,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl VerificationBroadcast {
    /// Build a redirect instruction, defaulting to the application root.
    pub fn redirect(reason: RedirectReason, url: Option<&str>, message: Option<&str>) -> Self {
        Self {
            action: BroadcastAction::Redirect,
            reason,
            url: url.unwrap_or(DEFAULT_REDIRECT_URL).to_string(),
            message: message.map(str::to_string),
        }
    }
}
