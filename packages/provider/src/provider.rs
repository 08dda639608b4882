// ABOUTME: Provider definitions for supported single-sign-on services
// ABOUTME: Google, Microsoft, and GitHub with client identifiers sourced from the environment

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ProviderError, ProviderResult};

/// Supported single-sign-on providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Google,
    Microsoft,
    GitHub,
}

impl ProviderKind {
    /// Human-readable name used in error messages and notifications
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Google => "Google",
            Self::Microsoft => "Microsoft",
            Self::GitHub => "GitHub",
        }
    }

    /// Environment variable carrying this provider's client identifier
    pub fn client_id_env(&self) -> &'static str {
        match self {
            Self::Google => "GOOGLE_SIGNIN_CLIENT_ID",
            Self::Microsoft => "MICROSOFT_SIGNIN_CLIENT_ID",
            Self::GitHub => "GITHUB_SIGNIN_CLIENT_ID",
        }
    }

    /// Read the client identifier from the environment.
    ///
    /// Read once at controller construction; empty or whitespace-only
    /// values are treated as absent.
    pub fn client_id_from_env(&self) -> Option<String> {
        std::env::var(self.client_id_env())
            .ok()
            .filter(|v| !v.trim().is_empty())
    }

    /// Get all supported providers
    pub fn all() -> Vec<Self> {
        vec![Self::Google, Self::Microsoft, Self::GitHub]
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Google => write!(f, "google"),
            Self::Microsoft => write!(f, "microsoft"),
            Self::GitHub => write!(f, "github"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ProviderError;

    fn from_str(s: &str) -> ProviderResult<Self> {
        match s.to_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "microsoft" => Ok(Self::Microsoft),
            "github" => Ok(Self::GitHub),
            _ => Err(ProviderError::UnknownProvider(s.to_string())),
        }
    }
}

impl TryFrom<String> for ProviderKind {
    type Error = ProviderError;

    fn try_from(s: String) -> ProviderResult<Self> {
        s.parse()
    }
}

impl TryFrom<&str> for ProviderKind {
    type Error = ProviderError;

    fn try_from(s: &str) -> ProviderResult<Self> {
        s.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parsing() {
        assert_eq!(
            "google".parse::<ProviderKind>().unwrap(),
            ProviderKind::Google
        );
        assert_eq!(
            "GOOGLE".parse::<ProviderKind>().unwrap(),
            ProviderKind::Google
        );
        assert_eq!(
            "github".parse::<ProviderKind>().unwrap(),
            ProviderKind::GitHub
        );
        assert!("facebook".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_provider_display() {
        assert_eq!(ProviderKind::Google.to_string(), "google");
        assert_eq!(ProviderKind::Microsoft.to_string(), "microsoft");
        assert_eq!(ProviderKind::GitHub.to_string(), "github");
    }

    #[test]
    fn test_client_id_env_names() {
        assert_eq!(
            ProviderKind::Google.client_id_env(),
            "GOOGLE_SIGNIN_CLIENT_ID"
        );
        assert_eq!(
            ProviderKind::GitHub.client_id_env(),
            "GITHUB_SIGNIN_CLIENT_ID"
        );
    }

    #[test]
    fn test_client_id_from_env_treats_blank_as_absent() {
        // Each test uses its own env var to avoid interfering with parallel tests
        std::env::set_var("MICROSOFT_SIGNIN_CLIENT_ID", "   ");
        assert_eq!(ProviderKind::Microsoft.client_id_from_env(), None);
        std::env::set_var("MICROSOFT_SIGNIN_CLIENT_ID", "ms-client-1");
        assert_eq!(
            ProviderKind::Microsoft.client_id_from_env(),
            Some("ms-client-1".to_string())
        );
        std::env::remove_var("MICROSOFT_SIGNIN_CLIENT_ID");
    }
}
