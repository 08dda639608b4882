// ABOUTME: Signon provider library managing single-sign-on session lifecycles
// ABOUTME: Covers SDK readiness polling, one-time initialization, and credential capture

pub mod error;
pub mod provider;
pub mod session;

// Re-export main types
pub use error::{ProviderError, ProviderResult};
pub use provider::ProviderKind;
pub use session::{
    IdentitySdk, PromptCallback, PromptOutcome, ProviderSessionController, SessionObserver,
    SessionState,
};
