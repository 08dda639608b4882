// ABOUTME: Signon crosstab library broadcasting verification outcomes between sibling tabs
// ABOUTME: One tab wins the verification flow and tells the others where to navigate

pub mod channel;
pub mod error;
pub mod message;

// Re-export main types
pub use channel::{BroadcastScope, CrossTabVerificationChannel, Subscription};
pub use error::{CrosstabError, CrosstabResult};
pub use message::{BroadcastAction, RedirectReason, VerificationBroadcast, DEFAULT_REDIRECT_URL};
