// ABOUTME: Signon security library coordinating linked login methods for an account
// ABOUTME: Offers safe link/unlink operations guarded against account lockout

pub mod api;
pub mod coordinator;
pub mod error;
pub mod methods;
pub mod notify;

// Re-export main types
pub use api::{AccountLinkApi, LinkOutcome, UnlinkOutcome};
pub use coordinator::AccountSecurityCoordinator;
pub use error::{SecurityError, SecurityResult};
pub use methods::{
    can_unlink, has_email_method, AccountSecurityStatus, AuthMethodKind, LinkedAuthMethod,
};
pub use notify::SecurityNotifier;
