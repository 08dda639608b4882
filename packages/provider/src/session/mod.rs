// ABOUTME: Session module driving the provider sign-in state machine
// ABOUTME: Includes the SDK adapter trait, observer seam, and session controller

pub mod controller;
pub mod observer;
pub mod sdk;
pub mod state;

pub use controller::{ProviderSessionController, LOAD_TIMEOUT, POLL_INTERVAL};
pub use observer::SessionObserver;
pub use sdk::{IdentitySdk, PromptCallback, PromptOutcome};
pub use state::SessionState;
