// ABOUTME: Adapter trait over the externally loaded identity provider SDK
// ABOUTME: Guards initialization so it runs at most once per provider per process

use std::collections::HashSet;
use std::sync::{Mutex, OnceLock};

use tracing::debug;

use crate::error::ProviderResult;
use crate::provider::ProviderKind;

/// Outcome reported by the SDK's prompt moment callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    /// The user consented and the SDK handed back a bearer credential.
    Credential(String),
    /// The consent UI never appeared (popup blocked, unsupported browser).
    NotDisplayed,
    /// The user dismissed the prompt, or suppressed it on a prior visit.
    Skipped,
}

/// Invoked by the SDK at most once per prompt.
pub type PromptCallback = Box<dyn FnOnce(PromptOutcome) + Send + 'static>;

/// Narrow interface over a provider's script-loaded SDK object.
///
/// The script itself is loaded outside this crate's control; `is_loaded`
/// answers whether the global object has appeared yet. Implementations
/// must be cheap to call repeatedly since readiness is polled.
pub trait IdentitySdk: Send + Sync {
    /// Whether the provider's global SDK object is present yet.
    fn is_loaded(&self) -> bool;

    /// Initialize the SDK with the configured client identifier.
    fn initialize(&self, client_id: &str) -> ProviderResult<()>;

    /// Open the provider's consent prompt. The outcome arrives later via
    /// `on_moment`; callers must not assume synchronous completion.
    fn prompt(&self, on_moment: PromptCallback) -> ProviderResult<()>;
}

fn initialized_providers() -> &'static Mutex<HashSet<ProviderKind>> {
    static INITIALIZED: OnceLock<Mutex<HashSet<ProviderKind>>> = OnceLock::new();
    INITIALIZED.get_or_init(|| Mutex::new(HashSet::new()))
}

/// Initialize the SDK at most once per provider per process.
///
/// Multiple controllers mounted for the same provider share the same
/// script global; the first one to get here initializes it and the rest
/// reuse that initialization.
pub(crate) fn initialize_once(
    provider: ProviderKind,
    sdk: &dyn IdentitySdk,
    client_id: &str,
) -> ProviderResult<()> {
    let mut initialized = initialized_providers()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    if initialized.contains(&provider) {
        debug!("{} SDK already initialized, reusing", provider);
        return Ok(());
    }

    sdk.initialize(client_id)?;
    initialized.insert(provider);
    Ok(())
}
