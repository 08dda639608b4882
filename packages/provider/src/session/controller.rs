// ABOUTME: Provider session controller hiding SDK load/init asynchrony behind a small contract
// ABOUTME: Polls for the script global, initializes once, and routes prompt outcomes to observers

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::ProviderError;
use crate::provider::ProviderKind;
use crate::session::observer::SessionObserver;
use crate::session::sdk::{initialize_once, IdentitySdk, PromptOutcome};
use crate::session::state::SessionState;

/// How often to check for the provider SDK global while its script loads
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long to wait for the SDK script before giving up
pub const LOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Observable session state guarded by one mutex so transitions stay
/// strictly sequential.
struct SessionInner {
    state: SessionState,
    error: Option<String>,
    /// Set once the SDK has been initialized for this controller; a fresh
    /// trigger after `Succeeded`/`Failed` must not re-run initialization.
    initialized: bool,
}

/// Drives the lifecycle of one provider integration for one mounted UI
/// surface: script readiness, initialization, credential capture, and
/// error/timeout reporting.
///
/// Failures are reported through the [`SessionObserver`], never thrown;
/// nothing is retried automatically. Controllers for different providers
/// are fully independent. Must be constructed inside a tokio runtime
/// because SDK readiness polling runs on a spawned task.
pub struct ProviderSessionController {
    provider: ProviderKind,
    sdk: Arc<dyn IdentitySdk>,
    observer: Arc<dyn SessionObserver>,
    inner: Arc<Mutex<SessionInner>>,
    poll_task: Mutex<Option<JoinHandle<()>>>,
}

impl ProviderSessionController {
    /// Create a controller, reading the client identifier from the
    /// provider's environment variable.
    pub fn from_env(
        provider: ProviderKind,
        sdk: Arc<dyn IdentitySdk>,
        observer: Arc<dyn SessionObserver>,
    ) -> Self {
        let client_id = provider.client_id_from_env();
        Self::new(provider, client_id, sdk, observer)
    }

    /// Create a controller with an explicit client identifier.
    ///
    /// A missing or blank identifier is a fatal, provider-scoped
    /// configuration error: this controller lands in `Failed` and reports
    /// once, while controllers for other providers are unaffected.
    pub fn new(
        provider: ProviderKind,
        client_id: Option<String>,
        sdk: Arc<dyn IdentitySdk>,
        observer: Arc<dyn SessionObserver>,
    ) -> Self {
        let controller = Self {
            provider,
            sdk,
            observer,
            inner: Arc::new(Mutex::new(SessionInner {
                state: SessionState::Uninitialized,
                error: None,
                initialized: false,
            })),
            poll_task: Mutex::new(None),
        };

        match client_id.filter(|id| !id.trim().is_empty()) {
            Some(id) => controller.begin_initialization(id),
            None => {
                report_failure(
                    provider,
                    &controller.inner,
                    &controller.observer,
                    ProviderError::NotConfigured(provider),
                );
            }
        }

        controller
    }

    /// Open the provider's consent prompt.
    ///
    /// Side effect only: the result arrives later through the observer.
    /// While the SDK is not initialized this reports "not available" and
    /// performs no state transition and no network effect. A call while a
    /// prompt is already in flight is a no-op.
    pub fn trigger_sign_in(&self) {
        {
            let mut inner = lock(&self.inner);
            inner.error = None;

            if !inner.initialized {
                let message = ProviderError::NotReady(self.provider).to_string();
                inner.error = Some(message.clone());
                drop(inner);
                warn!("{} sign-in triggered before ready", self.provider);
                self.observer.on_error(&message);
                return;
            }

            if inner.state.is_loading() {
                debug!("{} sign-in already in progress, ignoring", self.provider);
                return;
            }

            inner.state = SessionState::Prompting;
        }

        info!("{} sign-in prompt requested", self.provider);

        let provider = self.provider;
        let inner = Arc::clone(&self.inner);
        let observer = Arc::clone(&self.observer);
        let result = self.sdk.prompt(Box::new(move |outcome| {
            handle_prompt_outcome(provider, &inner, &observer, outcome);
        }));

        if let Err(err) = result {
            report_failure(self.provider, &self.inner, &self.observer, err);
        }
    }

    /// Clear the visible error without altering session state otherwise.
    pub fn clear_error(&self) {
        lock(&self.inner).error = None;
    }

    /// Cancel SDK readiness polling so no callback fires into a torn-down
    /// consumer. Called automatically on drop.
    pub fn shutdown(&self) {
        if let Some(task) = lock(&self.poll_task).take() {
            task.abort();
        }
    }

    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    pub fn state(&self) -> SessionState {
        lock(&self.inner).state.clone()
    }

    /// Whether the SDK is initialized and sign-in can be triggered
    pub fn is_ready(&self) -> bool {
        lock(&self.inner).initialized
    }

    /// Whether an asynchronous step is in flight
    pub fn is_loading(&self) -> bool {
        lock(&self.inner).state.is_loading()
    }

    pub fn error(&self) -> Option<String> {
        lock(&self.inner).error.clone()
    }

    /// Credential captured by a successful exchange, if any
    pub fn credential(&self) -> Option<String> {
        lock(&self.inner).state.credential().map(str::to_string)
    }

    /// Enter `Initializing` and reach `Ready` either synchronously (SDK
    /// global already present) or via the readiness poller.
    fn begin_initialization(&self, client_id: String) {
        lock(&self.inner).state = SessionState::Initializing;

        if self.sdk.is_loaded() {
            run_initialization(self.provider, &self.inner, &self.sdk, &self.observer, &client_id);
            return;
        }

        debug!(
            "{} SDK not yet loaded, polling every {:?} (timeout {:?})",
            self.provider, POLL_INTERVAL, LOAD_TIMEOUT
        );

        let provider = self.provider;
        let inner = Arc::clone(&self.inner);
        let sdk = Arc::clone(&self.sdk);
        let observer = Arc::clone(&self.observer);

        let task = tokio::spawn(async move {
            let deadline = tokio::time::Instant::now() + LOAD_TIMEOUT;
            let mut ticks = tokio::time::interval(POLL_INTERVAL);

            loop {
                ticks.tick().await;

                if sdk.is_loaded() {
                    run_initialization(provider, &inner, &sdk, &observer, &client_id);
                    return;
                }

                if tokio::time::Instant::now() >= deadline {
                    report_failure(
                        provider,
                        &inner,
                        &observer,
                        ProviderError::SdkUnavailable(provider, LOAD_TIMEOUT.as_secs()),
                    );
                    return;
                }
            }
        });

        *lock(&self.poll_task) = Some(task);
    }
}

impl Drop for ProviderSessionController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Mutex poisoning only happens if a holder panicked; the session state
/// is still coherent, so recover the guard rather than propagate.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn run_initialization(
    provider: ProviderKind,
    inner: &Mutex<SessionInner>,
    sdk: &Arc<dyn IdentitySdk>,
    observer: &Arc<dyn SessionObserver>,
    client_id: &str,
) {
    match initialize_once(provider, sdk.as_ref(), client_id) {
        Ok(()) => {
            {
                let mut guard = lock(inner);
                guard.state = SessionState::Ready;
                guard.initialized = true;
            }
            info!("{} sign-in ready", provider);
        }
        Err(err) => report_failure(provider, inner, observer, err),
    }
}

/// Record a terminal failure and report it through the observer.
///
/// The observer runs outside the state lock so a reentrant caller cannot
/// deadlock against an in-progress transition.
fn report_failure(
    provider: ProviderKind,
    inner: &Mutex<SessionInner>,
    observer: &Arc<dyn SessionObserver>,
    err: ProviderError,
) {
    let message = err.to_string();
    {
        let mut guard = lock(inner);
        guard.state = SessionState::Failed;
        guard.error = Some(message.clone());
    }
    error!("{} session failed: {}", provider, message);
    observer.on_error(&message);
}

/// Route the SDK's prompt moment callback into the state machine.
fn handle_prompt_outcome(
    provider: ProviderKind,
    inner: &Mutex<SessionInner>,
    observer: &Arc<dyn SessionObserver>,
    outcome: PromptOutcome,
) {
    match outcome {
        PromptOutcome::Credential(credential) => {
            lock(inner).state = SessionState::Exchanging;

            if credential.is_empty() {
                report_failure(
                    provider,
                    inner,
                    observer,
                    ProviderError::CredentialMissing(provider),
                );
                return;
            }

            {
                let mut guard = lock(inner);
                guard.state = SessionState::Succeeded {
                    credential: credential.clone(),
                };
            }
            info!("{} sign-in succeeded", provider);
            observer.on_success(&credential);
        }
        PromptOutcome::NotDisplayed | PromptOutcome::Skipped => {
            // Recoverable: the consent UI never appeared (popup blocked,
            // prior dismissal). Return to Ready so the user can retry.
            let message = ProviderError::PromptDismissed(provider).to_string();
            {
                let mut guard = lock(inner);
                guard.state = SessionState::Ready;
                guard.error = Some(message.clone());
            }
            warn!("{} sign-in prompt dismissed", provider);
            observer.on_error(&message);
        }
    }
}
