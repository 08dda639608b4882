// ABOUTME: Coordinator combining provider sessions with the account's linked-method state
// ABOUTME: Enforces the lockout guard client-side before any unlink network call

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tracing::{debug, info, warn};

use signon_provider::{ProviderKind, ProviderSessionController};

use crate::api::{AccountLinkApi, LinkOutcome, UnlinkOutcome};
use crate::error::{SecurityError, SecurityResult};
use crate::methods::{can_unlink, has_email_method, AuthMethodKind, LinkedAuthMethod};
use crate::notify::SecurityNotifier;

struct CoordinatorState {
    methods: Vec<LinkedAuthMethod>,
    /// In-flight flags are per provider so one provider's operation never
    /// disables controls for a different provider.
    linking: HashSet<ProviderKind>,
    unlinking: HashSet<ProviderKind>,
}

/// Offers safe link/unlink operations over the account's current set of
/// login methods.
///
/// The link flow is split to follow the session controller's callback
/// contract: [`begin_link`](Self::begin_link) triggers the provider
/// prompt, and the UI glue forwards the eventual credential to
/// [`complete_link`](Self::complete_link) (or the error to
/// [`fail_link`](Self::fail_link)).
pub struct AccountSecurityCoordinator {
    api: Arc<dyn AccountLinkApi>,
    notifier: Arc<dyn SecurityNotifier>,
    sessions: HashMap<ProviderKind, Arc<ProviderSessionController>>,
    state: Mutex<CoordinatorState>,
}

impl AccountSecurityCoordinator {
    pub fn new(api: Arc<dyn AccountLinkApi>, notifier: Arc<dyn SecurityNotifier>) -> Self {
        Self {
            api,
            notifier,
            sessions: HashMap::new(),
            state: Mutex::new(CoordinatorState {
                methods: Vec::new(),
                linking: HashSet::new(),
                unlinking: HashSet::new(),
            }),
        }
    }

    /// Register the session controller handling one provider's prompts.
    pub fn register_session(&mut self, session: Arc<ProviderSessionController>) {
        self.sessions.insert(session.provider(), session);
    }

    /// Seed or replace the server-reported linked method set.
    pub fn set_methods(&self, methods: Vec<LinkedAuthMethod>) {
        lock(&self.state).methods = methods;
    }

    /// Start linking a provider by triggering its sign-in prompt.
    ///
    /// Returns `true` if a new link flow started. Coalesced: a second
    /// call while this provider is already linking is a no-op.
    pub fn begin_link(&self, provider: ProviderKind) -> bool {
        {
            let mut state = lock(&self.state);
            if state.linking.contains(&provider) {
                debug!("{} link already in progress, ignoring", provider);
                return false;
            }
            state.linking.insert(provider);
        }

        match self.sessions.get(&provider) {
            Some(session) => {
                info!("starting {} link flow", provider);
                session.trigger_sign_in();
                true
            }
            None => {
                lock(&self.state).linking.remove(&provider);
                let err = SecurityError::SessionMissing(provider);
                warn!("{}", err);
                self.notifier.notify_error(&err.to_string());
                false
            }
        }
    }

    /// Finish a link flow with the credential the provider session
    /// captured. On backend success the linked method set is updated and
    /// a success notification surfaces; on failure the set is unchanged
    /// and the backend's message surfaces verbatim.
    pub async fn complete_link(
        &self,
        provider: ProviderKind,
        credential: &str,
    ) -> SecurityResult<LinkOutcome> {
        let result = self.api.link_provider(provider, credential).await;

        let mut state = lock(&self.state);
        state.linking.remove(&provider);
        match result {
            Ok(outcome) => {
                let method = LinkedAuthMethod::provider(
                    provider,
                    Utc::now(),
                    outcome.provider_email.clone(),
                );
                state
                    .methods
                    .retain(|m| m.kind != AuthMethodKind::Provider(provider));
                state.methods.push(method);
                drop(state);

                info!("linked {} to account", provider);
                self.notifier.notify_success(&outcome.message);
                Ok(outcome)
            }
            Err(err) => {
                drop(state);
                warn!("linking {} failed: {}", provider, err);
                self.notifier.notify_error(&err.to_string());
                Err(err)
            }
        }
    }

    /// Abandon a link flow after the provider session reported an error
    /// instead of a credential.
    pub fn fail_link(&self, provider: ProviderKind, message: &str) {
        lock(&self.state).linking.remove(&provider);
        self.notifier.notify_error(message);
    }

    /// Remove a linked provider, guarded against account lockout.
    ///
    /// The guard is re-evaluated against the current method set
    /// synchronously, immediately before the network call; a rejection
    /// costs zero network round-trips regardless of the password given.
    pub async fn unlink(
        &self,
        provider: ProviderKind,
        password: &str,
    ) -> SecurityResult<UnlinkOutcome> {
        {
            let mut state = lock(&self.state);
            if state.unlinking.contains(&provider) {
                debug!("{} unlink already in progress, ignoring", provider);
                return Err(SecurityError::InProgress(provider));
            }

            if !can_unlink(&state.methods) {
                drop(state);
                warn!("lockout guard rejected {} unlink", provider);
                let err = SecurityError::LockoutGuard;
                self.notifier.notify_error(&err.to_string());
                return Err(err);
            }

            state.unlinking.insert(provider);
        }

        let result = self.api.unlink_provider(provider, password).await;

        let mut state = lock(&self.state);
        state.unlinking.remove(&provider);
        match result {
            Ok(outcome) => {
                state
                    .methods
                    .retain(|m| m.kind != AuthMethodKind::Provider(provider));
                drop(state);

                info!("unlinked {} from account", provider);
                self.notifier.notify_success(&outcome.message);
                Ok(outcome)
            }
            Err(err) => {
                drop(state);
                warn!("unlinking {} failed: {}", provider, err);
                self.notifier.notify_error(&err.to_string());
                Err(err)
            }
        }
    }

    /// Rebuild the linked method set from the server's security status.
    ///
    /// `provider` names the provider the status line refers to; the
    /// status endpoint reports link flags, not link timestamps, so
    /// refreshed entries carry the time of this refresh.
    pub async fn refresh_status(&self, provider: ProviderKind) -> SecurityResult<()> {
        let status = self.api.account_security_status().await?;

        let now = Utc::now();
        let mut methods = Vec::new();
        if status.email_linked {
            methods.push(LinkedAuthMethod::email(now));
        }
        if status.provider_linked {
            methods.push(LinkedAuthMethod::provider(
                provider,
                now,
                status.provider_email.clone(),
            ));
        }

        lock(&self.state).methods = methods;
        Ok(())
    }

    /// Current linked methods (server-reported, updated by operations)
    pub fn methods(&self) -> Vec<LinkedAuthMethod> {
        lock(&self.state).methods.clone()
    }

    /// Whether a link flow is in flight for this provider
    pub fn linking(&self, provider: ProviderKind) -> bool {
        lock(&self.state).linking.contains(&provider)
    }

    /// Whether an unlink is in flight for this provider
    pub fn unlinking(&self, provider: ProviderKind) -> bool {
        lock(&self.state).unlinking.contains(&provider)
    }

    /// Whether the lockout guard would currently allow an unlink; the UI
    /// disables the control and explains the remedy when this is false.
    pub fn can_unlink(&self) -> bool {
        can_unlink(&lock(&self.state).methods)
    }

    pub fn has_email_method(&self) -> bool {
        has_email_method(&lock(&self.state).methods)
    }
}

/// Mutex poisoning only happens if a holder panicked; recover the guard
/// rather than propagate.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockAccountLinkApi;
    use crate::methods::AccountSecurityStatus;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct RecordingNotifier {
        successes: StdMutex<Vec<String>>,
        errors: StdMutex<Vec<String>>,
    }

    impl RecordingNotifier {
        fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        fn successes(&self) -> Vec<String> {
            self.successes.lock().unwrap().clone()
        }

        fn errors(&self) -> Vec<String> {
            self.errors.lock().unwrap().clone()
        }
    }

    impl SecurityNotifier for RecordingNotifier {
        fn notify_success(&self, message: &str) {
            self.successes.lock().unwrap().push(message.to_string());
        }

        fn notify_error(&self, message: &str) {
            self.errors.lock().unwrap().push(message.to_string());
        }
    }

    fn provider_method(provider: ProviderKind) -> LinkedAuthMethod {
        LinkedAuthMethod::provider(provider, Utc::now(), None)
    }

    #[tokio::test]
    async fn test_unlink_rejected_by_lockout_guard_without_network_call() {
        let mut api = MockAccountLinkApi::new();
        // The guard must reject before any network round-trip
        api.expect_unlink_provider().times(0);

        let notifier = RecordingNotifier::new();
        let coordinator = AccountSecurityCoordinator::new(Arc::new(api), notifier.clone());
        coordinator.set_methods(vec![provider_method(ProviderKind::Google)]);

        let err = coordinator
            .unlink(ProviderKind::Google, "correct-password")
            .await
            .unwrap_err();

        assert_eq!(err, SecurityError::LockoutGuard);
        assert_eq!(coordinator.methods().len(), 1);
        assert!(!coordinator.can_unlink());
        assert_eq!(
            notifier.errors(),
            vec!["cannot remove your only sign-in method: set up email authentication first"]
        );
    }

    #[tokio::test]
    async fn test_unlink_succeeds_with_email_method_present() {
        let mut api = MockAccountLinkApi::new();
        api.expect_unlink_provider()
            .withf(|provider, password| {
                *provider == ProviderKind::Google && password == "hunter2"
            })
            .times(1)
            .returning(|_, _| {
                Ok(UnlinkOutcome {
                    message: "Google account unlinked".to_string(),
                })
            });

        let notifier = RecordingNotifier::new();
        let coordinator = AccountSecurityCoordinator::new(Arc::new(api), notifier.clone());
        coordinator.set_methods(vec![
            LinkedAuthMethod::email(Utc::now()),
            provider_method(ProviderKind::Google),
        ]);

        coordinator
            .unlink(ProviderKind::Google, "hunter2")
            .await
            .unwrap();

        // Count decreases by exactly one and the email method remains
        let methods = coordinator.methods();
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].kind, AuthMethodKind::Email);
        assert!(!coordinator.unlinking(ProviderKind::Google));
        assert_eq!(notifier.successes(), vec!["Google account unlinked"]);
    }

    #[tokio::test]
    async fn test_unlink_wrong_password_leaves_state_unchanged() {
        let mut api = MockAccountLinkApi::new();
        api.expect_unlink_provider()
            .times(1)
            .returning(|_, _| Err(SecurityError::Backend("incorrect password".to_string())));

        let notifier = RecordingNotifier::new();
        let coordinator = AccountSecurityCoordinator::new(Arc::new(api), notifier.clone());
        coordinator.set_methods(vec![
            LinkedAuthMethod::email(Utc::now()),
            provider_method(ProviderKind::Google),
        ]);

        let err = coordinator
            .unlink(ProviderKind::Google, "wrong")
            .await
            .unwrap_err();

        assert_eq!(err, SecurityError::Backend("incorrect password".to_string()));
        assert_eq!(coordinator.methods().len(), 2);
        assert!(!coordinator.unlinking(ProviderKind::Google));
        assert_eq!(notifier.errors(), vec!["incorrect password"]);
    }

    #[tokio::test]
    async fn test_guard_uses_current_counts_not_a_snapshot() {
        let mut api = MockAccountLinkApi::new();
        api.expect_unlink_provider().times(0);

        let notifier = RecordingNotifier::new();
        let coordinator = AccountSecurityCoordinator::new(Arc::new(api), notifier);
        coordinator.set_methods(vec![
            LinkedAuthMethod::email(Utc::now()),
            provider_method(ProviderKind::Google),
        ]);
        assert!(coordinator.can_unlink());

        // Another tab removed the email method since render time
        coordinator.set_methods(vec![provider_method(ProviderKind::Google)]);

        let err = coordinator
            .unlink(ProviderKind::Google, "pw")
            .await
            .unwrap_err();
        assert_eq!(err, SecurityError::LockoutGuard);
    }

    #[tokio::test]
    async fn test_complete_link_adds_method_and_notifies() {
        let mut api = MockAccountLinkApi::new();
        api.expect_link_provider()
            .withf(|provider, credential| {
                *provider == ProviderKind::GitHub && credential == "cred-123"
            })
            .times(1)
            .returning(|_, _| {
                Ok(LinkOutcome {
                    message: "GitHub account linked".to_string(),
                    provider_email: Some("dev@example.com".to_string()),
                })
            });

        let notifier = RecordingNotifier::new();
        let coordinator = AccountSecurityCoordinator::new(Arc::new(api), notifier.clone());
        coordinator.set_methods(vec![LinkedAuthMethod::email(Utc::now())]);

        coordinator
            .complete_link(ProviderKind::GitHub, "cred-123")
            .await
            .unwrap();

        let methods = coordinator.methods();
        assert_eq!(methods.len(), 2);
        assert!(methods
            .iter()
            .any(|m| m.kind == AuthMethodKind::Provider(ProviderKind::GitHub)
                && m.provider_email.as_deref() == Some("dev@example.com")));
        assert!(!coordinator.linking(ProviderKind::GitHub));
        assert_eq!(notifier.successes(), vec!["GitHub account linked"]);
    }

    #[tokio::test]
    async fn test_complete_link_email_mismatch_surfaces_verbatim() {
        let mut api = MockAccountLinkApi::new();
        api.expect_link_provider().times(1).returning(|_, _| {
            Err(SecurityError::Backend(
                "provider email does not match account email".to_string(),
            ))
        });

        let notifier = RecordingNotifier::new();
        let coordinator = AccountSecurityCoordinator::new(Arc::new(api), notifier.clone());
        coordinator.set_methods(vec![LinkedAuthMethod::email(Utc::now())]);

        let err = coordinator
            .complete_link(ProviderKind::Google, "cred")
            .await
            .unwrap_err();

        assert!(matches!(err, SecurityError::Backend(_)));
        assert_eq!(coordinator.methods().len(), 1);
        assert_eq!(
            notifier.errors(),
            vec!["provider email does not match account email"]
        );
    }

    #[tokio::test]
    async fn test_begin_link_without_session_reports_error() {
        let api = MockAccountLinkApi::new();
        let notifier = RecordingNotifier::new();
        let coordinator = AccountSecurityCoordinator::new(Arc::new(api), notifier.clone());

        assert!(!coordinator.begin_link(ProviderKind::Google));
        assert!(!coordinator.linking(ProviderKind::Google));
        assert_eq!(notifier.errors().len(), 1);
    }

    #[tokio::test]
    async fn test_loading_flags_are_independent_per_provider() {
        let mut api = MockAccountLinkApi::new();
        api.expect_unlink_provider().times(1).returning(|_, _| {
            Ok(UnlinkOutcome {
                message: "unlinked".to_string(),
            })
        });

        let notifier = RecordingNotifier::new();
        let coordinator = AccountSecurityCoordinator::new(Arc::new(api), notifier);
        coordinator.set_methods(vec![
            LinkedAuthMethod::email(Utc::now()),
            provider_method(ProviderKind::Google),
            provider_method(ProviderKind::GitHub),
        ]);

        // A Google unlink in flight must not mark GitHub as busy
        assert!(!coordinator.unlinking(ProviderKind::GitHub));
        coordinator.unlink(ProviderKind::Google, "pw").await.unwrap();
        assert!(!coordinator.unlinking(ProviderKind::GitHub));
        assert!(!coordinator.linking(ProviderKind::GitHub));
    }

    #[tokio::test]
    async fn test_refresh_status_rebuilds_method_set() {
        let mut api = MockAccountLinkApi::new();
        api.expect_account_security_status().times(1).returning(|| {
            Ok(AccountSecurityStatus {
                email_linked: true,
                provider_linked: true,
                provider_email: Some("user@example.com".to_string()),
            })
        });

        let notifier = RecordingNotifier::new();
        let coordinator = AccountSecurityCoordinator::new(Arc::new(api), notifier);

        coordinator.refresh_status(ProviderKind::Google).await.unwrap();

        let methods = coordinator.methods();
        assert_eq!(methods.len(), 2);
        assert!(coordinator.has_email_method());
        assert!(methods
            .iter()
            .any(|m| m.kind == AuthMethodKind::Provider(ProviderKind::Google)
                && m.provider_email.as_deref() == Some("user@example.com")));
    }
}
