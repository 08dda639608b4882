// ABOUTME: Cross-tab verification channel over a shared broadcast scope
// ABOUTME: The publishing tab never receives its own messages; delivery is best-effort

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{CrosstabError, CrosstabResult};
use crate::message::{RedirectReason, VerificationBroadcast};

/// Capacity of the shared broadcast fabric; verification flows publish a
/// handful of messages at most, lagging receivers just skip ahead.
const BROADCAST_CAPACITY: usize = 16;

/// Envelope tagging each message with its publishing tab so receivers
/// can drop their own.
#[derive(Debug, Clone)]
struct BroadcastFrame {
    sender: Uuid,
    payload: VerificationBroadcast,
}

/// The set of tabs sharing one named broadcast fabric (one per origin).
///
/// A shared, unowned resource: any number of tabs attach, publish, and
/// subscribe concurrently with no coordination beyond handler
/// idempotence. [`BroadcastScope::unavailable`] models an execution
/// environment without the broadcast primitive.
#[derive(Clone)]
pub struct BroadcastScope {
    fabric: Option<broadcast::Sender<BroadcastFrame>>,
}

impl BroadcastScope {
    pub fn new() -> Self {
        let (fabric, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            fabric: Some(fabric),
        }
    }

    /// A scope with no underlying broadcast primitive; publishes are
    /// silently dropped and subscriptions are inert.
    pub fn unavailable() -> Self {
        Self { fabric: None }
    }

    pub fn is_available(&self) -> bool {
        self.fabric.is_some()
    }
}

impl Default for BroadcastScope {
    fn default() -> Self {
        Self::new()
    }
}

/// One tab's handle on the verification broadcast fabric.
///
/// Used during email-verification and password-reset flows: the tab that
/// completes the exchange publishes a redirect so sibling tabs stop
/// waiting and navigate away, producing one consistent outcome instead
/// of N tabs racing to the same terminal screen.
pub struct CrossTabVerificationChannel {
    tab_id: Uuid,
    scope: BroadcastScope,
}

impl CrossTabVerificationChannel {
    /// Attach a new tab to the scope with a fresh tab identity.
    pub fn attach(scope: &BroadcastScope) -> Self {
        Self {
            tab_id: Uuid::new_v4(),
            scope: scope.clone(),
        }
    }

    pub fn tab_id(&self) -> Uuid {
        self.tab_id
    }

    /// Send to all other tabs in the scope. Never fails: the initiating
    /// tab's own flow must complete even when no other tabs exist, so an
    /// unavailable fabric or empty audience is only logged.
    pub fn publish(&self, message: VerificationBroadcast) {
        match self.try_publish(message) {
            Ok(receivers) => {
                debug!("verification broadcast reached {} receiver(s)", receivers);
            }
            Err(CrosstabError::ChannelUnavailable) => {
                warn!("broadcast channel unavailable, skipping cross-tab notification");
            }
            Err(CrosstabError::NoSubscribers) => {
                debug!("no sibling tabs subscribed, broadcast dropped");
            }
        }
    }

    fn try_publish(&self, message: VerificationBroadcast) -> CrosstabResult<usize> {
        let fabric = self
            .scope
            .fabric
            .as_ref()
            .ok_or(CrosstabError::ChannelUnavailable)?;
        fabric
            .send(BroadcastFrame {
                sender: self.tab_id,
                payload: message,
            })
            .map_err(|_| CrosstabError::NoSubscribers)
    }

    /// Construct and publish a redirect instruction; `url` defaults to
    /// the application root.
    pub fn request_redirect(
        &self,
        reason: RedirectReason,
        url: Option<&str>,
        message: Option<&str>,
    ) {
        self.publish(VerificationBroadcast::redirect(reason, url, message));
    }

    /// Register `handler` for every message published by other tabs in
    /// the scope. Runs until the returned [`Subscription`] is dropped or
    /// explicitly unsubscribed; other subscribers are unaffected either
    /// way. Handlers must be idempotent: delivery is best-effort,
    /// unacknowledged, and may arrive after the user navigated manually.
    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(VerificationBroadcast) + Send + 'static,
    {
        let Some(fabric) = self.scope.fabric.as_ref() else {
            warn!("broadcast channel unavailable, subscription is inert");
            return Subscription { task: None };
        };

        let mut receiver = fabric.subscribe();
        let own_id = self.tab_id;

        let task = tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(frame) if frame.sender == own_id => continue,
                    Ok(frame) => handler(frame.payload),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Stale messages are safe to skip: handlers are
                        // idempotent and newer frames carry the outcome.
                        warn!("cross-tab subscriber lagged, skipped {} frame(s)", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Subscription { task: Some(task) }
    }
}

/// Handle owning one subscriber's receive loop.
pub struct Subscription {
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    /// Remove exactly this handler; equivalent to dropping the handle.
    pub fn unsubscribe(mut self) {
        self.stop();
    }

    /// Whether this subscription has a live receive loop.
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.stop();
    }
}
