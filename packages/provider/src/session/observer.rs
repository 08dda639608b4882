// ABOUTME: Observer seam through which session outcomes reach the owning UI
// ABOUTME: Failures are always reported here, never thrown across the async boundary

/// Callbacks supplied by the consumer at controller construction.
pub trait SessionObserver: Send + Sync {
    /// Invoked exactly once per successful credential exchange.
    fn on_success(&self, credential: &str);

    /// Invoked for every reported failure; may fire more than once over a
    /// session's lifetime (initialization failure, then a later trigger
    /// failure).
    fn on_error(&self, message: &str);
}
