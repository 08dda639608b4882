// ABOUTME: Notification seam through which coordinator outcomes reach the UI

/// Surfaced notifications for link/unlink outcomes (toast, banner).
pub trait SecurityNotifier: Send + Sync {
    fn notify_success(&self, message: &str);

    fn notify_error(&self, message: &str);
}
