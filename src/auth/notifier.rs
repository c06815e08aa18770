// Hand-off to the outbound messaging collaborator

use thiserror::Error;
use tracing::info;

use crate::auth::models::Account;

#[derive(Debug, Error)]
#[error("failed to schedule {kind} message: {reason}")]
pub struct NotifyError {
    pub kind: &'static str,
    pub reason: String,
}

/// Fire-and-forget delivery of single-use tokens
///
/// Implementations must only enqueue; they must not block on delivery.
/// The service logs and swallows any error.
pub trait Notifier: Send + Sync {
    fn send_verification(&self, account: &Account, token: &str) -> Result<(), NotifyError>;

    fn send_password_reset(&self, account: &Account, token: &str) -> Result<(), NotifyError>;
}

/// Notifier that only records the hand-off in the log
///
/// Used when no delivery backend is wired in. The token itself is never logged.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send_verification(&self, account: &Account, _token: &str) -> Result<(), NotifyError> {
        info!(account_id = %account.id, "Verification message queued");
        Ok(())
    }

    fn send_password_reset(&self, account: &Account, _token: &str) -> Result<(), NotifyError> {
        info!(account_id = %account.id, "Password reset message queued");
        Ok(())
    }
}
