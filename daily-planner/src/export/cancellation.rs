//! Cancellation of a running export
//!
//! The CLI flips the flag from its Ctrl+C handler while the pipeline is
//! waiting on the upload or the email service.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

/// Shared stop flag for one export
///
/// Clones observe the same flag. Once set it stays set.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    flag: Arc<watch::Sender<bool>>,
}

impl CancellationToken {
    /// Token that has not been cancelled
    #[must_use]
    pub fn new() -> Self {
        let (flag, _) = watch::channel(false);
        Self {
            flag: Arc::new(flag),
        }
    }

    /// Whether the export should stop
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.flag.borrow()
    }

    /// Stop the export at its next step
    pub fn cancel(&self) {
        if !self.flag.send_replace(true) {
            debug!("Export cancellation requested");
        }
    }

    /// Drive `step` to completion, or give up with `None` once cancelled
    ///
    /// An already cancelled token never polls `step`.
    pub async fn run_until_cancelled<F, T>(&self, step: F) -> Option<T>
    where
        F: Future<Output = T>,
    {
        let mut flag = self.flag.subscribe();
        tokio::select! {
            biased;
            _ = flag.wait_for(|cancelled| *cancelled) => None,
            output = step => Some(output),
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_cancel_is_seen_by_clones() {
        let token = CancellationToken::new();
        let handler = token.clone();
        assert!(!token.is_cancelled());

        handler.cancel();
        handler.cancel();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_step_completes_without_cancel() {
        let token = CancellationToken::new();
        assert_eq!(token.run_until_cancelled(async { "uploaded" }).await, Some("uploaded"));
    }

    #[tokio::test]
    async fn test_cancel_interrupts_pending_step() {
        let token = CancellationToken::new();
        let handler = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            handler.cancel();
        });

        let outcome = tokio::time::timeout(
            Duration::from_secs(1),
            token.run_until_cancelled(std::future::pending::<()>()),
        )
        .await
        .unwrap();
        assert_eq!(outcome, None);
    }

    #[tokio::test]
    async fn test_cancelled_token_skips_step() {
        let token = CancellationToken::new();
        token.cancel();
        assert_eq!(token.run_until_cancelled(async { 7 }).await, None);
    }
}
