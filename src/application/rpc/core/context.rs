use tokio_util::sync::CancellationToken;
use tokio_util::sync::DropGuard;

/// Per-call context handed to the dispatcher and on to handlers.
///
/// Cancelling the context before a handler runs fails the call with
/// `Cancelled`. Once a handler runs, cancellation is advisory: the handler
/// may poll [CallContext::is_cancelled] or await [CallContext::cancelled].
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancel: CancellationToken,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// completes once the call is cancelled
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }

    pub fn cancel(&self) {
        self.cancel.cancel()
    }

    /// cancels the call when the returned guard is dropped, unless it is
    /// disarmed first.
    pub fn drop_guard(&self) -> DropGuard {
        self.cancel.clone().drop_guard()
    }
}
