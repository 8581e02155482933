use tokio_util::sync::CancellationToken;

/// Cancels an in-flight analysis from another task.
///
/// Cloning is cheap; every clone cancels the same upload.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once any clone has cancelled. Callers race follow-up work (e.g. export)
    /// against it.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}

/// A handle for the caller and a second one for the worker.
pub fn cancel_pair() -> (CancelHandle, CancelHandle) {
    let handle = CancelHandle::new();
    (handle.clone(), handle)
}
