use tokio::sync::oneshot;

/// Creates a linked pair. The signal resolves once the handle is dropped.
pub(crate) fn shutdown_signal() -> (RpcServerShutdownHandle, RpcServerShutdownSignal) {
    let (tx, rx) = oneshot::channel();

    (RpcServerShutdownHandle { _tx: tx }, RpcServerShutdownSignal { rx })
}

/// Whoever owns this owns the server's lifetime.
pub(crate) struct RpcServerShutdownHandle {
    _tx: oneshot::Sender<()>,
}

pub(crate) struct RpcServerShutdownSignal {
    rx: oneshot::Receiver<()>,
}

impl RpcServerShutdownSignal {
    pub(crate) async fn wait(self) {
        // Nothing is ever sent. Only the drop matters.
        let _ = self.rx.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Duration;

    #[tokio::test]
    async fn signal_fires_when_handle_drops() {
        let (handle, signal) = shutdown_signal();
        let waiter = tokio::task::spawn(signal.wait());

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        drop(handle);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("Expected shutdown")
            .unwrap();
    }
}
