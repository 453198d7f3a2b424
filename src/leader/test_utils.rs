use crate::actor::Event;
use slog::Drain;
use std::fmt::Debug;
use std::time::Duration;
use tokio::sync::mpsc;

pub(crate) fn test_logger() -> slog::Logger {
    let decorator = slog_term::PlainSyncDecorator::new(slog_term::TestStdoutWriter);
    let drain = slog_term::FullFormat::new(decorator).build().fuse();

    slog::Logger::root(drain, slog::o!())
}

struct TestUtilReceiver<T> {
    rx: mpsc::Receiver<T>,
}

impl<T: Debug> TestUtilReceiver<T> {
    fn new(rx: mpsc::Receiver<T>) -> Self {
        TestUtilReceiver { rx }
    }

    async fn recv(&mut self) -> T {
        tokio::time::timeout(Duration::from_secs(5), self.rx.recv())
            .await
            .expect("Unexpected timeout")
            .expect("Expected value")
    }

    async fn recv_assert_timeout(&mut self, timeout: Duration) {
        // A closed queue counts as quiet.
        if let Ok(Some(value)) = tokio::time::timeout(timeout, self.rx.recv()).await {
            panic!("Expected no event. Got: {:?}", value);
        }
    }
}

/// TestUtilActor stands in for the leader actor's queue, so timer tasks can be tested without
/// a leader.
pub(crate) struct TestUtilActor {
    receiver: TestUtilReceiver<Event>,
    timeout: Duration,
}

impl TestUtilActor {
    pub(crate) fn new(actor_queue_rx: mpsc::Receiver<Event>) -> Self {
        TestUtilActor {
            receiver: TestUtilReceiver::new(actor_queue_rx),
            timeout: Duration::from_millis(10),
        }
    }

    pub(crate) async fn assert_liveness_check_event(&mut self) {
        match self.receiver.recv().await {
            Event::LivenessCheck => {}
            other => panic!("Unexpected event: {:?}", other),
        }
    }

    pub(crate) async fn assert_no_event(&mut self) {
        self.receiver.recv_assert_timeout(self.timeout).await;
    }
}
