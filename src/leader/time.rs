#[cfg(test)]
use tokio::sync::watch;
#[cfg(test)]
use tokio::time::Duration;
use tokio::time::Instant;

/// Clock is the only source of "now" for heartbeat bookkeeping and the liveness timer, so tests
/// can expire peers without waiting on wall-clock time.
#[async_trait::async_trait]
pub(crate) trait Clock: Clone + Send + Sync + 'static {
    fn now(&self) -> Instant;
    async fn sleep_until(&mut self, deadline: Instant);
}

#[derive(Copy, Clone)]
pub(crate) struct RealClock;

#[async_trait::async_trait]
impl Clock for RealClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep_until(&mut self, deadline: Instant) {
        tokio::time::sleep_until(deadline).await;
    }
}

/// Test clock. Time only moves when its `MockClockController` says so.
#[cfg(test)]
pub(crate) fn mocked_clock() -> (MockClock, MockClockController) {
    let (tx, rx) = watch::channel(Instant::now());

    (MockClock { now: rx }, MockClockController { now: tx })
}

#[cfg(test)]
#[derive(Clone)]
pub(crate) struct MockClock {
    now: watch::Receiver<Instant>,
}

#[cfg(test)]
#[async_trait::async_trait]
impl Clock for MockClock {
    fn now(&self) -> Instant {
        *self.now.borrow()
    }

    async fn sleep_until(&mut self, deadline: Instant) {
        while *self.now.borrow() < deadline {
            if self.now.changed().await.is_err() {
                // Controller dropped. Time will never move again.
                std::future::pending::<()>().await;
            }
        }
    }
}

#[cfg(test)]
pub(crate) struct MockClockController {
    now: watch::Sender<Instant>,
}

#[cfg(test)]
impl MockClockController {
    pub(crate) fn now(&self) -> Instant {
        *self.now.borrow()
    }

    /// Step in increments smaller than the interval under test. A sleeper only wakes at or after
    /// its deadline, so one big leap wakes it once, late.
    pub(crate) fn advance(&mut self, duration: Duration) {
        let later = self.now() + duration;
        let _ = self.now.send(later);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn mock_clock_wakes_sleepers_only_when_advanced() {
        let tick = Duration::from_millis(500);
        let (tx, mut rx) = mpsc::unbounded_channel();

        let (mut clock, mut controller) = mocked_clock();
        let start = controller.now();

        tokio::spawn(async move {
            let mut next_wake = start;
            loop {
                next_wake += tick;
                clock.sleep_until(next_wake).await;
                if tx.send(()).is_err() {
                    return;
                }
            }
        });

        controller.advance(tick / 2);
        tokio::time::timeout(Duration::from_millis(50), rx.recv())
            .await
            .expect_err("Expected timeout");

        controller.advance(tick);
        rx.recv().await.unwrap();
        tokio::time::timeout(Duration::from_millis(50), rx.recv())
            .await
            .expect_err("Expected timeout");

        controller.advance(tick * 2);
        rx.recv().await.unwrap();
        rx.recv().await.unwrap();

        assert_eq!(controller.now() - start, tick * 7 / 2);
    }
}
