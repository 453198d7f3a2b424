use crate::actor::WeakActorClient;
use crate::leader::peers::{Peer, PeerRegistry};
use crate::leader::time::{Clock, RealClock};
use tokio::time::{Duration, Instant};

pub(crate) fn is_expired(last_heartbeat: Instant, now: Instant, expiry_threshold: Duration) -> bool {
    // saturating: a heartbeat stamped after `now` was taken is not expired.
    now.saturating_duration_since(last_heartbeat) > expiry_threshold
}

/// Every registered peer (voter or observer) whose last heartbeat is older than the threshold.
pub(crate) fn expired_peers(registry: &PeerRegistry, now: Instant, expiry_threshold: Duration) -> Vec<Peer> {
    registry
        .iter()
        .filter(|peer| is_expired(peer.last_heartbeat(), now, expiry_threshold))
        .cloned()
        .collect()
}

/// LivenessTimerTask asks the leader actor to run a liveness check on a fixed interval. It is
/// independent of request traffic, and exits once the actor is gone.
pub(crate) struct LivenessTimerTask<C: Clock = RealClock> {
    interval: Duration,
    actor_client: WeakActorClient,
    clock: C,
}

impl LivenessTimerTask {
    pub(crate) fn spawn(interval: Duration, actor_client: WeakActorClient) {
        // Add minimal logic here, as it is untested.
        let task = LivenessTimerTask::new(interval, actor_client, RealClock);
        tokio::task::spawn(task.run());
    }
}

impl<C: Clock> LivenessTimerTask<C> {
    fn new(interval: Duration, actor_client: WeakActorClient, clock: C) -> Self {
        LivenessTimerTask {
            interval,
            actor_client,
            clock,
        }
    }

    async fn run(mut self) {
        loop {
            // Measured from after the previous tick was delivered, so one long stall produces a
            // single tick instead of a burst.
            let wake_time = self.clock.now() + self.interval;
            self.clock.sleep_until(wake_time).await;

            if self.actor_client.liveness_check().await.is_err() {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::ActorClient;
    use crate::leader::peers::{PeerEndpoint, PeerId, PeerRole};
    use crate::leader::test_utils::TestUtilActor;
    use crate::leader::time;

    #[test]
    fn expiry_is_strictly_past_threshold() {
        let threshold = Duration::from_secs(5);
        let start = Instant::now();
        let mut registry = PeerRegistry::new();
        registry.register(PeerId::new("v"), PeerEndpoint::new("v"), PeerRole::Voter, start);
        registry.register(PeerId::new("o"), PeerEndpoint::new("o"), PeerRole::Observer, start);
        registry.register(
            PeerId::new("fresh"),
            PeerEndpoint::new("fresh"),
            PeerRole::Voter,
            start + Duration::from_secs(3),
        );

        assert!(expired_peers(&registry, start + threshold, threshold).is_empty());

        let now = start + threshold + Duration::from_millis(1);
        let expired: Vec<_> = expired_peers(&registry, now, threshold)
            .into_iter()
            .map(|p| p.id().clone())
            .collect();
        assert_eq!(expired, vec![PeerId::new("o"), PeerId::new("v")]);

        // Heartbeat from the "future" relative to a stale `now`.
        assert!(!is_expired(now, start, threshold));
    }

    #[tokio::test]
    async fn liveness_timer_lifecycle() {
        // -- setup --
        let interval = Duration::from_millis(100);
        let (strong_actor_client, rx) = ActorClient::new(10);
        let actor_client = strong_actor_client.weak();
        let mut actor = TestUtilActor::new(rx);

        let (mock_clock, mut mock_clock_controller) = time::mocked_clock();

        // -- execute & verify --

        // 1. Nothing before the first interval elapses.
        let task = LivenessTimerTask::new(interval, actor_client, mock_clock);
        let task_join_handle = tokio::task::spawn(task.run());
        actor.assert_no_event().await;
        mock_clock_controller.advance(interval / 2);
        actor.assert_no_event().await;

        // 2. One check per interval.
        mock_clock_controller.advance(interval / 2);
        actor.assert_liveness_check_event().await;
        for _ in 0..5 {
            mock_clock_controller.advance(interval);
            actor.assert_liveness_check_event().await;
            actor.assert_no_event().await;
        }

        // 3. A big leap still yields a single check.
        mock_clock_controller.advance(interval * 5);
        actor.assert_liveness_check_event().await;
        actor.assert_no_event().await;

        // 4. Drop the only strong client and assert the task exits.
        drop(strong_actor_client);
        mock_clock_controller.advance(interval);
        task_join_handle.await.unwrap();
        actor.assert_no_event().await;
    }
}
