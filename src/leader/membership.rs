use crate::actor::WeakActorClient;
use crate::leader::callback::{self, CallbackError, CallbackTransport};
use crate::leader::leader_api::PromotionReplyFromPeer;
use crate::leader::liveness;
use crate::leader::peers::{PeerEndpoint, PeerId, PeerRegistry, PeerRole};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::time::{Duration, Instant};

/// MembershipPolicy keeps the voter set at its target by promoting observers.
///
/// A promotion is a two step handshake. `plan_promotions()` picks candidates and marks them in
/// flight; the caller contacts them off the actor. The role only changes in
/// `complete_promotion()`, once the peer confirmed.
pub(crate) struct MembershipPolicy {
    target_voter_count: usize,
    in_flight: HashSet<PeerId>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct PromotionRequest {
    pub(crate) peer_id: PeerId,
    pub(crate) endpoint: PeerEndpoint,
}

#[derive(Debug)]
pub(crate) enum PromotionOutcome {
    Promoted,
    /// Contact failed. The next liveness cycle re-evaluates.
    ContactFailed(CallbackError),
    /// Removed while the request was in flight.
    PeerGone,
    /// Re-registered under a different endpoint while the request was in flight.
    PeerReRegistered,
    AlreadyVoter,
    /// No promotion was in flight for this peer.
    Unexpected,
}

impl MembershipPolicy {
    pub(crate) fn new(target_voter_count: usize) -> Self {
        MembershipPolicy {
            target_voter_count,
            in_flight: HashSet::new(),
        }
    }

    pub(crate) fn target_voter_count(&self) -> usize {
        self.target_voter_count
    }

    pub(crate) fn num_in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Picks observers to promote: one per voter removed this cycle, then more while the voter
    /// count (counting promotions in flight) is under target. Candidates are non-expired
    /// observers without a promotion in flight, lowest id first.
    pub(crate) fn plan_promotions(
        &mut self,
        registry: &PeerRegistry,
        now: Instant,
        expiry_threshold: Duration,
        num_removed_voters: usize,
    ) -> Vec<PromotionRequest> {
        let mut candidates = registry
            .observers_snapshot()
            .into_iter()
            .filter(|peer| !liveness::is_expired(peer.last_heartbeat(), now, expiry_threshold))
            .filter(|peer| !self.in_flight.contains(peer.id()))
            .map(|peer| PromotionRequest {
                peer_id: peer.id().clone(),
                endpoint: peer.endpoint().clone(),
            });

        let mut planned = Vec::new();

        // Replacements
        for _ in 0..num_removed_voters {
            match candidates.next() {
                Some(request) => planned.push(request),
                None => break,
            }
        }

        // Top-up
        let num_voters = registry.num_voters();
        while num_voters + self.in_flight.len() + planned.len() < self.target_voter_count {
            match candidates.next() {
                Some(request) => planned.push(request),
                None => break,
            }
        }

        for request in planned.iter() {
            self.in_flight.insert(request.peer_id.clone());
        }

        planned
    }

    /// Applies the peer's answer. The cursor is left alone; a promoted peer catches up through
    /// the normal catch-up protocol.
    pub(crate) fn complete_promotion(
        &mut self,
        registry: &mut PeerRegistry,
        reply: PromotionReplyFromPeer,
    ) -> PromotionOutcome {
        if !self.in_flight.remove(&reply.peer_id) {
            return PromotionOutcome::Unexpected;
        }

        if let Err(e) = reply.result {
            return PromotionOutcome::ContactFailed(e);
        }

        let peer = match registry.lookup(&reply.peer_id) {
            Ok(peer) => peer,
            Err(_) => return PromotionOutcome::PeerGone,
        };
        if peer.endpoint() != &reply.endpoint {
            return PromotionOutcome::PeerReRegistered;
        }
        if peer.is_voter() {
            return PromotionOutcome::AlreadyVoter;
        }

        match registry.set_role(&reply.peer_id, PeerRole::Voter) {
            Ok(()) => PromotionOutcome::Promoted,
            Err(_) => PromotionOutcome::PeerGone,
        }
    }
}

/// Contacts one observer and reports the result back to the actor as an event.
pub(crate) async fn call_peer_promotion(
    logger: slog::Logger,
    transport: Arc<dyn CallbackTransport>,
    request: PromotionRequest,
    timeout: Duration,
    actor_client: WeakActorClient,
) {
    slog::debug!(logger, "ClientWire - NotifyPromotion to {:?}", request.endpoint);
    let result = callback::with_timeout(
        timeout,
        transport.notify_promotion(&request.endpoint, &request.peer_id),
    )
    .await;
    slog::debug!(logger, "ClientWire - NotifyPromotion result {:?}", result);

    let reply = PromotionReplyFromPeer {
        peer_id: request.peer_id,
        endpoint: request.endpoint,
        result,
    };
    if actor_client.promotion_reply_from_peer(reply).await.is_err() {
        slog::info!(logger, "Leader exited before promotion reply was handled.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commitlog::Sequence;

    const EXPIRY: Duration = Duration::from_secs(5);

    fn endpoint(id: &str) -> PeerEndpoint {
        PeerEndpoint::new(format!("http://broker-{}", id))
    }

    fn request(id: &str) -> PromotionRequest {
        PromotionRequest {
            peer_id: PeerId::new(id),
            endpoint: endpoint(id),
        }
    }

    fn ok_reply(id: &str) -> PromotionReplyFromPeer {
        PromotionReplyFromPeer {
            peer_id: PeerId::new(id),
            endpoint: endpoint(id),
            result: Ok(()),
        }
    }

    fn registry_with(now: Instant, peers: &[(&str, PeerRole)]) -> PeerRegistry {
        let mut registry = PeerRegistry::new();
        for (id, role) in peers {
            registry.register(PeerId::new(*id), endpoint(id), *role, now);
        }
        registry
    }

    #[test]
    fn replaces_removed_voter_with_lowest_id_observer() {
        let now = Instant::now();
        let registry = registry_with(now, &[("c", PeerRole::Observer), ("b", PeerRole::Observer)]);
        let mut policy = MembershipPolicy::new(1);

        assert_eq!(policy.plan_promotions(&registry, now, EXPIRY, 1), vec![request("b")]);
        assert_eq!(policy.num_in_flight(), 1);

        // In flight counts toward the target, and "b" is no longer a candidate.
        assert_eq!(policy.plan_promotions(&registry, now, EXPIRY, 0), vec![]);
    }

    #[test]
    fn tops_up_to_target_and_skips_expired_observers() {
        let start = Instant::now();
        let mut registry = registry_with(
            start,
            &[
                ("a", PeerRole::Voter),
                ("b", PeerRole::Observer),
                ("c", PeerRole::Observer),
                ("d", PeerRole::Observer),
            ],
        );
        let now = start + EXPIRY + Duration::from_secs(1);
        registry.touch_heartbeat(&PeerId::new("a"), now).unwrap();
        registry.touch_heartbeat(&PeerId::new("c"), now).unwrap();
        registry.touch_heartbeat(&PeerId::new("d"), now).unwrap();

        let mut policy = MembershipPolicy::new(3);
        assert_eq!(
            policy.plan_promotions(&registry, now, EXPIRY, 0),
            vec![request("c"), request("d")]
        );
    }

    #[test]
    fn no_candidates_is_a_no_op() {
        let now = Instant::now();
        let registry = registry_with(now, &[]);
        let mut policy = MembershipPolicy::new(2);

        assert!(policy.plan_promotions(&registry, now, EXPIRY, 1).is_empty());
        assert_eq!(policy.num_in_flight(), 0);
    }

    #[test]
    fn successful_contact_promotes_and_preserves_cursor() {
        let now = Instant::now();
        let mut registry = registry_with(now, &[("b", PeerRole::Observer)]);
        registry.update_cursor(&PeerId::new("b"), Sequence::new(4)).unwrap();
        let mut policy = MembershipPolicy::new(1);
        policy.plan_promotions(&registry, now, EXPIRY, 1);

        assert!(matches!(
            policy.complete_promotion(&mut registry, ok_reply("b")),
            PromotionOutcome::Promoted
        ));

        let peer = registry.lookup(&PeerId::new("b")).unwrap();
        assert_eq!(peer.role(), PeerRole::Voter);
        assert_eq!(peer.cursor(), Sequence::new(4));
        assert_eq!(policy.num_in_flight(), 0);
    }

    #[test]
    fn failed_contact_leaves_role_and_frees_candidate() {
        let now = Instant::now();
        let mut registry = registry_with(now, &[("b", PeerRole::Observer)]);
        let mut policy = MembershipPolicy::new(1);
        policy.plan_promotions(&registry, now, EXPIRY, 1);

        let reply = PromotionReplyFromPeer {
            result: Err(CallbackError::Timeout),
            ..ok_reply("b")
        };
        assert!(matches!(
            policy.complete_promotion(&mut registry, reply),
            PromotionOutcome::ContactFailed(CallbackError::Timeout)
        ));
        assert_eq!(registry.lookup(&PeerId::new("b")).unwrap().role(), PeerRole::Observer);

        // Next cycle may try again.
        assert_eq!(policy.plan_promotions(&registry, now, EXPIRY, 0), vec![request("b")]);
    }

    #[test]
    fn stale_replies_do_not_change_roles() {
        let now = Instant::now();
        let mut registry = registry_with(now, &[("b", PeerRole::Observer), ("c", PeerRole::Observer)]);
        let mut policy = MembershipPolicy::new(2);
        policy.plan_promotions(&registry, now, EXPIRY, 0);

        // "b" came back at another address, "c" went away.
        registry.register(PeerId::new("b"), PeerEndpoint::new("http://elsewhere"), PeerRole::Observer, now);
        registry.remove(&PeerId::new("c"));

        assert!(matches!(
            policy.complete_promotion(&mut registry, ok_reply("b")),
            PromotionOutcome::PeerReRegistered
        ));
        assert!(matches!(
            policy.complete_promotion(&mut registry, ok_reply("c")),
            PromotionOutcome::PeerGone
        ));
        assert!(matches!(
            policy.complete_promotion(&mut registry, ok_reply("b")),
            PromotionOutcome::Unexpected
        ));
        assert_eq!(registry.lookup(&PeerId::new("b")).unwrap().role(), PeerRole::Observer);
    }
}
