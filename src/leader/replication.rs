use crate::commitlog::{Log, Sequence};
use crate::leader::callback::{self, CallbackTransport};
use crate::leader::leader_api::{GetLogOutcome, RejectReason, ReplicatedEntry};
use crate::leader::log_entry::LogEntry;
use crate::leader::peers::{Peer, PeerId, PeerRegistry};
use std::sync::Arc;
use tokio::time::Duration;

/// One step of the pull-based catch-up protocol.
///
/// The peer must ask for exactly its cursor. It gets at most one entry per call, and its cursor
/// moves before it acks. Read and cursor update happen under the same `&mut` borrow, so two
/// overlapping requests from one peer can't both advance it.
pub(crate) fn catch_up<L>(
    registry: &mut PeerRegistry,
    log: &L,
    peer_id: &PeerId,
    requested_start: Sequence,
) -> GetLogOutcome
where
    L: Log<LogEntry>,
{
    let peer = match registry.lookup(peer_id) {
        Ok(peer) => peer,
        Err(_) => return GetLogOutcome::Rejected(RejectReason::UnknownPeer),
    };

    if !peer.is_voter() {
        return GetLogOutcome::Rejected(RejectReason::NotVoter);
    }

    let cursor = peer.cursor();
    if requested_start != cursor {
        return GetLogOutcome::Resync { correct_cursor: cursor };
    }

    let next_cursor = requested_start.plus(1);
    if next_cursor.as_u64() > log.len() {
        return GetLogOutcome::NoData { current_cursor: cursor };
    }

    let entries: Vec<ReplicatedEntry> = match log.slice(requested_start, next_cursor) {
        Ok(slice) => slice
            .iter()
            .map(|entry| ReplicatedEntry {
                sequence: requested_start,
                payload: entry.payload().clone(),
            })
            .collect(),
        Err(_) => return GetLogOutcome::NoData { current_cursor: cursor },
    };

    if registry.update_cursor(peer_id, next_cursor).is_err() {
        // Looked up above under the same borrow.
        return GetLogOutcome::Rejected(RejectReason::UnknownPeer);
    }

    GetLogOutcome::Entries(entries)
}

/// Hints every voter in `voters` that the log grew to `log_len`. Each notification is its own
/// task. A failure is logged and goes nowhere else.
pub(crate) fn notify_voters_of_new_entry(
    logger: &slog::Logger,
    transport: &Arc<dyn CallbackTransport>,
    voters: Vec<Peer>,
    log_len: u64,
    timeout: Duration,
) {
    for voter in voters {
        let logger = logger.new(slog::o!("Peer" => format!("{:?}", voter.id())));
        let transport = transport.clone();
        tokio::task::spawn(async move {
            let result = callback::with_timeout(timeout, transport.notify_new_entry(voter.endpoint(), log_len)).await;
            if let Err(e) = result {
                slog::warn!(logger, "Failed to notify voter of new entry: {}", e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commitlog::InMemoryLog;
    use crate::leader::callback::test_utils::{RecordedCallback, RecordingTransport};
    use crate::leader::peers::{PeerEndpoint, PeerRole};
    use crate::leader::test_utils::test_logger;
    use bytes::Bytes;
    use tokio::time::Instant;

    struct Fixture {
        registry: PeerRegistry,
        log: InMemoryLog<LogEntry>,
    }

    impl Fixture {
        fn new() -> Self {
            let now = Instant::now();
            let mut registry = PeerRegistry::new();
            registry.register(PeerId::new("1"), endpoint("1"), PeerRole::Voter, now);
            registry.register(PeerId::new("2"), endpoint("2"), PeerRole::Observer, now);

            Fixture {
                registry,
                log: InMemoryLog::create(100),
            }
        }

        fn append(&mut self, payload: &'static str) {
            self.log
                .append(LogEntry::new(Bytes::from_static(payload.as_bytes()), None))
                .unwrap();
        }

        fn get_log(&mut self, peer: &str, start: u64) -> GetLogOutcome {
            catch_up(&mut self.registry, &self.log, &PeerId::new(peer), Sequence::new(start))
        }

        fn cursor(&self, peer: &str) -> Sequence {
            self.registry.lookup(&PeerId::new(peer)).unwrap().cursor()
        }
    }

    fn endpoint(id: &str) -> PeerEndpoint {
        PeerEndpoint::new(format!("http://broker-{}", id))
    }

    fn entry(seq: u64, payload: &'static str) -> ReplicatedEntry {
        ReplicatedEntry {
            sequence: Sequence::new(seq),
            payload: Bytes::from_static(payload.as_bytes()),
        }
    }

    #[test]
    fn one_entry_per_round_trip() {
        let mut f = Fixture::new();
        f.append("A");
        f.append("B");

        assert_eq!(f.get_log("1", 0), GetLogOutcome::Entries(vec![entry(0, "A")]));
        assert_eq!(f.cursor("1"), Sequence::new(1));
        assert_eq!(f.get_log("1", 1), GetLogOutcome::Entries(vec![entry(1, "B")]));
        assert_eq!(f.cursor("1"), Sequence::new(2));
        assert_eq!(
            f.get_log("1", 2),
            GetLogOutcome::NoData {
                current_cursor: Sequence::new(2)
            }
        );
        assert_eq!(f.cursor("1"), Sequence::new(2));
    }

    #[test]
    fn mismatched_start_reports_true_cursor_unchanged() {
        let mut f = Fixture::new();
        f.append("A");
        f.append("B");
        f.get_log("1", 0);

        // Duplicate of an earlier request.
        assert_eq!(
            f.get_log("1", 0),
            GetLogOutcome::Resync {
                correct_cursor: Sequence::new(1)
            }
        );
        // Skipping ahead.
        assert_eq!(
            f.get_log("1", 2),
            GetLogOutcome::Resync {
                correct_cursor: Sequence::new(1)
            }
        );
        assert_eq!(f.cursor("1"), Sequence::new(1));
    }

    #[test]
    fn cursor_never_passes_log_length() {
        let mut f = Fixture::new();
        assert_eq!(
            f.get_log("1", 0),
            GetLogOutcome::NoData {
                current_cursor: Sequence::start()
            }
        );

        f.append("A");
        for _ in 0..3 {
            let cursor = f.cursor("1").as_u64();
            f.get_log("1", cursor);
            assert!(f.cursor("1").as_u64() <= f.log.len());
        }
        assert_eq!(f.cursor("1"), Sequence::new(1));
    }

    #[test]
    fn unknown_and_observer_peers_are_rejected() {
        let mut f = Fixture::new();
        f.append("A");

        assert_eq!(f.get_log("ghost", 0), GetLogOutcome::Rejected(RejectReason::UnknownPeer));
        assert_eq!(f.get_log("2", 0), GetLogOutcome::Rejected(RejectReason::NotVoter));
        assert_eq!(f.cursor("2"), Sequence::start());
    }

    #[tokio::test]
    async fn fan_out_failure_is_isolated() {
        let recorder = RecordingTransport::new();
        recorder.set_unreachable("http://broker-a");
        let transport: Arc<dyn CallbackTransport> = Arc::new(recorder.clone());

        let now = Instant::now();
        let mut registry = PeerRegistry::new();
        registry.register(PeerId::new("a"), endpoint("a"), PeerRole::Voter, now);
        registry.register(PeerId::new("b"), endpoint("b"), PeerRole::Voter, now);
        registry.register(PeerId::new("c"), endpoint("c"), PeerRole::Observer, now);

        notify_voters_of_new_entry(
            &test_logger(),
            &transport,
            registry.voters_snapshot(),
            7,
            Duration::from_millis(100),
        );

        let mut calls = recorder.wait_for_calls(2).await;
        calls.sort_by(|a, b| format!("{:?}", a).cmp(&format!("{:?}", b)));
        assert_eq!(
            calls,
            vec![
                RecordedCallback::NewEntry {
                    endpoint: endpoint("a"),
                    log_len: 7
                },
                RecordedCallback::NewEntry {
                    endpoint: endpoint("b"),
                    log_len: 7
                },
            ]
        );
    }
}
