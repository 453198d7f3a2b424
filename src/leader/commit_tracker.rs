use crate::commitlog::{Log, Sequence};
use crate::leader::leader_api::{GetCommittedLogOutcome, ReplicatedEntry};
use crate::leader::log_entry::{LogEntry, ProducerRef};
use crate::leader::peers::PeerId;
use bytes::Bytes;
use std::num::NonZeroUsize;

/// CommitTracker decides when an entry is committed and remembers the order entries committed in.
///
/// Note: The per-entry ack sets live on the `LogEntry` itself. This struct owns the quorum
/// threshold and the externally visible committed log, which is ordered by commit time, not by
/// sequence. An entry can reach quorum before an older one does. Appending in commit order keeps
/// the committed log append-only for consumers.
pub(crate) struct CommitTracker {
    quorum_size: NonZeroUsize,
    committed: Vec<Sequence>,
}

#[derive(Debug, PartialEq)]
pub(crate) enum AckOutcome {
    /// Ack recorded (or already present), quorum not reached yet.
    Pending { acks: usize, quorum_size: usize },
    /// This ack made the entry committed. Happens exactly once per entry.
    Committed {
        sequence: Sequence,
        payload: Bytes,
        origin: Option<ProducerRef>,
    },
    /// Entry was committed by an earlier ack.
    AlreadyCommitted,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub(crate) enum AckError {
    #[error("No entry {sequence:?}. Log length: {log_len}")]
    UnknownEntry { sequence: Sequence, log_len: u64 },
}

#[derive(Debug, thiserror::Error, PartialEq)]
#[error("Start index {start_index} is past the committed log of length {committed_count}")]
pub(crate) struct CommittedOutOfRange {
    pub(crate) start_index: u64,
    pub(crate) committed_count: u64,
}

impl CommitTracker {
    pub(crate) fn new(quorum_size: NonZeroUsize) -> Self {
        CommitTracker {
            quorum_size,
            committed: Vec::new(),
        }
    }

    pub(crate) fn quorum_size(&self) -> usize {
        self.quorum_size.get()
    }

    pub(crate) fn committed_count(&self) -> u64 {
        self.committed.len() as u64
    }

    /// Records that `peer_id` durably stored `sequence`. Re-acks are no-ops, so a peer can never
    /// count twice, and the committed flag on the entry guards the commit transition.
    pub(crate) fn acknowledge<L>(
        &mut self,
        log: &mut L,
        peer_id: &PeerId,
        sequence: Sequence,
    ) -> Result<AckOutcome, AckError>
    where
        L: Log<LogEntry>,
    {
        let log_len = log.len();
        let entry = log
            .read_mut(sequence)
            .ok_or(AckError::UnknownEntry { sequence, log_len })?;

        if !entry.is_acked_by(peer_id) {
            entry.record_ack(peer_id.clone());
        }

        if entry.is_committed() {
            return Ok(AckOutcome::AlreadyCommitted);
        }

        if entry.num_acks() < self.quorum_size() {
            return Ok(AckOutcome::Pending {
                acks: entry.num_acks(),
                quorum_size: self.quorum_size(),
            });
        }

        if !entry.mark_committed() {
            // The committed flag was checked above and nothing else holds this entry.
            return Ok(AckOutcome::AlreadyCommitted);
        }
        self.committed.push(sequence);

        Ok(AckOutcome::Committed {
            sequence,
            payload: entry.payload().clone(),
            origin: entry.origin().cloned(),
        })
    }

    /// Reads the committed log from position `start_index` to its current end.
    pub(crate) fn read_committed<L>(&self, log: &L, start_index: u64) -> Result<GetCommittedLogOutcome, CommittedOutOfRange>
    where
        L: Log<LogEntry>,
    {
        let committed_count = self.committed_count();
        if start_index > committed_count {
            return Err(CommittedOutOfRange {
                start_index,
                committed_count,
            });
        }
        if start_index == committed_count {
            return Ok(GetCommittedLogOutcome::NoNewData { committed_count });
        }

        let entries = self.committed[start_index as usize..]
            .iter()
            .filter_map(|sequence| {
                log.read(*sequence).map(|entry| ReplicatedEntry {
                    sequence: *sequence,
                    payload: entry.payload().clone(),
                })
            })
            .collect();

        Ok(GetCommittedLogOutcome::Entries(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commitlog::InMemoryLog;

    fn log_with(payloads: &[&'static str]) -> InMemoryLog<LogEntry> {
        let mut log = InMemoryLog::create(100);
        for p in payloads {
            log.append(LogEntry::new(Bytes::from_static(p.as_bytes()), None)).unwrap();
        }
        log
    }

    fn peer(id: &str) -> PeerId {
        PeerId::new(id)
    }

    fn quorum(size: usize) -> NonZeroUsize {
        NonZeroUsize::new(size).unwrap()
    }

    #[test]
    fn commits_exactly_at_quorum() {
        let mut log = log_with(&["A"]);
        let mut tracker = CommitTracker::new(quorum(3));
        let seq = Sequence::new(0);

        assert_eq!(
            tracker.acknowledge(&mut log, &peer("1"), seq),
            Ok(AckOutcome::Pending { acks: 1, quorum_size: 3 })
        );
        assert_eq!(
            tracker.acknowledge(&mut log, &peer("2"), seq),
            Ok(AckOutcome::Pending { acks: 2, quorum_size: 3 })
        );
        assert_eq!(
            tracker.acknowledge(&mut log, &peer("3"), seq),
            Ok(AckOutcome::Committed {
                sequence: seq,
                payload: Bytes::from_static(b"A"),
                origin: None,
            })
        );
        assert_eq!(
            tracker.acknowledge(&mut log, &peer("4"), seq),
            Ok(AckOutcome::AlreadyCommitted)
        );
        assert_eq!(tracker.committed_count(), 1);
    }

    #[test]
    fn duplicate_ack_does_not_double_count() {
        let mut log = log_with(&["A"]);
        let mut tracker = CommitTracker::new(quorum(2));
        let seq = Sequence::new(0);

        for _ in 0..3 {
            assert_eq!(
                tracker.acknowledge(&mut log, &peer("1"), seq),
                Ok(AckOutcome::Pending { acks: 1, quorum_size: 2 })
            );
        }
        assert!(!log.read(seq).unwrap().is_committed());

        assert!(matches!(
            tracker.acknowledge(&mut log, &peer("2"), seq),
            Ok(AckOutcome::Committed { .. })
        ));
        // Replayed ack from a peer that already counted.
        assert_eq!(
            tracker.acknowledge(&mut log, &peer("1"), seq),
            Ok(AckOutcome::AlreadyCommitted)
        );
        assert_eq!(tracker.committed_count(), 1);
    }

    #[test]
    fn unknown_entry() {
        let mut log = log_with(&["A", "B"]);
        let mut tracker = CommitTracker::new(quorum(1));

        assert_eq!(
            tracker.acknowledge(&mut log, &peer("1"), Sequence::new(2)),
            Err(AckError::UnknownEntry {
                sequence: Sequence::new(2),
                log_len: 2
            })
        );
    }

    #[test]
    fn committed_log_is_in_commit_order_and_append_only() {
        let mut log = log_with(&["A", "B", "C"]);
        let mut tracker = CommitTracker::new(quorum(1));

        assert_eq!(
            tracker.read_committed(&log, 0),
            Ok(GetCommittedLogOutcome::NoNewData { committed_count: 0 })
        );
        assert_eq!(
            tracker.read_committed(&log, 1),
            Err(CommittedOutOfRange {
                start_index: 1,
                committed_count: 0
            })
        );

        // "C" reaches quorum before "A".
        tracker.acknowledge(&mut log, &peer("1"), Sequence::new(2)).unwrap();
        let first_read = tracker.read_committed(&log, 0).unwrap();
        tracker.acknowledge(&mut log, &peer("1"), Sequence::new(0)).unwrap();
        let second_read = tracker.read_committed(&log, 0).unwrap();

        let entry = |seq: u64, payload: &'static str| ReplicatedEntry {
            sequence: Sequence::new(seq),
            payload: Bytes::from_static(payload.as_bytes()),
        };
        assert_eq!(first_read, GetCommittedLogOutcome::Entries(vec![entry(2, "C")]));
        assert_eq!(
            second_read,
            GetCommittedLogOutcome::Entries(vec![entry(2, "C"), entry(0, "A")])
        );
        assert_eq!(
            tracker.read_committed(&log, 1),
            Ok(GetCommittedLogOutcome::Entries(vec![entry(0, "A")]))
        );
        assert_eq!(
            tracker.read_committed(&log, 2),
            Ok(GetCommittedLogOutcome::NoNewData { committed_count: 2 })
        );
    }
}
