use crate::leader::peers::PeerId;
use bytes::Bytes;
use std::collections::HashSet;

/// ProducerRef is where to deliver the commit notification for an entry: the producer's
/// callback URI.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProducerRef(String);

impl ProducerRef {
    pub fn new(callback_uri: impl Into<String>) -> Self {
        ProducerRef(callback_uri.into())
    }

    /// Empty means "don't call me back".
    pub fn from_optional(callback_uri: String) -> Option<Self> {
        if callback_uri.is_empty() {
            None
        } else {
            Some(ProducerRef(callback_uri))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// LogEntry is a single entry of the leader's log plus its replication bookkeeping. The entry's
/// sequence is its position in the log.
///
/// `acked_by` only grows, and `committed` flips from false to true at most once.
#[derive(Debug)]
pub(crate) struct LogEntry {
    payload: Bytes,
    origin: Option<ProducerRef>,
    acked_by: HashSet<PeerId>,
    committed: bool,
}

impl LogEntry {
    pub(crate) fn new(payload: Bytes, origin: Option<ProducerRef>) -> Self {
        LogEntry {
            payload,
            origin,
            acked_by: HashSet::new(),
            committed: false,
        }
    }

    pub(crate) fn payload(&self) -> &Bytes {
        &self.payload
    }

    pub(crate) fn origin(&self) -> Option<&ProducerRef> {
        self.origin.as_ref()
    }

    pub(crate) fn num_acks(&self) -> usize {
        self.acked_by.len()
    }

    pub(crate) fn is_acked_by(&self, peer_id: &PeerId) -> bool {
        self.acked_by.contains(peer_id)
    }

    pub(crate) fn is_committed(&self) -> bool {
        self.committed
    }

    /// Returns true if this is the first ack from `peer_id`.
    pub(crate) fn record_ack(&mut self, peer_id: PeerId) -> bool {
        self.acked_by.insert(peer_id)
    }

    /// Returns true if this call did the false->true transition.
    pub(crate) fn mark_committed(&mut self) -> bool {
        if self.committed {
            return false;
        }

        self.committed = true;
        true
    }
}
