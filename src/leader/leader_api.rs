use crate::commitlog::{LogError, Sequence};
use crate::leader::callback::CallbackError;
use crate::leader::log_entry::ProducerRef;
use crate::leader::peers::{PeerEndpoint, PeerId, PeerRole};
use bytes::Bytes;

/// The leader engine runs on the actor task. This is returned if that task has exited.
#[derive(Debug, thiserror::Error, Copy, Clone, PartialEq)]
#[error("Leader actor has exited")]
pub struct ActorExited;

// ------- RegisterBroker --------

#[derive(Debug)]
pub(crate) struct RegisterBrokerInput {
    pub(crate) peer_id: PeerId,
    pub(crate) endpoint: PeerEndpoint,
    pub(crate) role: PeerRole,
}

#[derive(Debug, PartialEq)]
pub(crate) struct RegisterBrokerOutput {
    pub(crate) re_registered: bool,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub(crate) enum RegisterBrokerError {
    #[error("Leader actor has exited")]
    ActorExited,
}

// ------- GetLog (catch-up) --------

#[derive(Debug)]
pub(crate) struct GetLogInput {
    pub(crate) peer_id: PeerId,
    pub(crate) requested_start: Sequence,
}

/// A single entry as shipped to a broker or a consumer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ReplicatedEntry {
    pub sequence: Sequence,
    pub payload: Bytes,
}

/// Result of one catch-up round trip. Only `Entries` moves the peer's cursor.
#[derive(Debug, Eq, PartialEq)]
pub enum GetLogOutcome {
    Entries(Vec<ReplicatedEntry>),
    /// The peer asked from the wrong place. It must drop anything it buffered past
    /// `correct_cursor` and ask again from there.
    Resync { correct_cursor: Sequence },
    /// Nothing new yet.
    NoData { current_cursor: Sequence },
    Rejected(RejectReason),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RejectReason {
    /// The peer must re-register before retrying.
    UnknownPeer,
    /// Observers don't receive replication traffic.
    NotVoter,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub(crate) enum GetLogError {
    #[error("Leader actor has exited")]
    ActorExited,
}

// ------- ConfirmLogStored (acknowledgment) --------

#[derive(Debug)]
pub(crate) struct ConfirmLogStoredInput {
    pub(crate) peer_id: PeerId,
    pub(crate) sequence: Sequence,
}

#[derive(Debug, PartialEq)]
pub(crate) struct ConfirmLogStoredOutput {
    /// Whether the entry is committed after this ack (by this ack or an earlier one).
    pub(crate) committed: bool,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub(crate) enum ConfirmLogStoredError {
    #[error("Peer is not registered")]
    UnknownPeer,
    #[error("Peer is not a voter")]
    NotVoter,
    #[error("No entry with that sequence. Log length: {log_len}")]
    UnknownEntry { log_len: u64 },
    #[error("Leader actor has exited")]
    ActorExited,
}

// ------- UpdateBrokerTimestamp (heartbeat) --------

#[derive(Debug)]
pub(crate) struct HeartbeatInput {
    pub(crate) peer_id: PeerId,
}

#[derive(Debug, PartialEq)]
pub(crate) struct HeartbeatOutput {
    // Nothing
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub(crate) enum HeartbeatError {
    #[error("Peer is not registered")]
    UnknownPeer,
    #[error("Leader actor has exited")]
    ActorExited,
}

// ------- RegisterNewLog (append) --------

#[derive(Debug)]
pub(crate) struct RegisterNewLogInput {
    pub(crate) payload: Bytes,
    pub(crate) origin: Option<ProducerRef>,
}

#[derive(Debug, PartialEq)]
pub(crate) struct RegisterNewLogOutput {
    pub(crate) sequence: Sequence,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum RegisterNewLogError {
    #[error("Log is full. Max entries: {max_entries}")]
    CapacityExceeded { max_entries: u64 },
    #[error("Local log failure: {0}")]
    LocalLog(LogError),
    #[error("Leader actor has exited")]
    ActorExited,
}

// ------- GetCommittedLog --------

#[derive(Debug)]
pub(crate) struct GetCommittedLogInput {
    pub(crate) start_index: u64,
}

/// Committed entries in commit order, starting at the requested position of the committed log.
#[derive(Debug, Eq, PartialEq)]
pub enum GetCommittedLogOutcome {
    Entries(Vec<ReplicatedEntry>),
    /// The caller is caught up. Not an error.
    NoNewData { committed_count: u64 },
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum GetCommittedLogError {
    #[error("Start index is past the committed log. Committed count: {committed_count}")]
    OutOfRange { committed_count: u64 },
    #[error("Leader actor has exited")]
    ActorExited,
}

// ------- Internal events --------

/// Outcome of asking an observer to become a voter.
#[derive(Debug)]
pub(crate) struct PromotionReplyFromPeer {
    pub(crate) peer_id: PeerId,
    pub(crate) endpoint: PeerEndpoint,
    pub(crate) result: Result<(), CallbackError>,
}

// ------- Conversions --------

impl From<ActorExited> for RegisterBrokerError {
    fn from(_: ActorExited) -> Self {
        RegisterBrokerError::ActorExited
    }
}

impl From<ActorExited> for GetLogError {
    fn from(_: ActorExited) -> Self {
        GetLogError::ActorExited
    }
}

impl From<ActorExited> for ConfirmLogStoredError {
    fn from(_: ActorExited) -> Self {
        ConfirmLogStoredError::ActorExited
    }
}

impl From<ActorExited> for HeartbeatError {
    fn from(_: ActorExited) -> Self {
        HeartbeatError::ActorExited
    }
}

impl From<ActorExited> for RegisterNewLogError {
    fn from(_: ActorExited) -> Self {
        RegisterNewLogError::ActorExited
    }
}

impl From<ActorExited> for GetCommittedLogError {
    fn from(_: ActorExited) -> Self {
        GetCommittedLogError::ActorExited
    }
}
