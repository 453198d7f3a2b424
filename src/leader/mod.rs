mod callback;
mod commit_tracker;
mod leader;
mod leader_api;
mod liveness;
mod log_entry;
mod membership;
mod peers;
mod replication;
#[cfg(test)]
mod test_utils;
mod time;

pub use leader_api::ActorExited;
pub use leader_api::GetCommittedLogError;
pub use leader_api::GetCommittedLogOutcome;
pub use leader_api::GetLogOutcome;
pub use leader_api::RegisterNewLogError;
pub use leader_api::RejectReason;
pub use leader_api::ReplicatedEntry;
pub use log_entry::ProducerRef;
pub use peers::Peer;
pub use peers::PeerEndpoint;
pub use peers::PeerId;
pub use peers::PeerRole;

pub(crate) use callback::GrpcCallbackTransport;
pub(crate) use leader::Leader;
pub(crate) use leader::LeaderEngineConfig;
pub(crate) use leader_api::{
    ConfirmLogStoredError, ConfirmLogStoredInput, ConfirmLogStoredOutput, GetCommittedLogInput, GetLogError,
    GetLogInput, HeartbeatError, HeartbeatInput, HeartbeatOutput, PromotionReplyFromPeer, RegisterBrokerError,
    RegisterBrokerInput, RegisterBrokerOutput, RegisterNewLogInput, RegisterNewLogOutput,
};
pub(crate) use liveness::LivenessTimerTask;
pub(crate) use log_entry::LogEntry;
pub(crate) use time::Clock;
pub(crate) use time::RealClock;
