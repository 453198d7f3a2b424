mod actor;
mod api;
mod client;
mod commitlog;
mod leader;
mod server;
mod grpc {
    include!("../generated/quorumlog.rs");
}

pub use api::try_create_leader;
pub use api::LeaderConfig;
pub use api::LeaderCreationError;
pub use api::LeaderHandle;
pub use api::LeaderOptions;
pub use client::try_create_broker;
pub use client::try_create_producer;
pub use client::BrokerClient;
pub use client::BrokerClientCreationError;
pub use client::BrokerConfig;
pub use client::BrokerOptions;
pub use client::CommitNotifications;
pub use client::ConnectError;
pub use client::ConsumerClient;
pub use client::LeaderCallError;
pub use client::LeaderClient;
pub use client::ProducerClient;
pub use client::ProducerClientCreationError;
pub use client::ProducerConfig;
pub use commitlog::LogError;
pub use commitlog::Sequence;
pub use leader::ActorExited;
pub use leader::GetCommittedLogError;
pub use leader::GetCommittedLogOutcome;
pub use leader::GetLogOutcome;
pub use leader::Peer;
pub use leader::PeerEndpoint;
pub use leader::PeerId;
pub use leader::PeerRole;
pub use leader::ProducerRef;
pub use leader::RegisterNewLogError;
pub use leader::RejectReason;
pub use leader::ReplicatedEntry;

// Learning 1: `create::{root_mod}` should not have any code. Just `mod` and `pub use` statements.
// Learning 2: All `mod` statements, anywhere, should not be `pub`. Only export `pub` via individual
//             use statements.
//
// This keeps the `crate::{root_mod}` root_mod only responsible for exporting types to the rest of
// crate, and allows me to organize my root_mod impl however I want.
