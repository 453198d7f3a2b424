use crate::commitlog::Sequence;
use crate::grpc::grpc_leader_client::GrpcLeaderClient;
use crate::grpc::{
    proto_confirm_log_stored_error, proto_confirm_log_stored_result, proto_get_committed_log_error,
    proto_get_committed_log_result, proto_get_committed_log_success, proto_get_log_error, proto_get_log_result,
    proto_get_log_success, proto_heartbeat_error, proto_heartbeat_result, proto_register_broker_error,
    proto_register_broker_result, proto_register_new_log_error, proto_register_new_log_result,
    ProtoConfirmLogStoredReq, ProtoGetCommittedLogReq, ProtoGetLogReq, ProtoHeartbeatReq, ProtoLogEntries,
    ProtoRegisterBrokerReq, ProtoRegisterNewLogReq,
};
use crate::leader::{GetCommittedLogOutcome, GetLogOutcome, PeerId, PeerRole, ProducerRef, RejectReason, ReplicatedEntry};
use bytes::Bytes;
use std::future::Future;
use tokio::time::Duration;
use tonic::transport::{Channel, Endpoint};
use tonic::Status;

#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("Invalid leader URI '{0}'")]
    InvalidUri(String),
    #[error("Failed to connect to leader: {0}")]
    Transport(#[from] tonic::transport::Error),
}

/// Everything that can go wrong calling the leader, flattened across operations. Each method
/// documents which of these it can return besides the transport-level ones.
#[derive(Debug, thiserror::Error)]
pub enum LeaderCallError {
    #[error("Leader doesn't know this peer")]
    UnknownPeer,
    #[error("Peer is not a voter")]
    NotVoter,
    #[error("Leader has no such entry. Log length: {log_len}")]
    UnknownEntry { log_len: u64 },
    #[error("Leader log is full. Max entries: {max_entries}")]
    CapacityExceeded { max_entries: u64 },
    #[error("Start index is past the committed log. Committed count: {committed_count}")]
    OutOfRange { committed_count: u64 },
    #[error("Leader fault: {0}")]
    ServerFault(String),
    #[error("Malformed reply from leader")]
    MalformedReply,
    #[error("Timed out calling leader")]
    Timeout,
    #[error("RPC failure: {0:?}")]
    Rpc(Status),
}

/// LeaderClient is a typed wrapper over the leader's gRPC service. Cheap to clone.
#[derive(Clone)]
pub struct LeaderClient {
    logger: slog::Logger,
    client: GrpcLeaderClient<Channel>,
    rpc_timeout: Duration,
}

impl LeaderClient {
    pub async fn connect(
        logger: slog::Logger,
        leader_uri: String,
        rpc_timeout: Duration,
    ) -> Result<Self, ConnectError> {
        let endpoint = Endpoint::from_shared(leader_uri.clone()).map_err(|_| ConnectError::InvalidUri(leader_uri))?;
        let channel = endpoint.connect().await?;

        Ok(LeaderClient {
            logger,
            client: GrpcLeaderClient::new(channel),
            rpc_timeout,
        })
    }

    pub async fn register_broker(
        &self,
        peer_id: &PeerId,
        callback_endpoint: &str,
        role: PeerRole,
    ) -> Result<(), LeaderCallError> {
        use proto_register_broker_error::Err as ProtoErr;
        use proto_register_broker_result::Result as ProtoResult;

        let rpc_request = ProtoRegisterBrokerReq {
            peer_id: peer_id.as_str().to_string(),
            endpoint: callback_endpoint.to_string(),
            role: role.as_str().to_string(),
        };
        slog::debug!(self.logger, "ClientWire - {:?}", rpc_request);
        let mut client = self.client.clone();
        let rpc_reply = self.with_timeout(client.register_broker(rpc_request)).await?;
        slog::debug!(self.logger, "ClientWire - {:?}", rpc_reply);

        match rpc_reply.result {
            Some(ProtoResult::Ok(_)) => Ok(()),
            Some(ProtoResult::Err(e)) => match e.err {
                Some(ProtoErr::ServerFault(fault)) => Err(LeaderCallError::ServerFault(fault.message)),
                None => Err(LeaderCallError::MalformedReply),
            },
            None => Err(LeaderCallError::MalformedReply),
        }
    }

    /// One catch-up step. `UnknownPeer` and `NotVoter` come back as `GetLogOutcome::Rejected`.
    pub async fn get_log(&self, peer_id: &PeerId, start: Sequence) -> Result<GetLogOutcome, LeaderCallError> {
        use proto_get_log_error::Err as ProtoErr;
        use proto_get_log_result::Result as ProtoResult;
        use proto_get_log_success::Outcome;

        let rpc_request = ProtoGetLogReq {
            peer_id: peer_id.as_str().to_string(),
            start_index: start.as_u64(),
        };
        slog::debug!(self.logger, "ClientWire - {:?}", rpc_request);
        let mut client = self.client.clone();
        let rpc_reply = self.with_timeout(client.get_log(rpc_request)).await?;
        slog::debug!(self.logger, "ClientWire - {:?}", rpc_reply);

        match rpc_reply.result {
            Some(ProtoResult::Ok(success)) => match success.outcome {
                Some(Outcome::Entries(entries)) => Ok(GetLogOutcome::Entries(Self::convert_entries(entries))),
                Some(Outcome::Resync(resync)) => Ok(GetLogOutcome::Resync {
                    correct_cursor: Sequence::new(resync.correct_cursor),
                }),
                Some(Outcome::NoData(no_data)) => Ok(GetLogOutcome::NoData {
                    current_cursor: Sequence::new(no_data.current_cursor),
                }),
                None => Err(LeaderCallError::MalformedReply),
            },
            Some(ProtoResult::Err(e)) => match e.err {
                Some(ProtoErr::UnknownPeer(_)) => Ok(GetLogOutcome::Rejected(RejectReason::UnknownPeer)),
                Some(ProtoErr::NotVoter(_)) => Ok(GetLogOutcome::Rejected(RejectReason::NotVoter)),
                Some(ProtoErr::ServerFault(fault)) => Err(LeaderCallError::ServerFault(fault.message)),
                None => Err(LeaderCallError::MalformedReply),
            },
            None => Err(LeaderCallError::MalformedReply),
        }
    }

    /// Returns whether the entry is committed. Can fail with `UnknownPeer`, `NotVoter` and
    /// `UnknownEntry`.
    pub async fn confirm_log_stored(&self, peer_id: &PeerId, sequence: Sequence) -> Result<bool, LeaderCallError> {
        use proto_confirm_log_stored_error::Err as ProtoErr;
        use proto_confirm_log_stored_result::Result as ProtoResult;

        let rpc_request = ProtoConfirmLogStoredReq {
            peer_id: peer_id.as_str().to_string(),
            start_index: sequence.as_u64(),
        };
        slog::debug!(self.logger, "ClientWire - {:?}", rpc_request);
        let mut client = self.client.clone();
        let rpc_reply = self.with_timeout(client.confirm_log_stored(rpc_request)).await?;
        slog::debug!(self.logger, "ClientWire - {:?}", rpc_reply);

        match rpc_reply.result {
            Some(ProtoResult::Ok(success)) => Ok(success.committed),
            Some(ProtoResult::Err(e)) => match e.err {
                Some(ProtoErr::UnknownPeer(_)) => Err(LeaderCallError::UnknownPeer),
                Some(ProtoErr::NotVoter(_)) => Err(LeaderCallError::NotVoter),
                Some(ProtoErr::UnknownEntry(unknown)) => Err(LeaderCallError::UnknownEntry {
                    log_len: unknown.log_len,
                }),
                Some(ProtoErr::ServerFault(fault)) => Err(LeaderCallError::ServerFault(fault.message)),
                None => Err(LeaderCallError::MalformedReply),
            },
            None => Err(LeaderCallError::MalformedReply),
        }
    }

    /// Can fail with `UnknownPeer`, in which case the caller should re-register.
    pub async fn heartbeat(&self, peer_id: &PeerId) -> Result<(), LeaderCallError> {
        use proto_heartbeat_error::Err as ProtoErr;
        use proto_heartbeat_result::Result as ProtoResult;

        let rpc_request = ProtoHeartbeatReq {
            peer_id: peer_id.as_str().to_string(),
        };
        let mut client = self.client.clone();
        let rpc_reply = self.with_timeout(client.update_broker_timestamp(rpc_request)).await?;

        match rpc_reply.result {
            Some(ProtoResult::Ok(_)) => Ok(()),
            Some(ProtoResult::Err(e)) => match e.err {
                Some(ProtoErr::UnknownPeer(_)) => Err(LeaderCallError::UnknownPeer),
                Some(ProtoErr::ServerFault(fault)) => Err(LeaderCallError::ServerFault(fault.message)),
                None => Err(LeaderCallError::MalformedReply),
            },
            None => Err(LeaderCallError::MalformedReply),
        }
    }

    /// Appends an entry. Can fail with `CapacityExceeded`.
    pub async fn register_new_log(
        &self,
        payload: Bytes,
        producer_callback: Option<&ProducerRef>,
    ) -> Result<Sequence, LeaderCallError> {
        use proto_register_new_log_error::Err as ProtoErr;
        use proto_register_new_log_result::Result as ProtoResult;

        let rpc_request = ProtoRegisterNewLogReq {
            payload: payload.to_vec(),
            producer_callback: producer_callback
                .map(|producer| producer.as_str().to_string())
                .unwrap_or_default(),
        };
        slog::debug!(self.logger, "ClientWire - {:?}", rpc_request);
        let mut client = self.client.clone();
        let rpc_reply = self.with_timeout(client.register_new_log(rpc_request)).await?;
        slog::debug!(self.logger, "ClientWire - {:?}", rpc_reply);

        match rpc_reply.result {
            Some(ProtoResult::Ok(success)) => Ok(Sequence::new(success.sequence)),
            Some(ProtoResult::Err(e)) => match e.err {
                Some(ProtoErr::CapacityExceeded(capacity)) => Err(LeaderCallError::CapacityExceeded {
                    max_entries: capacity.max_entries,
                }),
                Some(ProtoErr::ServerFault(fault)) => Err(LeaderCallError::ServerFault(fault.message)),
                None => Err(LeaderCallError::MalformedReply),
            },
            None => Err(LeaderCallError::MalformedReply),
        }
    }

    /// Reads the committed log. Can fail with `OutOfRange`.
    pub async fn get_committed_log(&self, start_index: u64) -> Result<GetCommittedLogOutcome, LeaderCallError> {
        use proto_get_committed_log_error::Err as ProtoErr;
        use proto_get_committed_log_result::Result as ProtoResult;
        use proto_get_committed_log_success::Outcome;

        let rpc_request = ProtoGetCommittedLogReq { start_index };
        slog::debug!(self.logger, "ClientWire - {:?}", rpc_request);
        let mut client = self.client.clone();
        let rpc_reply = self.with_timeout(client.get_committed_log(rpc_request)).await?;
        slog::debug!(self.logger, "ClientWire - {:?}", rpc_reply);

        match rpc_reply.result {
            Some(ProtoResult::Ok(success)) => match success.outcome {
                Some(Outcome::Entries(entries)) => {
                    Ok(GetCommittedLogOutcome::Entries(Self::convert_entries(entries)))
                }
                Some(Outcome::NoNewData(no_new_data)) => Ok(GetCommittedLogOutcome::NoNewData {
                    committed_count: no_new_data.committed_count,
                }),
                None => Err(LeaderCallError::MalformedReply),
            },
            Some(ProtoResult::Err(e)) => match e.err {
                Some(ProtoErr::OutOfRange(out_of_range)) => Err(LeaderCallError::OutOfRange {
                    committed_count: out_of_range.committed_count,
                }),
                Some(ProtoErr::ServerFault(fault)) => Err(LeaderCallError::ServerFault(fault.message)),
                None => Err(LeaderCallError::MalformedReply),
            },
            None => Err(LeaderCallError::MalformedReply),
        }
    }

    async fn with_timeout<T, F>(&self, call: F) -> Result<T, LeaderCallError>
    where
        F: Future<Output = Result<tonic::Response<T>, Status>>,
    {
        match tokio::time::timeout(self.rpc_timeout, call).await {
            Ok(Ok(response)) => Ok(response.into_inner()),
            Ok(Err(status)) => Err(LeaderCallError::Rpc(status)),
            Err(_elapsed) => Err(LeaderCallError::Timeout),
        }
    }

    fn convert_entries(entries: ProtoLogEntries) -> Vec<ReplicatedEntry> {
        entries
            .entries
            .into_iter()
            .map(|entry| ReplicatedEntry {
                sequence: Sequence::new(entry.sequence),
                payload: Bytes::from(entry.payload),
            })
            .collect()
    }
}
