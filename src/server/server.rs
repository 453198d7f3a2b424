use crate::actor::WeakActorClient;
use crate::commitlog::Sequence;
use crate::grpc::grpc_leader_server::{GrpcLeader, GrpcLeaderServer};
use crate::grpc::{
    proto_confirm_log_stored_error, proto_confirm_log_stored_result, proto_get_committed_log_error,
    proto_get_committed_log_result, proto_get_committed_log_success, proto_get_log_error, proto_get_log_result,
    proto_get_log_success, proto_heartbeat_error, proto_heartbeat_result, proto_register_broker_error,
    proto_register_broker_result, proto_register_new_log_error, proto_register_new_log_result,
    ProtoCapacityExceeded, ProtoConfirmLogStoredError, ProtoConfirmLogStoredReq, ProtoConfirmLogStoredResult,
    ProtoConfirmLogStoredSuccess, ProtoGetCommittedLogError, ProtoGetCommittedLogReq, ProtoGetCommittedLogResult,
    ProtoGetCommittedLogSuccess, ProtoGetLogError, ProtoGetLogReq, ProtoGetLogResult, ProtoGetLogSuccess,
    ProtoHeartbeatError, ProtoHeartbeatReq, ProtoHeartbeatResult, ProtoHeartbeatSuccess, ProtoLogEntries,
    ProtoLogEntry, ProtoNoData, ProtoNoNewData, ProtoNotVoter, ProtoOutOfRange, ProtoRegisterBrokerError,
    ProtoRegisterBrokerReq, ProtoRegisterBrokerResult, ProtoRegisterBrokerSuccess, ProtoRegisterNewLogError,
    ProtoRegisterNewLogReq, ProtoRegisterNewLogResult, ProtoRegisterNewLogSuccess, ProtoResync, ProtoServerFault,
    ProtoUnknownEntry, ProtoUnknownPeer,
};
use crate::leader::{
    ConfirmLogStoredError, ConfirmLogStoredInput, ConfirmLogStoredOutput, GetCommittedLogError,
    GetCommittedLogInput, GetCommittedLogOutcome, GetLogError, GetLogInput, GetLogOutcome, HeartbeatError,
    HeartbeatInput, HeartbeatOutput, PeerEndpoint, PeerId, PeerRole, ProducerRef, RegisterBrokerError,
    RegisterBrokerInput, RegisterBrokerOutput, RegisterNewLogError, RegisterNewLogInput, RegisterNewLogOutput,
    RejectReason, ReplicatedEntry,
};
use crate::server::RpcServerShutdownSignal;
use bytes::Bytes;
use std::net::SocketAddr;
use tonic::transport::Server;
use tonic::{Request, Response, Status};

const ACTOR_EXITED_MESSAGE: &str = "Server internal leader task has exited";

/// RpcServer is the type that implements the leader's gRPC interface.
pub(crate) struct RpcServer {
    logger: slog::Logger,
    local_leader: WeakActorClient,
}

impl RpcServer {
    pub(crate) fn new(logger: slog::Logger, local_leader: WeakActorClient) -> Self {
        RpcServer { logger, local_leader }
    }

    pub(crate) async fn run(self, socket_addr: SocketAddr, shutdown_signal: RpcServerShutdownSignal) {
        let logger = self.logger.clone();
        slog::info!(logger, "Listening on '{:?}'", socket_addr);

        let result = Server::builder()
            .add_service(GrpcLeaderServer::new(self))
            .serve_with_shutdown(socket_addr, shutdown_signal.wait())
            .await;

        slog::info!(logger, "Server run() has exited: {:?}", result);
    }

    // ------- RegisterBroker --------

    async fn handle_register_broker(
        &self,
        rpc_request: ProtoRegisterBrokerReq,
    ) -> Result<ProtoRegisterBrokerResult, Status> {
        let app_input = Self::convert_register_broker_input(rpc_request)?;
        let app_result = self.local_leader.register_broker(app_input).await;
        Ok(Self::convert_register_broker_result(app_result))
    }

    fn convert_register_broker_input(rpc_request: ProtoRegisterBrokerReq) -> Result<RegisterBrokerInput, Status> {
        let role = rpc_request.role.parse::<PeerRole>().map_err(Status::invalid_argument)?;

        Ok(RegisterBrokerInput {
            peer_id: Self::convert_peer_id(rpc_request.peer_id)?,
            // Opaque here. The callback transport validates it when it connects.
            endpoint: PeerEndpoint::new(rpc_request.endpoint),
            role,
        })
    }

    fn convert_register_broker_result(
        app_result: Result<RegisterBrokerOutput, RegisterBrokerError>,
    ) -> ProtoRegisterBrokerResult {
        let result = match app_result {
            Ok(_) => proto_register_broker_result::Result::Ok(ProtoRegisterBrokerSuccess {
                // Empty
            }),
            Err(RegisterBrokerError::ActorExited) => {
                proto_register_broker_result::Result::Err(ProtoRegisterBrokerError {
                    err: Some(proto_register_broker_error::Err::ServerFault(Self::actor_exited_fault())),
                })
            }
        };

        ProtoRegisterBrokerResult { result: Some(result) }
    }

    // ------- GetLog --------

    async fn handle_get_log(&self, rpc_request: ProtoGetLogReq) -> Result<ProtoGetLogResult, Status> {
        let app_input = GetLogInput {
            peer_id: Self::convert_peer_id(rpc_request.peer_id)?,
            requested_start: Sequence::new(rpc_request.start_index),
        };
        let app_result = self.local_leader.get_log(app_input).await;
        Ok(Self::convert_get_log_result(app_result))
    }

    fn convert_get_log_result(app_result: Result<GetLogOutcome, GetLogError>) -> ProtoGetLogResult {
        use proto_get_log_error::Err as ProtoErr;
        use proto_get_log_result::Result as ProtoResult;
        use proto_get_log_success::Outcome;

        let ok = |outcome| ProtoResult::Ok(ProtoGetLogSuccess { outcome: Some(outcome) });
        let err = |err| ProtoResult::Err(ProtoGetLogError { err: Some(err) });

        let result = match app_result {
            Ok(GetLogOutcome::Entries(entries)) => ok(Outcome::Entries(Self::convert_entries(entries))),
            Ok(GetLogOutcome::Resync { correct_cursor }) => ok(Outcome::Resync(ProtoResync {
                correct_cursor: correct_cursor.as_u64(),
            })),
            Ok(GetLogOutcome::NoData { current_cursor }) => ok(Outcome::NoData(ProtoNoData {
                current_cursor: current_cursor.as_u64(),
            })),
            Ok(GetLogOutcome::Rejected(RejectReason::UnknownPeer)) => err(ProtoErr::UnknownPeer(ProtoUnknownPeer {})),
            Ok(GetLogOutcome::Rejected(RejectReason::NotVoter)) => err(ProtoErr::NotVoter(ProtoNotVoter {})),
            Err(GetLogError::ActorExited) => err(ProtoErr::ServerFault(Self::actor_exited_fault())),
        };

        ProtoGetLogResult { result: Some(result) }
    }

    // ------- ConfirmLogStored --------

    async fn handle_confirm_log_stored(
        &self,
        rpc_request: ProtoConfirmLogStoredReq,
    ) -> Result<ProtoConfirmLogStoredResult, Status> {
        let app_input = ConfirmLogStoredInput {
            peer_id: Self::convert_peer_id(rpc_request.peer_id)?,
            sequence: Sequence::new(rpc_request.start_index),
        };
        let app_result = self.local_leader.confirm_log_stored(app_input).await;
        Ok(Self::convert_confirm_log_stored_result(app_result))
    }

    fn convert_confirm_log_stored_result(
        app_result: Result<ConfirmLogStoredOutput, ConfirmLogStoredError>,
    ) -> ProtoConfirmLogStoredResult {
        use proto_confirm_log_stored_error::Err as ProtoErr;
        use proto_confirm_log_stored_result::Result as ProtoResult;

        let err = |err| ProtoResult::Err(ProtoConfirmLogStoredError { err: Some(err) });

        let result = match app_result {
            Ok(output) => ProtoResult::Ok(ProtoConfirmLogStoredSuccess {
                committed: output.committed,
            }),
            Err(ConfirmLogStoredError::UnknownPeer) => err(ProtoErr::UnknownPeer(ProtoUnknownPeer {})),
            Err(ConfirmLogStoredError::NotVoter) => err(ProtoErr::NotVoter(ProtoNotVoter {})),
            Err(ConfirmLogStoredError::UnknownEntry { log_len }) => {
                err(ProtoErr::UnknownEntry(ProtoUnknownEntry { log_len }))
            }
            Err(ConfirmLogStoredError::ActorExited) => err(ProtoErr::ServerFault(Self::actor_exited_fault())),
        };

        ProtoConfirmLogStoredResult { result: Some(result) }
    }

    // ------- UpdateBrokerTimestamp --------

    async fn handle_heartbeat(&self, rpc_request: ProtoHeartbeatReq) -> Result<ProtoHeartbeatResult, Status> {
        let app_input = HeartbeatInput {
            peer_id: Self::convert_peer_id(rpc_request.peer_id)?,
        };
        let app_result = self.local_leader.heartbeat(app_input).await;
        Ok(Self::convert_heartbeat_result(app_result))
    }

    fn convert_heartbeat_result(app_result: Result<HeartbeatOutput, HeartbeatError>) -> ProtoHeartbeatResult {
        use proto_heartbeat_error::Err as ProtoErr;
        use proto_heartbeat_result::Result as ProtoResult;

        let result = match app_result {
            Ok(_) => ProtoResult::Ok(ProtoHeartbeatSuccess {}),
            Err(HeartbeatError::UnknownPeer) => ProtoResult::Err(ProtoHeartbeatError {
                err: Some(ProtoErr::UnknownPeer(ProtoUnknownPeer {})),
            }),
            Err(HeartbeatError::ActorExited) => ProtoResult::Err(ProtoHeartbeatError {
                err: Some(ProtoErr::ServerFault(Self::actor_exited_fault())),
            }),
        };

        ProtoHeartbeatResult { result: Some(result) }
    }

    // ------- RegisterNewLog --------

    async fn handle_register_new_log(
        &self,
        rpc_request: ProtoRegisterNewLogReq,
    ) -> Result<ProtoRegisterNewLogResult, Status> {
        let app_input = RegisterNewLogInput {
            payload: Bytes::from(rpc_request.payload),
            origin: ProducerRef::from_optional(rpc_request.producer_callback),
        };
        let app_result = self.local_leader.register_new_log(app_input).await;
        Ok(Self::convert_register_new_log_result(app_result))
    }

    fn convert_register_new_log_result(
        app_result: Result<RegisterNewLogOutput, RegisterNewLogError>,
    ) -> ProtoRegisterNewLogResult {
        use proto_register_new_log_error::Err as ProtoErr;
        use proto_register_new_log_result::Result as ProtoResult;

        let err = |err| ProtoResult::Err(ProtoRegisterNewLogError { err: Some(err) });

        let result = match app_result {
            Ok(output) => ProtoResult::Ok(ProtoRegisterNewLogSuccess {
                sequence: output.sequence.as_u64(),
            }),
            Err(RegisterNewLogError::CapacityExceeded { max_entries }) => {
                err(ProtoErr::CapacityExceeded(ProtoCapacityExceeded { max_entries }))
            }
            Err(RegisterNewLogError::LocalLog(e)) => err(ProtoErr::ServerFault(ProtoServerFault {
                message: format!("Local log failure: {}", e),
            })),
            Err(RegisterNewLogError::ActorExited) => err(ProtoErr::ServerFault(Self::actor_exited_fault())),
        };

        ProtoRegisterNewLogResult { result: Some(result) }
    }

    // ------- GetCommittedLog --------

    async fn handle_get_committed_log(
        &self,
        rpc_request: ProtoGetCommittedLogReq,
    ) -> Result<ProtoGetCommittedLogResult, Status> {
        let app_input = GetCommittedLogInput {
            start_index: rpc_request.start_index,
        };
        let app_result = self.local_leader.get_committed_log(app_input).await;
        Ok(Self::convert_get_committed_log_result(app_result))
    }

    fn convert_get_committed_log_result(
        app_result: Result<GetCommittedLogOutcome, GetCommittedLogError>,
    ) -> ProtoGetCommittedLogResult {
        use proto_get_committed_log_error::Err as ProtoErr;
        use proto_get_committed_log_result::Result as ProtoResult;
        use proto_get_committed_log_success::Outcome;

        let ok = |outcome| ProtoResult::Ok(ProtoGetCommittedLogSuccess { outcome: Some(outcome) });
        let err = |err| ProtoResult::Err(ProtoGetCommittedLogError { err: Some(err) });

        let result = match app_result {
            Ok(GetCommittedLogOutcome::Entries(entries)) => ok(Outcome::Entries(Self::convert_entries(entries))),
            Ok(GetCommittedLogOutcome::NoNewData { committed_count }) => {
                ok(Outcome::NoNewData(ProtoNoNewData { committed_count }))
            }
            Err(GetCommittedLogError::OutOfRange { committed_count }) => {
                err(ProtoErr::OutOfRange(ProtoOutOfRange { committed_count }))
            }
            Err(GetCommittedLogError::ActorExited) => err(ProtoErr::ServerFault(Self::actor_exited_fault())),
        };

        ProtoGetCommittedLogResult { result: Some(result) }
    }

    // ------- Shared --------

    fn convert_peer_id(peer_id: String) -> Result<PeerId, Status> {
        if peer_id.is_empty() {
            return Err(Status::invalid_argument("Peer ID must not be empty"));
        }

        Ok(PeerId::new(peer_id))
    }

    fn convert_entries(entries: Vec<ReplicatedEntry>) -> ProtoLogEntries {
        ProtoLogEntries {
            entries: entries
                .into_iter()
                .map(|entry| ProtoLogEntry {
                    sequence: entry.sequence.as_u64(),
                    payload: entry.payload.to_vec(),
                })
                .collect(),
        }
    }

    fn actor_exited_fault() -> ProtoServerFault {
        ProtoServerFault {
            message: ACTOR_EXITED_MESSAGE.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl GrpcLeader for RpcServer {
    async fn register_broker(
        &self,
        rpc_request_wrapped: Request<ProtoRegisterBrokerReq>,
    ) -> Result<Response<ProtoRegisterBrokerResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);
        let rpc_result = self.handle_register_broker(rpc_request).await;
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    async fn get_log(&self, rpc_request_wrapped: Request<ProtoGetLogReq>) -> Result<Response<ProtoGetLogResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);
        let rpc_result = self.handle_get_log(rpc_request).await;
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    async fn confirm_log_stored(
        &self,
        rpc_request_wrapped: Request<ProtoConfirmLogStoredReq>,
    ) -> Result<Response<ProtoConfirmLogStoredResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);
        let rpc_result = self.handle_confirm_log_stored(rpc_request).await;
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    async fn update_broker_timestamp(
        &self,
        rpc_request_wrapped: Request<ProtoHeartbeatReq>,
    ) -> Result<Response<ProtoHeartbeatResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        // Heartbeats are too chatty for wire logs.
        let rpc_result = self.handle_heartbeat(rpc_request).await;

        rpc_result.map(Response::new)
    }

    async fn register_new_log(
        &self,
        rpc_request_wrapped: Request<ProtoRegisterNewLogReq>,
    ) -> Result<Response<ProtoRegisterNewLogResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);
        let rpc_result = self.handle_register_new_log(rpc_request).await;
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    async fn get_committed_log(
        &self,
        rpc_request_wrapped: Request<ProtoGetCommittedLogReq>,
    ) -> Result<Response<ProtoGetCommittedLogResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);
        let rpc_result = self.handle_get_committed_log(rpc_request).await;
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_register_broker_requests_are_rejected() {
        let bad_role = ProtoRegisterBrokerReq {
            peer_id: "b1".to_string(),
            endpoint: "http://127.0.0.1:1".to_string(),
            role: "leader".to_string(),
        };
        let status = RpcServer::convert_register_broker_input(bad_role).unwrap_err();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);

        let no_id = ProtoRegisterBrokerReq {
            peer_id: String::new(),
            endpoint: "http://127.0.0.1:1".to_string(),
            role: "voter".to_string(),
        };
        let status = RpcServer::convert_register_broker_input(no_id).unwrap_err();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);
    }

    #[test]
    fn get_log_outcomes_map_to_wire() {
        let result = RpcServer::convert_get_log_result(Ok(GetLogOutcome::Resync {
            correct_cursor: Sequence::new(3),
        }));
        assert_eq!(
            result.result,
            Some(proto_get_log_result::Result::Ok(ProtoGetLogSuccess {
                outcome: Some(proto_get_log_success::Outcome::Resync(ProtoResync { correct_cursor: 3 })),
            }))
        );

        let result = RpcServer::convert_get_log_result(Ok(GetLogOutcome::Rejected(RejectReason::NotVoter)));
        assert_eq!(
            result.result,
            Some(proto_get_log_result::Result::Err(ProtoGetLogError {
                err: Some(proto_get_log_error::Err::NotVoter(ProtoNotVoter {})),
            }))
        );
    }
}
