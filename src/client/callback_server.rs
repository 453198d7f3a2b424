use crate::commitlog::Sequence;
use crate::grpc::grpc_broker_callback_server::{GrpcBrokerCallback, GrpcBrokerCallbackServer};
use crate::grpc::grpc_producer_callback_server::{GrpcProducerCallback, GrpcProducerCallbackServer};
use crate::grpc::{ProtoNotifyAck, ProtoNotifyCommittedReq, ProtoNotifyNewEntryReq, ProtoNotifyPromotionReq};
use crate::leader::ReplicatedEntry;
use crate::server::RpcServerShutdownSignal;
use bytes::Bytes;
use std::net::SocketAddr;
use tokio::sync::mpsc;
use tonic::transport::Server;
use tonic::{Request, Response, Status};

/// What the leader told a broker.
#[derive(Debug, Eq, PartialEq)]
pub(crate) enum BrokerNotification {
    NewEntry { log_len: u64 },
    Promotion,
}

/// BrokerCallbackServer receives the leader's hints and directives and forwards them to the
/// broker's replication task. Once this server exits, the channel closes.
pub(crate) struct BrokerCallbackServer {
    logger: slog::Logger,
    notifications: mpsc::UnboundedSender<BrokerNotification>,
}

impl BrokerCallbackServer {
    pub(crate) fn new(logger: slog::Logger, notifications: mpsc::UnboundedSender<BrokerNotification>) -> Self {
        BrokerCallbackServer { logger, notifications }
    }

    pub(crate) async fn run(self, socket_addr: SocketAddr, shutdown_signal: RpcServerShutdownSignal) {
        let logger = self.logger.clone();
        slog::info!(logger, "Broker callbacks listening on '{:?}'", socket_addr);

        let result = Server::builder()
            .add_service(GrpcBrokerCallbackServer::new(self))
            .serve_with_shutdown(socket_addr, shutdown_signal.wait())
            .await;

        slog::info!(logger, "Broker callback server has exited: {:?}", result);
    }

    fn forward(&self, notification: BrokerNotification) -> Result<Response<ProtoNotifyAck>, Status> {
        self.notifications
            .send(notification)
            .map_err(|_| Status::unavailable("Broker is shutting down"))?;

        Ok(Response::new(ProtoNotifyAck {}))
    }
}

#[async_trait::async_trait]
impl GrpcBrokerCallback for BrokerCallbackServer {
    async fn notify_new_entry(
        &self,
        rpc_request_wrapped: Request<ProtoNotifyNewEntryReq>,
    ) -> Result<Response<ProtoNotifyAck>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);

        self.forward(BrokerNotification::NewEntry {
            log_len: rpc_request.log_len,
        })
    }

    async fn notify_promotion(
        &self,
        rpc_request_wrapped: Request<ProtoNotifyPromotionReq>,
    ) -> Result<Response<ProtoNotifyAck>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();
        slog::info!(self.logger, "Leader promoted {:?} to voter", rpc_request.peer_id);

        self.forward(BrokerNotification::Promotion)
    }
}

/// ProducerCallbackServer turns the leader's commit notifications into `ReplicatedEntry`s on a
/// channel.
pub(crate) struct ProducerCallbackServer {
    logger: slog::Logger,
    commits: mpsc::UnboundedSender<ReplicatedEntry>,
}

impl ProducerCallbackServer {
    pub(crate) fn new(logger: slog::Logger, commits: mpsc::UnboundedSender<ReplicatedEntry>) -> Self {
        ProducerCallbackServer { logger, commits }
    }

    pub(crate) async fn run(self, socket_addr: SocketAddr, shutdown_signal: RpcServerShutdownSignal) {
        let logger = self.logger.clone();
        slog::info!(logger, "Producer callbacks listening on '{:?}'", socket_addr);

        let result = Server::builder()
            .add_service(GrpcProducerCallbackServer::new(self))
            .serve_with_shutdown(socket_addr, shutdown_signal.wait())
            .await;

        slog::info!(logger, "Producer callback server has exited: {:?}", result);
    }
}

#[async_trait::async_trait]
impl GrpcProducerCallback for ProducerCallbackServer {
    async fn notify_committed(
        &self,
        rpc_request_wrapped: Request<ProtoNotifyCommittedReq>,
    ) -> Result<Response<ProtoNotifyAck>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_request);

        let committed = ReplicatedEntry {
            sequence: Sequence::new(rpc_request.sequence),
            payload: Bytes::from(rpc_request.payload),
        };
        // Nobody listening is not the leader's problem.
        let _ = self.commits.send(committed);

        Ok(Response::new(ProtoNotifyAck {}))
    }
}
