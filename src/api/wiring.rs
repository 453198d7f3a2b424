use crate::actor::{ActorClient, LeaderActor};
use crate::api::handle::LeaderHandle;
use crate::api::options::{LeaderOptions, LeaderOptionsValidated};
use crate::commitlog::InMemoryLog;
use crate::leader::{GrpcCallbackTransport, Leader, LeaderEngineConfig, LivenessTimerTask, RealClock};
use crate::server::{self, RpcServer};
use std::convert::TryFrom;
use std::net::SocketAddr;
use std::sync::Arc;

pub struct LeaderConfig {
    /// Where the leader's gRPC service listens.
    pub bind_addr: SocketAddr,
    pub info_logger: slog::Logger,
    pub options: LeaderOptions,
}

#[derive(Debug, thiserror::Error)]
pub enum LeaderCreationError {
    #[error("Illegal options for configuring leader: {0}")]
    IllegalOptions(String),
}

/// Starts the leader actor, its RPC server and the liveness timer. Must be called from within a
/// tokio runtime.
pub async fn try_create_leader(config: LeaderConfig) -> Result<LeaderHandle, LeaderCreationError> {
    let root_logger = config.info_logger;

    let options = LeaderOptionsValidated::try_from(config.options)
        .map_err(|e| LeaderCreationError::IllegalOptions(e.to_string()))?;

    let (actor_client, actor_queue_rx) = ActorClient::new(64);
    let (server_shutdown_handle, server_shutdown_signal) = server::shutdown_signal();

    let leader = Leader::new(LeaderEngineConfig {
        logger: root_logger.clone(),
        log: InMemoryLog::create(options.max_log_entries),
        clock: RealClock,
        transport: Arc::new(GrpcCallbackTransport::new()),
        actor_client: actor_client.weak(),
        server_shutdown_handle,
        quorum_size: options.quorum_size,
        target_voter_count: options.target_voter_count,
        expiry_threshold: options.expiry_threshold,
        callback_timeout: options.callback_timeout,
    });
    slog::info!(
        root_logger,
        "Starting leader. Quorum size: {}, target voters: {}, expiry threshold: {:?}",
        options.quorum_size,
        options.target_voter_count,
        options.expiry_threshold
    );

    let leader_actor = LeaderActor::new(root_logger.clone(), actor_queue_rx, leader);
    tokio::spawn(leader_actor.run_event_loop());

    let leader_server = RpcServer::new(root_logger.clone(), actor_client.weak());
    tokio::spawn(leader_server.run(config.bind_addr, server_shutdown_signal));

    LivenessTimerTask::spawn(options.liveness_check_interval, actor_client.weak());

    Ok(LeaderHandle::new(actor_client))
}
