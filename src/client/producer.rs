use crate::client::callback_server::ProducerCallbackServer;
use crate::client::leader_client::{ConnectError, LeaderCallError, LeaderClient};
use crate::commitlog::Sequence;
use crate::leader::{ProducerRef, ReplicatedEntry};
use crate::server::{self, RpcServerShutdownHandle};
use bytes::Bytes;
use std::net::SocketAddr;
use tokio::sync::mpsc;
use tokio::time::Duration;

pub struct ProducerConfig {
    pub leader_uri: String,
    /// When set, the producer listens here for commit notifications of its own entries.
    pub callback_bind_addr: Option<SocketAddr>,
    /// What the leader dials to reach `callback_bind_addr`. Defaults to `http://{callback_bind_addr}`.
    pub callback_endpoint: Option<String>,
    pub info_logger: slog::Logger,
    pub rpc_timeout: Option<Duration>,
}

#[derive(Debug, thiserror::Error)]
pub enum ProducerClientCreationError {
    #[error("Failed to connect to leader")]
    LeaderConnection(#[from] ConnectError),
}

/// ProducerClient appends entries to the leader's log. If created with a callback address,
/// commits of its own entries arrive on `CommitNotifications`.
pub struct ProducerClient {
    logger: slog::Logger,
    leader: LeaderClient,
    callback: Option<ProducerRef>,
    commit_notifications: Option<CommitNotifications>,
    _server_shutdown_handle: Option<RpcServerShutdownHandle>,
}

/// Stream of commits for entries this producer appended, in commit order.
pub struct CommitNotifications {
    receiver: mpsc::UnboundedReceiver<ReplicatedEntry>,
}

impl CommitNotifications {
    /// Returns None once the producer has been dropped.
    pub async fn next(&mut self) -> Option<ReplicatedEntry> {
        self.receiver.recv().await
    }
}

pub async fn try_create_producer(config: ProducerConfig) -> Result<ProducerClient, ProducerClientCreationError> {
    let logger = config.info_logger.new(slog::o!("Client" => "Producer"));
    let rpc_timeout = config.rpc_timeout.unwrap_or(Duration::from_secs(1));

    let mut callback = None;
    let mut commit_notifications = None;
    let mut server_shutdown_handle = None;
    if let Some(bind_addr) = config.callback_bind_addr {
        let (commits_tx, commits_rx) = mpsc::unbounded_channel();
        let (shutdown_handle, shutdown_signal) = server::shutdown_signal();
        let callback_server = ProducerCallbackServer::new(logger.clone(), commits_tx);
        tokio::spawn(callback_server.run(bind_addr, shutdown_signal));

        let endpoint = config
            .callback_endpoint
            .unwrap_or_else(|| format!("http://{}", bind_addr));
        callback = Some(ProducerRef::new(endpoint));
        commit_notifications = Some(CommitNotifications { receiver: commits_rx });
        server_shutdown_handle = Some(shutdown_handle);
    }

    let leader = LeaderClient::connect(logger.clone(), config.leader_uri, rpc_timeout).await?;

    Ok(ProducerClient {
        logger,
        leader,
        callback,
        commit_notifications,
        _server_shutdown_handle: server_shutdown_handle,
    })
}

impl ProducerClient {
    /// Appends `payload` and returns its sequence. The entry is not committed yet.
    pub async fn register_new_log(&self, payload: Bytes) -> Result<Sequence, LeaderCallError> {
        let sequence = self
            .leader
            .register_new_log(payload, self.callback.as_ref())
            .await?;
        slog::debug!(self.logger, "Appended entry {:?}", sequence);

        Ok(sequence)
    }

    /// Hands out the commit stream. Only the first call returns Some.
    pub fn commit_notifications(&mut self) -> Option<CommitNotifications> {
        self.commit_notifications.take()
    }
}
