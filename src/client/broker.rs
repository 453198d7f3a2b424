use crate::client::callback_server::{BrokerCallbackServer, BrokerNotification};
use crate::client::leader_client::{ConnectError, LeaderCallError, LeaderClient};
use crate::commitlog::Sequence;
use crate::leader::{GetLogOutcome, PeerId, PeerRole, RejectReason, ReplicatedEntry};
use crate::server::{self, RpcServerShutdownHandle};
use rand::Rng;
use std::convert::TryFrom;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::{mpsc, Notify};
use tokio::time::Duration;

pub struct BrokerConfig {
    pub peer_id: String,
    /// e.g. "http://127.0.0.1:50051"
    pub leader_uri: String,
    /// Where this broker's callback service listens.
    pub callback_bind_addr: SocketAddr,
    /// What the leader dials to reach `callback_bind_addr`. Defaults to `http://{callback_bind_addr}`.
    pub callback_endpoint: Option<String>,
    pub role: PeerRole,
    pub info_logger: slog::Logger,
    pub options: BrokerOptions,
}

/// Keep `heartbeat_interval + heartbeat_jitter` well under the leader's expiry threshold.
#[derive(Clone, Debug, Default)]
pub struct BrokerOptions {
    pub heartbeat_interval: Option<Duration>,
    pub heartbeat_jitter: Option<Duration>,
    /// How often to poll the leader for new entries when no notification arrives.
    pub poll_interval: Option<Duration>,
    pub rpc_timeout: Option<Duration>,
}

#[derive(Debug, PartialEq)]
struct BrokerOptionsValidated {
    heartbeat_interval: Duration,
    heartbeat_jitter: Duration,
    poll_interval: Duration,
    rpc_timeout: Duration,
}

impl BrokerOptionsValidated {
    fn validate(&self) -> Result<(), &'static str> {
        if self.heartbeat_interval == Duration::from_millis(0) {
            return Err("Heartbeat interval must be positive");
        }
        if self.heartbeat_jitter >= self.heartbeat_interval {
            return Err("Heartbeat jitter must be less than the heartbeat interval");
        }
        if self.poll_interval == Duration::from_millis(0) {
            return Err("Poll interval must be positive");
        }

        Ok(())
    }
}

impl TryFrom<BrokerOptions> for BrokerOptionsValidated {
    type Error = &'static str;

    fn try_from(options: BrokerOptions) -> Result<Self, Self::Error> {
        let values = BrokerOptionsValidated {
            heartbeat_interval: options.heartbeat_interval.unwrap_or(Duration::from_secs(1)),
            heartbeat_jitter: options.heartbeat_jitter.unwrap_or(Duration::from_millis(100)),
            poll_interval: options.poll_interval.unwrap_or(Duration::from_secs(2)),
            rpc_timeout: options.rpc_timeout.unwrap_or(Duration::from_secs(1)),
        };

        values.validate()?;
        Ok(values)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BrokerClientCreationError {
    #[error("Illegal options for configuring broker: {0}")]
    IllegalOptions(String),
    #[error("Failed to connect to leader")]
    LeaderConnection(#[from] ConnectError),
    #[error("Failed to register with leader: {0}")]
    Registration(LeaderCallError),
}

/// BrokerClient is a running broker: its callback server, a heartbeat task and a replication
/// task. Dropping it stops all three.
pub struct BrokerClient {
    peer_id: PeerId,
    shared: Arc<BrokerShared>,
    _server_shutdown_handle: RpcServerShutdownHandle,
}

/// State shared between the broker's tasks. Tasks only hold `Weak` references.
struct BrokerShared {
    logger: slog::Logger,
    peer_id: PeerId,
    callback_endpoint: String,
    leader: LeaderClient,
    role: Mutex<PeerRole>,
    local_log: Mutex<Vec<ReplicatedEntry>>,
}

/// Registers with the leader, then starts the broker's background tasks.
pub async fn try_create_broker(config: BrokerConfig) -> Result<BrokerClient, BrokerClientCreationError> {
    let options = BrokerOptionsValidated::try_from(config.options)
        .map_err(|e| BrokerClientCreationError::IllegalOptions(e.to_string()))?;

    let logger = config.info_logger.new(slog::o!("Broker" => config.peer_id.clone()));
    let peer_id = PeerId::new(config.peer_id);
    let callback_bind_addr = config.callback_bind_addr;
    let callback_endpoint = config
        .callback_endpoint
        .unwrap_or_else(|| format!("http://{}", callback_bind_addr));

    // Callback server goes first, so the leader can reach us as soon as we're registered.
    let (notifications_tx, notifications_rx) = mpsc::unbounded_channel();
    let (server_shutdown_handle, server_shutdown_signal) = server::shutdown_signal();
    let callback_server = BrokerCallbackServer::new(logger.clone(), notifications_tx);
    tokio::spawn(callback_server.run(callback_bind_addr, server_shutdown_signal));

    let leader = LeaderClient::connect(logger.clone(), config.leader_uri, options.rpc_timeout).await?;

    let shared = Arc::new(BrokerShared {
        logger,
        peer_id: peer_id.clone(),
        callback_endpoint,
        leader,
        role: Mutex::new(config.role),
        local_log: Mutex::new(Vec::new()),
    });
    shared
        .register()
        .await
        .map_err(BrokerClientCreationError::Registration)?;

    let resync = Arc::new(Notify::new());
    let heartbeat_task = HeartbeatTask {
        weak_shared: Arc::downgrade(&shared),
        interval: options.heartbeat_interval,
        jitter: options.heartbeat_jitter,
        resync: resync.clone(),
    };
    tokio::spawn(heartbeat_task.run());

    let replication_task = ReplicationTask {
        logger: shared.logger.clone(),
        weak_shared: Arc::downgrade(&shared),
        notifications: notifications_rx,
        resync,
        poll_interval: options.poll_interval,
    };
    tokio::spawn(replication_task.run());

    Ok(BrokerClient {
        peer_id,
        shared,
        _server_shutdown_handle: server_shutdown_handle,
    })
}

impl BrokerClient {
    pub fn peer_id(&self) -> &PeerId {
        &self.peer_id
    }

    pub fn role(&self) -> PeerRole {
        self.shared.role()
    }

    /// Copy of what this broker has stored so far.
    pub fn local_log(&self) -> Vec<ReplicatedEntry> {
        self.shared.lock_local_log().clone()
    }
}

/// What the replication task does after applying one catch-up reply.
#[derive(Debug, Eq, PartialEq)]
enum ReplicationStep {
    /// Stored locally. Ack it, then keep going.
    Stored(Sequence),
    /// Local log was corrected. Ask again from the new end.
    Retry,
    /// Nothing more to pull for now.
    Idle,
    /// Leader forgot us, or we forgot more than it thinks.
    ReRegister,
}

/// Applies one catch-up reply to the local log.
fn apply_get_log_outcome(local_log: &mut Vec<ReplicatedEntry>, outcome: GetLogOutcome) -> ReplicationStep {
    match outcome {
        GetLogOutcome::Entries(entries) => {
            let mut last_stored = None;
            for entry in entries {
                let local_len = local_log.len() as u64;
                let sequence = entry.sequence.as_u64();
                if sequence > local_len {
                    return ReplicationStep::ReRegister;
                }
                local_log.truncate(sequence as usize);
                last_stored = Some(entry.sequence);
                local_log.push(entry);
            }

            match last_stored {
                Some(sequence) => ReplicationStep::Stored(sequence),
                None => ReplicationStep::Idle,
            }
        }
        GetLogOutcome::Resync { correct_cursor } => {
            if correct_cursor.as_u64() > local_log.len() as u64 {
                return ReplicationStep::ReRegister;
            }
            local_log.truncate(correct_cursor.as_u64() as usize);
            ReplicationStep::Retry
        }
        GetLogOutcome::NoData { .. } => ReplicationStep::Idle,
        GetLogOutcome::Rejected(RejectReason::UnknownPeer) => ReplicationStep::ReRegister,
        GetLogOutcome::Rejected(RejectReason::NotVoter) => ReplicationStep::Idle,
    }
}

impl BrokerShared {
    fn role(&self) -> PeerRole {
        *self.role.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_role(&self, role: PeerRole) {
        *self.role.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = role;
    }

    fn lock_local_log(&self) -> std::sync::MutexGuard<'_, Vec<ReplicatedEntry>> {
        self.local_log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn register(&self) -> Result<(), LeaderCallError> {
        let role = self.role();
        self.leader
            .register_broker(&self.peer_id, &self.callback_endpoint, role)
            .await?;
        slog::info!(
            self.logger,
            "Registered with leader as {} at {}",
            role.as_str(),
            self.callback_endpoint
        );

        Ok(())
    }

    /// Returns whether the leader accepted us again.
    async fn re_register(&self) -> bool {
        match self.register().await {
            Ok(()) => true,
            Err(e) => {
                slog::warn!(self.logger, "Failed to re-register with leader: {}", e);
                false
            }
        }
    }

    /// Pulls entries until the leader has nothing new. Each stored entry is acked before the
    /// next one is requested.
    async fn catch_up(&self) {
        while self.role() == PeerRole::Voter {
            let start = Sequence::new_usize(self.lock_local_log().len());
            let outcome = match self.leader.get_log(&self.peer_id, start).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    slog::warn!(self.logger, "GetLog failed: {}", e);
                    return;
                }
            };

            let step = apply_get_log_outcome(&mut self.lock_local_log(), outcome);
            match step {
                ReplicationStep::Stored(sequence) => {
                    if let Err(e) = self.leader.confirm_log_stored(&self.peer_id, sequence).await {
                        slog::warn!(self.logger, "ConfirmLogStored for {:?} failed: {}", sequence, e);
                    }
                }
                ReplicationStep::Retry => {
                    slog::info!(self.logger, "Resynced local log to {} entries", self.lock_local_log().len());
                }
                ReplicationStep::Idle => return,
                ReplicationStep::ReRegister => {
                    if !self.re_register().await {
                        return;
                    }
                }
            }
        }
    }
}

struct HeartbeatTask {
    weak_shared: Weak<BrokerShared>,
    interval: Duration,
    jitter: Duration,
    /// Wakes the replication task once the leader has reset our cursor.
    resync: Arc<Notify>,
}

impl HeartbeatTask {
    async fn run(self) {
        loop {
            let jitter_ms = rand::thread_rng().gen_range(0..=self.jitter.as_millis() as u64);
            tokio::time::sleep(self.interval + Duration::from_millis(jitter_ms)).await;

            let shared = match self.weak_shared.upgrade() {
                Some(shared) => shared,
                None => return,
            };
            match shared.leader.heartbeat(&shared.peer_id).await {
                Ok(()) => {}
                Err(LeaderCallError::UnknownPeer) => {
                    slog::warn!(shared.logger, "Leader doesn't know us. Re-registering.");
                    if shared.re_register().await {
                        self.resync.notify_one();
                    }
                }
                Err(e) => slog::warn!(shared.logger, "Heartbeat failed: {}", e),
            }
        }
    }
}

struct ReplicationTask {
    logger: slog::Logger,
    weak_shared: Weak<BrokerShared>,
    notifications: mpsc::UnboundedReceiver<BrokerNotification>,
    resync: Arc<Notify>,
    poll_interval: Duration,
}

impl ReplicationTask {
    async fn run(mut self) {
        loop {
            match self.weak_shared.upgrade() {
                Some(shared) => shared.catch_up().await,
                None => return,
            }

            tokio::select! {
                notification = self.notifications.recv() => {
                    let notification = match notification {
                        Some(notification) => notification,
                        // Callback server exited.
                        None => return,
                    };
                    let drained = coalesce_notifications(notification, &mut self.notifications);
                    if let Some(log_len) = drained.log_len {
                        slog::debug!(self.logger, "Leader log length is now {}", log_len);
                    }
                    if drained.promoted {
                        if let Some(shared) = self.weak_shared.upgrade() {
                            shared.set_role(PeerRole::Voter);
                        }
                    }
                    if drained.closed {
                        return;
                    }
                }
                _ = self.resync.notified() => {}
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }
    }
}

/// Everything that was queued by the time the replication task woke up.
#[derive(Debug, Default, Eq, PartialEq)]
struct DrainedNotifications {
    /// Largest leader log length seen.
    log_len: Option<u64>,
    promoted: bool,
    closed: bool,
}

/// Folds `first` and whatever is already queued behind it into one catch-up pass.
fn coalesce_notifications(
    first: BrokerNotification,
    notifications: &mut mpsc::UnboundedReceiver<BrokerNotification>,
) -> DrainedNotifications {
    let mut drained = DrainedNotifications::default();
    let mut next = Some(first);
    while let Some(notification) = next.take() {
        match notification {
            BrokerNotification::NewEntry { log_len } => {
                drained.log_len = Some(drained.log_len.map_or(log_len, |seen| seen.max(log_len)));
            }
            BrokerNotification::Promotion => drained.promoted = true,
        }
        match notifications.try_recv() {
            Ok(notification) => next = Some(notification),
            Err(mpsc::error::TryRecvError::Empty) => {}
            Err(mpsc::error::TryRecvError::Disconnected) => drained.closed = true,
        }
    }

    drained
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn entry(seq: u64, payload: &'static str) -> ReplicatedEntry {
        ReplicatedEntry {
            sequence: Sequence::new(seq),
            payload: Bytes::from_static(payload.as_bytes()),
        }
    }

    #[test]
    fn entries_are_appended_and_acked() {
        let mut local_log = vec![entry(0, "A")];

        let step = apply_get_log_outcome(&mut local_log, GetLogOutcome::Entries(vec![entry(1, "B")]));

        assert_eq!(step, ReplicationStep::Stored(Sequence::new(1)));
        assert_eq!(local_log, vec![entry(0, "A"), entry(1, "B")]);
    }

    #[test]
    fn replayed_entry_overwrites_local_tail() {
        let mut local_log = vec![entry(0, "A"), entry(1, "stale")];

        let step = apply_get_log_outcome(&mut local_log, GetLogOutcome::Entries(vec![entry(1, "B")]));

        assert_eq!(step, ReplicationStep::Stored(Sequence::new(1)));
        assert_eq!(local_log, vec![entry(0, "A"), entry(1, "B")]);
    }

    #[test]
    fn resync_drops_entries_past_the_leader_cursor() {
        let mut local_log = vec![entry(0, "A"), entry(1, "B"), entry(2, "C")];

        let step = apply_get_log_outcome(
            &mut local_log,
            GetLogOutcome::Resync {
                correct_cursor: Sequence::new(1),
            },
        );

        assert_eq!(step, ReplicationStep::Retry);
        assert_eq!(local_log, vec![entry(0, "A")]);
    }

    #[test]
    fn gaps_mean_we_lost_state() {
        let mut local_log = vec![entry(0, "A")];
        let resync_ahead = GetLogOutcome::Resync {
            correct_cursor: Sequence::new(3),
        };
        assert_eq!(apply_get_log_outcome(&mut local_log, resync_ahead), ReplicationStep::ReRegister);

        let entry_ahead = GetLogOutcome::Entries(vec![entry(5, "F")]);
        assert_eq!(apply_get_log_outcome(&mut local_log, entry_ahead), ReplicationStep::ReRegister);
        assert_eq!(local_log, vec![entry(0, "A")]);
    }

    #[test]
    fn idle_and_rejections() {
        let mut local_log = Vec::new();
        let no_data = GetLogOutcome::NoData {
            current_cursor: Sequence::start(),
        };

        assert_eq!(apply_get_log_outcome(&mut local_log, no_data), ReplicationStep::Idle);
        assert_eq!(
            apply_get_log_outcome(&mut local_log, GetLogOutcome::Rejected(RejectReason::NotVoter)),
            ReplicationStep::Idle
        );
        assert_eq!(
            apply_get_log_outcome(&mut local_log, GetLogOutcome::Rejected(RejectReason::UnknownPeer)),
            ReplicationStep::ReRegister
        );
    }

    #[test]
    fn queued_notifications_are_coalesced() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        for log_len in 2..=4 {
            tx.send(BrokerNotification::NewEntry { log_len }).unwrap();
        }
        tx.send(BrokerNotification::Promotion).unwrap();
        tx.send(BrokerNotification::NewEntry { log_len: 5 }).unwrap();

        let drained = coalesce_notifications(BrokerNotification::NewEntry { log_len: 1 }, &mut rx);

        assert_eq!(
            drained,
            DrainedNotifications {
                log_len: Some(5),
                promoted: true,
                closed: false,
            }
        );
        assert!(rx.try_recv().is_err());

        drop(tx);
        let drained = coalesce_notifications(BrokerNotification::Promotion, &mut rx);
        assert!(drained.promoted);
        assert!(drained.closed);
        assert_eq!(drained.log_len, None);
    }

    #[test]
    fn options() {
        let defaults = BrokerOptionsValidated::try_from(BrokerOptions::default()).unwrap();
        assert_eq!(defaults.heartbeat_interval, Duration::from_secs(1));
        assert_eq!(defaults.heartbeat_jitter, Duration::from_millis(100));

        let jittery = BrokerOptions {
            heartbeat_jitter: Some(Duration::from_secs(1)),
            ..Default::default()
        };
        assert!(BrokerOptionsValidated::try_from(jittery).is_err());
    }
}
