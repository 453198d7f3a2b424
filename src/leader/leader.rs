use crate::actor::WeakActorClient;
use crate::commitlog::{Log, LogError, Sequence};
use crate::leader::callback::{self, CallbackTransport};
use crate::leader::commit_tracker::{AckError, AckOutcome, CommitTracker};
use crate::leader::leader_api::{
    ConfirmLogStoredError, ConfirmLogStoredInput, ConfirmLogStoredOutput, GetCommittedLogError,
    GetCommittedLogInput, GetCommittedLogOutcome, GetLogError, GetLogInput, GetLogOutcome, HeartbeatError,
    HeartbeatInput, HeartbeatOutput, PromotionReplyFromPeer, RegisterBrokerError, RegisterBrokerInput,
    RegisterBrokerOutput, RegisterNewLogError, RegisterNewLogInput, RegisterNewLogOutput,
};
use crate::leader::liveness;
use crate::leader::log_entry::{LogEntry, ProducerRef};
use crate::leader::membership::{self, MembershipPolicy, PromotionOutcome};
use crate::leader::peers::{Peer, PeerRegistry};
use crate::leader::replication;
use crate::leader::time::Clock;
use crate::server::RpcServerShutdownHandle;
use bytes::Bytes;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::time::Duration;

pub(crate) struct LeaderEngineConfig<L, C>
where
    L: Log<LogEntry>,
    C: Clock,
{
    pub(crate) logger: slog::Logger,
    pub(crate) log: L,
    pub(crate) clock: C,
    pub(crate) transport: Arc<dyn CallbackTransport>,
    pub(crate) actor_client: WeakActorClient,
    pub(crate) server_shutdown_handle: RpcServerShutdownHandle,
    pub(crate) quorum_size: NonZeroUsize,
    pub(crate) target_voter_count: usize,
    pub(crate) expiry_threshold: Duration,
    pub(crate) callback_timeout: Duration,
}

/// Leader owns the log, the peer registry and all commit and membership bookkeeping. It is only
/// ever driven by the actor, one event at a time, so no method here needs a lock.
pub(crate) struct Leader<L, C>
where
    L: Log<LogEntry>,
    C: Clock,
{
    logger: slog::Logger,
    log: L,
    registry: PeerRegistry,
    commit_tracker: CommitTracker,
    membership: MembershipPolicy,
    transport: Arc<dyn CallbackTransport>,
    actor_client: WeakActorClient,
    clock: C,
    expiry_threshold: Duration,
    callback_timeout: Duration,
    // Dropping the leader stops the RPC server.
    _server_shutdown_handle: RpcServerShutdownHandle,
}

impl<L, C> Leader<L, C>
where
    L: Log<LogEntry>,
    C: Clock,
{
    pub(crate) fn new(config: LeaderEngineConfig<L, C>) -> Self {
        Leader {
            logger: config.logger,
            log: config.log,
            registry: PeerRegistry::new(),
            commit_tracker: CommitTracker::new(config.quorum_size),
            membership: MembershipPolicy::new(config.target_voter_count),
            transport: config.transport,
            actor_client: config.actor_client,
            clock: config.clock,
            expiry_threshold: config.expiry_threshold,
            callback_timeout: config.callback_timeout,
            _server_shutdown_handle: config.server_shutdown_handle,
        }
    }

    pub(crate) fn handle_register_broker(
        &mut self,
        input: RegisterBrokerInput,
    ) -> Result<RegisterBrokerOutput, RegisterBrokerError> {
        let now = self.clock.now();
        let previous = self
            .registry
            .register(input.peer_id.clone(), input.endpoint.clone(), input.role, now);
        let re_registered = previous.is_some();

        match previous {
            None => slog::info!(
                self.logger,
                "Registered {:?} as {} at {:?}",
                input.peer_id,
                input.role.as_str(),
                input.endpoint
            ),
            Some(previous) => slog::info!(
                self.logger,
                "Re-registered {:?} as {} at {:?} (was {} at {:?} with cursor {:?}). Cursor reset.",
                input.peer_id,
                input.role.as_str(),
                input.endpoint,
                previous.role().as_str(),
                previous.endpoint(),
                previous.cursor()
            ),
        }

        Ok(RegisterBrokerOutput { re_registered })
    }

    pub(crate) fn handle_get_log(&mut self, input: GetLogInput) -> Result<GetLogOutcome, GetLogError> {
        let outcome = replication::catch_up(&mut self.registry, &self.log, &input.peer_id, input.requested_start);

        match &outcome {
            GetLogOutcome::Resync { correct_cursor } => slog::warn!(
                self.logger,
                "Peer {:?} asked from {:?} but its cursor is {:?}. Resync.",
                input.peer_id,
                input.requested_start,
                correct_cursor
            ),
            GetLogOutcome::Rejected(reason) => {
                slog::warn!(self.logger, "Rejected GetLog from {:?}: {:?}", input.peer_id, reason)
            }
            _ => {}
        }

        Ok(outcome)
    }

    pub(crate) fn handle_confirm_log_stored(
        &mut self,
        input: ConfirmLogStoredInput,
    ) -> Result<ConfirmLogStoredOutput, ConfirmLogStoredError> {
        let peer = self
            .registry
            .lookup(&input.peer_id)
            .map_err(|_| ConfirmLogStoredError::UnknownPeer)?;
        if !peer.is_voter() {
            return Err(ConfirmLogStoredError::NotVoter);
        }

        let outcome = self
            .commit_tracker
            .acknowledge(&mut self.log, &input.peer_id, input.sequence)
            .map_err(|e| match e {
                AckError::UnknownEntry { log_len, .. } => ConfirmLogStoredError::UnknownEntry { log_len },
            })?;

        let committed = match outcome {
            AckOutcome::Pending { acks, quorum_size } => {
                slog::debug!(
                    self.logger,
                    "Entry {:?} has {}/{} acks",
                    input.sequence,
                    acks,
                    quorum_size
                );
                false
            }
            AckOutcome::Committed {
                sequence,
                payload,
                origin,
            } => {
                slog::info!(
                    self.logger,
                    "Committed entry {:?}. Committed count: {}",
                    sequence,
                    self.commit_tracker.committed_count()
                );
                if let Some(producer) = origin {
                    self.spawn_commit_notification(producer, sequence, payload);
                }
                true
            }
            AckOutcome::AlreadyCommitted => true,
        };

        Ok(ConfirmLogStoredOutput { committed })
    }

    pub(crate) fn handle_heartbeat(&mut self, input: HeartbeatInput) -> Result<HeartbeatOutput, HeartbeatError> {
        let now = self.clock.now();
        self.registry.touch_heartbeat(&input.peer_id, now).map_err(|e| {
            slog::warn!(self.logger, "Dropping heartbeat: {}", e);
            HeartbeatError::UnknownPeer
        })?;

        Ok(HeartbeatOutput {})
    }

    pub(crate) fn handle_register_new_log(
        &mut self,
        input: RegisterNewLogInput,
    ) -> Result<RegisterNewLogOutput, RegisterNewLogError> {
        let sequence = self
            .log
            .append(LogEntry::new(input.payload, input.origin))
            .map_err(|e| match e {
                LogError::CapacityExceeded { max_entries } => RegisterNewLogError::CapacityExceeded { max_entries },
                other => RegisterNewLogError::LocalLog(other),
            })?;
        slog::debug!(self.logger, "Appended entry {:?}", sequence);

        replication::notify_voters_of_new_entry(
            &self.logger,
            &self.transport,
            self.registry.voters_snapshot(),
            self.log.len(),
            self.callback_timeout,
        );

        Ok(RegisterNewLogOutput { sequence })
    }

    pub(crate) fn handle_get_committed_log(
        &self,
        input: GetCommittedLogInput,
    ) -> Result<GetCommittedLogOutcome, GetCommittedLogError> {
        self.commit_tracker
            .read_committed(&self.log, input.start_index)
            .map_err(|e| GetCommittedLogError::OutOfRange {
                committed_count: e.committed_count,
            })
    }

    pub(crate) fn handle_peers_snapshot(&self) -> Vec<Peer> {
        self.registry.snapshot()
    }

    /// Removes expired voters, then asks the membership policy for replacements. Expired
    /// observers stay registered.
    pub(crate) fn handle_liveness_check(&mut self) {
        let now = self.clock.now();

        let mut num_removed_voters = 0;
        for peer in liveness::expired_peers(&self.registry, now, self.expiry_threshold) {
            if peer.is_voter() {
                self.registry.remove(peer.id());
                num_removed_voters += 1;
                slog::info!(
                    self.logger,
                    "Removed voter {:?}. Last heartbeat {:?} ago.",
                    peer.id(),
                    now.saturating_duration_since(peer.last_heartbeat())
                );
            } else {
                slog::debug!(self.logger, "Observer {:?} is expired", peer.id());
            }
        }

        let requests =
            self.membership
                .plan_promotions(&self.registry, now, self.expiry_threshold, num_removed_voters);
        for request in requests {
            slog::info!(self.logger, "Asking observer {:?} to become a voter", request.peer_id);
            tokio::task::spawn(membership::call_peer_promotion(
                self.logger.new(slog::o!("Peer" => format!("{:?}", request.peer_id))),
                self.transport.clone(),
                request,
                self.callback_timeout,
                self.actor_client.clone(),
            ));
        }

        let num_voters = self.registry.num_voters();
        if num_voters < self.commit_tracker.quorum_size() {
            slog::warn!(
                self.logger,
                "Commitment stalled: {} voters, quorum size {}, {} promotions in flight",
                num_voters,
                self.commit_tracker.quorum_size(),
                self.membership.num_in_flight()
            );
        }
    }

    pub(crate) fn handle_promotion_reply_from_peer(&mut self, reply: PromotionReplyFromPeer) {
        let logger = self.logger.new(slog::o!("Peer" => format!("{:?}", reply.peer_id)));
        match self.membership.complete_promotion(&mut self.registry, reply) {
            PromotionOutcome::Promoted => slog::info!(
                logger,
                "Promoted observer to voter. Voters: {}/{}",
                self.registry.num_voters(),
                self.membership.target_voter_count()
            ),
            PromotionOutcome::ContactFailed(e) => slog::warn!(logger, "Promotion failed: {}", e),
            PromotionOutcome::PeerGone => slog::info!(logger, "Peer left before promotion completed"),
            PromotionOutcome::PeerReRegistered => {
                slog::info!(logger, "Peer re-registered elsewhere before promotion completed")
            }
            PromotionOutcome::AlreadyVoter => slog::info!(logger, "Peer is already a voter"),
            PromotionOutcome::Unexpected => slog::warn!(logger, "Unexpected promotion reply"),
        }
    }

    fn spawn_commit_notification(&self, producer: ProducerRef, sequence: Sequence, payload: Bytes) {
        let logger = self.logger.new(slog::o!("Producer" => producer.as_str().to_string()));
        let transport = self.transport.clone();
        let timeout = self.callback_timeout;

        tokio::task::spawn(async move {
            let result =
                callback::with_timeout(timeout, transport.notify_committed(&producer, sequence, payload)).await;
            if let Err(e) = result {
                slog::warn!(logger, "Failed to notify producer of commit {:?}: {}", sequence, e);
            }
        });
    }
}
