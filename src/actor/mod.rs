use crate::commitlog;
use crate::leader::{self, Leader, LogEntry};
use std::error::Error;
use std::fmt::Debug;
use tokio::sync::{mpsc, oneshot};

// Every mutation of leader state goes through this queue, so the leader never needs a lock. Work
// that touches the network is spawned and reports back as its own event.
#[derive(Debug)]
pub(crate) enum Event {
    // Broker joins (or re-joins after losing state).
    RegisterBroker(
        leader::RegisterBrokerInput,
        Callback<leader::RegisterBrokerOutput, leader::RegisterBrokerError>,
    ),

    // Voter pulls the next entry. Read and cursor update are atomic per peer.
    GetLog(
        leader::GetLogInput,
        Callback<leader::GetLogOutcome, leader::GetLogError>,
    ),

    // Voter stored an entry. May commit it and notify its producer.
    ConfirmLogStored(
        leader::ConfirmLogStoredInput,
        Callback<leader::ConfirmLogStoredOutput, leader::ConfirmLogStoredError>,
    ),

    Heartbeat(
        leader::HeartbeatInput,
        Callback<leader::HeartbeatOutput, leader::HeartbeatError>,
    ),

    // Producer appends. Fans out new-entry hints to voters.
    RegisterNewLog(
        leader::RegisterNewLogInput,
        Callback<leader::RegisterNewLogOutput, leader::RegisterNewLogError>,
    ),

    GetCommittedLog(
        leader::GetCommittedLogInput,
        Callback<leader::GetCommittedLogOutcome, leader::GetCommittedLogError>,
    ),

    PeersSnapshot(Callback<Vec<leader::Peer>, leader::ActorExited>),

    // From the liveness timer.
    LivenessCheck,

    // From a spawned promotion contact task.
    PromotionReplyFromPeer(leader::PromotionReplyFromPeer),
}

#[derive(Debug)]
pub(crate) struct Callback<O: Debug, E: Error>(oneshot::Sender<Result<O, E>>);

impl<O: Debug, E: Error> Callback<O, E> {
    pub fn send(self, message: Result<O, E>) {
        // Caller may have given up waiting.
        let _ = self.0.send(message);
    }
}

/// ActorClient is the strong handle to the leader actor. The actor runs for as long as any
/// strong handle exists.
#[derive(Clone)]
pub(crate) struct ActorClient {
    sender: mpsc::Sender<Event>,
}

impl ActorClient {
    pub(crate) fn new(buffer_size: usize) -> (Self, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel(buffer_size);

        (ActorClient { sender: tx }, rx)
    }

    pub(crate) fn weak(&self) -> WeakActorClient {
        WeakActorClient {
            sender: self.sender.downgrade(),
        }
    }

    pub(crate) async fn register_broker(
        &self,
        input: leader::RegisterBrokerInput,
    ) -> Result<leader::RegisterBrokerOutput, leader::RegisterBrokerError> {
        self.call(|callback| Event::RegisterBroker(input, callback)).await
    }

    pub(crate) async fn get_log(
        &self,
        input: leader::GetLogInput,
    ) -> Result<leader::GetLogOutcome, leader::GetLogError> {
        self.call(|callback| Event::GetLog(input, callback)).await
    }

    pub(crate) async fn confirm_log_stored(
        &self,
        input: leader::ConfirmLogStoredInput,
    ) -> Result<leader::ConfirmLogStoredOutput, leader::ConfirmLogStoredError> {
        self.call(|callback| Event::ConfirmLogStored(input, callback)).await
    }

    pub(crate) async fn heartbeat(
        &self,
        input: leader::HeartbeatInput,
    ) -> Result<leader::HeartbeatOutput, leader::HeartbeatError> {
        self.call(|callback| Event::Heartbeat(input, callback)).await
    }

    pub(crate) async fn register_new_log(
        &self,
        input: leader::RegisterNewLogInput,
    ) -> Result<leader::RegisterNewLogOutput, leader::RegisterNewLogError> {
        self.call(|callback| Event::RegisterNewLog(input, callback)).await
    }

    pub(crate) async fn get_committed_log(
        &self,
        input: leader::GetCommittedLogInput,
    ) -> Result<leader::GetCommittedLogOutcome, leader::GetCommittedLogError> {
        self.call(|callback| Event::GetCommittedLog(input, callback)).await
    }

    pub(crate) async fn peers_snapshot(&self) -> Result<Vec<leader::Peer>, leader::ActorExited> {
        self.call(Event::PeersSnapshot).await
    }

    pub(crate) async fn liveness_check(&self) -> Result<(), leader::ActorExited> {
        self.send(Event::LivenessCheck).await
    }

    pub(crate) async fn promotion_reply_from_peer(
        &self,
        reply: leader::PromotionReplyFromPeer,
    ) -> Result<(), leader::ActorExited> {
        self.send(Event::PromotionReplyFromPeer(reply)).await
    }

    async fn call<O, E, F>(&self, to_event: F) -> Result<O, E>
    where
        O: Debug,
        E: Error + From<leader::ActorExited>,
        F: FnOnce(Callback<O, E>) -> Event,
    {
        let (tx, rx) = oneshot::channel();
        self.send(to_event(Callback(tx))).await?;

        // The actor drops queued callbacks when it exits.
        rx.await.map_err(|_| leader::ActorExited)?
    }

    async fn send(&self, event: Event) -> Result<(), leader::ActorExited> {
        self.sender.send(event).await.map_err(|_| leader::ActorExited)
    }
}

/// WeakActorClient doesn't keep the actor alive. The RPC server and background tasks hold
/// these, so dropping the last `ActorClient` shuts everything down.
#[derive(Clone)]
pub(crate) struct WeakActorClient {
    sender: mpsc::WeakSender<Event>,
}

impl WeakActorClient {
    fn upgrade(&self) -> Result<ActorClient, leader::ActorExited> {
        self.sender
            .upgrade()
            .map(|sender| ActorClient { sender })
            .ok_or(leader::ActorExited)
    }

    pub(crate) async fn register_broker(
        &self,
        input: leader::RegisterBrokerInput,
    ) -> Result<leader::RegisterBrokerOutput, leader::RegisterBrokerError> {
        self.upgrade()?.register_broker(input).await
    }

    pub(crate) async fn get_log(
        &self,
        input: leader::GetLogInput,
    ) -> Result<leader::GetLogOutcome, leader::GetLogError> {
        self.upgrade()?.get_log(input).await
    }

    pub(crate) async fn confirm_log_stored(
        &self,
        input: leader::ConfirmLogStoredInput,
    ) -> Result<leader::ConfirmLogStoredOutput, leader::ConfirmLogStoredError> {
        self.upgrade()?.confirm_log_stored(input).await
    }

    pub(crate) async fn heartbeat(
        &self,
        input: leader::HeartbeatInput,
    ) -> Result<leader::HeartbeatOutput, leader::HeartbeatError> {
        self.upgrade()?.heartbeat(input).await
    }

    pub(crate) async fn register_new_log(
        &self,
        input: leader::RegisterNewLogInput,
    ) -> Result<leader::RegisterNewLogOutput, leader::RegisterNewLogError> {
        self.upgrade()?.register_new_log(input).await
    }

    pub(crate) async fn get_committed_log(
        &self,
        input: leader::GetCommittedLogInput,
    ) -> Result<leader::GetCommittedLogOutcome, leader::GetCommittedLogError> {
        self.upgrade()?.get_committed_log(input).await
    }

    pub(crate) async fn liveness_check(&self) -> Result<(), leader::ActorExited> {
        self.upgrade()?.liveness_check().await
    }

    pub(crate) async fn promotion_reply_from_peer(
        &self,
        reply: leader::PromotionReplyFromPeer,
    ) -> Result<(), leader::ActorExited> {
        self.upgrade()?.promotion_reply_from_peer(reply).await
    }
}

/// LeaderActor is leader logic in actor model.
pub(crate) struct LeaderActor<L, C>
where
    L: commitlog::Log<LogEntry>,
    C: leader::Clock,
{
    logger: slog::Logger,
    receiver: mpsc::Receiver<Event>,
    leader: Leader<L, C>,
}

impl<L, C> LeaderActor<L, C>
where
    L: commitlog::Log<LogEntry>,
    C: leader::Clock,
{
    pub(crate) fn new(logger: slog::Logger, receiver: mpsc::Receiver<Event>, leader: Leader<L, C>) -> Self {
        LeaderActor {
            logger,
            receiver,
            leader,
        }
    }

    pub(crate) async fn run_event_loop(mut self) {
        while let Some(event) = self.receiver.recv().await {
            self.handle_event(event);
        }

        slog::info!(self.logger, "Leader actor exited.");
    }

    // This must NOT be async. Any long running work must be spawned on another task and come
    // back as an event to this actor.
    fn handle_event(&mut self, event: Event) {
        match event {
            Event::RegisterBroker(input, callback) => {
                callback.send(self.leader.handle_register_broker(input));
            }
            Event::GetLog(input, callback) => {
                callback.send(self.leader.handle_get_log(input));
            }
            Event::ConfirmLogStored(input, callback) => {
                callback.send(self.leader.handle_confirm_log_stored(input));
            }
            Event::Heartbeat(input, callback) => {
                callback.send(self.leader.handle_heartbeat(input));
            }
            Event::RegisterNewLog(input, callback) => {
                callback.send(self.leader.handle_register_new_log(input));
            }
            Event::GetCommittedLog(input, callback) => {
                callback.send(self.leader.handle_get_committed_log(input));
            }
            Event::PeersSnapshot(callback) => {
                callback.send(Ok(self.leader.handle_peers_snapshot()));
            }
            Event::LivenessCheck => {
                self.leader.handle_liveness_check();
            }
            Event::PromotionReplyFromPeer(reply) => {
                self.leader.handle_promotion_reply_from_peer(reply);
            }
        }
    }
}
