use crate::actor::ActorClient;
use crate::commitlog::Sequence;
use crate::leader::{
    self, ActorExited, GetCommittedLogError, GetCommittedLogOutcome, Peer, ProducerRef, RegisterNewLogError,
};
use bytes::Bytes;

/// LeaderHandle is the in-process way to drive a running leader. It holds the only strong
/// reference to the leader's actor: dropping it shuts the leader down, RPC server included.
pub struct LeaderHandle {
    actor_client: ActorClient,
}

impl LeaderHandle {
    pub(crate) fn new(actor_client: ActorClient) -> Self {
        LeaderHandle { actor_client }
    }

    /// Same as a producer's `registerNewLog`. `producer_callback` receives the commit
    /// notification, if set.
    pub async fn append(
        &self,
        payload: Bytes,
        producer_callback: Option<ProducerRef>,
    ) -> Result<Sequence, RegisterNewLogError> {
        self.actor_client
            .register_new_log(leader::RegisterNewLogInput {
                payload,
                origin: producer_callback,
            })
            .await
            .map(|output| output.sequence)
    }

    pub async fn committed_log(&self, start_index: u64) -> Result<GetCommittedLogOutcome, GetCommittedLogError> {
        self.actor_client
            .get_committed_log(leader::GetCommittedLogInput { start_index })
            .await
    }

    /// Point-in-time copy of every registered peer, ordered by id.
    pub async fn peers(&self) -> Result<Vec<Peer>, ActorExited> {
        self.actor_client.peers_snapshot().await
    }
}
