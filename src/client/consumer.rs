use crate::client::leader_client::{ConnectError, LeaderCallError, LeaderClient};
use crate::leader::{GetCommittedLogOutcome, ReplicatedEntry};
use tokio::time::Duration;

/// ConsumerClient reads the committed log. It keeps a cursor into the committed log, so
/// `poll_committed` only returns entries it hasn't returned before.
pub struct ConsumerClient {
    logger: slog::Logger,
    leader: LeaderClient,
    cursor: u64,
}

impl ConsumerClient {
    pub async fn connect(
        info_logger: slog::Logger,
        leader_uri: String,
        rpc_timeout: Duration,
    ) -> Result<Self, ConnectError> {
        let logger = info_logger.new(slog::o!("Client" => "Consumer"));
        let leader = LeaderClient::connect(logger.clone(), leader_uri, rpc_timeout).await?;

        Ok(ConsumerClient {
            logger,
            leader,
            cursor: 0,
        })
    }

    /// Position in the committed log of the next entry `poll_committed` returns.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn seek(&mut self, committed_index: u64) {
        self.cursor = committed_index;
    }

    /// One-off read starting at `start_index`. Doesn't move the cursor.
    pub async fn fetch_committed(&self, start_index: u64) -> Result<GetCommittedLogOutcome, LeaderCallError> {
        self.leader.get_committed_log(start_index).await
    }

    /// Returns committed entries past the cursor, possibly none, and advances the cursor.
    pub async fn poll_committed(&mut self) -> Result<Vec<ReplicatedEntry>, LeaderCallError> {
        match self.leader.get_committed_log(self.cursor).await {
            Ok(GetCommittedLogOutcome::Entries(entries)) => {
                self.cursor += entries.len() as u64;
                Ok(entries)
            }
            Ok(GetCommittedLogOutcome::NoNewData { .. }) => Ok(Vec::new()),
            Err(LeaderCallError::OutOfRange { committed_count }) => {
                // Leader restarted with less history than we've seen.
                slog::warn!(
                    self.logger,
                    "Cursor {} is past committed count {}. Resetting.",
                    self.cursor,
                    committed_count
                );
                self.cursor = committed_count;
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }
}
