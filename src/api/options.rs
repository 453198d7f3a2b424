use std::convert::TryFrom;
use std::num::NonZeroUsize;
use tokio::time::Duration;

/// Tuning knobs for the leader. Every field is optional; unset fields get defaults.
#[derive(Clone, Debug, Default)]
pub struct LeaderOptions {
    /// Distinct voter acks needed to commit an entry.
    pub quorum_size: Option<usize>,
    /// Voter count the membership policy tries to maintain. Defaults to `quorum_size`.
    pub target_voter_count: Option<usize>,
    pub max_log_entries: Option<u64>,
    pub liveness_check_interval: Option<Duration>,
    /// A peer whose last heartbeat is older than this is expired.
    pub expiry_threshold: Option<Duration>,
    /// Deadline for each outbound notification (new entry, promotion, commit).
    pub callback_timeout: Option<Duration>,
}

#[derive(Debug, PartialEq)]
pub(super) struct LeaderOptionsValidated {
    pub quorum_size: NonZeroUsize,
    pub target_voter_count: usize,
    pub max_log_entries: u64,
    pub liveness_check_interval: Duration,
    pub expiry_threshold: Duration,
    pub callback_timeout: Duration,
}

impl LeaderOptionsValidated {
    fn validate(&self) -> Result<(), &'static str> {
        if self.target_voter_count < self.quorum_size.get() {
            return Err("Target voter count must be at least the quorum size");
        }
        if self.max_log_entries == 0 {
            return Err("Max log entries must be at least 1");
        }
        if self.liveness_check_interval >= self.expiry_threshold {
            return Err("Liveness check interval must be less than the expiry threshold");
        }
        if self.callback_timeout >= self.expiry_threshold {
            return Err("Callback timeout must be less than the expiry threshold");
        }

        Ok(())
    }
}

impl TryFrom<LeaderOptions> for LeaderOptionsValidated {
    type Error = &'static str;

    fn try_from(options: LeaderOptions) -> Result<Self, Self::Error> {
        let quorum_size =
            NonZeroUsize::new(options.quorum_size.unwrap_or(1)).ok_or("Quorum size must be at least 1")?;
        let values = LeaderOptionsValidated {
            quorum_size,
            target_voter_count: options.target_voter_count.unwrap_or_else(|| quorum_size.get()),
            max_log_entries: options.max_log_entries.unwrap_or(1_000_000),
            liveness_check_interval: options.liveness_check_interval.unwrap_or(Duration::from_secs(1)),
            expiry_threshold: options.expiry_threshold.unwrap_or(Duration::from_secs(5)),
            callback_timeout: options.callback_timeout.unwrap_or(Duration::from_millis(500)),
        };

        values.validate()?;
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let validated = LeaderOptionsValidated::try_from(LeaderOptions::default()).unwrap();
        assert_eq!(
            validated,
            LeaderOptionsValidated {
                quorum_size: NonZeroUsize::new(1).unwrap(),
                target_voter_count: 1,
                max_log_entries: 1_000_000,
                liveness_check_interval: Duration::from_secs(1),
                expiry_threshold: Duration::from_secs(5),
                callback_timeout: Duration::from_millis(500),
            }
        );
    }

    #[test]
    fn target_follows_quorum_unless_set() {
        let options = LeaderOptions {
            quorum_size: Some(3),
            ..Default::default()
        };
        assert_eq!(LeaderOptionsValidated::try_from(options).unwrap().target_voter_count, 3);

        let options = LeaderOptions {
            quorum_size: Some(3),
            target_voter_count: Some(5),
            ..Default::default()
        };
        assert_eq!(LeaderOptionsValidated::try_from(options).unwrap().target_voter_count, 5);
    }

    #[test]
    fn zero_quorum_is_rejected() {
        let options = LeaderOptions {
            quorum_size: Some(0),
            ..Default::default()
        };
        assert_eq!(
            LeaderOptionsValidated::try_from(options),
            Err("Quorum size must be at least 1")
        );
    }

    #[test]
    fn illegal_combinations() {
        let cases = vec![
            LeaderOptions {
                quorum_size: Some(0),
                ..Default::default()
            },
            LeaderOptions {
                quorum_size: Some(3),
                target_voter_count: Some(2),
                ..Default::default()
            },
            LeaderOptions {
                max_log_entries: Some(0),
                ..Default::default()
            },
            LeaderOptions {
                liveness_check_interval: Some(Duration::from_secs(5)),
                ..Default::default()
            },
            LeaderOptions {
                callback_timeout: Some(Duration::from_secs(6)),
                ..Default::default()
            },
        ];

        for options in cases {
            assert!(
                LeaderOptionsValidated::try_from(options.clone()).is_err(),
                "Expected {:?} to be rejected",
                options
            );
        }
    }
}
