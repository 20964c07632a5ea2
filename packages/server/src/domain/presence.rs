//! Presence rules.
//!
//! A participant is *effectively online* iff the stored `online` flag is set
//! and the last liveness signal is no older than the offline threshold. The
//! staleness check covers clients that vanish without sending a final
//! offline write.

use std::time::Duration;

use super::{entity::Participant, error::ValueObjectError, value_object::Timestamp};

/// Default interval between liveness writes.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(10);
/// Default staleness threshold.
pub const DEFAULT_OFFLINE_THRESHOLD: Duration = Duration::from_secs(30);
/// Minimum ratio between the offline threshold and the heartbeat interval.
pub const MIN_THRESHOLD_MARGIN: u32 = 3;

/// Heartbeat cadence paired with the staleness threshold it must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresencePolicy {
    heartbeat_interval: Duration,
    offline_threshold: Duration,
}

impl PresencePolicy {
    /// The threshold must be at least three heartbeat intervals so a single
    /// missed tick never flips presence.
    pub fn new(
        heartbeat_interval: Duration,
        offline_threshold: Duration,
    ) -> Result<Self, ValueObjectError> {
        if heartbeat_interval.is_zero()
            || offline_threshold < heartbeat_interval * MIN_THRESHOLD_MARGIN
        {
            return Err(ValueObjectError::InvalidPresencePolicy {
                heartbeat_ms: heartbeat_interval.as_millis(),
                threshold_ms: offline_threshold.as_millis(),
            });
        }
        Ok(Self {
            heartbeat_interval,
            offline_threshold,
        })
    }

    pub fn heartbeat_interval(&self) -> Duration {
        self.heartbeat_interval
    }

    pub fn offline_threshold(&self) -> Duration {
        self.offline_threshold
    }

    pub fn is_effectively_online(&self, participant: &Participant, now: Timestamp) -> bool {
        is_effectively_online(participant, now, self.offline_threshold)
    }
}

impl Default for PresencePolicy {
    fn default() -> Self {
        Self {
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            offline_threshold: DEFAULT_OFFLINE_THRESHOLD,
        }
    }
}

pub fn is_effectively_online(
    participant: &Participant,
    now: Timestamp,
    offline_threshold: Duration,
) -> bool {
    let threshold_ms = i64::try_from(offline_threshold.as_millis()).unwrap_or(i64::MAX);
    participant.online && now.millis_since(participant.last_seen_at) <= threshold_ms
}
