use std::time::Duration;

use super::parse_env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    /// Pause between two notification polls of one session.
    pub poll_interval: Duration,
    /// Upper bound on concurrently open streams (store leases).
    pub max_sessions: usize,
    /// Interval of keep-alive comment frames; `None` disables them.
    pub heartbeat: Option<Duration>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            max_sessions: 256,
            heartbeat: Some(Duration::from_secs(15)),
        }
    }
}

impl StreamConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let poll_secs: u64 = parse_env("STREAM_POLL_INTERVAL_SECS", 5);
        let poll_interval = if poll_secs == 0 {
            tracing::warn!("STREAM_POLL_INTERVAL_SECS must be positive, using default");
            defaults.poll_interval
        } else {
            Duration::from_secs(poll_secs)
        };

        let max_sessions = parse_env("STREAM_MAX_SESSIONS", defaults.max_sessions).max(1);

        let heartbeat = match parse_env("STREAM_HEARTBEAT_SECS", 15u64) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Self {
            poll_interval,
            max_sessions,
            heartbeat,
        }
    }
}
