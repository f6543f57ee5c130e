use std::time::Duration;

use crate::reactions::DEFAULT_REACTION_DURATION;
use crate::turn_timer::DEFAULT_TURN_TICKS;

pub const DEFAULT_WS_URL: &str = "ws://localhost:3001/ws";
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);
pub const DEFAULT_REJOIN_DELAY: Duration = Duration::from_millis(300);
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub ws_url: String,
    /// Turn length in ticks of `tick_interval`.
    pub turn_ticks: u32,
    pub tick_interval: Duration,
    pub reaction_duration: Duration,
    /// Wait between transport connect and the rejoin request.
    pub rejoin_delay: Duration,
    pub reconnect_delay: Duration,
}

impl ClientConfig {
    pub fn new(ws_url: impl Into<String>) -> Self {
        Self {
            ws_url: ws_url.into(),
            turn_ticks: DEFAULT_TURN_TICKS,
            tick_interval: DEFAULT_TICK_INTERVAL,
            reaction_duration: DEFAULT_REACTION_DURATION,
            rejoin_delay: DEFAULT_REJOIN_DELAY,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }

    #[must_use]
    pub fn with_turn_ticks(mut self, ticks: u32) -> Self {
        self.turn_ticks = ticks.max(1);
        self
    }

    #[must_use]
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    #[must_use]
    pub fn with_reaction_duration(mut self, duration: Duration) -> Self {
        self.reaction_duration = duration;
        self
    }

    #[must_use]
    pub fn with_rejoin_delay(mut self, delay: Duration) -> Self {
        self.rejoin_delay = delay;
        self
    }

    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_WS_URL)
    }
}
