//! Local turn countdown. The server owns turn timing; this only mirrors it and
//! reports a timeout when the local player's countdown runs out.

use cardroom_core::PlayerId;

pub const DEFAULT_TURN_TICKS: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    Idle,
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerSync {
    Unchanged,
    Restarted,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerExpiry {
    /// Set when the countdown ran out on the local player's turn.
    pub notify_server: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TurnKey {
    started: bool,
    current_player: Option<PlayerId>,
}

#[derive(Debug, Clone)]
pub struct TurnTimer {
    duration: u32,
    remaining: u32,
    phase: TimerPhase,
    key: Option<TurnKey>,
    generation: u64,
}

impl TurnTimer {
    pub fn new(duration: u32) -> Self {
        let duration = duration.max(1);
        Self {
            duration,
            remaining: duration,
            phase: TimerPhase::Idle,
            key: None,
            generation: 0,
        }
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    /// Bumped on every restart or stop; a tick source built for an older
    /// generation must be discarded.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_running(&self) -> bool {
        self.phase == TimerPhase::Running
    }

    /// Feeds the latest turn state. A change of `started` or of the current
    /// player restarts from the full duration; anything else leaves the
    /// countdown alone.
    pub fn sync(&mut self, started: bool, current_player: Option<&str>) -> TimerSync {
        let key = TurnKey {
            started,
            current_player: current_player.map(str::to_string),
        };
        if self.key.as_ref() == Some(&key) {
            return TimerSync::Unchanged;
        }
        let runnable = key.started && key.current_player.is_some();
        self.key = Some(key);
        self.generation = self.generation.wrapping_add(1);
        self.remaining = self.duration;
        if runnable {
            self.phase = TimerPhase::Running;
            TimerSync::Restarted
        } else {
            self.phase = TimerPhase::Idle;
            TimerSync::Stopped
        }
    }

    pub fn reset(&mut self) {
        self.key = None;
        self.generation = self.generation.wrapping_add(1);
        self.remaining = self.duration;
        self.phase = TimerPhase::Idle;
    }

    pub fn tick(&mut self, my_turn: bool) -> Option<TimerExpiry> {
        if self.phase != TimerPhase::Running {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining > 0 {
            return None;
        }
        self.phase = TimerPhase::Idle;
        Some(TimerExpiry {
            notify_server: my_turn,
        })
    }
}

impl Default for TurnTimer {
    fn default() -> Self {
        Self::new(DEFAULT_TURN_TICKS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_until_started_with_full_duration() {
        let mut timer = TurnTimer::new(5);
        assert_eq!(timer.sync(false, Some("p1")), TimerSync::Stopped);
        assert_eq!(timer.phase(), TimerPhase::Idle);
        assert_eq!(timer.tick(true), None);
        assert_eq!(timer.remaining(), 5);
    }

    #[test]
    fn started_without_current_player_stays_idle() {
        let mut timer = TurnTimer::new(5);
        assert_eq!(timer.sync(true, None), TimerSync::Stopped);
        assert!(!timer.is_running());
    }

    #[test]
    fn expiry_on_my_turn_notifies_once_and_stops() {
        let mut timer = TurnTimer::new(3);
        timer.sync(true, Some("me"));
        assert_eq!(timer.tick(true), None);
        assert_eq!(timer.tick(true), None);
        assert_eq!(
            timer.tick(true),
            Some(TimerExpiry {
                notify_server: true
            })
        );
        assert_eq!(timer.phase(), TimerPhase::Idle);
        for _ in 0..5 {
            assert_eq!(timer.tick(true), None);
        }
        assert_eq!(timer.remaining(), 0);
        assert_eq!(timer.sync(true, Some("me")), TimerSync::Unchanged);
        assert_eq!(timer.tick(true), None);
    }

    #[test]
    fn expiry_on_other_turn_is_silent() {
        let mut timer = TurnTimer::new(1);
        timer.sync(true, Some("other"));
        assert_eq!(
            timer.tick(false),
            Some(TimerExpiry {
                notify_server: false
            })
        );
    }

    #[test]
    fn turn_change_restarts_from_full_duration() {
        let mut timer = TurnTimer::new(10);
        timer.sync(true, Some("a"));
        let first = timer.generation();
        timer.tick(false);
        timer.tick(false);
        assert_eq!(timer.remaining(), 8);
        assert_eq!(timer.sync(true, Some("a")), TimerSync::Unchanged);
        assert_eq!(timer.remaining(), 8);

        assert_eq!(timer.sync(true, Some("b")), TimerSync::Restarted);
        assert_eq!(timer.remaining(), 10);
        assert_ne!(timer.generation(), first);

        assert_eq!(timer.sync(false, Some("b")), TimerSync::Stopped);
        assert_eq!(timer.remaining(), 10);
        assert!(!timer.is_running());
    }
}
