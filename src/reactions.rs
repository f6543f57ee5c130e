use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use cardroom_core::PlayerId;

pub const DEFAULT_REACTION_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub gif_id: String,
    pub expires_at: Instant,
}

/// Short-lived reactions keyed by target player. Each entry carries its own
/// expiry, so a sweep only ever drops entries whose own time is up.
#[derive(Debug, Clone)]
pub struct ReactionTracker {
    duration: Duration,
    entries: HashMap<PlayerId, Reaction>,
}

impl ReactionTracker {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            entries: HashMap::new(),
        }
    }

    /// Records a reaction, replacing whatever the target was showing.
    pub fn record(&mut self, target_id: &str, gif_id: &str, now: Instant) {
        self.entries.insert(
            target_id.to_string(),
            Reaction {
                gif_id: gif_id.to_string(),
                expires_at: now + self.duration,
            },
        );
    }

    pub fn active(&self, target_id: &str, now: Instant) -> Option<&str> {
        self.entries
            .get(target_id)
            .filter(|reaction| reaction.expires_at > now)
            .map(|reaction| reaction.gif_id.as_str())
    }

    /// Drops expired entries and returns the targets that were cleared.
    pub fn sweep(&mut self, now: Instant) -> Vec<PlayerId> {
        let expired: Vec<PlayerId> = self
            .entries
            .iter()
            .filter(|(_, reaction)| reaction.expires_at <= now)
            .map(|(target, _)| target.clone())
            .collect();
        for target in &expired {
            self.entries.remove(target);
        }
        expired
    }

    pub fn next_expiry(&self) -> Option<Instant> {
        self.entries.values().map(|reaction| reaction.expires_at).min()
    }

    pub fn snapshot(&self, now: Instant) -> HashMap<PlayerId, String> {
        self.entries
            .iter()
            .filter(|(_, reaction)| reaction.expires_at > now)
            .map(|(target, reaction)| (target.clone(), reaction.gif_id.clone()))
            .collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ReactionTracker {
    fn default() -> Self {
        Self::new(DEFAULT_REACTION_DURATION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: Duration = Duration::from_secs(1);

    #[test]
    fn reaction_lives_exactly_its_duration() {
        let t0 = Instant::now();
        let mut tracker = ReactionTracker::new(3 * SECOND);
        tracker.record("p2", "wave", t0);
        tracker.record("p3", "clap", t0 + SECOND);

        let just_before = t0 + 3 * SECOND - Duration::from_millis(1);
        assert_eq!(tracker.active("p2", just_before), Some("wave"));
        assert!(tracker.sweep(just_before).is_empty());

        let at_expiry = t0 + 3 * SECOND;
        assert_eq!(tracker.active("p2", at_expiry), None);
        assert_eq!(tracker.sweep(at_expiry), vec!["p2".to_string()]);
        assert_eq!(tracker.active("p3", at_expiry), Some("clap"));
        assert_eq!(tracker.next_expiry(), Some(t0 + 4 * SECOND));
    }

    #[test]
    fn overwrite_is_not_cleared_by_older_expiry() {
        let t0 = Instant::now();
        let mut tracker = ReactionTracker::new(3 * SECOND);
        tracker.record("p2", "wave", t0);
        tracker.record("p2", "laugh", t0 + 2 * SECOND);

        assert!(tracker.sweep(t0 + 3 * SECOND).is_empty());
        assert_eq!(tracker.active("p2", t0 + 3 * SECOND), Some("laugh"));
        assert_eq!(tracker.sweep(t0 + 5 * SECOND), vec!["p2".to_string()]);
        assert!(tracker.is_empty());
    }
}
