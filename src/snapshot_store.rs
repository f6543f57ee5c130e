use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tracing::debug;

use cardroom_core::{CardId, GameSnapshot, PlayerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SnapshotChange {
    pub round_started: bool,
    pub turn_changed: bool,
    pub selection_purged: usize,
}

/// Latest authoritative snapshot plus the local state that hangs off it:
/// round baseline scores and the card selection.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    current: Option<Arc<GameSnapshot>>,
    baseline: HashMap<PlayerId, i32>,
    selection: BTreeSet<CardId>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&Arc<GameSnapshot>> {
        self.current.as_ref()
    }

    pub fn baseline(&self) -> &HashMap<PlayerId, i32> {
        &self.baseline
    }

    pub fn selection(&self) -> &BTreeSet<CardId> {
        &self.selection
    }

    /// Replaces the snapshot wholesale. Baselines are captured only when the
    /// round goes from not started to started.
    pub fn apply(&mut self, next: GameSnapshot, viewer_id: &str) -> SnapshotChange {
        let previous = self.current.take();
        let was_started = previous.as_ref().is_some_and(|prev| prev.started);
        let previous_turn = previous
            .as_ref()
            .map(|prev| (prev.started, prev.current_player_id().map(str::to_string)));
        let next_turn = (next.started, next.current_player_id().map(str::to_string));

        let mut change = SnapshotChange::default();
        if !was_started && next.started {
            self.baseline = next
                .players
                .iter()
                .map(|player| (player.id.clone(), player.score))
                .collect();
            change.round_started = true;
            debug!(room_id = %next.room_id, players = self.baseline.len(), "round baseline captured");
        }
        if previous_turn.is_some_and(|turn| turn != next_turn) {
            change.turn_changed = true;
            self.selection.clear();
        }

        let before = self.selection.len();
        match next.player(viewer_id) {
            Some(me) => self.selection.retain(|id| me.holds(id)),
            None => self.selection.clear(),
        }
        change.selection_purged = before - self.selection.len();

        self.current = Some(Arc::new(next));
        change
    }

    pub fn toggle_selection(&mut self, card_id: &str, viewer_id: &str) -> bool {
        let in_hand = self
            .current
            .as_ref()
            .and_then(|snapshot| snapshot.player(viewer_id))
            .is_some_and(|me| me.holds(card_id));
        if !in_hand {
            return false;
        }
        if !self.selection.remove(card_id) {
            self.selection.insert(card_id.to_string());
        }
        true
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn clear(&mut self) {
        self.current = None;
        self.baseline.clear();
        self.selection.clear();
    }
}
