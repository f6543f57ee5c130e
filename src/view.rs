use std::collections::{BTreeSet, HashMap};

use cardroom_core::{Card, CardId, GameSnapshot, PlayerId, CLOSING_RANK};

pub fn viewer_id<'a>(snapshot: &'a GameSnapshot, local_id: &'a str) -> &'a str {
    snapshot.your_id.as_deref().unwrap_or(local_id)
}

pub fn is_my_turn(snapshot: &GameSnapshot, viewer_id: &str) -> bool {
    snapshot.started && snapshot.current_player_id() == Some(viewer_id)
}

pub fn has_drawn(snapshot: &GameSnapshot, viewer_id: &str) -> bool {
    snapshot
        .player(viewer_id)
        .is_some_and(|me| me.has_drawn)
}

/// Selected cards still in the viewer's hand, in hand order.
pub fn selected_cards(
    snapshot: &GameSnapshot,
    viewer_id: &str,
    selection: &BTreeSet<CardId>,
) -> Vec<Card> {
    let Some(me) = snapshot.player(viewer_id) else {
        return Vec::new();
    };
    me.hand
        .iter()
        .filter(|card| selection.contains(&card.id))
        .cloned()
        .collect()
}

pub fn can_drop(snapshot: &GameSnapshot, viewer_id: &str, selection: &BTreeSet<CardId>) -> bool {
    is_my_turn(snapshot, viewer_id) && !selected_cards(snapshot, viewer_id, selection).is_empty()
}

pub fn can_close(snapshot: &GameSnapshot, viewer_id: &str) -> bool {
    is_my_turn(snapshot, viewer_id)
        && !has_drawn(snapshot, viewer_id)
        && snapshot
            .discard_top
            .as_ref()
            .is_some_and(|card| card.rank == CLOSING_RANK)
}

/// Points shown for the current round: a positive change since the baseline
/// reads as 0, anything else is reported as is.
pub fn round_points(score: i32, baseline: Option<i32>) -> i32 {
    let delta = score.saturating_sub(baseline.unwrap_or(score));
    if delta > 0 {
        0
    } else {
        delta
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub face: Option<String>,
    pub score: i32,
    pub round_points: i32,
    pub hand_size: u32,
    pub is_current: bool,
    pub reaction: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableView {
    pub connected: bool,
    pub room_id: Option<String>,
    pub started: bool,
    pub close_called: bool,
    pub is_host: bool,
    pub is_my_turn: bool,
    pub has_drawn: bool,
    pub can_drop: bool,
    pub can_close: bool,
    pub hand: Vec<Card>,
    pub selected_cards: Vec<Card>,
    pub discard_top: Option<Card>,
    pub players: Vec<PlayerView>,
    pub timer_remaining: u32,
    pub timer_running: bool,
}

pub struct ViewInputs<'a> {
    pub connected: bool,
    pub local_id: &'a str,
    pub selection: &'a BTreeSet<CardId>,
    pub baseline: &'a HashMap<PlayerId, i32>,
    pub reactions: &'a HashMap<PlayerId, String>,
    pub timer_remaining: u32,
    pub timer_running: bool,
}

pub fn derive(snapshot: Option<&GameSnapshot>, inputs: &ViewInputs<'_>) -> TableView {
    let Some(snapshot) = snapshot else {
        return TableView {
            connected: inputs.connected,
            timer_remaining: inputs.timer_remaining,
            timer_running: inputs.timer_running,
            ..TableView::default()
        };
    };
    let me = viewer_id(snapshot, inputs.local_id);
    let current = snapshot.current_player_id();
    let players = snapshot
        .players
        .iter()
        .map(|player| PlayerView {
            id: player.id.clone(),
            name: player.name.clone(),
            face: player.face.clone(),
            score: player.score,
            round_points: round_points(player.score, inputs.baseline.get(&player.id).copied()),
            hand_size: if player.hand.is_empty() {
                player.hand_size
            } else {
                player.hand.len() as u32
            },
            is_current: snapshot.started && current == Some(player.id.as_str()),
            reaction: inputs.reactions.get(&player.id).cloned(),
        })
        .collect();
    TableView {
        connected: inputs.connected,
        room_id: Some(snapshot.room_id.clone()),
        started: snapshot.started,
        close_called: snapshot.close_called,
        is_host: snapshot.is_host(me),
        is_my_turn: is_my_turn(snapshot, me),
        has_drawn: has_drawn(snapshot, me),
        can_drop: can_drop(snapshot, me, inputs.selection),
        can_close: can_close(snapshot, me),
        hand: snapshot
            .player(me)
            .map(|player| player.hand.clone())
            .unwrap_or_default(),
        selected_cards: selected_cards(snapshot, me, inputs.selection),
        discard_top: snapshot.discard_top.clone(),
        players,
        timer_remaining: inputs.timer_remaining,
        timer_running: inputs.timer_running,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardroom_core::{Player, Rank, Suit};

    fn card(id: &str, rank: Rank) -> Card {
        Card {
            id: id.to_string(),
            rank,
            suit: if rank == Rank::Joker {
                None
            } else {
                Some(Suit::Spades)
            },
        }
    }

    fn player(id: &str, hand: Vec<Card>, has_drawn: bool) -> Player {
        Player {
            id: id.to_string(),
            name: id.to_uppercase(),
            face: None,
            hand_size: hand.len() as u32,
            hand,
            score: 0,
            has_drawn,
        }
    }

    fn table(me_drawn: bool, top: Rank) -> GameSnapshot {
        GameSnapshot {
            room_id: "R".to_string(),
            players: vec![
                player("me", vec![card("c1", Rank::Two), card("c2", Rank::Joker)], me_drawn),
                player("you", Vec::new(), false),
            ],
            current_turn: 0,
            discard_top: Some(card("d", top)),
            started: true,
            close_called: false,
            host_id: Some("you".to_string()),
            your_id: Some("me".to_string()),
        }
    }

    #[test]
    fn close_allowed_flips_with_has_drawn_only() {
        let fresh = table(false, Rank::Seven);
        assert!(can_close(&fresh, "me"));
        let drawn = table(true, Rank::Seven);
        assert!(!can_close(&drawn, "me"));
        assert!(is_my_turn(&drawn, "me"));
    }

    #[test]
    fn close_needs_closing_rank_and_turn() {
        assert!(!can_close(&table(false, Rank::Eight), "me"));
        assert!(!can_close(&table(false, Rank::Seven), "you"));
        let mut not_started = table(false, Rank::Seven);
        not_started.started = false;
        assert!(!can_close(&not_started, "me"));
        assert!(!is_my_turn(&not_started, "me"));
    }

    #[test]
    fn drop_needs_selection_in_hand_and_turn() {
        let snapshot = table(false, Rank::Two);
        let mut selection = BTreeSet::new();
        assert!(!can_drop(&snapshot, "me", &selection));
        selection.insert("gone".to_string());
        assert!(!can_drop(&snapshot, "me", &selection));
        selection.insert("c2".to_string());
        assert!(can_drop(&snapshot, "me", &selection));
        assert_eq!(selected_cards(&snapshot, "me", &selection), vec![card("c2", Rank::Joker)]);
        assert!(!can_drop(&snapshot, "you", &selection));
    }

    #[test]
    fn missing_viewer_has_not_drawn() {
        let snapshot = table(true, Rank::Two);
        assert!(has_drawn(&snapshot, "me"));
        assert!(!has_drawn(&snapshot, "ghost"));
    }

    #[test]
    fn round_points_report_only_non_positive_deltas() {
        assert_eq!(round_points(30, Some(10)), 0);
        assert_eq!(round_points(10, Some(10)), 0);
        assert_eq!(round_points(4, Some(10)), -6);
        assert_eq!(round_points(25, None), 0);
        assert_eq!(round_points(i32::MIN, Some(i32::MAX)), i32::MIN);
        assert_eq!(round_points(i32::MAX, Some(i32::MIN)), 0);
    }

    #[test]
    fn derive_marks_host_and_current_player() {
        let snapshot = table(false, Rank::Seven);
        let selection = BTreeSet::new();
        let baseline = HashMap::new();
        let mut reactions = HashMap::new();
        reactions.insert("you".to_string(), "wave".to_string());
        let view = derive(
            Some(&snapshot),
            &ViewInputs {
                connected: true,
                local_id: "local",
                selection: &selection,
                baseline: &baseline,
                reactions: &reactions,
                timer_remaining: 20,
                timer_running: true,
            },
        );
        assert!(!view.is_host);
        assert!(view.is_my_turn);
        assert!(view.can_close);
        assert_eq!(view.hand.len(), 2);
        assert!(view.players[0].is_current);
        assert_eq!(view.players[1].reaction.as_deref(), Some("wave"));
    }
}
