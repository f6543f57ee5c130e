use std::mem;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use cardroom_core::{ClientMsg, GameSnapshot, ServerMsg};

use crate::config::ClientConfig;
use crate::dispatcher::{build_message, DispatchContext, Intent};
use crate::error::{ClientError, StoreError};
use crate::identity::{IdentityStore, PlayerIdentity};
use crate::reactions::ReactionTracker;
use crate::snapshot_store::SnapshotStore;
use crate::turn_timer::{TimerSync, TurnTimer};
use crate::view::{self, TableView, ViewInputs};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Connected,
    Disconnected,
    StateChanged { round_started: bool, turn_changed: bool },
    Reaction { target_id: String, gif_id: String },
    ReactionExpired { target_id: String },
    TimerTick { remaining: u32 },
    TimedOut { notified: bool },
    Rejected { message: String },
    Left,
}

pub struct Session {
    identity: IdentityStore,
    snapshots: SnapshotStore,
    timer: TurnTimer,
    reactions: ReactionTracker,
    rejoin_delay: Duration,
    connected: bool,
    rejoin_at: Option<Instant>,
    // Pushes for this room are ignored until the player creates or joins again.
    left_room: Option<String>,
    outbox: Vec<ClientMsg>,
    events: Vec<SessionEvent>,
}

impl Session {
    pub fn new(config: &ClientConfig, identity: IdentityStore) -> Self {
        Self {
            identity,
            snapshots: SnapshotStore::new(),
            timer: TurnTimer::new(config.turn_ticks),
            reactions: ReactionTracker::new(config.reaction_duration),
            rejoin_delay: config.rejoin_delay,
            connected: false,
            rejoin_at: None,
            left_room: None,
            outbox: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn identity(&self) -> &PlayerIdentity {
        self.identity.identity()
    }

    pub fn snapshot(&self) -> Option<&Arc<GameSnapshot>> {
        self.snapshots.current()
    }

    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    pub fn timer(&self) -> &TurnTimer {
        &self.timer
    }

    pub fn reactions(&self) -> &ReactionTracker {
        &self.reactions
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn rejoin_deadline(&self) -> Option<Instant> {
        self.rejoin_at
    }

    pub fn reaction_deadline(&self) -> Option<Instant> {
        self.reactions.next_expiry()
    }

    pub fn take_outbox(&mut self) -> Vec<ClientMsg> {
        mem::take(&mut self.outbox)
    }

    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        mem::take(&mut self.events)
    }

    pub fn on_connected(&mut self, now: Instant) {
        self.connected = true;
        self.events.push(SessionEvent::Connected);
        match self.identity.saved_session() {
            Some(saved) => {
                debug!(room_id = %saved.room_id, delay_ms = self.rejoin_delay.as_millis() as u64, "rejoin scheduled");
                self.rejoin_at = Some(now + self.rejoin_delay);
            }
            None => self.rejoin_at = None,
        }
    }

    pub fn on_disconnected(&mut self) {
        if !self.connected {
            return;
        }
        self.connected = false;
        self.rejoin_at = None;
        self.events.push(SessionEvent::Disconnected);
    }

    pub fn poll_rejoin(&mut self, now: Instant) {
        let Some(at) = self.rejoin_at else {
            return;
        };
        if now < at {
            return;
        }
        self.rejoin_at = None;
        if !self.connected {
            return;
        }
        let Some(saved) = self.identity.saved_session() else {
            return;
        };
        info!(room_id = %saved.room_id, name = %saved.name, "rejoining room");
        self.outbox.push(ClientMsg::RejoinRoom {
            room_id: saved.room_id,
            name: saved.name,
            player_id: self.identity.player_id().to_string(),
        });
    }

    pub fn on_server_msg(&mut self, msg: ServerMsg, now: Instant) {
        match msg {
            ServerMsg::GameState(snapshot) => self.apply_snapshot(snapshot),
            ServerMsg::RejoinSuccess(snapshot) => {
                info!(room_id = %snapshot.room_id, "rejoined room");
                self.apply_snapshot(snapshot);
            }
            ServerMsg::GifPlay { target_id, gif_id } => {
                debug!(%target_id, %gif_id, "reaction received");
                self.reactions.record(&target_id, &gif_id, now);
                self.events.push(SessionEvent::Reaction { target_id, gif_id });
            }
            ServerMsg::Error { message } => {
                warn!(%message, "server rejected action");
                self.events.push(SessionEvent::Rejected { message });
            }
        }
    }

    fn apply_snapshot(&mut self, snapshot: GameSnapshot) {
        if self.left_room.as_deref() == Some(snapshot.room_id.as_str()) {
            debug!(room_id = %snapshot.room_id, "ignoring push for a room we left");
            return;
        }
        let viewer = view::viewer_id(&snapshot, self.identity.player_id()).to_string();
        let room_id = snapshot.room_id.clone();
        let started = snapshot.started;
        let current = snapshot.current_player_id().map(str::to_string);
        let is_host = snapshot.is_host(&viewer);

        let change = self.snapshots.apply(snapshot, &viewer);
        self.identity.remember_room(&room_id);
        if self.timer.sync(started, current.as_deref()) == TimerSync::Restarted {
            debug!(current = ?current, ticks = self.timer.duration(), "turn timer restarted");
        }
        debug!(%room_id, started, is_host, purged = change.selection_purged, "snapshot applied");
        self.events.push(SessionEvent::StateChanged {
            round_started: change.round_started,
            turn_changed: change.turn_changed,
        });
    }

    pub fn on_tick(&mut self) {
        let my_turn = self.is_my_turn();
        let Some(expiry) = self.timer.tick(my_turn) else {
            if self.timer.is_running() {
                self.events.push(SessionEvent::TimerTick {
                    remaining: self.timer.remaining(),
                });
            }
            return;
        };
        let mut notified = false;
        if expiry.notify_server {
            match self.snapshots.current() {
                Some(snapshot) if self.connected => {
                    info!(room_id = %snapshot.room_id, "turn timed out");
                    self.outbox.push(ClientMsg::TurnTimeout {
                        room_id: snapshot.room_id.clone(),
                    });
                    notified = true;
                }
                _ => warn!("turn timed out while offline"),
            }
        }
        self.events.push(SessionEvent::TimedOut { notified });
    }

    pub fn sweep_reactions(&mut self, now: Instant) {
        for target_id in self.reactions.sweep(now) {
            self.events.push(SessionEvent::ReactionExpired { target_id });
        }
    }

    pub fn dispatch(&mut self, intent: Intent) -> Result<(), ClientError> {
        let snapshot = self.snapshots.current().cloned();
        let msg = build_message(
            &intent,
            &DispatchContext {
                connected: self.connected,
                identity: self.identity.identity(),
                snapshot: snapshot.as_deref(),
                selection: self.snapshots.selection(),
            },
        )?;
        debug!(kind = msg.kind(), "dispatching");
        if intent.clears_selection() {
            self.snapshots.clear_selection();
        }
        if matches!(msg, ClientMsg::CreateRoom { .. } | ClientMsg::JoinRoom { .. }) {
            self.left_room = None;
        }
        self.outbox.push(msg);
        Ok(())
    }

    pub fn toggle_card(&mut self, card_id: &str) -> bool {
        let Some(snapshot) = self.snapshots.current().cloned() else {
            return false;
        };
        let viewer = view::viewer_id(&snapshot, self.identity.player_id()).to_string();
        self.snapshots.toggle_selection(card_id, &viewer)
    }

    pub fn clear_selection(&mut self) {
        self.snapshots.clear_selection();
    }

    pub fn set_name(&mut self, name: &str) -> Result<(), StoreError> {
        self.identity.set_name(name)?;
        if let Some(snapshot) = self.snapshots.current().cloned() {
            self.identity.remember_room(&snapshot.room_id);
        }
        Ok(())
    }

    pub fn set_face(&mut self, face: Option<&str>) -> Result<(), StoreError> {
        self.identity.set_face(face)
    }

    pub fn leave(&mut self) -> Result<(), StoreError> {
        let left = self
            .snapshots
            .current()
            .map(|snapshot| snapshot.room_id.clone())
            .or_else(|| self.identity.saved_room());
        self.identity.forget_room()?;
        self.left_room = left;
        self.snapshots.clear();
        self.timer.reset();
        self.reactions.clear();
        self.rejoin_at = None;
        self.events.push(SessionEvent::Left);
        Ok(())
    }

    pub fn is_my_turn(&self) -> bool {
        self.snapshots.current().is_some_and(|snapshot| {
            view::is_my_turn(snapshot, view::viewer_id(snapshot, self.identity.player_id()))
        })
    }

    pub fn view(&self, now: Instant) -> TableView {
        let reactions = self.reactions.snapshot(now);
        view::derive(
            self.snapshots.current().map(Arc::as_ref),
            &ViewInputs {
                connected: self.connected,
                local_id: self.identity.player_id(),
                selection: self.snapshots.selection(),
                baseline: self.snapshots.baseline(),
                reactions: &reactions,
                timer_remaining: self.timer.remaining(),
                timer_running: self.timer.is_running(),
            },
        )
    }
}
