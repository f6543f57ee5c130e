use std::future;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{interval_at, sleep_until, Instant, Interval, MissedTickBehavior};
use tracing::{debug, info};
use url::Url;

use crate::config::ClientConfig;
use crate::connection::{ConnectionEvent, ConnectionHandle};
use crate::dispatcher::Intent;
use crate::error::ClientError;
use crate::identity::IdentityStore;
use crate::session::{Session, SessionEvent};
use crate::view::TableView;

const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Intent(Intent),
    ToggleCard(String),
    ClearSelection,
    SetName(String),
    SetFace(Option<String>),
    Leave,
    Shutdown,
}

type CommandEnvelope = (Command, oneshot::Sender<Result<(), ClientError>>);

#[derive(Clone)]
pub struct ClientHandle {
    commands: mpsc::UnboundedSender<CommandEnvelope>,
    view: watch::Receiver<TableView>,
}

impl ClientHandle {
    pub async fn execute(&self, command: Command) -> Result<(), ClientError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send((command, reply))
            .map_err(|_| ClientError::Stopped)?;
        response.await.map_err(|_| ClientError::Stopped)?
    }

    pub async fn intent(&self, intent: Intent) -> Result<(), ClientError> {
        self.execute(Command::Intent(intent)).await
    }

    pub async fn shutdown(&self) {
        let _ = self.execute(Command::Shutdown).await;
    }

    pub fn view(&self) -> TableView {
        self.view.borrow().clone()
    }

    pub fn watch_view(&self) -> watch::Receiver<TableView> {
        self.view.clone()
    }
}

pub fn start(
    config: ClientConfig,
    identity: IdentityStore,
) -> Result<(ClientHandle, mpsc::UnboundedReceiver<SessionEvent>), ClientError> {
    let url = Url::parse(&config.ws_url)?;
    let session = Session::new(&config, identity);
    let (conn_tx, conn_rx) = mpsc::unbounded_channel();
    let connection = ConnectionHandle::spawn(url, config.reconnect_delay, conn_tx);
    let (commands, command_rx) = mpsc::unbounded_channel();
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (view_tx, view_rx) = watch::channel(session.view(Instant::now()));
    let driver = Driver {
        session,
        connection,
        tick_interval: config.tick_interval.max(MIN_TICK_INTERVAL),
        events: events_tx,
        view: view_tx,
    };
    tokio::spawn(driver.run(conn_rx, command_rx));
    Ok((
        ClientHandle {
            commands,
            view: view_rx,
        },
        events_rx,
    ))
}

struct Driver {
    session: Session,
    connection: ConnectionHandle,
    tick_interval: Duration,
    events: mpsc::UnboundedSender<SessionEvent>,
    view: watch::Sender<TableView>,
}

impl Driver {
    async fn run(
        mut self,
        mut conn_rx: mpsc::UnboundedReceiver<ConnectionEvent>,
        mut command_rx: mpsc::UnboundedReceiver<CommandEnvelope>,
    ) {
        let mut ticker: Option<Interval> = None;
        let mut ticker_generation = self.session.timer().generation();
        loop {
            let rejoin_at = self.session.rejoin_deadline();
            let reaction_at = self.session.reaction_deadline();
            tokio::select! {
                event = conn_rx.recv() => match event {
                    Some(ConnectionEvent::Connected) => self.session.on_connected(Instant::now()),
                    Some(ConnectionEvent::Message(msg)) => {
                        self.session.on_server_msg(msg, Instant::now());
                    }
                    Some(ConnectionEvent::Disconnected) => self.session.on_disconnected(),
                    None => break,
                },
                command = command_rx.recv() => {
                    let Some((command, reply)) = command else {
                        break;
                    };
                    if command == Command::Shutdown {
                        let _ = reply.send(Ok(()));
                        break;
                    }
                    let _ = reply.send(self.apply(command));
                }
                _ = next_tick(&mut ticker) => self.session.on_tick(),
                _ = sleep_until_some(rejoin_at) => self.session.poll_rejoin(Instant::now()),
                _ = sleep_until_some(reaction_at) => self.session.sweep_reactions(Instant::now()),
            }

            // Replace the interval in the same turn the timer restarted, so a
            // stale tick can never reach the new countdown.
            let generation = self.session.timer().generation();
            if generation != ticker_generation {
                ticker_generation = generation;
                ticker = self.session.timer().is_running().then(|| {
                    let mut interval =
                        interval_at(Instant::now() + self.tick_interval, self.tick_interval);
                    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                    interval
                });
            } else if !self.session.timer().is_running() {
                ticker = None;
            }
            self.flush();
        }
        info!("client loop stopped");
        self.connection.close();
    }

    fn apply(&mut self, command: Command) -> Result<(), ClientError> {
        debug!(?command, "command");
        match command {
            Command::Intent(intent) => self.session.dispatch(intent),
            Command::ToggleCard(card_id) => {
                self.session.toggle_card(&card_id);
                Ok(())
            }
            Command::ClearSelection => {
                self.session.clear_selection();
                Ok(())
            }
            Command::SetName(name) => Ok(self.session.set_name(&name)?),
            Command::SetFace(face) => Ok(self.session.set_face(face.as_deref())?),
            Command::Leave => Ok(self.session.leave()?),
            Command::Shutdown => Ok(()),
        }
    }

    fn flush(&mut self) {
        for msg in self.session.take_outbox() {
            self.connection.send(msg);
        }
        for event in self.session.take_events() {
            let _ = self.events.send(event);
        }
        self.view.send_replace(self.session.view(Instant::now()));
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => future::pending().await,
    }
}

async fn sleep_until_some(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => future::pending().await,
    }
}
