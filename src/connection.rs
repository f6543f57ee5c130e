use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};
use url::Url;

use cardroom_core::{decode, encode, ClientMsg, ServerMsg};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    Connected,
    Message(ServerMsg),
    Disconnected,
}

pub struct ConnectionHandle {
    outbound: mpsc::UnboundedSender<ClientMsg>,
    task: JoinHandle<()>,
}

impl ConnectionHandle {
    pub fn spawn(
        url: Url,
        reconnect_delay: Duration,
        events: mpsc::UnboundedSender<ConnectionEvent>,
    ) -> Self {
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_connection(url, reconnect_delay, outbound_rx, events));
        Self { outbound, task }
    }

    pub fn send(&self, msg: ClientMsg) {
        if self.outbound.send(msg).is_err() {
            debug!("connection task gone, message dropped");
        }
    }

    pub fn close(self) {
        self.task.abort();
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run_connection(
    url: Url,
    reconnect_delay: Duration,
    mut outbound: mpsc::UnboundedReceiver<ClientMsg>,
    events: mpsc::UnboundedSender<ConnectionEvent>,
) {
    let mut attempt: u64 = 0;
    loop {
        attempt = attempt.saturating_add(1);
        match connect_async(url.as_str()).await {
            Ok((ws, _response)) => {
                attempt = 0;
                let mut stale = 0usize;
                while outbound.try_recv().is_ok() {
                    stale += 1;
                }
                if stale > 0 {
                    debug!(stale, "dropped messages queued while offline");
                }
                info!(url = %url, "websocket connected");
                if events.send(ConnectionEvent::Connected).is_err() {
                    return;
                }
                match pump(ws, &mut outbound, &events).await {
                    PumpExit::Lost(reason) => {
                        warn!(url = %url, %reason, "websocket closed");
                        if events.send(ConnectionEvent::Disconnected).is_err() {
                            return;
                        }
                    }
                    PumpExit::Shutdown => return,
                }
            }
            Err(err) => {
                warn!(url = %url, attempt, %err, "websocket connect failed");
            }
        }
        tokio::time::sleep(reconnect_delay).await;
    }
}

enum PumpExit {
    Lost(String),
    Shutdown,
}

async fn pump(
    ws: WsStream,
    outbound: &mut mpsc::UnboundedReceiver<ClientMsg>,
    events: &mpsc::UnboundedSender<ConnectionEvent>,
) -> PumpExit {
    let (mut write, mut read) = ws.split();
    loop {
        tokio::select! {
            msg = outbound.recv() => {
                let Some(msg) = msg else {
                    let _ = write.send(Message::Close(None)).await;
                    return PumpExit::Shutdown;
                };
                let Some(text) = encode(&msg) else {
                    warn!(kind = msg.kind(), "failed to encode message");
                    continue;
                };
                debug!(kind = msg.kind(), "sending");
                if let Err(err) = write.send(Message::Text(text.into())).await {
                    return PumpExit::Lost(err.to_string());
                }
            }
            frame = read.next() => {
                let message = match frame {
                    Some(Ok(message)) => message,
                    Some(Err(err)) => return PumpExit::Lost(err.to_string()),
                    None => return PumpExit::Lost("stream ended".to_string()),
                };
                match message {
                    Message::Text(text) => match decode::<ServerMsg>(text.as_str()) {
                        Some(msg) => {
                            debug!(kind = msg.kind(), "received");
                            if events.send(ConnectionEvent::Message(msg)).is_err() {
                                return PumpExit::Shutdown;
                            }
                        }
                        None => warn!(len = text.len(), "dropping malformed frame"),
                    },
                    Message::Close(frame) => return PumpExit::Lost(format!("{frame:?}")),
                    _ => {}
                }
            }
        }
    }
}
