use std::path::PathBuf;
use std::time::Duration;

use cardroom::config::DEFAULT_WS_URL;
use cardroom::{
    ClientConfig, ClientHandle, Command, FileStore, IdentityStore, Intent, SessionEvent, TableView,
};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cardroom", version, about = "Terminal client for a cardroom table")]
struct Cli {
    #[arg(long, env = "CARDROOM_WS_URL", default_value = DEFAULT_WS_URL)]
    url: String,
    #[arg(long, env = "CARDROOM_STORE", default_value = "cardroom-store.bin")]
    store: PathBuf,
    /// Display name; overrides the saved one.
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    face: Option<String>,
    #[arg(long, default_value_t = 20)]
    turn_ticks: u32,
    #[arg(long, default_value_t = 1000)]
    tick_ms: u64,
}

const HELP: &str = "\
commands:
  name <name>          set display name
  face <face>          set avatar
  create               create a room
  join <room>          join a room
  start                start the round
  draw | take          draw from deck | take the discard
  select <card-id>...  toggle cards
  clear                clear selection
  drop                 drop selected cards
  close                call close
  gif <player> <gif>   send a reaction
  leave                leave the room and forget it
  show                 print the table
  quit                 exit";

#[derive(Debug, PartialEq, Eq)]
enum Line {
    Commands(Vec<Command>),
    Show,
    Help,
    Quit,
}

fn parse_line(line: &str) -> Result<Line, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(Line::Commands(Vec::new()));
    };
    let rest: Vec<&str> = words.collect();
    let single = |command: Command| -> Result<Line, String> { Ok(Line::Commands(vec![command])) };
    match (head, rest.as_slice()) {
        ("name", [_, ..]) => single(Command::SetName(rest.join(" "))),
        ("face", []) => single(Command::SetFace(None)),
        ("face", [face]) => single(Command::SetFace(Some(face.to_string()))),
        ("create", []) => single(Command::Intent(Intent::CreateRoom)),
        ("join", [room]) => single(Command::Intent(Intent::JoinRoom {
            room_id: room.to_string(),
        })),
        ("start", []) => single(Command::Intent(Intent::StartRound)),
        ("draw", []) => single(Command::Intent(Intent::Draw {
            from_discard: false,
        })),
        ("take", []) => single(Command::Intent(Intent::Draw { from_discard: true })),
        ("select", [_, ..]) => Ok(Line::Commands(
            rest.iter()
                .map(|id| Command::ToggleCard(id.to_string()))
                .collect(),
        )),
        ("clear", []) => single(Command::ClearSelection),
        ("drop", []) => single(Command::Intent(Intent::DropSelected)),
        ("close", []) => single(Command::Intent(Intent::CallClose)),
        ("gif", [target, gif]) => single(Command::Intent(Intent::SendReaction {
            target_id: target.to_string(),
            gif_id: gif.to_string(),
        })),
        ("leave", []) => single(Command::Leave),
        ("show", []) => Ok(Line::Show),
        ("help", []) => Ok(Line::Help),
        ("quit" | "exit", []) => Ok(Line::Quit),
        _ => Err(format!("unrecognized command: {line}")),
    }
}

fn render(view: &TableView) -> String {
    let mut out = String::new();
    let status = if view.connected { "online" } else { "connecting" };
    match view.room_id.as_deref() {
        Some(room) => out.push_str(&format!("room {room} ({status})")),
        None => out.push_str(&format!("no room ({status})")),
    }
    if view.is_host {
        out.push_str(" [host]");
    }
    out.push('\n');
    if !view.started {
        out.push_str("waiting for the round to start\n");
    } else if view.timer_running {
        out.push_str(&format!("turn timer: {}\n", view.timer_remaining));
    }
    for player in &view.players {
        let marker = if player.is_current { ">" } else { " " };
        out.push_str(&format!(
            "{marker} {:<12} score {:>4}  round {:>4}  cards {}",
            player.name, player.score, player.round_points, player.hand_size
        ));
        if let Some(gif) = player.reaction.as_deref() {
            out.push_str(&format!("  [{gif}]"));
        }
        out.push('\n');
    }
    if let Some(top) = view.discard_top.as_ref() {
        out.push_str(&format!("discard: {top}\n"));
    }
    if !view.hand.is_empty() {
        let hand: Vec<String> = view
            .hand
            .iter()
            .map(|card| {
                let mark = if view.selected_cards.iter().any(|sel| sel.id == card.id) {
                    "*"
                } else {
                    ""
                };
                format!("{}={card}{mark}", card.id)
            })
            .collect();
        out.push_str(&format!("hand: {}\n", hand.join(" ")));
    }
    if view.is_my_turn {
        out.push_str(&format!(
            "your turn (drawn: {}, drop: {}, close: {})\n",
            view.has_drawn, view.can_drop, view.can_close
        ));
    }
    if view.close_called {
        out.push_str("close has been called\n");
    }
    out
}

fn describe(event: &SessionEvent) -> Option<String> {
    match event {
        SessionEvent::Connected => Some("connected".to_string()),
        SessionEvent::Disconnected => Some("connection lost, reconnecting".to_string()),
        SessionEvent::Reaction { target_id, gif_id } => Some(format!("{target_id} got {gif_id}")),
        SessionEvent::TimedOut { notified: true } => Some("your turn timed out".to_string()),
        SessionEvent::Rejected { message } => Some(format!("server: {message}")),
        SessionEvent::Left => Some("left the room".to_string()),
        _ => None,
    }
}

async fn run_line(handle: &ClientHandle, line: Line) -> bool {
    match line {
        Line::Commands(commands) => {
            for command in commands {
                if let Err(err) = handle.execute(command).await {
                    println!("{err}");
                    break;
                }
            }
        }
        Line::Show => print!("{}", render(&handle.view())),
        Line::Help => println!("{HELP}"),
        Line::Quit => return false,
    }
    true
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = FileStore::open(&cli.store)?;
    let mut identity = IdentityStore::load_or_create(Box::new(store))?;
    if let Some(name) = cli.name.as_deref() {
        identity.set_name(name)?;
    }
    if let Some(face) = cli.face.as_deref() {
        identity.set_face(Some(face))?;
    }
    if identity.identity().name.is_empty() {
        println!("no display name yet; set one with `name <name>`");
    }

    let config = ClientConfig::new(cli.url)
        .with_turn_ticks(cli.turn_ticks)
        .with_tick_interval(Duration::from_millis(cli.tick_ms));
    let (handle, mut events) = cardroom::start(config, identity)?;
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match parse_line(&line) {
                    Ok(parsed) => {
                        if !run_line(&handle, parsed).await {
                            break;
                        }
                    }
                    Err(err) => println!("{err} (try `help`)"),
                }
            }
            event = events.recv() => {
                let Some(event) = event else {
                    warn!("client loop ended");
                    break;
                };
                if let Some(text) = describe(&event) {
                    println!("{text}");
                }
                if matches!(event, SessionEvent::StateChanged { .. }) {
                    print!("{}", render(&handle.view()));
                }
            }
        }
    }

    handle.shutdown().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_select_into_one_toggle_per_card() {
        assert_eq!(
            parse_line("select c1 c4"),
            Ok(Line::Commands(vec![
                Command::ToggleCard("c1".to_string()),
                Command::ToggleCard("c4".to_string()),
            ]))
        );
    }

    #[test]
    fn parses_draw_variants_and_rejects_garbage() {
        assert_eq!(
            parse_line("take"),
            Ok(Line::Commands(vec![Command::Intent(Intent::Draw {
                from_discard: true
            })]))
        );
        assert_eq!(parse_line("  "), Ok(Line::Commands(Vec::new())));
        assert!(parse_line("join").is_err());
        assert!(parse_line("dance").is_err());
    }

    #[test]
    fn render_shows_idle_table() {
        let view = TableView::default();
        let text = render(&view);
        assert!(text.starts_with("no room (connecting)"));
        assert!(text.contains("waiting for the round to start"));
    }
}
