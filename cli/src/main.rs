use std::time::Duration;

use ceremony::{Face, Format, SequenceStrategy, SessionView, Side, Step, Team, Turn, generate_sequence};
use clap::{Args, Parser, Subcommand, ValueEnum};
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("websocket connect failed: {0}")]
    WsConnect(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("websocket closed")]
    WsClosed,
    #[error("timed out waiting for websocket frame")]
    Timeout,
    #[error("server returned {status}: {message}")]
    ServerError { status: String, message: String },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error(transparent)]
    Ceremony(#[from] ceremony::CeremonyError),
}

#[derive(Parser, Debug)]
#[command(name = "stratbook-cli", about = "Map ban/pick ceremony client")]
struct Cli {
    #[arg(long, env = "STRATBOOK_BASE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check the server is up.
    Ping,
    /// Print a ban/pick sequence without contacting the server.
    Sequence {
        #[arg(long)]
        format: Format,
        #[arg(long)]
        pool: usize,
        #[arg(long, default_value = "0")]
        first: Team,
        #[arg(long, default_value = "scaling")]
        strategy: SequenceStrategy,
    },
    /// List competitive maps from the server's catalog.
    Maps,
    /// Create a ceremony; it starts at the coin toss.
    Create(SetupArgs),
    /// Start a ceremony that was reset.
    Start {
        id: Uuid,
        #[command(flatten)]
        setup: SetupArgs,
    },
    Show {
        id: Uuid,
    },
    Delete {
        id: Uuid,
    },
    /// Nominate the team that calls the coin (0 or 1).
    Caller {
        id: Uuid,
        team: Team,
    },
    Toss {
        id: Uuid,
        call: Face,
    },
    /// Toss winner chooses to act first or second.
    Order {
        id: Uuid,
        #[arg(value_enum)]
        choice: OrderChoice,
    },
    /// Ban or pick a map, whichever the current step asks for.
    Act {
        id: Uuid,
        map: String,
    },
    Side {
        id: Uuid,
        map: String,
        side: Side,
    },
    Reset {
        id: Uuid,
    },
    Summary {
        id: Uuid,
    },
    /// Stream state changes over the WebSocket until the ceremony completes.
    Watch {
        id: Uuid,
        /// Print raw frames instead of turn prompts.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[derive(Args, Debug, Clone)]
struct SetupArgs {
    #[arg(long)]
    format: Format,
    #[arg(long)]
    strategy: Option<SequenceStrategy>,
    #[arg(long)]
    team_a: Option<String>,
    #[arg(long)]
    team_b: Option<String>,
    #[arg(long, value_enum, default_value = "competitive")]
    pool: PoolArg,
    /// Custom pool, in order. Overrides `--pool`.
    #[arg(long = "map")]
    maps: Vec<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum PoolArg {
    Competitive,
    All,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OrderChoice {
    First,
    Second,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let api = Api::new(&cli.base_url);

    match cli.command {
        Command::Ping => {
            api.get("/healthz").await?;
            println!("ok");
            Ok(())
        }
        Command::Sequence { format, pool, first, strategy } => {
            let steps = generate_sequence(strategy, format, pool, first)?;
            print!("{}", render_sequence(&steps));
            Ok(())
        }
        Command::Maps => {
            let maps = api.get("/api/maps").await?;
            print_json(&maps)
        }
        Command::Create(setup) => print_json(&api.post("/api/ceremonies", setup_body(&setup)).await?),
        Command::Start { id, setup } => {
            print_view(&api.post(&format!("/api/ceremonies/{id}/start"), setup_body(&setup)).await?)
        }
        Command::Show { id } => print_view(&api.get(&format!("/api/ceremonies/{id}")).await?),
        Command::Delete { id } => {
            api.delete(&format!("/api/ceremonies/{id}")).await?;
            println!("deleted {id}");
            Ok(())
        }
        Command::Caller { id, team } => {
            print_view(&api.post(&format!("/api/ceremonies/{id}/caller"), json!({ "team": team })).await?)
        }
        Command::Toss { id, call } => {
            let resp = api.post(&format!("/api/ceremonies/{id}/toss"), json!({ "call": call })).await?;
            if let Some(toss) = resp.get("toss") {
                println!("drawn {}, winner team {}", toss["drawn"], toss["winner"]);
            }
            print_view(&resp["view"])
        }
        Command::Order { id, choice } => {
            let body = json!({ "go_first": choice == OrderChoice::First });
            print_view(&api.post(&format!("/api/ceremonies/{id}/order"), body).await?["view"])
        }
        Command::Act { id, map } => {
            print_view(&api.post(&format!("/api/ceremonies/{id}/actions"), json!({ "map": map })).await?["view"])
        }
        Command::Side { id, map, side } => {
            let body = json!({ "map": map, "side": side });
            print_view(&api.post(&format!("/api/ceremonies/{id}/side"), body).await?["view"])
        }
        Command::Reset { id } => print_view(&api.post(&format!("/api/ceremonies/{id}/reset"), json!({})).await?),
        Command::Summary { id } => print_json(&api.get(&format!("/api/ceremonies/{id}/summary")).await?),
        Command::Watch { id, json } => watch(&cli.base_url, id, json).await,
    }
}

// =============================================================================
// HTTP
// =============================================================================

struct Api {
    http: reqwest::Client,
    base_url: String,
}

impl Api {
    fn new(base_url: &str) -> Self {
        Self { http: reqwest::Client::new(), base_url: base_url.trim_end_matches('/').to_owned() }
    }

    async fn get(&self, path: &str) -> Result<Value, CliError> {
        self.send(reqwest::Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, CliError> {
        self.send(reqwest::Method::POST, path, Some(body)).await
    }

    async fn delete(&self, path: &str) -> Result<Value, CliError> {
        self.send(reqwest::Method::DELETE, path, None).await
    }

    async fn send(&self, method: reqwest::Method, path: &str, body: Option<Value>) -> Result<Value, CliError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, %url, "request");

        let request = self.http.request(method, &url);
        let request = if let Some(json) = body { request.json(&json) } else { request };

        let response = request.send().await?;
        let status = response.status();
        let value = response.json::<Value>().await.unwrap_or(Value::Null);

        if !status.is_success() {
            return Err(CliError::ServerError { status: format!("HTTP {}", status.as_u16()), message: error_message(&value) });
        }
        Ok(value)
    }
}

fn setup_body(setup: &SetupArgs) -> Value {
    let pool = if !setup.maps.is_empty() {
        json!({ "kind": "custom", "maps": setup.maps })
    } else if setup.pool == PoolArg::All {
        json!({ "kind": "all" })
    } else {
        json!({ "kind": "competitive" })
    };
    json!({
        "format": setup.format,
        "strategy": setup.strategy,
        "team_a": setup.team_a,
        "team_b": setup.team_b,
        "pool": pool,
    })
}

/// `code: message` from an API error body, or the raw body.
fn error_message(body: &Value) -> String {
    match (body.get("code").and_then(Value::as_str), body.get("message").and_then(Value::as_str)) {
        (Some(code), Some(message)) => format!("{code}: {message}"),
        _ => body.to_string(),
    }
}

// =============================================================================
// WEBSOCKET
// =============================================================================

fn ws_url(base_url: &str, id: Uuid) -> Result<String, CliError> {
    let base_url = base_url.trim_end_matches('/');
    if let Some(rest) = base_url.strip_prefix("http://") {
        return Ok(format!("ws://{rest}/api/ws?ceremony={id}"));
    }
    if let Some(rest) = base_url.strip_prefix("https://") {
        return Ok(format!("wss://{rest}/api/ws?ceremony={id}"));
    }

    Err(CliError::InvalidBaseUrl(base_url.to_owned()))
}

async fn watch(base_url: &str, id: Uuid, raw: bool) -> Result<(), CliError> {
    let url = ws_url(base_url, id)?;
    let (mut stream, _) = connect_async(url).await.map_err(|e| CliError::WsConnect(Box::new(e)))?;

    loop {
        let frame = recv_next(&mut stream, Duration::from_secs(300)).await?;
        if raw {
            println!("{}", serde_json::to_string(&frame)?);
        }
        let syscall = frame["syscall"].as_str().unwrap_or_default();
        match syscall {
            "ceremony:closed" => {
                if !raw {
                    println!("ceremony closed");
                }
                break;
            }
            "session:connected" | "ceremony:state" => {
                let view: SessionView = serde_json::from_value(frame["data"]["view"].clone())?;
                if !raw {
                    println!("{}", describe(&view));
                }
                if view.complete {
                    break;
                }
            }
            _ => {}
        }
    }

    let _ = stream.send(Message::Close(None)).await;
    Ok(())
}

async fn recv_next(
    stream: &mut tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>,
    wait: Duration,
) -> Result<Value, CliError> {
    loop {
        let next = tokio::time::timeout(wait, stream.next()).await.map_err(|_| CliError::Timeout)?;
        let Some(msg) = next else {
            return Err(CliError::WsClosed);
        };
        match msg.map_err(|e| CliError::WsConnect(Box::new(e)))? {
            Message::Text(text) => return Ok(serde_json::from_str(text.as_str())?),
            Message::Close(_) => return Err(CliError::WsClosed),
            _ => {}
        }
    }
}

// =============================================================================
// OUTPUT
// =============================================================================

fn render_sequence(steps: &[Step]) -> String {
    steps.iter().enumerate().map(|(i, step)| format!("{:>2}. {step}\n", i + 1)).collect()
}

/// One-line prompt for the current stage or turn.
fn describe(view: &SessionView) -> String {
    let names = view.teams.clone().unwrap_or_default();
    match &view.turn {
        Some(Turn::Complete) => {
            let picks: Vec<String> = view
                .maps
                .iter()
                .filter(|m| m.side.is_some())
                .map(|m| format!("{} ({})", m.name, m.side.map(|s| s.to_string()).unwrap_or_default()))
                .collect();
            format!("complete: {}", picks.join(", "))
        }
        Some(turn) => turn.describe(&names),
        None => view.stage.to_string(),
    }
}

fn print_view(value: &Value) -> Result<(), CliError> {
    let view: SessionView = serde_json::from_value(value.clone())?;
    println!("{}", describe(&view));
    print_json(value)
}

fn print_json(value: &Value) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
