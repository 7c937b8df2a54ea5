use std::{io, time::Duration};

use shared::{domain::CommandKind, protocol::ChatEvent};
use thiserror::Error;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader},
    net::{
        tcp::{OwnedReadHalf, OwnedWriteHalf},
        TcpStream,
    },
    sync::mpsc,
};
use tracing::{debug, info, warn};

pub mod activity;
mod replay;

pub use activity::ActivityCounter;
pub use replay::ReplaySummary;

pub const DIAL_ATTEMPTS: usize = 5;
pub const DIAL_BACKOFF: Duration = Duration::from_secs(1);
const CAPABILITY_REQUEST: &str = "CAP REQ :twitch.tv/tags twitch.tv/commands";

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("failed to dial {address} after {attempts} attempts: {source}")]
    Dial {
        address: String,
        attempts: usize,
        source: io::Error,
    },
    #[error("failed to send {command} to relay: {source}")]
    Write { command: String, source: io::Error },
    #[error("failed to read from relay: {0}")]
    Read(#[source] io::Error),
    #[error("relay closed the connection")]
    Closed,
    #[error("event queue closed")]
    QueueClosed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaySettings {
    pub address: String,
    pub user: String,
    pub password: Option<String>,
    /// Channel name without the leading `#`.
    pub channel: String,
}

impl RelaySettings {
    pub fn channel_target(&self) -> String {
        format!("#{}", self.channel)
    }
}

/// Producer end of the event queue. Sending waits while the queue is full.
#[derive(Clone)]
pub struct Ingress {
    events: mpsc::Sender<ChatEvent>,
    activity: ActivityCounter,
}

impl Ingress {
    pub fn new(events: mpsc::Sender<ChatEvent>, activity: ActivityCounter) -> Self {
        Self { events, activity }
    }

    pub async fn forward(&self, event: ChatEvent) -> Result<(), RelayError> {
        self.events
            .send(event)
            .await
            .map_err(|_| RelayError::QueueClosed)?;
        self.activity.bump();
        Ok(())
    }
}

/// TCP connect with a fixed pause between attempts. Returns the last error
/// once `max_attempts` dials have failed.
pub async fn reliable_dial(
    address: &str,
    max_attempts: usize,
    backoff: Duration,
) -> Result<TcpStream, RelayError> {
    let mut attempts = 0;
    loop {
        match TcpStream::connect(address).await {
            Ok(stream) => return Ok(stream),
            Err(source) => {
                attempts += 1;
                if attempts >= max_attempts {
                    return Err(RelayError::Dial {
                        address: address.to_string(),
                        attempts,
                        source,
                    });
                }
                warn!(address, attempts, error = %source, "dial failed, retrying");
                tokio::time::sleep(backoff).await;
            }
        }
    }
}

/// One session with the chat relay.
///
/// Handles the handshake and keepalive itself and hands channel chat and
/// notices to the [`Ingress`]. There is no reconnect: once the session is up,
/// any failure ends [`RelayClient::run`].
pub struct RelayClient<R, W> {
    reader: R,
    writer: W,
    settings: RelaySettings,
    ingress: Ingress,
}

impl RelayClient<BufReader<OwnedReadHalf>, OwnedWriteHalf> {
    pub async fn connect(settings: RelaySettings, ingress: Ingress) -> Result<Self, RelayError> {
        info!(address = %settings.address, "connecting");
        let stream = reliable_dial(&settings.address, DIAL_ATTEMPTS, DIAL_BACKOFF).await?;
        let (reader, writer) = stream.into_split();

        let mut client = Self::new(BufReader::new(reader), writer, settings, ingress);
        client.register().await?;
        Ok(client)
    }
}

impl<R, W> RelayClient<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W, settings: RelaySettings, ingress: Ingress) -> Self {
        Self {
            reader,
            writer,
            settings,
            ingress,
        }
    }

    pub fn settings(&self) -> &RelaySettings {
        &self.settings
    }

    pub async fn register(&mut self) -> Result<(), RelayError> {
        if let Some(password) = self.settings.password.clone() {
            self.send_line(&format!("PASS {password}")).await?;
        }
        let user = self.settings.user.clone();
        self.send_line(&format!("NICK {user}")).await?;
        self.send_line(&format!("USER {user} 0 * :{user}")).await
    }

    /// Reacts to one event from the relay or from a replay file.
    pub async fn handle_event(&mut self, event: ChatEvent) -> Result<(), RelayError> {
        debug!(message = %event, "received message");
        let channel = self.settings.channel.clone();

        match event.kind() {
            CommandKind::Welcome => {
                let join = format!("JOIN {}", self.settings.channel_target());
                self.send_line(CAPABILITY_REQUEST).await?;
                self.send_line(&join).await?;
                info!(%channel, "knock knock");
            }
            CommandKind::RoomState if event.trailing().strip_prefix('#') == Some(channel.as_str()) => {
                info!(%channel, "party time");
            }
            CommandKind::Ping => {
                let pong = format!("PONG :{}", event.trailing());
                self.send_line(&pong).await?;
            }
            CommandKind::ChatMessage | CommandKind::Notice if event.is_from_channel() => {
                self.ingress.forward(event).await?;
            }
            _ => {}
        }
        Ok(())
    }

    pub async fn run(mut self) -> Result<(), RelayError> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = self
                .reader
                .read_until(b'\n', &mut buf)
                .await
                .map_err(RelayError::Read)?;
            if read == 0 {
                return Err(RelayError::Closed);
            }

            let raw = String::from_utf8_lossy(&buf);
            let line = raw.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                continue;
            }
            match ChatEvent::parse(line) {
                Ok(event) => self.handle_event(event).await?,
                Err(error) => warn!(%error, line, "invalid message from relay, skipping"),
            }
        }
    }

    async fn send_line(&mut self, line: &str) -> Result<(), RelayError> {
        let write_error = |source| RelayError::Write {
            command: line.split(' ').next().unwrap_or_default().to_string(),
            source,
        };
        self.writer
            .write_all(format!("{line}\r\n").as_bytes())
            .await
            .map_err(write_error)?;
        self.writer.flush().await.map_err(write_error)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
