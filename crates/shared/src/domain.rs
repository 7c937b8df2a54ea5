use std::fmt;

use serde::{Deserialize, Serialize};

/// The slice of relay commands the bot reacts to. Anything else is carried
/// through as [`CommandKind::Other`] and ignored downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    /// `001`, sent once registration completes.
    Welcome,
    /// `ROOMSTATE`, emitted when a channel join succeeds.
    RoomState,
    /// `PRIVMSG`, a regular chat line.
    ChatMessage,
    /// `USERNOTICE`, subscriptions, resubs, gifts and similar account events.
    Notice,
    Ping,
    Other(String),
}

impl CommandKind {
    pub fn from_command(command: &str) -> Self {
        match command {
            "001" => Self::Welcome,
            "ROOMSTATE" => Self::RoomState,
            "PRIVMSG" => Self::ChatMessage,
            "USERNOTICE" => Self::Notice,
            "PING" => Self::Ping,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Message source, `name[!user][@host]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prefix {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

impl Prefix {
    pub fn parse(raw: &str) -> Self {
        let (rest, host) = match raw.split_once('@') {
            Some((rest, host)) => (rest, Some(host.to_string())),
            None => (raw, None),
        };
        let (name, user) = match rest.split_once('!') {
            Some((name, user)) => (name, Some(user.to_string())),
            None => (rest, None),
        };

        Self {
            name: name.to_string(),
            user,
            host,
        }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(user) = &self.user {
            write!(f, "!{user}")?;
        }
        if let Some(host) = &self.host {
            write!(f, "@{host}")?;
        }
        Ok(())
    }
}
