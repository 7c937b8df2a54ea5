use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    domain::{CommandKind, Prefix},
    error::ParseError,
};

/// One line from the chat relay: `[@tags ][:prefix ]COMMAND[ params][ :trailing]`.
///
/// The trailing parameter, when present, is stored as the last entry of
/// `params`, so [`ChatEvent::trailing`] works the same whether or not the
/// sender used the `:` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEvent {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<Prefix>,
    pub command: String,
    #[serde(default)]
    pub params: Vec<String>,
}

impl ChatEvent {
    pub fn new(command: impl Into<String>, params: Vec<String>) -> Self {
        let command: String = command.into();
        Self {
            tags: BTreeMap::new(),
            prefix: None,
            command: command.to_ascii_uppercase(),
            params,
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return Err(ParseError::Empty);
        }
        let missing_command = || ParseError::MissingCommand {
            line: line.to_string(),
        };

        let mut rest = line;
        let mut tags = BTreeMap::new();
        if let Some(stripped) = rest.strip_prefix('@') {
            let (raw_tags, remainder) = stripped.split_once(' ').ok_or_else(missing_command)?;
            tags = parse_tags(raw_tags);
            rest = remainder.trim_start_matches(' ');
        }

        let mut prefix = None;
        if let Some(stripped) = rest.strip_prefix(':') {
            let (raw_prefix, remainder) = stripped.split_once(' ').ok_or_else(missing_command)?;
            prefix = Some(Prefix::parse(raw_prefix));
            rest = remainder.trim_start_matches(' ');
        }

        let (command, mut rest) = rest.split_once(' ').unwrap_or((rest, ""));
        if command.is_empty() {
            return Err(missing_command());
        }
        if !command.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ParseError::InvalidCommand {
                command: command.to_string(),
            });
        }

        let mut params = Vec::new();
        loop {
            rest = rest.trim_start_matches(' ');
            if rest.is_empty() {
                break;
            }
            if let Some(trailing) = rest.strip_prefix(':') {
                params.push(trailing.to_string());
                break;
            }
            match rest.split_once(' ') {
                Some((param, remainder)) => {
                    params.push(param.to_string());
                    rest = remainder;
                }
                None => {
                    params.push(rest.to_string());
                    break;
                }
            }
        }

        Ok(Self {
            tags,
            prefix,
            command: command.to_ascii_uppercase(),
            params,
        })
    }

    pub fn kind(&self) -> CommandKind {
        CommandKind::from_command(&self.command)
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Last parameter, or `""` when the event carries none.
    pub fn trailing(&self) -> &str {
        self.params.last().map(String::as_str).unwrap_or_default()
    }

    /// Whether the event was addressed to a channel rather than to us directly.
    pub fn is_from_channel(&self) -> bool {
        self.params
            .first()
            .is_some_and(|target| target.starts_with('#'))
    }
}

impl FromStr for ChatEvent {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ChatEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.tags.is_empty() {
            f.write_str("@")?;
            for (index, (key, value)) in self.tags.iter().enumerate() {
                if index > 0 {
                    f.write_str(";")?;
                }
                f.write_str(key)?;
                if !value.is_empty() {
                    write!(f, "={}", escape_tag_value(value))?;
                }
            }
            f.write_str(" ")?;
        }
        if let Some(prefix) = &self.prefix {
            write!(f, ":{prefix} ")?;
        }
        f.write_str(&self.command)?;

        if let Some((last, middle)) = self.params.split_last() {
            for param in middle {
                write!(f, " {param}")?;
            }
            if last.is_empty() || last.contains(' ') || last.starts_with(':') {
                write!(f, " :{last}")?;
            } else {
                write!(f, " {last}")?;
            }
        }
        Ok(())
    }
}

fn parse_tags(raw: &str) -> BTreeMap<String, String> {
    raw.split(';')
        .filter(|item| !item.is_empty())
        .map(|item| {
            let (key, value) = item.split_once('=').unwrap_or((item, ""));
            (key.to_string(), unescape_tag_value(value))
        })
        .collect()
}

fn unescape_tag_value(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(':') => out.push(';'),
            Some('s') => out.push(' '),
            Some('\\') => out.push('\\'),
            Some('r') => out.push('\r'),
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

fn escape_tag_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            ';' => out.push_str("\\:"),
            ' ' => out.push_str("\\s"),
            '\\' => out.push_str("\\\\"),
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
