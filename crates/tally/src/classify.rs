use shared::{domain::CommandKind, protocol::ChatEvent};
use tracing::warn;

use crate::state::Outcome;

/// Chat command a moderator or the broadcaster uses to overwrite the count.
/// `!nonprimesubcount 0` resets it.
pub const OVERWRITE_COMMAND_PREFIX: &str = "!nonprimesubcount ";

/// Plan id of the premium tier, which is left out of the count.
pub const PREMIUM_PLAN: &str = "Prime";

pub fn classify(event: &ChatEvent) -> Outcome {
    match event.kind() {
        CommandKind::Notice => classify_notice(event),
        CommandKind::ChatMessage => classify_chat_message(event),
        _ => Outcome::Unchanged,
    }
}

fn classify_notice(event: &ChatEvent) -> Outcome {
    if !matches!(event.tag("msg-id"), Some("sub" | "resub")) {
        return Outcome::Unchanged;
    }
    if event.tag("msg-param-sub-plan") == Some(PREMIUM_PLAN) {
        return Outcome::Unchanged;
    }
    Outcome::Increment { amount: 1 }
}

fn classify_chat_message(event: &ChatEvent) -> Outcome {
    let trailing = event.trailing();
    if !trailing.starts_with('!') || !is_privileged(event) {
        return Outcome::Unchanged;
    }

    let Some(amount) = trailing.strip_prefix(OVERWRITE_COMMAND_PREFIX) else {
        return Outcome::Unchanged;
    };
    match amount.parse::<i64>() {
        Ok(value) => Outcome::Overwrite { value },
        Err(error) => {
            warn!(%error, trailing, "failed to parse amounts from overwrite command");
            Outcome::Unchanged
        }
    }
}

/// Moderators carry `mod=1`; the channel owner shows up with a
/// `broadcaster/1` badge. Badges are matched as a substring of the raw tag.
pub fn is_privileged(event: &ChatEvent) -> bool {
    let moderator = event.tag("mod") == Some("1");
    let broadcaster = event
        .tag("badges")
        .is_some_and(|badges| badges.contains("broadcaster/1"));
    moderator || broadcaster
}

#[cfg(test)]
#[path = "tests/classify_tests.rs"]
mod tests;
