//! Host application boundaries.
//!
//! The protocol core never talks to the host directly. It sees two
//! capabilities: somewhere to show text to the user, and the local player's
//! identity and held item. A game client implements these against its own
//! APIs; the bundled binary uses the stdout/static implementations below.

/// User-facing display surface.
pub trait DisplaySink: Send + Sync {
    /// Show a line of text to the user.
    fn show(&self, text: &str);
}

/// Display sink that prints to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutDisplay;

impl DisplaySink for StdoutDisplay {
    fn show(&self, text: &str) {
        println!("{text}");
    }
}

/// The item stack the player currently holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeldItem {
    /// Item identifier, e.g. `minecraft:diamond`.
    pub item_id: String,
    /// Stack count.
    pub count: i64,
}

/// The local player as seen by the protocol core.
pub trait PlayerHandle: Send + Sync {
    /// The player's username, used for the `auth-username` handshake.
    fn username(&self) -> String;

    /// The currently held item, if any.
    fn held_item(&self) -> Option<HeldItem>;
}

/// A player with a fixed username and an optional fixed held item.
#[derive(Debug, Clone)]
pub struct StaticPlayer {
    username: String,
    held: Option<HeldItem>,
}

impl StaticPlayer {
    /// Create a player with the given username and nothing in hand.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            held: None,
        }
    }

    /// Set the held item.
    #[must_use]
    pub fn holding(mut self, item_id: impl Into<String>, count: i64) -> Self {
        self.held = Some(HeldItem {
            item_id: item_id.into(),
            count,
        });
        self
    }
}

impl PlayerHandle for StaticPlayer {
    fn username(&self) -> String {
        self.username.clone()
    }

    fn held_item(&self) -> Option<HeldItem> {
        self.held.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_player_empty_hand() {
        let player = StaticPlayer::new("alice");
        assert_eq!(player.username(), "alice");
        assert_eq!(player.held_item(), None);
    }

    #[test]
    fn static_player_holding() {
        let player = StaticPlayer::new("alice").holding("minecraft:diamond", 3);
        let held = player.held_item().unwrap();
        assert_eq!(held.item_id, "minecraft:diamond");
        assert_eq!(held.count, 3);
    }
}
