//! Player record as stored in the registry and in the JSON data file.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Registry-assigned player identifier. Always positive, never reused.
pub type PlayerId = u32;

/// A single player entry.
///
/// `id` is fixed at creation. `nick` never changes after creation either; only
/// `points` (additively) and `online` are mutable state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub nick: String,
    pub points: u64,
    pub online: bool,
}

impl Player {
    /// A freshly created player: zero points, online.
    pub fn new(id: PlayerId, nick: impl Into<String>) -> Self {
        Self {
            id,
            nick: nick.into(),
            points: 0,
            online: true,
        }
    }

    /// Full constructor, used when seeding files and in tests.
    pub fn with_state(id: PlayerId, nick: impl Into<String>, points: u64, online: bool) -> Self {
        Self {
            id,
            nick: nick.into(),
            points,
            online,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Player{{id={}, nick='{}', points={}, isOnline={}}}",
            self.id, self.nick, self.points, self.online
        )
    }
}
