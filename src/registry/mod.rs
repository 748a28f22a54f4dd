//! # Player Registry
//!
//! [`PlayerRegistry`] is the only sanctioned entry point for reading and
//! changing players. It owns the in-memory collection, allocates ids, enforces
//! nickname uniqueness and non-negative credit, and persists the full
//! collection through its [`PlayerStore`] before any mutation returns.
//!
//! ## Lifecycle
//!
//! ```rust,no_run
//! use playerbase::registry::PlayerRegistry;
//! use playerbase::storage::PlayerStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut registry = PlayerRegistry::open(PlayerStore::new("data.json")).await?;
//!     let id = registry.create_player("Nick").await?;
//!     registry.add_points(id, 100).await?;
//!     println!("{}", registry.get_player_by_id(id)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Id Allocation
//!
//! New ids are one past the highest id ever issued by this instance, seeded
//! from the highest id in the file at open time. Deleting a player never frees
//! its id.
//!
//! ## Failure Semantics
//!
//! Validation failures leave memory and disk untouched. When a save fails the
//! in-memory change is rolled back and the store error is returned, so the
//! collection always matches the last successfully written file.

use log::{debug, error, info};

use crate::config::Config;
use crate::errors::{RegistryError, StoreError};
use crate::logutil::quote_for_log;
use crate::player::{Player, PlayerId};
use crate::storage::PlayerStore;
use crate::validation::{validate_nick, validate_points_delta};

pub type Result<T> = std::result::Result<T, RegistryError>;

pub struct PlayerRegistry {
    store: PlayerStore,
    players: Vec<Player>,
    last_issued_id: PlayerId,
    load_error: Option<StoreError>,
}

impl PlayerRegistry {
    /// Open a registry over `store`, loading whatever it currently holds.
    ///
    /// A missing or unparsable file is logged and the registry starts empty;
    /// the failure stays available through [`load_error`](Self::load_error).
    /// Duplicate ids in the file are a hard error.
    pub async fn open(store: PlayerStore) -> Result<Self> {
        let (players, load_error) = match store.load().await {
            Ok(players) => (players, None),
            Err(e) if e.is_load_failure() => {
                error!("{}", e);
                (Vec::new(), Some(e))
            }
            Err(e) => return Err(e.into()),
        };
        let last_issued_id = players.iter().map(|p| p.id).max().unwrap_or(0);
        info!(
            "Player registry opened at {} with {} players (last id {})",
            store.path().display(),
            players.len(),
            last_issued_id
        );
        Ok(Self {
            store,
            players,
            last_issued_id,
            load_error,
        })
    }

    /// Open the registry at the data file named by `config`.
    pub async fn from_config(config: &Config) -> Result<Self> {
        Self::open(PlayerStore::from_config(&config.storage)).await
    }

    /// The load failure that was downgraded to an empty registry, if any.
    pub fn load_error(&self) -> Option<&StoreError> {
        self.load_error.as_ref()
    }

    pub fn store(&self) -> &PlayerStore {
        &self.store
    }

    /// Highest id issued so far (0 when none has been).
    pub fn last_issued_id(&self) -> PlayerId {
        self.last_issued_id
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn contains_nick(&self, nick: &str) -> bool {
        self.players.iter().any(|p| p.nick == nick)
    }

    fn position(&self, id: PlayerId) -> Result<usize> {
        self.players
            .iter()
            .position(|p| p.id == id)
            .ok_or(RegistryError::NotFound(id))
    }

    /// Register a new player and return its id.
    pub async fn create_player(&mut self, nick: &str) -> Result<PlayerId> {
        let nick = validate_nick(nick)?;
        if self.contains_nick(nick) {
            return Err(RegistryError::DuplicateNickname(nick.to_string()));
        }
        let id = self
            .last_issued_id
            .checked_add(1)
            .ok_or(RegistryError::IdsExhausted)?;

        self.players.push(Player::new(id, nick));
        if let Err(e) = self.store.save(&self.players).await {
            self.players.pop();
            return Err(e.into());
        }
        self.last_issued_id = id;
        debug!("Created player {} {}", id, quote_for_log(nick));
        Ok(id)
    }

    /// Remove a player and return the removed record.
    pub async fn delete_player(&mut self, id: PlayerId) -> Result<Player> {
        let idx = self.position(id)?;
        let removed = self.players.remove(idx);
        if let Err(e) = self.store.save(&self.players).await {
            self.players.insert(idx, removed);
            return Err(e.into());
        }
        debug!("Deleted player {} {}", id, quote_for_log(&removed.nick));
        Ok(removed)
    }

    /// Credit `points` to a player and return the new total.
    pub async fn add_points(&mut self, id: PlayerId, points: i64) -> Result<u64> {
        let idx = self.position(id)?;
        let credit = validate_points_delta(points)?;
        let previous = self.players[idx].points;
        let total = previous
            .checked_add(credit)
            .ok_or(RegistryError::PointsOverflow(id))?;

        self.players[idx].points = total;
        if let Err(e) = self.store.save(&self.players).await {
            self.players[idx].points = previous;
            return Err(e.into());
        }
        debug!("Added {} points to player {} (total {})", credit, id, total);
        Ok(total)
    }

    /// Look up a player by id. The returned record is a copy.
    pub fn get_player_by_id(&self, id: PlayerId) -> Result<Player> {
        let idx = self.position(id)?;
        Ok(self.players[idx].clone())
    }

    /// All players in insertion order.
    pub fn list_players(&self) -> &[Player] {
        &self.players
    }
}
