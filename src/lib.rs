//! # Playerbase - File-backed Player Registry
//!
//! Playerbase tracks the players of a game session: who is registered, their
//! nicknames, their accumulated points and whether they are online. The whole
//! registry lives in one JSON file so state survives restarts.
//!
//! ## Features
//!
//! - **Unique Ids**: Ids are issued by the registry and never reused, even after deletions.
//! - **Unique Nicknames**: Case-sensitive uniqueness enforced on creation.
//! - **Additive Points**: Totals only grow; negative credit is rejected.
//! - **Durable Mutations**: Every change rewrites the data file atomically before returning.
//! - **Corruption Detection**: A data file with duplicate ids refuses to load.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use playerbase::config::Config;
//! use playerbase::registry::PlayerRegistry;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!     let mut registry = PlayerRegistry::from_config(&config).await?;
//!
//!     let id = registry.create_player("Nick").await?;
//!     let total = registry.add_points(id, 250).await?;
//!     assert_eq!(total, 250);
//!
//!     for player in registry.list_players() {
//!         println!("{}", player);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`player`] - The player record and its display form
//! - [`registry`] - Business rules and the public operations
//! - [`storage`] - JSON file persistence
//! - [`errors`] - Error types and their classification
//! - [`validation`] - Caller input checks
//! - [`config`] - TOML configuration
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │ PlayerRegistry  │ ← Ids, invariants, operations
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │  PlayerStore    │ ← Whole-file JSON load / atomic save
//! └─────────────────┘
//!          │
//!      data.json
//! ```

pub mod config;
pub mod errors;
pub mod logutil;
pub mod player;
pub mod registry;
pub mod storage;
pub mod validation;

pub use errors::{ErrorKind, RegistryError, StoreError};
pub use player::{Player, PlayerId};
pub use registry::PlayerRegistry;
pub use storage::PlayerStore;
