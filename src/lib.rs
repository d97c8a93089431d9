//! Spider Solitaire rules engine.
//!
//! [`Game`] owns the authoritative [`GameState`] and accepts commands (new
//! game, move, deal, undo). Presentation and persistence follow along through
//! a [`StateObserver`]; [`SnapshotStore`] is the on-disk one.

pub mod advisor;
pub mod board;
pub mod card;
pub mod command;
pub mod config;
pub mod error;
pub mod game;
pub mod history;
pub mod observer;
pub mod rules;
pub mod state;
pub mod store;

pub use advisor::Suggestion;
pub use board::{Board, NUM_COLUMNS, Tableau};
pub use card::{Card, CardId, Suit, SuitCount};
pub use command::{Command, Outcome};
pub use config::{STORAGE_KEY, Settings, StorePaths};
pub use error::{RuleViolation, SnapshotError, StoreError};
pub use game::Game;
pub use history::{MAX_UNDO, Move, MoveHistory, MoveKind};
pub use observer::{NullObserver, StateObserver};
pub use state::GameState;
pub use store::SnapshotStore;
