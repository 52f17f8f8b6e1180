//! Mini.Fi game core: rewards, levels, badges, leagues and persistence.
//!
//! Reward and league logic are pure functions over a `PlayerProfile`
//! supplied by the caller. Only `store` touches the database.

pub mod badges;
pub mod cohort;
pub mod config;
pub mod error;
pub mod event;
pub mod feedback;
pub mod lead;
pub mod league;
pub mod ledger;
pub mod name_generator;
pub mod profile;
pub mod rng;
pub mod season;
pub mod store;
pub mod tracker;
pub mod types;
pub mod waitlist;

pub use config::GameConfig;
pub use error::{CoreError, CoreResult};
pub use event::{EventKind, GameplayEvent};
pub use profile::PlayerProfile;
pub use store::{Datastore, SqliteStore};
pub use tracker::{ApplyOutcome, ApplyStatus, RewardTracker};
