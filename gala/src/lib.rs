//! Gala - registration and table allocation for a members-only gala
//!
//! Members of a school (staff and students) subscribe to the gala, reserve
//! seats at a table for themselves and a limited number of accompanists, and
//! confirm their participation. Staff and students sit in separate table pools
//! and pay different prices.
//!
//! # Architecture
//!
//! ```text
//!   GalaCommand ──▶ Store ──▶ GalaReducer ──▶ ReservationEngine
//!                    │                          ├── MemberRegistry (read-only)
//!                    │                          ├── TablePool
//!                    │                          └── EventClock
//!                    ▼
//!           FileSnapshotStore  (written after every applied command)
//! ```
//!
//! # Key Rules
//!
//! | Member              | Price per seat | Max accompanists | Tables   |
//! |---------------------|----------------|------------------|----------|
//! | Staff               | 20             | 1                | 16..=25  |
//! | Final-year student  | 10             | 3                | 1..=15   |
//! | Other student       | 15             | 1                | 1..=15   |
//!
//! - Without an explicit table, the first table of the pool with enough free
//!   seats is taken.
//! - Student reservations wait on hold until confirmed; staff are accepted at once.
//! - Reservations cannot be released once fewer than 10 days remain.
//! - The confirmation option is shown to students on hold within 30 days of the event.
//!
//! # Usage
//!
//! ```ignore
//! let store = gala::bootstrap::open_store(&GalaConfig::from_env(), Arc::new(SystemClock))?;
//! store.send(GalaCommand::Subscribe { member_id })?;
//! store.send(GalaCommand::Reserve { member_id, accompanists: 1, table: None })?;
//! ```

#![forbid(unsafe_code)]

pub mod aggregate;
pub mod bootstrap;
pub mod calendar;
pub mod config;
pub mod engine;
pub mod error;
pub mod registry;
pub mod rules;
pub mod snapshot;
pub mod tables;
pub mod types;

pub use aggregate::{GalaCommand, GalaEnvironment, GalaEvent, GalaReducer};
pub use bootstrap::{BootstrapError, GalaStore, open_store, open_store_with};
pub use calendar::EventClock;
pub use config::{ConfigError, GalaConfig};
pub use engine::{ReservationEngine, ReservationPolicy};
pub use error::GalaError;
pub use registry::{MemberRegistry, RosterError};
pub use tables::{Table, TablePool, VenueLayout};
pub use types::{
    Category, Contact, Member, MemberId, MemberKind, Money, ParticipationStatus, Reservation,
    StudyYear, TableId,
};
