//! Startup wiring: restore the last snapshot or build fresh state from the rosters.

use crate::aggregate::{GalaEnvironment, GalaReducer};
use crate::config::{ConfigError, GalaConfig};
use crate::engine::ReservationEngine;
use crate::error::GalaError;
use crate::registry::{MemberRegistry, RosterError};
use gala_core::environment::Clock;
use gala_core::snapshot::{SnapshotError, SnapshotStore, decode_snapshot};
use gala_runtime::{FileSnapshotStore, Store, StoreError};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Store running the gala reducer
pub type GalaStore = Store<GalaReducer>;

/// Fatal startup failures
#[derive(Error, Debug)]
pub enum BootstrapError {
    /// Configuration values are unusable
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The member rosters could not be loaded
    #[error("Cannot load member rosters: {0}")]
    Roster(#[from] RosterError),

    /// The stored snapshot could not be read or is corrupt
    #[error("Cannot restore snapshot: {0}")]
    Snapshot(#[from] SnapshotError),

    /// The first snapshot could not be written
    #[error("Cannot initialize store: {0}")]
    Store(#[from] StoreError<GalaError>),
}

/// Open the store using the file snapshot at `config.snapshot_path`
///
/// # Errors
///
/// See [`open_store_with`].
pub fn open_store(config: &GalaConfig, clock: Arc<dyn Clock>) -> Result<GalaStore, BootstrapError> {
    let snapshots = Arc::new(FileSnapshotStore::new(config.snapshot_path.clone()));
    open_store_with(config, snapshots, clock)
}

/// Open the store on any snapshot storage
///
/// An existing snapshot is restored as is, including its roster, layout and
/// calendar. Without one, the rosters named in `config` are loaded, a fresh
/// engine is built from `config`, and its first snapshot is written before
/// the store is returned.
///
/// # Errors
///
/// - [`BootstrapError::Config`]: `config` fails validation
/// - [`BootstrapError::Snapshot`]: the snapshot is unreadable or corrupt
/// - [`BootstrapError::Roster`]: a roster file is missing or malformed
/// - [`BootstrapError::Store`]: the first snapshot could not be written
pub fn open_store_with(
    config: &GalaConfig,
    snapshots: Arc<dyn SnapshotStore>,
    clock: Arc<dyn Clock>,
) -> Result<GalaStore, BootstrapError> {
    config.validate()?;

    let (engine, fresh) = match snapshots.load()? {
        Some(bytes) => {
            let engine: ReservationEngine = decode_snapshot(&bytes)?;
            info!(
                members = engine.registry().len(),
                subscribed = engine.subscribed().count(),
                reservations = engine.reservations().count(),
                current_date = %engine.clock().current_date(),
                "Restored gala from snapshot"
            );
            (engine, false)
        }
        None => {
            let registry =
                MemberRegistry::from_roster_files(&config.roster.students, &config.roster.staff)?;
            info!(
                members = registry.len(),
                student_tables = config.venue.student_tables,
                staff_tables = config.venue.staff_tables,
                event_date = %config.calendar.event_date,
                "No snapshot found, starting a fresh gala"
            );
            let engine = ReservationEngine::new(
                Arc::new(registry),
                config.layout(),
                config.event_clock(),
                config.reservation_policy(),
            );
            (engine, true)
        }
    };

    let store = Store::new(engine, GalaReducer::new(), GalaEnvironment::new(clock))
        .with_snapshots(snapshots);
    if fresh {
        store.snapshot_now()?;
    }
    Ok(store)
}
