//! Gala demo binary.
//!
//! Restores (or initializes) the gala, then walks one student and one staff
//! member through subscription, reservation and confirmation.

use anyhow::Context;
use gala::{
    Category, GalaCommand, GalaConfig, GalaError, GalaStore, MemberId, ParticipationStatus,
    open_store,
};
use gala_core::environment::SystemClock;
use gala_core::event::Event;
use gala_runtime::StoreError;
use gala_runtime::metrics::register_metrics;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gala=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
    register_metrics();

    let config = GalaConfig::from_env();
    info!(
        snapshot = %config.snapshot_path.display(),
        students = %config.roster.students.display(),
        staff = %config.roster.staff.display(),
        "Configuration loaded"
    );

    let store = open_store(&config, Arc::new(SystemClock)).context("Failed to start the gala")?;

    let (student, staff) = store.state(|engine| {
        let first_of = |category: Category| {
            engine
                .registry()
                .iter()
                .find(|m| m.category() == category)
                .map(|m| m.id)
        };
        (first_of(Category::Student), first_of(Category::Staff))
    })?;

    if let Some(member_id) = student {
        walk_through(&store, member_id, 1)?;
    }
    if let Some(member_id) = staff {
        walk_through(&store, member_id, 1)?;
    }

    store.state(|engine| {
        for table in engine.tables().iter().filter(|t| !t.reservations().is_empty()) {
            info!(
                table = %table.id(),
                seats_remaining = table.seats_remaining(),
                parties = table.reservations().len(),
                "Table occupancy"
            );
        }
    })?;

    Ok(())
}

/// Subscribe, reserve and (when offered) confirm for one member
fn walk_through(store: &GalaStore, member_id: MemberId, requested: i64) -> anyhow::Result<()> {
    send(store, GalaCommand::Subscribe { member_id })?;

    let accompanists = match store.state(|e| e.accompanists_from_input(member_id, requested))? {
        Ok(count) => count,
        Err(error) => {
            warn!(%member_id, %error, "Reserving without accompanists");
            0
        }
    };
    send(
        store,
        GalaCommand::Reserve {
            member_id,
            accompanists,
            table: None,
        },
    )?;

    let (visible, days_left) =
        store.state(|e| (e.confirmation_visible(member_id), e.days_until_event()))?;
    if visible {
        send(store, GalaCommand::Confirm { member_id })?;
    }

    let status = store.state(|e| e.participation(member_id))?;
    match status {
        ParticipationStatus::Accepted => info!(%member_id, days_left, "Participation accepted"),
        ParticipationStatus::OnHold => info!(%member_id, days_left, "Reservation on hold"),
        other => info!(%member_id, status = ?other, "No reservation"),
    }
    Ok(())
}

/// Send a command, reporting rule violations and failing on anything else
fn send(store: &GalaStore, command: GalaCommand) -> anyhow::Result<()> {
    match store.send(command) {
        Ok(events) => {
            for event in &events {
                info!(event_type = event.event_type(), ?event, "Applied");
            }
            Ok(())
        }
        Err(StoreError::Rejected(error)) if error.is_recoverable() => {
            warn!(%error, "Rejected");
            Ok(())
        }
        Err(StoreError::Rejected(GalaError::CorruptState(reason))) => {
            anyhow::bail!("Gala state is corrupt: {reason}")
        }
        Err(error) => Err(error.into()),
    }
}
