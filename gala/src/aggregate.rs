//! Reducer adapter: commands in, events and a snapshot request out.
//!
//! Each [`GalaCommand`] maps to one [`ReservationEngine`] operation. A rejected
//! command returns the engine's [`GalaError`] unchanged; an applied one
//! publishes a single [`GalaEvent`] stamped with the wall clock and asks the
//! store to persist the new state.

use crate::engine::ReservationEngine;
use crate::error::GalaError;
use crate::types::{MemberId, Money, TableId};
use chrono::{DateTime, NaiveDate, Utc};
use gala_core::{
    SmallVec, effect::Effect, environment::Clock, event::Event, reducer::Reducer, smallvec,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ============================================================================
// Commands
// ============================================================================

/// Commands accepted by the gala
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GalaCommand {
    /// Register intent to attend
    Subscribe {
        /// Member subscribing
        member_id: MemberId,
    },

    /// Withdraw, releasing any reservation
    Unsubscribe {
        /// Member withdrawing
        member_id: MemberId,
    },

    /// Reserve seats for the member and their accompanists
    Reserve {
        /// Member reserving
        member_id: MemberId,
        /// Guests besides the member
        accompanists: u32,
        /// Explicit table, or `None` for the first table with room
        table: Option<TableId>,
    },

    /// Confirm a reservation on hold
    Confirm {
        /// Member confirming
        member_id: MemberId,
    },

    /// Remove the member's reservation, keeping the subscription
    CancelReservation {
        /// Member cancelling
        member_id: MemberId,
    },

    /// Move the simulated current date
    SetCurrentDate {
        /// New current date
        date: NaiveDate,
    },
}

// ============================================================================
// Events
// ============================================================================

/// Facts published after a command is applied
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GalaEvent {
    /// A member subscribed
    Subscribed {
        /// Member concerned
        member_id: MemberId,
        /// Wall-clock time
        recorded_at: DateTime<Utc>,
    },

    /// A member unsubscribed
    Unsubscribed {
        /// Member concerned
        member_id: MemberId,
        /// Table whose seats were released, if the member held a reservation
        released_table: Option<TableId>,
        /// Wall-clock time
        recorded_at: DateTime<Utc>,
    },

    /// Seats were reserved
    ReservationPlaced {
        /// Member concerned
        member_id: MemberId,
        /// Table the seats are on
        table_id: TableId,
        /// Seats taken
        seats: u32,
        /// Price of the reservation
        total_price: Money,
        /// Whether the reservation skipped the hold (staff)
        auto_accepted: bool,
        /// Wall-clock time
        recorded_at: DateTime<Utc>,
    },

    /// A reservation moved from hold to accepted
    ParticipationConfirmed {
        /// Member concerned
        member_id: MemberId,
        /// Wall-clock time
        recorded_at: DateTime<Utc>,
    },

    /// A reservation was removed
    ReservationCancelled {
        /// Member concerned
        member_id: MemberId,
        /// Table the seats were freed on
        table_id: TableId,
        /// Seats freed
        seats: u32,
        /// Wall-clock time
        recorded_at: DateTime<Utc>,
    },

    /// The simulated current date moved
    CurrentDateSet {
        /// Date before the change
        previous: NaiveDate,
        /// New current date
        current: NaiveDate,
        /// Wall-clock time
        recorded_at: DateTime<Utc>,
    },
}

impl Event for GalaEvent {
    fn event_type(&self) -> &'static str {
        match self {
            Self::Subscribed { .. } => "Subscribed.v1",
            Self::Unsubscribed { .. } => "Unsubscribed.v1",
            Self::ReservationPlaced { .. } => "ReservationPlaced.v1",
            Self::ParticipationConfirmed { .. } => "ParticipationConfirmed.v1",
            Self::ReservationCancelled { .. } => "ReservationCancelled.v1",
            Self::CurrentDateSet { .. } => "CurrentDateSet.v1",
        }
    }
}

// ============================================================================
// Environment
// ============================================================================

/// Environment dependencies for the gala reducer
#[derive(Clone)]
pub struct GalaEnvironment {
    /// Clock for event timestamps
    pub clock: Arc<dyn Clock>,
}

impl GalaEnvironment {
    /// Creates a new `GalaEnvironment`
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

// ============================================================================
// Reducer
// ============================================================================

/// Reducer driving a [`ReservationEngine`]
#[derive(Clone, Copy, Debug, Default)]
pub struct GalaReducer;

impl GalaReducer {
    /// Creates a new `GalaReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for GalaReducer {
    type State = ReservationEngine;
    type Action = GalaCommand;
    type Event = GalaEvent;
    type Environment = GalaEnvironment;
    type Error = GalaError;

    fn reduce(
        &self,
        state: &mut ReservationEngine,
        action: GalaCommand,
        env: &GalaEnvironment,
    ) -> Result<SmallVec<[Effect<GalaEvent>; 4]>, GalaError> {
        let recorded_at = env.clock.now();

        let event = match action {
            GalaCommand::Subscribe { member_id } => {
                state.subscribe(member_id)?;
                GalaEvent::Subscribed {
                    member_id,
                    recorded_at,
                }
            }
            GalaCommand::Unsubscribe { member_id } => {
                let released = state.unsubscribe(member_id)?;
                GalaEvent::Unsubscribed {
                    member_id,
                    released_table: released.map(|r| r.table_id),
                    recorded_at,
                }
            }
            GalaCommand::Reserve {
                member_id,
                accompanists,
                table,
            } => {
                let reservation = state.reserve(member_id, accompanists, table)?;
                GalaEvent::ReservationPlaced {
                    member_id,
                    table_id: reservation.table_id,
                    seats: reservation.seats,
                    total_price: reservation.total_price,
                    auto_accepted: state.is_accepted(member_id),
                    recorded_at,
                }
            }
            GalaCommand::Confirm { member_id } => {
                state.confirm(member_id)?;
                GalaEvent::ParticipationConfirmed {
                    member_id,
                    recorded_at,
                }
            }
            GalaCommand::CancelReservation { member_id } => {
                let reservation = state.cancel_reservation(member_id)?;
                GalaEvent::ReservationCancelled {
                    member_id,
                    table_id: reservation.table_id,
                    seats: reservation.seats,
                    recorded_at,
                }
            }
            GalaCommand::SetCurrentDate { date } => {
                let previous = state.set_current_date(date);
                GalaEvent::CurrentDateSet {
                    previous,
                    current: date,
                    recorded_at,
                }
            }
        };

        Ok(smallvec![Effect::Publish(event), Effect::Persist])
    }
}
