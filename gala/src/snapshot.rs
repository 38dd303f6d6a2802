//! On-disk snapshot schema for the reservation engine.
//!
//! The record is flat and versioned on its own: members, tables with their
//! seated reservations, the three membership sets, the calendar and the policy.
//! The reservation map is not stored; it is rebuilt from the tables on restore.

use crate::calendar::EventClock;
use crate::engine::{EngineParts, ReservationEngine, ReservationPolicy};
use crate::registry::MemberRegistry;
use crate::tables::{Table, VenueLayout};
use crate::types::{Member, MemberId, Reservation, TableId};
use chrono::NaiveDate;
use gala_core::snapshot::{Snapshot, SnapshotError};
use serde::{Deserialize, Serialize};

/// Version 1 of the gala snapshot record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalaSnapshotV1 {
    /// Date of the gala
    pub event_date: NaiveDate,
    /// Simulated current date
    pub current_date: NaiveDate,
    /// Cancellation cutoff in days
    pub cancellation_cutoff_days: u32,
    /// Confirmation window in days
    pub confirmation_window_days: u32,
    /// Number of student tables
    pub student_tables: u32,
    /// Number of staff tables
    pub staff_tables: u32,
    /// Seats per table
    pub table_capacity: u32,
    /// Whole roster
    pub members: Vec<Member>,
    /// Every table, ascending id
    pub tables: Vec<TableRecordV1>,
    /// Subscribed member ids
    pub subscribed: Vec<MemberId>,
    /// Member ids on hold
    pub on_hold: Vec<MemberId>,
    /// Accepted member ids
    pub accepted: Vec<MemberId>,
}

/// One table in [`GalaSnapshotV1`]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRecordV1 {
    /// Table number
    pub id: TableId,
    /// Total seats
    pub capacity: u32,
    /// Free seats
    pub seats_remaining: u32,
    /// Reservations seated here, in order
    pub reservations: Vec<Reservation>,
}

impl Snapshot for ReservationEngine {
    const KIND: &'static str = "gala";
    const SCHEMA_VERSION: u32 = 1;
    type Record = GalaSnapshotV1;

    fn to_record(&self) -> GalaSnapshotV1 {
        let layout = self.tables().layout();
        let policy = self.policy();
        GalaSnapshotV1 {
            event_date: self.clock().event_date(),
            current_date: self.clock().current_date(),
            cancellation_cutoff_days: policy.cancellation_cutoff_days,
            confirmation_window_days: policy.confirmation_window_days,
            student_tables: layout.student_tables,
            staff_tables: layout.staff_tables,
            table_capacity: layout.table_capacity,
            members: self.registry().iter().cloned().collect(),
            tables: self
                .tables()
                .iter()
                .map(|table| TableRecordV1 {
                    id: table.id(),
                    capacity: table.capacity(),
                    seats_remaining: table.seats_remaining(),
                    reservations: table.reservations().to_vec(),
                })
                .collect(),
            subscribed: self.subscribed().collect(),
            on_hold: self.on_hold().collect(),
            accepted: self.accepted().collect(),
        }
    }

    fn from_record(record: GalaSnapshotV1) -> Result<Self, SnapshotError> {
        let registry =
            MemberRegistry::new(record.members).map_err(|e| SnapshotError::Corrupt(e.to_string()))?;

        let tables = record
            .tables
            .into_iter()
            .map(|t| Table::restore(t.id, t.capacity, t.seats_remaining, t.reservations))
            .collect::<Result<Vec<_>, _>>()
            .map_err(SnapshotError::Corrupt)?;

        ReservationEngine::from_parts(EngineParts {
            policy: ReservationPolicy {
                cancellation_cutoff_days: record.cancellation_cutoff_days,
                confirmation_window_days: record.confirmation_window_days,
            },
            clock: EventClock::new(record.event_date, record.current_date),
            registry,
            layout: VenueLayout {
                student_tables: record.student_tables,
                staff_tables: record.staff_tables,
                table_capacity: record.table_capacity,
            },
            tables,
            subscribed: record.subscribed,
            on_hold: record.on_hold,
            accepted: record.accepted,
        })
        .map_err(|e| SnapshotError::Corrupt(e.to_string()))
    }
}
