//! The reservation engine.
//!
//! Owns every piece of mutable gala state: the subscription set, the
//! reservations, the hold/accepted split and the table pool. Each operation
//! validates first and mutates only once every check has passed, so a
//! returned error always leaves the engine exactly as it was.
//!
//! Per-member state machine:
//!
//! ```text
//! none --subscribe--> subscribed --reserve--> on hold --confirm--> accepted
//!                          ^                      |                    |
//!                          +--cancel_reservation--+--------------------+
//! ```
//!
//! Staff reservations go straight to accepted. `unsubscribe` returns any state
//! to none, releasing the reservation on the way.

use crate::calendar::EventClock;
use crate::error::GalaError;
use crate::registry::MemberRegistry;
use crate::rules::rules_for;
use crate::tables::{Table, TableError, TablePool, VenueLayout};
use crate::types::{
    Category, Member, MemberId, MemberKind, ParticipationStatus, Reservation, TableId,
};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::debug;

/// Time-based rules
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReservationPolicy {
    /// Reservations cannot be released when fewer days than this remain
    pub cancellation_cutoff_days: u32,
    /// The confirmation option shows once the event is this many days away or closer
    pub confirmation_window_days: u32,
}

impl ReservationPolicy {
    /// 10-day cancellation cutoff, 30-day confirmation window
    pub const DEFAULT: Self = Self {
        cancellation_cutoff_days: 10,
        confirmation_window_days: 30,
    };
}

impl Default for ReservationPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<TableError> for GalaError {
    fn from(error: TableError) -> Self {
        match error {
            TableError::NoSuchTable(table_id) => Self::NoSuchTable { table_id },
            TableError::InsufficientSeats {
                table_id,
                requested,
                ..
            } => Self::NoSeatsAvailable {
                requested,
                table_id: Some(table_id),
            },
            // The engine only unassigns reservations it believes are seated
            TableError::NoSuchReservation { .. } => Self::CorruptState(error.to_string()),
        }
    }
}

/// Subscription, reservation and seating state for one gala
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReservationEngine {
    policy: ReservationPolicy,
    clock: EventClock,
    registry: Arc<MemberRegistry>,
    tables: TablePool,
    subscribed: BTreeSet<MemberId>,
    reservations: BTreeMap<MemberId, Reservation>,
    on_hold: BTreeSet<MemberId>,
    accepted: BTreeSet<MemberId>,
}

/// Stored pieces of an engine, checked by [`ReservationEngine::from_parts`]
#[derive(Debug)]
pub struct EngineParts {
    /// Time-based rules
    pub policy: ReservationPolicy,
    /// Event calendar
    pub clock: EventClock,
    /// Members
    pub registry: MemberRegistry,
    /// Pool sizes and capacity
    pub layout: VenueLayout,
    /// Tables with their seated reservations
    pub tables: Vec<Table>,
    /// Subscribed members
    pub subscribed: Vec<MemberId>,
    /// Members with an unconfirmed reservation
    pub on_hold: Vec<MemberId>,
    /// Members with a confirmed reservation
    pub accepted: Vec<MemberId>,
}

impl ReservationEngine {
    /// Create an engine with all tables empty and nobody subscribed
    #[must_use]
    pub fn new(
        registry: Arc<MemberRegistry>,
        layout: VenueLayout,
        clock: EventClock,
        policy: ReservationPolicy,
    ) -> Self {
        Self {
            policy,
            clock,
            registry,
            tables: TablePool::new(layout),
            subscribed: BTreeSet::new(),
            reservations: BTreeMap::new(),
            on_hold: BTreeSet::new(),
            accepted: BTreeSet::new(),
        }
    }

    /// Rebuild an engine from stored parts
    ///
    /// The reservation map is rebuilt from the tables, then the whole state is
    /// audited with [`ReservationEngine::check_invariants`].
    ///
    /// # Errors
    ///
    /// Returns [`GalaError::CorruptState`] if the parts are inconsistent.
    pub fn from_parts(parts: EngineParts) -> Result<Self, GalaError> {
        let tables =
            TablePool::restore(parts.layout, parts.tables).map_err(GalaError::CorruptState)?;

        let mut reservations = BTreeMap::new();
        for reservation in tables.iter().flat_map(Table::reservations) {
            if reservations
                .insert(reservation.member_id, *reservation)
                .is_some()
            {
                return Err(GalaError::CorruptState(format!(
                    "member {} holds more than one reservation",
                    reservation.member_id
                )));
            }
        }

        let engine = Self {
            policy: parts.policy,
            clock: parts.clock,
            registry: Arc::new(parts.registry),
            tables,
            subscribed: parts.subscribed.into_iter().collect(),
            reservations,
            on_hold: parts.on_hold.into_iter().collect(),
            accepted: parts.accepted.into_iter().collect(),
        };
        engine.check_invariants()?;
        Ok(engine)
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Register a member's intent to attend
    ///
    /// # Errors
    ///
    /// - [`GalaError::MemberNotFound`]: unknown id
    /// - [`GalaError::AlreadySubscribed`]: already registered
    pub fn subscribe(&mut self, member_id: MemberId) -> Result<(), GalaError> {
        self.registry.lookup(member_id)?;
        if self.subscribed.contains(&member_id) {
            return Err(GalaError::AlreadySubscribed { member_id });
        }

        self.subscribed.insert(member_id);
        debug!(member_id = %member_id, "Member subscribed");
        Ok(())
    }

    /// Withdraw a member, releasing any reservation first
    ///
    /// Without a reservation this is always allowed. With one, the usual
    /// cancellation cutoff applies. Returns the released reservation, if any.
    ///
    /// # Errors
    ///
    /// - [`GalaError::NotSubscribed`]: not registered
    /// - [`GalaError::TooLateToCancel`]: holds a reservation and the cutoff has passed
    pub fn unsubscribe(&mut self, member_id: MemberId) -> Result<Option<Reservation>, GalaError> {
        if !self.subscribed.contains(&member_id) {
            return Err(GalaError::NotSubscribed { member_id });
        }

        let released = if self.reservations.contains_key(&member_id) {
            self.ensure_cancellable()?;
            Some(self.release(member_id)?)
        } else {
            None
        };

        self.subscribed.remove(&member_id);
        debug!(
            member_id = %member_id,
            released_table = ?released.map(|r| r.table_id.value()),
            "Member unsubscribed"
        );
        Ok(released)
    }

    /// Reserve seats for a member and `accompanists` guests
    ///
    /// With `table` set, the seats go on that table; otherwise on the first
    /// table of the member's pool, by ascending id, with enough free seats.
    /// Students land on hold, staff are accepted at once.
    ///
    /// # Errors
    ///
    /// Checked in this order:
    ///
    /// - [`GalaError::MemberNotFound`] / [`GalaError::NotSubscribed`]
    /// - [`GalaError::AlreadyReserved`]
    /// - [`GalaError::IllegalAccompanistCount`]: over the member's maximum
    /// - [`GalaError::TablePermissionDenied`], then [`GalaError::NoSuchTable`]: explicit table only
    /// - [`GalaError::NoSeatsAvailable`]
    pub fn reserve(
        &mut self,
        member_id: MemberId,
        accompanists: u32,
        table: Option<TableId>,
    ) -> Result<Reservation, GalaError> {
        let member = self.registry.lookup(member_id)?;
        if !self.subscribed.contains(&member_id) {
            return Err(GalaError::NotSubscribed { member_id });
        }
        if self.reservations.contains_key(&member_id) {
            return Err(GalaError::AlreadyReserved { member_id });
        }

        let rules = rules_for(&member.kind);
        if accompanists > rules.max_accompanists {
            return Err(GalaError::IllegalAccompanistCount {
                requested: i64::from(accompanists),
                max: rules.max_accompanists,
            });
        }
        let seats = accompanists + 1;
        let auto_accept = matches!(member.kind, MemberKind::Staff);

        let table_id = match table {
            Some(table_id) => {
                if !self.tables.layout().permits(rules.pool, table_id) {
                    return Err(GalaError::TablePermissionDenied {
                        table_id,
                        category: member.category(),
                    });
                }
                let chosen = self
                    .tables
                    .get(table_id)
                    .ok_or(GalaError::NoSuchTable { table_id })?;
                if !chosen.has_room_for(seats) {
                    return Err(GalaError::NoSeatsAvailable {
                        requested: seats,
                        table_id: Some(table_id),
                    });
                }
                table_id
            }
            None => self
                .tables
                .first_fit(rules.pool, seats)
                .ok_or(GalaError::NoSeatsAvailable {
                    requested: seats,
                    table_id: None,
                })?,
        };

        let reservation = Reservation {
            member_id,
            table_id,
            seats,
            total_price: rules.price_for(seats),
            created_on: self.clock.current_date(),
        };

        self.tables.assign(table_id, reservation)?;
        self.reservations.insert(member_id, reservation);
        if auto_accept {
            self.accepted.insert(member_id);
        } else {
            self.on_hold.insert(member_id);
        }

        debug!(
            member_id = %member_id,
            table_id = %table_id,
            seats,
            price = %reservation.total_price,
            accepted = auto_accept,
            "Reservation placed"
        );
        Ok(reservation)
    }

    /// Confirm a reservation on hold
    ///
    /// # Errors
    ///
    /// Returns [`GalaError::NotOnHold`] if the member has nothing waiting for
    /// confirmation (no reservation, or already accepted).
    pub fn confirm(&mut self, member_id: MemberId) -> Result<(), GalaError> {
        if !self.on_hold.contains(&member_id) {
            return Err(GalaError::NotOnHold { member_id });
        }
        if !self.reservations.contains_key(&member_id) {
            return Err(GalaError::CorruptState(format!(
                "member {member_id} is on hold without a reservation"
            )));
        }

        self.on_hold.remove(&member_id);
        self.accepted.insert(member_id);
        debug!(member_id = %member_id, "Participation confirmed");
        Ok(())
    }

    /// Remove a member's reservation; the member stays subscribed
    ///
    /// # Errors
    ///
    /// - [`GalaError::NoReservation`]: nothing to cancel
    /// - [`GalaError::TooLateToCancel`]: the cutoff has passed
    pub fn cancel_reservation(&mut self, member_id: MemberId) -> Result<Reservation, GalaError> {
        if !self.reservations.contains_key(&member_id) {
            return Err(GalaError::NoReservation { member_id });
        }
        self.ensure_cancellable()?;

        let reservation = self.release(member_id)?;
        debug!(
            member_id = %member_id,
            table_id = %reservation.table_id,
            seats = reservation.seats,
            "Reservation cancelled"
        );
        Ok(reservation)
    }

    /// Move the simulated current date; returns the previous one
    pub fn set_current_date(&mut self, date: NaiveDate) -> NaiveDate {
        let previous = self.clock.current_date();
        self.clock.set_current_date(date);
        debug!(%previous, current = %date, "Current date moved");
        previous
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Whether the member is subscribed
    #[must_use]
    pub fn is_subscribed(&self, member_id: MemberId) -> bool {
        self.subscribed.contains(&member_id)
    }

    /// Whether the member holds a reservation
    #[must_use]
    pub fn has_reservation(&self, member_id: MemberId) -> bool {
        self.reservations.contains_key(&member_id)
    }

    /// Whether the member's reservation awaits confirmation
    #[must_use]
    pub fn is_on_hold(&self, member_id: MemberId) -> bool {
        self.on_hold.contains(&member_id)
    }

    /// Whether the member's reservation is confirmed
    #[must_use]
    pub fn is_accepted(&self, member_id: MemberId) -> bool {
        self.accepted.contains(&member_id)
    }

    /// Where the member stands in the workflow
    #[must_use]
    pub fn participation(&self, member_id: MemberId) -> ParticipationStatus {
        if self.accepted.contains(&member_id) {
            ParticipationStatus::Accepted
        } else if self.on_hold.contains(&member_id) {
            ParticipationStatus::OnHold
        } else if self.subscribed.contains(&member_id) {
            ParticipationStatus::Subscribed
        } else {
            ParticipationStatus::None
        }
    }

    /// The member's reservation
    ///
    /// # Errors
    ///
    /// Returns [`GalaError::NoReservation`] if there is none.
    pub fn reservation(&self, member_id: MemberId) -> Result<&Reservation, GalaError> {
        self.reservations
            .get(&member_id)
            .ok_or(GalaError::NoReservation { member_id })
    }

    /// Whole days until the event, negative once it has passed
    #[must_use]
    pub fn days_until_event(&self) -> i64 {
        self.clock.days_until_event()
    }

    /// Largest accompanist count the member may bring
    #[must_use]
    pub const fn max_accompanists(member: &Member) -> u32 {
        rules_for(&member.kind).max_accompanists
    }

    /// Validate a raw accompanist count as typed by a user
    ///
    /// # Errors
    ///
    /// - [`GalaError::MemberNotFound`]: unknown id
    /// - [`GalaError::IllegalAccompanistCount`]: negative or over the member's maximum
    pub fn accompanists_from_input(&self, member_id: MemberId, raw: i64) -> Result<u32, GalaError> {
        let max = Self::max_accompanists(self.registry.lookup(member_id)?);
        u32::try_from(raw)
            .ok()
            .filter(|count| *count <= max)
            .ok_or(GalaError::IllegalAccompanistCount { requested: raw, max })
    }

    /// Whether the "confirm participation" option should be offered
    ///
    /// Only for students on hold, once the event is within the confirmation window.
    #[must_use]
    pub fn confirmation_visible(&self, member_id: MemberId) -> bool {
        let is_student = self
            .registry
            .lookup(member_id)
            .is_ok_and(|m| m.category() == Category::Student);

        is_student
            && self.on_hold.contains(&member_id)
            && self.days_until_event() <= i64::from(self.policy.confirmation_window_days)
    }

    /// The member roster
    #[must_use]
    pub fn registry(&self) -> &MemberRegistry {
        &self.registry
    }

    /// All tables
    #[must_use]
    pub const fn tables(&self) -> &TablePool {
        &self.tables
    }

    /// Tables of the student pool, ascending
    #[must_use]
    pub fn student_tables(&self) -> Vec<&Table> {
        self.tables.student_tables()
    }

    /// Tables of the staff pool, ascending
    #[must_use]
    pub fn staff_tables(&self) -> Vec<&Table> {
        self.tables.staff_tables()
    }

    /// Tables a member of `category` may choose from, ascending
    pub fn tables_for(&self, category: Category) -> impl Iterator<Item = &Table> {
        self.tables.tables_for(category)
    }

    /// Event calendar
    #[must_use]
    pub const fn clock(&self) -> &EventClock {
        &self.clock
    }

    /// Time-based rules
    #[must_use]
    pub const fn policy(&self) -> &ReservationPolicy {
        &self.policy
    }

    /// Subscribed members, ascending
    pub fn subscribed(&self) -> impl Iterator<Item = MemberId> + '_ {
        self.subscribed.iter().copied()
    }

    /// Members on hold, ascending
    pub fn on_hold(&self) -> impl Iterator<Item = MemberId> + '_ {
        self.on_hold.iter().copied()
    }

    /// Accepted members, ascending
    pub fn accepted(&self) -> impl Iterator<Item = MemberId> + '_ {
        self.accepted.iter().copied()
    }

    /// All reservations, by member id
    pub fn reservations(&self) -> impl Iterator<Item = &Reservation> {
        self.reservations.values()
    }

    /// Audit the state
    ///
    /// Checks seat accounting on every table, that the reservation map and the
    /// tables agree, that reservations belong to subscribed roster members in
    /// the right pool, and that every reservation is in exactly one of on hold
    /// or accepted (staff always accepted).
    ///
    /// # Errors
    ///
    /// Returns [`GalaError::CorruptState`] naming the first violation found.
    pub fn check_invariants(&self) -> Result<(), GalaError> {
        let corrupt = |message: String| Err(GalaError::CorruptState(message));
        let layout = self.tables.layout();

        let mut seated = 0usize;
        for table in self.tables.iter() {
            if !table.seats_balance() {
                return corrupt(format!(
                    "table {} accounts for {:?} reserved + {} free seats out of {}",
                    table.id(),
                    table.reserved_seats(),
                    table.seats_remaining(),
                    table.capacity()
                ));
            }
            for reservation in table.reservations() {
                seated += 1;
                if reservation.table_id != table.id() {
                    return corrupt(format!(
                        "reservation of member {} on table {} names table {}",
                        reservation.member_id,
                        table.id(),
                        reservation.table_id
                    ));
                }
                if self.reservations.get(&reservation.member_id) != Some(reservation) {
                    return corrupt(format!(
                        "table {} seats member {} without a matching reservation",
                        table.id(),
                        reservation.member_id
                    ));
                }
            }
        }
        if seated != self.reservations.len() {
            return corrupt(format!(
                "{} reservations recorded but {seated} seated",
                self.reservations.len()
            ));
        }

        if let Some(unknown) = self.subscribed.iter().find(|id| !self.registry.contains(**id)) {
            return corrupt(format!("subscribed member {unknown} is not in the roster"));
        }

        for (member_id, reservation) in &self.reservations {
            let member = self.registry.lookup(*member_id).map_err(|_| {
                GalaError::CorruptState(format!("reservation for unknown member {member_id}"))
            })?;
            if reservation.seats == 0 {
                return corrupt(format!("reservation of member {member_id} has no seats"));
            }
            if !self.subscribed.contains(member_id) {
                return corrupt(format!(
                    "member {member_id} holds a reservation without a subscription"
                ));
            }
            if !layout.range_for(member.category()).contains(&reservation.table_id.value()) {
                return corrupt(format!(
                    "{} member {member_id} is seated at table {}",
                    member.category(),
                    reservation.table_id
                ));
            }
            let on_hold = self.on_hold.contains(member_id);
            let accepted = self.accepted.contains(member_id);
            if on_hold == accepted {
                return corrupt(format!(
                    "member {member_id} must be exactly one of on hold or accepted"
                ));
            }
            if on_hold && member.category() == Category::Staff {
                return corrupt(format!("staff member {member_id} is on hold"));
            }
        }

        if let Some(stray) = self
            .on_hold
            .iter()
            .chain(&self.accepted)
            .find(|id| !self.reservations.contains_key(*id))
        {
            return corrupt(format!("member {stray} has a status but no reservation"));
        }

        Ok(())
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn ensure_cancellable(&self) -> Result<(), GalaError> {
        let days_left = self.days_until_event();
        let cutoff_days = self.policy.cancellation_cutoff_days;
        if days_left < i64::from(cutoff_days) {
            return Err(GalaError::TooLateToCancel {
                days_left,
                cutoff_days,
            });
        }
        Ok(())
    }

    /// Free the member's seats and clear hold/accepted status
    fn release(&mut self, member_id: MemberId) -> Result<Reservation, GalaError> {
        let table_id = self
            .reservations
            .get(&member_id)
            .map(|r| r.table_id)
            .ok_or(GalaError::NoReservation { member_id })?;

        let reservation = self.tables.unassign(table_id, member_id)?;
        self.reservations.remove(&member_id);
        self.on_hold.remove(&member_id);
        self.accepted.remove(&member_id);
        Ok(reservation)
    }
}
