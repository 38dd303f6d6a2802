//! Table pool: fixed tables partitioned into a student pool and a staff pool.
//!
//! Tables are numbered from 1. The first `student_tables` ids form the student
//! pool, the following `staff_tables` ids the staff pool. Membership in a pool
//! is permanent.

use crate::types::{Category, MemberId, Reservation, TableId};
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use thiserror::Error;

/// Errors from seat accounting on a single table
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// No table with that id
    #[error("Table {0} does not exist")]
    NoSuchTable(TableId),

    /// Assigning would take more seats than are left
    #[error("Table {table_id} has {remaining} seats left, {requested} requested")]
    InsufficientSeats {
        /// Table concerned
        table_id: TableId,
        /// Seats asked for
        requested: u32,
        /// Seats left
        remaining: u32,
    },

    /// The member holds no reservation on that table
    #[error("Table {table_id} holds no reservation for member {member_id}")]
    NoSuchReservation {
        /// Table concerned
        table_id: TableId,
        /// Member asked for
        member_id: MemberId,
    },
}

/// Sizes of the two pools and the common table capacity
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VenueLayout {
    /// Number of student tables (ids `1..=student_tables`)
    pub student_tables: u32,
    /// Number of staff tables (the ids right after the student pool)
    pub staff_tables: u32,
    /// Seats per table
    pub table_capacity: u32,
}

impl VenueLayout {
    /// Largest number of tables a venue may have
    pub const MAX_TABLES: u32 = 10_000;

    /// 15 student tables, 10 staff tables, 8 seats each
    pub const DEFAULT: Self = Self {
        student_tables: 15,
        staff_tables: 10,
        table_capacity: 8,
    };

    /// Total number of tables
    #[must_use]
    pub const fn total_tables(&self) -> u32 {
        self.student_tables.saturating_add(self.staff_tables)
    }

    /// Total number of tables, `None` if the pools overflow or exceed [`Self::MAX_TABLES`]
    #[must_use]
    pub const fn checked_total(&self) -> Option<u32> {
        match self.student_tables.checked_add(self.staff_tables) {
            Some(total) if total <= Self::MAX_TABLES => Some(total),
            _ => None,
        }
    }

    /// Table ids of the student pool
    #[must_use]
    pub const fn student_range(&self) -> RangeInclusive<u32> {
        1..=self.student_tables
    }

    /// Table ids of the staff pool
    #[must_use]
    pub const fn staff_range(&self) -> RangeInclusive<u32> {
        self.student_tables.saturating_add(1)..=self.total_tables()
    }

    /// Table ids of a category's pool
    #[must_use]
    pub const fn range_for(&self, category: Category) -> RangeInclusive<u32> {
        match category {
            Category::Student => self.student_range(),
            Category::Staff => self.staff_range(),
        }
    }

    /// Whether a member of `category` may ask for `table_id`
    ///
    /// Ids are split at the end of the student pool: staff may not ask for an id
    /// at or below it, students may not ask for one above it. Whether the table
    /// exists is a separate question.
    #[must_use]
    pub const fn permits(&self, category: Category, table_id: TableId) -> bool {
        match category {
            Category::Student => table_id.value() <= self.student_tables,
            Category::Staff => table_id.value() > self.student_tables,
        }
    }
}

impl Default for VenueLayout {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A table and the reservations seated at it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Table {
    id: TableId,
    capacity: u32,
    seats_remaining: u32,
    reservations: Vec<Reservation>,
}

impl Table {
    /// Creates an empty table
    #[must_use]
    pub const fn new(id: TableId, capacity: u32) -> Self {
        Self {
            id,
            capacity,
            seats_remaining: capacity,
            reservations: Vec::new(),
        }
    }

    /// Rebuild a table from stored parts, checking its seat accounting
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if a reservation takes no seats
    /// or more than the capacity, or if the seats taken by the reservations
    /// plus the seats remaining do not add up to the capacity.
    pub fn restore(
        id: TableId,
        capacity: u32,
        seats_remaining: u32,
        reservations: Vec<Reservation>,
    ) -> Result<Self, String> {
        if let Some(r) = reservations
            .iter()
            .find(|r| r.seats == 0 || r.seats > capacity)
        {
            return Err(format!(
                "table {id}: reservation of member {} takes {} seats out of {capacity}",
                r.member_id, r.seats
            ));
        }
        let table = Self {
            id,
            capacity,
            seats_remaining,
            reservations,
        };
        if !table.seats_balance() {
            return Err(format!(
                "table {id}: {} reservations + {seats_remaining} remaining != capacity {capacity}",
                table.reservations.len()
            ));
        }
        Ok(table)
    }

    /// Table number
    #[must_use]
    pub const fn id(&self) -> TableId {
        self.id
    }

    /// Total seats
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Free seats
    #[must_use]
    pub const fn seats_remaining(&self) -> u32 {
        self.seats_remaining
    }

    /// Reservations seated here, in the order they were made
    #[must_use]
    pub fn reservations(&self) -> &[Reservation] {
        &self.reservations
    }

    /// Sum of the reservations' seats, `None` on overflow
    #[must_use]
    pub fn reserved_seats(&self) -> Option<u32> {
        self.reservations
            .iter()
            .try_fold(0u32, |sum, r| sum.checked_add(r.seats))
    }

    /// Whether the reserved seats plus the free seats make up the capacity
    #[must_use]
    pub fn seats_balance(&self) -> bool {
        self.reserved_seats()
            .and_then(|reserved| reserved.checked_add(self.seats_remaining))
            == Some(self.capacity)
    }

    /// Whether `seats` more seats fit
    #[must_use]
    pub const fn has_room_for(&self, seats: u32) -> bool {
        self.seats_remaining >= seats
    }

    /// Seat a reservation, taking its seats
    ///
    /// # Errors
    ///
    /// Returns [`TableError::InsufficientSeats`] without changing anything if the
    /// reservation does not fit.
    pub fn assign(&mut self, reservation: Reservation) -> Result<(), TableError> {
        let Some(remaining) = self.seats_remaining.checked_sub(reservation.seats) else {
            return Err(TableError::InsufficientSeats {
                table_id: self.id,
                requested: reservation.seats,
                remaining: self.seats_remaining,
            });
        };
        self.seats_remaining = remaining;
        self.reservations.push(reservation);
        Ok(())
    }

    /// Remove a member's reservation, giving its seats back
    ///
    /// # Errors
    ///
    /// Returns [`TableError::NoSuchReservation`] if the member is not seated here.
    pub fn unassign(&mut self, member_id: MemberId) -> Result<Reservation, TableError> {
        let Some(index) = self
            .reservations
            .iter()
            .position(|r| r.member_id == member_id)
        else {
            return Err(TableError::NoSuchReservation {
                table_id: self.id,
                member_id,
            });
        };
        let reservation = self.reservations.remove(index);
        self.seats_remaining = self.seats_remaining.saturating_add(reservation.seats);
        Ok(reservation)
    }
}

/// All tables of the venue, keyed by id
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TablePool {
    layout: VenueLayout,
    tables: BTreeMap<TableId, Table>,
}

impl TablePool {
    /// Create every table of the layout, all empty
    #[must_use]
    pub fn new(layout: VenueLayout) -> Self {
        let tables = (1..=layout.total_tables())
            .map(|n| {
                let id = TableId::new(n);
                (id, Table::new(id, layout.table_capacity))
            })
            .collect();
        Self { layout, tables }
    }

    /// Rebuild a pool from stored tables
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if the layout is out of bounds or
    /// the tables do not match its ids and capacity.
    pub fn restore(layout: VenueLayout, tables: Vec<Table>) -> Result<Self, String> {
        let Some(total) = layout.checked_total() else {
            return Err(format!(
                "{} student + {} staff tables exceed the limit of {}",
                layout.student_tables,
                layout.staff_tables,
                VenueLayout::MAX_TABLES
            ));
        };
        let tables: BTreeMap<TableId, Table> = tables.into_iter().map(|t| (t.id, t)).collect();

        if !tables.keys().map(TableId::value).eq(1..=total) {
            return Err(format!(
                "expected tables 1..={total}, found {} tables",
                tables.len()
            ));
        }
        if let Some(table) = tables
            .values()
            .find(|t| t.capacity != layout.table_capacity)
        {
            return Err(format!(
                "table {} has capacity {}, layout says {}",
                table.id, table.capacity, layout.table_capacity
            ));
        }

        Ok(Self { layout, tables })
    }

    /// Pool sizes and capacity
    #[must_use]
    pub const fn layout(&self) -> &VenueLayout {
        &self.layout
    }

    /// Look up a table
    #[must_use]
    pub fn get(&self, table_id: TableId) -> Option<&Table> {
        self.tables.get(&table_id)
    }

    /// Every table in ascending id order
    pub fn iter(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    /// Tables of a category's pool in ascending id order
    pub fn tables_for(&self, category: Category) -> impl Iterator<Item = &Table> {
        let range = self.layout.range_for(category);
        self.tables
            .values()
            .filter(move |table| range.contains(&table.id.value()))
    }

    /// Student pool, ascending
    #[must_use]
    pub fn student_tables(&self) -> Vec<&Table> {
        self.tables_for(Category::Student).collect()
    }

    /// Staff pool, ascending
    #[must_use]
    pub fn staff_tables(&self) -> Vec<&Table> {
        self.tables_for(Category::Staff).collect()
    }

    /// First table of the pool, by ascending id, with `seats` free seats
    #[must_use]
    pub fn first_fit(&self, category: Category, seats: u32) -> Option<TableId> {
        self.tables_for(category)
            .find(|table| table.has_room_for(seats))
            .map(Table::id)
    }

    /// Seat a reservation on a table
    ///
    /// # Errors
    ///
    /// - [`TableError::NoSuchTable`]: unknown id
    /// - [`TableError::InsufficientSeats`]: not enough seats; nothing changes
    pub fn assign(
        &mut self,
        table_id: TableId,
        reservation: Reservation,
    ) -> Result<(), TableError> {
        self.tables
            .get_mut(&table_id)
            .ok_or(TableError::NoSuchTable(table_id))?
            .assign(reservation)
    }

    /// Remove a member's reservation from a table
    ///
    /// # Errors
    ///
    /// - [`TableError::NoSuchTable`]: unknown id
    /// - [`TableError::NoSuchReservation`]: the member is not seated there
    pub fn unassign(
        &mut self,
        table_id: TableId,
        member_id: MemberId,
    ) -> Result<Reservation, TableError> {
        self.tables
            .get_mut(&table_id)
            .ok_or(TableError::NoSuchTable(table_id))?
            .unassign(member_id)
    }
}
