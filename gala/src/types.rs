//! Domain types for the gala.
//!
//! Value objects (identifiers, money, study year), the member record and its
//! category, and the reservation entity.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a member of the school, assigned by the roster
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MemberId(u32);

impl MemberId {
    /// Create a `MemberId` from its roster number
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the roster number
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Table number, starting at 1
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TableId(u32);

impl TableId {
    /// Create a `TableId` from its number
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the table number
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Value Objects
// ============================================================================

/// Price in whole monetary units
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money(u32);

impl Money {
    /// Creates a new `Money` amount
    #[must_use]
    pub const fn new(units: u32) -> Self {
        Self(units)
    }

    /// Returns the amount in units
    #[must_use]
    pub const fn units(&self) -> u32 {
        self.0
    }

    /// Multiply a unit price by a quantity
    #[must_use]
    pub const fn times(&self, quantity: u32) -> Self {
        Self(self.0 * quantity)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Year of study, 1 through 5
///
/// Year 5 is the final year and unlocks a larger accompanist quota at a
/// reduced unit price.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StudyYear(u8);

impl StudyYear {
    /// Final year of study
    pub const FINAL: Self = Self(5);

    /// Create a study year, or `None` outside 1..=5
    #[must_use]
    pub const fn new(year: u8) -> Option<Self> {
        if year >= 1 && year <= Self::FINAL.0 {
            Some(Self(year))
        } else {
            None
        }
    }

    /// Get the year number
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Whether this is the final year
    #[must_use]
    pub const fn is_final(&self) -> bool {
        self.0 == Self::FINAL.0
    }
}

impl fmt::Display for StudyYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Members
// ============================================================================

/// The two member categories; also names the table pool a member may use
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Teaching and administrative staff
    Staff,
    /// Enrolled students
    Student,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Staff => write!(f, "staff"),
            Self::Student => write!(f, "student"),
        }
    }
}

/// Category-specific member attributes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberKind {
    /// Staff member
    Staff,
    /// Student in a given year of study
    Student {
        /// Year of study
        year: StudyYear,
    },
}

impl MemberKind {
    /// The member category this kind belongs to
    #[must_use]
    pub const fn category(&self) -> Category {
        match self {
            Self::Staff => Category::Staff,
            Self::Student { .. } => Category::Student,
        }
    }
}

/// Name and contact details of a member
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Family name
    pub last_name: String,
    /// Given name
    pub first_name: String,
    /// Phone number
    pub phone: String,
    /// E-mail address
    pub email: String,
}

/// A member of the school, loaded once from the roster and never mutated
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Roster identifier
    pub id: MemberId,
    /// Name and contact details
    pub contact: Contact,
    /// Staff or student (with year)
    pub kind: MemberKind,
}

impl Member {
    /// Creates a new `Member`
    #[must_use]
    pub const fn new(id: MemberId, contact: Contact, kind: MemberKind) -> Self {
        Self { id, contact, kind }
    }

    /// The member's category
    #[must_use]
    pub const fn category(&self) -> Category {
        self.kind.category()
    }

    /// "First Last"
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.contact.first_name, self.contact.last_name)
    }
}

// ============================================================================
// Reservations
// ============================================================================

/// A seat reservation: the member plus accompanists at one table
///
/// The price is fixed when the reservation is created. A reservation is never
/// edited; cancelling and reserving again is the only way to change it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Owner of the reservation
    pub member_id: MemberId,
    /// Table the seats are on
    pub table_id: TableId,
    /// Seats taken: the member plus accompanists, at least 1
    pub seats: u32,
    /// Total price for all seats
    pub total_price: Money,
    /// Event-calendar date the reservation was made
    pub created_on: NaiveDate,
}

impl Reservation {
    /// Number of accompanists included in this reservation
    #[must_use]
    pub const fn accompanists(&self) -> u32 {
        self.seats.saturating_sub(1)
    }
}

/// Where a member stands in the registration workflow
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticipationStatus {
    /// Not subscribed
    None,
    /// Subscribed, no reservation yet
    Subscribed,
    /// Reservation made, waiting for confirmation
    OnHold,
    /// Reservation confirmed
    Accepted,
}
