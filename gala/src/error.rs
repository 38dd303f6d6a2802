//! Rule violations returned by the reservation engine.

use crate::types::{Category, MemberId, TableId};
use thiserror::Error;

/// Why the engine refused an operation
///
/// Every variant except [`GalaError::CorruptState`] is an expected outcome the
/// caller reports and recovers from.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GalaError {
    /// The member is already registered for the gala
    #[error("Member {member_id} is already subscribed")]
    AlreadySubscribed {
        /// Member concerned
        member_id: MemberId,
    },

    /// The member has no subscription
    #[error("Member {member_id} is not subscribed")]
    NotSubscribed {
        /// Member concerned
        member_id: MemberId,
    },

    /// Reservations can no longer be cancelled this close to the event
    #[error(
        "Too late to cancel: the gala is in {days_left} days, \
         cancellations close {cutoff_days} days before"
    )]
    TooLateToCancel {
        /// Days left until the event
        days_left: i64,
        /// Cancellation cutoff in days
        cutoff_days: u32,
    },

    /// The member already holds a reservation
    #[error("Member {member_id} already has a reservation")]
    AlreadyReserved {
        /// Member concerned
        member_id: MemberId,
    },

    /// Accompanist count outside 0..=max for the member's category
    #[error("Illegal accompanist count {requested}: allowed 0 to {max}")]
    IllegalAccompanistCount {
        /// Count asked for
        requested: i64,
        /// Maximum for the member
        max: u32,
    },

    /// The table belongs to the other category's pool
    #[error("Table {table_id} cannot be reserved by {category} members")]
    TablePermissionDenied {
        /// Table asked for
        table_id: TableId,
        /// Category of the member asking
        category: Category,
    },

    /// No table with that id
    #[error("Table {table_id} does not exist")]
    NoSuchTable {
        /// Table asked for
        table_id: TableId,
    },

    /// Not enough free seats (on the requested table, or on any table of the pool)
    #[error(
        "Not enough free seats for a party of {requested}{}",
        .table_id.map(|t| format!(" at table {t}")).unwrap_or_default()
    )]
    NoSeatsAvailable {
        /// Seats needed
        requested: u32,
        /// Explicitly requested table, if any
        table_id: Option<TableId>,
    },

    /// The member has no reservation waiting for confirmation
    #[error("Member {member_id} has no reservation on hold")]
    NotOnHold {
        /// Member concerned
        member_id: MemberId,
    },

    /// The member has no reservation
    #[error("Member {member_id} has no reservation")]
    NoReservation {
        /// Member concerned
        member_id: MemberId,
    },

    /// No member with that id in the roster
    #[error("Member {member_id} not found")]
    MemberNotFound {
        /// Member asked for
        member_id: MemberId,
    },

    /// The id belongs to the other category
    #[error("Member {member_id} is {actual}, not {expected}")]
    WrongMemberCategory {
        /// Member asked for
        member_id: MemberId,
        /// Category the caller expected
        expected: Category,
        /// Category of the member
        actual: Category,
    },

    /// Engine state violates its own invariants; not recoverable
    #[error("Corrupt engine state: {0}")]
    CorruptState(String),
}

impl GalaError {
    /// Whether the caller can report this error and carry on
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::CorruptState(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_corrupt_state_is_fatal() {
        assert!(
            GalaError::NotOnHold {
                member_id: MemberId::new(1)
            }
            .is_recoverable()
        );
        assert!(!GalaError::CorruptState("hold without reservation".into()).is_recoverable());
    }

    #[test]
    fn no_seats_message_names_the_table() {
        let explicit = GalaError::NoSeatsAvailable {
            requested: 2,
            table_id: Some(TableId::new(4)),
        };
        assert_eq!(explicit.to_string(), "Not enough free seats for a party of 2 at table 4");

        let any = GalaError::NoSeatsAvailable {
            requested: 2,
            table_id: None,
        };
        assert_eq!(any.to_string(), "Not enough free seats for a party of 2");
    }
}
