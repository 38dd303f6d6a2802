//! Pricing and quota rules per member category.
//!
//! Every category-dependent rule is looked up here from the member's kind,
//! rather than branching on the kind at each call site.

use crate::types::{Category, MemberKind, Money};

/// Rate bracket a member falls into
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateBracket {
    /// Staff member
    Staff,
    /// Student in the final year of study
    FinalYearStudent,
    /// Student in any earlier year
    Student,
}

/// Rules applying to one rate bracket
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CategoryRules {
    /// Which bracket these rules belong to
    pub bracket: RateBracket,
    /// Price per seat
    pub unit_price: Money,
    /// Maximum number of accompanists on one reservation
    pub max_accompanists: u32,
    /// Table pool the member may reserve from
    pub pool: Category,
}

impl CategoryRules {
    /// Total price for `seats` seats
    #[must_use]
    pub const fn price_for(&self, seats: u32) -> Money {
        self.unit_price.times(seats)
    }
}

/// Staff: 20 per seat, one accompanist, staff tables
pub const STAFF_RULES: CategoryRules = CategoryRules {
    bracket: RateBracket::Staff,
    unit_price: Money::new(20),
    max_accompanists: 1,
    pool: Category::Staff,
};

/// Final-year students: 10 per seat, three accompanists, student tables
pub const FINAL_YEAR_RULES: CategoryRules = CategoryRules {
    bracket: RateBracket::FinalYearStudent,
    unit_price: Money::new(10),
    max_accompanists: 3,
    pool: Category::Student,
};

/// Other students: 15 per seat, one accompanist, student tables
pub const STUDENT_RULES: CategoryRules = CategoryRules {
    bracket: RateBracket::Student,
    unit_price: Money::new(15),
    max_accompanists: 1,
    pool: Category::Student,
};

/// Look up the rules for a member kind
#[must_use]
pub const fn rules_for(kind: &MemberKind) -> &'static CategoryRules {
    match kind {
        MemberKind::Staff => &STAFF_RULES,
        MemberKind::Student { year } if year.is_final() => &FINAL_YEAR_RULES,
        MemberKind::Student { .. } => &STUDENT_RULES,
    }
}
