//! Shared fixtures for the integration tests.

#![allow(dead_code, clippy::unwrap_used)]

use chrono::NaiveDate;
use gala::registry::{parse_staff, parse_students};
use gala::{
    EventClock, GalaEnvironment, GalaReducer, GalaStore, MemberId, MemberRegistry,
    ReservationEngine, ReservationPolicy, VenueLayout,
};
use gala_runtime::Store;
use gala_testing::test_clock;
use std::sync::Arc;

pub const STUDENTS: &str = "\
1\tMartin\tLea\t0601\tlea@school.test\t5
2\tDurand\tHugo\t0602\thugo@school.test\t2
3\tPetit\tChloe\t0603\tchloe@school.test\t1
4\tMoreau\tLucas\t0604\tlucas@school.test\t5
";

pub const STAFF: &str = "\
101\tBernard\tClaire\t0701\tclaire@school.test
102\tRoux\tThomas\t0702\tthomas@school.test
";

pub const FINAL_YEAR: MemberId = MemberId::new(1);
pub const SECOND_YEAR: MemberId = MemberId::new(2);
pub const FIRST_YEAR: MemberId = MemberId::new(3);
pub const OTHER_FINAL_YEAR: MemberId = MemberId::new(4);
pub const STAFF_MEMBER: MemberId = MemberId::new(101);

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn registry() -> MemberRegistry {
    let mut members = parse_students(STUDENTS, "students").unwrap();
    members.extend(parse_staff(STAFF, "staff").unwrap());
    MemberRegistry::new(members).unwrap()
}

/// Default venue, gala on 2022-01-01, today 2021-12-17
pub fn engine_with(layout: VenueLayout) -> ReservationEngine {
    ReservationEngine::new(
        Arc::new(registry()),
        layout,
        EventClock::new(date(2022, 1, 1), date(2021, 12, 17)),
        ReservationPolicy::DEFAULT,
    )
}

pub fn engine() -> ReservationEngine {
    engine_with(VenueLayout::DEFAULT)
}

pub fn environment() -> GalaEnvironment {
    GalaEnvironment::new(Arc::new(test_clock()))
}

pub fn store(engine: ReservationEngine) -> GalaStore {
    Store::new(engine, GalaReducer::new(), environment())
}
