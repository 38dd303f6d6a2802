//! Event calendar: the fixed gala date and the simulated "today".

use chrono::NaiveDate;

/// Holds the gala date and the current simulated date
///
/// The current date is settable so that time can be advanced for demos and
/// tests; every time-sensitive rule reads it from here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventClock {
    event_date: NaiveDate,
    current_date: NaiveDate,
}

impl EventClock {
    /// Creates a new `EventClock`
    #[must_use]
    pub const fn new(event_date: NaiveDate, current_date: NaiveDate) -> Self {
        Self {
            event_date,
            current_date,
        }
    }

    /// Date of the gala
    #[must_use]
    pub const fn event_date(&self) -> NaiveDate {
        self.event_date
    }

    /// Current simulated date
    #[must_use]
    pub const fn current_date(&self) -> NaiveDate {
        self.current_date
    }

    /// Move the current date (forwards or backwards)
    pub fn set_current_date(&mut self, date: NaiveDate) {
        self.current_date = date;
    }

    /// Whole days from the current date to `target`; negative once `target` has passed
    #[must_use]
    pub fn days_until(&self, target: NaiveDate) -> i64 {
        (target - self.current_date).num_days()
    }

    /// Whole days left until the gala
    #[must_use]
    pub fn days_until_event(&self) -> i64 {
        self.days_until(self.event_date)
    }
}
