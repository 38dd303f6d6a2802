//! Metric names and descriptions emitted by the Store.
//!
//! The Store records through the `metrics` facade; whichever recorder the
//! binary installs (or none) receives them.

use metrics::describe_counter;

/// Actions applied, labelled by the `event_type` they published
pub const ACTIONS_TOTAL: &str = "gala.actions.total";

/// Actions rejected by the reducer
pub const ACTIONS_REJECTED: &str = "gala.actions.rejected";

/// Snapshots written successfully
pub const SNAPSHOTS_WRITTEN: &str = "gala.snapshots.written";

/// Snapshot writes that failed (the action was rolled back)
pub const SNAPSHOTS_FAILED: &str = "gala.snapshots.failed";

/// Register all metric descriptions.
///
/// Call once after installing a recorder.
pub fn register_metrics() {
    describe_counter!(
        ACTIONS_TOTAL,
        "Total number of actions applied, by published event type"
    );
    describe_counter!(
        ACTIONS_REJECTED,
        "Total number of actions rejected by a business rule"
    );
    describe_counter!(SNAPSHOTS_WRITTEN, "Total number of snapshots written");
    describe_counter!(
        SNAPSHOTS_FAILED,
        "Total number of snapshot writes that failed and were rolled back"
    );
}
