//! Event trait for facts published by reducers.
//!
//! Events represent facts about things that have happened and are immutable.
//! The runtime hands them back to the caller of `Store::send` and labels its
//! logs and metrics with their type.
//!
//! # Event Naming Convention
//!
//! `event_type()` returns a stable identifier that includes a version number,
//! so consumers can tell schema revisions apart:
//!
//! - `"Subscribed.v1"`
//! - `"ReservationPlaced.v1"`
//!
//! # Example
//!
//! ```
//! use gala_core::event::Event;
//!
//! #[derive(Clone, Debug)]
//! enum OrderEvent {
//!     OrderPlaced { order_id: String },
//!     OrderShipped { order_id: String },
//! }
//!
//! impl Event for OrderEvent {
//!     fn event_type(&self) -> &'static str {
//!         match self {
//!             OrderEvent::OrderPlaced { .. } => "OrderPlaced.v1",
//!             OrderEvent::OrderShipped { .. } => "OrderShipped.v1",
//!         }
//!     }
//! }
//!
//! let event = OrderEvent::OrderPlaced { order_id: "o-1".to_string() };
//! assert_eq!(event.event_type(), "OrderPlaced.v1");
//! ```

/// A fact published by a reducer once an action has been applied.
pub trait Event: Send + Sync + 'static {
    /// Returns the versioned event type identifier for this event.
    fn event_type(&self) -> &'static str;
}
