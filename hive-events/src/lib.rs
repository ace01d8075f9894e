//! Hive Events - Live Notification Fan-out
//!
//! Decouples producers of state-change notifications from any number of
//! long-lived subscribers (server-sent-event connections).
//!
//! # Architecture
//!
//! ```text
//! publish() ─┐
//! subscribe()├─► command channel ─► broadcast loop ─► SubscriberQueue (per subscriber)
//! drop(sub) ─┘        (ordered)       (sole owner         (bounded, overflow policy)
//!                                      of the set)
//! ```
//!
//! - A single broadcast loop owns the subscriber set. Registrations,
//!   deregistrations and publishes are applied strictly in the order they
//!   were sent, so every subscriber sees one global message order.
//! - Each subscriber has a bounded queue. A subscriber that stops reading
//!   never blocks the loop: depending on [`OverflowPolicy`] its oldest queued
//!   message is evicted or the subscriber is disconnected.
//! - A [`Subscription`] deregisters itself when dropped.
//! - [`spawn_heartbeat`] publishes a keys-less heartbeat at a fixed interval.

mod dispatcher;
mod heartbeat;
mod queue;

pub use dispatcher::{
    Dispatcher, DispatcherConfig, DispatcherStats, StatsSnapshot, SubscriberId, Subscription,
    DEFAULT_HEARTBEAT_INTERVAL, DEFAULT_SUBSCRIBER_CAPACITY,
};
pub use heartbeat::spawn_heartbeat;
pub use queue::OverflowPolicy;

pub use hive_core::Message;
