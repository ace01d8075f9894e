//! Periodic liveness messages.

use hive_core::Message;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

use crate::dispatcher::Dispatcher;

/// Publish a heartbeat every `heartbeat_interval` of the dispatcher's
/// config until the dispatcher stops.
///
/// The first heartbeat goes out one full period after the call. Missed ticks
/// are delayed rather than bursted.
pub fn spawn_heartbeat(dispatcher: Dispatcher) -> JoinHandle<()> {
    let period = dispatcher.config().heartbeat_interval;
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // interval() completes its first tick immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            if !dispatcher.publish(Message::heartbeat()) {
                debug!("Dispatcher stopped, ending heartbeat");
                break;
            }
        }
    })
}
