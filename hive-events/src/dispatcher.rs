//! Broadcast loop, subscriber registry and subscriptions.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{self, Stream};
use hive_core::Message;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::queue::{OverflowPolicy, PushOutcome, SubscriberQueue};

/// Default per-subscriber queue bound.
pub const DEFAULT_SUBSCRIBER_CAPACITY: usize = 64;

/// Default heartbeat cadence.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

// ============================================================================
// CONFIGURATION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Maximum number of undelivered messages held per subscriber.
    pub subscriber_capacity: usize,
    /// What happens to a subscriber whose queue is full.
    pub overflow_policy: OverflowPolicy,
    /// Interval between heartbeats.
    pub heartbeat_interval: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            subscriber_capacity: DEFAULT_SUBSCRIBER_CAPACITY,
            overflow_policy: OverflowPolicy::default(),
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
        }
    }
}

// ============================================================================
// IDENTITY & STATS
// ============================================================================

/// Identifier of one registered subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Counters maintained by the broadcast loop.
#[derive(Debug, Default)]
pub struct DispatcherStats {
    published: AtomicU64,
    delivered: AtomicU64,
    dropped: AtomicU64,
    disconnected: AtomicU64,
    subscribers: AtomicU64,
}

/// Point-in-time copy of [`DispatcherStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatsSnapshot {
    pub published: u64,
    pub delivered: u64,
    pub dropped: u64,
    pub disconnected: u64,
    pub subscribers: u64,
}

impl DispatcherStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            published: self.published.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            disconnected: self.disconnected.load(Ordering::Relaxed),
            subscribers: self.subscribers.load(Ordering::Relaxed),
        }
    }
}

// ============================================================================
// COMMANDS
// ============================================================================

enum Command {
    Register {
        id: SubscriberId,
        queue: Arc<SubscriberQueue>,
    },
    Deregister {
        id: SubscriberId,
    },
    Publish(Message),
    /// Acknowledged once every earlier command has been applied.
    Barrier(oneshot::Sender<()>),
    Shutdown,
}

// ============================================================================
// DISPATCHER
// ============================================================================

/// Handle to the broadcast loop. Cheap to clone.
#[derive(Clone)]
pub struct Dispatcher {
    tx: mpsc::UnboundedSender<Command>,
    stats: Arc<DispatcherStats>,
    config: DispatcherConfig,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .field("stats", &self.stats.snapshot())
            .field("running", &!self.tx.is_closed())
            .finish()
    }
}

impl Dispatcher {
    /// Start the broadcast loop on the current tokio runtime.
    pub fn spawn(config: DispatcherConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let stats = Arc::new(DispatcherStats::default());
        tokio::spawn(broadcast_loop(rx, Arc::clone(&stats), config.overflow_policy));
        info!(
            capacity = config.subscriber_capacity,
            policy = ?config.overflow_policy,
            "Event dispatcher started"
        );
        Self { tx, stats, config }
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Queue a message for every subscriber registered before this call.
    ///
    /// Returns false when the broadcast loop is no longer running.
    pub fn publish(&self, message: Message) -> bool {
        self.tx.send(Command::Publish(message)).is_ok()
    }

    /// Register a new subscriber. It receives only messages published after
    /// this call returns.
    pub fn subscribe(&self) -> Subscription {
        let id = SubscriberId::new();
        let queue = Arc::new(SubscriberQueue::new(self.config.subscriber_capacity));
        if self
            .tx
            .send(Command::Register {
                id,
                queue: Arc::clone(&queue),
            })
            .is_err()
        {
            // Loop gone: hand back an already-ended subscription.
            queue.close();
        }
        Subscription {
            id,
            queue,
            tx: self.tx.clone(),
        }
    }

    /// Wait until every command sent before this call has been applied.
    pub async fn barrier(&self) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send(Command::Barrier(ack_tx)).is_ok() {
            let _ = ack_rx.await;
        }
    }

    /// Stop the broadcast loop. Open subscriptions drain and then end.
    pub fn shutdown(&self) {
        let _ = self.tx.send(Command::Shutdown);
    }

    pub fn is_running(&self) -> bool {
        !self.tx.is_closed()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}

async fn broadcast_loop(
    mut rx: mpsc::UnboundedReceiver<Command>,
    stats: Arc<DispatcherStats>,
    policy: OverflowPolicy,
) {
    let mut subscribers: HashMap<SubscriberId, Arc<SubscriberQueue>> = HashMap::new();

    while let Some(command) = rx.recv().await {
        match command {
            Command::Register { id, queue } => {
                subscribers.insert(id, queue);
                debug!(subscriber = %id, total = subscribers.len(), "Subscriber registered");
            }
            Command::Deregister { id } => {
                if let Some(queue) = subscribers.remove(&id) {
                    queue.close();
                    debug!(subscriber = %id, total = subscribers.len(), "Subscriber deregistered");
                }
            }
            Command::Publish(message) => {
                stats.published.fetch_add(1, Ordering::Relaxed);
                let mut dropped = Vec::new();

                for (id, queue) in &subscribers {
                    match queue.push(message.clone(), policy) {
                        PushOutcome::Queued => {
                            stats.delivered.fetch_add(1, Ordering::Relaxed);
                        }
                        PushOutcome::Evicted => {
                            stats.delivered.fetch_add(1, Ordering::Relaxed);
                            stats.dropped.fetch_add(1, Ordering::Relaxed);
                            debug!(subscriber = %id, "Subscriber lagging, evicted oldest message");
                        }
                        PushOutcome::Overflow => {
                            warn!(subscriber = %id, "Subscriber queue full, disconnecting");
                            dropped.push(*id);
                        }
                        PushOutcome::Closed => dropped.push(*id),
                    }
                }

                for id in dropped {
                    if let Some(queue) = subscribers.remove(&id) {
                        queue.close();
                        stats.disconnected.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }
            Command::Barrier(ack) => {
                let _ = ack.send(());
            }
            Command::Shutdown => break,
        }
        stats
            .subscribers
            .store(subscribers.len() as u64, Ordering::Relaxed);
    }

    // Refuse new commands, then settle whatever was queued behind Shutdown.
    rx.close();
    let mut discarded = 0u64;
    while let Ok(command) = rx.try_recv() {
        match command {
            Command::Register { queue, .. } => queue.close(),
            Command::Publish(_) => discarded += 1,
            Command::Barrier(ack) => {
                let _ = ack.send(());
            }
            Command::Deregister { .. } | Command::Shutdown => {}
        }
    }
    if discarded > 0 {
        debug!(discarded, "Discarded messages published after shutdown");
    }

    for queue in subscribers.values() {
        queue.close();
    }
    stats.subscribers.store(0, Ordering::Relaxed);
    info!("Event dispatcher stopped");
}

// ============================================================================
// SUBSCRIPTION
// ============================================================================

/// One registered subscriber. Deregisters itself when dropped.
pub struct Subscription {
    id: SubscriberId,
    queue: Arc<SubscriberQueue>,
    tx: mpsc::UnboundedSender<Command>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Next message, or `None` once the subscriber was removed or the
    /// dispatcher stopped.
    pub async fn recv(&mut self) -> Option<Message> {
        self.queue.pop().await
    }

    /// Turn the subscription into a stream of messages.
    ///
    /// Dropping the stream drops the subscription and deregisters it.
    pub fn into_stream(self) -> impl Stream<Item = Message> + Send {
        stream::unfold(self, |mut subscription| async move {
            let message = subscription.recv().await?;
            Some((message, subscription))
        })
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let _ = self.tx.send(Command::Deregister { id: self.id });
    }
}
