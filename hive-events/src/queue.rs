//! Bounded per-subscriber message queue.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use hive_core::Message;
use tokio::sync::Notify;

/// What to do when a subscriber's queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Evict the oldest queued message to make room (the subscriber lags).
    #[default]
    DropOldest,

    /// Remove the subscriber and end its stream.
    Disconnect,
}

impl std::str::FromStr for OverflowPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "drop-oldest" | "drop_oldest" => Ok(OverflowPolicy::DropOldest),
            "disconnect" => Ok(OverflowPolicy::Disconnect),
            other => Err(format!(
                "unknown overflow policy '{}', expected drop-oldest or disconnect",
                other
            )),
        }
    }
}

/// Result of offering a message to a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PushOutcome {
    Queued,
    /// Queued after evicting the oldest message.
    Evicted,
    /// Queue full under the disconnect policy; nothing was queued.
    Overflow,
    Closed,
}

#[derive(Debug, Default)]
struct QueueState {
    buffer: VecDeque<Message>,
    closed: bool,
}

/// Single-consumer queue shared between the broadcast loop (producer) and
/// one subscription (consumer).
#[derive(Debug)]
pub(crate) struct SubscriberQueue {
    state: Mutex<QueueState>,
    notify: Notify,
    capacity: usize,
}

impl SubscriberQueue {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            notify: Notify::new(),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        // The critical sections never panic, but recover the data if one did.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Offer a message without ever waiting.
    pub(crate) fn push(&self, message: Message, policy: OverflowPolicy) -> PushOutcome {
        let outcome = {
            let mut state = self.lock();
            if state.closed {
                return PushOutcome::Closed;
            }
            if state.buffer.len() < self.capacity {
                state.buffer.push_back(message);
                PushOutcome::Queued
            } else {
                match policy {
                    OverflowPolicy::DropOldest => {
                        state.buffer.pop_front();
                        state.buffer.push_back(message);
                        PushOutcome::Evicted
                    }
                    OverflowPolicy::Disconnect => PushOutcome::Overflow,
                }
            }
        };
        if outcome != PushOutcome::Overflow {
            self.notify.notify_one();
        }
        outcome
    }

    /// Mark the queue closed. Already queued messages can still be drained.
    pub(crate) fn close(&self) {
        self.lock().closed = true;
        self.notify.notify_one();
    }

    /// Wait for the next message. Returns `None` once closed and drained.
    pub(crate) async fn pop(&self) -> Option<Message> {
        loop {
            {
                let mut state = self.lock();
                if let Some(message) = state.buffer.pop_front() {
                    return Some(message);
                }
                if state.closed {
                    return None;
                }
            }
            self.notify.notified().await;
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.lock().buffer.len()
    }
}
