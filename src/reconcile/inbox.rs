//! Shared FIFO of inbound messages.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use super::inbound::{Inbound, InboundError};

/// Thread-safe queue that transport code and store listeners push into and
/// the reconciler drains.
///
/// Clones share the same queue.
///
/// ```
/// use league_store::reconcile::{Inbound, Inbox};
/// use serde_json::json;
///
/// let inbox = Inbox::new();
/// inbox.push_event("ws:connected", json!({ "reconnects": 1 })).unwrap();
/// inbox.push(Inbound::Disconnected);
///
/// let batch = inbox.drain();
/// assert_eq!(batch.len(), 2);
/// assert!(inbox.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Inbox {
    queue: Arc<Mutex<VecDeque<Inbound>>>,
}

impl Inbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, message: Inbound) {
        self.lock().push_back(message);
    }

    /// Decode a named event and queue it. Nothing is queued on error.
    pub fn push_event(&self, name: &str, detail: Value) -> Result<(), InboundError> {
        let message = Inbound::from_event(name, detail)?;
        self.push(message);
        Ok(())
    }

    /// Take everything queued so far, oldest first.
    pub fn drain(&self) -> Vec<Inbound> {
        self.lock().drain(..).collect()
    }

    pub fn pop(&self) -> Option<Inbound> {
        self.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Inbound>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clones_share_the_queue_in_order() {
        let inbox = Inbox::new();
        let producer = inbox.clone();
        producer.push(Inbound::Connected { reconnects: None });
        producer.push(Inbound::Disconnected);

        assert_eq!(inbox.len(), 2);
        assert_eq!(inbox.pop(), Some(Inbound::Connected { reconnects: None }));
        assert_eq!(inbox.drain(), vec![Inbound::Disconnected]);
        assert!(producer.is_empty());
    }

    #[test]
    fn bad_events_are_not_queued() {
        let inbox = Inbox::new();
        assert!(inbox.push_event("ws:unknown", json!({})).is_err());
        assert!(inbox.push_event("ws:odds", json!({})).is_err());
        assert!(inbox.is_empty());
    }

    #[test]
    fn usable_across_threads() {
        let inbox = Inbox::new();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let inbox = inbox.clone();
                std::thread::spawn(move || inbox.push(Inbound::Disconnected))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(inbox.len(), 4);
        inbox.clear();
        assert!(inbox.is_empty());
    }
}
