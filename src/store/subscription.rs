use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// Handle returned by [`Store::subscribe`](super::Store::subscribe).
///
/// Dropping the handle does not unsubscribe; call
/// [`unsubscribe`](Self::unsubscribe) to stop notifications.
pub struct Subscription {
    id: u64,
    active: AtomicBool,
    remove: Box<dyn Fn(u64) -> bool + Send + Sync>,
}

impl Subscription {
    pub(crate) fn new(id: u64, remove: impl Fn(u64) -> bool + Send + Sync + 'static) -> Self {
        Self {
            id,
            active: AtomicBool::new(true),
            remove: Box::new(remove),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Deregister the listener. Returns true the first time it removes it.
    pub fn unsubscribe(&self) -> bool {
        if self.active.swap(false, Ordering::SeqCst) {
            (self.remove)(self.id)
        } else {
            false
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.active.load(Ordering::SeqCst))
            .finish()
    }
}
