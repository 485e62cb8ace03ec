//! Process-wide pointer listener registrations.
//!
//! A gesture subscribes to global pointer-move/pointer-up delivery when it
//! arms and holds the returned [`Subscription`] inside its session state.
//! Dropping the session drops the subscription, which removes exactly that
//! registration; there is no other removal site.

use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct Registry {
    next_id: u64,
    active: Vec<(u64, String)>,
}

/// Shared handle to the listener table. Cloning shares the same table.
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    inner: Rc<RefCell<Registry>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a move/up listener pair for `owner`.
    pub fn subscribe(&self, owner: &str) -> Subscription {
        let mut registry = self.inner.borrow_mut();
        registry.next_id += 1;
        let id = registry.next_id;
        registry.active.push((id, owner.to_string()));
        log::debug!("Pointer listeners registered for {} (#{})", owner, id);

        Subscription {
            id,
            registry: Rc::downgrade(&self.inner),
        }
    }

    /// Number of live listener pairs.
    pub fn active_count(&self) -> usize {
        self.inner.borrow().active.len()
    }

    pub fn is_listening(&self, owner: &str) -> bool {
        self.inner.borrow().active.iter().any(|(_, o)| o == owner)
    }
}

/// Disposer for one listener pair; unregisters on drop.
pub struct Subscription {
    id: u64,
    registry: std::rc::Weak<RefCell<Registry>>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            let mut registry = registry.borrow_mut();
            registry.active.retain(|(id, _)| *id != self.id);
            log::debug!("Pointer listeners released (#{})", self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_releases_exactly_one() {
        let registry = ListenerRegistry::new();
        let first = registry.subscribe("a");
        let second = registry.subscribe("b");
        assert_eq!(registry.active_count(), 2);

        drop(first);
        assert_eq!(registry.active_count(), 1);
        assert!(!registry.is_listening("a"));
        assert!(registry.is_listening("b"));

        drop(second);
        assert_eq!(registry.active_count(), 0);
    }

    #[test]
    fn test_subscription_outliving_registry() {
        let registry = ListenerRegistry::new();
        let sub = registry.subscribe("a");
        drop(registry);
        drop(sub);
    }
}
