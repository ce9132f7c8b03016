use std::cell::RefCell;
use std::rc::{Rc, Weak};

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    live: Vec<u64>,
}

/// Host-side repaint event source. Cloning shares the same registry.
#[derive(Debug, Clone, Default)]
pub struct RepaintHooks {
    registry: Rc<RefCell<Registry>>,
}

impl RepaintHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Subscription {
        let mut registry = self.registry.borrow_mut();
        registry.next_id += 1;
        let id = registry.next_id;
        registry.live.push(id);
        log::debug!("repaint subscription {} opened", id);
        Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.borrow().live.len()
    }
}

/// Owned subscription; unsubscribes when dropped.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// `false` once the event source itself is gone.
    pub fn is_live(&self) -> bool {
        self.registry
            .upgrade()
            .map_or(false, |registry| registry.borrow().live.contains(&self.id))
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().live.retain(|id| *id != self.id);
            log::debug!("repaint subscription {} closed", self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_unsubscribes() {
        let hooks = RepaintHooks::new();
        let a = hooks.subscribe();
        let b = hooks.subscribe();
        assert_ne!(a.id(), b.id());
        assert_eq!(hooks.subscriber_count(), 2);
        drop(a);
        assert_eq!(hooks.subscriber_count(), 1);
        assert!(b.is_live());
    }

    #[test]
    fn subscription_outliving_source_is_dead() {
        let hooks = RepaintHooks::new();
        let subscription = hooks.subscribe();
        drop(hooks);
        assert!(!subscription.is_live());
    }
}
