//! Observer lists for component notifications
//!
//! Every component owns its own subscriber lists; nothing is global. Callbacks
//! receive a borrowed snapshot and cannot reach back into the emitter.

/// Ordered list of callbacks notified with a borrowed event
pub struct Subscribers<E: ?Sized> {
    subs: Vec<Box<dyn FnMut(&E)>>,
}

impl<E: ?Sized> Subscribers<E> {
    pub fn new() -> Self {
        Self { subs: Vec::new() }
    }

    /// Register a callback; callbacks fire in registration order
    pub fn subscribe(&mut self, sub: impl FnMut(&E) + 'static) {
        self.subs.push(Box::new(sub));
    }

    /// Notify every subscriber
    pub fn emit(&mut self, event: &E) {
        for sub in &mut self.subs {
            sub(event);
        }
    }

    pub fn len(&self) -> usize {
        self.subs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }
}

impl<E: ?Sized> Default for Subscribers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ?Sized> std::fmt::Debug for Subscribers<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("len", &self.subs.len())
            .finish()
    }
}
