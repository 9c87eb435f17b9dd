//! Handler chains shared by route groups and their routes.
//!
//! A [`HandlerChain`] is a handle to an ordered, append-only list of
//! handlers. Cloning the handle shares the list: appends through one clone
//! are seen by every other clone. [`HandlerChain::snapshot`] produces an
//! independent copy instead.
//!
//! ```text
//! group.handlers ──┬── route A (reads the chain at dispatch)
//!                  └── route B
//! group.group("/v1") ── snapshot ── subgroup.handlers (own list)
//! ```

use crate::handler::BoxedHandler;
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct HandlerChain {
    handlers: Arc<RwLock<Vec<BoxedHandler>>>,
}

impl HandlerChain {
    pub fn new(handlers: Vec<BoxedHandler>) -> Self {
        Self {
            handlers: Arc::new(RwLock::new(handlers)),
        }
    }

    /// Append handlers in order.
    pub fn extend(&self, handlers: impl IntoIterator<Item = BoxedHandler>) {
        self.handlers.write().extend(handlers);
    }

    /// Independent copy of the chain as it is right now.
    pub fn snapshot(&self) -> Self {
        Self::new(self.handlers())
    }

    /// Current handlers, in execution order.
    pub fn handlers(&self) -> Vec<BoxedHandler> {
        self.handlers.read().clone()
    }

    pub fn len(&self) -> usize {
        self.handlers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.read().is_empty()
    }

    /// True when both handles point at the same underlying list.
    pub fn is_shared_with(&self, other: &HandlerChain) -> bool {
        Arc::ptr_eq(&self.handlers, &other.handlers)
    }
}

impl std::fmt::Debug for HandlerChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerChain")
            .field("len", &self.len())
            .finish()
    }
}
