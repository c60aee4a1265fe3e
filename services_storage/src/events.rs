//! Storage events

use core_types::{AccessKind, AccessorId, Identifier};
use std::fmt;

/// Observable storage activity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageEvent {
    /// An identifier was accessed, including directory steps and cache hits
    ///
    /// `accessor` stays the same across cache hits and changes when the
    /// identifier is materialized again after a release or drop.
    Access {
        identifier: Identifier,
        kind: AccessKind,
        accessor: AccessorId,
    },
    /// A resource was destroyed by a drop
    Destroy { identifier: Identifier },
}

type Listener = Box<dyn Fn(&StorageEvent) + Send + Sync>;

/// Registered event callbacks, called in registration order
#[derive(Default)]
pub struct Listeners {
    listeners: Vec<Listener>,
}

impl Listeners {
    pub fn add(&mut self, listener: impl Fn(&StorageEvent) + Send + Sync + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn emit(&self, event: StorageEvent) {
        for listener in &self.listeners {
            listener(&event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.listeners.len())
            .finish()
    }
}
