//! Change notification for collections.
//!
//! Handlers are plain closures registered per event kind (or for every
//! event). Emission is synchronous: `emit` returns after every matching
//! handler ran, in registration order. Handlers are invoked outside the
//! registry lock, so a handler may subscribe or unsubscribe.

use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};

use crate::error::ErrorCode;
use crate::pagination::PageState;

/// Events emitted by a collection.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionEvent<R> {
    /// A record was inserted at `index`.
    Add { record: R, index: usize },
    /// A record was removed from `index`.
    Remove { record: R, index: usize },
    /// The whole content was replaced.
    Reset { len: usize },
    /// A fetch for `page` is about to be issued.
    Request { page: u64, url: String },
    /// A fetch for `page` completed.
    Sync { page: u64, url: String, received: usize },
    /// A fetch for `page` failed.
    Error {
        page: u64,
        code: ErrorCode,
        message: String,
    },
    /// The paging state moved.
    StateChange {
        previous: PageState,
        current: PageState,
    },
}

impl<R> CollectionEvent<R> {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Add { .. } => EventKind::Add,
            Self::Remove { .. } => EventKind::Remove,
            Self::Reset { .. } => EventKind::Reset,
            Self::Request { .. } => EventKind::Request,
            Self::Sync { .. } => EventKind::Sync,
            Self::Error { .. } => EventKind::Error,
            Self::StateChange { .. } => EventKind::StateChange,
        }
    }
}

/// Discriminant of [`CollectionEvent`], used to subscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Add,
    Remove,
    Reset,
    Request,
    Sync,
    Error,
    StateChange,
}

impl EventKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Reset => "reset",
            Self::Request => "request",
            Self::Sync => "sync",
            Self::Error => "error",
            Self::StateChange => "pageable:state:change",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which events a handler receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventFilter {
    All,
    Kind(EventKind),
}

impl EventFilter {
    fn matches(&self, kind: EventKind) -> bool {
        match self {
            Self::All => true,
            Self::Kind(k) => *k == kind,
        }
    }
}

impl From<EventKind> for EventFilter {
    fn from(kind: EventKind) -> Self {
        Self::Kind(kind)
    }
}

type Handler<R> = Arc<dyn Fn(&CollectionEvent<R>) + Send + Sync>;

struct Listener<R> {
    id: u64,
    filter: EventFilter,
    handler: Handler<R>,
}

struct Registry<R> {
    next_id: u64,
    listeners: Vec<Listener<R>>,
}

/// Listener registry shared by a collection.
pub struct EventBus<R> {
    registry: Arc<Mutex<Registry<R>>>,
}

impl<R: Send + 'static> EventBus<R> {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// Register `handler` for the events matching `filter`.
    pub fn subscribe<F>(&self, filter: impl Into<EventFilter>, handler: F) -> Subscription
    where
        F: Fn(&CollectionEvent<R>) + Send + Sync + 'static,
    {
        let id = {
            let mut registry = self.registry.lock();
            let id = registry.next_id;
            registry.next_id += 1;
            registry.listeners.push(Listener {
                id,
                filter: filter.into(),
                handler: Arc::new(handler),
            });
            id
        };

        let weak: Weak<Mutex<Registry<R>>> = Arc::downgrade(&self.registry);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(registry) = weak.upgrade() {
                    registry.lock().listeners.retain(|l| l.id != id);
                }
            })),
        }
    }

    pub fn emit(&self, event: &CollectionEvent<R>) {
        let kind = event.kind();
        let handlers: Vec<Handler<R>> = self
            .registry
            .lock()
            .listeners
            .iter()
            .filter(|l| l.filter.matches(kind))
            .map(|l| Arc::clone(&l.handler))
            .collect();

        for handler in handlers {
            handler(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.registry.lock().listeners.len()
    }
}

impl<R: Send + 'static> Default for EventBus<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for EventBus<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.registry.lock().listeners.len())
            .finish()
    }
}

/// Handle returned by `subscribe`.
///
/// Dropping the handle leaves the handler registered; call
/// [`Subscription::unsubscribe`] to remove it.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
