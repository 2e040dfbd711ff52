//! History notifications and the bus that delivers them.
//!
//! Buses form a tree: an event dispatched on a child bus reaches the child's
//! listeners first and then bubbles up to every ancestor. A host that owns
//! several surfaces can listen once on a shared parent bus.

use crate::history::Entry;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use uuid::Uuid;

/// Identifies the surface an event came from.
pub type SurfaceId = Uuid;

/// Which notification fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistoryEventKind {
    /// A new entry was committed to the log.
    Changed,
    /// The visible step moved (commit, undo or redo).
    Step,
}

impl HistoryEventKind {
    /// Event name as exposed to hosts.
    pub fn name(self) -> &'static str {
        match self {
            HistoryEventKind::Changed => "history-changed",
            HistoryEventKind::Step => "history-step",
        }
    }
}

/// A history notification. Borrowed from the surface for the duration of
/// the dispatch.
#[derive(Debug, Clone, Copy)]
pub struct HistoryEvent<'a> {
    pub kind: HistoryEventKind,
    pub source: SurfaceId,
    pub log: &'a [Entry],
    pub current_step: usize,
}

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Shared so a dispatch can run listeners without holding the bus borrowed.
type Listener = Rc<RefCell<dyn FnMut(&HistoryEvent<'_>)>>;

#[derive(Default)]
struct BusInner {
    listeners: Vec<(ListenerId, Listener)>,
    next_id: u64,
    parent: Option<EventBus>,
}

/// Shared, single-threaded notification bus.
///
/// Cloning yields another handle to the same bus.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Rc<RefCell<BusInner>>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("EventBus")
            .field("listeners", &inner.listeners.len())
            .field("has_parent", &inner.parent.is_some())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bus whose events bubble up to `self`.
    pub fn child(&self) -> Self {
        let bus = Self::new();
        bus.inner.borrow_mut().parent = Some(self.clone());
        bus
    }

    /// Register a listener for every event on this bus and its descendants.
    pub fn subscribe(&self, listener: impl FnMut(&HistoryEvent<'_>) + 'static) -> ListenerId {
        let mut inner = self.inner.borrow_mut();
        let id = ListenerId(inner.next_id);
        inner.next_id += 1;
        let listener: Listener = Rc::new(RefCell::new(listener));
        inner.listeners.push((id, listener));
        id
    }

    /// Register a listener for one kind of event only.
    pub fn subscribe_to(
        &self,
        kind: HistoryEventKind,
        mut listener: impl FnMut(&HistoryEvent<'_>) + 'static,
    ) -> ListenerId {
        self.subscribe(move |event| {
            if event.kind == kind {
                listener(event);
            }
        })
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.listeners.len();
        inner.listeners.retain(|(listener_id, _)| *listener_id != id);
        inner.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    fn is_subscribed(&self, id: ListenerId) -> bool {
        self.inner
            .borrow()
            .listeners
            .iter()
            .any(|(listener_id, _)| *listener_id == id)
    }

    /// Deliver an event here, then to each ancestor.
    ///
    /// Listeners may subscribe, unsubscribe or dispatch on this bus while
    /// they run. Listeners added during a dispatch see the next event, not
    /// the current one. A listener removed during a dispatch is not called
    /// again, and a listener is never re-entered by its own nested dispatch.
    pub fn dispatch(&self, event: &HistoryEvent<'_>) {
        let snapshot: Vec<(ListenerId, Listener)> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .map(|(id, listener)| (*id, Rc::clone(listener)))
            .collect();

        for (id, listener) in snapshot {
            if !self.is_subscribed(id) {
                continue;
            }
            let Ok(mut listener) = listener.try_borrow_mut() else {
                continue;
            };
            (&mut *listener)(event);
        }

        let parent = self.inner.borrow().parent.clone();
        if let Some(parent) = parent {
            parent.dispatch(event);
        }
    }
}
