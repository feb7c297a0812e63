//! The gesture manager seam.
//!
//! Gesture recognition happens elsewhere. The bridge only needs a manager
//! that accepts named listeners and emits [`GestureInput`] notifications to
//! them, in the order the recognizer produces them: the low-level
//! [`INPUT_EVENT`](crate::INPUT_EVENT) first, then any recognized gestures.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::{GestureInput, Surface, INPUT_EVENT};

/// A listener installed on a gesture manager.
pub type GestureHandler = Rc<dyn Fn(&GestureInput)>;

/// Identifies one installed listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

/// The interface the bridge needs from a gesture recognizer.
pub trait GestureManager {
    /// Install a listener for notifications named `name`.
    fn on(&self, name: &str, handler: GestureHandler) -> ListenerId;

    /// Remove one listener. Returns whether it was installed.
    fn off(&self, name: &str, id: ListenerId) -> bool;

    /// Installed listeners grouped by notification name.
    fn handlers(&self) -> Vec<(String, Vec<ListenerId>)>;

    /// Deliver a notification to the listeners of `name`.
    fn emit(&self, name: &str, input: &GestureInput);

    /// The surface this manager recognizes gestures over.
    fn element(&self) -> Rc<dyn Surface>;

    /// Stop recognizing and drop every listener.
    fn destroy(&self);

    /// Whether [`destroy`](Self::destroy) was called.
    fn is_destroyed(&self) -> bool;

    /// Emit one input sample: the low-level notification first, then each
    /// recognized gesture type.
    fn recognize(&self, input: &GestureInput, recognized: &[&str]) {
        self.emit(INPUT_EVENT, input);
        for kind in recognized {
            self.emit(kind, &input.as_type(kind));
        }
    }
}

/// A listener registry bound to a surface.
///
/// This is the manager a connector creates when the caller does not supply
/// one. Hosts feed it samples from their own recognizer through
/// [`GestureManager::recognize`] or [`GestureManager::emit`].
pub struct Manager {
    element: Rc<dyn Surface>,
    handlers: RefCell<BTreeMap<String, Vec<(ListenerId, GestureHandler)>>>,
    next_id: Cell<u64>,
    destroyed: Cell<bool>,
}

impl Manager {
    /// Create a manager bound to `element`.
    #[must_use]
    pub fn new(element: Rc<dyn Surface>) -> Self {
        Self {
            element,
            handlers: RefCell::new(BTreeMap::new()),
            next_id: Cell::new(0),
            destroyed: Cell::new(false),
        }
    }

    /// Total number of installed listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.handlers.borrow().values().map(Vec::len).sum()
    }
}

impl fmt::Debug for Manager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager")
            .field("listeners", &self.listener_count())
            .field("destroyed", &self.destroyed.get())
            .finish_non_exhaustive()
    }
}

impl GestureManager for Manager {
    fn on(&self, name: &str, handler: GestureHandler) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.handlers
            .borrow_mut()
            .entry(name.to_string())
            .or_default()
            .push((id, handler));
        id
    }

    fn off(&self, name: &str, id: ListenerId) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        let Some(listeners) = handlers.get_mut(name) else {
            return false;
        };
        let before = listeners.len();
        listeners.retain(|(listener, _)| *listener != id);
        let removed = listeners.len() != before;
        if listeners.is_empty() {
            handlers.remove(name);
        }
        removed
    }

    fn handlers(&self) -> Vec<(String, Vec<ListenerId>)> {
        self.handlers
            .borrow()
            .iter()
            .map(|(name, listeners)| (name.clone(), listeners.iter().map(|(id, _)| *id).collect()))
            .collect()
    }

    fn emit(&self, name: &str, input: &GestureInput) {
        if self.destroyed.get() {
            return;
        }
        // Snapshot so listeners can call on/off while being notified.
        let listeners: Vec<GestureHandler> = match self.handlers.borrow().get(name) {
            Some(listeners) => listeners.iter().map(|(_, h)| Rc::clone(h)).collect(),
            None => return,
        };
        for handler in listeners {
            handler(input);
        }
    }

    fn element(&self) -> Rc<dyn Surface> {
        Rc::clone(&self.element)
    }

    fn destroy(&self) {
        self.handlers.borrow_mut().clear();
        self.destroyed.set(true);
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed.get()
    }
}
