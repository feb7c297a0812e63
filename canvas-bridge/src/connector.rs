//! # Connector
//!
//! Routes gestures from a [`GestureManager`] to the scene graph node each
//! gesture began on.
//!
//! ```text
//! manager ── hammer.input (is_first) ──▶ resolve target ──▶ first_target
//!         ── pan / tap / ...        ──▶ first_target or fresh hit-test
//!                                        └─▶ dispatch "hammer-<type>"
//! ```
//!
//! The input listener is installed before any gesture listener, so the
//! cached target is written before the gestures of the same sample read it.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::{
    event_name, BridgeError, BridgeResult, ConnectorConfig, GestureHandler, GestureInput,
    GestureManager, InteractionStrategy, LegacyInteraction, ListenerId, Manager, NodeRef, Point,
    PositionMapper, SceneRoot, Surface, INPUT_EVENT,
};

/// Routing state shared with the listeners installed on the manager.
struct Routing {
    strategy: InteractionStrategy,
    config: Cell<ConnectorConfig>,
    first_target: RefCell<Option<NodeRef>>,
}

impl Routing {
    fn on_input(&self, input: &GestureInput) {
        if !input.is_first {
            return;
        }
        let target = self.strategy.resolve_target(input.center);
        tracing::debug!(
            mode = self.strategy.mode(),
            x = input.center.x,
            y = input.center.y,
            node = ?target.as_ref().and_then(|node| node.label()),
            hit = target.is_some(),
            "First gesture sample"
        );
        *self.first_target.borrow_mut() = target;
    }

    fn on_gesture(&self, event: &str, input: &GestureInput) {
        let target = if self.config.get().use_only_first_hit_test {
            self.first_target.borrow().clone()
        } else {
            self.strategy.resolve_target(input.center)
        };

        let Some(target) = target else {
            tracing::trace!("No target for {event}, dropping sample");
            return;
        };

        tracing::trace!(node = ?target.label(), "Dispatching {event}");
        self.strategy.dispatch(&target, event, input);
    }
}

/// Bridges a gesture manager to a scene graph.
pub struct Connector {
    routing: Rc<Routing>,
    manager: Option<Rc<dyn GestureManager>>,
    owns_manager: bool,
    offset: Point,
    input_listener: Option<ListenerId>,
    /// Forwarded gesture types with their listeners, in registration order.
    listeners: Vec<(String, ListenerId)>,
}

impl Connector {
    /// Create a connector.
    ///
    /// Without a `manager`, the connector creates a [`Manager`] bound to
    /// `surface` and owns it.
    #[must_use]
    pub fn new(
        surface: Rc<dyn Surface>,
        strategy: InteractionStrategy,
        manager: Option<Rc<dyn GestureManager>>,
        config: ConnectorConfig,
    ) -> Self {
        let offset = surface.bounding_client_rect().origin();
        let owns_manager = manager.is_none();
        let manager = manager.unwrap_or_else(|| {
            let owned: Rc<dyn GestureManager> = Rc::new(Manager::new(Rc::clone(&surface)));
            owned
        });

        tracing::debug!(
            mode = strategy.mode(),
            owns_manager,
            "Connector created at offset ({}, {})",
            offset.x,
            offset.y
        );

        Self {
            routing: Rc::new(Routing {
                strategy,
                config: Cell::new(config),
                first_target: RefCell::new(None),
            }),
            manager: Some(manager),
            owns_manager,
            offset,
            input_listener: None,
            listeners: Vec::new(),
        }
    }

    /// Start building a connector for `surface`.
    #[must_use]
    pub fn builder(surface: Rc<dyn Surface>) -> ConnectorBuilder {
        ConnectorBuilder::new(surface)
    }

    /// The gesture manager, until [`destroy`](Self::destroy) releases it.
    #[must_use]
    pub fn manager(&self) -> Option<&Rc<dyn GestureManager>> {
        self.manager.as_ref()
    }

    /// Whether the connector created its manager.
    #[must_use]
    pub const fn owns_manager(&self) -> bool {
        self.owns_manager
    }

    /// The interaction strategy.
    #[must_use]
    pub fn strategy(&self) -> &InteractionStrategy {
        &self.routing.strategy
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> ConnectorConfig {
        self.routing.config.get()
    }

    /// Replace the configuration. Applies from the next notification.
    pub fn set_config(&mut self, config: ConnectorConfig) {
        self.routing.config.set(config);
    }

    /// Cached client-space offset of the canvas.
    #[must_use]
    pub const fn offset(&self) -> Point {
        self.offset
    }

    /// Node resolved from the first sample of the current gesture.
    #[must_use]
    pub fn cached_target(&self) -> Option<NodeRef> {
        self.routing.first_target.borrow().clone()
    }

    /// Forwarded gesture types, in registration order.
    pub fn registered_types(&self) -> impl Iterator<Item = &str> {
        self.listeners.iter().map(|(kind, _)| kind.as_str())
    }

    /// Event names the forwarded gesture types are dispatched under.
    #[must_use]
    pub fn registered_events(&self) -> Vec<String> {
        self.registered_types().map(event_name).collect()
    }

    /// Map a client point into renderer space.
    #[must_use]
    pub fn normalize_point(&self, raw: Point) -> Point {
        self.routing.strategy.normalize_point(raw)
    }

    /// The node under a client point.
    #[must_use]
    pub fn resolve_target(&self, raw: Point) -> Option<NodeRef> {
        self.routing.strategy.resolve_target(raw)
    }

    /// Deliver `event` to `target` through the active strategy.
    pub fn dispatch(&self, target: &NodeRef, event: &str, input: &GestureInput) {
        self.routing.strategy.dispatch(target, event, input);
    }

    /// Forward gestures of the given types to the scene graph.
    ///
    /// Each new type gets one listener on the manager; types that are
    /// already forwarded are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Destroyed`] after [`destroy`](Self::destroy).
    pub fn register_handler_types<S: AsRef<str>>(&mut self, types: &[S]) -> BridgeResult<()> {
        let manager = self.manager.as_ref().ok_or(BridgeError::Destroyed)?;

        if self.input_listener.is_none() {
            let routing = Rc::downgrade(&self.routing);
            let handler: GestureHandler = Rc::new(move |input: &GestureInput| {
                if let Some(routing) = routing.upgrade() {
                    routing.on_input(input);
                }
            });
            self.input_listener = Some(manager.on(INPUT_EVENT, handler));
        }

        for kind in types {
            let kind = kind.as_ref();
            if self.listeners.iter().any(|(registered, _)| registered == kind) {
                continue;
            }
            let routing: Weak<Routing> = Rc::downgrade(&self.routing);
            let event = event_name(kind);
            let handler: GestureHandler = Rc::new(move |input: &GestureInput| {
                if let Some(routing) = routing.upgrade() {
                    routing.on_gesture(&event, input);
                }
            });
            let id = manager.on(kind, handler);
            tracing::debug!("Forwarding {kind} as {}", event_name(kind));
            self.listeners.push((kind.to_string(), id));
        }

        Ok(())
    }

    /// Recompute the canvas offset from `surface`, or from the manager's
    /// element if none is given. Call whenever the canvas moves or resizes.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Destroyed`] if no surface is given and the
    /// manager was already released.
    pub fn update_cache(&mut self, surface: Option<&dyn Surface>) -> BridgeResult<Point> {
        let rect = match surface {
            Some(surface) => surface.bounding_client_rect(),
            None => self
                .manager
                .as_ref()
                .ok_or(BridgeError::Destroyed)?
                .element()
                .bounding_client_rect(),
        };
        self.offset = rect.origin();
        Ok(self.offset)
    }

    /// Detach listeners and release the gesture manager.
    ///
    /// A manager that is about to be destroyed has its whole registry
    /// cleared first. A supplied manager that survives
    /// ([`ConnectorConfig::destroy_supplied_manager`] off) only loses the
    /// listeners this connector installed. Calling this twice is a no-op.
    pub fn destroy(&mut self) {
        let Some(manager) = self.manager.take() else {
            return;
        };

        let destroy_manager = self.owns_manager || self.config().destroy_supplied_manager;
        if destroy_manager {
            for (name, ids) in manager.handlers() {
                for id in ids {
                    manager.off(&name, id);
                }
            }
            manager.destroy();
        } else {
            self.detach(manager.as_ref());
        }

        tracing::debug!(
            destroyed_manager = destroy_manager,
            "Connector destroyed, {} gesture types released",
            self.listeners.len()
        );

        self.input_listener = None;
        self.listeners.clear();
        self.routing.first_target.borrow_mut().take();
    }

    fn detach(&self, manager: &dyn GestureManager) {
        if let Some(id) = self.input_listener {
            manager.off(INPUT_EVENT, id);
        }
        for (kind, id) in &self.listeners {
            manager.off(kind, *id);
        }
    }
}

impl Drop for Connector {
    fn drop(&mut self) {
        if let Some(manager) = self.manager.take() {
            self.detach(manager.as_ref());
        }
    }
}

impl fmt::Debug for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connector")
            .field("strategy", &self.routing.strategy)
            .field("config", &self.config())
            .field("offset", &self.offset)
            .field("owns_manager", &self.owns_manager)
            .field("destroyed", &self.manager.is_none())
            .field("types", &self.listeners.iter().map(|(k, _)| k).collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Builds a [`Connector`] from an explicit choice of interaction API.
pub struct ConnectorBuilder {
    surface: Rc<dyn Surface>,
    legacy: Option<Rc<dyn LegacyInteraction>>,
    mapper: Option<Rc<dyn PositionMapper>>,
    root: Option<Rc<dyn SceneRoot>>,
    manager: Option<Rc<dyn GestureManager>>,
    config: ConnectorConfig,
}

impl ConnectorBuilder {
    fn new(surface: Rc<dyn Surface>) -> Self {
        Self {
            surface,
            legacy: None,
            mapper: None,
            root: None,
            manager: None,
            config: ConnectorConfig::default(),
        }
    }

    /// Use the legacy interaction manager. Takes precedence over
    /// [`boundary`](Self::boundary); the scene root is then unused.
    #[must_use]
    pub fn legacy(mut self, handle: Rc<dyn LegacyInteraction>) -> Self {
        self.legacy = Some(handle);
        self
    }

    /// Use boundary hit-testing with this coordinate mapper.
    #[must_use]
    pub fn boundary(mut self, mapper: Rc<dyn PositionMapper>) -> Self {
        self.mapper = Some(mapper);
        self
    }

    /// Root node for boundary hit-testing.
    #[must_use]
    pub fn scene_root(mut self, root: Rc<dyn SceneRoot>) -> Self {
        self.root = Some(root);
        self
    }

    /// Use an existing gesture manager instead of creating one.
    #[must_use]
    pub fn manager(mut self, manager: Rc<dyn GestureManager>) -> Self {
        self.manager = Some(manager);
        self
    }

    /// Set the configuration.
    #[must_use]
    pub fn config(mut self, config: ConnectorConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the connector.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::MissingInteraction`] if no interaction API was
    /// chosen, or [`BridgeError::MissingSceneRoot`] for boundary mode
    /// without a root.
    pub fn build(self) -> BridgeResult<Connector> {
        let strategy = match (self.legacy, self.mapper) {
            (Some(handle), _) => InteractionStrategy::legacy(handle),
            (None, Some(mapper)) => {
                let root = self.root.ok_or(BridgeError::MissingSceneRoot)?;
                InteractionStrategy::boundary(mapper, root)
            }
            (None, None) => return Err(BridgeError::MissingInteraction),
        };
        Ok(Connector::new(self.surface, strategy, self.manager, self.config))
    }
}
