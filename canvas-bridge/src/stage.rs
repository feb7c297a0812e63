//! Headless scene graph implementing both renderer interaction APIs.
//!
//! Hosts without a renderer of their own (native shells, tests) can route
//! gestures into a [`Stage`] of [`Node`]s and listen for `hammer-*` events on
//! the nodes directly.
//!
//! Legacy dispatch bubbles from the target up through its ancestors. Boundary
//! mode emits on the target only.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    same_node, DisplayObject, EventBoundary, GestureHandler, GestureInput, InteractionStrategy,
    LegacyInteraction, NodeRef, Point, PositionMapper, Rect, SceneRoot, Surface,
};

/// Unique identifier for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Create a new unique node ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position, size and layer of a node, in stage coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// X position (pixels from left).
    pub x: f32,
    /// Y position (pixels from top).
    pub y: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
    /// Z-index for layering among siblings.
    pub z_index: i32,
}

impl Transform {
    /// Bounds at `(x, y)` on layer 0.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            z_index: 0,
        }
    }

    /// Same bounds on another layer.
    #[must_use]
    pub const fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(0.0, 0.0, 100.0, 100.0)
    }
}

/// A node in the stage tree.
pub struct Node {
    id: NodeId,
    name: String,
    transform: Cell<Transform>,
    interactive: Cell<bool>,
    parent: RefCell<Weak<Node>>,
    children: RefCell<Vec<Rc<Node>>>,
    listeners: RefCell<HashMap<String, Vec<GestureHandler>>>,
}

impl Node {
    /// Create an interactive node.
    #[must_use]
    pub fn new(name: impl Into<String>, transform: Transform) -> Rc<Self> {
        Rc::new(Self {
            id: NodeId::new(),
            name: name.into(),
            transform: Cell::new(transform),
            interactive: Cell::new(true),
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
            listeners: RefCell::new(HashMap::new()),
        })
    }

    /// Create a non-interactive container. Its children can still be hit.
    #[must_use]
    pub fn container(name: impl Into<String>, transform: Transform) -> Rc<Self> {
        let node = Self::new(name, transform);
        node.set_interactive(false);
        node
    }

    /// Node ID.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// Node name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current transform.
    #[must_use]
    pub fn transform(&self) -> Transform {
        self.transform.get()
    }

    /// Move or resize the node.
    pub fn set_transform(&self, transform: Transform) {
        self.transform.set(transform);
    }

    /// Whether the node itself can be hit.
    #[must_use]
    pub fn interactive(&self) -> bool {
        self.interactive.get()
    }

    /// Set whether the node itself can be hit.
    pub fn set_interactive(&self, interactive: bool) {
        self.interactive.set(interactive);
    }

    /// Append a child, re-parenting it.
    ///
    /// Returns `false` and leaves the tree untouched when `child` is this
    /// node or one of its ancestors.
    pub fn add_child(self: &Rc<Self>, child: Rc<Node>) -> bool {
        if self.is_within(&child) {
            tracing::debug!(
                "Refusing to add {} under its own descendant {}",
                child.name,
                self.name
            );
            return false;
        }
        if let Some(old) = child.parent() {
            old.remove_child(child.id);
        }
        *child.parent.borrow_mut() = Rc::downgrade(self);
        self.children.borrow_mut().push(child);
        true
    }

    /// Whether this node is `ancestor` or lies in its subtree.
    #[must_use]
    pub fn is_within(&self, ancestor: &Node) -> bool {
        if self.id == ancestor.id {
            return true;
        }
        let mut cursor = self.parent();
        while let Some(node) = cursor {
            if node.id == ancestor.id {
                return true;
            }
            cursor = node.parent();
        }
        false
    }

    /// The node in this subtree that `target` refers to.
    #[must_use]
    pub fn find(self: &Rc<Self>, target: &NodeRef) -> Option<Rc<Node>> {
        let this: NodeRef = Rc::clone(self) as NodeRef;
        if same_node(&this, target) {
            return Some(Rc::clone(self));
        }
        self.children().iter().find_map(|child| child.find(target))
    }

    /// Detach a child by ID.
    pub fn remove_child(&self, id: NodeId) -> Option<Rc<Node>> {
        let mut children = self.children.borrow_mut();
        let index = children.iter().position(|child| child.id == id)?;
        let child = children.remove(index);
        *child.parent.borrow_mut() = Weak::new();
        Some(child)
    }

    /// Parent node, if attached.
    #[must_use]
    pub fn parent(&self) -> Option<Rc<Node>> {
        self.parent.borrow().upgrade()
    }

    /// Children in insertion order.
    #[must_use]
    pub fn children(&self) -> Vec<Rc<Node>> {
        self.children.borrow().clone()
    }

    /// Listen for `event` on this node.
    pub fn on(&self, event: &str, handler: GestureHandler) {
        self.listeners
            .borrow_mut()
            .entry(event.to_string())
            .or_default()
            .push(handler);
    }

    /// Remove every listener for `event`. Returns how many were removed.
    pub fn off_all(&self, event: &str) -> usize {
        self.listeners
            .borrow_mut()
            .remove(event)
            .map_or(0, |handlers| handlers.len())
    }

    /// Check if a stage-space point is within this node's bounds.
    #[must_use]
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        self.transform().bounds().contains(Point::new(x, y))
    }

    /// Deepest interactive node at `(x, y)` in this subtree.
    ///
    /// Higher z-index wins among siblings, then later siblings.
    #[must_use]
    pub fn node_at(self: &Rc<Self>, x: f32, y: f32) -> Option<Rc<Node>> {
        let mut children = self.children();
        children.reverse();
        children.sort_by(|a, b| b.transform().z_index.cmp(&a.transform().z_index));

        if let Some(hit) = children.iter().find_map(|child| child.node_at(x, y)) {
            return Some(hit);
        }

        (self.interactive() && self.contains_point(x, y)).then(|| Rc::clone(self))
    }
}

impl DisplayObject for Node {
    fn emit(&self, event: &str, input: &GestureInput) -> bool {
        let handlers: Vec<GestureHandler> = self
            .listeners
            .borrow()
            .get(event)
            .cloned()
            .unwrap_or_default();
        for handler in &handlers {
            handler(input);
        }
        !handlers.is_empty()
    }

    fn label(&self) -> Option<String> {
        Some(self.name.clone())
    }
}

impl SceneRoot for Node {
    fn event_boundary(self: Rc<Self>) -> Box<dyn EventBoundary> {
        Box::new(Boundary::new(self))
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("transform", &self.transform())
            .field("interactive", &self.interactive())
            .field("children", &self.children.borrow().len())
            .finish_non_exhaustive()
    }
}

/// Hit-testing scoped to one node's subtree.
#[derive(Debug)]
pub struct Boundary {
    root: Rc<Node>,
}

impl Boundary {
    /// Create a boundary over `root`.
    #[must_use]
    pub fn new(root: Rc<Node>) -> Self {
        Self { root }
    }
}

impl EventBoundary for Boundary {
    fn hit_test(&self, x: f32, y: f32) -> Option<NodeRef> {
        self.root.node_at(x, y).map(|node| node as NodeRef)
    }
}

/// A node tree drawn onto a surface.
pub struct Stage {
    root: Rc<Node>,
    surface: Rc<dyn Surface>,
    view_width: Cell<f32>,
    view_height: Cell<f32>,
    resolution: Cell<f32>,
}

impl Stage {
    /// Create a stage whose view is `view_width` x `view_height` pixels.
    #[must_use]
    pub fn new(
        root: Rc<Node>,
        surface: Rc<dyn Surface>,
        view_width: f32,
        view_height: f32,
    ) -> Self {
        Self {
            root,
            surface,
            view_width: Cell::new(view_width),
            view_height: Cell::new(view_height),
            resolution: Cell::new(1.0),
        }
    }

    /// Device pixel ratio the view is rendered at.
    #[must_use]
    pub fn with_resolution(self, resolution: f32) -> Self {
        self.set_resolution(resolution);
        self
    }

    /// Change the device pixel ratio. Non-positive or non-finite values are
    /// ignored.
    pub fn set_resolution(&self, resolution: f32) {
        if resolution > 0.0 && resolution.is_finite() {
            self.resolution.set(resolution);
        } else {
            tracing::debug!("Ignoring invalid stage resolution {resolution}");
        }
    }

    /// Current device pixel ratio.
    #[must_use]
    pub fn resolution(&self) -> f32 {
        self.resolution.get()
    }

    /// Root node.
    #[must_use]
    pub fn root(&self) -> &Rc<Node> {
        &self.root
    }

    /// Resize the view.
    pub fn resize(&self, view_width: f32, view_height: f32) {
        self.view_width.set(view_width);
        self.view_height.set(view_height);
    }

    /// Route through [`LegacyInteraction`].
    #[must_use]
    pub fn legacy_strategy(self: &Rc<Self>) -> InteractionStrategy {
        InteractionStrategy::legacy(Rc::clone(self) as Rc<dyn LegacyInteraction>)
    }

    /// Route through boundaries over the root node.
    #[must_use]
    pub fn boundary_strategy(self: &Rc<Self>) -> InteractionStrategy {
        InteractionStrategy::boundary(
            Rc::clone(self) as Rc<dyn PositionMapper>,
            Rc::clone(&self.root) as Rc<dyn SceneRoot>,
        )
    }
}

impl PositionMapper for Stage {
    fn map_position_to_point(&self, out: &mut Point, x: f32, y: f32) {
        let rect = self.surface.bounding_client_rect();
        let scale_x = if rect.width > 0.0 {
            self.view_width.get() / rect.width
        } else {
            1.0
        };
        let scale_y = if rect.height > 0.0 {
            self.view_height.get() / rect.height
        } else {
            1.0
        };
        let resolution = self.resolution.get();
        out.x = (x - rect.left) * scale_x / resolution;
        out.y = (y - rect.top) * scale_y / resolution;
    }
}

impl LegacyInteraction for Stage {
    fn hit_test(&self, point: Point) -> Option<NodeRef> {
        self.root.node_at(point.x, point.y).map(|node| node as NodeRef)
    }

    fn dispatch_event(&self, target: &NodeRef, event: &str, input: &GestureInput) {
        // Nodes outside this stage get the event without propagation.
        let Some(node) = self.root.find(target) else {
            target.emit(event, input);
            return;
        };
        let mut current = Some(node);
        while let Some(node) = current {
            node.emit(event, input);
            current = node.parent();
        }
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("root", &self.root.name())
            .field("view", &(self.view_width.get(), self.view_height.get()))
            .field("resolution", &self.resolution.get())
            .finish_non_exhaustive()
    }
}
