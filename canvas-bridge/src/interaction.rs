//! Renderer interaction seams.
//!
//! Two generations of renderer interaction API are supported:
//!
//! ```text
//! LegacyHitDispatch            BoundaryHitEmit
//! ─────────────────            ───────────────
//! map_position_to_point        map_position_to_point
//! hit_test(point)              root.event_boundary().hit_test(x, y)
//! dispatch_event(node, ..)     node.emit(..)
//! ```
//!
//! Coordinate mapping is identical in both and never branches.

use std::fmt;
use std::rc::Rc;

use crate::{GestureInput, Point};

/// A scene graph node that can receive bridged events.
pub trait DisplayObject {
    /// Notify this node's listeners for `event`. Returns whether any ran.
    fn emit(&self, event: &str, input: &GestureInput) -> bool;

    /// Human-readable label for logs.
    fn label(&self) -> Option<String> {
        None
    }
}

/// Shared handle to a scene graph node.
pub type NodeRef = Rc<dyn DisplayObject>;

/// Whether two handles point at the same node.
#[must_use]
pub fn same_node(a: &NodeRef, b: &NodeRef) -> bool {
    Rc::as_ptr(a).cast::<()>() == Rc::as_ptr(b).cast::<()>()
}

/// Maps client coordinates into the renderer's coordinate space.
pub trait PositionMapper {
    /// Write the renderer-space position of client point `(x, y)` to `out`.
    fn map_position_to_point(&self, out: &mut Point, x: f32, y: f32);
}

/// The older synchronous interaction manager API.
pub trait LegacyInteraction: PositionMapper {
    /// Topmost interactive node at a renderer-space point.
    fn hit_test(&self, point: Point) -> Option<NodeRef>;

    /// Run the renderer's own dispatch pipeline for `event` on `target`.
    fn dispatch_event(&self, target: &NodeRef, event: &str, input: &GestureInput);
}

/// Spatial hit-testing over one root's subtree.
pub trait EventBoundary {
    /// Topmost interactive node at renderer-space `(x, y)`.
    fn hit_test(&self, x: f32, y: f32) -> Option<NodeRef>;
}

/// A scene graph root that boundaries can be built from.
pub trait SceneRoot {
    /// Build a boundary scoped to this root.
    fn event_boundary(self: Rc<Self>) -> Box<dyn EventBoundary>;
}

/// Which renderer interaction API a connector talks to.
#[derive(Clone)]
pub enum InteractionStrategy {
    /// Hit-test and dispatch through the legacy interaction manager.
    LegacyHitDispatch(Rc<dyn LegacyInteraction>),
    /// Hit-test through a per-call boundary and emit directly on the node.
    BoundaryHitEmit {
        /// Coordinate mapping half of the event system.
        mapper: Rc<dyn PositionMapper>,
        /// Root of the subtree gestures may target.
        root: Rc<dyn SceneRoot>,
    },
}

impl InteractionStrategy {
    /// Legacy strategy.
    #[must_use]
    pub fn legacy(handle: Rc<dyn LegacyInteraction>) -> Self {
        Self::LegacyHitDispatch(handle)
    }

    /// Boundary strategy.
    #[must_use]
    pub fn boundary(mapper: Rc<dyn PositionMapper>, root: Rc<dyn SceneRoot>) -> Self {
        Self::BoundaryHitEmit { mapper, root }
    }

    /// Short mode name for logs.
    #[must_use]
    pub const fn mode(&self) -> &'static str {
        match self {
            Self::LegacyHitDispatch(_) => "legacy",
            Self::BoundaryHitEmit { .. } => "boundary",
        }
    }

    /// Map a client point into renderer space.
    #[must_use]
    pub fn normalize_point(&self, raw: Point) -> Point {
        let mut out = Point::ZERO;
        match self {
            Self::LegacyHitDispatch(handle) => handle.map_position_to_point(&mut out, raw.x, raw.y),
            Self::BoundaryHitEmit { mapper, .. } => {
                mapper.map_position_to_point(&mut out, raw.x, raw.y);
            }
        }
        out
    }

    /// Hit-test an already normalized point.
    #[must_use]
    pub fn hit_test(&self, point: Point) -> Option<NodeRef> {
        match self {
            Self::LegacyHitDispatch(handle) => handle.hit_test(point),
            Self::BoundaryHitEmit { root, .. } => {
                Rc::clone(root).event_boundary().hit_test(point.x, point.y)
            }
        }
    }

    /// Normalize a client point and hit-test it.
    #[must_use]
    pub fn resolve_target(&self, raw: Point) -> Option<NodeRef> {
        self.hit_test(self.normalize_point(raw))
    }

    /// Deliver `event` to `target`.
    pub fn dispatch(&self, target: &NodeRef, event: &str, input: &GestureInput) {
        match self {
            Self::LegacyHitDispatch(handle) => handle.dispatch_event(target, event, input),
            Self::BoundaryHitEmit { .. } => {
                target.emit(event, input);
            }
        }
    }
}

impl fmt::Debug for InteractionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("InteractionStrategy").field(&self.mode()).finish()
    }
}
