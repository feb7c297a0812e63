//! # Canvas Bridge
//!
//! Routes gestures recognized over a canvas to the scene graph node each
//! gesture began on, re-emitted as `hammer-<type>` events the node can
//! listen for.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────┐   hammer.input, pan, tap ...   ┌──────────────────┐
//! │  GestureManager   │ ─────────────────────────────▶ │    Connector     │
//! │  (recognizer)     │                                │  - first target  │
//! └───────────────────┘                                │  - hit-testing   │
//!                                                      └────────┬─────────┘
//!                        LegacyHitDispatch / BoundaryHitEmit    │
//!                                                               ▼
//!                                                      ┌──────────────────┐
//!                                                      │  scene graph     │
//!                                                      │  node "hammer-*" │
//!                                                      └──────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use canvas_bridge::{
//!     Connector, ConnectorConfig, GestureInput, GestureManager, HeadlessSurface, Node, Point,
//!     Rect, Stage, Transform,
//! };
//!
//! let surface = Rc::new(HeadlessSurface::new(Rect::new(0.0, 0.0, 800.0, 600.0)));
//! let root = Node::container("root", Transform::new(0.0, 0.0, 800.0, 600.0));
//! let button = Node::new("button", Transform::new(10.0, 10.0, 100.0, 40.0));
//! root.add_child(Rc::clone(&button));
//!
//! let taps = Rc::new(Cell::new(0));
//! let counter = Rc::clone(&taps);
//! button.on("hammer-tap", Rc::new(move |_: &GestureInput| counter.set(counter.get() + 1)));
//!
//! let stage = Rc::new(Stage::new(root, surface.clone(), 800.0, 600.0));
//! let mut connector = Connector::new(surface, stage.boundary_strategy(), None, ConnectorConfig::default());
//! connector.register_handler_types(&["tap"]).unwrap();
//!
//! let manager = connector.manager().unwrap();
//! manager.recognize(&GestureInput::raw(Point::new(20.0, 20.0)).first(), &["tap"]);
//! assert_eq!(taps.get(), 1);
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod connector;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod interaction;
pub mod manager;
pub mod stage;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use config::ConnectorConfig;
pub use connector::{Connector, ConnectorBuilder};
pub use error::{BridgeError, BridgeResult};
pub use geometry::{HeadlessSurface, Point, Rect, Surface};
pub use gesture::{event_name, GestureInput, InputPhase, EVENT_PREFIX, INPUT_EVENT};
pub use interaction::{
    same_node, DisplayObject, EventBoundary, InteractionStrategy, LegacyInteraction, NodeRef,
    PositionMapper, SceneRoot,
};
pub use manager::{GestureHandler, GestureManager, ListenerId, Manager};
pub use stage::{Boundary, Node, NodeId, Stage, Transform};

/// Bridge version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
