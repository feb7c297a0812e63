//! Gesture Routing Integration Tests
//!
//! Drives a connector end to end against the headless stage:
//! - Sticky first-hit targeting across a gesture
//! - Legacy and boundary interaction APIs
//! - Coordinate normalization and offset recaching
//! - Teardown

use std::cell::RefCell;
use std::rc::Rc;

use canvas_bridge::{
    same_node, Connector, ConnectorConfig, GestureInput, GestureManager, HeadlessSurface,
    InteractionStrategy, Manager, Node, NodeRef, Point, Rect, Stage, Transform, INPUT_EVENT,
};

type EventLog = Rc<RefCell<Vec<(String, String, Point)>>>;

/// Install a subscriber so routing logs show up in failing test output.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("canvas_bridge=trace")
        .try_init();
}

/// Root with two side-by-side interactive nodes, `a` at (0,0)-(15,15) and
/// `b` at (16,0)-(100,15).
fn two_node_stage(surface: &Rc<HeadlessSurface>) -> (Rc<Stage>, Rc<Node>, Rc<Node>) {
    let root = Node::container("root", Transform::new(0.0, 0.0, 800.0, 600.0));
    let a = Node::new("a", Transform::new(0.0, 0.0, 15.0, 15.0));
    let b = Node::new("b", Transform::new(16.0, 0.0, 84.0, 15.0));
    root.add_child(Rc::clone(&a));
    root.add_child(Rc::clone(&b));
    let stage = Rc::new(Stage::new(root, Rc::clone(surface) as _, 800.0, 600.0));
    (stage, a, b)
}

/// Record every `event` emitted on `node` as (node, event name, center).
fn record(node: &Rc<Node>, event: &str, log: &EventLog) {
    let log = Rc::clone(log);
    let name = node.name().to_string();
    let event_name = event.to_string();
    node.on(
        event,
        Rc::new(move |input: &GestureInput| {
            log.borrow_mut()
                .push((name.clone(), event_name.clone(), input.center));
        }),
    );
}

/// Root holding `card` at (0,0)-(100,100), which holds a 10x10 `badge`.
fn nested_stage(surface: &Rc<HeadlessSurface>) -> (Rc<Stage>, Rc<Node>, Rc<Node>) {
    let root = Node::container("root", Transform::new(0.0, 0.0, 800.0, 600.0));
    let card = Node::new("card", Transform::new(0.0, 0.0, 100.0, 100.0));
    let badge = Node::new("badge", Transform::new(10.0, 10.0, 10.0, 10.0));
    card.add_child(Rc::clone(&badge));
    root.add_child(Rc::clone(&card));
    let stage = Rc::new(Stage::new(root, Rc::clone(surface) as _, 800.0, 600.0));
    (stage, card, badge)
}

fn surface_at(left: f32, top: f32) -> Rc<HeadlessSurface> {
    Rc::new(HeadlessSurface::new(Rect::new(left, top, 800.0, 600.0)))
}

fn pan(x: f32, y: f32) -> GestureInput {
    GestureInput::new("pan", Point::new(x, y))
}

fn manager_of(connector: &Connector) -> Rc<dyn GestureManager> {
    Rc::clone(connector.manager().expect("manager should be live"))
}

// ============================================================================
// Sticky Target Tests
// ============================================================================

#[test]
fn test_pan_sequence_stays_on_first_node() {
    init_tracing();
    let surface = surface_at(0.0, 0.0);
    let (stage, a, b) = two_node_stage(&surface);
    let log = EventLog::default();
    record(&a, "hammer-pan", &log);
    record(&b, "hammer-pan", &log);

    let mut connector = Connector::new(
        Rc::clone(&surface) as _,
        stage.legacy_strategy(),
        None,
        ConnectorConfig::default(),
    );
    connector.register_handler_types(&["pan"]).expect("should register");
    let manager = manager_of(&connector);

    manager.emit(INPUT_EVENT, &GestureInput::raw(Point::new(10.0, 10.0)).first());
    for (x, y) in [(20.0, 10.0), (30.0, 10.0), (5.0, 5.0)] {
        manager.emit("pan", &pan(x, y));
    }

    let log = log.borrow();
    assert_eq!(log.len(), 3);
    assert!(log.iter().all(|(node, event, _)| node == "a" && event == "hammer-pan"));
    assert_eq!(log[1].2, Point::new(30.0, 10.0));
}

#[test]
fn test_sample_moving_off_node_rerouted_without_first_hit_policy() {
    let surface = surface_at(0.0, 0.0);
    let (stage, a, b) = two_node_stage(&surface);
    let log = EventLog::default();
    record(&a, "hammer-pan", &log);
    record(&b, "hammer-pan", &log);

    let config = ConnectorConfig {
        use_only_first_hit_test: false,
        ..ConnectorConfig::default()
    };
    let mut connector =
        Connector::new(Rc::clone(&surface) as _, stage.legacy_strategy(), None, config);
    connector.register_handler_types(&["pan"]).expect("should register");
    let manager = manager_of(&connector);

    manager.recognize(&GestureInput::raw(Point::new(10.0, 10.0)).first(), &["pan"]);
    manager.emit("pan", &pan(20.0, 10.0));
    manager.emit("pan", &pan(500.0, 500.0));

    let nodes: Vec<String> = log.borrow().iter().map(|(n, _, _)| n.clone()).collect();
    assert_eq!(nodes, vec!["a", "b"]);
}

#[test]
fn test_missed_first_sample_drops_whole_sequence() {
    let surface = surface_at(0.0, 0.0);
    let (stage, a, b) = two_node_stage(&surface);
    let log = EventLog::default();
    record(&a, "hammer-pan", &log);
    record(&b, "hammer-pan", &log);

    let mut connector = Connector::new(
        Rc::clone(&surface) as _,
        stage.legacy_strategy(),
        None,
        ConnectorConfig::default(),
    );
    connector.register_handler_types(&["pan"]).expect("should register");
    let manager = manager_of(&connector);

    manager.recognize(&GestureInput::raw(Point::new(400.0, 400.0)).first(), &["pan"]);
    manager.emit("pan", &pan(10.0, 10.0));
    manager.emit("pan", &pan(20.0, 10.0).last());

    assert!(log.borrow().is_empty());
}

#[test]
fn test_every_forwarded_type_uses_hammer_prefix() {
    let surface = surface_at(0.0, 0.0);
    let (stage, a, _b) = two_node_stage(&surface);
    let types = ["tap", "doubletap", "press", "pinchstart", "rotatemove", "swipeleft"];
    let log = EventLog::default();
    for kind in types {
        record(&a, &format!("hammer-{kind}"), &log);
    }

    let mut connector = Connector::new(
        Rc::clone(&surface) as _,
        stage.legacy_strategy(),
        None,
        ConnectorConfig::default(),
    );
    connector.register_handler_types(&types).expect("should register");

    manager_of(&connector).recognize(&GestureInput::raw(Point::new(5.0, 5.0)).first(), &types);

    let events: Vec<String> = log.borrow().iter().map(|(_, e, _)| e.clone()).collect();
    let expected: Vec<String> = types.iter().map(|kind| format!("hammer-{kind}")).collect();
    assert_eq!(events, expected);
    assert_eq!(connector.registered_events(), expected);
}

// ============================================================================
// Boundary Mode Tests
// ============================================================================

#[test]
fn test_boundary_tap_emits_once_on_node() {
    init_tracing();
    let surface = surface_at(0.0, 0.0);
    let root = Node::container("root", Transform::new(0.0, 0.0, 800.0, 600.0));
    let b = Node::new("b", Transform::new(0.0, 0.0, 2.0, 2.0));
    root.add_child(Rc::clone(&b));
    let stage = Rc::new(Stage::new(root, Rc::clone(&surface) as _, 800.0, 600.0));
    let log = EventLog::default();
    record(&b, "hammer-tap", &log);

    let mut connector = Connector::builder(Rc::clone(&surface) as _)
        .boundary(Rc::clone(&stage) as _)
        .scene_root(Rc::clone(stage.root()) as _)
        .build()
        .expect("should build");
    connector.register_handler_types(&["tap"]).expect("should register");

    let tap = GestureInput::new("tap", Point::new(1.0, 1.0)).first();
    manager_of(&connector).recognize(&tap, &["tap"]);

    let log = log.borrow();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].0, "b");
    assert_eq!(log[0].1, "hammer-tap");
}

#[test]
fn test_both_modes_resolve_same_node() {
    let surface = surface_at(30.0, 40.0);
    let (stage, a, _b) = two_node_stage(&surface);
    let expected: NodeRef = a;

    for strategy in [stage.legacy_strategy(), stage.boundary_strategy()] {
        let connector =
            Connector::new(Rc::clone(&surface) as _, strategy, None, ConnectorConfig::default());
        let target = connector
            .resolve_target(Point::new(40.0, 50.0))
            .expect("client (40,50) is stage (10,10)");
        assert!(same_node(&target, &expected), "{:?}", connector.strategy());
    }
}

#[test]
fn test_legacy_tap_bubbles_to_parent_but_boundary_tap_does_not() {
    let surface = surface_at(0.0, 0.0);
    let (stage, card, badge) = nested_stage(&surface);
    let log = EventLog::default();
    record(&card, "hammer-tap", &log);
    record(&badge, "hammer-tap", &log);

    for strategy in [stage.legacy_strategy(), stage.boundary_strategy()] {
        let mut connector =
            Connector::new(Rc::clone(&surface) as _, strategy, None, ConnectorConfig::default());
        connector.register_handler_types(&["tap"]).expect("should register");
        let tap = GestureInput::raw(Point::new(15.0, 15.0)).first();
        manager_of(&connector).recognize(&tap, &["tap"]);
    }

    let nodes: Vec<String> = log.borrow().iter().map(|(n, _, _)| n.clone()).collect();
    assert_eq!(nodes, vec!["badge", "card", "badge"]);
}

// ============================================================================
// Coordinate Tests
// ============================================================================

#[test]
fn test_stage_resize_after_connector_built() {
    let surface = surface_at(0.0, 0.0);
    let (stage, a, _b) = two_node_stage(&surface);
    let log = EventLog::default();
    record(&a, "hammer-tap", &log);

    let mut connector = Connector::new(
        Rc::clone(&surface) as _,
        stage.legacy_strategy(),
        None,
        ConnectorConfig::default(),
    );
    connector.register_handler_types(&["tap"]).expect("should register");

    stage.resize(1600.0, 1200.0);
    assert_eq!(connector.normalize_point(Point::new(400.0, 300.0)), Point::new(800.0, 600.0));

    // client (5,5) now lands on stage (10,10), still inside `a`
    let tap = GestureInput::raw(Point::new(5.0, 5.0)).first();
    manager_of(&connector).recognize(&tap, &["tap"]);
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn test_surface_top_left_normalizes_to_origin() {
    let surface = surface_at(0.0, 0.0);
    let (stage, _a, _b) = two_node_stage(&surface);
    let mut connector = Connector::new(
        Rc::clone(&surface) as _,
        stage.boundary_strategy(),
        None,
        ConnectorConfig::default(),
    );

    surface.set_rect(Rect::new(120.0, 80.0, 800.0, 600.0));
    let offset = connector.update_cache(None).expect("should recache");

    assert_eq!(offset, Point::new(120.0, 80.0));
    assert_eq!(connector.normalize_point(offset), Point::ZERO);
}

#[test]
fn test_moved_canvas_still_hits_after_recache() {
    let surface = surface_at(0.0, 0.0);
    let (stage, a, _b) = two_node_stage(&surface);
    let log = EventLog::default();
    record(&a, "hammer-tap", &log);

    let mut connector = Connector::new(
        Rc::clone(&surface) as _,
        stage.legacy_strategy(),
        None,
        ConnectorConfig::default(),
    );
    connector.register_handler_types(&["tap"]).expect("should register");

    surface.set_rect(Rect::new(200.0, 100.0, 800.0, 600.0));
    connector.update_cache(None).expect("should recache");
    let tap = GestureInput::raw(Point::new(205.0, 105.0)).first();
    manager_of(&connector).recognize(&tap, &["tap"]);

    assert_eq!(log.borrow().len(), 1);
    assert_eq!(connector.offset(), Point::new(200.0, 100.0));
}

// ============================================================================
// Teardown Tests
// ============================================================================

#[test]
fn test_destroy_releases_supplied_manager() {
    let surface = surface_at(0.0, 0.0);
    let (stage, a, _b) = two_node_stage(&surface);
    let log = EventLog::default();
    record(&a, "hammer-tap", &log);

    let manager = Rc::new(Manager::new(Rc::clone(&surface) as _));
    let mut connector = Connector::new(
        Rc::clone(&surface) as _,
        stage.legacy_strategy(),
        Some(Rc::clone(&manager) as Rc<dyn GestureManager>),
        ConnectorConfig::default(),
    );
    connector.register_handler_types(&["tap", "pan"]).expect("should register");
    assert_eq!(manager.listener_count(), 3);

    connector.destroy();

    assert!(connector.manager().is_none());
    assert!(manager.handlers().is_empty());
    assert!(manager.is_destroyed());

    manager.recognize(&GestureInput::raw(Point::new(5.0, 5.0)).first(), &["tap"]);
    assert!(log.borrow().is_empty());
}

#[test]
fn test_second_connector_on_shared_manager_survives_first_drop() {
    let surface = surface_at(0.0, 0.0);
    let (stage, a, _b) = two_node_stage(&surface);
    let log = EventLog::default();
    record(&a, "hammer-tap", &log);

    let manager: Rc<dyn GestureManager> = Rc::new(Manager::new(Rc::clone(&surface) as _));
    let strategy = InteractionStrategy::legacy(Rc::clone(&stage) as _);

    let mut first = Connector::new(
        Rc::clone(&surface) as _,
        strategy.clone(),
        Some(Rc::clone(&manager)),
        ConnectorConfig::default(),
    );
    first.register_handler_types(&["tap"]).expect("should register");
    let mut second = Connector::new(
        Rc::clone(&surface) as _,
        strategy,
        Some(Rc::clone(&manager)),
        ConnectorConfig::default(),
    );
    second.register_handler_types(&["tap"]).expect("should register");

    drop(first);
    manager.recognize(&GestureInput::raw(Point::new(5.0, 5.0)).first(), &["tap"]);

    assert_eq!(log.borrow().len(), 1);
    assert_eq!(manager.handlers().len(), 2);
}
