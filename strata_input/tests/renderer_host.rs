// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dispatch against a real renderer as the hit-test host.

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::{Point, Rect};
use strata_core::color::Color;
use strata_core::graphics::Graphics;
use strata_core::scene::NodeId;
use strata_input::{
    Dispatcher, EventKind, Phase, PointerInput, Propagation, RawInput, TouchAction, TouchPoint,
};
use strata_render::{Renderer, RendererConfig};

type Log = Rc<RefCell<Vec<(EventKind, NodeId, u32)>>>;

fn square(renderer: &mut Renderer, rect: Rect) -> NodeId {
    let root = renderer.root();
    let mut g = Graphics::new();
    g.begin_fill(Color::rgb(30, 30, 200)).rect(rect).end_fill();
    let scene = renderer.scene_mut();
    let node = scene.create_graphics(g);
    scene.set_interactive(node, true).unwrap();
    scene.add_child(root, node).unwrap();
    node
}

fn record(d: &mut Dispatcher<Renderer>, log: &Log, node: NodeId, kinds: &[EventKind]) {
    for &kind in kinds {
        let log = Rc::clone(log);
        d.subscribe(node, kind, move |_: &mut Renderer, e| {
            log.borrow_mut().push((e.kind, node, e.pointer_id));
            Propagation::Continue
        });
    }
}

fn touch(action: TouchAction, id: u32, x: f64, y: f64, time_ms: u64) -> RawInput {
    RawInput::Touch {
        action,
        touches: vec![TouchPoint {
            id,
            point: Point::new(x, y),
        }],
        time_ms,
    }
}

#[test]
fn releasing_one_finger_leaves_the_other_pressed() {
    let mut renderer = Renderer::new(RendererConfig::with_size(100.0, 40.0)).unwrap();
    let left = square(&mut renderer, Rect::new(0.0, 0.0, 40.0, 40.0));
    let right = square(&mut renderer, Rect::new(60.0, 0.0, 100.0, 40.0));
    renderer.render().unwrap();

    let log: Log = Rc::default();
    let mut d: Dispatcher<Renderer> = Dispatcher::default();
    let kinds = [EventKind::PointerDown, EventKind::PointerUp, EventKind::Click];
    record(&mut d, &log, left, &kinds);
    record(&mut d, &log, right, &kinds);

    d.handle_raw(&mut renderer, &touch(TouchAction::Start, 0, 20.0, 20.0, 0));
    d.handle_raw(&mut renderer, &touch(TouchAction::Start, 1, 80.0, 20.0, 5));
    assert!(d.pressed(left) && d.pressed(right));

    d.handle_raw(&mut renderer, &touch(TouchAction::End, 0, 20.0, 20.0, 20));
    assert!(!d.pressed(left));
    assert!(d.pressed(right));
    assert!(
        log.borrow()
            .iter()
            .filter(|(_, n, _)| *n == right)
            .all(|(k, _, _)| *k == EventKind::PointerDown)
    );

    d.handle_raw(&mut renderer, &touch(TouchAction::End, 1, 80.0, 20.0, 30));
    let right_events: Vec<(EventKind, u32)> = log
        .borrow()
        .iter()
        .filter(|(_, n, _)| *n == right)
        .map(|(k, _, p)| (*k, *p))
        .collect();
    assert_eq!(
        right_events,
        vec![
            (EventKind::PointerDown, 2),
            (EventKind::PointerUp, 2),
            (EventKind::Click, 2),
        ]
    );
}

#[test]
fn draggable_node_follows_the_pointer_across_frames() {
    let mut renderer = Renderer::new(RendererConfig::with_size(200.0, 50.0)).unwrap();
    let handle = square(&mut renderer, Rect::new(0.0, 0.0, 20.0, 20.0));
    renderer.render().unwrap();

    let mut d: Dispatcher<Renderer> = Dispatcher::default();
    d.set_draggable(handle, true);
    d.subscribe(handle, EventKind::PointerMove, move |r: &mut Renderer, e| {
        if let Some(node) = e.current {
            let scene = r.scene_mut();
            let _ = scene.set_position(node, e.point.x - 10.0, e.point.y - 10.0);
        }
        Propagation::Continue
    });

    d.handle(
        &mut renderer,
        &PointerInput::mouse(Phase::Down, Point::new(10.0, 10.0), 0),
    );
    // Further than the square is wide: only capture keeps it following.
    d.handle(
        &mut renderer,
        &PointerInput::mouse(Phase::Move, Point::new(150.0, 25.0), 16),
    );
    assert!(d.dragging(handle));
    renderer.render().unwrap();
    d.handle(
        &mut renderer,
        &PointerInput::mouse(Phase::Up, Point::new(150.0, 25.0), 32),
    );

    assert_eq!(renderer.hit_test(Point::new(150.0, 25.0)), Some(handle));
    assert_eq!(renderer.hit_test(Point::new(5.0, 5.0)), None);
}

#[test]
fn disposed_nodes_stop_receiving() {
    let mut renderer = Renderer::new(RendererConfig::with_size(50.0, 50.0)).unwrap();
    let node = square(&mut renderer, Rect::new(0.0, 0.0, 50.0, 50.0));
    renderer.render().unwrap();

    let log: Log = Rc::default();
    let mut d: Dispatcher<Renderer> = Dispatcher::default();
    record(&mut d, &log, node, &[EventKind::PointerDown, EventKind::Click]);
    d.subscribe(node, EventKind::PointerDown, |r: &mut Renderer, e| {
        if let Some(node) = e.current {
            let _ = r.scene_mut().dispose(node);
        }
        Propagation::Continue
    });

    d.handle(
        &mut renderer,
        &PointerInput::mouse(Phase::Down, Point::new(25.0, 25.0), 0),
    );
    d.handle(
        &mut renderer,
        &PointerInput::mouse(Phase::Up, Point::new(25.0, 25.0), 5),
    );
    assert_eq!(*log.borrow(), vec![(EventKind::PointerDown, node, 0)]);
    assert!(!renderer.scene().is_alive(node));
}
