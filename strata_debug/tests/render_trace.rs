// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording a real frame and hit test.

use kurbo::{Point, Rect};
use strata_core::color::Color;
use strata_core::graphics::Graphics;
use strata_core::trace::Tracer;
use strata_debug::recorder::{RecordedEvent, RecorderSink, decode};
use strata_render::{Renderer, RendererConfig};

#[test]
fn frame_and_hit_test_are_recorded() {
    let mut renderer = Renderer::new(RendererConfig::with_size(32.0, 32.0)).unwrap();
    let root = renderer.root();
    let mut g = Graphics::new();
    g.begin_fill(Color::rgb(0, 128, 255))
        .rect(Rect::new(0.0, 0.0, 16.0, 16.0))
        .end_fill();
    let scene = renderer.scene_mut();
    let node = scene.create_graphics(g);
    scene.set_interactive(node, true).unwrap();
    scene.add_child(root, node).unwrap();

    let mut rec = RecorderSink::new();
    {
        let mut tracer = Tracer::new(&mut rec);
        renderer.render_traced(&mut tracer).unwrap();
        assert_eq!(
            renderer.hit_test_traced(Point::new(4.0, 4.0), &mut tracer),
            Some(node)
        );
    }

    let events: Vec<RecordedEvent> = decode(rec.as_bytes()).map(|r| r.event).collect();
    assert!(matches!(events.first(), Some(RecordedEvent::FrameBegin(_))));
    assert!(events.iter().any(|e| matches!(
        e,
        RecordedEvent::LayerRepaint(l) if l.order == 0 && l.painted_nodes == 1
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        RecordedEvent::PickingPass(p) if p.layer_order == 0 && p.painted_nodes == 1
    )));
    match events.last() {
        Some(RecordedEvent::HitTest(h)) => assert_eq!(h.node, Some(node)),
        other => panic!("expected a trailing hit test, got {other:?}"),
    }

    let mut json = Vec::new();
    strata_debug::chrome::export(rec.as_bytes(), &mut json).unwrap();
    assert!(!json.is_empty());
}
