use web_time::{Duration, Instant};

use vitadeck_core::{Rect, ReconcilerMetrics};
use vitadeck_render::{DrawCommand, DrawList};

use crate::*;

#[test]
fn test_inspector_disabled_adds_nothing() {
    let mut inspector = Inspector::new();
    let mut list = DrawList::default();
    inspector.frame(Instant::now(), &mut list);
    assert!(list.is_empty());
    assert_eq!(inspector.hud.frame_count(), 0);
}

#[test]
fn test_overlay_counts_frames_and_fps() {
    let mut hud = Hud::new();
    let t0 = Instant::now();
    let mut list = DrawList::default();
    hud.overlay(t0, &mut list);
    hud.overlay(t0 + Duration::from_millis(20), &mut list);
    assert_eq!(hud.frame_count(), 2);
    assert!((hud.fps() - 50.0).abs() < 0.5);
    assert!(list.regions.is_empty());
}

#[test]
fn test_hovered_outline_is_last() {
    let mut hud = Hud::new();
    let r = Rect::new(10.0, 10.0, 40.0, 20.0);
    hud.set_hovered(Some(r));
    let mut list = DrawList::default();
    hud.overlay(Instant::now(), &mut list);
    assert!(matches!(
        list.commands.last(),
        Some(DrawCommand::Rect { rect, fill: None, outline: Some(_), .. }) if *rect == r
    ));
}

#[test]
fn test_metrics_keep_slowest_ops() {
    let store = ReconcilerMetrics::new("mutation");
    for i in 0..12u64 {
        store.record(&format!("mutation.op{i:02}"), Duration::from_micros(i * 10));
    }
    let m = Metrics::from_store(&store, 3);
    assert_eq!(m.backend, "mutation");
    assert_eq!(m.ops.len(), 8);
    assert_eq!(m.ops[0].0, "mutation.op11");

    let mut hud = Hud::new();
    hud.metrics = Some(m);
    let lines = hud.lines();
    assert_eq!(lines.len(), 10);
    assert!(lines[1].contains("nodes: 3"));
}
