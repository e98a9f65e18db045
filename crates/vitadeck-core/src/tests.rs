use std::cell::{Cell, RefCell};
use std::rc::Rc;

use web_time::Duration;

use crate::*;

fn counter() -> (Rc<Cell<u32>>, impl Fn() + 'static) {
    let n = Rc::new(Cell::new(0));
    let m = n.clone();
    (n, move || m.set(m.get() + 1))
}

#[test]
fn test_element_type_parse() {
    assert_eq!("vita-rect".parse::<ElementType>(), Ok(ElementType::Rect));
    assert_eq!("vita-button".parse::<ElementType>(), Ok(ElementType::Button));
    assert_eq!(
        "vita-circle".parse::<ElementType>(),
        Err(HostError::UnknownKind("vita-circle".into()))
    );
    assert_eq!(ElementType::Text.to_string(), "vita-text");
}

#[test]
fn test_node_id_encoding() {
    let mut ids = IdAllocator::new();
    let a = ids.allocate(ElementType::Rect);
    let encoded = a.encode();
    assert_eq!(encoded.len(), 16);
    assert_eq!(NodeId::decode(&encoded), Some(a));
    assert_eq!(NodeId::decode(""), None);
    assert_eq!(NodeId::decode("not-hex-at-all!!"), None);
}

#[test]
fn test_released_ids_are_not_reissued() {
    let mut ids = IdAllocator::new();
    let a = ids.allocate(ElementType::Rect);
    assert!(ids.release(a));
    assert!(!ids.release(a));
    let b = ids.allocate(ElementType::Rect);
    assert_ne!(a, b);
    assert_ne!(a.encode(), b.encode());
    assert!(!ids.is_live(a));
    assert_eq!(ids.kind_of(b), Some(ElementType::Rect));
}

#[test]
fn test_changed_keys_shallow() {
    let click: Rc<dyn Fn()> = Rc::new(|| {});
    let handlers = Handlers {
        on_click: Some(click.clone()),
        ..Handlers::default()
    };
    let old = Props::Rect(RectProps::new(10, 10, 50, 50).handlers(handlers.clone()));
    let same = Props::Rect(RectProps::new(10, 10, 50, 50).handlers(handlers));
    assert!(Props::changed_keys(&old, &same).unwrap().is_empty());

    let moved = Props::Rect(
        RectProps::new(12, 10, 50, 50)
            .color(Color::RED)
            .handlers(Handlers::new().on_click(|| {})),
    );
    let changed = Props::changed_keys(&old, &moved).unwrap();
    assert_eq!(
        changed.as_slice(),
        &[PropKey::X, PropKey::Color, PropKey::OnClick]
    );
}

#[test]
fn test_changed_keys_kind_mismatch() {
    let rect = Props::Rect(RectProps::default());
    let text = Props::Text(TextProps::default());
    assert_eq!(
        Props::changed_keys(&rect, &text),
        Err(HostError::KindMismatch {
            expected: ElementType::Rect,
            found: ElementType::Text,
        })
    );
}

#[test]
fn test_rect_fill_and_outline_resolution() {
    let filled = RectProps::new(0, 0, 1, 1).color(Color::RED);
    assert_eq!(filled.fill(), Some(Color::RED));
    assert_eq!(filled.outline_color(), None);

    let outlined = RectProps::new(0, 0, 1, 1).color(Color::RED).outline();
    assert_eq!(outlined.fill(), None);
    assert_eq!(outlined.outline_color(), Some(Color::RED));

    let bordered = RectProps::new(0, 0, 1, 1)
        .color(Color::RED)
        .border_color(Color::BLUE);
    assert_eq!(bordered.fill(), Some(Color::RED));
    assert_eq!(bordered.outline_color(), Some(Color::BLUE));
}

#[test]
fn test_rect_contains_half_open() {
    let r = Rect::new(10.0, 10.0, 20.0, 20.0);
    assert!(r.contains(Vec2::new(10.0, 10.0)));
    assert!(r.contains(Vec2::new(29.9, 29.9)));
    assert!(!r.contains(Vec2::new(30.0, 15.0)));
    assert!(!r.contains(Vec2::new(15.0, 30.0)));
}

#[test]
fn test_color_mix_keeps_alpha() {
    let c = Color(0, 100, 200, 128).mix(Color::WHITE, 0.5);
    assert_eq!(c, Color(127, 177, 227, 128));
    assert_eq!(Color::named("darkblue"), Some(Color::DARKBLUE));
    assert_eq!(Color::from_hex("#ff0000"), Color(255, 0, 0, 255));
}

#[test]
fn test_color_alpha_constructors() {
    assert_eq!(Color::from_rgba(1, 2, 3, 4), Color(1, 2, 3, 4));
    assert_eq!(Color::MAROON.with_alpha(90).3, 90);
    assert_eq!(
        Color::from_hex("#10203040"),
        Color::from_rgb(0x10, 0x20, 0x30).with_alpha(0x40)
    );
}

#[test]
fn test_registry_register_and_clear() {
    let mut reg = HandlerRegistry::new();
    let mut ids = IdAllocator::new();
    let id = ids.allocate(ElementType::Button);
    let (hits, bump) = counter();

    reg.register(id, &Handlers::new().on_click(bump));
    assert!(reg.get_encoded(&id.encode()).is_some());
    assert!(reg.dispatch(id, HandlerEvent::Click));
    assert!(!reg.dispatch(id, HandlerEvent::Press));
    assert_eq!(hits.get(), 1);

    // An empty set drops the registration.
    reg.register(id, &Handlers::new());
    assert!(reg.is_empty());
    assert!(!reg.dispatch(id, HandlerEvent::Click));
}

#[test]
fn test_handler_panic_is_contained() {
    let mut reg = HandlerRegistry::new();
    let mut ids = IdAllocator::new();
    let id = ids.allocate(ElementType::Rect);
    reg.register(id, &Handlers::new().on_press(|| panic!("boom")));
    assert!(!reg.dispatch(id, HandlerEvent::Press));
}

#[test]
fn test_isolate_reports_message() {
    let fault = isolate(|| -> u8 { panic!("bad {}", 7) }).unwrap_err();
    assert_eq!(fault.message, "bad 7");
    assert_eq!(isolate(|| 3), Ok(3));
}

#[test]
fn test_metrics_accumulate() {
    let m = ReconcilerMetrics::new("persistent");
    m.record("a", Duration::from_millis(4));
    m.record("a", Duration::from_millis(2));
    m.record("a", Duration::from_millis(6));
    let s = m.summary_for("a").unwrap();
    assert_eq!(s.count, 3);
    assert_eq!(s.min, Duration::from_millis(2));
    assert_eq!(s.max, Duration::from_millis(6));
    assert_eq!(s.last, Duration::from_millis(6));
    assert_eq!(s.average(), Duration::from_millis(4));

    m.record("b", Duration::ZERO);
    assert_eq!(m.method_names(), vec!["a".to_string(), "b".to_string()]);
    m.reset_method("a");
    assert_eq!(m.method_names(), vec!["b".to_string()]);
    m.reset();
    assert!(m.summary().is_empty());
}

#[test]
fn test_metric_count_past_u32() {
    let mut s = MetricSummary {
        count: u64::from(u32::MAX),
        total: Duration::from_secs(u64::from(u32::MAX)),
        min: Duration::from_secs(1),
        max: Duration::from_secs(1),
        last: Duration::from_secs(1),
    };
    s.push(Duration::from_secs(1));
    assert_eq!(s.count, u64::from(u32::MAX) + 1);
    assert_eq!(s.average(), Duration::from_secs(1));

    s.count = u64::MAX;
    s.push(Duration::ZERO);
    assert_eq!(s.count, u64::MAX);
}

#[test]
fn test_metrics_time_records_on_panic() {
    let m = ReconcilerMetrics::new("mutation");
    let r = isolate(|| m.time("op", || -> u8 { panic!("fail") }));
    assert!(r.is_err());
    assert_eq!(m.summary_for("op").map(|s| s.count), Some(1));
}

#[test]
fn test_metrics_time_future_records_on_settle() {
    let m = ReconcilerMetrics::new("mutation");
    let fut = m.time_future("async", async { 41 + 1 });
    assert!(m.summary_for("async").is_none());
    assert_eq!(pollster::block_on(fut), 42);
    assert_eq!(m.summary_for("async").map(|s| s.count), Some(1));

    // Dropped before settling: nothing recorded.
    drop(m.time_future("never", std::future::pending::<()>()));
    assert!(m.summary_for("never").is_none());
}

fn timers() -> (Rc<TestClock>, Timers) {
    let clock = Rc::new(TestClock::new());
    let timers = Timers::new(clock.clone());
    (clock, timers)
}

#[test]
fn test_timeout_fires_once() {
    let (clock, timers) = timers();
    let (hits, bump) = counter();
    timers.set_timeout(Duration::from_millis(100), bump);

    clock.advance(Duration::from_millis(99));
    assert_eq!(timers.run_due(), 0);
    clock.advance(Duration::from_millis(1));
    assert_eq!(timers.run_due(), 1);
    clock.advance(Duration::from_millis(500));
    assert_eq!(timers.run_due(), 0);
    assert_eq!(hits.get(), 1);
    assert_eq!(timers.pending(), 0);
}

#[test]
fn test_interval_reschedules() {
    let (clock, timers) = timers();
    let (hits, bump) = counter();
    let h = timers.set_interval(Duration::from_millis(10), bump);
    for _ in 0..3 {
        clock.advance(Duration::from_millis(10));
        timers.run_due();
    }
    assert_eq!(hits.get(), 3);
    timers.clear(h);
    clock.advance(Duration::from_millis(10));
    timers.run_due();
    assert_eq!(hits.get(), 3);
    assert_eq!(timers.pending(), 0);
}

#[test]
fn test_timer_cancelled_earlier_in_same_poll_never_runs() {
    let (clock, timers) = timers();
    let (hits, bump) = counter();
    let victim = Rc::new(Cell::new(None));

    // Both due at the same instant; the first one cancels the second.
    let canceller = {
        let timers = timers.clone();
        let victim = victim.clone();
        move || {
            if let Some(h) = victim.get() {
                timers.clear(h);
            }
        }
    };
    timers.set_timeout(Duration::from_millis(5), canceller);
    victim.set(Some(timers.set_timeout(Duration::from_millis(5), bump)));

    clock.advance(Duration::from_millis(5));
    assert_eq!(timers.run_due(), 1);
    assert_eq!(hits.get(), 0);
}

#[test]
fn test_interval_clearing_itself() {
    let (clock, timers) = timers();
    let own = Rc::new(Cell::new(None));
    let runs = Rc::new(Cell::new(0));
    let h = {
        let timers2 = timers.clone();
        let own = own.clone();
        let runs = runs.clone();
        timers.set_interval(Duration::from_millis(1), move || {
            runs.set(runs.get() + 1);
            if let Some(h) = own.get() {
                timers2.clear(h);
            }
        })
    };
    own.set(Some(h));
    clock.advance(Duration::from_millis(1));
    timers.run_due();
    clock.advance(Duration::from_millis(1));
    timers.run_due();
    assert_eq!(runs.get(), 1);
    assert!(!timers.is_pending(h));
}

#[test]
fn test_clear_unknown_handle_is_noop() {
    let (clock, timers) = timers();
    let (hits, bump) = counter();
    let h = timers.set_timeout(Duration::ZERO, bump);
    clock.advance(Duration::from_millis(1));
    timers.run_due();
    timers.clear(h);
    timers.clear(h);
    assert_eq!(hits.get(), 1);
}

#[test]
fn test_timer_panic_does_not_stop_others() {
    let (clock, timers) = timers();
    let (hits, bump) = counter();
    timers.set_timeout(Duration::from_millis(1), || panic!("timer blew up"));
    timers.set_timeout(Duration::from_millis(2), bump);
    clock.advance(Duration::from_millis(5));
    assert_eq!(timers.run_due(), 2);
    assert_eq!(hits.get(), 1);
}

#[test]
fn test_clear_all_drops_pending_timers() {
    let (clock, timers) = timers();
    let (hits, bump) = counter();
    let bump = Rc::new(bump);
    let b = bump.clone();
    timers.set_timeout(Duration::from_millis(5), move || b());
    timers.set_interval(Duration::from_millis(5), move || bump());
    assert_eq!(timers.pending(), 2);

    timers.clear_all();
    assert_eq!(timers.pending(), 0);
    clock.advance(Duration::from_millis(20));
    assert_eq!(timers.run_due(), 0);
    assert_eq!(hits.get(), 0);
}

#[test]
fn test_timers_fire_in_due_order() {
    let (clock, timers) = timers();
    let log = Rc::new(RefCell::new(Vec::new()));
    for (delay, tag) in [(30, "c"), (10, "a"), (20, "b")] {
        let log = log.clone();
        timers.set_timeout(Duration::from_millis(delay), move || {
            log.borrow_mut().push(tag)
        });
    }
    clock.advance(Duration::from_millis(30));
    timers.run_due();
    assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
}
