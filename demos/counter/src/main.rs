use std::cell::Cell;
use std::rc::Rc;

use web_time::Duration;

use vitadeck_core::prelude::*;
use vitadeck_platform::{RecordingBridge, Runtime, RuntimeConfig};
use vitadeck_reconciler::{BackendKind, PositionalDriver, VNode};

fn app(count: Rc<Cell<i32>>) -> impl FnMut() -> Vec<VNode> {
    move || {
        let inc = count.clone();
        let dec = count.clone();
        vec![VNode::rect(
            RectProps::new(40, 40, 400, 260)
                .color(Color::from_hex("#221628"))
                .radius(8.0),
            vec![
                VNode::text(
                    TextProps::new().color(Color::RAYWHITE),
                    format!("Count: {}", count.get()),
                ),
                VNode::button(
                    ButtonProps::new(24, 120, 160, 48, "Increment").handlers(
                        Handlers::new()
                            .on_click(move || inc.set(inc.get() + 1))
                            .on_hover_enter(|| log::info!("hovering increment")),
                    ),
                ),
                VNode::button(
                    ButtonProps::new(208, 120, 160, 48, "Decrement")
                        .color(Color::MAROON)
                        .handlers(Handlers::new().on_click(move || dec.set(dec.get() - 1))),
                ),
            ],
        )]
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let count = Rc::new(Cell::new(0));
    let mut driver = PositionalDriver::new(app(count.clone()));
    let mut rt = Runtime::new(RecordingBridge::new(), RuntimeConfig::default());

    let ticker = count.clone();
    rt.timers()
        .set_interval(Duration::from_millis(250), move || ticker.set(ticker.get() + 1));

    // scripted pointer: hover and click increment, then decrement
    let script: [(Vec2, bool); 6] = [
        (Vec2::new(100.0, 180.0), false),
        (Vec2::new(100.0, 180.0), true),
        (Vec2::new(100.0, 180.0), false),
        (Vec2::new(300.0, 180.0), false),
        (Vec2::new(300.0, 180.0), true),
        (Vec2::new(300.0, 180.0), false),
    ];

    for frame in 0..60 {
        if let Some(&(pos, down)) = script.get(frame / 5) {
            let bridge = rt.bridge_mut();
            bridge.mouse = pos;
            bridge.mouse_down = down;
        }
        if frame == 30 {
            rt.switch_backend(BackendKind::Persistent, &mut driver)?;
            rt.toggle_inspector();
        }
        rt.tick(&mut driver)?;
        std::thread::sleep(Duration::from_millis(16));
    }

    log::info!("final count: {}", count.get());
    for line in rt.bridge().texts() {
        println!("{line}");
    }
    Ok(())
}
