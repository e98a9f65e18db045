use web_time::{Duration, Instant};

use vitadeck_core::{CANVAS_WIDTH, Color, MetricSummary, Rect, ReconcilerMetrics, Vec2};
use vitadeck_render::{DrawCommand, DrawList};

#[cfg(test)]
mod tests;

const PANEL_WIDTH: f32 = 360.0;
const LINE_HEIGHT: f32 = 16.0;
const FONT_SIZE: u32 = 14;
/// Slowest operations shown, by total time.
const MAX_OPS: usize = 8;

pub struct Hud {
    pub inspector_enabled: bool,
    pub hovered: Option<Rect>,
    frame_count: u64,
    last_frame: Option<Instant>,
    fps_smooth: f32,
    pub metrics: Option<Metrics>,
}

impl Default for Hud {
    fn default() -> Self {
        Self::new()
    }
}

fn ms(d: Duration) -> f32 {
    d.as_secs_f32() * 1000.0
}

impl Hud {
    pub fn new() -> Self {
        Self {
            inspector_enabled: false,
            hovered: None,
            frame_count: 0,
            last_frame: None,
            fps_smooth: 0.0,
            metrics: None,
        }
    }

    pub fn toggle_inspector(&mut self) {
        self.inspector_enabled = !self.inspector_enabled;
        log::info!(
            "inspector {}",
            if self.inspector_enabled { "on" } else { "off" }
        );
    }

    pub fn set_hovered(&mut self, r: Option<Rect>) {
        self.hovered = r;
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn fps(&self) -> f32 {
        self.fps_smooth
    }

    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!(
            "frame: {}  |  fps: {:.1}",
            self.frame_count, self.fps_smooth
        )];
        if let Some(m) = &self.metrics {
            lines.push(format!("backend: {}  |  nodes: {}", m.backend, m.live_nodes));
            for (name, s) in &m.ops {
                lines.push(format!(
                    "{name}  x{}  avg {:.3} ms  max {:.3} ms",
                    s.count,
                    ms(s.average()),
                    ms(s.max)
                ));
            }
        }
        lines
    }

    /// Appends the HUD panel and the hovered outline to `list`. Adds no
    /// interactive regions.
    pub fn overlay(&mut self, now: Instant, list: &mut DrawList) {
        self.frame_count += 1;
        if let Some(prev) = self.last_frame.replace(now) {
            let dt = (now - prev).as_secs_f32();
            if dt > 0.0 {
                let fps = 1.0 / dt;
                // simple EMA
                let a = 0.2;
                self.fps_smooth = if self.fps_smooth == 0.0 {
                    fps
                } else {
                    (1.0 - a) * self.fps_smooth + a * fps
                };
            }
        }

        let lines = self.lines();
        let x = CANVAS_WIDTH as f32 - PANEL_WIDTH - 8.0;
        list.commands.push(DrawCommand::Rect {
            rect: Rect::new(x, 8.0, PANEL_WIDTH, 8.0 + lines.len() as f32 * LINE_HEIGHT),
            fill: Some(Color::BLACK.with_alpha(160)),
            outline: None,
            radius: 4.0,
        });
        for (i, text) in lines.into_iter().enumerate() {
            list.commands.push(DrawCommand::Text {
                pos: Vec2::new(x + 4.0, 12.0 + i as f32 * LINE_HEIGHT),
                font_size: FONT_SIZE,
                text,
                color: Some(Color::from_hex("#AAAAAA")),
                border: false,
            });
        }

        if let Some(r) = self.hovered {
            list.commands.push(DrawCommand::Rect {
                rect: r,
                fill: None,
                outline: Some(Color::from_hex("#44AAFF")),
                radius: 0.0,
            });
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Metrics {
    pub backend: String,
    pub live_nodes: usize,
    pub ops: Vec<(String, MetricSummary)>,
}

impl Metrics {
    /// Snapshot of `store`, keeping the operations with the largest total time.
    pub fn from_store(store: &ReconcilerMetrics, live_nodes: usize) -> Self {
        let mut ops = store.summary();
        ops.sort_by(|a, b| b.1.total.cmp(&a.1.total).then_with(|| a.0.cmp(&b.0)));
        ops.truncate(MAX_OPS);
        Self {
            backend: store.label().to_string(),
            live_nodes,
            ops,
        }
    }
}

pub struct Inspector {
    pub hud: Hud,
}

impl Default for Inspector {
    fn default() -> Self {
        Self::new()
    }
}

impl Inspector {
    pub fn new() -> Self {
        Self { hud: Hud::new() }
    }

    pub fn frame(&mut self, now: Instant, list: &mut DrawList) {
        if self.hud.inspector_enabled {
            self.hud.overlay(now, list);
        }
    }
}
