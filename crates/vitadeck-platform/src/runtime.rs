use std::rc::Rc;

use anyhow::Context;

use vitadeck_core::{
    CANVAS_HEIGHT, CANVAS_WIDTH, Clock, HandlerEvent, NativeBridge, NodeId, SystemClock, Timers,
};
use vitadeck_devtools::{Inspector, Metrics};
use vitadeck_input::InputDispatcher;
use vitadeck_reconciler::{ActiveBackend, BackendKind, DiffDriver, ReconcilerManager};
use vitadeck_render::{DrawList, compile};

use crate::config::RuntimeConfig;

/// The host loop: owns the active backend, the current draw list and all
/// transient input state, and talks to the native side through `B`.
///
/// Within a [`tick`](Self::tick), timers fire first, then the commit and
/// draw-list rebuild, then painting, then input against the fresh regions.
pub struct Runtime<B: NativeBridge> {
    config: RuntimeConfig,
    bridge: B,
    manager: ReconcilerManager,
    draw: DrawList,
    input: InputDispatcher,
    inspector: Inspector,
    clock: Rc<dyn Clock>,
    timers: Timers,
}

impl<B: NativeBridge> Runtime<B> {
    pub fn new(bridge: B, config: RuntimeConfig) -> Self {
        Self::with_clock(bridge, config, Rc::new(SystemClock))
    }

    pub fn with_clock(bridge: B, config: RuntimeConfig, clock: Rc<dyn Clock>) -> Self {
        if (config.canvas_width, config.canvas_height) != (CANVAS_WIDTH, CANVAS_HEIGHT) {
            log::warn!(
                "canvas is fixed at {CANVAS_WIDTH}x{CANVAS_HEIGHT}, ignoring {}x{}",
                config.canvas_width,
                config.canvas_height
            );
        }
        let mut inspector = Inspector::new();
        inspector.hud.inspector_enabled = config.inspector;

        Self {
            manager: ReconcilerManager::new(config.backend),
            timers: Timers::new(clock.clone()),
            clock,
            config,
            bridge,
            draw: DrawList::default(),
            input: InputDispatcher::new(),
            inspector,
        }
    }

    /// Lets the driver diff against the active backend, flushes queued
    /// native node operations and rebuilds the draw list if a commit
    /// finished. Returns whether one did.
    pub fn commit(&mut self, driver: &mut dyn DiffDriver) -> anyhow::Result<bool> {
        let kind = self.manager.active_kind();
        self.manager
            .drive(driver)
            .inspect_err(|e| log::error!("{kind} commit failed: {e}"))
            .with_context(|| format!("{kind} commit failed"))?;
        self.flush_mirror();

        let committed = self.manager.active_mut().as_backend_mut().take_committed();
        if committed {
            self.recompile();
        }
        Ok(committed)
    }

    fn flush_mirror(&mut self) {
        let ops = self.manager.active_mut().as_backend_mut().drain_mirror_ops();
        if !ops.is_empty() {
            log::trace!("flushing {} mirror ops", ops.len());
        }
        for op in ops {
            op.apply(&mut self.bridge);
        }
    }

    fn recompile(&mut self) {
        let d = &self.config.draw;
        self.draw = match self.manager.active() {
            ActiveBackend::Persistent(b) => compile(b, d),
            ActiveBackend::Mutation(b) => compile(b, d),
        };
    }

    /// Polls the bridge's devices once and dispatches against the regions of
    /// the last compiled draw list.
    pub fn process_input(&mut self) {
        self.input.process(&self.bridge, &self.draw.regions);
        if self.inspector.hud.inspector_enabled {
            let hovered = self
                .input
                .hovered()
                .or(self.input.focused())
                .and_then(|id| self.draw.region(id))
                .map(|r| r.rect);
            self.inspector.hud.set_hovered(hovered);
        }
    }

    pub fn paint(&mut self) {
        let d = &self.config.draw;
        self.bridge.begin_frame(d.clear_color);
        self.draw.paint(&mut self.bridge, &self.input, d);

        if self.inspector.hud.inspector_enabled {
            let kind = self.manager.active_kind();
            self.inspector.hud.metrics = Some(Metrics::from_store(
                self.manager.metrics(kind),
                self.manager.backend().live_count(),
            ));
            let mut overlay = DrawList::default();
            self.inspector.frame(self.clock.now(), &mut overlay);
            overlay.paint(&mut self.bridge, &self.input, d);
        }
        self.bridge.end_frame();
    }

    /// Fires every timer due now. Returns how many callbacks ran.
    pub fn run_timers(&mut self) -> usize {
        self.timers.run_due()
    }

    pub fn tick(&mut self, driver: &mut dyn DiffDriver) -> anyhow::Result<()> {
        self.run_timers();
        self.commit(driver)?;
        self.paint();
        self.process_input();
        Ok(())
    }

    /// Unmounts the active backend, flushes its teardown to the native side
    /// and re-renders from scratch on a fresh backend of `kind`.
    pub fn switch_backend(
        &mut self,
        kind: BackendKind,
        driver: &mut dyn DiffDriver,
    ) -> anyhow::Result<()> {
        let previous = self.manager.active_kind();
        let Some(ops) = self
            .manager
            .switch_to(kind)
            .inspect_err(|e| log::error!("unmounting {previous} failed: {e}"))
            .with_context(|| format!("switching {previous} -> {kind} failed"))?
        else {
            return Ok(());
        };
        for op in ops {
            op.apply(&mut self.bridge);
        }
        driver.forget(previous);
        self.input.reset();
        self.inspector.hud.set_hovered(None);
        self.draw = DrawList::default();
        self.commit(driver)?;
        Ok(())
    }

    /// Routes an event the native side raised for an encoded node id to the
    /// active backend's handler registry.
    pub fn dispatch_native_event(&self, id: &str, event: HandlerEvent) -> bool {
        let Some(node) = NodeId::decode(id) else {
            log::warn!("{} event for malformed node id {id:?}", event.as_str());
            return false;
        };
        self.manager.backend().handlers().dispatch(node, event)
    }

    pub fn toggle_inspector(&mut self) {
        self.inspector.hud.toggle_inspector();
        if !self.inspector.hud.inspector_enabled {
            self.inspector.hud.set_hovered(None);
        }
    }

    pub fn inspector_enabled(&self) -> bool {
        self.inspector.hud.inspector_enabled
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn bridge(&self) -> &B {
        &self.bridge
    }

    pub fn bridge_mut(&mut self) -> &mut B {
        &mut self.bridge
    }

    pub fn draw_list(&self) -> &DrawList {
        &self.draw
    }

    pub fn manager(&self) -> &ReconcilerManager {
        &self.manager
    }

    pub fn input(&self) -> &InputDispatcher {
        &self.input
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.manager.active_kind()
    }
}
