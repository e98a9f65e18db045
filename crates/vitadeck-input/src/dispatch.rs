use vitadeck_core::{GamepadButtons, HandlerEvent, InputSource, NodeId, Vec2, invoke_isolated};
use vitadeck_render::{InteractionState, InteractiveRegion};

use crate::focus::{Direction, nearest};
use crate::hit::{region_by_id, top_hit};

/// Invokes `event` on the region registered as `id`, if it is still
/// registered and has a handler for it. Returns whether a handler ran to
/// completion.
fn fire(regions: &[InteractiveRegion], id: NodeId, event: HandlerEvent) -> bool {
    let Some(cb) = region_by_id(regions, id).and_then(|r| r.handlers.get(event)) else {
        return false;
    };
    log::debug!("{} -> {}", event.as_str(), id);
    invoke_isolated(cb, event, id)
}

/// Edge-detecting pointer, touch and gamepad state machine.
///
/// Mouse and touch are tracked independently and both polled every tick.
/// Handlers come from the region snapshot passed in, so an id whose node has
/// since been detached can never be invoked.
#[derive(Debug, Default)]
pub struct InputDispatcher {
    hovered: Option<NodeId>,
    mouse_down: bool,
    mouse_pressed: Option<NodeId>,

    touch_down: bool,
    touch_pressed: Option<NodeId>,

    focused: Option<NodeId>,
    gamepad_pressed: Option<NodeId>,
    prev_pad: GamepadButtons,
}

impl InputDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Polls every device on `input` once against `regions`.
    pub fn process(&mut self, input: &dyn InputSource, regions: &[InteractiveRegion]) {
        self.process_mouse(input.mouse_position(), input.is_mouse_down(), regions);
        self.process_touch(&input.touch_points(), regions);
        self.process_gamepad(input.gamepad(), regions);
    }

    pub fn process_mouse(&mut self, pos: Vec2, down: bool, regions: &[InteractiveRegion]) {
        let top = top_hit(regions, pos).map(|r| r.id);

        if top != self.hovered {
            self.clear_focus(regions);
            if let Some(prev) = self.hovered.take() {
                fire(regions, prev, HandlerEvent::HoverLeave);
            }
            if let Some(id) = top {
                fire(regions, id, HandlerEvent::HoverEnter);
            }
            self.hovered = top;
        }

        if down && !self.mouse_down {
            self.clear_focus(regions);
            if let Some(id) = top {
                fire(regions, id, HandlerEvent::Press);
                fire(regions, id, HandlerEvent::Click);
            }
            self.mouse_pressed = top;
        } else if !down && self.mouse_down {
            if let Some(id) = top {
                fire(regions, id, HandlerEvent::Release);
            }
            self.mouse_pressed = None;
        }
        self.mouse_down = down;
    }

    /// Only the first contact point is considered.
    pub fn process_touch(&mut self, points: &[Vec2], regions: &[InteractiveRegion]) {
        let first = points.first().copied();

        match (first, self.touch_down) {
            (Some(pos), false) => {
                self.clear_focus(regions);
                let top = top_hit(regions, pos).map(|r| r.id);
                if let Some(id) = top {
                    fire(regions, id, HandlerEvent::Press);
                    fire(regions, id, HandlerEvent::Click);
                }
                self.touch_pressed = top;
            }
            (None, true) => {
                if let Some(id) = self.touch_pressed.take() {
                    if region_by_id(regions, id).is_some() {
                        fire(regions, id, HandlerEvent::Release);
                    } else {
                        log::debug!("touch release for vanished node {id} dropped");
                    }
                }
            }
            _ => {}
        }
        self.touch_down = first.is_some();
    }

    pub fn process_gamepad(&mut self, buttons: GamepadButtons, regions: &[InteractiveRegion]) {
        if self.focused.is_some_and(|id| region_by_id(regions, id).is_none()) {
            self.focused = None;
        }
        if self
            .gamepad_pressed
            .is_some_and(|id| region_by_id(regions, id).is_none())
        {
            self.gamepad_pressed = None;
        }

        let newly = buttons.difference(self.prev_pad);
        let released = self.prev_pad.difference(buttons);
        self.prev_pad = buttons;

        if let Some(dir) = Direction::from_buttons(newly)
            && let Some(next) = nearest(regions, self.focused, dir)
        {
            self.set_focus(Some(next), regions);
        }

        if newly.contains(GamepadButtons::CONFIRM)
            && let Some(id) = self.focused
        {
            self.gamepad_pressed = Some(id);
            fire(regions, id, HandlerEvent::Press);
        }

        if released.contains(GamepadButtons::CONFIRM)
            && let Some(id) = self.gamepad_pressed.take()
        {
            fire(regions, id, HandlerEvent::Release);
            if self.focused == Some(id) {
                fire(regions, id, HandlerEvent::Click);
            }
        }
    }

    fn set_focus(&mut self, next: Option<NodeId>, regions: &[InteractiveRegion]) {
        if self.focused == next {
            return;
        }
        if let Some(prev) = self.focused.take() {
            fire(regions, prev, HandlerEvent::HoverLeave);
        }
        if let Some(id) = next {
            fire(regions, id, HandlerEvent::HoverEnter);
        }
        self.focused = next;
    }

    fn clear_focus(&mut self, regions: &[InteractiveRegion]) {
        self.set_focus(None, regions);
        self.gamepad_pressed = None;
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.hovered
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    /// Forgets every tracked id without firing anything, e.g. after the
    /// backend is switched and all old ids are gone.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl InteractionState for InputDispatcher {
    fn is_hovered(&self, id: NodeId) -> bool {
        self.hovered == Some(id) || self.focused == Some(id)
    }

    fn is_pressed(&self, id: NodeId) -> bool {
        [self.mouse_pressed, self.touch_pressed, self.gamepad_pressed].contains(&Some(id))
    }
}
