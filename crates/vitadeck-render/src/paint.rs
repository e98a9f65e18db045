use vitadeck_core::{Color, NodeId, Painter, Rect};

use crate::command::{DrawCommand, DrawDefaults, DrawList};

/// Transient pointer state painting asks about. Buttons never store it.
pub trait InteractionState {
    fn is_hovered(&self, id: NodeId) -> bool;
    fn is_pressed(&self, id: NodeId) -> bool;
}

/// Snapshot of hover/press state for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Interactions {
    pub hover: Option<NodeId>,
    pub pressed: Option<NodeId>,
}

impl InteractionState for Interactions {
    fn is_hovered(&self, id: NodeId) -> bool {
        self.hover == Some(id)
    }

    fn is_pressed(&self, id: NodeId) -> bool {
        self.pressed == Some(id)
    }
}

/// Pressed wins over hovered.
pub fn button_color(
    id: NodeId,
    base: Color,
    state: &dyn InteractionState,
    d: &DrawDefaults,
) -> Color {
    if state.is_pressed(id) {
        base.mix(Color::BLACK, d.press_mix)
    } else if state.is_hovered(id) {
        base.mix(Color::WHITE, d.hover_mix)
    } else {
        base
    }
}

pub fn paint_command(
    painter: &mut dyn Painter,
    cmd: &DrawCommand,
    state: &dyn InteractionState,
    d: &DrawDefaults,
) {
    match cmd {
        DrawCommand::Rect {
            rect,
            fill,
            outline,
            radius,
        } => {
            if let Some(c) = fill {
                painter.fill_rect(*rect, *radius, *c);
            }
            if let Some(c) = outline {
                let thickness = if *radius > 0.0 { 2.0 } else { 1.0 };
                painter.stroke_rect(*rect, *radius, thickness, *c);
            }
        }
        DrawCommand::Text {
            pos,
            font_size,
            text,
            color,
            border,
        } => {
            let color = color.unwrap_or(d.text_color);
            if *border {
                let width = painter.measure_text(text, *font_size);
                let frame = Rect::new(pos.x, pos.y, width, *font_size as f32)
                    .inflate(d.text_border_padding);
                painter.stroke_rect(frame, 0.0, d.text_border_thickness, color);
            }
            painter.draw_text(text, *pos, *font_size, color);
        }
        DrawCommand::Button {
            id,
            rect,
            base_color,
            text_color,
            label,
            font_size,
            radius,
        } => {
            let visual = button_color(*id, *base_color, state, d);
            painter.fill_rect(*rect, *radius, visual);
            let at = rect.origin().offset(d.padding, d.padding);
            painter.draw_text(label, at, *font_size, *text_color);
        }
    }
}

impl DrawList {
    /// Issues every command in order. Frame begin/end is the caller's.
    pub fn paint(
        &self,
        painter: &mut dyn Painter,
        state: &dyn InteractionState,
        d: &DrawDefaults,
    ) {
        for cmd in &self.commands {
            paint_command(painter, cmd, state, d);
        }
    }
}
