use std::collections::HashMap;

use vitadeck_core::{
    Color, GamepadButtons, InputSource, NativeNode, NodeMirror, Painter, ROOT_ID, Rect,
    TouchPoints, Vec2,
};

#[derive(Clone, Debug, PartialEq)]
pub enum PaintCall {
    Begin(Color),
    Fill {
        rect: Rect,
        radius: f32,
        color: Color,
    },
    Stroke {
        rect: Rect,
        radius: f32,
        thickness: f32,
        color: Color,
    },
    Text {
        text: String,
        pos: Vec2,
        font_size: u32,
        color: Color,
    },
    End,
}

#[derive(Clone, Debug)]
pub struct MirroredNode {
    pub node: NativeNode,
    pub children: Vec<String>,
}

/// A bridge with no display: keeps the mirrored node tree, records the paint
/// calls of the last frame and reports whatever input state the caller sets.
#[derive(Debug, Default)]
pub struct RecordingBridge {
    pub nodes: HashMap<String, MirroredNode>,
    pub root: Vec<String>,
    /// Calls of the frame in progress or, after `end_frame`, the last one.
    pub calls: Vec<PaintCall>,
    pub frames: u64,

    pub mouse: Vec2,
    pub mouse_down: bool,
    pub touches: TouchPoints,
    pub pad: GamepadButtons,
}

impl RecordingBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn children_of(&self, parent: &str) -> Option<&[String]> {
        if parent == ROOT_ID {
            Some(&self.root)
        } else {
            self.nodes.get(parent).map(|n| n.children.as_slice())
        }
    }

    fn children_mut(&mut self, parent: &str) -> Option<&mut Vec<String>> {
        if parent == ROOT_ID {
            Some(&mut self.root)
        } else {
            self.nodes.get_mut(parent).map(|n| &mut n.children)
        }
    }

    /// Text drawn in the last frame, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                PaintCall::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Depth-first dump of the mirrored tree, one line per node.
    pub fn outline(&self) -> Vec<String> {
        fn walk(bridge: &RecordingBridge, id: &str, depth: usize, out: &mut Vec<String>) {
            let Some(n) = bridge.nodes.get(id) else {
                out.push(format!("{}<missing {id}>", "  ".repeat(depth)));
                return;
            };
            let line = match &n.node {
                NativeNode::Rect { frame, .. } => {
                    format!("rect {},{} {}x{}", frame.x, frame.y, frame.w, frame.h)
                }
                NativeNode::Text { .. } => "text".to_string(),
                NativeNode::Button { label, .. } => format!("button {label}"),
                NativeNode::RawText(s) => format!("'{s}'"),
            };
            out.push(format!("{}{}", "  ".repeat(depth), line));
            for child in &n.children {
                walk(bridge, child, depth + 1, out);
            }
        }
        let mut out = Vec::new();
        for id in &self.root {
            walk(self, id, 0, &mut out);
        }
        out
    }
}

impl NodeMirror for RecordingBridge {
    fn create_node(&mut self, id: &str, node: &NativeNode) {
        self.nodes.insert(
            id.to_string(),
            MirroredNode {
                node: node.clone(),
                children: Vec::new(),
            },
        );
    }

    fn update_node(&mut self, id: &str, node: &NativeNode) {
        match self.nodes.get_mut(id) {
            Some(n) => n.node = node.clone(),
            None => log::warn!("update for unknown native node {id}"),
        }
    }

    fn destroy_node(&mut self, id: &str) {
        self.nodes.remove(id);
    }

    fn append_child(&mut self, parent: &str, child: &str) {
        if let Some(list) = self.children_mut(parent) {
            list.retain(|c| c != child);
            list.push(child.to_string());
        }
    }

    fn insert_before(&mut self, parent: &str, child: &str, before: &str) {
        if let Some(list) = self.children_mut(parent) {
            list.retain(|c| c != child);
            let at = list.iter().position(|c| c == before).unwrap_or(list.len());
            list.insert(at, child.to_string());
        }
    }

    fn remove_child(&mut self, parent: &str, child: &str) {
        if let Some(list) = self.children_mut(parent) {
            list.retain(|c| c != child);
        }
    }
}

impl Painter for RecordingBridge {
    fn begin_frame(&mut self, clear: Color) {
        self.calls.clear();
        self.calls.push(PaintCall::Begin(clear));
    }

    fn fill_rect(&mut self, rect: Rect, radius: f32, color: Color) {
        self.calls.push(PaintCall::Fill {
            rect,
            radius,
            color,
        });
    }

    fn stroke_rect(&mut self, rect: Rect, radius: f32, thickness: f32, color: Color) {
        self.calls.push(PaintCall::Stroke {
            rect,
            radius,
            thickness,
            color,
        });
    }

    fn draw_text(&mut self, text: &str, pos: Vec2, font_size: u32, color: Color) {
        self.calls.push(PaintCall::Text {
            text: text.to_string(),
            pos,
            font_size,
            color,
        });
    }

    /// Fixed advance of half the font size per character.
    fn measure_text(&self, text: &str, font_size: u32) -> f32 {
        text.chars().count() as f32 * font_size as f32 * 0.5
    }

    fn end_frame(&mut self) {
        self.calls.push(PaintCall::End);
        self.frames += 1;
    }
}

impl InputSource for RecordingBridge {
    fn mouse_position(&self) -> Vec2 {
        self.mouse
    }

    fn is_mouse_down(&self) -> bool {
        self.mouse_down
    }

    fn touch_points(&self) -> TouchPoints {
        self.touches.clone()
    }

    fn gamepad(&self) -> GamepadButtons {
        self.pad
    }
}
