//! Traits for the native side: the node mirror, the painter and the input
//! source. The core only ever calls into these; none of them can fail.

use bitflags::bitflags;
use smallvec::SmallVec;

use crate::color::Color;
use crate::geometry::{Rect, Vec2};
use crate::node::{ElementType, NodeId, Props};

/// Identity the native side uses for the container.
pub const ROOT_ID: &str = "";

/// Visual fields of one node as mirrored on the native side.
#[derive(Clone, Debug, PartialEq)]
pub enum NativeNode {
    Rect {
        frame: Rect,
        fill: Option<Color>,
        outline: Option<Color>,
        radius: f32,
    },
    Text {
        color: Option<Color>,
        border: bool,
        font_size: Option<u32>,
    },
    Button {
        frame: Rect,
        color: Option<Color>,
        text_color: Option<Color>,
        label: String,
        font_size: Option<u32>,
        radius: f32,
    },
    RawText(String),
}

impl NativeNode {
    pub fn from_props(props: &Props) -> Self {
        match props {
            Props::Rect(r) => NativeNode::Rect {
                frame: r.frame(),
                fill: r.fill(),
                outline: r.outline_color(),
                radius: r.border_radius,
            },
            Props::Text(t) => NativeNode::Text {
                color: t.color,
                border: t.border,
                font_size: t.font_size,
            },
            Props::Button(b) => NativeNode::Button {
                frame: b.frame(),
                color: b.color,
                text_color: b.text_color,
                label: b.label.clone(),
                font_size: b.font_size,
                radius: b.border_radius,
            },
        }
    }

    /// `None` for raw text.
    pub fn kind(&self) -> Option<ElementType> {
        match self {
            NativeNode::Rect { .. } => Some(ElementType::Rect),
            NativeNode::Text { .. } => Some(ElementType::Text),
            NativeNode::Button { .. } => Some(ElementType::Button),
            NativeNode::RawText(_) => None,
        }
    }
}

/// One queued structural change for the native node mirror.
///
/// Parents are `None` for the container, which the bridge sees as
/// [`ROOT_ID`].
#[derive(Clone, Debug, PartialEq)]
pub enum MirrorOp {
    Create {
        id: NodeId,
        node: NativeNode,
    },
    Update {
        id: NodeId,
        node: NativeNode,
    },
    Destroy {
        id: NodeId,
    },
    AppendChild {
        parent: Option<NodeId>,
        child: NodeId,
    },
    InsertBefore {
        parent: Option<NodeId>,
        child: NodeId,
        before: NodeId,
    },
    RemoveChild {
        parent: Option<NodeId>,
        child: NodeId,
    },
}

fn wire(id: Option<NodeId>) -> String {
    id.map(NodeId::encode).unwrap_or_else(|| ROOT_ID.to_string())
}

impl MirrorOp {
    pub fn apply(&self, mirror: &mut dyn NodeMirror) {
        match self {
            MirrorOp::Create { id, node } => mirror.create_node(&id.encode(), node),
            MirrorOp::Update { id, node } => mirror.update_node(&id.encode(), node),
            MirrorOp::Destroy { id } => mirror.destroy_node(&id.encode()),
            MirrorOp::AppendChild { parent, child } => {
                mirror.append_child(&wire(*parent), &child.encode())
            }
            MirrorOp::InsertBefore {
                parent,
                child,
                before,
            } => mirror.insert_before(&wire(*parent), &child.encode(), &before.encode()),
            MirrorOp::RemoveChild { parent, child } => {
                mirror.remove_child(&wire(*parent), &child.encode())
            }
        }
    }
}

/// Native node objects, keyed by encoded identity.
pub trait NodeMirror {
    fn create_node(&mut self, id: &str, node: &NativeNode);
    fn update_node(&mut self, id: &str, node: &NativeNode);
    fn destroy_node(&mut self, id: &str);
    fn append_child(&mut self, parent: &str, child: &str);
    fn insert_before(&mut self, parent: &str, child: &str, before: &str);
    fn remove_child(&mut self, parent: &str, child: &str);
}

/// Paint primitives in absolute canvas pixels, origin top-left.
pub trait Painter {
    fn begin_frame(&mut self, clear: Color);
    /// `radius == 0.0` is a plain rectangle.
    fn fill_rect(&mut self, rect: Rect, radius: f32, color: Color);
    fn stroke_rect(&mut self, rect: Rect, radius: f32, thickness: f32, color: Color);
    fn draw_text(&mut self, text: &str, pos: Vec2, font_size: u32, color: Color);
    /// Width in pixels of `text` at `font_size`.
    fn measure_text(&self, text: &str, font_size: u32) -> f32;
    fn end_frame(&mut self);
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct GamepadButtons: u8 {
        const UP      = 1 << 0;
        const DOWN    = 1 << 1;
        const LEFT    = 1 << 2;
        const RIGHT   = 1 << 3;
        const CONFIRM = 1 << 4;
    }
}

pub type TouchPoints = SmallVec<[Vec2; 4]>;

/// Current input state, polled once per tick.
pub trait InputSource {
    fn mouse_position(&self) -> Vec2;
    fn is_mouse_down(&self) -> bool;
    fn touch_points(&self) -> TouchPoints;
    fn gamepad(&self) -> GamepadButtons {
        GamepadButtons::empty()
    }
}

/// Everything the runtime needs from the native side.
pub trait NativeBridge: NodeMirror + Painter + InputSource {}

impl<T: NodeMirror + Painter + InputSource> NativeBridge for T {}
