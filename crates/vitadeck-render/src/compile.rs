use vitadeck_core::{Handlers, NodeId, NodeView, Props, Rect, SceneTree, Vec2};

use crate::command::{DrawCommand, DrawDefaults, DrawList, InteractiveRegion};

/// Coordinate frame of a container-like node (the container or a rect).
struct Frame {
    origin: Vec2,
    /// Text elements emitted directly inside this frame so far.
    line: u32,
}

/// Walks the committed tree depth-first into a fresh draw list.
pub fn compile<T: SceneTree + ?Sized>(tree: &T, defaults: &DrawDefaults) -> DrawList {
    let mut out = DrawList::default();
    let mut root = Frame {
        origin: Vec2::ZERO,
        line: 0,
    };
    walk(tree, tree.roots(), &mut root, &mut out, defaults);
    log::trace!(
        "compiled {} commands, {} regions",
        out.commands.len(),
        out.regions.len()
    );
    out
}

fn absolute(origin: Vec2, local: Rect) -> Rect {
    Rect::new(origin.x + local.x, origin.y + local.y, local.w, local.h)
}

fn region(out: &mut DrawList, id: NodeId, rect: Rect, handlers: &Handlers) {
    if !handlers.is_empty() {
        out.regions.push(InteractiveRegion {
            id,
            rect,
            handlers: handlers.clone(),
        });
    }
}

fn walk<'a, T: SceneTree + ?Sized>(
    tree: &'a T,
    nodes: impl Iterator<Item = T::Node<'a>>,
    frame: &mut Frame,
    out: &mut DrawList,
    d: &DrawDefaults,
) {
    for node in nodes {
        // Raw text only counts inside a text element.
        let Some(NodeView::Element { id, props }) = tree.view(node) else {
            continue;
        };
        match props {
            Props::Rect(r) => {
                let rect = absolute(frame.origin, r.frame());
                out.commands.push(DrawCommand::Rect {
                    rect,
                    fill: r.fill(),
                    outline: r.outline_color(),
                    radius: r.border_radius,
                });
                region(out, id, rect, &r.handlers);

                let mut inner = Frame {
                    origin: rect.origin(),
                    line: 0,
                };
                walk(tree, tree.children(node), &mut inner, out, d);
            }
            Props::Text(t) => {
                let font_size = t.font_size.unwrap_or(d.text_font_size);
                let pos = frame
                    .origin
                    .offset(d.padding, d.padding + (frame.line * font_size) as f32);
                out.commands.push(DrawCommand::Text {
                    pos,
                    font_size,
                    text: tree.text_content(node),
                    color: t.color,
                    border: t.border,
                });
                frame.line += 1;
            }
            Props::Button(b) => {
                let rect = absolute(frame.origin, b.frame());
                out.commands.push(DrawCommand::Button {
                    id,
                    rect,
                    base_color: b.color.unwrap_or(d.button_color),
                    text_color: b.text_color.unwrap_or(d.button_text_color),
                    label: b.label.clone(),
                    font_size: b.font_size.unwrap_or(d.button_font_size),
                    radius: b.border_radius,
                });
                region(out, id, rect, &b.handlers);
            }
        }
    }
}
