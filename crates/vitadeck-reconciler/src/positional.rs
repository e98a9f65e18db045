//! A small diffing driver that matches children by position and kind.
//!
//! It re-renders a [`VNode`] tree on every drive and speaks either backend
//! contract. Same kind at the same index is updated; anything else is
//! replaced. Keys and moves are not supported.

use vitadeck_core::{ButtonProps, HostError, NodeId, Props, RectProps, TextProps};

use crate::host::{BackendKind, DiffDriver, MutationHost, PersistentHost};
use crate::persistent::Node;

/// Description of the desired tree.
#[derive(Clone, Debug, PartialEq)]
pub enum VNode {
    Element { props: Props, children: Vec<VNode> },
    Text(String),
}

impl VNode {
    pub fn rect(props: RectProps, children: Vec<VNode>) -> Self {
        VNode::Element {
            props: Props::Rect(props),
            children,
        }
    }

    /// A text element holding one raw text run.
    pub fn text(props: TextProps, content: impl Into<String>) -> Self {
        VNode::Element {
            props: Props::Text(props),
            children: vec![VNode::Text(content.into())],
        }
    }

    pub fn button(props: ButtonProps) -> Self {
        VNode::Element {
            props: Props::Button(props),
            children: Vec::new(),
        }
    }

    pub fn raw(content: impl Into<String>) -> Self {
        VNode::Text(content.into())
    }
}

#[derive(Debug)]
enum Shape {
    Element(Props),
    Text(String),
}

impl Shape {
    fn of(v: &VNode) -> Shape {
        match v {
            VNode::Element { props, .. } => Shape::Element(props.clone()),
            VNode::Text(s) => Shape::Text(s.clone()),
        }
    }

    fn matches(&self, v: &VNode) -> bool {
        match (self, v) {
            (Shape::Element(old), VNode::Element { props, .. }) => old.kind() == props.kind(),
            (Shape::Text(_), VNode::Text(_)) => true,
            _ => false,
        }
    }
}

#[derive(Debug)]
struct Mounted<I> {
    instance: I,
    shape: Shape,
    children: Vec<Mounted<I>>,
}

pub struct PositionalDriver<F> {
    render: F,
    mutation: Vec<Mounted<NodeId>>,
    persistent: Vec<Mounted<Node>>,
}

impl<F: FnMut() -> Vec<VNode>> PositionalDriver<F> {
    pub fn new(render: F) -> Self {
        Self {
            render,
            mutation: Vec::new(),
            persistent: Vec::new(),
        }
    }
}

impl<F: FnMut() -> Vec<VNode>> DiffDriver for PositionalDriver<F> {
    fn drive_mutation(&mut self, host: &mut dyn MutationHost) -> Result<(), HostError> {
        let tree = (self.render)();
        host.prepare_for_commit()?;
        let old = std::mem::take(&mut self.mutation);
        let next = mutation::reconcile(host, None, old, &tree);
        let reset = host.reset_after_commit();
        match next.and_then(|next| reset.map(|()| next)) {
            Ok(next) => {
                self.mutation = next;
                Ok(())
            }
            Err(e) => {
                // The mounted list is gone; empty the container so the next
                // drive mounts from scratch instead of on top of stale nodes.
                log::warn!("positional: mutation drive failed, unmounting: {e}");
                host.clear_container()?;
                Err(e)
            }
        }
    }

    fn drive_persistent(&mut self, host: &mut dyn PersistentHost) -> Result<(), HostError> {
        let tree = (self.render)();
        let old = std::mem::take(&mut self.persistent);
        let mut deleted = Vec::new();
        let (next, changed) = persistent::reconcile(host, old, &tree, &mut deleted)?;
        if changed {
            host.prepare_for_commit()?;
            let mut set = host.create_container_child_set();
            for m in &next {
                host.append_child_to_container_child_set(&mut set, m.instance.clone())?;
            }
            let children = host.finalize_container_children(set)?;
            host.replace_container_children(children)?;
            for m in deleted {
                persistent::detach(host, m)?;
            }
            host.reset_after_commit()?;
        }
        self.persistent = next;
        Ok(())
    }

    fn forget(&mut self, kind: BackendKind) {
        match kind {
            BackendKind::Persistent => self.persistent.clear(),
            BackendKind::Mutation => self.mutation.clear(),
        }
    }
}

mod mutation {
    use super::*;

    fn mount(host: &mut dyn MutationHost, v: &VNode) -> Result<Mounted<NodeId>, HostError> {
        match v {
            VNode::Text(s) => Ok(Mounted {
                instance: host.create_text_instance(s)?,
                shape: Shape::Text(s.clone()),
                children: Vec::new(),
            }),
            VNode::Element { props, children } => {
                let mut id = host.create_instance(props.kind(), props.clone())?;
                let mut kids = Vec::with_capacity(children.len());
                for c in children {
                    let m = mount(host, c)?;
                    host.append_initial_child(&mut id, m.instance)?;
                    kids.push(m);
                }
                host.finalize_initial_children(&id)?;
                Ok(Mounted {
                    instance: id,
                    shape: Shape::of(v),
                    children: kids,
                })
            }
        }
    }

    fn detach(host: &mut dyn MutationHost, m: Mounted<NodeId>) -> Result<(), HostError> {
        for c in m.children {
            detach(host, c)?;
        }
        host.detach_deleted_instance(&m.instance)
    }

    fn remove(
        host: &mut dyn MutationHost,
        parent: Option<NodeId>,
        m: Mounted<NodeId>,
    ) -> Result<(), HostError> {
        match parent {
            Some(p) => host.remove_child(p, m.instance)?,
            None => host.remove_child_from_container(m.instance)?,
        }
        detach(host, m)
    }

    fn update(
        host: &mut dyn MutationHost,
        prev: Mounted<NodeId>,
        v: &VNode,
    ) -> Result<Mounted<NodeId>, HostError> {
        match (prev.shape, v) {
            (Shape::Element(old), VNode::Element { props, children }) => {
                if let Some(payload) = host.prepare_update(&prev.instance, &old, props)? {
                    host.commit_update(prev.instance, &payload, props.clone())?;
                }
                let kids = reconcile(host, Some(prev.instance), prev.children, children)?;
                Ok(Mounted {
                    instance: prev.instance,
                    shape: Shape::Element(props.clone()),
                    children: kids,
                })
            }
            (Shape::Text(old), VNode::Text(new)) => {
                if old != *new {
                    host.commit_text_update(prev.instance, &old, new)?;
                }
                Ok(Mounted {
                    instance: prev.instance,
                    shape: Shape::Text(new.clone()),
                    children: Vec::new(),
                })
            }
            _ => Err(HostError::ContractViolation("update across node kinds")),
        }
    }

    pub(super) fn reconcile(
        host: &mut dyn MutationHost,
        parent: Option<NodeId>,
        old: Vec<Mounted<NodeId>>,
        new: &[VNode],
    ) -> Result<Vec<Mounted<NodeId>>, HostError> {
        let mut out = Vec::with_capacity(new.len());
        let mut old = old.into_iter();
        let mut new = new.iter();
        loop {
            match (old.next(), new.next()) {
                (None, None) => break,
                (Some(prev), Some(v)) if prev.shape.matches(v) => out.push(update(host, prev, v)?),
                (Some(prev), Some(v)) => {
                    let m = mount(host, v)?;
                    match parent {
                        Some(p) => host.insert_before(p, m.instance, prev.instance)?,
                        None => host.insert_in_container_before(m.instance, prev.instance)?,
                    }
                    remove(host, parent, prev)?;
                    out.push(m);
                }
                (None, Some(v)) => {
                    let m = mount(host, v)?;
                    match parent {
                        Some(p) => host.append_child(p, m.instance)?,
                        None => host.append_child_to_container(m.instance)?,
                    }
                    out.push(m);
                }
                (Some(prev), None) => remove(host, parent, prev)?,
            }
        }
        Ok(out)
    }
}

mod persistent {
    use super::*;

    fn mount(host: &mut dyn PersistentHost, v: &VNode) -> Result<Mounted<Node>, HostError> {
        match v {
            VNode::Text(s) => Ok(Mounted {
                instance: host.create_text_instance(s)?,
                shape: Shape::Text(s.clone()),
                children: Vec::new(),
            }),
            VNode::Element { props, children } => {
                let mut node = host.create_instance(props.kind(), props.clone())?;
                let mut kids = Vec::with_capacity(children.len());
                for c in children {
                    let m = mount(host, c)?;
                    host.append_initial_child(&mut node, m.instance.clone())?;
                    kids.push(m);
                }
                host.finalize_initial_children(&node)?;
                Ok(Mounted {
                    instance: node,
                    shape: Shape::of(v),
                    children: kids,
                })
            }
        }
    }

    pub(super) fn detach(host: &mut dyn PersistentHost, m: Mounted<Node>) -> Result<(), HostError> {
        for c in m.children {
            detach(host, c)?;
        }
        host.detach_deleted_instance(&m.instance)
    }

    /// Returns the updated node and whether it is a different object.
    fn update(
        host: &mut dyn PersistentHost,
        prev: Mounted<Node>,
        v: &VNode,
        deleted: &mut Vec<Mounted<Node>>,
    ) -> Result<(Mounted<Node>, bool), HostError> {
        let Mounted {
            instance,
            shape,
            children: old_kids,
        } = prev;
        match (shape, v) {
            (Shape::Element(old), VNode::Element { props, children }) => {
                let payload = host.prepare_update(&instance, &old, props)?;
                let (kids, kids_changed) = reconcile(host, old_kids, children, deleted)?;
                if payload.is_none() && !kids_changed {
                    let kept = Mounted {
                        instance,
                        shape: Shape::Element(old),
                        children: kids,
                    };
                    return Ok((kept, false));
                }
                let mut node =
                    host.clone_instance(&instance, payload.as_ref(), props.clone(), !kids_changed)?;
                if kids_changed {
                    for k in &kids {
                        host.append_initial_child(&mut node, k.instance.clone())?;
                    }
                }
                let cloned = Mounted {
                    instance: node,
                    shape: Shape::Element(props.clone()),
                    children: kids,
                };
                Ok((cloned, true))
            }
            (Shape::Text(old), VNode::Text(new)) => {
                if old == *new {
                    let kept = Mounted {
                        instance,
                        shape: Shape::Text(old),
                        children: Vec::new(),
                    };
                    return Ok((kept, false));
                }
                let fresh = Mounted {
                    instance: host.create_text_instance(new)?,
                    shape: Shape::Text(new.clone()),
                    children: Vec::new(),
                };
                Ok((fresh, true))
            }
            _ => Err(HostError::ContractViolation("update across node kinds")),
        }
    }

    pub(super) fn reconcile(
        host: &mut dyn PersistentHost,
        old: Vec<Mounted<Node>>,
        new: &[VNode],
        deleted: &mut Vec<Mounted<Node>>,
    ) -> Result<(Vec<Mounted<Node>>, bool), HostError> {
        let mut out = Vec::with_capacity(new.len());
        let mut changed = false;
        let mut old = old.into_iter();
        let mut new = new.iter();
        loop {
            match (old.next(), new.next()) {
                (None, None) => break,
                (Some(prev), Some(v)) if prev.shape.matches(v) => {
                    let (m, c) = update(host, prev, v, deleted)?;
                    changed |= c;
                    out.push(m);
                }
                (Some(prev), Some(v)) => {
                    deleted.push(prev);
                    out.push(mount(host, v)?);
                    changed = true;
                }
                (None, Some(v)) => {
                    out.push(mount(host, v)?);
                    changed = true;
                }
                (Some(prev), None) => {
                    deleted.push(prev);
                    changed = true;
                }
            }
        }
        Ok((out, changed))
    }
}
