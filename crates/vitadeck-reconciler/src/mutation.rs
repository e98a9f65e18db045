//! In-place backend.
//!
//! Nodes live in one arena with parent links. Every structural change is
//! applied directly to the live tree and queued as a [`MirrorOp`] for the
//! native node mirror, which is flushed after the commit.

use slotmap::SlotMap;
use vitadeck_core::{
    ElementType, HandlerRegistry, HostError, MirrorOp, NativeNode, NodeId, NodeView, Props,
    SceneTree, UpdatePayload,
};

use crate::host::{Backend, BackendKind, HostConfig, MutationHost};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Parent {
    Detached,
    Container,
    Node(NodeId),
}

impl Parent {
    fn wire(self) -> Option<NodeId> {
        match self {
            Parent::Node(id) => Some(id),
            _ => None,
        }
    }
}

#[derive(Debug)]
enum Content {
    Element(Props),
    Text(String),
}

#[derive(Debug)]
struct ArenaNode {
    parent: Parent,
    content: Content,
    children: Vec<NodeId>,
}

#[derive(Debug, Default)]
pub struct MutationBackend {
    nodes: SlotMap<NodeId, ArenaNode>,
    roots: Vec<NodeId>,
    handlers: HandlerRegistry,
    outbox: Vec<MirrorOp>,
    in_commit: bool,
    commit_pending: bool,
}

impl MutationBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root_children(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn children_of(&self, id: NodeId) -> Option<&[NodeId]> {
        self.nodes.get(id).map(|n| n.children.as_slice())
    }

    pub fn props_of(&self, id: NodeId) -> Option<&Props> {
        match &self.nodes.get(id)?.content {
            Content::Element(p) => Some(p),
            Content::Text(_) => None,
        }
    }

    pub fn text_of(&self, id: NodeId) -> Option<&str> {
        match &self.nodes.get(id)?.content {
            Content::Text(s) => Some(s),
            Content::Element(_) => None,
        }
    }

    /// Ops queued but not yet drained.
    pub fn pending_mirror_ops(&self) -> &[MirrorOp] {
        &self.outbox
    }

    fn node(&self, id: NodeId) -> Result<&ArenaNode, HostError> {
        self.nodes.get(id).ok_or(HostError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut ArenaNode, HostError> {
        self.nodes.get_mut(id).ok_or(HostError::UnknownNode(id))
    }

    fn element_props(&self, id: NodeId) -> Result<&Props, HostError> {
        match &self.node(id)?.content {
            Content::Element(p) => Ok(p),
            Content::Text(_) => Err(HostError::ContractViolation(
                "element operation on a text node",
            )),
        }
    }

    fn ensure_container(&self, id: NodeId) -> Result<(), HostError> {
        self.element_props(id).map(|_| ())
    }

    fn list_mut(&mut self, parent: Parent) -> Result<&mut Vec<NodeId>, HostError> {
        match parent {
            Parent::Container => Ok(&mut self.roots),
            Parent::Node(id) => Ok(&mut self.node_mut(id)?.children),
            Parent::Detached => Err(HostError::ContractViolation("detached parent")),
        }
    }

    /// Takes `child` out of whatever list currently holds it.
    fn unlink(&mut self, child: NodeId) -> Result<(), HostError> {
        let parent = self.node(child)?.parent;
        if parent == Parent::Detached {
            return Ok(());
        }
        let list = self.list_mut(parent)?;
        if let Some(i) = list.iter().position(|&c| c == child) {
            list.remove(i);
        }
        self.node_mut(child)?.parent = Parent::Detached;
        self.outbox.push(MirrorOp::RemoveChild {
            parent: parent.wire(),
            child,
        });
        Ok(())
    }

    /// Walks parent links up from `node` looking for `ancestor`.
    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut at = Parent::Node(node);
        while let Parent::Node(id) = at {
            if id == ancestor {
                return true;
            }
            match self.nodes.get(id) {
                Some(n) => at = n.parent,
                None => return false,
            }
        }
        false
    }

    fn append(&mut self, parent: Parent, child: NodeId) -> Result<(), HostError> {
        if parent == Parent::Node(child) {
            return Err(HostError::ContractViolation("node appended to itself"));
        }
        if let Parent::Node(p) = parent
            && self.is_ancestor(child, p)
        {
            return Err(HostError::ContractViolation(
                "node moved under its own descendant",
            ));
        }
        self.unlink(child)?;
        self.list_mut(parent)?.push(child);
        self.node_mut(child)?.parent = parent;
        self.outbox.push(MirrorOp::AppendChild {
            parent: parent.wire(),
            child,
        });
        Ok(())
    }

    /// Found-or-append: a `before` that is not in the list appends.
    fn insert(&mut self, parent: Parent, child: NodeId, before: NodeId) -> Result<(), HostError> {
        if parent == Parent::Node(child) {
            return Err(HostError::ContractViolation("node inserted into itself"));
        }
        if let Parent::Node(p) = parent
            && self.is_ancestor(child, p)
        {
            return Err(HostError::ContractViolation(
                "node moved under its own descendant",
            ));
        }
        self.unlink(child)?;
        let list = self.list_mut(parent)?;
        let op = match list.iter().position(|&c| c == before) {
            Some(i) => {
                list.insert(i, child);
                MirrorOp::InsertBefore {
                    parent: parent.wire(),
                    child,
                    before,
                }
            }
            None => {
                list.push(child);
                MirrorOp::AppendChild {
                    parent: parent.wire(),
                    child,
                }
            }
        };
        self.node_mut(child)?.parent = parent;
        self.outbox.push(op);
        Ok(())
    }

    /// Removes `child` from `parent` if it is there; otherwise nothing happens.
    fn remove(&mut self, parent: Parent, child: NodeId) -> Result<(), HostError> {
        let list = self.list_mut(parent)?;
        let Some(i) = list.iter().position(|&c| c == child) else {
            log::trace!("mutation: remove of non-child {} ignored", child);
            return Ok(());
        };
        list.remove(i);
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Parent::Detached;
        }
        self.outbox.push(MirrorOp::RemoveChild {
            parent: parent.wire(),
            child,
        });
        Ok(())
    }
}

impl HostConfig for MutationBackend {
    type Instance = NodeId;

    fn create_instance(&mut self, kind: ElementType, props: Props) -> Result<NodeId, HostError> {
        props.expect_kind(kind)?;
        let native = NativeNode::from_props(&props);
        let handlers = props.handlers().cloned();
        let id = self.nodes.insert(ArenaNode {
            parent: Parent::Detached,
            content: Content::Element(props),
            children: Vec::new(),
        });
        if let Some(h) = handlers {
            self.handlers.register(id, &h);
        }
        self.outbox.push(MirrorOp::Create { id, node: native });
        log::trace!("mutation: create {} {}", kind, id);
        Ok(id)
    }

    fn create_text_instance(&mut self, text: &str) -> Result<NodeId, HostError> {
        let id = self.nodes.insert(ArenaNode {
            parent: Parent::Detached,
            content: Content::Text(text.to_string()),
            children: Vec::new(),
        });
        self.outbox.push(MirrorOp::Create {
            id,
            node: NativeNode::RawText(text.to_string()),
        });
        Ok(id)
    }

    fn append_initial_child(&mut self, parent: &mut NodeId, child: NodeId) -> Result<(), HostError> {
        self.ensure_container(*parent)?;
        self.append(Parent::Node(*parent), child)
    }

    fn finalize_initial_children(&mut self, node: &NodeId) -> Result<bool, HostError> {
        self.ensure_container(*node)?;
        Ok(false)
    }

    fn prepare_update(
        &self,
        node: &NodeId,
        old: &Props,
        new: &Props,
    ) -> Result<Option<UpdatePayload>, HostError> {
        new.expect_kind(self.element_props(*node)?.kind())?;
        let props = Props::changed_keys(old, new)?;
        Ok((!props.is_empty()).then_some(UpdatePayload { props }))
    }

    fn prepare_for_commit(&mut self) -> Result<(), HostError> {
        if self.in_commit {
            return Err(HostError::ContractViolation("nested prepare_for_commit"));
        }
        self.in_commit = true;
        Ok(())
    }

    fn reset_after_commit(&mut self) -> Result<(), HostError> {
        if !self.in_commit {
            return Err(HostError::ContractViolation(
                "reset_after_commit without prepare_for_commit",
            ));
        }
        self.in_commit = false;
        self.commit_pending = true;
        Ok(())
    }

    fn clear_container(&mut self) -> Result<(), HostError> {
        for child in std::mem::take(&mut self.roots) {
            if let Some(node) = self.nodes.get_mut(child) {
                node.parent = Parent::Detached;
            }
            self.outbox.push(MirrorOp::RemoveChild {
                parent: None,
                child,
            });
        }
        Ok(())
    }

    fn detach_deleted_instance(&mut self, node: &NodeId) -> Result<(), HostError> {
        let id = *node;
        self.unlink(id)?;
        self.handlers.deregister(id);
        let Some(removed) = self.nodes.remove(id) else {
            return Err(HostError::UnknownNode(id));
        };
        for child in removed.children {
            if let Some(c) = self.nodes.get_mut(child) {
                c.parent = Parent::Detached;
            }
        }
        self.outbox.push(MirrorOp::Destroy { id });
        log::trace!("mutation: detach {}", id);
        Ok(())
    }
}

impl MutationHost for MutationBackend {
    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HostError> {
        self.ensure_container(parent)?;
        self.append(Parent::Node(parent), child)
    }

    fn append_child_to_container(&mut self, child: NodeId) -> Result<(), HostError> {
        self.append(Parent::Container, child)
    }

    fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        before: NodeId,
    ) -> Result<(), HostError> {
        self.ensure_container(parent)?;
        self.insert(Parent::Node(parent), child, before)
    }

    fn insert_in_container_before(
        &mut self,
        child: NodeId,
        before: NodeId,
    ) -> Result<(), HostError> {
        self.insert(Parent::Container, child, before)
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HostError> {
        self.ensure_container(parent)?;
        self.remove(Parent::Node(parent), child)
    }

    fn remove_child_from_container(&mut self, child: NodeId) -> Result<(), HostError> {
        self.remove(Parent::Container, child)
    }

    fn commit_update(
        &mut self,
        node: NodeId,
        payload: &UpdatePayload,
        new_props: Props,
    ) -> Result<(), HostError> {
        new_props.expect_kind(self.element_props(node)?.kind())?;
        if payload.is_empty() {
            return Ok(());
        }
        let native = NativeNode::from_props(&new_props);
        match new_props.handlers() {
            Some(h) => self.handlers.register(node, h),
            None => {
                self.handlers.deregister(node);
            }
        }
        self.node_mut(node)?.content = Content::Element(new_props);
        self.outbox.push(MirrorOp::Update { id: node, node: native });
        Ok(())
    }

    fn commit_text_update(
        &mut self,
        node: NodeId,
        _old_text: &str,
        new_text: &str,
    ) -> Result<(), HostError> {
        let entry = self.node_mut(node)?;
        let Content::Text(text) = &mut entry.content else {
            return Err(HostError::ContractViolation(
                "commit_text_update on an element",
            ));
        };
        text.clear();
        text.push_str(new_text);
        self.outbox.push(MirrorOp::Update {
            id: node,
            node: NativeNode::RawText(new_text.to_string()),
        });
        Ok(())
    }

    fn reset_text_content(&mut self, node: NodeId) -> Result<(), HostError> {
        self.ensure_container(node)?;
        let children = std::mem::take(&mut self.node_mut(node)?.children);
        for child in children {
            if let Some(c) = self.nodes.get_mut(child) {
                c.parent = Parent::Detached;
            }
            self.outbox.push(MirrorOp::RemoveChild {
                parent: Some(node),
                child,
            });
        }
        Ok(())
    }
}

impl Backend for MutationBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Mutation
    }

    fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    fn take_committed(&mut self) -> bool {
        std::mem::take(&mut self.commit_pending)
    }

    fn unmount(&mut self) -> Result<(), HostError> {
        self.clear_container()?;
        let ids: Vec<NodeId> = self.nodes.keys().collect();
        for id in ids {
            self.outbox.push(MirrorOp::Destroy { id });
        }
        self.nodes.clear();
        self.handlers.clear();
        self.in_commit = false;
        self.commit_pending = true;
        Ok(())
    }

    fn drain_mirror_ops(&mut self) -> Vec<MirrorOp> {
        std::mem::take(&mut self.outbox)
    }

    fn is_live(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    fn live_count(&self) -> usize {
        self.nodes
            .values()
            .filter(|n| matches!(n.content, Content::Element(_)))
            .count()
    }
}

impl SceneTree for MutationBackend {
    type Node<'a> = NodeId;

    fn roots(&self) -> impl Iterator<Item = NodeId> {
        self.roots.iter().copied()
    }

    fn view<'a>(&'a self, node: NodeId) -> Option<NodeView<'a>> {
        Some(match &self.nodes.get(node)?.content {
            Content::Element(props) => NodeView::Element { id: node, props },
            Content::Text(s) => NodeView::Text(s),
        })
    }

    fn children<'a>(&'a self, node: NodeId) -> impl Iterator<Item = NodeId> + 'a {
        self.nodes
            .get(node)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
            .iter()
            .copied()
    }
}
