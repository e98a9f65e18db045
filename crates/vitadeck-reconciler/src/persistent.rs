//! Copy-on-write backend.
//!
//! Committed nodes are shared `Rc`s and are never written to again. Updates
//! clone the node under the same identity; the container's child list is
//! replaced with one reference swap, so a reader holding a [`Snapshot`] sees
//! either the old tree or the new one and nothing in between.

use std::ops::Deref;
use std::rc::Rc;

use vitadeck_core::{
    ElementType, HandlerRegistry, HostError, IdAllocator, NodeId, NodeView, Props, SceneTree,
    UpdatePayload,
};

use crate::host::{Backend, BackendKind, HostConfig, PersistentHost};

#[derive(Debug)]
pub struct Element {
    pub id: NodeId,
    pub props: Props,
    pub children: Vec<Node>,
}

#[derive(Clone, Debug)]
pub enum Node {
    Element(Rc<Element>),
    Text(Rc<str>),
}

impl Node {
    pub fn id(&self) -> Option<NodeId> {
        match self {
            Node::Element(e) => Some(e.id),
            Node::Text(_) => None,
        }
    }

    pub fn kind(&self) -> Option<ElementType> {
        match self {
            Node::Element(e) => Some(e.props.kind()),
            Node::Text(_) => None,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(&**e),
            Node::Text(_) => None,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element(e) => &e.children,
            Node::Text(_) => &[],
        }
    }

    /// Same object, not merely equal contents.
    pub fn ptr_eq(a: &Node, b: &Node) -> bool {
        match (a, b) {
            (Node::Element(a), Node::Element(b)) => Rc::ptr_eq(a, b),
            (Node::Text(a), Node::Text(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Accumulator for the next container child list.
#[derive(Debug, Default)]
pub struct ChildSet {
    children: Vec<Node>,
}

impl ChildSet {
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// An immutable, finalized container child list.
#[derive(Clone, Debug, Default)]
pub struct Snapshot(Rc<[Node]>);

impl Snapshot {
    pub fn ptr_eq(a: &Snapshot, b: &Snapshot) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }
}

impl Deref for Snapshot {
    type Target = [Node];

    fn deref(&self) -> &[Node] {
        &self.0
    }
}

fn collect_ids(nodes: &[Node], out: &mut Vec<NodeId>) {
    for node in nodes {
        if let Node::Element(e) = node {
            out.push(e.id);
            collect_ids(&e.children, out);
        }
    }
}

impl Snapshot {
    /// Every element id reachable from this snapshot, in paint order.
    pub fn element_ids(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        collect_ids(&self.0, &mut out);
        out
    }
}

#[derive(Debug, Default)]
pub struct PersistentBackend {
    ids: IdAllocator,
    handlers: HandlerRegistry,
    committed: Snapshot,
    in_commit: bool,
    commit_pending: bool,
    commits: u64,
}

impl PersistentBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently committed container children.
    pub fn snapshot(&self) -> Snapshot {
        self.committed.clone()
    }

    /// Number of container swaps so far.
    pub fn commits(&self) -> u64 {
        self.commits
    }

    fn element<'a>(node: &'a Node, op: &'static str) -> Result<&'a Element, HostError> {
        node.as_element().ok_or(HostError::ContractViolation(op))
    }

    fn swap(&mut self, next: Snapshot) {
        self.committed = next;
        self.commit_pending = true;
        self.commits += 1;
    }
}

impl HostConfig for PersistentBackend {
    type Instance = Node;

    fn create_instance(&mut self, kind: ElementType, props: Props) -> Result<Node, HostError> {
        props.expect_kind(kind)?;
        let id = self.ids.allocate(kind);
        if let Some(h) = props.handlers() {
            self.handlers.register(id, h);
        }
        log::trace!("persistent: create {} {}", kind, id);
        Ok(Node::Element(Rc::new(Element {
            id,
            props,
            children: Vec::new(),
        })))
    }

    fn create_text_instance(&mut self, text: &str) -> Result<Node, HostError> {
        Ok(Node::Text(Rc::from(text)))
    }

    fn append_initial_child(&mut self, parent: &mut Node, child: Node) -> Result<(), HostError> {
        let Node::Element(rc) = parent else {
            return Err(HostError::ContractViolation(
                "append_initial_child on a text node",
            ));
        };
        let element = Rc::get_mut(rc).ok_or(HostError::ContractViolation(
            "append_initial_child on a node that is already shared",
        ))?;
        element.children.push(child);
        Ok(())
    }

    fn finalize_initial_children(&mut self, node: &Node) -> Result<bool, HostError> {
        Self::element(node, "finalize_initial_children on a text node")?;
        Ok(false)
    }

    fn prepare_update(
        &self,
        node: &Node,
        old: &Props,
        new: &Props,
    ) -> Result<Option<UpdatePayload>, HostError> {
        let element = Self::element(node, "prepare_update on a text node")?;
        new.expect_kind(element.props.kind())?;
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
        Ok(())
    }

    fn clear_container(&mut self) -> Result<(), HostError> {
        self.swap(Snapshot::default());
        Ok(())
    }

    fn detach_deleted_instance(&mut self, node: &Node) -> Result<(), HostError> {
        let Node::Element(e) = node else {
            return Ok(());
        };
        self.handlers.deregister(e.id);
        if !self.ids.release(e.id) {
            return Err(HostError::UnknownNode(e.id));
        }
        log::trace!("persistent: detach {}", e.id);
        Ok(())
    }
}

impl PersistentHost for PersistentBackend {
    fn create_container_child_set(&mut self) -> ChildSet {
        ChildSet::default()
    }

    fn append_child_to_container_child_set(
        &mut self,
        set: &mut ChildSet,
        child: Node,
    ) -> Result<(), HostError> {
        set.children.push(child);
        Ok(())
    }

    fn finalize_container_children(&mut self, set: ChildSet) -> Result<Snapshot, HostError> {
        Ok(Snapshot(Rc::from(set.children)))
    }

    fn replace_container_children(&mut self, children: Snapshot) -> Result<(), HostError> {
        log::trace!("persistent: commit {} root children", children.len());
        self.swap(children);
        Ok(())
    }

    fn clone_instance(
        &mut self,
        node: &Node,
        payload: Option<&UpdatePayload>,
        new_props: Props,
        keep_children: bool,
    ) -> Result<Node, HostError> {
        let element = Self::element(node, "clone_instance on a text node")?;
        let kind = element.props.kind();
        new_props.expect_kind(kind)?;
        if !self.ids.is_live(element.id) {
            return Err(HostError::UnknownNode(element.id));
        }

        let handlers_changed = payload.is_none_or(|p| p.props.iter().any(|k| k.is_handler()));
        if handlers_changed && let Some(h) = new_props.handlers() {
            self.handlers.register(element.id, h);
        }

        let children = if keep_children && kind != ElementType::Button {
            element.children.clone()
        } else {
            Vec::new()
        };
        Ok(Node::Element(Rc::new(Element {
            id: element.id,
            props: new_props,
            children,
        })))
    }

    fn clone_hidden_instance(&mut self, node: &Node, props: Props) -> Result<Node, HostError> {
        let element = Self::element(node, "clone_hidden_instance on a text node")?;
        props.expect_kind(element.props.kind())?;
        Ok(Node::Element(Rc::new(Element {
            id: element.id,
            props,
            children: Vec::new(),
        })))
    }

    fn clone_hidden_text_instance(&mut self, _node: &Node, text: &str) -> Result<Node, HostError> {
        Ok(Node::Text(Rc::from(text)))
    }
}

impl Backend for PersistentBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Persistent
    }

    fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    fn take_committed(&mut self) -> bool {
        std::mem::take(&mut self.commit_pending)
    }

    fn unmount(&mut self) -> Result<(), HostError> {
        self.swap(Snapshot::default());
        self.handlers.clear();
        self.ids.clear();
        self.in_commit = false;
        Ok(())
    }

    fn is_live(&self, id: NodeId) -> bool {
        self.ids.is_live(id)
    }

    fn live_count(&self) -> usize {
        self.ids.len()
    }
}

impl SceneTree for PersistentBackend {
    type Node<'a> = &'a Node;

    fn roots(&self) -> impl Iterator<Item = &Node> {
        self.committed.iter()
    }

    fn view<'a>(&'a self, node: &'a Node) -> Option<NodeView<'a>> {
        Some(match node {
            Node::Element(e) => NodeView::Element {
                id: e.id,
                props: &e.props,
            },
            Node::Text(s) => NodeView::Text(s),
        })
    }

    fn children<'a>(&'a self, node: &'a Node) -> impl Iterator<Item = &'a Node> + 'a {
        node.children().iter()
    }
}

impl SceneTree for Snapshot {
    type Node<'a> = &'a Node;

    fn roots(&self) -> impl Iterator<Item = &Node> {
        self.0.iter()
    }

    fn view<'a>(&'a self, node: &'a Node) -> Option<NodeView<'a>> {
        Some(match node {
            Node::Element(e) => NodeView::Element {
                id: e.id,
                props: &e.props,
            },
            Node::Text(s) => NodeView::Text(s),
        })
    }

    fn children<'a>(&'a self, node: &'a Node) -> impl Iterator<Item = &'a Node> + 'a {
        node.children().iter()
    }
}
