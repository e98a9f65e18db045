use std::rc::Rc;

use vitadeck_core::{
    ElementType, HandlerRegistry, HostError, MirrorOp, NodeId, NodeView, Props,
    ReconcilerMetrics, SceneTree, UpdatePayload,
};

use crate::host::{Backend, BackendKind, HostConfig, MutationHost, PersistentHost};
use crate::persistent::{ChildSet, Node, Snapshot};

/// Times every contract operation of the wrapped backend under
/// `"<label>.<operation>"`. Results, errors and call order pass through
/// untouched.
pub struct Instrumented<H> {
    inner: H,
    metrics: Rc<ReconcilerMetrics>,
}

impl<H> Instrumented<H> {
    pub fn new(inner: H, metrics: Rc<ReconcilerMetrics>) -> Self {
        Self { inner, metrics }
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut H {
        &mut self.inner
    }

    pub fn into_inner(self) -> H {
        self.inner
    }

    pub fn metrics(&self) -> &Rc<ReconcilerMetrics> {
        &self.metrics
    }
}

fn timed<R>(metrics: &ReconcilerMetrics, op: &str, f: impl FnOnce() -> R) -> R {
    let name = format!("{}.{}", metrics.label(), op);
    metrics.time(&name, f)
}

impl<H: HostConfig> HostConfig for Instrumented<H> {
    type Instance = H::Instance;

    fn root_host_context(&self) -> crate::HostContext {
        timed(&self.metrics, "getRootHostContext", || {
            self.inner.root_host_context()
        })
    }

    fn child_host_context(
        &self,
        parent: crate::HostContext,
        kind: ElementType,
    ) -> crate::HostContext {
        timed(&self.metrics, "getChildHostContext", || {
            self.inner.child_host_context(parent, kind)
        })
    }

    fn should_set_text_content(&self, kind: ElementType) -> bool {
        timed(&self.metrics, "shouldSetTextContent", || {
            self.inner.should_set_text_content(kind)
        })
    }

    fn create_instance(
        &mut self,
        kind: ElementType,
        props: Props,
    ) -> Result<Self::Instance, HostError> {
        timed(&self.metrics, "createInstance", || {
            self.inner.create_instance(kind, props)
        })
    }

    fn create_text_instance(&mut self, text: &str) -> Result<Self::Instance, HostError> {
        timed(&self.metrics, "createTextInstance", || {
            self.inner.create_text_instance(text)
        })
    }

    fn append_initial_child(
        &mut self,
        parent: &mut Self::Instance,
        child: Self::Instance,
    ) -> Result<(), HostError> {
        timed(&self.metrics, "appendInitialChild", || {
            self.inner.append_initial_child(parent, child)
        })
    }

    fn finalize_initial_children(&mut self, node: &Self::Instance) -> Result<bool, HostError> {
        timed(&self.metrics, "finalizeInitialChildren", || {
            self.inner.finalize_initial_children(node)
        })
    }

    fn prepare_update(
        &self,
        node: &Self::Instance,
        old: &Props,
        new: &Props,
    ) -> Result<Option<UpdatePayload>, HostError> {
        timed(&self.metrics, "prepareUpdate", || {
            self.inner.prepare_update(node, old, new)
        })
    }

    fn prepare_for_commit(&mut self) -> Result<(), HostError> {
        timed(&self.metrics, "prepareForCommit", || {
            self.inner.prepare_for_commit()
        })
    }

    fn reset_after_commit(&mut self) -> Result<(), HostError> {
        timed(&self.metrics, "resetAfterCommit", || {
            self.inner.reset_after_commit()
        })
    }

    fn clear_container(&mut self) -> Result<(), HostError> {
        timed(&self.metrics, "clearContainer", || self.inner.clear_container())
    }

    fn detach_deleted_instance(&mut self, node: &Self::Instance) -> Result<(), HostError> {
        timed(&self.metrics, "detachDeletedInstance", || {
            self.inner.detach_deleted_instance(node)
        })
    }
}

impl<H: MutationHost> MutationHost for Instrumented<H> {
    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HostError> {
        timed(&self.metrics, "appendChild", || {
            self.inner.append_child(parent, child)
        })
    }

    fn append_child_to_container(&mut self, child: NodeId) -> Result<(), HostError> {
        timed(&self.metrics, "appendChildToContainer", || {
            self.inner.append_child_to_container(child)
        })
    }

    fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        before: NodeId,
    ) -> Result<(), HostError> {
        timed(&self.metrics, "insertBefore", || {
            self.inner.insert_before(parent, child, before)
        })
    }

    fn insert_in_container_before(
        &mut self,
        child: NodeId,
        before: NodeId,
    ) -> Result<(), HostError> {
        timed(&self.metrics, "insertInContainerBefore", || {
            self.inner.insert_in_container_before(child, before)
        })
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HostError> {
        timed(&self.metrics, "removeChild", || {
            self.inner.remove_child(parent, child)
        })
    }

    fn remove_child_from_container(&mut self, child: NodeId) -> Result<(), HostError> {
        timed(&self.metrics, "removeChildFromContainer", || {
            self.inner.remove_child_from_container(child)
        })
    }

    fn commit_update(
        &mut self,
        node: NodeId,
        payload: &UpdatePayload,
        new_props: Props,
    ) -> Result<(), HostError> {
        timed(&self.metrics, "commitUpdate", || {
            self.inner.commit_update(node, payload, new_props)
        })
    }

    fn commit_text_update(
        &mut self,
        node: NodeId,
        old_text: &str,
        new_text: &str,
    ) -> Result<(), HostError> {
        timed(&self.metrics, "commitTextUpdate", || {
            self.inner.commit_text_update(node, old_text, new_text)
        })
    }

    fn reset_text_content(&mut self, node: NodeId) -> Result<(), HostError> {
        timed(&self.metrics, "resetTextContent", || {
            self.inner.reset_text_content(node)
        })
    }
}

impl<H: PersistentHost> PersistentHost for Instrumented<H> {
    fn create_container_child_set(&mut self) -> ChildSet {
        timed(&self.metrics, "createContainerChildSet", || {
            self.inner.create_container_child_set()
        })
    }

    fn append_child_to_container_child_set(
        &mut self,
        set: &mut ChildSet,
        child: Node,
    ) -> Result<(), HostError> {
        timed(&self.metrics, "appendChildToContainerChildSet", || {
            self.inner.append_child_to_container_child_set(set, child)
        })
    }

    fn finalize_container_children(&mut self, set: ChildSet) -> Result<Snapshot, HostError> {
        timed(&self.metrics, "finalizeContainerChildren", || {
            self.inner.finalize_container_children(set)
        })
    }

    fn replace_container_children(&mut self, children: Snapshot) -> Result<(), HostError> {
        timed(&self.metrics, "replaceContainerChildren", || {
            self.inner.replace_container_children(children)
        })
    }

    fn clone_instance(
        &mut self,
        node: &Node,
        payload: Option<&UpdatePayload>,
        new_props: Props,
        keep_children: bool,
    ) -> Result<Node, HostError> {
        timed(&self.metrics, "cloneInstance", || {
            self.inner
                .clone_instance(node, payload, new_props, keep_children)
        })
    }

    fn clone_hidden_instance(&mut self, node: &Node, props: Props) -> Result<Node, HostError> {
        timed(&self.metrics, "cloneHiddenInstance", || {
            self.inner.clone_hidden_instance(node, props)
        })
    }

    fn clone_hidden_text_instance(&mut self, node: &Node, text: &str) -> Result<Node, HostError> {
        timed(&self.metrics, "cloneHiddenTextInstance", || {
            self.inner.clone_hidden_text_instance(node, text)
        })
    }
}

impl<H: Backend> Backend for Instrumented<H> {
    fn kind(&self) -> BackendKind {
        self.inner.kind()
    }

    fn handlers(&self) -> &HandlerRegistry {
        self.inner.handlers()
    }

    fn take_committed(&mut self) -> bool {
        self.inner.take_committed()
    }

    fn unmount(&mut self) -> Result<(), HostError> {
        timed(&self.metrics, "unmount", || self.inner.unmount())
    }

    fn drain_mirror_ops(&mut self) -> Vec<MirrorOp> {
        self.inner.drain_mirror_ops()
    }

    fn is_live(&self, id: NodeId) -> bool {
        self.inner.is_live(id)
    }

    fn live_count(&self) -> usize {
        self.inner.live_count()
    }
}

impl<H: SceneTree> SceneTree for Instrumented<H> {
    type Node<'a>
        = H::Node<'a>
    where
        Self: 'a;

    fn roots(&self) -> impl Iterator<Item = Self::Node<'_>> {
        self.inner.roots()
    }

    fn view<'a>(&'a self, node: Self::Node<'a>) -> Option<NodeView<'a>> {
        self.inner.view(node)
    }

    fn children<'a>(&'a self, node: Self::Node<'a>) -> impl Iterator<Item = Self::Node<'a>> + 'a {
        self.inner.children(node)
    }
}
