use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use vitadeck_core::{
    ElementType, HandlerRegistry, HostError, MirrorOp, NodeId, Props, UpdatePayload,
};

use crate::persistent::{ChildSet, Node, Snapshot};

/// Context the diffing runtime threads through element creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HostContext {
    pub root: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Persistent,
    #[default]
    Mutation,
}

impl BackendKind {
    pub const ALL: [BackendKind; 2] = [BackendKind::Persistent, BackendKind::Mutation];

    pub fn id(self) -> &'static str {
        match self {
            BackendKind::Persistent => "persistent",
            BackendKind::Mutation => "mutation",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BackendKind::Persistent => "Persistent",
            BackendKind::Mutation => "Mutation",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown backend: {0}")]
pub struct UnknownBackend(pub String);

impl FromStr for BackendKind {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BackendKind::ALL
            .into_iter()
            .find(|k| k.id() == s)
            .ok_or_else(|| UnknownBackend(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackendDescriptor {
    pub kind: BackendKind,
    pub id: &'static str,
    pub label: &'static str,
}

/// Backends a host can switch between.
pub fn available() -> Vec<BackendDescriptor> {
    BackendKind::ALL
        .into_iter()
        .map(|kind| BackendDescriptor {
            kind,
            id: kind.id(),
            label: kind.label(),
        })
        .collect()
}

/// Operations shared by both reconciliation strategies.
///
/// The diffing runtime calls these in its own order. Any `Err` means it broke
/// the contract and the commit in progress must be abandoned.
pub trait HostConfig {
    /// Handle the runtime holds for each node it created.
    type Instance;

    fn root_host_context(&self) -> HostContext {
        HostContext { root: true }
    }

    fn child_host_context(&self, _parent: HostContext, _kind: ElementType) -> HostContext {
        HostContext { root: false }
    }

    /// Text always arrives as separate raw text children.
    fn should_set_text_content(&self, _kind: ElementType) -> bool {
        false
    }

    fn create_instance(
        &mut self,
        kind: ElementType,
        props: Props,
    ) -> Result<Self::Instance, HostError>;

    fn create_text_instance(&mut self, text: &str) -> Result<Self::Instance, HostError>;

    fn append_initial_child(
        &mut self,
        parent: &mut Self::Instance,
        child: Self::Instance,
    ) -> Result<(), HostError>;

    /// Returns whether the node wants a commit-mount callback.
    fn finalize_initial_children(&mut self, node: &Self::Instance) -> Result<bool, HostError>;

    /// `None` when nothing changed.
    fn prepare_update(
        &self,
        node: &Self::Instance,
        old: &Props,
        new: &Props,
    ) -> Result<Option<UpdatePayload>, HostError>;

    fn prepare_for_commit(&mut self) -> Result<(), HostError>;

    fn reset_after_commit(&mut self) -> Result<(), HostError>;

    fn clear_container(&mut self) -> Result<(), HostError>;

    /// Releases everything registered for `node`. Called once per deleted node.
    fn detach_deleted_instance(&mut self, node: &Self::Instance) -> Result<(), HostError>;
}

/// In-place reconciliation against a live tree.
pub trait MutationHost: HostConfig<Instance = NodeId> {
    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HostError>;
    fn append_child_to_container(&mut self, child: NodeId) -> Result<(), HostError>;
    fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        before: NodeId,
    ) -> Result<(), HostError>;
    fn insert_in_container_before(&mut self, child: NodeId, before: NodeId)
    -> Result<(), HostError>;
    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HostError>;
    fn remove_child_from_container(&mut self, child: NodeId) -> Result<(), HostError>;
    fn commit_update(
        &mut self,
        node: NodeId,
        payload: &UpdatePayload,
        new_props: Props,
    ) -> Result<(), HostError>;
    fn commit_text_update(
        &mut self,
        node: NodeId,
        old_text: &str,
        new_text: &str,
    ) -> Result<(), HostError>;
    fn reset_text_content(&mut self, node: NodeId) -> Result<(), HostError>;
}

/// Copy-on-write reconciliation: new subtrees are built off to the side and
/// swapped in whole.
pub trait PersistentHost: HostConfig<Instance = Node> {
    fn create_container_child_set(&mut self) -> ChildSet;
    fn append_child_to_container_child_set(
        &mut self,
        set: &mut ChildSet,
        child: Node,
    ) -> Result<(), HostError>;
    fn finalize_container_children(&mut self, set: ChildSet) -> Result<Snapshot, HostError>;
    fn replace_container_children(&mut self, children: Snapshot) -> Result<(), HostError>;
    fn clone_instance(
        &mut self,
        node: &Node,
        payload: Option<&UpdatePayload>,
        new_props: Props,
        keep_children: bool,
    ) -> Result<Node, HostError>;
    fn clone_hidden_instance(&mut self, node: &Node, props: Props) -> Result<Node, HostError>;
    fn clone_hidden_text_instance(&mut self, node: &Node, text: &str) -> Result<Node, HostError>;
}

/// Lifecycle the host loop needs from whichever backend is active.
pub trait Backend {
    fn kind(&self) -> BackendKind;

    fn handlers(&self) -> &HandlerRegistry;

    /// Returns `true` once per finished commit.
    fn take_committed(&mut self) -> bool;

    /// Commits an empty tree and releases every node and registration.
    fn unmount(&mut self) -> Result<(), HostError>;

    /// Native node operations queued since the last drain.
    fn drain_mirror_ops(&mut self) -> Vec<MirrorOp> {
        Vec::new()
    }

    fn is_live(&self, id: NodeId) -> bool;

    fn live_count(&self) -> usize;
}

/// The external diffing runtime as the host loop sees it: one entry point per
/// backend mode.
pub trait DiffDriver {
    fn drive_mutation(&mut self, host: &mut dyn MutationHost) -> Result<(), HostError>;

    fn drive_persistent(&mut self, host: &mut dyn PersistentHost) -> Result<(), HostError>;

    /// The backend of `kind` was unmounted; drop anything held for it.
    fn forget(&mut self, _kind: BackendKind) {}
}
