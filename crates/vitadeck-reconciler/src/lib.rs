//! # Reconciliation backends
//!
//! The external diffing runtime materializes its virtual tree through one of
//! two strategies that honour the same host contract:
//!
//! - [`PersistentBackend`] builds new subtrees off to the side and swaps the
//!   container's child list in one step. Readers never see a half-applied
//!   commit.
//! - [`MutationBackend`] patches a live arena in place and mirrors every
//!   structural change to the native side.
//!
//! [`ReconcilerManager`] owns whichever one is active, wrapped in
//! [`Instrumented`] so every contract operation is timed.
//!
//! ```rust
//! use vitadeck_core::*;
//! use vitadeck_reconciler::*;
//!
//! let mut manager = ReconcilerManager::new(BackendKind::Persistent);
//! let mut driver = PositionalDriver::new(|| {
//!     vec![VNode::rect(RectProps::new(0, 0, 10, 10).color(Color::RED), vec![])]
//! });
//! manager.drive(&mut driver).unwrap();
//! assert_eq!(manager.backend().live_count(), 1);
//! ```

pub mod host;
pub mod instrument;
pub mod manager;
pub mod mutation;
pub mod persistent;
pub mod positional;

#[cfg(test)]
mod tests;

pub use host::{
    Backend, BackendDescriptor, BackendKind, DiffDriver, HostConfig, HostContext, MutationHost,
    PersistentHost, UnknownBackend, available,
};
pub use instrument::Instrumented;
pub use manager::{ActiveBackend, ReconcilerManager};
pub use mutation::MutationBackend;
pub use persistent::{ChildSet, Element, Node, PersistentBackend, Snapshot};
pub use positional::{PositionalDriver, VNode};
