//! # VitaDeck core
//!
//! Data types shared by every other VitaDeck crate:
//!
//! - the scene graph model (`NodeId`, `ElementType`, `Props`, `Handlers`),
//! - the read-only [`SceneTree`] traversal both reconciler backends expose,
//! - the native bridge traits (`NodeMirror`, `Painter`, `InputSource`),
//! - cross-cutting helpers: [`ReconcilerMetrics`], cooperative [`Timers`],
//!   a [`Clock`] and the [`HostError`] taxonomy.
//!
//! Everything here is single-threaded. Shared state is `Rc<RefCell<_>>`,
//! handlers are `Rc<dyn Fn()>`.
//!
//! ## Handlers
//!
//! Handlers are compared by identity, not by behaviour. Passing a new closure
//! on every render therefore counts as a change:
//!
//! ```rust
//! use vitadeck_core::*;
//!
//! let a = Handlers::new().on_click(|| {});
//! let b = a.clone();
//! assert_eq!(a, b);
//! assert_ne!(a, Handlers::new().on_click(|| {}));
//! ```

pub mod bridge;
pub mod clock;
pub mod color;
pub mod error;
pub mod geometry;
pub mod handlers;
pub mod metrics;
pub mod node;
pub mod prelude;
pub mod timer;
pub mod tree;

#[cfg(test)]
mod tests;

pub use bridge::*;
pub use clock::*;
pub use color::*;
pub use error::*;
pub use geometry::*;
pub use handlers::*;
pub use metrics::*;
pub use node::*;
pub use timer::*;
pub use tree::*;
