//! Host loop for VitaDeck.
//!
//! [`Runtime`] ties the pieces together against any
//! [`NativeBridge`](vitadeck_core::NativeBridge): the diffing runtime commits
//! into the active reconciler backend, the committed tree is compiled into a
//! draw list, the list is painted, and input is dispatched against its
//! interactive regions. [`RecordingBridge`] stands in for the native side in
//! tests and headless runs.

pub mod config;
pub mod headless;
pub mod logging;
pub mod runtime;


pub use config::RuntimeConfig;
pub use headless::{MirroredNode, PaintCall, RecordingBridge};
pub use logging::init_logging;
pub use runtime::Runtime;
