use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use thiserror::Error;

use crate::node::{ElementType, NodeId};

/// Errors raised by host operations. Every variant means the diffing runtime
/// broke the host contract; callers abort the current commit.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("unsupported element type: {0}")]
    UnknownKind(String),
    #[error("props for {found:?} passed where {expected:?} was expected")]
    KindMismatch {
        expected: ElementType,
        found: ElementType,
    },
    #[error("host contract violated: {0}")]
    ContractViolation(&'static str),
    #[error("no live node with id {0:?}")]
    UnknownNode(NodeId),
}

/// A panic caught while running application code (handlers, timers).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct Fault {
    pub message: String,
}

/// Runs `f`, turning a panic into a `Fault` instead of unwinding further.
pub fn isolate<R>(f: impl FnOnce() -> R) -> Result<R, Fault> {
    catch_unwind(AssertUnwindSafe(f)).map_err(|err| Fault {
        message: panic_message(err.as_ref()),
    })
}

fn panic_message(err: &(dyn Any + Send)) -> String {
    if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    }
}
