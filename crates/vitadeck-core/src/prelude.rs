pub use crate::bridge::{
    GamepadButtons, InputSource, MirrorOp, NativeBridge, NativeNode, NodeMirror, Painter, ROOT_ID,
};
pub use crate::clock::{Clock, SystemClock, TestClock};
pub use crate::color::Color;
pub use crate::error::{Fault, HostError, isolate};
pub use crate::geometry::{CANVAS_HEIGHT, CANVAS_WIDTH, Rect, Vec2};
pub use crate::handlers::{Callback, HandlerEvent, HandlerFlags, HandlerRegistry, Handlers};
pub use crate::metrics::{MetricSummary, ReconcilerMetrics};
pub use crate::node::{
    ButtonProps, ElementType, NodeId, PropKey, Props, RectProps, RectVariant, TextProps,
    UpdatePayload,
};
pub use crate::timer::{TimerHandle, Timers};
pub use crate::tree::{NodeView, SceneTree};
