//! Draw-list compilation and painting.
//!
//! [`compile`] turns any committed [`SceneTree`](vitadeck_core::SceneTree)
//! into a [`DrawList`]: paint commands in absolute canvas coordinates plus
//! the interactive regions input dispatch hit-tests against. The list is a
//! pure function of the tree, so both reconciliation backends produce the
//! same output for the same structure.
//!
//! Painting is separate. [`DrawList::paint`] replays the commands through a
//! [`Painter`](vitadeck_core::Painter), consulting an [`InteractionState`]
//! for transient hover and press colors.

pub mod command;
pub mod compile;
pub mod paint;


pub use command::{DrawCommand, DrawDefaults, DrawList, InteractiveRegion};
pub use compile::compile;
pub use paint::{InteractionState, Interactions, button_color, paint_command};
