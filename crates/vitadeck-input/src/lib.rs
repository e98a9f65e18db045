//! Input dispatch against the interactive regions of the last draw list.
//!
//! Regions are hit-tested topmost first (the last registered box containing
//! the point). [`InputDispatcher`] turns raw device state into hover, press,
//! click and release handler calls, each isolated so a panicking handler
//! never stops the rest of the tick.

pub mod dispatch;
pub mod focus;
pub mod hit;


pub use dispatch::InputDispatcher;
pub use focus::{Direction, nearest};
pub use hit::{region_by_id, top_hit};
