use vitadeck_core::{GamepadButtons, NodeId};
use vitadeck_render::InteractiveRegion;

use crate::hit::region_by_id;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// First direction among newly pressed buttons, in up/down/left/right order.
    pub fn from_buttons(pressed: GamepadButtons) -> Option<Direction> {
        [
            (GamepadButtons::UP, Direction::Up),
            (GamepadButtons::DOWN, Direction::Down),
            (GamepadButtons::LEFT, Direction::Left),
            (GamepadButtons::RIGHT, Direction::Right),
        ]
        .into_iter()
        .find(|(b, _)| pressed.contains(*b))
        .map(|(_, d)| d)
    }
}

/// Region focus should move to from `current` in `dir`.
///
/// Without a current focus the first region wins. Otherwise candidates must
/// lie strictly in `dir` (by center) and are scored as the distance along the
/// direction plus twice the cross-axis distance.
pub fn nearest(
    regions: &[InteractiveRegion],
    current: Option<NodeId>,
    dir: Direction,
) -> Option<NodeId> {
    let Some(from) = current.and_then(|id| region_by_id(regions, id)) else {
        return regions.first().map(|r| r.id);
    };
    let origin = from.rect.center();

    let mut best: Option<(f32, NodeId)> = None;
    for r in regions.iter().filter(|r| r.id != from.id) {
        let c = r.rect.center();
        let (dx, dy) = (c.x - origin.x, c.y - origin.y);
        let (ahead, primary, secondary) = match dir {
            Direction::Up => (dy < 0.0, dy.abs(), dx.abs()),
            Direction::Down => (dy > 0.0, dy.abs(), dx.abs()),
            Direction::Left => (dx < 0.0, dx.abs(), dy.abs()),
            Direction::Right => (dx > 0.0, dx.abs(), dy.abs()),
        };
        if !ahead {
            continue;
        }
        let score = primary + secondary * 2.0;
        if best.is_none_or(|(s, _)| score < s) {
            best = Some((score, r.id));
        }
    }
    best.map(|(_, id)| id)
}
