use vitadeck_core::{NodeId, Vec2};
use vitadeck_render::InteractiveRegion;

/// Topmost region under `pos`: the last registered box that contains it.
pub fn top_hit(regions: &[InteractiveRegion], pos: Vec2) -> Option<&InteractiveRegion> {
    regions.iter().rev().find(|r| r.rect.contains(pos))
}

pub fn region_by_id(regions: &[InteractiveRegion], id: NodeId) -> Option<&InteractiveRegion> {
    regions.iter().find(|r| r.id == id)
}
