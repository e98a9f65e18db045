use anyhow::Context;
use serde::{Deserialize, Serialize};

use vitadeck_core::{CANVAS_HEIGHT, CANVAS_WIDTH};
use vitadeck_reconciler::BackendKind;
use vitadeck_render::DrawDefaults;

/// Host-loop settings. Every field has a default, so a JSON document only
/// needs the keys it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub backend: BackendKind,
    /// Start with the metrics HUD visible.
    pub inspector: bool,
    pub draw: DrawDefaults,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            canvas_width: CANVAS_WIDTH,
            canvas_height: CANVAS_HEIGHT,
            backend: BackendKind::default(),
            inspector: false,
            draw: DrawDefaults::default(),
        }
    }
}

impl RuntimeConfig {
    pub fn from_json(s: &str) -> anyhow::Result<Self> {
        serde_json::from_str(s).context("invalid runtime config")
    }
}
