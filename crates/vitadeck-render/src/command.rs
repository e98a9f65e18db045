use serde::{Deserialize, Serialize};
use vitadeck_core::{Color, Handlers, NodeId, Rect, Vec2};

/// Fallbacks and fixed metrics used when compiling and painting.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawDefaults {
    /// Inset of text from its container's origin, and of a button label.
    pub padding: f32,
    pub text_font_size: u32,
    pub text_color: Color,
    /// Gap between a bordered text run and its outline.
    pub text_border_padding: f32,
    pub text_border_thickness: f32,
    pub button_font_size: u32,
    pub button_color: Color,
    pub button_text_color: Color,
    /// How far a hovered button moves toward white.
    pub hover_mix: f32,
    /// How far a pressed button moves toward black.
    pub press_mix: f32,
    pub clear_color: Color,
}

impl Default for DrawDefaults {
    fn default() -> Self {
        Self {
            padding: 8.0,
            text_font_size: 30,
            text_color: Color::BLACK,
            text_border_padding: 4.0,
            text_border_thickness: 2.0,
            button_font_size: 20,
            button_color: Color::DARKBLUE,
            button_text_color: Color::WHITE,
            hover_mix: 0.4,
            press_mix: 0.5,
            clear_color: Color::RAYWHITE,
        }
    }
}

/// One paint instruction in absolute canvas coordinates.
///
/// Serializes without node identities, so two compilations of structurally
/// identical trees compare equal byte for byte.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DrawCommand {
    Rect {
        rect: Rect,
        #[serde(skip_serializing_if = "Option::is_none")]
        fill: Option<Color>,
        #[serde(skip_serializing_if = "Option::is_none")]
        outline: Option<Color>,
        radius: f32,
    },
    Text {
        pos: Vec2,
        font_size: u32,
        text: String,
        /// Painted with the default text color when unset.
        #[serde(skip_serializing_if = "Option::is_none")]
        color: Option<Color>,
        border: bool,
    },
    Button {
        #[serde(skip)]
        id: NodeId,
        rect: Rect,
        base_color: Color,
        text_color: Color,
        label: String,
        font_size: u32,
        radius: f32,
    },
}

/// Absolute hit box of a node that carries handlers, with the handlers it had
/// when the list was compiled.
#[derive(Clone, Debug)]
pub struct InteractiveRegion {
    pub id: NodeId,
    pub rect: Rect,
    pub handlers: Handlers,
}

/// Paint commands and interactive regions for exactly one committed tree.
#[derive(Clone, Debug, Default)]
pub struct DrawList {
    pub commands: Vec<DrawCommand>,
    /// In traversal order: later regions are on top.
    pub regions: Vec<InteractiveRegion>,
}

impl DrawList {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn region(&self, id: NodeId) -> Option<&InteractiveRegion> {
        self.regions.iter().find(|r| r.id == id)
    }
}
