use serde::{Deserialize, Serialize};

/// RGBA color, 0–255 per component, as the native bridge expects it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u8, pub u8, pub u8, pub u8);

impl Color {
    pub const BLANK: Color = Color(0, 0, 0, 0);
    pub const BLACK: Color = Color(0, 0, 0, 255);
    pub const WHITE: Color = Color(255, 255, 255, 255);
    pub const RAYWHITE: Color = Color(245, 245, 245, 255);
    pub const LIGHTGRAY: Color = Color(200, 200, 200, 255);
    pub const GRAY: Color = Color(130, 130, 130, 255);
    pub const DARKGRAY: Color = Color(80, 80, 80, 255);
    pub const YELLOW: Color = Color(253, 249, 0, 255);
    pub const GOLD: Color = Color(255, 203, 0, 255);
    pub const ORANGE: Color = Color(255, 161, 0, 255);
    pub const PINK: Color = Color(255, 109, 194, 255);
    pub const RED: Color = Color(230, 41, 55, 255);
    pub const MAROON: Color = Color(190, 33, 55, 255);
    pub const GREEN: Color = Color(0, 228, 48, 255);
    pub const LIME: Color = Color(0, 158, 47, 255);
    pub const DARKGREEN: Color = Color(0, 117, 44, 255);
    pub const SKYBLUE: Color = Color(102, 191, 255, 255);
    pub const BLUE: Color = Color(0, 121, 241, 255);
    pub const DARKBLUE: Color = Color(0, 82, 172, 255);
    pub const PURPLE: Color = Color(200, 122, 255, 255);
    pub const VIOLET: Color = Color(135, 60, 190, 255);
    pub const DARKPURPLE: Color = Color(112, 31, 126, 255);
    pub const BEIGE: Color = Color(211, 176, 131, 255);
    pub const BROWN: Color = Color(127, 106, 79, 255);
    pub const DARKBROWN: Color = Color(76, 63, 47, 255);
    pub const MAGENTA: Color = Color(255, 0, 255, 255);

    /// Named palette exposed to application code.
    pub const PALETTE: [(&'static str, Color); 26] = [
        ("LIGHTGRAY", Color::LIGHTGRAY),
        ("GRAY", Color::GRAY),
        ("DARKGRAY", Color::DARKGRAY),
        ("YELLOW", Color::YELLOW),
        ("GOLD", Color::GOLD),
        ("ORANGE", Color::ORANGE),
        ("PINK", Color::PINK),
        ("RED", Color::RED),
        ("MAROON", Color::MAROON),
        ("GREEN", Color::GREEN),
        ("LIME", Color::LIME),
        ("DARKGREEN", Color::DARKGREEN),
        ("SKYBLUE", Color::SKYBLUE),
        ("BLUE", Color::BLUE),
        ("DARKBLUE", Color::DARKBLUE),
        ("PURPLE", Color::PURPLE),
        ("VIOLET", Color::VIOLET),
        ("DARKPURPLE", Color::DARKPURPLE),
        ("BEIGE", Color::BEIGE),
        ("BROWN", Color::BROWN),
        ("DARKBROWN", Color::DARKBROWN),
        ("WHITE", Color::WHITE),
        ("BLACK", Color::BLACK),
        ("BLANK", Color::BLANK),
        ("MAGENTA", Color::MAGENTA),
        ("RAYWHITE", Color::RAYWHITE),
    ];

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Color(r, g, b, 255)
    }
    pub fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color(r, g, b, a)
    }
    pub fn from_hex(hex: &str) -> Self {
        let s = hex.trim_start_matches('#');
        let channel = |i: usize, fallback: u8| {
            s.get(i..i + 2)
                .and_then(|c| u8::from_str_radix(c, 16).ok())
                .unwrap_or(fallback)
        };
        match s.len() {
            6 => Color(channel(0, 0), channel(2, 0), channel(4, 0), 255),
            8 => Color(channel(0, 0), channel(2, 0), channel(4, 0), channel(6, 255)),
            _ => Color::BLACK,
        }
    }
    pub fn named(name: &str) -> Option<Self> {
        Self::PALETTE
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, c)| *c)
    }
    pub fn with_alpha(self, a: u8) -> Self {
        Color(self.0, self.1, self.2, a)
    }

    /// Moves each RGB channel `amount` of the way toward `other`; alpha is kept.
    pub fn mix(self, other: Color, amount: f32) -> Self {
        let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * amount) as u8;
        Color(
            lerp(self.0, other.0),
            lerp(self.1, other.1),
            lerp(self.2, other.2),
            self.3,
        )
    }
}
