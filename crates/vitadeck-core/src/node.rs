//! # Scene graph model
//!
//! Node kinds, property records and identities shared by both reconciliation
//! backends.
//!
//! - [`NodeId`]: arena handle (slot index + generation). It is turned into
//!   a string only when crossing into the native bridge, see
//!   [`NodeId::encode`].
//! - [`ElementType`]: the closed set of element kinds. The wire names used by
//!   the diffing runtime (`vita-rect`, `vita-text`, `vita-button`) parse into
//!   it; anything else is [`HostError::UnknownKind`].
//! - [`Props`]: one property record per kind. Positions are parent-relative.
//!
//! ```rust
//! use vitadeck_core::*;
//!
//! let old = Props::Rect(RectProps::new(0, 0, 100, 40).color(Color::RED));
//! let new = Props::Rect(RectProps::new(0, 0, 100, 40).color(Color::BLUE));
//!
//! let changed = Props::changed_keys(&old, &new).unwrap();
//! assert_eq!(changed.as_slice(), &[PropKey::Color]);
//! ```

use std::fmt;
use std::str::FromStr;

use slotmap::{Key, KeyData, SlotMap, new_key_type};
use smallvec::SmallVec;

use crate::color::Color;
use crate::error::HostError;
use crate::geometry::Rect;
use crate::handlers::Handlers;

new_key_type! {
    /// Identity of one scene node.
    pub struct NodeId;
}

impl NodeId {
    /// String form handed to the native bridge: the FFI value of the key as
    /// 16 lowercase hex digits.
    pub fn encode(self) -> String {
        format!("{:016x}", self.data().as_ffi())
    }

    pub fn decode(s: &str) -> Option<NodeId> {
        if s.len() != 16 {
            return None;
        }
        let raw = u64::from_str_radix(s, 16).ok()?;
        Some(NodeId::from(KeyData::from_ffi(raw)))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

/// Hands out node identities for one backend instance.
///
/// A released slot may be reused, but always with a new generation, so an id
/// (and its encoded string) is never handed out twice in a session.
#[derive(Debug, Default)]
pub struct IdAllocator {
    live: SlotMap<NodeId, ElementType>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self, kind: ElementType) -> NodeId {
        self.live.insert(kind)
    }

    /// Returns `false` if `id` was not live.
    pub fn release(&mut self, id: NodeId) -> bool {
        self.live.remove(id).is_some()
    }

    pub fn is_live(&self, id: NodeId) -> bool {
        self.live.contains_key(id)
    }

    pub fn kind_of(&self, id: NodeId) -> Option<ElementType> {
        self.live.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    pub fn clear(&mut self) {
        self.live.clear();
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementType {
    Rect,
    Text,
    Button,
}

impl ElementType {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementType::Rect => "vita-rect",
            ElementType::Text => "vita-text",
            ElementType::Button => "vita-button",
        }
    }
}

impl FromStr for ElementType {
    type Err = HostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vita-rect" => Ok(ElementType::Rect),
            "vita-text" => Ok(ElementType::Text),
            "vita-button" => Ok(ElementType::Button),
            other => Err(HostError::UnknownKind(other.to_string())),
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RectVariant {
    #[default]
    Fill,
    Outline,
}

/// Names of individual properties, as reported in an update payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropKey {
    X,
    Y,
    Width,
    Height,
    Variant,
    Color,
    BorderColor,
    BorderRadius,
    Border,
    FontSize,
    TextColor,
    Label,
    OnClick,
    OnPress,
    OnRelease,
    OnHoverEnter,
    OnHoverLeave,
}

impl PropKey {
    pub fn as_str(self) -> &'static str {
        match self {
            PropKey::X => "x",
            PropKey::Y => "y",
            PropKey::Width => "width",
            PropKey::Height => "height",
            PropKey::Variant => "variant",
            PropKey::Color => "color",
            PropKey::BorderColor => "borderColor",
            PropKey::BorderRadius => "borderRadius",
            PropKey::Border => "border",
            PropKey::FontSize => "fontSize",
            PropKey::TextColor => "textColor",
            PropKey::Label => "label",
            PropKey::OnClick => "onClick",
            PropKey::OnPress => "onMouseDown",
            PropKey::OnRelease => "onMouseUp",
            PropKey::OnHoverEnter => "onMouseEnter",
            PropKey::OnHoverLeave => "onMouseLeave",
        }
    }

    pub fn is_handler(self) -> bool {
        matches!(
            self,
            PropKey::OnClick
                | PropKey::OnPress
                | PropKey::OnRelease
                | PropKey::OnHoverEnter
                | PropKey::OnHoverLeave
        )
    }
}

pub type ChangedKeys = SmallVec<[PropKey; 8]>;

/// Result of `prepare_update` when at least one property changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdatePayload {
    pub props: ChangedKeys,
}

impl UpdatePayload {
    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    pub fn contains(&self, key: PropKey) -> bool {
        self.props.contains(&key)
    }
}

macro_rules! diff_fields {
    ($old:expr, $new:expr, $out:expr; $($field:ident => $key:expr),* $(,)?) => {
        $(
            if $old.$field != $new.$field {
                $out.push($key);
            }
        )*
    };
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RectProps {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub variant: RectVariant,
    pub color: Option<Color>,
    pub border_color: Option<Color>,
    /// Corner roundness; `0.0` draws square corners.
    pub border_radius: f32,
    pub handlers: Handlers,
}

impl RectProps {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            ..Self::default()
        }
    }
    pub fn color(mut self, c: Color) -> Self {
        self.color = Some(c);
        self
    }
    pub fn border_color(mut self, c: Color) -> Self {
        self.border_color = Some(c);
        self
    }
    pub fn outline(mut self) -> Self {
        self.variant = RectVariant::Outline;
        self
    }
    pub fn radius(mut self, r: f32) -> Self {
        self.border_radius = r;
        self
    }
    pub fn handlers(mut self, h: Handlers) -> Self {
        self.handlers = h;
        self
    }

    /// Parent-relative bounds.
    pub fn frame(&self) -> Rect {
        Rect::new(
            self.x as f32,
            self.y as f32,
            self.width as f32,
            self.height as f32,
        )
    }

    /// Outline-variant rects are never filled.
    pub fn fill(&self) -> Option<Color> {
        match self.variant {
            RectVariant::Fill => self.color,
            RectVariant::Outline => None,
        }
    }

    /// Explicit border color wins, then the color implied by the outline variant.
    pub fn outline_color(&self) -> Option<Color> {
        self.border_color.or(match self.variant {
            RectVariant::Outline => self.color,
            RectVariant::Fill => None,
        })
    }

    fn diff(&self, new: &Self, out: &mut ChangedKeys) {
        diff_fields!(self, new, out;
            x => PropKey::X,
            y => PropKey::Y,
            width => PropKey::Width,
            height => PropKey::Height,
            variant => PropKey::Variant,
            color => PropKey::Color,
            border_color => PropKey::BorderColor,
            border_radius => PropKey::BorderRadius,
        );
        self.handlers.diff(&new.handlers, out);
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextProps {
    pub color: Option<Color>,
    pub border: bool,
    pub font_size: Option<u32>,
}

impl TextProps {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn color(mut self, c: Color) -> Self {
        self.color = Some(c);
        self
    }
    pub fn border(mut self, on: bool) -> Self {
        self.border = on;
        self
    }
    pub fn font_size(mut self, px: u32) -> Self {
        self.font_size = Some(px);
        self
    }

    fn diff(&self, new: &Self, out: &mut ChangedKeys) {
        diff_fields!(self, new, out;
            color => PropKey::Color,
            border => PropKey::Border,
            font_size => PropKey::FontSize,
        );
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ButtonProps {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub color: Option<Color>,
    pub text_color: Option<Color>,
    pub label: String,
    pub font_size: Option<u32>,
    pub border_radius: f32,
    pub handlers: Handlers,
}

impl ButtonProps {
    pub fn new(x: i32, y: i32, width: i32, height: i32, label: impl Into<String>) -> Self {
        Self {
            x,
            y,
            width,
            height,
            label: label.into(),
            ..Self::default()
        }
    }
    pub fn color(mut self, c: Color) -> Self {
        self.color = Some(c);
        self
    }
    pub fn text_color(mut self, c: Color) -> Self {
        self.text_color = Some(c);
        self
    }
    pub fn font_size(mut self, px: u32) -> Self {
        self.font_size = Some(px);
        self
    }
    pub fn radius(mut self, r: f32) -> Self {
        self.border_radius = r;
        self
    }
    pub fn handlers(mut self, h: Handlers) -> Self {
        self.handlers = h;
        self
    }

    pub fn frame(&self) -> Rect {
        Rect::new(
            self.x as f32,
            self.y as f32,
            self.width as f32,
            self.height as f32,
        )
    }

    fn diff(&self, new: &Self, out: &mut ChangedKeys) {
        diff_fields!(self, new, out;
            x => PropKey::X,
            y => PropKey::Y,
            width => PropKey::Width,
            height => PropKey::Height,
            color => PropKey::Color,
            text_color => PropKey::TextColor,
            label => PropKey::Label,
            font_size => PropKey::FontSize,
            border_radius => PropKey::BorderRadius,
        );
        self.handlers.diff(&new.handlers, out);
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Props {
    Rect(RectProps),
    Text(TextProps),
    Button(ButtonProps),
}

impl Props {
    pub fn kind(&self) -> ElementType {
        match self {
            Props::Rect(_) => ElementType::Rect,
            Props::Text(_) => ElementType::Text,
            Props::Button(_) => ElementType::Button,
        }
    }

    /// Text elements never carry handlers.
    pub fn handlers(&self) -> Option<&Handlers> {
        match self {
            Props::Rect(r) => Some(&r.handlers),
            Props::Button(b) => Some(&b.handlers),
            Props::Text(_) => None,
        }
    }

    /// Fails when the record does not belong to `kind`.
    pub fn expect_kind(&self, kind: ElementType) -> Result<(), HostError> {
        if self.kind() == kind {
            Ok(())
        } else {
            Err(HostError::KindMismatch {
                expected: kind,
                found: self.kind(),
            })
        }
    }

    /// Shallow, key-wise comparison. Handlers compare by identity.
    pub fn changed_keys(old: &Props, new: &Props) -> Result<ChangedKeys, HostError> {
        let mut out = ChangedKeys::new();
        match (old, new) {
            (Props::Rect(a), Props::Rect(b)) => a.diff(b, &mut out),
            (Props::Text(a), Props::Text(b)) => a.diff(b, &mut out),
            (Props::Button(a), Props::Button(b)) => a.diff(b, &mut out),
            _ => {
                return Err(HostError::KindMismatch {
                    expected: old.kind(),
                    found: new.kind(),
                });
            }
        }
        Ok(out)
    }
}

impl From<RectProps> for Props {
    fn from(p: RectProps) -> Self {
        Props::Rect(p)
    }
}

impl From<TextProps> for Props {
    fn from(p: TextProps) -> Self {
        Props::Text(p)
    }
}

impl From<ButtonProps> for Props {
    fn from(p: ButtonProps) -> Self {
        Props::Button(p)
    }
}
