//! Idea entity and core simulation types

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use crate::consts::*;

/// Stable identity of an idea
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdeaId {
    /// Allocated from the board's local sequence
    Local(u64),
    /// Key assigned by the remote feed
    Remote(String),
}

impl fmt::Display for IdeaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdeaId::Local(n) => write!(f, "local-{}", n),
            IdeaId::Remote(key) => write!(f, "remote-{}", key),
        }
    }
}

/// Global behavior mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Ideas drift in any direction and reflect off every wall ("Flow" in the UI)
    #[default]
    Bounce,
    /// Ideas stream leftward and wrap around like an endless marquee
    Piano,
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Mode::Bounce => Mode::Piano,
            Mode::Piano => Mode::Bounce,
        }
    }

    /// Button label shown for this mode
    pub fn label(self) -> &'static str {
        match self {
            Mode::Bounce => "Flow Mode",
            Mode::Piano => "Piano Mode",
        }
    }

    /// Pairwise collisions only make sense when ideas move freely
    pub fn collisions_enabled(self) -> bool {
        self == Mode::Bounce
    }
}

/// Visual classification of an idea
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Variant {
    #[default]
    #[serde(rename = "flow")]
    Flow,
    #[serde(rename = "piano-white")]
    PianoWhite,
    #[serde(rename = "piano-black")]
    PianoBlack,
}

impl Variant {
    /// CSS class carried by the rendered tag, if any
    pub fn css_class(self) -> Option<&'static str> {
        match self {
            Variant::Flow => None,
            Variant::PianoWhite => Some("piano-white"),
            Variant::PianoBlack => Some("piano-black"),
        }
    }

    /// Parse a stored class list such as `"piano-black"`; empty means flow
    pub fn from_class_list(classes: &str) -> Option<Self> {
        for class in classes.split_whitespace() {
            match class {
                "piano-white" => return Some(Variant::PianoWhite),
                "piano-black" => return Some(Variant::PianoBlack),
                "flow" => return Some(Variant::Flow),
                _ => {}
            }
        }
        None
    }

    pub fn is_piano(self) -> bool {
        matches!(self, Variant::PianoWhite | Variant::PianoBlack)
    }
}

/// A single note floating on the board
#[derive(Debug, Clone, PartialEq)]
pub struct Idea {
    pub id: IdeaId,
    text: String,
    /// Top-left corner in canvas space
    pub pos: Vec2,
    pub vel: Vec2,
    pub variant: Variant,
    /// Font override in px; `None` uses the default size
    font_size: Option<f32>,
    /// Bounding box size, kept in sync with text and font
    size: Vec2,
    /// Stacking order (higher is drawn on top)
    pub z: u32,
}

impl Idea {
    pub fn new(id: IdeaId, text: impl Into<String>) -> Self {
        let text = text.into();
        let size = estimate_size(&text, DEFAULT_FONT_SIZE);
        Self {
            id,
            text,
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            variant: Variant::Flow,
            font_size: None,
            size,
            z: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn font_size(&self) -> Option<f32> {
        self.font_size
    }

    pub fn effective_font_size(&self) -> f32 {
        self.font_size.unwrap_or(DEFAULT_FONT_SIZE)
    }

    /// Change the font override and recompute the bounding box
    pub fn set_font_size(&mut self, font_size: Option<f32>) {
        self.font_size = font_size.filter(|f| f.is_finite() && *f > 0.0);
        self.size = estimate_size(&self.text, self.effective_font_size());
    }

    /// Replace the estimated box with one measured by the renderer
    pub fn set_measured_size(&mut self, size: Vec2) {
        if size.is_finite() && size.x > 0.0 && size.y > 0.0 {
            self.size = size;
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }
}

/// Estimate the rendered box of a single-line tag
pub fn estimate_size(text: &str, font_size: f32) -> Vec2 {
    let chars = text.chars().count().max(1) as f32;
    Vec2::new(
        chars * font_size * CHAR_WIDTH_RATIO + 2.0 * IDEA_PADDING,
        font_size * LINE_HEIGHT_RATIO + 2.0 * IDEA_PADDING,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_tracks_font() {
        let mut idea = Idea::new(IdeaId::Local(1), "Ship it");
        let small = idea.size();
        idea.set_font_size(Some(32.0));
        assert!(idea.size().x > small.x);
        assert!(idea.size().y > small.y);
        idea.set_font_size(None);
        assert_eq!(idea.size(), small);
    }

    #[test]
    fn test_measured_size_rejects_garbage() {
        let mut idea = Idea::new(IdeaId::Local(1), "x");
        let before = idea.size();
        idea.set_measured_size(Vec2::new(f32::NAN, 10.0));
        idea.set_measured_size(Vec2::new(0.0, 10.0));
        assert_eq!(idea.size(), before);
        idea.set_measured_size(Vec2::new(120.0, 40.0));
        assert_eq!(idea.size(), Vec2::new(120.0, 40.0));
    }

    #[test]
    fn test_variant_class_parsing() {
        assert_eq!(Variant::from_class_list("piano-black"), Some(Variant::PianoBlack));
        assert_eq!(Variant::from_class_list("idea piano-white"), Some(Variant::PianoWhite));
        assert_eq!(Variant::from_class_list(""), None);
        assert_eq!(Variant::PianoWhite.css_class(), Some("piano-white"));
        assert_eq!(Variant::Flow.css_class(), None);
    }

    #[test]
    fn test_mode_toggle() {
        assert_eq!(Mode::Bounce.toggled(), Mode::Piano);
        assert_eq!(Mode::Piano.toggled(), Mode::Bounce);
        assert!(Mode::Bounce.collisions_enabled());
        assert!(!Mode::Piano.collisions_enabled());
    }
}
