//! Idea Board - a note board where ideas float around as physical tags
//!
//! Core modules:
//! - `sim`: Idea physics (integration, boundaries, collisions, dragging)
//! - `board`: Simulation context owning the ideas and every entry point
//! - `persistence`: Snapshot codec, local key-value bridge, remote feed
//! - `runtime`: Ordered task queue feeding the board
//! - `platform`: Browser/native platform abstraction
//! - `settings`: Tunable physics and sizing parameters

pub mod board;
pub mod persistence;
pub mod platform;
pub mod runtime;
pub mod settings;
pub mod sim;

pub use board::IdeaBoard;
pub use settings::BoardSettings;

/// Application configuration constants
pub mod consts {
    /// Storage key for the idea snapshot
    pub const STORAGE_KEY: &str = "my_private_ideas";
    /// Storage key for board settings
    pub const SETTINGS_KEY: &str = "idea_board_settings";

    /// Canvas size used until the host reports a real one
    pub const DEFAULT_CANVAS_WIDTH: f32 = 1280.0;
    pub const DEFAULT_CANVAS_HEIGHT: f32 = 720.0;

    /// Trash target size, anchored to the bottom-right corner by default
    pub const TRASH_SIZE: f32 = 80.0;
    pub const TRASH_MARGIN: f32 = 20.0;

    /// Text metrics used to estimate an idea's bounding box
    pub const DEFAULT_FONT_SIZE: f32 = 16.0;
    pub const CHAR_WIDTH_RATIO: f32 = 0.6;
    pub const LINE_HEIGHT_RATIO: f32 = 1.4;
    pub const IDEA_PADDING: f32 = 12.0;
}
