//! Idea physics
//!
//! Everything here is pure and platform-free:
//! - Elapsed-time integration only (no frame counting)
//! - RNG passed in explicitly
//! - Stable iteration order (store insertion order)
//! - No rendering or storage dependencies

pub mod collision;
pub mod drag;
pub mod geometry;
pub mod mode;
pub mod state;
pub mod store;
pub mod tick;

pub use collision::{Contact, resolve_collisions, resolve_pair};
pub use drag::{DragController, DragRelease, DragState};
pub use geometry::Rect;
pub use mode::{apply_mode_policy, launch_velocity};
pub use state::{Idea, IdeaId, Mode, Variant, estimate_size};
pub use store::IdeaStore;
pub use tick::{EdgeEvents, FrameClock, integrate, step};
