//! Pointer drag state machine with throw-on-release
//!
//! Idle -> Dragging on pointer-down over an idea, back to Idle on release.
//! While dragging the idea follows the pointer and its own velocity stays
//! zero; the throw velocity is tracked here and handed over on release.

use glam::Vec2;

use super::geometry::Rect;
use super::state::IdeaId;
use super::store::IdeaStore;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        id: IdeaId,
        last_pointer: Vec2,
        /// Velocity the idea will keep if released now
        throw: Vec2,
        /// Whether the idea currently hovers the trash target
        over_trash: bool,
    },
}

/// How a drag ended
#[derive(Debug, Clone, PartialEq)]
pub enum DragRelease {
    /// Nothing was being dragged
    None,
    /// The idea was let go and keeps moving with this velocity
    Thrown { id: IdeaId, vel: Vec2 },
    /// The idea was dropped on the trash target and removed from the store
    Trashed { id: IdeaId },
}

#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Id of the idea currently held, if any
    pub fn held(&self) -> Option<&IdeaId> {
        match &self.state {
            DragState::Dragging { id, .. } => Some(id),
            DragState::Idle => None,
        }
    }

    pub fn over_trash(&self) -> bool {
        matches!(self.state, DragState::Dragging { over_trash: true, .. })
    }

    /// Grab `id` at `pointer`. Fails if another drag is active or the idea is gone.
    pub fn begin(&mut self, store: &mut IdeaStore, id: &IdeaId, pointer: Vec2) -> bool {
        if self.is_dragging() {
            log::debug!("Ignoring grab of {} while another drag is active", id);
            return false;
        }
        let top = store.top_z();
        let Some(idea) = store.get_mut(id) else {
            return false;
        };
        idea.vel = Vec2::ZERO;
        idea.z = top + 1;

        self.state = DragState::Dragging {
            id: id.clone(),
            last_pointer: pointer,
            throw: Vec2::ZERO,
            over_trash: false,
        };
        log::debug!("Drag started on {}", id);
        true
    }

    /// Follow the pointer; returns the trash hover state
    pub fn drag_to(&mut self, store: &mut IdeaStore, pointer: Vec2, trash: &Rect, damping: f32) -> bool {
        let DragState::Dragging {
            id,
            last_pointer,
            throw,
            over_trash,
        } = &mut self.state
        else {
            return false;
        };
        let Some(idea) = store.get_mut(id) else {
            // Removed underneath us (e.g. remote delete)
            self.state = DragState::Idle;
            return false;
        };

        let delta = pointer - *last_pointer;
        idea.pos += delta;
        idea.vel = Vec2::ZERO;
        *throw = delta * damping;
        *last_pointer = pointer;
        *over_trash = idea.rect().touches(trash);
        *over_trash
    }

    /// Let go: trash the idea if it sits on the trash target, otherwise throw it
    pub fn release(&mut self, store: &mut IdeaStore, trash: &Rect) -> DragRelease {
        let DragState::Dragging { id, throw, .. } = std::mem::take(&mut self.state) else {
            return DragRelease::None;
        };

        let on_trash = match store.get(&id) {
            Some(idea) => idea.rect().touches(trash),
            None => return DragRelease::None,
        };

        if on_trash {
            store.remove(&id);
            log::debug!("Dropped {} on the trash", id);
            return DragRelease::Trashed { id };
        }

        if let Some(idea) = store.get_mut(&id) {
            idea.vel = throw;
        }
        DragRelease::Thrown { id, vel: throw }
    }

    /// Abandon the drag without a trash check; the idea keeps zero velocity
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }
}
