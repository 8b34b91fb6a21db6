//! The board: simulation context plus every user-facing entry point
//!
//! Owns the idea store, mode, canvas geometry, drag and selection state, RNG
//! and persistence backend. Every mutating action persists (local mode) or is
//! forwarded to the feed (remote mode).

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::persistence::{IdeaRecord, LocalBridge, RemoteBridge, RemoteEvent};
use crate::settings::BoardSettings;
use crate::sim::mode::{random_piano_variant, random_placement};
use crate::sim::{
    DragController, DragRelease, FrameClock, Idea, IdeaId, IdeaStore, Mode, Rect, Variant,
    apply_mode_policy, launch_velocity, step,
};

/// Where the board keeps its ideas between sessions
pub enum Persistence {
    /// Nothing is saved
    Ephemeral,
    /// Snapshot in a key-value store
    Local(LocalBridge),
    /// Push/subscribe feed
    Remote(RemoteBridge),
}

pub struct IdeaBoard {
    store: IdeaStore,
    mode: Mode,
    canvas: Vec2,
    trash: Rect,
    drag: DragController,
    selected: Option<IdeaId>,
    rng: Pcg32,
    settings: BoardSettings,
    clock: FrameClock,
    persistence: Persistence,
}

impl IdeaBoard {
    pub fn new(seed: u64, settings: BoardSettings, persistence: Persistence) -> Self {
        let canvas = Vec2::new(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT);
        Self {
            store: IdeaStore::new(),
            mode: Mode::default(),
            canvas,
            trash: default_trash(canvas),
            drag: DragController::new(),
            selected: None,
            rng: Pcg32::seed_from_u64(seed),
            settings,
            clock: FrameClock::new(),
            persistence,
        }
    }

    /// Board with no persistence
    pub fn ephemeral(seed: u64) -> Self {
        Self::new(seed, BoardSettings::default(), Persistence::Ephemeral)
    }

    // === Accessors ===

    pub fn ideas(&self) -> impl Iterator<Item = &Idea> {
        self.store.iter()
    }

    pub fn idea(&self, id: &IdeaId) -> Option<&Idea> {
        self.store.get(id)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn canvas(&self) -> Vec2 {
        self.canvas
    }

    pub fn trash(&self) -> Rect {
        self.trash
    }

    pub fn selected(&self) -> Option<&IdeaId> {
        self.selected.as_ref()
    }

    pub fn dragged(&self) -> Option<&IdeaId> {
        self.drag.held()
    }

    /// Whether the held idea currently hovers the trash (for highlighting)
    pub fn trash_hover(&self) -> bool {
        self.drag.over_trash()
    }

    pub fn settings(&self) -> &BoardSettings {
        &self.settings
    }

    pub fn persistence(&self) -> &Persistence {
        &self.persistence
    }

    pub fn is_remote(&self) -> bool {
        matches!(self.persistence, Persistence::Remote(_))
    }

    // === Geometry from the host ===

    pub fn set_canvas(&mut self, size: Vec2) {
        if size.is_finite() && size.x > 0.0 && size.y > 0.0 {
            self.canvas = size;
        }
    }

    pub fn set_trash(&mut self, rect: Rect) {
        self.trash = rect;
    }

    /// Report the rendered size of an idea's tag
    pub fn set_measured_size(&mut self, id: &IdeaId, size: Vec2) {
        if let Some(idea) = self.store.get_mut(id) {
            idea.set_measured_size(size);
        }
    }

    // === Creation ===

    /// Trim and add user text. Returns the new id in local mode; in remote
    /// mode the idea only appears once the feed echoes it.
    pub fn submit(&mut self, text: &str) -> Option<IdeaId> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        if let Persistence::Remote(bridge) = &mut self.persistence {
            let vel = launch_velocity(self.mode, &self.settings, &mut self.rng);
            let variant = match self.mode {
                Mode::Bounce => Variant::Flow,
                Mode::Piano => random_piano_variant(&mut self.rng),
            };
            bridge.push(IdeaRecord {
                text: text.to_string(),
                vx: Some(vel.x),
                vy: Some(vel.y),
                visual_variant: Some(variant),
                ..Default::default()
            });
            return None;
        }

        let id = self.create_idea(text, None)?;
        log::info!("Added idea {}", id);
        self.persist();
        Some(id)
    }

    /// Create an idea, either fresh or restored from a record whose present
    /// fields are authoritative. Returns `None` if the record duplicates a
    /// live idea (same id, or same text at the same position).
    pub fn create_idea(&mut self, text: &str, restore: Option<&IdeaRecord>) -> Option<IdeaId> {
        if let Some(record) = restore {
            if let Some(id) = &record.id {
                if self.store.contains(id) {
                    log::debug!("Skipping duplicate idea {}", id);
                    return None;
                }
            }
            if let Some((x, y)) = record.position() {
                if self.store.has_signature(text, x, y) {
                    log::debug!("Skipping duplicate idea {:?} at ({}, {})", text, x, y);
                    return None;
                }
            }
        }

        let id = match restore.and_then(|r| r.id.clone()) {
            Some(id) => id,
            None => self.store.next_local_id(),
        };
        let mut idea = Idea::new(id.clone(), text);
        idea.z = self.store.top_z() + 1;

        match restore {
            None => {
                idea.pos = random_placement(&idea, self.canvas, &mut self.rng);
                apply_mode_policy(&mut idea, self.mode, self.canvas, &self.settings, &mut self.rng);
            }
            Some(record) => {
                idea.set_font_size(record.font_size);
                idea.pos = match record.position() {
                    Some((x, y)) => Vec2::new(x, y),
                    None => random_placement(&idea, self.canvas, &mut self.rng),
                };
                idea.vel = match record.velocity() {
                    Some((vx, vy)) => Vec2::new(vx, vy),
                    None => launch_velocity(self.mode, &self.settings, &mut self.rng),
                };
                idea.variant = match (record.visual_variant, self.mode) {
                    (Some(variant), _) => variant,
                    (None, Mode::Bounce) => Variant::Flow,
                    (None, Mode::Piano) => random_piano_variant(&mut self.rng),
                };
            }
        }

        self.store.insert(idea);
        Some(id)
    }

    // === Mode, selection, resize ===

    /// Flip between bounce and piano and restyle every idea
    pub fn toggle_mode(&mut self) -> Mode {
        self.mode = self.mode.toggled();
        let held = self.drag.held();
        for idea in self.store.iter_mut() {
            if held == Some(&idea.id) {
                // Restyled, but stays under the pointer and still until released
                let pos = idea.pos;
                apply_mode_policy(idea, self.mode, self.canvas, &self.settings, &mut self.rng);
                idea.pos = pos;
                idea.vel = Vec2::ZERO;
                continue;
            }
            apply_mode_policy(idea, self.mode, self.canvas, &self.settings, &mut self.rng);
        }
        log::info!("Switched to {}", self.mode.label());
        self.persist();
        self.mode
    }

    pub fn select(&mut self, id: &IdeaId) -> bool {
        if self.store.contains(id) {
            self.selected = Some(id.clone());
            true
        } else {
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Grow (positive) or shrink (negative) the selected idea's font by whole
    /// steps. Returns the new font size, or `None` without a selection.
    pub fn resize_selected(&mut self, steps: i32) -> Option<f32> {
        let id = self.selected.clone()?;
        let settings = &self.settings;
        let idea = self.store.get_mut(&id)?;

        let current = idea.effective_font_size();
        let next = (current + steps as f32 * settings.font_step)
            .clamp(settings.font_min, settings.font_max);
        if next == current && idea.font_size().is_some() {
            return Some(current);
        }
        idea.set_font_size(Some(next));
        self.persist();
        Some(next)
    }

    // === Deletion ===

    /// Delete one idea everywhere (store, selection, drag, persistence)
    pub fn delete(&mut self, id: &IdeaId) -> bool {
        if !self.remove_local(id) {
            return false;
        }
        log::info!("Deleted idea {}", id);
        self.persist_removal(id);
        true
    }

    /// Delete everything, including the saved snapshot
    pub fn reset(&mut self) {
        let ids = self.store.ids();
        self.store.clear();
        self.selected = None;
        self.drag.cancel();

        match &mut self.persistence {
            Persistence::Ephemeral => {}
            Persistence::Local(bridge) => {
                if let Err(e) = bridge.clear() {
                    log::warn!("Could not clear saved ideas: {}", e);
                }
            }
            Persistence::Remote(bridge) => {
                for id in &ids {
                    if let IdeaId::Remote(key) = id {
                        bridge.remove(key);
                    }
                }
            }
        }
        log::info!("Board reset ({} ideas removed)", ids.len());
    }

    fn remove_local(&mut self, id: &IdeaId) -> bool {
        if self.store.remove(id).is_none() {
            return false;
        }
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        if self.drag.held() == Some(id) {
            self.drag.cancel();
        }
        true
    }

    // === Dragging ===

    /// Pointer pressed on an idea
    pub fn begin_drag(&mut self, id: &IdeaId, pointer: Vec2) -> bool {
        if !self.drag.begin(&mut self.store, id, pointer) {
            return false;
        }
        self.selected = Some(id.clone());
        true
    }

    /// Pointer moved while holding an idea; returns trash hover state
    pub fn drag_to(&mut self, pointer: Vec2) -> bool {
        self.drag
            .drag_to(&mut self.store, pointer, &self.trash, self.settings.throw_damping)
    }

    /// Pointer released
    pub fn release_drag(&mut self) -> DragRelease {
        let release = self.drag.release(&mut self.store, &self.trash);
        match &release {
            DragRelease::None => {}
            DragRelease::Thrown { .. } => self.persist(),
            DragRelease::Trashed { id } => {
                if self.selected.as_ref() == Some(id) {
                    self.selected = None;
                }
                log::info!("Trashed idea {}", id);
                self.persist_removal(id);
            }
        }
        release
    }

    // === Simulation ===

    /// Advance to animation-frame timestamp `now_ms`; returns the dt used
    pub fn tick(&mut self, now_ms: f64) -> f32 {
        let dt = self.clock.advance(now_ms, self.settings.max_frame_ms);
        self.step(dt);
        dt
    }

    /// Advance by `dt_ms`: integrate everything, then resolve collisions
    pub fn step(&mut self, dt_ms: f32) {
        step(
            &mut self.store,
            self.drag.held(),
            dt_ms,
            self.mode,
            self.canvas,
            &self.settings,
            &mut self.rng,
        );
    }

    /// Forget the last frame time, e.g. when the page becomes visible again
    pub fn pause_clock(&mut self) {
        self.clock.reset();
    }

    // === Persistence ===

    /// Records for every live idea, in store order
    pub fn snapshot(&self) -> Vec<IdeaRecord> {
        self.store.iter().map(IdeaRecord::from_idea).collect()
    }

    /// Write the snapshot (local mode only; failures are logged)
    pub fn save(&mut self) {
        self.persist();
    }

    /// Replace the board's contents with the saved snapshot. Returns the
    /// number of ideas restored.
    pub fn load(&mut self) -> usize {
        let Persistence::Local(bridge) = &self.persistence else {
            return 0;
        };
        let records = bridge.load();

        self.store.clear();
        self.selected = None;
        self.drag.cancel();

        let mut restored = 0;
        for record in &records {
            if self.create_idea(&record.text, Some(record)).is_some() {
                restored += 1;
            }
        }
        if restored < records.len() {
            log::info!("Skipped {} duplicate saved ideas", records.len() - restored);
        }
        restored
    }

    /// Apply pending feed notifications; returns how many were handled
    pub fn pump_remote(&mut self) -> usize {
        let Persistence::Remote(bridge) = &mut self.persistence else {
            return 0;
        };
        let events = bridge.poll_events();
        let count = events.len();
        for event in events {
            self.apply_remote(event);
        }
        count
    }

    /// Reconcile one feed notification into the store
    pub fn apply_remote(&mut self, event: RemoteEvent) {
        match event {
            RemoteEvent::Added { key, record } => {
                let id = IdeaId::Remote(key);
                if self.store.contains(&id) {
                    log::debug!("Remote idea {} already present", id);
                    return;
                }
                let record = IdeaRecord {
                    id: Some(id),
                    ..record
                };
                let text = record.text.clone();
                self.create_idea(&text, Some(&record));
            }
            RemoteEvent::Removed { key } => {
                let id = IdeaId::Remote(key);
                if self.remove_local(&id) {
                    log::info!("Remote removed idea {}", id);
                }
            }
        }
    }

    fn persist(&mut self) {
        if let Persistence::Local(bridge) = &mut self.persistence {
            let records: Vec<IdeaRecord> = self.store.iter().map(IdeaRecord::from_idea).collect();
            if let Err(e) = bridge.save(&records) {
                log::warn!("Could not save ideas: {}", e);
            }
        }
    }

    fn persist_removal(&mut self, id: &IdeaId) {
        if let Persistence::Remote(bridge) = &mut self.persistence {
            if let IdeaId::Remote(key) = id {
                bridge.remove(key);
            }
            return;
        }
        self.persist();
    }
}

/// Trash target anchored to the bottom-right corner of the canvas
pub fn default_trash(canvas: Vec2) -> Rect {
    let size = Vec2::splat(TRASH_SIZE);
    let pos = (canvas - size - Vec2::splat(TRASH_MARGIN)).max(Vec2::ZERO);
    Rect::new(pos, size)
}
