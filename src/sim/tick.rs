//! Per-frame motion integration and boundary handling
//!
//! Frame-rate independent: positions advance by elapsed milliseconds,
//! never by frame count.

use glam::Vec2;
use rand::Rng;

use super::collision::resolve_collisions;
use super::mode::{random_piano_variant, random_row};
use super::state::{Idea, IdeaId, Mode};
use super::store::IdeaStore;
use crate::settings::BoardSettings;

/// What happened to an idea at the canvas edge during one integration step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeEvents {
    pub bounced_x: bool,
    pub bounced_y: bool,
    /// Piano marquee teleported the idea back to the right edge
    pub wrapped: bool,
}

/// Clamp a raw frame delta to something safe to integrate
pub fn sanitize_dt(dt_ms: f32, max_frame_ms: f32) -> f32 {
    if dt_ms.is_finite() && dt_ms > 0.0 {
        dt_ms.min(max_frame_ms)
    } else {
        0.0
    }
}

/// Advance one idea by `dt_ms` and apply the boundary policy for `mode`
pub fn integrate<R: Rng + ?Sized>(
    idea: &mut Idea,
    dt_ms: f32,
    mode: Mode,
    canvas: Vec2,
    settings: &BoardSettings,
    rng: &mut R,
) -> EdgeEvents {
    let dt = sanitize_dt(dt_ms, settings.max_frame_ms);
    idea.pos += idea.vel * dt * settings.velocity_scale;

    let events = match mode {
        Mode::Bounce => bounce_walls(idea, canvas, settings.restitution),
        Mode::Piano => piano_walls(idea, canvas, rng),
    };

    if !idea.pos.is_finite() {
        log::warn!("Idea {} left finite space, resetting", idea.id);
        idea.pos = Vec2::ZERO;
        idea.vel = Vec2::ZERO;
    }
    events
}

/// Reflect off all four edges and keep the box inside the canvas
fn bounce_walls(idea: &mut Idea, canvas: Vec2, restitution: f32) -> EdgeEvents {
    let mut events = EdgeEvents::default();
    let max = (canvas - idea.size()).max(Vec2::ZERO);

    // Sign assignment (not negation) so a bounce is never applied twice
    if idea.pos.x < 0.0 {
        idea.pos.x = 0.0;
        idea.vel.x = idea.vel.x.abs() * restitution;
        events.bounced_x = true;
    } else if idea.pos.x > max.x {
        idea.pos.x = max.x;
        idea.vel.x = -idea.vel.x.abs() * restitution;
        events.bounced_x = true;
    }

    if idea.pos.y < 0.0 {
        idea.pos.y = 0.0;
        idea.vel.y = idea.vel.y.abs() * restitution;
        events.bounced_y = true;
    } else if idea.pos.y > max.y {
        idea.pos.y = max.y;
        idea.vel.y = -idea.vel.y.abs() * restitution;
        events.bounced_y = true;
    }

    events
}

/// Left-edge wraparound with vertical clamping
fn piano_walls<R: Rng + ?Sized>(idea: &mut Idea, canvas: Vec2, rng: &mut R) -> EdgeEvents {
    let mut events = EdgeEvents::default();

    if idea.pos.x + idea.size().x < 0.0 {
        idea.pos.x = canvas.x;
        idea.pos.y = random_row(idea, canvas, rng);
        idea.variant = random_piano_variant(rng);
        events.wrapped = true;
    } else if idea.pos.x > canvas.x && idea.vel.x > 0.0 {
        // Thrown off the right side: turn it back into the stream
        idea.vel.x = -idea.vel.x;
        events.bounced_x = true;
    }

    let max_y = (canvas.y - idea.size().y).max(0.0);
    if idea.pos.y < 0.0 || idea.pos.y > max_y {
        idea.pos.y = idea.pos.y.clamp(0.0, max_y);
        idea.vel.y = 0.0;
        events.bounced_y = true;
    }

    events
}

/// Advance the whole board by one frame: integrate every idea except the
/// held one, then resolve collisions if the mode uses them.
pub fn step<R: Rng + ?Sized>(
    store: &mut IdeaStore,
    held: Option<&IdeaId>,
    dt_ms: f32,
    mode: Mode,
    canvas: Vec2,
    settings: &BoardSettings,
    rng: &mut R,
) -> usize {
    for idea in store.iter_mut() {
        if held == Some(&idea.id) {
            continue;
        }
        integrate(idea, dt_ms, mode, canvas, settings, rng);
    }

    if mode.collisions_enabled() {
        resolve_collisions(
            store.as_mut_slice(),
            held,
            canvas,
            settings.collision_damping,
        )
    } else {
        0
    }
}

/// Turns animation-frame timestamps into capped frame deltas
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Elapsed ms since the previous frame; the first frame yields 0
    pub fn advance(&mut self, now_ms: f64, max_frame_ms: f32) -> f32 {
        let dt = match self.last_ms {
            Some(last) => (now_ms - last) as f32,
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        sanitize_dt(dt, max_frame_ms)
    }

    /// Forget the previous timestamp (e.g. after the tab was hidden)
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}
