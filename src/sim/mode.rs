//! Mode policy: launch velocity, placement and styling per mode

use glam::Vec2;
use rand::Rng;

use super::state::{Idea, Mode, Variant};
use crate::settings::BoardSettings;

/// Re-style an idea for `mode`, rolling a new velocity (and row in piano mode)
pub fn apply_mode_policy<R: Rng + ?Sized>(
    idea: &mut Idea,
    mode: Mode,
    canvas: Vec2,
    settings: &BoardSettings,
    rng: &mut R,
) {
    match mode {
        Mode::Piano => {
            idea.pos.y = random_row(idea, canvas, rng);
            idea.variant = random_piano_variant(rng);
            idea.vel = piano_velocity(settings, rng);
        }
        Mode::Bounce => {
            idea.variant = Variant::Flow;
            idea.vel = flow_velocity(settings, rng);
        }
    }
}

/// Uniformly random direction at a speed in `[base, base + spread]`
pub fn flow_velocity<R: Rng + ?Sized>(settings: &BoardSettings, rng: &mut R) -> Vec2 {
    let angle = rng.random_range(0.0..std::f32::consts::TAU);
    let speed = settings.base_speed + rng.random_range(0.0..=settings.speed_spread.max(0.0));
    Vec2::from_angle(angle) * speed
}

/// Purely leftward motion at a speed in the piano range
pub fn piano_velocity<R: Rng + ?Sized>(settings: &BoardSettings, rng: &mut R) -> Vec2 {
    let lo = settings.piano_speed_min.min(settings.piano_speed_max);
    let hi = settings.piano_speed_min.max(settings.piano_speed_max);
    let speed = rng.random_range(lo..=hi);
    Vec2::new(-speed, 0.0)
}

/// Fresh velocity for a brand-new idea in `mode`
pub fn launch_velocity<R: Rng + ?Sized>(mode: Mode, settings: &BoardSettings, rng: &mut R) -> Vec2 {
    match mode {
        Mode::Bounce => flow_velocity(settings, rng),
        Mode::Piano => piano_velocity(settings, rng),
    }
}

pub fn random_piano_variant<R: Rng + ?Sized>(rng: &mut R) -> Variant {
    if rng.random_bool(0.5) {
        Variant::PianoBlack
    } else {
        Variant::PianoWhite
    }
}

/// Random vertical position keeping the idea fully on the canvas
pub fn random_row<R: Rng + ?Sized>(idea: &Idea, canvas: Vec2, rng: &mut R) -> f32 {
    let max_y = (canvas.y - idea.size().y).max(0.0);
    rng.random_range(0.0..=max_y)
}

/// Random top-left corner keeping the idea fully on the canvas
pub fn random_placement<R: Rng + ?Sized>(idea: &Idea, canvas: Vec2, rng: &mut R) -> Vec2 {
    let max = (canvas - idea.size()).max(Vec2::ZERO);
    Vec2::new(rng.random_range(0.0..=max.x), rng.random_range(0.0..=max.y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::IdeaId;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const CANVAS: Vec2 = Vec2::new(800.0, 600.0);

    #[test]
    fn test_piano_policy() {
        let settings = BoardSettings::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let mut seen_black = false;
        let mut seen_white = false;
        for _ in 0..64 {
            let mut idea = Idea::new(IdeaId::Local(1), "key");
            apply_mode_policy(&mut idea, Mode::Piano, CANVAS, &settings, &mut rng);
            assert_eq!(idea.vel.y, 0.0);
            assert!(idea.vel.x <= -2.0 && idea.vel.x >= -4.0);
            assert!(idea.pos.y >= 0.0 && idea.pos.y <= CANVAS.y - idea.size().y);
            match idea.variant {
                Variant::PianoBlack => seen_black = true,
                Variant::PianoWhite => seen_white = true,
                Variant::Flow => panic!("piano policy left a flow variant"),
            }
        }
        assert!(seen_black && seen_white);
    }

    #[test]
    fn test_flow_policy_speed_range() {
        let settings = BoardSettings::default();
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..64 {
            let mut idea = Idea::new(IdeaId::Local(1), "drift");
            idea.variant = Variant::PianoWhite;
            apply_mode_policy(&mut idea, Mode::Bounce, CANVAS, &settings, &mut rng);
            let speed = idea.vel.length();
            assert!(speed >= 2.0 - 1e-4 && speed <= 3.0 + 1e-4, "speed {}", speed);
            assert_eq!(idea.variant, Variant::Flow);
        }
    }

    #[test]
    fn test_placement_on_tiny_canvas() {
        let mut rng = Pcg32::seed_from_u64(3);
        let idea = Idea::new(IdeaId::Local(1), "a very long idea that does not fit");
        let pos = random_placement(&idea, Vec2::new(10.0, 10.0), &mut rng);
        assert_eq!(pos, Vec2::ZERO);
    }
}
