//! Pairwise collision resolution between ideas
//!
//! Resolution law: when two boxes overlap, they are pushed apart along the
//! axis of smaller penetration (half each, so neither stays inside the other),
//! and if they were closing in on that axis their velocities are swapped and
//! damped. Both stay inside the canvas: depth one idea can't take because it
//! sits against a wall goes to its partner.

use glam::Vec2;

use super::state::{Idea, IdeaId};

/// Extra separation added on top of the overlap depth so the pair ends up
/// strictly apart despite float rounding
pub const SEPARATION_EPSILON: f32 = 0.01;

/// Result of resolving one pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Axis the pair was separated along (unit x or unit y)
    pub axis: Vec2,
    /// Penetration depth along `axis` before correction
    pub depth: f32,
    /// Whether velocities were exchanged
    pub swapped: bool,
}

/// Resolve a single pair in place, returning contact info if they overlapped
pub fn resolve_pair(a: &mut Idea, b: &mut Idea, canvas: Vec2, damping: f32) -> Option<Contact> {
    let depth = a.rect().overlap_depth(&b.rect())?;

    // Direction from a to b along the shallow axis
    let delta = b.rect().center() - a.rect().center();
    let (axis, overlap) = if depth.x < depth.y {
        (Vec2::X * sign_or_one(delta.x), depth.x)
    } else {
        (Vec2::Y * sign_or_one(delta.y), depth.y)
    };

    let push = axis * (overlap * 0.5 + SEPARATION_EPSILON);
    let a_target = a.pos - push;
    let a_pos = clamp_to_canvas(a_target, a.size(), canvas);
    let b_target = b.pos + push - (a_target - a_pos);
    let b_pos = clamp_to_canvas(b_target, b.size(), canvas);
    a.pos = clamp_to_canvas(a_pos - (b_target - b_pos), a.size(), canvas);
    b.pos = b_pos;

    // Only exchange momentum when closing; separating pairs keep their motion
    let closing = (b.vel - a.vel).dot(axis) < 0.0;
    if closing {
        let va = a.vel;
        a.vel = b.vel * damping;
        b.vel = va * damping;
    }

    Some(Contact {
        axis,
        depth: overlap,
        swapped: closing,
    })
}

/// Single pass over all unordered pairs; `held` is excluded (it follows the pointer)
pub fn resolve_collisions(
    ideas: &mut [Idea],
    held: Option<&IdeaId>,
    canvas: Vec2,
    damping: f32,
) -> usize {
    let mut contacts = 0;
    for i in 0..ideas.len() {
        if held == Some(&ideas[i].id) {
            continue;
        }
        for j in (i + 1)..ideas.len() {
            if held == Some(&ideas[j].id) {
                continue;
            }
            let (head, tail) = ideas.split_at_mut(j);
            if resolve_pair(&mut head[i], &mut tail[0], canvas, damping).is_some() {
                contacts += 1;
            }
        }
    }
    contacts
}

fn clamp_to_canvas(pos: Vec2, size: Vec2, canvas: Vec2) -> Vec2 {
    pos.clamp(Vec2::ZERO, (canvas - size).max(Vec2::ZERO))
}

#[inline]
fn sign_or_one(v: f32) -> f32 {
    if v < 0.0 { -1.0 } else { 1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const CANVAS: Vec2 = Vec2::new(1000.0, 1000.0);

    fn idea_at(n: u64, x: f32, y: f32, vel: Vec2) -> Idea {
        let mut idea = Idea::new(IdeaId::Local(n), "box");
        idea.set_measured_size(Vec2::new(100.0, 40.0));
        idea.pos = Vec2::new(x, y);
        idea.vel = vel;
        idea
    }

    #[test]
    fn test_head_on_swap() {
        let mut a = idea_at(1, 0.0, 0.0, Vec2::new(2.0, 0.0));
        let mut b = idea_at(2, 90.0, 0.0, Vec2::new(-1.0, 0.0));

        let contact = resolve_pair(&mut a, &mut b, CANVAS, 0.9).unwrap();
        assert!(contact.swapped);
        assert_eq!(contact.axis, Vec2::X);
        assert!((a.vel.x - (-0.9)).abs() < 1e-6);
        assert!((b.vel.x - 1.8).abs() < 1e-6);
        assert!(!a.rect().overlaps(&b.rect()));
    }

    #[test]
    fn test_separating_pair_keeps_velocity() {
        let mut a = idea_at(1, 0.0, 0.0, Vec2::new(-2.0, 0.0));
        let mut b = idea_at(2, 90.0, 0.0, Vec2::new(2.0, 0.0));
        let contact = resolve_pair(&mut a, &mut b, CANVAS, 0.9).unwrap();
        assert!(!contact.swapped);
        assert_eq!(a.vel, Vec2::new(-2.0, 0.0));
        assert_eq!(b.vel, Vec2::new(2.0, 0.0));
    }

    #[test]
    fn test_vertical_axis_chosen_for_shallow_y() {
        let mut a = idea_at(1, 0.0, 0.0, Vec2::ZERO);
        let mut b = idea_at(2, 10.0, 35.0, Vec2::ZERO);
        let contact = resolve_pair(&mut a, &mut b, CANVAS, 0.9).unwrap();
        assert_eq!(contact.axis, Vec2::Y);
        assert!(b.pos.y > 35.0);
        assert_eq!(a.pos, Vec2::ZERO);
        assert!(!a.rect().overlaps(&b.rect()));
    }

    #[test]
    fn test_idea_against_wall_hands_depth_to_partner() {
        let mut a = idea_at(1, 0.0, 100.0, Vec2::ZERO);
        let mut b = idea_at(2, 70.0, 100.0, Vec2::ZERO);
        let contact = resolve_pair(&mut a, &mut b, CANVAS, 0.9).unwrap();
        assert_eq!(contact.axis, Vec2::X);
        assert_eq!(a.pos.x, 0.0);
        assert!((b.pos.x - (100.0 + 2.0 * SEPARATION_EPSILON)).abs() < 1e-4);
        assert!(!a.rect().overlaps(&b.rect()));
    }

    #[test]
    fn test_pair_in_corner_stays_on_canvas() {
        let canvas = Vec2::new(300.0, 200.0);
        let mut a = idea_at(1, 150.0, 160.0, Vec2::ZERO);
        let mut b = idea_at(2, 200.0, 160.0, Vec2::ZERO);
        resolve_pair(&mut a, &mut b, canvas, 0.9).unwrap();
        for idea in [&a, &b] {
            assert!(idea.pos.x >= 0.0 && idea.pos.x + 100.0 <= canvas.x);
            assert!(idea.pos.y >= 0.0 && idea.pos.y + 40.0 <= canvas.y);
        }
        assert!(!a.rect().overlaps(&b.rect()));
    }

    #[test]
    fn test_second_pass_is_noop() {
        let mut ideas = vec![
            idea_at(1, 0.0, 0.0, Vec2::new(1.0, 1.0)),
            idea_at(2, 50.0, 20.0, Vec2::new(-1.0, 0.5)),
        ];
        assert_eq!(resolve_collisions(&mut ideas, None, CANVAS, 0.9), 1);
        let after = ideas.clone();
        assert_eq!(resolve_collisions(&mut ideas, None, CANVAS, 0.9), 0);
        assert_eq!(ideas, after);
    }

    #[test]
    fn test_held_idea_is_skipped() {
        let mut ideas = vec![
            idea_at(1, 0.0, 0.0, Vec2::ZERO),
            idea_at(2, 50.0, 0.0, Vec2::ZERO),
        ];
        let held = IdeaId::Local(1);
        assert_eq!(resolve_collisions(&mut ideas, Some(&held), CANVAS, 0.9), 0);
        assert_eq!(ideas[1].pos, Vec2::new(50.0, 0.0));
    }

    proptest! {
        #[test]
        fn prop_resolution_separates(
            ax in 0.0f32..400.0, ay in 0.0f32..400.0,
            bx in 0.0f32..400.0, by in 0.0f32..400.0,
            avx in -5.0f32..5.0, avy in -5.0f32..5.0,
            bvx in -5.0f32..5.0, bvy in -5.0f32..5.0,
        ) {
            let mut a = idea_at(1, ax, ay, Vec2::new(avx, avy));
            let mut b = idea_at(2, bx, by, Vec2::new(bvx, bvy));
            let overlapped = a.rect().overlaps(&b.rect());
            let contact = resolve_pair(&mut a, &mut b, CANVAS, 0.9);
            prop_assert_eq!(contact.is_some(), overlapped);
            prop_assert!(!a.rect().overlaps(&b.rect()));
            for idea in [&a, &b] {
                prop_assert!(idea.pos.cmpge(Vec2::ZERO).all());
                prop_assert!((idea.pos + idea.size()).cmple(CANVAS).all());
            }
            if let Some(contact) = contact {
                // After resolution the pair is not closing along the contact axis
                prop_assert!((b.vel - a.vel).dot(contact.axis) >= -1e-5);
            }
        }
    }
}
