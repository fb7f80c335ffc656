use std::f32::consts::{PI, TAU};

use glam::Vec2;
use rand::Rng;
use spawn_director_core::{PlacementPattern, PlacementTuning, PlayBounds, SpawnSide};

use crate::side::edge_position;

/// Extra outward push applied after anchoring so members never sit on the margin line.
const ANCHOR_EPSILON: f32 = 0.5;

/// Group laid out around an anchor outside the play area.
#[derive(Clone, Debug, PartialEq)]
pub struct Formation {
    /// Pattern the group was laid out with.
    pub pattern: PlacementPattern,
    /// Side the group enters from.
    pub side: SpawnSide,
    /// Anchor after the outward push.
    pub anchor: Vec2,
    /// World position of every member, front row first.
    pub positions: Vec<Vec2>,
    /// Entry velocity toward the play-area centre shared by every member.
    pub glide: Vec2,
}

/// Relative member offsets in the formation frame.
///
/// The frame's `+y` axis points away from the play area and `x` runs across
/// the approach, so the front of every pattern sits at `y = 0` or below.
/// Neighbouring members are never closer than `spacing`.
pub fn formation_offsets<R: Rng + ?Sized>(
    pattern: PlacementPattern,
    count: usize,
    spacing: f32,
    rng: &mut R,
) -> Vec<Vec2> {
    if count == 0 {
        return Vec::new();
    }
    let centred = |index: usize, len: usize| (index as f32 - (len as f32 - 1.0) * 0.5) * spacing;
    match pattern {
        PlacementPattern::Single => vec![Vec2::ZERO],
        PlacementPattern::Line => (0..count)
            .map(|index| Vec2::new(centred(index, count), 0.0))
            .collect(),
        PlacementPattern::VShape => (0..count)
            .map(|index| {
                let arm = ((index + 1) / 2) as f32;
                let sign = if index % 2 == 1 { -1.0 } else { 1.0 };
                Vec2::new(sign * arm, arm) * spacing * 0.8
            })
            .collect(),
        PlacementPattern::Fan => {
            let spread = 50f32.to_radians();
            (0..count)
                .map(|index| {
                    let ray = (index % 3) as f32 - 1.0;
                    let depth = (1.5 + (index / 3) as f32) * spacing;
                    let angle = ray * spread;
                    Vec2::new(angle.sin(), angle.cos()) * depth
                })
                .collect()
        }
        PlacementPattern::Circle => ring(count, ring_radius(count, spacing), 0.0),
        PlacementPattern::Arc => {
            if count == 1 {
                return vec![Vec2::ZERO];
            }
            let span = TAU / 3.0;
            let step = span / (count as f32 - 1.0);
            let radius = spacing / (2.0 * (step * 0.5).sin());
            (0..count)
                .map(|index| {
                    let angle = -span * 0.5 + step * index as f32;
                    Vec2::new(radius * angle.sin(), radius * (1.0 - angle.cos()))
                })
                .collect()
        }
        PlacementPattern::Grid => grid(count, spacing),
        PlacementPattern::RandomCluster => {
            let jitter = spacing * 0.15;
            grid(count, spacing * 1.3)
                .into_iter()
                .map(|cell| {
                    cell + Vec2::new(
                        rng.gen_range(-jitter..=jitter),
                        rng.gen_range(-jitter..=jitter),
                    )
                })
                .collect()
        }
        PlacementPattern::Cross => {
            let arms = [Vec2::X, Vec2::Y, Vec2::NEG_X, Vec2::NEG_Y];
            (0..count)
                .map(|index| {
                    if index == 0 {
                        return Vec2::ZERO;
                    }
                    let reach = ((index - 1) / 4 + 1) as f32;
                    arms[(index - 1) % 4] * reach * spacing
                })
                .collect()
        }
        PlacementPattern::DoubleRing => {
            let inner_count = count / 2;
            let outer_count = count - inner_count;
            let inner_radius = if inner_count > 1 {
                ring_radius(inner_count, spacing)
            } else {
                0.0
            };
            let outer_radius = (inner_radius + spacing).max(ring_radius(outer_count, spacing));
            let mut offsets = ring(inner_count, inner_radius, 0.0);
            let stagger = PI / outer_count as f32;
            offsets.extend(ring(outer_count, outer_radius, stagger));
            offsets
        }
        PlacementPattern::DoubleLine => {
            let front = (count + 1) / 2;
            (0..count)
                .map(|index| {
                    let row = index / front;
                    let column = index % front;
                    let len = if row == 0 { front } else { count - front };
                    Vec2::new(centred(column, len), row as f32 * spacing)
                })
                .collect()
        }
        PlacementPattern::StaggeredWave => (0..count)
            .map(|index| {
                let depth = if index % 2 == 1 { spacing * 0.5 } else { 0.0 };
                Vec2::new(centred(index, count), depth)
            })
            .collect(),
    }
}

fn ring_radius(count: usize, spacing: f32) -> f32 {
    if count < 2 {
        return 0.0;
    }
    (spacing / (2.0 * (PI / count as f32).sin())).max(spacing)
}

fn ring(count: usize, radius: f32, phase: f32) -> Vec<Vec2> {
    if count == 1 && radius == 0.0 {
        return vec![Vec2::ZERO];
    }
    (0..count)
        .map(|index| {
            let angle = phase + TAU * index as f32 / count as f32;
            Vec2::new(angle.cos(), angle.sin()) * radius
        })
        .collect()
}

fn grid(count: usize, spacing: f32) -> Vec<Vec2> {
    let columns = (count as f32).sqrt().ceil().max(1.0) as usize;
    let rows = (count + columns - 1) / columns;
    let width = (columns as f32 - 1.0) * 0.5;
    let depth = (rows as f32 - 1.0) * 0.5;
    (0..count)
        .map(|index| {
            let column = (index % columns) as f32 - width;
            let row = (index / columns) as f32 - depth;
            Vec2::new(column, row) * spacing
        })
        .collect()
}

/// Rotates a frame offset so its `+y` axis points out through `side`.
#[must_use]
pub fn rotate_to_side(offset: Vec2, side: SpawnSide) -> Vec2 {
    let outward = side.outward();
    let across = -outward.perp();
    across * offset.x + outward * offset.y
}

/// Distance the anchor must travel along `outward` so that every point ends
/// outside the bounds grown by `margin` and stays outside further out.
#[must_use]
pub fn outward_push(points: &[Vec2], outward: Vec2, bounds: &PlayBounds, margin: f32) -> f32 {
    let lo = bounds.min - Vec2::splat(margin);
    let hi = bounds.max + Vec2::splat(margin);
    points
        .iter()
        .map(|point| exit_distance(*point, outward, lo, hi))
        .fold(0.0, f32::max)
}

/// Parameter at which the ray `point + t * direction` last leaves the open box,
/// or zero when it is outside for every `t >= 0`.
fn exit_distance(point: Vec2, direction: Vec2, lo: Vec2, hi: Vec2) -> f32 {
    let mut enter = f32::NEG_INFINITY;
    let mut exit = f32::INFINITY;
    for (origin, step, low, high) in [
        (point.x, direction.x, lo.x, hi.x),
        (point.y, direction.y, lo.y, hi.y),
    ] {
        if step.abs() < 1e-6 {
            if origin <= low || origin >= high {
                return 0.0;
            }
            continue;
        }
        let a = (low - origin) / step;
        let b = (high - origin) / step;
        enter = enter.max(a.min(b));
        exit = exit.min(a.max(b));
    }
    if enter >= exit || exit <= 0.0 {
        0.0
    } else {
        exit
    }
}

/// Lays out a group entering from `side`.
///
/// The anchor starts on the side's edge zone, member offsets are rotated to
/// face inward, and the anchor is then pushed outward until every member is
/// at or beyond the margin.
pub fn layout_formation<R: Rng + ?Sized>(
    tuning: &PlacementTuning,
    pattern: PlacementPattern,
    side: SpawnSide,
    count: usize,
    rng: &mut R,
) -> Formation {
    let outward = side.outward();
    let base = edge_position(tuning, side, rng);
    let offsets: Vec<Vec2> = formation_offsets(pattern, count, tuning.formation_spacing, rng)
        .into_iter()
        .map(|offset| rotate_to_side(offset, side))
        .collect();
    let provisional: Vec<Vec2> = offsets.iter().map(|offset| base + *offset).collect();
    let push = outward_push(&provisional, outward, &tuning.bounds, tuning.margin);
    let anchor = if push > 0.0 {
        base + outward * (push + ANCHOR_EPSILON)
    } else {
        base
    };
    let positions = offsets.iter().map(|offset| anchor + *offset).collect();
    let glide = (tuning.bounds.center() - anchor).normalize_or_zero() * tuning.glide_speed;
    Formation {
        pattern,
        side,
        anchor,
        positions,
        glide,
    }
}
