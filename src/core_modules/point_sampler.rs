// THEORY:
// The spatial strategy needs a set of pixel coordinates spread over the image
// plane. `PointSampler2D` generates them: points are produced in the unit
// square by one of several patterns, then mapped onto the integer pixel grid
// of the requested domain.
//
// Key architectural principles:
// 1.  **Adjusted counts are part of the contract**: grid-based patterns can only
//     produce square counts. The sampler rounds the request to the nearest
//     square and reports the actual count per level; callers must use that
//     number, not the one they asked for.
// 2.  **Levels**: a sampler can hold several resolution levels. Level `l`
//     requests `max(1, n >> l)` points and is generated independently.
// 3.  **Determinism**: all randomness comes from a `ChaCha8Rng` seeded from the
//     caller's seed (offset by the level), so the same inputs always produce
//     the same coordinates.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Point pattern used to cover the image plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SamplerKind {
    /// Independent uniform random points; the count is kept as requested.
    MonteCarlo,
    /// One jittered point per cell of a square grid.
    #[default]
    StratifiedMonteCarlo,
    /// Cell centres of a square grid.
    Regular,
    /// Base-2/base-3 Halton points with a seeded toroidal shift.
    Halton,
}

/// A generated set of integer coordinates, one list per level.
#[derive(Debug, Clone)]
pub struct PointSampler2D {
    kind: SamplerKind,
    domain: (u32, u32),
    levels: Vec<Vec<(u32, u32)>>,
}

impl PointSampler2D {
    /// Generates `levels` levels of points over a `width x height` domain.
    /// At least one level is always generated.
    pub fn new(kind: SamplerKind, domain: (u32, u32), requested: usize, levels: usize, seed: u64) -> Self {
        let levels = (0..levels.max(1))
            .map(|level| {
                let count = (requested >> level).max(1);
                let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(level as u64));
                unit_points(kind, count, &mut rng)
                    .into_iter()
                    .map(|p| to_pixel(p, domain))
                    .collect()
            })
            .collect();

        Self {
            kind,
            domain,
            levels,
        }
    }

    pub fn kind(&self) -> SamplerKind {
        self.kind
    }

    pub fn domain(&self) -> (u32, u32) {
        self.domain
    }

    pub fn levels(&self) -> usize {
        self.levels.len()
    }

    /// Actual number of points at `level`, 0 for a level that does not exist.
    pub fn samples_at_level(&self, level: usize) -> usize {
        self.levels.get(level).map_or(0, Vec::len)
    }

    pub fn sample_at(&self, level: usize, index: usize) -> Option<(u32, u32)> {
        self.levels.get(level)?.get(index).copied()
    }

    pub fn points(&self, level: usize) -> &[(u32, u32)] {
        self.levels.get(level).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Side of the square grid closest to `count` points.
fn grid_side(count: usize) -> usize {
    ((count as f64).sqrt().round() as usize).max(1)
}

fn unit_points(kind: SamplerKind, count: usize, rng: &mut ChaCha8Rng) -> Vec<(f32, f32)> {
    match kind {
        SamplerKind::MonteCarlo => (0..count).map(|_| (rng.random::<f32>(), rng.random::<f32>())).collect(),
        SamplerKind::StratifiedMonteCarlo => {
            let side = grid_side(count);
            let cell = 1.0 / side as f32;
            let mut points = Vec::with_capacity(side * side);
            for j in 0..side {
                for i in 0..side {
                    let jx: f32 = rng.random();
                    let jy: f32 = rng.random();
                    points.push(((i as f32 + jx) * cell, (j as f32 + jy) * cell));
                }
            }
            points
        }
        SamplerKind::Regular => {
            let side = grid_side(count);
            let cell = 1.0 / side as f32;
            (0..side * side)
                .map(|k| {
                    let (i, j) = (k % side, k / side);
                    ((i as f32 + 0.5) * cell, (j as f32 + 0.5) * cell)
                })
                .collect()
        }
        SamplerKind::Halton => {
            let shift: (f32, f32) = (rng.random(), rng.random());
            (1..=count as u64)
                .map(|k| {
                    let x = (radical_inverse(k, 2) + shift.0).fract();
                    let y = (radical_inverse(k, 3) + shift.1).fract();
                    (x, y)
                })
                .collect()
        }
    }
}

/// Van der Corput radical inverse of `index` in `base`.
fn radical_inverse(mut index: u64, base: u64) -> f32 {
    let inv_base = 1.0 / base as f64;
    let mut factor = inv_base;
    let mut result = 0.0;
    while index > 0 {
        result += (index % base) as f64 * factor;
        index /= base;
        factor *= inv_base;
    }
    result as f32
}

fn to_pixel(point: (f32, f32), (width, height): (u32, u32)) -> (u32, u32) {
    let axis = |t: f32, len: u32| -> u32 {
        let last = len.saturating_sub(1);
        ((t * len as f32).floor().max(0.0) as u32).min(last)
    };
    (axis(point.0, width), axis(point.1, height))
}
