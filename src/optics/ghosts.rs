// src/optics/ghosts.rs
// Enumeration of double-reflection light paths ("ghosts") through the lens system
// RELEVANT FILES: src/optics/ray_transfer.rs, src/photometry/ghost_eval.rs

use serde::{Deserialize, Serialize};

use super::ray_transfer::{RayTransferMatrix, RayTransferSolver};

/// Side of the aperture stop a ghost's reflections happen on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GhostSide {
    BeforeAperture,
    AfterAperture,
}

/// One double-reflection path and the media around its second reflection
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ghost {
    pub entrance_to_aperture: RayTransferMatrix,
    pub aperture_to_sensor: RayTransferMatrix,
    /// Index of the medium behind interface `i`
    pub n1: f64,
    /// Index of the medium behind interface `i + 1`
    pub n2: f64,
    /// Interfaces `(i, j)`, `i < j`: first reflection at `j`, second at `i`
    pub reflection_pair: (usize, usize),
    pub side: GhostSide,
}

impl Ghost {
    pub fn entrance_to_sensor(&self) -> RayTransferMatrix {
        self.aperture_to_sensor * self.entrance_to_aperture
    }
}

/// Enumerate every ghost confined entirely before or entirely after the aperture.
///
/// Pairs are visited in increasing `i`, then increasing `j`; the aperture never
/// reflects and pairs straddling it are skipped.
pub fn enumerate_ghosts(solver: &RayTransferSolver) -> Vec<Ghost> {
    let count = solver.interface_count();
    let aperture = solver.aperture_index();
    let before = aperture;
    let after = count - aperture - 1;
    let mut ghosts = Vec::with_capacity(pair_count(before) + pair_count(after));

    if count < 2 {
        return ghosts;
    }

    // the ghost-independent halves are shared by every pair on the opposite side
    let system = solver.lens_system();

    for i in 0..count - 1 {
        if i == aperture {
            continue;
        }
        for j in (i + 1)..count {
            if j == aperture {
                continue;
            }
            let side = if j < aperture {
                GhostSide::BeforeAperture
            } else if i > aperture {
                GhostSide::AfterAperture
            } else {
                // path would cross the stop twice more
                continue;
            };

            let (entrance_to_aperture, aperture_to_sensor) = match side {
                GhostSide::BeforeAperture => (
                    double_reflection(solver, 0, i, j, aperture, solver.entrance()),
                    system.aperture_to_sensor,
                ),
                GhostSide::AfterAperture => (
                    system.entrance_to_aperture,
                    double_reflection(solver, aperture, i, j, count, RayTransferMatrix::IDENTITY),
                ),
            };

            let transforms = solver.transforms();
            ghosts.push(Ghost {
                entrance_to_aperture,
                aperture_to_sensor,
                n1: transforms[i].n_after,
                n2: transforms[i + 1].n_after,
                reflection_pair: (i, j),
                side,
            });
        }
    }

    ghosts
}

/// Forward from `start` to surface `j`, reflect, back to surface `i`, reflect, forward to `end`.
fn double_reflection(
    solver: &RayTransferSolver,
    start: usize,
    i: usize,
    j: usize,
    end: usize,
    seed: RayTransferMatrix,
) -> RayTransferMatrix {
    let transforms = solver.transforms();

    let mut m = solver.propagate_forward(start..j, seed);
    m = transforms[j].reflection * m;
    m = solver.propagate_backward(i + 1..j, m);
    m = transforms[i].bounce_inverse() * m;
    solver.propagate_forward(i + 1..end, m)
}

/// Number of unordered pairs among `n` reflecting interfaces
#[inline]
pub fn pair_count(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}
