use std::cmp::Ordering;

use log::{trace, warn};
use munkres::{solve_assignment, WeightMatrix};
use ndarray::Array2;
use serde_derive::{Deserialize, Serialize};

use crate::{math, Centroid};

/// Strategy matching live identities (rows) to new centroids (columns)
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Assignment {
    /// Closest pairs first, not globally optimal
    #[default]
    Greedy,

    /// Minimum total distance
    Hungarian,
}

/// `D[i][j]` is the distance between `objs[i]` and `dets[j]`
pub fn distance_matrix(objs: &[Centroid], dets: &[Centroid]) -> Array2<f32> {
    Array2::from_shape_fn((objs.len(), dets.len()), |(r, c)| {
        math::distance(&objs[r], &dets[c])
    })
}

#[inline(always)]
fn within(dist: f32, max_distance: f32) -> bool {
    max_distance > 0.0 && dist <= max_distance
}

impl Assignment {
    /// Returns matched `(row, column)` pairs; every pair is within `max_distance`
    /// and no row or column appears twice.
    pub fn solve(&self, dist: &Array2<f32>, max_distance: f32) -> Vec<(usize, usize)> {
        let (rows, cols) = dist.dim();
        if rows == 0 || cols == 0 {
            return Vec::new();
        }

        match self {
            Assignment::Greedy => greedy(dist, max_distance),
            Assignment::Hungarian => or_greedy(hungarian(dist, max_distance), dist, max_distance),
        }
    }
}

/// Solver result, or the greedy matching when the solver gave up
fn or_greedy(
    solved: Option<Vec<(usize, usize)>>,
    dist: &Array2<f32>,
    max_distance: f32,
) -> Vec<(usize, usize)> {
    solved.unwrap_or_else(|| {
        warn!("assignment could not be solved, falling back to greedy");
        greedy(dist, max_distance)
    })
}

fn greedy(dist: &Array2<f32>, max_distance: f32) -> Vec<(usize, usize)> {
    let (rows, cols) = dist.dim();

    let row_min: Vec<f32> = dist
        .rows()
        .into_iter()
        .map(|row| row.iter().copied().fold(f32::INFINITY, f32::min))
        .collect();

    // stable sort keeps registry order between equally close rows
    let mut order: Vec<usize> = (0..rows).collect();
    order.sort_by(|&a, &b| {
        row_min[a]
            .partial_cmp(&row_min[b])
            .unwrap_or(Ordering::Equal)
    });

    let mut used_cols = vec![false; cols];
    let mut matches = Vec::with_capacity(rows.min(cols));

    for row in order {
        let mut best: Option<(usize, f32)> = None;

        for (col, used) in used_cols.iter().enumerate() {
            if *used {
                continue;
            }

            let d = dist[(row, col)];
            if best.map_or(true, |(_, bd)| d < bd) {
                best = Some((col, d));
            }
        }

        match best {
            Some((col, d)) if within(d, max_distance) => {
                trace!("greedy match: row {} -> col {} ({:.1}px)", row, col, d);
                used_cols[col] = true;
                matches.push((row, col));
            }
            _ => {}
        }
    }

    matches
}

fn hungarian(dist: &Array2<f32>, max_distance: f32) -> Option<Vec<(usize, usize)>> {
    let (rows, cols) = dist.dim();
    let n = rows.max(cols);
    let pad = dist.iter().copied().fold(0.0f32, f32::max) + 1.0;

    let mut mat = WeightMatrix::from_fn(n, |(r, c)| {
        if r < rows && c < cols {
            dist[(r, c)]
        } else {
            pad
        }
    });

    let positions = solve_assignment(&mut mat).ok()?;

    Some(
        positions
            .into_iter()
            .filter(|p| p.row < rows && p.column < cols)
            .filter(|p| within(dist[(p.row, p.column)], max_distance))
            .map(|p| {
                trace!("hungarian match: row {} -> col {}", p.row, p.column);
                (p.row, p.column)
            })
            .collect(),
    )
}
