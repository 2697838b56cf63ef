//! Line of sight along Bresenham lines.

use gradient_core::Point;
use gradient_paths::{LineOfSight, ResistanceMap};

/// Cells on the Bresenham line from `from` to `to`, both ends included.
pub fn bresenham(from: Point, to: Point) -> Vec<Point> {
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let mut err = dx + dy;
    let mut p = from;
    let mut line = Vec::with_capacity(dx.max(-dy) as usize + 1);
    loop {
        line.push(p);
        if p == to {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            p.x += sx;
        }
        if e2 <= dx {
            err += dx;
            p.y += sy;
        }
    }
    line
}

/// Sees `to` from `from` when the resistance of the cells strictly between
/// them adds up to less than 1. The endpoints never block, so a wall can be
/// seen but not seen through.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BresenhamLos {
    /// Longest visible distance in cells (8-way), if any.
    pub max_distance: Option<i32>,
}

impl BresenhamLos {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_distance(max_distance: i32) -> Self {
        Self {
            max_distance: Some(max_distance),
        }
    }
}

impl LineOfSight for BresenhamLos {
    fn is_reachable(&self, resistance: &ResistanceMap, from: Point, to: Point) -> bool {
        if self.max_distance.is_some_and(|d| from.chebyshev(to) > d) {
            return false;
        }
        let line = bresenham(from, to);
        if line.len() <= 2 {
            return true;
        }
        line[1..line.len() - 1]
            .iter()
            .map(|&p| resistance.at(p))
            .sum::<f64>()
            < 1.0
    }
}
