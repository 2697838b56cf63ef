//! Collaborators consulted by attack and technique queries.

use gradient_core::{Point, Terrain};

use crate::grid::GridState;

/// Opacity of every cell for line-of-sight checks: 1.0 for walls, 0.0
/// otherwise. Points outside the grid are fully opaque.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResistanceMap {
    width: i32,
    height: i32,
    values: Vec<f64>,
}

impl ResistanceMap {
    pub fn from_terrain(terrain: &Terrain) -> Self {
        Self {
            width: terrain.width(),
            height: terrain.height(),
            values: terrain
                .tiles()
                .iter()
                .map(|t| if t.is_wall() { 1.0 } else { 0.0 })
                .collect(),
        }
    }

    pub(crate) fn from_grid(grid: &GridState) -> Self {
        Self {
            width: grid.width,
            height: grid.height,
            values: (0..grid.len())
                .map(|i| if grid.is_wall(i) { 1.0 } else { 0.0 })
                .collect(),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn at(&self, p: Point) -> f64 {
        if p.within(self.width, self.height) {
            self.values[(p.y * self.width + p.x) as usize]
        } else {
            1.0
        }
    }

    #[inline]
    pub fn is_opaque(&self, p: Point) -> bool {
        self.at(p) >= 1.0
    }
}

/// Decides whether `to` can be seen or shot at from `from`.
pub trait LineOfSight {
    fn is_reachable(&self, resistance: &ResistanceMap, from: Point, to: Point) -> bool;
}

impl<F> LineOfSight for F
where
    F: Fn(&ResistanceMap, Point, Point) -> bool,
{
    fn is_reachable(&self, resistance: &ResistanceMap, from: Point, to: Point) -> bool {
        self(resistance, from, to)
    }
}

/// One way of aiming an area effect, and who it would hit.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectPlacement {
    pub aim: Point,
    /// Targets caught in the effect.
    pub affected: Vec<Point>,
}

/// An area effect that can be used from a range band of cells.
///
/// Technique queries call [`ideal_locations`](Self::ideal_locations) for
/// every candidate cell and keep the first placement it returns.
pub trait AreaEffect {
    /// Minimum distance from the user to a target, in cells.
    fn min_range(&self) -> f64;

    /// Maximum distance from the user to a target, in cells.
    fn max_range(&self) -> f64;

    /// Placements usable from `origin`, best first. An empty result means
    /// nothing worth hitting can be reached from there.
    fn ideal_locations(
        &self,
        origin: Point,
        targets: &[Point],
        allies: &[Point],
    ) -> Vec<EffectPlacement>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resistance_from_terrain() {
        let t = Terrain::from_rows(&[".#", ".."]).unwrap();
        let r = ResistanceMap::from_terrain(&t);
        assert_eq!(r.at(Point::new(0, 0)), 0.0);
        assert_eq!(r.at(Point::new(1, 0)), 1.0);
        assert!(r.is_opaque(Point::new(-1, 0)));
        assert!(r.is_opaque(Point::new(0, 2)));
        assert!(!r.is_opaque(Point::new(1, 1)));
    }

    #[test]
    fn closures_are_oracles() {
        let t = Terrain::from_rows(&["..."]).unwrap();
        let r = ResistanceMap::from_terrain(&t);
        let adjacent = |_: &ResistanceMap, a: Point, b: Point| a.chebyshev(b) <= 1;
        assert!(adjacent.is_reachable(&r, Point::new(0, 0), Point::new(1, 0)));
        assert!(!adjacent.is_reachable(&r, Point::new(0, 0), Point::new(2, 0)));
    }
}
