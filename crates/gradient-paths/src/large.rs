//! Queries for movers occupying a square of N×N cells.
//!
//! A large mover is identified by its minimum (top-left) corner. A corner
//! is usable when the whole square lies inside the grid on open,
//! unobstructed cells; the field is only computed over usable corners and
//! every usable corner whose square covers a goal is itself a goal.

use gradient_core::Point;
use rand::Rng;

use crate::scan::Scan;
use crate::traits::LineOfSight;
use crate::{DijkstraMap, FieldSnapshot, Movement, PathError};

impl<R: Rng> DijkstraMap<R> {
    /// [`scan`](Self::scan) for an N×N mover.
    pub fn scan_large(
        &mut self,
        size: i32,
        impassable: &[Point],
    ) -> Result<FieldSnapshot, PathError> {
        let config = self.config;
        let grid = self.state_mut()?;
        let blocked = grid.indices(impassable);
        grid.relax(&Scan::new(&config, &blocked).size(size));
        grid.darken();
        Ok(grid.snapshot())
    }

    /// [`partial_scan`](Self::partial_scan) for an N×N mover.
    pub fn partial_scan_large(
        &mut self,
        limit: usize,
        size: i32,
        impassable: &[Point],
    ) -> Result<FieldSnapshot, PathError> {
        let config = self.config;
        let grid = self.state_mut()?;
        let blocked = grid.indices(impassable);
        grid.relax(&Scan::new(&config, &blocked).limit(Some(limit)).size(size));
        grid.darken();
        Ok(grid.snapshot())
    }

    /// [`find_path`](Self::find_path) for an N×N mover whose minimum corner
    /// is at `start`. Path cells are corner positions.
    pub fn find_path_large(
        &mut self,
        mv: &Movement<'_>,
        size: i32,
        start: Point,
        targets: &[Point],
    ) -> Result<&[Point], PathError> {
        self.approach(mv, size, start, targets)
    }

    /// [`find_attack_path`](Self::find_attack_path) for an N×N mover. A
    /// position qualifies when any cell of the square sees a target.
    #[allow(clippy::too_many_arguments)]
    pub fn find_attack_path_large(
        &mut self,
        mv: &Movement<'_>,
        size: i32,
        min_range: f64,
        max_range: f64,
        los: Option<&dyn LineOfSight>,
        start: Point,
        targets: &[Point],
    ) -> Result<&[Point], PathError> {
        self.attack(mv, size, min_range, max_range, los, start, targets)
    }

    /// [`find_flee_path`](Self::find_flee_path) for an N×N mover.
    pub fn find_flee_path_large(
        &mut self,
        mv: &Movement<'_>,
        size: i32,
        prefer: f64,
        start: Point,
        fears: &[Point],
    ) -> Result<&[Point], PathError> {
        self.flee(mv, size, prefer, start, fears)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ResistanceMap;
    use crate::{DARK, DijkstraConfig, WALL};
    use gradient_core::Terrain;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn map(rows: &[&str]) -> DijkstraMap<SmallRng> {
        let mut m = DijkstraMap::with_config(SmallRng::seed_from_u64(13), DijkstraConfig::default());
        m.initialize(&Terrain::from_rows(rows).unwrap());
        m
    }

    #[test]
    fn only_usable_corners_are_reached() {
        let mut m = map(&["....", "....", "..#."]);
        m.set_goal(Point::new(0, 0)).unwrap();
        let f = m.scan_large(2, &[]).unwrap();
        assert_eq!(f.get(Point::new(0, 0)), Some(0.0));
        assert_eq!(f.get(Point::new(1, 0)), Some(1.0));
        assert_eq!(f.get(Point::new(2, 0)), Some(2.0));
        assert_eq!(f.get(Point::new(0, 1)), Some(1.0));
        // The square at (1,1) would cover the wall.
        assert_eq!(f.get(Point::new(1, 1)), Some(DARK));
        // Squares hanging off the edge.
        assert_eq!(f.get(Point::new(3, 0)), Some(DARK));
        assert_eq!(f.get(Point::new(0, 2)), Some(DARK));
        assert_eq!(f.get(Point::new(2, 2)), Some(WALL));
    }

    #[test]
    fn goals_cover_every_overlapping_corner() {
        let mut m = map(&["....", "....", "...."]);
        m.set_goal(Point::new(2, 1)).unwrap();
        let f = m.scan_large(2, &[]).unwrap();
        for p in [Point::new(1, 0), Point::new(2, 0), Point::new(1, 1), Point::new(2, 1)] {
            assert_eq!(f.get(p), Some(0.0), "at {p}");
        }
        assert_eq!(f.get(Point::new(0, 0)), Some(1.0));
    }

    #[test]
    fn impassable_cells_shrink_the_usable_area() {
        let mut m = map(&["....", "....", "...."]);
        m.set_goal(Point::new(0, 0)).unwrap();
        let f = m.scan_large(2, &[Point::new(2, 1)]).unwrap();
        assert_eq!(f.get(Point::new(0, 1)), Some(1.0));
        assert_eq!(f.get(Point::new(1, 0)), Some(DARK));
        assert_eq!(f.get(Point::new(2, 0)), Some(DARK));
    }

    #[test]
    fn partial_large_scan() {
        let mut m = map(&[".....", ".....", "....."]);
        m.set_goal(Point::new(0, 0)).unwrap();
        let f = m.partial_scan_large(1, 2, &[]).unwrap();
        assert_eq!(f.get(Point::new(1, 0)), Some(1.0));
        assert_eq!(f.get(Point::new(0, 1)), Some(1.0));
        assert_eq!(f.get(Point::new(2, 0)), Some(DARK));
    }

    #[test]
    fn large_mover_keeps_to_wide_passages() {
        let mut m = map(&["......", "......", "###...", "###..."]);
        let path = m
            .find_path_large(&Movement::new(10.0), 2, Point::new(0, 0), &[Point::new(4, 2)])
            .unwrap();
        assert_eq!(
            path,
            &[Point::new(1, 0), Point::new(2, 0), Point::new(3, 0), Point::new(3, 1)]
        );
        assert!(!m.is_truncated());
    }

    #[test]
    fn large_flee() {
        let mut m = map(&["..........", ".........."]);
        let path = m
            .find_flee_path_large(&Movement::new(3.0), 2, 1.2, Point::new(3, 0), &[Point::new(2, 0)])
            .unwrap();
        assert_eq!(path, &[Point::new(4, 0), Point::new(5, 0), Point::new(6, 0)]);
    }

    #[test]
    fn large_attack_sees_from_any_cell() {
        let mut m = map(&["........", "........"]);
        let same_row = |_: &ResistanceMap, a: Point, b: Point| a.y == b.y;
        let path = m
            .find_attack_path_large(
                &Movement::new(10.0),
                2,
                2.0,
                3.0,
                Some(&same_row),
                Point::new(0, 0),
                &[Point::new(7, 1)],
            )
            .unwrap();
        assert_eq!(path, &[Point::new(1, 0), Point::new(2, 0), Point::new(3, 0)]);
        assert!(!m.is_truncated());
    }
}
