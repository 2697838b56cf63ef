use gradient_core::{Point, Range, Terrain};

use crate::field::{DARK, FLOOR, GOAL, WALL};
use crate::FieldSnapshot;

/// Per-grid buffers owned by an initialized [`DijkstraMap`](crate::DijkstraMap).
///
/// Everything is stored row-major, indexed by `y * width + x`.
#[derive(Debug, Clone)]
pub(crate) struct GridState {
    pub(crate) width: i32,
    pub(crate) height: i32,
    /// Terrain as field values: `WALL` or `FLOOR`.
    pub(crate) physical: Vec<f64>,
    pub(crate) field: Vec<f64>,
    pub(crate) costs: Vec<f64>,
    /// Whether every cost is exactly 1.0.
    pub(crate) standard_costs: bool,
    pub(crate) goals: Vec<usize>,
    pub(crate) target_map: Vec<Option<Point>>,
    pub(crate) frontier: Vec<usize>,
    pub(crate) next: Vec<usize>,
    pub(crate) mapped_count: usize,
}

impl GridState {
    pub(crate) fn new(terrain: &Terrain) -> Self {
        let physical: Vec<f64> = terrain
            .tiles()
            .iter()
            .map(|t| if t.is_wall() { WALL } else { FLOOR })
            .collect();
        let len = physical.len();
        Self {
            width: terrain.width(),
            height: terrain.height(),
            field: physical.clone(),
            physical,
            costs: vec![1.0; len],
            standard_costs: true,
            goals: Vec::new(),
            target_map: vec![None; len],
            frontier: Vec::new(),
            next: Vec::new(),
            mapped_count: 0,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.physical.len()
    }

    #[inline]
    pub(crate) fn bounds(&self) -> Range {
        Range::new(0, 0, self.width, self.height)
    }

    /// Convert a `Point` to a flat index. Returns `None` if out of range.
    #[inline]
    pub(crate) fn idx(&self, p: Point) -> Option<usize> {
        if !p.within(self.width, self.height) {
            return None;
        }
        Some((p.y * self.width + p.x) as usize)
    }

    /// Convert a flat index back to a `Point`.
    #[inline]
    pub(crate) fn point(&self, i: usize) -> Point {
        let w = self.width as usize;
        Point::new((i % w) as i32, (i / w) as i32)
    }

    /// In-bounds indices of `pts`, sorted and deduplicated so membership
    /// can be tested with a binary search.
    pub(crate) fn indices(&self, pts: &[Point]) -> Vec<usize> {
        let mut v: Vec<usize> = pts.iter().filter_map(|&p| self.idx(p)).collect();
        v.sort_unstable();
        v.dedup();
        v
    }

    #[inline]
    pub(crate) fn is_wall(&self, i: usize) -> bool {
        self.physical[i] > FLOOR
    }

    /// Mark an open cell as a goal. Walls and out-of-range points are
    /// ignored.
    pub(crate) fn set_goal(&mut self, p: Point) {
        let Some(i) = self.idx(p) else {
            return;
        };
        if self.is_wall(i) {
            return;
        }
        self.field[i] = GOAL;
        if !self.goals.contains(&i) {
            self.goals.push(i);
        }
    }

    pub(crate) fn set_goals(&mut self, pts: &[Point]) {
        for &p in pts {
            self.set_goal(p);
        }
    }

    /// Return goal cells to their terrain value and forget them.
    pub(crate) fn clear_goals(&mut self) {
        for &g in &self.goals {
            self.field[g] = self.physical[g];
        }
        self.goals.clear();
    }

    pub(crate) fn reset_map(&mut self) {
        self.field.copy_from_slice(&self.physical);
    }

    pub(crate) fn snapshot(&self) -> FieldSnapshot {
        FieldSnapshot::new(self.width, self.height, self.field.clone())
    }

    /// Turn every unreached open cell into `DARK`.
    pub(crate) fn darken(&mut self) {
        for v in self.field.iter_mut() {
            if *v == FLOOR {
                *v = DARK;
            }
        }
    }

    /// Whether an N×N mover whose minimum corner is `r` fits: every cell of
    /// the footprint is inside the grid, not a wall and not in `blocked`.
    pub(crate) fn footprint_usable(&self, r: Point, size: i32, blocked: &[usize]) -> bool {
        if !r.within(self.width - size + 1, self.height - size + 1) {
            return false;
        }
        Range::new(r.x, r.y, r.x + size, r.y + size).iter().all(|p| {
            let i = (p.y * self.width + p.x) as usize;
            !self.is_wall(i) && blocked.binary_search(&i).is_err()
        })
    }

    /// Whether a diagonal step from `from` to `to` squeezes between too many
    /// blocked corners. `blocked_at` decides what counts as blocked.
    #[inline]
    pub(crate) fn corner_blocked(
        &self,
        from: Point,
        to: Point,
        requirement: u8,
        blocked_at: impl Fn(usize) -> bool,
    ) -> bool {
        if requirement == 0 {
            return false;
        }
        let a = (from.y * self.width + to.x) as usize;
        let b = (to.y * self.width + from.x) as usize;
        (blocked_at(a) as u8) + (blocked_at(b) as u8) >= requirement
    }
}

/// Insert `i` into a sorted index list, keeping it sorted and unique.
pub(crate) fn insert_sorted(v: &mut Vec<usize>, i: usize) {
    if let Err(pos) = v.binary_search(&i) {
        v.insert(pos, i);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(rows: &[&str]) -> GridState {
        GridState::new(&Terrain::from_rows(rows).unwrap())
    }

    #[test]
    fn index_roundtrip() {
        let g = grid(&["....", "....", "...."]);
        for p in g.bounds() {
            let i = g.idx(p).unwrap();
            assert_eq!(g.point(i), p);
        }
        assert_eq!(g.idx(Point::new(4, 0)), None);
        assert_eq!(g.idx(Point::new(0, -1)), None);
    }

    #[test]
    fn goals_skip_walls() {
        let mut g = grid(&[".#."]);
        g.set_goals(&[Point::new(0, 0), Point::new(1, 0), Point::new(7, 7), Point::new(0, 0)]);
        assert_eq!(g.goals, vec![0]);
        assert_eq!(g.field, vec![GOAL, WALL, FLOOR]);
        g.clear_goals();
        assert_eq!(g.field, g.physical);
    }

    #[test]
    fn indices_are_sorted() {
        let g = grid(&["...", "..."]);
        let v = g.indices(&[Point::new(2, 1), Point::new(0, 0), Point::new(2, 1), Point::new(9, 9)]);
        assert_eq!(v, vec![0, 5]);
    }

    #[test]
    fn footprint() {
        let g = grid(&["...", "..#", "..."]);
        assert!(g.footprint_usable(Point::new(0, 0), 2, &[]));
        assert!(!g.footprint_usable(Point::new(1, 0), 2, &[]));
        assert!(!g.footprint_usable(Point::new(2, 2), 2, &[]));
        assert!(!g.footprint_usable(Point::new(0, 1), 2, &[3]));
    }

    #[test]
    fn sorted_insert() {
        let mut v = vec![1, 4, 9];
        insert_sorted(&mut v, 5);
        insert_sorted(&mut v, 4);
        insert_sorted(&mut v, 0);
        assert_eq!(v, vec![0, 1, 4, 5, 9]);
    }

    #[test]
    fn corners() {
        let g = grid(&[".#", "#."]);
        let walls = |i: usize| g.physical[i] > FLOOR;
        let (a, b) = (Point::new(0, 0), Point::new(1, 1));
        assert!(g.corner_blocked(a, b, 2, walls));
        assert!(g.corner_blocked(a, b, 1, walls));
        assert!(!g.corner_blocked(a, b, 0, walls));
    }
}
