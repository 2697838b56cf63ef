use gradient_core::{Point, Range};
use rand::Rng;

use crate::field::{FLOOR, GOAL, SEED_CEILING, WALL};
use crate::grid::GridState;
use crate::{DijkstraConfig, DijkstraMap, FieldSnapshot, Metric, PathError};

/// Parameters of one relaxation pass.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Scan<'a> {
    pub(crate) metric: Metric,
    pub(crate) blocking: u8,
    /// Sorted indices treated as walls for this pass.
    pub(crate) impassable: &'a [usize],
    /// Stop as soon as this cell is assigned (standard costs only). With a
    /// limit, also restricts seeding to the window around it.
    pub(crate) start: Option<usize>,
    /// Maximum number of rounds.
    pub(crate) limit: Option<usize>,
    /// Footprint edge length of the mover.
    pub(crate) size: i32,
    /// Spread each goal to every usable corner whose footprint covers it.
    /// Off when the goals already are corner positions.
    pub(crate) thicken: bool,
}

impl<'a> Scan<'a> {
    pub(crate) fn new(config: &DijkstraConfig, impassable: &'a [usize]) -> Self {
        Self {
            metric: config.metric,
            blocking: config.blocking(),
            impassable,
            start: None,
            limit: None,
            size: 1,
            thicken: true,
        }
    }

    pub(crate) fn metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    pub(crate) fn toward(mut self, start: Option<usize>) -> Self {
        self.start = start;
        self
    }

    pub(crate) fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub(crate) fn size(mut self, size: i32) -> Self {
        self.size = size.max(1);
        self
    }

    pub(crate) fn thicken(mut self, thicken: bool) -> Self {
        self.thicken = thicken;
        self
    }
}

impl GridState {
    /// Run the wavefront relaxation over the working field.
    ///
    /// Goals are marked 0 and every cell holding the lowest open value seeds
    /// the frontier. Each round visits the frontier newest first, reading
    /// values live, and lowers any open neighbour that can be reached more
    /// cheaply. Cells never reached keep `FLOOR`.
    pub(crate) fn relax(&mut self, scan: &Scan<'_>) {
        if scan.limit == Some(0) {
            return;
        }

        // Cells walled off for the duration of this pass.
        let masked: Vec<usize> = if scan.size > 1 {
            (0..self.len())
                .filter(|&i| {
                    !self.is_wall(i)
                        && !self.footprint_usable(self.point(i), scan.size, scan.impassable)
                })
                .collect()
        } else {
            scan.impassable.to_vec()
        };
        for &i in &masked {
            self.field[i] = WALL;
        }

        self.mapped_count = 0;
        if scan.size > 1 && scan.thicken {
            // Every usable corner whose footprint covers a goal is a goal.
            let n = scan.size;
            for gi in 0..self.goals.len() {
                let g = self.point(self.goals[gi]);
                for r in Range::new(g.x - n + 1, g.y - n + 1, g.x + 1, g.y + 1) {
                    if !self.footprint_usable(r, n, scan.impassable) {
                        continue;
                    }
                    if let Some(ri) = self.idx(r) {
                        self.field[ri] = GOAL;
                        self.mapped_count += 1;
                    }
                }
            }
        } else {
            for gi in 0..self.goals.len() {
                let g = self.goals[gi];
                self.field[g] = GOAL;
            }
            self.mapped_count = self.goals.len();
        }

        let window = match (scan.limit, scan.start) {
            (Some(l), Some(s)) => {
                let radius = l.min(self.width.max(self.height) as usize) as i32;
                Range::around(self.point(s), radius).intersect(self.bounds())
            }
            _ => self.bounds(),
        };
        self.seed(window);

        let dirs = scan.metric.directions();
        let mut rounds = 0usize;
        let mut early_exit = false;
        'rounds: while !self.frontier.is_empty() {
            if scan.limit.is_some_and(|l| rounds >= l) {
                break;
            }
            rounds += 1;
            self.next.clear();
            while let Some(c) = self.frontier.pop() {
                let cp = self.point(c);
                let dist = self.field[c];
                for &dir in dirs {
                    let np = cp.step(dir);
                    let Some(ni) = self.idx(np) else {
                        continue;
                    };
                    if dir.is_diagonal()
                        && self.corner_blocked(cp, np, scan.blocking, |i| self.field[i] > FLOOR)
                    {
                        continue;
                    }
                    let candidate = dist + scan.metric.step_cost(dir) * self.costs[ni];
                    if self.field[ni] <= FLOOR && candidate < self.field[ni] {
                        self.field[ni] = candidate;
                        self.next.push(ni);
                        self.mapped_count += 1;
                        if self.standard_costs && scan.start == Some(ni) {
                            early_exit = true;
                            break 'rounds;
                        }
                    }
                }
            }
            std::mem::swap(&mut self.frontier, &mut self.next);
        }
        self.frontier.clear();
        self.next.clear();

        // Goals stay goals even when listed as impassable.
        for &i in &masked {
            if self.field[i] == WALL {
                self.field[i] = self.physical[i];
            }
        }

        log::debug!(
            "scan: {} rounds, {} cells mapped, early exit: {}",
            rounds,
            self.mapped_count,
            early_exit
        );
    }

    /// Seed the frontier with every cell in `window` holding the lowest open
    /// value below the seeding ceiling.
    fn seed(&mut self, window: Range) {
        self.frontier.clear();
        let mut lowest = SEED_CEILING;
        for p in window {
            let i = (p.y * self.width + p.x) as usize;
            let v = self.field[i];
            if v > FLOOR {
                continue;
            }
            if v < lowest {
                lowest = v;
                self.frontier.clear();
                self.frontier.push(i);
            } else if v == lowest {
                self.frontier.push(i);
            }
        }
    }
}

impl<R: Rng> DijkstraMap<R> {
    /// Compute the full field from the current goals.
    ///
    /// Goals end at 0, walls at `WALL`, reached cells at their distance and
    /// unreachable open cells at `DARK`.
    pub fn scan(&mut self, impassable: &[Point]) -> Result<FieldSnapshot, PathError> {
        let config = self.config;
        let grid = self.state_mut()?;
        let blocked = grid.indices(impassable);
        grid.relax(&Scan::new(&config, &blocked));
        grid.darken();
        Ok(grid.snapshot())
    }

    /// Compute the field only until `start` is reached.
    ///
    /// With non-standard costs the scan runs to completion. Cells left
    /// unvisited keep the `FLOOR` value.
    pub fn scan_toward(&mut self, start: Point, impassable: &[Point]) -> Result<(), PathError> {
        let config = self.config;
        let grid = self.state_mut()?;
        let blocked = grid.indices(impassable);
        let start = grid.idx(start);
        grid.relax(&Scan::new(&config, &blocked).toward(start));
        Ok(())
    }

    /// Compute the field out to at most `limit` steps from the goals. A
    /// limit of 0 leaves the field untouched apart from darkening.
    pub fn partial_scan(
        &mut self,
        limit: usize,
        impassable: &[Point],
    ) -> Result<FieldSnapshot, PathError> {
        let config = self.config;
        let grid = self.state_mut()?;
        let blocked = grid.indices(impassable);
        grid.relax(&Scan::new(&config, &blocked).limit(Some(limit)));
        grid.darken();
        Ok(grid.snapshot())
    }

    /// Bounded scan seeded only from the window of `limit` cells around
    /// `start`, stopping once `start` is reached.
    pub fn partial_scan_toward(
        &mut self,
        start: Point,
        limit: usize,
        impassable: &[Point],
    ) -> Result<(), PathError> {
        let config = self.config;
        let grid = self.state_mut()?;
        let blocked = grid.indices(impassable);
        let start = grid.idx(start);
        grid.relax(&Scan::new(&config, &blocked).toward(start).limit(Some(limit)));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CellState, DARK, WALL};
    use gradient_core::Terrain;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn map(rows: &[&str], metric: Metric) -> DijkstraMap<SmallRng> {
        let config = DijkstraConfig::default().with_metric(metric);
        let mut m = DijkstraMap::with_config(SmallRng::seed_from_u64(3), config);
        m.initialize(&Terrain::from_rows(rows).unwrap());
        m
    }

    #[test]
    fn manhattan_distances() {
        let mut m = map(&["....", "....", "...."], Metric::Manhattan);
        m.set_goal(Point::new(0, 0)).unwrap();
        let f = m.scan(&[]).unwrap();
        for p in f.bounds() {
            assert_eq!(f.get(p), Some((p.x + p.y) as f64), "at {p}");
        }
        assert_eq!(m.mapped_count(), 12);
    }

    #[test]
    fn chebyshev_and_euclidean() {
        let mut m = map(&["...", "...", "..."], Metric::Chebyshev);
        m.set_goal(Point::new(0, 0)).unwrap();
        let f = m.scan(&[]).unwrap();
        assert_eq!(f.get(Point::new(2, 2)), Some(2.0));

        m.set_metric(Metric::Euclidean);
        m.reset_map().unwrap();
        let f = m.scan(&[]).unwrap();
        let d = f.get(Point::new(2, 2)).unwrap();
        assert!((d - 2.0 * std::f64::consts::SQRT_2).abs() < 1e-9);
        let d = f.get(Point::new(2, 1)).unwrap();
        assert!((d - (1.0 + std::f64::consts::SQRT_2)).abs() < 1e-9);
    }

    #[test]
    fn goals_zero_walls_wall_unreachable_dark() {
        let mut m = map(&["..#..", "..#..", "..#.."], Metric::Chebyshev);
        m.set_goals(&[Point::new(0, 0), Point::new(1, 2)]).unwrap();
        let f = m.scan(&[]).unwrap();
        assert_eq!(f.get(Point::new(0, 0)), Some(0.0));
        assert_eq!(f.get(Point::new(1, 2)), Some(0.0));
        for y in 0..3 {
            assert_eq!(f.state(Point::new(2, y)), Some(CellState::Wall));
            assert_eq!(f.state(Point::new(3, y)), Some(CellState::Dark));
            assert_eq!(f.get(Point::new(4, y)), Some(DARK));
        }
    }

    #[test]
    fn impassable_is_restored() {
        let mut m = map(&["....."], Metric::Manhattan);
        m.set_goal(Point::new(0, 0)).unwrap();
        let f = m.scan(&[Point::new(2, 0)]).unwrap();
        assert_eq!(f.get(Point::new(1, 0)), Some(1.0));
        // Restored to floor, then never reached.
        assert_eq!(f.get(Point::new(2, 0)), Some(DARK));
        assert_eq!(f.get(Point::new(4, 0)), Some(DARK));
    }

    #[test]
    fn impassable_goal_stays_goal() {
        let mut m = map(&["..."], Metric::Manhattan);
        m.set_goal(Point::new(0, 0)).unwrap();
        let f = m.scan(&[Point::new(0, 0)]).unwrap();
        assert_eq!(f.get(Point::new(0, 0)), Some(0.0));
        assert_eq!(f.get(Point::new(2, 0)), Some(2.0));
    }

    #[test]
    fn diagonal_blocking() {
        let mut m = map(&[".#", "#."], Metric::Chebyshev);
        m.set_goal(Point::new(0, 0)).unwrap();
        let f = m.scan(&[]).unwrap();
        assert_eq!(f.get(Point::new(1, 1)), Some(DARK));

        m.set_blocking_requirement(1);
        m.reset_map().unwrap();
        let f = m.scan(&[]).unwrap();
        assert_eq!(f.get(Point::new(1, 1)), Some(DARK));

        m.set_blocking_requirement(0);
        m.reset_map().unwrap();
        let f = m.scan(&[]).unwrap();
        assert_eq!(f.get(Point::new(1, 1)), Some(1.0));
        assert_eq!(f.get(Point::new(1, 0)), Some(WALL));
    }

    #[test]
    fn single_flank_blocks_only_at_requirement_one() {
        let mut m = map(&[".#", ".."], Metric::Chebyshev);
        m.set_goal(Point::new(0, 0)).unwrap();
        let f = m.scan(&[]).unwrap();
        assert_eq!(f.get(Point::new(1, 1)), Some(1.0));

        m.set_blocking_requirement(1);
        m.reset_map().unwrap();
        let f = m.scan(&[]).unwrap();
        assert_eq!(f.get(Point::new(1, 1)), Some(2.0));
    }

    #[test]
    fn costs_multiply_steps() {
        let mut m = map(&["...."], Metric::Manhattan);
        m.set_cost(Point::new(2, 0), 4.0).unwrap();
        m.set_goal(Point::new(0, 0)).unwrap();
        let f = m.scan(&[]).unwrap();
        assert_eq!(f.values(), &[0.0, 1.0, 5.0, 6.0]);
    }

    #[test]
    fn cheaper_detour_wins() {
        let mut m = map(&["...", "...", "..."], Metric::Manhattan);
        m.set_cost(Point::new(1, 0), 10.0).unwrap();
        m.set_goal(Point::new(0, 0)).unwrap();
        let f = m.scan(&[]).unwrap();
        // Around through (0,1), (1,1).
        assert_eq!(f.get(Point::new(2, 0)), Some(4.0));
        assert_eq!(f.get(Point::new(1, 0)), Some(10.0));
    }

    #[test]
    fn scan_toward_stops_early() {
        let mut m = map(&["........."], Metric::Manhattan);
        m.set_goal(Point::new(0, 0)).unwrap();
        m.scan_toward(Point::new(3, 0), &[]).unwrap();
        let f = m.field().unwrap();
        assert_eq!(f.get(Point::new(3, 0)), Some(3.0));
        assert_eq!(f.state(Point::new(6, 0)), Some(CellState::Unscanned));
    }

    #[test]
    fn scan_toward_runs_to_completion_with_costs() {
        let mut m = map(&["........."], Metric::Manhattan);
        m.set_cost(Point::new(8, 0), 2.0).unwrap();
        m.set_goal(Point::new(0, 0)).unwrap();
        m.scan_toward(Point::new(3, 0), &[]).unwrap();
        let f = m.field().unwrap();
        assert_eq!(f.get(Point::new(3, 0)), Some(3.0));
        assert_eq!(f.get(Point::new(6, 0)), Some(6.0));
        assert_eq!(f.get(Point::new(8, 0)), Some(9.0));
    }

    #[test]
    fn partial_scan_limits_rounds() {
        let mut m = map(&["........."], Metric::Manhattan);
        m.set_goal(Point::new(0, 0)).unwrap();
        let f = m.partial_scan(3, &[]).unwrap();
        assert_eq!(f.get(Point::new(3, 0)), Some(3.0));
        assert_eq!(f.get(Point::new(4, 0)), Some(DARK));
    }

    #[test]
    fn partial_scan_zero_is_noop() {
        let mut m = map(&["..."], Metric::Manhattan);
        m.set_goal(Point::new(0, 0)).unwrap();
        let f = m.partial_scan(0, &[]).unwrap();
        assert_eq!(f.get(Point::new(0, 0)), Some(0.0));
        assert_eq!(f.get(Point::new(1, 0)), Some(DARK));
    }

    #[test]
    fn partial_scan_toward_windows_seeds() {
        let mut m = map(&["..........."], Metric::Manhattan);
        m.set_goals(&[Point::new(0, 0), Point::new(10, 0)]).unwrap();
        m.partial_scan_toward(Point::new(8, 0), 2, &[]).unwrap();
        let f = m.field().unwrap();
        // Only the goal at x=10 lies within two cells of the start.
        assert_eq!(f.get(Point::new(8, 0)), Some(2.0));
        assert_eq!(f.state(Point::new(1, 0)), Some(CellState::Unscanned));
    }

    #[test]
    fn scan_requires_initialization() {
        let mut m: DijkstraMap<SmallRng> = DijkstraMap::new(SmallRng::seed_from_u64(0));
        assert_eq!(m.scan(&[]).unwrap_err(), PathError::Uninitialized);
        assert_eq!(m.partial_scan(3, &[]).unwrap_err(), PathError::Uninitialized);
    }

    #[test]
    fn monotone_along_neighbours() {
        let mut m = map(&["......", ".##...", "...#..", "......"], Metric::Chebyshev);
        m.set_goal(Point::new(5, 3)).unwrap();
        let f = m.scan(&[]).unwrap();
        // Every reached non-goal cell has a neighbour exactly one step lower.
        for p in f.bounds() {
            let v = f.get(p).unwrap();
            if v >= FLOOR || v == 0.0 {
                continue;
            }
            let lower = Metric::Chebyshev
                .directions()
                .iter()
                .filter_map(|&d| f.get(p.step(d)))
                .any(|n| (v - n - 1.0).abs() < 1e-9);
            assert!(lower, "no descent from {p}");
        }
    }
}
