use gradient_core::Point;
use rand::{Rng, RngExt};

use crate::extract::{Descent, Mode, Outcome, descend};
use crate::field::{FLOOR, GOAL};
use crate::grid::GridState;
use crate::scan::Scan;
use crate::{DijkstraMap, FieldNode, Metric, PathError};

impl GridState {
    /// Grow a field outward from `origin` alone, stopping once `limit`
    /// cells from the sorted `targets` list have been reached. Returns the
    /// reached targets in the order they were found.
    pub(crate) fn expand(
        &mut self,
        metric: Metric,
        blocking: u8,
        origin: usize,
        targets: &[usize],
        limit: usize,
    ) -> Vec<usize> {
        let mut found = Vec::new();
        self.field[origin] = GOAL;
        self.mapped_count = 1;
        self.frontier.clear();
        self.next.clear();
        if limit == 0 {
            return found;
        }
        self.frontier.push(origin);

        let dirs = metric.directions();
        'rounds: while !self.frontier.is_empty() {
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
                        && self.corner_blocked(cp, np, blocking, |i| self.field[i] > FLOOR)
                    {
                        continue;
                    }
                    let candidate = dist + metric.step_cost(dir) * self.costs[ni];
                    if self.field[ni] <= FLOOR && candidate < self.field[ni] {
                        self.field[ni] = candidate;
                        self.mapped_count += 1;
                        if targets.binary_search(&ni).is_ok() && !found.contains(&ni) {
                            found.push(ni);
                            if found.len() >= limit {
                                break 'rounds;
                            }
                        }
                        self.next.push(ni);
                    }
                }
            }
            std::mem::swap(&mut self.frontier, &mut self.next);
        }
        self.frontier.clear();
        self.next.clear();
        found
    }
}

/// An open cell to search from: `start` itself, or when it is a wall a
/// random open cell near it, clamped to the grid interior.
fn open_origin<R: Rng + ?Sized>(
    grid: &GridState,
    rng: &mut R,
    attempts: usize,
    start: Point,
) -> Option<usize> {
    let si = grid.idx(start)?;
    if !grid.is_wall(si) {
        return Some(si);
    }
    let (xs, ys) = (grid.width / 6, grid.height / 6);
    for _ in 0..attempts {
        let x = (start.x + rng.random_range(-xs..=xs)).max(1).min(grid.width - 2);
        let y = (start.y + rng.random_range(-ys..=ys)).max(1).min(grid.height - 2);
        if let Some(i) = grid.idx(Point::new(x, y)) {
            if !grid.is_wall(i) {
                return Some(i);
            }
        }
    }
    log::warn!("no open cell found near blocked start {}", start);
    None
}

impl<R: Rng> DijkstraMap<R> {
    /// The target closest to `start` by path distance.
    ///
    /// Returns `start` if it is itself a target. A `start` on a wall is moved
    /// to a random open cell nearby first; `None` if that fails or no target
    /// is reachable.
    pub fn find_nearest(
        &mut self,
        start: Point,
        targets: &[Point],
    ) -> Result<Option<Point>, PathError> {
        Ok(self.find_nearest_multiple(start, 1, targets)?.first().copied())
    }

    /// Up to `limit` targets, nearest first. A `start` that is a target
    /// counts as the first.
    pub fn find_nearest_multiple(
        &mut self,
        start: Point,
        limit: usize,
        targets: &[Point],
    ) -> Result<Vec<Point>, PathError> {
        let config = self.config;
        let DijkstraMap { grid, rng, .. } = self;
        let grid = grid.as_mut().ok_or(PathError::Uninitialized)?;

        let mut found = Vec::new();
        if limit == 0 || targets.is_empty() {
            return Ok(found);
        }
        if targets.contains(&start) {
            found.push(start);
            if found.len() >= limit {
                return Ok(found);
            }
        }
        grid.reset_map();
        let Some(origin) = open_origin(grid, rng, config.perturb_attempts, start) else {
            return Ok(found);
        };
        let wanted = grid.indices(targets);
        let hits = grid.expand(
            config.metric,
            config.blocking(),
            origin,
            &wanted,
            limit - found.len(),
        );
        found.extend(hits.into_iter().map(|i| grid.point(i)));
        Ok(found)
    }

    /// A path from `start` to its nearest target, found by growing the
    /// field from `start` instead of from the targets.
    ///
    /// The path excludes `start` and ends on the target.
    pub fn find_shortcut_path(
        &mut self,
        start: Point,
        targets: &[Point],
    ) -> Result<&[Point], PathError> {
        self.state()?;
        let Some(target) = self.find_nearest(start, targets)? else {
            return Ok(self.cut_short());
        };
        let config = self.config;
        let DijkstraMap { grid, rng, path, .. } = self;
        let grid = grid.as_mut().ok_or(PathError::Uninitialized)?;
        path.clear();
        if target == start {
            self.truncated = false;
            return Ok(&self.path);
        }

        let descent = Descent {
            metric: config.metric,
            blocking: config.blocking(),
            budget: f64::INFINITY,
            cap: config.iteration_cap,
            mode: Mode::Approach,
            blocked: &[],
            allies: &[],
        };
        let mut frustration = 0;
        let truncated = match descend(grid, rng, path, target, &descent, &mut frustration) {
            Outcome::Done { truncated } => truncated,
            Outcome::Retry(_) => true,
        };
        if truncated {
            path.clear();
        } else {
            // Drop the origin and walk the other way.
            path.pop();
            path.reverse();
            path.push(target);
        }
        self.truncated = truncated;
        Ok(&self.path)
    }

    /// Every cell within `radius` steps of any of `starts`, with its
    /// distance.
    pub fn flood_fill(
        &mut self,
        radius: usize,
        starts: &[Point],
    ) -> Result<Vec<FieldNode>, PathError> {
        let config = self.config;
        let grid = self.state_mut()?;
        grid.goals.clear();
        grid.reset_map();
        grid.set_goals(starts);
        if grid.goals.is_empty() || radius == 0 {
            let nodes = grid
                .goals
                .iter()
                .map(|&g| FieldNode {
                    pos: grid.point(g),
                    dist: GOAL,
                })
                .collect();
            grid.goals.clear();
            return Ok(nodes);
        }
        grid.relax(&Scan::new(&config, &[]).limit(Some(radius)));
        grid.goals.clear();
        grid.darken();
        Ok(grid.snapshot().reached().collect())
    }
}
