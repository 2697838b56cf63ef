use gradient_core::{Direction, Point};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::field::GOAL;
use crate::grid::{GridState, insert_sorted};
use crate::scan::Scan;
use crate::{DijkstraMap, Metric, Movement, PathError};

/// How a descent reacts when it reaches a goal or stops improving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    /// Stop on a goal; stalling is a truncation.
    Approach,
    /// No goal; stalling after the first step is success.
    Flee,
    /// Stalling is success, or a retry when stuck on an ally.
    Technique,
}

/// Parameters of one greedy walk down the field.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Descent<'a> {
    pub(crate) metric: Metric,
    pub(crate) blocking: u8,
    pub(crate) budget: f64,
    pub(crate) cap: usize,
    pub(crate) mode: Mode,
    /// Sorted indices that may not be entered.
    pub(crate) blocked: &'a [usize],
    /// Sorted indices that may be crossed but not stopped on.
    pub(crate) allies: &'a [usize],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Done { truncated: bool },
    /// The walk ended on this ally cell; rerun with it blocked.
    Retry(usize),
}

/// Walk from `start` to strictly lower neighbours until the budget is spent,
/// a goal is reached or nothing improves. Steps are written to `path`.
///
/// `frustration` counts steps across retries of the same query; passing the
/// cap clears the path and truncates.
pub(crate) fn descend<R: Rng + ?Sized>(
    grid: &GridState,
    rng: &mut R,
    path: &mut Vec<Point>,
    start: Point,
    d: &Descent<'_>,
    frustration: &mut usize,
) -> Outcome {
    path.clear();
    let Some(mut ci) = grid.idx(start) else {
        return Outcome::Done { truncated: true };
    };
    let mut cur = start;
    let mut paid = 0.0;
    let dirs = d.metric.directions();
    let is_blocked = |i: usize| d.blocked.binary_search(&i).is_ok();

    loop {
        if *frustration > d.cap {
            log::warn!(
                "path from {} abandoned after {} steps",
                start,
                *frustration
            );
            path.clear();
            return Outcome::Done { truncated: true };
        }
        let here = grid.field[ci];
        if d.mode == Mode::Approach && here == GOAL {
            return Outcome::Done { truncated: false };
        }

        let mut order = [Direction::Up; 8];
        let order = &mut order[..dirs.len()];
        order.copy_from_slice(dirs);
        order.shuffle(rng);

        let mut best = here;
        let mut choice = None;
        for &dir in order.iter() {
            let np = cur.step(dir);
            let Some(ni) = grid.idx(np) else {
                continue;
            };
            let v = grid.field[ni];
            if v >= best || is_blocked(ni) || path.contains(&np) {
                continue;
            }
            if dir.is_diagonal()
                && grid.corner_blocked(cur, np, d.blocking, |i| {
                    grid.is_wall(i) || is_blocked(i)
                })
            {
                continue;
            }
            best = v;
            choice = Some((np, ni));
        }

        let Some((np, ni)) = choice else {
            return match d.mode {
                Mode::Approach => Outcome::Done { truncated: true },
                Mode::Flee => Outcome::Done {
                    truncated: path.is_empty(),
                },
                Mode::Technique => {
                    if d.allies.binary_search(&ci).is_ok() {
                        Outcome::Retry(ci)
                    } else {
                        Outcome::Done { truncated: false }
                    }
                }
            };
        };
        if grid.is_wall(ni) {
            return Outcome::Done { truncated: true };
        }

        cur = np;
        ci = ni;
        path.push(cur);
        paid += grid.costs[ci];
        *frustration += 1;
        if paid > d.budget - 1.0 {
            if d.allies.binary_search(&ci).is_ok() {
                return Outcome::Retry(ci);
            }
            return Outcome::Done { truncated: false };
        }
    }
}

impl<R: Rng> DijkstraMap<R> {
    /// Find a path of at most `mv.budget` entry cost from `start` toward the
    /// nearest of `targets`.
    ///
    /// The returned path excludes `start`. It is empty and truncated when no
    /// target is reachable.
    pub fn find_path(
        &mut self,
        mv: &Movement<'_>,
        start: Point,
        targets: &[Point],
    ) -> Result<&[Point], PathError> {
        self.approach(mv, 1, start, targets)
    }

    /// Approach `targets` with an N×N mover whose minimum corner is at
    /// `start`.
    pub(crate) fn approach(
        &mut self,
        mv: &Movement<'_>,
        size: i32,
        start: Point,
        targets: &[Point],
    ) -> Result<&[Point], PathError> {
        self.state()?;
        if mv.budget <= 0.0 {
            return Ok(self.cut_short());
        }
        let config = self.config;
        let DijkstraMap { grid, rng, path, .. } = self;
        let grid = grid.as_mut().ok_or(PathError::Uninitialized)?;

        let mut blocked = mv.blocked(grid);
        let allies = grid.indices(mv.allies);
        let start_idx = grid.idx(start);
        let mut frustration = 0;
        let truncated = loop {
            grid.goals.clear();
            grid.reset_map();
            grid.set_goals(targets);
            if grid.goals.is_empty() {
                path.clear();
                break true;
            }
            let scan = Scan::new(&config, &blocked)
                .toward(start_idx)
                .limit(mv.partial_limit())
                .size(size);
            grid.relax(&scan);

            let descent = Descent {
                metric: config.metric,
                blocking: config.blocking(),
                budget: mv.budget,
                cap: config.iteration_cap,
                mode: Mode::Approach,
                blocked: &blocked,
                allies: &allies,
            };
            match descend(grid, rng, path, start, &descent, &mut frustration) {
                Outcome::Done { truncated } => break truncated,
                Outcome::Retry(cell) => insert_sorted(&mut blocked, cell),
            }
        };
        grid.goals.clear();
        self.truncated = truncated;
        Ok(&self.path)
    }

    /// Walk the current field from `target` down to a goal set and scanned
    /// by the caller, ignoring budget.
    ///
    /// The path runs from the cell after the goal to `target`; the goal
    /// itself is excluded. It is empty when `target` is a goal.
    pub fn find_path_prescanned(&mut self, target: Point) -> Result<&[Point], PathError> {
        let config = self.config;
        let DijkstraMap { grid, rng, path, .. } = self;
        let grid = grid.as_mut().ok_or(PathError::Uninitialized)?;

        let descent = Descent {
            metric: config.metric,
            blocking: config.blocking(),
            budget: f64::INFINITY,
            cap: config.prescanned_cap,
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
        } else if let Some(ti) = grid.idx(target).filter(|&i| grid.field[i] != GOAL) {
            path.pop();
            path.reverse();
            path.push(grid.point(ti));
        }
        self.truncated = truncated;
        Ok(&self.path)
    }
}
