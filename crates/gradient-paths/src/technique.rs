use gradient_core::Point;
use rand::Rng;

use crate::attack::in_view;
use crate::extract::{Descent, Mode, Outcome, descend};
use crate::field::{FLOOR, GOAL, WALL};
use crate::grid::insert_sorted;
use crate::scan::Scan;
use crate::traits::{AreaEffect, LineOfSight, ResistanceMap};
use crate::{DijkstraMap, Movement, PathError};

impl<R: Rng> DijkstraMap<R> {
    /// Find a path toward the cell from which `effect` hits the most
    /// `targets`.
    ///
    /// Candidate cells lie within twice the budget of `start`, inside the
    /// effect's range band of some target and in view of it. When a cell
    /// that hits the most targets can be reached this turn, only such cells
    /// are considered. The aim point chosen for each candidate is readable
    /// through [`target_at`](Self::target_at) until the next technique
    /// query.
    pub fn find_technique_path(
        &mut self,
        mv: &Movement<'_>,
        effect: &dyn AreaEffect,
        los: Option<&dyn LineOfSight>,
        start: Point,
        targets: &[Point],
    ) -> Result<&[Point], PathError> {
        self.state()?;
        if mv.budget <= 0.0 || targets.is_empty() {
            return Ok(self.cut_short());
        }
        let min_range = effect.min_range().max(0.0);
        let max_range = effect.max_range().max(min_range);
        let config = self.config;
        let DijkstraMap { grid, rng, path, .. } = self;
        let grid = grid.as_mut().ok_or(PathError::Uninitialized)?;
        grid.target_map.fill(None);

        let resistance = los.map(|_| ResistanceMap::from_grid(grid));
        let sight = los.zip(resistance.as_ref());
        let friends: Vec<Point> = mv.allies.iter().copied().filter(|&a| a != start).collect();
        let allies = grid.indices(&friends);
        let mut blocked = mv.blocked(grid);
        let start_idx = grid.idx(start);
        let mut worth = vec![0usize; grid.len()];
        let mut frustration = 0;
        let truncated = loop {
            // How far the user is from every cell.
            grid.goals.clear();
            grid.reset_map();
            grid.set_goal(start);
            grid.relax(&Scan::new(&config, &blocked));
            grid.darken();
            let from_user = grid.field.clone();

            grid.goals.clear();
            grid.reset_map();
            grid.set_goals(targets);
            if grid.goals.is_empty() {
                path.clear();
                break true;
            }
            let aims: Vec<Point> = grid.goals.iter().map(|&g| grid.point(g)).collect();
            grid.relax(&Scan::new(&config, &blocked));
            grid.darken();
            grid.goals.clear();

            worth.fill(0);
            for i in 0..grid.len() {
                let v = grid.field[i];
                if v >= WALL {
                    continue;
                }
                let p = grid.point(i);
                let candidate = from_user[i] <= 2.0 * mv.budget
                    && (min_range..=max_range).contains(&v)
                    && blocked.binary_search(&i).is_err()
                    && in_view(sight, p, 1, &aims);
                let best = if candidate {
                    effect.ideal_locations(p, &aims, &friends).into_iter().next()
                } else {
                    None
                };
                match best {
                    Some(placement) => {
                        grid.target_map[i] = Some(placement.aim);
                        worth[i] = placement.affected.len();
                        grid.field[i] = GOAL;
                        grid.goals.push(i);
                    }
                    None => grid.field[i] = FLOOR,
                }
            }
            if grid.goals.is_empty() {
                path.clear();
                break true;
            }
            grid.relax(&Scan::new(&config, &blocked));
            grid.darken();

            let reachable = start_idx.is_some_and(|s| grid.field[s] <= mv.budget);
            if reachable {
                let in_reach = |g: usize| from_user[g] <= mv.budget;
                let top = grid
                    .goals
                    .iter()
                    .copied()
                    .filter(|&g| in_reach(g))
                    .map(|g| worth[g])
                    .max();
                if let Some(top) = top {
                    let kept: Vec<usize> = grid
                        .goals
                        .iter()
                        .copied()
                        .filter(|&g| in_reach(g) && worth[g] == top)
                        .collect();
                    log::trace!("technique: {} positions hit {} targets", kept.len(), top);
                    grid.reset_map();
                    for &g in &kept {
                        grid.field[g] = GOAL;
                    }
                    grid.goals = kept;
                    grid.relax(&Scan::new(&config, &blocked));
                    grid.darken();
                }
            }

            let descent = Descent {
                metric: config.metric,
                blocking: config.blocking(),
                budget: mv.budget,
                cap: config.iteration_cap,
                mode: Mode::Technique,
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
}
