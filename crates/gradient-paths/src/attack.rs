use gradient_core::{Point, Range};
use rand::Rng;

use crate::extract::{Descent, Mode, Outcome, descend};
use crate::field::{FLOOR, GOAL, WALL};
use crate::grid::insert_sorted;
use crate::scan::Scan;
use crate::traits::{LineOfSight, ResistanceMap};
use crate::{DijkstraMap, Metric, Movement, PathError};

/// Whether any cell of the footprint at `p` can see any of `targets`.
/// Without an oracle everything is in view.
pub(crate) fn in_view(
    los: Option<(&dyn LineOfSight, &ResistanceMap)>,
    p: Point,
    size: i32,
    targets: &[Point],
) -> bool {
    let Some((los, resistance)) = los else {
        return true;
    };
    Range::new(p.x, p.y, p.x + size, p.y + size)
        .iter()
        .any(|c| targets.iter().any(|&t| los.is_reachable(resistance, c, t)))
}

impl<R: Rng> DijkstraMap<R> {
    /// Find a path toward the nearest cell from which one of `targets` is
    /// between `min_range` and `max_range` cells away (8-way distance) and
    /// visible through `los`.
    ///
    /// A negative `min_range` counts as 0 and `max_range` is raised to at
    /// least `min_range`. Without an oracle every cell in the band
    /// qualifies.
    pub fn find_attack_path(
        &mut self,
        mv: &Movement<'_>,
        min_range: f64,
        max_range: f64,
        los: Option<&dyn LineOfSight>,
        start: Point,
        targets: &[Point],
    ) -> Result<&[Point], PathError> {
        self.attack(mv, 1, min_range, max_range, los, start, targets)
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn attack(
        &mut self,
        mv: &Movement<'_>,
        size: i32,
        min_range: f64,
        max_range: f64,
        los: Option<&dyn LineOfSight>,
        start: Point,
        targets: &[Point],
    ) -> Result<&[Point], PathError> {
        self.state()?;
        if mv.budget <= 0.0 {
            return Ok(self.cut_short());
        }
        let min_range = min_range.max(0.0);
        let max_range = max_range.max(min_range);
        let config = self.config;
        let DijkstraMap { grid, rng, path, .. } = self;
        let grid = grid.as_mut().ok_or(PathError::Uninitialized)?;

        let resistance = los.map(|_| ResistanceMap::from_grid(grid));
        let sight = los.zip(resistance.as_ref());
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
            let aims: Vec<Point> = grid.goals.iter().map(|&g| grid.point(g)).collect();

            // Distance to the targets as a ranged attacker counts it.
            grid.relax(
                &Scan::new(&config, &blocked)
                    .metric(Metric::Chebyshev)
                    .size(size),
            );
            grid.darken();
            grid.goals.clear();

            for i in 0..grid.len() {
                let v = grid.field[i];
                if v >= WALL {
                    continue;
                }
                let p = grid.point(i);
                if (min_range..=max_range).contains(&v)
                    && blocked.binary_search(&i).is_err()
                    && in_view(sight, p, size, &aims)
                {
                    grid.field[i] = GOAL;
                    grid.goals.push(i);
                } else {
                    grid.field[i] = FLOOR;
                }
            }
            log::trace!("attack: {} firing positions", grid.goals.len());

            grid.relax(
                &Scan::new(&config, &blocked)
                    .toward(start_idx)
                    .limit(mv.partial_limit())
                    .size(size)
                    .thicken(false),
            );
            grid.darken();

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
}
