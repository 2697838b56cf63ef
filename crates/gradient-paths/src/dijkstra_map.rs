use gradient_core::{Point, Terrain};
use rand::Rng;

use crate::field::FieldSnapshot;
use crate::flee::FleeCache;
use crate::grid::GridState;
use crate::{DijkstraConfig, Metric, PathError};

// ---------------------------------------------------------------------------
// Movement
// ---------------------------------------------------------------------------

/// Per-query movement limits shared by every path query.
///
/// `impassable` cells cannot be entered (enemies, temporary obstacles).
/// `allies` can be passed through but not stopped on; when a move would end
/// on one, the query is rerun with that cell made impassable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Movement<'a> {
    /// Total entry cost the mover may pay this turn.
    pub budget: f64,
    /// Radius for a bounded scan. Used only when it is at least `budget`.
    pub scan_limit: Option<usize>,
    pub impassable: &'a [Point],
    pub allies: &'a [Point],
}

impl<'a> Movement<'a> {
    pub fn new(budget: f64) -> Self {
        Self {
            budget,
            scan_limit: None,
            impassable: &[],
            allies: &[],
        }
    }

    pub fn with_scan_limit(mut self, limit: usize) -> Self {
        self.scan_limit = Some(limit);
        self
    }

    pub fn with_impassable(mut self, impassable: &'a [Point]) -> Self {
        self.impassable = impassable;
        self
    }

    pub fn with_allies(mut self, allies: &'a [Point]) -> Self {
        self.allies = allies;
        self
    }

    /// The bounded-scan radius to use, if any.
    pub(crate) fn partial_limit(&self) -> Option<usize> {
        self.scan_limit.filter(|&l| l > 0 && l as f64 >= self.budget)
    }

    /// Impassable indices for this query. A mover with a single step can
    /// never pass through an ally, so allies are folded in.
    pub(crate) fn blocked(&self, grid: &GridState) -> Vec<usize> {
        if self.budget <= 1.0 {
            let mut all = self.impassable.to_vec();
            all.extend_from_slice(self.allies);
            grid.indices(&all)
        } else {
            grid.indices(self.impassable)
        }
    }
}

// ---------------------------------------------------------------------------
// DijkstraMap
// ---------------------------------------------------------------------------

/// A weighted multi-goal distance field over a wall/floor grid, with path
/// queries that read it.
///
/// The map owns every per-grid buffer (field, costs, frontier, last path),
/// so repeated queries allocate little after the first. All queries take
/// `&mut self`; use one map per agent, or lock externally.
///
/// Queries that return a path borrow it from the map; it is overwritten by
/// the next query. [`is_truncated`](Self::is_truncated) reports whether the
/// last query stopped short of its destination.
pub struct DijkstraMap<R> {
    pub(crate) rng: R,
    pub(crate) config: DijkstraConfig,
    pub(crate) grid: Option<GridState>,
    pub(crate) path: Vec<Point>,
    pub(crate) truncated: bool,
    pub(crate) flee_cache: Option<FleeCache>,
    pub(crate) flee_cache_hits: u64,
}

fn positive(cost: f64) -> bool {
    cost > 0.0
}

impl<R: Rng> DijkstraMap<R> {
    /// Create an uninitialized map with the default configuration.
    pub fn new(rng: R) -> Self {
        Self::with_config(rng, DijkstraConfig::default())
    }

    /// Create an uninitialized map.
    pub fn with_config(rng: R, config: DijkstraConfig) -> Self {
        Self {
            rng,
            config,
            grid: None,
            path: Vec::new(),
            truncated: false,
            flee_cache: None,
            flee_cache_hits: 0,
        }
    }

    /// Create a map initialized from ASCII terrain (`#` is a wall).
    pub fn from_ascii(rng: R, config: DijkstraConfig, text: &str) -> Result<Self, PathError> {
        let terrain = Terrain::from_ascii(text)?;
        let mut map = Self::with_config(rng, config);
        map.initialize(&terrain);
        Ok(map)
    }

    /// Load terrain, resetting costs, goals, the field and the flee cache.
    pub fn initialize(&mut self, terrain: &Terrain) {
        self.grid = Some(GridState::new(terrain));
        self.path.clear();
        self.truncated = false;
        self.flee_cache = None;
    }

    pub fn is_initialized(&self) -> bool {
        self.grid.is_some()
    }

    #[inline]
    pub(crate) fn state(&self) -> Result<&GridState, PathError> {
        self.grid.as_ref().ok_or(PathError::Uninitialized)
    }

    #[inline]
    pub(crate) fn state_mut(&mut self) -> Result<&mut GridState, PathError> {
        self.grid.as_mut().ok_or(PathError::Uninitialized)
    }

    // -----------------------------------------------------------------------
    // Configuration
    // -----------------------------------------------------------------------

    pub fn config(&self) -> &DijkstraConfig {
        &self.config
    }

    pub fn metric(&self) -> Metric {
        self.config.metric
    }

    pub fn set_metric(&mut self, metric: Metric) {
        if self.config.metric != metric {
            self.config.metric = metric;
            self.flee_cache = None;
        }
    }

    /// Set the diagonal blocking requirement, clamped to `0..=2`.
    pub fn set_blocking_requirement(&mut self, requirement: u8) {
        let requirement = requirement.min(2);
        if self.config.blocking_requirement != requirement {
            self.config.blocking_requirement = requirement;
            self.flee_cache = None;
        }
    }

    // -----------------------------------------------------------------------
    // Costs
    // -----------------------------------------------------------------------

    /// Set the entry cost multiplier of one cell.
    ///
    /// Wall cells always keep cost 1.0 and out-of-range points are ignored.
    /// Costs that are not strictly positive are rejected.
    pub fn set_cost(&mut self, p: Point, cost: f64) -> Result<(), PathError> {
        let grid = self.state_mut()?;
        let Some(i) = grid.idx(p) else {
            return Ok(());
        };
        if !positive(cost) {
            return Err(PathError::InvalidCost { x: p.x, y: p.y, cost });
        }
        grid.costs[i] = if grid.is_wall(i) { 1.0 } else { cost };
        grid.standard_costs = grid.costs.iter().all(|&c| c == 1.0);
        self.flee_cache = None;
        Ok(())
    }

    /// Replace every cost at once from a row-major buffer.
    pub fn initialize_costs(&mut self, costs: &[f64]) -> Result<(), PathError> {
        let grid = self.state_mut()?;
        if costs.len() != grid.len() {
            return Err(PathError::DimensionMismatch {
                expected: grid.len(),
                found: costs.len(),
            });
        }
        if let Some(i) = costs.iter().position(|&c| !positive(c)) {
            let p = grid.point(i);
            return Err(PathError::InvalidCost {
                x: p.x,
                y: p.y,
                cost: costs[i],
            });
        }
        for (i, &c) in costs.iter().enumerate() {
            grid.costs[i] = if grid.is_wall(i) { 1.0 } else { c };
        }
        grid.standard_costs = grid.costs.iter().all(|&c| c == 1.0);
        self.flee_cache = None;
        Ok(())
    }

    /// Set every cost back to 1.0.
    pub fn reset_costs(&mut self) -> Result<(), PathError> {
        let grid = self.state_mut()?;
        grid.costs.fill(1.0);
        grid.standard_costs = true;
        self.flee_cache = None;
        Ok(())
    }

    /// Entry cost of `p`, or `None` outside the grid.
    pub fn cost(&self, p: Point) -> Option<f64> {
        let grid = self.grid.as_ref()?;
        grid.idx(p).map(|i| grid.costs[i])
    }

    // -----------------------------------------------------------------------
    // Goals and cell state
    // -----------------------------------------------------------------------

    /// Mark an open cell as a goal for the next scan. Walls and
    /// out-of-range points are ignored.
    pub fn set_goal(&mut self, p: Point) -> Result<(), PathError> {
        self.state_mut()?.set_goal(p);
        Ok(())
    }

    pub fn set_goals(&mut self, pts: &[Point]) -> Result<(), PathError> {
        self.state_mut()?.set_goals(pts);
        Ok(())
    }

    /// Forget every goal, returning goal cells to their terrain value.
    pub fn clear_goals(&mut self) -> Result<(), PathError> {
        self.state_mut()?.clear_goals();
        Ok(())
    }

    /// Current goals in the order they were set.
    pub fn goals(&self) -> Result<Vec<Point>, PathError> {
        let grid = self.state()?;
        Ok(grid.goals.iter().map(|&g| grid.point(g)).collect())
    }

    /// Mark a cell as blocked in the working field until the next reset.
    pub fn set_occupied(&mut self, p: Point) -> Result<(), PathError> {
        let grid = self.state_mut()?;
        if let Some(i) = grid.idx(p) {
            grid.field[i] = crate::WALL;
        }
        Ok(())
    }

    /// Return one cell of the working field to its terrain value.
    pub fn reset_cell(&mut self, p: Point) -> Result<(), PathError> {
        let grid = self.state_mut()?;
        if let Some(i) = grid.idx(p) {
            grid.field[i] = grid.physical[i];
        }
        Ok(())
    }

    /// Return the whole working field to the terrain map. Goals are kept.
    pub fn reset_map(&mut self) -> Result<(), PathError> {
        self.state_mut()?.reset_map();
        Ok(())
    }

    /// Forget every aim point recorded by technique queries.
    pub fn reset_target_map(&mut self) -> Result<(), PathError> {
        self.state_mut()?.target_map.fill(None);
        Ok(())
    }

    /// Reset the field, goals, aim points, frontier and last path.
    pub fn reset(&mut self) -> Result<(), PathError> {
        let grid = self.state_mut()?;
        grid.reset_map();
        grid.target_map.fill(None);
        grid.goals.clear();
        grid.frontier.clear();
        grid.next.clear();
        self.path.clear();
        self.truncated = false;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Grid size as (width, height), or `None` before initialization.
    pub fn size(&self) -> Option<Point> {
        self.grid.as_ref().map(|g| Point::new(g.width, g.height))
    }

    /// Linear index `y * width + x` of `p`.
    pub fn encode(&self, p: Point) -> Option<usize> {
        self.grid.as_ref()?.idx(p)
    }

    /// Point at a linear index.
    pub fn decode(&self, index: usize) -> Option<Point> {
        let grid = self.grid.as_ref()?;
        (index < grid.len()).then(|| grid.point(index))
    }

    /// A copy of the current working field.
    pub fn field(&self) -> Result<FieldSnapshot, PathError> {
        Ok(self.state()?.snapshot())
    }

    /// The path found by the last query, start excluded.
    pub fn path(&self) -> &[Point] {
        &self.path
    }

    /// Whether the last path query stopped before reaching its destination.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Cells assigned a distance by the last scan or search.
    pub fn mapped_count(&self) -> usize {
        self.grid.as_ref().map_or(0, |g| g.mapped_count)
    }

    /// Flee queries answered from the cache since creation.
    pub fn flee_cache_hits(&self) -> u64 {
        self.flee_cache_hits
    }

    /// Aim point recorded at `p` by the last technique query.
    pub fn target_at(&self, p: Point) -> Option<Point> {
        let grid = self.grid.as_ref()?;
        grid.idx(p).and_then(|i| grid.target_map[i])
    }

    /// Give up on a query: empty path, truncated.
    pub(crate) fn cut_short(&mut self) -> &[Point] {
        self.path.clear();
        self.truncated = true;
        &self.path
    }
}
