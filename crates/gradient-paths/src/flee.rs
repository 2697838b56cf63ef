use gradient_core::Point;
use rand::Rng;

use crate::extract::{Descent, Mode, Outcome, descend};
use crate::field::FLOOR;
use crate::grid::insert_sorted;
use crate::scan::Scan;
use crate::{DijkstraMap, Movement, PathError};

/// Inputs that fully determine a flee field on a given terrain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FleeKey {
    size: i32,
    prefer_bits: u64,
    /// Sorted obstacle indices.
    obstacles: Vec<usize>,
    /// Sorted, deduplicated fear-source indices.
    fears: Vec<usize>,
    scan_limit: Option<usize>,
}

/// The last flee field computed, with the inputs that produced it.
#[derive(Debug, Clone)]
pub(crate) struct FleeCache {
    key: FleeKey,
    field: Vec<f64>,
}

impl<R: Rng> DijkstraMap<R> {
    /// Find a path of at most `mv.budget` entry cost away from `fears`.
    ///
    /// `prefer` scales how strongly far-away escape routes are favoured over
    /// nearby corners; 1.2 suits most maps. The field is cached, so
    /// repeating a call with the same inputs skips both scans.
    ///
    /// The path is truncated when the mover cannot get any farther away at
    /// all.
    pub fn find_flee_path(
        &mut self,
        mv: &Movement<'_>,
        prefer: f64,
        start: Point,
        fears: &[Point],
    ) -> Result<&[Point], PathError> {
        self.flee(mv, 1, prefer, start, fears)
    }

    pub(crate) fn flee(
        &mut self,
        mv: &Movement<'_>,
        size: i32,
        prefer: f64,
        start: Point,
        fears: &[Point],
    ) -> Result<&[Point], PathError> {
        self.state()?;
        if mv.budget <= 0.0 {
            return Ok(self.cut_short());
        }
        let config = self.config;
        let DijkstraMap {
            grid,
            rng,
            path,
            flee_cache,
            flee_cache_hits,
            ..
        } = self;
        let grid = grid.as_mut().ok_or(PathError::Uninitialized)?;

        let fear_idx = grid.indices(fears);
        let mut blocked = mv.blocked(grid);
        let allies = grid.indices(mv.allies);
        let limit = mv.partial_limit();
        let mut frustration = 0;
        let truncated = loop {
            let key = FleeKey {
                size,
                prefer_bits: prefer.to_bits(),
                obstacles: blocked.clone(),
                fears: fear_idx.clone(),
                scan_limit: limit,
            };
            if let Some(cache) = flee_cache.as_ref().filter(|c| c.key == key) {
                grid.field.copy_from_slice(&cache.field);
                *flee_cache_hits += 1;
                log::trace!("flee cache hit ({} fear sources)", key.fears.len());
            } else {
                log::trace!("flee cache miss ({} fear sources)", key.fears.len());
                grid.goals.clear();
                grid.reset_map();
                for &f in &fear_idx {
                    let p = grid.point(f);
                    grid.set_goal(p);
                }
                if grid.goals.is_empty() {
                    path.clear();
                    break true;
                }
                let scan = Scan::new(&config, &blocked).limit(limit).size(size);
                grid.relax(&scan);
                grid.darken();
                // Turn distance from danger into a field that falls away
                // from it, then let the far end flow back.
                for v in grid.field.iter_mut() {
                    if *v < FLOOR {
                        *v *= -prefer;
                    }
                }
                grid.relax(&scan);
                grid.darken();
                grid.goals.clear();
                *flee_cache = Some(FleeCache {
                    key,
                    field: grid.field.clone(),
                });
            }

            let descent = Descent {
                metric: config.metric,
                blocking: config.blocking(),
                budget: mv.budget,
                cap: config.iteration_cap,
                mode: Mode::Flee,
                blocked: &blocked,
                allies: &allies,
            };
            match descend(grid, rng, path, start, &descent, &mut frustration) {
                Outcome::Done { truncated } => break truncated,
                Outcome::Retry(cell) => insert_sorted(&mut blocked, cell),
            }
        };
        self.truncated = truncated;
        Ok(&self.path)
    }
}
