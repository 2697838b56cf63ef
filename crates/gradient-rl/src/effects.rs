//! Area effects for technique queries.
//!
//! Neither effect knows about terrain: a burst reaches every cell within its
//! radius. Pair them with a [`LineOfSight`](gradient_paths::LineOfSight)
//! oracle to keep users from throwing through walls.

use gradient_core::{Point, Range};
use gradient_paths::{AreaEffect, EffectPlacement, Metric};

/// Hits exactly one target between `min_range` and `max_range`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointEffect {
    pub min_range: f64,
    pub max_range: f64,
    /// How range is measured.
    pub metric: Metric,
}

impl PointEffect {
    pub fn new(min_range: f64, max_range: f64) -> Self {
        Self {
            min_range,
            max_range,
            metric: Metric::Chebyshev,
        }
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    fn in_range(&self, origin: Point, p: Point) -> bool {
        (self.min_range..=self.max_range).contains(&self.metric.distance(origin, p))
    }
}

impl AreaEffect for PointEffect {
    fn min_range(&self) -> f64 {
        self.min_range
    }

    fn max_range(&self) -> f64 {
        self.max_range
    }

    fn ideal_locations(
        &self,
        origin: Point,
        targets: &[Point],
        allies: &[Point],
    ) -> Vec<EffectPlacement> {
        targets
            .iter()
            .copied()
            .filter(|&t| self.in_range(origin, t) && !allies.contains(&t))
            .map(|t| EffectPlacement {
                aim: t,
                affected: vec![t],
            })
            .collect()
    }
}

/// A blast of `radius` cells around an aim point between `min_range` and
/// `max_range` away. Placements that would catch an ally are never
/// offered.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BurstEffect {
    pub min_range: f64,
    pub max_range: f64,
    pub radius: i32,
    /// How range and radius are measured.
    pub metric: Metric,
}

impl BurstEffect {
    pub fn new(min_range: f64, max_range: f64, radius: i32) -> Self {
        Self {
            min_range,
            max_range,
            radius,
            metric: Metric::Chebyshev,
        }
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    fn covers(&self, aim: Point, p: Point) -> bool {
        self.metric.distance(aim, p) <= self.radius as f64
    }
}

impl AreaEffect for BurstEffect {
    fn min_range(&self) -> f64 {
        self.min_range
    }

    fn max_range(&self) -> f64 {
        self.max_range
    }

    /// Every aim point that catches at least one target, most targets
    /// first.
    fn ideal_locations(
        &self,
        origin: Point,
        targets: &[Point],
        allies: &[Point],
    ) -> Vec<EffectPlacement> {
        let mut aims: Vec<Point> = targets
            .iter()
            .flat_map(|&t| Range::around(t, self.radius).iter().filter(move |&p| self.covers(t, p)))
            .collect();
        aims.sort_unstable();
        aims.dedup();

        let range = self.min_range..=self.max_range;
        let mut placements: Vec<EffectPlacement> = aims
            .into_iter()
            .filter(|&aim| range.contains(&self.metric.distance(origin, aim)))
            .filter(|&aim| !allies.iter().any(|&a| self.covers(aim, a)))
            .map(|aim| EffectPlacement {
                aim,
                affected: targets.iter().copied().filter(|&t| self.covers(aim, t)).collect(),
            })
            .collect();
        placements.sort_by(|a, b| b.affected.len().cmp(&a.affected.len()));
        placements
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BresenhamLos;
    use gradient_core::Terrain;
    use gradient_paths::{DijkstraConfig, DijkstraMap, Movement};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn point_effect_band_and_allies() {
        let e = PointEffect::new(2.0, 3.0);
        let origin = Point::new(0, 0);
        let targets = [Point::new(1, 1), Point::new(2, 2), Point::new(3, 0), Point::new(5, 0)];
        let found: Vec<Point> = e
            .ideal_locations(origin, &targets, &[Point::new(3, 0)])
            .into_iter()
            .map(|p| p.aim)
            .collect();
        assert_eq!(found, vec![Point::new(2, 2)]);

        let manhattan = e.with_metric(Metric::Manhattan);
        assert!(manhattan.ideal_locations(origin, &[Point::new(2, 2)], &[]).is_empty());
    }

    #[test]
    fn burst_prefers_clusters() {
        let e = BurstEffect::new(1.0, 4.0, 1);
        let targets = [Point::new(6, 0), Point::new(6, 2), Point::new(0, 4)];
        let best = &e.ideal_locations(Point::new(3, 1), &targets, &[])[0];
        assert_eq!(best.aim, Point::new(5, 1));
        assert_eq!(best.affected, vec![Point::new(6, 0), Point::new(6, 2)]);
    }

    #[test]
    fn burst_spares_allies() {
        let e = BurstEffect::new(0.0, 5.0, 1);
        let targets = [Point::new(4, 0)];
        let allies = [Point::new(3, 0)];
        let found = e.ideal_locations(Point::new(0, 0), &targets, &allies);
        assert!(!found.is_empty());
        assert!(found.iter().all(|p| p.aim.x >= 5));
    }

    #[test]
    fn burst_radius_follows_metric() {
        let e = BurstEffect::new(0.0, 9.0, 1).with_metric(Metric::Manhattan);
        let found = e.ideal_locations(Point::new(0, 0), &[Point::new(4, 4)], &[]);
        assert_eq!(found.len(), 5);
    }

    #[test]
    fn technique_query_with_burst() {
        let config = DijkstraConfig::default().with_metric(Metric::Chebyshev);
        let mut m = DijkstraMap::with_config(SmallRng::seed_from_u64(4), config);
        m.initialize(&Terrain::from_rows(&[".........", ".........", "........."]).unwrap());
        let targets = [Point::new(6, 0), Point::new(6, 2)];
        let effect = BurstEffect::new(1.0, 3.0, 1);
        let los = BresenhamLos::new();
        let path = m
            .find_technique_path(&Movement::new(10.0), &effect, Some(&los), Point::new(0, 1), &targets)
            .unwrap()
            .to_vec();
        assert_eq!(path.len(), 3);
        let end = *path.last().unwrap();
        assert_eq!(end.x, 3);
        assert_eq!(m.target_at(end), Some(Point::new(5, 1)));
        assert!(!m.is_truncated());
    }

    #[test]
    fn attack_through_a_doorway() {
        let rows = ["#######", "#.....#", "###.###", "#.....#", "#######"];
        let mut m = DijkstraMap::new(SmallRng::seed_from_u64(8));
        m.initialize(&Terrain::from_rows(&rows).unwrap());
        let los = BresenhamLos::new();
        let path = m
            .find_attack_path(
                &Movement::new(20.0),
                2.0,
                3.0,
                Some(&los),
                Point::new(1, 1),
                &[Point::new(1, 3)],
            )
            .unwrap();
        // Cells above the doorway are in range but cannot see the corner.
        assert_eq!(path, &[Point::new(2, 1), Point::new(3, 1), Point::new(3, 2)]);
        assert!(!m.is_truncated());
    }
}

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn burst_roundtrip() {
        let e = BurstEffect::new(1.0, 4.0, 2).with_metric(Metric::Euclidean);
        let json = serde_json::to_string(&e).unwrap();
        let back: BurstEffect = serde_json::from_str(&json).unwrap();
        assert_eq!(e, back);
    }
}
