use crate::Metric;

/// Tunables for a [`DijkstraMap`](crate::DijkstraMap).
///
/// The defaults are 4-directional movement, a diagonal blocking requirement
/// of 2, an iteration cap of 500 steps (2000 for pre-scanned extraction) and
/// 50 attempts to move a blocked start onto open ground.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DijkstraConfig {
    /// Distance metric used for scans and path extraction.
    pub metric: Metric,
    /// How many of the two orthogonal cells flanking a diagonal step must be
    /// blocked for the step to be rejected. 0 never rejects; values above 2
    /// are treated as 2.
    pub blocking_requirement: u8,
    /// Steps a path query may take, across ally retries, before giving up.
    pub iteration_cap: usize,
    /// Step limit for [`find_path_prescanned`](crate::DijkstraMap::find_path_prescanned).
    pub prescanned_cap: usize,
    /// Random relocations tried when a nearest-target search starts on a wall.
    pub perturb_attempts: usize,
}

impl Default for DijkstraConfig {
    fn default() -> Self {
        Self {
            metric: Metric::Manhattan,
            blocking_requirement: 2,
            iteration_cap: 500,
            prescanned_cap: 2000,
            perturb_attempts: 50,
        }
    }
}

impl DijkstraConfig {
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Set the diagonal blocking requirement, clamped to `0..=2`.
    pub fn with_blocking_requirement(mut self, requirement: u8) -> Self {
        self.blocking_requirement = requirement.min(2);
        self
    }

    pub fn with_iteration_cap(mut self, cap: usize) -> Self {
        self.iteration_cap = cap;
        self
    }

    pub fn with_prescanned_cap(mut self, cap: usize) -> Self {
        self.prescanned_cap = cap;
        self
    }

    pub fn with_perturb_attempts(mut self, attempts: usize) -> Self {
        self.perturb_attempts = attempts;
        self
    }

    /// The blocking requirement as used by scans, never above 2.
    #[inline]
    pub(crate) fn blocking(&self) -> u8 {
        self.blocking_requirement.min(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = DijkstraConfig::default();
        assert_eq!(c.metric, Metric::Manhattan);
        assert_eq!(c.blocking_requirement, 2);
        assert_eq!(c.iteration_cap, 500);
        assert_eq!(c.prescanned_cap, 2000);
        assert_eq!(c.perturb_attempts, 50);
    }

    #[test]
    fn blocking_is_clamped() {
        let c = DijkstraConfig::default().with_blocking_requirement(7);
        assert_eq!(c.blocking_requirement, 2);
        let c = DijkstraConfig {
            blocking_requirement: 9,
            ..Default::default()
        };
        assert_eq!(c.blocking(), 2);
    }

    #[test]
    fn builders_chain() {
        let c = DijkstraConfig::default()
            .with_metric(Metric::Euclidean)
            .with_iteration_cap(10)
            .with_prescanned_cap(20)
            .with_perturb_attempts(3);
        assert_eq!(c.metric, Metric::Euclidean);
        assert_eq!((c.iteration_cap, c.prescanned_cap, c.perturb_attempts), (10, 20, 3));
    }
}
