use gradient_core::{Direction, Point};

/// How movement between neighbouring cells is measured.
///
/// `Manhattan` moves in the four cardinal directions only. `Chebyshev` and
/// `Euclidean` both move in all eight directions; Euclidean charges √2 for a
/// diagonal step where Chebyshev charges 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Metric {
    #[default]
    Manhattan,
    Chebyshev,
    Euclidean,
}

/// The shape of a radius under a [`Metric`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Shape {
    Diamond,
    Square,
    Circle,
}

impl Metric {
    /// The directions a mover may step in.
    #[inline]
    pub fn directions(self) -> &'static [Direction] {
        match self {
            Metric::Manhattan => &Direction::CARDINALS,
            Metric::Chebyshev | Metric::Euclidean => &Direction::OUTWARDS,
        }
    }

    /// Number of directions a mover may step in (4 or 8).
    #[inline]
    pub fn direction_count(self) -> usize {
        self.directions().len()
    }

    /// Base cost of one step in `dir`, before the entered cell's cost
    /// multiplier is applied.
    #[inline]
    pub fn step_cost(self, dir: Direction) -> f64 {
        if self == Metric::Euclidean && dir.is_diagonal() {
            std::f64::consts::SQRT_2
        } else {
            1.0
        }
    }

    /// Straight-line distance between two points on an open grid.
    pub fn distance(self, a: Point, b: Point) -> f64 {
        match self {
            Metric::Manhattan => a.manhattan(b) as f64,
            Metric::Chebyshev => a.chebyshev(b) as f64,
            Metric::Euclidean => {
                let dx = (a.x - b.x) as f64;
                let dy = (a.y - b.y) as f64;
                dx.hypot(dy)
            }
        }
    }

    /// The metric whose radius has the given shape.
    pub fn from_shape(shape: Shape) -> Self {
        match shape {
            Shape::Diamond => Metric::Manhattan,
            Shape::Square => Metric::Chebyshev,
            Shape::Circle => Metric::Euclidean,
        }
    }

    /// The shape of a radius under this metric.
    pub fn shape(self) -> Shape {
        match self {
            Metric::Manhattan => Shape::Diamond,
            Metric::Chebyshev => Shape::Square,
            Metric::Euclidean => Shape::Circle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_sets() {
        assert_eq!(Metric::Manhattan.direction_count(), 4);
        assert_eq!(Metric::Chebyshev.direction_count(), 8);
        assert_eq!(Metric::Euclidean.direction_count(), 8);
        assert!(Metric::Manhattan.directions().iter().all(|d| !d.is_diagonal()));
    }

    #[test]
    fn step_costs() {
        assert_eq!(Metric::Chebyshev.step_cost(Direction::UpLeft), 1.0);
        assert_eq!(Metric::Euclidean.step_cost(Direction::Up), 1.0);
        assert!((Metric::Euclidean.step_cost(Direction::DownRight) - 1.4142135623730951).abs() < 1e-12);
    }

    #[test]
    fn distances() {
        let a = Point::new(0, 0);
        let b = Point::new(3, 4);
        assert_eq!(Metric::Manhattan.distance(a, b), 7.0);
        assert_eq!(Metric::Chebyshev.distance(a, b), 4.0);
        assert_eq!(Metric::Euclidean.distance(a, b), 5.0);
    }

    #[test]
    fn shape_mapping() {
        for m in [Metric::Manhattan, Metric::Chebyshev, Metric::Euclidean] {
            assert_eq!(Metric::from_shape(m.shape()), m);
        }
        assert_eq!(Metric::from_shape(Shape::Circle), Metric::Euclidean);
    }
}
