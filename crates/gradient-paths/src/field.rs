use gradient_core::{Point, Range};

/// Field value of a goal cell.
pub const GOAL: f64 = 0.0;
/// Field value of an open cell that no scan has reached yet.
pub const FLOOR: f64 = 999_200.0;
/// Field value of an impassable cell.
pub const WALL: f64 = 999_500.0;
/// Field value of an open cell a finished scan could not reach.
pub const DARK: f64 = 999_800.0;

/// Open values at or above this are never used to seed a scan.
pub(crate) const SEED_CEILING: f64 = 999_000.0;

/// A tagged reading of one field cell.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellState {
    /// Reached by the last scan, at this distance from the nearest goal.
    Distance(f64),
    Wall,
    /// Open but unreachable from every goal.
    Dark,
    /// Open and not visited by an early-exit scan.
    Unscanned,
}

impl CellState {
    pub fn from_value(v: f64) -> Self {
        if v == WALL {
            CellState::Wall
        } else if v == DARK {
            CellState::Dark
        } else if v == FLOOR {
            CellState::Unscanned
        } else {
            CellState::Distance(v)
        }
    }

    /// The distance, if the cell was reached.
    pub fn distance(self) -> Option<f64> {
        match self {
            CellState::Distance(d) => Some(d),
            _ => None,
        }
    }
}

/// A reached cell and its distance, as returned by
/// [`flood_fill`](crate::DijkstraMap::flood_fill).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldNode {
    pub pos: Point,
    pub dist: f64,
}

/// An owned copy of a distance field.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldSnapshot {
    width: i32,
    height: i32,
    values: Vec<f64>,
}

impl FieldSnapshot {
    pub(crate) fn new(width: i32, height: i32, values: Vec<f64>) -> Self {
        Self {
            width,
            height,
            values,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn bounds(&self) -> Range {
        Range::new(0, 0, self.width, self.height)
    }

    /// Raw field value at `p`, or `None` outside the grid.
    pub fn get(&self, p: Point) -> Option<f64> {
        if !p.within(self.width, self.height) {
            return None;
        }
        Some(self.values[(p.y * self.width + p.x) as usize])
    }

    /// Tagged state at `p`, or `None` outside the grid.
    pub fn state(&self, p: Point) -> Option<CellState> {
        self.get(p).map(CellState::from_value)
    }

    /// Row-major raw values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Every reached cell with its distance, in row-major order.
    pub fn reached(&self) -> impl Iterator<Item = FieldNode> + '_ {
        self.bounds()
            .iter()
            .zip(self.values.iter())
            .filter(|&(_, &v)| v < FLOOR)
            .map(|(pos, &dist)| FieldNode { pos, dist })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_ordering() {
        assert!(GOAL < SEED_CEILING);
        assert!(SEED_CEILING < FLOOR);
        assert!(FLOOR < WALL);
        assert!(WALL < DARK);
    }

    #[test]
    fn states() {
        let snap = FieldSnapshot::new(4, 1, vec![0.0, FLOOR, WALL, DARK]);
        assert_eq!(snap.state(Point::new(0, 0)), Some(CellState::Distance(0.0)));
        assert_eq!(snap.state(Point::new(1, 0)), Some(CellState::Unscanned));
        assert_eq!(snap.state(Point::new(2, 0)), Some(CellState::Wall));
        assert_eq!(snap.state(Point::new(3, 0)), Some(CellState::Dark));
        assert_eq!(snap.state(Point::new(4, 0)), None);
        assert_eq!(CellState::Distance(2.5).distance(), Some(2.5));
        assert_eq!(CellState::Wall.distance(), None);
    }

    #[test]
    fn reached_cells() {
        let snap = FieldSnapshot::new(2, 2, vec![0.0, 1.0, WALL, DARK]);
        let nodes: Vec<_> = snap.reached().collect();
        assert_eq!(
            nodes,
            vec![
                FieldNode { pos: Point::new(0, 0), dist: 0.0 },
                FieldNode { pos: Point::new(1, 0), dist: 1.0 },
            ]
        );
    }
}
