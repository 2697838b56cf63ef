use std::fmt;

use gradient_core::TerrainError;

/// Errors reported by [`DijkstraMap`](crate::DijkstraMap) operations.
///
/// A missing path is not an error: queries return an empty or truncated
/// path instead.
#[derive(Debug, Clone, PartialEq)]
pub enum PathError {
    /// The map was used before [`initialize`](crate::DijkstraMap::initialize).
    Uninitialized,
    /// A per-cell buffer did not match the grid size.
    DimensionMismatch { expected: usize, found: usize },
    /// A cell cost was zero, negative or NaN.
    InvalidCost { x: i32, y: i32, cost: f64 },
    Terrain(TerrainError),
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uninitialized => write!(f, "distance map used before initialization"),
            Self::DimensionMismatch { expected, found } => {
                write!(f, "expected {expected} cells, found {found}")
            }
            Self::InvalidCost { x, y, cost } => {
                write!(f, "invalid cost {cost} at ({x}, {y})")
            }
            Self::Terrain(e) => write!(f, "terrain error: {e}"),
        }
    }
}

impl std::error::Error for PathError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Terrain(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TerrainError> for PathError {
    fn from(e: TerrainError) -> Self {
        Self::Terrain(e)
    }
}
