//! Wall/floor terrain grids.
//!
//! [`Terrain`] is the passability map handed to the distance-field engine.
//! It stores one [`Tile`] per cell in row-major order and can be parsed from
//! ASCII art, where `#` is a wall and every other character is floor.

use std::fmt;

use crate::{Point, Range};

/// Passability of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Tile {
    #[default]
    Floor,
    Wall,
}

impl Tile {
    /// Whether the tile blocks movement.
    #[inline]
    pub const fn is_wall(self) -> bool {
        matches!(self, Tile::Wall)
    }

    /// The ASCII glyph used by [`Terrain::from_ascii`] and `Display`.
    pub const fn glyph(self) -> char {
        match self {
            Tile::Floor => '.',
            Tile::Wall => '#',
        }
    }
}

impl From<char> for Tile {
    fn from(c: char) -> Self {
        if c == '#' { Tile::Wall } else { Tile::Floor }
    }
}

/// Errors from building a [`Terrain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerrainError {
    /// The map has no cells.
    Empty,
    /// A row's length differs from the first row's.
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// The tile buffer does not hold `width * height` cells.
    SizeMismatch { expected: usize, found: usize },
}

impl fmt::Display for TerrainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "terrain has no cells"),
            Self::RaggedRow {
                row,
                expected,
                found,
            } => write!(
                f,
                "terrain row {row} has {found} cells, expected {expected}"
            ),
            Self::SizeMismatch { expected, found } => {
                write!(f, "terrain has {found} tiles, expected {expected}")
            }
        }
    }
}

impl std::error::Error for TerrainError {}

/// A rectangular wall/floor grid anchored at the origin.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawTerrain"))]
pub struct Terrain {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
}

/// Unchecked wire form of [`Terrain`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawTerrain {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawTerrain> for Terrain {
    type Error = TerrainError;

    fn try_from(raw: RawTerrain) -> Result<Self, TerrainError> {
        let mut t = Terrain::new(raw.width, raw.height)?;
        if raw.tiles.len() != t.tiles.len() {
            return Err(TerrainError::SizeMismatch {
                expected: t.tiles.len(),
                found: raw.tiles.len(),
            });
        }
        t.tiles = raw.tiles;
        Ok(t)
    }
}

impl Terrain {
    /// Create an all-floor terrain. Non-positive sizes are an error.
    pub fn new(width: i32, height: i32) -> Result<Self, TerrainError> {
        if width <= 0 || height <= 0 {
            return Err(TerrainError::Empty);
        }
        Ok(Self {
            width,
            height,
            tiles: vec![Tile::Floor; (width * height) as usize],
        })
    }

    /// Create a terrain by evaluating `f` at each point.
    pub fn from_fn(
        width: i32,
        height: i32,
        mut f: impl FnMut(Point) -> Tile,
    ) -> Result<Self, TerrainError> {
        let mut t = Self::new(width, height)?;
        for p in t.bounds() {
            let i = t.index(p);
            t.tiles[i] = f(p);
        }
        Ok(t)
    }

    /// Parse rows of ASCII art. `#` is a wall; anything else is floor.
    /// Blank leading and trailing lines are ignored.
    pub fn from_ascii(text: &str) -> Result<Self, TerrainError> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim_end)
            .skip_while(|l| l.is_empty())
            .collect();
        let rows: Vec<&str> = match rows.iter().rposition(|l| !l.is_empty()) {
            Some(last) => rows[..=last].to_vec(),
            None => return Err(TerrainError::Empty),
        };
        Self::from_rows(&rows)
    }

    /// Build from a slice of equally long rows.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, TerrainError> {
        let expected = rows.first().map_or(0, |r| r.as_ref().chars().count());
        if expected == 0 {
            return Err(TerrainError::Empty);
        }
        let mut tiles = Vec::with_capacity(expected * rows.len());
        for (row, line) in rows.iter().enumerate() {
            let before = tiles.len();
            tiles.extend(line.as_ref().chars().map(Tile::from));
            let found = tiles.len() - before;
            if found != expected {
                return Err(TerrainError::RaggedRow {
                    row,
                    expected,
                    found,
                });
            }
        }
        Ok(Self {
            width: expected as i32,
            height: rows.len() as i32,
            tiles,
        })
    }

    /// Width in cells.
    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Height in cells.
    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// The range `[0, width) × [0, height)`.
    #[inline]
    pub fn bounds(&self) -> Range {
        Range::new(0, 0, self.width, self.height)
    }

    /// Whether `p` lies inside the terrain.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.within(self.width, self.height)
    }

    #[inline]
    fn index(&self, p: Point) -> usize {
        (p.y * self.width + p.x) as usize
    }

    /// Get the tile at a point, or `None` if out of bounds.
    pub fn at(&self, p: Point) -> Option<Tile> {
        if !self.contains(p) {
            return None;
        }
        Some(self.tiles[self.index(p)])
    }

    /// Set the tile at a point. Does nothing if out of bounds.
    pub fn set(&mut self, p: Point, tile: Tile) {
        if !self.contains(p) {
            return;
        }
        let i = self.index(p);
        self.tiles[i] = tile;
    }

    /// Whether `p` is a wall. Points outside the terrain count as walls.
    #[inline]
    pub fn is_wall(&self, p: Point) -> bool {
        self.at(p).is_none_or(Tile::is_wall)
    }

    /// Row-major tiles.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }
}

impl fmt::Display for Terrain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.tiles.chunks(self.width as usize) {
            for t in row {
                write!(f, "{}", t.glyph())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
