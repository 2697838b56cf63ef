//! **gradient-core** — core types for the *gradient* grid pathing crates.
//!
//! This crate provides the geometry primitives ([`Point`], [`Direction`],
//! [`Range`]) and the wall/floor [`Terrain`] map consumed by
//! `gradient-paths`.

pub mod geom;
pub mod terrain;

pub use geom::{Direction, Point, Range, RangeIter};
pub use terrain::{Terrain, TerrainError, Tile};
