//! Roguelike collaborators for gradient path queries: a Bresenham
//! line-of-sight oracle and simple area effects.

pub mod effects;
pub mod los;

pub use effects::{BurstEffect, PointEffect};
pub use los::{BresenhamLos, bresenham};
