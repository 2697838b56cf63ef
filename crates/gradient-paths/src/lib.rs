//! Weighted multi-goal distance fields ("Dijkstra maps") for grid games.
//!
//! A [`DijkstraMap`] holds a distance field over a wall/floor grid. Goals sit
//! at 0, every reachable open cell holds its cheapest cost to the nearest
//! goal, and movers walk the field downhill. On top of the field the map
//! answers a family of path queries:
//!
//! - approaching the nearest target ([`DijkstraMap::find_path`])
//! - running from danger ([`DijkstraMap::find_flee_path`])
//! - moving into range of a ranged attack ([`DijkstraMap::find_attack_path`])
//! - positioning an area effect ([`DijkstraMap::find_technique_path`])
//! - nearest-target searches and flood fills ([`DijkstraMap::find_nearest`],
//!   [`DijkstraMap::flood_fill`])
//! - the same for movers larger than one cell ([`DijkstraMap::find_path_large`])
//!
//! Every query takes a [`Movement`] describing the turn budget, cells that
//! cannot be entered and allies that may be passed but not stopped on.
//!
//! # Field values
//!
//! | Value | Meaning |
//! |---|---|
//! | [`GOAL`] | a goal cell |
//! | `0 < v < FLOOR` | cost to the nearest goal |
//! | [`FLOOR`] | open, not (yet) reached |
//! | [`WALL`] | terrain wall or blocked cell |
//! | [`DARK`] | open but unreachable after a full scan |
//!
//! [`FieldSnapshot::state`] gives the same information as a [`CellState`].

mod attack;
mod config;
mod dijkstra_map;
mod error;
mod extract;
mod field;
mod flee;
mod grid;
mod large;
mod metric;
mod nearest;
mod scan;
mod technique;
mod traits;

pub use config::DijkstraConfig;
pub use dijkstra_map::{DijkstraMap, Movement};
pub use error::PathError;
pub use field::{CellState, DARK, FLOOR, FieldNode, FieldSnapshot, GOAL, WALL};
pub use metric::{Metric, Shape};
pub use traits::{AreaEffect, EffectPlacement, LineOfSight, ResistanceMap};
