//! Game entities.
//!
//! Players own one or more cells; food pellets and ejected mass are free
//! standing. Cross references are ids, never pointers, so removal can't
//! leave anything dangling.

mod cell;
mod ejected_mass;
mod food;
mod player;

pub use cell::{CellId, PlayerCell};
pub use ejected_mass::{EjectedMass, MassId};
pub use food::{Food, FoodId};
pub use player::Player;
