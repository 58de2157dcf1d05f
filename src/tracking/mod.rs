//! Derivation of anatomical output from the raw parameter stream.

mod deriver;
mod eyes;
pub mod math;
mod mouth;

pub use deriver::Deriver;
pub use eyes::{EyeState, Eyes};
pub use mouth::MouthState;
