//! Workout model: the two activity variants and their derived metrics.
//!
//! A [`Workout`] is immutable once built. Pace (running) and speed (cycling)
//! are computed in the constructor and stored; nothing recomputes them later,
//! including after a restore from storage.

mod display;
mod model;

pub use display::{Detail, ListEntry};
pub use model::{MONTHS, Workout, WorkoutKind, WorkoutType, describe, workout_id};
