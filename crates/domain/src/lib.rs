#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

//! Ordering of the exercises of a workout plan session.
//!
//! The exercises of a session are split into sections. Within a section,
//! standalone exercises and supersets form one ordered list. A superset can
//! contain exercises from other sections and is shown in its host section
//! only.

mod error;
mod exercise;
mod invariant;
pub mod reorder;
mod service;
mod superset;
mod view;

pub use error::*;
pub use exercise::*;
pub use invariant::check_invariants;
pub use reorder::{
    Direction, add_exercise, add_to_superset, create_superset, dissolve_superset, move_direction,
    move_item, move_superset, remove_exercise, remove_from_superset,
};
pub use service::*;
pub use superset::{SupersetGroup, SupersetID, SupersetLink, superset_groups};
pub use view::*;
