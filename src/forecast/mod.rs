//! Live forecast path.
//!
//! Responsibilities:
//!
//! - partition cleaned records into independent (troop, cookie type) groups
//! - fit a per-group quadratic-time OLS model, or fall back to the last
//!   observed value when too few distinct periods exist
//! - clamp model output into the group's historical sales bounds

pub mod forecaster;
pub mod groups;

pub use forecaster::*;
pub use groups::*;
