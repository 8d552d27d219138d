//! VTEC code dictionaries

mod action;
mod phenomenon;
mod significance;

pub use action::Action;
pub use phenomenon::Phenomenon;
pub use significance::SignificanceLevel;
