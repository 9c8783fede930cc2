//! Dependency Diagram
//!
//! Level assignment from the connection graph and the 2D layout built on it.

pub mod layout;
pub mod levels;

pub use layout::{layout, Position};
pub use levels::calculate_levels;
