//! Stackwise - Architecture Stack Editor Core
//!
//! Models a software system as an ordered stack of layers, each optionally
//! holding substacks, with directed connections and attached cost models.
//!
//! # Architecture
//!
//! - [`model`]: layers, connections, cost models and use paths
//! - [`cost`]: extract → group → bucket → format pipeline, action costs,
//!   forecasts and recommendations
//! - [`diagram`]: dependency levels and the deterministic 2D layout
//! - [`state`]: persistence, migrations, validation, undo/redo and the editor

pub mod cli;
pub mod config;
pub mod cost;
pub mod diagram;
pub mod error;
pub mod model;
pub mod state;

pub use error::{Result, StackwiseError};
