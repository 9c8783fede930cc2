//! Project Data Model
//!
//! Layers, substacks, connections, cost models and use paths. All types are
//! plain serde data; JSON field names follow the editor's camelCase format.

pub mod cost_model;
pub mod layer;
pub mod use_path;

pub use cost_model::{CostModel, Currency, Period};
pub use layer::{all_layers, find_layer, Connection, ConnectionType, Layer, LayerId, LayerStatus};
pub use use_path::{UsageAssumptions, UsePath};
