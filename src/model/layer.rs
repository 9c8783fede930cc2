//! Layers, substacks and the connections between them.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::cost_model::CostModel;

/// Identifier of a layer or substack.
///
/// Older projects used numeric ids for layers and string ids such as `"1_1"`
/// for substacks. Both deserialize into the same string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(String);

impl LayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LayerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for LayerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u64> for LayerId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl Serialize for LayerId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for LayerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(i64),
            Float(f64),
            Str(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Int(n) => LayerId(n.to_string()),
            RawId::Float(n) => LayerId(n.to_string()),
            RawId::Str(s) => LayerId(s),
        })
    }
}

/// Protocol of a connection, used for diagram styling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConnectionType {
    #[default]
    Http,
    Grpc,
    Event,
    Database,
    Cache,
    Message,
    Sync,
    Async,
    Other(String),
}

impl ConnectionType {
    pub fn as_str(&self) -> &str {
        match self {
            ConnectionType::Http => "HTTP",
            ConnectionType::Grpc => "gRPC",
            ConnectionType::Event => "Event",
            ConnectionType::Database => "Database",
            ConnectionType::Cache => "Cache",
            ConnectionType::Message => "Message",
            ConnectionType::Sync => "Sync",
            ConnectionType::Async => "Async",
            ConnectionType::Other(s) => s,
        }
    }

    /// Human-readable label shown in diagram legends.
    pub fn label(&self) -> &str {
        match self {
            ConnectionType::Http => "HTTP/REST",
            ConnectionType::Grpc => "gRPC",
            ConnectionType::Event => "Event Bus",
            ConnectionType::Database => "Database Query",
            ConnectionType::Cache => "Cache",
            ConnectionType::Message => "Message Queue",
            ConnectionType::Sync => "Synchronous",
            ConnectionType::Async => "Asynchronous",
            ConnectionType::Other(s) => s,
        }
    }
}

impl From<String> for ConnectionType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "HTTP" => ConnectionType::Http,
            "gRPC" => ConnectionType::Grpc,
            "Event" => ConnectionType::Event,
            "Database" => ConnectionType::Database,
            "Cache" => ConnectionType::Cache,
            "Message" => ConnectionType::Message,
            "Sync" => ConnectionType::Sync,
            "Async" => ConnectionType::Async,
            _ => ConnectionType::Other(s),
        }
    }
}

impl From<&str> for ConnectionType {
    fn from(s: &str) -> Self {
        ConnectionType::from(s.to_string())
    }
}

impl From<ConnectionType> for String {
    fn from(c: ConnectionType) -> Self {
        c.as_str().to_string()
    }
}

/// Directed edge from the owning layer to `target_id`.
///
/// Legacy bare-id connections are rewritten into this shape by
/// [`crate::state::migration`] before the typed model ever sees them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub target_id: LayerId,
    #[serde(rename = "type", default)]
    pub connection_type: ConnectionType,
}

impl Connection {
    pub fn new(target_id: impl Into<LayerId>, connection_type: ConnectionType) -> Self {
        Self {
            target_id: target_id.into(),
            connection_type,
        }
    }
}

/// Lifecycle status of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LayerStatus {
    #[default]
    Active,
    Inactive,
    Deprecated,
}

impl LayerStatus {
    /// Sort rank used when ordering layers by status.
    pub fn rank(self) -> u8 {
        match self {
            LayerStatus::Active => 0,
            LayerStatus::Inactive => 1,
            LayerStatus::Deprecated => 2,
        }
    }
}

/// A named architectural component.
///
/// Substacks share this schema; only one level of nesting is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    #[serde(rename = "type", default = "default_layer_type")]
    pub layer_type: String,
    #[serde(default)]
    pub status: LayerStatus,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub technology: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_model: Option<CostModel>,
    #[serde(default)]
    pub connections: Vec<Connection>,
    #[serde(default)]
    pub substacks: Vec<Layer>,
}

fn default_layer_type() -> String {
    "Other".to_string()
}

impl Layer {
    pub fn new(id: impl Into<LayerId>, name: &str) -> Self {
        Self {
            id: id.into(),
            name: name.to_string(),
            layer_type: default_layer_type(),
            status: LayerStatus::Active,
            description: String::new(),
            technology: String::new(),
            cost_model: None,
            connections: Vec::new(),
            substacks: Vec::new(),
        }
    }

    pub fn with_type(mut self, layer_type: &str) -> Self {
        self.layer_type = layer_type.to_string();
        self
    }

    pub fn with_cost(mut self, cost_model: CostModel) -> Self {
        self.cost_model = Some(cost_model);
        self
    }

    pub fn with_substack(mut self, substack: Layer) -> Self {
        self.substacks.push(substack);
        self
    }

    pub fn connect_to(mut self, target: impl Into<LayerId>) -> Self {
        self.connections
            .push(Connection::new(target, ConnectionType::default()));
        self
    }

    pub fn is_connected_to(&self, target: &LayerId) -> bool {
        self.connections.iter().any(|c| &c.target_id == target)
    }

    pub fn has_substacks(&self) -> bool {
        !self.substacks.is_empty()
    }
}

/// Main layers followed by their substacks, parent first.
pub fn all_layers(layers: &[Layer]) -> Vec<&Layer> {
    let mut out = Vec::new();
    for layer in layers {
        out.push(layer);
        out.extend(layer.substacks.iter());
    }
    out
}

/// Look up a layer or substack by id.
pub fn find_layer<'a>(layers: &'a [Layer], id: &LayerId) -> Option<&'a Layer> {
    all_layers(layers).into_iter().find(|l| &l.id == id)
}
