use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Data field holding the edge id of a condition/loop node's true branch
pub const TRUE_EDGE_FIELD: &str = "trueEdgeId";

/// Data field holding the edge id of a condition node's false branch
pub const FALSE_EDGE_FIELD: &str = "falseEdgeId";

/// Value object: Node ID
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl NodeId {
    /// Create a node id from anything string-like
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a guaranteed-unique node id
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kind of a workflow node
///
/// This is the discriminant over which all type-specific behavior is
/// matched exhaustively, so adding a node kind is a compiler-checked
/// change. Serde tags match the editor wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    /// API entry point for the built endpoint
    ApiEntry,

    /// Extracts parameters from the incoming request
    ParameterExtractor,

    /// Free-form logic step
    Logic,

    /// Terminal response step
    Response,

    /// Generates a JWT
    JwtGenerate,

    /// Verifies a JWT
    JwtVerify,

    /// Database operation step
    DatabaseOperation,

    /// Conditional branch with true/false outputs
    Condition,

    /// Loop over a collection with a single loop output
    Loop,
}

impl NodeKind {
    /// Whether this kind keeps branch-edge back-references in its data payload
    pub fn has_branches(&self) -> bool {
        matches!(self, NodeKind::Condition | NodeKind::Loop)
    }

    /// Map an outgoing source handle to the data field that records the branch edge
    ///
    /// Condition nodes expose `"true"` and `"false"` handles; loop nodes
    /// expose a single `"loop"` handle recorded in the true-branch field.
    /// Returns `None` for unrecognized handles and non-branching kinds.
    pub fn branch_field(&self, handle: &str) -> Option<&'static str> {
        match self {
            NodeKind::Condition => match handle {
                "true" => Some(TRUE_EDGE_FIELD),
                "false" => Some(FALSE_EDGE_FIELD),
                _ => None,
            },
            NodeKind::Loop => match handle {
                "loop" => Some(TRUE_EDGE_FIELD),
                _ => None,
            },
            NodeKind::ApiEntry
            | NodeKind::ParameterExtractor
            | NodeKind::Logic
            | NodeKind::Response
            | NodeKind::JwtGenerate
            | NodeKind::JwtVerify
            | NodeKind::DatabaseOperation => None,
        }
    }
}

/// 2D canvas position of a node
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

impl Position {
    /// Create a position
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Return this position shifted by a delta on both axes
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// A typed unit of workflow logic with position and configuration data
///
/// Invariants: `id` is unique within the owning graph and `kind` is
/// never changed after creation (no store operation rewrites it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier within the graph
    pub id: NodeId,

    /// Discriminated type tag, immutable after creation
    #[serde(rename = "type")]
    pub kind: NodeKind,

    /// Canvas position
    pub position: Position,

    /// Type-specific configuration payload
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl Node {
    /// Create a node with an empty data payload
    pub fn new(id: impl Into<String>, kind: NodeKind, position: Position) -> Self {
        Self {
            id: NodeId::new(id),
            kind,
            position,
            data: Map::new(),
        }
    }

    /// Attach a data payload to the node
    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = data;
        self
    }

    /// Human-readable label, falling back to the node id
    pub fn label(&self) -> &str {
        self.data
            .get("label")
            .and_then(Value::as_str)
            .unwrap_or(&self.id.0)
    }

    /// Read a branch-edge back-reference by data field name
    pub fn branch_ref(&self, field: &str) -> Option<&str> {
        self.data.get(field).and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_kind_wire_tags() {
        let tags = vec![
            (NodeKind::ApiEntry, "api-entry"),
            (NodeKind::ParameterExtractor, "parameter-extractor"),
            (NodeKind::Logic, "logic"),
            (NodeKind::Response, "response"),
            (NodeKind::JwtGenerate, "jwt-generate"),
            (NodeKind::JwtVerify, "jwt-verify"),
            (NodeKind::DatabaseOperation, "database-operation"),
            (NodeKind::Condition, "condition"),
            (NodeKind::Loop, "loop"),
        ];

        for (kind, tag) in tags {
            assert_eq!(serde_json::to_value(kind).unwrap(), json!(tag));
            let parsed: NodeKind = serde_json::from_value(json!(tag)).unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn test_branch_field_mapping() {
        assert_eq!(
            NodeKind::Condition.branch_field("true"),
            Some(TRUE_EDGE_FIELD)
        );
        assert_eq!(
            NodeKind::Condition.branch_field("false"),
            Some(FALSE_EDGE_FIELD)
        );
        assert_eq!(NodeKind::Condition.branch_field("other"), None);
        assert_eq!(NodeKind::Loop.branch_field("loop"), Some(TRUE_EDGE_FIELD));
        assert_eq!(NodeKind::Loop.branch_field("true"), None);
        assert_eq!(NodeKind::Logic.branch_field("true"), None);
    }

    #[test]
    fn test_node_serialization_shape() {
        let mut data = Map::new();
        data.insert("condition".to_string(), json!("a > b"));
        let node = Node::new("c1", NodeKind::Condition, Position::new(10.0, 20.0)).with_data(data);

        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["id"], json!("c1"));
        assert_eq!(value["type"], json!("condition"));
        assert_eq!(value["position"]["x"], json!(10.0));
        assert_eq!(value["data"]["condition"], json!("a > b"));

        let back: Node = serde_json::from_value(value).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn test_node_label_fallback() {
        let node = Node::new("n1", NodeKind::Logic, Position::default());
        assert_eq!(node.label(), "n1");

        let mut data = Map::new();
        data.insert("label".to_string(), json!("Sum totals"));
        let node = node.with_data(data);
        assert_eq!(node.label(), "Sum totals");
    }
}
