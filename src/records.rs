use egui::Pos2;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Property holding the human-facing identifier of an entity.
pub const ENTITY_ID: &str = "entity_id";

/// Property holding the relationship weight which drives rendered edge size.
pub const WEIGHT: &str = "weight";

pub type Properties = Map<String, Value>;

/// Node as delivered by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub properties: Properties,
    /// Backend provided position. Missing positions are scattered on load.
    #[serde(default)]
    pub position: Option<Pos2>,
}

impl NodeRecord {
    /// Creates a freshly-loaded node whose `entity_id` equals its id.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let mut properties = Properties::new();
        properties.insert(ENTITY_ID.to_string(), Value::String(id.clone()));
        Self {
            labels: vec![id.clone()],
            id,
            properties,
            position: None,
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn with_position(mut self, position: Pos2) -> Self {
        self.position = Some(position);
        self
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.properties.get(ENTITY_ID).and_then(Value::as_str)
    }

    /// Renders a property as display text. Strings are shown without quotes.
    pub fn property_text(&self, key: &str) -> Option<String> {
        self.properties.get(key).map(value_text)
    }
}

/// Relationship as delivered by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub id: String,
    /// Render graph key. Assigned by the engine on load, rewritten on rename.
    #[serde(default, rename = "dynamicId")]
    pub dynamic_id: String,
    pub source: String,
    pub target: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub properties: Properties,
}

impl EdgeRecord {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            dynamic_id: String::new(),
            source: source.into(),
            target: target.into(),
            kind: None,
            properties: Properties::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Numeric weight. Accepts numbers and numeric strings.
    pub fn weight(&self) -> Option<f32> {
        self.properties.get(WEIGHT).and_then(value_number)
    }

    pub fn property_text(&self, key: &str) -> Option<String> {
        self.properties.get(key).map(value_text)
    }
}

/// Payload of a graph fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

impl GraphData {
    pub fn new(nodes: Vec<NodeRecord>, edges: Vec<EdgeRecord>) -> Self {
        Self { nodes, edges }
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

pub(crate) fn value_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub(crate) fn value_number(v: &Value) -> Option<f32> {
    match v {
        Value::Number(n) => n.as_f64().map(|n| n as f32),
        Value::String(s) => s.trim().parse::<f32>().ok(),
        _ => None,
    }
    .filter(|w| w.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fresh_node_entity_id_matches_id() {
        let n = NodeRecord::new("1");
        assert_eq!(n.entity_id(), Some("1"));
        assert_eq!(n.labels, vec!["1".to_string()]);
    }

    #[test]
    fn weight_accepts_numeric_strings() {
        let e = EdgeRecord::new("e", "a", "b").with_property(WEIGHT, json!("2.5"));
        assert_eq!(e.weight(), Some(2.5));

        let e = EdgeRecord::new("e", "a", "b").with_property(WEIGHT, json!("heavy"));
        assert_eq!(e.weight(), None);
    }

    #[test]
    fn backend_payload_parses() {
        let text = r#"{
            "nodes": [{"id": "a", "labels": ["a"], "properties": {"entity_id": "a"}}],
            "edges": [{"id": "r1", "source": "a", "target": "a", "type": "SELF", "properties": {"weight": 1}}]
        }"#;
        let data = GraphData::from_json(text).unwrap();
        assert_eq!(data.nodes.len(), 1);
        assert_eq!(data.edges[0].kind.as_deref(), Some("SELF"));
        assert!(data.edges[0].dynamic_id.is_empty());
        assert!(data.nodes[0].position.is_none());
    }

    #[test]
    fn property_text_unquotes_strings() {
        let n = NodeRecord::new("a")
            .with_property("description", json!("plain"))
            .with_property("rank", json!(3));
        assert_eq!(n.property_text("description").as_deref(), Some("plain"));
        assert_eq!(n.property_text("rank").as_deref(), Some("3"));
        assert_eq!(n.property_text("missing"), None);
    }
}
