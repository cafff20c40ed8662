//! Semantic-model document types
//!
//! These types define the JSON shape of the semantic-model document
//! shared by the viewer (`semviz-ui`, `semviz-graph`) and the producer
//! (`semviz-builder`).
//!
//! # Document shape
//!
//! ```text
//! root
//! ├── topics   → topic → { base_view ref, join refs... }
//! ├── joins    → topic → { join refs... }
//! └── views    → schema → view (table_name) → { dimensions, measures } → field
//! ```
//!
//! Keys are snake_case on the wire. The camelCase spellings produced by some
//! exporters (`fieldType`, `tableName`, ...) are accepted as aliases on input.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// SECTION NAMES
// ============================================================================

/// Top-level section holding schemas and their views
pub const VIEWS_SECTION: &str = "views";
/// Top-level section holding topics and their view references
pub const TOPICS_SECTION: &str = "topics";
/// Top-level section holding per-topic join references
pub const JOINS_SECTION: &str = "joins";

/// Group container name for dimension fields under a view
pub const DIMENSIONS_GROUP: &str = "dimensions";
/// Group container name for measure fields under a view
pub const MEASURES_GROUP: &str = "measures";

/// Separator used by namespaced view identifiers (`schema__view`)
pub const NAMESPACE_SEPARATOR: &str = "__";

// ============================================================================
// ENUMS
// ============================================================================

/// Field kind of a leaf under a view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Dimension,
    Measure,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Dimension => "dimension",
            FieldType::Measure => "measure",
        }
    }

    /// Field type implied by a group container name (`dimensions` / `measures`)
    pub fn from_group(group: &str) -> Option<Self> {
        match group {
            DIMENSIONS_GROUP => Some(FieldType::Dimension),
            MEASURES_GROUP => Some(FieldType::Measure),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role of a reference node under topics/joins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RefType {
    #[serde(rename = "base_view", alias = "baseView")]
    BaseView,
    #[serde(rename = "join")]
    Join,
}

impl RefType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefType::BaseView => "base_view",
            RefType::Join => "join",
        }
    }

    /// Human-readable role shown in detail panels
    pub fn role(&self) -> &'static str {
        match self {
            RefType::BaseView => "base view",
            RefType::Join => "join",
        }
    }
}

/// Condition attached to a default filter entry.
///
/// Either an operator mapping (`{ "is": "open", "not": ["a", "b"] }`)
/// or a bare scalar (`true`, `"2024"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterCondition {
    Operators(BTreeMap<String, serde_json::Value>),
    Value(serde_json::Value),
}

// ============================================================================
// SEMANTIC NODE
// ============================================================================

/// A node of the semantic-model tree.
///
/// Leaves carry field or reference metadata; containers carry children.
/// All metadata is optional and omitted from the wire when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SemanticNode {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(
        default,
        deserialize_with = "nullable_children",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub children: Vec<SemanticNode>,

    /// Leaf weight; absent counts as 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,

    // Field metadata
    #[serde(default, alias = "fieldType", skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
    #[serde(default, alias = "aggregateType", skip_serializing_if = "Option::is_none")]
    pub aggregate_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
    #[serde(default, alias = "primaryKey", skip_serializing_if = "is_false")]
    pub primary_key: bool,

    // Reference metadata
    #[serde(default, alias = "refType", skip_serializing_if = "Option::is_none")]
    pub ref_type: Option<RefType>,
    #[serde(default, alias = "baseView", skip_serializing_if = "Option::is_none")]
    pub base_view: Option<String>,

    // View metadata
    #[serde(default, alias = "tableName", skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,

    // Topic metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, alias = "displayOrder", skip_serializing_if = "Option::is_none")]
    pub display_order: Option<serde_json::Number>,
    #[serde(default, alias = "defaultFilters", skip_serializing_if = "Option::is_none")]
    pub default_filters: Option<BTreeMap<String, FilterCondition>>,
    #[serde(default, alias = "aiContextChars", skip_serializing_if = "Option::is_none")]
    pub ai_context_chars: Option<u64>,
    #[serde(default, alias = "sampleQueriesChars", skip_serializing_if = "Option::is_none")]
    pub sample_queries_chars: Option<u64>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// `"children": null` is treated the same as a missing key.
fn nullable_children<'de, D>(deserializer: D) -> Result<Vec<SemanticNode>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<SemanticNode>>::deserialize(deserializer)?.unwrap_or_default())
}

impl SemanticNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Field leaf (`value = 1`) of the given type
    pub fn field(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            value: Some(1.0),
            field_type: Some(field_type),
            ..Self::new(name)
        }
    }

    /// Reference leaf (`value = 1`) naming a view
    pub fn reference(view: impl Into<String>, ref_type: RefType) -> Self {
        Self {
            value: Some(1.0),
            ref_type: Some(ref_type),
            ..Self::new(view)
        }
    }

    pub fn with_children(mut self, children: Vec<SemanticNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    /// Label if present, otherwise the name
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Leaf weight used for counting (`value ?? 1`)
    pub fn leaf_value(&self) -> f64 {
        self.value.unwrap_or(1.0)
    }

    /// Strip children, keeping only the node's own metadata
    pub fn without_children(&self) -> Self {
        Self {
            children: Vec::new(),
            ..self.clone()
        }
    }

    /// Total number of nodes in this subtree (including self)
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// Direct child by name
    pub fn child(&self, name: &str) -> Option<&SemanticNode> {
        self.children.iter().find(|c| c.name == name)
    }
}

/// Render a filter value the way it is shown to users: strings unquoted,
/// arrays as `[a, b]`.
pub fn display_filter_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => format!(
            "[{}]",
            items
                .iter()
                .map(display_filter_value)
                .collect::<Vec<_>>()
                .join(", ")
        ),
        serde_json::Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_snake_case_document() {
        let json = r#"{
            "name": "omni",
            "children": [
                {"name": "views", "children": [
                    {"name": "s1", "children": [
                        {"name": "orders", "table_name": "ORDERS", "children": [
                            {"name": "measures", "children": [
                                {"name": "total", "value": 1, "field_type": "measure",
                                 "aggregate_type": "sum", "sql": "${amount}"}
                            ]}
                        ]}
                    ]}
                ]},
                {"name": "topics", "children": [
                    {"name": "orders_topic", "base_view": "orders", "children": [
                        {"name": "orders", "value": 1, "ref_type": "base_view"},
                        {"name": "s1__customers", "value": 1, "ref_type": "join"}
                    ]}
                ]}
            ]
        }"#;

        let root: SemanticNode = serde_json::from_str(json).unwrap();
        assert_eq!(root.node_count(), 10);

        let orders = &root.children[0].children[0].children[0];
        assert_eq!(orders.table_name.as_deref(), Some("ORDERS"));

        let total = &orders.children[0].children[0];
        assert_eq!(total.field_type, Some(FieldType::Measure));
        assert_eq!(total.aggregate_type.as_deref(), Some("sum"));

        let topic = &root.children[1].children[0];
        assert_eq!(topic.base_view.as_deref(), Some("orders"));
        assert_eq!(topic.children[0].ref_type, Some(RefType::BaseView));
        assert_eq!(topic.children[1].ref_type, Some(RefType::Join));
    }

    #[test]
    fn test_parse_camel_case_aliases() {
        let json = r#"{"name": "x", "fieldType": "dimension", "tableName": "T",
                       "refType": "baseView", "baseView": "v", "displayOrder": 3,
                       "aiContextChars": 120, "sampleQueriesChars": 40}"#;
        let node: SemanticNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.field_type, Some(FieldType::Dimension));
        assert_eq!(node.table_name.as_deref(), Some("T"));
        assert_eq!(node.ref_type, Some(RefType::BaseView));
        assert_eq!(node.base_view.as_deref(), Some("v"));
        assert_eq!(node.display_order.map(|n| n.to_string()), Some("3".to_string()));
        assert_eq!(node.ai_context_chars, Some(120));
        assert_eq!(node.sample_queries_chars, Some(40));
    }

    #[test]
    fn test_null_children_is_leaf() {
        let node: SemanticNode = serde_json::from_str(r#"{"name": "a", "children": null}"#).unwrap();
        assert!(node.is_leaf());
        assert_eq!(node.leaf_value(), 1.0);
    }

    #[test]
    fn test_default_filters_shapes() {
        let json = r#"{"name": "t", "default_filters": {
            "status": {"is": "open", "not": ["a", "b"]},
            "is_active": true
        }}"#;
        let node: SemanticNode = serde_json::from_str(json).unwrap();
        let filters = node.default_filters.unwrap();

        match &filters["status"] {
            FilterCondition::Operators(ops) => {
                assert_eq!(display_filter_value(&ops["is"]), "open");
                assert_eq!(display_filter_value(&ops["not"]), "[a, b]");
            }
            other => panic!("expected operators, got {:?}", other),
        }
        assert_eq!(
            filters["is_active"],
            FilterCondition::Value(serde_json::Value::Bool(true))
        );
    }

    #[test]
    fn test_serialize_omits_absent_fields() {
        let node = SemanticNode::field("total", FieldType::Measure);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "total", "value": 1.0, "field_type": "measure"})
        );
    }

    #[test]
    fn test_display_name_prefers_label() {
        let node = SemanticNode::new("orders_topic").with_label("Orders");
        assert_eq!(node.display_name(), "Orders");
        assert_eq!(SemanticNode::new("plain").display_name(), "plain");
    }

    #[test]
    fn test_invalid_field_type_is_rejected() {
        let result: Result<SemanticNode, _> =
            serde_json::from_str(r#"{"name": "x", "field_type": "metric"}"#);
        assert!(result.is_err());
    }
}
