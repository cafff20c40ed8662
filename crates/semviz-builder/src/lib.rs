//! Semantic-model document builder
//!
//! Turns a directory of semantic-layer YAML files into the document the
//! viewer loads:
//!
//! ```text
//! *.view.yaml  ──► views  → schema → view → { dimensions, measures } → field
//! *.topic.yaml ──► topics → topic  → { base_view ref, join refs... }
//!              └─► joins  → topic  → { join refs... }   (topics with joins only)
//! ```
//!
//! Files that are not valid YAML, or whose top level is not a mapping, are
//! skipped with a warning. I/O failures abort the build.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use semviz_types::{
    FieldType, RefType, SemanticNode, DIMENSIONS_GROUP, JOINS_SECTION, MEASURES_GROUP,
    TOPICS_SECTION, VIEWS_SECTION,
};
use serde_yaml::{Mapping, Value};
use thiserror::Error;

const VIEW_SUFFIX: &str = ".view.yaml";
const TOPIC_SUFFIX: &str = ".topic.yaml";
const DEFAULT_SCHEMA: &str = "UNKNOWN";
/// Name of the document root
pub const MODEL_ROOT: &str = "omni";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to encode document: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BuildError>;

// ---------------------------------------------------------------------------
// Parsed sources
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ViewDef {
    pub name: String,
    pub schema: String,
    pub table_name: String,
    /// `dimensions` then `measures`, each only when it has fields
    pub groups: Vec<SemanticNode>,
}

impl ViewDef {
    pub fn field_count(&self) -> usize {
        self.groups.iter().map(|g| g.children.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopicDef {
    pub name: String,
    pub label: String,
    pub base_view: String,
    /// Joined views, nested joins flattened depth-first
    pub joined_views: Vec<String>,
}

/// Everything found under a model root
#[derive(Debug, Clone, Default)]
pub struct ModelSources {
    pub views: Vec<ViewDef>,
    pub topics: Vec<TopicDef>,
    pub skipped: Vec<PathBuf>,
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn get_string(map: &Mapping, key: &str) -> Option<String> {
    map.get(key).and_then(scalar_string)
}

fn read_mapping(path: &Path) -> Result<Option<Mapping>> {
    let content = std::fs::read_to_string(path).map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    match serde_yaml::from_str::<Value>(&content) {
        Ok(Value::Mapping(map)) => Ok(Some(map)),
        Ok(_) => {
            tracing::warn!(path = %path.display(), "Skipping file: top level is not a mapping");
            Ok(None)
        }
        Err(source) => Err(BuildError::Yaml {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Like [`read_mapping`], but a parse failure skips the file
fn load_mapping(path: &Path) -> Result<Option<Mapping>> {
    match read_mapping(path) {
        Err(e @ BuildError::Yaml { .. }) => {
            tracing::warn!(error = %e, "Skipping unparseable file");
            Ok(None)
        }
        other => other,
    }
}

fn file_stem<'a>(path: &'a Path, suffix: &str) -> Option<&'a str> {
    path.file_name()?.to_str()?.strip_suffix(suffix)
}

/// Field leaves of one `dimensions` / `measures` mapping, in file order
fn parse_fields(group: &Mapping, field_type: FieldType) -> Vec<SemanticNode> {
    group
        .iter()
        .filter_map(|(name, meta)| {
            let name = scalar_string(name)?;
            let mut field = SemanticNode::field(name, field_type);
            if let Value::Mapping(meta) = meta {
                field.sql = get_string(meta, "sql");
                field.aggregate_type = get_string(meta, "aggregate_type");
                field.format = get_string(meta, "format");
                field.label = get_string(meta, "label");
                field.primary_key = meta
                    .get("primary_key")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
            }
            Some(field)
        })
        .collect()
}

pub fn parse_view(name: &str, data: &Mapping) -> ViewDef {
    let groups = [DIMENSIONS_GROUP, MEASURES_GROUP]
        .into_iter()
        .filter_map(|group| {
            let field_type = FieldType::from_group(group)?;
            let Some(Value::Mapping(fields)) = data.get(group) else {
                return None;
            };
            let children = parse_fields(fields, field_type);
            (!children.is_empty()).then(|| SemanticNode::new(group).with_children(children))
        })
        .collect();

    ViewDef {
        name: name.to_string(),
        schema: get_string(data, "schema").unwrap_or_else(|| DEFAULT_SCHEMA.to_string()),
        table_name: get_string(data, "table_name").unwrap_or_else(|| name.to_uppercase()),
        groups,
    }
}

fn flatten_joins(joins: &Mapping, out: &mut Vec<String>) {
    for (view, nested) in joins {
        if let Some(view) = scalar_string(view) {
            out.push(view);
        }
        if let Value::Mapping(nested) = nested {
            flatten_joins(nested, out);
        }
    }
}

pub fn parse_topic(name: &str, data: &Mapping) -> TopicDef {
    let mut joined_views = Vec::new();
    if let Some(Value::Mapping(joins)) = data.get("joins") {
        flatten_joins(joins, &mut joined_views);
    }
    TopicDef {
        name: name.to_string(),
        label: get_string(data, "label").unwrap_or_else(|| name.to_string()),
        base_view: get_string(data, "base_view").unwrap_or_else(|| name.to_string()),
        joined_views,
    }
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    let entries = std::fs::read_dir(dir).map_err(|source| BuildError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| BuildError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        paths.push(entry.path());
    }
    paths.sort();
    for path in paths {
        if path.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

/// Walk `root` recursively (sorted) and parse every view and topic file
pub fn scan(root: &Path) -> Result<ModelSources> {
    let mut files = Vec::new();
    collect_files(root, &mut files)?;

    let mut sources = ModelSources::default();
    for path in files {
        if let Some(name) = file_stem(&path, VIEW_SUFFIX) {
            match load_mapping(&path)? {
                Some(data) => sources.views.push(parse_view(name, &data)),
                None => sources.skipped.push(path.clone()),
            }
        } else if let Some(name) = file_stem(&path, TOPIC_SUFFIX) {
            match load_mapping(&path)? {
                Some(data) => sources.topics.push(parse_topic(name, &data)),
                None => sources.skipped.push(path.clone()),
            }
        }
    }

    tracing::debug!(
        views = sources.views.len(),
        topics = sources.topics.len(),
        skipped = sources.skipped.len(),
        "Scanned model root"
    );
    Ok(sources)
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

fn join_refs(topic: &TopicDef) -> impl Iterator<Item = SemanticNode> + '_ {
    topic
        .joined_views
        .iter()
        .map(|v| SemanticNode::reference(v.clone(), RefType::Join))
}

/// Assemble the document: `topics`, `joins`, `views` in that order
pub fn build_document(sources: &ModelSources) -> SemanticNode {
    let mut topics: Vec<&TopicDef> = sources.topics.iter().collect();
    topics.sort_by(|a, b| a.name.cmp(&b.name));

    let topic_nodes = topics
        .iter()
        .map(|topic| {
            let mut children = vec![SemanticNode::reference(
                topic.base_view.clone(),
                RefType::BaseView,
            )];
            children.extend(join_refs(topic));
            let mut node = SemanticNode::new(topic.name.clone())
                .with_label(topic.label.clone())
                .with_children(children);
            node.base_view = Some(topic.base_view.clone());
            node
        })
        .collect();

    let join_nodes = topics
        .iter()
        .filter(|topic| !topic.joined_views.is_empty())
        .map(|topic| {
            SemanticNode::new(topic.name.clone())
                .with_label(topic.label.clone())
                .with_children(join_refs(topic).collect())
        })
        .collect();

    let mut schemas: BTreeMap<&str, Vec<&ViewDef>> = BTreeMap::new();
    for view in &sources.views {
        schemas.entry(view.schema.as_str()).or_default().push(view);
    }
    let schema_nodes = schemas
        .into_iter()
        .map(|(schema, mut views)| {
            views.sort_by(|a, b| a.name.cmp(&b.name));
            SemanticNode::new(schema).with_children(
                views
                    .into_iter()
                    .map(|v| {
                        SemanticNode::new(v.name.clone())
                            .with_table_name(v.table_name.clone())
                            .with_children(v.groups.clone())
                    })
                    .collect(),
            )
        })
        .collect();

    SemanticNode::new(MODEL_ROOT).with_children(vec![
        SemanticNode::new(TOPICS_SECTION).with_children(topic_nodes),
        SemanticNode::new(JOINS_SECTION).with_children(join_nodes),
        SemanticNode::new(VIEWS_SECTION).with_children(schema_nodes),
    ])
}

pub fn build_from_dir(root: &Path) -> Result<SemanticNode> {
    Ok(build_document(&scan(root)?))
}

pub fn to_json(document: &SemanticNode, pretty: bool) -> Result<String> {
    let mut json = if pretty {
        serde_json::to_string_pretty(document)?
    } else {
        serde_json::to_string(document)?
    };
    json.push('\n');
    Ok(json)
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub topics: usize,
    pub joins: usize,
    pub schemas: usize,
    pub views: usize,
    pub fields: usize,
}

impl BuildSummary {
    pub fn compute(document: &SemanticNode) -> Self {
        let section = |name: &str| document.child(name).map(|s| s.children.as_slice()).unwrap_or(&[]);
        let schemas = section(VIEWS_SECTION);
        BuildSummary {
            topics: section(TOPICS_SECTION).len(),
            joins: section(JOINS_SECTION).iter().map(|t| t.children.len()).sum(),
            schemas: schemas.len(),
            views: schemas.iter().map(|s| s.children.len()).sum(),
            fields: schemas
                .iter()
                .flat_map(|s| &s.children)
                .flat_map(|v| &v.children)
                .map(|g| g.children.len())
                .sum(),
        }
    }
}

impl fmt::Display for BuildSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Found {} topic(s), {} join(s), {} schema(s), {} view(s), {} field(s)",
            self.topics, self.joins, self.schemas, self.views, self.fields
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "views/ecomm/orders.view.yaml",
            r#"
schema: ecomm
dimensions:
  id:
    sql: '"ID"'
    primary_key: true
  status:
    label: Order Status
measures:
  total:
    sql: ${orders.amount}
    aggregate_type: sum
    format: usdcurrency
"#,
        );
        write(
            dir.path(),
            "views/crm/customers.view.yaml",
            "schema: crm\ntable_name: CUST\ndimensions:\n  name: {}\n",
        );
        write(dir.path(), "views/misc/empty.view.yaml", "measures: {}\n");
        write(
            dir.path(),
            "topics/orders.topic.yaml",
            r#"
label: Orders
joins:
  crm__customers:
    crm__addresses: {}
  items: {}
"#,
        );
        write(dir.path(), "topics/plain.topic.yaml", "base_view: customers\n");
        write(dir.path(), "topics/broken.topic.yaml", "joins: [unclosed\n");
        write(dir.path(), "README.md", "# not a model file\n");
        dir
    }

    #[test]
    fn test_parse_view_defaults_and_fields() {
        let dir = fixture();
        let sources = scan(dir.path()).unwrap();

        let customers = sources.views.iter().find(|v| v.name == "customers").unwrap();
        assert_eq!(customers.table_name, "CUST");
        assert_eq!(customers.field_count(), 1);

        let empty = sources.views.iter().find(|v| v.name == "empty").unwrap();
        assert_eq!(empty.schema, "UNKNOWN");
        assert_eq!(empty.table_name, "EMPTY");
        assert!(empty.groups.is_empty());

        let orders = sources.views.iter().find(|v| v.name == "orders").unwrap();
        let id = &orders.groups[0].children[0];
        assert_eq!(id.sql.as_deref(), Some("\"ID\""));
        assert!(id.primary_key);
        let total = &orders.groups[1].children[0];
        assert_eq!(total.field_type, Some(FieldType::Measure));
        assert_eq!(total.aggregate_type.as_deref(), Some("sum"));
        assert_eq!(total.format.as_deref(), Some("usdcurrency"));
    }

    #[test]
    fn test_topic_joins_flatten_depth_first() {
        let dir = fixture();
        let sources = scan(dir.path()).unwrap();
        let orders = sources.topics.iter().find(|t| t.name == "orders").unwrap();
        assert_eq!(orders.base_view, "orders");
        assert_eq!(
            orders.joined_views,
            vec!["crm__customers", "crm__addresses", "items"]
        );
        assert_eq!(sources.skipped.len(), 1);
    }

    #[test]
    fn test_document_shape() {
        let dir = fixture();
        let doc = build_from_dir(dir.path()).unwrap();
        let sections: Vec<&str> = doc.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(sections, vec!["topics", "joins", "views"]);

        let topics = doc.child("topics").unwrap();
        let names: Vec<&str> = topics.children.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["orders", "plain"]);
        let plain = topics.child("plain").unwrap();
        assert_eq!(plain.base_view.as_deref(), Some("customers"));
        assert_eq!(plain.children[0].ref_type, Some(RefType::BaseView));

        let joins = doc.child("joins").unwrap();
        assert_eq!(joins.children.len(), 1);
        assert_eq!(joins.children[0].children.len(), 3);

        let schemas: Vec<&str> = doc
            .child("views")
            .unwrap()
            .children
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(schemas, vec!["UNKNOWN", "crm", "ecomm"]);

        assert_eq!(
            BuildSummary::compute(&doc),
            BuildSummary {
                topics: 2,
                joins: 3,
                schemas: 3,
                views: 3,
                fields: 4,
            }
        );
    }

    #[test]
    fn test_json_round_trips_through_wire_types() {
        let dir = fixture();
        let doc = build_from_dir(dir.path()).unwrap();
        let json = to_json(&doc, false).unwrap();
        assert!(json.ends_with('\n'));
        let parsed: SemanticNode = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn test_missing_root_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = scan(&dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, BuildError::Io { .. }));
    }
}
