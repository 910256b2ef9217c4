//! JSON tree documents.
//!
//! ```json
//! {
//!   "edge_classes": ["appliesTo"],
//!   "nodes": [
//!     { "class": "ecology", "id": "eco", "children": [
//!       { "class": "category", "id": "animal" },
//!       { "class": "process", "id": "grow",
//!         "edges": [{ "class": "appliesTo", "id": "a1", "to": "eco/animal" }] }
//!     ]}
//!   ]
//! }
//! ```
//!
//! Edge targets are paths as understood by [`SpecTree::find_path`].
//! Property values map from JSON directly; objects must carry a `"$type"`
//! key and may list `"$interfaces"` and `"$super_interfaces"`.

use crate::target::TargetTree;
use crate::tree::SpecTree;
use archetype_core::{GraphError, GraphResult, NodeId, ObjectValue, Properties, Value};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value as Json};

const TYPE_KEY: &str = "$type";
const INTERFACES_KEY: &str = "$interfaces";
const SUPER_INTERFACES_KEY: &str = "$super_interfaces";

/// A whole tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_classes: Option<Vec<String>>,
    #[serde(default)]
    pub nodes: Vec<NodeDocument>,
}

/// One node and everything below it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeDocument {
    pub class: String,
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Json>,
    /// The node cannot carry edges.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub no_edges: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edges: Vec<EdgeDocument>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeDocument>,
}

/// An outgoing edge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeDocument {
    pub class: String,
    #[serde(default)]
    pub id: String,
    /// Path of the end node.
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Map<String, Json>>,
}

impl TreeDocument {
    /// Parse a document from JSON text.
    pub fn from_json(text: &str) -> GraphResult<Self> {
        serde_json::from_str(text).map_err(|e| GraphError::malformed(e.to_string()))
    }

    /// Render as pretty-printed JSON.
    pub fn to_json(&self) -> GraphResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| GraphError::malformed(e.to_string()))
    }

    /// Materialize the document as a tree.
    pub fn build(&self) -> GraphResult<SpecTree> {
        let mut tree = SpecTree::new();
        if let Some(classes) = &self.edge_classes {
            for class in classes {
                tree.declare_edge_class(class.clone());
            }
        }

        // Nodes first so that edges may point forward
        let mut pending = Vec::new();
        for node in &self.nodes {
            build_node(&mut tree, None, node, &mut pending)?;
        }

        for (start, edge) in pending {
            let end = tree
                .find_path(&edge.to)
                .ok_or_else(|| GraphError::path_not_found(edge.to.clone()))?;
            let id = tree.add_edge(edge.class.clone(), edge.id.clone(), start, end)?;
            if let Some(props) = &edge.properties {
                for (name, value) in props {
                    tree.set_edge_property(id, name.clone(), value_from_json(value)?)?;
                }
            }
        }

        Ok(tree)
    }

    /// Capture a tree as a document.
    pub fn from_tree(tree: &SpecTree) -> Self {
        Self {
            edge_classes: tree
                .edge_classes()
                .map(|classes| classes.map(String::from).collect()),
            nodes: tree
                .roots()
                .into_iter()
                .filter_map(|root| capture_node(tree, root))
                .collect(),
        }
    }
}

fn build_node<'d>(
    tree: &mut SpecTree,
    parent: Option<NodeId>,
    doc: &'d NodeDocument,
    pending: &mut Vec<(NodeId, &'d EdgeDocument)>,
) -> GraphResult<()> {
    let id = match parent {
        Some(p) => tree.add_node(p, doc.class.clone(), doc.id.clone())?,
        None => tree.add_root(doc.class.clone(), doc.id.clone())?,
    };
    for (name, value) in &doc.properties {
        tree.set_property(id, name.clone(), value_from_json(value)?)?;
    }
    if doc.no_edges {
        if !doc.edges.is_empty() {
            return Err(GraphError::EdgesDisabled(id));
        }
        tree.disable_edges(id)?;
    }
    pending.extend(doc.edges.iter().map(|edge| (id, edge)));
    for child in &doc.children {
        build_node(tree, Some(id), child, pending)?;
    }
    Ok(())
}

fn capture_node(tree: &SpecTree, id: NodeId) -> Option<NodeDocument> {
    let node = tree.get_node(id)?;
    let edges = node
        .out_edges
        .iter()
        .filter_map(|edge_id| tree.get_edge(*edge_id))
        .map(|edge| EdgeDocument {
            class: edge.class.clone(),
            id: edge.instance.clone(),
            to: tree.path_of(edge.end),
            properties: edge.properties.as_ref().map(properties_to_json),
        })
        .collect();
    Some(NodeDocument {
        class: node.class.clone(),
        id: node.instance.clone(),
        properties: node
            .properties
            .as_ref()
            .map(properties_to_json)
            .unwrap_or_default(),
        no_edges: !node.edges_enabled,
        edges,
        children: node
            .children
            .iter()
            .filter_map(|child| capture_node(tree, *child))
            .collect(),
    })
}

/// Convert a JSON value to a property value.
pub fn value_from_json(json: &Json) -> GraphResult<Value> {
    Ok(match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Json::String(s) => Value::String(s.clone()),
        Json::Array(items) => Value::List(
            items
                .iter()
                .map(value_from_json)
                .collect::<GraphResult<Vec<_>>>()?,
        ),
        Json::Object(map) => Value::Object(object_from_json(map)?),
    })
}

fn object_from_json(map: &Map<String, Json>) -> GraphResult<ObjectValue> {
    let type_name = map
        .get(TYPE_KEY)
        .and_then(Json::as_str)
        .ok_or_else(|| GraphError::malformed(format!("object value without \"{}\"", TYPE_KEY)))?;
    let mut object = ObjectValue::new(type_name);
    object.interfaces = string_list(map.get(INTERFACES_KEY))?;
    object.super_interfaces = string_list(map.get(SUPER_INTERFACES_KEY))?;
    for (key, value) in map {
        if key.starts_with('$') {
            continue;
        }
        object.fields.insert(key.clone(), value_from_json(value)?);
    }
    Ok(object)
}

fn string_list(json: Option<&Json>) -> GraphResult<Vec<String>> {
    match json {
        None => Ok(Vec::new()),
        Some(Json::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(String::from)
                    .ok_or_else(|| GraphError::malformed("interface names must be strings"))
            })
            .collect(),
        Some(_) => Err(GraphError::malformed("interface list must be an array")),
    }
}

/// Convert a property value to JSON.
pub fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::Number((*i).into()),
        Value::Float(f) => Number::from_f64(*f).map(Json::Number).unwrap_or(Json::Null),
        Value::String(s) => Json::String(s.clone()),
        Value::List(items) => Json::Array(items.iter().map(value_to_json).collect()),
        Value::Object(o) => {
            let mut map = Map::new();
            map.insert(TYPE_KEY.to_string(), Json::String(o.type_name.clone()));
            if !o.interfaces.is_empty() {
                map.insert(
                    INTERFACES_KEY.to_string(),
                    Json::Array(o.interfaces.iter().cloned().map(Json::String).collect()),
                );
            }
            if !o.super_interfaces.is_empty() {
                map.insert(
                    SUPER_INTERFACES_KEY.to_string(),
                    Json::Array(o.super_interfaces.iter().cloned().map(Json::String).collect()),
                );
            }
            for (key, field) in &o.fields {
                map.insert(key.clone(), value_to_json(field));
            }
            Json::Object(map)
        }
    }
}

fn properties_to_json(props: &Properties) -> Map<String, Json> {
    props
        .iter()
        .map(|(k, v)| (k.clone(), value_to_json(v)))
        .collect()
}

impl SpecTree {
    /// Load a tree from a JSON document.
    pub fn from_json(text: &str) -> GraphResult<Self> {
        TreeDocument::from_json(text)?.build()
    }

    /// Save the tree as a JSON document.
    pub fn to_json(&self) -> GraphResult<String> {
        TreeDocument::from_tree(self).to_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ECOLOGY: &str = r#"{
        "edge_classes": ["appliesTo"],
        "nodes": [
            { "class": "ecology", "id": "eco", "children": [
                { "class": "category", "id": "animal", "properties": { "size": 3 } },
                { "class": "process", "id": "grow",
                  "edges": [{ "class": "appliesTo", "id": "a1", "to": "ecology:eco/category:animal",
                              "properties": { "weight": 0.5 } }] }
            ]}
        ]
    }"#;

    #[test]
    fn test_build_from_json() {
        // WHEN loading the ecology document
        let tree = SpecTree::from_json(ECOLOGY).unwrap();

        // THEN nodes, properties and edges are materialized
        let animal = tree.find_path("eco/animal").unwrap();
        let grow = tree.find_path("eco/grow").unwrap();
        assert_eq!(tree.node_count(), 3);
        assert_eq!(
            tree.get_node(animal).unwrap().get_property("size"),
            Some(&Value::Int(3))
        );
        let edge = tree.get_edge(tree.out_edges(grow)[0]).unwrap();
        assert_eq!(edge.end, animal);
        assert_eq!(edge.get_property("weight"), Some(&Value::Float(0.5)));
        assert!(tree.is_known_edge_class("appliesTo"));
        assert!(!tree.is_known_edge_class("eats"));
    }

    #[test]
    fn test_unresolved_edge_target_fails() {
        let text = r#"{ "nodes": [ { "class": "a", "id": "x",
            "edges": [{ "class": "e", "to": "x/missing" }] } ] }"#;

        let err = SpecTree::from_json(text).unwrap_err();
        assert!(matches!(err, GraphError::PathNotFound(_)));
    }

    #[test]
    fn test_document_survives_export() {
        let tree = SpecTree::from_json(ECOLOGY).unwrap();

        let exported = TreeDocument::from_tree(&tree);
        let original = TreeDocument::from_json(ECOLOGY).unwrap();

        assert_eq!(exported, original);
    }

    #[test]
    fn test_object_values() {
        let json: Json = serde_json::json!({
            "$type": "Point",
            "$interfaces": ["Geometry"],
            "x": 1.5
        });

        let value = value_from_json(&json).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.type_name, "Point");
        assert_eq!(object.interfaces, vec!["Geometry".to_string()]);
        assert_eq!(object.fields.get("x"), Some(&Value::Float(1.5)));
        assert_eq!(value_to_json(&value), json);
    }

    #[test]
    fn test_untyped_object_rejected() {
        let json: Json = serde_json::json!({ "x": 1 });

        assert!(matches!(
            value_from_json(&json),
            Err(GraphError::MalformedDocument(_))
        ));
    }
}
