//! Conversion between archetypes and specification trees.
//!
//! An archetype is itself a specification tree:
//!
//! ```text
//! archetype            exclusive: Boolean, name: String
//! ├── node             requiredClass, requiredId, parents: List, multiplicity
//! │   ├── node ...
//! │   ├── edge         toNode, requiredClass, requiredId, multiplicity
//! │   │   ├── property ...
//! │   │   └── constraint ...
//! │   ├── property     name, type, multiplicity
//! │   │   └── constraint ...
//! │   └── constraint   query, <parameters>
//! └── constraint ...
//! ```
//!
//! Multiplicities are written as text (`"1"`, `"0..1"`, `"1..*"`, `"*"`).

use crate::archetype::Archetype;
use crate::error::{ModelError, ModelResult};
use crate::requirement::{
    ConstraintRequirement, EdgeRequirement, NodeRequirement, PropertyRequirement,
};
use archetype_core::{Multiplicity, Node, NodeId, Properties, Value};
use archetype_graph::{SpecTree, TargetTree};

pub const ARCHETYPE_CLASS: &str = "archetype";
pub const NODE_CLASS: &str = "node";
pub const EDGE_CLASS: &str = "edge";
pub const PROPERTY_CLASS: &str = "property";
pub const CONSTRAINT_CLASS: &str = "constraint";

pub const EXCLUSIVE_FIELD: &str = "exclusive";
pub const NAME_FIELD: &str = "name";
pub const REQUIRED_CLASS_FIELD: &str = "requiredClass";
pub const REQUIRED_ID_FIELD: &str = "requiredId";
pub const PARENTS_FIELD: &str = "parents";
pub const MULTIPLICITY_FIELD: &str = "multiplicity";
pub const TO_NODE_FIELD: &str = "toNode";
pub const TYPE_FIELD: &str = "type";
pub const QUERY_FIELD: &str = "query";

impl Archetype {
    /// Read an archetype from its tree form.
    pub fn from_tree(tree: &dyn TargetTree) -> ModelResult<Archetype> {
        let roots = tree.roots();
        if roots.len() != 1 {
            return Err(ModelError::RootCount(roots.len()));
        }
        let root = roots[0];
        let root_node = node_of(tree, root)?;
        if root_node.class != ARCHETYPE_CLASS {
            return Err(ModelError::WrongRootClass(root_node.class.clone()));
        }

        let exclusive = bool_field(root_node, EXCLUSIVE_FIELD)?.unwrap_or(false);
        let name = string_field(root_node, NAME_FIELD)?
            .unwrap_or_else(|| root_node.instance.clone());

        let mut nodes = Vec::new();
        let mut constraints = Vec::new();
        for &child in tree.children(root) {
            let child_node = node_of(tree, child)?;
            match child_node.class.as_str() {
                NODE_CLASS => nodes.push(read_node(tree, child)?),
                CONSTRAINT_CLASS => constraints.push(read_constraint(child_node)?),
                other => return Err(nesting_error(ARCHETYPE_CLASS, other)),
            }
        }

        Ok(Archetype::assemble(name, exclusive, nodes, constraints))
    }

    /// Write the archetype as a specification tree.
    pub fn to_tree(&self) -> ModelResult<SpecTree> {
        let mut tree = SpecTree::new();
        let root = tree.add_root(ARCHETYPE_CLASS, self.name.clone())?;
        tree.set_property(root, EXCLUSIVE_FIELD, self.exclusive)?;
        tree.set_property(root, NAME_FIELD, self.name.clone())?;
        for node in &self.nodes {
            write_node(&mut tree, root, node)?;
        }
        for constraint in &self.constraints {
            write_constraint(&mut tree, root, constraint)?;
        }
        Ok(tree)
    }
}

// ==================== Reading ====================

fn node_of(tree: &dyn TargetTree, id: NodeId) -> ModelResult<&Node> {
    tree.node(id)
        .ok_or(ModelError::Graph(archetype_core::GraphError::NodeNotFound(id)))
}

fn nesting_error(parent: &str, child: &str) -> ModelError {
    match child {
        NODE_CLASS | EDGE_CLASS | PROPERTY_CLASS | CONSTRAINT_CLASS | ARCHETYPE_CLASS => {
            ModelError::illegal_nesting(parent, child)
        }
        other => ModelError::UnknownRequirement(other.to_string()),
    }
}

fn read_node(tree: &dyn TargetTree, id: NodeId) -> ModelResult<NodeRequirement> {
    let node = node_of(tree, id)?;
    let required_class = string_field(node, REQUIRED_CLASS_FIELD)?
        .ok_or_else(|| ModelError::missing_field(NODE_CLASS, REQUIRED_CLASS_FIELD))?;

    let mut requirement = NodeRequirement::new(required_class);
    requirement.required_id = string_field(node, REQUIRED_ID_FIELD)?;
    requirement.parents = list_field(node, PARENTS_FIELD)?;
    if let Some(m) = multiplicity_field(node)? {
        requirement.multiplicity = m;
    }

    for &child in tree.children(id) {
        let child_node = node_of(tree, child)?;
        match child_node.class.as_str() {
            NODE_CLASS => requirement.nodes.push(read_node(tree, child)?),
            EDGE_CLASS => requirement.edges.push(read_edge(tree, child)?),
            PROPERTY_CLASS => requirement.properties.push(read_property(tree, child)?),
            CONSTRAINT_CLASS => requirement.constraints.push(read_constraint(child_node)?),
            other => return Err(nesting_error(NODE_CLASS, other)),
        }
    }
    Ok(requirement)
}

fn read_edge(tree: &dyn TargetTree, id: NodeId) -> ModelResult<EdgeRequirement> {
    let node = node_of(tree, id)?;
    let to_node = string_field(node, TO_NODE_FIELD)?
        .ok_or_else(|| ModelError::missing_field(EDGE_CLASS, TO_NODE_FIELD))?;

    let mut requirement = EdgeRequirement::new(to_node);
    requirement.required_class = string_field(node, REQUIRED_CLASS_FIELD)?;
    requirement.required_id = string_field(node, REQUIRED_ID_FIELD)?;
    if let Some(m) = multiplicity_field(node)? {
        requirement.multiplicity = m;
    }

    for &child in tree.children(id) {
        let child_node = node_of(tree, child)?;
        match child_node.class.as_str() {
            PROPERTY_CLASS => requirement.properties.push(read_property(tree, child)?),
            CONSTRAINT_CLASS => requirement.constraints.push(read_constraint(child_node)?),
            other => return Err(nesting_error(EDGE_CLASS, other)),
        }
    }
    Ok(requirement)
}

fn read_property(tree: &dyn TargetTree, id: NodeId) -> ModelResult<PropertyRequirement> {
    let node = node_of(tree, id)?;
    let name = string_field(node, NAME_FIELD)?
        .ok_or_else(|| ModelError::missing_field(PROPERTY_CLASS, NAME_FIELD))?;
    let declared_type = string_field(node, TYPE_FIELD)?
        .ok_or_else(|| ModelError::missing_field(PROPERTY_CLASS, TYPE_FIELD))?;

    let mut requirement = PropertyRequirement::new(name, declared_type);
    if let Some(m) = multiplicity_field(node)? {
        requirement.multiplicity = m;
    }

    for &child in tree.children(id) {
        let child_node = node_of(tree, child)?;
        match child_node.class.as_str() {
            CONSTRAINT_CLASS => requirement.constraints.push(read_constraint(child_node)?),
            other => return Err(nesting_error(PROPERTY_CLASS, other)),
        }
    }
    Ok(requirement)
}

fn read_constraint(node: &Node) -> ModelResult<ConstraintRequirement> {
    let query = string_field(node, QUERY_FIELD)?
        .ok_or_else(|| ModelError::missing_field(CONSTRAINT_CLASS, QUERY_FIELD))?;
    let mut requirement = ConstraintRequirement::new(query);
    if let Some(props) = &node.properties {
        for (name, value) in props.iter().filter(|(name, _)| *name != QUERY_FIELD) {
            requirement.params.insert(name.clone(), value.clone());
        }
    }
    Ok(requirement)
}

/// A missing or null field reads as `None`.
fn field<'n>(node: &'n Node, name: &str) -> Option<&'n Value> {
    node.get_property(name).filter(|v| !v.is_null())
}

fn string_field(node: &Node, name: &str) -> ModelResult<Option<String>> {
    match field(node, name) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ModelError::wrong_field_type(
            &node.class,
            name,
            archetype_core::TYPE_STRING,
        )),
    }
}

fn bool_field(node: &Node, name: &str) -> ModelResult<Option<bool>> {
    match field(node, name) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(ModelError::wrong_field_type(
            &node.class,
            name,
            archetype_core::TYPE_BOOLEAN,
        )),
    }
}

fn list_field(node: &Node, name: &str) -> ModelResult<Vec<String>> {
    let wrong = || ModelError::wrong_field_type(&node.class, name, archetype_core::TYPE_LIST);
    match field(node, name) {
        None => Ok(Vec::new()),
        Some(Value::List(items)) => items
            .iter()
            .map(|item| match item {
                Value::Null => Ok(String::new()),
                Value::String(s) => Ok(s.clone()),
                _ => Err(wrong()),
            })
            .collect(),
        Some(_) => Err(wrong()),
    }
}

/// Text syntax only: `"n"`, `"n..m"`, `"n..*"`, `"*"`.
fn multiplicity_field(node: &Node) -> ModelResult<Option<Multiplicity>> {
    match field(node, MULTIPLICITY_FIELD) {
        None => Ok(None),
        Some(Value::String(s)) => s
            .parse()
            .map(Some)
            .map_err(|e| ModelError::multiplicity(&node.class, e)),
        Some(_) => Err(ModelError::wrong_field_type(
            &node.class,
            MULTIPLICITY_FIELD,
            archetype_core::TYPE_STRING,
        )),
    }
}

// ==================== Writing ====================

fn write_node(tree: &mut SpecTree, parent: NodeId, req: &NodeRequirement) -> ModelResult<()> {
    let id = tree.add_node(parent, NODE_CLASS, req.id.to_string())?;
    tree.set_property(id, REQUIRED_CLASS_FIELD, req.required_class.clone())?;
    if let Some(required_id) = &req.required_id {
        tree.set_property(id, REQUIRED_ID_FIELD, required_id.clone())?;
    }
    if !req.parents.is_empty() {
        tree.set_property(id, PARENTS_FIELD, req.parents.clone())?;
    }
    tree.set_property(id, MULTIPLICITY_FIELD, req.multiplicity.to_string())?;

    for constraint in &req.constraints {
        write_constraint(tree, id, constraint)?;
    }
    for edge in &req.edges {
        write_edge(tree, id, edge)?;
    }
    for property in &req.properties {
        write_property(tree, id, property)?;
    }
    for child in &req.nodes {
        write_node(tree, id, child)?;
    }
    Ok(())
}

fn write_edge(tree: &mut SpecTree, parent: NodeId, req: &EdgeRequirement) -> ModelResult<()> {
    let id = tree.add_node(parent, EDGE_CLASS, req.id.to_string())?;
    tree.set_property(id, TO_NODE_FIELD, req.to_node.clone())?;
    if let Some(class) = &req.required_class {
        tree.set_property(id, REQUIRED_CLASS_FIELD, class.clone())?;
    }
    if let Some(required_id) = &req.required_id {
        tree.set_property(id, REQUIRED_ID_FIELD, required_id.clone())?;
    }
    tree.set_property(id, MULTIPLICITY_FIELD, req.multiplicity.to_string())?;

    for constraint in &req.constraints {
        write_constraint(tree, id, constraint)?;
    }
    for property in &req.properties {
        write_property(tree, id, property)?;
    }
    Ok(())
}

fn write_property(
    tree: &mut SpecTree,
    parent: NodeId,
    req: &PropertyRequirement,
) -> ModelResult<()> {
    let id = tree.add_node(parent, PROPERTY_CLASS, req.id.to_string())?;
    tree.set_property(id, NAME_FIELD, req.name.clone())?;
    tree.set_property(id, TYPE_FIELD, req.declared_type.clone())?;
    tree.set_property(id, MULTIPLICITY_FIELD, req.multiplicity.to_string())?;
    for constraint in &req.constraints {
        write_constraint(tree, id, constraint)?;
    }
    Ok(())
}

fn write_constraint(
    tree: &mut SpecTree,
    parent: NodeId,
    req: &ConstraintRequirement,
) -> ModelResult<()> {
    let id = tree.add_node(parent, CONSTRAINT_CLASS, req.id.to_string())?;
    tree.set_property(id, QUERY_FIELD, req.query.clone())?;
    write_params(tree, id, &req.params)
}

fn write_params(tree: &mut SpecTree, id: NodeId, params: &Properties) -> ModelResult<()> {
    for (name, value) in params {
        tree.set_property(id, name.clone(), value.clone())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ArchetypeBuilder;
    use pretty_assertions::assert_eq;

    fn ecology() -> Archetype {
        ArchetypeBuilder::new("ecology")
            .exclusive()
            .node(
                NodeRequirement::new("ecology").with_node(
                    NodeRequirement::new("category")
                        .with_multiplicity("1..*".parse().unwrap())
                        .with_property(PropertyRequirement::new("size", "Integer").optional()),
                ),
            )
            .node(
                NodeRequirement::new("process")
                    .with_parent("ecology")
                    .with_edge(
                        EdgeRequirement::new("category:animal")
                            .with_class("appliesTo")
                            .with_constraint(ConstraintRequirement::new("edge.no_self")),
                    ),
            )
            .constraint(
                ConstraintRequirement::new("value.matches").with_param("pattern", "^[a-z]+$"),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_tree_form_reads_back_identically() {
        // GIVEN
        let archetype = ecology();

        // WHEN
        let tree = archetype.to_tree().unwrap();
        let read = Archetype::from_tree(&tree).unwrap();

        // THEN
        assert_eq!(read, archetype);
    }

    #[test]
    fn test_tree_form_shape() {
        let tree = ecology().to_tree().unwrap();

        let root = tree.root().unwrap();
        let root_node = tree.get_node(root).unwrap();
        assert_eq!(root_node.class, ARCHETYPE_CLASS);
        assert_eq!(root_node.get_property(EXCLUSIVE_FIELD), Some(&Value::Bool(true)));
        // two node requirements and one constraint under the root
        assert_eq!(tree.children(root).len(), 3);
        assert_eq!(tree.nodes_of_class(EDGE_CLASS).count(), 1);

        let process = tree.find_path("archetype:ecology/node:r3").unwrap();
        assert_eq!(
            tree.get_node(process).unwrap().get_property(PARENTS_FIELD),
            Some(&Value::from(vec!["ecology"]))
        );
    }

    #[test]
    fn test_from_tree_requires_archetype_root() {
        let mut tree = SpecTree::new();
        tree.add_root("ecology", "eco").unwrap();

        assert!(matches!(
            Archetype::from_tree(&tree),
            Err(ModelError::WrongRootClass(ref c)) if c == "ecology"
        ));
    }

    #[test]
    fn test_from_tree_rejects_two_roots() {
        let mut tree = SpecTree::new();
        tree.add_root(ARCHETYPE_CLASS, "a").unwrap();
        tree.add_root(ARCHETYPE_CLASS, "b").unwrap();

        assert!(matches!(
            Archetype::from_tree(&tree),
            Err(ModelError::RootCount(2))
        ));
    }

    #[test]
    fn test_from_tree_rejects_bad_fields() {
        // GIVEN a node requirement whose multiplicity is malformed
        let mut tree = SpecTree::new();
        let root = tree.add_root(ARCHETYPE_CLASS, "a").unwrap();
        let node = tree.add_node(root, NODE_CLASS, "n").unwrap();
        tree.set_property(node, REQUIRED_CLASS_FIELD, "c").unwrap();
        tree.set_property(node, MULTIPLICITY_FIELD, "2..1").unwrap();

        // THEN
        assert!(matches!(
            Archetype::from_tree(&tree),
            Err(ModelError::Multiplicity { .. })
        ));

        // WHEN the class is not a string
        tree.set_property(node, MULTIPLICITY_FIELD, "1").unwrap();
        tree.set_property(node, REQUIRED_CLASS_FIELD, 3).unwrap();
        assert!(matches!(
            Archetype::from_tree(&tree),
            Err(ModelError::WrongFieldType { .. })
        ));
    }

    #[test]
    fn test_from_tree_rejects_illegal_nesting() {
        let mut tree = SpecTree::new();
        let root = tree.add_root(ARCHETYPE_CLASS, "a").unwrap();
        let edge = tree.add_node(root, EDGE_CLASS, "e").unwrap();
        tree.set_property(edge, TO_NODE_FIELD, "x").unwrap();
        let mut unknown = SpecTree::new();
        let root2 = unknown.add_root(ARCHETYPE_CLASS, "b").unwrap();
        unknown.add_node(root2, "widget", "w").unwrap();

        assert!(matches!(
            Archetype::from_tree(&tree),
            Err(ModelError::IllegalNesting { .. })
        ));
        assert!(matches!(
            Archetype::from_tree(&unknown),
            Err(ModelError::UnknownRequirement(ref c)) if c == "widget"
        ));
    }

    #[test]
    fn test_from_tree_reads_exact_multiplicity() {
        let mut tree = SpecTree::new();
        let root = tree.add_root(ARCHETYPE_CLASS, "a").unwrap();
        let node = tree.add_node(root, NODE_CLASS, "n").unwrap();
        tree.set_property(node, REQUIRED_CLASS_FIELD, "engine").unwrap();
        tree.set_property(node, MULTIPLICITY_FIELD, "1").unwrap();

        let archetype = Archetype::from_tree(&tree).unwrap();
        assert_eq!(archetype.nodes[0].multiplicity, Multiplicity::ONE);
        assert!(!archetype.exclusive);
    }
}
