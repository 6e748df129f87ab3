//! Flattening of schema trees into dotted-path table rows.
//!
//! Nested objects become `parent.child` paths, arrays descend through
//! `name[*].`, and arrays of scalars collapse to a single `array of <type>`
//! row. The flattener never mutates its input.

use crate::schema::{SchemaKind, SchemaNode};
use log::debug;
use thiserror::Error;

/// Maximum recursion depth of [`flatten`].
pub const MAX_FLATTEN_DEPTH: usize = 64;

/// One display row: dotted path, type label and description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub path: String,
    pub type_label: String,
    pub description: Option<String>,
}

impl Row {
    pub fn new(
        path: impl Into<String>,
        type_label: impl Into<String>,
        description: Option<&str>,
    ) -> Self {
        Self {
            path: path.into(),
            type_label: type_label.into(),
            description: description.map(str::to_string),
        }
    }
}

/// Reasons a schema cannot be summarized as rows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlattenError {
    /// The schema has neither a type nor a composition
    #[error("schema has no resolvable type")]
    Indeterminate,
    /// The schema nests deeper than [`MAX_FLATTEN_DEPTH`]
    #[error("schema nests deeper than {} levels", MAX_FLATTEN_DEPTH)]
    TooDeep,
}

/// Flattens a schema tree into rows.
///
/// Only `node` itself can make the call fail. A child that cannot be
/// flattened is skipped and its siblings are still emitted.
///
/// # Example
///
/// ```
/// use openapi_inspect::flattener::{flatten, Row};
/// use openapi_inspect::schema::SchemaNode;
///
/// let user = SchemaNode::object()
///     .with_property("id", SchemaNode::scalar("integer"))
///     .with_property("tags", SchemaNode::array(Some(SchemaNode::scalar("string"))));
///
/// let rows = flatten(&user).unwrap();
/// assert_eq!(rows, vec![
///     Row::new("id", "integer", None),
///     Row::new("tags", "array of string", None),
/// ]);
/// ```
pub fn flatten(node: &SchemaNode) -> Result<Vec<Row>, FlattenError> {
    flatten_with_prefix(node, "")
}

/// Flattens a schema tree, prepending `prefix` to every path.
pub fn flatten_with_prefix(node: &SchemaNode, prefix: &str) -> Result<Vec<Row>, FlattenError> {
    flatten_at(node, prefix, 0)
}

fn flatten_at(node: &SchemaNode, prefix: &str, depth: usize) -> Result<Vec<Row>, FlattenError> {
    if depth >= MAX_FLATTEN_DEPTH {
        return Err(FlattenError::TooDeep);
    }

    let name = node.name.as_deref().unwrap_or("");
    let path = format!("{}{}", prefix, name);
    let description = node.description.as_deref();

    match &node.kind {
        SchemaKind::Array(None) => Ok(vec![Row::new(path, "array", description)]),

        // Items that say nothing about their type count as absent
        SchemaKind::Array(Some(items)) if is_untyped(items) => {
            Ok(vec![Row::new(path, "array", description)])
        }

        SchemaKind::Array(Some(items)) => {
            if let SchemaKind::Scalar(item_type) = &items.kind {
                return Ok(vec![Row::new(
                    path,
                    format!("array of {}", item_type),
                    description,
                )]);
            }
            let mut rows = vec![Row::new(path.clone(), "array of", description)];
            let item_prefix = format!("{}[*].", path);
            rows.extend(child_rows(items, &item_prefix, depth));
            Ok(rows)
        }

        SchemaKind::Object(properties) => {
            let mut rows = Vec::new();
            let child_prefix = if node.name.is_some() {
                rows.push(Row::new(
                    path.clone(),
                    format!("{}object", nullable_mark(node)),
                    description,
                ));
                format!("{}.", path)
            } else {
                prefix.to_string()
            };
            for property in properties.values() {
                rows.extend(child_rows(property, &child_prefix, depth));
            }
            Ok(rows)
        }

        SchemaKind::Composed(members) if members.is_empty() => Err(FlattenError::Indeterminate),

        SchemaKind::Composed(members) => {
            let mut rows = Vec::new();
            for member in members {
                match &node.name {
                    None => rows.extend(child_rows(member, prefix, depth)),
                    Some(_) if matches!(member.kind, SchemaKind::Object(_)) && member.name.is_none() => {
                        rows.extend(child_rows(member, &format!("{}.", path), depth));
                    }
                    Some(_) => {
                        let member = inherit_annotations(member, node);
                        rows.extend(child_rows(&member, prefix, depth));
                    }
                }
            }
            Ok(rows)
        }

        SchemaKind::Scalar(type_name) => Ok(vec![Row::new(
            path,
            format!("{}{}", nullable_mark(node), type_name),
            description,
        )]),

        SchemaKind::Indeterminate => Err(FlattenError::Indeterminate),
    }
}

/// Flattens a child node one level down, dropping it when it fails.
fn child_rows(child: &SchemaNode, prefix: &str, depth: usize) -> Vec<Row> {
    match flatten_at(child, prefix, depth + 1) {
        Ok(rows) => rows,
        Err(e) => {
            debug!(
                "Skipping {}{}: {}",
                prefix,
                child.name.as_deref().unwrap_or(""),
                e
            );
            Vec::new()
        }
    }
}

/// Gives an unnamed composition member the name of the property it stands in for.
fn inherit_annotations(member: &SchemaNode, composition: &SchemaNode) -> SchemaNode {
    let mut member = member.clone();
    if member.name.is_none() {
        member.name = composition.name.clone();
    }
    if member.description.is_none() {
        member.description = composition.description.clone();
    }
    member.nullable |= composition.nullable;
    member
}

fn is_untyped(node: &SchemaNode) -> bool {
    match &node.kind {
        SchemaKind::Indeterminate => true,
        SchemaKind::Composed(members) => members.is_empty(),
        _ => false,
    }
}

fn nullable_mark(node: &SchemaNode) -> &'static str {
    if node.nullable {
        "?"
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(path: &str, type_label: &str) -> Row {
        Row::new(path, type_label, None)
    }

    #[test]
    fn test_scalar_leaf() {
        let node = SchemaNode::scalar("string").named("email");
        assert_eq!(flatten(&node).unwrap(), vec![row("email", "string")]);
    }

    #[test]
    fn test_nullable_scalar() {
        let node = SchemaNode::scalar("integer").named("age").nullable(true);
        assert_eq!(flatten(&node).unwrap(), vec![row("age", "?integer")]);
    }

    #[test]
    fn test_scalar_keeps_description() {
        let node = SchemaNode::scalar("string")
            .named("email")
            .described("Primary address");
        assert_eq!(
            flatten(&node).unwrap(),
            vec![Row::new("email", "string", Some("Primary address"))]
        );
    }

    #[test]
    fn test_array_without_items() {
        let node = SchemaNode::array(None).named("blob");
        assert_eq!(flatten(&node).unwrap(), vec![row("blob", "array")]);
    }

    #[test]
    fn test_array_of_indeterminate_items() {
        let node = SchemaNode::array(Some(SchemaNode::indeterminate()))
            .named("blob")
            .described("Raw samples");
        assert_eq!(
            flatten(&node).unwrap(),
            vec![Row::new("blob", "array", Some("Raw samples"))]
        );

        let node = SchemaNode::array(Some(SchemaNode::composed(vec![]))).named("blob");
        assert_eq!(flatten(&node).unwrap(), vec![row("blob", "array")]);
    }

    #[test]
    fn test_array_of_scalar() {
        let node = SchemaNode::array(Some(SchemaNode::scalar("string"))).named("tags");
        assert_eq!(flatten(&node).unwrap(), vec![row("tags", "array of string")]);
    }

    #[test]
    fn test_array_of_object() {
        let item = SchemaNode::object().with_property("id", SchemaNode::scalar("integer"));
        let node = SchemaNode::array(Some(item)).named("users");
        assert_eq!(
            flatten(&node).unwrap(),
            vec![row("users", "array of"), row("users[*].id", "integer")]
        );
    }

    #[test]
    fn test_array_of_array_of_object() {
        let item = SchemaNode::object().with_property("x", SchemaNode::scalar("number"));
        let node = SchemaNode::array(Some(SchemaNode::array(Some(item)))).named("grid");
        assert_eq!(
            flatten(&node).unwrap(),
            vec![
                row("grid", "array of"),
                row("grid[*].", "array of"),
                row("grid[*].[*].x", "number"),
            ]
        );
    }

    #[test]
    fn test_nested_object_preserves_order() {
        let node = SchemaNode::object()
            .named("address")
            .with_property("city", SchemaNode::scalar("string"))
            .with_property("zip", SchemaNode::scalar("string"));
        assert_eq!(
            flatten(&node).unwrap(),
            vec![
                row("address", "object"),
                row("address.city", "string"),
                row("address.zip", "string"),
            ]
        );
    }

    #[test]
    fn test_nullable_named_object() {
        let node = SchemaNode::object().named("meta").nullable(true);
        assert_eq!(flatten(&node).unwrap(), vec![row("meta", "?object")]);
    }

    #[test]
    fn test_root_object_has_no_header_row() {
        let node = SchemaNode::object()
            .with_property("id", SchemaNode::scalar("integer"))
            .with_property("name", SchemaNode::scalar("string"));
        let rows = flatten(&node).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows, vec![row("id", "integer"), row("name", "string")]);
    }

    #[test]
    fn test_empty_root_object_succeeds() {
        assert_eq!(flatten(&SchemaNode::object()).unwrap(), Vec::<Row>::new());
    }

    #[test]
    fn test_indeterminate_root() {
        assert_eq!(
            flatten(&SchemaNode::indeterminate()),
            Err(FlattenError::Indeterminate)
        );
        assert_eq!(
            flatten(&SchemaNode::composed(vec![])),
            Err(FlattenError::Indeterminate)
        );
    }

    #[test]
    fn test_indeterminate_property_is_skipped() {
        let node = SchemaNode::object()
            .with_property("id", SchemaNode::scalar("integer"))
            .with_property("mystery", SchemaNode::indeterminate())
            .with_property("name", SchemaNode::scalar("string"));
        assert_eq!(
            flatten(&node).unwrap(),
            vec![row("id", "integer"), row("name", "string")]
        );
    }

    #[test]
    fn test_root_composition_uses_same_prefix() {
        let base = SchemaNode::object().with_property("id", SchemaNode::scalar("integer"));
        let extra = SchemaNode::object().with_property("name", SchemaNode::scalar("string"));
        let node = SchemaNode::composed(vec![base, extra]);
        assert_eq!(
            flatten(&node).unwrap(),
            vec![row("id", "integer"), row("name", "string")]
        );
    }

    #[test]
    fn test_named_composition_scopes_object_members() {
        let address = SchemaNode::object().with_property("city", SchemaNode::scalar("string"));
        let node = SchemaNode::object().with_property(
            "address",
            SchemaNode::composed(vec![address]),
        );
        assert_eq!(flatten(&node).unwrap(), vec![row("address.city", "string")]);
    }

    #[test]
    fn test_named_composition_scalar_member_inherits_name() {
        let node = SchemaNode::object().with_property(
            "status",
            SchemaNode::composed(vec![SchemaNode::scalar("string")]).described("Order status"),
        );
        assert_eq!(
            flatten(&node).unwrap(),
            vec![Row::new("status", "string", Some("Order status"))]
        );
    }

    #[test]
    fn test_composition_inside_array_items() {
        let member = SchemaNode::object().with_property("id", SchemaNode::scalar("integer"));
        let node = SchemaNode::array(Some(SchemaNode::composed(vec![member]))).named("users");
        assert_eq!(
            flatten(&node).unwrap(),
            vec![row("users", "array of"), row("users[*].id", "integer")]
        );
    }

    #[test]
    fn test_unnamed_root_scalar_and_array() {
        assert_eq!(
            flatten(&SchemaNode::scalar("string")).unwrap(),
            vec![row("", "string")]
        );
        let item = SchemaNode::object().with_property("id", SchemaNode::scalar("integer"));
        assert_eq!(
            flatten(&SchemaNode::array(Some(item))).unwrap(),
            vec![row("", "array of"), row("[*].id", "integer")]
        );
    }

    #[test]
    fn test_prefix_is_prepended() {
        let node = SchemaNode::scalar("string").named("email");
        assert_eq!(
            flatten_with_prefix(&node, "data.").unwrap(),
            vec![row("data.email", "string")]
        );
    }

    #[test]
    fn test_depth_guard() {
        let mut node = SchemaNode::scalar("string").named("leaf");
        for i in 0..(MAX_FLATTEN_DEPTH + 1) {
            node = SchemaNode::object().named(format!("n{}", i)).with_property("child", node);
        }
        // Levels past the guard are dropped, the ones above still render.
        let rows = flatten(&node).unwrap();
        assert_eq!(rows.len(), MAX_FLATTEN_DEPTH);
        assert!(rows.iter().all(|r| r.type_label == "object"));

        let mut deep = SchemaNode::scalar("string");
        for _ in 0..(MAX_FLATTEN_DEPTH + 1) {
            deep = SchemaNode::composed(vec![deep]);
        }
        assert_eq!(flatten(&deep), Ok(Vec::new()));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            FlattenError::Indeterminate.to_string(),
            "schema has no resolvable type"
        );
        assert_eq!(
            FlattenError::TooDeep.to_string(),
            format!("schema nests deeper than {} levels", MAX_FLATTEN_DEPTH)
        );
    }

    #[test]
    fn test_deterministic() {
        let node = SchemaNode::object()
            .with_property(
                "users",
                SchemaNode::array(Some(
                    SchemaNode::object()
                        .with_property("id", SchemaNode::scalar("integer"))
                        .with_property("roles", SchemaNode::array(Some(SchemaNode::scalar("string")))),
                )),
            )
            .with_property("total", SchemaNode::scalar("integer"));
        assert_eq!(flatten(&node), flatten(&node));
    }
}
