//! Schema tree model consumed by the flattener.
//!
//! A [`SchemaNode`] describes one fragment of an OpenAPI schema. The shape of
//! a node lives in [`SchemaKind`], so a node is exactly one of scalar, array,
//! object, composition or indeterminate. Trees are built once by
//! [`SchemaConverter`] from the raw JSON value of a document and are read-only
//! afterwards.

use indexmap::IndexMap;
use log::debug;
use serde_json::Value;

/// Maximum nesting depth followed while converting a raw schema.
pub const MAX_SCHEMA_DEPTH: usize = 64;

/// Maximum number of nodes one conversion may produce.
///
/// Shared references are expanded at every use, so a document whose schemas
/// fan out to the same definitions grows exponentially without this bound.
pub const MAX_SCHEMA_NODES: usize = 10_000;

/// One node of a schema tree.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    /// Property name under which this node hangs in its parent object
    pub name: Option<String>,
    /// Whether `null` is an accepted value
    pub nullable: bool,
    /// Trimmed description, `None` when absent or blank
    pub description: Option<String>,
    /// Shape of the node
    pub kind: SchemaKind,
}

/// Shape of a [`SchemaNode`].
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaKind {
    /// Leaf with a type name such as `string` or `integer`
    Scalar(String),
    /// Array with an optional item schema
    Array(Option<Box<SchemaNode>>),
    /// Object with ordered properties
    Object(IndexMap<String, SchemaNode>),
    /// `allOf` composition of member schemas
    Composed(Vec<SchemaNode>),
    /// No type could be determined
    Indeterminate,
}

impl SchemaNode {
    /// Creates an unnamed node of the given kind.
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            name: None,
            nullable: false,
            description: None,
            kind,
        }
    }

    pub fn scalar(type_name: impl Into<String>) -> Self {
        Self::new(SchemaKind::Scalar(type_name.into()))
    }

    pub fn array(items: Option<SchemaNode>) -> Self {
        Self::new(SchemaKind::Array(items.map(Box::new)))
    }

    pub fn object() -> Self {
        Self::new(SchemaKind::Object(IndexMap::new()))
    }

    pub fn composed(members: Vec<SchemaNode>) -> Self {
        Self::new(SchemaKind::Composed(members))
    }

    pub fn indeterminate() -> Self {
        Self::new(SchemaKind::Indeterminate)
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Sets the description; blank text counts as no description.
    pub fn described(mut self, description: impl AsRef<str>) -> Self {
        self.description = normalize_description(description.as_ref());
        self
    }

    /// Adds a property to an object node, naming the child after its key.
    ///
    /// Nodes of any other kind are returned unchanged.
    pub fn with_property(mut self, name: impl Into<String>, node: SchemaNode) -> Self {
        if let SchemaKind::Object(properties) = &mut self.kind {
            let name = name.into();
            properties.insert(name.clone(), node.named(name));
        }
        self
    }

    /// Short type name used in parameter tables.
    pub fn type_name(&self) -> Option<&str> {
        match &self.kind {
            SchemaKind::Scalar(name) => Some(name),
            SchemaKind::Array(_) => Some("array"),
            SchemaKind::Object(_) => Some("object"),
            SchemaKind::Composed(_) | SchemaKind::Indeterminate => None,
        }
    }
}

fn normalize_description(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Converts raw JSON schema values into [`SchemaNode`] trees.
///
/// Local `$ref` pointers (`#/components/schemas/User` and the like) are
/// resolved against the document root given at construction. A reference
/// that is already being expanded further up the same branch is cyclic and
/// turns into an indeterminate node, as does a pointer that leads nowhere.
/// Once a conversion has produced [`MAX_SCHEMA_NODES`] nodes, the remaining
/// subtrees are indeterminate as well.
pub struct SchemaConverter<'a> {
    root: &'a Value,
}

/// Per-conversion state: references being expanded and the node budget left.
struct Walk {
    stack: Vec<String>,
    budget: usize,
}

impl<'a> SchemaConverter<'a> {
    pub fn new(root: &'a Value) -> Self {
        Self { root }
    }

    /// Converts a schema value into a node tree.
    pub fn convert(&self, schema: &Value) -> SchemaNode {
        let mut walk = Walk {
            stack: Vec::new(),
            budget: MAX_SCHEMA_NODES,
        };
        let node = self.convert_at(schema, 0, &mut walk);
        if walk.budget == 0 {
            debug!("Schema exceeds {} nodes, output truncated", MAX_SCHEMA_NODES);
        }
        node
    }

    /// Follows a local JSON pointer such as `#/components/schemas/User`.
    pub fn resolve_pointer(&self, reference: &str) -> Option<&'a Value> {
        let pointer = reference.strip_prefix('#')?;
        if pointer.is_empty() {
            return Some(self.root);
        }
        self.root.pointer(pointer)
    }

    fn convert_at(&self, schema: &Value, depth: usize, walk: &mut Walk) -> SchemaNode {
        if depth >= MAX_SCHEMA_DEPTH {
            debug!("Schema nesting exceeds {} levels, giving up on subtree", MAX_SCHEMA_DEPTH);
            return SchemaNode::indeterminate();
        }
        if walk.budget == 0 {
            return SchemaNode::indeterminate();
        }
        walk.budget -= 1;

        let Some(map) = schema.as_object() else {
            debug!("Schema is not an object: {}", schema);
            return SchemaNode::indeterminate();
        };

        if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
            return self.convert_reference(reference, map, depth, walk);
        }

        let description = map
            .get("description")
            .and_then(Value::as_str)
            .and_then(normalize_description);
        let (type_name, type_allows_null) = read_type(map.get("type"));
        let nullable = type_allows_null
            || map.get("nullable").and_then(Value::as_bool).unwrap_or(false);

        let kind = if let Some(members) = map
            .get("allOf")
            .and_then(Value::as_array)
            .filter(|members| !members.is_empty())
        {
            let mut nodes: Vec<SchemaNode> = members
                .iter()
                .map(|member| self.convert_at(member, depth + 1, walk))
                .collect();
            if let Some(properties) = map.get("properties").and_then(Value::as_object) {
                nodes.push(SchemaNode::new(SchemaKind::Object(
                    self.convert_properties(properties, depth, walk),
                )));
            }
            SchemaKind::Composed(nodes)
        } else {
            match type_name.as_deref() {
                Some("array") => SchemaKind::Array(self.convert_items(map.get("items"), depth, walk)),
                Some("object") => SchemaKind::Object(
                    map.get("properties")
                        .and_then(Value::as_object)
                        .map(|properties| self.convert_properties(properties, depth, walk))
                        .unwrap_or_default(),
                ),
                Some(other) => SchemaKind::Scalar(other.to_string()),
                None => {
                    if let Some(properties) = map.get("properties").and_then(Value::as_object) {
                        SchemaKind::Object(self.convert_properties(properties, depth, walk))
                    } else if map.contains_key("items") {
                        SchemaKind::Array(self.convert_items(map.get("items"), depth, walk))
                    } else {
                        SchemaKind::Indeterminate
                    }
                }
            }
        };

        SchemaNode {
            name: None,
            nullable,
            description,
            kind,
        }
    }

    fn convert_reference(
        &self,
        reference: &str,
        map: &serde_json::Map<String, Value>,
        depth: usize,
        walk: &mut Walk,
    ) -> SchemaNode {
        if walk.stack.iter().any(|seen| seen == reference) {
            debug!("Recursive schema reference {}", reference);
            return SchemaNode::indeterminate();
        }
        let Some(target) = self.resolve_pointer(reference) else {
            debug!("Unresolvable schema reference {}", reference);
            return SchemaNode::indeterminate();
        };

        walk.stack.push(reference.to_string());
        let mut node = self.convert_at(target, depth + 1, walk);
        walk.stack.pop();

        // Siblings of `$ref` override the referenced schema's annotations
        if let Some(description) = map
            .get("description")
            .and_then(Value::as_str)
            .and_then(normalize_description)
        {
            node.description = Some(description);
        }
        if let Some(nullable) = map.get("nullable").and_then(Value::as_bool) {
            node.nullable = nullable;
        }
        node
    }

    fn convert_items(
        &self,
        items: Option<&Value>,
        depth: usize,
        walk: &mut Walk,
    ) -> Option<Box<SchemaNode>> {
        let node = self.convert_at(items?, depth + 1, walk);
        match node.kind {
            SchemaKind::Indeterminate => None,
            _ => Some(Box::new(node)),
        }
    }

    fn convert_properties(
        &self,
        properties: &serde_json::Map<String, Value>,
        depth: usize,
        walk: &mut Walk,
    ) -> IndexMap<String, SchemaNode> {
        properties
            .iter()
            .map(|(name, value)| {
                let node = self.convert_at(value, depth + 1, walk).named(name.clone());
                (name.clone(), node)
            })
            .collect()
    }
}

/// Reads `type`, accepting both the 3.0 string form and the 3.1 array form.
///
/// Returns the first non-null type name and whether `"null"` was listed.
fn read_type(value: Option<&Value>) -> (Option<String>, bool) {
    match value {
        Some(Value::String(name)) => (Some(name.clone()), false),
        Some(Value::Array(names)) => {
            let names: Vec<&str> = names.iter().filter_map(Value::as_str).collect();
            let allows_null = names.contains(&"null");
            let first = names.into_iter().find(|name| *name != "null").map(str::to_string);
            (first, allows_null)
        }
        _ => (None, false),
    }
}
