//! In-memory model of a loaded OpenAPI specification.
//!
//! Only the parts the inspector displays are kept. Schemas are already
//! converted to [`SchemaNode`] trees with local references resolved.

use crate::schema::SchemaNode;

/// One loaded specification document.
#[derive(Debug, Clone, PartialEq)]
pub struct Specification {
    /// Identifier, the document path relative to the scanned directory
    /// without its extension
    pub id: String,
    pub title: String,
    /// Path items in document order
    pub paths: Vec<PathItem>,
}

impl Specification {
    /// Iterates over every operation of every path item.
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.paths.iter().flat_map(|item| item.operations.iter())
    }
}

/// All operations registered under one path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathItem {
    pub path: String,
    /// Operations ordered by [`HttpMethod::ALL`]
    pub operations: Vec<Operation>,
}

/// HTTP methods an OpenAPI path item can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    /// Methods in the order a path item declares them in the OpenAPI schema.
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Patch,
        HttpMethod::Trace,
    ];

    /// Lowercase key used in path items.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
            HttpMethod::Trace => "trace",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single operation of a path item.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub method: HttpMethod,
    pub path: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    /// Path-level parameters first, then the operation's own
    pub parameters: Vec<Parameter>,
    /// Responses in document order
    pub responses: Vec<Response>,
}

impl Operation {
    /// The response whose schema the inspector shows.
    ///
    /// The first 2xx response in document order, else the first response.
    pub fn primary_response(&self) -> Option<&Response> {
        self.responses
            .iter()
            .find(|response| response.is_success())
            .or_else(|| self.responses.first())
    }

    /// Schema of the primary response.
    pub fn result_schema(&self) -> Option<&SchemaNode> {
        self.primary_response()?.schema.as_ref()
    }
}

/// Where a parameter is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl ParameterLocation {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "path" => Some(ParameterLocation::Path),
            "query" => Some(ParameterLocation::Query),
            "header" => Some(ParameterLocation::Header),
            "cookie" => Some(ParameterLocation::Cookie),
            _ => None,
        }
    }
}

/// OpenAPI Parameter object
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub location: ParameterLocation,
    pub schema: Option<SchemaNode>,
    pub description: Option<String>,
}

/// OpenAPI Response object
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Status code key such as `200`, `2XX` or `default`
    pub status: String,
    /// Schema of the first content entry
    pub schema: Option<SchemaNode>,
}

impl Response {
    pub fn is_success(&self) -> bool {
        self.status.starts_with('2')
    }
}
