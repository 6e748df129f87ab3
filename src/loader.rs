use crate::document::{
    HttpMethod, Operation, Parameter, ParameterLocation, PathItem, Response, Specification,
};
use crate::error::{Error, Result};
use crate::scanner::ScanResult;
use crate::schema::SchemaConverter;
use log::{debug, warn};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Loader for OpenAPI documents stored as JSON or YAML.
///
/// The `SpecLoader` reads a document, checks that it is an OpenAPI (or Swagger)
/// document and builds a [`Specification`] from it. All schemas are converted
/// into schema trees with local `$ref` pointers resolved, so the result no
/// longer depends on the raw document.
///
/// # Example
///
/// ```no_run
/// use openapi_inspect::loader::SpecLoader;
/// use std::path::Path;
///
/// let spec = SpecLoader::load_file(Path::new("openapi.yaml")).unwrap();
/// println!("{} has {} paths", spec.title, spec.paths.len());
/// ```
pub struct SpecLoader;

/// Serialization format of a specification file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Guesses the format from a file extension; unknown extensions yield `None`.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json") => Some(DocumentFormat::Json),
            Some("yaml") | Some("yml") => Some(DocumentFormat::Yaml),
            _ => None,
        }
    }
}

/// The part of the OpenAPI Info object the inspector shows.
#[derive(Debug, Default, Deserialize)]
struct Info {
    #[serde(default)]
    title: String,
}

impl SpecLoader {
    /// Loads a single specification file with every path item.
    ///
    /// The file stem becomes the specification id.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The content is neither valid JSON nor valid YAML
    /// - The document has no `openapi` or `swagger` key
    pub fn load_file(path: &Path) -> Result<Specification> {
        let id = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::load_file_as(path, &id, &|_: &str| true)
    }

    /// Loads a single specification file under the given id.
    ///
    /// Only path items accepted by `keep_path` are built; the schemas of the
    /// others are never converted.
    pub fn load_file_as(
        path: &Path,
        id: &str,
        keep_path: &dyn Fn(&str) -> bool,
    ) -> Result<Specification> {
        debug!("Loading specification {}: {}", id, path.display());

        let content = fs::read_to_string(path)?;

        let value = match DocumentFormat::from_path(path) {
            Some(format) => Self::parse_value(&content, format).map_err(|e| Error::parse(path, e))?,
            // YAML accepts JSON too, but JSON errors are clearer for JSON input
            None => Self::parse_value(&content, DocumentFormat::Json)
                .or_else(|_| Self::parse_value(&content, DocumentFormat::Yaml))
                .map_err(|e| Error::parse(path, e))?,
        };

        if !Self::is_openapi(&value) {
            return Err(Error::NotOpenApi(path.to_path_buf()));
        }

        let spec = Self::from_value(id, &value, keep_path);
        debug!(
            "Loaded {} ({} paths, {} operations)",
            path.display(),
            spec.paths.len(),
            spec.operations().count()
        );
        Ok(spec)
    }

    /// Loads every file of a scan, continuing past the ones that fail.
    ///
    /// Ids come from [`ScanResult::spec_id`]. Failures are logged as warnings
    /// and returned in place, one result per scanned file.
    pub fn load_scan(
        scan: &ScanResult,
        keep_path: &dyn Fn(&str) -> bool,
    ) -> Vec<Result<Specification>> {
        debug!("Loading {} specification files", scan.spec_files.len());

        let results: Vec<Result<Specification>> = scan
            .spec_files
            .iter()
            .map(|path| {
                Self::load_file_as(path, &scan.spec_id(path), keep_path).inspect_err(|e| {
                    warn!("Failed to load {}: {}", path.display(), e);
                })
            })
            .collect();

        let success_count = results.iter().filter(|r| r.is_ok()).count();
        debug!(
            "Loading complete: {} succeeded, {} failed",
            success_count,
            results.len() - success_count
        );

        results
    }

    /// Parses document text into a JSON value tree.
    ///
    /// YAML mapping keys such as `200:` come out as the string keys a JSON
    /// document would use.
    pub fn parse_value(content: &str, format: DocumentFormat) -> std::result::Result<Value, String> {
        match format {
            DocumentFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            DocumentFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        }
    }

    /// Whether the value looks like an OpenAPI 3.x or Swagger 2.0 document.
    pub fn is_openapi(value: &Value) -> bool {
        value.get("openapi").is_some() || value.get("swagger").is_some()
    }

    /// Builds a specification from an already parsed document, keeping the
    /// path items accepted by `keep_path`.
    pub fn from_value(id: &str, document: &Value, keep_path: &dyn Fn(&str) -> bool) -> Specification {
        let converter = SchemaConverter::new(document);

        let info = document
            .get("info")
            .cloned()
            .map(serde_json::from_value::<Info>)
            .and_then(|info| {
                info.inspect_err(|e| debug!("Ignoring malformed info: {}", e))
                    .ok()
            })
            .unwrap_or_default();

        let paths = document
            .get("paths")
            .and_then(Value::as_object)
            .map(|paths| {
                paths
                    .iter()
                    .filter(|(path, _)| keep_path(path.as_str()))
                    .map(|(path, item)| Self::build_path_item(&converter, path, item))
                    .collect()
            })
            .unwrap_or_default();

        Specification {
            id: id.to_string(),
            title: info.title,
            paths,
        }
    }

    fn build_path_item(converter: &SchemaConverter, path: &str, item: &Value) -> PathItem {
        let item = Self::deref(converter, item);
        let shared = Self::build_parameters(converter, item.get("parameters"));

        let operations = HttpMethod::ALL
            .iter()
            .filter_map(|method| {
                let operation = item.get(method.as_str())?.as_object()?;
                Some(Self::build_operation(converter, *method, path, operation, &shared))
            })
            .collect();

        PathItem {
            path: path.to_string(),
            operations,
        }
    }

    fn build_operation(
        converter: &SchemaConverter,
        method: HttpMethod,
        path: &str,
        operation: &Map<String, Value>,
        shared: &[Parameter],
    ) -> Operation {
        let own = Self::build_parameters(converter, operation.get("parameters"));

        // Operation-level parameters override path-level ones with the same name and location
        let mut parameters: Vec<Parameter> = shared
            .iter()
            .filter(|p| !own.iter().any(|o| o.name == p.name && o.location == p.location))
            .cloned()
            .collect();
        parameters.extend(own);

        let responses = operation
            .get("responses")
            .and_then(Value::as_object)
            .map(|responses| {
                responses
                    .iter()
                    .filter(|(status, _)| !status.starts_with("x-"))
                    .map(|(status, response)| Self::build_response(converter, status, response))
                    .collect()
            })
            .unwrap_or_default();

        let text = |key: &str| {
            operation
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        Operation {
            method,
            path: path.to_string(),
            summary: text("summary"),
            description: text("description"),
            parameters,
            responses,
        }
    }

    fn build_parameters(converter: &SchemaConverter, parameters: Option<&Value>) -> Vec<Parameter> {
        let Some(parameters) = parameters.and_then(Value::as_array) else {
            return Vec::new();
        };

        parameters
            .iter()
            .filter_map(|parameter| {
                let parameter = Self::deref(converter, parameter);
                let name = parameter.get("name").and_then(Value::as_str)?;
                let location = parameter
                    .get("in")
                    .and_then(Value::as_str)
                    .and_then(ParameterLocation::parse);
                let Some(location) = location else {
                    // Swagger 2.0 body and formData parameters are not parameters in 3.x
                    debug!("Skipping parameter {} with unsupported location", name);
                    return None;
                };

                // Swagger 2.0 keeps the type on the parameter itself
                let schema = match parameter.get("schema") {
                    Some(schema) => Some(converter.convert(schema)),
                    None if parameter.get("type").is_some() => Some(converter.convert(parameter)),
                    None => None,
                };

                Some(Parameter {
                    name: name.to_string(),
                    location,
                    schema,
                    description: parameter
                        .get("description")
                        .and_then(Value::as_str)
                        .map(str::to_string),
                })
            })
            .collect()
    }

    fn build_response(converter: &SchemaConverter, status: &str, response: &Value) -> Response {
        let response = Self::deref(converter, response);

        let schema = match response.get("content").and_then(Value::as_object) {
            Some(content) if !content.is_empty() => content
                .values()
                .next()
                .and_then(|media| media.get("schema")),
            // Swagger 2.0 puts the schema directly on the response
            _ => response.get("schema"),
        };

        Response {
            status: status.to_string(),
            schema: schema.map(|schema| converter.convert(schema)),
        }
    }

    /// Follows a `$ref` on a non-schema object (parameter, response, path item).
    fn deref<'a>(converter: &SchemaConverter<'a>, value: &'a Value) -> &'a Value {
        let mut current = value;
        // Chains of references are short; the bound only protects against loops
        for _ in 0..8 {
            match current
                .get("$ref")
                .and_then(Value::as_str)
                .and_then(|reference| converter.resolve_pointer(reference))
            {
                Some(target) => current = target,
                None => break,
            }
        }
        current
    }
}
