//! The inspect view: every selected operation of every selected
//! specification as a table, written to a string for the caller to print.

use crate::document::Specification;
use crate::error::{Error, Result};
use crate::renderer;
use glob::Pattern;
use log::debug;
use regex::Regex;

/// Which specifications and path items to show.
#[derive(Debug, Clone, Default)]
pub struct InspectFilter {
    specification: Option<Regex>,
    path: Option<Pattern>,
}

impl InspectFilter {
    /// Builds a filter from a specification id pattern (a regular expression
    /// matched against the whole id) and an optional path glob.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when either pattern does not compile.
    pub fn new(specification: &str, path: Option<&str>) -> Result<Self> {
        let specification = Regex::new(&format!("^(?:{})$", specification)).map_err(|e| {
            Error::InvalidArgument(format!(
                "invalid specification pattern '{}': {}",
                specification, e
            ))
        })?;
        let path = path
            .map(|glob| {
                Pattern::new(glob).map_err(|e| {
                    Error::InvalidArgument(format!("invalid path pattern '{}': {}", glob, e))
                })
            })
            .transpose()?;
        Ok(Self {
            specification: Some(specification),
            path,
        })
    }

    pub fn matches_specification(&self, spec: &Specification) -> bool {
        self.matches_id(&spec.id)
    }

    pub fn matches_id(&self, id: &str) -> bool {
        self.specification
            .as_ref()
            .map_or(!id.is_empty(), |pattern| pattern.is_match(id))
    }

    pub fn matches_path(&self, path: &str) -> bool {
        self.path
            .as_ref()
            .map_or(true, |pattern| pattern.matches(path))
    }
}

/// Renders the inspect view of the given specifications.
///
/// With a single selected specification only its tables are printed. With
/// several, a count line comes first and every specification is introduced
/// by its title and id.
pub fn inspect(specs: &[Specification], filter: &InspectFilter) -> String {
    let selected: Vec<&Specification> = specs
        .iter()
        .filter(|spec| filter.matches_specification(spec))
        .collect();
    debug!(
        "Inspecting {} of {} specification(s)",
        selected.len(),
        specs.len()
    );

    let mut out = String::new();
    match selected.as_slice() {
        [] => out.push_str("No available specifications\n"),
        [spec] => write_specification(&mut out, None, spec, filter),
        many => {
            out.push_str(&format!("Total {} specification(s)\n", many.len()));
            for spec in many {
                let title = format!("{} {}", spec.title, spec.id);
                write_specification(&mut out, Some(&title), spec, filter);
            }
        }
    }
    out
}

fn write_specification(
    out: &mut String,
    title: Option<&str>,
    spec: &Specification,
    filter: &InspectFilter,
) {
    if let Some(title) = title.filter(|t| !t.trim().is_empty()) {
        out.push_str(title);
        out.push('\n');
    }

    for item in spec.paths.iter().filter(|item| filter.matches_path(&item.path)) {
        for operation in &item.operations {
            out.push_str(&renderer::render_operation(operation));
            out.push('\n');
        }
    }
}
