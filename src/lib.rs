//! OpenAPI Inspect - Readable terminal views of OpenAPI documents.
//!
//! This library loads OpenAPI 3.x (and Swagger 2.0) documents and renders every
//! operation as a table: summary, description, parameters and the primary
//! success response schema compressed into dotted-path rows.
//!
//! # Architecture
//!
//! 1. [`scanner`] - Finds specification files in a directory
//! 2. [`loader`] - Parses JSON/YAML documents into a [`document::Specification`]
//! 3. [`schema`] - Schema tree model with `$ref` resolution
//! 4. [`flattener`] - Compresses schema trees into dotted-path rows
//! 5. [`renderer`] - Lays out and draws one table per operation
//! 6. [`inspect`] - Filters specifications and paths, produces the full view
//!
//! # Example Usage
//!
//! ```no_run
//! use openapi_inspect::{
//!     inspect::{inspect, InspectFilter},
//!     loader::SpecLoader,
//!     scanner::SpecScanner,
//! };
//! use std::path::PathBuf;
//!
//! let filter = InspectFilter::new(".+", Some("/users*")).unwrap();
//!
//! let scan_result = SpecScanner::new(PathBuf::from("./docs")).scan().unwrap();
//! let specs: Vec<_> = SpecLoader::load_scan(&scan_result, &|path: &str| filter.matches_path(path))
//!     .into_iter()
//!     .filter_map(Result::ok)
//!     .collect();
//!
//! print!("{}", inspect(&specs, &filter));
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod cli;
pub mod document;
pub mod error;
pub mod flattener;
pub mod inspect;
pub mod loader;
pub mod renderer;
pub mod scanner;
pub mod schema;
