use anyhow::{Context, Result};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Directory names never descended into.
const SKIPPED_DIRS: &[&str] = &["target", "node_modules", "vendor"];

/// File scanner for locating specification documents.
///
/// The `SpecScanner` recursively walks a directory to find every `.json`,
/// `.yaml` and `.yml` file. It skips hidden directories (those starting with
/// `.`) and dependency or build output directories such as `vendor` and
/// `target`. When the root is a file, that file is the only result.
///
/// # Example
///
/// ```no_run
/// use openapi_inspect::scanner::SpecScanner;
/// use std::path::PathBuf;
///
/// let scanner = SpecScanner::new(PathBuf::from("./docs/api"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} candidate files", result.spec_files.len());
/// ```
pub struct SpecScanner {
    root_path: PathBuf,
}

/// Result of a scan.
///
/// Contains the discovered files and any warnings encountered on the way.
pub struct ScanResult {
    /// The scanned file or directory
    pub root: PathBuf,
    /// Candidate specification files, sorted by path
    pub spec_files: Vec<PathBuf>,
    /// Warning messages for entries that could not be accessed
    pub warnings: Vec<String>,
}

impl SpecScanner {
    /// Creates a new `SpecScanner` rooted at a file or directory.
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Returns whether a path carries one of the specification extensions.
    pub fn is_spec_file(path: &Path) -> bool {
        matches!(
            path.extension()
                .and_then(|s| s.to_str())
                .map(str::to_ascii_lowercase)
                .as_deref(),
            Some("json") | Some("yaml") | Some("yml")
        )
    }

    /// Scans the root and collects candidate specification files.
    ///
    /// Inaccessible entries are logged and recorded as warnings; the scan
    /// carries on with the rest of the tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the root path does not exist.
    pub fn scan(&self) -> Result<ScanResult> {
        let metadata = std::fs::metadata(&self.root_path)
            .with_context(|| format!("Cannot access {}", self.root_path.display()))?;

        // An explicitly named file is taken whatever its extension
        if metadata.is_file() {
            debug!("Scanning single file: {}", self.root_path.display());
            return Ok(ScanResult {
                root: self.root_path.clone(),
                spec_files: vec![self.root_path.clone()],
                warnings: Vec::new(),
            });
        }

        let mut spec_files = Vec::new();
        let mut warnings = Vec::new();

        for entry in WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                // Don't filter the root directory itself
                if e.path() == self.root_path {
                    return true;
                }
                if !e.file_type().is_dir() {
                    return true;
                }

                let file_name = e.file_name().to_string_lossy();
                !file_name.starts_with('.') && !SKIPPED_DIRS.contains(&&*file_name)
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if entry.file_type().is_file() && Self::is_spec_file(path) {
                        spec_files.push(path.to_path_buf());
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        spec_files.sort();
        debug!(
            "Found {} candidate files under {}",
            spec_files.len(),
            self.root_path.display()
        );

        Ok(ScanResult {
            root: self.root_path.clone(),
            spec_files,
            warnings,
        })
    }
}

impl ScanResult {
    /// Identifier of a scanned file: its path relative to the root, without
    /// extension and with `/` separators, so `v1/api.yaml` becomes `v1/api`.
    ///
    /// A file named directly as the root is identified by its stem.
    pub fn spec_id(&self, path: &Path) -> String {
        match path.strip_prefix(&self.root) {
            Ok(relative) if !relative.as_os_str().is_empty() => relative
                .with_extension("")
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/"),
            _ => path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }
}
