use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use std::path::PathBuf;

/// OpenAPI Inspect - Render OpenAPI documents as readable terminal tables
#[derive(Parser, Debug)]
#[command(name = "openapi-inspect")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Specification file, or directory to search for .json/.yaml/.yml files
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Only show paths matching this shell-style pattern (e.g. "/users/*")
    #[arg(short = 'i', long = "inspect", value_name = "PATTERN")]
    pub path_filter: Option<String>,

    /// Regular expression selecting specifications by id (file path relative
    /// to PATH, without extension)
    #[arg(
        short = 's',
        long = "specification",
        value_name = "REGEX",
        default_value = ".+"
    )]
    pub specification: String,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.path.exists() {
        anyhow::bail!("Path does not exist: {}", args.path.display());
    }

    info!("Specification path: {}", args.path.display());
    info!("Specification pattern: {}", args.specification);
    if let Some(ref filter) = args.path_filter {
        info!("Path filter: {}", filter);
    } else {
        info!("Path filter: none");
    }

    Ok(args)
}

/// Run the main workflow and return the rendered output
pub fn render(args: &CliArgs) -> Result<String> {
    use crate::inspect::{inspect, InspectFilter};
    use crate::loader::SpecLoader;
    use crate::scanner::{ScanResult, SpecScanner};

    let filter = InspectFilter::new(&args.specification, args.path_filter.as_deref())
        .context("Invalid filter")?;

    // Step 1: Find specification files
    info!("Scanning for specification files...");
    let scanner = SpecScanner::new(args.path.clone());
    let scan_result = scanner.scan()?;

    info!("Found {} candidate files", scan_result.spec_files.len());
    for warning in &scan_result.warnings {
        log::warn!("{}", warning);
    }
    let scanned_count = scan_result.spec_files.len();

    // Step 2: Load the selected documents, skipping anything that is not OpenAPI
    info!("Loading specifications...");
    let spec_files: Vec<PathBuf> = scan_result
        .spec_files
        .iter()
        .filter(|path| filter.matches_id(&scan_result.spec_id(path)))
        .cloned()
        .collect();
    let selected = ScanResult {
        spec_files,
        ..scan_result
    };
    debug!(
        "{} of {} files match the specification pattern",
        selected.spec_files.len(),
        scanned_count
    );

    let specs: Vec<_> = SpecLoader::load_scan(&selected, &|path: &str| filter.matches_path(path))
        .into_iter()
        .filter_map(|r| match r {
            Ok(spec) => Some(spec),
            Err(e) => {
                debug!("Skipping file: {}", e);
                None
            }
        })
        .collect();

    info!("Loaded {} specifications", specs.len());

    // Step 3: Render the inspect view
    let output = inspect(&specs, &filter);

    info!("Summary:");
    info!("  - Files scanned: {}", scanned_count);
    info!("  - Specifications loaded: {}", specs.len());
    info!(
        "  - Operations: {}",
        specs.iter().map(|s| s.operations().count()).sum::<usize>()
    );

    Ok(output)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    let output = render(&args)?;
    print!("{}", output);
    Ok(())
}
