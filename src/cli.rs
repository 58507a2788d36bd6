use crate::extractor::actix::ActixExtractor;
use crate::extractor::manifest::ManifestSource;
use crate::extractor::{RouteSource, RouteTable};
use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
use crate::source::ProjectSources;
use crate::type_resolver::{CandidateSet, TypeResolver};
use crate::wadl_builder::{base_url, GenerateOptions, WadlGenerator};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// WADL generator - describe the routes of a web application as a WADL-style document
#[derive(Parser, Debug)]
#[command(name = "wadl-from-source")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to a Rust project directory or a route manifest (.yaml, .yml, .json)
    #[arg(value_name = "INPUT")]
    pub input_path: PathBuf,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Application title
    #[arg(long = "title")]
    pub title: Option<String>,

    /// Base URL of the application; overrides --scheme, --host, --port and --context-path
    #[arg(long = "base-url", value_name = "URL")]
    pub base_url: Option<String>,

    /// Scheme used to build the base URL
    #[arg(long = "scheme", default_value = "http")]
    pub scheme: String,

    /// Host used to build the base URL
    #[arg(long = "host", default_value = "localhost")]
    pub host: String,

    /// Port used to build the base URL
    #[arg(long = "port", default_value_t = 8080)]
    pub port: u16,

    /// Context path appended to the base URL
    #[arg(long = "context-path", default_value = "")]
    pub context_path: String,

    /// Handler group whose routes are left out (repeatable)
    #[arg(long = "exclude", value_name = "GROUP")]
    pub exclude: Vec<String>,

    /// Type vocabulary of param types and response elements
    #[arg(long = "types", value_enum, default_value = "json")]
    pub types: TypeVocabulary,

    /// Which related types are matched against the type bindings
    #[arg(long = "candidates", value_enum, default_value = "ancestors")]
    pub candidates: Candidates,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

/// Type vocabularies
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum TypeVocabulary {
    /// JSON value types (string, number, boolean, array, object)
    Json,
    /// XML Schema built-in types
    Xsd,
}

/// Candidate-set strategies
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum Candidates {
    /// The type, its supertypes and interfaces, and Object
    Ancestors,
    /// The type and its nested member types
    Members,
}

impl From<Candidates> for CandidateSet {
    fn from(candidates: Candidates) -> Self {
        match candidates {
            Candidates::Ancestors => CandidateSet::Ancestors,
            Candidates::Members => CandidateSet::Members,
        }
    }
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.input_path.exists() {
        anyhow::bail!("Input path does not exist: {}", args.input_path.display());
    }

    if !args.input_path.is_dir() && !ManifestSource::is_manifest(&args.input_path) {
        anyhow::bail!(
            "Input path is neither a project directory nor a route manifest: {}",
            args.input_path.display()
        );
    }

    info!("Input path: {}", args.input_path.display());
    info!("Output format: {:?}", args.output_format);
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    } else {
        info!("Output: stdout");
    }
    info!("Types: {:?} ({:?} candidates)", args.types, args.candidates);

    Ok(args)
}

/// Routes plus the document defaults the input carries
struct Input {
    table: RouteTable,
    title: Option<String>,
    base_url: Option<String>,
    exclude: Vec<String>,
}

fn load_input(path: &Path) -> Result<Input> {
    if path.is_dir() {
        info!("Scanning project directory...");
        let sources = ProjectSources::load(path)?;
        info!("Parsed {} Rust files", sources.files.len());

        if sources.files.is_empty() {
            anyhow::bail!("No Rust files could be parsed in {}", path.display());
        }

        let table = ActixExtractor::new(sources).list_routes()?;
        Ok(Input {
            table,
            title: None,
            base_url: None,
            exclude: Vec::new(),
        })
    } else {
        info!("Loading route manifest...");
        let manifest = ManifestSource::new(path.to_path_buf()).load()?;
        Ok(Input {
            title: manifest.title.clone(),
            base_url: manifest.base_url.clone(),
            exclude: manifest.exclude.clone(),
            table: manifest.into_route_table(),
        })
    }
}

/// Default title: the project directory or manifest file name
fn default_title(path: &Path) -> String {
    let name = if path.is_dir() {
        path.file_name()
    } else {
        path.file_stem()
    };
    name.map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "application".to_string())
}

/// Document options; command-line values win over input defaults
fn generate_options(args: &CliArgs, input: &Input) -> GenerateOptions {
    let title = args
        .title
        .clone()
        .or_else(|| input.title.clone())
        .unwrap_or_else(|| default_title(&args.input_path));

    let base = args
        .base_url
        .clone()
        .or_else(|| input.base_url.clone())
        .unwrap_or_else(|| base_url(&args.scheme, &args.host, args.port, &args.context_path));

    let mut options = GenerateOptions::new(title, base);
    for group in input.exclude.iter().chain(&args.exclude) {
        options = options.exclude(group.clone());
    }
    options
}

fn resolver(args: &CliArgs) -> TypeResolver {
    let resolver = match args.types {
        TypeVocabulary::Json => TypeResolver::json(),
        TypeVocabulary::Xsd => TypeResolver::xsd(),
    };
    resolver.with_candidates(args.candidates.into())
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting WADL document generation...");

    let input = load_input(&args.input_path)?;
    info!("Found {} routes", input.table.routes.len());
    if input.table.routes.is_empty() {
        warn!("No routes found in {}", args.input_path.display());
    }

    let options = generate_options(&args, &input);
    debug!("Generate options: {:?}", options);

    let generator = WadlGenerator::new(Box::new(resolver(&args)));
    let document = generator
        .generate(&input.table, &options)
        .context("Failed to generate WADL document")?;

    info!("Serializing to {:?} format...", args.output_format);
    let content = match args.output_format {
        OutputFormat::Yaml => serialize_yaml(&document)?,
        OutputFormat::Json => serialize_json(&document)?,
    };

    if let Some(output_path) = &args.output_path {
        info!("Writing output to: {}", output_path.display());
        write_to_file(&content, output_path)?;
    } else {
        println!("{}", content);
    }

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Routes found: {}", input.table.routes.len());
    info!("  - Resources written: {}", document.resources.resources.len());
    info!("  - Excluded groups: {}", options.excluded_groups.len());
    info!("  - Base URL: {}", options.base_url);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"
title: Pet Store
base_url: http://pets.example.com/api
exclude: [internal]
routes:
  - path: /pets
    methods: [GET]
    produces: [application/json]
    handler: { group: pets, method: listPets }
    returns: PetList
  - path: /debug
    methods: [GET]
    handler: { group: internal, method: dump }
"#;

    fn args(input: &Path, extra: &[&str]) -> CliArgs {
        let mut argv = vec!["wadl-from-source".to_string(), input.display().to_string()];
        argv.extend(extra.iter().map(|s| s.to_string()));
        CliArgs::parse_from(argv)
    }

    fn manifest(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("routes.yaml");
        fs::write(&path, MANIFEST).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let dir = TempDir::new().unwrap();
        let parsed = args(dir.path(), &[]);
        assert!(matches!(parsed.output_format, OutputFormat::Yaml));
        assert_eq!(parsed.types, TypeVocabulary::Json);
        assert_eq!(parsed.candidates, Candidates::Ancestors);
        assert_eq!(parsed.port, 8080);
        assert!(parsed.exclude.is_empty());
    }

    #[test]
    fn test_repeated_exclude() {
        let dir = TempDir::new().unwrap();
        let parsed = args(dir.path(), &["--exclude", "a", "--exclude", "b"]);
        assert_eq!(parsed.exclude, vec!["a", "b"]);
    }

    #[test]
    fn test_validation() {
        let dir = TempDir::new().unwrap();
        assert!(parse_args_from_parsed(args(&dir.path().join("missing"), &[])).is_err());

        let text = dir.path().join("notes.txt");
        fs::write(&text, "hello").unwrap();
        assert!(parse_args_from_parsed(args(&text, &[])).is_err());

        assert!(parse_args_from_parsed(args(&manifest(&dir), &[])).is_ok());
        assert!(parse_args_from_parsed(args(dir.path(), &[])).is_ok());
    }

    #[test]
    fn test_manifest_defaults_apply() {
        let dir = TempDir::new().unwrap();
        let cli = args(&manifest(&dir), &[]);
        let input = load_input(&cli.input_path).unwrap();
        let options = generate_options(&cli, &input);

        assert_eq!(options.title, "Pet Store");
        assert_eq!(options.base_url, "http://pets.example.com/api");
        assert!(options.excluded_groups.contains("internal"));
    }

    #[test]
    fn test_cli_values_override_manifest() {
        let dir = TempDir::new().unwrap();
        let cli = args(
            &manifest(&dir),
            &["--title", "Other", "--base-url", "https://x.io", "--exclude", "pets"],
        );
        let input = load_input(&cli.input_path).unwrap();
        let options = generate_options(&cli, &input);

        assert_eq!(options.title, "Other");
        assert_eq!(options.base_url, "https://x.io");
        assert!(options.excluded_groups.contains("internal"));
        assert!(options.excluded_groups.contains("pets"));
    }

    #[test]
    fn test_base_url_from_parts() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/main.rs"), "fn main() {}").unwrap();

        let cli = args(
            dir.path(),
            &["--scheme", "https", "--host", "api.local", "--port", "9443", "--context-path", "/v1"],
        );
        let input = load_input(&cli.input_path).unwrap();
        let options = generate_options(&cli, &input);
        assert_eq!(options.base_url, "https://api.local:9443/v1");
    }

    #[test]
    fn test_resolver_selection() {
        let dir = TempDir::new().unwrap();
        let cli = args(dir.path(), &["--types", "xsd", "--candidates", "members"]);
        let resolver = resolver(&cli);
        assert_eq!(resolver.table().namespace().prefix, "xs");
        assert_eq!(resolver.candidates(), CandidateSet::Members);
    }

    #[test]
    fn test_run_writes_output() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out").join("application.json");
        let cli = args(
            &manifest(&dir),
            &["-f", "json", "-o", output.to_str().unwrap()],
        );

        run(cli).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written["doc"]["title"], "Pet Store");
        let resources = written["resources"]["resource"].as_array().unwrap();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0]["path"], "/pets");
    }

    #[test]
    fn test_empty_project_fails() {
        let dir = TempDir::new().unwrap();
        assert!(load_input(dir.path()).is_err());
    }
}
