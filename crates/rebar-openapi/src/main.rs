//! CLI for `rebar-openapi`.
//!
//! # Subcommands
//!
//! ```text
//! # Flatten an inline JSON/YAML schema into a root schema + definitions
//! rebar-openapi flatten --input schema.json --config api/openapi/config.yaml
//!
//! # Convert route rules into OpenAPI path templates
//! rebar-openapi path '/projects/<uuid:project_uid>/foos/<foo_uid>'
//!
//! # Print security scheme definitions for the configured authenticators
//! rebar-openapi security --config api/openapi/config.yaml
//! ```
//!
//! Logs go to stderr; control verbosity with `RUST_LOG`.

#![forbid(unsafe_code)]

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use rebar_openapi::{AuthenticatorConverter, Flattener, ProjectConfig, format_path_for_swagger};
use serde_yaml_ng::{Mapping, Value};
use tracing_subscriber::EnvFilter;

/// Schema flattening, path templating and security scheme conversion for
/// `OpenAPI`/`Swagger` documents.
#[derive(Parser)]
#[command(name = "rebar-openapi", version, about)]
enum Cli {
    /// Flatten an inline schema into `{schema, definitions}`.
    Flatten(FlattenArgs),

    /// Rewrite route rules into `OpenAPI` path templates.
    Path(PathArgs),

    /// Print security scheme definitions for configured authenticators.
    Security(SecurityArgs),
}

#[derive(Parser)]
struct FlattenArgs {
    /// Path to the input schema (JSON or YAML).
    #[arg(short, long)]
    input: PathBuf,

    /// Path to the output file. Defaults to stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to a project config file (YAML or TOML).
    ///
    /// CLI flags override values from the config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// `$ref` base (e.g. `#/definitions`). Overrides `ref_base` from the config file.
    #[arg(long)]
    base: Option<String>,

    /// Keep a titled root schema inline.
    #[arg(long)]
    inline_root: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Yaml)]
    format: Format,
}

#[derive(Parser)]
struct PathArgs {
    /// Route rules to convert.
    #[arg(required = true)]
    paths: Vec<String>,
}

#[derive(Parser)]
struct SecurityArgs {
    /// Path to a project config file declaring `authenticators`.
    #[arg(short, long)]
    config: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Yaml)]
    format: Format,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Yaml,
    Json,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli {
        Cli::Flatten(args) => run_flatten(&args),
        Cli::Path(args) => {
            run_path(&args);
            Ok(())
        }
        Cli::Security(args) => run_security(&args),
    }
}

/// Load the project config if provided, otherwise use defaults.
fn load_config(path: Option<&PathBuf>) -> anyhow::Result<ProjectConfig> {
    match path {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading config");
            ProjectConfig::load(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))
        }
        None => Ok(ProjectConfig::default()),
    }
}

fn run_flatten(args: &FlattenArgs) -> anyhow::Result<()> {
    let project = load_config(args.config.as_ref())?;
    let flattener = build_flattener(&project, args);

    let input = fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read input: {}", args.input.display()))?;
    let schema: Value = serde_yaml_ng::from_str(&input)
        .with_context(|| format!("Failed to parse schema: {}", args.input.display()))?;

    let (flat, definitions) = flattener.flatten(&schema);
    eprintln!(
        "Extracted {} definitions under {}",
        definitions.len(),
        flattener.base()
    );

    let mut doc = Mapping::new();
    doc.insert(Value::String("schema".to_string()), flat);
    doc.insert(
        Value::String("definitions".to_string()),
        Value::Mapping(definitions),
    );

    let rendered = render(&Value::Mapping(doc), args.format)?;
    match &args.output {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("Failed to write output: {}", path.display()))?;
            eprintln!("Wrote flattened schema to {}", path.display());
        }
        None => print!("{rendered}"),
    }

    Ok(())
}

/// Build the flattener: start from project config, then apply CLI overrides.
fn build_flattener(project: &ProjectConfig, args: &FlattenArgs) -> Flattener {
    let base = args.base.as_deref().unwrap_or_else(|| project.ref_base());
    Flattener::new(base).inline_root(project.inline_root || args.inline_root)
}

fn run_path(args: &PathArgs) {
    for rule in &args.paths {
        let (path, arguments) = format_path_for_swagger(rule);
        println!("{path}");
        for argument in arguments {
            println!("  {argument}");
        }
    }
}

fn run_security(args: &SecurityArgs) -> anyhow::Result<()> {
    let project = load_config(Some(&args.config))?;
    let registry = project
        .handler_registry()
        .context("Failed to build authenticators from config")?;

    let converter = AuthenticatorConverter::with_defaults().openapi_version(project.openapi_version);
    let schemes = converter
        .get_security_schemes(&registry)
        .context("Failed to convert authenticators")?;

    let mut doc = Mapping::new();
    doc.insert(
        Value::String(project.openapi_version.security_schemes_key().to_string()),
        Value::Mapping(schemes),
    );
    print!("{}", render(&Value::Mapping(doc), args.format)?);

    Ok(())
}

/// Serialize a document in the requested format.
fn render(doc: &Value, format: Format) -> anyhow::Result<String> {
    match format {
        Format::Yaml => serde_yaml_ng::to_string(doc).context("Failed to serialize YAML"),
        Format::Json => {
            let mut json = serde_json::to_string_pretty(doc).context("Failed to serialize JSON")?;
            json.push('\n');
            Ok(json)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Write content to a temporary file and return its path.
    fn write_temp_file(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("rebar_openapi_test_{name}"));
        fs::write(&path, content).unwrap();
        path
    }

    fn flatten_args(base: Option<&str>, inline_root: bool) -> FlattenArgs {
        FlattenArgs {
            input: PathBuf::from("schema.json"),
            output: None,
            config: None,
            base: base.map(ToString::to_string),
            inline_root,
            format: Format::Yaml,
        }
    }

    #[test]
    fn cli_base_overrides_config() {
        let project: ProjectConfig = serde_yaml_ng::from_str("openapi_version: v3").unwrap();

        let flattener = build_flattener(&project, &flatten_args(None, false));
        assert_eq!(flattener.base(), "#/components/schemas");

        let flattener = build_flattener(&project, &flatten_args(Some("#/x"), false));
        assert_eq!(flattener.base(), "#/x");
    }

    #[test]
    fn inline_root_from_either_source() {
        let project: ProjectConfig = serde_yaml_ng::from_str("inline_root: true").unwrap();
        let schema: Value =
            serde_yaml_ng::from_str("type: object\ntitle: R\nproperties: {a: {type: string}}")
                .unwrap();

        let (flat, _) = build_flattener(&project, &flatten_args(None, false)).flatten(&schema);
        assert_eq!(flat, schema);

        let (flat, _) =
            build_flattener(&ProjectConfig::default(), &flatten_args(None, true)).flatten(&schema);
        assert_eq!(flat, schema);
    }

    #[test]
    fn render_json_and_yaml() {
        let doc: Value = serde_yaml_ng::from_str("a: 1").unwrap();
        let json = render(&doc, Format::Json).unwrap();
        assert!(json.contains("\"a\": 1"), "{json}");
        let yaml = render(&doc, Format::Yaml).unwrap();
        assert_eq!(yaml, "a: 1\n");
    }

    #[test]
    fn load_config_from_file() {
        let path = write_temp_file("config.yaml", "openapi_version: v3\n");
        let project = load_config(Some(&path)).unwrap();
        assert_eq!(project.ref_base(), "#/components/schemas");
    }

    #[test]
    fn load_missing_config_errors() {
        let path = PathBuf::from("/nonexistent/rebar.yaml");
        let err = load_config(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }
}
