use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use indexmap::IndexMap;
use serde_json::{Map, Value, json};

use autospec_core::PathMatcher;
use autospec_core::config::{self, CONFIG_FILE_NAME};

#[derive(Parser)]
#[command(
    name = "autospec",
    about = "Swagger documents synthesized from observed traffic",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize the paths and operations of a document
    Inspect {
        /// Path to the document (JSON or YAML)
        #[arg(short, long)]
        input: PathBuf,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: InspectFormat,
    },

    /// Merge a predefined fragment over a synthesized document
    Merge {
        /// Path to the synthesized document
        #[arg(short, long)]
        input: PathBuf,

        /// Path to the predefined fragment (JSON or YAML)
        #[arg(short, long)]
        predefined: PathBuf,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show which path template a URL resolves to
    Match {
        /// Path to the document
        #[arg(short, long)]
        input: PathBuf,

        /// Request URL, query string allowed
        url: String,

        /// HTTP method the operation must exist for
        #[arg(long, default_value = "get")]
        method: String,
    },

    /// Initialize a new autospec configuration
    Init {
        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, ValueEnum)]
enum InspectFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Inspect { input, format } => cmd_inspect(&input, format),

        Commands::Merge {
            input,
            predefined,
            output,
        } => cmd_merge(&input, &predefined, output.as_deref()),

        Commands::Match { input, url, method } => cmd_match(&input, &url, &method),

        Commands::Init { force } => cmd_init(force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "autospec", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Read a document, as JSON when the extension says so and as YAML otherwise.
fn load_document(path: &Path) -> Result<Value> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("yaml");

    let doc: Value = match ext {
        "json" => serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {} as JSON", path.display()))?,
        _ => serde_yaml_ng::from_str(&content)
            .with_context(|| format!("failed to parse {} as YAML", path.display()))?,
    };
    log::debug!("loaded {} with {} paths", path.display(), paths_of(&doc).len());
    Ok(doc)
}

fn paths_of(doc: &Value) -> Map<String, Value> {
    doc.get("paths")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

fn cmd_inspect(input: &Path, format: InspectFormat) -> Result<()> {
    let doc = load_document(input)?;
    let summary = build_inspect_summary(&doc);

    match format {
        InspectFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(&summary)?;
            print!("{}", yaml);
        }
        InspectFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)?;
            println!("{}", json);
        }
    }

    Ok(())
}

fn build_inspect_summary(doc: &Value) -> Value {
    let mut operations = Vec::new();
    for (path, item) in paths_of(doc) {
        let Some(methods) = item.as_object() else {
            continue;
        };
        for (method, op) in methods {
            let parameters: Vec<String> = op
                .get("parameters")
                .and_then(Value::as_array)
                .map(|params| {
                    params
                        .iter()
                        .map(|p| {
                            format!(
                                "{} {}",
                                p["in"].as_str().unwrap_or("?"),
                                p["name"].as_str().unwrap_or("?")
                            )
                        })
                        .collect()
                })
                .unwrap_or_default();
            let responses: Vec<&String> = op
                .get("responses")
                .and_then(Value::as_object)
                .map(|r| r.keys().collect())
                .unwrap_or_default();

            operations.push(json!({
                "method": method.to_uppercase(),
                "path": path,
                "parameters": parameters,
                "responses": responses,
            }));
        }
    }

    let security: Vec<&String> = doc
        .get("securityDefinitions")
        .and_then(Value::as_object)
        .map(|defs| defs.keys().collect())
        .unwrap_or_default();

    json!({
        "info": {
            "title": doc.pointer("/info/title"),
            "version": doc.pointer("/info/version"),
        },
        "host": doc.get("host"),
        "schemes": doc.get("schemes"),
        "operations": operations,
        "security": security,
    })
}

fn cmd_merge(input: &Path, predefined: &Path, output: Option<&Path>) -> Result<()> {
    let doc = load_document(input)?;
    let predefined = config::load_predefined(predefined)?;
    let merged = predefined.apply(doc);
    let rendered = serde_json::to_string_pretty(&merged)?;

    match output {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

fn cmd_match(input: &Path, url: &str, method: &str) -> Result<()> {
    let doc = load_document(input)?;
    let resolved = resolve_url(&doc, url, method)?;
    println!("{}", serde_json::to_string_pretty(&resolved)?);
    Ok(())
}

/// Resolve `url` against the document's path templates and check that the
/// template documents `method`.
fn resolve_url(doc: &Value, url: &str, method: &str) -> Result<Value> {
    let paths = paths_of(doc);
    let matcher: PathMatcher = paths.keys().map(String::as_str).collect();

    let Some(route) = matcher.resolve(url) else {
        anyhow::bail!("no path template matches {url}");
    };

    let method = method.to_lowercase();
    let documented = paths
        .get(&route.template)
        .and_then(|item| item.get(&method))
        .is_some();
    if !documented {
        anyhow::bail!(
            "{} has no {} operation",
            route.template,
            method.to_uppercase()
        );
    }

    let params: IndexMap<String, String> = route.params.into_iter().collect();
    Ok(json!({
        "template": route.template,
        "method": method.to_uppercase(),
        "params": params,
    }))
}

fn cmd_init(force: bool) -> Result<()> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);

    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, config::default_config_content())?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}
