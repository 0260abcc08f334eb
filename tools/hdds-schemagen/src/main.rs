// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! HDDS schema generator CLI
//!
//! Resolves types from a catalog document into OpenAPI-style JSON schemas.
//!
//! # Usage
//!
//! ```bash
//! # Root schema plus every named component
//! hdds-schemagen resolve "acme.Page<acme.Order>" --catalog shop.toml
//!
//! # Named components only, pretty-printed
//! hdds-schemagen resolve acme.Order --catalog shop.toml --mode all --pretty
//!
//! # Check a catalog and a configuration file
//! hdds-schemagen validate --catalog shop.toml --config schemagen.toml
//!
//! # Write an example configuration
//! hdds-schemagen gen-config --output schemagen.toml
//! ```

mod config;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use config::{CliConfig, OutputMode};
use hdds_typeschema::{ModelConverters, TypeCatalog, TypeDescriptor};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hdds-schemagen")]
#[command(about = "Resolve catalog types into OpenAPI-style JSON schemas")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve one type and print its schema
    Resolve {
        /// Type descriptor, e.g. `acme.Page<acme.Order>`
        #[arg(value_name = "TYPE")]
        ty: String,

        /// Catalog document (.toml or .json)
        #[arg(short, long, value_name = "FILE")]
        catalog: PathBuf,

        /// Configuration file path
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Output shape (overrides the configuration file)
        #[arg(short, long, value_enum)]
        mode: Option<OutputMode>,

        /// Pretty-print JSON
        #[arg(short, long)]
        pretty: bool,

        /// Additional excluded packages (comma-separated)
        #[arg(long, value_delimiter = ',')]
        exclude_package: Vec<String>,

        /// Additional excluded types (comma-separated)
        #[arg(long, value_delimiter = ',')]
        exclude_type: Vec<String>,

        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Validate a catalog and/or a configuration file
    Validate {
        /// Catalog document
        #[arg(long, value_name = "FILE")]
        catalog: Option<PathBuf>,

        /// Configuration file path
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Generate example configuration file
    GenConfig {
        /// Output file path
        #[arg(short, long, default_value = "schemagen.toml")]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Library records arrive through the log bridge installed by `init`.
    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Resolve {
            ty,
            catalog,
            config,
            mode,
            pretty,
            exclude_package,
            exclude_type,
            output,
        } => {
            let mut settings = load_config(config.as_deref())?;
            if let Some(mode) = mode {
                settings.output.mode = mode;
            }
            settings.output.pretty |= pretty;
            cmd_resolve(
                &ty,
                &catalog,
                &settings,
                &exclude_package,
                &exclude_type,
                output.as_deref(),
            )
        }
        Commands::Validate { catalog, config } => {
            cmd_validate(catalog.as_deref(), config.as_deref())
        }
        Commands::GenConfig { output } => cmd_gen_config(&output),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<CliConfig> {
    match path {
        Some(path) => CliConfig::from_file(path)
            .with_context(|| format!("loading configuration {}", path.display())),
        None => Ok(CliConfig::default()),
    }
}

fn cmd_resolve(
    ty: &str,
    catalog_path: &Path,
    settings: &CliConfig,
    exclude_packages: &[String],
    exclude_types: &[String],
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let ty: TypeDescriptor = ty
        .parse()
        .with_context(|| format!("invalid type descriptor '{ty}'"))?;
    let catalog = TypeCatalog::from_path(catalog_path)
        .with_context(|| format!("loading catalog {}", catalog_path.display()))?;

    if !ModelConverters::init_global(settings.resolver.clone()) {
        tracing::warn!("converter registry already initialized, configuration ignored");
    }
    let registry = ModelConverters::global();
    for package in exclude_packages {
        registry.exclude_package(package);
    }
    for name in exclude_types {
        registry.exclude_type(name);
    }

    let value = render(&registry, &ty, &catalog, settings.output.mode)?;
    let text = if settings.output.pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };

    match output {
        Some(path) => {
            std::fs::write(path, format!("{text}\n"))
                .with_context(|| format!("writing {}", path.display()))?;
            tracing::info!("schema written to {}", path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}

/// JSON for `ty` in the requested shape; `null` when `ty` is excluded or primitive.
fn render(
    registry: &ModelConverters,
    ty: &TypeDescriptor,
    catalog: &TypeCatalog,
    mode: OutputMode,
) -> anyhow::Result<Value> {
    let prefix = registry.config().reference_prefix.as_str();
    let resolved = registry
        .read_all_as_resolved_schema(ty, catalog)
        .with_context(|| format!("resolving {ty}"))?;
    let Some(resolved) = resolved else {
        tracing::warn!("{} is excluded or primitive, nothing to resolve", ty);
        return Ok(Value::Null);
    };

    Ok(match mode {
        OutputMode::Root => resolved.schema.to_json(prefix),
        OutputMode::All => Value::Object(
            resolved
                .referenced_schemas
                .iter()
                .map(|(name, node)| (name.clone(), node.to_json(prefix)))
                .collect(),
        ),
        OutputMode::Document => resolved.to_json(prefix),
    })
}

fn cmd_validate(catalog: Option<&Path>, config: Option<&Path>) -> anyhow::Result<()> {
    if catalog.is_none() && config.is_none() {
        bail!("nothing to validate: pass --catalog and/or --config");
    }

    if let Some(path) = config {
        let settings = load_config(Some(path))?;
        println!("Configuration valid: {}", path.display());
        println!("  max_depth: {}", settings.resolver.max_depth);
        println!(
            "  excluded packages: {}",
            settings.resolver.default_excluded_packages.join(", ")
        );
        println!("  output mode: {:?}", settings.output.mode);
    }

    if let Some(path) = catalog {
        let catalog = TypeCatalog::from_path(path)
            .with_context(|| format!("loading catalog {}", path.display()))?;
        let missing = catalog.unresolved_references();
        if !missing.is_empty() {
            for (owner, names) in &missing {
                eprintln!("  {owner}: unknown {}", names.join(", "));
            }
            bail!("catalog {} references undefined types", path.display());
        }
        println!("Catalog valid: {} ({} types)", path.display(), catalog.len());
    }
    Ok(())
}

fn cmd_gen_config(output: &Path) -> anyhow::Result<()> {
    let toml_str = toml::to_string_pretty(&CliConfig::example())?;
    let content = format!(
        "# hdds-schemagen configuration\n# Generated by hdds-schemagen gen-config\n\n{toml_str}"
    );
    std::fs::write(output, content).with_context(|| format!("writing {}", output.display()))?;
    println!("Generated configuration file: {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hdds_typeschema::ResolverConfig;

    const SHOP: &str = r#"
[[types]]
name = "acme.Order"
kind = "struct"

[[types.members]]
name = "id"
type = "i64"

[[types.members]]
name = "parent"
type = "collections.Optional<acme.Order>"
"#;

    fn setup() -> (ModelConverters, TypeCatalog) {
        (
            ModelConverters::with_config(ResolverConfig::default()),
            TypeCatalog::from_toml_str(SHOP).expect("catalog"),
        )
    }

    #[test]
    fn test_render_modes() {
        let (registry, catalog) = setup();
        let ty: TypeDescriptor = "acme.Order".parse().expect("descriptor");

        let root = render(&registry, &ty, &catalog, OutputMode::Root).expect("root");
        assert_eq!(root["properties"]["parent"]["$ref"], "#/components/schemas/Order");

        let all = render(&registry, &ty, &catalog, OutputMode::All).expect("all");
        assert_eq!(all.as_object().map(|m| m.len()), Some(1));

        let doc = render(&registry, &ty, &catalog, OutputMode::Document).expect("document");
        assert_eq!(doc["components"]["schemas"]["Order"]["type"], "object");
    }

    #[test]
    fn test_render_excluded_is_null() {
        let (registry, catalog) = setup();
        let ty: TypeDescriptor = "core.String".parse().expect("descriptor");
        let value = render(&registry, &ty, &catalog, OutputMode::Document).expect("render");
        assert!(value.is_null());
    }

    #[test]
    fn test_gen_config_output_is_valid() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("schemagen.toml");
        cmd_gen_config(&path).expect("gen-config");
        assert_eq!(CliConfig::from_file(&path).expect("load"), CliConfig::example());
        cmd_validate(None, Some(&path)).expect("validate");
    }

    #[test]
    fn test_validate_reports_missing_types() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.toml");
        let broken = r#"
[[types]]
name = "acme.Cart"
kind = "struct"

[[types.members]]
name = "coupon"
type = "acme.Coupon"
"#;
        std::fs::write(&path, broken).expect("write");
        assert!(cmd_validate(Some(&path), None).is_err());
        assert!(cmd_validate(None, None).is_err());
    }
}
