//! `agentstory harness` commands

use colored::*;
use eyre::{Context, Result, eyre};
use serde::Serialize;
use std::path::{Path, PathBuf};

use agentstory::export::ExportedFile;
use agentstory::export::archive::write_to_directory;
use agentstory::export::filesystem::root_directory_name;
use agentstory::harness::{AdapterRegistry, BatchExport, BatchExportOptions, TryItConfig};
use agentstory::spec::AgentSpecification;

use super::{block_on, print_warnings};
use crate::cli::{HarnessAction, OutputFormat};
use crate::config::Config;

/// File holding the specification when `--include-source` is set
const SOURCE_FILE: &str = "agent-story.json";

pub fn run(action: HarnessAction, quiet: bool, config: &Config) -> Result<()> {
    let registry = AdapterRegistry::with_builtin_adapters();
    match action {
        HarnessAction::List { format } => list(&registry, OutputFormat::resolve(format)),
        HarnessAction::Check { spec, format } => check(&registry, &spec, OutputFormat::resolve(format)),
        HarnessAction::Export {
            spec,
            targets,
            out,
            include_source,
            dry_run,
            format,
        } => {
            let spec = AgentSpecification::load(&spec)?;
            let options = batch_options(targets, include_source, config);
            let dest = config.output_dir(out.as_deref());
            export(&registry, &spec, &options, &dest, dry_run, OutputFormat::resolve(format), quiet)
        }
        HarnessAction::Try { spec, id, format } => try_it(&registry, &spec, &id, OutputFormat::resolve(format)),
    }
}

#[derive(Serialize)]
struct AdapterInfo {
    id: String,
    name: String,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    try_it: bool,
}

fn list(registry: &AdapterRegistry, format: OutputFormat) -> Result<()> {
    let blank = AgentSpecification::default();
    let infos: Vec<AdapterInfo> = registry
        .list()
        .iter()
        .map(|adapter| AdapterInfo {
            id: adapter.id().to_string(),
            name: adapter.name().to_string(),
            description: adapter.description().to_string(),
            url: adapter.url().map(str::to_string),
            try_it: adapter.try_it_config(&blank).is_some(),
        })
        .collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&infos)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&infos)?),
        OutputFormat::Text => {
            println!("{}", "Harness Adapters".bold());
            println!();
            for info in &infos {
                println!("  {:<12} {} - {}", info.id.cyan(), info.name, info.description);
            }
            println!();
            println!("Total: {} adapter(s)", infos.len());
        }
    }
    Ok(())
}

fn check(registry: &AdapterRegistry, path: &Path, format: OutputFormat) -> Result<()> {
    let spec = AgentSpecification::load(path)?;
    let reports = registry.check_all(&spec);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&reports)?),
        OutputFormat::Text => {
            for report in &reports {
                let compat = &report.compatibility;
                if report.compatible {
                    println!("{} {} ({})", "✓".green(), report.name.bold(), report.id);
                } else {
                    println!("{} {} ({})", "✗".red(), report.name.bold(), report.id);
                    for feature in compat.missing_features() {
                        println!("    missing: {}", feature.red());
                    }
                }
                for feature in compat.unsupported_features() {
                    println!("    unsupported: {}", feature.yellow());
                }
                for warning in compat.warnings() {
                    println!("    {} {}", "⚠".yellow(), warning);
                }
            }
        }
    }
    Ok(())
}

/// `-t` targets win over configured defaults; neither means every adapter
fn batch_options(targets: Vec<String>, include_source: bool, config: &Config) -> BatchExportOptions {
    let adapter_ids = if !targets.is_empty() {
        Some(targets)
    } else if !config.harness.default_targets.is_empty() {
        Some(config.harness.default_targets.clone())
    } else {
        None
    };
    BatchExportOptions {
        adapter_ids,
        include_source: include_source || config.harness.include_source,
    }
}

#[derive(Serialize)]
struct HarnessReport {
    id: String,
    files: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    directory: Option<PathBuf>,
    instructions: String,
}

#[derive(Serialize)]
struct BatchReport {
    harnesses: Vec<HarnessReport>,
    warnings: Vec<String>,
    dry_run: bool,
}

fn export(
    registry: &AdapterRegistry,
    spec: &AgentSpecification,
    options: &BatchExportOptions,
    dest: &Path,
    dry_run: bool,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let batch = registry.export_to_harnesses(spec, options);
    let root = root_directory_name(spec);

    let mut report = BatchReport {
        harnesses: Vec::new(),
        warnings: batch.warnings.clone(),
        dry_run,
    };

    let written = if dry_run {
        Vec::new()
    } else {
        block_on(write_batch(&batch, &root, dest))??
    };

    for (id, output) in &batch.outputs {
        let mut files: Vec<String> = output.files.iter().map(|f| f.path.clone()).collect();
        if batch.source.is_some() {
            files.push(SOURCE_FILE.to_string());
        }
        report.harnesses.push(HarnessReport {
            id: id.clone(),
            files,
            directory: written.iter().find(|(written_id, _)| written_id == id).map(|(_, dir)| dir.clone()),
            instructions: output.instructions.clone(),
        });
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&report)?),
        OutputFormat::Text => {
            if !quiet {
                for harness in &report.harnesses {
                    let verb = if dry_run { "Would export" } else { "Exported" };
                    println!("{} {} {} ({} files)", "✓".green(), verb, harness.id.bold(), harness.files.len());
                    if let Some(dir) = &harness.directory {
                        println!("  directory: {}", dir.display());
                    }
                    if dry_run {
                        for file in &harness.files {
                            println!("    {}", file);
                        }
                    }
                    for line in harness.instructions.lines() {
                        println!("    {}", line.dimmed());
                    }
                }
                if report.harnesses.is_empty() {
                    println!("Nothing exported.");
                }
                print_warnings(&report.warnings);
            }
        }
    }
    Ok(())
}

/// Write each harness output to `dest/<root>-<id>/`
async fn write_batch(batch: &BatchExport, root: &str, dest: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut written = Vec::new();
    for (id, output) in &batch.outputs {
        let mut files = output.files.clone();
        if let Some(source) = &batch.source {
            files.push(ExportedFile::text(SOURCE_FILE, format!("{}\n", source)));
        }
        let dir_name = format!("{}-{}", root, id);
        let dir = write_to_directory(&files, &dir_name, dest)
            .await
            .context(format!("Failed to write {} export", id))?;
        written.push((id.clone(), dir));
    }
    Ok(written)
}

fn try_it(registry: &AdapterRegistry, path: &Path, id: &str, format: OutputFormat) -> Result<()> {
    let spec = AgentSpecification::load(path)?;
    let adapter = registry.get(id).ok_or_else(|| {
        eyre!(
            "Unknown harness adapter '{}' (available: {})",
            id,
            registry.ids().join(", ")
        )
    })?;

    let config: Option<TryItConfig> = adapter.try_it_config(&spec);
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&config)?),
        OutputFormat::Text => match config {
            Some(config) => {
                println!("{}", format!("Try it in {}", adapter.name()).bold());
                println!();
                for (i, step) in config.setup_instructions.iter().enumerate() {
                    println!("  {}. {}", i + 1, step);
                }
                println!();
                println!("  {}", config.launch.to_string().cyan());
            }
            None => println!("{} has no launch recipe; follow the export instructions instead.", adapter.name()),
        },
    }
    Ok(())
}
