//! `agentstory export`

use colored::*;
use eyre::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use agentstory::export::archive::{build_archive, write_to_directory};
use agentstory::export::filesystem::{ExportOptions, FilesystemExport, export_specification};
use agentstory::spec::AgentSpecification;

use super::{block_on, format_size, print_warnings};
use crate::cli::{ExportArgs, OutputFormat};
use crate::config::Config;

/// What an export run produced, for JSON/YAML output
#[derive(Serialize)]
struct ExportReport {
    root: String,
    skill_count: usize,
    total_files: usize,
    estimated_size_bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    directory: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    archive: Option<PathBuf>,
    dry_run: bool,
    files: Vec<String>,
    warnings: Vec<String>,
}

pub fn run(args: ExportArgs, quiet: bool, config: &Config) -> Result<()> {
    let spec = AgentSpecification::load(&args.spec)?;
    let options = export_options(&args, &config.export);
    let export = export_specification(&spec, &options);
    log::info!(
        "Exported '{}': {} skill(s), {} file(s)",
        export.root_directory_name,
        export.skill_count,
        export.total_files
    );

    let write_dir = !args.archive_only;
    let write_archive = !args.no_archive && (args.archive || args.archive_only || config.archive.enabled);
    let dest = config.output_dir(args.out.as_deref());

    let mut report = ExportReport {
        root: export.root_directory_name.clone(),
        skill_count: export.skill_count,
        total_files: export.total_files,
        estimated_size_bytes: export.estimated_size_bytes,
        directory: None,
        archive: None,
        dry_run: args.dry_run,
        files: export.files.iter().map(|f| f.path.clone()).collect(),
        warnings: export.warnings.clone(),
    };

    if !args.dry_run {
        let (directory, archive) = block_on(write_outputs(&export, &dest, write_dir, write_archive))??;
        report.directory = directory;
        report.archive = archive;
    }

    print_report(&report, &export, OutputFormat::resolve(args.format), quiet)
}

/// Config defaults with command-line overrides applied
fn export_options(args: &ExportArgs, defaults: &ExportOptions) -> ExportOptions {
    let mut options = defaults.clone();
    if args.no_readme {
        options.include_readme = false;
    }
    if args.no_skills {
        options.include_skills = false;
    }
    if args.no_memory {
        options.include_memory_structure = false;
    }
    if args.shared_tools {
        options.include_shared_tools = true;
    }
    if args.logs {
        options.include_logs = true;
    }
    if args.strict_slugs {
        options.generate_missing_slugs = false;
    }
    options
}

async fn write_outputs(
    export: &FilesystemExport,
    dest: &Path,
    write_dir: bool,
    write_archive: bool,
) -> Result<(Option<PathBuf>, Option<PathBuf>)> {
    let root = &export.root_directory_name;
    let mut directory = None;
    let mut archive = None;

    if write_dir {
        let dir = write_to_directory(&export.files, root, dest)
            .await
            .context(format!("Failed to write export to {}", dest.display()))?;
        directory = Some(dir);
    }

    if write_archive {
        let bytes = build_archive(&export.files, root).await.context("Failed to build archive")?;
        tokio::fs::create_dir_all(dest)
            .await
            .context(format!("Failed to create {}", dest.display()))?;
        let path = dest.join(export.archive_name());
        tokio::fs::write(&path, bytes)
            .await
            .context(format!("Failed to write {}", path.display()))?;
        log::info!("Wrote archive {}", path.display());
        archive = Some(path);
    }

    Ok((directory, archive))
}

fn print_report(report: &ExportReport, export: &FilesystemExport, format: OutputFormat, quiet: bool) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(report)?),
        OutputFormat::Text => {
            if report.dry_run {
                println!("{} Would export {}/", "→".blue(), report.root.cyan());
                for file in &export.files {
                    println!("  {} ({})", file.path, format_size(file.content.len() as u64));
                }
            } else if !quiet {
                println!(
                    "{} Exported {} ({} files, {} skill(s), ~{})",
                    "✓".green(),
                    report.root.bold(),
                    report.total_files,
                    report.skill_count,
                    format_size(report.estimated_size_bytes as u64)
                );
                if let Some(dir) = &report.directory {
                    println!("  directory: {}", dir.display());
                }
                if let Some(archive) = &report.archive {
                    println!("  archive:   {}", archive.display());
                }
            }
            if !quiet {
                print_warnings(&report.warnings);
            }
        }
    }
    Ok(())
}
