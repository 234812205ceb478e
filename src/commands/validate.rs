//! `agentstory validate`

use colored::*;
use eyre::{Result, bail};
use std::path::Path;

use agentstory::spec::AgentSpecification;
use agentstory::spec::validate::{Severity, has_errors, validate};

use crate::cli::OutputFormat;

pub fn run(path: &Path, format: OutputFormat) -> Result<()> {
    let spec = AgentSpecification::load(path)?;
    let issues = validate(&spec);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&issues)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&issues)?),
        OutputFormat::Text => {
            if issues.is_empty() {
                println!("{} {} is valid", "✓".green(), path.display());
            }
            for issue in &issues {
                let marker = match issue.severity {
                    Severity::Error => "✗".red(),
                    Severity::Warning => "⚠".yellow(),
                };
                println!("{} {}: {}", marker, issue.field.cyan(), issue.message);
            }
        }
    }

    if has_errors(&issues) {
        let count = issues.iter().filter(|i| i.severity == Severity::Error).count();
        bail!("{} has {} error(s)", path.display(), count);
    }
    Ok(())
}
