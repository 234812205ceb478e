use colored::*;
use eyre::Result;

use crate::cli::{ConfigAction, OutputFormat};
use crate::config::Config;

pub fn run(action: ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Show { format } => show(OutputFormat::resolve(format), config),
    }
}

fn show(format: OutputFormat, config: &Config) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(config)?);
        }
        OutputFormat::Text => {
            println!("{}", "agentstory Configuration".bold());
            println!();

            println!("log_level: {}", config.log_level.as_filter());
            println!("output_dir: {}", config.output_dir(None).display());
            println!();

            let export = &config.export;
            println!("{}:", "export".cyan());
            println!("  include_skills: {}", export.include_skills);
            println!("  include_readme: {}", export.include_readme);
            println!("  include_memory_structure: {}", export.include_memory_structure);
            println!("  include_shared_tools: {}", export.include_shared_tools);
            println!("  include_logs: {}", export.include_logs);
            println!("  include_prompts: {}", export.include_prompts);
            println!("  include_tool_implementations: {}", export.include_tool_implementations);
            println!("  include_examples: {}", export.include_examples);
            println!("  include_templates: {}", export.include_templates);
            println!("  generate_missing_slugs: {}", export.generate_missing_slugs);
            println!();

            println!("{}:", "harness".cyan());
            if config.harness.default_targets.is_empty() {
                println!("  default_targets: (all compatible)");
            } else {
                println!("  default_targets: {}", config.harness.default_targets.join(", "));
            }
            println!("  include_source: {}", config.harness.include_source);
            println!();

            println!("{}:", "archive".cyan());
            println!("  enabled: {}", config.archive.enabled);
        }
    }

    Ok(())
}
