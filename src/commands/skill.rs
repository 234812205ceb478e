//! Skill commands: pack one skill, inspect a packaged SKILL.md

use colored::*;
use eyre::{Result, eyre};
use serde::Serialize;
use std::path::Path;

use agentstory::skill::{PackOptions, SkillMetadata, pack_skill, parse_skill_md};
use agentstory::slug::slugify;
use agentstory::spec::{AgentSpecification, Skill};

use super::print_warnings;
use crate::cli::{OutputFormat, SkillAction};
use crate::config::Config;

/// Run a skill subcommand
pub fn run(action: SkillAction, config: &Config) -> Result<()> {
    match action {
        SkillAction::Pack {
            spec,
            skill,
            strict_slugs,
        } => {
            let generate = config.export.generate_missing_slugs && !strict_slugs;
            pack(&spec, &skill, generate)
        }
        SkillAction::Inspect { path, format } => inspect(&path, OutputFormat::resolve(format)),
    }
}

/// Find a skill by display name (case-insensitive) or slug
fn find_skill<'a>(spec: &'a AgentSpecification, query: &str) -> Option<&'a Skill> {
    let query = query.trim();
    spec.skills
        .iter()
        .find(|s| s.name.trim().eq_ignore_ascii_case(query))
        .or_else(|| {
            spec.skills
                .iter()
                .find(|s| s.explicit_slug() == Some(query) || slugify(&s.name) == query)
        })
}

/// Print the SKILL.md artifact to stdout; warnings go to stderr
fn pack(path: &Path, query: &str, generate_missing_slug: bool) -> Result<()> {
    let spec = AgentSpecification::load(path)?;
    let skill = find_skill(&spec, query).ok_or_else(|| {
        let names: Vec<&str> = spec.skills.iter().map(|s| s.name.as_str()).collect();
        eyre!("No skill named '{}' (skills: {})", query, names.join(", "))
    })?;

    let packed = pack_skill(skill, &PackOptions { generate_missing_slug })?;
    log::debug!("Packed skill '{}' as '{}'", skill.name, packed.slug);

    print!("{}", packed.artifact);
    for file in packed.scripts.iter().chain(&packed.references) {
        eprintln!("{} {} not printed ({} bytes)", "→".blue(), file.path, file.content.len());
    }
    print_warnings(&packed.warnings);
    Ok(())
}

#[derive(Serialize)]
struct InspectReport<'a> {
    #[serde(flatten)]
    metadata: &'a SkillMetadata,
    tools: Vec<&'a str>,
    problems: Vec<String>,
    body_lines: usize,
}

fn inspect(path: &Path, format: OutputFormat) -> Result<()> {
    let (metadata, body) = parse_skill_md(path)?;
    let report = InspectReport {
        metadata: &metadata,
        tools: metadata.tools(),
        problems: metadata.problems(),
        body_lines: body.lines().count(),
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&report)?),
        OutputFormat::Text => {
            println!("{}", metadata.name.bold());
            println!("  {}", metadata.description);
            if let Some(license) = &metadata.license {
                println!("  license: {}", license);
            }
            if let Some(compatibility) = &metadata.compatibility {
                println!("  compatibility: {}", compatibility);
            }
            if !report.tools.is_empty() {
                println!("  tools: {}", report.tools.join(", "));
            }
            for (key, value) in &metadata.metadata {
                println!("  {}: {}", key.dimmed(), value);
            }
            println!("  body: {} line(s)", report.body_lines);

            if report.problems.is_empty() {
                println!("{} Valid SKILL.md", "✓".green());
            } else {
                for problem in &report.problems {
                    println!("{} {}", "✗".red(), problem);
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> AgentSpecification {
        AgentSpecification::from_str(
            "name: Helper\nskills:\n  - name: Tell Jokes\n  - name: Summarize\n    portability:\n      slug: tldr\n",
        )
        .unwrap()
    }

    #[test]
    fn test_find_skill() {
        let spec = spec();
        assert_eq!(find_skill(&spec, "tell jokes").unwrap().name, "Tell Jokes");
        assert_eq!(find_skill(&spec, "tell-jokes").unwrap().name, "Tell Jokes");
        assert_eq!(find_skill(&spec, "tldr").unwrap().name, "Summarize");
        assert!(find_skill(&spec, "dance").is_none());
    }
}
