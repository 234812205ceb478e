//! SKILL.md frontmatter parsing
//!
//! Reads back the frontmatter of a packaged skill so it can be inspected or
//! checked after export.
//!
//! # Format
//!
//! ```markdown
//! ---
//! name: tell-jokes
//! description: Tells a joke on request
//! allowed-tools: joke-database
//! metadata:
//!   acquisition: built_in
//! ---
//!
//! # Tell Jokes
//! ...
//! ```

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::slug::is_valid_slug;

/// Metadata extracted from SKILL.md frontmatter
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SkillMetadata {
    /// Skill slug
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compatibility: Option<String>,
    /// Space-separated tool slugs
    #[serde(default, rename = "allowed-tools", skip_serializing_if = "Option::is_none")]
    pub allowed_tools: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl SkillMetadata {
    /// Tool slugs from `allowed-tools`
    pub fn tools(&self) -> Vec<&str> {
        self.allowed_tools
            .as_deref()
            .map(|t| t.split_whitespace().collect())
            .unwrap_or_default()
    }

    /// Problems a skill loader would reject this frontmatter for
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if !is_valid_slug(&self.name) {
            problems.push(format!("name '{}' is not a valid slug", self.name));
        }
        if self.description.trim().is_empty() {
            problems.push("description is empty".to_string());
        }
        if self.description.chars().count() > super::MAX_DESCRIPTION_LEN {
            problems.push(format!(
                "description is longer than {} characters",
                super::MAX_DESCRIPTION_LEN
            ));
        }
        problems
    }
}

/// Parse SKILL.md and extract frontmatter metadata
pub fn parse_skill_md(path: &Path) -> Result<(SkillMetadata, String)> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read SKILL.md at {}", path.display()))?;

    parse_frontmatter(&content).with_context(|| format!("Failed to parse frontmatter in {}", path.display()))
}

/// Parse YAML frontmatter from markdown content, returning it with the body
pub fn parse_frontmatter(content: &str) -> Result<(SkillMetadata, String)> {
    let content = content.trim_start();
    if !content.starts_with("---") {
        eyre::bail!("SKILL.md must start with YAML frontmatter (---)");
    }

    let rest = &content[3..];
    let end_pos = rest
        .find("\n---")
        .ok_or_else(|| eyre::eyre!("No closing frontmatter delimiter (---) found"))?;

    let yaml_content = rest[..end_pos].trim();
    let body = rest[end_pos + 4..].trim_start_matches('-').trim().to_string();

    let metadata: SkillMetadata = serde_yaml::from_str(yaml_content).context("Failed to parse YAML frontmatter")?;

    Ok((metadata, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frontmatter_valid() {
        let content = r#"---
name: tell-jokes
description: Tells a joke on request
license: MIT
allowed-tools: joke-database web-search
metadata:
  domain: entertainment
  acquisition: built_in
---

# Tell Jokes

Tells a joke on request
"#;

        let (metadata, body) = parse_frontmatter(content).unwrap();
        assert_eq!(metadata.name, "tell-jokes");
        assert_eq!(metadata.description, "Tells a joke on request");
        assert_eq!(metadata.license.as_deref(), Some("MIT"));
        assert_eq!(metadata.tools(), vec!["joke-database", "web-search"]);
        assert_eq!(metadata.metadata["domain"], "entertainment");
        assert!(metadata.problems().is_empty());
        assert!(body.starts_with("# Tell Jokes"));
    }

    #[test]
    fn test_parse_frontmatter_minimal() {
        let content = "---\nname: simple\n---\n\n# Simple Skill\n";

        let (metadata, _) = parse_frontmatter(content).unwrap();
        assert_eq!(metadata.name, "simple");
        assert_eq!(metadata.description, "");
        assert!(metadata.tools().is_empty());
        assert_eq!(metadata.problems(), vec!["description is empty"]);
    }

    #[test]
    fn test_invalid_slug_reported() {
        let content = "---\nname: Not A Slug\ndescription: x\n---\n";
        let (metadata, body) = parse_frontmatter(content).unwrap();
        assert_eq!(metadata.problems().len(), 1);
        assert!(body.is_empty());
    }

    #[test]
    fn test_parse_frontmatter_no_delimiter() {
        let content = "# No Frontmatter\n\nJust content";
        assert!(parse_frontmatter(content).is_err());
    }

    #[test]
    fn test_parse_frontmatter_no_closing() {
        let content = "---\nname: broken\n# Missing closing";
        assert!(parse_frontmatter(content).is_err());
    }

    #[test]
    fn test_parse_frontmatter_missing_name() {
        let content = "---\ndescription: No name field\n---\n\nContent\n";
        assert!(parse_frontmatter(content).is_err());
    }

    #[test]
    fn test_parse_skill_md_from_disk() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("SKILL.md");
        std::fs::write(&path, "---\nname: on-disk\ndescription: Loaded\n---\n# On Disk\n").unwrap();
        let (metadata, body) = parse_skill_md(&path).unwrap();
        assert_eq!(metadata.name, "on-disk");
        assert_eq!(body, "# On Disk");
    }
}
