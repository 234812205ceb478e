//! Specification validation
//!
//! Exporters never require a specification to validate cleanly; this is an
//! editor-side report surfaced by `agentstory validate`.

use serde::Serialize;
use std::collections::HashSet;

use super::{AgentSpecification, MAX_NAME_LEN};
use crate::slug::is_valid_slug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One problem found in a specification
#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    /// Dotted location, e.g. `skills[0].acceptance`
    pub field: String,
    pub message: String,
}

impl ValidationIssue {
    fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            field: field.into(),
            message: message.into(),
        }
    }

    fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Validate a specification, returning every issue found
pub fn validate(spec: &AgentSpecification) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    let name = spec.display_name();
    if name.is_empty() {
        issues.push(ValidationIssue::error("name", "Agent name is required"));
    } else if name.chars().count() > MAX_NAME_LEN {
        issues.push(ValidationIssue::error(
            "name",
            format!("Agent name exceeds {} characters", MAX_NAME_LEN),
        ));
    }

    if let Some(identifier) = spec.identifier.as_deref().map(str::trim).filter(|s| !s.is_empty())
        && !is_valid_slug(identifier)
    {
        issues.push(ValidationIssue::error(
            "identifier",
            format!("Identifier '{}' is not a valid slug", identifier),
        ));
    }

    if spec.skills.is_empty() {
        issues.push(ValidationIssue::warning("skills", "Agent has no skills"));
    }

    let mut seen = HashSet::new();
    for (i, skill) in spec.skills.iter().enumerate() {
        let field = format!("skills[{}]", i);

        if skill.name.trim().is_empty() {
            issues.push(ValidationIssue::error(format!("{}.name", field), "Skill name is required"));
        } else if !seen.insert(skill.name.trim().to_lowercase()) {
            issues.push(ValidationIssue::warning(
                format!("{}.name", field),
                format!("Duplicate skill name '{}'", skill.name.trim()),
            ));
        }

        if skill.acceptance.success_conditions.iter().all(|c| c.trim().is_empty()) {
            issues.push(ValidationIssue::error(
                format!("{}.acceptance", field),
                "At least one success condition is required",
            ));
        }

        if let Some(slug) = skill.explicit_slug()
            && !is_valid_slug(slug)
        {
            issues.push(ValidationIssue::error(
                format!("{}.portability.slug", field),
                format!("Slug '{}' is not valid (lowercase letters, digits and single hyphens)", slug),
            ));
        }

        if skill.triggers.is_empty() {
            issues.push(ValidationIssue::warning(
                format!("{}.triggers", field),
                "Skill has no triggers",
            ));
        }
    }

    issues
}

/// Whether the issue list contains any errors
pub fn has_errors(issues: &[ValidationIssue]) -> bool {
    issues.iter().any(|i| i.severity == Severity::Error)
}
