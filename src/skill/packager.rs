//! Skill packager
//!
//! Converts one [`Skill`] into a portable `SKILL.md` (YAML frontmatter plus a
//! Markdown body with a fixed heading order) and collects the auxiliary
//! scripts and references declared on the skill. Pure: no I/O.

use crate::error::PackError;
use crate::escape::{Frontmatter, md_cell, md_inline};
use crate::export::ExportedFile;
use crate::render::{heading, permission_list, render_behavior, render_guardrails, render_triggers, skill_tool_slugs};
use crate::slug::{is_valid_slug, safe_filename, slugify};
use crate::spec::{FileBlob, Skill};

/// Maximum length of the frontmatter description
pub const MAX_DESCRIPTION_LEN: usize = 1024;

/// Options for [`pack_skill`]
#[derive(Debug, Clone, Copy)]
pub struct PackOptions {
    /// Derive a slug from the skill name when none is configured
    pub generate_missing_slug: bool,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            generate_missing_slug: true,
        }
    }
}

/// Result of packaging one skill
#[derive(Debug, Clone)]
pub struct PackedSkill {
    pub slug: String,
    /// The `SKILL.md` document
    pub artifact: String,
    /// `scripts/<filename>` files, relative to the skill directory
    pub scripts: Vec<ExportedFile>,
    /// `references/<filename>` files, relative to the skill directory
    pub references: Vec<ExportedFile>,
    pub warnings: Vec<String>,
}

impl PackedSkill {
    /// `SKILL.md` followed by scripts and references, relative to the skill directory
    pub fn files(&self) -> Vec<ExportedFile> {
        let mut files = Vec::with_capacity(1 + self.scripts.len() + self.references.len());
        files.push(ExportedFile::text("SKILL.md", self.artifact.clone()));
        files.extend(self.scripts.iter().cloned());
        files.extend(self.references.iter().cloned());
        files
    }
}

/// Resolve the slug for a skill, returning a warning when it had to be derived
pub fn resolve_slug(skill: &Skill, options: &PackOptions) -> Result<(String, Option<String>), PackError> {
    if let Some(slug) = skill.explicit_slug() {
        if !is_valid_slug(slug) {
            return Err(PackError::InvalidSlug {
                skill: skill.name.clone(),
                slug: slug.to_string(),
            });
        }
        return Ok((slug.to_string(), None));
    }

    if !options.generate_missing_slug {
        return Err(PackError::MissingSlug {
            skill: skill.name.clone(),
        });
    }

    let derived = slugify(&skill.name);
    if derived.is_empty() {
        return Err(PackError::MissingSlug {
            skill: skill.name.clone(),
        });
    }

    let warning = format!(
        "skill '{}': no slug configured, generated '{}' from the skill name",
        skill.name, derived
    );
    Ok((derived, Some(warning)))
}

/// Package a skill into a portable `SKILL.md` plus auxiliary files
pub fn pack_skill(skill: &Skill, options: &PackOptions) -> Result<PackedSkill, PackError> {
    let (slug, slug_warning) = resolve_slug(skill, options)?;
    let mut warnings: Vec<String> = slug_warning.into_iter().collect();

    let description = frontmatter_description(skill, &mut warnings);
    let allowed_tools = skill_tool_slugs(skill).join(" ");
    let portability = skill.portability.clone().unwrap_or_default();

    let mut frontmatter = Frontmatter::new()
        .field("name", &slug)
        .field("description", &description)
        .optional("license", portability.license.as_deref())
        .optional("compatibility", portability.compatibility.as_deref());
    if !allowed_tools.is_empty() {
        frontmatter = frontmatter.field("allowed-tools", &allowed_tools);
    }
    let frontmatter = frontmatter.map(
        "metadata",
        &[
            ("domain", skill.domain.as_deref()),
            ("acquisition", Some(skill.acquisition_mode.as_str())),
            ("source-id", skill.id.as_deref()),
        ],
    );

    let artifact = format!("{}\n{}\n", frontmatter.render(), render_body(skill).join("\n"));

    let scripts = collect_blobs(&skill.name, "scripts", &portability.scripts, &mut warnings);
    let references = collect_blobs(&skill.name, "references", &portability.references, &mut warnings);

    log::debug!(
        "Packed skill '{}' as '{}' ({} scripts, {} references)",
        skill.name,
        slug,
        scripts.len(),
        references.len()
    );

    Ok(PackedSkill {
        slug,
        artifact,
        scripts,
        references,
        warnings,
    })
}

fn frontmatter_description(skill: &Skill, warnings: &mut Vec<String>) -> String {
    let mut description = md_inline(&skill.description);
    if description.is_empty() {
        warnings.push(format!(
            "skill '{}': description is empty, using the skill name",
            skill.name
        ));
        description = md_inline(&skill.name);
    }

    if description.chars().count() > MAX_DESCRIPTION_LEN {
        warnings.push(format!(
            "skill '{}': description truncated to {} characters",
            skill.name, MAX_DESCRIPTION_LEN
        ));
        description = description.chars().take(MAX_DESCRIPTION_LEN - 3).collect::<String>() + "...";
    }

    description
}

fn collect_blobs(skill_name: &str, dir: &str, blobs: &[FileBlob], warnings: &mut Vec<String>) -> Vec<ExportedFile> {
    let mut files: Vec<ExportedFile> = Vec::new();

    for blob in blobs {
        if blob.content.trim().is_empty() {
            warnings.push(format!(
                "skill '{}': skipped empty {} file '{}'",
                skill_name, dir, blob.filename
            ));
            continue;
        }
        let filename = safe_filename(&blob.filename);
        if filename.is_empty() {
            warnings.push(format!(
                "skill '{}': skipped {} file with unusable name '{}'",
                skill_name, dir, blob.filename
            ));
            continue;
        }
        let path = format!("{}/{}", dir, filename);
        if files.iter().any(|f| f.path == path) {
            warnings.push(format!("skill '{}': duplicate {} file '{}' skipped", skill_name, dir, filename));
            continue;
        }
        files.push(ExportedFile::encoded(path, blob.content.clone(), blob.binary));
    }

    files
}

/// Markdown body in fixed section order; empty sections are left out
fn render_body(skill: &Skill) -> Vec<String> {
    let mut lines = vec![heading(1, &skill.name)];
    if !skill.description.trim().is_empty() {
        lines.push(String::new());
        lines.push(skill.description.trim().to_string());
    }

    if !skill.triggers.is_empty() {
        section(&mut lines, "Triggers");
        lines.extend(render_triggers(&skill.triggers));
    }

    if !skill.inputs.is_empty() {
        section(&mut lines, "Inputs");
        lines.push("| Name | Type | Required | Description |".to_string());
        lines.push("|------|------|----------|-------------|".to_string());
        for input in &skill.inputs {
            lines.push(format!(
                "| {} | {} | {} | {} |",
                md_cell(&input.name),
                md_cell(&input.data_type),
                if input.required { "yes" } else { "no" },
                md_cell(&input.description)
            ));
        }
    }

    if !skill.outputs.is_empty() {
        section(&mut lines, "Outputs");
        lines.push("| Name | Type | Description |".to_string());
        lines.push("|------|------|-------------|".to_string());
        for output in &skill.outputs {
            lines.push(format!(
                "| {} | {} | {} |",
                md_cell(&output.name),
                md_cell(&output.data_type),
                md_cell(&output.description)
            ));
        }
    }

    if let Some(behavior) = &skill.behavior {
        section(&mut lines, "Behavior");
        lines.extend(render_behavior(behavior, 3));
    }

    if !skill.tools.is_empty() {
        section(&mut lines, "Tools");
        lines.push("| Tool | Purpose | Permissions | Required |".to_string());
        lines.push("|------|---------|-------------|----------|".to_string());
        for tool in &skill.tools {
            lines.push(format!(
                "| {} | {} | {} | {} |",
                md_cell(&tool.name),
                md_cell(&tool.purpose),
                permission_list(tool.permissions.iter().copied()),
                if tool.required { "yes" } else { "no" }
            ));
        }
    }

    if let Some(reasoning) = &skill.reasoning {
        section(&mut lines, "Reasoning");
        lines.push(format!("**Strategy:** {}", reasoning.strategy.label()));
        if !reasoning.decision_points.is_empty() {
            lines.push(String::new());
            lines.push(heading(3, "Decision Points"));
            lines.push(String::new());
            for point in &reasoning.decision_points {
                lines.push(format!("- **{}**: {}", md_inline(&point.name), md_inline(&point.approach)));
            }
        }
        if let Some(retry) = &reasoning.retry {
            lines.push(String::new());
            lines.push(heading(3, "Retry Policy"));
            lines.push(String::new());
            lines.push(format!("- Max attempts: {}", retry.max_attempts));
            if let Some(backoff) = retry.backoff.as_deref().filter(|s| !s.trim().is_empty()) {
                lines.push(format!("- Backoff: {}", md_inline(backoff)));
            }
            if !retry.retry_on.is_empty() {
                lines.push(format!("- Retry on: {}", retry.retry_on.join(", ")));
            }
        }
    }

    section(&mut lines, "Success Criteria");
    if skill.acceptance.success_conditions.is_empty() {
        lines.push("_No success conditions defined._".to_string());
    }
    for condition in &skill.acceptance.success_conditions {
        lines.push(format!("- {}", md_inline(condition)));
    }
    if !skill.acceptance.quality_metrics.is_empty() {
        lines.push(String::new());
        lines.push(heading(3, "Quality Metrics"));
        lines.push(String::new());
        lines.push("| Metric | Target |".to_string());
        lines.push("|--------|--------|".to_string());
        for metric in &skill.acceptance.quality_metrics {
            lines.push(format!("| {} | {} |", md_cell(&metric.name), md_cell(&metric.target)));
        }
    }
    if let Some(timeout) = skill.acceptance.timeout.as_deref().filter(|s| !s.trim().is_empty()) {
        lines.push(String::new());
        lines.push(format!("**Timeout:** {}", md_inline(timeout)));
    }

    if let Some(failure) = &skill.failure_handling {
        section(&mut lines, "Error Handling");
        for mode in &failure.modes {
            lines.push(format!("- **{}**: {}", md_inline(&mode.condition), md_inline(&mode.recovery)));
        }
        if let Some(fallback) = failure.default_fallback.as_deref().filter(|s| !s.trim().is_empty()) {
            if !failure.modes.is_empty() {
                lines.push(String::new());
            }
            lines.push(format!("**Default fallback:** {}", md_inline(fallback)));
        }
        if failure.notify_on_failure {
            lines.push(String::new());
            lines.push("Notify a human when this skill fails.".to_string());
        }
    }

    if !skill.guardrails.is_empty() {
        section(&mut lines, "Guardrails");
        lines.extend(render_guardrails(&skill.guardrails, 3));
    }

    lines
}

fn section(lines: &mut Vec<String>, title: &str) {
    lines.push(String::new());
    lines.push(heading(2, title));
    lines.push(String::new());
}
