//! Pieces shared by every adapter
//!
//! - the compatibility baseline (name, skills, trigger types)
//! - the instruction document composed in a fixed section order
//! - stable per-skill slugs

use std::collections::HashSet;

use super::Compatibility;
use crate::escape::md_inline;
use crate::render::{
    ToolSummary, autonomy_guidance, collect_tools, heading, permission_list, render_behavior, render_guardrail_list,
    render_human_interaction, render_memory_hints, render_triggers,
};
use crate::skill::{PackOptions, resolve_slug};
use crate::slug::{slugify, to_snake};
use crate::spec::{AgentSpecification, Guardrail, TriggerType};

/// Checks every adapter starts from
pub fn baseline_compatibility(spec: &AgentSpecification) -> Compatibility {
    let mut compat = Compatibility::new();

    if spec.display_name().is_empty() {
        compat.missing("agent name");
    }
    if spec.skills.is_empty() {
        compat.warn("The agent has no skills; the export will only describe its identity");
    }
    if spec.has_trigger(TriggerType::Schedule) {
        compat.unsupported(
            "scheduled triggers",
            "Scheduled triggers need external orchestration (cron or a job scheduler) to start the agent",
        );
    }
    if spec.has_trigger(TriggerType::Cascade) {
        compat.warn("Cascade triggers are not chained automatically; downstream skills must be invoked explicitly");
    }

    compat
}

/// One slug per skill, in skill order, unique within the specification
///
/// Uses the configured slug when valid, otherwise one derived from the name.
pub fn skill_slugs(spec: &AgentSpecification) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    spec.skills
        .iter()
        .enumerate()
        .map(|(i, skill)| {
            let base = resolve_slug(skill, &PackOptions::default())
                .map(|(slug, _)| slug)
                .unwrap_or_else(|_| slugify(&skill.name));
            let base = if base.is_empty() { format!("skill-{}", i + 1) } else { base };

            let mut slug = base.clone();
            let mut n = 2;
            while used.contains(&slug) {
                slug = format!("{}-{}", base, n);
                n += 1;
            }
            used.insert(slug.clone());
            slug
        })
        .collect()
}

/// Python identifier for a free-form name, or `fallback` if nothing usable remains
pub fn python_identifier(name: &str, fallback: &str) -> String {
    let slug = slugify(name);
    if slug.is_empty() { fallback.to_string() } else { to_snake(&slug) }
}

/// Python annotation for a declared data type; unknown types are `str`
pub fn python_type(data_type: &str) -> &'static str {
    match data_type.trim().to_lowercase().as_str() {
        "number" | "float" | "double" | "decimal" => "float",
        "integer" | "int" => "int",
        "boolean" | "bool" => "bool",
        "array" | "list" => "list",
        "object" | "map" | "dict" | "json" => "dict",
        _ => "str",
    }
}

/// Agent guardrails followed by skill guardrails, deduplicated by name
pub fn all_guardrails(spec: &AgentSpecification) -> Vec<&Guardrail> {
    let mut seen: HashSet<String> = HashSet::new();
    spec.guardrails
        .iter()
        .chain(spec.skills.iter().flat_map(|s| s.guardrails.iter()))
        .filter(|g| seen.insert(g.name.trim().to_lowercase()))
        .collect()
}

/// How an adapter wants the shared instruction document rendered
#[derive(Debug, Clone, Copy, Default)]
pub struct InstructionStyle {
    /// Describe tools in prose instead of a table
    pub tools_as_prose: bool,
    /// Note that checkpoints cannot actually pause the agent
    pub advisory_checkpoints: bool,
    /// Extra line per skill, given the skill slug
    pub skill_hint: Option<fn(&str) -> String>,
}

/// Instruction document in fixed order: identity, operating mode, human
/// interaction, skills, tools, guardrails, memory
pub fn compose_instructions(spec: &AgentSpecification, style: &InstructionStyle) -> String {
    let name = if spec.display_name().is_empty() { "Agent" } else { spec.display_name() };
    let mut lines = vec![heading(1, name), String::new()];

    match spec.purpose.as_deref().filter(|p| !p.trim().is_empty()) {
        Some(purpose) => lines.push(format!("You are {}. {}", md_inline(name), purpose.trim())),
        None => lines.push(format!("You are {}.", md_inline(name))),
    }
    if let Some(role) = spec.role.as_deref().filter(|r| !r.trim().is_empty()) {
        lines.extend([String::new(), format!("**Role:** {}", md_inline(role))]);
    }
    if let Some(collab) = &spec.collaboration {
        let mut line = format!("**Collaboration:** {}", collab.role.as_str());
        if let Some(lead) = collab.reports_to.as_deref().filter(|s| !s.trim().is_empty()) {
            line.push_str(&format!(", reports to {}", md_inline(lead)));
        }
        if !collab.coordinates.is_empty() {
            let agents: Vec<String> = collab
                .coordinates
                .iter()
                .map(|a| {
                    if a.role.trim().is_empty() {
                        md_inline(&a.agent)
                    } else {
                        format!("{} ({})", md_inline(&a.agent), md_inline(&a.role))
                    }
                })
                .collect();
            line.push_str(&format!(", coordinates {}", agents.join(", ")));
        }
        if !collab.peers.is_empty() {
            line.push_str(&format!(", works with {}", collab.peers.join(", ")));
        }
        lines.extend([String::new(), line]);
    }

    lines.extend([
        String::new(),
        heading(2, "Operating Mode"),
        String::new(),
        autonomy_guidance(spec.autonomy_level).to_string(),
    ]);

    if let Some(policy) = &spec.human_interaction {
        lines.extend([String::new(), heading(2, "Human Interaction"), String::new()]);
        lines.extend(render_human_interaction(policy));
        if style.advisory_checkpoints && !policy.checkpoints.is_empty() {
            lines.extend([
                String::new(),
                "These checkpoints are not enforced by the runtime. Stop and ask the user before continuing past one."
                    .to_string(),
            ]);
        }
    }

    if !spec.skills.is_empty() {
        lines.extend([String::new(), heading(2, "Skills")]);
        for (skill, slug) in spec.skills.iter().zip(skill_slugs(spec)) {
            lines.extend([String::new(), heading(3, &skill.name), String::new()]);
            if !skill.description.trim().is_empty() {
                lines.extend([md_inline(&skill.description), String::new()]);
            }
            if let Some(hint) = style.skill_hint {
                lines.extend([hint(&slug), String::new()]);
            }
            if !skill.triggers.is_empty() {
                lines.extend(["**When to use:**".to_string(), String::new()]);
                lines.extend(render_triggers(&skill.triggers));
                lines.push(String::new());
            }
            if let Some(behavior) = &skill.behavior {
                lines.extend(["**How:**".to_string(), String::new()]);
                lines.extend(render_behavior(behavior, 4));
                lines.push(String::new());
            }
            if !skill.acceptance.success_conditions.is_empty() {
                lines.extend(["**Done when:**".to_string(), String::new()]);
                for condition in &skill.acceptance.success_conditions {
                    lines.push(format!("- {}", md_inline(condition)));
                }
                lines.push(String::new());
            }
            while lines.last().is_some_and(|l| l.is_empty()) {
                lines.pop();
            }
        }
    }

    let tools = collect_tools(spec);
    if !tools.is_empty() {
        lines.extend([String::new(), heading(2, "Tools"), String::new()]);
        if style.tools_as_prose {
            lines.extend(tools.iter().map(tool_prose));
        } else {
            lines.push("| Tool | Purpose | Permissions | Used by |".to_string());
            lines.push("|------|---------|-------------|---------|".to_string());
            for tool in &tools {
                lines.push(format!(
                    "| {} | {} | {} | {} |",
                    crate::escape::md_cell(&tool.name),
                    crate::escape::md_cell(&tool.purpose),
                    permission_list(tool.permissions.iter().copied()),
                    crate::escape::md_cell(&tool.used_by.join(", "))
                ));
            }
        }
    }

    let guardrails: Vec<_> = all_guardrails(spec).into_iter().cloned().collect();
    if !guardrails.is_empty() {
        lines.extend([String::new(), heading(2, "Guardrails"), String::new()]);
        lines.extend(render_guardrail_list(&guardrails));
    }

    if let Some(memory) = spec.memory.as_ref().filter(|m| !m.is_empty()) {
        lines.extend([String::new(), heading(2, "Memory & Context"), String::new()]);
        lines.extend(render_memory_hints(memory));
    }

    lines.join("\n") + "\n"
}

fn tool_prose(tool: &ToolSummary) -> String {
    let mut line = format!("- **{}**", md_inline(&tool.name));
    if !tool.purpose.is_empty() {
        line.push_str(&format!(": {}", md_inline(&tool.purpose)));
    }
    if !tool.permissions.is_empty() {
        line.push_str(&format!(
            " Needs {} access.",
            permission_list(tool.permissions.iter().copied())
        ));
    }
    line.push_str(&format!(" Used by {}.", tool.used_by.join(", ")));
    line
}
