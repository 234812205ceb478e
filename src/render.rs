//! Markdown sections shared by the skill packager and the harness adapters
//!
//! Renderers return lines; callers join them with `\n`. Heading depth is a
//! parameter so the same section can sit at `##` in one artifact and `####`
//! in another.

use indexmap::IndexMap;
use std::collections::BTreeSet;

use crate::escape::md_inline;
use crate::slug::slugify;
use crate::spec::{
    AgentSpecification, AutonomyLevel, Behavior, Enforcement, Guardrail, HumanInteractionPolicy, MemoryConfiguration,
    Permission, Skill, Trigger,
};

/// `#` repeated `depth` times
pub fn heading(depth: usize, title: &str) -> String {
    format!("{} {}", "#".repeat(depth.clamp(1, 6)), md_inline(title))
}

/// Operating-mode guidance for an autonomy level
///
/// Absent or unrecognized levels get the collaborative text.
pub fn autonomy_guidance(level: Option<AutonomyLevel>) -> &'static str {
    match level {
        Some(AutonomyLevel::Full) => {
            "Operate independently. Make decisions and take actions without waiting for approval, \
             and report outcomes when work is complete."
        }
        Some(AutonomyLevel::Supervised) => {
            "Work independently on routine tasks, but pause for human approval before significant, \
             irreversible, or high-impact actions."
        }
        Some(AutonomyLevel::Directed) => {
            "Act only on explicit instructions. Confirm your understanding before starting and do not \
             take initiative beyond what was requested."
        }
        Some(AutonomyLevel::Collaborative) | Some(AutonomyLevel::Unrecognized) | None => {
            "Work alongside the user as a partner. Propose plans, share reasoning, and check in at key \
             decision points before committing to a direction."
        }
    }
}

/// Render a behavior; `depth` is the heading depth used for workflow stages
pub fn render_behavior(behavior: &Behavior, depth: usize) -> Vec<String> {
    let mut lines = Vec::new();

    match behavior {
        Behavior::Sequential { steps } => {
            lines.push("Execute these steps in order:".to_string());
            lines.push(String::new());
            for (i, step) in steps.iter().enumerate() {
                lines.push(format!("{}. {}", i + 1, md_inline(step)));
            }
        }
        Behavior::Workflow { stages } => {
            lines.push("Follow this workflow, moving between stages as their transitions fire:".to_string());
            for (i, stage) in stages.iter().enumerate() {
                lines.push(String::new());
                lines.push(heading(depth, &format!("Stage {}: {}", i + 1, stage.name)));
                if !stage.purpose.trim().is_empty() {
                    lines.push(String::new());
                    lines.push(md_inline(&stage.purpose));
                }
                if !stage.actions.is_empty() {
                    lines.push(String::new());
                    lines.push("**Actions:**".to_string());
                    for action in &stage.actions {
                        lines.push(format!("- {}", md_inline(action)));
                    }
                }
                if !stage.transitions.is_empty() {
                    lines.push(String::new());
                    lines.push("**Transitions:**".to_string());
                    for transition in &stage.transitions {
                        if transition.when.trim().is_empty() {
                            lines.push(format!("- Go to **{}**", md_inline(&transition.to)));
                        } else {
                            lines.push(format!(
                                "- Go to **{}** when {}",
                                md_inline(&transition.to),
                                md_inline(&transition.when)
                            ));
                        }
                    }
                }
            }
        }
        Behavior::Adaptive {
            capabilities,
            selection_strategy,
        } => {
            lines.push("Choose from these capabilities based on the situation:".to_string());
            lines.push(String::new());
            for capability in capabilities {
                lines.push(format!("- {}", md_inline(capability)));
            }
            if let Some(strategy) = selection_strategy.as_deref().filter(|s| !s.trim().is_empty()) {
                lines.push(String::new());
                lines.push(format!("**Selection strategy:** {}", md_inline(strategy)));
            }
        }
        Behavior::Iterative {
            body,
            termination_condition,
            max_iterations,
        } => {
            lines.push("Repeat the following until the termination condition is met:".to_string());
            lines.push(String::new());
            for (i, action) in body.iter().enumerate() {
                lines.push(format!("{}. {}", i + 1, md_inline(action)));
            }
            lines.push(String::new());
            lines.push(format!("**Stop when:** {}", md_inline(termination_condition)));
            if let Some(max) = max_iterations {
                lines.push(format!("**Maximum iterations:** {}", max));
            }
        }
    }

    lines
}

/// Bullet list of triggers with nested conditions and examples
pub fn render_triggers(triggers: &[Trigger]) -> Vec<String> {
    let mut lines = Vec::new();
    for trigger in triggers {
        if trigger.description.trim().is_empty() {
            lines.push(format!("- **{}**", trigger.kind.label()));
        } else {
            lines.push(format!("- **{}**: {}", trigger.kind.label(), md_inline(&trigger.description)));
        }
        for condition in &trigger.conditions {
            lines.push(format!("  - Condition: {}", md_inline(condition)));
        }
        for example in &trigger.examples {
            lines.push(format!("  - Example: \"{}\"", md_inline(example)));
        }
    }
    lines
}

/// One subsection per guardrail
pub fn render_guardrails(guardrails: &[Guardrail], depth: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, guardrail) in guardrails.iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        lines.push(heading(depth, &guardrail.name));
        lines.push(String::new());
        lines.push(md_inline(&guardrail.constraint));
        lines.push(String::new());
        lines.push(format!("- **Enforcement:** {}", guardrail.enforcement.as_str()));
        if let Some(rationale) = guardrail.rationale.as_deref().filter(|s| !s.trim().is_empty()) {
            lines.push(format!("- **Rationale:** {}", md_inline(rationale)));
        }
        if let Some(action) = guardrail.on_violation.as_deref().filter(|s| !s.trim().is_empty()) {
            lines.push(format!("- **On violation:** {}", md_inline(action)));
        }
    }
    lines
}

/// Compact one-line-per-guardrail form for instruction files
pub fn render_guardrail_list(guardrails: &[Guardrail]) -> Vec<String> {
    guardrails
        .iter()
        .map(|g| {
            let marker = match g.enforcement {
                Enforcement::Hard => "MUST",
                Enforcement::Soft => "SHOULD",
            };
            format!("- **{}** ({}): {}", md_inline(&g.name), marker, md_inline(&g.constraint))
        })
        .collect()
}

/// Mode, checkpoints and escalation
pub fn render_human_interaction(policy: &HumanInteractionPolicy) -> Vec<String> {
    let mut lines = vec![format!(
        "**Mode:** `{}`. {}",
        policy.mode.as_str(),
        policy.mode.describe()
    )];

    if !policy.checkpoints.is_empty() {
        lines.push(String::new());
        lines.push("**Checkpoints:**".to_string());
        for checkpoint in &policy.checkpoints {
            let mut line = format!(
                "- **{}** ({}): {}",
                md_inline(&checkpoint.name),
                checkpoint.action.as_str(),
                md_inline(&checkpoint.trigger)
            );
            if let Some(timeout) = checkpoint.timeout.as_deref().filter(|s| !s.trim().is_empty()) {
                line.push_str(&format!(" (timeout: {})", md_inline(timeout)));
            }
            lines.push(line);
        }
    }

    if let Some(escalation) = &policy.escalation {
        lines.push(String::new());
        match escalation.channel.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(channel) => lines.push(format!("**Escalate via {}** when:", md_inline(channel))),
            None => lines.push("**Escalate** when:".to_string()),
        }
        for condition in &escalation.conditions {
            lines.push(format!("- {}", md_inline(condition)));
        }
    }

    lines
}

/// Memory and context hints
pub fn render_memory_hints(memory: &MemoryConfiguration) -> Vec<String> {
    let mut lines = Vec::new();

    if !memory.working.is_empty() {
        lines.push("Keep in working context:".to_string());
        for item in &memory.working {
            lines.push(format!("- {}", md_inline(item)));
        }
    }

    if !memory.persistent.is_empty() {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push("Persistent stores:".to_string());
        for store in &memory.persistent {
            let mut line = format!(
                "- **{}** ({}, {})",
                md_inline(&store.name),
                store.store_type.as_str(),
                store.updates.as_str()
            );
            if let Some(purpose) = store.purpose.as_deref().filter(|s| !s.trim().is_empty()) {
                line.push_str(&format!(": {}", md_inline(purpose)));
            }
            lines.push(line);
        }
    }

    if !memory.learning.is_empty() {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push("Learning:".to_string());
        for learning in &memory.learning {
            lines.push(format!("- {}: {}", learning.kind.label(), md_inline(&learning.signal)));
        }
    }

    lines
}

/// A tool aggregated across every skill of a specification
#[derive(Debug, Clone)]
pub struct ToolSummary {
    /// Name as first declared
    pub name: String,
    pub slug: String,
    pub purpose: String,
    pub permissions: BTreeSet<Permission>,
    /// Names of the skills that declare it
    pub used_by: Vec<String>,
}

/// Deduplicate tools across skills by slugified name, in first-seen order
pub fn collect_tools(spec: &AgentSpecification) -> Vec<ToolSummary> {
    let mut tools: IndexMap<String, ToolSummary> = IndexMap::new();

    for skill in &spec.skills {
        for tool in &skill.tools {
            let slug = slugify(&tool.name);
            if slug.is_empty() {
                continue;
            }
            let entry = tools.entry(slug.clone()).or_insert_with(|| ToolSummary {
                name: tool.name.trim().to_string(),
                slug,
                purpose: tool.purpose.trim().to_string(),
                permissions: BTreeSet::new(),
                used_by: Vec::new(),
            });
            entry.permissions.extend(tool.permissions.iter().copied());
            if entry.purpose.is_empty() {
                entry.purpose = tool.purpose.trim().to_string();
            }
            if !entry.used_by.contains(&skill.name) {
                entry.used_by.push(skill.name.clone());
            }
        }
    }

    tools.into_values().collect()
}

/// Slugified tool names of one skill, deduplicated in declaration order
pub fn skill_tool_slugs(skill: &Skill) -> Vec<String> {
    let mut slugs: Vec<String> = Vec::new();
    for tool in &skill.tools {
        let slug = slugify(&tool.name);
        if !slug.is_empty() && !slugs.contains(&slug) {
            slugs.push(slug);
        }
    }
    slugs
}

/// Comma-separated permission list
pub fn permission_list(permissions: impl IntoIterator<Item = Permission>) -> String {
    let names: Vec<&str> = permissions.into_iter().map(|p| p.as_str()).collect();
    if names.is_empty() { "-".to_string() } else { names.join(", ") }
}
