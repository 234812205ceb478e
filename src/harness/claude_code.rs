//! Claude Code adapter
//!
//! Generates `CLAUDE.md`, one slash command per skill under
//! `.claude/commands/`, and a best-effort `.mcp.json` for declared tools.

use serde_json::json;
use std::collections::BTreeSet;

use super::common::{InstructionStyle, baseline_compatibility, compose_instructions, skill_slugs};
use super::{Compatibility, HarnessAdapter, HarnessOutput, LaunchRecipe, TryItConfig};
use crate::escape::{Frontmatter, md_inline};
use crate::export::ExportedFile;
use crate::render::{collect_tools, heading, render_behavior, render_guardrail_list, skill_tool_slugs};
use crate::spec::{AgentSpecification, Permission, Skill};

pub struct ClaudeCodeAdapter;

impl HarnessAdapter for ClaudeCodeAdapter {
    fn id(&self) -> &'static str {
        "claude-code"
    }

    fn name(&self) -> &'static str {
        "Claude Code"
    }

    fn description(&self) -> &'static str {
        "CLAUDE.md project instructions with one slash command per skill"
    }

    fn icon(&self) -> Option<&'static str> {
        Some("terminal")
    }

    fn url(&self) -> Option<&'static str> {
        Some("https://docs.anthropic.com/en/docs/claude-code")
    }

    fn can_export(&self, spec: &AgentSpecification) -> Compatibility {
        let mut compat = baseline_compatibility(spec);

        let stores = spec.persistent_stores();
        if !stores.is_empty() {
            compat.unsupported(
                "persistent memory",
                format!(
                    "Claude Code has no persistent memory stores; {} store(s) are described in CLAUDE.md only",
                    stores.len()
                ),
            );
        }
        if spec.memory.as_ref().is_some_and(|m| !m.learning.is_empty()) {
            compat.unsupported(
                "learning loops",
                "Learning loops are not supported; feedback must be folded into CLAUDE.md by hand",
            );
        }

        compat
    }

    fn generate(&self, spec: &AgentSpecification) -> HarnessOutput {
        let style = InstructionStyle {
            skill_hint: Some(|slug| format!("Run with `/{}`.", slug)),
            ..Default::default()
        };
        let mut files = vec![ExportedFile::text("CLAUDE.md", compose_instructions(spec, &style))];
        let mut warnings = Vec::new();

        let slugs = skill_slugs(spec);
        for (skill, slug) in spec.skills.iter().zip(&slugs) {
            files.push(ExportedFile::text(
                format!(".claude/commands/{}.md", slug),
                slash_command(spec, skill),
            ));
        }

        if spec.has_tools() {
            files.push(ExportedFile::text(".mcp.json", mcp_config(spec)));
            warnings.push(
                ".mcp.json maps tools to placeholder MCP servers; verify each server command before use".to_string(),
            );
        }

        let mut instructions = vec![
            "Copy the exported files into the root of your project.".to_string(),
            "Run `claude` in that directory; CLAUDE.md is loaded automatically.".to_string(),
        ];
        if let Some(first) = slugs.first() {
            instructions.push(format!("Invoke skills as slash commands, e.g. `/{}`.", first));
        }

        HarnessOutput {
            files,
            warnings,
            instructions: instructions.join("\n"),
        }
    }

    fn try_it_config(&self, _spec: &AgentSpecification) -> Option<TryItConfig> {
        Some(TryItConfig {
            launch: LaunchRecipe::Command {
                command: "claude".to_string(),
            },
            setup_instructions: vec![
                "Install Claude Code: npm install -g @anthropic-ai/claude-code".to_string(),
                "Copy the exported files into your project root".to_string(),
                "Run `claude` from that directory".to_string(),
            ],
        })
    }
}

/// Built-in Claude Code tools implied by a permission
fn builtin_tools(permission: Permission) -> &'static [&'static str] {
    match permission {
        Permission::Read => &["Read", "Grep", "Glob"],
        Permission::Write => &["Edit", "Write"],
        Permission::Execute | Permission::Admin => &["Bash"],
    }
}

fn allowed_tools(skill: &Skill) -> Vec<String> {
    let builtins: BTreeSet<&str> = skill
        .tools
        .iter()
        .flat_map(|t| t.permissions.iter().copied())
        .flat_map(builtin_tools)
        .copied()
        .collect();

    builtins
        .into_iter()
        .map(str::to_string)
        .chain(skill_tool_slugs(skill).into_iter().map(|slug| format!("mcp__{}", slug)))
        .collect()
}

fn argument_hint(skill: &Skill) -> Option<String> {
    if skill.inputs.is_empty() {
        return None;
    }
    let hint: Vec<String> = skill
        .inputs
        .iter()
        .map(|input| {
            let name = md_inline(&input.name).replace(' ', "-");
            if input.required { format!("<{}>", name) } else { format!("[{}]", name) }
        })
        .collect();
    Some(hint.join(" "))
}

fn slash_command(spec: &AgentSpecification, skill: &Skill) -> String {
    let description = md_inline(&skill.description);
    let description = if description.is_empty() { md_inline(&skill.name) } else { description };

    let tools = allowed_tools(skill);
    let tools = (!tools.is_empty()).then(|| tools.join(", "));
    let hint = argument_hint(skill);
    let frontmatter = Frontmatter::new()
        .field("description", &description)
        .optional("allowed-tools", tools.as_deref())
        .optional("argument-hint", hint.as_deref());

    let mut lines = vec![heading(1, &skill.name), String::new()];
    if !skill.description.trim().is_empty() {
        lines.extend([md_inline(&skill.description), String::new()]);
    }
    lines.push("Request: $ARGUMENTS".to_string());

    if let Some(behavior) = &skill.behavior {
        lines.extend([String::new(), heading(2, "Steps"), String::new()]);
        lines.extend(render_behavior(behavior, 3));
    }

    if !skill.acceptance.success_conditions.is_empty() {
        lines.extend([String::new(), heading(2, "Done When"), String::new()]);
        for condition in &skill.acceptance.success_conditions {
            lines.push(format!("- {}", md_inline(condition)));
        }
    }

    if let Some(failure) = &skill.failure_handling {
        let mut items: Vec<String> = failure
            .modes
            .iter()
            .map(|m| format!("- **{}**: {}", md_inline(&m.condition), md_inline(&m.recovery)))
            .collect();
        if let Some(fallback) = failure.default_fallback.as_deref().filter(|s| !s.trim().is_empty()) {
            items.push(format!("- Otherwise: {}", md_inline(fallback)));
        }
        if !items.is_empty() {
            lines.extend([String::new(), heading(2, "If Something Goes Wrong"), String::new()]);
            lines.extend(items);
        }
    }

    let guardrails: Vec<_> = spec.guardrails.iter().chain(&skill.guardrails).cloned().collect();
    if !guardrails.is_empty() {
        lines.extend([String::new(), heading(2, "Guardrails"), String::new()]);
        lines.extend(render_guardrail_list(&guardrails));
    }

    format!("{}\n{}\n", frontmatter.render(), lines.join("\n"))
}

/// Placeholder MCP servers keyed by tool slug
fn mcp_config(spec: &AgentSpecification) -> String {
    let servers: serde_json::Map<String, serde_json::Value> = collect_tools(spec)
        .into_iter()
        .map(|tool| {
            let server = json!({
                "command": "npx",
                "args": ["-y", format!("{}-mcp-server", tool.slug)],
                "env": {},
            });
            (tool.slug, server)
        })
        .collect();

    let config = json!({ "mcpServers": servers });
    serde_json::to_string_pretty(&config).unwrap_or_default() + "\n"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{
        Acceptance, Behavior, LearningConfig, LearningType, MemoryConfiguration, PersistentStore, SkillInput,
        StoreType, Tool, UpdateMode,
    };

    fn spec() -> AgentSpecification {
        AgentSpecification {
            name: "Repo Helper".to_string(),
            skills: vec![Skill {
                name: "Review PR".to_string(),
                description: "Review a pull request: style & bugs".to_string(),
                inputs: vec![
                    SkillInput {
                        name: "pr number".to_string(),
                        data_type: "integer".to_string(),
                        description: String::new(),
                        required: true,
                    },
                    SkillInput {
                        name: "focus".to_string(),
                        data_type: "string".to_string(),
                        description: String::new(),
                        required: false,
                    },
                ],
                tools: vec![Tool {
                    name: "GitHub".to_string(),
                    purpose: "Fetch diffs".to_string(),
                    permissions: vec![Permission::Read, Permission::Execute],
                    required: true,
                    implementation: None,
                }],
                behavior: Some(Behavior::Sequential {
                    steps: vec!["Fetch the diff".to_string(), "Comment".to_string()],
                }),
                acceptance: Acceptance {
                    success_conditions: vec!["Review posted".to_string()],
                    ..Default::default()
                },
                ..Default::default()
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_generate_files() {
        let output = ClaudeCodeAdapter.generate(&spec());
        let paths: Vec<_> = output.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["CLAUDE.md", ".claude/commands/review-pr.md", ".mcp.json"]);
        assert!(output.warnings.iter().any(|w| w.contains("verify")));
        assert!(output.instructions.contains("/review-pr"));
        assert!(output.get("CLAUDE.md").unwrap().content.contains("Run with `/review-pr`."));
    }

    #[test]
    fn test_slash_command_frontmatter() {
        let output = ClaudeCodeAdapter.generate(&spec());
        let command = &output.get(".claude/commands/review-pr.md").unwrap().content;
        assert!(command.contains("description: \"Review a pull request: style & bugs\""));
        assert!(command.contains("allowed-tools: Bash, Glob, Grep, Read, mcp__github"));
        assert!(command.contains("argument-hint: \"<pr-number> [focus]\""));
        assert!(command.contains("Request: $ARGUMENTS"));
        assert!(command.contains("1. Fetch the diff\n2. Comment"));
    }

    #[test]
    fn test_mcp_json() {
        let output = ClaudeCodeAdapter.generate(&spec());
        let mcp: serde_json::Value = serde_json::from_str(&output.get(".mcp.json").unwrap().content).unwrap();
        assert_eq!(mcp["mcpServers"]["github"]["command"], "npx");
        assert_eq!(mcp["mcpServers"]["github"]["args"][1], "github-mcp-server");
    }

    #[test]
    fn test_no_mcp_without_tools() {
        let mut spec = spec();
        spec.skills[0].tools.clear();
        let output = ClaudeCodeAdapter.generate(&spec);
        assert!(output.get(".mcp.json").is_none());
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn test_memory_unsupported() {
        let mut spec = spec();
        spec.memory = Some(MemoryConfiguration {
            persistent: vec![PersistentStore {
                name: "notes".to_string(),
                store_type: StoreType::KeyValue,
                purpose: None,
                updates: UpdateMode::Append,
            }],
            learning: vec![LearningConfig {
                kind: LearningType::FeedbackLoop,
                signal: "thumbs".to_string(),
            }],
            ..Default::default()
        });
        let compat = ClaudeCodeAdapter.can_export(&spec);
        assert!(compat.is_compatible());
        assert_eq!(compat.unsupported_features(), ["persistent memory", "learning loops"]);
    }

    #[test]
    fn test_command_frontmatter_parses() {
        let output = ClaudeCodeAdapter.generate(&spec());
        let content = &output.get(".claude/commands/review-pr.md").unwrap().content;
        let yaml = content.trim_start_matches("---\n").split("\n---").next().unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(value["argument-hint"].as_str(), Some("<pr-number> [focus]"));
        assert_eq!(value["description"].as_str(), Some("Review a pull request: style & bugs"));
    }

    #[test]
    fn test_try_it() {
        let config = ClaudeCodeAdapter.try_it_config(&spec()).unwrap();
        assert_eq!(
            config.launch,
            LaunchRecipe::Command {
                command: "claude".to_string()
            }
        );
    }
}
