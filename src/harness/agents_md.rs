//! AGENTS.md adapter
//!
//! A single instruction file. Tools and checkpoints survive only as prose.

use super::common::{InstructionStyle, baseline_compatibility, compose_instructions};
use super::{Compatibility, HarnessAdapter, HarnessOutput};
use crate::export::ExportedFile;
use crate::spec::AgentSpecification;

pub struct AgentsMdAdapter;

impl HarnessAdapter for AgentsMdAdapter {
    fn id(&self) -> &'static str {
        "agents-md"
    }

    fn name(&self) -> &'static str {
        "AGENTS.md"
    }

    fn description(&self) -> &'static str {
        "A single AGENTS.md file for coding agents that read repository instructions"
    }

    fn icon(&self) -> Option<&'static str> {
        Some("file-text")
    }

    fn url(&self) -> Option<&'static str> {
        Some("https://agents.md")
    }

    fn can_export(&self, spec: &AgentSpecification) -> Compatibility {
        let mut compat = baseline_compatibility(spec);

        if spec.has_tools() {
            compat.unsupported(
                "tool declarations",
                "Tools cannot be declared in AGENTS.md; they are described in prose and must be provided by the host",
            );
        }
        if spec.human_interaction.as_ref().is_some_and(|p| !p.checkpoints.is_empty()) {
            compat.unsupported(
                "human checkpoints",
                "Checkpoints are advisory only; nothing pauses the agent for approval",
            );
        }

        compat
    }

    fn generate(&self, spec: &AgentSpecification) -> HarnessOutput {
        let style = InstructionStyle {
            tools_as_prose: true,
            advisory_checkpoints: true,
            skill_hint: None,
        };

        HarnessOutput {
            files: vec![ExportedFile::text("AGENTS.md", compose_instructions(spec, &style))],
            warnings: Vec::new(),
            instructions: "Place AGENTS.md at the root of the repository the agent works in.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{Checkpoint, CheckpointAction, HumanInteractionPolicy, Permission, Skill, Tool};

    fn spec() -> AgentSpecification {
        AgentSpecification {
            name: "Docs Writer".to_string(),
            purpose: Some("Keep the docs current.".to_string()),
            skills: vec![Skill {
                name: "Update Docs".to_string(),
                description: "Rewrites stale pages".to_string(),
                tools: vec![Tool {
                    name: "Filesystem".to_string(),
                    purpose: "Edit markdown files".to_string(),
                    permissions: vec![Permission::Write],
                    required: true,
                    implementation: None,
                }],
                ..Default::default()
            }],
            human_interaction: Some(HumanInteractionPolicy {
                checkpoints: vec![Checkpoint {
                    name: "Publish".to_string(),
                    trigger: "Before merging".to_string(),
                    action: CheckpointAction::Approve,
                    timeout: None,
                }],
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_single_file() {
        let output = AgentsMdAdapter.generate(&spec());
        assert_eq!(output.files.len(), 1);

        let content = &output.get("AGENTS.md").unwrap().content;
        assert!(content.starts_with("# Docs Writer\n\nYou are Docs Writer. Keep the docs current."));
        assert!(content.contains("- **Filesystem**: Edit markdown files"));
        assert!(!content.contains("| Tool |"));
        assert!(content.contains("These checkpoints are not enforced by the runtime."));
    }

    #[test]
    fn test_compatibility() {
        let compat = AgentsMdAdapter.can_export(&spec());
        assert!(compat.is_compatible());
        assert_eq!(compat.unsupported_features(), ["tool declarations", "human checkpoints"]);

        let mut plain = spec();
        plain.skills[0].tools.clear();
        plain.human_interaction = None;
        assert!(AgentsMdAdapter.can_export(&plain).unsupported_features().is_empty());
    }

    #[test]
    fn test_no_try_it() {
        assert!(AgentsMdAdapter.try_it_config(&spec()).is_none());
    }
}
