//! End-to-end export tests against the library API
//!
//! - filesystem export of a whole specification
//! - archive packing and reading back
//! - harness exports for specifications with awkward triggers

use agentstory::export::archive::{build_archive, read_archive, write_to_directory};
use agentstory::export::filesystem::{ExportOptions, export_specification};
use agentstory::harness::AdapterRegistry;
use agentstory::spec::{
    Acceptance, AgentSpecification, Behavior, Portability, Skill, Trigger, TriggerType,
};

fn trigger(kind: TriggerType, description: &str) -> Trigger {
    Trigger {
        kind,
        description: description.to_string(),
        conditions: vec![],
        examples: vec![],
    }
}

fn joke_agent() -> AgentSpecification {
    AgentSpecification {
        name: "Joke Agent".to_string(),
        skills: vec![Skill {
            name: "Tell Jokes".to_string(),
            description: "Tells jokes".to_string(),
            triggers: vec![trigger(TriggerType::Manual, "User asks for a joke")],
            behavior: Some(Behavior::Sequential {
                steps: vec![
                    "Pick a topic".to_string(),
                    "Generate a joke".to_string(),
                    "Deliver it".to_string(),
                ],
            }),
            acceptance: Acceptance {
                success_conditions: vec!["User is amused".to_string()],
                ..Default::default()
            },
            ..Default::default()
        }],
        ..Default::default()
    }
}

fn skill(name: &str, slug: Option<&str>) -> Skill {
    Skill {
        name: name.to_string(),
        description: format!("{} things", name),
        portability: slug.map(|s| Portability {
            slug: Some(s.to_string()),
            ..Default::default()
        }),
        acceptance: Acceptance {
            success_conditions: vec!["Done".to_string()],
            ..Default::default()
        },
        ..Default::default()
    }
}

#[test]
fn test_joke_agent_scenario() {
    let export = export_specification(&joke_agent(), &ExportOptions::default());

    assert_eq!(export.root_directory_name, "joke-agent");
    assert_eq!(export.skill_count, 1);
    assert!(export.get("agent.md").is_some());

    let skill_md = &export.get("skills/tell-jokes/SKILL.md").unwrap().content;
    let first = skill_md.find("Pick a topic").unwrap();
    let second = skill_md.find("Generate a joke").unwrap();
    let third = skill_md.find("Deliver it").unwrap();
    assert!(first < second && second < third);
    assert!(skill_md.starts_with("---\nname: tell-jokes\n"));
}

#[test]
fn test_every_skill_gets_a_skill_md() {
    let spec = AgentSpecification {
        name: "Office Helper".to_string(),
        skills: vec![
            skill("Draft Email", Some("email")),
            skill("Book Meeting", None),
            skill("Summarize", Some("summarize")),
            skill("Summarize!", None),
        ],
        ..Default::default()
    };
    let export = export_specification(&spec, &ExportOptions::default());

    assert_eq!(export.skill_count, 4);
    let skill_files: Vec<&str> = export
        .files
        .iter()
        .map(|f| f.path.as_str())
        .filter(|p| p.starts_with("skills/") && p.ends_with("/SKILL.md"))
        .collect();
    assert_eq!(
        skill_files,
        vec![
            "skills/email/SKILL.md",
            "skills/book-meeting/SKILL.md",
            "skills/summarize/SKILL.md",
            "skills/summarize-2/SKILL.md",
        ]
    );
    assert_eq!(export.total_files, export.files.len());

    // One warning for the derived slug of "Book Meeting", at least one for the collision
    assert!(export.warnings.iter().any(|w| w.contains("Book Meeting")));
    assert!(export.warnings.iter().any(|w| w.contains("summarize-2")));
}

#[test]
fn test_skills_can_be_left_out() {
    let options = ExportOptions {
        include_skills: false,
        include_readme: false,
        ..Default::default()
    };
    let export = export_specification(&joke_agent(), &options);
    assert_eq!(export.skill_count, 0);
    assert!(export.files.iter().all(|f| !f.path.starts_with("skills/")));
    assert!(export.get("README.md").is_none());
}

#[tokio::test]
async fn test_archive_round_trip() {
    let export = export_specification(&joke_agent(), &ExportOptions::default());
    let bytes = build_archive(&export.files, &export.root_directory_name).await.unwrap();

    let entries = read_archive(&bytes).unwrap();
    assert_eq!(entries.len(), export.files.len());
    for (entry, file) in entries.iter().zip(&export.files) {
        assert_eq!(entry.path, format!("joke-agent/{}", file.path));
        assert_eq!(entry.bytes, file.bytes().unwrap());
    }
}

#[tokio::test]
async fn test_write_matches_archive() {
    let export = export_specification(&joke_agent(), &ExportOptions::default());
    let dir = tempfile::tempdir().unwrap();

    let root = write_to_directory(&export.files, &export.root_directory_name, dir.path())
        .await
        .unwrap();
    let agent_md = std::fs::read_to_string(root.join("agent.md")).unwrap();
    assert_eq!(agent_md, export.get("agent.md").unwrap().content);
}

#[test]
fn test_schedule_trigger_still_exports() {
    let mut spec = joke_agent();
    spec.skills[0].triggers.push(trigger(TriggerType::Schedule, "Every morning at 9"));
    let registry = AdapterRegistry::with_builtin_adapters();

    for id in registry.ids() {
        let output = registry.export_to_harness(&spec, id).unwrap();
        assert!(!output.files.is_empty(), "{} produced no files", id);
        assert!(
            output.warnings.iter().any(|w| w.contains("external orchestration")),
            "{} did not warn about scheduling",
            id
        );
    }
}

#[test]
fn test_filesystem_export_with_schedule_trigger() {
    let mut spec = joke_agent();
    spec.skills[0].triggers = vec![trigger(TriggerType::Schedule, "Hourly")];
    let export = export_specification(&spec, &ExportOptions::default());
    assert_eq!(export.skill_count, 1);
    assert!(export.get("skills/tell-jokes/SKILL.md").is_some());
}
