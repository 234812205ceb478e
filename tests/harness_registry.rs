//! Registry behavior with real and stand-in adapters

use std::sync::Arc;

use agentstory::harness::{
    AdapterRegistry, BatchExportOptions, Compatibility, HarnessAdapter, HarnessOutput,
};
use agentstory::spec::{AgentSpecification, Skill, Trigger, TriggerType};

/// Adapter that refuses every specification
struct Refuses;

impl HarnessAdapter for Refuses {
    fn id(&self) -> &'static str {
        "refuses"
    }

    fn name(&self) -> &'static str {
        "Refuses"
    }

    fn description(&self) -> &'static str {
        "Never compatible"
    }

    fn can_export(&self, _spec: &AgentSpecification) -> Compatibility {
        let mut compat = Compatibility::new();
        compat.missing("a runtime");
        compat
    }

    fn generate(&self, _spec: &AgentSpecification) -> HarnessOutput {
        HarnessOutput::default()
    }
}

/// Stand-in for the built-in Claude Code adapter
struct Replacement;

impl HarnessAdapter for Replacement {
    fn id(&self) -> &'static str {
        "claude-code"
    }

    fn name(&self) -> &'static str {
        "Replacement"
    }

    fn description(&self) -> &'static str {
        "Overrides a built-in"
    }

    fn can_export(&self, _spec: &AgentSpecification) -> Compatibility {
        Compatibility::new()
    }

    fn generate(&self, _spec: &AgentSpecification) -> HarnessOutput {
        HarnessOutput::default()
    }
}

fn spec() -> AgentSpecification {
    AgentSpecification {
        name: "Planner".to_string(),
        skills: vec![Skill {
            name: "Plan Trip".to_string(),
            ..Default::default()
        }],
        ..Default::default()
    }
}

#[test]
fn test_builtin_adapters() {
    let registry = AdapterRegistry::with_builtin_adapters();
    assert_eq!(registry.ids(), vec!["claude-code", "letta", "langgraph", "agents-md"]);
}

#[test]
fn test_compatible_adapters_never_include_incompatible() {
    let mut registry = AdapterRegistry::with_builtin_adapters();
    registry.register(Arc::new(Refuses));

    for spec in [spec(), AgentSpecification::default()] {
        for adapter in registry.compatible_adapters(&spec) {
            assert!(adapter.can_export(&spec).is_compatible(), "{} listed as compatible", adapter.id());
            assert_ne!(adapter.id(), "refuses");
        }
    }
}

#[test]
fn test_nameless_spec_is_incompatible_everywhere() {
    let registry = AdapterRegistry::with_builtin_adapters();
    assert!(registry.compatible_adapters(&AgentSpecification::default()).is_empty());
}

#[test]
fn test_batch_with_empty_selection() {
    let registry = AdapterRegistry::with_builtin_adapters();
    let batch = registry.export_to_harnesses(
        &spec(),
        &BatchExportOptions {
            adapter_ids: Some(vec![]),
            include_source: false,
        },
    );
    assert!(batch.outputs.is_empty());
    assert_eq!(batch.warnings.len(), 1);
}

#[test]
fn test_batch_with_all_incompatible() {
    let registry = AdapterRegistry::with_builtin_adapters();
    let nameless = AgentSpecification::default();
    let batch = registry.export_to_harnesses(&nameless, &BatchExportOptions::default());

    assert!(batch.outputs.is_empty());
    let skips: Vec<&String> = batch.warnings.iter().filter(|w| w.contains("skipped: missing agent name")).collect();
    assert_eq!(skips.len(), registry.len());
}

#[test]
fn test_skipped_adapter_keeps_its_warnings() {
    let mut nameless = AgentSpecification::default();
    nameless.skills.push(Skill {
        name: "Nightly Digest".to_string(),
        triggers: vec![Trigger {
            kind: TriggerType::Schedule,
            description: "Every night".to_string(),
            conditions: vec![],
            examples: vec![],
        }],
        ..Default::default()
    });
    let registry = AdapterRegistry::with_builtin_adapters();
    let batch = registry.export_to_harnesses(
        &nameless,
        &BatchExportOptions {
            adapter_ids: Some(vec!["letta".to_string()]),
            include_source: false,
        },
    );

    assert!(batch.outputs.is_empty());
    assert!(batch.warnings[0].starts_with("[Letta] skipped: missing agent name"));
    assert!(
        batch.warnings[1..]
            .iter()
            .any(|w| w.starts_with("[Letta] ") && w.contains("external orchestration"))
    );
}

#[test]
fn test_batch_skips_unknown_ids() {
    let registry = AdapterRegistry::with_builtin_adapters();
    let batch = registry.export_to_harnesses(
        &spec(),
        &BatchExportOptions {
            adapter_ids: Some(vec!["agents-md".to_string(), "autogen".to_string()]),
            include_source: true,
        },
    );

    assert_eq!(batch.outputs.keys().collect::<Vec<_>>(), vec!["agents-md"]);
    assert!(batch.warnings.contains(&"Unknown harness adapter 'autogen' skipped".to_string()));

    let source: serde_json::Value = serde_json::from_str(batch.source.as_deref().unwrap()).unwrap();
    assert_eq!(source["name"], "Planner");
}

#[test]
fn test_reregistering_replaces() {
    let mut registry = AdapterRegistry::with_builtin_adapters();
    let previous = registry.register(Arc::new(Replacement)).unwrap();

    assert_eq!(previous.name(), "Claude Code");
    assert_eq!(registry.len(), 4);
    assert_eq!(registry.get("claude-code").unwrap().name(), "Replacement");
    assert_eq!(registry.ids()[0], "claude-code");
}

#[test]
fn test_unknown_adapter_is_none() {
    let registry = AdapterRegistry::with_builtin_adapters();
    assert!(registry.get("autogen").is_none());
    assert!(registry.export_to_harness(&spec(), "autogen").is_none());
}

#[test]
fn test_empty_registry() {
    let registry = AdapterRegistry::new();
    assert!(registry.is_empty());
    assert!(registry.compatible_adapters(&spec()).is_empty());
    let batch = registry.export_to_harnesses(&spec(), &BatchExportOptions::default());
    assert!(batch.outputs.is_empty());
    assert_eq!(batch.warnings.len(), 1);
}
