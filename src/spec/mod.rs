//! Canonical agent specification ("Agent Story")
//!
//! The specification is produced by the editing layer and is read-only input
//! to every exporter in this crate. Nothing here performs I/O except
//! [`AgentSpecification::load`], which the CLI uses to read a spec file.

use chrono::{DateTime, Utc};
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub mod policy;
pub mod skill;
pub mod validate;

pub use policy::{
    AgentRef, Checkpoint, CheckpointAction, CollaborationProfile, CollaborationRole, Enforcement, Escalation,
    Guardrail, HumanInteractionPolicy, InteractionMode, LearningConfig, LearningType, MemoryConfiguration,
    PersistentStore, StoreType, UpdateMode,
};
pub use skill::{
    Acceptance, AcquisitionMode, Behavior, DecisionPoint, FailureHandling, FailureMode, FileBlob, NamedText,
    Permission, Portability, QualityMetric, Reasoning, ReasoningStrategy, RetryPolicy, Skill, SkillInput,
    SkillOutput, Tool, Transition, Trigger, TriggerType, WorkflowStage,
};

/// Maximum length of an agent name
pub const MAX_NAME_LEN: usize = 100;

/// The root entity describing one agent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSpecification {
    /// Display name (required, at most 100 characters)
    #[serde(default)]
    pub name: String,

    /// URL-safe slug
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autonomy_level: Option<AutonomyLevel>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub skills: Vec<Skill>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub human_interaction: Option<HumanInteractionPolicy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collaboration: Option<CollaborationProfile>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<MemoryConfiguration>,

    /// Agent-level guardrails
    #[serde(default)]
    pub guardrails: Vec<Guardrail>,
}

impl AgentSpecification {
    /// Load a specification from a YAML or JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read specification: {}", path.display()))?;
        Self::from_str(&content).with_context(|| format!("Failed to parse specification: {}", path.display()))
    }

    /// Parse a specification from YAML (JSON is valid YAML)
    pub fn from_str(content: &str) -> Result<Self> {
        let spec: Self = serde_yaml::from_str(content).context("Invalid agent specification")?;
        Ok(spec)
    }

    /// Name with surrounding whitespace removed
    pub fn display_name(&self) -> &str {
        self.name.trim()
    }

    /// Whether any skill is activated by the given trigger type
    pub fn has_trigger(&self, kind: TriggerType) -> bool {
        self.skills.iter().any(|s| s.has_trigger(kind))
    }

    /// Whether any skill declares a tool
    pub fn has_tools(&self) -> bool {
        self.skills.iter().any(|s| !s.tools.is_empty())
    }

    /// Persistent stores, empty when no memory is configured
    pub fn persistent_stores(&self) -> &[PersistentStore] {
        self.memory.as_ref().map(|m| m.persistent.as_slice()).unwrap_or(&[])
    }
}

/// How independently the agent operates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutonomyLevel {
    Full,
    Supervised,
    Collaborative,
    Directed,
    /// Any value the editor produced that this crate does not know
    #[serde(other)]
    Unrecognized,
}

impl AutonomyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AutonomyLevel::Full => "full",
            AutonomyLevel::Supervised => "supervised",
            AutonomyLevel::Collaborative => "collaborative",
            AutonomyLevel::Directed => "directed",
            AutonomyLevel::Unrecognized => "unrecognized",
        }
    }
}

impl std::fmt::Display for AutonomyLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
