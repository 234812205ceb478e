//! Skill model: one discrete capability of an agent
//!
//! A skill carries its own triggers, typed interface, tools, execution model
//! and success/failure criteria. Skills are owned by exactly one
//! [`AgentSpecification`](super::AgentSpecification).

use serde::{Deserialize, Serialize};

use super::Guardrail;

/// One capability of an agent
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    /// Stable identifier assigned by the editor (carried as `source-id`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Display name
    pub name: String,

    /// What this skill does
    #[serde(default)]
    pub description: String,

    /// Knowledge domain (e.g. "customer-support")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// How the agent came to have this skill
    #[serde(default)]
    pub acquisition_mode: AcquisitionMode,

    #[serde(default)]
    pub triggers: Vec<Trigger>,

    #[serde(default)]
    pub inputs: Vec<SkillInput>,

    #[serde(default)]
    pub outputs: Vec<SkillOutput>,

    #[serde(default)]
    pub tools: Vec<Tool>,

    /// Execution model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behavior: Option<Behavior>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<Reasoning>,

    #[serde(default)]
    pub acceptance: Acceptance,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_handling: Option<FailureHandling>,

    /// Skill-level constraints
    #[serde(default)]
    pub guardrails: Vec<Guardrail>,

    /// Packaging hints used only during export
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portability: Option<Portability>,

    /// Prompt fragments laid out under `prompts/`
    #[serde(default)]
    pub prompts: Vec<NamedText>,

    /// Worked examples laid out under `examples/`
    #[serde(default)]
    pub examples: Vec<NamedText>,

    /// Template files laid out under `templates/`
    #[serde(default)]
    pub templates: Vec<FileBlob>,
}

impl Skill {
    /// Explicitly configured slug, if any (blank counts as absent)
    pub fn explicit_slug(&self) -> Option<&str> {
        self.portability
            .as_ref()
            .and_then(|p| p.slug.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Whether any trigger of this skill is of the given type
    pub fn has_trigger(&self, kind: TriggerType) -> bool {
        self.triggers.iter().any(|t| t.kind == kind)
    }
}

/// How a skill was acquired
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcquisitionMode {
    #[default]
    BuiltIn,
    PreTrained,
    Learned,
    Delegated,
}

impl AcquisitionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AcquisitionMode::BuiltIn => "built_in",
            AcquisitionMode::PreTrained => "pre_trained",
            AcquisitionMode::Learned => "learned",
            AcquisitionMode::Delegated => "delegated",
        }
    }
}

impl std::fmt::Display for AcquisitionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What activates a skill
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trigger {
    #[serde(rename = "type")]
    pub kind: TriggerType,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

/// Trigger kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    Message,
    ResourceChange,
    Schedule,
    Cascade,
    Manual,
    Condition,
}

impl TriggerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerType::Message => "message",
            TriggerType::ResourceChange => "resource_change",
            TriggerType::Schedule => "schedule",
            TriggerType::Cascade => "cascade",
            TriggerType::Manual => "manual",
            TriggerType::Condition => "condition",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            TriggerType::Message => "Message",
            TriggerType::ResourceChange => "Resource change",
            TriggerType::Schedule => "Schedule",
            TriggerType::Cascade => "Cascade",
            TriggerType::Manual => "Manual",
            TriggerType::Condition => "Condition",
        }
    }
}

impl std::fmt::Display for TriggerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed skill input
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillInput {
    pub name: String,

    #[serde(rename = "type", default = "default_data_type")]
    pub data_type: String,

    #[serde(default)]
    pub description: String,

    #[serde(default = "default_true")]
    pub required: bool,
}

/// Typed skill output
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillOutput {
    pub name: String,

    #[serde(rename = "type", default = "default_data_type")]
    pub data_type: String,

    #[serde(default)]
    pub description: String,
}

fn default_data_type() -> String {
    "string".to_string()
}

fn default_true() -> bool {
    true
}

/// A tool the skill may call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub name: String,

    #[serde(default)]
    pub purpose: String,

    #[serde(default)]
    pub permissions: Vec<Permission>,

    #[serde(default = "default_true")]
    pub required: bool,

    /// Source of a custom implementation, laid out under `tools/`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implementation: Option<FileBlob>,
}

/// Tool permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Read,
    Write,
    Execute,
    Admin,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Read => "read",
            Permission::Write => "write",
            Permission::Execute => "execute",
            Permission::Admin => "admin",
        }
    }
}

/// Execution model of a skill
///
/// Every renderer matches on this exhaustively, so a new variant is a compile
/// error at each render site until it is handled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum Behavior {
    /// Ordered list of steps
    Sequential {
        #[serde(default)]
        steps: Vec<String>,
    },
    /// Named stages with transitions
    Workflow {
        #[serde(default)]
        stages: Vec<WorkflowStage>,
    },
    /// Capabilities selected at run time
    #[serde(rename_all = "camelCase")]
    Adaptive {
        #[serde(default)]
        capabilities: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        selection_strategy: Option<String>,
    },
    /// Loop body with a termination condition
    #[serde(rename_all = "camelCase")]
    Iterative {
        #[serde(default)]
        body: Vec<String>,
        #[serde(default)]
        termination_condition: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_iterations: Option<u32>,
    },
}

impl Behavior {
    pub fn model_name(&self) -> &'static str {
        match self {
            Behavior::Sequential { .. } => "sequential",
            Behavior::Workflow { .. } => "workflow",
            Behavior::Adaptive { .. } => "adaptive",
            Behavior::Iterative { .. } => "iterative",
        }
    }
}

/// One stage of a workflow behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStage {
    pub name: String,

    #[serde(default)]
    pub purpose: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transitions: Vec<Transition>,
}

/// Edge between workflow stages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    /// Target stage name
    pub to: String,
    /// Trigger condition
    #[serde(default)]
    pub when: String,
}

/// How the skill makes decisions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reasoning {
    #[serde(default)]
    pub strategy: ReasoningStrategy,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decision_points: Vec<DecisionPoint>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<RetryPolicy>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasoningStrategy {
    RuleBased,
    #[default]
    LlmGuided,
    Hybrid,
}

impl ReasoningStrategy {
    pub fn label(&self) -> &'static str {
        match self {
            ReasoningStrategy::RuleBased => "Rule-based",
            ReasoningStrategy::LlmGuided => "LLM-guided",
            ReasoningStrategy::Hybrid => "Hybrid",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionPoint {
    pub name: String,
    #[serde(default)]
    pub approach: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryPolicy {
    pub max_attempts: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backoff: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub retry_on: Vec<String>,
}

/// Success criteria
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Acceptance {
    /// Must be non-empty for a valid skill
    #[serde(default)]
    pub success_conditions: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub quality_metrics: Vec<QualityMetric>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityMetric {
    pub name: String,
    #[serde(default)]
    pub target: String,
}

/// Failure modes and their recovery actions
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureHandling {
    #[serde(default)]
    pub modes: Vec<FailureMode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_fallback: Option<String>,

    #[serde(default)]
    pub notify_on_failure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureMode {
    pub condition: String,
    pub recovery: String,
}

/// Per-skill packaging hints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portability {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compatibility: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scripts: Vec<FileBlob>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<FileBlob>,
}

/// A named file attached to a skill
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileBlob {
    pub filename: String,

    /// Text, or base64 when `binary` is set
    #[serde(default)]
    pub content: String,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub binary: bool,
}

/// Named Markdown text (prompt or example)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedText {
    pub name: String,
    #[serde(default)]
    pub content: String,
}
