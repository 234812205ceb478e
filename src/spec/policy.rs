//! Agent-level policies: guardrails, human interaction, collaboration, memory

use serde::{Deserialize, Serialize};

/// A constraint on agent or skill behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guardrail {
    pub name: String,

    /// Free-text constraint
    pub constraint: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,

    #[serde(default)]
    pub enforcement: Enforcement,

    /// Action taken when the constraint is violated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_violation: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Enforcement {
    #[default]
    Hard,
    Soft,
}

impl Enforcement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Enforcement::Hard => "hard",
            Enforcement::Soft => "soft",
        }
    }
}

/// When and how humans take part in the agent's work
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanInteractionPolicy {
    #[serde(default)]
    pub mode: InteractionMode,

    #[serde(default)]
    pub checkpoints: Vec<Checkpoint>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalation: Option<Escalation>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionMode {
    InTheLoop,
    #[default]
    OnTheLoop,
    OverTheLoop,
    OutOfLoop,
}

impl InteractionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionMode::InTheLoop => "in_the_loop",
            InteractionMode::OnTheLoop => "on_the_loop",
            InteractionMode::OverTheLoop => "over_the_loop",
            InteractionMode::OutOfLoop => "out_of_loop",
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            InteractionMode::InTheLoop => "A human approves each significant action before it is taken.",
            InteractionMode::OnTheLoop => "A human monitors the agent and can intervene at any time.",
            InteractionMode::OverTheLoop => "A human sets goals and reviews outcomes, not individual actions.",
            InteractionMode::OutOfLoop => "The agent operates without routine human involvement.",
        }
    }
}

/// A point where the agent pauses for a human
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    pub name: String,

    /// Condition that reaches this checkpoint
    #[serde(default)]
    pub trigger: String,

    #[serde(default)]
    pub action: CheckpointAction,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointAction {
    #[default]
    Approve,
    Review,
    Notify,
    Input,
}

impl CheckpointAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckpointAction::Approve => "approve",
            CheckpointAction::Review => "review",
            CheckpointAction::Notify => "notify",
            CheckpointAction::Input => "input",
        }
    }

    /// Whether the agent must stop and wait for the human
    pub fn is_blocking(&self) -> bool {
        matches!(self, CheckpointAction::Approve | CheckpointAction::Input)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Escalation {
    #[serde(default)]
    pub conditions: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

/// Role of the agent among other agents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaborationProfile {
    #[serde(default)]
    pub role: CollaborationRole,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reports_to: Option<String>,

    #[serde(default)]
    pub coordinates: Vec<AgentRef>,

    #[serde(default)]
    pub peers: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollaborationRole {
    Supervisor,
    #[default]
    Worker,
    Peer,
}

impl CollaborationRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollaborationRole::Supervisor => "supervisor",
            CollaborationRole::Worker => "worker",
            CollaborationRole::Peer => "peer",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRef {
    pub agent: String,
    #[serde(default)]
    pub role: String,
}

/// Working memory, persistent stores and learning loops
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryConfiguration {
    /// Items kept in working (context) memory
    #[serde(default)]
    pub working: Vec<String>,

    #[serde(default)]
    pub persistent: Vec<PersistentStore>,

    #[serde(default)]
    pub learning: Vec<LearningConfig>,
}

impl MemoryConfiguration {
    pub fn is_empty(&self) -> bool {
        self.working.is_empty() && self.persistent.is_empty() && self.learning.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistentStore {
    pub name: String,

    #[serde(rename = "type", default)]
    pub store_type: StoreType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,

    #[serde(default)]
    pub updates: UpdateMode,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    #[default]
    KeyValue,
    Vector,
    Relational,
    Graph,
    Document,
}

impl StoreType {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreType::KeyValue => "key_value",
            StoreType::Vector => "vector",
            StoreType::Relational => "relational",
            StoreType::Graph => "graph",
            StoreType::Document => "document",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateMode {
    #[default]
    Append,
    Replace,
    Merge,
}

impl UpdateMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateMode::Append => "append",
            UpdateMode::Replace => "replace",
            UpdateMode::Merge => "merge",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningConfig {
    #[serde(rename = "type")]
    pub kind: LearningType,

    #[serde(default)]
    pub signal: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningType {
    FeedbackLoop,
    Reinforcement,
    FineTuning,
}

impl LearningType {
    pub fn label(&self) -> &'static str {
        match self {
            LearningType::FeedbackLoop => "Feedback loop",
            LearningType::Reinforcement => "Reinforcement",
            LearningType::FineTuning => "Fine-tuning",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guardrail_defaults_to_hard() {
        let guardrail: Guardrail = serde_yaml::from_str("name: pii\nconstraint: Never store PII").unwrap();
        assert_eq!(guardrail.enforcement, Enforcement::Hard);
        assert!(guardrail.rationale.is_none());
    }

    #[test]
    fn test_memory_deserialize() {
        let yaml = r#"
working:
  - current conversation
persistent:
  - name: preferences
    type: vector
    updates: merge
learning:
  - type: feedback_loop
    signal: thumbs up/down
"#;
        let memory: MemoryConfiguration = serde_yaml::from_str(yaml).unwrap();
        assert!(!memory.is_empty());
        assert_eq!(memory.persistent[0].store_type, StoreType::Vector);
        assert_eq!(memory.persistent[0].updates, UpdateMode::Merge);
        assert_eq!(memory.learning[0].kind, LearningType::FeedbackLoop);
    }

    #[test]
    fn test_checkpoint_blocking() {
        assert!(CheckpointAction::Approve.is_blocking());
        assert!(CheckpointAction::Input.is_blocking());
        assert!(!CheckpointAction::Notify.is_blocking());
    }
}
