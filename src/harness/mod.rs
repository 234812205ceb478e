//! Harness adapters
//!
//! A harness is an agent runtime (Claude Code, Letta, LangGraph, plain
//! `AGENTS.md` consumers). Each adapter checks whether a specification can be
//! expressed in its runtime and generates the runtime's native files.
//!
//! Adapters are registered in an [`AdapterRegistry`] owned by the caller.

use serde::Serialize;

use crate::export::ExportedFile;
use crate::spec::AgentSpecification;

pub mod agents_md;
pub mod claude_code;
pub mod common;
pub mod langgraph;
pub mod letta;
pub mod registry;

pub use agents_md::AgentsMdAdapter;
pub use claude_code::ClaudeCodeAdapter;
pub use langgraph::LangGraphAdapter;
pub use letta::LettaAdapter;
pub use registry::{AdapterRegistry, BatchExport, BatchExportOptions, CompatibilityReport};

/// Result of checking a specification against one harness
///
/// Lists are append-only. Anything recorded as unsupported is always also a
/// warning; only missing features make a specification incompatible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Compatibility {
    warnings: Vec<String>,
    unsupported_features: Vec<String>,
    missing_features: Vec<String>,
}

impl Compatibility {
    pub fn new() -> Self {
        Self::default()
    }

    /// Something that works but may behave differently than expected
    pub fn warn(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// A feature the harness cannot express; export still proceeds
    pub fn unsupported(&mut self, feature: impl Into<String>, warning: impl Into<String>) {
        self.unsupported_features.push(feature.into());
        self.warnings.push(warning.into());
    }

    /// A hard blocker
    pub fn missing(&mut self, feature: impl Into<String>) {
        self.missing_features.push(feature.into());
    }

    pub fn is_compatible(&self) -> bool {
        self.missing_features.is_empty()
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn unsupported_features(&self) -> &[String] {
        &self.unsupported_features
    }

    pub fn missing_features(&self) -> &[String] {
        &self.missing_features
    }
}

/// Files generated for one harness
#[derive(Debug, Clone, Default, Serialize)]
pub struct HarnessOutput {
    pub files: Vec<ExportedFile>,
    pub warnings: Vec<String>,
    /// How to install and run the generated files
    pub instructions: String,
}

impl HarnessOutput {
    pub fn get(&self, path: &str) -> Option<&ExportedFile> {
        self.files.iter().find(|f| f.path == path)
    }
}

/// How to launch an exported agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LaunchRecipe {
    Command {
        command: String,
    },
    Url {
        url: String,
    },
    Api {
        method: String,
        endpoint: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        body: Option<String>,
    },
}

impl std::fmt::Display for LaunchRecipe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LaunchRecipe::Command { command } => write!(f, "$ {}", command),
            LaunchRecipe::Url { url } => write!(f, "open {}", url),
            LaunchRecipe::Api { method, endpoint, .. } => write!(f, "{} {}", method, endpoint),
        }
    }
}

/// Launch recipe plus setup steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TryItConfig {
    pub launch: LaunchRecipe,
    pub setup_instructions: Vec<String>,
}

/// An agent runtime that specifications can be exported to
pub trait HarnessAdapter: Send + Sync {
    /// Stable identifier, e.g. `claude-code`
    fn id(&self) -> &'static str;

    /// Display name used in listings and warning prefixes
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn icon(&self) -> Option<&'static str> {
        None
    }

    fn url(&self) -> Option<&'static str> {
        None
    }

    /// Check what of the specification this harness can express
    fn can_export(&self, spec: &AgentSpecification) -> Compatibility;

    /// Generate the harness files
    ///
    /// Warnings returned here are specific to generation; compatibility
    /// warnings come from [`can_export`](Self::can_export).
    fn generate(&self, spec: &AgentSpecification) -> HarnessOutput;

    /// Recipe for launching the exported agent, if the harness has one
    fn try_it_config(&self, _spec: &AgentSpecification) -> Option<TryItConfig> {
        None
    }
}
