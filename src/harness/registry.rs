//! Adapter registry
//!
//! Holds the adapters an application knows about, keyed by id in
//! registration order, and runs batch exports across them.

use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;

use super::{
    AgentsMdAdapter, ClaudeCodeAdapter, Compatibility, HarnessAdapter, HarnessOutput, LangGraphAdapter, LettaAdapter,
};
use crate::spec::AgentSpecification;

/// Registered harness adapters
#[derive(Default, Clone)]
pub struct AdapterRegistry {
    adapters: IndexMap<String, Arc<dyn HarnessAdapter>>,
}

/// Compatibility of one adapter, for listings
#[derive(Debug, Clone, Serialize)]
pub struct CompatibilityReport {
    pub id: String,
    pub name: String,
    pub compatible: bool,
    pub compatibility: Compatibility,
}

/// Which adapters a batch export targets
#[derive(Debug, Clone, Default)]
pub struct BatchExportOptions {
    /// Explicit adapter ids in export order; `None` means every compatible adapter
    pub adapter_ids: Option<Vec<String>>,
    /// Attach the specification as pretty-printed JSON
    pub include_source: bool,
}

/// Outputs of a batch export
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchExport {
    /// Adapter id -> output, in export order
    pub outputs: IndexMap<String, HarnessOutput>,
    /// Every warning, prefixed with the adapter's display name
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl AdapterRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with Claude Code, Letta, LangGraph and AGENTS.md
    pub fn with_builtin_adapters() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ClaudeCodeAdapter));
        registry.register(Arc::new(LettaAdapter));
        registry.register(Arc::new(LangGraphAdapter));
        registry.register(Arc::new(AgentsMdAdapter));
        registry
    }

    /// Register an adapter, replacing (and returning) any with the same id
    pub fn register(&mut self, adapter: Arc<dyn HarnessAdapter>) -> Option<Arc<dyn HarnessAdapter>> {
        let id = adapter.id().to_string();
        let previous = self.adapters.insert(id.clone(), adapter);
        if previous.is_some() {
            log::warn!("Harness adapter '{}' registered twice; replacing the earlier one", id);
        } else {
            log::debug!("Registered harness adapter '{}'", id);
        }
        previous
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn HarnessAdapter>> {
        self.adapters.get(id).cloned()
    }

    /// All adapters in registration order
    pub fn list(&self) -> Vec<Arc<dyn HarnessAdapter>> {
        self.adapters.values().cloned().collect()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.adapters.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    /// Adapters that can export `spec`, fewest warnings first, then by name
    pub fn compatible_adapters(&self, spec: &AgentSpecification) -> Vec<Arc<dyn HarnessAdapter>> {
        let mut compatible: Vec<(usize, Arc<dyn HarnessAdapter>)> = self
            .adapters
            .values()
            .filter_map(|adapter| {
                let compat = adapter.can_export(spec);
                compat
                    .is_compatible()
                    .then(|| (compat.warnings().len(), Arc::clone(adapter)))
            })
            .collect();

        compatible.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.name().cmp(b.1.name())));
        compatible.into_iter().map(|(_, adapter)| adapter).collect()
    }

    /// Compatibility of every registered adapter, in registration order
    pub fn check_all(&self, spec: &AgentSpecification) -> Vec<CompatibilityReport> {
        self.adapters
            .values()
            .map(|adapter| {
                let compatibility = adapter.can_export(spec);
                CompatibilityReport {
                    id: adapter.id().to_string(),
                    name: adapter.name().to_string(),
                    compatible: compatibility.is_compatible(),
                    compatibility,
                }
            })
            .collect()
    }

    /// Export to one adapter
    ///
    /// Returns `None` for an unknown id or an incompatible specification.
    /// Compatibility warnings are included in the output's warnings.
    pub fn export_to_harness(&self, spec: &AgentSpecification, id: &str) -> Option<HarnessOutput> {
        let adapter = self.adapters.get(id)?;
        let compat = adapter.can_export(spec);
        if !compat.is_compatible() {
            log::debug!(
                "Not exporting to '{}': missing {}",
                id,
                compat.missing_features().join(", ")
            );
            return None;
        }
        Some(generate_with(adapter.as_ref(), spec, &compat))
    }

    /// Export to several adapters at once
    ///
    /// Unknown ids and incompatible adapters are skipped with one warning
    /// each; nothing here is an error. A skipped adapter's compatibility
    /// warnings follow its skip line.
    pub fn export_to_harnesses(&self, spec: &AgentSpecification, options: &BatchExportOptions) -> BatchExport {
        let mut batch = BatchExport::default();

        let selected: Vec<Arc<dyn HarnessAdapter>> = match &options.adapter_ids {
            Some(ids) => ids
                .iter()
                .filter_map(|id| {
                    let adapter = self.get(id);
                    if adapter.is_none() {
                        batch.warnings.push(format!("Unknown harness adapter '{}' skipped", id));
                    }
                    adapter
                })
                .collect(),
            None => self.list(),
        };

        if selected.is_empty() {
            batch.warnings.push("No harness adapters selected; nothing was exported".to_string());
        }

        for adapter in selected {
            if batch.outputs.contains_key(adapter.id()) {
                continue;
            }
            let compat = adapter.can_export(spec);
            if !compat.is_compatible() {
                batch.warnings.push(format!(
                    "[{}] skipped: missing {}",
                    adapter.name(),
                    compat.missing_features().join(", ")
                ));
                batch
                    .warnings
                    .extend(compat.warnings().iter().map(|w| format!("[{}] {}", adapter.name(), w)));
                continue;
            }

            let output = generate_with(adapter.as_ref(), spec, &compat);
            batch
                .warnings
                .extend(output.warnings.iter().map(|w| format!("[{}] {}", adapter.name(), w)));
            batch.outputs.insert(adapter.id().to_string(), output);
        }

        if options.include_source {
            match serde_json::to_string_pretty(spec) {
                Ok(json) => batch.source = Some(json),
                Err(err) => batch.warnings.push(format!("Could not serialize the specification: {}", err)),
            }
        }

        log::info!(
            "Exported '{}' to {} harness(es) with {} warning(s)",
            spec.display_name(),
            batch.outputs.len(),
            batch.warnings.len()
        );
        batch
    }
}

/// Generate and prepend the compatibility warnings
fn generate_with(adapter: &dyn HarnessAdapter, spec: &AgentSpecification, compat: &Compatibility) -> HarnessOutput {
    let mut output = adapter.generate(spec);
    let mut warnings = compat.warnings().to_vec();
    warnings.append(&mut output.warnings);
    output.warnings = warnings;
    log::debug!("Generated {} files for '{}'", output.files.len(), adapter.id());
    output
}
