//! Filesystem exporter
//!
//! Lays out a whole specification as a self-contained agent directory:
//!
//! ```text
//! <root>/
//! ├── agent.md
//! ├── config.yaml
//! ├── README.md
//! ├── skills/<slug>/SKILL.md ...
//! ├── memory/
//! ├── tools/
//! └── logs/
//! ```
//!
//! Export never fails: a skill that cannot be packaged gets a minimal
//! `SKILL.md` and a warning.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use super::ExportedFile;
use crate::escape::{Frontmatter, md_cell, md_inline, python_docstring};
use crate::render::{autonomy_guidance, heading, render_guardrails, render_human_interaction};
use crate::skill::{PackOptions, PackedSkill, pack_skill};
use crate::slug::{is_valid_slug, safe_filename, slugify};
use crate::spec::{
    AgentSpecification, Behavior, CollaborationProfile, FailureHandling, Guardrail, HumanInteractionPolicy,
    LearningConfig, MemoryConfiguration, Permission, Portability, Reasoning, Skill, Trigger,
};

/// Root directory name used when neither identifier nor name yields a slug
pub const DEFAULT_ROOT: &str = "agent";

/// What to include in a filesystem export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub include_skills: bool,
    pub include_readme: bool,
    pub include_memory_structure: bool,
    pub include_shared_tools: bool,
    pub include_logs: bool,
    pub include_prompts: bool,
    pub include_tool_implementations: bool,
    pub include_examples: bool,
    pub include_templates: bool,
    /// Derive slugs for skills that have none instead of falling back
    pub generate_missing_slugs: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            include_skills: true,
            include_readme: true,
            include_memory_structure: true,
            include_shared_tools: false,
            include_logs: false,
            include_prompts: true,
            include_tool_implementations: true,
            include_examples: true,
            include_templates: true,
            generate_missing_slugs: true,
        }
    }
}

/// Result of a filesystem export
#[derive(Debug, Clone, Serialize)]
pub struct FilesystemExport {
    /// Paths are relative to `root_directory_name`
    pub files: Vec<ExportedFile>,
    pub root_directory_name: String,
    pub warnings: Vec<String>,
    pub skill_count: usize,
    pub total_files: usize,
    /// Sum of content lengths; binary files count their base64 length
    pub estimated_size_bytes: usize,
}

impl FilesystemExport {
    /// File name for the archive of this export
    pub fn archive_name(&self) -> String {
        format!("{}.tar.gz", self.root_directory_name)
    }

    pub fn get(&self, path: &str) -> Option<&ExportedFile> {
        self.files.iter().find(|f| f.path == path)
    }
}

/// Root directory name: identifier, else slugified name, else [`DEFAULT_ROOT`]
///
/// An identifier that is not a valid slug is slugified first.
pub fn root_directory_name(spec: &AgentSpecification) -> String {
    if let Some(identifier) = spec_identifier(spec) {
        if is_valid_slug(identifier) {
            return identifier.to_string();
        }
        let slug = slugify(identifier);
        if !slug.is_empty() {
            return slug;
        }
    }
    let slug = slugify(&spec.name);
    if slug.is_empty() { DEFAULT_ROOT.to_string() } else { slug }
}

fn spec_identifier(spec: &AgentSpecification) -> Option<&str> {
    spec.identifier.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Export a specification as a directory tree
pub fn export_specification(spec: &AgentSpecification, options: &ExportOptions) -> FilesystemExport {
    let root = root_directory_name(spec);
    let mut out = FileSet::default();

    if let Some(identifier) = spec_identifier(spec)
        && identifier != root
    {
        out.warnings.push(format!(
            "identifier '{}' is not a valid slug; exported as '{}'",
            identifier, root
        ));
    }

    let layouts = if options.include_skills {
        layout_skills(spec, options, &mut out.warnings)
    } else {
        Vec::new()
    };

    out.push(ExportedFile::text("agent.md", agent_markdown(spec, &root, &layouts)));
    let config = agent_config(spec, &layouts, &mut out.warnings);
    out.push(ExportedFile::text("config.yaml", config));

    for layout in &layouts {
        write_skill(layout, options, &mut out);
    }

    if options.include_memory_structure {
        let memory = memory_config(spec, &mut out.warnings);
        out.push(ExportedFile::text("memory/config.yaml", memory));
        out.push(ExportedFile::placeholder("memory/short-term"));
        out.push(ExportedFile::placeholder("memory/long-term"));
    }

    if options.include_shared_tools {
        out.push(ExportedFile::text("tools/__init__.py", tools_init(spec)));
        out.push(ExportedFile::text("tools/base.py", TOOLS_BASE.to_string()));
        if let Some(purpose) = spec.purpose.as_deref().filter(|p| !p.trim().is_empty()) {
            out.push(ExportedFile::text("tools/system_prompt.md", system_prompt(spec, purpose)));
        }
    }

    if options.include_logs {
        out.push(ExportedFile::placeholder("logs"));
    }

    let FileSet { mut files, warnings, .. } = out;

    if options.include_readme {
        let mut paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
        paths.push("README.md");
        let readme = readme(spec, &root, &layouts, &paths);
        let at = files.len().min(2);
        files.insert(at, ExportedFile::text("README.md", readme));
    }

    let estimated_size_bytes = files.iter().map(|f| f.content.len()).sum();
    log::info!(
        "Exported '{}' as '{}': {} files, {} skills, ~{} bytes",
        spec.display_name(),
        root,
        files.len(),
        layouts.len(),
        estimated_size_bytes
    );

    FilesystemExport {
        total_files: files.len(),
        skill_count: layouts.len(),
        files,
        root_directory_name: root,
        warnings,
        estimated_size_bytes,
    }
}

/// Files in insertion order, rejecting duplicate paths
#[derive(Default)]
struct FileSet {
    files: Vec<ExportedFile>,
    paths: HashSet<String>,
    warnings: Vec<String>,
}

impl FileSet {
    fn push(&mut self, file: ExportedFile) {
        if self.paths.insert(file.path.clone()) {
            self.files.push(file);
        } else {
            self.warnings.push(format!("duplicate file '{}' skipped", file.path));
        }
    }
}

/// A skill with its final directory slug and packaged artifact
struct SkillLayout<'a> {
    skill: &'a Skill,
    slug: String,
    packed: PackedSkill,
}

impl SkillLayout<'_> {
    fn dir(&self) -> String {
        format!("skills/{}", self.slug)
    }
}

fn layout_skills<'a>(
    spec: &'a AgentSpecification,
    options: &ExportOptions,
    warnings: &mut Vec<String>,
) -> Vec<SkillLayout<'a>> {
    let pack_options = PackOptions {
        generate_missing_slug: options.generate_missing_slugs,
    };
    let mut used: HashSet<String> = HashSet::new();
    let mut layouts = Vec::with_capacity(spec.skills.len());

    for (i, skill) in spec.skills.iter().enumerate() {
        let (mut packed, packaged) = match pack_skill(skill, &pack_options) {
            Ok(packed) => (packed, true),
            Err(err) => {
                log::warn!("Falling back to a minimal SKILL.md: {}", err);
                let mut packed = fallback_packed(skill, fallback_slug(skill, i));
                packed.warnings.push(format!("{}; wrote a minimal SKILL.md", err));
                (packed, false)
            }
        };

        if !used.insert(packed.slug.clone()) {
            let unique = (2..)
                .map(|n| format!("{}-{}", packed.slug, n))
                .find(|candidate| !used.contains(candidate))
                .unwrap_or_default();
            let message = format!(
                "skill '{}': slug '{}' is already used, exported as '{}'",
                skill.name, packed.slug, unique
            );
            let earlier = std::mem::take(&mut packed.warnings);
            // A rejected skill stays a fallback; only its slug moves
            packed = if packaged {
                repack_with_slug(skill, &unique, &pack_options)
            } else {
                fallback_packed(skill, unique.clone())
            };
            packed.warnings.splice(0..0, earlier);
            packed.warnings.push(message);
            used.insert(unique);
        }

        warnings.append(&mut packed.warnings);
        layouts.push(SkillLayout {
            skill,
            slug: packed.slug.clone(),
            packed,
        });
    }

    layouts
}

fn repack_with_slug(skill: &Skill, slug: &str, options: &PackOptions) -> PackedSkill {
    let mut renamed = skill.clone();
    let mut portability = renamed.portability.take().unwrap_or_default();
    portability.slug = Some(slug.to_string());
    renamed.portability = Some(portability);

    pack_skill(&renamed, options).unwrap_or_else(|err| {
        let mut packed = fallback_packed(skill, slug.to_string());
        packed.warnings.push(format!("{}; wrote a minimal SKILL.md", err));
        packed
    })
}

/// Directory slug for a skill the packager rejected
fn fallback_slug(skill: &Skill, index: usize) -> String {
    [skill.explicit_slug().map(slugify), Some(slugify(&skill.name))]
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
        .unwrap_or_else(|| format!("skill-{}", index + 1))
}

/// Minimal SKILL.md for a skill the packager rejected
fn fallback_packed(skill: &Skill, slug: String) -> PackedSkill {
    let description = md_inline(&skill.description);
    let description = if description.is_empty() { md_inline(&skill.name) } else { description };

    let mut artifact = Frontmatter::new()
        .field("name", &slug)
        .field("description", &description)
        .render();
    artifact.push('\n');
    artifact.push_str(&heading(1, if skill.name.trim().is_empty() { &slug } else { &skill.name }));
    artifact.push_str("\n\n");
    if !skill.description.trim().is_empty() {
        artifact.push_str(skill.description.trim());
        artifact.push_str("\n\n");
    }
    artifact.push_str("> This skill could not be fully packaged. Review its portability settings and export again.\n");

    PackedSkill {
        slug,
        artifact,
        scripts: Vec::new(),
        references: Vec::new(),
        warnings: Vec::new(),
    }
}

fn write_skill(layout: &SkillLayout<'_>, options: &ExportOptions, out: &mut FileSet) {
    let dir = layout.dir();
    let skill = layout.skill;

    for file in layout.packed.files() {
        out.push(file.nested_under(&dir));
    }
    let config = skill_config(layout, &mut out.warnings);
    out.push(ExportedFile::text(format!("{}/config.yaml", dir), config));

    if options.include_prompts {
        let files = named_texts(&skill.prompts, "prompt");
        category(out, &dir, "prompts", files);
    }

    if options.include_tool_implementations {
        let files = skill
            .tools
            .iter()
            .filter_map(|tool| {
                let blob = tool.implementation.as_ref().filter(|b| !b.content.trim().is_empty())?;
                let mut filename = safe_filename(&blob.filename);
                if filename.is_empty() {
                    filename = format!("{}.py", slugify(&tool.name).replace('-', "_"));
                }
                Some(ExportedFile::encoded(filename, blob.content.clone(), blob.binary))
            })
            .collect();
        category(out, &dir, "tools", files);
    }

    if options.include_examples {
        let files = named_texts(&skill.examples, "example");
        category(out, &dir, "examples", files);
    }

    if options.include_templates {
        let files = skill
            .templates
            .iter()
            .filter(|blob| !blob.content.trim().is_empty())
            .filter_map(|blob| {
                let filename = safe_filename(&blob.filename);
                (!filename.is_empty()).then(|| ExportedFile::encoded(filename, blob.content.clone(), blob.binary))
            })
            .collect();
        category(out, &dir, "templates", files);
    }

    log::debug!("Laid out skill '{}' under {}", skill.name, dir);
}

/// `<name>.md` per text, falling back to `<kind>-<n>.md` for unusable names
fn named_texts(texts: &[crate::spec::NamedText], kind: &str) -> Vec<ExportedFile> {
    texts
        .iter()
        .enumerate()
        .filter(|(_, t)| !t.content.trim().is_empty())
        .map(|(i, t)| {
            let stem = slugify(&t.name);
            let stem = if stem.is_empty() { format!("{}-{}", kind, i + 1) } else { stem };
            ExportedFile::text(format!("{}.md", stem), t.content.clone())
        })
        .collect()
}

/// Files of one category under `<dir>/<name>/`, or a placeholder when empty
fn category(out: &mut FileSet, dir: &str, name: &str, files: Vec<ExportedFile>) {
    let category_dir = format!("{}/{}", dir, name);
    if files.is_empty() {
        out.push(ExportedFile::placeholder(&category_dir));
        return;
    }
    for file in files {
        out.push(file.nested_under(&category_dir));
    }
}

fn agent_markdown(spec: &AgentSpecification, root: &str, layouts: &[SkillLayout<'_>]) -> String {
    let created = spec.created_at.map(|t| t.to_rfc3339());
    let updated = spec.updated_at.map(|t| t.to_rfc3339());
    let mut frontmatter = Frontmatter::new()
        .field("name", spec.display_name())
        .field("identifier", root)
        .optional("version", spec.version.as_deref())
        .optional("autonomy", spec.autonomy_level.map(|a| a.as_str()));
    if !spec.tags.is_empty() {
        frontmatter = frontmatter.list("tags", &spec.tags);
    }
    let frontmatter = frontmatter
        .optional("created", created.as_deref())
        .optional("updated", updated.as_deref());

    let mut lines = vec![heading(1, display_or_root(spec, root))];

    if let Some(purpose) = spec.purpose.as_deref().filter(|p| !p.trim().is_empty()) {
        lines.extend([String::new(), heading(2, "Purpose"), String::new(), purpose.trim().to_string()]);
    }
    if let Some(role) = spec.role.as_deref().filter(|r| !r.trim().is_empty()) {
        lines.extend([String::new(), heading(2, "Role"), String::new(), role.trim().to_string()]);
    }

    lines.extend([
        String::new(),
        heading(2, "Operating Mode"),
        String::new(),
        autonomy_guidance(spec.autonomy_level).to_string(),
    ]);

    lines.extend([String::new(), heading(2, "Capabilities"), String::new()]);
    if spec.skills.is_empty() {
        lines.push("_No skills defined._".to_string());
    } else if layouts.is_empty() {
        for skill in &spec.skills {
            lines.push(capability_line(&md_inline(&skill.name), &skill.description));
        }
    } else {
        for layout in layouts {
            let link = format!("[{}]({}/SKILL.md)", md_inline(&layout.skill.name), layout.dir());
            lines.push(capability_line(&link, &layout.skill.description));
        }
    }

    if let Some(policy) = &spec.human_interaction {
        lines.extend([String::new(), heading(2, "Human Interaction"), String::new()]);
        lines.extend(render_human_interaction(policy));
    }

    if !spec.guardrails.is_empty() {
        lines.extend([String::new(), heading(2, "Guardrails"), String::new()]);
        lines.extend(render_guardrails(&spec.guardrails, 3));
    }

    if let Some(notes) = spec.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        lines.extend([String::new(), heading(2, "Notes"), String::new(), notes.trim().to_string()]);
    }

    format!("{}\n{}\n", frontmatter.render(), lines.join("\n"))
}

fn capability_line(label: &str, description: &str) -> String {
    let description = md_inline(description);
    if description.is_empty() {
        format!("- {}", label)
    } else {
        format!("- {}: {}", label, description)
    }
}

fn display_or_root<'a>(spec: &'a AgentSpecification, root: &'a str) -> &'a str {
    if spec.display_name().is_empty() { root } else { spec.display_name() }
}

#[derive(Serialize)]
struct AgentConfigDoc<'a> {
    agent: AgentSection<'a>,
    runtime: RuntimeDefaults,
    autonomy: AutonomySection,
    #[serde(skip_serializing_if = "Option::is_none")]
    human_interaction: Option<&'a HumanInteractionPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    collaboration: Option<&'a CollaborationProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    memory: Option<&'a MemoryConfiguration>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    guardrails: &'a [Guardrail],
    skills: Vec<SkillRef>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    tags: &'a [String],
}

#[derive(Serialize)]
struct AgentSection<'a> {
    name: &'a str,
    identifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    purpose: Option<&'a str>,
}

#[derive(Serialize)]
struct RuntimeDefaults {
    model: &'static str,
    temperature: f32,
    max_tokens: u32,
    timeout_seconds: u32,
}

impl Default for RuntimeDefaults {
    fn default() -> Self {
        Self {
            model: "default",
            temperature: 0.7,
            max_tokens: 4096,
            timeout_seconds: 300,
        }
    }
}

#[derive(Serialize)]
struct AutonomySection {
    level: &'static str,
    guidance: &'static str,
}

#[derive(Serialize)]
struct SkillRef {
    name: String,
    slug: String,
    path: String,
}

fn agent_config(spec: &AgentSpecification, layouts: &[SkillLayout<'_>], warnings: &mut Vec<String>) -> String {
    let skills = if layouts.is_empty() {
        spec.skills
            .iter()
            .map(|s| SkillRef {
                name: s.name.clone(),
                slug: slugify(&s.name),
                path: String::new(),
            })
            .collect()
    } else {
        layouts
            .iter()
            .map(|l| SkillRef {
                name: l.skill.name.clone(),
                slug: l.slug.clone(),
                path: format!("{}/SKILL.md", l.dir()),
            })
            .collect()
    };

    let doc = AgentConfigDoc {
        agent: AgentSection {
            name: spec.display_name(),
            identifier: root_directory_name(spec),
            version: spec.version.as_deref(),
            role: spec.role.as_deref(),
            purpose: spec.purpose.as_deref(),
        },
        runtime: RuntimeDefaults::default(),
        autonomy: AutonomySection {
            level: spec.autonomy_level.map(|a| a.as_str()).unwrap_or("collaborative"),
            guidance: autonomy_guidance(spec.autonomy_level),
        },
        human_interaction: spec.human_interaction.as_ref(),
        collaboration: spec.collaboration.as_ref(),
        memory: spec.memory.as_ref(),
        guardrails: &spec.guardrails,
        skills,
        tags: &spec.tags,
    };
    to_yaml("config.yaml", &doc, warnings)
}

#[derive(Serialize)]
struct SkillConfigDoc<'a> {
    name: &'a str,
    slug: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    description: &'a str,
    acquisition: &'static str,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    triggers: &'a [Trigger],
    #[serde(skip_serializing_if = "Option::is_none")]
    behavior: Option<&'a Behavior>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning: Option<&'a Reasoning>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolEntry<'a>>,
    success_conditions: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure_handling: Option<&'a FailureHandling>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    guardrails: &'a [Guardrail],
}

#[derive(Serialize)]
struct ToolEntry<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    purpose: &'a str,
    permissions: &'a [Permission],
    required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    implementation: Option<String>,
}

fn skill_config(layout: &SkillLayout<'_>, warnings: &mut Vec<String>) -> String {
    let skill = layout.skill;
    let doc = SkillConfigDoc {
        name: &skill.name,
        slug: &layout.slug,
        description: skill.description.trim(),
        acquisition: skill.acquisition_mode.as_str(),
        triggers: &skill.triggers,
        behavior: skill.behavior.as_ref(),
        reasoning: skill.reasoning.as_ref(),
        tools: skill
            .tools
            .iter()
            .map(|t| ToolEntry {
                name: &t.name,
                purpose: t.purpose.trim(),
                permissions: &t.permissions,
                required: t.required,
                implementation: t
                    .implementation
                    .as_ref()
                    .map(|b| safe_filename(&b.filename))
                    .filter(|f| !f.is_empty())
                    .map(|f| format!("tools/{}", f)),
            })
            .collect(),
        success_conditions: &skill.acceptance.success_conditions,
        timeout: skill.acceptance.timeout.as_deref(),
        failure_handling: skill.failure_handling.as_ref(),
        guardrails: &skill.guardrails,
    };
    to_yaml(&format!("{}/config.yaml", layout.dir()), &doc, warnings)
}

#[derive(Serialize)]
struct MemoryConfigDoc<'a> {
    short_term: MemoryTier<'a>,
    long_term: MemoryTier<'a>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    stores: &'a [crate::spec::PersistentStore],
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    learning: &'a [LearningConfig],
}

#[derive(Serialize)]
struct MemoryTier<'a> {
    path: &'static str,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    items: &'a [String],
}

fn memory_config(spec: &AgentSpecification, warnings: &mut Vec<String>) -> String {
    let memory = spec.memory.clone().unwrap_or_default();
    let doc = MemoryConfigDoc {
        short_term: MemoryTier {
            path: "memory/short-term",
            items: &memory.working,
        },
        long_term: MemoryTier {
            path: "memory/long-term",
            items: &[],
        },
        stores: &memory.persistent,
        learning: &memory.learning,
    };
    to_yaml("memory/config.yaml", &doc, warnings)
}

fn to_yaml<T: Serialize>(path: &str, value: &T, warnings: &mut Vec<String>) -> String {
    match serde_yaml::to_string(value) {
        Ok(yaml) => yaml,
        Err(err) => {
            warnings.push(format!("failed to serialize {}: {}", path, err));
            String::new()
        }
    }
}

const TOOLS_BASE: &str = r#""""Base class for agent tools."""

from abc import ABC, abstractmethod
from typing import Any


class BaseTool(ABC):
    """Common interface for the tools this agent can call."""

    name: str = ""
    description: str = ""

    @abstractmethod
    def run(self, **kwargs: Any) -> Any:
        """Execute the tool and return its result."""
        raise NotImplementedError
"#;

fn tools_init(spec: &AgentSpecification) -> String {
    format!(
        "\"\"\"Shared tools for {}.\"\"\"\n\nfrom .base import BaseTool\n\n__all__ = [\"BaseTool\"]\n",
        python_docstring(spec.display_name())
    )
}

fn system_prompt(spec: &AgentSpecification, purpose: &str) -> String {
    let mut lines = vec![
        heading(1, "System Prompt"),
        String::new(),
        format!("You are {}. {}", md_inline(spec.display_name()), purpose.trim()),
    ];
    if let Some(role) = spec.role.as_deref().filter(|r| !r.trim().is_empty()) {
        lines.extend([String::new(), format!("Your role: {}", role.trim())]);
    }
    lines.extend([String::new(), autonomy_guidance(spec.autonomy_level).to_string()]);
    lines.join("\n") + "\n"
}

fn readme(spec: &AgentSpecification, root: &str, layouts: &[SkillLayout<'_>], paths: &[&str]) -> String {
    let mut lines = vec![heading(1, display_or_root(spec, root))];
    if let Some(purpose) = spec.purpose.as_deref().filter(|p| !p.trim().is_empty()) {
        lines.extend([String::new(), purpose.trim().to_string()]);
    }

    lines.extend([
        String::new(),
        heading(2, "Quick Start"),
        String::new(),
        "1. Read `agent.md` for the agent's identity, operating mode and guardrails.".to_string(),
        "2. Review `config.yaml` and adjust the runtime defaults for your environment.".to_string(),
        "3. Load the skills under `skills/` into any runtime that understands `SKILL.md`.".to_string(),
    ]);

    lines.extend([
        String::new(),
        heading(2, "Directory Structure"),
        String::new(),
        "```".to_string(),
        format!("{}/", root),
    ]);
    lines.extend(render_tree(paths));
    lines.push("```".to_string());

    if !layouts.is_empty() {
        lines.extend([
            String::new(),
            heading(2, "Skills"),
            String::new(),
            "| Skill | Slug | Description |".to_string(),
            "|-------|------|-------------|".to_string(),
        ]);
        for layout in layouts {
            lines.push(format!(
                "| {} | `{}` | {} |",
                md_cell(&layout.skill.name),
                layout.slug,
                md_cell(&layout.skill.description)
            ));
        }
    }

    lines.join("\n") + "\n"
}

#[derive(Default)]
struct TreeNode {
    children: BTreeMap<String, TreeNode>,
}

impl TreeNode {
    fn insert(&mut self, path: &str) {
        let mut node = self;
        for part in path.split('/') {
            node = node.children.entry(part.to_string()).or_default();
        }
    }

    fn render(&self, prefix: &str, lines: &mut Vec<String>) {
        let count = self.children.len();
        for (i, (name, child)) in self.children.iter().enumerate() {
            let last = i + 1 == count;
            let branch = if last { "└── " } else { "├── " };
            if child.children.is_empty() {
                lines.push(format!("{}{}{}", prefix, branch, name));
            } else {
                lines.push(format!("{}{}{}/", prefix, branch, name));
                let extension = if last { "    " } else { "│   " };
                child.render(&format!("{}{}", prefix, extension), lines);
            }
        }
    }
}

/// Box-drawing tree of relative paths, sorted by name
fn render_tree(paths: &[&str]) -> Vec<String> {
    let mut root = TreeNode::default();
    for path in paths {
        root.insert(path);
    }
    let mut lines = Vec::new();
    root.render("", &mut lines);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{Acceptance, FileBlob, NamedText, Tool};

    fn skill(name: &str) -> Skill {
        Skill {
            name: name.to_string(),
            description: format!("{} things", name),
            acceptance: Acceptance {
                success_conditions: vec!["Done".to_string()],
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn spec_with(skills: Vec<Skill>) -> AgentSpecification {
        AgentSpecification {
            name: "Helper Bot".to_string(),
            purpose: Some("Help with things".to_string()),
            skills,
            ..Default::default()
        }
    }

    fn paths(export: &FilesystemExport) -> Vec<&str> {
        export.files.iter().map(|f| f.path.as_str()).collect()
    }

    #[test]
    fn test_root_directory_name() {
        let mut spec = spec_with(vec![]);
        assert_eq!(root_directory_name(&spec), "helper-bot");
        spec.identifier = Some("  custom-id ".to_string());
        assert_eq!(root_directory_name(&spec), "custom-id");
        spec.identifier = Some("Team/Agent".to_string());
        assert_eq!(root_directory_name(&spec), "team-agent");
        spec.identifier = Some("???".to_string());
        assert_eq!(root_directory_name(&spec), "helper-bot");
        let empty = AgentSpecification::default();
        assert_eq!(root_directory_name(&empty), DEFAULT_ROOT);
    }

    #[test]
    fn test_invalid_identifier_warns() {
        let mut spec = spec_with(vec![]);
        spec.identifier = Some("My Agent".to_string());
        let export = export_specification(&spec, &ExportOptions::default());
        assert_eq!(export.root_directory_name, "my-agent");
        assert!(export.warnings.iter().any(|w| w.contains("'My Agent' is not a valid slug")));
        assert!(export.get("agent.md").unwrap().content.contains("identifier: my-agent\n"));

        spec.identifier = Some("my-agent".to_string());
        let export = export_specification(&spec, &ExportOptions::default());
        assert!(export.warnings.iter().all(|w| !w.contains("not a valid slug")));
    }

    #[test]
    fn test_default_layout() {
        let export = export_specification(&spec_with(vec![skill("Summarize")]), &ExportOptions::default());
        let paths = paths(&export);
        assert_eq!(&paths[..3], &["agent.md", "config.yaml", "README.md"]);
        for expected in [
            "skills/summarize/SKILL.md",
            "skills/summarize/config.yaml",
            "skills/summarize/prompts/.gitkeep",
            "skills/summarize/tools/.gitkeep",
            "skills/summarize/examples/.gitkeep",
            "skills/summarize/templates/.gitkeep",
            "memory/config.yaml",
            "memory/short-term/.gitkeep",
            "memory/long-term/.gitkeep",
        ] {
            assert!(paths.contains(&expected), "missing {}", expected);
        }
        assert!(!paths.iter().any(|p| p.starts_with("logs/") || p.starts_with("tools/")));
        assert_eq!(export.skill_count, 1);
        assert_eq!(export.total_files, export.files.len());
        assert_eq!(
            export.estimated_size_bytes,
            export.files.iter().map(|f| f.content.len()).sum::<usize>()
        );
    }

    #[test]
    fn test_optional_sections() {
        let options = ExportOptions {
            include_readme: false,
            include_memory_structure: false,
            include_shared_tools: true,
            include_logs: true,
            ..Default::default()
        };
        let export = export_specification(&spec_with(vec![]), &options);
        let paths = paths(&export);
        assert!(!paths.contains(&"README.md"));
        assert!(!paths.iter().any(|p| p.starts_with("memory/")));
        assert!(paths.contains(&"tools/__init__.py"));
        assert!(paths.contains(&"tools/base.py"));
        assert!(paths.contains(&"tools/system_prompt.md"));
        assert!(paths.contains(&"logs/.gitkeep"));
        assert_eq!(export.skill_count, 0);
    }

    #[test]
    fn test_system_prompt_needs_purpose() {
        let mut spec = spec_with(vec![]);
        spec.purpose = None;
        let options = ExportOptions {
            include_shared_tools: true,
            ..Default::default()
        };
        let export = export_specification(&spec, &options);
        assert!(export.get("tools/base.py").is_some());
        assert!(export.get("tools/system_prompt.md").is_none());
    }

    #[test]
    fn test_skill_assets() {
        let mut s = skill("Research");
        s.prompts = vec![NamedText {
            name: "Deep Dive".to_string(),
            content: "Go deep".to_string(),
        }];
        s.tools = vec![Tool {
            name: "Web Search".to_string(),
            purpose: "Search".to_string(),
            permissions: vec![],
            required: true,
            implementation: Some(FileBlob {
                filename: "../search.py".to_string(),
                content: "def search(): ...".to_string(),
                binary: false,
            }),
        }];
        s.templates = vec![FileBlob {
            filename: "report.md".to_string(),
            content: "# Report".to_string(),
            binary: false,
        }];

        let export = export_specification(&spec_with(vec![s]), &ExportOptions::default());
        let paths = paths(&export);
        assert!(paths.contains(&"skills/research/prompts/deep-dive.md"));
        assert!(paths.contains(&"skills/research/tools/-search.py"));
        assert!(paths.contains(&"skills/research/templates/report.md"));
        assert!(paths.contains(&"skills/research/examples/.gitkeep"));
        assert!(paths.iter().all(|p| crate::export::is_safe_relative_path(p)));

        let config = &export.get("skills/research/config.yaml").unwrap().content;
        assert!(config.contains("implementation: tools/-search.py"));
    }

    #[test]
    fn test_disabled_categories_emit_nothing() {
        let options = ExportOptions {
            include_prompts: false,
            include_tool_implementations: false,
            include_examples: false,
            include_templates: false,
            ..Default::default()
        };
        let export = export_specification(&spec_with(vec![skill("Plan")]), &options);
        let skill_files: Vec<_> = paths(&export).into_iter().filter(|p| p.starts_with("skills/")).collect();
        assert_eq!(skill_files, vec!["skills/plan/SKILL.md", "skills/plan/config.yaml"]);
    }

    #[test]
    fn test_slug_collision_suffixed() {
        let export = export_specification(
            &spec_with(vec![skill("Report"), skill("report"), skill("REPORT")]),
            &ExportOptions::default(),
        );
        let paths = paths(&export);
        assert!(paths.contains(&"skills/report/SKILL.md"));
        assert!(paths.contains(&"skills/report-2/SKILL.md"));
        assert!(paths.contains(&"skills/report-3/SKILL.md"));
        assert!(export.get("skills/report-2/SKILL.md").unwrap().content.contains("name: report-2"));
        assert_eq!(
            export.warnings.iter().filter(|w| w.contains("already used")).count(),
            2
        );
    }

    #[test]
    fn test_pack_failure_falls_back() {
        let mut bad = skill("Broken Skill");
        bad.portability = Some(Portability {
            slug: Some("Not Valid".to_string()),
            ..Default::default()
        });
        let export = export_specification(&spec_with(vec![bad]), &ExportOptions::default());
        let fallback = export.get("skills/not-valid/SKILL.md").unwrap();
        assert!(fallback.content.starts_with("---\nname: not-valid\n"));
        assert!(fallback.content.contains("could not be fully packaged"));
        assert!(export.warnings.iter().any(|w| w.contains("Broken Skill")));
        assert_eq!(export.skill_count, 1);
    }

    #[test]
    fn test_strict_slugs_fallback() {
        let options = ExportOptions {
            generate_missing_slugs: false,
            ..Default::default()
        };
        let export = export_specification(&spec_with(vec![skill("Summarize")]), &options);
        assert!(export.get("skills/summarize/SKILL.md").is_some());
        assert!(export.warnings.iter().any(|w| w.contains("slug generation is disabled")));
    }

    #[test]
    fn test_strict_slugs_collision_keeps_fallback() {
        let mut first = skill("Report");
        first.portability = Some(Portability {
            slug: Some("report".to_string()),
            ..Default::default()
        });
        let options = ExportOptions {
            generate_missing_slugs: false,
            ..Default::default()
        };
        let export = export_specification(&spec_with(vec![first, skill("Report")]), &options);

        let packed = &export.get("skills/report/SKILL.md").unwrap().content;
        assert!(!packed.contains("could not be fully packaged"));

        let fallback = &export.get("skills/report-2/SKILL.md").unwrap().content;
        assert!(fallback.starts_with("---\nname: report-2\n"));
        assert!(fallback.contains("could not be fully packaged"));
        assert!(!fallback.contains("acquisition"));
        assert!(export.warnings.iter().any(|w| w.contains("wrote a minimal SKILL.md")));
        assert!(export.warnings.iter().any(|w| w.contains("exported as 'report-2'")));
    }

    #[test]
    fn test_invalid_slug_collision_keeps_fallback() {
        let mut bad = skill("Summarize Again");
        bad.portability = Some(Portability {
            slug: Some("Summarize".to_string()),
            ..Default::default()
        });
        let export = export_specification(&spec_with(vec![skill("Summarize"), bad]), &ExportOptions::default());
        let fallback = &export.get("skills/summarize-2/SKILL.md").unwrap().content;
        assert!(fallback.starts_with("---\nname: summarize-2\n"));
        assert!(fallback.contains("could not be fully packaged"));
    }

    #[test]
    fn test_agent_markdown_links_skills() {
        let mut spec = spec_with(vec![skill("Summarize")]);
        spec.notes = Some("Internal use only".to_string());
        let export = export_specification(&spec, &ExportOptions::default());
        let agent = &export.get("agent.md").unwrap().content;
        assert!(agent.starts_with("---\nname: Helper Bot\nidentifier: helper-bot\n"));
        assert!(agent.contains("## Purpose\n\nHelp with things"));
        assert!(agent.contains("- [Summarize](skills/summarize/SKILL.md): Summarize things"));
        assert!(agent.contains("## Notes\n\nInternal use only"));
    }

    #[test]
    fn test_config_yaml_parses() {
        let export = export_specification(&spec_with(vec![skill("Summarize")]), &ExportOptions::default());
        let config: serde_yaml::Value = serde_yaml::from_str(&export.get("config.yaml").unwrap().content).unwrap();
        assert_eq!(config["agent"]["name"].as_str(), Some("Helper Bot"));
        assert_eq!(config["autonomy"]["level"].as_str(), Some("collaborative"));
        assert_eq!(config["skills"][0]["path"].as_str(), Some("skills/summarize/SKILL.md"));
        assert!(config.get("memory").is_none());

        let memory: serde_yaml::Value =
            serde_yaml::from_str(&export.get("memory/config.yaml").unwrap().content).unwrap();
        assert_eq!(memory["short_term"]["path"].as_str(), Some("memory/short-term"));
    }

    #[test]
    fn test_config_yaml_memory_without_memory_dir() {
        let mut spec = spec_with(vec![]);
        spec.memory = Some(MemoryConfiguration {
            working: vec!["Open incidents".to_string()],
            ..Default::default()
        });
        let options = ExportOptions {
            include_memory_structure: false,
            ..Default::default()
        };
        let export = export_specification(&spec, &options);
        assert!(export.get("memory/config.yaml").is_none());

        let config: serde_yaml::Value = serde_yaml::from_str(&export.get("config.yaml").unwrap().content).unwrap();
        assert_eq!(config["memory"]["working"][0].as_str(), Some("Open incidents"));
    }

    #[test]
    fn test_readme_tree() {
        let export = export_specification(&spec_with(vec![skill("Summarize")]), &ExportOptions::default());
        let readme = &export.get("README.md").unwrap().content;
        assert!(readme.contains("helper-bot/\n"));
        assert!(readme.contains("├── README.md"));
        assert!(readme.contains("    └── summarize/"));
        assert!(readme.contains("| Summarize | `summarize` | Summarize things |"));
    }

    #[test]
    fn test_render_tree_shape() {
        let lines = render_tree(&["b.md", "a/x.md", "a/y/z.md"]);
        assert_eq!(
            lines,
            vec!["├── a/", "│   ├── x.md", "│   └── y/", "│       └── z.md", "└── b.md"]
        );
    }
}
