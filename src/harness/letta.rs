//! Letta adapter
//!
//! Letta agents are a system prompt, editable memory blocks and a set of
//! Python tools governed by tool rules. Each skill becomes one tool stub.

use serde_json::{Value, json};
use std::collections::HashSet;

use super::common::{
    InstructionStyle, baseline_compatibility, compose_instructions, python_identifier, python_type, skill_slugs,
};
use super::{Compatibility, HarnessAdapter, HarnessOutput, LaunchRecipe, TryItConfig};
use crate::escape::{md_inline, python_docstring};
use crate::export::ExportedFile;
use crate::export::filesystem::root_directory_name;
use crate::slug::to_snake;
use crate::spec::{AgentSpecification, Behavior, Skill, StoreType};

/// Default local Letta server
pub const LETTA_BASE_URL: &str = "http://localhost:8283";

/// Character limit given to every memory block
const BLOCK_LIMIT: u32 = 5000;

pub struct LettaAdapter;

impl HarnessAdapter for LettaAdapter {
    fn id(&self) -> &'static str {
        "letta"
    }

    fn name(&self) -> &'static str {
        "Letta"
    }

    fn description(&self) -> &'static str {
        "Stateful agent with memory blocks and Python tools for a Letta server"
    }

    fn icon(&self) -> Option<&'static str> {
        Some("brain")
    }

    fn url(&self) -> Option<&'static str> {
        Some("https://docs.letta.com")
    }

    fn can_export(&self, spec: &AgentSpecification) -> Compatibility {
        let mut compat = baseline_compatibility(spec);

        for store in spec.persistent_stores() {
            if matches!(store.store_type, StoreType::Vector | StoreType::Graph) {
                compat.unsupported(
                    format!("{} memory store '{}'", store.store_type.as_str(), store.name),
                    format!(
                        "Memory store '{}' ({}) maps to Letta archival memory, which is not a 1:1 equivalent",
                        store.name,
                        store.store_type.as_str()
                    ),
                );
            }
        }

        compat
    }

    fn generate(&self, spec: &AgentSpecification) -> HarnessOutput {
        let slugs = skill_slugs(spec);
        let mut files = vec![ExportedFile::text("agent.json", agent_json(spec, &slugs))];

        for (skill, slug) in spec.skills.iter().zip(&slugs) {
            let function = to_snake(slug);
            files.push(ExportedFile::text(
                format!("tools/{}.py", function),
                tool_stub(skill, &function),
            ));
        }

        files.push(ExportedFile::text(
            "create_agent.py",
            CREATE_AGENT.replace("__AGENT_NAME__", &python_docstring(display_name(spec))),
        ));

        let mut warnings = Vec::new();
        if !spec.skills.is_empty() {
            warnings.push(format!(
                "{} tool stub(s) in tools/ raise NotImplementedError until implemented",
                spec.skills.len()
            ));
        }

        HarnessOutput {
            files,
            warnings,
            instructions: [
                format!("Start a Letta server (default {}).", LETTA_BASE_URL),
                "Implement the tool stubs under tools/.".to_string(),
                "Run `python create_agent.py` to register the tools and create the agent.".to_string(),
            ]
            .join("\n"),
        }
    }

    fn try_it_config(&self, spec: &AgentSpecification) -> Option<TryItConfig> {
        let slugs = skill_slugs(spec);
        Some(TryItConfig {
            launch: LaunchRecipe::Api {
                method: "POST".to_string(),
                endpoint: format!("{}/v1/agents/", LETTA_BASE_URL),
                body: Some(agent_json(spec, &slugs)),
            },
            setup_instructions: vec![
                "Start a Letta server: docker run -p 8283:8283 letta/letta:latest".to_string(),
                "Register the tools under tools/ (create_agent.py does this for you)".to_string(),
            ],
        })
    }
}

fn display_name(spec: &AgentSpecification) -> &str {
    if spec.display_name().is_empty() { "Agent" } else { spec.display_name() }
}

fn agent_json(spec: &AgentSpecification, slugs: &[String]) -> String {
    let mut blocks = vec![
        json!({
            "label": "persona",
            "value": persona(spec),
            "limit": BLOCK_LIMIT,
        }),
        json!({
            "label": "human",
            "value": human(spec),
            "limit": BLOCK_LIMIT,
        }),
    ];
    let mut labels: HashSet<String> = ["persona", "human"].into_iter().map(String::from).collect();
    for (i, store) in spec.persistent_stores().iter().enumerate() {
        let base = python_identifier(&store.name, &format!("store_{}", i + 1));
        let base = if base == "persona" || base == "human" { format!("{}_store", base) } else { base };
        let mut label = base.clone();
        let mut n = 2;
        while labels.contains(&label) {
            label = format!("{}_{}", base, n);
            n += 1;
        }
        labels.insert(label.clone());
        let description = store
            .purpose
            .as_deref()
            .map(md_inline)
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| format!("{} store ({} updates)", store.store_type.as_str(), store.updates.as_str()));
        blocks.push(json!({
            "label": label,
            "value": "",
            "description": description,
            "limit": BLOCK_LIMIT,
        }));
    }

    let mut tools = vec![Value::from("send_message")];
    let mut rules = Vec::new();
    for (skill, slug) in spec.skills.iter().zip(slugs) {
        let function = to_snake(slug);
        if let Some(Behavior::Iterative {
            max_iterations: Some(max),
            ..
        }) = &skill.behavior
        {
            rules.push(json!({
                "tool_name": function,
                "type": "max_count_per_step",
                "max_count_limit": max,
            }));
        }
        tools.push(Value::from(function));
    }
    rules.push(json!({
        "tool_name": "send_message",
        "type": "exit_loop",
    }));

    let agent = json!({
        "name": root_directory_name(spec),
        "description": spec.purpose.as_deref().map(md_inline).unwrap_or_default(),
        "agent_type": "memgpt_agent",
        "system": compose_instructions(spec, &InstructionStyle::default()),
        "memory_blocks": blocks,
        "tools": tools,
        "tool_rules": rules,
        "tags": spec.tags,
        "metadata": {
            "generator": "agentstory",
            "generator_version": env!("CARGO_PKG_VERSION"),
        },
    });

    serde_json::to_string_pretty(&agent).unwrap_or_default() + "\n"
}

fn persona(spec: &AgentSpecification) -> String {
    let mut parts = vec![format!("I am {}.", md_inline(display_name(spec)))];
    if let Some(purpose) = spec.purpose.as_deref().filter(|p| !p.trim().is_empty()) {
        parts.push(md_inline(purpose));
    }
    if let Some(role) = spec.role.as_deref().filter(|r| !r.trim().is_empty()) {
        parts.push(format!("My role: {}.", md_inline(role).trim_end_matches('.')));
    }
    parts.join(" ")
}

fn human(spec: &AgentSpecification) -> String {
    match &spec.human_interaction {
        Some(policy) => format!(
            "The person I work with. Interaction mode: {}. {}",
            policy.mode.as_str(),
            policy.mode.describe()
        ),
        None => "The person I work with. Nothing is known about them yet.".to_string(),
    }
}

/// Function stub with typed arguments and a Google-style docstring
fn tool_stub(skill: &Skill, function: &str) -> String {
    let mut args: Vec<(String, String, bool, String)> = Vec::new();
    for (i, input) in skill.inputs.iter().enumerate() {
        let mut name = python_identifier(&input.name, &format!("arg_{}", i + 1));
        if args.iter().any(|(existing, ..)| *existing == name) {
            name = format!("{}_{}", name, i + 1);
        }
        let description = md_inline(&input.description);
        let description = if description.is_empty() { format!("The {}.", md_inline(&input.name)) } else { description };
        args.push((name, python_type(&input.data_type).to_string(), input.required, description));
    }
    // required parameters must precede defaulted ones
    args.sort_by_key(|(_, _, required, _)| !*required);

    let return_type = match skill.outputs.as_slice() {
        [single] => python_type(&single.data_type),
        _ => "str",
    };
    let returns = if skill.outputs.is_empty() {
        "The result of the skill.".to_string()
    } else {
        skill
            .outputs
            .iter()
            .map(|o| {
                let description = md_inline(&o.description);
                if description.is_empty() { md_inline(&o.name) } else { format!("{}: {}", md_inline(&o.name), description) }
            })
            .collect::<Vec<_>>()
            .join("; ")
    };

    let signature: Vec<String> = args
        .iter()
        .map(|(name, ty, required, _)| {
            if *required { format!("{}: {}", name, ty) } else { format!("{}: Optional[{}] = None", name, ty) }
        })
        .collect();

    let summary = md_inline(&skill.description);
    let summary = if summary.is_empty() { md_inline(&skill.name) } else { summary };

    let mut out = String::new();
    if args.iter().any(|(_, _, required, _)| !required) {
        out.push_str("from typing import Optional\n\n\n");
    }
    out.push_str(&format!("def {}({}) -> {}:\n", function, signature.join(", "), return_type));
    out.push_str("    \"\"\"\n");
    out.push_str(&format!("    {}\n", python_docstring(&summary)));
    if !args.is_empty() {
        out.push_str("\n    Args:\n");
        for (name, ty, required, description) in &args {
            let ty = if *required { ty.clone() } else { format!("Optional[{}]", ty) };
            out.push_str(&format!("        {} ({}): {}\n", name, ty, python_docstring(description)));
        }
    }
    out.push_str("\n    Returns:\n");
    out.push_str(&format!("        {}: {}\n", return_type, python_docstring(&returns)));
    out.push_str("    \"\"\"\n");
    out.push_str(&format!(
        "    raise NotImplementedError(\"Connect {} to your implementation\")\n",
        function
    ));
    out
}

const CREATE_AGENT: &str = r#""""Create the __AGENT_NAME__ agent on a Letta server.

Usage:
    pip install letta-client
    python create_agent.py
"""

import json
import os
from pathlib import Path

from letta_client import Letta

HERE = Path(__file__).parent


def main() -> None:
    client = Letta(base_url=os.environ.get("LETTA_BASE_URL", "http://localhost:8283"))
    config = json.loads((HERE / "agent.json").read_text())

    tool_names = ["send_message"]
    for path in sorted((HERE / "tools").glob("*.py")):
        tool = client.tools.upsert(source_code=path.read_text())
        tool_names.append(tool.name)

    agent = client.agents.create(
        name=config["name"],
        description=config.get("description"),
        system=config["system"],
        memory_blocks=config["memory_blocks"],
        tools=tool_names,
        tool_rules=config["tool_rules"],
        tags=config.get("tags", []),
        model=os.environ.get("LETTA_MODEL", "openai/gpt-4o-mini"),
        embedding=os.environ.get("LETTA_EMBEDDING", "openai/text-embedding-3-small"),
    )
    print(f"Created agent {agent.name} ({agent.id})")


if __name__ == "__main__":
    main()
"#;
