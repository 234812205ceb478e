//! LangGraph adapter
//!
//! Generates a `StateGraph` with one node per skill. A keyword router picks
//! the node from the latest message; approval checkpoints become
//! `interrupt()` calls.

use serde_json::json;
use std::collections::HashSet;

use super::common::{
    InstructionStyle, all_guardrails, baseline_compatibility, compose_instructions, python_identifier, skill_slugs,
};
use super::{Compatibility, HarnessAdapter, HarnessOutput, LaunchRecipe, TryItConfig};
use crate::escape::{md_inline, python_docstring, python_string};
use crate::export::ExportedFile;
use crate::export::filesystem::root_directory_name;
use crate::render::render_behavior;
use crate::slug::to_snake;
use crate::spec::{AgentSpecification, Checkpoint, CollaborationRole, Skill};

/// Most keywords the router keeps per skill
const MAX_KEYWORDS: usize = 8;

const STOPWORDS: &[&str] = &[
    "about", "after", "also", "asks", "from", "have", "into", "like", "make", "more", "please", "should", "some",
    "than", "that", "their", "them", "then", "there", "this", "user", "wants", "what", "when", "where", "which",
    "will", "with", "would", "your",
];

pub struct LangGraphAdapter;

impl HarnessAdapter for LangGraphAdapter {
    fn id(&self) -> &'static str {
        "langgraph"
    }

    fn name(&self) -> &'static str {
        "LangGraph"
    }

    fn description(&self) -> &'static str {
        "Python StateGraph with a node per skill, runnable with `langgraph dev`"
    }

    fn icon(&self) -> Option<&'static str> {
        Some("graph")
    }

    fn url(&self) -> Option<&'static str> {
        Some("https://langchain-ai.github.io/langgraph/")
    }

    fn can_export(&self, spec: &AgentSpecification) -> Compatibility {
        let mut compat = baseline_compatibility(spec);

        if let Some(collab) = &spec.collaboration
            && (collab.role == CollaborationRole::Peer || !collab.peers.is_empty())
        {
            compat.unsupported(
                "peer collaboration",
                "Peer agents are not modeled; each peer must be deployed as its own graph and wired up by hand",
            );
        }

        let advisory = spec
            .human_interaction
            .as_ref()
            .map(|p| p.checkpoints.iter().filter(|c| !c.action.is_blocking()).count())
            .unwrap_or(0);
        if advisory > 0 {
            compat.warn(format!(
                "{} review/notify checkpoint(s) are kept as instructions; only approval and input checkpoints interrupt the graph",
                advisory
            ));
        }

        compat
    }

    fn generate(&self, spec: &AgentSpecification) -> HarnessOutput {
        let graph_name = to_snake(&root_directory_name(spec));
        let langgraph_json = json!({
            "dependencies": ["."],
            "graphs": { graph_name.clone(): "./agent.py:graph" },
            "env": ".env",
            "python_version": "3.11",
        });

        let files = vec![
            ExportedFile::text("agent.py", agent_py(spec)),
            ExportedFile::text(
                "langgraph.json",
                serde_json::to_string_pretty(&langgraph_json).unwrap_or_default() + "\n",
            ),
            ExportedFile::text("requirements.txt", REQUIREMENTS),
            ExportedFile::text(".env.example", ENV_EXAMPLE),
        ];

        HarnessOutput {
            files,
            warnings: Vec::new(),
            instructions: [
                "pip install -r requirements.txt".to_string(),
                "cp .env.example .env and fill in your API keys".to_string(),
                format!("langgraph dev  (serves the '{}' graph)", graph_name),
            ]
            .join("\n"),
        }
    }

    fn try_it_config(&self, _spec: &AgentSpecification) -> Option<TryItConfig> {
        Some(TryItConfig {
            launch: LaunchRecipe::Command {
                command: "langgraph dev".to_string(),
            },
            setup_instructions: vec![
                "pip install -r requirements.txt".to_string(),
                "Copy .env.example to .env and set MODEL and the provider API key".to_string(),
            ],
        })
    }
}

/// A graph node generated for one skill
struct Node<'a> {
    skill: &'a Skill,
    name: String,
    keywords: Vec<String>,
}

fn nodes(spec: &AgentSpecification) -> Vec<Node<'_>> {
    spec.skills
        .iter()
        .zip(skill_slugs(spec))
        .map(|(skill, slug)| Node {
            skill,
            name: to_snake(&slug),
            keywords: keywords(skill),
        })
        .collect()
}

/// Routing keywords from trigger text, falling back to the skill name
fn keywords(skill: &Skill) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let text = skill
        .triggers
        .iter()
        .flat_map(|t| std::iter::once(&t.description).chain(&t.conditions).chain(&t.examples))
        .map(String::as_str);
    let mut words: Vec<String> = extract_words(text, &mut seen);
    if words.is_empty() {
        words = extract_words(std::iter::once(skill.name.as_str()), &mut seen);
    }
    words.truncate(MAX_KEYWORDS);
    words
}

fn extract_words<'a>(text: impl Iterator<Item = &'a str>, seen: &mut HashSet<String>) -> Vec<String> {
    text.flat_map(|t| t.split(|c: char| !c.is_alphanumeric()))
        .map(str::to_lowercase)
        .filter(|w| w.chars().count() >= 4 && !STOPWORDS.contains(&w.as_str()))
        .filter(|w| seen.insert(w.clone()))
        .collect()
}

fn blocking_checkpoints(spec: &AgentSpecification) -> Vec<&Checkpoint> {
    spec.human_interaction
        .as_ref()
        .map(|p| p.checkpoints.iter().filter(|c| c.action.is_blocking()).collect())
        .unwrap_or_default()
}

fn skill_instructions(skill: &Skill) -> String {
    let mut lines = vec![format!("Skill: {}", md_inline(&skill.name))];
    if !skill.description.trim().is_empty() {
        lines.push(md_inline(&skill.description));
    }
    if let Some(behavior) = &skill.behavior {
        lines.push(String::new());
        lines.extend(render_behavior(behavior, 3));
    }
    if !skill.acceptance.success_conditions.is_empty() {
        lines.push(String::new());
        lines.push("Done when:".to_string());
        lines.extend(skill.acceptance.success_conditions.iter().map(|c| format!("- {}", md_inline(c))));
    }
    lines.join("\n")
}

fn agent_py(spec: &AgentSpecification) -> String {
    let name = if spec.display_name().is_empty() { "Agent" } else { spec.display_name() };
    let nodes = nodes(spec);
    let checkpoints = blocking_checkpoints(spec);
    let mut out = String::new();

    out.push_str(&format!(
        "\"\"\"LangGraph agent for {}.\n\nRun with `langgraph dev`.\n\"\"\"\n\n",
        python_docstring(name)
    ));
    out.push_str("import os\nfrom typing import Annotated, TypedDict\n\n");
    out.push_str("from langchain.chat_models import init_chat_model\n");
    out.push_str("from langchain_core.messages import AIMessage, AnyMessage, SystemMessage\n");
    out.push_str("from langgraph.graph import END, START, StateGraph\n");
    out.push_str("from langgraph.graph.message import add_messages\n");
    if !checkpoints.is_empty() {
        out.push_str("from langgraph.types import interrupt\n");
    }
    out.push('\n');

    let prompt = compose_instructions(spec, &InstructionStyle::default());
    out.push_str(&format!("SYSTEM_PROMPT = {}\n\n", python_string(prompt.trim_end())));

    out.push_str("GUARDRAILS = [\n");
    for guardrail in all_guardrails(spec) {
        let rule = format!("{}: {}", md_inline(&guardrail.name), md_inline(&guardrail.constraint));
        out.push_str(&format!("    {},\n", python_string(&rule)));
    }
    out.push_str("]\n\n");

    if !checkpoints.is_empty() {
        out.push_str("CHECKPOINTS = [\n");
        for checkpoint in &checkpoints {
            out.push_str(&format!(
                "    {{\"name\": {}, \"trigger\": {}, \"action\": {}}},\n",
                python_string(&checkpoint.name),
                python_string(&checkpoint.trigger),
                python_string(checkpoint.action.as_str())
            ));
        }
        out.push_str("]\n\n");
    }

    out.push_str("SKILL_KEYWORDS = {\n");
    for node in &nodes {
        let keywords: Vec<String> = node.keywords.iter().map(|k| python_string(k)).collect();
        out.push_str(&format!("    {}: [{}],\n", python_string(&node.name), keywords.join(", ")));
    }
    out.push_str("}\n\n");

    let default_node = nodes.first().map(|n| n.name.clone()).unwrap_or_else(|| "respond".to_string());
    out.push_str(&format!("DEFAULT_SKILL = {}\n\n", python_string(&default_node)));
    out.push_str("model = init_chat_model(os.environ.get(\"MODEL\", \"openai:gpt-4o-mini\"))\n\n\n");

    out.push_str(GRAPH_HELPERS);
    if !checkpoints.is_empty() {
        out.push_str(APPROVAL_HELPER);
    }

    if nodes.is_empty() {
        out.push_str(&node_function("respond", "Answer the user directly.", "Respond", false));
    }
    for node in &nodes {
        let summary = md_inline(&node.skill.description);
        let summary = if summary.is_empty() { md_inline(&node.skill.name) } else { summary };
        out.push_str(&node_function(
            &node.name,
            &skill_instructions(node.skill),
            &summary,
            !checkpoints.is_empty(),
        ));
    }

    let node_names: Vec<String> = if nodes.is_empty() {
        vec!["respond".to_string()]
    } else {
        nodes.iter().map(|n| n.name.clone()).collect()
    };
    out.push_str("builder = StateGraph(AgentState)\n");
    for node in &node_names {
        let function = python_identifier(node, "respond");
        out.push_str(&format!(
            "builder.add_node({}, skill_{})\n",
            python_string(node),
            function
        ));
    }
    let quoted: Vec<String> = node_names.iter().map(|n| python_string(n)).collect();
    out.push_str(&format!(
        "builder.add_conditional_edges(START, route, [{}])\n",
        quoted.join(", ")
    ));
    for node in &quoted {
        out.push_str(&format!("builder.add_edge({}, END)\n", node));
    }
    out.push_str("\ngraph = builder.compile()\n");

    out
}

fn node_function(name: &str, instructions: &str, summary: &str, approval: bool) -> String {
    let function = python_identifier(name, "respond");
    let mut out = format!(
        "def skill_{}(state: AgentState) -> dict:\n    \"\"\"{}\"\"\"\n",
        function,
        python_docstring(summary)
    );
    if approval {
        out.push_str(&format!(
            "    if not approved({}):\n        return {{\"messages\": [AIMessage(content=\"Stopped: a checkpoint was not approved.\")], \"skill\": {}}}\n",
            python_string(name),
            python_string(name)
        ));
    }
    out.push_str(&format!("    instructions = {}\n", python_string(instructions)));
    out.push_str("    response = model.invoke([system_message(instructions), *state[\"messages\"]])\n");
    out.push_str(&format!(
        "    return {{\"messages\": [response], \"skill\": {}}}\n\n\n",
        python_string(name)
    ));
    out
}

const GRAPH_HELPERS: &str = r#"class AgentState(TypedDict):
    messages: Annotated[list[AnyMessage], add_messages]
    skill: str


def system_message(instructions: str) -> SystemMessage:
    content = SYSTEM_PROMPT + "\n\n" + instructions
    if GUARDRAILS:
        content += "\n\nGuardrails:\n" + "\n".join(f"- {rule}" for rule in GUARDRAILS)
    return SystemMessage(content=content)


def route(state: AgentState) -> str:
    text = str(state["messages"][-1].content).lower() if state["messages"] else ""
    for skill, keywords in SKILL_KEYWORDS.items():
        if any(keyword in text for keyword in keywords):
            return skill
    return DEFAULT_SKILL


"#;

const APPROVAL_HELPER: &str = r#"def approved(skill: str) -> bool:
    for checkpoint in CHECKPOINTS:
        decision = interrupt({"skill": skill, **checkpoint})
        if decision not in (True, "approve", "approved", "yes"):
            return False
    return True


"#;

const REQUIREMENTS: &str = "langgraph>=0.3\nlangchain>=0.3\nlangchain-openai>=0.3\nlanggraph-cli[inmem]>=0.2\n";

const ENV_EXAMPLE: &str = "# Chat model passed to init_chat_model, as <provider>:<model>
MODEL=openai:gpt-4o-mini
OPENAI_API_KEY=
# Optional: trace runs in LangSmith
LANGSMITH_API_KEY=
";
