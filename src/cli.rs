use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Output format for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    /// Resolve the effective output format.
    /// If user specified a format, use it.
    /// Otherwise: TTY → Text, non-TTY (pipe) → Json
    pub fn resolve(user_choice: Option<OutputFormat>) -> OutputFormat {
        match user_choice {
            Some(fmt) => fmt,
            None => {
                if std::io::stdout().is_terminal() {
                    OutputFormat::Text
                } else {
                    OutputFormat::Json
                }
            }
        }
    }
}

#[derive(Parser)]
#[command(
    name = "agentstory",
    about = "Export Agent Story specifications to skills, agent directories and agent harnesses",
    version = env!("CARGO_PKG_VERSION"),
    after_help = "Logs are written to: ~/.local/share/agentstory/logs/agentstory.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to agentstory.yaml config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, help = "Suppress non-error output")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export a specification as an agent directory and archive
    Export(ExportArgs),

    /// Export to agent harnesses (Claude Code, Letta, LangGraph, AGENTS.md)
    Harness {
        #[command(subcommand)]
        action: HarnessAction,
    },

    /// Package and inspect portable skills
    Skill {
        #[command(subcommand)]
        action: SkillAction,
    },

    /// Check a specification for problems
    Validate {
        /// Specification file (YAML or JSON)
        spec: PathBuf,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(clap::Args)]
pub struct ExportArgs {
    /// Specification file (YAML or JSON)
    pub spec: PathBuf,

    /// Output directory (default: output_dir from config, else .)
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Write <root>.tar.gz even if archives are disabled in config
    #[arg(long, conflicts_with = "no_archive")]
    pub archive: bool,

    /// Skip the archive
    #[arg(long)]
    pub no_archive: bool,

    /// Only write the archive, not the directory
    #[arg(long)]
    pub archive_only: bool,

    /// Leave out README.md
    #[arg(long)]
    pub no_readme: bool,

    /// Leave out skills/
    #[arg(long)]
    pub no_skills: bool,

    /// Include the shared tools/ directory
    #[arg(long)]
    pub shared_tools: bool,

    /// Include an empty logs/ directory
    #[arg(long)]
    pub logs: bool,

    /// Leave out memory/
    #[arg(long)]
    pub no_memory: bool,

    /// Fail a skill without a slug instead of deriving one
    #[arg(long)]
    pub strict_slugs: bool,

    /// Show what would be written without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Output format (default: text for TTY, json for pipes)
    #[arg(long, short = 'o', value_enum)]
    pub format: Option<OutputFormat>,
}

#[derive(Subcommand)]
pub enum HarnessAction {
    /// List registered harness adapters
    List {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Check a specification against every adapter
    Check {
        /// Specification file (YAML or JSON)
        spec: PathBuf,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Export to one or more harnesses
    Export {
        /// Specification file (YAML or JSON)
        spec: PathBuf,

        /// Adapter id (repeatable; default: config, else every compatible adapter)
        #[arg(long = "target", short = 't')]
        targets: Vec<String>,

        /// Output directory; each harness goes to <out>/<root>-<id>/
        #[arg(long)]
        out: Option<PathBuf>,

        /// Also write the specification as agent-story.json
        #[arg(long)]
        include_source: bool,

        /// Show what would be written without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Show how to launch an exported agent
    Try {
        /// Specification file (YAML or JSON)
        spec: PathBuf,

        /// Adapter id
        id: String,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },
}

#[derive(Subcommand)]
pub enum SkillAction {
    /// Print the SKILL.md for one skill
    Pack {
        /// Specification file (YAML or JSON)
        spec: PathBuf,

        /// Skill name or slug
        skill: String,

        /// Fail if the skill has no slug instead of deriving one
        #[arg(long)]
        strict_slugs: bool,
    },

    /// Parse the frontmatter of a SKILL.md
    Inspect {
        /// Path to SKILL.md
        path: PathBuf,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },
}
