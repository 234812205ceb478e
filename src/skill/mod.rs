//! Portable skill packaging
//!
//! This module handles:
//! - Packaging a specification skill as a standalone `SKILL.md` directory
//! - Reading packaged frontmatter back for inspection
//!
//! # Packaged layout
//!
//! ```text
//! <slug>/
//! ├── SKILL.md
//! ├── scripts/      (optional)
//! └── references/   (optional)
//! ```

pub mod packager;
pub mod parser;

pub use packager::{MAX_DESCRIPTION_LEN, PackOptions, PackedSkill, pack_skill, resolve_slug};
pub use parser::{SkillMetadata, parse_frontmatter, parse_skill_md};
