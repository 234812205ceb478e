//! Agent Story export pipeline
//!
//! Turns an [`AgentSpecification`](spec::AgentSpecification) into portable
//! skill packages, a self-contained agent directory (optionally archived),
//! and runtime-specific bundles for agent harnesses.

pub mod error;
pub mod escape;
pub mod export;
pub mod harness;
pub mod render;
pub mod skill;
pub mod slug;
pub mod spec;

pub use error::{ArchiveError, PackError};
pub use export::ExportedFile;
pub use export::filesystem::{ExportOptions, FilesystemExport, export_specification};
pub use harness::{AdapterRegistry, HarnessAdapter, HarnessOutput};
pub use spec::AgentSpecification;
