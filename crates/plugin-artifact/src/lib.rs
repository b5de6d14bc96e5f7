#![forbid(unsafe_code)]

pub mod archive;
pub mod digest;
pub mod report;
pub mod size;

pub use archive::list_entries_with_extension;
pub use digest::sha256_file;
pub use report::{ArtifactReport, inspect};
pub use size::format_size;
