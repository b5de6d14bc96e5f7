use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::{archive, digest, size};

/// Outcome of inspecting a packaged artifact.
///
/// Inspection is advisory: a missing or unreadable archive shows up in
/// `warnings` instead of failing the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactReport {
    pub path: PathBuf,
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_human: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    pub listed_entries: Vec<String>,
    pub warnings: Vec<String>,
}

impl ArtifactReport {
    fn missing(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            exists: false,
            size_bytes: None,
            size_human: None,
            sha256: None,
            listed_entries: Vec::new(),
            warnings: vec![format!("artifact not found at {}", path.display())],
        }
    }
}

/// Inspects the archive at `path`, listing entries that end with `extension`.
pub fn inspect(path: &Path, extension: &str) -> ArtifactReport {
    let metadata = match fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => metadata,
        _ => {
            warn!(path = %path.display(), "artifact not found");
            return ArtifactReport::missing(path);
        }
    };

    let size_bytes = metadata.len();
    let size_human = size::format_size(size_bytes);
    info!(path = %path.display(), size = %size_human, "found artifact");

    let mut warnings = Vec::new();

    let sha256 = match digest::sha256_file(path) {
        Ok(hex) => Some(hex),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to hash artifact");
            warnings.push(format!("failed to hash artifact: {err:#}"));
            None
        }
    };

    let listed_entries = match archive::list_entries_with_extension(path, extension) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "could not list archive contents");
            warnings.push(format!("could not list archive contents: {err:#}"));
            Vec::new()
        }
    };

    ArtifactReport {
        path: path.to_path_buf(),
        exists: true,
        size_bytes: Some(size_bytes),
        size_human: Some(size_human),
        sha256,
        listed_entries,
        warnings,
    }
}
