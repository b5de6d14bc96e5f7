//! `PluginVersion` extraction from the project descriptor.
//!
//! The descriptor is expected to be well-formed XML, but a text pattern
//! fallback keeps the build going when it is not.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::BuildError;

const ELEMENT: &str = "PluginVersion";

static TAG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<PluginVersion>([^<]*)</PluginVersion>").expect("static pattern compiles")
});

/// Result of a single extraction attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Found(String),
    Missing,
    Malformed(String),
}

/// Extraction strategies, tried in order until one finds a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Structured,
    Pattern,
}

pub const STRATEGIES: [Strategy; 2] = [Strategy::Structured, Strategy::Pattern];

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Structured => "structured",
            Self::Pattern => "pattern",
        }
    }

    pub fn extract(&self, text: &str) -> Outcome {
        match self {
            Self::Structured => structured(text),
            Self::Pattern => pattern(text),
        }
    }
}

fn structured(text: &str) -> Outcome {
    let document = match roxmltree::Document::parse(text.trim_start_matches('\u{feff}')) {
        Ok(document) => document,
        Err(err) => return Outcome::Malformed(err.to_string()),
    };

    document
        .descendants()
        .filter(|node| node.is_element() && node.tag_name().name().eq_ignore_ascii_case(ELEMENT))
        .map(|element| {
            let value: String = element
                .descendants()
                .filter(|node| node.is_text())
                .filter_map(|node| node.text())
                .collect();
            non_empty(&value)
        })
        .find(|outcome| matches!(outcome, Outcome::Found(_)))
        .unwrap_or(Outcome::Missing)
}

fn pattern(text: &str) -> Outcome {
    TAG_PATTERN
        .captures_iter(text)
        .filter_map(|captures| captures.get(1))
        .map(|capture| non_empty(capture.as_str()))
        .find(|outcome| matches!(outcome, Outcome::Found(_)))
        .unwrap_or(Outcome::Missing)
}

fn non_empty(value: &str) -> Outcome {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Outcome::Missing
    } else {
        Outcome::Found(trimmed.to_string())
    }
}

/// Extracts the version from `text`, trying each strategy in turn.
pub fn extract_version(text: &str) -> Option<String> {
    for strategy in STRATEGIES {
        match strategy.extract(text) {
            Outcome::Found(version) => {
                debug!(strategy = strategy.name(), %version, "resolved plugin version");
                return Some(version);
            }
            Outcome::Missing => {
                debug!(strategy = strategy.name(), "no plugin version found");
            }
            Outcome::Malformed(reason) => {
                debug!(strategy = strategy.name(), %reason, "descriptor is malformed");
            }
        }
    }
    None
}

/// Reads `descriptor` and resolves its plugin version.
pub fn resolve_version(descriptor: &Path) -> Result<String, BuildError> {
    if !descriptor.exists() {
        return Err(BuildError::DescriptorNotFound(descriptor.to_path_buf()));
    }

    let bytes = fs::read(descriptor).map_err(|source| BuildError::Io {
        action: "failed to read",
        path: descriptor.to_path_buf(),
        source,
    })?;
    let text = String::from_utf8_lossy(&bytes);

    extract_version(&text).ok_or_else(|| BuildError::VersionNotFound(descriptor.to_path_buf()))
}
