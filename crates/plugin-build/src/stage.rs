use std::fmt;

use serde::Serialize;

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    UpdateVersion,
    Clean,
    Restore,
    Build,
    Publish,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::UpdateVersion => "update-version",
            Self::Clean => "clean",
            Self::Restore => "restore",
            Self::Build => "build",
            Self::Publish => "publish",
        })
    }
}

/// Outcome of a single external invocation.
#[derive(Debug, Clone)]
pub struct StageResult {
    pub stage: Stage,
    pub exit_code: i32,
    pub invocation: crate::runner::Invocation,
}

impl StageResult {
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}
