use std::path::PathBuf;

use thiserror::Error;

use crate::runner::Invocation;
use crate::stage::Stage;

/// Errors that abort a build run.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("{0}")]
    Argument(String),
    #[error("descriptor {} does not exist", .0.display())]
    DescriptorNotFound(PathBuf),
    #[error("no PluginVersion value found in {}", .0.display())]
    VersionNotFound(PathBuf),
    #[error("no version helper can run: {native} is missing and none of [{tried}] is available")]
    NoInterpreterAvailable { native: String, tried: String },
    #[error("stage {stage} failed with exit code {exit_code}: {command}")]
    StageFailed {
        stage: Stage,
        exit_code: i32,
        command: Invocation,
    },
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to render summary: {0}")]
    Summary(#[from] serde_json::Error),
    #[error("settings error: {0:#}")]
    Settings(#[from] anyhow::Error),
}

impl BuildError {
    /// Process exit code for this error.
    ///
    /// A failing stage propagates the child's code when it fits a process
    /// exit status; everything else exits with 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::StageFailed { exit_code, .. } => u8::try_from(*exit_code)
                .ok()
                .filter(|code| *code != 0)
                .unwrap_or(1),
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn failed(exit_code: i32) -> BuildError {
        BuildError::StageFailed {
            stage: Stage::Restore,
            exit_code,
            command: Invocation::new("dotnet", Path::new("/work")).arg("restore"),
        }
    }

    #[test]
    fn stage_failures_propagate_child_exit_code() {
        assert_eq!(failed(2).exit_code(), 2);
        assert_eq!(failed(255).exit_code(), 255);
    }

    #[test]
    fn out_of_range_codes_collapse_to_one() {
        assert_eq!(failed(-1).exit_code(), 1);
        assert_eq!(failed(256).exit_code(), 1);
        assert_eq!(BuildError::Argument("bad".into()).exit_code(), 1);
    }

    #[test]
    fn stage_failure_message_names_the_command() {
        let message = failed(2).to_string();
        assert_eq!(
            message,
            "stage restore failed with exit code 2: dotnet restore"
        );
    }
}
