//! External process execution.
//!
//! Every stage goes through a [`CommandRunner`], so the pipeline can be
//! driven by a fake in tests without touching real tooling.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::Serialize;
use tracing::debug;

use crate::error::BuildError;

/// A fully assembled external command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
}

impl Invocation {
    pub fn new(program: impl Into<String>, working_dir: &Path) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: working_dir.to_path_buf(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

fn quote(value: &str) -> String {
    if value.is_empty() || value.contains(char::is_whitespace) {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}

/// Runs external commands on behalf of the pipeline.
pub trait CommandRunner {
    /// Runs `invocation` to completion and returns its exit code.
    ///
    /// A child terminated by a signal reports `-1`.
    fn run(&self, invocation: &Invocation) -> Result<i32, BuildError>;

    /// Whether `program` can be found on the search path.
    fn is_available(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

/// Runs commands as real child processes with inherited standard streams.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<i32, BuildError> {
        debug!(command = %invocation, dir = %invocation.working_dir.display(), "spawning");
        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| BuildError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;

        Ok(status.code().unwrap_or(-1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_quotes_arguments_with_spaces() {
        let invocation = Invocation::new("dotnet", Path::new("."))
            .arg("build")
            .arg("My Plugin.sln")
            .args(["-c", "Release"]);
        assert_eq!(
            invocation.to_string(),
            "dotnet build \"My Plugin.sln\" -c Release"
        );
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_reports_exit_codes() {
        let dir = tempfile::tempdir().expect("temp dir");
        let ok = Invocation::new("sh", dir.path()).args(["-c", "exit 0"]);
        let failing = Invocation::new("sh", dir.path()).args(["-c", "exit 3"]);

        assert_eq!(SystemRunner.run(&ok).expect("run"), 0);
        assert_eq!(SystemRunner.run(&failing).expect("run"), 3);
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let invocation = Invocation::new("definitely-not-a-real-program-4711", dir.path());
        let err = SystemRunner.run(&invocation).expect_err("spawn fails");
        assert!(matches!(err, BuildError::Spawn { .. }));
    }
}
