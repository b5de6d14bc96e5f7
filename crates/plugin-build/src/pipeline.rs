use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use plugin_artifact::ArtifactReport;
use serde::Serialize;
use tracing::info;

use crate::config::{BuildConfig, Configuration};
use crate::error::BuildError;
use crate::helper;
use crate::runner::{CommandRunner, Invocation};
use crate::settings::Settings;
use crate::stage::{Stage, StageResult};
use crate::version;

/// Summary of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    pub configuration: Configuration,
    pub completed: Vec<Stage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<ArtifactReport>,
}

/// Drives the toolchain through the build stages for one project.
pub struct Pipeline<'a, R: CommandRunner> {
    config: &'a BuildConfig,
    settings: &'a Settings,
    working_dir: PathBuf,
    runner: &'a R,
}

impl<'a, R: CommandRunner> Pipeline<'a, R> {
    pub fn new(
        config: &'a BuildConfig,
        settings: &'a Settings,
        working_dir: &Path,
        runner: &'a R,
    ) -> Self {
        Self {
            config,
            settings,
            working_dir: working_dir.to_path_buf(),
            runner,
        }
    }

    /// Runs every applicable stage, stopping at the first failure.
    pub fn run(&self) -> Result<PipelineOutcome, BuildError> {
        info!(
            configuration = %self.config.configuration,
            clean = self.config.clean,
            package = self.config.package,
            version = self.config.version.as_deref().unwrap_or("-"),
            dir = %self.working_dir.display(),
            "starting build"
        );

        let mut completed = Vec::new();

        if let Some(version) = &self.config.version {
            let invocation = helper::helper_invocation(
                &self.settings.version_helper,
                &self.working_dir,
                version,
                self.runner,
            )?;
            self.execute(Stage::UpdateVersion, invocation)?;
            completed.push(Stage::UpdateVersion);
        }

        if self.config.clean {
            self.execute(Stage::Clean, self.toolchain_invocation(Stage::Clean))?;
            self.remove_output_dir()?;
            completed.push(Stage::Clean);
        }

        for stage in [Stage::Restore, Stage::Build, Stage::Publish] {
            self.execute(stage, self.toolchain_invocation(stage))?;
            completed.push(stage);
        }

        let mut outcome = PipelineOutcome {
            configuration: self.config.configuration,
            completed,
            version: self.config.version.clone(),
            artifact: None,
        };

        if self.config.package {
            let version = match &self.config.version {
                Some(version) => version.clone(),
                None => version::resolve_version(&self.working_dir.join(&self.settings.descriptor))?,
            };
            outcome.artifact = Some(self.verify_artifact(&version));
            outcome.version = Some(version);
        }

        info!(stages = outcome.completed.len(), "build complete");
        Ok(outcome)
    }

    /// Assembles the toolchain command for a build stage.
    pub fn toolchain_invocation(&self, stage: Stage) -> Invocation {
        let mut invocation =
            Invocation::new(self.settings.toolchain.as_str(), &self.working_dir).arg(stage.to_string());
        if let Some(project) = &self.settings.project {
            invocation = invocation.arg(project.as_str());
        }

        let configuration = self.config.configuration.as_str();
        let flags = self.settings.normalization_flags.iter().cloned();
        match stage {
            Stage::Clean => invocation.args(["-c", configuration]).args(flags),
            Stage::Build => invocation
                .args(["-c", configuration, "--no-restore"])
                .args(flags),
            Stage::Publish => invocation
                .args(["-c", configuration, "--no-build"])
                .args(flags),
            Stage::Restore | Stage::UpdateVersion => invocation,
        }
    }

    fn execute(&self, stage: Stage, invocation: Invocation) -> Result<(), BuildError> {
        info!(%stage, command = %invocation, "running stage");
        let exit_code = self.runner.run(&invocation)?;
        let result = StageResult {
            stage,
            exit_code,
            invocation,
        };

        if result.succeeded() {
            info!(%stage, "stage finished");
            Ok(())
        } else {
            Err(BuildError::StageFailed {
                stage: result.stage,
                exit_code: result.exit_code,
                command: result.invocation,
            })
        }
    }

    fn remove_output_dir(&self) -> Result<(), BuildError> {
        let output_dir = self.working_dir.join(&self.settings.output_dir);
        match fs::remove_dir_all(&output_dir) {
            Ok(()) => {
                info!(path = %output_dir.display(), "removed build output");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(BuildError::Io {
                action: "failed to remove",
                path: output_dir,
                source,
            }),
        }
    }

    fn verify_artifact(&self, version: &str) -> ArtifactReport {
        let path = self.settings.artifact_path(&self.working_dir, version);
        info!(path = %path.display(), %version, "verifying packaged artifact");
        plugin_artifact::inspect(&path, &self.settings.artifact.library_extension)
    }
}
