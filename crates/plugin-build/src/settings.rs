//! Project settings loaded from `plugin-build.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

pub const DEFAULT_SETTINGS_FILE: &str = "plugin-build.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Build toolchain executable.
    pub toolchain: String,
    /// Project or solution handed to every toolchain command.
    pub project: Option<String>,
    /// XML descriptor that carries `PluginVersion`.
    pub descriptor: PathBuf,
    /// Build output directory removed by `--clean`.
    pub output_dir: PathBuf,
    pub normalization_flags: Vec<String>,
    pub plugin: PluginSettings,
    pub artifact: ArtifactSettings,
    pub version_helper: VersionHelperSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PluginSettings {
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArtifactSettings {
    pub dir: PathBuf,
    /// File name with `{plugin}` and `{version}` placeholders.
    pub name_template: String,
    pub library_extension: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VersionHelperSettings {
    /// Helper run directly when present.
    pub native: PathBuf,
    /// Helper run through one of `interpreters`.
    pub script: PathBuf,
    pub interpreters: Vec<String>,
    pub interpreter_args: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            toolchain: "dotnet".to_string(),
            project: None,
            descriptor: PathBuf::from("Directory.Build.props"),
            output_dir: PathBuf::from("bin"),
            normalization_flags: vec!["--nologo".to_string(), "-p:GenerateFullPaths=true".to_string()],
            plugin: PluginSettings::default(),
            artifact: ArtifactSettings::default(),
            version_helper: VersionHelperSettings::default(),
        }
    }
}

impl Default for ArtifactSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("artifacts"),
            name_template: "{plugin}_{version}.zip".to_string(),
            library_extension: ".dll".to_string(),
        }
    }
}

impl Default for VersionHelperSettings {
    fn default() -> Self {
        Self {
            native: PathBuf::from("scripts/update-version.sh"),
            script: PathBuf::from("scripts/update-version.ps1"),
            interpreters: vec!["pwsh".to_string(), "powershell".to_string()],
            interpreter_args: ["-NoProfile", "-ExecutionPolicy", "Bypass", "-File"]
                .map(String::from)
                .to_vec(),
        }
    }
}

impl Settings {
    /// Loads settings for `working_dir`.
    ///
    /// An explicit path must exist. Without one, `plugin-build.toml` in the
    /// working directory is used when present and defaults otherwise.
    pub fn load(working_dir: &Path, explicit: Option<&Path>) -> Result<Self> {
        let settings = match explicit {
            Some(path) => Self::from_file(&working_dir.join(path))?,
            None => {
                let candidate = working_dir.join(DEFAULT_SETTINGS_FILE);
                if candidate.is_file() {
                    Self::from_file(&candidate)?
                } else {
                    Self::default()
                }
            }
        };
        settings.validate()?;
        Ok(settings)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("{} is not valid settings", path.display()))
    }

    fn validate(&self) -> Result<()> {
        if self.toolchain.trim().is_empty() {
            bail!("toolchain must not be empty");
        }
        if let Some(project) = &self.project
            && project.trim().is_empty()
        {
            bail!("project must not be empty when present");
        }
        if let Some(id) = &self.plugin.id
            && id.trim().is_empty()
        {
            bail!("plugin.id must not be empty when present");
        }
        if !self.artifact.name_template.contains("{version}") {
            bail!("artifact.name_template must contain {{version}}");
        }
        Ok(())
    }

    /// Plugin identifier, falling back to the working directory's name.
    pub fn plugin_id(&self, working_dir: &Path) -> String {
        self.plugin
            .id
            .clone()
            .or_else(|| {
                working_dir
                    .file_name()
                    .and_then(|name| name.to_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "plugin".to_string())
    }

    /// Expected location of the packaged archive for `version`.
    pub fn artifact_path(&self, working_dir: &Path, version: &str) -> PathBuf {
        let file_name = self
            .artifact
            .name_template
            .replace("{plugin}", &self.plugin_id(working_dir))
            .replace("{version}", version);
        working_dir.join(&self.artifact.dir).join(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn defaults_apply_without_a_settings_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let settings = Settings::load(dir.path(), None).expect("defaults");
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.toolchain, "dotnet");
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(
            dir.path().join(DEFAULT_SETTINGS_FILE),
            indoc! {r#"
                project = "Jellyfin.Plugin.Demo.sln"

                [plugin]
                id = "demo"

                [version_helper]
                interpreters = ["pwsh"]
            "#},
        )
        .expect("write settings");

        let settings = Settings::load(dir.path(), None).expect("settings");
        assert_eq!(settings.project.as_deref(), Some("Jellyfin.Plugin.Demo.sln"));
        assert_eq!(settings.plugin.id.as_deref(), Some("demo"));
        assert_eq!(settings.version_helper.interpreters, vec!["pwsh"]);
        assert_eq!(settings.descriptor, PathBuf::from("Directory.Build.props"));
        assert_eq!(settings.artifact.library_extension, ".dll");
    }

    #[test]
    fn explicit_settings_file_must_exist() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = Settings::load(dir.path(), Some(Path::new("missing.toml")))
            .expect_err("missing explicit file");
        assert!(err.to_string().contains("missing.toml"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join(DEFAULT_SETTINGS_FILE), "toolchian = \"dotnet\"\n")
            .expect("write settings");
        assert!(Settings::load(dir.path(), None).is_err());
    }

    #[test]
    fn template_without_version_is_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(
            dir.path().join(DEFAULT_SETTINGS_FILE),
            "[artifact]\nname_template = \"{plugin}.zip\"\n",
        )
        .expect("write settings");
        let err = Settings::load(dir.path(), None).expect_err("invalid template");
        assert!(format!("{err:#}").contains("{version}"));
    }

    #[test]
    fn artifact_path_fills_the_template() {
        let settings = Settings {
            plugin: PluginSettings {
                id: Some("demo".to_string()),
            },
            ..Settings::default()
        };
        assert_eq!(
            settings.artifact_path(Path::new("/work"), "2.0.0"),
            Path::new("/work/artifacts/demo_2.0.0.zip")
        );
    }

    #[test]
    fn plugin_id_falls_back_to_directory_name() {
        let settings = Settings::default();
        assert_eq!(settings.plugin_id(Path::new("/src/jellyfin-plugin-demo")), "jellyfin-plugin-demo");
    }
}
