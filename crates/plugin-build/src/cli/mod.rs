#![forbid(unsafe_code)]

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, CommandFactory, Parser};
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{BuildConfig, Configuration};
use crate::error::BuildError;
use crate::pipeline::Pipeline;
use crate::runner::SystemRunner;
use crate::settings::Settings;

pub mod summary;

pub const LOG_ENV: &str = "PLUGIN_BUILD_LOG";

#[derive(Debug, Parser)]
#[command(
    name = "plugin-build",
    about = "Build, publish and verify a plugin with its toolchain",
    disable_help_flag = true,
    args_override_self = true
)]
pub struct Cli {
    /// Build configuration
    #[arg(short = 'c', long = "configuration", value_enum, ignore_case = true,
          value_name = "CONFIG", default_value_t = Configuration::Release)]
    pub configuration: Configuration,

    /// Run the toolchain clean and remove the build output first
    #[arg(long)]
    pub clean: bool,

    /// Verify the packaged artifact after publishing
    #[arg(short = 'p', long)]
    pub package: bool,

    /// Update the project to this version before building
    #[arg(short = 'v', long = "version", value_name = "VERSION", allow_hyphen_values = true,
          value_parser = parse_version)]
    pub version: Option<String>,

    /// Print usage and exit
    #[arg(short = 'h', long = "help", action = ArgAction::SetTrue)]
    pub help: bool,

    /// Project directory (defaults to the current directory)
    #[arg(long = "dir", value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Settings file (defaults to plugin-build.toml in the project directory)
    #[arg(long = "settings", value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Emit the run summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Logging filter (overrides PLUGIN_BUILD_LOG)
    #[arg(long = "log", value_name = "FILTER", default_value = "info")]
    pub verbosity: String,
}

impl Cli {
    pub fn build_config(&self) -> BuildConfig {
        BuildConfig {
            configuration: self.configuration,
            clean: self.clean,
            package: self.package,
            version: self.version.clone(),
            show_help: self.help,
        }
    }
}

/// Options whose value is the following token.
const VALUE_FLAGS: [&str; 7] = [
    "-c",
    "--configuration",
    "-v",
    "--version",
    "--dir",
    "--settings",
    "--log",
];

fn parse_version(value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("version must not be empty".to_string());
    }
    Ok(trimmed.to_string())
}

/// Position of the first help flag that is not consumed as an option value.
fn help_position(tokens: &[OsString]) -> Option<usize> {
    let mut expects_value = false;
    for (index, token) in tokens.iter().enumerate() {
        if std::mem::take(&mut expects_value) {
            continue;
        }
        match token.to_str() {
            Some("-h" | "--help") => return Some(index),
            Some("--") => return None,
            Some(flag) => expects_value = VALUE_FLAGS.contains(&flag),
            None => {}
        }
    }
    None
}

/// Parses raw tokens (without the program name) into a [`Cli`].
///
/// Tokens after the first help flag are ignored.
pub fn parse_args<I, T>(tokens: I) -> Result<Cli, BuildError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut tokens: Vec<OsString> = tokens.into_iter().map(Into::into).collect();
    if let Some(index) = help_position(&tokens) {
        tokens.truncate(index + 1);
    }
    let argv = std::iter::once(OsString::from("plugin-build")).chain(tokens);
    Cli::try_parse_from(argv).map_err(|err| BuildError::Argument(err.render().to_string()))
}

/// Rendered usage text.
pub fn usage() -> String {
    Cli::command().render_help().to_string()
}

/// Resolve the logging filter to use for subscriber initialisation.
pub fn resolve_env_filter(cli: &Cli) -> String {
    std::env::var(LOG_ENV).unwrap_or_else(|_| cli.verbosity.clone())
}

fn install_tracing(filter: &str) {
    let _ = fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .try_init();
}

/// Entry point for the binary: parse, run and map the outcome to an exit code.
pub fn main_with_args<I, T>(tokens: I) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match parse_args(tokens) {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(err.exit_code());
        }
    };

    install_tracing(&resolve_env_filter(&cli));

    match run_with_cli(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "build failed");
            eprintln!("error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

/// Execute the pipeline using a pre-parsed argument set.
pub fn run_with_cli(cli: &Cli) -> Result<(), BuildError> {
    let config = cli.build_config();
    if config.show_help {
        println!("{}", usage());
        return Ok(());
    }

    let working_dir = match &cli.dir {
        Some(dir) => normalize(dir.clone()),
        None => normalize(PathBuf::from(".")),
    };
    let settings = Settings::load(&working_dir, cli.settings.as_deref())?;

    let outcome = Pipeline::new(&config, &settings, &working_dir, &SystemRunner).run()?;

    if cli.json {
        summary::print_json(&outcome)?;
    } else {
        summary::print_human(&outcome);
    }
    Ok(())
}

fn normalize(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    }
}
