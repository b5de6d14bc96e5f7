#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod helper;
pub mod pipeline;
pub mod runner;
pub mod settings;
pub mod stage;
pub mod version;

pub use config::{BuildConfig, Configuration};
pub use error::BuildError;
pub use pipeline::{Pipeline, PipelineOutcome};
pub use runner::{CommandRunner, Invocation, SystemRunner};
pub use settings::Settings;
pub use stage::Stage;
pub use version::resolve_version;
