//! Selection of the version-update helper invocation.

use std::path::Path;

use tracing::debug;

use crate::error::BuildError;
use crate::runner::{CommandRunner, Invocation};
use crate::settings::VersionHelperSettings;

/// Ways to launch the helper, tried in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Launch {
    Native,
    Interpreted,
}

const LAUNCH_ORDER: [Launch; 2] = [Launch::Native, Launch::Interpreted];

/// Builds the invocation that updates the project to `version`.
///
/// The native helper runs directly when it exists. Otherwise the portable
/// script runs through the first interpreter `runner` can find.
pub fn helper_invocation(
    settings: &VersionHelperSettings,
    working_dir: &Path,
    version: &str,
    runner: &dyn CommandRunner,
) -> Result<Invocation, BuildError> {
    for launch in LAUNCH_ORDER {
        match launch {
            Launch::Native => {
                let native = working_dir.join(&settings.native);
                if native.is_file() {
                    debug!(helper = %native.display(), "using native version helper");
                    return Ok(Invocation::new(native.to_string_lossy(), working_dir).arg(version));
                }
            }
            Launch::Interpreted => {
                let script = working_dir.join(&settings.script);
                if !script.is_file() {
                    debug!(script = %script.display(), "portable version helper missing");
                    continue;
                }
                if let Some(interpreter) = settings
                    .interpreters
                    .iter()
                    .find(|candidate| runner.is_available(candidate))
                {
                    debug!(%interpreter, script = %script.display(), "using interpreted version helper");
                    return Ok(Invocation::new(interpreter.as_str(), working_dir)
                        .args(settings.interpreter_args.iter().cloned())
                        .arg(script.to_string_lossy())
                        .arg(version));
                }
            }
        }
    }

    Err(BuildError::NoInterpreterAvailable {
        native: settings.native.display().to_string(),
        tried: settings.interpreters.join(", "),
    })
}
