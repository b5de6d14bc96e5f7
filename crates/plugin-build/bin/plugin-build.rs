use std::process::ExitCode;

fn main() -> ExitCode {
    plugin_build::cli::main_with_args(std::env::args_os().skip(1))
}
