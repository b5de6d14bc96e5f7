use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use plugin_artifact::{ArtifactReport, inspect};

#[derive(Parser, Debug)]
#[command(
    name = "plugin-inspect",
    version,
    about = "Inspect packaged plugin archives"
)]
struct Args {
    /// Path to the .zip artifact
    #[arg(value_name = "FILE")]
    path: PathBuf,

    /// File extension of the entries to list
    #[arg(long = "ext", value_name = "EXT", default_value = ".dll")]
    extension: String,

    /// Emit JSON output
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let report = inspect(&args.path, &args.extension);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_human(&report);
    }

    Ok(())
}

fn print_human(report: &ArtifactReport) {
    println!("Artifact: {}", report.path.display());
    if report.exists {
        if let (Some(bytes), Some(human)) = (report.size_bytes, report.size_human.as_deref()) {
            println!("Size: {human} ({bytes} bytes)");
        }
        if let Some(sha256) = &report.sha256 {
            println!("SHA-256: {sha256}");
        }
        println!("Entries: {}", report.listed_entries.len());
        for entry in &report.listed_entries {
            println!("  - {entry}");
        }
    } else {
        println!("Present: no");
    }
    if report.warnings.is_empty() {
        println!("Warnings: none");
    } else {
        println!("Warnings:");
        for warning in &report.warnings {
            println!("  - {}", warning);
        }
    }
}
