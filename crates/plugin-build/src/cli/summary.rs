use serde::Serialize;
use time::OffsetDateTime;

use crate::pipeline::PipelineOutcome;

pub fn print_human(outcome: &PipelineOutcome) {
    let stages: Vec<String> = outcome.completed.iter().map(ToString::to_string).collect();
    println!(
        "build ok\n  configuration: {}\n  stages: {}",
        outcome.configuration,
        stages.join(", ")
    );
    if let Some(version) = &outcome.version {
        println!("  version: {version}");
    }

    let Some(artifact) = &outcome.artifact else {
        return;
    };
    println!("  artifact: {}", artifact.path.display());
    if artifact.exists {
        if let (Some(bytes), Some(human)) = (artifact.size_bytes, artifact.size_human.as_deref()) {
            println!("    size: {human} ({bytes} bytes)");
        }
        if let Some(sha256) = &artifact.sha256 {
            println!("    sha256: {sha256}");
        }
        for entry in &artifact.listed_entries {
            println!("    contains: {entry}");
        }
    }
    for warning in &artifact.warnings {
        println!("    warning: {warning}");
    }
}

pub fn print_json(outcome: &PipelineOutcome) -> serde_json::Result<()> {
    #[derive(Serialize)]
    struct Payload<'a> {
        status: &'static str,
        #[serde(with = "time::serde::rfc3339")]
        finished_at: OffsetDateTime,
        #[serde(flatten)]
        outcome: &'a PipelineOutcome,
    }

    let payload = Payload {
        status: "ok",
        finished_at: OffsetDateTime::now_utc(),
        outcome,
    };

    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

