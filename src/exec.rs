//! Header policy and execution
//!
//! The composed pipeline is opaque text by the time it reaches this
//! module: it is either printed (dry run) or handed to `sh -c` as a
//! single command, with the shell's exit status becoming ours.

use crate::pipeline::Pipeline;
use log::debug;
use std::process::Command;

/// Final stage removing structural comment lines for interactive viewing
pub const HEADER_STRIP_STAGE: &str = "grep -v '^#'";

/// Strip header lines when output goes to an interactive terminal
///
/// When output is consumed by another program the headers stay: a
/// downstream structured-log parser needs them for column names.
pub fn apply_header_policy(pipeline: &mut Pipeline, output_is_terminal: bool) {
    if output_is_terminal {
        pipeline.push(HEADER_STRIP_STAGE.to_string());
    }
}

/// Print the pipeline (dry run) or run it, returning the exit code
pub fn execute(pipeline: &Pipeline, dry_run: bool) -> anyhow::Result<i32> {
    let rendered = pipeline.render();

    if dry_run {
        println!("{}", rendered);
        return Ok(0);
    }

    debug!("executing: {}", rendered);
    let status = Command::new("sh")
        .arg("-c")
        .arg(&rendered)
        .status()
        .map_err(|e| anyhow::anyhow!("failed to run shell: {}", e))?;

    // killed by a signal reports no code; treat that as failure
    Ok(status.code().unwrap_or(1))
}
