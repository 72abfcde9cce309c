//! zeekgrep - Zeek log search front-end
//!
//! Main entry point for the command-line application.

use log::debug;
use std::io::IsTerminal;
use std::path::Path;
use std::process;

use zeekgrep::cli::{self, Invocation};
use zeekgrep::locate::FileSet;
use zeekgrep::pipeline::BuildRequest;
use zeekgrep::term::{print_error, print_warning};
use zeekgrep::{exec, locate, pipeline, tool};

fn main() {
    env_logger::init();

    let invocation = match cli::parse_invocation(
        std::env::args(),
        std::io::stdin().is_terminal(),
        cli::force_files_from_env(),
    ) {
        Ok(invocation) => invocation,
        Err(e) => e.exit(),
    };

    match run(&invocation) {
        Ok(code) => process::exit(code),
        Err(e) => {
            print_error(&format!("{}", e));

            // Print chain of errors
            let mut source = e.source();
            while let Some(err) = source {
                print_error(&format!("  Caused by: {}", err));
                source = err.source();
            }

            process::exit(1);
        }
    }
}

fn run(invocation: &Invocation) -> anyhow::Result<i32> {
    // Locate files first: an empty result is fatal before any tool is
    // selected, except when the input stream is the source
    let files = if invocation.read_from_stream {
        FileSet::default()
    } else {
        locate::locate(invocation.effective_log_type(), Path::new("."))?
    };

    if let Some(forced) = invocation.forced_tool {
        if !forced.is_available() {
            print_warning(&format!(
                "forced tool '{}' not found on PATH",
                forced.binary()
            ));
        }
    }

    let selected = tool::select(
        invocation.forced_tool,
        !invocation.terms.is_empty(),
        !invocation.passthrough.is_empty(),
        &tool::detect_available(),
    )?;
    debug!("selected tool: {:?}", selected);

    let request = BuildRequest {
        tool: selected,
        terms: &invocation.terms,
        mode: invocation.mode,
        invert: invocation.invert,
        files: &files,
        passthrough: &invocation.passthrough,
        read_from_stream: invocation.read_from_stream,
        jobs: num_cpus::get(),
    };
    let mut pipeline = pipeline::build(&request);

    exec::apply_header_policy(&mut pipeline, std::io::stdout().is_terminal());
    exec::execute(&pipeline, invocation.dry_run)
}
