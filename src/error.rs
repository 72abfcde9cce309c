//! Fatal planning errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort planning before any pipeline is composed
#[derive(Debug, Error)]
pub enum PlanError {
    #[error(
        "no search tool available: install ripgrep (rg), ugrep (ug) or zgrep, \
         or force one with --rg, --ug or --zgrep"
    )]
    NoToolAvailable,

    #[error("no '{log_type}' log files found under '{}'", root.display())]
    NoFilesFound { log_type: String, root: PathBuf },
}
