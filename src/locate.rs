//! Log file discovery
//!
//! Finds the plain and gzip-compressed log files for one log type under a
//! root directory. Matching is case-insensitive on the full path, and the
//! log-type token must end at a word boundary or an underscore so that
//! `dns` matches `dns.log` and `dns_20240101.log` but never `dnsx.log`.

use crate::error::PlanError;
use log::debug;
use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Paths containing this substring are hourly connection summaries, not
/// records, and are always excluded from search
pub const SUMMARY_EXCLUDE: &str = "conn-summary";

/// The plain and compressed log files located for one invocation
#[derive(Debug, Clone, Default)]
pub struct FileSet {
    /// Uncompressed `.log` files, lexicographically sorted
    pub plain: Vec<PathBuf>,
    /// `.log.gz` files, lexicographically sorted
    pub compressed: Vec<PathBuf>,
}

impl FileSet {
    pub fn is_empty(&self) -> bool {
        self.plain.is_empty() && self.compressed.is_empty()
    }

    /// All located files, plain before compressed
    pub fn all(&self) -> impl Iterator<Item = &PathBuf> {
        self.plain.iter().chain(self.compressed.iter())
    }
}

/// Locate all log files for `log_type` under `root`
///
/// Fails with [`PlanError::NoFilesFound`] when neither a plain nor a
/// compressed file matches. Results reflect the filesystem at call time;
/// nothing is cached.
pub fn locate(log_type: &str, root: &Path) -> Result<FileSet, PlanError> {
    let token = regex::escape(log_type);
    let plain_re = Regex::new(&format!(r"(?i)(^|/){}(\b|_).*\.log$", token))
        .expect("valid plain log pattern");
    let gz_re = Regex::new(&format!(r"(?i)(^|/){}(\b|_).*\.log\.gz$", token))
        .expect("valid compressed log pattern");

    let mut files = FileSet::default();

    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let text = path.to_string_lossy();

        if text.to_lowercase().contains(SUMMARY_EXCLUDE) {
            continue;
        }

        if gz_re.is_match(&text) {
            files.compressed.push(path.to_path_buf());
        } else if plain_re.is_match(&text) {
            files.plain.push(path.to_path_buf());
        }
    }

    files.plain.sort();
    files.compressed.sort();

    debug!(
        "located {} plain and {} compressed '{}' files under {}",
        files.plain.len(),
        files.compressed.len(),
        log_type,
        root.display()
    );

    if files.is_empty() {
        return Err(PlanError::NoFilesFound {
            log_type: log_type.to_string(),
            root: root.to_path_buf(),
        });
    }

    Ok(files)
}
