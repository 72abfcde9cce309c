//! # zeekgrep
//!
//! Zeek log search front-end. zeekgrep never matches text itself: it
//! locates the log files for a log type, normalizes the search terms,
//! picks the fastest installed search tool, composes a single shell
//! pipeline for it, and either prints that pipeline or runs it.
//!
//! ## Usage
//!
//! ```bash
//! # connection records touching one host
//! zeekgrep 10.0.0.1
//!
//! # DNS answers for either resolver
//! zeekgrep --dns -o 8.8.8.8 1.1.1.1
//!
//! # show the pipeline without running it
//! zeekgrep -n --ssl example.com
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use zeekgrep::locate::FileSet;
//! use zeekgrep::pattern::{MatchMode, SearchTerm, TermOptions};
//! use zeekgrep::pipeline::{build, BuildRequest};
//! use zeekgrep::tool::SearchTool;
//!
//! let terms = vec![SearchTerm::new("10.0.0.1", TermOptions::default())];
//! let files = FileSet::default();
//! let request = BuildRequest {
//!     tool: SearchTool::Ripgrep,
//!     terms: &terms,
//!     mode: MatchMode::And,
//!     invert: false,
//!     files: &files,
//!     passthrough: &[],
//!     read_from_stream: true,
//!     jobs: 4,
//! };
//! println!("{}", build(&request).render());
//! ```

pub mod cli;
pub mod error;
pub mod exec;
pub mod locate;
pub mod pattern;
pub mod pipeline;
pub mod term;
pub mod tool;

pub use cli::{Args, Invocation};
pub use error::PlanError;
pub use tool::SearchTool;
