//! Pipeline composition
//!
//! Composes the single shell pipeline that performs the requested
//! filtering with the selected backend tool. Every tool follows the same
//! two rules: the first term is combined with the file list (or the input
//! stream), and each further term either opens a new pipe stage (AND) or
//! becomes an additional alternative inside the same invocation (OR).
//! Stages are collected as an ordered list and only joined into shell
//! text at render time.

use crate::locate::FileSet;
use crate::pattern::{MatchMode, SearchTerm};
use crate::tool::SearchTool;
use log::debug;
use std::path::PathBuf;

/// Pattern matching a structural comment (header) line
pub const HEADER_PATTERN: &str = "^#";

/// An ordered list of shell stages, joined with ` | ` at render time
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    stages: Vec<String>,
}

impl Pipeline {
    pub fn push(&mut self, stage: String) {
        self.stages.push(stage);
    }

    pub fn stages(&self) -> &[String] {
        &self.stages
    }

    pub fn render(&self) -> String {
        self.stages.join(" | ")
    }
}

/// Everything the builder needs to compose one pipeline
#[derive(Debug, Clone, Copy)]
pub struct BuildRequest<'a> {
    pub tool: SearchTool,
    pub terms: &'a [SearchTerm],
    pub mode: MatchMode,
    pub invert: bool,
    pub files: &'a FileSet,
    pub passthrough: &'a [String],
    pub read_from_stream: bool,
    /// Worker count for the xargs fan-out
    pub jobs: usize,
}

/// Compose the pipeline for the selected tool
pub fn build(req: &BuildRequest) -> Pipeline {
    let pipeline = match req.tool {
        SearchTool::Ripgrep => build_ripgrep(req),
        SearchTool::Ugrep => build_ugrep(req),
        SearchTool::Zgrep => build_zgrep(req),
        SearchTool::GrepCidr => build_grepcidr(req),
        SearchTool::Cat => build_cat(req),
    };
    debug!("composed pipeline: {}", pipeline.render());
    pipeline
}

/// OR keeps every pattern inside one invocation; AND gives each pattern
/// its own pipe stage
fn pattern_groups<'a>(terms: &'a [SearchTerm], mode: MatchMode) -> Vec<Vec<&'a str>> {
    let patterns: Vec<&str> = terms.iter().map(|t| t.pattern.as_str()).collect();
    if patterns.is_empty() {
        return Vec::new();
    }
    match mode {
        MatchMode::Or => vec![patterns],
        MatchMode::And => patterns.into_iter().map(|p| vec![p]).collect(),
    }
}

fn path_args<'a>(paths: impl Iterator<Item = &'a PathBuf>) -> Vec<String> {
    paths.map(|p| p.to_string_lossy().into_owned()).collect()
}

/// `printf '%s\n' FILE...`, the feed for an xargs fan-out
fn fanout_feed<'a>(paths: impl Iterator<Item = &'a PathBuf>) -> String {
    let mut args: Vec<String> = vec!["printf".into(), "%s\\n".into()];
    args.extend(path_args(paths));
    shell_words::join(&args)
}

/// A `cat`/`zcat` invocation over a list of files
fn concat_command(binary: &str, passthrough: &[String], paths: &[PathBuf]) -> String {
    let mut args: Vec<String> = vec![binary.into()];
    args.extend(passthrough.iter().cloned());
    args.extend(path_args(paths.iter()));
    shell_words::join(&args)
}

/// `{ cat PLAIN...; zcat GZ...; }` - plain files in full before any
/// compressed output begins
fn concat_group(files: &FileSet, passthrough: &[String]) -> String {
    format!(
        "{{ {}; {}; }}",
        concat_command("cat", passthrough, &files.plain),
        concat_command("zcat", passthrough, &files.compressed)
    )
}

fn build_ripgrep(req: &BuildRequest) -> Pipeline {
    let mut pipeline = Pipeline::default();
    let groups = pattern_groups(req.terms, req.mode);

    if groups.is_empty() {
        // nothing but passthrough args to forward
        pipeline.push(ripgrep_stage(req, &[], true));
        return pipeline;
    }

    for (index, group) in groups.iter().enumerate() {
        pipeline.push(ripgrep_stage(req, group, index == 0));
    }
    pipeline
}

fn ripgrep_stage(req: &BuildRequest, patterns: &[&str], first: bool) -> String {
    let mut args: Vec<String> = vec!["rg".into()];
    if first && !req.read_from_stream && !req.files.compressed.is_empty() {
        args.push("-z".into());
    }
    args.extend(req.passthrough.iter().cloned());
    if req.invert {
        args.push("-v".into());
    }
    for pattern in patterns {
        args.push("-e".into());
        args.push((*pattern).into());
    }
    // headers must survive every stage; inverting would drop them instead
    if !patterns.is_empty() && !req.invert {
        args.push("-e".into());
        args.push(HEADER_PATTERN.into());
    }
    if first && !req.read_from_stream {
        args.extend(path_args(req.files.all()));
    }
    shell_words::join(&args)
}

fn build_ugrep(req: &BuildRequest) -> Pipeline {
    let mut args: Vec<String> = vec!["ug".into()];
    if !req.read_from_stream && !req.files.compressed.is_empty() {
        args.push("-z".into());
    }
    args.extend(req.passthrough.iter().cloned());
    if req.invert {
        args.push("-v".into());
    }

    if let Some((first, rest)) = req.terms.split_first() {
        // One boolean expression holds all terms. Each AND clause carries
        // its own header alternate, parenthesized so the clauses bind
        // correctly under ugrep's AND-over-OR precedence.
        let mut expr = ugrep_clause(req, &first.pattern);
        for term in rest {
            match req.mode {
                MatchMode::And => {
                    expr.push_str(" AND ");
                    expr.push_str(&ugrep_clause(req, &term.pattern));
                }
                MatchMode::Or => {
                    expr.push_str(" OR ");
                    expr.push_str(&term.pattern);
                }
            }
        }
        args.push("--bool".into());
        args.push(expr);
    }

    if !req.read_from_stream {
        args.extend(path_args(req.files.all()));
    }

    let mut pipeline = Pipeline::default();
    pipeline.push(shell_words::join(&args));
    pipeline
}

fn ugrep_clause(req: &BuildRequest, pattern: &str) -> String {
    if req.invert {
        pattern.to_string()
    } else {
        format!("( {} OR {} )", pattern, HEADER_PATTERN)
    }
}

fn build_zgrep(req: &BuildRequest) -> Pipeline {
    let mut pipeline = Pipeline::default();
    let groups = pattern_groups(req.terms, req.mode);
    let first_group: &[&str] = groups.first().map(Vec::as_slice).unwrap_or(&[]);

    if req.read_from_stream {
        pipeline.push(zgrep_stage(req, first_group));
    } else {
        // one zgrep per file, dispatched in parallel; output order across
        // files is not guaranteed here
        pipeline.push(fanout_feed(req.files.all()));
        pipeline.push(format!(
            "xargs -n1 -P{} {}",
            req.jobs,
            zgrep_stage(req, first_group)
        ));
    }

    for group in groups.iter().skip(1) {
        pipeline.push(zgrep_stage(req, group));
    }
    pipeline
}

fn zgrep_stage(req: &BuildRequest, patterns: &[&str]) -> String {
    let mut args: Vec<String> = vec!["zgrep".into(), "-E".into(), "-h".into()];
    args.extend(req.passthrough.iter().cloned());
    if req.invert {
        args.push("-v".into());
    }
    for pattern in patterns {
        args.push("-e".into());
        args.push((*pattern).into());
    }
    if !patterns.is_empty() && !req.invert {
        args.push("-e".into());
        args.push(HEADER_PATTERN.into());
    }
    shell_words::join(&args)
}

fn build_grepcidr(req: &BuildRequest) -> Pipeline {
    let mut pipeline = Pipeline::default();

    // grepcidr takes a comma-separated network list in one argument, so
    // OR never needs a second invocation
    let patterns: Vec<&str> = req.terms.iter().map(|t| t.pattern.as_str()).collect();
    let groups: Vec<String> = if patterns.is_empty() {
        Vec::new()
    } else {
        match req.mode {
            MatchMode::Or => vec![patterns.join(",")],
            MatchMode::And => patterns.iter().map(|p| p.to_string()).collect(),
        }
    };
    let first_group = groups.first().map(String::as_str);

    let files = req.files;
    if req.read_from_stream {
        pipeline.push(grepcidr_stage(req, first_group));
    } else if files.plain.is_empty() {
        // compressed only: parallel decompression feeding one matcher
        pipeline.push(fanout_feed(files.compressed.iter()));
        pipeline.push(format!("xargs -n1 -P{} zcat", req.jobs));
        pipeline.push(grepcidr_stage(req, first_group));
    } else if files.compressed.is_empty() {
        // plain only: fan the matcher itself out over the files
        pipeline.push(fanout_feed(files.plain.iter()));
        pipeline.push(format!(
            "xargs -n1 -P{} {}",
            req.jobs,
            grepcidr_stage(req, first_group)
        ));
    } else {
        // mixed: concatenate in order, losing file-boundary parallelism
        pipeline.push(concat_group(files, &[]));
        pipeline.push(grepcidr_stage(req, first_group));
    }

    for group in groups.iter().skip(1) {
        pipeline.push(grepcidr_stage(req, Some(group)));
    }
    pipeline
}

fn grepcidr_stage(req: &BuildRequest, pattern: Option<&str>) -> String {
    let mut args: Vec<String> = vec!["grepcidr".into()];
    args.extend(req.passthrough.iter().cloned());
    if req.invert {
        args.push("-v".into());
    }
    if let Some(p) = pattern {
        args.push("-e".into());
        args.push(p.into());
    }
    shell_words::join(&args)
}

fn build_cat(req: &BuildRequest) -> Pipeline {
    let mut pipeline = Pipeline::default();
    let files = req.files;

    let stage = if req.read_from_stream || files.is_empty() {
        // stream mode: pass the input through unmodified
        concat_command("cat", req.passthrough, &[])
    } else if files.compressed.is_empty() {
        concat_command("cat", req.passthrough, &files.plain)
    } else if files.plain.is_empty() {
        concat_command("zcat", req.passthrough, &files.compressed)
    } else {
        concat_group(files, req.passthrough)
    };

    pipeline.push(stage);
    pipeline
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::TermOptions;

    fn terms(raws: &[&str]) -> Vec<SearchTerm> {
        raws.iter()
            .map(|r| SearchTerm::new(r, TermOptions::default()))
            .collect()
    }

    fn file_set(plain: &[&str], compressed: &[&str]) -> FileSet {
        FileSet {
            plain: plain.iter().map(PathBuf::from).collect(),
            compressed: compressed.iter().map(PathBuf::from).collect(),
        }
    }

    fn request<'a>(
        tool: SearchTool,
        terms: &'a [SearchTerm],
        mode: MatchMode,
        files: &'a FileSet,
    ) -> BuildRequest<'a> {
        BuildRequest {
            tool,
            terms,
            mode,
            invert: false,
            files,
            passthrough: &[],
            read_from_stream: false,
            jobs: 4,
        }
    }

    fn quoted(pattern: &str) -> String {
        shell_words::quote(pattern).into_owned()
    }

    #[test]
    fn test_ripgrep_single_term_single_stage() {
        let terms = terms(&["10.0.0.1"]);
        let files = file_set(&["conn.log"], &[]);
        let req = request(SearchTool::Ripgrep, &terms, MatchMode::And, &files);

        let pipeline = build(&req);
        assert_eq!(pipeline.stages().len(), 1);

        let stage = &pipeline.stages()[0];
        assert!(stage.starts_with("rg"));
        assert!(stage.contains(&quoted(r"\b10\.0\.0\.1\b")));
        assert!(stage.contains(&quoted("^#")));
        assert!(stage.contains("conn.log"));
    }

    #[test]
    fn test_ripgrep_or_stays_in_one_invocation() {
        let terms = terms(&["8.8.8.8", "1.1.1.1"]);
        let files = file_set(&["conn.log"], &[]);
        let req = request(SearchTool::Ripgrep, &terms, MatchMode::Or, &files);

        let pipeline = build(&req);
        assert_eq!(pipeline.stages().len(), 1);

        let stage = &pipeline.stages()[0];
        assert!(stage.contains(&quoted(r"\b8\.8\.8\.8\b")));
        assert!(stage.contains(&quoted(r"\b1\.1\.1\.1\b")));
    }

    #[test]
    fn test_ripgrep_and_adds_a_stage_per_term() {
        let terms = terms(&["8.8.8.8", "1.1.1.1", "dns"]);
        let files = file_set(&["conn.log"], &[]);
        let req = request(SearchTool::Ripgrep, &terms, MatchMode::And, &files);

        let pipeline = build(&req);
        assert_eq!(pipeline.stages().len(), 3);
        // only the first stage carries the file list
        assert!(pipeline.stages()[0].contains("conn.log"));
        assert!(!pipeline.stages()[1].contains("conn.log"));
        assert!(pipeline.stages()[2].contains(&quoted(r"\bdns\b")));
    }

    #[test]
    fn test_ripgrep_decompression_flag_only_with_compressed_files() {
        let terms = terms(&["x"]);

        let plain_only = file_set(&["conn.log"], &[]);
        let req = request(SearchTool::Ripgrep, &terms, MatchMode::And, &plain_only);
        assert!(!build(&req).stages()[0].contains("-z"));

        let mixed = file_set(&["conn.log"], &["conn.log.gz"]);
        let req = request(SearchTool::Ripgrep, &terms, MatchMode::And, &mixed);
        assert!(build(&req).stages()[0].contains("-z"));
    }

    #[test]
    fn test_invert_suppresses_header_alternate_everywhere() {
        let terms = terms(&["8.8.8.8", "1.1.1.1"]);
        let files = file_set(&["conn.log"], &[]);
        let mut req = request(SearchTool::Ripgrep, &terms, MatchMode::And, &files);
        req.invert = true;

        let pipeline = build(&req);
        for stage in pipeline.stages() {
            assert!(stage.contains("-v"));
            assert!(!stage.contains(&quoted("^#")));
        }
    }

    #[test]
    fn test_passthrough_on_every_stage() {
        let terms = terms(&["a", "b"]);
        let files = file_set(&["conn.log"], &[]);
        let passthrough = vec!["-i".to_string(), "--color=never".to_string()];
        let mut req = request(SearchTool::Ripgrep, &terms, MatchMode::And, &files);
        req.passthrough = &passthrough;

        let pipeline = build(&req);
        assert_eq!(pipeline.stages().len(), 2);
        for stage in pipeline.stages() {
            assert!(stage.contains("-i"));
            assert!(stage.contains("--color=never"));
        }
    }

    #[test]
    fn test_ripgrep_stream_mode_has_no_files() {
        let terms = terms(&["x"]);
        let files = FileSet::default();
        let mut req = request(SearchTool::Ripgrep, &terms, MatchMode::And, &files);
        req.read_from_stream = true;

        let pipeline = build(&req);
        assert_eq!(pipeline.stages().len(), 1);
        assert!(!pipeline.stages()[0].contains(".log"));
    }

    #[test]
    fn test_ugrep_and_is_one_boolean_expression() {
        let terms = terms(&["smtp", "tcp"]);
        let files = file_set(&["conn.log"], &[]);
        let req = request(SearchTool::Ugrep, &terms, MatchMode::And, &files);

        let pipeline = build(&req);
        assert_eq!(pipeline.stages().len(), 1);

        let stage = &pipeline.stages()[0];
        assert!(stage.starts_with("ug"));
        assert!(stage.contains("--bool"));
        assert!(stage.contains("AND"));
        // each clause keeps its own header alternate
        let expr = r"( \bsmtp\b OR ^# ) AND ( \btcp\b OR ^# )";
        assert!(stage.contains(&quoted(expr)));
        // the file source closes the expression
        assert!(stage.trim_end().ends_with("conn.log"));
    }

    #[test]
    fn test_ugrep_or_appends_alternatives() {
        let terms = terms(&["smtp", "tcp"]);
        let files = file_set(&["conn.log"], &[]);
        let req = request(SearchTool::Ugrep, &terms, MatchMode::Or, &files);

        let pipeline = build(&req);
        let expr = r"( \bsmtp\b OR ^# ) OR \btcp\b";
        assert!(pipeline.stages()[0].contains(&quoted(expr)));
    }

    #[test]
    fn test_ugrep_invert_drops_header_clause() {
        let terms = terms(&["smtp", "tcp"]);
        let files = file_set(&["conn.log"], &[]);
        let mut req = request(SearchTool::Ugrep, &terms, MatchMode::And, &files);
        req.invert = true;

        let pipeline = build(&req);
        let stage = &pipeline.stages()[0];
        assert!(stage.contains("-v"));
        assert!(stage.contains(&quoted(r"\bsmtp\b AND \btcp\b")));
    }

    #[test]
    fn test_zgrep_fans_out_over_files() {
        let terms = terms(&["x"]);
        let files = file_set(&["conn.log"], &["conn.log.gz"]);
        let req = request(SearchTool::Zgrep, &terms, MatchMode::And, &files);

        let pipeline = build(&req);
        assert_eq!(pipeline.stages().len(), 2);
        assert!(pipeline.stages()[0].starts_with("printf"));
        assert!(pipeline.stages()[0].contains("conn.log"));
        assert!(pipeline.stages()[1].starts_with("xargs -n1 -P4 zgrep"));
    }

    #[test]
    fn test_zgrep_and_pipes_later_terms() {
        let terms = terms(&["a", "b"]);
        let files = file_set(&["conn.log"], &[]);
        let req = request(SearchTool::Zgrep, &terms, MatchMode::And, &files);

        let pipeline = build(&req);
        // feed, fan-out, then one plain stage for the second term
        assert_eq!(pipeline.stages().len(), 3);
        assert!(pipeline.stages()[2].starts_with("zgrep"));
        assert!(pipeline.stages()[2].contains(&quoted(r"\bb\b")));
    }

    #[test]
    fn test_zgrep_or_stays_in_the_fanout_invocation() {
        let terms = terms(&["a", "b"]);
        let files = file_set(&["conn.log"], &[]);
        let req = request(SearchTool::Zgrep, &terms, MatchMode::Or, &files);

        let pipeline = build(&req);
        assert_eq!(pipeline.stages().len(), 2);
        assert!(pipeline.stages()[1].contains(&quoted(r"\ba\b")));
        assert!(pipeline.stages()[1].contains(&quoted(r"\bb\b")));
    }

    #[test]
    fn test_zgrep_stream_mode_is_direct() {
        let terms = terms(&["a"]);
        let files = FileSet::default();
        let mut req = request(SearchTool::Zgrep, &terms, MatchMode::And, &files);
        req.read_from_stream = true;

        let pipeline = build(&req);
        assert_eq!(pipeline.stages().len(), 1);
        assert!(pipeline.stages()[0].starts_with("zgrep"));
    }

    #[test]
    fn test_grepcidr_plain_files_fan_out() {
        let terms = terms(&["10.0.0.0/8"]);
        let files = file_set(&["conn.log"], &[]);
        let req = request(SearchTool::GrepCidr, &terms, MatchMode::And, &files);

        let pipeline = build(&req);
        assert_eq!(pipeline.stages().len(), 2);
        assert!(pipeline.stages()[1].contains("grepcidr"));
        assert!(pipeline.stages()[1].starts_with("xargs"));
    }

    #[test]
    fn test_grepcidr_compressed_files_decompress_first() {
        let terms = terms(&["10.0.0.0/8"]);
        let files = file_set(&[], &["conn.log.gz"]);
        let req = request(SearchTool::GrepCidr, &terms, MatchMode::And, &files);

        let pipeline = build(&req);
        assert_eq!(pipeline.stages().len(), 3);
        assert!(pipeline.stages()[1].contains("zcat"));
        assert!(pipeline.stages()[2].starts_with("grepcidr"));
    }

    #[test]
    fn test_grepcidr_mixed_files_concatenate() {
        let terms = terms(&["10.0.0.0/8"]);
        let files = file_set(&["conn.log"], &["conn.log.gz"]);
        let req = request(SearchTool::GrepCidr, &terms, MatchMode::And, &files);

        let pipeline = build(&req);
        assert_eq!(pipeline.stages().len(), 2);
        assert!(pipeline.stages()[0].starts_with("{ cat"));
        assert!(pipeline.stages()[0].contains("zcat"));
        assert!(pipeline.stages()[1].starts_with("grepcidr"));
    }

    #[test]
    fn test_grepcidr_or_joins_networks_with_commas() {
        let raws = ["10.0.0.0/8", "192.168.0.0/16"];
        let terms: Vec<SearchTerm> = raws
            .iter()
            .map(|r| {
                SearchTerm::new(
                    r,
                    TermOptions {
                        regex: true,
                        ..Default::default()
                    },
                )
            })
            .collect();
        let files = FileSet::default();
        let mut req = request(SearchTool::GrepCidr, &terms, MatchMode::Or, &files);
        req.read_from_stream = true;

        let pipeline = build(&req);
        assert_eq!(pipeline.stages().len(), 1);
        assert!(pipeline.stages()[0].contains(&quoted("10.0.0.0/8,192.168.0.0/16")));
    }

    #[test]
    fn test_cat_concatenates_plain_before_compressed() {
        let terms = Vec::new();
        let files = file_set(&["a.log", "b.log"], &["c.log.gz"]);
        let req = request(SearchTool::Cat, &terms, MatchMode::And, &files);

        let pipeline = build(&req);
        assert_eq!(pipeline.stages().len(), 1);

        let stage = &pipeline.stages()[0];
        assert!(stage.starts_with("{ cat"));
        let cat_pos = stage.find("cat a.log").unwrap();
        let zcat_pos = stage.find("zcat c.log.gz").unwrap();
        assert!(cat_pos < zcat_pos);
    }

    #[test]
    fn test_cat_plain_only_has_no_grouping() {
        let terms = Vec::new();
        let files = file_set(&["a.log"], &[]);
        let req = request(SearchTool::Cat, &terms, MatchMode::And, &files);

        let pipeline = build(&req);
        assert_eq!(pipeline.stages()[0], "cat a.log");
    }

    #[test]
    fn test_cat_stream_mode_passes_through() {
        let terms = Vec::new();
        let files = FileSet::default();
        let mut req = request(SearchTool::Cat, &terms, MatchMode::And, &files);
        req.read_from_stream = true;

        let pipeline = build(&req);
        assert_eq!(pipeline.stages()[0], "cat");
    }

    #[test]
    fn test_render_joins_with_pipes() {
        let mut pipeline = Pipeline::default();
        pipeline.push("cat a.log".to_string());
        pipeline.push("grep x".to_string());
        assert_eq!(pipeline.render(), "cat a.log | grep x");
    }

    #[test]
    fn test_no_terms_with_passthrough_is_one_invocation() {
        let terms = Vec::new();
        let files = file_set(&["conn.log"], &[]);
        let passthrough = vec!["-c".to_string()];
        let mut req = request(SearchTool::Ripgrep, &terms, MatchMode::And, &files);
        req.passthrough = &passthrough;

        let pipeline = build(&req);
        assert_eq!(pipeline.stages().len(), 1);
        assert!(pipeline.stages()[0].contains("-c"));
        assert!(!pipeline.stages()[0].contains("-e"));
    }
}
