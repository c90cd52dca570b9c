//! Argument synthesis for `zoekt-git-index` and `zoekt-webserver`.
//!
//! Each invocation is built by appending flag groups in a fixed declared
//! order. A group is a pure function of one config slice, so adding a flag
//! means adding a group to the table, never reordering existing output.
//!
//! Argument vectors hold raw values. Quoting (shell, XML, systemd) is the
//! renderer's job, applied per element.

use std::fmt::Display;
use std::path::Path;

use crate::types::{Config, CtagsConfig, DaemonConfig, WebserverConfig, DEFAULT_BRANCHES};

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Ordered argv accumulator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgList(Vec<String>);

impl ArgList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a bare flag, e.g. `-delta`.
    pub fn flag(&mut self, name: &str) -> &mut Self {
        self.0.push(format!("-{name}"));
        self
    }

    /// Append a flag followed by its value as a separate element.
    pub fn opt(&mut self, name: &str, value: impl Display) -> &mut Self {
        self.0.push(format!("-{name}"));
        self.0.push(value.to_string());
        self
    }

    pub fn path_opt(&mut self, name: &str, value: &Path) -> &mut Self {
        self.opt(name, value.display())
    }

    /// Append a positional argument.
    pub fn positional(&mut self, value: impl Display) -> &mut Self {
        self.0.push(value.to_string());
        self
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

// ---------------------------------------------------------------------------
// Indexer
// ---------------------------------------------------------------------------

struct IndexerInputs<'a> {
    daemon: &'a DaemonConfig,
    ctags: &'a CtagsConfig,
}

type IndexerGroup = fn(&IndexerInputs<'_>, &mut ArgList);

/// Emission order of `zoekt-git-index` flag groups.
const INDEXER_GROUPS: &[IndexerGroup] = &[
    index_dir_group,
    ctags_group,
    delta_group,
    branches_group,
    large_files_group,
    parallelism_group,
    file_limit_group,
    repositories_group,
];

fn index_dir_group(input: &IndexerInputs<'_>, args: &mut ArgList) {
    args.path_opt("index", &input.daemon.index_directory);
}

fn ctags_group(input: &IndexerInputs<'_>, args: &mut ArgList) {
    match (input.ctags.enabled, input.ctags.require_success) {
        (true, true) => {
            args.flag("require_ctags");
        }
        (false, _) => {
            args.flag("disable_ctags");
        }
        // Symbols are best-effort: the indexer carries on without them.
        (true, false) => {}
    }
}

fn delta_group(input: &IndexerInputs<'_>, args: &mut ArgList) {
    if input.daemon.delta_indexing {
        args.flag("delta");
    }
}

fn branches_group(input: &IndexerInputs<'_>, args: &mut ArgList) {
    if input.daemon.branches != DEFAULT_BRANCHES {
        args.opt("branches", &input.daemon.branches);
    }
}

fn large_files_group(input: &IndexerInputs<'_>, args: &mut ArgList) {
    for pattern in &input.daemon.large_file_patterns {
        args.opt("large_file", pattern);
    }
}

fn parallelism_group(input: &IndexerInputs<'_>, args: &mut ArgList) {
    args.opt("parallelism", input.daemon.parallelism);
}

fn file_limit_group(input: &IndexerInputs<'_>, args: &mut ArgList) {
    args.opt("file_limit", input.daemon.file_size_limit_bytes);
}

fn repositories_group(input: &IndexerInputs<'_>, args: &mut ArgList) {
    for repo in &input.daemon.repositories {
        args.positional(repo.display());
    }
}

/// `zoekt-git-index` argv (executable excluded).
pub fn indexer_args(daemon: &DaemonConfig, ctags: &CtagsConfig) -> Vec<String> {
    let input = IndexerInputs { daemon, ctags };
    let mut args = ArgList::new();
    for group in INDEXER_GROUPS {
        group(&input, &mut args);
    }
    args.into_vec()
}

// ---------------------------------------------------------------------------
// Webserver
// ---------------------------------------------------------------------------

/// `zoekt-webserver` argv (executable excluded).
pub fn webserver_args(daemon: &DaemonConfig, webserver: &WebserverConfig) -> Vec<String> {
    let mut args = ArgList::new();
    args.path_opt("index", &daemon.index_directory)
        .opt("listen", listen_address(daemon.port))
        .path_opt("log_dir", &webserver.log_directory)
        .opt("log_refresh", &webserver.log_refresh_interval);
    if webserver.rpc_enabled {
        args.flag("rpc");
    }
    if webserver.pprof_enabled {
        args.flag("pprof");
    }
    if !webserver.html_enabled {
        args.positional("-html=false");
    }
    args.into_vec()
}

/// `:<port>`: the webserver binds every interface on `port`.
pub fn listen_address(port: u16) -> String {
    format!(":{port}")
}

// ---------------------------------------------------------------------------
// Both invocations
// ---------------------------------------------------------------------------

/// Argument vectors for one generation pass. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedArguments {
    pub indexer: Vec<String>,
    pub webserver: Vec<String>,
}

impl SynthesizedArguments {
    pub fn from_config(config: &Config) -> Self {
        SynthesizedArguments {
            indexer: indexer_args(&config.daemon, &config.ctags),
            webserver: webserver_args(&config.daemon, &config.webserver),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::path::PathBuf;

    fn daemon() -> DaemonConfig {
        DaemonConfig {
            enabled: true,
            repositories: vec![PathBuf::from("/code/api"), PathBuf::from("/code/my app")],
            index_directory: PathBuf::from("/var/zoekt"),
            ..DaemonConfig::default()
        }
    }

    fn webserver() -> WebserverConfig {
        WebserverConfig {
            log_directory: PathBuf::from("/var/zoekt/logs"),
            ..WebserverConfig::default()
        }
    }

    fn count(args: &[String], needle: &str) -> usize {
        args.iter().filter(|a| a.as_str() == needle).count()
    }

    #[test]
    fn default_indexer_invocation() {
        let args = indexer_args(&daemon(), &CtagsConfig::default());
        assert_eq!(
            args,
            vec![
                "-index",
                "/var/zoekt",
                "-parallelism",
                "4",
                "-file_limit",
                "2097152",
                "/code/api",
                "/code/my app",
            ]
        );
    }

    #[test]
    fn full_indexer_invocation_keeps_group_order() {
        let mut d = daemon();
        d.delta_indexing = true;
        d.branches = "main,dev".to_string();
        d.large_file_patterns = vec!["*.min.js".to_string()];
        d.parallelism = 8;
        d.file_size_limit_bytes = 1024;
        let ctags = CtagsConfig {
            enabled: true,
            require_success: true,
        };

        let args = indexer_args(&d, &ctags);
        assert_eq!(
            args,
            vec![
                "-index",
                "/var/zoekt",
                "-require_ctags",
                "-delta",
                "-branches",
                "main,dev",
                "-large_file",
                "*.min.js",
                "-parallelism",
                "8",
                "-file_limit",
                "1024",
                "/code/api",
                "/code/my app",
            ]
        );
    }

    #[rstest]
    #[case(true, true, Some("-require_ctags"), "-disable_ctags")]
    #[case(false, true, Some("-disable_ctags"), "-require_ctags")]
    #[case(false, false, Some("-disable_ctags"), "-require_ctags")]
    #[case(true, false, None, "-require_ctags")]
    fn ctags_flags_are_exclusive(
        #[case] enabled: bool,
        #[case] require_success: bool,
        #[case] present: Option<&str>,
        #[case] absent: &str,
    ) {
        let args = indexer_args(
            &daemon(),
            &CtagsConfig {
                enabled,
                require_success,
            },
        );
        if let Some(flag) = present {
            assert_eq!(count(&args, flag), 1);
        } else {
            assert_eq!(count(&args, "-disable_ctags"), 0);
        }
        assert_eq!(count(&args, absent), 0);
    }

    #[rstest]
    #[case("HEAD", false)]
    #[case("main", true)]
    #[case("main,dev", true)]
    #[case("head", true)]
    fn branches_omitted_only_for_head(#[case] branches: &str, #[case] emitted: bool) {
        let mut d = daemon();
        d.branches = branches.to_string();
        let args = indexer_args(&d, &CtagsConfig::default());
        let pos = args.iter().position(|a| a == "-branches");
        assert_eq!(pos.is_some(), emitted);
        if let Some(i) = pos {
            assert_eq!(args[i + 1], branches);
        }
    }

    #[test]
    fn large_file_pairs_keep_input_order_without_dedup() {
        let mut d = daemon();
        d.large_file_patterns = vec![
            "*.min.js".to_string(),
            "*.generated.go".to_string(),
            "*.min.js".to_string(),
        ];
        let args = indexer_args(&d, &CtagsConfig::default());
        let values: Vec<&str> = args
            .windows(2)
            .filter(|w| w[0] == "-large_file")
            .map(|w| w[1].as_str())
            .collect();
        assert_eq!(values, vec!["*.min.js", "*.generated.go", "*.min.js"]);
    }

    #[test]
    fn synthesis_is_deterministic() {
        let mut cfg = Config::default();
        cfg.daemon = daemon();
        cfg.daemon.large_file_patterns = vec!["*.min.js".to_string(), "*.generated.go".to_string()];
        cfg.webserver = webserver();
        let first = SynthesizedArguments::from_config(&cfg);
        let second = SynthesizedArguments::from_config(&cfg);
        assert_eq!(first, second);
        assert_eq!(first.indexer.join("\0"), second.indexer.join("\0"));
    }

    #[test]
    fn default_webserver_invocation() {
        let args = webserver_args(&daemon(), &webserver());
        assert_eq!(
            args,
            vec![
                "-index",
                "/var/zoekt",
                "-listen",
                ":6070",
                "-log_dir",
                "/var/zoekt/logs",
                "-log_refresh",
                "24h",
                "-rpc",
            ]
        );
    }

    #[test]
    fn webserver_optional_flags() {
        let mut w = webserver();
        w.rpc_enabled = false;
        w.pprof_enabled = true;
        w.html_enabled = false;
        let args = webserver_args(&daemon(), &w);
        assert_eq!(count(&args, "-rpc"), 0);
        assert_eq!(count(&args, "-pprof"), 1);
        assert_eq!(args.last().map(String::as_str), Some("-html=false"));
    }

    #[test]
    fn html_enabled_is_implicit() {
        let args = webserver_args(&daemon(), &webserver());
        assert!(!args.iter().any(|a| a.starts_with("-html")));
    }

    #[test]
    fn listen_follows_port() {
        let mut d = daemon();
        d.port = 7777;
        let args = webserver_args(&d, &webserver());
        let i = args.iter().position(|a| a == "-listen").expect("-listen");
        assert_eq!(args[i + 1], ":7777");
    }
}
