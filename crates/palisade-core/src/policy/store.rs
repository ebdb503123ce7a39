//! Policy document: allow-listed tools plus per-tool rule records.
//!
//! Loaded once at startup and immutable afterwards, so a `Policy` can be
//! shared across request handlers without locking.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// Rules for the `file_reader` tool.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileReaderRules {
    /// Deny when the path ends with any of these (case-sensitive suffix match)
    pub disallowed_extensions: Vec<String>,
    /// The path must start with one of these prefixes; empty list denies all
    pub allowed_paths: Vec<String>,
}

/// Rules for the `database_query` tool.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseQueryRules {
    /// Deny when the query contains any of these (case-insensitive substring)
    pub forbidden_keywords: Vec<String>,
}

/// Closed union of per-tool rule records.
///
/// Parsing is shape-driven: a `tool_rules` table that matches neither known
/// record lands in `Unvalidated`, which no validator inspects. Such entries
/// are inert once the tool is allow-listed; `PolicyStore::load` warns about
/// each so the gap shows up in logs.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ToolRules {
    DatabaseQuery(DatabaseQueryRules),
    FileReader(FileReaderRules),
    Unvalidated(toml::Value),
}

/// The loaded policy: which tools may run, and under what constraints.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Policy {
    /// A tool absent from this set is always denied
    #[serde(default)]
    pub allowed_tools: HashSet<String>,

    /// Extra constraints per tool; an allow-listed tool with no entry here
    /// is unconditionally permitted
    #[serde(default)]
    pub tool_rules: HashMap<String, ToolRules>,
}

impl Policy {
    /// The fail-closed default: no tool is allow-listed, every action denies.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML policy")
    }
}

/// How the last `PolicyStore::load` went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    MissingFile,
    ParseError,
}

/// Holds the policy together with its load status so callers can tell a
/// deliberately empty policy apart from a failed load.
#[derive(Debug, Clone)]
pub struct PolicyStore {
    pub policy: Policy,
    pub outcome: LoadOutcome,
}

impl PolicyStore {
    /// Load a policy from disk. Never errors: a missing or malformed file
    /// degrades to the empty policy, which denies every action until the
    /// file is fixed. The failure is visible via `outcome` and an error log.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => match Policy::from_toml_str(&content) {
                Ok(policy) => {
                    for (tool, rules) in &policy.tool_rules {
                        if matches!(rules, ToolRules::Unvalidated(_)) {
                            warn!(
                                tool = %tool,
                                "Rule entry has no registered validator; it will not constrain the tool"
                            );
                        }
                    }
                    info!(
                        path = ?path,
                        allowed_tools = policy.allowed_tools.len(),
                        "Loaded action policy"
                    );
                    Self {
                        policy,
                        outcome: LoadOutcome::Loaded,
                    }
                }
                Err(e) => {
                    error!(
                        path = ?path,
                        error = %e,
                        "Policy file is malformed; falling back to empty policy, all actions will be denied"
                    );
                    Self {
                        policy: Policy::empty(),
                        outcome: LoadOutcome::ParseError,
                    }
                }
            },
            Err(e) => {
                error!(
                    path = ?path,
                    error = %e,
                    "Policy file is unreadable; falling back to empty policy, all actions will be denied"
                );
                Self {
                    policy: Policy::empty(),
                    outcome: LoadOutcome::MissingFile,
                }
            }
        }
    }

    /// True when the store fell back to the empty policy instead of loading.
    pub fn is_degraded(&self) -> bool {
        self.outcome != LoadOutcome::Loaded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE_POLICY: &str = r#"
allowed_tools = ["web_search", "file_reader", "database_query"]

[tool_rules.file_reader]
disallowed_extensions = [".yaml", ".env"]
allowed_paths = ["/data/public"]

[tool_rules.database_query]
forbidden_keywords = ["DROP", "DELETE"]
"#;

    #[test]
    fn parses_sample_policy() {
        let policy = Policy::from_toml_str(SAMPLE_POLICY).unwrap();
        assert!(policy.allowed_tools.contains("web_search"));
        assert_eq!(policy.tool_rules.len(), 2);

        match policy.tool_rules.get("file_reader").unwrap() {
            ToolRules::FileReader(r) => {
                assert_eq!(r.disallowed_extensions, vec![".yaml", ".env"]);
                assert_eq!(r.allowed_paths, vec!["/data/public"]);
            }
            other => panic!("expected FileReader rules, got {:?}", other),
        }
        match policy.tool_rules.get("database_query").unwrap() {
            ToolRules::DatabaseQuery(r) => {
                assert_eq!(r.forbidden_keywords, vec!["DROP", "DELETE"]);
            }
            other => panic!("expected DatabaseQuery rules, got {:?}", other),
        }
    }

    #[test]
    fn unknown_rule_shape_parses_as_unvalidated() {
        let policy = Policy::from_toml_str(
            r#"
allowed_tools = ["code_runner"]

[tool_rules.code_runner]
max_runtime_secs = 5
"#,
        )
        .unwrap();
        assert!(matches!(
            policy.tool_rules.get("code_runner").unwrap(),
            ToolRules::Unvalidated(_)
        ));
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let policy = Policy::from_toml_str("").unwrap();
        assert!(policy.allowed_tools.is_empty());
        assert!(policy.tool_rules.is_empty());
    }

    #[test]
    fn load_missing_file_degrades() {
        let store = PolicyStore::load(Path::new("/nonexistent/policy.toml"));
        assert_eq!(store.outcome, LoadOutcome::MissingFile);
        assert!(store.is_degraded());
        assert!(store.policy.allowed_tools.is_empty());
    }

    #[test]
    fn load_malformed_file_degrades() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "allowed_tools = not-a-list").unwrap();

        let store = PolicyStore::load(file.path());
        assert_eq!(store.outcome, LoadOutcome::ParseError);
        assert!(store.is_degraded());
        assert!(store.policy.allowed_tools.is_empty());
    }

    #[test]
    fn load_valid_file_reports_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", SAMPLE_POLICY).unwrap();

        let store = PolicyStore::load(file.path());
        assert_eq!(store.outcome, LoadOutcome::Loaded);
        assert!(!store.is_degraded());
        assert_eq!(store.policy.allowed_tools.len(), 3);
    }
}
