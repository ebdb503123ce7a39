//! Per-tool validators: pure functions from (parameters, rules) to a verdict.

use serde_json::{Map, Value};

use super::store::{DatabaseQueryRules, FileReaderRules};
use super::Verdict;

fn str_param<'a>(params: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    params.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Validate a `file_reader` action.
///
/// The extension check runs before the path-prefix check; both must hold for
/// the action to pass, the order only decides which reason gets reported.
pub fn validate_file_reader(params: &Map<String, Value>, rules: &FileReaderRules) -> Verdict {
    let Some(path) = str_param(params, "path") else {
        return Verdict::Deny("missing 'path' parameter".to_string());
    };

    if let Some(ext) = rules
        .disallowed_extensions
        .iter()
        .find(|ext| path.ends_with(ext.as_str()))
    {
        return Verdict::Deny(format!(
            "path '{}' has disallowed extension '{}'",
            path, ext
        ));
    }

    // An empty prefix list means no directory is readable at all.
    if !rules.allowed_paths.iter().any(|p| path.starts_with(p.as_str())) {
        return Verdict::Deny(format!("path '{}' is not in an allowed directory", path));
    }

    Verdict::Allow
}

/// Validate a `database_query` action.
///
/// Keyword matching is a case-insensitive substring scan, not a token match,
/// so a keyword embedded in an identifier also denies. That bias towards
/// false positives is intentional.
pub fn validate_database_query(params: &Map<String, Value>, rules: &DatabaseQueryRules) -> Verdict {
    let Some(query) = str_param(params, "query") else {
        return Verdict::Deny("missing 'query' parameter".to_string());
    };

    let upper = query.to_uppercase();
    if let Some(keyword) = rules
        .forbidden_keywords
        .iter()
        .find(|kw| upper.contains(&kw.to_uppercase()))
    {
        return Verdict::Deny(format!("query contains forbidden keyword '{}'", keyword));
    }

    Verdict::Allow
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(key: &str, value: &str) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(key.to_string(), json!(value));
        map
    }

    fn file_rules() -> FileReaderRules {
        FileReaderRules {
            disallowed_extensions: vec![".yaml".into()],
            allowed_paths: vec!["/data/public".into()],
        }
    }

    fn db_rules() -> DatabaseQueryRules {
        DatabaseQueryRules {
            forbidden_keywords: vec!["DROP".into(), "DELETE".into()],
        }
    }

    // --- file_reader ---

    #[test]
    fn file_reader_allows_public_path() {
        let verdict = validate_file_reader(&params("path", "/data/public/report.txt"), &file_rules());
        assert_eq!(verdict, Verdict::Allow);
    }

    #[test]
    fn file_reader_denies_disallowed_extension() {
        let verdict = validate_file_reader(&params("path", "/data/public/config.yaml"), &file_rules());
        assert!(verdict.is_denied());
        assert!(verdict.reason().unwrap().contains("extension"));
    }

    #[test]
    fn file_reader_denies_path_outside_allowed_dirs() {
        let verdict = validate_file_reader(&params("path", "/etc/shadow"), &file_rules());
        assert!(verdict.is_denied());
        assert!(verdict.reason().unwrap().contains("allowed directory"));
    }

    #[test]
    fn file_reader_denies_missing_path() {
        assert!(validate_file_reader(&Map::new(), &file_rules()).is_denied());
        assert!(validate_file_reader(&params("path", ""), &file_rules()).is_denied());
    }

    #[test]
    fn file_reader_extension_match_is_case_sensitive() {
        // ".YAML" does not suffix-match ".yaml", so only the prefix rule applies
        let verdict = validate_file_reader(&params("path", "/data/public/config.YAML"), &file_rules());
        assert_eq!(verdict, Verdict::Allow);
    }

    #[test]
    fn file_reader_empty_prefix_list_denies_everything() {
        let rules = FileReaderRules {
            disallowed_extensions: vec![],
            allowed_paths: vec![],
        };
        assert!(validate_file_reader(&params("path", "/anything"), &rules).is_denied());
    }

    #[test]
    fn file_reader_extension_check_wins_over_prefix_check() {
        // Violates both rules; the extension reason is the one reported
        let verdict = validate_file_reader(&params("path", "/etc/secrets.yaml"), &file_rules());
        assert!(verdict.reason().unwrap().contains("extension"));
    }

    // --- database_query ---

    #[test]
    fn database_query_allows_select() {
        let verdict = validate_database_query(&params("query", "SELECT * FROM users"), &db_rules());
        assert_eq!(verdict, Verdict::Allow);
    }

    #[test]
    fn database_query_denies_forbidden_keyword() {
        let verdict = validate_database_query(&params("query", "DROP TABLE users;"), &db_rules());
        assert!(verdict.is_denied());
    }

    #[test]
    fn database_query_keyword_match_is_case_insensitive() {
        assert!(validate_database_query(&params("query", "drop table users;"), &db_rules()).is_denied());
        let rules = DatabaseQueryRules {
            forbidden_keywords: vec!["delete".into()],
        };
        assert!(validate_database_query(&params("query", "DELETE FROM users"), &rules).is_denied());
    }

    #[test]
    fn database_query_substring_match_hits_identifiers() {
        // "undeleted" contains "delete"; permissive by design
        let verdict =
            validate_database_query(&params("query", "SELECT undeleted FROM items"), &db_rules());
        assert!(verdict.is_denied());
    }

    #[test]
    fn database_query_denies_missing_query() {
        assert!(validate_database_query(&Map::new(), &db_rules()).is_denied());
        assert!(validate_database_query(&params("query", ""), &db_rules()).is_denied());
    }
}
