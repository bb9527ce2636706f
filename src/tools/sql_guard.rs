//! Keyword-based safety gate for SQL text.
//!
//! Every statement that reaches the executor passes through [`check`]. The gate
//! splits the text into words (runs of ASCII letters, digits and `_`),
//! uppercases them and rejects the statement if any word belongs to
//! [`BLOCKED_KEYWORDS`].
//!
//! This is a textual heuristic, not a SQL parser:
//! - keywords inside string literals, quoted identifiers and comments still
//!   count, so `WHERE note = 'please delete'` is rejected;
//! - mutating syntax that does not use a blocked word (for example a `PRAGMA`
//!   assignment or a bare `REPLACE INTO`) passes. `REPLACE` is left out of the
//!   list because the `replace()` string function is common in read queries.
//!
//! It blocks obvious mutating statements sent by a careless caller. It is not
//! an injection-proof security boundary.

use crate::error::{DbError, DbResult};
use tracing::warn;

/// Words that cause a statement to be rejected, matched case-insensitively
/// as whole words.
pub const BLOCKED_KEYWORDS: &[&str] = &[
    "ALTER", "ATTACH", "CREATE", "DELETE", "DETACH", "DROP", "GRANT", "INSERT", "MERGE", "REINDEX",
    "RENAME", "REVOKE", "TRUNCATE", "UPDATE", "UPSERT", "VACUUM",
];

/// Split SQL text into uppercase words.
fn words(sql: &str) -> impl Iterator<Item = String> + '_ {
    sql.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .map(|w| w.to_ascii_uppercase())
}

/// Return the first blocked keyword found in `sql`, if any.
pub fn find_blocked_keyword(sql: &str) -> Option<&'static str> {
    words(sql).find_map(|word| {
        BLOCKED_KEYWORDS
            .iter()
            .find(|kw| **kw == word.as_str())
            .copied()
    })
}

/// Validate SQL text against the keyword gate.
///
/// # Examples
///
/// ```
/// use sqlite_analytics_mcp::tools::sql_guard::check;
///
/// assert!(check("SELECT * FROM users").is_ok());
/// assert!(check("  drop TABLE t").is_err());
/// // Whole words only
/// assert!(check("SELECT updated_at FROM users").is_ok());
/// ```
pub fn check(sql: &str) -> DbResult<()> {
    if sql.trim().is_empty() {
        return Err(DbError::invalid_input("Empty SQL statement"));
    }

    match find_blocked_keyword(sql) {
        Some(keyword) => {
            warn!(keyword = keyword, "Query rejected by safety gate");
            Err(DbError::rejected_query(keyword))
        }
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_allowed() {
        assert!(check("SELECT * FROM users").is_ok());
        assert!(check("select count(*) from orders where total > 10").is_ok());
    }

    #[test]
    fn test_cte_and_pragma_reads_allowed() {
        assert!(check("WITH t AS (SELECT 1 AS x) SELECT x FROM t").is_ok());
        assert!(check("PRAGMA table_info(users)").is_ok());
        assert!(check("EXPLAIN QUERY PLAN SELECT * FROM users").is_ok());
    }

    #[test]
    fn test_each_blocked_keyword_rejected() {
        for kw in BLOCKED_KEYWORDS {
            let sql = format!("{} something", kw.to_lowercase());
            let err = check(&sql).unwrap_err();
            assert!(
                matches!(err, DbError::RejectedQuery { ref keyword } if keyword.as_str() == *kw),
                "expected {} to be rejected, got {:?}",
                kw,
                err
            );
        }
    }

    #[test]
    fn test_mixed_case_and_whitespace() {
        assert!(check("  drop TABLE t").is_err());
        assert!(check("\n\tDeLeTe\nFROM users").is_err());
    }

    #[test]
    fn test_keyword_after_punctuation() {
        assert!(check("SELECT 1;DROP TABLE users").is_err());
        assert!(check("SELECT 1;(delete)").is_err());
    }

    #[test]
    fn test_whole_word_only() {
        assert!(check("SELECT updated_at, creator, dropdown FROM t").is_ok());
        assert!(check("SELECT * FROM insert_log").is_ok());
        assert!(check("SELECT deleted FROM t").is_ok());
    }

    #[test]
    fn test_literals_and_comments_still_count() {
        assert!(check("SELECT * FROM notes WHERE body = 'please delete'").is_err());
        assert!(check("SELECT 1 -- drop later").is_err());
        assert!(check("SELECT \"update\" FROM t").is_err());
    }

    #[test]
    fn test_non_keyword_mutation_passes() {
        // Known limitation: the gate is textual, not semantic
        assert!(check("PRAGMA user_version = 7").is_ok());
        assert!(check("REPLACE INTO t VALUES (1)").is_ok());
    }

    #[test]
    fn test_replace_function_allowed() {
        assert!(check("SELECT replace(name, 'a', 'b') FROM users").is_ok());
        // INSERT OR REPLACE is still caught by INSERT
        assert!(check("INSERT OR REPLACE INTO t VALUES (1)").is_err());
    }

    #[test]
    fn test_empty_sql_is_invalid_input() {
        assert!(matches!(check(""), Err(DbError::InvalidInput { .. })));
        assert!(matches!(check("   \n"), Err(DbError::InvalidInput { .. })));
    }

    #[test]
    fn test_find_blocked_keyword_reports_first() {
        assert_eq!(
            find_blocked_keyword("insert into t select * from u; drop table u"),
            Some("INSERT")
        );
        assert_eq!(find_blocked_keyword("SELECT 1"), None);
    }
}
