//! Integration tests for CSV export.

mod common;

use common::{USER_COUNT, connected_session};
use sqlite_analytics_mcp::error::DbError;
use sqlite_analytics_mcp::tools::export::{ExportToCsvInput, ExportToolHandler};

fn input(sql: &str, filename: &std::path::Path) -> ExportToCsvInput {
    ExportToCsvInput {
        sql: sql.to_string(),
        filename: filename.to_str().unwrap().to_string(),
    }
}

#[tokio::test]
async fn test_export_writes_header_and_rows() {
    let (db, session) = connected_session().await;
    let handler = ExportToolHandler::new(session);
    let target = db.sibling("users.csv");

    let output = handler
        .export_to_csv(input("SELECT id, name FROM users ORDER BY id", &target))
        .await
        .unwrap();
    assert_eq!(output.row_count, USER_COUNT as usize);
    assert_eq!(output.columns, vec!["id", "name"]);

    let content = std::fs::read_to_string(&target).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), USER_COUNT as usize + 1);
    assert_eq!(lines[0], "id,name");
    assert_eq!(lines[1], "1,user01");
    assert_eq!(lines[25], "25,user25");
}

#[tokio::test]
async fn test_export_null_and_quoted_fields() {
    let (db, session) = connected_session().await;
    let handler = ExportToolHandler::new(session);
    let target = db.sibling("mixed.csv");

    handler
        .export_to_csv(input(
            "SELECT email, name || ', esq.' AS title FROM users WHERE id = 5",
            &target,
        ))
        .await
        .unwrap();

    let content = std::fs::read_to_string(&target).unwrap();
    assert_eq!(content, "email,title\n,\"user05, esq.\"\n");
}

#[tokio::test]
async fn test_export_join_with_repeated_column_names() {
    let (db, session) = connected_session().await;
    let handler = ExportToolHandler::new(session);
    let target = db.sibling("join.csv");

    let output = handler
        .export_to_csv(input(
            "SELECT u.id, o.id FROM users u JOIN orders o ON o.user_id = u.id ORDER BY o.id",
            &target,
        ))
        .await
        .unwrap();
    assert_eq!(output.columns, vec!["id", "id"]);
    assert_eq!(output.row_count, 3);
    assert_eq!(
        std::fs::read_to_string(&target).unwrap(),
        "id,id\n1,1\n1,2\n2,3\n"
    );
}

#[tokio::test]
async fn test_export_filename_used_verbatim() {
    let (db, session) = connected_session().await;
    let handler = ExportToolHandler::new(session);
    let target = db.sibling("padded.csv ");

    let output = handler
        .export_to_csv(input("SELECT 1 AS one", &target))
        .await
        .unwrap();
    assert!(output.filename.ends_with("padded.csv "));
    assert!(target.exists());
    assert!(!db.sibling("padded.csv").exists());
}

#[tokio::test]
async fn test_export_empty_result_writes_header_only() {
    let (db, session) = connected_session().await;
    let handler = ExportToolHandler::new(session);
    let target = db.sibling("empty.csv");

    let output = handler
        .export_to_csv(input("SELECT id, total FROM orders WHERE total < 0", &target))
        .await
        .unwrap();
    assert_eq!(output.row_count, 0);
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "id,total\n");
}

#[tokio::test]
async fn test_export_overwrites_existing_file() {
    let (db, session) = connected_session().await;
    let handler = ExportToolHandler::new(session);
    let target = db.sibling("out.csv");
    std::fs::write(&target, "stale content that is longer than the export\n").unwrap();

    handler
        .export_to_csv(input("SELECT 1 AS one", &target))
        .await
        .unwrap();
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "one\n1\n");
}

#[tokio::test]
async fn test_rejected_query_writes_nothing() {
    let (db, session) = connected_session().await;
    let handler = ExportToolHandler::new(session);
    let target = db.sibling("never.csv");

    let err = handler
        .export_to_csv(input("DELETE FROM users", &target))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::RejectedQuery { .. }));
    assert!(!target.exists());
}

#[tokio::test]
async fn test_missing_directory_is_io_error() {
    let (db, session) = connected_session().await;
    let handler = ExportToolHandler::new(session);
    let target = db.sibling("no_such_dir").join("out.csv");

    let err = handler
        .export_to_csv(input("SELECT 1", &target))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Io { .. }));
}

#[tokio::test]
async fn test_empty_filename_rejected() {
    let (_db, session) = connected_session().await;
    let handler = ExportToolHandler::new(session);

    let err = handler
        .export_to_csv(ExportToCsvInput {
            sql: "SELECT 1".to_string(),
            filename: "  ".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::InvalidInput { .. }));
}
