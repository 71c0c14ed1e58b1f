//! Tests for the file drop module

use super::*;
use crate::error::Error;
use pretty_assertions::assert_eq;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};
use test_case::test_case;

fn local_file(dir: &TempDir, name: &str, contents: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents).unwrap();
    path
}

// ============================================================================
// ImportToken Tests
// ============================================================================

#[test_case("/Import/Employee/batch.xml", "/Import/Employee", "batch.xml" ; "absolute")]
#[test_case("root/Import/Punch/p.csv", "root/Import/Punch", "p.csv" ; "relative")]
#[test_case("/T", "/", "T" ; "top level")]
#[test_case("T", "", "T" ; "bare name")]
fn test_token_split(token: &str, dir: &str, file: &str) {
    assert_eq!(ImportToken::new(token).split(), (dir, file));
}

#[test_case("/Import/Employee/batch.xml",
            "/Import/Employee/archive/batch.xml.done",
            "/Import/Employee/error/batch.xml.error" ; "nested")]
#[test_case("/T", "/archive/T.done", "/error/T.error" ; "top level")]
#[test_case("T", "archive/T.done", "error/T.error" ; "bare name")]
fn test_token_markers(token: &str, done: &str, error: &str) {
    let token = ImportToken::new(token);
    assert_eq!(token.done_marker(), done);
    assert_eq!(token.error_marker(), error);
}

#[test]
fn test_token_ready_path_and_display() {
    let token = ImportToken::from("/Import/Employee/batch.xml");
    assert_eq!(token.ready_path(), "/Import/Employee/batch.xml.ready");
    assert_eq!(token.to_string(), "/Import/Employee/batch.xml");
    assert_eq!(
        serde_json::to_string(&token).unwrap(),
        "\"/Import/Employee/batch.xml\""
    );
}

#[test]
fn test_import_state_terminal() {
    assert!(!ImportState::Pending.is_terminal());
    assert!(ImportState::Succeeded.is_terminal());
    assert!(ImportState::Failed.is_terminal());
    assert_eq!(ImportState::Pending.to_string(), "pending");
}

// ============================================================================
// Upload Tests
// ============================================================================

#[test]
fn test_staging_path() {
    let file_drop = FileDrop::new(MemoryStore::new(), "");
    assert_eq!(
        file_drop.staging_path("Employee", "batch.xml"),
        "/Import/Employee/batch.xml"
    );

    let file_drop = FileDrop::new(MemoryStore::new(), "/home/acme/");
    assert_eq!(
        file_drop.staging_path("Employee", "batch.xml"),
        "/home/acme/Import/Employee/batch.xml"
    );
}

#[tokio::test]
async fn test_upload_commits_with_ready_suffix() {
    let dir = TempDir::new().unwrap();
    let local = local_file(&dir, "batch.xml", b"<EmployeeImport/>");
    let store = MemoryStore::new();
    let file_drop = FileDrop::new(store.clone(), "");

    let token = file_drop.upload(&local, "Employee").await.unwrap();

    assert_eq!(token.as_str(), "/Import/Employee/batch.xml");
    assert_eq!(store.list().await, vec!["/Import/Employee/batch.xml.ready"]);
    assert_eq!(
        store.contents(&token.ready_path()).await.unwrap(),
        b"<EmployeeImport/>".to_vec()
    );
}

#[tokio::test]
async fn test_upload_writes_then_renames_then_closes() {
    let dir = TempDir::new().unwrap();
    let local = local_file(&dir, "punches.csv", b"a,b\n1,2\n");
    let store = MemoryStore::new();
    let file_drop = FileDrop::new(store.clone(), "");

    file_drop.upload(&local, "Punch").await.unwrap();

    assert_eq!(
        store.history().await,
        vec![
            StoreOp::Connect,
            StoreOp::Put("/Import/Punch/punches.csv".to_string()),
            StoreOp::Rename {
                from: "/Import/Punch/punches.csv".to_string(),
                to: "/Import/Punch/punches.csv.ready".to_string(),
            },
            StoreOp::Close,
        ]
    );
}

#[tokio::test]
async fn test_upload_size_guard_runs_before_any_connection() {
    let file = NamedTempFile::new().unwrap();
    file.as_file().set_len(MAX_UPLOAD_BYTES + 1).unwrap();
    let store = MemoryStore::new();
    let file_drop = FileDrop::new(store.clone(), "");

    let err = file_drop.upload(file.path(), "Employee").await.unwrap_err();

    match err {
        Error::FileTooLarge { size, limit, .. } => {
            assert_eq!(size, MAX_UPLOAD_BYTES + 1);
            assert_eq!(limit, MAX_UPLOAD_BYTES);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(store.history().await.is_empty());
    assert!(store.list().await.is_empty());
}

#[tokio::test]
async fn test_upload_at_exact_limit_is_accepted() {
    let file = NamedTempFile::new().unwrap();
    file.as_file().set_len(MAX_UPLOAD_BYTES).unwrap();
    let store = MemoryStore::new();
    let file_drop = FileDrop::new(store.clone(), "");

    let token = file_drop.upload(file.path(), "Employee").await.unwrap();
    assert!(store.contents(&token.ready_path()).await.is_some());
}

#[tokio::test]
async fn test_upload_missing_local_file() {
    let file_drop = FileDrop::new(MemoryStore::new(), "");
    let err = file_drop
        .upload(std::path::Path::new("/no/such/file.xml"), "Employee")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test_case("" ; "empty")]
#[test_case("Employee/../../etc" ; "nested path")]
#[tokio::test]
async fn test_upload_rejects_bad_import_type(import_type: &str) {
    let dir = TempDir::new().unwrap();
    let local = local_file(&dir, "batch.xml", b"x");
    let store = MemoryStore::new();
    let file_drop = FileDrop::new(store.clone(), "");

    let err = file_drop.upload(&local, import_type).await.unwrap_err();
    assert!(err.is_config());
    assert!(store.history().await.is_empty());
}

#[tokio::test]
async fn test_failed_rename_still_closes_session() {
    let dir = TempDir::new().unwrap();
    let local = local_file(&dir, "batch.xml", b"x");
    let store = MemoryStore::new();
    store.fail_renames(true).await;
    let file_drop = FileDrop::new(store.clone(), "");

    let err = file_drop.upload(&local, "Employee").await.unwrap_err();

    assert!(err.is_transport());
    assert_eq!(store.history().await.last(), Some(&StoreOp::Close));
    // Never committed: the staged name is left behind, no ready file exists
    assert_eq!(store.list().await, vec!["/Import/Employee/batch.xml"]);
}

#[tokio::test]
async fn test_reupload_over_uncollected_ready_file_fails() {
    let dir = TempDir::new().unwrap();
    let local = local_file(&dir, "batch.xml", b"first");
    let store = MemoryStore::new();
    let file_drop = FileDrop::new(store.clone(), "");

    let token = file_drop.upload(&local, "Employee").await.unwrap();
    std::fs::write(&local, b"second").unwrap();

    let err = file_drop.upload(&local, "Employee").await.unwrap_err();

    assert!(err.is_transport());
    assert_eq!(store.history().await.last(), Some(&StoreOp::Close));
    // The committed file is untouched; the second copy stays staged
    assert_eq!(
        store.contents(&token.ready_path()).await.unwrap(),
        b"first".to_vec()
    );
    assert_eq!(
        store.contents(token.as_str()).await.unwrap(),
        b"second".to_vec()
    );
}

#[tokio::test]
async fn test_caller_held_session_is_reused_and_left_open() {
    let dir = TempDir::new().unwrap();
    let first = local_file(&dir, "a.xml", b"a");
    let second = local_file(&dir, "b.xml", b"b");
    let store = MemoryStore::new();
    let file_drop = FileDrop::new(store.clone(), "");

    let session = file_drop.open_session().await.unwrap();
    let a = file_drop.upload_with(&session, &first, "Employee").await.unwrap();
    let b = file_drop.upload_with(&session, &second, "Employee").await.unwrap();
    file_drop.check_with(&session, &a).await.unwrap();
    file_drop.check_with(&session, &b).await.unwrap();

    let history = store.history().await;
    let connects = history.iter().filter(|op| **op == StoreOp::Connect).count();
    let closes = history.iter().filter(|op| **op == StoreOp::Close).count();
    assert_eq!(connects, 1);
    assert_eq!(closes, 0);
}

// ============================================================================
// Status Tests
// ============================================================================

#[tokio::test]
async fn test_check_succeeded() {
    let store = MemoryStore::new();
    let token = ImportToken::new("/Import/Employee/T");
    store.insert("/Import/Employee/archive/T.done", Vec::new()).await;
    let file_drop = FileDrop::new(store.clone(), "");

    assert_eq!(file_drop.check(&token).await.unwrap(), ImportState::Succeeded);
}

#[tokio::test]
async fn test_check_failed_is_an_error() {
    let store = MemoryStore::new();
    let token = ImportToken::new("/Import/Employee/T");
    store.insert("/Import/Employee/error/T.error", Vec::new()).await;
    let file_drop = FileDrop::new(store.clone(), "");

    let err = file_drop.check(&token).await.unwrap_err();
    match err {
        Error::ImportFailed { token, marker } => {
            assert_eq!(token, "/Import/Employee/T");
            assert_eq!(marker, "/Import/Employee/error/T.error");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.history().await.last(), Some(&StoreOp::Close));
}

#[tokio::test]
async fn test_check_pending_is_idempotent() {
    let store = MemoryStore::new();
    let token = ImportToken::new("/Import/Employee/T");
    store.insert("/Import/Employee/T.ready", b"x".to_vec()).await;
    let file_drop = FileDrop::new(store.clone(), "");

    assert_eq!(file_drop.check(&token).await.unwrap(), ImportState::Pending);
    assert_eq!(file_drop.check(&token).await.unwrap(), ImportState::Pending);

    // Observing changes nothing remotely
    assert_eq!(store.list().await, vec!["/Import/Employee/T.ready"]);
}

#[tokio::test]
async fn test_done_marker_wins_over_error_marker() {
    let store = MemoryStore::new();
    let token = ImportToken::new("/Import/Employee/T");
    store.insert("/Import/Employee/archive/T.done", Vec::new()).await;
    store.insert("/Import/Employee/error/T.error", Vec::new()).await;
    let file_drop = FileDrop::new(store, "");

    assert_eq!(file_drop.check(&token).await.unwrap(), ImportState::Succeeded);
}

#[tokio::test]
async fn test_upload_then_poll_until_processed() {
    let dir = TempDir::new().unwrap();
    let local = local_file(&dir, "batch.xml", b"<x/>");
    let store = MemoryStore::new();
    let file_drop = FileDrop::new(store.clone(), "/client");

    let token = file_drop.upload(&local, "Employee").await.unwrap();
    assert_eq!(file_drop.check(&token).await.unwrap(), ImportState::Pending);

    // The batch processor archives the file and drops the success marker
    store.remove(&token.ready_path()).await.unwrap();
    store
        .insert("/client/Import/Employee/archive/batch.xml.done", Vec::new())
        .await;

    assert_eq!(file_drop.check(&token).await.unwrap(), ImportState::Succeeded);
}

#[test]
fn test_from_config_requires_host_key_decision() {
    let config = crate::config::SftpConfig::new("sftp.example.com", "foo", "bar");
    let err = FileDrop::from_config(&config).unwrap_err();
    assert!(err.is_config());
}
