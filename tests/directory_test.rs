//! User Directory Integration Tests
//!
//! Tests for student lookup against a real SQLite database.

use tempfile::TempDir;
use tutor_bot::{SqliteUserDirectory, UserDirectory};

fn create_test_directory(name: &str) -> (SqliteUserDirectory, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join(format!("{}.db", name));
    let directory = SqliteUserDirectory::open(&db_path).expect("Failed to open directory");
    (directory, temp_dir)
}

#[tokio::test]
async fn test_registered_student_found() {
    let (directory, _temp) = create_test_directory("found");
    directory.add_user(42, "Anna", "Karenina").unwrap();

    let profile = directory.find(42).await.unwrap().expect("profile");
    assert_eq!(profile.chat_id, 42);
    assert_eq!(profile.given_name, "Anna");
    assert_eq!(profile.family_name, "Karenina");
}

#[tokio::test]
async fn test_unknown_chat_id_is_not_found() {
    let (directory, _temp) = create_test_directory("unknown");
    directory.add_user(1, "Boris", "").unwrap();

    // NotFound is a normal outcome, not an error.
    assert!(directory.find(2).await.unwrap().is_none());
}

#[tokio::test]
async fn test_reopening_keeps_records() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("persist.db");

    {
        let directory = SqliteUserDirectory::open(&db_path).unwrap();
        directory.add_user(7, "Ivan", "Petrov").unwrap();
    }

    let directory = SqliteUserDirectory::open(&db_path).unwrap();
    let profile = directory.find(7).await.unwrap().expect("profile");
    assert_eq!(profile.given_name, "Ivan");
}

#[tokio::test]
async fn test_lookup_is_repeatable_per_event() {
    // The controller re-resolves the profile on every callback; the same
    // query must keep answering consistently with no cached state.
    let (directory, _temp) = create_test_directory("repeat");
    directory.add_user(9, "Olga", "").unwrap();

    for _ in 0..3 {
        assert!(directory.find(9).await.unwrap().is_some());
    }
}
