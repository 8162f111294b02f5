use super::*;

#[tokio::test]
async fn opens_checked_sqlite_store_from_url() {
    let store = open_selection_store(storage::MEMORY_DATABASE_URL, false)
        .await
        .expect("open store");
    store.set(SELECTION_KEY, r#"["r1"]"#).await.expect("set");
    assert_eq!(
        store.get(SELECTION_KEY).await.expect("get").as_deref(),
        Some(r#"["r1"]"#)
    );
}

#[tokio::test]
async fn opens_file_store_and_creates_parent_directory() {
    let temp = tempfile::tempdir().expect("tempdir");
    let db_path = temp.path().join("data").join("docpick.db");

    let store = open_selection_store(db_path.to_string_lossy().as_ref(), false)
        .await
        .expect("open store");
    store.set(SELECTION_KEY, "[]").await.expect("set");
    assert!(db_path.exists(), "missing {}", db_path.display());
}

#[tokio::test]
async fn ephemeral_store_ignores_database_url() {
    let store = open_selection_store("sqlite:///definitely/not/writable/x.db", true)
        .await
        .expect("memory store");
    assert_eq!(store.get(SELECTION_KEY).await.expect("get"), None);
}
