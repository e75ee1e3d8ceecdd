use super::*;

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn inserts_and_lists_posts_newest_first() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let first = storage
        .insert_post("First", "body one", "alice")
        .await
        .expect("post");
    let second = storage
        .insert_post("Second", "body two", "bob")
        .await
        .expect("post");
    assert!(second.0 > first.0);

    let posts = storage.list_posts().await.expect("post list");
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].post_id, second);
    assert_eq!(posts[0].title, "Second");
    assert_eq!(posts[1].post_id, first);
    assert_eq!(posts[1].author, "alice");
}

#[tokio::test]
async fn assigns_positive_nanosecond_timestamps() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage
        .insert_post("Timed", "body", "carol")
        .await
        .expect("post");
    let posts = storage.list_posts().await.expect("post list");
    assert!(posts[0].timestamp_ns > 0);
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let suffix = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let temp_root = std::env::temp_dir().join(format!("miniblog_storage_test_{suffix}"));
    let db_path = temp_root.join("nested").join("storage.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );

    std::fs::remove_dir_all(temp_root).expect("cleanup");
}
