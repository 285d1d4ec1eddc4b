use precis_core::AppError;
use precis_core::traits::UrlStore;
use uuid::Uuid;

use crate::integration::common::setup_test_db;

#[tokio::test]
async fn create_and_get_by_id() {
    let (db, _container) = setup_test_db().await;
    let repo = db.url_repo();

    let before = chrono::Utc::now() - chrono::Duration::seconds(5);
    let record = repo.create("https://example.com").await.unwrap();

    assert!(!record.id.is_nil());
    assert_eq!(record.url, "https://example.com");
    assert!(record.created_at >= before);

    let loaded = repo.get_by_id(record.id).await.unwrap();
    assert_eq!(loaded, record);
}

#[tokio::test]
async fn resubmitting_same_url_creates_new_record() {
    let (db, _container) = setup_test_db().await;
    let repo = db.url_repo();

    let first = repo.create("https://example.com").await.unwrap();
    let second = repo.create("https://example.com").await.unwrap();

    assert_ne!(first.id, second.id);

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM url_records")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(count.0, 2);
}

#[tokio::test]
async fn empty_url_is_rejected_without_writing() {
    let (db, _container) = setup_test_db().await;
    let repo = db.url_repo();

    for url in ["", "   "] {
        let err = repo.create(url).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM url_records")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(count.0, 0);
}

#[tokio::test]
async fn unknown_id_is_not_found() {
    let (db, _container) = setup_test_db().await;
    let repo = db.url_repo();

    let err = repo.get_by_id(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn concurrent_creates_get_distinct_ids() {
    let (db, _container) = setup_test_db().await;
    let repo = db.url_repo();

    let (a, b, c) = tokio::join!(
        repo.create("https://a.example"),
        repo.create("https://b.example"),
        repo.create("https://c.example"),
    );
    let ids = [a.unwrap().id, b.unwrap().id, c.unwrap().id];

    assert_ne!(ids[0], ids[1]);
    assert_ne!(ids[1], ids[2]);
    assert_ne!(ids[0], ids[2]);
}

#[tokio::test]
async fn works_through_store_trait() {
    let (db, _container) = setup_test_db().await;
    let repo = db.url_repo();

    let record = UrlStore::create(&repo, "https://example.org").await.unwrap();
    let loaded = UrlStore::get_by_id(&repo, record.id).await.unwrap();

    assert_eq!(loaded.url, "https://example.org");
    assert!(UrlStore::health_check(&repo).await.is_ok());
}

#[tokio::test]
async fn health_check_fails_after_close() {
    let (db, _container) = setup_test_db().await;
    let repo = db.url_repo();

    assert!(repo.health_check().await.is_ok());
    db.close().await;

    let err = repo.health_check().await.unwrap_err();
    assert!(matches!(err, AppError::DatabaseError(_)));
}
