//! Unit tests for the mock entry repository

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::entities::entry::{Entry, ExpiryReason, NONCE_LENGTH};
use crate::repositories::entry::{EntryRepository, MockEntryRepository};

fn entry_for(owner: Uuid, created_offset_secs: i64) -> Entry {
    Entry::new(
        "note".to_string(),
        owner,
        "to@example.com".to_string(),
        [1u8; NONCE_LENGTH],
        vec![9, 9, 9],
        Utc::now() + Duration::seconds(created_offset_secs),
        Duration::minutes(5),
    )
}

#[tokio::test]
async fn test_find_by_owner_is_ordered_oldest_first() {
    let repo = MockEntryRepository::new();
    let owner = Uuid::new_v4();

    let newer = entry_for(owner, 10);
    let older = entry_for(owner, -10);
    let someone_else = entry_for(Uuid::new_v4(), 0);

    repo.create(&newer).await.unwrap();
    repo.create(&older).await.unwrap();
    repo.create(&someone_else).await.unwrap();

    let listed = repo.find_by_owner(owner).await.unwrap();
    let ids: Vec<Uuid> = listed.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![older.id, newer.id]);
}

#[tokio::test]
async fn test_increment_returns_new_count() {
    let repo = MockEntryRepository::new();
    let entry = entry_for(Uuid::new_v4(), 0);
    repo.create(&entry).await.unwrap();

    assert_eq!(repo.increment_invalid_attempts(entry.id).await.unwrap(), Some(1));
    assert_eq!(repo.increment_invalid_attempts(entry.id).await.unwrap(), Some(2));
    assert_eq!(repo.increment_invalid_attempts(Uuid::new_v4()).await.unwrap(), None);
}

#[tokio::test]
async fn test_transition_happens_once() {
    let repo = MockEntryRepository::new();
    let entry = entry_for(Uuid::new_v4(), 0);
    repo.create(&entry).await.unwrap();

    assert!(repo.record_claim(&entry.claim(Utc::now())).await.unwrap());
    assert!(!repo
        .record_expiry(&entry.expire(ExpiryReason::TimeExpired, Utc::now()))
        .await
        .unwrap());

    assert_eq!(repo.table_sizes().await, (0, 1, 0));
    assert!(repo.find(entry.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_find_expired_respects_limit() {
    let repo = MockEntryRepository::new();
    let owner = Uuid::new_v4();

    for _ in 0..3 {
        let entry = entry_for(owner, 0);
        repo.create(&entry).await.unwrap();
        repo.set_expires_at(entry.id, Utc::now() - Duration::seconds(1)).await;
    }
    repo.create(&entry_for(owner, 0)).await.unwrap();

    assert_eq!(repo.find_expired(Utc::now(), 10).await.unwrap().len(), 3);
    assert_eq!(repo.find_expired(Utc::now(), 2).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_simulated_failure() {
    let repo = MockEntryRepository::new();
    repo.set_fail_writes(true);

    assert!(repo.create(&entry_for(Uuid::new_v4(), 0)).await.is_err());
}
