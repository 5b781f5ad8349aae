use chrono::Duration;
use storage::repository::{
    ProfileRepository, Storage, StorageError, TrophyRepository, WalkSummaryRepository,
};
use storage::sqlite::SqliteRepository;
use tipswalk_core::model::{Trophy, WalkId, WalkResult, WalkSummary};
use tipswalk_core::time::fixed_now;

async fn repo(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn summary(minutes_later: i64, score: u32) -> WalkSummary {
    let start = fixed_now();
    WalkSummary::from_result(
        WalkId::generate(),
        start,
        start + Duration::minutes(minutes_later),
        WalkResult::from_score(score).unwrap(),
    )
    .unwrap()
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let fresh = SqliteRepository::connect("sqlite:file:memdb_unmigrated?mode=memory&cache=shared")
        .await
        .expect("connect");
    assert_eq!(fresh.schema_version().await.unwrap(), 0);

    let repo = repo("memdb_migrate_twice").await;
    repo.migrate().await.expect("second migrate");
    assert_eq!(repo.schema_version().await.unwrap(), 1);
}

#[tokio::test]
async fn profile_entries_upsert() {
    let repo = repo("memdb_profile").await;
    assert_eq!(repo.get_value("profile.display_name").await.unwrap(), None);

    repo.set_value("profile.display_name", "Walker #42").await.unwrap();
    repo.set_value("profile.display_name", "Ada").await.unwrap();

    assert_eq!(
        repo.get_value("profile.display_name").await.unwrap().as_deref(),
        Some("Ada")
    );
}

#[tokio::test]
async fn trophies_are_unique_per_iso_week() {
    let repo = repo("memdb_trophies").await;
    let now = fixed_now();

    assert!(repo.award(&Trophy::for_week_of(now)).await.unwrap());
    assert!(!repo
        .award(&Trophy::for_week_of(now + Duration::hours(3)))
        .await
        .unwrap());
    assert!(repo
        .award(&Trophy::for_week_of(now + Duration::days(7)))
        .await
        .unwrap());

    let trophies = repo.list_trophies().await.unwrap();
    assert_eq!(trophies.len(), 2);
    assert_eq!(trophies[0].label(), "V46");
    assert_eq!(trophies[0].awarded_at(), now);
    assert_eq!(trophies[1].label(), "V47");
}

#[tokio::test]
async fn walk_summaries_roundtrip_and_order() {
    let repo = repo("memdb_summaries").await;
    let first = summary(20, 6);
    let second = summary(45, 10);

    let first_id = repo.append_summary(&first).await.unwrap();
    let second_id = repo.append_summary(&second).await.unwrap();
    assert_ne!(first_id, second_id);

    assert_eq!(repo.get_summary(first_id).await.unwrap(), first);

    let rows = repo.list_summaries(1).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, second_id);
    assert!(rows[0].summary.perfect());
}

#[tokio::test]
async fn duplicate_walk_id_is_a_conflict() {
    let repo = repo("memdb_summary_conflict").await;
    let walk = summary(30, 3);
    repo.append_summary(&walk).await.unwrap();

    let err = repo.append_summary(&walk).await.unwrap_err();
    assert!(matches!(err, StorageError::Conflict));
    assert!(matches!(
        repo.get_summary(404).await,
        Err(StorageError::NotFound)
    ));
}

#[tokio::test]
async fn storage_sqlite_wires_all_repositories() {
    let storage = Storage::sqlite("sqlite:file:memdb_storage?mode=memory&cache=shared")
        .await
        .expect("storage");

    storage
        .profile
        .set_value("profile.avatar_uri", "https://example.com/a.png")
        .await
        .unwrap();
    storage
        .trophies
        .award(&Trophy::for_week_of(fixed_now()))
        .await
        .unwrap();
    storage.summaries.append_summary(&summary(5, 1)).await.unwrap();

    assert!(storage.profile.get_value("profile.avatar_uri").await.unwrap().is_some());
    assert_eq!(storage.trophies.list_trophies().await.unwrap().len(), 1);
    assert_eq!(storage.summaries.list_summaries(10).await.unwrap().len(), 1);
}
