use shared::{
    domain::{Article, Profile, SortColumn, SortDirection},
    snapshot::PersistedSnapshot,
};
use storage::{load_snapshot, save_snapshot, DurableStore, Storage};

fn article(title: &str, words: u64, publish_at: &str) -> Article {
    Article {
        title: title.to_string(),
        image: format!("https://img.test/{title}.png"),
        profile: Profile {
            first_name: "Katherine".to_string(),
            last_name: "Johnson".to_string(),
        },
        words: words as f64,
        publish_at: publish_at.to_string(),
    }
}

#[tokio::test]
async fn snapshot_survives_reopening_the_database() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("reader").join("state.sqlite3");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let snapshot = PersistedSnapshot::sorted(
        vec![
            article("older", 900, "20220101"),
            article("middle", 300, "20230101"),
            article("newest", 600, "20240101"),
        ],
        20,
        SortDirection::Asc,
        SortColumn::PublishAt,
    );

    {
        let first_session = Storage::new(&database_url).await.expect("open");
        save_snapshot(&first_session, &snapshot)
            .await
            .expect("save");
        first_session.pool().close().await;
    }

    let second_session = Storage::new(&database_url).await.expect("reopen");
    let restored = load_snapshot(&second_session)
        .await
        .expect("load")
        .expect("snapshot present");
    assert_eq!(restored, snapshot);
    assert_eq!(
        second_session.get("sortContext").await.expect("raw key"),
        Some("publish_at".to_string())
    );
}

#[tokio::test]
async fn later_sort_overwrites_earlier_snapshot() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let first = PersistedSnapshot::sorted(
        vec![article("a", 1, "20200101")],
        10,
        SortDirection::Asc,
        SortColumn::Words,
    );
    let second = PersistedSnapshot::sorted(
        vec![article("b", 2, "20210101")],
        20,
        SortDirection::Desc,
        SortColumn::PublishAt,
    );
    save_snapshot(&storage, &first).await.expect("first");
    save_snapshot(&storage, &second).await.expect("second");

    let restored = load_snapshot(&storage).await.expect("load").expect("present");
    assert_eq!(restored, second);
}
