use chrono::Duration;
use storage::Storage;
use storage::keys;
use storage::repository::KeyValueStore;
use storage::sqlite::SqliteRepository;
use trivia_core::model::{Difficulty, LeaderboardEntry, Nickname, NicknameInfo, UpsertOutcome};
use trivia_core::time::fixed_clock;

fn entry(nick: &str, score: u32, difficulty: Difficulty) -> LeaderboardEntry {
    LeaderboardEntry::new(
        Nickname::new(nick).unwrap(),
        score,
        difficulty,
        fixed_clock().today(),
    )
}

#[tokio::test]
async fn sqlite_kv_round_trip_and_overwrite() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    // Migrations are idempotent.
    repo.migrate().await.expect("migrate twice");

    assert_eq!(repo.get("missing").await.unwrap(), None);
    repo.set("greeting", "hello").await.unwrap();
    repo.set("greeting", "hi").await.unwrap();
    assert_eq!(repo.get("greeting").await.unwrap().as_deref(), Some("hi"));
    repo.remove("greeting").await.unwrap();
    assert_eq!(repo.get("greeting").await.unwrap(), None);
}

#[tokio::test]
async fn sqlite_leaderboard_applies_max_score_rule() {
    let storage = Storage::sqlite("sqlite:file:memdb_leaderboard?mode=memory&cache=shared")
        .await
        .expect("storage");

    let today = fixed_clock().today();
    storage
        .leaderboards
        .upsert(entry("ace", 5, Difficulty::Easy))
        .await
        .unwrap();
    storage
        .leaderboards
        .upsert(entry("ace", 2, Difficulty::Hard))
        .await
        .unwrap();
    let kept = storage
        .leaderboards
        .upsert(entry("ace", 3, Difficulty::Easy))
        .await
        .unwrap();
    assert_eq!(kept, UpsertOutcome::Kept { best: 5 });
    let improved = storage
        .leaderboards
        .upsert(entry("ace", 7, Difficulty::Easy))
        .await
        .unwrap();
    assert_eq!(improved, UpsertOutcome::Improved { previous: 5 });

    let board = storage.leaderboards.load(today).await.unwrap();
    let ranked = board.ranked();
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].score, 7);
    assert_eq!(ranked[0].difficulty, Difficulty::Easy);
    assert_eq!(ranked[1].score, 2);

    let raw = storage
        .kv
        .get(&keys::leaderboard(today))
        .await
        .unwrap()
        .expect("stored board");
    assert!(raw.contains(r#""nickname":"ace""#));

    let tomorrow = today + Duration::days(1);
    assert!(storage.leaderboards.load(tomorrow).await.unwrap().is_empty());
}

#[tokio::test]
async fn sqlite_profile_and_daily_records_persist() {
    let url = "sqlite:file:memdb_profile?mode=memory&cache=shared";
    let storage = Storage::sqlite(url).await.expect("storage");
    let today = fixed_clock().today();

    let info = NicknameInfo::new(Nickname::new("rookie").unwrap(), today);
    storage.profiles.save_nickname_info(&info).await.unwrap();
    storage.profiles.accept_consent().await.unwrap();
    storage.daily_quiz.mark_played(today).await.unwrap();

    // A second handle on the same shared-cache database sees the same values.
    let reopened = Storage::sqlite(url).await.expect("reopen");
    assert_eq!(reopened.profiles.nickname_info().await.unwrap(), Some(info));
    assert!(reopened.profiles.consent_accepted().await.unwrap());
    assert_eq!(reopened.daily_quiz.last_played().await.unwrap(), Some(today));
}
