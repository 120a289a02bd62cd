use chrono::NaiveDateTime;

use super::*;

fn entry(id: i64, author: &str, msg: &str) -> Announcement {
    Announcement {
        id: AnnouncementId(id),
        author: author.to_string(),
        date: Some(
            NaiveDateTime::parse_from_str("2024-03-05 07:08:09", "%Y-%m-%d %H:%M:%S")
                .expect("date"),
        ),
        msg: msg.to_string(),
    }
}

#[tokio::test]
async fn create_then_read_returns_entry() {
    let ledger = SqliteLedger::connect("sqlite::memory:").await.expect("ledger");
    assert!(!ledger.exists(AnnouncementId(1)).await.expect("exists"));

    ledger.create(&entry(1, "user_1", "hello")).await.expect("create");

    assert!(ledger.exists(AnnouncementId(1)).await.expect("exists"));
    assert_eq!(
        ledger.read(AnnouncementId(1)).await.expect("read"),
        entry(1, "user_1", "hello")
    );
}

#[tokio::test]
async fn create_rejects_existing_id() {
    let ledger = SqliteLedger::connect("sqlite::memory:").await.expect("ledger");
    ledger.create(&entry(1, "user_1", "hello")).await.expect("create");

    let err = ledger
        .create(&entry(1, "user_2", "again"))
        .await
        .expect_err("duplicate");
    assert!(matches!(err, BoardError::Write(_)), "{err:?}");
    assert_eq!(
        ledger.read(AnnouncementId(1)).await.expect("read").author,
        "user_1"
    );
}

#[tokio::test]
async fn read_and_update_report_missing_entries() {
    let ledger = SqliteLedger::connect("sqlite::memory:").await.expect("ledger");

    let err = ledger.read(AnnouncementId(4)).await.expect_err("missing");
    assert_eq!(err, BoardError::NotFound(AnnouncementId(4)));

    let err = ledger
        .update(&entry(4, "user_1", "x"))
        .await
        .expect_err("missing");
    assert_eq!(err, BoardError::NotFound(AnnouncementId(4)));
}

#[tokio::test]
async fn update_overwrites_entry() {
    let ledger = SqliteLedger::connect("sqlite::memory:").await.expect("ledger");
    ledger.create(&entry(2, "user_1", "hello")).await.expect("create");

    let mut changed = entry(2, "user_1", "hello again");
    changed.date = None;
    ledger.update(&changed).await.expect("update");

    assert_eq!(ledger.read(AnnouncementId(2)).await.expect("read"), changed);
}
