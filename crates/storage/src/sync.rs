use std::time::Duration;

use shared::{
    domain::Announcement,
    error::{BoardError, BoardResult},
};

use crate::{ledger::LedgerStore, AnnouncementStore};

/// Counts of what one sync pass did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub created: usize,
    pub updated: usize,
    pub restored: usize,
    pub failed: usize,
}

impl SyncReport {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowOutcome {
    Created,
    Updated,
    Restored,
}

/// Mirrors the rows dated within `window` into `ledger`.
///
/// A row the ledger has never seen is recorded. A row whose author matches
/// the recorded one updates the entry. A row whose author differs is put
/// back to the recorded author, date and msg. A failure on one row is
/// logged and counted; the remaining rows are still processed.
pub async fn sync_recent(
    store: &dyn AnnouncementStore,
    ledger: &dyn LedgerStore,
    window: Duration,
) -> BoardResult<SyncReport> {
    let rows = store.list_recent(window).await?;
    let mut report = SyncReport::default();
    for row in &rows {
        match sync_row(store, ledger, row).await {
            Ok(RowOutcome::Created) => report.created += 1,
            Ok(RowOutcome::Updated) => report.updated += 1,
            Ok(RowOutcome::Restored) => report.restored += 1,
            Err(err) => {
                tracing::warn!(id = %row.id, error = %err, "ledger sync failed for row");
                report.failed += 1;
            }
        }
    }
    Ok(report)
}

async fn sync_row(
    store: &dyn AnnouncementStore,
    ledger: &dyn LedgerStore,
    row: &Announcement,
) -> BoardResult<RowOutcome> {
    if !ledger.exists(row.id).await? {
        ledger.create(row).await?;
        return Ok(RowOutcome::Created);
    }

    let recorded = ledger.read(row.id).await?;
    if recorded.author == row.author {
        ledger.update(row).await?;
        return Ok(RowOutcome::Updated);
    }

    tracing::warn!(
        id = %row.id,
        recorded_author = %recorded.author,
        author = %row.author,
        "announcement edited by a different author; restoring"
    );
    if store.restore(&recorded).await? == 0 {
        return Err(BoardError::NotFound(row.id));
    }
    Ok(RowOutcome::Restored)
}

#[cfg(test)]
#[path = "tests/sync_tests.rs"]
mod tests;
