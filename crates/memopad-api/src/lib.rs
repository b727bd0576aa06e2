//! Memo pad operations: the backup state machines, the confirmation gate in front of
//! every destructive write, and the search rules. The store below knows nothing about
//! users; the front end above knows nothing about storage.

use std::path::PathBuf;

use memopad_core::{parse_memo_id, Memo, MemoDraft, MemoError, MemoField, TextQuery};
use memopad_store_sqlite::{IntegrityReport, Mutation, SqliteMemoStore, StorePaths};
use time::Date;

mod clock;
mod prompt;

pub use clock::{Clock, SystemClock};
pub use prompt::{ask_search_date, confirm, Prompter};

pub type ApiResult<T> = Result<T, MemoError>;

/// Outcome of a confirmation-gated operation. Declining is a normal return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gated<T> {
    Done(T),
    Declined,
}

/// What startup found and did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bootstrap {
    Opened(PathBuf),
    Restored(PathBuf),
    /// A backup was offered and refused; the store stays absent.
    RestoreDeclined,
    Created(PathBuf),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreKind {
    /// No store existed, so the backup was copied without asking.
    Repopulated,
    /// A live store was replaced after confirmation.
    Overwritten,
}

pub const LAST_MEMOS: usize = 5;

pub struct MemoPad {
    paths: StorePaths,
    store: SqliteMemoStore,
    clock: Box<dyn Clock>,
}

impl std::fmt::Debug for MemoPad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoPad").field("paths", &self.paths).finish_non_exhaustive()
    }
}

impl MemoPad {
    #[must_use]
    pub fn new(paths: StorePaths) -> Self {
        Self::with_clock(paths, Box::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(paths: StorePaths, clock: Box<dyn Clock>) -> Self {
        let store = SqliteMemoStore::new(paths.store.clone());
        Self { paths, store, clock }
    }

    #[must_use]
    pub fn paths(&self) -> &StorePaths {
        &self.paths
    }

    #[must_use]
    pub fn today(&self) -> Date {
        self.clock.now().date()
    }

    /// Decide at startup whether to open, restore, or create the store.
    ///
    /// | store | backup | action |
    /// |---|---|---|
    /// | yes | any | open |
    /// | no | yes | offer restore; a refusal leaves the store absent |
    /// | no | no | create empty |
    ///
    /// # Errors
    /// Returns `StorageFault` when the working directory, the copy, or the new store
    /// cannot be written, and `Io` when the terminal fails.
    pub fn bootstrap(&self, prompter: &mut dyn Prompter) -> ApiResult<Bootstrap> {
        self.paths.ensure_working_dir().map_err(storage)?;

        if self.paths.store_exists() {
            tracing::debug!(store = %self.paths.store.display(), "opening existing store");
            return Ok(Bootstrap::Opened(self.paths.store.clone()));
        }

        if self.paths.backup_exists() {
            let action = format!(
                "No memo store found, but a backup exists at {}. Restore it?",
                self.paths.backup.display()
            );
            if !confirm(prompter, &action)?.is_affirm() {
                tracing::warn!("startup restore declined; store left absent");
                return Ok(Bootstrap::RestoreDeclined);
            }
            self.paths.copy_backup_to_store().map_err(storage)?;
            return Ok(Bootstrap::Restored(self.paths.store.clone()));
        }

        self.store.create().map_err(storage)?;
        Ok(Bootstrap::Created(self.paths.store.clone()))
    }

    /// The newest memo.
    ///
    /// # Errors
    /// Returns `NotFound` for an empty store.
    pub fn recent(&self) -> ApiResult<Memo> {
        self.store
            .recent(1)
            .map_err(storage)?
            .into_iter()
            .next()
            .ok_or_else(|| MemoError::NotFound("there are no memos yet".to_string()))
    }

    /// Up to [`LAST_MEMOS`] memos, newest first.
    ///
    /// # Errors
    /// Returns `NotFound` for an empty store.
    pub fn last(&self) -> ApiResult<Vec<Memo>> {
        non_empty(self.store.recent(LAST_MEMOS).map_err(storage)?, "there are no memos yet")
    }

    /// Every memo, oldest first.
    ///
    /// # Errors
    /// Returns `NotFound` for an empty store.
    pub fn all(&self) -> ApiResult<Vec<Memo>> {
        non_empty(self.store.list_all().map_err(storage)?, "there are no memos yet")
    }

    /// # Errors
    /// Returns `StoreMissing` or `StorageFault` when the store cannot be read.
    pub fn count(&self) -> ApiResult<i64> {
        self.store.count().map_err(storage)
    }

    /// Store a new memo stamped with the current time. A missing store file is
    /// created first.
    ///
    /// # Errors
    /// Returns `StorageFault` when the store cannot be created or written.
    pub fn add(&self, draft: &MemoDraft) -> ApiResult<Memo> {
        let id = self.store.insert(draft, self.clock.now()).map_err(storage)?;
        tracing::info!(%id, "memo added");
        self.store
            .get(id)
            .map_err(storage)?
            .ok_or_else(|| MemoError::StorageFault(format!("memo {id} vanished after insert")))
    }

    /// Look a memo up by a user-typed identifier. Anything that is not a positive
    /// integer is simply not found.
    ///
    /// # Errors
    /// Returns `NotFound` for unknown or unparseable identifiers.
    pub fn locate(&self, raw: &str) -> ApiResult<Memo> {
        let not_found = || MemoError::NotFound(format!("no memo with identifier `{}`", raw.trim()));
        let Ok(id) = parse_memo_id(raw) else {
            tracing::debug!(input = %raw.trim(), "identifier rejected");
            return Err(not_found());
        };
        self.store.get(id).map_err(storage)?.ok_or_else(not_found)
    }

    /// Fail unless `memo` can still be edited or deleted: its identifier must lie in
    /// `1..=count()` and its row must exist. Front ends call this before asking for a new
    /// value; the gated operations call it again before confirming.
    ///
    /// # Errors
    /// Returns `NotFound` when the memo fails the range check or is gone.
    pub fn check_mutable(&self, memo: &Memo) -> ApiResult<()> {
        let count = self.count()?;
        if memo.id.get() <= 0 || memo.id.get() > count {
            tracing::debug!(id = %memo.id, count, "identifier outside the mutable range");
            return Err(MemoError::NotFound(format!(
                "memo {} is outside the editable range 1..={count}",
                memo.id
            )));
        }
        if self.store.get(memo.id).map_err(storage)?.is_none() {
            return Err(MemoError::NotFound(format!("memo {} not found", memo.id)));
        }
        Ok(())
    }

    /// Replace one field after confirmation. The new timestamp never moves backwards.
    ///
    /// # Errors
    /// Returns `NotFound` when the memo is gone or fails the identifier range check.
    pub fn edit(
        &self,
        memo: &Memo,
        field: MemoField,
        raw: &str,
        prompter: &mut dyn Prompter,
    ) -> ApiResult<Gated<Memo>> {
        self.check_mutable(memo)?;
        let value = field.normalize(raw);
        let action = format!("Replace the {} of memo {} with `{value}`?", field.label(), memo.id);
        if !confirm(prompter, &action)?.is_affirm() {
            return Ok(Gated::Declined);
        }

        let stamp = self.clock.now().max(memo.timestamp);
        match self.store.update_field(memo.id, field, &value, stamp).map_err(storage)? {
            Mutation::Applied => {}
            Mutation::OutOfRange | Mutation::Missing => {
                return Err(MemoError::NotFound(format!("memo {} cannot be edited", memo.id)));
            }
        }
        tracing::info!(id = %memo.id, field = field.column(), "memo edited");

        let updated = self
            .store
            .get(memo.id)
            .map_err(storage)?
            .ok_or_else(|| MemoError::NotFound(format!("memo {} not found", memo.id)))?;
        Ok(Gated::Done(updated))
    }

    /// # Errors
    /// Returns `NotFound` when the memo is gone or fails the identifier range check.
    pub fn delete(&self, memo: &Memo, prompter: &mut dyn Prompter) -> ApiResult<Gated<()>> {
        self.check_mutable(memo)?;
        if !confirm(prompter, &format!("Delete memo {}?", memo.id))?.is_affirm() {
            return Ok(Gated::Declined);
        }

        match self.store.delete(memo.id).map_err(storage)? {
            Mutation::Applied => {
                tracing::info!(id = %memo.id, "memo deleted");
                Ok(Gated::Done(()))
            }
            Mutation::OutOfRange | Mutation::Missing => {
                Err(MemoError::NotFound(format!("memo {} cannot be deleted", memo.id)))
            }
        }
    }

    /// # Errors
    /// Returns `StoreMissing` or `StorageFault` when the store cannot be written.
    pub fn delete_all(&self, prompter: &mut dyn Prompter) -> ApiResult<Gated<usize>> {
        // Surface a missing store before asking.
        self.count()?;
        if !confirm(prompter, "Delete ALL memos? This cannot be undone without a backup.")?
            .is_affirm()
        {
            return Ok(Gated::Declined);
        }
        let removed = self.store.delete_all().map_err(storage)?;
        tracing::info!(removed, "all memos deleted");
        Ok(Gated::Done(removed))
    }

    /// Prompt until a valid past-or-today date is entered. `None` when input ended.
    ///
    /// # Errors
    /// Returns `Io` when the terminal fails.
    pub fn read_search_date(&self, prompter: &mut dyn Prompter) -> ApiResult<Option<Date>> {
        ask_search_date(prompter, self.today())
    }

    /// # Errors
    /// Returns `InvalidInput` for future dates and `NotFound` when nothing matches.
    pub fn search_date(&self, date: Date) -> ApiResult<Vec<Memo>> {
        if date > self.today() {
            return Err(MemoError::InvalidInput(format!("{date} has not happened yet")));
        }
        let found = self.store.search_date(date).map_err(storage)?;
        non_empty(found, &format!("no memos dated {date}"))
    }

    /// Case-insensitive substring search over one field.
    ///
    /// # Errors
    /// Returns `InvalidInput` for an empty query, which never matches, and `NotFound`
    /// for a real query with no matches.
    pub fn search_text(&self, field: MemoField, raw: &str) -> ApiResult<Vec<Memo>> {
        let Some(query) = TextQuery::parse(raw) else {
            return Err(MemoError::InvalidInput(format!(
                "empty {} query; nothing can match it",
                field.label()
            )));
        };
        let found = self.store.search_text(field, &query).map_err(storage)?;
        non_empty(found, &format!("no memo {} contains `{}`", field.label(), query.as_str()))
    }

    /// Copy the store over the single backup slot after confirmation.
    ///
    /// # Errors
    /// Returns `StoreMissing` when there is nothing to back up.
    pub fn backup(&self, prompter: &mut dyn Prompter) -> ApiResult<Gated<PathBuf>> {
        if !self.paths.store_exists() {
            return Err(MemoError::StoreMissing(self.paths.store.clone()));
        }

        let action = if self.paths.backup_exists() {
            format!("Overwrite the existing backup at {}?", self.paths.backup.display())
        } else {
            format!("Create a backup at {}?", self.paths.backup.display())
        };
        if !confirm(prompter, &action)?.is_affirm() {
            return Ok(Gated::Declined);
        }

        self.paths.copy_store_to_backup().map_err(storage)?;
        Ok(Gated::Done(self.paths.backup.clone()))
    }

    /// Put the backup back in place of the store. Only replacing a live store asks
    /// for confirmation.
    ///
    /// # Errors
    /// Returns `NotFound` when there is no backup.
    pub fn restore(&self, prompter: &mut dyn Prompter) -> ApiResult<Gated<RestoreKind>> {
        if !self.paths.backup_exists() {
            return Err(MemoError::NotFound(format!(
                "no backup found at {}",
                self.paths.backup.display()
            )));
        }

        let kind = if self.paths.store_exists() {
            let action = format!(
                "Overwrite the current store {} with the backup?",
                self.paths.store.display()
            );
            if !confirm(prompter, &action)?.is_affirm() {
                return Ok(Gated::Declined);
            }
            RestoreKind::Overwritten
        } else {
            RestoreKind::Repopulated
        };

        self.paths.copy_backup_to_store().map_err(storage)?;
        Ok(Gated::Done(kind))
    }

    /// # Errors
    /// Returns `StoreMissing` when there is no store to probe.
    pub fn check(&self) -> ApiResult<IntegrityReport> {
        let report = self.store.integrity_check().map_err(storage)?;
        if !report.ok {
            tracing::warn!(message = %report.message, "integrity check failed");
        }
        Ok(report)
    }

    /// Delete the store and create an empty one in its place.
    ///
    /// # Errors
    /// Returns `StorageFault` when the file cannot be removed or recreated.
    pub fn recreate(&self, prompter: &mut dyn Prompter) -> ApiResult<Gated<PathBuf>> {
        let action = format!(
            "Delete {} and start with an empty store? The backup is kept.",
            self.paths.store.display()
        );
        if !confirm(prompter, &action)?.is_affirm() {
            return Ok(Gated::Declined);
        }

        self.paths.remove_store().map_err(storage)?;
        self.store.create().map_err(storage)?;
        tracing::info!(store = %self.paths.store.display(), "store recreated");
        Ok(Gated::Done(self.paths.store.clone()))
    }

    /// Remove the store, the backup and the working directory. Nothing is deleted when
    /// the directory holds anything else.
    ///
    /// # Errors
    /// Returns `InvalidInput` when the working directory holds other files, and
    /// `StorageFault` when a removal fails.
    pub fn clear(&self, prompter: &mut dyn Prompter) -> ApiResult<Gated<()>> {
        let foreign = self.paths.foreign_entries().map_err(storage)?;
        if let Some(first) = foreign.first() {
            tracing::warn!(count = foreign.len(), "working directory holds other files; wipe refused");
            return Err(MemoError::InvalidInput(format!(
                "{} also holds {}; nothing was deleted",
                self.paths.working_dir.display(),
                first.display()
            )));
        }

        let action = format!(
            "Delete every memo, the backup and {}? This cannot be undone.",
            self.paths.working_dir.display()
        );
        if !confirm(prompter, &action)?.is_affirm() {
            return Ok(Gated::Declined);
        }

        self.paths.remove_store().map_err(storage)?;
        self.paths.remove_backup().map_err(storage)?;
        self.paths.remove_working_dir().map_err(storage)?;
        tracing::info!(dir = %self.paths.working_dir.display(), "memo pad wiped");
        Ok(Gated::Done(()))
    }
}

fn non_empty(memos: Vec<Memo>, message: &str) -> ApiResult<Vec<Memo>> {
    if memos.is_empty() {
        Err(MemoError::NotFound(message.to_string()))
    } else {
        Ok(memos)
    }
}

fn storage(err: anyhow::Error) -> MemoError {
    match err.downcast::<MemoError>() {
        Ok(known) => known,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "storage fault");
            MemoError::StorageFault(format!("{err:#}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use anyhow::Result;
    use memopad_store_sqlite::DEFAULT_STORE_NAME;
    use tempfile::TempDir;
    use time::macros::{date, datetime};
    use time::PrimitiveDateTime;

    use super::clock::FixedClock;
    use super::prompt::testing::ScriptedPrompter;
    use super::*;

    const NOW: PrimitiveDateTime = datetime!(2024-06-15 12:00:00);

    fn pad_at(dir: &TempDir, now: PrimitiveDateTime) -> MemoPad {
        let paths = StorePaths::new(dir.path().join(".memopad"), DEFAULT_STORE_NAME);
        MemoPad::with_clock(paths, Box::new(FixedClock(now)))
    }

    fn ready_pad() -> Result<(TempDir, MemoPad)> {
        let dir = tempfile::tempdir()?;
        let pad = pad_at(&dir, NOW);
        assert_eq!(
            pad.bootstrap(&mut ScriptedPrompter::default())?,
            Bootstrap::Created(pad.paths().store.clone())
        );
        Ok((dir, pad))
    }

    fn ids(memos: &[Memo]) -> Vec<i64> {
        memos.iter().map(|memo| memo.id.get()).collect()
    }

    fn no() -> ScriptedPrompter {
        ScriptedPrompter::new(&["no"])
    }

    fn yes() -> ScriptedPrompter {
        ScriptedPrompter::new(&["yes"])
    }

    /// Two memos dated 2024-01-01 and 2024-01-02, written through separate clocks.
    fn seeded_pad() -> Result<(TempDir, MemoPad)> {
        let dir = tempfile::tempdir()?;
        pad_at(&dir, datetime!(2024-01-01 10:00:00)).add(&MemoDraft::new("A", "body1", "x"))?;
        pad_at(&dir, datetime!(2024-01-02 10:00:00)).add(&MemoDraft::new("B", "body2", "y"))?;
        let pad = pad_at(&dir, NOW);
        Ok((dir, pad))
    }

    #[test]
    fn empty_store_reports_not_found_and_zero_count() -> Result<()> {
        let (_dir, pad) = ready_pad()?;
        assert!(matches!(pad.recent(), Err(MemoError::NotFound(_))));
        assert!(matches!(pad.last(), Err(MemoError::NotFound(_))));
        assert!(matches!(pad.all(), Err(MemoError::NotFound(_))));
        assert_eq!(pad.count()?, 0);
        Ok(())
    }

    #[test]
    fn views_order_recent_newest_first_and_all_oldest_first() -> Result<()> {
        let (_dir, pad) = ready_pad()?;
        for n in 1..=7 {
            pad.add(&MemoDraft::new(&format!("memo {n}"), "", ""))?;
        }
        assert_eq!(pad.recent()?.id.get(), 7);
        assert_eq!(ids(&pad.last()?), vec![7, 6, 5, 4, 3]);
        assert_eq!(ids(&pad.all()?), (1..=7).collect::<Vec<_>>());
        Ok(())
    }

    #[test]
    fn date_search_matches_one_day_and_rejects_the_future() -> Result<()> {
        let (_dir, pad) = seeded_pad()?;
        let found = pad.search_date(date!(2024 - 01 - 01))?;
        assert_eq!(ids(&found), vec![1]);
        assert_eq!(found[0].title, "## A");

        assert!(matches!(pad.search_date(date!(2099 - 01 - 01)), Err(MemoError::InvalidInput(_))));
        assert!(matches!(pad.search_date(date!(2023 - 01 - 01)), Err(MemoError::NotFound(_))));

        let mut prompter = ScriptedPrompter::new(&["2099-01-01", "2024-01-02"]);
        assert_eq!(pad.read_search_date(&mut prompter)?, Some(date!(2024 - 01 - 02)));
        Ok(())
    }

    #[test]
    fn empty_query_is_reported_apart_from_no_matches() -> Result<()> {
        let (_dir, pad) = seeded_pad()?;
        for field in [MemoField::Title, MemoField::Body, MemoField::Tags] {
            assert!(matches!(pad.search_text(field, "  "), Err(MemoError::InvalidInput(_))));
        }
        assert!(matches!(pad.search_text(MemoField::Title, "zzz"), Err(MemoError::NotFound(_))));
        assert_eq!(ids(&pad.search_text(MemoField::Body, "BODY")?), vec![1, 2]);
        assert_eq!(ids(&pad.search_text(MemoField::Tags, "y")?), vec![2]);
        Ok(())
    }

    #[test]
    fn locate_treats_malformed_identifiers_as_not_found() -> Result<()> {
        let (_dir, pad) = seeded_pad()?;
        assert_eq!(pad.locate(" 2 ")?.title, "## B");
        for raw in ["0", "-1", "two", "", "99"] {
            assert!(matches!(pad.locate(raw), Err(MemoError::NotFound(_))), "input {raw:?}");
        }
        Ok(())
    }

    #[test]
    fn edit_applies_after_confirmation_and_restamps() -> Result<()> {
        let (_dir, pad) = seeded_pad()?;
        let memo = pad.locate("1")?;

        let mut prompter = ScriptedPrompter::new(&["perhaps", "-Y"]);
        let Gated::Done(updated) = pad.edit(&memo, MemoField::Title, "Renamed", &mut prompter)? else {
            panic!("edit should apply");
        };
        assert_eq!(updated.title, "## Renamed");
        assert_eq!(updated.body, "body1");
        assert_eq!(updated.timestamp, NOW);
        assert_eq!(pad.locate("1")?, updated);
        Ok(())
    }

    #[test]
    fn edit_never_moves_the_timestamp_backwards() -> Result<()> {
        let (dir, _) = seeded_pad()?;
        let behind = pad_at(&dir, datetime!(2023-12-31 00:00:00));
        let memo = behind.locate("2")?;

        let Gated::Done(updated) = behind.edit(&memo, MemoField::Tags, "later", &mut yes())? else {
            panic!("edit should apply");
        };
        assert_eq!(updated.tags, "#later");
        assert!(updated.timestamp >= memo.timestamp);
        Ok(())
    }

    #[test]
    fn declined_mutations_leave_the_store_untouched() -> Result<()> {
        let (_dir, pad) = seeded_pad()?;
        let memo = pad.locate("1")?;
        let before = fs::read(&pad.paths().store)?;

        assert_eq!(pad.edit(&memo, MemoField::Body, "gone", &mut no())?, Gated::Declined);
        assert_eq!(pad.delete(&memo, &mut no())?, Gated::Declined);
        assert_eq!(pad.delete_all(&mut no())?, Gated::Declined);
        assert_eq!(pad.recreate(&mut no())?, Gated::Declined);
        assert_eq!(pad.backup(&mut no())?, Gated::Declined);
        assert_eq!(pad.clear(&mut no())?, Gated::Declined);

        assert_eq!(fs::read(&pad.paths().store)?, before);
        assert!(!pad.paths().backup_exists());
        assert_eq!(pad.locate("1")?, memo);
        Ok(())
    }

    #[test]
    fn delete_removes_one_memo_and_leaves_a_gap() -> Result<()> {
        let (_dir, pad) = seeded_pad()?;
        let first = pad.locate("1")?;

        assert_eq!(pad.delete(&first, &mut yes())?, Gated::Done(()));
        assert_eq!(pad.count()?, 1);
        assert!(matches!(pad.locate("1"), Err(MemoError::NotFound(_))));
        assert!(matches!(pad.delete(&first, &mut yes()), Err(MemoError::NotFound(_))));
        assert_eq!(pad.count()?, 1);

        let third = pad.add(&MemoDraft::new("C", "", ""))?;
        assert_eq!(third.id.get(), 3);
        Ok(())
    }

    #[test]
    fn memos_beyond_the_live_count_are_refused_before_any_prompt() -> Result<()> {
        let (_dir, pad) = seeded_pad()?;
        pad.delete(&pad.locate("1")?, &mut yes())?;
        let second = pad.locate("2")?;

        assert!(matches!(pad.check_mutable(&second), Err(MemoError::NotFound(_))));

        let mut prompter = yes();
        let edited = pad.edit(&second, MemoField::Title, "New", &mut prompter);
        assert!(matches!(edited, Err(MemoError::NotFound(_))));
        assert_eq!(prompter.asked, 0);
        assert!(prompter.transcript.is_empty());

        let mut prompter = yes();
        assert!(matches!(pad.delete(&second, &mut prompter), Err(MemoError::NotFound(_))));
        assert_eq!(prompter.asked, 0);
        assert_eq!(pad.locate("2")?, second);
        Ok(())
    }

    #[test]
    fn deleted_memos_are_refused_before_any_prompt() -> Result<()> {
        let (_dir, pad) = seeded_pad()?;
        let first = pad.locate("1")?;
        pad.delete(&first, &mut yes())?;

        let mut prompter = yes();
        assert!(matches!(pad.delete(&first, &mut prompter), Err(MemoError::NotFound(_))));
        assert_eq!(prompter.asked, 0);
        Ok(())
    }

    #[test]
    fn delete_all_empties_after_confirmation() -> Result<()> {
        let (_dir, pad) = seeded_pad()?;
        assert_eq!(pad.delete_all(&mut yes())?, Gated::Done(2));
        assert_eq!(pad.count()?, 0);
        Ok(())
    }

    #[test]
    fn backup_then_restore_reproduces_the_backed_up_memos() -> Result<()> {
        let (_dir, pad) = seeded_pad()?;
        let snapshot = pad.all()?;

        assert_eq!(pad.backup(&mut yes())?, Gated::Done(pad.paths().backup.clone()));
        assert_eq!(fs::read(&pad.paths().backup)?, fs::read(&pad.paths().store)?);

        pad.add(&MemoDraft::new("after", "backup", ""))?;
        pad.delete(&pad.locate("1")?, &mut yes())?;

        let mut prompter = ScriptedPrompter::new(&["nope", "yes"]);
        assert_eq!(pad.restore(&mut prompter)?, Gated::Done(RestoreKind::Overwritten));
        assert_eq!(pad.all()?, snapshot);
        Ok(())
    }

    #[test]
    fn restore_without_backup_is_not_found_and_without_store_needs_no_confirmation(
    ) -> Result<()> {
        let (_dir, pad) = seeded_pad()?;
        assert!(matches!(pad.restore(&mut yes()), Err(MemoError::NotFound(_))));

        pad.backup(&mut yes())?;
        pad.paths().remove_store()?;
        let mut silent = ScriptedPrompter::default();
        assert_eq!(pad.restore(&mut silent)?, Gated::Done(RestoreKind::Repopulated));
        assert_eq!(silent.asked, 0);
        assert_eq!(pad.count()?, 2);
        Ok(())
    }

    #[test]
    fn declined_restore_overwrite_keeps_the_live_store() -> Result<()> {
        let (_dir, pad) = seeded_pad()?;
        pad.backup(&mut yes())?;
        pad.add(&MemoDraft::new("kept", "", ""))?;

        assert_eq!(pad.restore(&mut no())?, Gated::Declined);
        assert_eq!(pad.count()?, 3);
        Ok(())
    }

    #[test]
    fn backup_requires_a_store() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let pad = pad_at(&dir, NOW);
        assert!(matches!(pad.backup(&mut yes()), Err(MemoError::StoreMissing(_))));
        Ok(())
    }

    #[test]
    fn bootstrap_declined_restore_leaves_store_absent_until_add() -> Result<()> {
        let (dir, pad) = seeded_pad()?;
        pad.backup(&mut yes())?;
        pad.paths().remove_store()?;

        let fresh = pad_at(&dir, NOW);
        assert_eq!(fresh.bootstrap(&mut no())?, Bootstrap::RestoreDeclined);
        assert!(!fresh.paths().store_exists());
        assert!(matches!(fresh.count(), Err(MemoError::StoreMissing(_))));
        assert!(matches!(fresh.recent(), Err(MemoError::StoreMissing(_))));

        let memo = fresh.add(&MemoDraft::new("first", "", ""))?;
        assert_eq!(memo.id.get(), 1);
        assert_eq!(fresh.count()?, 1);
        Ok(())
    }

    #[test]
    fn bootstrap_restores_or_opens() -> Result<()> {
        let (dir, pad) = seeded_pad()?;
        pad.backup(&mut yes())?;
        pad.paths().remove_store()?;

        let fresh = pad_at(&dir, NOW);
        assert_eq!(
            fresh.bootstrap(&mut yes())?,
            Bootstrap::Restored(fresh.paths().store.clone())
        );
        assert_eq!(fresh.count()?, 2);

        let mut silent = ScriptedPrompter::default();
        assert_eq!(fresh.bootstrap(&mut silent)?, Bootstrap::Opened(fresh.paths().store.clone()));
        assert_eq!(silent.asked, 0);
        Ok(())
    }

    #[test]
    fn recreate_empties_the_store_but_keeps_the_backup() -> Result<()> {
        let (_dir, pad) = seeded_pad()?;
        pad.backup(&mut yes())?;

        assert!(matches!(pad.recreate(&mut yes())?, Gated::Done(_)));
        assert_eq!(pad.count()?, 0);
        assert!(pad.paths().backup_exists());
        Ok(())
    }

    #[test]
    fn clear_removes_every_trace() -> Result<()> {
        let (_dir, pad) = seeded_pad()?;
        pad.backup(&mut yes())?;

        assert_eq!(pad.clear(&mut yes())?, Gated::Done(()));
        assert!(!pad.paths().store_exists());
        assert!(!pad.paths().backup_exists());
        assert!(!pad.paths().working_dir.exists());
        Ok(())
    }

    #[test]
    fn clear_refuses_a_directory_with_other_files() -> Result<()> {
        let (_dir, pad) = seeded_pad()?;
        pad.backup(&mut yes())?;
        fs::write(pad.paths().working_dir.join("notes.txt"), b"mine")?;

        let mut prompter = yes();
        assert!(matches!(pad.clear(&mut prompter), Err(MemoError::InvalidInput(_))));
        assert_eq!(prompter.asked, 0);
        assert!(pad.paths().store_exists());
        assert!(pad.paths().backup_exists());
        assert_eq!(pad.count()?, 2);
        Ok(())
    }

    #[test]
    fn check_reports_corruption_without_failing() -> Result<()> {
        let (_dir, pad) = seeded_pad()?;
        assert!(pad.check()?.ok);

        fs::write(&pad.paths().store, vec![0x5A_u8; 8192])?;
        assert!(!pad.check()?.ok);
        Ok(())
    }
}
