//! Reorder Reconciler.
//!
//! Decides whether the working sequence carries an unsaved reorder and drives
//! the save. Per collection the reconciler moves through:
//!
//! ```text
//!            reorder()              begin_save()
//!   Clean ─────────────► Dirty ─────────────────► Saving
//!     ▲                    ▲                         │
//!     │                    └──── failure ────────────┤
//!     └─────────────────────────── success ──────────┘
//! ```
//!
//! Reorders are accepted while `Saving`. The in-flight save persists the
//! snapshot captured by [`Reconciler::begin_save`]; on success that snapshot
//! becomes the confirmed state even if the working view has moved on since,
//! which leaves the reconciler `Dirty` again.

use crate::collection::{position_to_order, PhotoCollection};
use crate::error::CoreError;
use crate::gateway::PhotoRecords;
use crate::photo::{OrderUpdate, Photo};

/// True when both sequences have the same length and differ in the identity
/// at some position.
///
/// A length mismatch means an upload or deletion is being reflected, which
/// is never reported as a reorder.
pub fn has_pending_reorder(working: &[Photo], confirmed: &[Photo]) -> bool {
    if working.len() != confirmed.len() {
        return false;
    }
    working
        .iter()
        .zip(confirmed)
        .any(|(w, c)| w.id != c.id)
}

/// Synchronization state of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveState {
    Clean,
    Dirty,
    Saving,
}

/// Result of [`Reconciler::save_and_publish`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// No pending reorder, or a save was already in flight.
    NothingToSave,
    /// Every record's order was written.
    Saved { updated: usize },
}

/// Snapshot of the working sequence handed out for an in-flight save.
#[derive(Debug)]
#[must_use = "a save ticket must be passed back to `complete_save`"]
pub struct SaveTicket {
    snapshot: Vec<Photo>,
}

impl SaveTicket {
    pub fn snapshot(&self) -> &[Photo] {
        &self.snapshot
    }

    /// Order writes for every record in the snapshot.
    pub fn order_updates(&self) -> Vec<OrderUpdate> {
        self.snapshot
            .iter()
            .enumerate()
            .map(|(index, photo)| OrderUpdate {
                id: photo.id.clone(),
                order: position_to_order(index),
            })
            .collect()
    }
}

/// A photo collection plus its save state.
#[derive(Debug, Default)]
pub struct Reconciler {
    collection: PhotoCollection,
    saving: bool,
}

impl Reconciler {
    pub fn new(collection: PhotoCollection) -> Self {
        Self {
            collection,
            saving: false,
        }
    }

    /// Start from a freshly fetched list of records.
    pub fn load(initial: Vec<Photo>) -> Self {
        Self::new(PhotoCollection::loaded(initial))
    }

    pub fn state(&self) -> SaveState {
        if self.saving {
            SaveState::Saving
        } else if self.collection.has_pending_reorder() {
            SaveState::Dirty
        } else {
            SaveState::Clean
        }
    }

    pub fn collection(&self) -> &PhotoCollection {
        &self.collection
    }

    /// Mutable access for uploads and deletions that have already been persisted.
    pub fn collection_mut(&mut self) -> &mut PhotoCollection {
        &mut self.collection
    }

    pub fn into_collection(self) -> PhotoCollection {
        self.collection
    }

    pub fn reorder(&mut self, new_sequence: Vec<Photo>) {
        self.collection.reorder(new_sequence);
    }

    pub fn reorder_by_ids<S: AsRef<str>>(&mut self, ids: &[S]) -> Result<(), CoreError> {
        self.collection.reorder_by_ids(ids)
    }

    /// Capture the working sequence for saving.
    ///
    /// Returns `None` when there is nothing to save or a save is already in
    /// flight.
    pub fn begin_save(&mut self) -> Option<SaveTicket> {
        if self.saving || !self.collection.has_pending_reorder() {
            return None;
        }
        self.saving = true;
        Some(SaveTicket {
            snapshot: self.collection.working().to_vec(),
        })
    }

    /// Apply the result of an in-flight save.
    ///
    /// On success the ticket's snapshot becomes the confirmed state. On
    /// failure the confirmed state is untouched so the reorder stays pending.
    pub fn complete_save(&mut self, ticket: SaveTicket, result: &Result<(), CoreError>) {
        self.saving = false;
        if result.is_ok() {
            self.collection.confirm(ticket.snapshot);
        }
    }

    /// Persist the pending reorder and confirm it.
    pub async fn save_and_publish(
        &mut self,
        records: &dyn PhotoRecords,
    ) -> Result<SaveOutcome, CoreError> {
        let Some(ticket) = self.begin_save() else {
            return Ok(SaveOutcome::NothingToSave);
        };

        let updated = ticket.snapshot().len();
        let result = persist_order(records, &ticket).await;
        self.complete_save(ticket, &result);

        match result {
            Ok(()) => {
                tracing::info!(updated, "Photo order saved");
                Ok(SaveOutcome::Saved { updated })
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to save photo order");
                Err(err)
            }
        }
    }
}

/// Write the ticket's ordering through `records`.
///
/// An upstream failure is reported as a single error covering the whole
/// batch; the caller cannot tell which writes landed and must resend all of
/// them. Other errors (a vanished photo, say) pass through unchanged.
pub async fn persist_order(
    records: &dyn PhotoRecords,
    ticket: &SaveTicket,
) -> Result<(), CoreError> {
    let updates = ticket.order_updates();
    records.update_orders(&updates).await.map_err(|err| match err {
        CoreError::Upstream(msg) => CoreError::Upstream(format!(
            "Failed to save order for {} photos: {msg}",
            updates.len()
        )),
        other => other,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::tests::{ids, photo};
    use crate::memory::MemoryPhotoRecords;
    use assert_matches::assert_matches;

    fn abc() -> Vec<Photo> {
        vec![photo("A", 0), photo("B", 1), photo("C", 2)]
    }

    fn seeded_records() -> MemoryPhotoRecords {
        MemoryPhotoRecords::with_photos(abc())
    }

    // -- has_pending_reorder --------------------------------------------------

    #[test]
    fn equal_sequences_are_not_pending() {
        assert!(!has_pending_reorder(&abc(), &abc()));
        assert!(!has_pending_reorder(&[], &[]));
    }

    #[test]
    fn any_positional_mismatch_is_pending() {
        let swapped = vec![photo("A", 0), photo("C", 1), photo("B", 2)];
        assert!(has_pending_reorder(&swapped, &abc()));
    }

    #[test]
    fn length_mismatch_is_never_pending() {
        let working = abc();
        let confirmed = vec![photo("A", 0), photo("B", 1)];
        assert!(!has_pending_reorder(&working, &confirmed));

        let reversed = vec![photo("C", 0), photo("B", 1)];
        assert!(!has_pending_reorder(&working, &reversed));
    }

    #[test]
    fn only_identity_matters() {
        let mut renamed = abc();
        renamed[0].url = "https://elsewhere.example.com/a.jpg".into();
        renamed[1].order = 99;
        assert!(!has_pending_reorder(&renamed, &abc()));
    }

    // -- state machine --------------------------------------------------------

    #[test]
    fn reorder_moves_clean_to_dirty() {
        let mut reconciler = Reconciler::load(abc());
        assert_eq!(reconciler.state(), SaveState::Clean);

        reconciler.reorder_by_ids(&["B", "A", "C"]).unwrap();
        assert_eq!(reconciler.state(), SaveState::Dirty);
    }

    #[test]
    fn begin_save_when_clean_is_noop() {
        let mut reconciler = Reconciler::load(abc());
        assert!(reconciler.begin_save().is_none());
        assert_eq!(reconciler.state(), SaveState::Clean);
    }

    #[test]
    fn begin_save_twice_hands_out_one_ticket() {
        let mut reconciler = Reconciler::load(abc());
        reconciler.reorder_by_ids(&["B", "A", "C"]).unwrap();

        let ticket = reconciler.begin_save().unwrap();
        assert_eq!(reconciler.state(), SaveState::Saving);
        assert!(reconciler.begin_save().is_none());

        reconciler.complete_save(ticket, &Ok(()));
        assert_eq!(reconciler.state(), SaveState::Clean);
    }

    #[test]
    fn failed_save_returns_to_dirty() {
        let mut reconciler = Reconciler::load(abc());
        reconciler.reorder_by_ids(&["B", "A", "C"]).unwrap();

        let ticket = reconciler.begin_save().unwrap();
        reconciler.complete_save(ticket, &Err(CoreError::Upstream("boom".into())));

        assert_eq!(reconciler.state(), SaveState::Dirty);
        assert_eq!(ids(reconciler.collection().confirmed()), ["A", "B", "C"]);
    }

    #[test]
    fn reorder_while_saving_is_kept_and_save_applies_its_snapshot() {
        let mut reconciler = Reconciler::load(abc());
        reconciler.reorder_by_ids(&["B", "A", "C"]).unwrap();
        let ticket = reconciler.begin_save().unwrap();

        // Operator keeps dragging while the save is in flight.
        reconciler.reorder_by_ids(&["C", "B", "A"]).unwrap();
        assert_eq!(reconciler.state(), SaveState::Saving);

        reconciler.complete_save(ticket, &Ok(()));
        assert_eq!(ids(reconciler.collection().confirmed()), ["B", "A", "C"]);
        assert_eq!(ids(reconciler.collection().working()), ["C", "B", "A"]);
        assert_eq!(reconciler.state(), SaveState::Dirty);
    }

    #[test]
    fn ticket_orders_are_zero_based_positions() {
        let mut reconciler = Reconciler::load(abc());
        reconciler.reorder_by_ids(&["C", "A", "B"]).unwrap();
        let ticket = reconciler.begin_save().unwrap();

        let updates = ticket.order_updates();
        let pairs: Vec<_> = updates.iter().map(|u| (u.id.as_str(), u.order)).collect();
        assert_eq!(pairs, [("C", 0), ("A", 1), ("B", 2)]);
        reconciler.complete_save(ticket, &Ok(()));
    }

    // -- save_and_publish -----------------------------------------------------

    #[tokio::test]
    async fn drag_save_scenario() {
        let records = seeded_records();
        let mut reconciler = Reconciler::load(records.list().await.unwrap());

        reconciler.reorder_by_ids(&["B", "A", "C"]).unwrap();
        assert!(reconciler.collection().has_pending_reorder());

        let outcome = reconciler.save_and_publish(&records).await.unwrap();
        assert_eq!(outcome, SaveOutcome::Saved { updated: 3 });
        assert!(!reconciler.collection().has_pending_reorder());
        assert_eq!(ids(reconciler.collection().confirmed()), ["B", "A", "C"]);

        let stored = records.list().await.unwrap();
        let stored: Vec<_> = stored.iter().map(|p| (p.id.as_str(), p.order)).collect();
        assert_eq!(stored, [("B", 0), ("A", 1), ("C", 2)]);
    }

    #[tokio::test]
    async fn save_without_pending_reorder_does_not_touch_records() {
        let records = seeded_records();
        records.fail_writes(true);
        let mut reconciler = Reconciler::load(abc());

        let outcome = reconciler.save_and_publish(&records).await.unwrap();
        assert_eq!(outcome, SaveOutcome::NothingToSave);
        assert_eq!(records.order_writes(), 0);
    }

    #[tokio::test]
    async fn failed_save_keeps_confirmed_and_allows_retry() {
        let records = seeded_records();
        records.fail_order_updates_after(1);
        let mut reconciler = Reconciler::load(abc());
        reconciler.reorder_by_ids(&["C", "B", "A"]).unwrap();

        let err = reconciler.save_and_publish(&records).await.unwrap_err();
        assert_matches!(err, CoreError::Upstream(_));
        assert!(reconciler.collection().has_pending_reorder());
        assert_eq!(ids(reconciler.collection().confirmed()), ["A", "B", "C"]);

        // Retry resends the full batch.
        records.clear_failures();
        let outcome = reconciler.save_and_publish(&records).await.unwrap();
        assert_eq!(outcome, SaveOutcome::Saved { updated: 3 });
        assert!(!reconciler.collection().has_pending_reorder());
        assert_eq!(records.order_writes(), 4);
    }

    /// Records whose batch order write always reports a vanished photo.
    struct VanishedPhotoRecords;

    #[async_trait::async_trait]
    impl PhotoRecords for VanishedPhotoRecords {
        async fn create(&self, _input: crate::photo::NewPhoto) -> Result<Photo, CoreError> {
            unimplemented!()
        }

        async fn update_order(&self, _id: &str, _order: i32) -> Result<(), CoreError> {
            unimplemented!()
        }

        async fn update_orders(&self, _updates: &[OrderUpdate]) -> Result<(), CoreError> {
            Err(CoreError::Conflict(
                "A photo in the reorder batch no longer exists".into(),
            ))
        }

        async fn delete(&self, _id: &str) -> Result<(), CoreError> {
            unimplemented!()
        }

        async fn list(&self) -> Result<Vec<Photo>, CoreError> {
            Ok(abc())
        }

        async fn find(&self, _id: &str) -> Result<Option<Photo>, CoreError> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn conflict_during_save_keeps_its_kind() {
        let mut reconciler = Reconciler::load(abc());
        reconciler.reorder_by_ids(&["B", "A", "C"]).unwrap();

        let err = reconciler
            .save_and_publish(&VanishedPhotoRecords)
            .await
            .unwrap_err();
        assert_matches!(err, CoreError::Conflict(msg) if msg.contains("no longer exists"));
        assert_eq!(reconciler.state(), SaveState::Dirty);
        assert_eq!(ids(reconciler.collection().confirmed()), ["A", "B", "C"]);
    }

    #[tokio::test]
    async fn upstream_failure_names_batch_size() {
        let records = seeded_records();
        records.fail_writes(true);
        let mut reconciler = Reconciler::load(abc());
        reconciler.reorder_by_ids(&["B", "A", "C"]).unwrap();

        let err = reconciler.save_and_publish(&records).await.unwrap_err();
        assert_matches!(err, CoreError::Upstream(msg) if msg.starts_with("Failed to save order for 3 photos"));
    }

    #[tokio::test]
    async fn upload_after_save_keeps_detection_quiet() {
        let records = seeded_records();
        let mut reconciler = Reconciler::load(abc());
        reconciler.reorder_by_ids(&["B", "A", "C"]).unwrap();
        reconciler.save_and_publish(&records).await.unwrap();

        reconciler.collection_mut().append(photo("D", 0));
        assert_eq!(reconciler.state(), SaveState::Clean);
    }
}
