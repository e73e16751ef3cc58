//! Photo Collection Store.
//!
//! Holds two snapshots of the gallery:
//!
//! - **working**: the ordering currently shown to the operator, possibly
//!   carrying an unsaved reorder;
//! - **confirmed**: the last ordering known to match durable storage.
//!
//! Uploads and deletions are persisted before they reach this store, so they
//! are mirrored into both snapshots. Only [`PhotoCollection::reorder`] makes
//! the two diverge.

use std::collections::HashSet;

use crate::error::CoreError;
use crate::photo::{sort_for_display, Photo};
use crate::reconcile::has_pending_reorder;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoCollection {
    working: Vec<Photo>,
    confirmed: Vec<Photo>,
}

impl PhotoCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection whose working and confirmed snapshots are both `initial`.
    pub fn loaded(initial: Vec<Photo>) -> Self {
        let mut collection = Self::new();
        collection.load(initial);
        collection
    }

    /// Replace both snapshots with `initial`.
    pub fn load(&mut self, initial: Vec<Photo>) {
        self.confirmed = initial.clone();
        self.working = initial;
    }

    /// Insert a freshly persisted upload into both snapshots.
    pub fn append(&mut self, photo: Photo) {
        self.confirmed.push(photo.clone());
        sort_for_display(&mut self.confirmed);
        self.working.push(photo);
        sort_for_display(&mut self.working);
    }

    /// Drop a deleted record from both snapshots.
    ///
    /// Returns the record that was removed from the working sequence.
    pub fn remove(&mut self, id: &str) -> Option<Photo> {
        self.confirmed.retain(|p| p.id != id);
        let index = self.working.iter().position(|p| p.id == id)?;
        Some(self.working.remove(index))
    }

    /// Replace the working sequence, renumbering `order` to each position.
    ///
    /// The confirmed snapshot is left alone; this is what produces a pending
    /// reorder.
    pub fn reorder(&mut self, new_sequence: Vec<Photo>) {
        self.working = new_sequence;
        for (index, photo) in self.working.iter_mut().enumerate() {
            photo.order = position_to_order(index);
        }
    }

    /// Rearrange the working records into the order given by `ids`.
    ///
    /// `ids` must be a permutation of the working ids. On error the
    /// collection is left untouched.
    pub fn reorder_by_ids<S: AsRef<str>>(&mut self, ids: &[S]) -> Result<(), CoreError> {
        if ids.len() != self.working.len() {
            return Err(CoreError::Validation(format!(
                "Reorder must list every photo exactly once: expected {} ids, got {}",
                self.working.len(),
                ids.len()
            )));
        }

        let mut seen = HashSet::with_capacity(ids.len());
        let mut sequence = Vec::with_capacity(ids.len());
        for id in ids {
            let id = id.as_ref();
            if !seen.insert(id) {
                return Err(CoreError::Validation(format!(
                    "Photo id '{id}' appears more than once"
                )));
            }
            let photo = self
                .get(id)
                .cloned()
                .ok_or_else(|| CoreError::photo_not_found(id))?;
            sequence.push(photo);
        }

        self.reorder(sequence);
        Ok(())
    }

    pub fn working(&self) -> &[Photo] {
        &self.working
    }

    pub fn confirmed(&self) -> &[Photo] {
        &self.confirmed
    }

    /// Find a record in the working sequence.
    pub fn get(&self, id: &str) -> Option<&Photo> {
        self.working.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.working.len()
    }

    pub fn is_empty(&self) -> bool {
        self.working.is_empty()
    }

    pub fn has_pending_reorder(&self) -> bool {
        has_pending_reorder(&self.working, &self.confirmed)
    }

    /// Promote `snapshot` to the confirmed state after a successful save.
    pub(crate) fn confirm(&mut self, snapshot: Vec<Photo>) {
        self.confirmed = snapshot;
    }

    pub fn into_working(self) -> Vec<Photo> {
        self.working
    }
}

/// Orders are 0-based positions in the displayed sequence.
pub(crate) fn position_to_order(index: usize) -> i32 {
    i32::try_from(index).unwrap_or(i32::MAX)
}
