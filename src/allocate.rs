//! Quota expansion: maps (image, count) entries onto grid slots.

use log::{debug, warn};
use std::sync::Arc;

use crate::source::SourceImage;

/// A source image and how many copies of it to print
#[derive(Debug, Clone)]
pub struct PhotoEntry {
    pub image: Arc<SourceImage>,
    count: usize,
}

impl PhotoEntry {
    /// Counts below 1 are raised to 1.
    pub fn new(image: Arc<SourceImage>, count: i64) -> Self {
        let count = if count < 1 {
            warn!(
                "copy count {} for '{}' is below 1, printing one copy",
                count,
                image.name()
            );
            1
        } else {
            count as usize
        };
        Self { image, count }
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

/// Total copies requested across all entries
pub fn total_requested(entries: &[PhotoEntry]) -> usize {
    entries
        .iter()
        .fold(0usize, |sum, e| sum.saturating_add(e.count))
}

/// Slot contents in row-major order; `Some(i)` refers to `entries[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotAssignment {
    slots: Vec<Option<usize>>,
}

impl SlotAssignment {
    pub fn from_slots(slots: Vec<Option<usize>>) -> Self {
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<usize> {
        self.slots.get(index).copied().flatten()
    }

    pub fn slots(&self) -> &[Option<usize>] {
        &self.slots
    }

    /// (slot index, entry index) for every filled slot
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, entry)| entry.map(|e| (slot, e)))
    }
}

/// Fill slots greedily in entry order, cutting off at `capacity`.
///
/// Each entry contributes its copies contiguously; once the sheet is full the
/// rest of the current entry and all later entries are dropped.
pub fn allocate_slots(entries: &[PhotoEntry], capacity: usize) -> SlotAssignment {
    let mut slots = Vec::with_capacity(capacity.min(total_requested(entries)));

    'entries: for (index, entry) in entries.iter().enumerate() {
        for _ in 0..entry.count {
            if slots.len() >= capacity {
                break 'entries;
            }
            slots.push(Some(index));
        }
    }

    let requested = total_requested(entries);
    if requested > slots.len() {
        warn!(
            "{} photos requested but only {} fit on the sheet",
            requested,
            slots.len()
        );
    }
    debug!("allocated {} of {} slots", slots.len(), capacity);

    SlotAssignment { slots }
}
