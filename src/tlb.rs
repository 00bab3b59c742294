use log::trace;

use crate::constants::TLB_ENTRIES;
use crate::memory::FrameLocation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TlbEntry {
    page: u32,
    frame: FrameLocation,
}

/// Translation lookaside buffer: a circular FIFO queue of page -> frame entries.
///
/// Insertion never checks for an existing entry of the same page, so duplicates
/// can sit in the queue until they age out. Lookup scans slots in order and
/// returns the first match.
pub struct TranslationCache {
    slots: Vec<Option<TlbEntry>>,
    /// Slot written by the most recent insertion
    back: Option<usize>,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::with_capacity(TLB_ENTRIES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        TranslationCache {
            slots: vec![None; capacity],
            back: None,
        }
    }

    pub fn lookup(&self, page: u32) -> Option<FrameLocation> {
        self.slots
            .iter()
            .flatten()
            .find(|entry| entry.page == page)
            .map(|entry| entry.frame)
    }

    /// Append at the back of the queue, overwriting the oldest slot once full
    pub fn insert(&mut self, page: u32, frame: FrameLocation) {
        let slot = match self.back {
            Some(back) => (back + 1) % self.slots.len(),
            None => 0,
        };
        if let Some(old) = self.slots[slot] {
            trace!("TLB evicts page {} ({})", old.page, old.frame);
        }
        self.slots[slot] = Some(TlbEntry { page, frame });
        self.back = Some(slot);
    }

    /// Drop every entry for `page`, returning how many were removed
    pub fn invalidate(&mut self, page: u32) -> usize {
        let mut removed = 0;
        for slot in self.slots.iter_mut() {
            if slot.is_some_and(|entry| entry.page == page) {
                *slot = None;
                removed += 1;
            }
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::new()
    }
}
