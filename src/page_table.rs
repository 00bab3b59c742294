use crate::constants::PT_SIZE;
use crate::memory::FrameLocation;

/// Direct-mapped page table: one slot per page number, `None` while unmapped.
///
/// Pure data structure. Fault counting happens in the translator, not here.
pub struct PageTable {
    entries: [Option<FrameLocation>; PT_SIZE],
}

impl PageTable {
    pub fn new() -> Self {
        PageTable {
            entries: [None; PT_SIZE],
        }
    }

    #[inline]
    pub fn lookup(&self, page: u32) -> Option<FrameLocation> {
        self.entries[page as usize]
    }

    #[inline]
    pub fn set(&mut self, page: u32, frame: FrameLocation) {
        self.entries[page as usize] = Some(frame);
    }

    /// Mark a page unmapped again (only after its frame was reclaimed)
    pub fn clear(&mut self, page: u32) -> Option<FrameLocation> {
        self.entries[page as usize].take()
    }

    /// Number of pages currently mapped to a frame
    pub fn resident_pages(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }
}

impl Default for PageTable {
    fn default() -> Self {
        Self::new()
    }
}
