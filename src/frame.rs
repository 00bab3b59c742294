//! Frame acquisition policies.
//!
//! The translator asks a [`FrameAllocator`] for a frame on every page fault.
//! [`BumpAllocator`] hands out frames in order and gives up once memory is
//! full. [`FifoReplacement`] and [`LruReplacement`] fall back to reclaiming a
//! resident page's frame, reporting the victim so the translator can unmap it.

use std::collections::VecDeque;

use log::debug;

use crate::memory::FrameLocation;

/// No free frame, and the policy cannot reclaim one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exhausted;

/// A frame handed to a faulting page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGrant {
    pub frame: FrameLocation,
    /// Page that previously lived in `frame` and must be unmapped
    pub evicted: Option<u32>,
}

pub trait FrameAllocator {
    /// Pick a frame for `page`. On `Err` the allocator state is unchanged.
    fn acquire_frame(&mut self, page: u32) -> Result<FrameGrant, Exhausted>;

    /// Called after every successful reference to a resident page
    fn touch(&mut self, _page: u32) {}

    fn frame_count(&self) -> usize;
}

/// Hands out frames 0, 1, 2, ... and never reclaims any
pub struct BumpAllocator {
    frames: usize,
    /// Index of the next unused frame, `None` once memory is full
    next: Option<usize>,
}

impl BumpAllocator {
    pub fn new(frames: usize) -> Self {
        BumpAllocator {
            frames,
            next: if frames > 0 { Some(0) } else { None },
        }
    }

    /// Take the next free frame, if any
    fn bump(&mut self) -> Option<FrameLocation> {
        let index = self.next?;
        self.next = if index + 1 < self.frames {
            Some(index + 1)
        } else {
            debug!("All {} frames allocated", self.frames);
            None
        };
        Some(FrameLocation::from_index(index))
    }

    pub fn is_full(&self) -> bool {
        self.next.is_none()
    }
}

impl FrameAllocator for BumpAllocator {
    fn acquire_frame(&mut self, _page: u32) -> Result<FrameGrant, Exhausted> {
        match self.bump() {
            Some(frame) => Ok(FrameGrant { frame, evicted: None }),
            None => {
                debug!("No free frames");
                Err(Exhausted)
            }
        }
    }

    fn frame_count(&self) -> usize {
        self.frames
    }
}

/// Evicts the page that was loaded earliest
pub struct FifoReplacement {
    free: BumpAllocator,
    /// Resident pages in load order, oldest at the front
    loaded: VecDeque<(u32, FrameLocation)>,
}

impl FifoReplacement {
    pub fn new(frames: usize) -> Self {
        FifoReplacement {
            free: BumpAllocator::new(frames),
            loaded: VecDeque::with_capacity(frames),
        }
    }
}

impl FrameAllocator for FifoReplacement {
    fn acquire_frame(&mut self, page: u32) -> Result<FrameGrant, Exhausted> {
        let grant = match self.free.bump() {
            Some(frame) => FrameGrant { frame, evicted: None },
            None => {
                let (victim, frame) = self.loaded.pop_front().ok_or(Exhausted)?;
                debug!("FIFO evicts page {} from {}", victim, frame);
                FrameGrant {
                    frame,
                    evicted: Some(victim),
                }
            }
        };
        self.loaded.push_back((page, grant.frame));
        Ok(grant)
    }

    fn frame_count(&self) -> usize {
        self.free.frames
    }
}

/// Evicts the resident page referenced least recently
pub struct LruReplacement {
    free: BumpAllocator,
    /// Resident pages, least recently used at the front
    recency: VecDeque<(u32, FrameLocation)>,
}

impl LruReplacement {
    pub fn new(frames: usize) -> Self {
        LruReplacement {
            free: BumpAllocator::new(frames),
            recency: VecDeque::with_capacity(frames),
        }
    }
}

impl FrameAllocator for LruReplacement {
    fn acquire_frame(&mut self, page: u32) -> Result<FrameGrant, Exhausted> {
        let grant = match self.free.bump() {
            Some(frame) => FrameGrant { frame, evicted: None },
            None => {
                let (victim, frame) = self.recency.pop_front().ok_or(Exhausted)?;
                debug!("LRU evicts page {} from {}", victim, frame);
                FrameGrant {
                    frame,
                    evicted: Some(victim),
                }
            }
        };
        self.recency.push_back((page, grant.frame));
        Ok(grant)
    }

    fn touch(&mut self, page: u32) {
        if let Some(pos) = self.recency.iter().position(|&(p, _)| p == page) {
            if let Some(entry) = self.recency.remove(pos) {
                self.recency.push_back(entry);
            }
        }
    }

    fn frame_count(&self) -> usize {
        self.free.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bump_allocates_in_order() {
        let mut alloc = BumpAllocator::new(4);
        for i in 0..4 {
            let grant = alloc.acquire_frame(100 + i as u32).unwrap();
            assert_eq!(grant.frame.base(), (i * 256) as u32);
            assert_eq!(grant.evicted, None);
        }
        assert!(alloc.is_full());
    }

    #[test]
    fn test_bump_exhaustion_is_permanent() {
        let mut alloc = BumpAllocator::new(2);
        alloc.acquire_frame(0).unwrap();
        alloc.acquire_frame(1).unwrap();

        assert_eq!(alloc.acquire_frame(2), Err(Exhausted));
        assert_eq!(alloc.acquire_frame(3), Err(Exhausted));
    }

    #[test]
    fn test_bump_full_size_memory() {
        let mut alloc = BumpAllocator::new(256);
        let mut last = None;
        for page in 0..256 {
            last = Some(alloc.acquire_frame(page).unwrap().frame);
        }
        // Last frame sits at 65280, then memory is full
        assert_eq!(last.map(|f| f.base()), Some(65280));
        assert_eq!(alloc.acquire_frame(0), Err(Exhausted));
    }

    #[test]
    fn test_zero_frames_never_allocates() {
        let mut alloc = FifoReplacement::new(0);
        assert_eq!(alloc.acquire_frame(0), Err(Exhausted));
    }

    #[test]
    fn test_fifo_reuses_oldest_frame() {
        let mut alloc = FifoReplacement::new(2);
        let a = alloc.acquire_frame(10).unwrap();
        let b = alloc.acquire_frame(11).unwrap();

        // Touching has no effect on FIFO order
        alloc.touch(10);

        let c = alloc.acquire_frame(12).unwrap();
        assert_eq!(c.evicted, Some(10));
        assert_eq!(c.frame, a.frame);

        let d = alloc.acquire_frame(13).unwrap();
        assert_eq!(d.evicted, Some(11));
        assert_eq!(d.frame, b.frame);

        // Page 12 is now the oldest
        let e = alloc.acquire_frame(14).unwrap();
        assert_eq!(e.evicted, Some(12));
    }

    #[test]
    fn test_lru_evicts_least_recently_touched() {
        let mut alloc = LruReplacement::new(2);
        let a = alloc.acquire_frame(10).unwrap();
        let b = alloc.acquire_frame(11).unwrap();

        // 10 becomes most recent, so 11 is the victim
        alloc.touch(10);
        let c = alloc.acquire_frame(12).unwrap();
        assert_eq!(c.evicted, Some(11));
        assert_eq!(c.frame, b.frame);

        // Order now: 10, 12
        let d = alloc.acquire_frame(13).unwrap();
        assert_eq!(d.evicted, Some(10));
        assert_eq!(d.frame, a.frame);
    }

    #[test]
    fn test_lru_touch_unknown_page_is_ignored() {
        let mut alloc = LruReplacement::new(1);
        alloc.acquire_frame(1).unwrap();
        alloc.touch(99);
        assert_eq!(alloc.acquire_frame(2).unwrap().evicted, Some(1));
    }
}
