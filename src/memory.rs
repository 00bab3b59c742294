use std::fs;
use std::path::Path;

use log::info;

use crate::constants::*;
use crate::error::{Result, VmError};

/// Byte base of a frame within physical memory, always a multiple of `FRAME_SIZE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameLocation(u32);

impl FrameLocation {
    /// Location of the frame with the given index
    #[inline]
    pub fn from_index(frame: usize) -> Self {
        FrameLocation((frame * FRAME_SIZE) as u32)
    }

    #[inline]
    pub fn base(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize / FRAME_SIZE
    }

    /// Physical address of `offset` within this frame
    #[inline]
    pub fn physical_address(self, offset: u32) -> u32 {
        self.0 + offset
    }
}

impl std::fmt::Display for FrameLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "frame {} @ {}", self.index(), self.0)
    }
}

pub struct PhysicalMemory {
    data: Box<[u8]>,
}

impl PhysicalMemory {
    /// Create a physical memory of `frames` frames, initialized to all zeros
    pub fn new(frames: usize) -> Self {
        PhysicalMemory {
            data: vec![0u8; frames * FRAME_SIZE].into_boxed_slice(),
        }
    }

    /// Read a byte from physical memory
    #[inline]
    pub fn read(&self, address: u32) -> u8 {
        self.data[address as usize]
    }

    /// Copy a whole page into a frame
    pub fn write_frame(&mut self, frame: FrameLocation, page: &[u8; PAGE_SIZE]) {
        let start = frame.base() as usize;
        self.data[start..start + FRAME_SIZE].copy_from_slice(page);
    }

    pub fn read_frame(&self, frame: FrameLocation) -> &[u8] {
        let start = frame.base() as usize;
        &self.data[start..start + FRAME_SIZE]
    }

    pub fn frame_count(&self) -> usize {
        self.data.len() / FRAME_SIZE
    }

    /// Calculate the starting address of a frame
    #[inline]
    pub fn frame_to_address(frame: usize) -> u32 {
        FrameLocation::from_index(frame).base()
    }
}

impl Default for PhysicalMemory {
    fn default() -> Self {
        Self::new(NUM_FRAMES)
    }
}

/// Read-only page store, the simulated disk behind physical memory
pub struct BackingStore {
    /// pages[page][offset], exactly BACKING_STORE_PAGES pages
    pages: Box<[[u8; PAGE_SIZE]]>,
}

impl BackingStore {
    /// Load a backing store file, which must be exactly 65536 bytes
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| VmError::io(path, e))?;
        let store = Self::from_bytes(&bytes)?;
        info!("Opened backing store {} ({} pages)", path.display(), BACKING_STORE_PAGES);
        Ok(store)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != BACKING_STORE_SIZE {
            return Err(VmError::BackingStoreSize {
                expected: BACKING_STORE_SIZE,
                actual: bytes.len(),
            });
        }

        let mut pages = vec![[0u8; PAGE_SIZE]; BACKING_STORE_PAGES].into_boxed_slice();
        for (page, chunk) in pages.iter_mut().zip(bytes.chunks_exact(PAGE_SIZE)) {
            page.copy_from_slice(chunk);
        }
        Ok(BackingStore { pages })
    }

    /// Fetch a whole page by page number
    #[inline]
    pub fn read_page(&self, page: u32) -> &[u8; PAGE_SIZE] {
        &self.pages[page as usize]
    }

    /// Read a single byte from the store
    #[inline]
    pub fn read(&self, page: u32, offset: u32) -> u8 {
        self.pages[page as usize][offset as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern_bytes() -> Vec<u8> {
        (0..BACKING_STORE_SIZE)
            .map(|i| ((i / PAGE_SIZE) as u8).wrapping_mul(7) ^ (i % PAGE_SIZE) as u8)
            .collect()
    }

    #[test]
    fn test_pm_initialization() {
        let pm = PhysicalMemory::default();
        // All memory should be zeroed
        assert_eq!(pm.read(0), 0);
        assert_eq!(pm.read(PM_SIZE as u32 - 1), 0);
        assert_eq!(pm.frame_count(), NUM_FRAMES);
    }

    #[test]
    fn test_pm_smaller_than_store() {
        let pm = PhysicalMemory::new(128);
        assert_eq!(pm.frame_count(), 128);
        assert_eq!(pm.read(128 * 256 - 1), 0);
    }

    #[test]
    fn test_pm_write_frame() {
        let mut pm = PhysicalMemory::default();
        let mut page = [0u8; PAGE_SIZE];
        page[0] = 42;
        page[255] = 0x80;

        // Frame 3 starts at 3*256 = 768
        pm.write_frame(FrameLocation::from_index(3), &page);

        assert_eq!(pm.read(768), 42);
        assert_eq!(pm.read(768 + 255), 0x80);
        // Neighbouring frames untouched
        assert_eq!(pm.read(767), 0);
        assert_eq!(pm.read(1024), 0);
        assert_eq!(pm.read_frame(FrameLocation::from_index(3)), &page[..]);
    }

    #[test]
    fn test_frame_to_address() {
        assert_eq!(PhysicalMemory::frame_to_address(0), 0);
        assert_eq!(PhysicalMemory::frame_to_address(1), 256);
        assert_eq!(PhysicalMemory::frame_to_address(4), 1024);
        assert_eq!(PhysicalMemory::frame_to_address(255), 65280);
    }

    #[test]
    fn test_frame_location_is_byte_base() {
        let frame = FrameLocation::from_index(5);
        assert_eq!(frame.base(), 1280);
        assert_eq!(frame.index(), 5);
        // PA = base + offset, not index + offset
        assert_eq!(frame.physical_address(17), 1297);
    }

    #[test]
    fn test_store_rejects_wrong_size() {
        let err = BackingStore::from_bytes(&[0u8; 100]).err().unwrap();
        assert!(matches!(
            err,
            VmError::BackingStoreSize { expected: 65536, actual: 100 }
        ));

        let too_big = vec![0u8; BACKING_STORE_SIZE + 1];
        assert!(BackingStore::from_bytes(&too_big).is_err());
    }

    #[test]
    fn test_store_read_page() {
        let bytes = pattern_bytes();
        let store = BackingStore::from_bytes(&bytes).unwrap();

        for page in [0u32, 1, 66, 255] {
            let start = page as usize * PAGE_SIZE;
            assert_eq!(&store.read_page(page)[..], &bytes[start..start + PAGE_SIZE]);
        }
        assert_eq!(store.read(66, 20), bytes[66 * 256 + 20]);
    }

    #[test]
    fn test_store_open_missing_file() {
        let err = BackingStore::open("/nonexistent/BACKING_STORE.bin").err().unwrap();
        assert!(matches!(err, VmError::Io { .. }));
    }

    #[test]
    fn test_read_page_into_frame() {
        let store = BackingStore::from_bytes(&pattern_bytes()).unwrap();
        let mut pm = PhysicalMemory::default();

        // Page 9 into frame 2 (address 512)
        pm.write_frame(FrameLocation::from_index(2), store.read_page(9));

        assert_eq!(pm.read(512), store.read(9, 0));
        assert_eq!(pm.read(512 + 200), store.read(9, 200));
    }
}
