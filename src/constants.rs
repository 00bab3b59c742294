pub const PAGE_BITS: u32 = 8;
pub const ADDRESS_BITS: u32 = 16;

pub const PAGE_SIZE: usize = 1 << PAGE_BITS;
pub const FRAME_SIZE: usize = PAGE_SIZE;
pub const PT_SIZE: usize = 1 << (ADDRESS_BITS - PAGE_BITS);

pub const NUM_FRAMES: usize = 256;
pub const PM_SIZE: usize = NUM_FRAMES * FRAME_SIZE;

pub const TLB_ENTRIES: usize = 16;

pub const BACKING_STORE_PAGES: usize = PT_SIZE;
pub const BACKING_STORE_SIZE: usize = BACKING_STORE_PAGES * PAGE_SIZE;

pub const OFFSET_MASK: u32 = (1 << PAGE_BITS) - 1;
pub const VIRTUAL_ADDRESS_MASK: u32 = (1 << ADDRESS_BITS) - 1;
pub const MAX_VIRTUAL_ADDRESS: u32 = VIRTUAL_ADDRESS_MASK;

pub const PAGE_SHIFT: u32 = PAGE_BITS;
