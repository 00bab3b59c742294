use crate::constants::*;
use crate::error::{Result, VmError};

/// Represents the decomposed components of a Virtual Address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualAddress {
    pub va: u32,
    pub page: u32,
    pub offset: u32,
}

impl VirtualAddress {
    /// Decompose a 16-bit VA into page number and offset
    pub fn from_raw(va: u16) -> Self {
        let va = va as u32;
        let page = va >> PAGE_SHIFT;
        let offset = va & OFFSET_MASK;

        VirtualAddress { va, page, offset }
    }

    /// Validate and decompose a VA, rejecting anything above 65535
    pub fn new(va: u32) -> Result<Self> {
        u16::try_from(va)
            .map(Self::from_raw)
            .map_err(|_| VmError::InvalidAddress(va))
    }

    /// Keep only the low 16 bits of the VA
    pub fn wrapping(va: u32) -> Self {
        Self::from_raw((va & VIRTUAL_ADDRESS_MASK) as u16)
    }
}

impl std::fmt::Display for VirtualAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VA({}) = (page={}, offset={})", self.va, self.page, self.offset)
    }
}

/// Where a translation was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    TlbHit,
    /// TLB miss, but the page was already resident
    PageTableHit,
    PageFault,
}

/// Result of a successful address translation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Translation {
    pub virtual_address: u32,
    pub physical_address: u32,
    pub value: u8,
    pub kind: AccessKind,
}

impl Translation {
    /// The stored byte read as a signed value, the way the report prints it
    #[inline]
    pub fn signed_value(&self) -> i8 {
        self.value as i8
    }
}

impl std::fmt::Display for Translation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Virtual address: {} Physical address: {} Value: {}",
            self.virtual_address,
            self.physical_address,
            self.signed_value()
        )
    }
}
