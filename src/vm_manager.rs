use log::{debug, info, trace, warn};

use crate::constants::*;
use crate::error::{Result, VmError};
use crate::frame::{BumpAllocator, FifoReplacement, FrameAllocator, LruReplacement};
use crate::memory::{BackingStore, FrameLocation, PhysicalMemory};
use crate::page_table::PageTable;
use crate::tlb::TranslationCache;
use crate::translation::{AccessKind, Translation, VirtualAddress};

/// What to do when a page fault finds every frame in use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Replacement {
    /// Fail with `VmError::FramesExhausted`
    #[default]
    None,
    Fifo,
    Lru,
}

/// How raw addresses above 65535 are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddressMode {
    #[default]
    Strict,
    /// Keep only the low 16 bits
    Wrap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslatorConfig {
    pub frames: usize,
    pub tlb_entries: usize,
    pub replacement: Replacement,
    pub address_mode: AddressMode,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        TranslatorConfig {
            frames: NUM_FRAMES,
            tlb_entries: TLB_ENTRIES,
            replacement: Replacement::None,
            address_mode: AddressMode::Strict,
        }
    }
}

impl TranslatorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.frames == 0 || self.frames > NUM_FRAMES {
            return Err(VmError::InvalidConfig(format!(
                "frame count must be between 1 and {}, got {}",
                NUM_FRAMES, self.frames
            )));
        }
        if self.tlb_entries == 0 {
            return Err(VmError::InvalidConfig(
                "TLB must have at least one entry".to_string(),
            ));
        }
        Ok(())
    }

    fn allocator(&self) -> Box<dyn FrameAllocator> {
        match self.replacement {
            Replacement::None => Box::new(BumpAllocator::new(self.frames)),
            Replacement::Fifo => Box::new(FifoReplacement::new(self.frames)),
            Replacement::Lru => Box::new(LruReplacement::new(self.frames)),
        }
    }
}

/// Run counters, read by the driver at the end of the run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Statistics {
    pub address_count: u64,
    pub fault_count: u64,
    pub tlb_hit_count: u64,
}

impl Statistics {
    pub fn fault_rate(&self) -> f64 {
        Self::rate(self.fault_count, self.address_count)
    }

    pub fn tlb_hit_rate(&self) -> f64 {
        Self::rate(self.tlb_hit_count, self.address_count)
    }

    fn rate(count: u64, total: u64) -> f64 {
        if total == 0 {
            0.0
        } else {
            count as f64 / total as f64
        }
    }

    /// Rebuild counters from emitted translation records
    pub fn from_translations<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a Translation>,
    {
        let mut stats = Statistics::default();
        for record in records {
            stats.record(record.kind);
        }
        stats
    }

    fn record(&mut self, kind: AccessKind) {
        self.address_count += 1;
        match kind {
            AccessKind::TlbHit => self.tlb_hit_count += 1,
            AccessKind::PageFault => self.fault_count += 1,
            AccessKind::PageTableHit => {}
        }
    }
}

impl std::fmt::Display for Statistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Number of Translated Addresses = {}", self.address_count)?;
        writeln!(f, "Page Faults = {}", self.fault_count)?;
        writeln!(f, "Page Fault Rate = {:.3}", self.fault_rate())?;
        writeln!(f, "TLB Hits = {}", self.tlb_hit_count)?;
        write!(f, "TLB Hit Rate = {:.3}", self.tlb_hit_rate())
    }
}

/// Owns all translation state: page table, TLB, physical memory, frame
/// policy and counters. Independent instances share nothing.
pub struct AddressTranslator {
    config: TranslatorConfig,
    store: BackingStore,
    memory: PhysicalMemory,
    page_table: PageTable,
    tlb: TranslationCache,
    frames: Box<dyn FrameAllocator>,
    stats: Statistics,
}

impl AddressTranslator {
    pub fn new(store: BackingStore, config: TranslatorConfig) -> Result<Self> {
        config.validate()?;
        let frames = config.allocator();
        Ok(Self::assemble(store, config, frames))
    }

    /// Build a translator around a custom frame policy. `config.replacement` is ignored.
    pub fn with_allocator(
        store: BackingStore,
        config: TranslatorConfig,
        frames: Box<dyn FrameAllocator>,
    ) -> Result<Self> {
        let config = TranslatorConfig {
            frames: frames.frame_count(),
            ..config
        };
        config.validate()?;
        Ok(Self::assemble(store, config, frames))
    }

    fn assemble(
        store: BackingStore,
        config: TranslatorConfig,
        frames: Box<dyn FrameAllocator>,
    ) -> Self {
        AddressTranslator {
            memory: PhysicalMemory::new(config.frames),
            page_table: PageTable::new(),
            tlb: TranslationCache::with_capacity(config.tlb_entries),
            store,
            frames,
            config,
            stats: Statistics::default(),
        }
    }

    /// Apply the configured address mode, then translate
    pub fn translate_raw(&mut self, raw: u32) -> Result<Translation> {
        let va = match self.config.address_mode {
            AddressMode::Strict => VirtualAddress::new(raw)?,
            AddressMode::Wrap => {
                if raw > MAX_VIRTUAL_ADDRESS {
                    warn!("Address {} exceeds 16 bits, using {}", raw, raw & VIRTUAL_ADDRESS_MASK);
                }
                VirtualAddress::wrapping(raw)
            }
        };
        self.translate(va)
    }

    /// Translate one address. On error no state has changed.
    pub fn translate(&mut self, va: VirtualAddress) -> Result<Translation> {
        let (frame, kind) = if let Some(frame) = self.tlb.lookup(va.page) {
            trace!("TLB hit: page {} -> {}", va.page, frame);
            (frame, AccessKind::TlbHit)
        } else if let Some(frame) = self.page_table.lookup(va.page) {
            trace!("TLB miss, page table hit: page {} -> {}", va.page, frame);
            self.tlb.insert(va.page, frame);
            (frame, AccessKind::PageTableHit)
        } else {
            (self.handle_fault(va.page)?, AccessKind::PageFault)
        };

        self.frames.touch(va.page);
        self.stats.record(kind);

        let physical_address = frame.physical_address(va.offset);
        Ok(Translation {
            virtual_address: va.va,
            physical_address,
            value: self.memory.read(physical_address),
            kind,
        })
    }

    /// Load `page` from the backing store into a frame and map it
    fn handle_fault(&mut self, page: u32) -> Result<FrameLocation> {
        let grant = self
            .frames
            .acquire_frame(page)
            .map_err(|_| VmError::FramesExhausted { page })?;

        if let Some(victim) = grant.evicted {
            self.page_table.clear(victim);
            let dropped = self.tlb.invalidate(victim);
            debug!(
                "Evicted page {} from {} ({} TLB entries dropped)",
                victim, grant.frame, dropped
            );
        }

        self.memory.write_frame(grant.frame, self.store.read_page(page));
        self.page_table.set(page, grant.frame);
        self.tlb.insert(page, grant.frame);
        debug!("Page fault: loaded page {} into {}", page, grant.frame);

        Ok(grant.frame)
    }

    /// Translate a sequence of raw addresses, stopping at the first error
    pub fn translate_all<I>(&mut self, addresses: I) -> Result<Vec<Translation>>
    where
        I: IntoIterator<Item = u32>,
    {
        let results = addresses
            .into_iter()
            .map(|raw| self.translate_raw(raw))
            .collect::<Result<Vec<_>>>()?;
        info!(
            "Translated {} addresses: {} faults, {} TLB hits",
            self.stats.address_count, self.stats.fault_count, self.stats.tlb_hit_count
        );
        Ok(results)
    }

    pub fn statistics(&self) -> Statistics {
        self.stats
    }

    pub fn config(&self) -> &TranslatorConfig {
        &self.config
    }

    pub fn page_table(&self) -> &PageTable {
        &self.page_table
    }

    pub fn tlb(&self) -> &TranslationCache {
        &self.tlb
    }

    pub fn memory(&self) -> &PhysicalMemory {
        &self.memory
    }
}
