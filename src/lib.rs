pub mod constants;
pub mod error;
pub mod frame;
pub mod io;
pub mod memory;
pub mod page_table;
pub mod tlb;
pub mod translation;
pub mod vm_manager;

// Re-export commonly used items for convenience
pub use constants::*;
pub use error::{Result, VmError};
pub use memory::{BackingStore, FrameLocation, PhysicalMemory};
pub use translation::{AccessKind, Translation, VirtualAddress};
pub use vm_manager::{AddressMode, AddressTranslator, Replacement, Statistics, TranslatorConfig};
