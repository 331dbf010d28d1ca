//! Process Filesystem (procfs) entries for interrupt statistics
//!
//! Nodes are virtual and generated on demand from the interrupt core.
//!
//! # Supported Entries
//!
//! - `/proc/interrupts` - Per-line, per-CPU interrupt counts
//! - `/proc/stat` - `intr` line with per-line totals
//!
//! # Architecture
//!
//! ```text
//! sys_open("/proc/interrupts")
//!         |
//!         v
//!     lookup("/proc/interrupts")
//!         |
//!         v
//!     open() -> SeqFile
//!         |
//!         v
//!     read() pulls one record at a time
//! ```

use alloc::string::String;
use core::fmt;

use crate::fs::seq_file::{SeqFile, SeqShow};
use crate::irq::IrqCore;

mod interrupts;
mod stat;

pub use interrupts::Cursor;

/// Procfs entry types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcEntryType {
    /// /proc/interrupts - interrupt counts per line and CPU
    Interrupts,
    /// /proc/stat - interrupt totals
    Stat,
}

impl ProcEntryType {
    pub const ALL: [ProcEntryType; 2] = [ProcEntryType::Interrupts, ProcEntryType::Stat];

    /// Get the entry name (without path prefix)
    pub fn name(&self) -> &'static str {
        match self {
            ProcEntryType::Interrupts => "interrupts",
            ProcEntryType::Stat => "stat",
        }
    }

    /// Get the full path
    pub fn path(&self) -> &'static str {
        match self {
            ProcEntryType::Interrupts => "/proc/interrupts",
            ProcEntryType::Stat => "/proc/stat",
        }
    }
}

/// Look up an entry by full path ("/proc/stat") or bare name ("stat")
pub fn lookup(path: &str) -> Option<ProcEntryType> {
    let relative = path.trim_start_matches("/proc/").trim_start_matches('/');
    ProcEntryType::ALL
        .into_iter()
        .find(|entry| entry.name() == relative)
}

/// An open procfs entry bound to an interrupt core
pub struct ProcEntry<'c, 'p> {
    core: &'c IrqCore<'p>,
    entry_type: ProcEntryType,
}

impl SeqShow for ProcEntry<'_, '_> {
    fn show(&self, out: &mut String, pos: usize) -> Result<Cursor, fmt::Error> {
        match self.entry_type {
            ProcEntryType::Interrupts => self.core.show_interrupts(out, pos),
            ProcEntryType::Stat if pos == 0 => {
                self.core.show_stat_intr(out)?;
                Ok(Cursor::More(1))
            }
            ProcEntryType::Stat => Ok(Cursor::End),
        }
    }
}

/// Open an entry for paged reading
pub fn open<'c, 'p>(core: &'c IrqCore<'p>, entry_type: ProcEntryType) -> SeqFile<ProcEntry<'c, 'p>> {
    SeqFile::new(ProcEntry { core, entry_type })
}

/// Generate the full content of an entry
pub fn generate(core: &IrqCore<'_>, entry_type: ProcEntryType) -> String {
    open(core, entry_type).read_to_string()
}

/// Read a procfs file by path
///
/// # Returns
/// The content as a String, or -ENOENT
pub fn read_file(core: &IrqCore<'_>, path: &str) -> Result<String, i32> {
    lookup(path)
        .map(|entry| generate(core, entry))
        .ok_or(-2) // ENOENT
}
