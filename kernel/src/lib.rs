//! Interrupt line registry, dispatch router and interrupt statistics.
//!
//! The core keeps one descriptor per interrupt line (controller name plus an
//! ordered chain of handlers), routes each hardware interrupt from the entry
//! trampoline to the line's flow handler, counts occurrences per CPU and
//! renders the `/proc/interrupts` report from those counters.
//!
//! ```text
//! entry stub ──> global::do_IRQ ──> IrqCore::do_irq ──> FlowHandler
//!                                        │
//!                                        └─> KernelStat (this CPU)
//!
//! procfs read ──> SeqFile ──> IrqCore::show_interrupts ──> descriptor lock
//! ```
//!
//! Hardware access goes through the traits in [`arch_impl::traits`]; the
//! x86_64 implementation lives in [`arch_impl::x86_64`].

#![cfg_attr(not(test), no_std)]

extern crate alloc;

#[cfg(all(not(test), feature = "testing"))]
extern crate std;

pub mod arch_impl;
pub mod config;
pub mod counters;
pub mod dispatch;
pub mod error;
pub mod flow;
pub mod fs;
pub mod global;
pub mod irq;
pub mod irq_desc;
pub mod kstat;
pub mod logger;
mod manage;
pub mod spinlock;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use config::IrqConfig;
pub use counters::ErrorCounters;
pub use dispatch::{FlowHandler, PtRegs, IRQ_COMPLETE};
pub use error::IrqError;
pub use flow::ChainFlow;
pub use fs::procfs::Cursor;
pub use irq::IrqCore;
pub use irq_desc::{IrqAction, IrqFlags, IrqReturn};
