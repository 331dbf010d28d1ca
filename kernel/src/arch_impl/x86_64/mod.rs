//! x86_64 architecture implementation.
//!
//! - Local interrupt flag control via the `x86_64` crate
//! - A platform object backed by the kernel's GS-based per-CPU area

pub mod cpu;
pub mod percpu;

pub use cpu::X86Cpu;
pub use percpu::{PerCpuHooks, X86Platform};
