//! x86_64 platform object for the interrupt core.
//!
//! The kernel owns the GS-based per-CPU area and the preempt_count; it hands
//! the relevant accessors over as plain function pointers so this crate does
//! not depend on the per-CPU layout. Online CPUs are tracked here as a bitmap
//! updated by the SMP bring-up code.

use core::sync::atomic::{AtomicU64, Ordering};

use super::cpu::X86Cpu;
use crate::arch_impl::traits::{CpuOps, CpuTopology, IrqNesting, PerCpuOps};
use crate::config::MAX_CPUS;

// Linux-style preempt_count layout: bits 16-25 hold the HARDIRQ count.
const HARDIRQ_SHIFT: u32 = 16;
const HARDIRQ_MASK: u32 = 0x03FF_0000;

/// Accessors into the kernel's per-CPU area.
#[derive(Clone, Copy)]
pub struct PerCpuHooks {
    /// Current CPU ID (GS-relative read).
    pub cpu_id: fn() -> usize,
    /// Raw preempt_count of the current CPU.
    pub preempt_count: fn() -> u32,
    /// Adds HARDIRQ_OFFSET to preempt_count.
    pub irq_enter: fn(),
    /// Subtracts HARDIRQ_OFFSET and runs pending softirqs at depth zero.
    pub irq_exit: fn(),
}

/// x86_64 platform: per-CPU hooks plus the online CPU bitmap.
pub struct X86Platform {
    hooks: PerCpuHooks,
    online: AtomicU64,
    possible: usize,
}

impl X86Platform {
    /// Create a platform with only the boot CPU online.
    pub const fn new(hooks: PerCpuHooks, possible: usize) -> Self {
        Self {
            hooks,
            online: AtomicU64::new(1),
            possible: if possible > MAX_CPUS { MAX_CPUS } else { possible },
        }
    }

    /// Mark `cpu` online or offline. Called by SMP bring-up and hotplug.
    pub fn set_online(&self, cpu: usize, online: bool) {
        if cpu >= self.possible {
            log::warn!("x86 platform: ignoring online change for cpu {}", cpu);
            return;
        }
        let bit = 1u64 << cpu;
        if online {
            self.online.fetch_or(bit, Ordering::Release);
        } else {
            self.online.fetch_and(!bit, Ordering::Release);
        }
    }

    /// Raw online bitmap.
    pub fn online_mask(&self) -> u64 {
        self.online.load(Ordering::Acquire)
    }
}

impl PerCpuOps for X86Platform {
    #[inline(always)]
    fn cpu_id(&self) -> usize {
        (self.hooks.cpu_id)()
    }
}

impl CpuOps for X86Platform {
    #[inline(always)]
    fn local_irq_save(&self) -> bool {
        X86Cpu::local_irq_save()
    }

    #[inline(always)]
    fn local_irq_restore(&self, was_enabled: bool) {
        X86Cpu::local_irq_restore(was_enabled)
    }
}

impl CpuTopology for X86Platform {
    fn possible_cpus(&self) -> usize {
        self.possible
    }

    fn is_online(&self, cpu: usize) -> bool {
        cpu < self.possible && self.online_mask() & (1u64 << cpu) != 0
    }
}

impl IrqNesting for X86Platform {
    #[inline(always)]
    fn irq_enter(&self) {
        (self.hooks.irq_enter)()
    }

    #[inline(always)]
    fn irq_exit(&self) {
        (self.hooks.irq_exit)()
    }

    #[inline(always)]
    fn hardirq_depth(&self) -> u32 {
        ((self.hooks.preempt_count)() & HARDIRQ_MASK) >> HARDIRQ_SHIFT
    }
}
