//! Host-side mock platform.
//!
//! Each OS thread plays one CPU: [`MockPlatform::run_on`] sets the CPU ID the
//! calling thread reports. Interrupt flag and hard-IRQ depth are tracked per
//! simulated CPU so nesting and lock behaviour can be asserted from tests.

use core::cell::Cell;
use core::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::thread_local;

use crate::arch_impl::traits::{CpuOps, CpuTopology, IrqNesting, PerCpuOps};
use crate::config::MAX_CPUS;

thread_local! {
    static CURRENT_CPU: Cell<usize> = const { Cell::new(0) };
}

pub struct MockPlatform {
    possible: usize,
    online: AtomicU64,
    irqs_enabled: [AtomicBool; MAX_CPUS],
    hardirq_depth: [AtomicU32; MAX_CPUS],
    enter_count: AtomicU64,
    exit_count: AtomicU64,
}

impl MockPlatform {
    /// `possible` CPUs, all online, interrupts enabled everywhere.
    pub fn new(possible: usize) -> Self {
        let possible = possible.min(MAX_CPUS);
        Self {
            possible,
            online: AtomicU64::new((1u64 << possible) - 1),
            irqs_enabled: core::array::from_fn(|_| AtomicBool::new(true)),
            hardirq_depth: core::array::from_fn(|_| AtomicU32::new(0)),
            enter_count: AtomicU64::new(0),
            exit_count: AtomicU64::new(0),
        }
    }

    pub fn set_online(&self, cpu: usize, online: bool) {
        let bit = 1u64 << cpu;
        if online {
            self.online.fetch_or(bit, Ordering::SeqCst);
        } else {
            self.online.fetch_and(!bit, Ordering::SeqCst);
        }
    }

    /// Run `f` with the calling thread acting as `cpu`.
    pub fn run_on<R>(&self, cpu: usize, f: impl FnOnce() -> R) -> R {
        let previous = CURRENT_CPU.with(|c| c.replace(cpu));
        let result = f();
        CURRENT_CPU.with(|c| c.set(previous));
        result
    }

    /// Interrupt flag of the calling thread's CPU.
    pub fn interrupts_enabled(&self) -> bool {
        self.irqs_enabled[self.cpu_id()].load(Ordering::SeqCst)
    }

    /// Force the hard-IRQ depth of `cpu`.
    pub fn set_hardirq_depth(&self, cpu: usize, depth: u32) {
        self.hardirq_depth[cpu].store(depth, Ordering::SeqCst);
    }

    pub fn enter_count(&self) -> u64 {
        self.enter_count.load(Ordering::SeqCst)
    }

    pub fn exit_count(&self) -> u64 {
        self.exit_count.load(Ordering::SeqCst)
    }
}

impl PerCpuOps for MockPlatform {
    fn cpu_id(&self) -> usize {
        CURRENT_CPU.with(|c| c.get())
    }
}

impl CpuOps for MockPlatform {
    fn local_irq_save(&self) -> bool {
        self.irqs_enabled[self.cpu_id()].swap(false, Ordering::SeqCst)
    }

    fn local_irq_restore(&self, was_enabled: bool) {
        if was_enabled {
            self.irqs_enabled[self.cpu_id()].store(true, Ordering::SeqCst);
        }
    }
}

impl CpuTopology for MockPlatform {
    fn possible_cpus(&self) -> usize {
        self.possible
    }

    fn is_online(&self, cpu: usize) -> bool {
        cpu < self.possible && self.online.load(Ordering::SeqCst) & (1u64 << cpu) != 0
    }
}

impl IrqNesting for MockPlatform {
    fn irq_enter(&self) {
        self.enter_count.fetch_add(1, Ordering::SeqCst);
        self.hardirq_depth[self.cpu_id()].fetch_add(1, Ordering::SeqCst);
    }

    fn irq_exit(&self) {
        self.exit_count.fetch_add(1, Ordering::SeqCst);
        self.hardirq_depth[self.cpu_id()].fetch_sub(1, Ordering::SeqCst);
    }

    fn hardirq_depth(&self) -> u32 {
        self.hardirq_depth[self.cpu_id()].load(Ordering::SeqCst)
    }
}
