//! Architecture-agnostic traits for the interrupt core.
//!
//! These traits define the interface between architecture/kernel code and
//! the interrupt core. Unlike a compile-time HAL, they take `&self` so the
//! core can be built over any platform object, including a mock on the host.

/// Per-CPU data access operations.
pub trait PerCpuOps {
    /// Get the current CPU's ID.
    fn cpu_id(&self) -> usize;
}

/// Basic CPU control operations.
pub trait CpuOps {
    /// Disable local interrupts, returning whether they were enabled.
    fn local_irq_save(&self) -> bool;

    /// Re-enable local interrupts if `was_enabled` is true.
    fn local_irq_restore(&self, was_enabled: bool);
}

/// CPU topology queries.
pub trait CpuTopology {
    /// Number of CPU IDs that may ever come online.
    fn possible_cpus(&self) -> usize;

    /// Returns true if `cpu` is currently schedulable.
    fn is_online(&self, cpu: usize) -> bool;
}

/// Hard-IRQ nesting accounting (preempt_count HARDIRQ bits).
///
/// `irq_exit` may run deferred work (softirqs) when the outermost level
/// returns; that is the implementor's business.
pub trait IrqNesting {
    /// Record entry into hard-IRQ context on the current CPU.
    fn irq_enter(&self);

    /// Record exit from hard-IRQ context on the current CPU.
    fn irq_exit(&self);

    /// Current hard-IRQ nesting depth on this CPU.
    fn hardirq_depth(&self) -> u32;
}

/// Everything the interrupt core needs from the platform.
pub trait Platform: PerCpuOps + CpuOps + CpuTopology + IrqNesting + Sync {}

impl<T> Platform for T where T: PerCpuOps + CpuOps + CpuTopology + IrqNesting + Sync {}

/// Iterator over online CPU IDs in ascending order.
pub struct OnlineCpus<'a, T: CpuTopology + ?Sized> {
    topology: &'a T,
    next: usize,
    limit: usize,
}

impl<'a, T: CpuTopology + ?Sized> OnlineCpus<'a, T> {
    /// Enumerate online CPUs below `limit` (and below `possible_cpus()`).
    pub fn new(topology: &'a T, limit: usize) -> Self {
        Self {
            topology,
            next: 0,
            limit: core::cmp::min(limit, topology.possible_cpus()),
        }
    }
}

impl<T: CpuTopology + ?Sized> Iterator for OnlineCpus<'_, T> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        while self.next < self.limit {
            let cpu = self.next;
            self.next += 1;
            if self.topology.is_online(cpu) {
                return Some(cpu);
            }
        }
        None
    }
}
