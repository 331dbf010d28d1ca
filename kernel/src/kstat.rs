//! Per-CPU interrupt statistics.
//!
//! Each CPU owns a slot holding one occurrence counter per line plus its NMI
//! and local timer counts. Slots are cache-line aligned so CPUs never share a
//! line for writes.
//!
//! # Single writer
//!
//! Only the owning CPU writes its slot, through [`LocalStat`], which is bound
//! to the current CPU at construction and cannot leave the thread. Writes are
//! a relaxed load followed by a relaxed store: no locked read-modify-write is
//! needed because nobody else writes, and the caller runs with local
//! interrupts disabled so nothing on this CPU interleaves.
//!
//! # Readers
//!
//! Any CPU may read any slot with relaxed loads. The values are advisory: a
//! reader may see a stale count, never a torn or invented one.

use alloc::boxed::Box;
use core::marker::PhantomData;
use core::sync::atomic::{AtomicU32, Ordering};

use crate::arch_impl::traits::PerCpuOps;

/// Counters owned by a single CPU.
#[repr(C, align(64))]
pub struct CpuStat {
    irqs: Box<[AtomicU32]>,
    nmi_count: AtomicU32,
    apic_timer_irqs: AtomicU32,
}

impl CpuStat {
    fn new(nr_irqs: usize) -> Self {
        Self {
            irqs: (0..nr_irqs).map(|_| AtomicU32::new(0)).collect(),
            nmi_count: AtomicU32::new(0),
            apic_timer_irqs: AtomicU32::new(0),
        }
    }
}

#[inline(always)]
fn bump(counter: &AtomicU32) {
    counter.store(counter.load(Ordering::Relaxed).wrapping_add(1), Ordering::Relaxed);
}

/// The per-CPU counter bank, sized once for `nr_cpus` x `nr_irqs`.
pub struct KernelStat {
    cpus: Box<[CpuStat]>,
    nr_irqs: usize,
}

impl KernelStat {
    pub fn new(nr_cpus: usize, nr_irqs: usize) -> Self {
        Self {
            cpus: (0..nr_cpus).map(|_| CpuStat::new(nr_irqs)).collect(),
            nr_irqs,
        }
    }

    pub fn nr_cpus(&self) -> usize {
        self.cpus.len()
    }

    pub fn nr_irqs(&self) -> usize {
        self.nr_irqs
    }

    /// Writer handle for the CPU `percpu` reports as current.
    ///
    /// A CPU ID beyond the bank yields a handle whose updates are dropped.
    pub fn this_cpu<P: PerCpuOps + ?Sized>(&self, percpu: &P) -> LocalStat<'_> {
        LocalStat {
            stat: self.cpus.get(percpu.cpu_id()),
            _not_send: PhantomData,
        }
    }

    /// Occurrences of `line` on `cpu`, or 0 if either is out of range.
    #[inline]
    pub fn irqs(&self, cpu: usize, line: usize) -> u32 {
        self.cpus
            .get(cpu)
            .and_then(|stat| stat.irqs.get(line))
            .map_or(0, |count| count.load(Ordering::Relaxed))
    }

    /// Occurrences of `line` summed over every CPU slot.
    pub fn irqs_total(&self, line: usize) -> u64 {
        (0..self.cpus.len()).fold(0u64, |total, cpu| {
            total.wrapping_add(u64::from(self.irqs(cpu, line)))
        })
    }

    pub fn nmi_count(&self, cpu: usize) -> u32 {
        self.cpus
            .get(cpu)
            .map_or(0, |stat| stat.nmi_count.load(Ordering::Relaxed))
    }

    pub fn apic_timer_irqs(&self, cpu: usize) -> u32 {
        self.cpus
            .get(cpu)
            .map_or(0, |stat| stat.apic_timer_irqs.load(Ordering::Relaxed))
    }
}

/// Writer for the current CPU's slot. Not `Send`: it must stay on the CPU it
/// was created for.
pub struct LocalStat<'a> {
    stat: Option<&'a CpuStat>,
    _not_send: PhantomData<*const ()>,
}

impl LocalStat<'_> {
    /// Count one occurrence of `line`.
    #[inline(always)]
    pub fn account_irq(&self, line: usize) {
        if let Some(count) = self.stat.and_then(|stat| stat.irqs.get(line)) {
            bump(count);
        }
    }

    #[inline(always)]
    pub fn account_nmi(&self) {
        if let Some(stat) = self.stat {
            bump(&stat.nmi_count);
        }
    }

    #[inline(always)]
    pub fn account_local_timer(&self) {
        if let Some(stat) = self.stat {
            bump(&stat.apic_timer_irqs);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockPlatform;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_slot_is_cache_line_aligned() {
        assert_eq!(core::mem::align_of::<CpuStat>(), 64);
    }

    #[test]
    fn test_account_irq_only_touches_own_cpu() {
        let platform = MockPlatform::new(4);
        let kstat = KernelStat::new(4, 16);

        platform.run_on(2, || {
            let local = kstat.this_cpu(&platform);
            for _ in 0..5 {
                local.account_irq(9);
            }
        });

        assert_eq!(kstat.irqs(2, 9), 5);
        for cpu in [0, 1, 3] {
            assert_eq!(kstat.irqs(cpu, 9), 0);
        }
        assert_eq!(kstat.irqs(2, 8), 0);
        assert_eq!(kstat.irqs_total(9), 5);
    }

    #[test]
    fn test_counter_wraps() {
        let platform = MockPlatform::new(1);
        let kstat = KernelStat::new(1, 1);
        kstat.cpus[0].irqs[0].store(u32::MAX, Ordering::Relaxed);
        kstat.this_cpu(&platform).account_irq(0);
        assert_eq!(kstat.irqs(0, 0), 0);
    }

    #[test]
    fn test_out_of_range_reads_and_writes_are_ignored() {
        let platform = MockPlatform::new(8);
        let kstat = KernelStat::new(2, 4);

        platform.run_on(5, || kstat.this_cpu(&platform).account_irq(1));
        kstat.this_cpu(&platform).account_irq(99);

        assert_eq!(kstat.irqs(5, 1), 0);
        assert_eq!(kstat.irqs(0, 99), 0);
        assert_eq!(kstat.irqs_total(1), 0);
    }

    #[test]
    fn test_nmi_and_timer_scalars() {
        let platform = MockPlatform::new(2);
        let kstat = KernelStat::new(2, 4);

        platform.run_on(1, || {
            let local = kstat.this_cpu(&platform);
            local.account_nmi();
            local.account_local_timer();
            local.account_local_timer();
        });

        assert_eq!(kstat.nmi_count(1), 1);
        assert_eq!(kstat.apic_timer_irqs(1), 2);
        assert_eq!(kstat.nmi_count(0), 0);
    }

    #[test]
    fn test_concurrent_writers_on_distinct_cpus() {
        const PER_CPU: u32 = 10_000;
        let platform = Arc::new(MockPlatform::new(4));
        let kstat = Arc::new(KernelStat::new(4, 8));

        let workers: Vec<_> = (0..4)
            .map(|cpu| {
                let platform = Arc::clone(&platform);
                let kstat = Arc::clone(&kstat);
                thread::spawn(move || {
                    platform.run_on(cpu, || {
                        let local = kstat.this_cpu(&*platform);
                        for _ in 0..PER_CPU {
                            local.account_irq(3);
                        }
                    })
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        for cpu in 0..4 {
            assert_eq!(kstat.irqs(cpu, 3), PER_CPU);
        }
        assert_eq!(kstat.irqs_total(3), u64::from(PER_CPU) * 4);
    }
}
