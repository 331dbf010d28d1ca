//! The assembled interrupt core.
//!
//! [`IrqCore`] owns the descriptor table, the per-CPU counter bank and the
//! global error counters, and borrows the platform and flow handler it was
//! built over. Everything is sized at construction and lives until the core
//! is dropped (for the kernel singleton: never).

use crate::arch_impl::traits::{CpuTopology, OnlineCpus, Platform};
use crate::config::{IrqConfig, MAX_CPUS};
use crate::counters::ErrorCounters;
use crate::dispatch::FlowHandler;
use crate::irq_desc::{LineDescriptor, LineDescriptorTable};
use crate::kstat::KernelStat;

pub struct IrqCore<'a> {
    pub(crate) config: IrqConfig,
    pub(crate) descs: LineDescriptorTable,
    pub(crate) kstat: KernelStat,
    pub(crate) errors: ErrorCounters,
    pub(crate) platform: &'a dyn Platform,
    pub(crate) flow: &'a dyn FlowHandler,
}

impl<'a> IrqCore<'a> {
    /// Build the core over `platform`.
    ///
    /// The counter bank gets a slot for every CPU the platform may bring
    /// online, even if `config.nr_cpus` asks for fewer.
    pub fn new(config: IrqConfig, platform: &'a dyn Platform, flow: &'a dyn FlowHandler) -> Self {
        let nr_cpus = config.nr_cpus.max(platform.possible_cpus()).min(MAX_CPUS);
        if nr_cpus != config.nr_cpus {
            log::warn!(
                "irq: {} cpu slots configured, platform has {} possible; using {}",
                config.nr_cpus,
                platform.possible_cpus(),
                nr_cpus
            );
        }
        let config = IrqConfig { nr_cpus, ..config };

        let core = Self {
            config,
            descs: LineDescriptorTable::new(config.nr_irqs),
            kstat: KernelStat::new(nr_cpus, config.nr_irqs),
            errors: ErrorCounters::new(),
            platform,
            flow,
        };
        log::info!(
            "irq: {} lines, {} cpu slots, nesting limit {}",
            config.nr_irqs,
            nr_cpus,
            config.max_nesting
        );
        core
    }

    pub fn config(&self) -> &IrqConfig {
        &self.config
    }

    pub fn nr_irqs(&self) -> usize {
        self.descs.len()
    }

    pub fn desc(&self, line: usize) -> Option<&LineDescriptor> {
        self.descs.get(line)
    }

    pub fn descs(&self) -> &LineDescriptorTable {
        &self.descs
    }

    pub fn kstat(&self) -> &KernelStat {
        &self.kstat
    }

    /// Global `ERR`/`MIS` counters, for controller code outside this crate.
    pub fn errors(&self) -> &ErrorCounters {
        &self.errors
    }

    pub fn platform(&self) -> &'a dyn Platform {
        self.platform
    }

    /// Online CPUs, ascending.
    pub fn online_cpus(&self) -> OnlineCpus<'a, dyn Platform + 'a> {
        OnlineCpus::new(self.platform, self.kstat.nr_cpus())
    }

    /// Count an NMI on the current CPU. Called from the NMI handler.
    pub fn note_nmi(&self) {
        self.kstat.this_cpu(self.platform).account_nmi();
    }

    /// Count a local APIC timer interrupt on the current CPU.
    pub fn note_local_timer(&self) {
        self.kstat.this_cpu(self.platform).account_local_timer();
    }
}
