//! Interrupt core configuration.
//!
//! Sizes are fixed when the core is built and never change afterwards.
//! The optional report rows default from cargo features, mirroring the
//! `CONFIG_X86_LOCAL_APIC` / `APIC_MISMATCH_DEBUG` build switches.

/// Maximum number of CPUs the counter bank can be sized for.
pub const MAX_CPUS: usize = 16;

/// Number of low bits of `orig_rax` the trampoline uses to encode the line.
pub const LINE_ENCODING_BITS: u32 = 8;

/// Largest line count representable in the trampoline encoding.
pub const MAX_ENCODABLE_LINES: usize = 1 << LINE_ENCODING_BITS;

/// Default number of interrupt lines (x86_64 NR_IRQS).
pub const DEFAULT_NR_IRQS: usize = 224;

/// HARDIRQ field width of the preempt_count layout.
const HARDIRQ_BITS: u32 = 10;

/// Deepest hard-IRQ nesting the accounting field can represent.
pub const DEFAULT_MAX_NESTING: u32 = (1 << HARDIRQ_BITS) - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IrqConfig {
    /// Number of interrupt lines (descriptor table length).
    pub nr_irqs: usize,
    /// Number of CPU slots in the counter bank.
    pub nr_cpus: usize,
    /// Dispatch refuses to enter beyond this hard-IRQ depth.
    pub max_nesting: u32,
    /// Emit the `LOC:` row in the interrupts report.
    pub local_apic: bool,
    /// Emit the `MIS:` row in the interrupts report.
    pub mismatch_debug: bool,
}

impl IrqConfig {
    pub const fn new() -> Self {
        Self {
            nr_irqs: DEFAULT_NR_IRQS,
            nr_cpus: MAX_CPUS,
            max_nesting: DEFAULT_MAX_NESTING,
            local_apic: cfg!(feature = "local_apic"),
            mismatch_debug: cfg!(feature = "apic_mismatch_debug"),
        }
    }

    /// Set the line count, clamped to what the trampoline can encode.
    pub const fn with_nr_irqs(mut self, nr_irqs: usize) -> Self {
        self.nr_irqs = if nr_irqs > MAX_ENCODABLE_LINES {
            MAX_ENCODABLE_LINES
        } else {
            nr_irqs
        };
        self
    }

    /// Set the CPU slot count, clamped to [`MAX_CPUS`].
    pub const fn with_nr_cpus(mut self, nr_cpus: usize) -> Self {
        self.nr_cpus = if nr_cpus > MAX_CPUS { MAX_CPUS } else { nr_cpus };
        self
    }

    pub const fn with_max_nesting(mut self, max_nesting: u32) -> Self {
        self.max_nesting = max_nesting;
        self
    }

    pub const fn with_local_apic(mut self, enabled: bool) -> Self {
        self.local_apic = enabled;
        self
    }

    pub const fn with_mismatch_debug(mut self, enabled: bool) -> Self {
        self.mismatch_debug = enabled;
        self
    }
}

impl Default for IrqConfig {
    fn default() -> Self {
        Self::new()
    }
}
