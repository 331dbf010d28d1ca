//! Interrupt line descriptors.
//!
//! One [`LineDescriptor`] per line, allocated once and never relocated. The
//! descriptor lock guards the controller name and the handler chain; every
//! read of either for reporting happens under it.
//!
//! The chain is an `Arc` snapshot: writers replace it copy-on-write, so a
//! flow handler can clone the `Arc` under the lock and walk the actions after
//! releasing it.

use alloc::sync::Arc;
use alloc::vec::Vec;

use spin::MutexGuard;

use crate::arch_impl::traits::CpuOps;
use crate::spinlock::{SpinLockIrq, SpinLockIrqGuard};

/// Controller label for lines no chip has claimed.
pub const NO_CHIP: &str = "none";

/// Result of one handler invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqReturn {
    /// The interrupt was not from this device.
    None,
    /// The handler serviced the interrupt.
    Handled,
}

/// Handler entry point: `(line, dev_id)`.
pub type IrqHandlerFn = fn(usize, usize) -> IrqReturn;

/// Registration flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IrqFlags(u32);

impl IrqFlags {
    pub const NONE: Self = Self(0);
    /// Line may be shared with other actions that also set this flag.
    pub const SHARED: Self = Self(1 << 0);

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

/// One registered handler on a line.
#[derive(Debug)]
pub struct IrqAction {
    pub name: &'static str,
    pub dev_id: usize,
    pub flags: IrqFlags,
    pub handler: IrqHandlerFn,
}

impl IrqAction {
    pub fn new(name: &'static str, dev_id: usize, flags: IrqFlags, handler: IrqHandlerFn) -> Self {
        Self {
            name,
            dev_id,
            flags,
            handler,
        }
    }

    pub fn is_shared(&self) -> bool {
        self.flags.contains(IrqFlags::SHARED)
    }
}

/// Ordered list of actions sharing a line, in registration order.
pub type HandlerChain = Arc<Vec<Arc<IrqAction>>>;

/// Fields guarded by the descriptor lock.
#[derive(Debug)]
pub struct DescInner {
    chip_name: &'static str,
    chain: HandlerChain,
}

impl DescInner {
    fn new() -> Self {
        Self {
            chip_name: NO_CHIP,
            chain: Arc::new(Vec::new()),
        }
    }

    pub fn chip_name(&self) -> &'static str {
        self.chip_name
    }

    pub fn has_actions(&self) -> bool {
        !self.chain.is_empty()
    }

    /// Handler names in registration order.
    pub fn action_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.chain.iter().map(|action| action.name)
    }

    /// Cheap clone of the current chain for walking outside the lock.
    pub fn chain(&self) -> HandlerChain {
        Arc::clone(&self.chain)
    }

    pub(crate) fn first_action(&self) -> Option<&Arc<IrqAction>> {
        self.chain.first()
    }

    pub(crate) fn set_chip_name(&mut self, name: &'static str) {
        self.chip_name = name;
    }

    pub(crate) fn push_action(&mut self, action: Arc<IrqAction>) {
        Arc::make_mut(&mut self.chain).push(action);
    }

    pub(crate) fn remove_action(&mut self, dev_id: usize) -> Option<Arc<IrqAction>> {
        let index = self.chain.iter().position(|action| action.dev_id == dev_id)?;
        Some(Arc::make_mut(&mut self.chain).remove(index))
    }
}

/// Per-line descriptor.
pub struct LineDescriptor {
    line: usize,
    lock: SpinLockIrq<DescInner>,
}

impl LineDescriptor {
    fn new(line: usize) -> Self {
        Self {
            line,
            lock: SpinLockIrq::new(DescInner::new()),
        }
    }

    pub fn line(&self) -> usize {
        self.line
    }

    /// Lock from process context (interrupts saved and disabled).
    pub fn lock<'a, C: CpuOps + ?Sized>(&'a self, cpu: &'a C) -> SpinLockIrqGuard<'a, DescInner, C> {
        self.lock.lock(cpu)
    }

    /// Lock from hard-IRQ context, where interrupts are already off.
    pub fn lock_irq_disabled(&self) -> MutexGuard<'_, DescInner> {
        self.lock.lock_irq_disabled()
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_locked()
    }
}

/// Fixed-size table of line descriptors.
pub struct LineDescriptorTable {
    descs: alloc::boxed::Box<[LineDescriptor]>,
}

impl LineDescriptorTable {
    pub fn new(nr_irqs: usize) -> Self {
        Self {
            descs: (0..nr_irqs).map(LineDescriptor::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.descs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descs.is_empty()
    }

    pub fn get(&self, line: usize) -> Option<&LineDescriptor> {
        self.descs.get(line)
    }
}
