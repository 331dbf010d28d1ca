//! Interrupt dispatch router.
//!
//! The low-level entry stub saves the register state into a [`PtRegs`] and
//! calls [`IrqCore::do_irq`]. The router validates the line, brackets the
//! flow handler with `irq_enter`/`irq_exit`, counts the occurrence for this
//! CPU and returns [`IRQ_COMPLETE`]. It takes no locks itself.
//!
//! Three conditions are fatal and panic before `irq_enter` runs, so there is
//! never an unmatched `irq_exit`:
//! - `orig_rax` carries bits the entry stub never produces
//! - the decoded line is outside the descriptor table
//! - this CPU is already nested `max_nesting` levels deep

use crate::arch_impl::traits::{IrqNesting, PerCpuOps};
use crate::config::LINE_ENCODING_BITS;
use crate::counters::ErrorCounters;
use crate::irq::IrqCore;
use crate::irq_desc::LineDescriptor;

/// Completion code returned to the entry stub.
pub const IRQ_COMPLETE: u32 = 1;

const LINE_MASK: u64 = (1 << LINE_ENCODING_BITS) - 1;
/// Upper bits of a stub-built `orig_rax` once the line is shifted out.
const SIGN_EXTENDED: u64 = u64::MAX >> LINE_ENCODING_BITS;

/// Register state saved by the entry stub, in push order.
///
/// The stub stores the line in the low byte of `orig_rax`. The bits above it
/// are either all clear or all set (the stub pushes a sign-extended byte).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct PtRegs {
    pub r15: u64,
    pub r14: u64,
    pub r13: u64,
    pub r12: u64,
    pub rbp: u64,
    pub rbx: u64,
    pub r11: u64,
    pub r10: u64,
    pub r9: u64,
    pub r8: u64,
    pub rax: u64,
    pub rcx: u64,
    pub rdx: u64,
    pub rsi: u64,
    pub rdi: u64,
    pub orig_rax: u64,
    pub rip: u64,
    pub cs: u64,
    pub eflags: u64,
    pub rsp: u64,
    pub ss: u64,
}

const _: () = assert!(core::mem::size_of::<PtRegs>() == 21 * 8);

impl PtRegs {
    /// Frame as the entry stub would build it for `line`.
    pub fn for_line(line: usize) -> Self {
        Self {
            orig_rax: line as u64,
            ..Self::default()
        }
    }

    /// Line number encoded by the entry stub, or `None` if the upper bits
    /// are not a pattern the stub produces.
    #[inline(always)]
    pub fn line(&self) -> Option<usize> {
        match self.orig_rax >> LINE_ENCODING_BITS {
            0 | SIGN_EXTENDED => Some((self.orig_rax & LINE_MASK) as usize),
            _ => None,
        }
    }
}

/// Handler-chain executor for one line.
///
/// Responsible for acknowledging the controller and running the line's
/// actions. It may take the descriptor lock (interrupts are already off),
/// but must not hold it while calling out to handlers.
pub trait FlowHandler: Sync {
    fn handle_irq(
        &self,
        line: usize,
        desc: &LineDescriptor,
        errors: &ErrorCounters,
        regs: &mut PtRegs,
    );
}

impl IrqCore<'_> {
    /// Route one hardware interrupt. Runs with local interrupts disabled.
    pub fn do_irq(&self, regs: &mut PtRegs) -> u32 {
        let Some(line) = regs.line() else {
            log::error!("do_irq: orig_rax={:#x} is not a line encoding", regs.orig_rax);
            panic!("do_irq: encoded line {:#x} out of range", regs.orig_rax);
        };
        let desc = match self.descs.get(line) {
            Some(desc) => desc,
            None => {
                log::error!(
                    "do_irq: line {} outside table of {} (orig_rax={:#x})",
                    line,
                    self.descs.len(),
                    regs.orig_rax
                );
                panic!("do_irq: line {} out of range", line);
            }
        };

        let depth = self.platform.hardirq_depth();
        if depth >= self.config.max_nesting {
            log::error!(
                "do_irq: line {} would nest past {} levels on cpu {}",
                line,
                self.config.max_nesting,
                self.platform.cpu_id()
            );
            panic!("do_irq: hardirq nesting limit exceeded");
        }

        self.platform.irq_enter();
        self.kstat.this_cpu(self.platform).account_irq(line);
        self.flow.handle_irq(line, desc, &self.errors, regs);
        self.platform.irq_exit();

        IRQ_COMPLETE
    }
}
