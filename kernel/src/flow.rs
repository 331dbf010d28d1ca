//! Default flow handler: walk the line's chain.
//!
//! Clones the chain `Arc` under the descriptor lock, drops the lock, then
//! calls every action in registration order. If no action claims the
//! occurrence it is counted in the global `ERR` counter. Controller
//! acknowledgement is left to chip-aware flow handlers.

use crate::counters::ErrorCounters;
use crate::dispatch::{FlowHandler, PtRegs};
use crate::irq_desc::{IrqReturn, LineDescriptor};

pub struct ChainFlow;

impl FlowHandler for ChainFlow {
    fn handle_irq(
        &self,
        line: usize,
        desc: &LineDescriptor,
        errors: &ErrorCounters,
        _regs: &mut PtRegs,
    ) {
        let chain = desc.lock_irq_disabled().chain();

        let mut handled = false;
        for action in chain.iter() {
            if (action.handler)(line, action.dev_id) == IrqReturn::Handled {
                handled = true;
            }
        }

        if !handled {
            errors.note_error();
        }
    }
}
