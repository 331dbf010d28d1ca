//! The kernel's interrupt core singleton and its C entry point.
//!
//! Boot code builds an [`IrqCore`] over `'static` platform and flow objects
//! and installs it once with [`init`]. The assembly entry stub then calls
//! [`do_IRQ`] with the saved register frame.

use conquer_once::spin::OnceCell;

use crate::dispatch::PtRegs;
use crate::error::IrqError;
use crate::irq::IrqCore;

static IRQ_CORE: OnceCell<IrqCore<'static>> = OnceCell::uninit();

/// Install the global interrupt core.
pub fn init(core: IrqCore<'static>) -> Result<(), IrqError> {
    IRQ_CORE
        .try_init_once(|| core)
        .map_err(|_| IrqError::AlreadyInitialized)?;
    log::info!("irq: global interrupt core installed");
    Ok(())
}

/// The installed interrupt core, if boot got that far.
pub fn irq_core() -> Option<&'static IrqCore<'static>> {
    IRQ_CORE.get()
}

/// Entry from the interrupt trampoline.
///
/// # Safety
/// `regs` must point to the register frame the entry stub just saved, valid
/// and exclusively owned for the duration of the call. Must be called with
/// local interrupts disabled.
#[no_mangle]
#[allow(non_snake_case)]
pub unsafe extern "C" fn do_IRQ(regs: *mut PtRegs) -> u32 {
    let Some(core) = irq_core() else {
        log::error!("do_IRQ: interrupt before the interrupt core was installed");
        panic!("do_IRQ: interrupt core not initialized");
    };
    // SAFETY: the caller guarantees `regs` is a live, exclusive frame.
    let regs = unsafe { &mut *regs };
    core.do_irq(regs)
}
