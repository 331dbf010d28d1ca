//! x86_64 CPU operations.
//!
//! Interrupt flag save/restore used by the descriptor lock.

/// x86_64 CPU operations.
pub struct X86Cpu;

impl X86Cpu {
    /// Disable interrupts and return whether IF was set beforehand.
    #[inline(always)]
    pub fn local_irq_save() -> bool {
        let was_enabled = x86_64::instructions::interrupts::are_enabled();
        x86_64::instructions::interrupts::disable();
        was_enabled
    }

    /// Set IF again if it was set when the matching save ran.
    #[inline(always)]
    pub fn local_irq_restore(was_enabled: bool) {
        if was_enabled {
            x86_64::instructions::interrupts::enable();
        }
    }
}
