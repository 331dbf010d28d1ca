//! `intr` line of `/proc/stat`.

use core::fmt::{self, Write};

use crate::irq::IrqCore;

impl IrqCore<'_> {
    /// `intr <total> <line 0> <line 1> ...`, each summed over every CPU slot.
    pub fn show_stat_intr<W: Write + ?Sized>(&self, out: &mut W) -> fmt::Result {
        let total: u64 = (0..self.nr_irqs())
            .map(|line| self.kstat.irqs_total(line))
            .sum();

        write!(out, "intr {}", total)?;
        for line in 0..self.nr_irqs() {
            write!(out, " {}", self.kstat.irqs_total(line))?;
        }
        out.write_char('\n')
    }
}
