//! `/proc/interrupts` generator.
//!
//! The report is produced one record per position so a paged reader can
//! stop and resume anywhere:
//!
//! ```text
//! pos 0            header + line 0
//! 1 .. nr_irqs-1   one line record (skipped if no handler)
//! nr_irqs          NMI / LOC / ERR / MIS summary
//! > nr_irqs        end
//! ```
//!
//! Each line record is formatted under that line's descriptor lock with
//! local interrupts disabled, so its controller name and handler names come
//! from one consistent state. Counters are read without locks and may lag a
//! concurrent increment.

use core::fmt::{self, Write};

use crate::irq::IrqCore;

/// Where a report generator stands after emitting one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    /// Call again with this position.
    More(usize),
    /// Nothing left to emit.
    End,
}

impl IrqCore<'_> {
    /// Emit the record(s) for `pos` into `out`.
    ///
    /// Only errors from `out` itself are returned; missing handlers or
    /// offline CPUs just shrink the output.
    pub fn show_interrupts<W: Write + ?Sized>(
        &self,
        out: &mut W,
        pos: usize,
    ) -> Result<Cursor, fmt::Error> {
        let nr_irqs = self.nr_irqs();

        if pos == 0 {
            out.write_str("           ")?;
            for cpu in self.online_cpus() {
                write!(out, "CPU{}       ", cpu)?;
            }
            out.write_char('\n')?;
        }

        if pos < nr_irqs {
            self.show_line(out, pos)?;
        } else if pos == nr_irqs {
            self.show_summary(out)?;
        } else {
            return Ok(Cursor::End);
        }

        Ok(Cursor::More(pos + 1))
    }

    fn show_line<W: Write + ?Sized>(&self, out: &mut W, line: usize) -> fmt::Result {
        let Some(desc) = self.desc(line) else {
            return Ok(());
        };

        let inner = desc.lock(self.platform);
        let mut names = inner.action_names();
        let Some(first) = names.next() else {
            return Ok(());
        };

        write!(out, "{:>3}: ", line)?;
        for cpu in self.online_cpus() {
            write!(out, "{:>10} ", self.kstat.irqs(cpu, line))?;
        }
        write!(out, " {:>14}", inner.chip_name())?;
        write!(out, "  {}", first)?;
        for name in names {
            write!(out, ", {}", name)?;
        }
        out.write_char('\n')
    }

    fn show_summary<W: Write + ?Sized>(&self, out: &mut W) -> fmt::Result {
        out.write_str("NMI: ")?;
        for cpu in self.online_cpus() {
            write!(out, "{:>10} ", self.kstat.nmi_count(cpu))?;
        }
        out.write_char('\n')?;

        if self.config.local_apic {
            out.write_str("LOC: ")?;
            for cpu in self.online_cpus() {
                write!(out, "{:>10} ", self.kstat.apic_timer_irqs(cpu))?;
            }
            out.write_char('\n')?;
        }

        writeln!(out, "ERR: {:>10}", self.errors.errors())?;
        if self.config.mismatch_debug {
            writeln!(out, "MIS: {:>10}", self.errors.mismatches())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IrqConfig;
    use crate::dispatch::PtRegs;
    use crate::flow::ChainFlow;
    use crate::irq_desc::{IrqAction, IrqFlags, IrqReturn};
    use crate::testing::MockPlatform;
    use alloc::string::String;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    fn handled(_line: usize, _dev_id: usize) -> IrqReturn {
        IrqReturn::Handled
    }

    fn show(core: &IrqCore<'_>, pos: usize) -> (String, Cursor) {
        let mut out = String::new();
        let cursor = core.show_interrupts(&mut out, pos).unwrap();
        (out, cursor)
    }

    fn config(nr_cpus: usize) -> IrqConfig {
        IrqConfig::new()
            .with_nr_irqs(16)
            .with_nr_cpus(nr_cpus)
            .with_local_apic(true)
            .with_mismatch_debug(false)
    }

    #[test]
    fn test_keyboard_line_record() {
        let platform = MockPlatform::new(2);
        let core = IrqCore::new(config(2), &platform, &ChainFlow);
        core.set_chip_name(7, "IO-APIC-edge").unwrap();
        core.request_irq(7, IrqAction::new("kbd", 1, IrqFlags::SHARED, handled))
            .unwrap();
        core.request_irq(7, IrqAction::new("ps2aux", 2, IrqFlags::SHARED, handled))
            .unwrap();

        core.do_irq(&mut PtRegs::for_line(7));
        core.do_irq(&mut PtRegs::for_line(7));
        platform.run_on(1, || core.do_irq(&mut PtRegs::for_line(7)));

        let (out, cursor) = show(&core, 7);
        assert_eq!(
            out,
            "  7:          2          1    IO-APIC-edge  kbd, ps2aux\n"
        );
        assert_eq!(cursor, Cursor::More(8));
    }

    #[test]
    fn test_position_zero_emits_header_then_line_zero() {
        let platform = MockPlatform::new(4);
        platform.set_online(2, false);
        let core = IrqCore::new(config(4), &platform, &ChainFlow);
        core.set_chip_name(0, "XT-PIC").unwrap();
        core.request_irq(0, IrqAction::new("timer", 1, IrqFlags::NONE, handled))
            .unwrap();

        let (out, cursor) = show(&core, 0);
        let mut lines = out.lines();
        assert_eq!(
            lines.next(),
            Some("           CPU0       CPU1       CPU3       ")
        );
        assert_eq!(
            lines.next(),
            Some("  0:          0          0          0          XT-PIC  timer")
        );
        assert_eq!(lines.next(), None);
        assert_eq!(cursor, Cursor::More(1));
    }

    #[test]
    fn test_unregistered_line_is_skipped() {
        let platform = MockPlatform::new(1);
        let core = IrqCore::new(config(1), &platform, &ChainFlow);
        core.do_irq(&mut PtRegs::for_line(5));

        let (out, cursor) = show(&core, 5);
        assert!(out.is_empty());
        assert_eq!(cursor, Cursor::More(6));
        assert!(platform.interrupts_enabled());
    }

    #[test]
    fn test_shared_line_lists_every_handler() {
        let platform = MockPlatform::new(1);
        let core = IrqCore::new(config(1), &platform, &ChainFlow);
        for (dev, name) in ["a", "b", "c"].into_iter().enumerate() {
            core.request_irq(9, IrqAction::new(name, dev, IrqFlags::SHARED, handled))
                .unwrap();
        }

        let (out, _) = show(&core, 9);
        assert_eq!(out, "  9:          0            none  a, b, c\n");
    }

    #[test]
    fn test_summary_rows_follow_config() {
        let platform = MockPlatform::new(2);
        let core = IrqCore::new(config(2), &platform, &ChainFlow);
        core.note_nmi();
        platform.run_on(1, || core.note_local_timer());
        core.errors().note_error();
        core.errors().note_mismatch();

        let (out, cursor) = show(&core, 16);
        assert_eq!(
            out,
            "NMI:          1          0 \n\
             LOC:          0          1 \n\
             ERR:          1\n"
        );
        assert_eq!(cursor, Cursor::More(17));

        let quiet = IrqCore::new(
            config(2).with_local_apic(false).with_mismatch_debug(true),
            &platform,
            &ChainFlow,
        );
        quiet.errors().note_mismatch();
        let (out, _) = show(&quiet, 16);
        assert_eq!(
            out,
            "NMI:          0          0 \n\
             ERR:          0\n\
             MIS:          1\n"
        );
    }

    #[test]
    fn test_past_summary_is_end() {
        let platform = MockPlatform::new(1);
        let core = IrqCore::new(config(1), &platform, &ChainFlow);

        let (out, cursor) = show(&core, 17);
        assert!(out.is_empty());
        assert_eq!(cursor, Cursor::End);
        assert_eq!(show(&core, 1000).1, Cursor::End);
    }

    #[test]
    fn test_report_during_dispatch_and_registration() {
        let platform: &'static MockPlatform = Box::leak(Box::new(MockPlatform::new(3)));
        let core = Arc::new(IrqCore::new(config(3), platform, &ChainFlow));
        core.set_chip_name(5, "IO-APIC-level").unwrap();
        core.request_irq(5, IrqAction::new("eth0", 1, IrqFlags::SHARED, handled))
            .unwrap();
        let stop = Arc::new(AtomicBool::new(false));

        let mut workers = Vec::new();
        for cpu in 1..3 {
            let core = Arc::clone(&core);
            let stop = Arc::clone(&stop);
            workers.push(thread::spawn(move || {
                platform.run_on(cpu, || {
                    while !stop.load(Ordering::Relaxed) {
                        core.do_irq(&mut PtRegs::for_line(5));
                    }
                })
            }));
        }
        {
            let core = Arc::clone(&core);
            let stop = Arc::clone(&stop);
            workers.push(thread::spawn(move || {
                // "IO-APIC-edge" is only ever set while eth1 is on the chain.
                platform.run_on(0, || {
                    while !stop.load(Ordering::Relaxed) {
                        core.request_irq(5, IrqAction::new("eth1", 2, IrqFlags::SHARED, handled))
                            .unwrap();
                        core.set_chip_name(5, "IO-APIC-edge").unwrap();
                        core.set_chip_name(5, "IO-APIC-level").unwrap();
                        core.free_irq(5, 2).unwrap();
                    }
                })
            }));
        }

        let mut last = [0u64; 2];
        for _ in 0..5_000 {
            let (out, _) = show(&core, 5);
            let (counts, tail) = out.split_at(out.find("IO-APIC-").unwrap());
            match tail {
                "IO-APIC-level  eth0\n"
                | "IO-APIC-level  eth0, eth1\n"
                | "IO-APIC-edge  eth0, eth1\n" => {}
                _ => panic!("torn record: {:?}", out),
            }

            let fields: Vec<u64> = counts
                .trim_start_matches("  5:")
                .split_whitespace()
                .map(|f| f.parse().unwrap())
                .collect();
            assert_eq!(fields.len(), 3);
            for (seen, &now) in last.iter_mut().zip(&fields[1..]) {
                assert!(now >= *seen, "counter went backwards");
                *seen = now;
            }
        }

        stop.store(true, Ordering::Relaxed);
        for worker in workers {
            worker.join().unwrap();
        }

        // Settled state after the toggler stopped between iterations.
        let (out, _) = show(&core, 5);
        assert!(out.ends_with(" IO-APIC-level  eth0\n"), "{:?}", out);
    }
}
