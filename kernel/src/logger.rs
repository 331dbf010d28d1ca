//! Kernel log sink.
//!
//! Records are formatted straight into a fixed-size byte buffer (no heap),
//! oldest bytes falling off the front once it fills, and can be read back
//! like `dmesg`. The buffer lock is only ever try-locked from `log`, so a
//! record emitted while the buffer is held elsewhere is dropped instead of
//! deadlocking.

use alloc::string::String;
use core::fmt::{self, Write};

use conquer_once::spin::OnceCell;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};
use spin::Mutex;

const BUFFER_SIZE: usize = 8192;

/// Byte buffer holding the most recent log output
struct LogBuffer<const N: usize> {
    buffer: [u8; N],
    position: usize,
}

impl<const N: usize> LogBuffer<N> {
    const fn new() -> Self {
        Self {
            buffer: [0; N],
            position: 0,
        }
    }

    fn push(&mut self, bytes: &[u8]) {
        let bytes = &bytes[bytes.len().saturating_sub(N)..];
        let overflow = (self.position + bytes.len()).saturating_sub(N);
        if overflow > 0 {
            self.buffer.copy_within(overflow..self.position, 0);
            self.position -= overflow;
        }
        self.buffer[self.position..self.position + bytes.len()].copy_from_slice(bytes);
        self.position += bytes.len();
    }

    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer[..self.position]).into_owned()
    }
}

impl<const N: usize> Write for LogBuffer<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push(s.as_bytes());
        Ok(())
    }
}

pub struct KernelLog {
    buffer: Mutex<LogBuffer<BUFFER_SIZE>>,
}

impl KernelLog {
    const fn new() -> Self {
        KernelLog {
            buffer: Mutex::new(LogBuffer::new()),
        }
    }
}

impl Log for KernelLog {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Some(mut buffer) = self.buffer.try_lock() {
            let _ = writeln!(
                &mut *buffer,
                "[{:>5}] {}: {}",
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

static KERNEL_LOG: KernelLog = KernelLog::new();
static INSTALLED: OnceCell<LevelFilter> = OnceCell::uninit();

/// Install the kernel log as the `log` backend.
///
/// Fails if any logger (this one or another) is already installed.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&KERNEL_LOG)?;
    log::set_max_level(level);
    INSTALLED.init_once(|| level);
    log::info!("kernel log installed at level {}", level);
    Ok(())
}

/// Level the kernel log was installed with, if it was.
pub fn installed_level() -> Option<LevelFilter> {
    INSTALLED.get().copied()
}

/// Everything still held in the log buffer.
pub fn contents() -> String {
    KERNEL_LOG.buffer.lock().contents()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_keeps_newest_bytes() {
        let mut buffer = LogBuffer::<8>::new();
        buffer.push(b"abcde");
        buffer.push(b"fgh");
        assert_eq!(buffer.contents(), "abcdefgh");

        buffer.push(b"ij");
        assert_eq!(buffer.contents(), "cdefghij");

        buffer.push(b"0123456789");
        assert_eq!(buffer.contents(), "23456789");
    }

    #[test]
    fn test_formatted_write() {
        let mut buffer = LogBuffer::<64>::new();
        write!(buffer, "irq {}: {}", 7, "kbd").unwrap();
        assert_eq!(buffer.contents(), "irq 7: kbd");
    }

    #[test]
    fn test_global_install_records_messages() {
        init(LevelFilter::Debug).unwrap();
        assert_eq!(installed_level(), Some(LevelFilter::Debug));

        log::debug!(target: "irq_test", "marker {}", 42);
        log::trace!(target: "irq_test", "filtered out");

        let text = contents();
        assert!(text.contains("[DEBUG] irq_test: marker 42\n"));
        assert!(!text.contains("filtered out"));
        assert!(init(LevelFilter::Trace).is_err());
    }
}
