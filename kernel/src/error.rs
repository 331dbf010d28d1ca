//! Errors returned by the registration surface.
//!
//! Dispatch and reporting never return errors: dispatch either completes or
//! hits a fatal guard, and reporting skips what it cannot show.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqError {
    /// Line number outside the descriptor table
    InvalidLine(usize),
    /// Line already has a handler and at least one side is not shared
    Busy(usize),
    /// No action with the given device ID on that line
    NotFound { line: usize, dev_id: usize },
    /// The global interrupt core was installed twice
    AlreadyInitialized,
}

impl IrqError {
    /// Negative errno as returned through the syscall layer.
    pub fn to_errno(self) -> i64 {
        const EINVAL: i64 = 22;
        const EBUSY: i64 = 16;
        const ENOENT: i64 = 2;
        match self {
            IrqError::InvalidLine(_) => -EINVAL,
            IrqError::Busy(_) | IrqError::AlreadyInitialized => -EBUSY,
            IrqError::NotFound { .. } => -ENOENT,
        }
    }
}

impl fmt::Display for IrqError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrqError::InvalidLine(line) => write!(f, "irq {} out of range", line),
            IrqError::Busy(line) => write!(f, "irq {} busy and not shareable", line),
            IrqError::NotFound { line, dev_id } => {
                write!(f, "no handler for device {:#x} on irq {}", dev_id, line)
            }
            IrqError::AlreadyInitialized => write!(f, "interrupt core already initialized"),
        }
    }
}
