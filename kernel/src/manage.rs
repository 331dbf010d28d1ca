//! Handler registration.
//!
//! Runs in process context. Every mutation happens under the descriptor lock
//! with local interrupts saved and disabled, so a report sees either the old
//! or the new chain, never a mix.

use alloc::sync::Arc;

use crate::error::IrqError;
use crate::irq::IrqCore;
use crate::irq_desc::{IrqAction, LineDescriptor};

impl IrqCore<'_> {
    fn checked_desc(&self, line: usize) -> Result<&LineDescriptor, IrqError> {
        self.descs.get(line).ok_or(IrqError::InvalidLine(line))
    }

    /// Append `action` to the end of `line`'s chain.
    ///
    /// A line that already has actions only accepts the new one if both the
    /// existing chain and `action` are marked shared.
    pub fn request_irq(&self, line: usize, action: IrqAction) -> Result<(), IrqError> {
        let desc = self.checked_desc(line)?;
        let (name, dev_id) = (action.name, action.dev_id);

        let busy_with = {
            let mut inner = desc.lock(self.platform);
            let busy_with = inner
                .first_action()
                .filter(|first| !(first.is_shared() && action.is_shared()))
                .map(|first| first.name);
            if busy_with.is_none() {
                inner.push_action(Arc::new(action));
            }
            busy_with
        };

        if let Some(holder) = busy_with {
            log::warn!("irq {}: {} cannot share with {}", line, name, holder);
            return Err(IrqError::Busy(line));
        }
        log::debug!("irq {}: registered {} (dev {:#x})", line, name, dev_id);
        Ok(())
    }

    /// Remove the action registered with `dev_id` from `line`.
    ///
    /// Flow handlers already walking an older snapshot of the chain finish
    /// with it; the returned action stays alive until they drop it.
    pub fn free_irq(&self, line: usize, dev_id: usize) -> Result<Arc<IrqAction>, IrqError> {
        let desc = self.checked_desc(line)?;
        let removed = desc
            .lock(self.platform)
            .remove_action(dev_id)
            .ok_or(IrqError::NotFound { line, dev_id })?;

        log::debug!("irq {}: freed {} (dev {:#x})", line, removed.name, dev_id);
        Ok(removed)
    }

    /// Record the controller that drives `line`, as shown in reports.
    pub fn set_chip_name(&self, line: usize, chip: &'static str) -> Result<(), IrqError> {
        let desc = self.checked_desc(line)?;
        desc.lock(self.platform).set_chip_name(chip);
        Ok(())
    }
}
