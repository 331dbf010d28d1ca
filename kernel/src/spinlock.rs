//! Spinlock that also disables local interrupts.
//!
//! Same shape as Linux `spin_lock_irqsave`: the interrupt flag is saved and
//! cleared before spinning, and restored only after the lock is released.
//! Used for locks that interrupt context may also take.

use core::mem::ManuallyDrop;
use core::ops::{Deref, DerefMut};

use spin::{Mutex, MutexGuard};

use crate::arch_impl::traits::CpuOps;

pub struct SpinLockIrq<T> {
    inner: Mutex<T>,
}

impl<T> SpinLockIrq<T> {
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
        }
    }

    /// Acquire the lock with local interrupts disabled.
    pub fn lock<'a, C: CpuOps + ?Sized>(&'a self, cpu: &'a C) -> SpinLockIrqGuard<'a, T, C> {
        let irq_was_enabled = cpu.local_irq_save();
        let guard = self.inner.lock();
        SpinLockIrqGuard {
            guard: ManuallyDrop::new(guard),
            cpu,
            irq_was_enabled,
        }
    }

    /// Try to acquire the lock without spinning.
    ///
    /// Interrupt state is restored immediately if the lock is busy.
    pub fn try_lock<'a, C: CpuOps + ?Sized>(
        &'a self,
        cpu: &'a C,
    ) -> Option<SpinLockIrqGuard<'a, T, C>> {
        let irq_was_enabled = cpu.local_irq_save();
        match self.inner.try_lock() {
            Some(guard) => Some(SpinLockIrqGuard {
                guard: ManuallyDrop::new(guard),
                cpu,
                irq_was_enabled,
            }),
            None => {
                cpu.local_irq_restore(irq_was_enabled);
                None
            }
        }
    }

    /// Acquire the lock when local interrupts are already disabled
    /// (hard-IRQ context).
    pub fn lock_irq_disabled(&self) -> MutexGuard<'_, T> {
        self.inner.lock()
    }

    pub fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }
}

/// RAII guard for [`SpinLockIrq`].
///
/// Releases the lock, then restores the saved interrupt state.
pub struct SpinLockIrqGuard<'a, T, C: CpuOps + ?Sized> {
    guard: ManuallyDrop<MutexGuard<'a, T>>,
    cpu: &'a C,
    irq_was_enabled: bool,
}

impl<T, C: CpuOps + ?Sized> Deref for SpinLockIrqGuard<'_, T, C> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T, C: CpuOps + ?Sized> DerefMut for SpinLockIrqGuard<'_, T, C> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

impl<T, C: CpuOps + ?Sized> Drop for SpinLockIrqGuard<'_, T, C> {
    fn drop(&mut self) {
        // SAFETY: the guard is dropped exactly once, here, and never used again.
        unsafe { ManuallyDrop::drop(&mut self.guard) };
        self.cpu.local_irq_restore(self.irq_was_enabled);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockPlatform;

    #[test]
    fn test_lock_disables_and_restores_interrupts() {
        let platform = MockPlatform::new(1);
        let lock = SpinLockIrq::new(5u32);

        assert!(platform.interrupts_enabled());
        {
            let mut guard = lock.lock(&platform);
            assert!(!platform.interrupts_enabled());
            assert!(lock.is_locked());
            *guard += 1;
        }
        assert!(platform.interrupts_enabled());
        assert!(!lock.is_locked());
        assert_eq!(*lock.lock(&platform), 6);
    }

    #[test]
    fn test_lock_keeps_interrupts_off_if_already_off() {
        let platform = MockPlatform::new(1);
        let lock = SpinLockIrq::new(());

        let outer = platform.local_irq_save();
        drop(lock.lock(&platform));
        assert!(!platform.interrupts_enabled());
        platform.local_irq_restore(outer);
        assert!(platform.interrupts_enabled());
    }

    #[test]
    fn test_try_lock_restores_on_contention() {
        let platform = MockPlatform::new(1);
        let lock = SpinLockIrq::new(());

        let held = lock.lock_irq_disabled();
        assert!(lock.try_lock(&platform).is_none());
        assert!(platform.interrupts_enabled());
        drop(held);
        assert!(lock.try_lock(&platform).is_some());
    }
}
