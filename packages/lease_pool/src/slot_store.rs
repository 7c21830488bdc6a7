use std::any::type_name;
use std::cell::UnsafeCell;

use crate::{Error, Result};

/// The backing storage of a `LeasePool`: a fixed-length array of slots, each either holding a
/// constructed value or vacant.
///
/// A slot is vacant only in a narrow window while it is being reconstructed and afterwards only
/// if that reconstruction failed or if the pool drops the contents of released slots. A vacant
/// slot is never bound to a lease: it is reconstructed before anyone gets to see it.
///
/// The store does not track which slots are leased. That is the job of the free index stack,
/// and the accessors that hand out references are `unsafe` because they rely on the caller to
/// only touch a slot that it has exclusively claimed.
pub(crate) struct SlotStore<T> {
    slots: Box<[UnsafeCell<Option<T>>]>,
}

impl<T> SlotStore<T> {
    /// Creates a store without any slots.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            slots: Box::new([]),
        }
    }

    /// Creates a store of `len` slots, filling each slot with a value from `factory`.
    ///
    /// If allocation or any call to `factory` fails, the values constructed so far are dropped
    /// and the error is returned.
    pub(crate) fn try_build<E>(
        len: usize,
        mut factory: impl FnMut() -> std::result::Result<T, E>,
    ) -> Result<Self, E> {
        let mut slots = Vec::new();

        slots
            .try_reserve_exact(len)
            .map_err(|source| Error::<E>::AllocationFailed {
                requested: len,
                source,
            })?;

        for _ in 0..len {
            let value = factory().map_err(Error::ConstructionFailed)?;
            slots.push(UnsafeCell::new(Some(value)));
        }

        Ok(Self {
            slots: slots.into_boxed_slice(),
        })
    }

    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    fn slot(&self, index: usize) -> &UnsafeCell<Option<T>> {
        self.slots.get(index).unwrap_or_else(|| {
            panic!(
                "slot {index} is out of bounds in a store of {} slots of {}",
                self.slots.len(),
                type_name::<T>()
            )
        })
    }

    /// Drops the current value of the slot and stores a new one obtained from `factory`.
    ///
    /// The old value is dropped before `factory` is called. If `factory` fails, the slot is left
    /// vacant and the error is returned.
    ///
    /// # Safety
    ///
    /// The caller must have exclusively claimed the slot: no reference to its contents obtained
    /// via [`get()`][Self::get] or [`get_mut()`][Self::get_mut] may be alive and no other call
    /// may access the slot until this one returns.
    pub(crate) unsafe fn reconstruct<E>(
        &self,
        index: usize,
        factory: impl FnOnce() -> std::result::Result<T, E>,
    ) -> std::result::Result<(), E> {
        // SAFETY: Forwarding the caller's guarantee of exclusive access to the slot.
        let previous = unsafe { self.take(index) };

        // The previous value is dropped outside of any borrow of the slot, so a destructor that
        // calls back into the pool cannot observe a borrowed slot.
        drop(previous);

        let value = factory()?;

        let slot = self.slot(index).get();

        // SAFETY: Forwarding the caller's guarantee of exclusive access to the slot. The slot is
        // vacant at this point, so overwriting it does not leak anything.
        unsafe {
            slot.write(Some(value));
        }

        Ok(())
    }

    /// Moves the value out of the slot, leaving it vacant.
    ///
    /// # Safety
    ///
    /// The caller must have exclusively claimed the slot, as for [`reconstruct()`][1].
    ///
    /// [1]: Self::reconstruct
    #[must_use]
    pub(crate) unsafe fn take(&self, index: usize) -> Option<T> {
        let slot = self.slot(index).get();

        // SAFETY: Forwarding the caller's guarantee of exclusive access to the slot.
        unsafe { (*slot).take() }
    }

    /// # Safety
    ///
    /// The caller must have exclusively claimed the slot and must not allow the returned
    /// reference to coexist with an exclusive reference to the same slot.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds or the slot is vacant.
    #[must_use]
    pub(crate) unsafe fn get(&self, index: usize) -> &T {
        let slot = self.slot(index).get();

        // SAFETY: Forwarding the caller's guarantee that no exclusive reference exists.
        let value = unsafe { &*slot };

        value.as_ref().unwrap_or_else(|| {
            panic!(
                "slot {index} was vacant in a store of {}",
                type_name::<T>()
            )
        })
    }

    /// # Safety
    ///
    /// The caller must have exclusively claimed the slot and must not allow the returned
    /// reference to coexist with any other reference to the same slot.
    ///
    /// # Panics
    ///
    /// Panics if the index is out of bounds or the slot is vacant.
    #[must_use]
    #[expect(
        clippy::mut_from_ref,
        reason = "exclusivity is guaranteed by the caller holding the lease for the slot"
    )]
    pub(crate) unsafe fn get_mut(&self, index: usize) -> &mut T {
        let slot = self.slot(index).get();

        // SAFETY: Forwarding the caller's guarantee that no other reference exists.
        let value = unsafe { &mut *slot };

        value.as_mut().unwrap_or_else(|| {
            panic!(
                "slot {index} was vacant in a store of {}",
                type_name::<T>()
            )
        })
    }

    /// The number of slots that currently hold a value.
    ///
    /// This requires exclusive access because it reads every slot.
    #[cfg(test)]
    #[must_use]
    pub(crate) fn occupied_count(&mut self) -> usize {
        self.slots
            .iter_mut()
            .filter_map(|slot| slot.get_mut().as_ref())
            .count()
    }
}

impl<T> std::fmt::Debug for SlotStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotStore")
            .field(
                "item_type",
                &std::format_args!("{}", std::any::type_name::<T>()),
            )
            .field("len", &self.slots.len())
            .finish()
    }
}
