use std::cell::RefCell;

use crate::{Error, Result};

/// The stack of slot indices that are currently available for leasing.
///
/// Indices are handed out in LIFO order: the most recently returned index is the next one to be
/// leased. A freshly seeded stack has index `0` at the bottom and `slot_count - 1` at the top.
///
/// Storage for every index is reserved up front, so returning an index never allocates. Debug
/// builds additionally scan the stack for a duplicate whenever an index is returned. The
/// stack is mutated through a shared reference because leases return their index through a
/// shared reference to the pool. No borrow of the inner `Vec` is ever held across a call into
/// user code, so the `RefCell` cannot observe a conflicting borrow.
#[derive(Debug)]
pub(crate) struct FreeIndices {
    stack: RefCell<Vec<usize>>,

    /// The number of slots the indices refer to. Every index on the stack is below this and the
    /// stack can never hold more entries than this.
    slot_count: usize,
}

impl FreeIndices {
    /// Creates a stack for a pool without any slots.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            stack: RefCell::new(Vec::new()),
            slot_count: 0,
        }
    }

    /// Creates a stack that marks all of `0..slot_count` as free.
    pub(crate) fn try_with_all<E>(slot_count: usize) -> Result<Self, E> {
        let mut stack = Vec::new();

        stack
            .try_reserve_exact(slot_count)
            .map_err(|source| Error::<E>::AllocationFailed {
                requested: slot_count,
                source,
            })?;

        // Capacity is already reserved, so this does not reallocate.
        stack.extend(0..slot_count);

        Ok(Self {
            stack: RefCell::new(stack),
            slot_count,
        })
    }

    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.stack.borrow().len()
    }

    #[must_use]
    pub(crate) fn is_empty(&self) -> bool {
        self.stack.borrow().is_empty()
    }

    /// Removes the most recently freed index from the stack.
    #[must_use]
    pub(crate) fn pop(&self) -> Option<usize> {
        self.stack.borrow_mut().pop()
    }

    /// # Panics
    ///
    /// Panics if the index is out of bounds or if every index is already on the stack, which
    /// means some index is being returned twice. Debug builds also panic if this exact index is
    /// already on the stack.
    pub(crate) fn push(&self, index: usize) {
        assert!(
            index < self.slot_count,
            "returned slot index {index} is out of bounds in a pool of {} slots",
            self.slot_count
        );

        let mut stack = self.stack.borrow_mut();

        assert!(
            stack.len() < self.slot_count,
            "returned slot index {index} to a pool where all {} slots are already free",
            self.slot_count
        );

        #[cfg(debug_assertions)]
        Self::integrity_check(&stack, index);

        stack.push(index);
    }

    #[cfg(test)]
    #[must_use]
    fn capacity(&self) -> usize {
        self.stack.borrow().capacity()
    }

    #[cfg_attr(test, mutants::skip)] // This is essentially test logic, mutation is meaningless.
    #[cfg(debug_assertions)]
    fn integrity_check(stack: &[usize], returned: usize) {
        assert!(
            !stack.contains(&returned),
            "slot index {returned} was returned while it was already free"
        );
    }
}
