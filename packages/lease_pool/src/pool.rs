use std::any::type_name;
use std::fmt;
use std::mem;

use scopeguard::ScopeGuard;
use tracing::trace;

use crate::{FreeIndices, Lease, LeasePoolBuilder, ReleasePolicy, Result, SlotStore};

/// A fixed-capacity object pool that lends out its slots through move-only [`Lease`] handles.
///
/// The pool pre-allocates a set of slots when its capacity is set via [`resize()`][1] (or the
/// [builder][2]) and never allocates afterwards. Each call to one of the acquire methods takes a
/// free slot, constructs a new value in it and returns a [`Lease`] that grants exclusive access
/// to that value. Dropping the lease returns the slot to the pool.
///
/// There are multiple ways to acquire a lease:
///
/// * [`acquire()`][3] - constructs the value via [`Default`].
/// * [`acquire_with()`][4] - constructs the value via a closure.
/// * [`try_acquire_with()`][5] - constructs the value via a fallible closure.
///
/// # Slot reuse
///
/// Free slots are reused in last-in-first-out order: the slot that was released most recently
/// is the next one to be leased. No other ordering guarantee is made.
///
/// # Slot contents
///
/// The value in a slot is dropped and replaced every time the slot is leased. By default, a
/// released slot keeps the value of its last lease until that happens. Use
/// [`ReleasePolicy::DropContents`] to drop values as soon as their lease is released instead.
///
/// # Resizing
///
/// Resizing requires exclusive access to the pool, whereas every lease borrows the pool, so the
/// capacity can only be changed while no leases are outstanding.
///
/// # Thread safety
///
/// The pool is not synchronized. It can be moved between threads if `T: Send` but cannot be
/// shared between threads. Leases cannot leave the thread that owns the pool.
///
/// # Example
///
/// ```rust
/// use lease_pool::LeasePool;
///
/// let mut pool = LeasePool::<Vec<u8>>::new();
/// pool.resize(2).unwrap();
///
/// let mut buffer = pool.acquire_with(|| Vec::with_capacity(1024)).unwrap();
/// buffer.extend_from_slice(b"hello");
///
/// assert_eq!(pool.in_use(), 1);
/// assert_eq!(pool.available(), 1);
///
/// drop(buffer);
/// assert_eq!(pool.in_use(), 0);
/// ```
///
/// [1]: Self::resize
/// [2]: Self::builder
/// [3]: Self::acquire
/// [4]: Self::acquire_with
/// [5]: Self::try_acquire_with
pub struct LeasePool<T> {
    slots: SlotStore<T>,

    /// Indices of the slots that are not currently bound to a lease. Every index in
    /// `0..slots.len()` is either here or bound to exactly one live lease.
    free_indices: FreeIndices,

    release_policy: ReleasePolicy,
}

impl<T> LeasePool<T> {
    #[must_use]
    pub(crate) fn new_inner(release_policy: ReleasePolicy) -> Self {
        Self {
            slots: SlotStore::new(),
            free_indices: FreeIndices::new(),
            release_policy,
        }
    }

    /// Creates a new [`LeasePool`] without any slots and with the default configuration.
    ///
    /// You must give the pool some capacity via [`resize()`][1] or one of its variants
    /// before any lease can be acquired.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lease_pool::LeasePool;
    ///
    /// let pool = LeasePool::<String>::new();
    ///
    /// assert_eq!(pool.size(), 0);
    /// assert!(pool.acquire().unwrap_err().is_exhausted());
    /// ```
    ///
    /// [1]: Self::resize
    #[must_use]
    pub fn new() -> Self {
        Self::new_inner(ReleasePolicy::default())
    }

    /// Starts building a new [`LeasePool`].
    ///
    /// Use this when you want to set the initial capacity or customize the pool configuration.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lease_pool::{LeasePool, ReleasePolicy};
    ///
    /// let pool = LeasePool::<u64>::builder()
    ///     .capacity(16)
    ///     .release_policy(ReleasePolicy::DropContents)
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(pool.size(), 16);
    /// ```
    pub fn builder() -> LeasePoolBuilder<T> {
        LeasePoolBuilder::new()
    }

    /// Sets the number of slots in the pool, filling every slot with a value from `T::default()`.
    ///
    /// All previous slots and their values are dropped, but only after the new slots have been
    /// successfully created. After a successful resize, all `n` slots are available.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`][crate::Error::AllocationFailed] if storage for `n`
    /// slots cannot be allocated. The pool is left unchanged in that case.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lease_pool::LeasePool;
    ///
    /// let mut pool = LeasePool::<String>::new();
    /// pool.resize(5).unwrap();
    ///
    /// assert_eq!(pool.size(), 5);
    /// assert_eq!(pool.available(), 5);
    /// assert_eq!(pool.in_use(), 0);
    /// ```
    pub fn resize(&mut self, n: usize) -> Result<()>
    where
        T: Default,
    {
        self.resize_with(n, T::default)
    }

    /// Sets the number of slots in the pool, filling every slot with a value from `factory`.
    ///
    /// This is the same as [`resize()`][1] for types that do not implement [`Default`] or for
    /// which the default value is not a suitable placeholder.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`][crate::Error::AllocationFailed] if storage for `n`
    /// slots cannot be allocated. The pool is left unchanged in that case.
    ///
    /// [1]: Self::resize
    pub fn resize_with(&mut self, n: usize, mut factory: impl FnMut() -> T) -> Result<()> {
        self.try_resize_with(n, || Ok(factory()))
    }

    /// Sets the number of slots in the pool, filling every slot with a value from a fallible
    /// `factory`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConstructionFailed`][1] if `factory` fails for any slot and
    /// [`Error::AllocationFailed`][2] if storage for `n` slots cannot be allocated. The pool is
    /// left unchanged in both cases and any values already produced by `factory` are dropped.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lease_pool::{Error, LeasePool};
    ///
    /// let mut pool = LeasePool::<u32>::new();
    /// pool.resize(2).unwrap();
    ///
    /// pool.try_resize_with(10, || "0".parse::<u32>()).unwrap();
    /// assert_eq!(pool.size(), 10);
    ///
    /// let result = pool.try_resize_with(20, || "zero".parse::<u32>());
    /// assert!(matches!(result, Err(Error::ConstructionFailed(_))));
    /// assert_eq!(pool.size(), 10);
    /// ```
    ///
    /// [1]: crate::Error::ConstructionFailed
    /// [2]: crate::Error::AllocationFailed
    pub fn try_resize_with<E>(
        &mut self,
        n: usize,
        factory: impl FnMut() -> std::result::Result<T, E>,
    ) -> Result<(), E> {
        let slots = SlotStore::try_build(n, factory)?;
        let free_indices = FreeIndices::try_with_all::<E>(n)?;

        let previous_slots = mem::replace(&mut self.slots, slots);
        self.free_indices = free_indices;

        trace!(
            item_type = type_name::<T>(),
            previous_size = previous_slots.len(),
            size = n,
            "resized lease pool"
        );

        // The pool is already consistent, so a panicking destructor here leaves it usable.
        drop(previous_slots);

        Ok(())
    }

    /// Leases a slot, replacing its value with `T::default()`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Exhausted`][crate::Error::Exhausted] if every slot is leased out.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lease_pool::LeasePool;
    ///
    /// let mut pool = LeasePool::<u32>::new();
    /// pool.resize(1).unwrap();
    ///
    /// let first = pool.acquire().unwrap();
    /// assert!(pool.acquire().unwrap_err().is_exhausted());
    ///
    /// drop(first);
    /// let second = pool.acquire().unwrap();
    /// assert_eq!(*second, 0);
    /// ```
    pub fn acquire(&self) -> Result<Lease<'_, T>>
    where
        T: Default,
    {
        self.acquire_with(T::default)
    }

    /// Leases a slot, replacing its value with the one returned by `factory`.
    ///
    /// The previous value of the slot is dropped before `factory` is called.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Exhausted`][crate::Error::Exhausted] if every slot is leased out.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lease_pool::LeasePool;
    ///
    /// let mut pool = LeasePool::<String>::new();
    /// pool.resize(3).unwrap();
    ///
    /// let greeting = pool.acquire_with(|| "Hello".to_string()).unwrap();
    /// assert_eq!(&*greeting, "Hello");
    /// ```
    pub fn acquire_with(&self, factory: impl FnOnce() -> T) -> Result<Lease<'_, T>> {
        self.try_acquire_with(|| Ok(factory()))
    }

    /// Leases a slot, replacing its value with the one returned by a fallible `factory`.
    ///
    /// The previous value of the slot is dropped before `factory` is called. If `factory` fails,
    /// the slot is returned to the pool before the error is returned, so the set of available
    /// slots is exactly what it was before the call. The same holds if `factory` panics.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Exhausted`][1] if every slot is leased out, without calling `factory`.
    /// Returns [`Error::ConstructionFailed`][2] if `factory` fails.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lease_pool::{Error, LeasePool};
    ///
    /// let mut pool = LeasePool::<u16>::new();
    /// pool.resize(2).unwrap();
    ///
    /// let result = pool.try_acquire_with(|| "70000".parse::<u16>());
    /// assert!(matches!(result, Err(Error::ConstructionFailed(_))));
    /// assert_eq!(pool.available(), 2);
    ///
    /// let port = pool.try_acquire_with(|| "8080".parse::<u16>()).unwrap();
    /// assert_eq!(*port, 8080);
    /// ```
    ///
    /// [1]: crate::Error::Exhausted
    /// [2]: crate::Error::ConstructionFailed
    pub fn try_acquire_with<E>(
        &self,
        factory: impl FnOnce() -> std::result::Result<T, E>,
    ) -> Result<Lease<'_, T>, E> {
        let Some(index) = self.free_indices.pop() else {
            return Err(crate::Error::Exhausted { size: self.size() });
        };

        // Until the lease exists, the claim puts the index back on the free stack if we exit
        // early, whether via error or via panic.
        let claim = scopeguard::guard(index, |index| {
            self.free_indices.push(index);

            trace!(
                item_type = type_name::<T>(),
                index,
                "returned slot to the pool after failed construction"
            );
        });

        // SAFETY: We just popped the index from the free stack, so no lease is bound to it and
        // nothing else will access the slot until we either bind it to a lease or return it.
        unsafe { self.slots.reconstruct(index, factory) }
            .map_err(crate::Error::ConstructionFailed)?;

        Ok(Lease::new(self, ScopeGuard::into_inner(claim)))
    }

    /// The number of slots in the pool, leased or not.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lease_pool::LeasePool;
    ///
    /// let mut pool = LeasePool::<u8>::new();
    /// assert_eq!(pool.size(), 0);
    ///
    /// pool.resize(4).unwrap();
    /// assert_eq!(pool.size(), 4);
    /// ```
    #[must_use]
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    /// The number of slots that are free to be leased.
    #[must_use]
    pub fn available(&self) -> usize {
        self.free_indices.len()
    }

    /// The number of slots currently bound to a lease.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lease_pool::LeasePool;
    ///
    /// let mut pool = LeasePool::<u8>::new();
    /// pool.resize(3).unwrap();
    ///
    /// let a = pool.acquire().unwrap();
    /// let b = pool.acquire().unwrap();
    ///
    /// assert_eq!(pool.in_use(), 2);
    /// assert_eq!(pool.available(), 1);
    /// # drop((a, b));
    /// ```
    #[must_use]
    pub fn in_use(&self) -> usize {
        self.size()
            .checked_sub(self.available())
            .expect("the free stack can never hold more indices than there are slots")
    }

    /// Whether no slot is free to be leased.
    ///
    /// Note that this refers to the free slots: an empty pool is one that has nothing left to
    /// lend out. A pool without any slots is both empty and full.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.free_indices.is_empty()
    }

    /// Whether every slot is free to be leased, i.e. no leases are outstanding.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.in_use() == 0
    }

    /// The [release policy][ReleasePolicy] the pool was created with.
    #[must_use]
    pub fn release_policy(&self) -> ReleasePolicy {
        self.release_policy
    }

    /// Returns a slot to the free stack. Called by the lease bound to the slot when the lease
    /// is released.
    pub(crate) fn release(&self, index: usize) {
        let contents = match self.release_policy {
            ReleasePolicy::RetainContents => None,
            // SAFETY: The lease bound to this slot is going away and the index is not yet back
            // on the free stack, so nothing else can be accessing the slot.
            ReleasePolicy::DropContents => unsafe { self.slots.take(index) },
        };

        self.free_indices.push(index);

        // Dropped only once the pool is consistent again, in case the destructor re-enters.
        drop(contents);
    }

    /// # Safety
    ///
    /// The caller must be the lease bound to the slot and must not let the returned reference
    /// coexist with an exclusive reference to the same slot.
    #[must_use]
    pub(crate) unsafe fn value(&self, index: usize) -> &T {
        // SAFETY: Forwarding the caller's guarantees.
        unsafe { self.slots.get(index) }
    }

    /// # Safety
    ///
    /// The caller must be the lease bound to the slot and must not let the returned reference
    /// coexist with any other reference to the same slot.
    #[must_use]
    #[expect(
        clippy::mut_from_ref,
        reason = "exclusivity is guaranteed by the caller holding the lease for the slot"
    )]
    pub(crate) unsafe fn value_mut(&self, index: usize) -> &mut T {
        // SAFETY: Forwarding the caller's guarantees.
        unsafe { self.slots.get_mut(index) }
    }

    #[cfg(test)]
    pub(crate) fn occupied_slot_count(&mut self) -> usize {
        self.slots.occupied_count()
    }
}

impl<T> Default for LeasePool<T> {
    /// Creates a new [`LeasePool`] without any slots and with the default configuration.
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for LeasePool<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeasePool")
            .field("item_type", &format_args!("{}", type_name::<T>()))
            .field("size", &self.size())
            .field("available", &self.available())
            .field("release_policy", &self.release_policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::rc::Rc;
    use std::sync::{Arc, Mutex};
    use std::thread;

    use static_assertions::{assert_impl_all, assert_not_impl_any};

    use super::*;
    use crate::Error;

    assert_impl_all!(LeasePool<u32>: Send, Unpin);
    assert_not_impl_any!(LeasePool<u32>: Sync);
    assert_not_impl_any!(LeasePool<Rc<u32>>: Send, Sync);

    /// Counts how many values have been dropped.
    struct Tracked {
        id: u32,
        drops: Rc<Cell<usize>>,
    }

    impl Tracked {
        fn new(id: u32, drops: &Rc<Cell<usize>>) -> Self {
            Self {
                id,
                drops: Rc::clone(drops),
            }
        }
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.drops.set(self.drops.get().checked_add(1).unwrap());
        }
    }

    fn tracked_pool(size: usize, drops: &Rc<Cell<usize>>) -> LeasePool<Tracked> {
        let mut pool = LeasePool::new();
        pool.resize_with(size, || Tracked::new(0, drops)).unwrap();
        pool
    }

    fn assert_counts_consistent<T>(pool: &LeasePool<T>) {
        assert_eq!(pool.available() + pool.in_use(), pool.size());
    }

    #[test]
    fn smoke_test() {
        let mut pool = LeasePool::<u32>::new();
        pool.resize(3).unwrap();

        let mut a = pool.acquire_with(|| 42).unwrap();
        let b = pool.acquire_with(|| 43).unwrap();

        assert_eq!(*a, 42);
        assert_eq!(*b, 43);
        assert_eq!(pool.in_use(), 2);

        *a += 1;
        assert_eq!(*a, 43);

        drop(a);
        drop(b);

        assert_eq!(pool.available(), 3);
        assert!(pool.is_full());
    }

    #[test]
    fn new_pool_has_no_slots() {
        let pool = LeasePool::<u32>::new();

        assert_eq!(pool.size(), 0);
        assert_eq!(pool.available(), 0);
        assert_eq!(pool.in_use(), 0);
        assert!(pool.is_empty());
        assert!(pool.is_full());
        assert_eq!(pool.release_policy(), ReleasePolicy::RetainContents);
    }

    #[test]
    fn acquire_without_slots_is_exhausted() {
        let pool = LeasePool::<u32>::new();

        let result = pool.acquire();

        assert!(matches!(result, Err(Error::Exhausted { size: 0 })));
    }

    #[test]
    fn resize_makes_every_slot_available() {
        let mut pool = LeasePool::<String>::new();

        for n in [0, 1, 2, 10, 129] {
            pool.resize(n).unwrap();

            assert_eq!(pool.size(), n);
            assert_eq!(pool.available(), n);
            assert_eq!(pool.in_use(), 0);
            assert!(pool.is_full());
            assert_eq!(pool.is_empty(), n == 0);
            assert_eq!(pool.occupied_slot_count(), n);
        }
    }

    #[test]
    fn counts_stay_consistent() {
        let mut pool = LeasePool::<u32>::new();
        pool.resize(4).unwrap();

        let mut leases = Vec::new();

        for _ in 0..4 {
            leases.push(pool.acquire().unwrap());
            assert_counts_consistent(&pool);
        }

        assert!(pool.is_empty());
        assert!(!pool.is_full());

        while let Some(lease) = leases.pop() {
            drop(lease);
            assert_counts_consistent(&pool);
        }

        assert!(pool.is_full());
    }

    #[test]
    fn exhaustion_and_recovery() {
        let mut pool = LeasePool::<u32>::new();
        pool.resize(1).unwrap();

        let first = pool.acquire().unwrap();

        let second = pool.acquire();
        assert!(matches!(second, Err(Error::Exhausted { size: 1 })));
        assert_eq!(pool.in_use(), 1);

        drop(first);

        let third = pool.acquire().unwrap();
        assert_eq!(third.index(), Some(0));
    }

    #[test]
    fn exhausted_does_not_call_factory() {
        let mut pool = LeasePool::<u32>::new();
        pool.resize(1).unwrap();

        let _lease = pool.acquire().unwrap();

        let called = Cell::new(false);
        let result = pool.acquire_with(|| {
            called.set(true);
            1
        });

        assert!(result.unwrap_err().is_exhausted());
        assert!(!called.get());
    }

    #[test]
    fn released_slot_is_reused_first() {
        let mut pool = LeasePool::<u32>::new();
        pool.resize(3).unwrap();

        let lease = pool.acquire().unwrap();
        assert_eq!(lease.index(), Some(2));
        drop(lease);

        let lease = pool.acquire().unwrap();
        assert_eq!(lease.index(), Some(2));

        let next = pool.acquire().unwrap();
        assert_eq!(next.index(), Some(1));

        drop(lease);

        let reused = pool.acquire().unwrap();
        assert_eq!(reused.index(), Some(2));
    }

    #[test]
    fn construction_failure_restores_free_slots() {
        let mut pool = LeasePool::<u32>::new();
        pool.resize(2).unwrap();

        let available_before = pool.available();

        let result = pool.try_acquire_with(|| Err::<u32, _>("bad arguments"));

        assert!(matches!(
            result,
            Err(Error::ConstructionFailed("bad arguments"))
        ));
        assert_eq!(pool.available(), available_before);
        assert_counts_consistent(&pool);

        let lease = pool.try_acquire_with(|| Ok::<_, &str>(5)).unwrap();
        assert_eq!(*lease, 5);
        assert_eq!(pool.in_use(), 1);
    }

    #[test]
    fn construction_failure_leaves_slot_vacant_until_reused() {
        let drops = Rc::new(Cell::new(0));
        let mut pool = tracked_pool(1, &drops);

        pool.try_acquire_with(|| Err::<Tracked, _>(())).unwrap_err();

        // The placeholder was dropped before the factory ran and nothing replaced it.
        assert_eq!(drops.get(), 1);
        assert_eq!(pool.occupied_slot_count(), 0);

        let lease = pool.acquire_with(|| Tracked::new(9, &drops)).unwrap();
        assert_eq!(lease.id, 9);
        assert_eq!(drops.get(), 1);
    }

    #[test]
    fn panicking_factory_restores_free_slots() {
        let mut pool = LeasePool::<u32>::new();
        pool.resize(2).unwrap();

        let result = catch_unwind(AssertUnwindSafe(|| {
            drop(pool.acquire_with(|| panic!("constructor failed")));
        }));

        assert!(result.is_err());
        assert_eq!(pool.available(), 2);

        let a = pool.acquire_with(|| 1).unwrap();
        let b = pool.acquire_with(|| 2).unwrap();
        assert_eq!(*a + *b, 3);
    }

    #[test]
    fn acquire_drops_previous_value_before_constructing() {
        let drops = Rc::new(Cell::new(0));
        let pool = tracked_pool(1, &drops);

        let drops_seen_by_factory = Cell::new(None);

        let lease = pool
            .acquire_with(|| {
                drops_seen_by_factory.set(Some(drops.get()));
                Tracked::new(1, &drops)
            })
            .unwrap();

        assert_eq!(drops_seen_by_factory.get(), Some(1));
        assert_eq!(lease.id, 1);
    }

    #[test]
    fn release_retains_contents_by_default() {
        let drops = Rc::new(Cell::new(0));
        let mut pool = tracked_pool(2, &drops);

        let lease = pool.acquire_with(|| Tracked::new(7, &drops)).unwrap();
        assert_eq!(drops.get(), 1);

        drop(lease);

        // Released, but the value of the lease is still alive in the slot.
        assert_eq!(drops.get(), 1);
        assert_eq!(pool.occupied_slot_count(), 2);

        // Leasing the slot again is what drops the old value.
        let lease = pool.acquire_with(|| Tracked::new(8, &drops)).unwrap();
        assert_eq!(lease.index(), Some(1));
        assert_eq!(lease.id, 8);
        assert_eq!(drops.get(), 2);
    }

    #[test]
    fn drop_contents_policy_drops_on_release() {
        let drops = Rc::new(Cell::new(0));
        let mut pool = LeasePool::builder()
            .capacity(2)
            .release_policy(ReleasePolicy::DropContents)
            .build_with(|| Tracked::new(0, &drops))
            .unwrap();

        let lease = pool.acquire_with(|| Tracked::new(7, &drops)).unwrap();
        assert_eq!(drops.get(), 1);

        drop(lease);

        assert_eq!(drops.get(), 2);
        assert_eq!(pool.occupied_slot_count(), 1);

        // Re-leasing a vacated slot has nothing to drop.
        let lease = pool.acquire_with(|| Tracked::new(8, &drops)).unwrap();
        assert_eq!(drops.get(), 2);
        assert_eq!(lease.id, 8);
    }

    #[test]
    fn resize_drops_previous_contents() {
        let drops = Rc::new(Cell::new(0));
        let mut pool = tracked_pool(3, &drops);

        pool.resize_with(1, || Tracked::new(1, &drops)).unwrap();

        assert_eq!(drops.get(), 3);
        assert_eq!(pool.size(), 1);
        assert_eq!(pool.available(), 1);
    }

    #[test]
    fn failed_resize_keeps_previous_state() {
        let drops = Rc::new(Cell::new(0));
        let mut pool = tracked_pool(2, &drops);

        {
            let lease = pool.acquire_with(|| Tracked::new(5, &drops)).unwrap();
            assert_eq!(lease.index(), Some(1));
        }

        let drops_before = drops.get();
        let mut produced = 0;

        let result = pool.try_resize_with(5, || {
            if produced == 3 {
                return Err("fourth placeholder failed");
            }

            produced += 1;
            Ok(Tracked::new(100, &drops))
        });

        assert!(matches!(
            result,
            Err(Error::ConstructionFailed("fourth placeholder failed"))
        ));

        // Only the three new placeholders were dropped, the old slots are untouched.
        assert_eq!(drops.get(), drops_before + 3);
        assert_eq!(pool.size(), 2);
        assert_eq!(pool.available(), 2);

        // Old LIFO order is preserved as well.
        let lease = pool.acquire_with(|| Tracked::new(6, &drops)).unwrap();
        assert_eq!(lease.index(), Some(1));
    }

    #[test]
    fn panicking_resize_keeps_previous_state() {
        let mut pool = LeasePool::<u32>::new();
        pool.resize(2).unwrap();

        let result = catch_unwind(AssertUnwindSafe(|| {
            let mut produced = 0;

            _ = pool.resize_with(4, || {
                produced += 1;
                assert!(produced < 3, "placeholder construction failed");
                0
            });
        }));

        assert!(result.is_err());
        assert_eq!(pool.size(), 2);
        assert_eq!(pool.available(), 2);
    }

    #[test]
    fn impossible_resize_is_allocation_failure() {
        let mut pool = LeasePool::<u64>::new();
        pool.resize(3).unwrap();

        let result = pool.resize(usize::MAX);

        assert!(matches!(
            result,
            Err(Error::AllocationFailed {
                requested: usize::MAX,
                ..
            })
        ));
        assert_eq!(pool.size(), 3);
        assert_eq!(pool.available(), 3);
    }

    #[test]
    fn resize_to_zero_after_use() {
        let mut pool = LeasePool::<u32>::new();
        pool.resize(2).unwrap();

        drop(pool.acquire().unwrap());

        pool.resize(0).unwrap();

        assert_eq!(pool.size(), 0);
        assert!(pool.is_empty());
        assert!(pool.is_full());
    }

    #[test]
    fn factory_may_acquire_from_same_pool() {
        let mut pool = LeasePool::<u32>::new();
        pool.resize(3).unwrap();

        let inner = RefCell::new(None);

        let outer = pool
            .acquire_with(|| {
                *inner.borrow_mut() = Some(pool.acquire_with(|| 20).unwrap());
                10
            })
            .unwrap();

        let inner = inner.into_inner().unwrap();

        assert_eq!(*outer, 10);
        assert_eq!(*inner, 20);
        assert_ne!(outer.index(), inner.index());
        assert_eq!(pool.in_use(), 2);
    }

    #[test]
    fn dropping_pool_drops_all_contents() {
        let drops = Rc::new(Cell::new(0));

        {
            let pool = tracked_pool(4, &drops);
            drop(pool.acquire_with(|| Tracked::new(1, &drops)).unwrap());
        }

        // Four placeholders plus the value of the one lease.
        assert_eq!(drops.get(), 5);
    }

    #[test]
    fn multithreaded_via_mutex() {
        let mut pool = LeasePool::<u32>::new();
        pool.resize(2).unwrap();

        let pool = Arc::new(Mutex::new(pool));

        let handles = (0..4)
            .map(|i| {
                let pool = Arc::clone(&pool);

                thread::spawn(move || {
                    let pool = pool.lock().unwrap();
                    let lease = pool.acquire_with(|| i).unwrap();
                    assert_eq!(*lease, i);
                })
            })
            .collect::<Vec<_>>();

        for handle in handles {
            handle.join().unwrap();
        }

        let pool = pool.lock().unwrap();
        assert!(pool.is_full());
    }

    #[test]
    fn debug_output_mentions_counts() {
        let mut pool = LeasePool::<u32>::new();
        pool.resize(2).unwrap();

        let output = format!("{pool:?}");

        assert!(output.contains("LeasePool"));
        assert!(output.contains("size: 2"));
        assert!(output.contains("u32"));
    }
}
