use std::any::type_name;
use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::LeasePool;

/// Exclusive, move-only handle to one slot of a [`LeasePool`].
///
/// A lease is obtained from one of the acquire methods of the pool, such as
/// [`LeasePool::acquire()`]. While the lease is alive, it is the only way to access the value in
/// its slot and the slot cannot be leased again. Dropping the lease returns the slot to the pool.
///
/// # Empty leases
///
/// A lease may also be empty, bound to no slot at all. Empty leases are created by
/// [`Lease::empty()`], by [`Default`], by moving the binding out via [`take()`][1] or by
/// releasing the slot early via [`release()`][2]. Dropping an empty lease does nothing.
///
/// Assigning a lease over a lease that is still bound first releases the overwritten binding, so
/// no slot is ever leaked.
///
/// # Access
///
/// The lease implements [`Deref`] and [`DerefMut`] to the leased value. Dereferencing an empty
/// lease panics; use [`get()`][3] or [`get_mut()`][4] to handle that case without panicking.
///
/// # Example
///
/// ```rust
/// use lease_pool::{Lease, LeasePool};
///
/// let mut pool = LeasePool::<String>::new();
/// pool.resize(2).unwrap();
///
/// let mut first = pool.acquire_with(|| "first".to_string()).unwrap();
/// first.push_str(" lease");
/// assert_eq!(&*first, "first lease");
///
/// // Moving the binding out leaves an empty lease behind.
/// let moved = first.take();
/// assert!(!first.is_valid());
/// assert!(moved.is_valid());
/// assert_eq!(pool.in_use(), 1);
///
/// // Dropping the lease returns its slot to the pool.
/// drop(moved);
/// assert_eq!(pool.in_use(), 0);
/// ```
///
/// [1]: Self::take
/// [2]: Self::release
/// [3]: Self::get
/// [4]: Self::get_mut
pub struct Lease<'p, T> {
    binding: Option<Binding<'p, T>>,
}

struct Binding<'p, T> {
    pool: &'p LeasePool<T>,
    index: usize,
}

impl<'p, T> Lease<'p, T> {
    pub(crate) fn new(pool: &'p LeasePool<T>, index: usize) -> Self {
        Self {
            binding: Some(Binding { pool, index }),
        }
    }

    /// Creates a lease that is not bound to any slot.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lease_pool::Lease;
    ///
    /// let lease = Lease::<u32>::empty();
    ///
    /// assert!(!lease.is_valid());
    /// assert_eq!(lease.get(), None);
    /// ```
    #[must_use]
    pub const fn empty() -> Self {
        Self { binding: None }
    }

    /// Whether the lease is currently bound to a slot.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.binding.is_some()
    }

    /// The index of the slot this lease is bound to, or `None` if the lease is empty.
    ///
    /// Indices are stable for as long as the pool is not resized and are in the range
    /// `0..pool.size()`.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.binding.as_ref().map(|binding| binding.index)
    }

    /// A shared reference to the leased value, or `None` if the lease is empty.
    #[must_use]
    pub fn get(&self) -> Option<&T> {
        self.binding.as_ref().map(|binding| {
            // SAFETY: We are the only lease bound to this slot and the pool does not touch a
            // leased slot, so the only references to the value are the ones we hand out. The
            // borrow of `self` prevents an exclusive reference from coexisting with this one.
            unsafe { binding.pool.value(binding.index) }
        })
    }

    /// An exclusive reference to the leased value, or `None` if the lease is empty.
    #[must_use]
    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.binding.as_mut().map(|binding| {
            // SAFETY: We are the only lease bound to this slot and the pool does not touch a
            // leased slot. The exclusive borrow of `self` prevents any other reference to the
            // value from coexisting with this one.
            unsafe { binding.pool.value_mut(binding.index) }
        })
    }

    /// Moves the binding out of this lease into a new lease, leaving this one empty.
    ///
    /// The number of slots in use does not change. This is equivalent to
    /// `std::mem::take(&mut lease)`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lease_pool::LeasePool;
    ///
    /// let mut pool = LeasePool::<u32>::new();
    /// pool.resize(1).unwrap();
    ///
    /// let mut source = pool.acquire_with(|| 7).unwrap();
    /// let target = source.take();
    ///
    /// assert!(!source.is_valid());
    /// assert_eq!(*target, 7);
    /// assert_eq!(pool.in_use(), 1);
    /// ```
    #[must_use]
    pub fn take(&mut self) -> Self {
        Self {
            binding: self.binding.take(),
        }
    }

    /// Returns the slot to the pool now, leaving this lease empty.
    ///
    /// Does nothing if the lease is already empty, so releasing twice is harmless.
    ///
    /// # Example
    ///
    /// ```rust
    /// use lease_pool::LeasePool;
    ///
    /// let mut pool = LeasePool::<u32>::new();
    /// pool.resize(1).unwrap();
    ///
    /// let mut lease = pool.acquire().unwrap();
    ///
    /// lease.release();
    /// assert!(!lease.is_valid());
    /// assert_eq!(pool.available(), 1);
    ///
    /// lease.release();
    /// assert_eq!(pool.available(), 1);
    /// ```
    pub fn release(&mut self) {
        if let Some(binding) = self.binding.take() {
            binding.pool.release(binding.index);
        }
    }
}

impl<T> Default for Lease<'_, T> {
    /// Creates a lease that is not bound to any slot.
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> Deref for Lease<'_, T> {
    type Target = T;

    /// # Panics
    ///
    /// Panics if the lease is empty.
    fn deref(&self) -> &Self::Target {
        self.get().unwrap_or_else(|| {
            panic!(
                "cannot access the value of an empty lease of {}",
                type_name::<T>()
            )
        })
    }
}

impl<T> DerefMut for Lease<'_, T> {
    /// # Panics
    ///
    /// Panics if the lease is empty.
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.get_mut().unwrap_or_else(|| {
            panic!(
                "cannot access the value of an empty lease of {}",
                type_name::<T>()
            )
        })
    }
}

impl<T> Drop for Lease<'_, T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T> fmt::Debug for Lease<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lease")
            .field("item_type", &format_args!("{}", type_name::<T>()))
            .field("index", &self.index())
            .finish()
    }
}
