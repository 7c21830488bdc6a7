use std::marker::PhantomData;

use crate::{LeasePool, ReleasePolicy, Result};

/// Builder for creating an instance of [`LeasePool`].
///
/// You only need to use this builder if you want to set the initial capacity or customize the
/// pool configuration. [`LeasePool::new()`][1] creates a pool without any slots, using the default
/// configuration.
///
/// # Examples
///
/// ```
/// use lease_pool::{LeasePool, ReleasePolicy};
///
/// let pool = LeasePool::<u32>::builder()
///     .capacity(8)
///     .release_policy(ReleasePolicy::RetainContents)
///     .build()
///     .unwrap();
///
/// assert_eq!(pool.size(), 8);
/// ```
///
/// [1]: LeasePool::new
#[must_use]
pub struct LeasePoolBuilder<T> {
    capacity: usize,
    release_policy: ReleasePolicy,

    _item: PhantomData<T>,
}

impl<T> std::fmt::Debug for LeasePoolBuilder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeasePoolBuilder")
            .field(
                "item_type",
                &std::format_args!("{}", std::any::type_name::<T>()),
            )
            .field("capacity", &self.capacity)
            .field("release_policy", &self.release_policy)
            .finish()
    }
}

impl<T> LeasePoolBuilder<T> {
    pub(crate) fn new() -> Self {
        Self {
            capacity: 0,
            release_policy: ReleasePolicy::default(),
            _item: PhantomData,
        }
    }

    /// Sets the number of slots the pool is created with. Defaults to zero.
    ///
    /// The capacity can later be changed via [`LeasePool::resize()`] and its variants.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the [release policy][ReleasePolicy] for the pool. This governs what happens to the
    /// value in a slot when its lease is released.
    ///
    /// # Examples
    ///
    /// ```
    /// use lease_pool::{LeasePool, ReleasePolicy};
    ///
    /// let pool = LeasePool::<u32>::builder()
    ///     .release_policy(ReleasePolicy::DropContents)
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(pool.release_policy(), ReleasePolicy::DropContents);
    /// ```
    pub fn release_policy(mut self, policy: ReleasePolicy) -> Self {
        self.release_policy = policy;
        self
    }

    /// Builds the pool with the specified configuration, filling every slot with a value from
    /// `T::default()`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`][crate::Error::AllocationFailed] if storage for the
    /// requested capacity cannot be allocated.
    ///
    /// # Examples
    ///
    /// ```
    /// use lease_pool::LeasePool;
    ///
    /// let pool = LeasePool::<u32>::builder().capacity(2).build().unwrap();
    ///
    /// assert_eq!(pool.available(), 2);
    /// ```
    pub fn build(self) -> Result<LeasePool<T>>
    where
        T: Default,
    {
        self.build_with(T::default)
    }

    /// Builds the pool with the specified configuration, filling every slot with a value from
    /// `factory`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`][crate::Error::AllocationFailed] if storage for the
    /// requested capacity cannot be allocated.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::net::{Ipv4Addr, SocketAddrV4};
    ///
    /// use lease_pool::LeasePool;
    ///
    /// let pool = LeasePool::builder()
    ///     .capacity(4)
    ///     .build_with(|| SocketAddrV4::new(Ipv4Addr::LOCALHOST, 0))
    ///     .unwrap();
    ///
    /// assert_eq!(pool.size(), 4);
    /// ```
    pub fn build_with(self, factory: impl FnMut() -> T) -> Result<LeasePool<T>> {
        let mut pool = LeasePool::new_inner(self.release_policy);
        pool.resize_with(self.capacity, factory)?;
        Ok(pool)
    }
}
