/// Determines what happens to the contents of a slot when its lease is released.
///
/// By default, the pool retains the contents of a released slot until the slot is leased again,
/// at which point the old value is dropped and a new one is constructed in its place.
///
/// # Examples
///
/// ```
/// use lease_pool::{LeasePool, ReleasePolicy};
///
/// let pool = LeasePool::<String>::builder()
///     .capacity(4)
///     .release_policy(ReleasePolicy::DropContents)
///     .build()
///     .unwrap();
///
/// assert_eq!(pool.release_policy(), ReleasePolicy::DropContents);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum ReleasePolicy {
    /// A released slot keeps the value of its last lease. The value is dropped only when the
    /// slot is leased again, when the pool is resized or when the pool itself is dropped.
    /// This is the default.
    #[default]
    RetainContents,

    /// A released slot has its value dropped immediately, as part of releasing the lease.
    ///
    /// This may be valuable if the pooled values hold on to external resources (file handles,
    /// large buffers) that should not outlive the lease.
    DropContents,
}
