#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! A fixed-capacity object pool that lends out its pre-allocated slots through move-only leases.
//!
//! This crate provides [`LeasePool`], a pool with a fixed number of slots that are allocated and
//! filled up front. Callers acquire a [`Lease`] on a free slot, which reconstructs the value in
//! that slot in place and grants exclusive access to it. Dropping the lease returns the slot to
//! the pool, so no allocation or deallocation happens per use.
//!
//! # Key Features
//!
//! - **Fixed capacity**: All slots are allocated when the capacity is set; acquiring and
//!   releasing never allocate
//! - **Exclusive leases**: At most one [`Lease`] exists per slot and a lease cannot be copied
//! - **Returned exactly once**: A slot goes back to the pool when its lease is dropped or
//!   released, and never twice
//! - **Fail clean**: A failed construction or resize leaves the pool exactly as it was
//! - **LIFO reuse**: The most recently released slot is the next one to be leased
//! - **Release policies**: Keep the value of a released slot until it is reused, or drop it
//!   immediately (see [`ReleasePolicy`])
//! - **Thread mobility**: The pool can be moved between threads (but not shared without
//!   synchronization)
//!
//! # Examples
//!
//! ## Basic usage
//!
//! ```rust
//! use lease_pool::LeasePool;
//!
//! let mut pool = LeasePool::<String>::new();
//! pool.resize(5).unwrap();
//!
//! let mut greeting = pool.acquire_with(|| "Hello".to_string()).unwrap();
//! greeting.push_str(", World!");
//! assert_eq!(&*greeting, "Hello, World!");
//!
//! {
//!     // Released back to the pool at the end of the scope.
//!     let _scratch = pool.acquire().unwrap();
//!     assert_eq!(pool.in_use(), 2);
//! }
//!
//! assert_eq!(pool.in_use(), 1);
//! ```
//!
//! ## Handling exhaustion and construction failures
//!
//! ```rust
//! use lease_pool::{Error, LeasePool};
//!
//! let pool = LeasePool::<u16>::builder().capacity(1).build().unwrap();
//!
//! // A failing constructor leaves the pool untouched.
//! let result = pool.try_acquire_with(|| "not a port".parse::<u16>());
//! assert!(matches!(result, Err(Error::ConstructionFailed(_))));
//! assert_eq!(pool.available(), 1);
//!
//! let port = pool.try_acquire_with(|| "443".parse::<u16>()).unwrap();
//!
//! // The only slot is leased out.
//! let result = pool.acquire();
//! assert!(matches!(result, Err(Error::Exhausted { size: 1 })));
//!
//! drop(port);
//! let port = pool.acquire().unwrap();
//! assert_eq!(*port, 0);
//! ```

mod builder;
mod error;
mod free_indices;
mod lease;
mod pool;
mod release_policy;
mod slot_store;

pub use builder::*;
pub use error::Error;
pub(crate) use error::Result;
pub(crate) use free_indices::*;
pub use lease::Lease;
pub use pool::LeasePool;
pub use release_policy::*;
pub(crate) use slot_store::*;
