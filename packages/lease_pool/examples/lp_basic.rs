//! Basic usage of the `lease_pool` crate:
//!
//! * Creating a pool and giving it capacity.
//! * Acquiring leases with and without constructor arguments.
//! * Returning slots by dropping leases.
//! * Handling an exhausted pool.

use lease_pool::{Error, LeasePool};

#[derive(Debug, Default)]
struct Connection {
    peer: String,
    requests_served: u32,
}

impl Connection {
    fn new(peer: &str) -> Self {
        println!("Connecting to {peer}");

        Self {
            peer: peer.to_string(),
            requests_served: 0,
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if !self.peer.is_empty() {
            println!(
                "Disconnecting from {} after {} requests",
                self.peer, self.requests_served
            );
        }
    }
}

fn main() {
    // Trace output shows the pool resizing itself and rolling back failed constructions.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    let mut pool = LeasePool::<Connection>::new();

    // All the slots are allocated and filled with placeholders here, never again afterwards.
    pool.resize(2).expect("two connections fit in memory");

    println!(
        "Pool has {} slots, {} available",
        pool.size(),
        pool.available()
    );

    let mut primary = pool
        .acquire_with(|| Connection::new("db-primary"))
        .expect("pool has free slots");
    primary.requests_served += 3;

    {
        let replica = pool
            .acquire_with(|| Connection::new("db-replica"))
            .expect("pool has free slots");
        println!("Leased {} in slot {:?}", replica.peer, replica.index());

        // Both slots are now leased out.
        match pool.acquire() {
            Err(Error::Exhausted { size }) => println!("All {size} slots are in use"),
            other => println!("Unexpected result: {other:?}"),
        }

        // The replica lease is dropped here, returning its slot. The connection itself stays
        // alive in the slot until the slot is leased again.
    }

    println!(
        "After releasing the replica: {} in use, {} available",
        pool.in_use(),
        pool.available()
    );

    // The most recently released slot is reused first, so this replaces the replica.
    let cache = pool
        .acquire_with(|| Connection::new("cache"))
        .expect("the replica slot was released");
    println!("Leased {} in slot {:?}", cache.peer, cache.index());

    drop(cache);
    drop(primary);

    println!("All leases returned: pool is full again = {}", pool.is_full());
}
