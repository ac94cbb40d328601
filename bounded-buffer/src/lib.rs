//! A blocking bounded buffer with a shared termination protocol.
//!
//! `bounded-buffer` provides the two pieces of shared state a pool of
//! producers and consumers needs to run a fixed amount of work and then stop
//! cleanly:
//!
//! - [`BoundedBuffer`]: a fixed-capacity circular FIFO whose `put` blocks
//!   while full and whose `get` blocks while empty, returning `None` once the
//!   buffer is closed and drained
//! - [`TerminationCoordinator`]: production and consumption quotas, claimed
//!   one item at a time under a lock so the totals are exact
//!
//! # Protocol
//!
//! 1. A producer calls [`TerminationCoordinator::try_claim_production`] before
//!    creating each item and stops on [`Claim::Done`]
//! 2. After each successful `put` it calls
//!    [`TerminationCoordinator::record_deposit`]; whoever sees it return
//!    `true` closes the buffer
//! 3. Consumers `get` until they receive `None`
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//!
//! use bounded_buffer::{BoundedBuffer, Claim, TerminationCoordinator};
//!
//! let buffer = Arc::new(BoundedBuffer::new(2).unwrap());
//! let quota = Arc::new(TerminationCoordinator::new(5));
//!
//! let producer = {
//!     let (buffer, quota) = (Arc::clone(&buffer), Arc::clone(&quota));
//!     thread::spawn(move || {
//!         while let Claim::Proceed(n) = quota.try_claim_production() {
//!             buffer.put(n).unwrap();
//!             if quota.record_deposit() {
//!                 buffer.close();
//!             }
//!         }
//!     })
//! };
//!
//! let mut received = Vec::new();
//! while let Some(n) = buffer.get() {
//!     received.push(n);
//! }
//! producer.join().unwrap();
//! assert_eq!(received, vec![1, 2, 3, 4, 5]);
//! ```

mod buffer;
mod error;
mod termination;

pub use buffer::BoundedBuffer;
pub use error::{Closed, Error};
pub use termination::{Claim, TerminationCoordinator};
