//! Producer/consumer matrix multiplication over a shared bounded buffer.
//!
//! `pcmatrix` runs N producer threads and N consumer threads around one
//! [`bounded_buffer::BoundedBuffer`]. Producers generate random matrices until
//! a shared quota is used up. Each consumer withdraws a matrix A, then keeps
//! withdrawing candidates one at a time until it finds a B with
//! `cols(A) == rows(B)`, multiplies them and reports the product.
//!
//! Every worker keeps its own [`ProdConsStats`]; the orchestrator joins all
//! threads and reduces them into [`Totals`]. A correct run produces and
//! consumes the same number of matrices with the same element sum.
//!
//! # Termination
//!
//! - Producers claim one unit of quota before generating each matrix, so
//!   exactly `matrices` are ever produced
//! - The producer that deposits the last matrix closes the buffer
//! - Consumers stop when the buffer is closed and drained, abandoning any
//!   unfinished pairing search
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use pcmatrix::{Config, NullSink};
//!
//! let config = Config::new(2, 4, 100).unwrap().with_seed(1);
//! let totals = pcmatrix::run(&config, |i| config.random_source(i), Arc::new(NullSink)).unwrap();
//!
//! assert_eq!(totals.produced, 100);
//! assert_eq!(totals.consumed, 100);
//! assert_eq!(totals.produced_sum, totals.consumed_sum);
//! ```

mod config;
mod error;
mod pool;
mod sink;
mod stats;
mod worker;

pub use config::{
    Args, Config, DEFAULT_BUFFER_SIZE, DEFAULT_MATRICES, DEFAULT_MODE, DEFAULT_WORKERS,
};
pub use error::Error;
pub use pool::{run, WorkerPool};
pub use sink::{NullSink, ProductSink, StdoutSink};
pub use stats::{ProdConsStats, Totals};
pub use worker::Role;
