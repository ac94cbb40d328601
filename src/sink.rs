//! Where consumers send the products they compute.

use std::io::{self, Write};

use matrix::Matrix;
use tracing::debug;

/// Receives every successful multiplication `a × b = c`.
///
/// Called concurrently from every consumer thread.
pub trait ProductSink: Send + Sync {
    fn product(&self, a: &Matrix, b: &Matrix, c: &Matrix);
}

/// Prints each product to stdout.
///
/// The stdout lock is held for the whole product so output from different
/// consumers never interleaves.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl ProductSink for StdoutSink {
    fn product(&self, a: &Matrix, b: &Matrix, c: &Matrix) {
        let mut out = io::stdout().lock();
        if let Err(e) = write!(out, "{a}    X\n{b}    =\n{c}\n") {
            debug!(error = %e, "failed to display product");
        }
    }
}

/// Discards every product.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProductSink for NullSink {
    fn product(&self, _a: &Matrix, _b: &Matrix, _c: &Matrix) {}
}
