//! Error types for running the pipeline.

use thiserror::Error;

use crate::stats::Totals;
use crate::worker::Role;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    #[error("bounded buffer error: {0}")]
    Buffer(#[from] bounded_buffer::Error),

    #[error("failed to spawn {role} thread {index}: {source}")]
    Spawn {
        role: Role,
        index: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("{role} thread {index} panicked")]
    WorkerPanicked { role: Role, index: usize },

    #[error("totals do not reconcile:\n{0}")]
    Unbalanced(Totals),
}
