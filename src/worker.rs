//! Producer and consumer control loops.

use std::fmt;
use std::thread;

use bounded_buffer::{BoundedBuffer, Claim, TerminationCoordinator};
use matrix::{Matrix, MatrixSource};
use tracing::{debug, trace, warn};

use crate::sink::ProductSink;
use crate::stats::ProdConsStats;

/// Which side of the buffer a worker thread runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Producer,
    Consumer,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Producer => f.write_str("producer"),
            Role::Consumer => f.write_str("consumer"),
        }
    }
}

/// State shared by every worker of one run.
pub struct Shared {
    pub buffer: BoundedBuffer<Matrix>,
    pub coordinator: TerminationCoordinator,
}

impl Shared {
    pub fn new(buffer: BoundedBuffer<Matrix>, coordinator: TerminationCoordinator) -> Self {
        Self {
            buffer,
            coordinator,
        }
    }

    /// Stops the run early: no new claims, and every blocked worker is
    /// released.
    pub fn abort(&self) {
        self.coordinator.cancel();
        self.buffer.close();
    }
}

/// Aborts the run if the owning worker unwinds.
///
/// Without it a panicking producer would never deposit its claimed matrix
/// and the buffer would never close.
struct AbortOnPanic<'a> {
    shared: &'a Shared,
    role: Role,
    index: usize,
}

impl Drop for AbortOnPanic<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            warn!(role = %self.role, index = self.index, "worker panicked, aborting run");
            self.shared.abort();
        }
    }
}

/// Runs one producer until the production quota is exhausted.
pub fn produce<S: MatrixSource>(index: usize, shared: &Shared, mut source: S) -> ProdConsStats {
    let _guard = AbortOnPanic {
        shared,
        role: Role::Producer,
        index,
    };
    let mut stats = ProdConsStats::new();

    while let Claim::Proceed(ordinal) = shared.coordinator.try_claim_production() {
        let matrix = source.next_matrix();
        let sum = matrix.sum();
        trace!(
            producer = index,
            ordinal,
            rows = matrix.rows(),
            cols = matrix.cols(),
            "produced matrix"
        );

        if shared.buffer.put(matrix).is_err() {
            debug!(producer = index, ordinal, "buffer closed, matrix dropped");
            return stats;
        }
        stats.count_matrix(sum);

        if shared.coordinator.record_deposit() {
            shared.buffer.close();
        }
    }

    // Covers a zero target and runs where this producer lost the race for
    // the final claim after the last deposit already happened.
    if shared.coordinator.is_production_finished() {
        shared.buffer.close();
    }

    debug!(
        producer = index,
        produced = stats.matrix_total,
        "producer finished"
    );
    stats
}

/// Runs one consumer until the consumption quota is exhausted or the buffer
/// reports that no more matrices will arrive.
///
/// Each iteration withdraws a matrix A and then keeps withdrawing candidates
/// until one can be multiplied with A. Rejected candidates are dropped but
/// still counted as consumed.
pub fn consume(index: usize, shared: &Shared, sink: &dyn ProductSink) -> ProdConsStats {
    let _guard = AbortOnPanic {
        shared,
        role: Role::Consumer,
        index,
    };
    let mut stats = ProdConsStats::new();

    while !shared.coordinator.is_consumption_finished() {
        let Some(a) = shared.buffer.get() else {
            break;
        };
        stats.record(&a);
        let mut withdrawn = 1;
        let mut paired = false;

        while let Some(b) = shared.buffer.get() {
            withdrawn += 1;
            stats.record(&b);

            // A mismatch is the "no result" path: drop B and keep searching.
            match a.multiply(&b) {
                Ok(c) => {
                    sink.product(&a, &b, &c);
                    stats.mult_total += 1;
                    paired = true;
                    break;
                }
                Err(e) => trace!(consumer = index, error = %e, "rejected candidate"),
            }
        }

        if !paired {
            debug!(consumer = index, withdrawn, "pairing search abandoned");
        }
        shared.coordinator.record_consumption(withdrawn);
    }

    debug!(
        consumer = index,
        consumed = stats.matrix_total,
        multiplied = stats.mult_total,
        "consumer finished"
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use matrix::ShapeCycle;
    use std::sync::Mutex;

    fn shared(capacity: usize, target: usize) -> Shared {
        Shared::new(
            BoundedBuffer::new(capacity).unwrap(),
            TerminationCoordinator::new(target),
        )
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(usize, usize)>>);

    impl ProductSink for Recorder {
        fn product(&self, _a: &Matrix, _b: &Matrix, c: &Matrix) {
            self.0.lock().unwrap().push((c.rows(), c.cols()));
        }
    }

    #[test]
    fn producer_fills_quota_and_closes() {
        let shared = shared(8, 5);
        let stats = produce(0, &shared, ShapeCycle::new(vec![(2, 2)], 1));

        assert_eq!(stats.matrix_total, 5);
        assert_eq!(stats.sum_total, 20);
        assert_eq!(shared.buffer.len(), 5);
        assert!(shared.buffer.is_closed());
        assert!(shared.coordinator.is_production_finished());
    }

    #[test]
    fn producer_with_zero_target_closes() {
        let shared = shared(2, 0);
        let stats = produce(0, &shared, ShapeCycle::new(vec![(1, 1)], 1));
        assert_eq!(stats, ProdConsStats::default());
        assert!(shared.buffer.is_closed());
    }

    #[test]
    fn producer_stops_when_aborted() {
        let shared = shared(4, 10);
        shared.abort();
        let stats = produce(0, &shared, ShapeCycle::new(vec![(1, 1)], 1));
        assert_eq!(stats.matrix_total, 0);
        assert!(shared.buffer.is_empty());
    }

    #[test]
    fn consumer_pairs_and_records_everything() {
        let shared = shared(8, 5);
        // 2x3 * 2x3 rejected, 2x3 * 3x1 accepted, then 1x1 * 1x1 accepted.
        produce(
            0,
            &shared,
            ShapeCycle::new(vec![(2, 3), (2, 3), (3, 1), (1, 1), (1, 1)], 1),
        );
        let sink = Recorder::default();
        let stats = consume(0, &shared, &sink);

        assert_eq!(stats.matrix_total, 5);
        assert_eq!(stats.sum_total, 6 + 6 + 3 + 1 + 1);
        assert_eq!(stats.mult_total, 2);
        assert_eq!(*sink.0.lock().unwrap(), vec![(2, 1), (1, 1)]);
        assert_eq!(shared.coordinator.consumed(), 5);
    }

    #[test]
    fn consumer_abandons_search_at_end_of_data() {
        let shared = shared(4, 3);
        produce(0, &shared, ShapeCycle::new(vec![(2, 3)], 2));
        let sink = Recorder::default();
        let stats = consume(0, &shared, &sink);

        assert_eq!(stats.matrix_total, 3);
        assert_eq!(stats.mult_total, 0);
        assert!(sink.0.lock().unwrap().is_empty());
        assert_eq!(shared.coordinator.consumed(), 3);
    }
}
