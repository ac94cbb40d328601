//! Per-worker counters and their reduction.

use std::fmt;

use matrix::Matrix;

/// Counters kept by a single producer or consumer thread.
///
/// Owned by the thread that fills it in and handed back through the join
/// handle when the thread exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProdConsStats {
    /// Matrices produced (producer) or withdrawn (consumer).
    pub matrix_total: usize,
    /// Sum of every element of those matrices.
    pub sum_total: i64,
    /// Multiplications performed. Always zero for producers.
    pub mult_total: usize,
}

impl ProdConsStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, matrix: &Matrix) {
        self.count_matrix(matrix.sum());
    }

    pub fn count_matrix(&mut self, sum: i64) {
        self.matrix_total += 1;
        self.sum_total += sum;
    }
}

/// Aggregate of every worker's [`ProdConsStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub produced: usize,
    pub consumed: usize,
    pub produced_sum: i64,
    pub consumed_sum: i64,
    pub multiplied: usize,
}

impl Totals {
    pub fn reduce(producers: &[ProdConsStats], consumers: &[ProdConsStats]) -> Self {
        let mut totals = Self::default();
        for stats in producers {
            totals.produced += stats.matrix_total;
            totals.produced_sum += stats.sum_total;
        }
        for stats in consumers {
            totals.consumed += stats.matrix_total;
            totals.consumed_sum += stats.sum_total;
            totals.multiplied += stats.mult_total;
        }
        totals
    }

    /// `true` when every produced matrix was consumed.
    pub fn is_balanced(&self) -> bool {
        self.produced == self.consumed && self.produced_sum == self.consumed_sum
    }
}

impl fmt::Display for Totals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Sum of Matrix elements --> Produced={} = Consumed={}",
            self.produced_sum, self.consumed_sum
        )?;
        writeln!(
            f,
            "Matrices produced={} consumed={} multiplied={}",
            self.produced, self.consumed, self.multiplied
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(matrix_total: usize, sum_total: i64, mult_total: usize) -> ProdConsStats {
        ProdConsStats {
            matrix_total,
            sum_total,
            mult_total,
        }
    }

    #[test]
    fn record_counts_and_sums() {
        let mut s = ProdConsStats::new();
        s.record(&Matrix::filled(2, 2, 3));
        s.record(&Matrix::filled(1, 3, 1));
        assert_eq!(s, stats(2, 15, 0));
    }

    #[test]
    fn reduce_keeps_sides_separate() {
        let producers = [stats(3, 30, 0), stats(2, 12, 0)];
        let consumers = [stats(4, 40, 2), stats(1, 2, 0)];
        let totals = Totals::reduce(&producers, &consumers);

        assert_eq!(
            totals,
            Totals {
                produced: 5,
                consumed: 5,
                produced_sum: 42,
                consumed_sum: 42,
                multiplied: 2,
            }
        );
        assert!(totals.is_balanced());
    }

    #[test]
    fn imbalance_detected() {
        let totals = Totals::reduce(&[stats(2, 10, 0)], &[stats(2, 9, 1)]);
        assert!(!totals.is_balanced());
    }

    #[test]
    fn report_lines() {
        let totals = Totals {
            produced: 4,
            consumed: 4,
            produced_sum: 64,
            consumed_sum: 64,
            multiplied: 2,
        };
        assert_eq!(
            totals.to_string(),
            "Sum of Matrix elements --> Produced=64 = Consumed=64\n\
             Matrices produced=4 consumed=4 multiplied=2\n"
        );
    }
}
