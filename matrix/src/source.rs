//! Matrix sources used by producers.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::Matrix;

/// Largest row or column count picked in [`GenerationMode::Random`].
pub const MAX_RANDOM_DIM: usize = 4;
/// Largest `n` accepted for [`GenerationMode::Square`].
pub const MAX_SQUARE_DIM: usize = 64;
/// Elements are drawn uniformly from `1..=MAX_ELEMENT`.
pub const MAX_ELEMENT: i64 = 10;

/// Something that hands out a fresh matrix every time it is asked.
///
/// Each producer owns its own source, so implementations only need to be
/// `Send`, not `Sync`.
pub trait MatrixSource: Send {
    fn next_matrix(&mut self) -> Matrix;
}

impl<S: MatrixSource + ?Sized> MatrixSource for Box<S> {
    fn next_matrix(&mut self) -> Matrix {
        (**self).next_matrix()
    }
}

/// Shape policy for generated matrices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    /// Rows and columns each picked in `1..=MAX_RANDOM_DIM`.
    Random,
    /// Every matrix is `n`×`n`, with `n` at most `MAX_SQUARE_DIM`.
    Square(usize),
}

impl From<usize> for GenerationMode {
    /// `0` selects random shapes, any other value a fixed square size.
    fn from(mode: usize) -> Self {
        match mode {
            0 => GenerationMode::Random,
            n => GenerationMode::Square(n),
        }
    }
}

/// Generates matrices with random elements.
pub struct RandomSource<R = StdRng> {
    mode: GenerationMode,
    rng: R,
}

impl RandomSource<StdRng> {
    pub fn from_entropy(mode: GenerationMode) -> Self {
        Self::new(mode, StdRng::from_entropy())
    }

    /// Reproducible source: the same `seed` yields the same matrices.
    pub fn seeded(mode: GenerationMode, seed: u64) -> Self {
        Self::new(mode, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomSource<R> {
    pub fn new(mode: GenerationMode, rng: R) -> Self {
        Self { mode, rng }
    }

    pub fn mode(&self) -> GenerationMode {
        self.mode
    }
}

impl<R: Rng + Send> MatrixSource for RandomSource<R> {
    fn next_matrix(&mut self) -> Matrix {
        let (rows, cols) = match self.mode {
            GenerationMode::Random => (
                self.rng.gen_range(1..=MAX_RANDOM_DIM),
                self.rng.gen_range(1..=MAX_RANDOM_DIM),
            ),
            GenerationMode::Square(n) => (n, n),
        };

        let elements = (0..rows * cols)
            .map(|_| self.rng.gen_range(1..=MAX_ELEMENT))
            .collect();
        Matrix::from_parts(rows, cols, elements)
    }
}

/// Cycles through a fixed list of shapes, filling each matrix with `value`.
///
/// Handy when a run must be predictable, e.g. to force or forbid
/// compatible pairs.
#[derive(Debug, Clone)]
pub struct ShapeCycle {
    shapes: Vec<(usize, usize)>,
    value: i64,
    next: usize,
}

impl ShapeCycle {
    /// # Panics
    ///
    /// Panics if `shapes` is empty.
    pub fn new(shapes: Vec<(usize, usize)>, value: i64) -> Self {
        assert!(!shapes.is_empty(), "ShapeCycle needs at least one shape");
        Self {
            shapes,
            value,
            next: 0,
        }
    }
}

impl MatrixSource for ShapeCycle {
    fn next_matrix(&mut self) -> Matrix {
        let (rows, cols) = self.shapes[self.next];
        self.next = (self.next + 1) % self.shapes.len();
        Matrix::filled(rows, cols, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_from_integer() {
        assert_eq!(GenerationMode::from(0), GenerationMode::Random);
        assert_eq!(GenerationMode::from(3), GenerationMode::Square(3));
    }

    #[test]
    fn random_shapes_stay_in_range() {
        let mut source = RandomSource::seeded(GenerationMode::Random, 7);
        for _ in 0..500 {
            let m = source.next_matrix();
            assert!((1..=MAX_RANDOM_DIM).contains(&m.rows()));
            assert!((1..=MAX_RANDOM_DIM).contains(&m.cols()));
            for r in 0..m.rows() {
                for &v in m.row(r).unwrap() {
                    assert!((1..=MAX_ELEMENT).contains(&v));
                }
            }
        }
    }

    #[test]
    fn square_mode_is_fixed() {
        let mut source = RandomSource::seeded(GenerationMode::Square(3), 1);
        for _ in 0..20 {
            let m = source.next_matrix();
            assert_eq!((m.rows(), m.cols()), (3, 3));
        }
    }

    #[test]
    fn seeded_sources_repeat() {
        let mut a = RandomSource::seeded(GenerationMode::Random, 42);
        let mut b = RandomSource::seeded(GenerationMode::Random, 42);
        for _ in 0..10 {
            assert_eq!(a.next_matrix(), b.next_matrix());
        }
    }

    #[test]
    fn shape_cycle_wraps() {
        let mut source = ShapeCycle::new(vec![(1, 2), (3, 4)], 5);
        let shapes: Vec<_> = (0..5)
            .map(|_| {
                let m = source.next_matrix();
                (m.rows(), m.cols())
            })
            .collect();
        assert_eq!(shapes, vec![(1, 2), (3, 4), (1, 2), (3, 4), (1, 2)]);
    }
}
