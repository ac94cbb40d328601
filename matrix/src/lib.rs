//! Integer matrices for the pcmatrix producer/consumer pipeline.
//!
//! `matrix` provides the immutable [`Matrix`] value that producers create and
//! consumers multiply, plus the [`MatrixSource`] implementations producers
//! draw from.
//!
//! # Generation Modes
//!
//! - **Random** (mode `0`): rows and columns each in `1..=4`
//! - **Square** (mode `n` in `1..=64`): every matrix is `n`×`n`
//!
//! Elements are always drawn from `1..=10`.
//!
//! # Example
//!
//! ```
//! use matrix::{GenerationMode, Matrix, MatrixSource, RandomSource};
//!
//! let mut source = RandomSource::seeded(GenerationMode::Square(2), 1);
//! let a = source.next_matrix();
//! let b = source.next_matrix();
//!
//! let c = a.multiply(&b).unwrap();
//! assert_eq!((c.rows(), c.cols()), (2, 2));
//!
//! let tall = Matrix::filled(3, 1, 1);
//! assert!(a.multiply(&tall).is_err());
//! ```

mod error;
mod matrix;
mod source;

pub use error::Error;
pub use matrix::Matrix;
pub use source::{
    GenerationMode, MAX_ELEMENT, MAX_RANDOM_DIM, MAX_SQUARE_DIM, MatrixSource, RandomSource,
    ShapeCycle,
};
