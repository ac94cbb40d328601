//! Command-line arguments and the validated run configuration.

use clap::Parser;
use matrix::{GenerationMode, RandomSource, MAX_SQUARE_DIM};

use crate::Error;

pub const DEFAULT_WORKERS: usize = 1;
pub const DEFAULT_BUFFER_SIZE: usize = 200;
pub const DEFAULT_MATRICES: usize = 1200;
pub const DEFAULT_MODE: usize = 0;

/// Producer/consumer matrix multiplication over a shared bounded buffer.
#[derive(Parser, Debug, Clone)]
#[command(name = "pcmatrix", version, about)]
pub struct Args {
    /// Number of producer/consumer thread pairs [default: 1]
    pub workers: Option<usize>,

    /// Capacity of the shared bounded buffer [default: 200]
    pub buffer_size: Option<usize>,

    /// Total number of matrices to produce [default: 1200]
    pub matrices: Option<usize>,

    /// Matrix generation mode: 0 for random shapes, 1..=64 for n×n [default: 0]
    pub mode: Option<usize>,

    /// Do not print multiplication results
    #[arg(short, long)]
    pub quiet: bool,

    /// Seed for reproducible matrix generation
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Args {
    /// `true` when no positional argument was given.
    pub fn uses_defaults(&self) -> bool {
        self.workers.is_none()
            && self.buffer_size.is_none()
            && self.matrices.is_none()
            && self.mode.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub workers: usize,
    pub buffer_size: usize,
    pub matrices: usize,
    pub mode: usize,
    pub seed: Option<u64>,
    pub quiet: bool,
}

impl Config {
    /// Validated configuration with random shapes, no seed and quiet output.
    pub fn new(workers: usize, buffer_size: usize, matrices: usize) -> Result<Self, Error> {
        let config = Self {
            workers,
            buffer_size,
            matrices,
            mode: DEFAULT_MODE,
            seed: None,
            quiet: true,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_mode(mut self, mode: usize) -> Result<Self, Error> {
        self.mode = mode;
        self.validate()?;
        Ok(self)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn generation_mode(&self) -> GenerationMode {
        GenerationMode::from(self.mode)
    }

    /// Builds the matrix source for producer `worker`.
    ///
    /// With a seed, each producer gets its own reproducible stream.
    pub fn random_source(&self, worker: usize) -> RandomSource {
        match self.seed {
            Some(seed) => {
                RandomSource::seeded(self.generation_mode(), seed.wrapping_add(worker as u64))
            }
            None => RandomSource::from_entropy(self.generation_mode()),
        }
    }

    fn validate(&self) -> Result<(), Error> {
        if self.workers == 0 {
            return Err(Error::InvalidConfig("at least one worker pair is required"));
        }
        if self.buffer_size == 0 {
            return Err(Error::InvalidConfig("buffer size must be at least 1"));
        }
        if self.mode > MAX_SQUARE_DIM {
            return Err(Error::InvalidConfig("matrix mode must be between 0 and 64"));
        }
        Ok(())
    }
}

impl TryFrom<Args> for Config {
    type Error = Error;

    fn try_from(args: Args) -> Result<Self, Error> {
        let config = Self {
            workers: args.workers.unwrap_or(DEFAULT_WORKERS),
            buffer_size: args.buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE),
            matrices: args.matrices.unwrap_or(DEFAULT_MATRICES),
            mode: args.mode.unwrap_or(DEFAULT_MODE),
            seed: args.seed,
            quiet: args.quiet,
        };
        config.validate()?;
        Ok(config)
    }
}
