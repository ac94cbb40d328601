//! Worker thread pool and the top-level run.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use bounded_buffer::{BoundedBuffer, TerminationCoordinator};
use matrix::{Matrix, MatrixSource};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::sink::ProductSink;
use crate::stats::{ProdConsStats, Totals};
use crate::worker::{self, Role, Shared};
use crate::Error;

/// Producer and consumer threads sharing one buffer and one coordinator.
///
/// Threads start as soon as they are spawned. [`join`](Self::join) waits for
/// all of them and reduces their statistics; [`abort`](Self::abort) releases
/// every blocked thread so a partially started pool can be torn down.
pub struct WorkerPool {
    shared: Arc<Shared>,
    producers: Vec<JoinHandle<ProdConsStats>>,
    consumers: Vec<JoinHandle<ProdConsStats>>,
}

impl WorkerPool {
    /// Allocates the buffer and coordinator. No thread is started.
    pub fn new(buffer_size: usize, target: usize) -> Result<Self, Error> {
        let buffer = BoundedBuffer::new(buffer_size)?;
        let coordinator = TerminationCoordinator::new(target);
        Ok(Self {
            shared: Arc::new(Shared::new(buffer, coordinator)),
            producers: Vec::new(),
            consumers: Vec::new(),
        })
    }

    pub fn spawn_producer<S>(&mut self, source: S) -> Result<(), Error>
    where
        S: MatrixSource + 'static,
    {
        let index = self.producers.len();
        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name(format!("producer-{index}"))
            .spawn(move || worker::produce(index, &shared, source))
            .map_err(|source| Error::Spawn {
                role: Role::Producer,
                index,
                source,
            })?;
        self.producers.push(handle);
        Ok(())
    }

    pub fn spawn_consumer(&mut self, sink: Arc<dyn ProductSink>) -> Result<(), Error> {
        let index = self.consumers.len();
        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name(format!("consumer-{index}"))
            .spawn(move || worker::consume(index, &shared, sink.as_ref()))
            .map_err(|source| Error::Spawn {
                role: Role::Consumer,
                index,
                source,
            })?;
        self.consumers.push(handle);
        Ok(())
    }

    /// Stops the run: no further production claims succeed and the buffer
    /// is closed, so blocked producers and consumers return.
    pub fn abort(&self) {
        warn!("aborting worker pool");
        self.shared.abort();
    }

    /// Aborts, joins every started thread and returns `cause`.
    pub fn shutdown(self, cause: Error) -> Error {
        self.abort();
        if let Err(e) = self.join() {
            warn!(error = %e, "error while joining aborted pool");
        }
        cause
    }

    pub fn buffer(&self) -> &BoundedBuffer<Matrix> {
        &self.shared.buffer
    }

    pub fn coordinator(&self) -> &TerminationCoordinator {
        &self.shared.coordinator
    }

    /// Waits for every thread and reduces their statistics.
    ///
    /// Producers are joined first. If any thread panicked the run has
    /// already been aborted by that thread; the first panic is reported
    /// once every other thread has been joined.
    pub fn join(self) -> Result<Totals, Error> {
        let mut first_panic = None;
        let producers = join_all(Role::Producer, self.producers, &mut first_panic);
        let consumers = join_all(Role::Consumer, self.consumers, &mut first_panic);

        match first_panic {
            Some(e) => Err(e),
            None => Ok(Totals::reduce(&producers, &consumers)),
        }
    }
}

fn join_all(
    role: Role,
    handles: Vec<JoinHandle<ProdConsStats>>,
    first_panic: &mut Option<Error>,
) -> Vec<ProdConsStats> {
    let mut stats = Vec::with_capacity(handles.len());
    for (index, handle) in handles.into_iter().enumerate() {
        match handle.join() {
            Ok(s) => stats.push(s),
            Err(_) => {
                error!(%role, index, "worker thread panicked");
                if first_panic.is_none() {
                    *first_panic = Some(Error::WorkerPanicked { role, index });
                }
            }
        }
    }
    stats
}

/// Runs a full producer/consumer session.
///
/// Starts `config.workers` producers, each drawing from `make_source(i)`,
/// and as many consumers reporting products to `sink`, then waits for all of
/// them. If a thread cannot be spawned the threads already running are
/// stopped and joined before the error is returned.
pub fn run<F, S>(
    config: &Config,
    mut make_source: F,
    sink: Arc<dyn ProductSink>,
) -> Result<Totals, Error>
where
    F: FnMut(usize) -> S,
    S: MatrixSource + 'static,
{
    let mut pool = WorkerPool::new(config.buffer_size, config.matrices)?;
    info!(
        workers = config.workers,
        buffer_size = config.buffer_size,
        matrices = config.matrices,
        mode = config.mode,
        "starting worker pool"
    );

    for i in 0..config.workers {
        if let Err(e) = pool.spawn_producer(make_source(i)) {
            return Err(pool.shutdown(e));
        }
    }
    for _ in 0..config.workers {
        if let Err(e) = pool.spawn_consumer(Arc::clone(&sink)) {
            return Err(pool.shutdown(e));
        }
    }

    let totals = pool.join()?;
    info!(
        produced = totals.produced,
        consumed = totals.consumed,
        multiplied = totals.multiplied,
        "worker pool finished"
    );

    if !totals.is_balanced() {
        error!("produced and consumed totals differ");
        return Err(Error::Unbalanced(totals));
    }
    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::NullSink;
    use matrix::ShapeCycle;
    use std::time::Duration;

    #[test]
    fn abort_releases_producers_blocked_on_full_buffer() {
        let mut pool = WorkerPool::new(1, 100).unwrap();
        for _ in 0..3 {
            pool.spawn_producer(ShapeCycle::new(vec![(2, 2)], 1)).unwrap();
        }

        thread::sleep(Duration::from_millis(50));
        assert_eq!(pool.buffer().len(), 1);

        pool.abort();
        let totals = pool.join().unwrap();
        assert_eq!(totals.produced, 1);
        assert_eq!(totals.consumed, 0);
    }

    #[test]
    fn abort_releases_idle_consumers() {
        let mut pool = WorkerPool::new(4, 10).unwrap();
        for _ in 0..2 {
            pool.spawn_consumer(Arc::new(NullSink)).unwrap();
        }

        thread::sleep(Duration::from_millis(20));
        pool.abort();
        let totals = pool.join().unwrap();
        assert_eq!(totals, Totals::default());
    }

    #[test]
    fn shutdown_returns_cause() {
        let mut pool = WorkerPool::new(2, 50).unwrap();
        pool.spawn_producer(ShapeCycle::new(vec![(1, 1)], 1)).unwrap();
        let cause = Error::InvalidConfig("spawn failed");
        assert!(matches!(pool.shutdown(cause), Error::InvalidConfig(_)));
    }

    struct Exploding;

    impl MatrixSource for Exploding {
        fn next_matrix(&mut self) -> Matrix {
            panic!("source exhausted");
        }
    }

    #[test]
    fn panicking_producer_is_reported_without_hanging() {
        let mut pool = WorkerPool::new(2, 10).unwrap();
        pool.spawn_producer(Exploding).unwrap();
        pool.spawn_consumer(Arc::new(NullSink)).unwrap();

        assert!(matches!(
            pool.join(),
            Err(Error::WorkerPanicked {
                role: Role::Producer,
                index: 0
            })
        ));
    }

    #[test]
    fn run_reconciles_totals() {
        let config = Config::new(2, 3, 40).unwrap().with_seed(11);
        let totals = run(&config, |i| config.random_source(i), Arc::new(NullSink)).unwrap();
        assert_eq!(totals.produced, 40);
        assert_eq!(totals.consumed, 40);
        assert_eq!(totals.produced_sum, totals.consumed_sum);
    }
}
