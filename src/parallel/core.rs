use anyhow::Result;
use crossbeam::channel::{Receiver, Sender, bounded};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// How the caller wants work distributed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Parallel only once the workload reaches the configured threshold
    #[default]
    Auto,
    Sequential,
    Parallel,
}

/// Producer/worker pool over bounded crossbeam channels
///
/// Results come back in the order of the work items, whatever order the
/// workers finish them in.
pub struct ParallelExecutor {
    max_workers: usize,
    buffer_size: usize,
}

/// Everything a worker thread needs, bundled to keep the spawn site short
struct WorkerContext<T, R, F, P> {
    work_rx: Receiver<(usize, T)>,
    result_tx: Sender<(usize, R)>,
    progress_counter: Arc<AtomicUsize>,
    total_items: usize,
    processor: Arc<F>,
    progress_reporter: Option<Arc<P>>,
}

impl ParallelExecutor {
    pub fn new(max_workers: usize) -> Self {
        let max_workers = max_workers.max(1);
        Self {
            max_workers,
            buffer_size: max_workers * 2,
        }
    }

    pub fn execute<T, R, F, P>(&self, work_items: Vec<T>, processor: F, progress_reporter: Option<P>) -> Result<Vec<R>>
    where
        T: Send,
        R: Send,
        F: Fn(&T) -> R + Send + Sync,
        P: Fn(usize, usize) + Send + Sync, // (current, total)
    {
        if work_items.is_empty() {
            return Ok(Vec::new());
        }

        let total_items = work_items.len();
        let workers = self.max_workers.min(total_items);
        let (work_tx, work_rx) = bounded::<(usize, T)>(self.buffer_size);
        let (result_tx, result_rx) = bounded::<(usize, R)>(self.buffer_size);

        let progress_counter = Arc::new(AtomicUsize::new(0));
        let processor = Arc::new(processor);
        let progress_reporter = progress_reporter.map(Arc::new);

        tracing::debug!(workers, items = total_items, "starting parallel execution");

        let mut indexed = crossbeam::thread::scope(|s| {
            for _ in 0..workers {
                let ctx = WorkerContext {
                    work_rx: work_rx.clone(),
                    result_tx: result_tx.clone(),
                    progress_counter: progress_counter.clone(),
                    total_items,
                    processor: processor.clone(),
                    progress_reporter: progress_reporter.clone(),
                };
                s.spawn(move |_| Self::worker_thread(ctx));
            }

            // Producer
            s.spawn(move |_| {
                for item in work_items.into_iter().enumerate() {
                    if work_tx.send(item).is_err() {
                        break; // Workers dropped
                    }
                }
            });

            // Receivers see the channel close once every worker is done
            drop(work_rx);
            drop(result_tx);

            result_rx.iter().take(total_items).collect::<Vec<_>>()
        })
        .map_err(|_| anyhow::anyhow!("Thread panic occurred during parallel execution"))?;

        if indexed.len() != total_items {
            anyhow::bail!("parallel execution returned {} of {} results", indexed.len(), total_items);
        }

        indexed.sort_by_key(|(index, _)| *index);
        Ok(indexed.into_iter().map(|(_, result)| result).collect())
    }

    fn worker_thread<T, R, F, P>(ctx: WorkerContext<T, R, F, P>)
    where
        F: Fn(&T) -> R,
        P: Fn(usize, usize),
    {
        while let Ok((index, item)) = ctx.work_rx.recv() {
            let result = (ctx.processor)(&item);
            if ctx.result_tx.send((index, result)).is_err() {
                break; // Collector dropped
            }

            let current = ctx.progress_counter.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(reporter) = &ctx.progress_reporter {
                reporter(current, ctx.total_items);
            }
        }
    }
}

/// Single-threaded fallback with the same contract as [`ParallelExecutor`]
pub struct SequentialExecutor;

impl SequentialExecutor {
    pub fn execute<T, R, F, P>(work_items: Vec<T>, processor: F, progress_reporter: Option<P>) -> Vec<R>
    where
        F: Fn(&T) -> R,
        P: Fn(usize, usize),
    {
        let total_items = work_items.len();
        work_items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let result = processor(item);
                if let Some(reporter) = &progress_reporter {
                    reporter(index + 1, total_items);
                }
                result
            })
            .collect()
    }
}

/// Execution strategy chosen for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStrategy {
    Sequential,
    Parallel { workers: usize },
}

impl ExecutionStrategy {
    pub fn execute<T, R, F, P>(&self, work_items: Vec<T>, processor: F, progress_reporter: Option<P>) -> Result<Vec<R>>
    where
        T: Send,
        R: Send,
        F: Fn(&T) -> R + Send + Sync,
        P: Fn(usize, usize) + Send + Sync,
    {
        match self {
            ExecutionStrategy::Sequential => Ok(SequentialExecutor::execute(work_items, processor, progress_reporter)),
            ExecutionStrategy::Parallel { workers } => {
                ParallelExecutor::new(*workers).execute(work_items, processor, progress_reporter)
            }
        }
    }

    /// Threshold decision between sequential and parallel execution
    ///
    /// ```rust
    /// use ndims_extract::parallel::ExecutionStrategy;
    ///
    /// assert!(matches!(ExecutionStrategy::auto(10, 50, 8), ExecutionStrategy::Sequential));
    /// assert!(matches!(ExecutionStrategy::auto(100, 50, 8), ExecutionStrategy::Parallel { workers: 8 }));
    /// ```
    pub fn auto(work_items_count: usize, min_items_for_parallel: usize, optimal_workers: usize) -> Self {
        if work_items_count >= min_items_for_parallel && optimal_workers > 1 {
            ExecutionStrategy::Parallel { workers: optimal_workers }
        } else {
            ExecutionStrategy::Sequential
        }
    }

    /// Resolve a configured mode into a concrete strategy for `work_items_count` items
    pub fn for_mode(
        mode: ExecutionMode,
        work_items_count: usize,
        min_items_for_parallel: usize,
        max_threads: usize,
        thread_percentage: u8,
    ) -> Self {
        let workers = Self::calculate_optimal_workers(max_threads, thread_percentage);
        match mode {
            ExecutionMode::Sequential => ExecutionStrategy::Sequential,
            ExecutionMode::Parallel => ExecutionStrategy::Parallel { workers },
            ExecutionMode::Auto => Self::auto(work_items_count, min_items_for_parallel, workers),
        }
    }

    /// Workers available given the core count and user limits
    ///
    /// `max_threads_config` of 0 means no limit beyond `thread_percentage` of
    /// the available cores. The result is never below 1.
    pub fn calculate_optimal_workers(max_threads_config: usize, thread_percentage: u8) -> usize {
        let available_cores = num_cpus::get();
        let workers_by_percentage = std::cmp::max(1, (available_cores * thread_percentage as usize) / 100);

        if max_threads_config > 0 {
            std::cmp::min(max_threads_config, workers_by_percentage)
        } else {
            workers_by_percentage
        }
    }
}
