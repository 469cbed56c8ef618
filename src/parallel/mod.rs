//! Generic parallel execution framework
//!
//! Files are specialized independently of one another, so reading and
//! filtering can be spread across worker threads. This module only decides
//! *how* work runs; it knows nothing about sources or directives.
//!
//! ## What This Module Does:
//! - **Resource Discovery**: Detects available CPU cores using `num_cpus::get()`
//! - **Resource Calculation**: Applies user limits (thread percentage, max threads)
//! - **Execution Strategy**: Sequential or parallel execution with ordered results
//!
//! ```text
//! ┌─────────────────┐    ┌──────────────────┐    ┌─────────────────┐
//! │   Client        │    │   Parallel       │    │   System        │
//! │  (Specializer)  │───▶│   Module         │───▶│   Resources     │
//! │                 │    │                  │    │                 │
//! │ • File list     │    │ • CPU cores      │    │ • Hardware      │
//! │ • Filtering     │    │ • Thread mgmt    │    │ • OS limits     │
//! └─────────────────┘    └──────────────────┘    └─────────────────┘
//! ```
//!
//! # Example Usage
//!
//! ```rust
//! use ndims_extract::parallel::ExecutionStrategy;
//!
//! let strategy = ExecutionStrategy::auto(100, 50, 4);
//! let doubled = strategy.execute(vec![1, 2, 3], |x| x * 2, None::<fn(usize, usize)>).unwrap();
//! assert_eq!(doubled, vec![2, 4, 6]);
//! ```

pub mod core;

pub use core::{ExecutionMode, ExecutionStrategy, ParallelExecutor, SequentialExecutor};
