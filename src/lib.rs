//! # ndims-extract
//!
//! Specializes a C code base written for both 2D and 3D into a single
//! dimensionality. Conditional blocks keyed on a selector macro (`NDIMS`)
//! are resolved in place: the branch for the requested dimensionality is kept
//! without its directives, the other branch is removed, and files left with no
//! content are deleted.
//!
//! ## Quick Start
//!
//! ```bash
//! # Specialize ./src and ./include for 2D
//! ndims-extract 2
//!
//! # Preview the 3D specialization of one directory
//! ndims-extract --dry-run 3 solver/src
//! ```
//!
//! The core is [`filter::DirectiveFilter`], a pure line filter. [`scanner`]
//! applies it to a directory tree and [`cli`] wraps both in a command.

pub mod cli;
pub mod config;
pub mod filter;
pub mod parallel;
pub mod scanner;

pub use cli::{Cli, Output};
pub use config::ExtractConfig;
pub use filter::{Dimensionality, DirectiveFilter, FilterError};
pub use scanner::{RunReport, Specializer};

/// Result type alias for ndims-extract operations
pub type Result<T> = anyhow::Result<T>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
