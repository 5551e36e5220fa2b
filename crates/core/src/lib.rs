//! Core types and contracts for quarry
//!
//! This crate defines the foundational pieces used throughout the system:
//! - Clause, BoolOp, ClauseArgs, Target: the tagged-clause model
//! - QueryState: accumulated builder state handed to the compiler
//! - CompiledRequest, CompileOptions, ExecutionMode: the execution boundary
//! - Searchable, SearchOutcome, Compiler: external-collaborator contracts
//! - Error: error type hierarchy
//! - config: process-wide tunables

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clause;
pub mod config;
pub mod error;
pub mod request;
pub mod state;
pub mod traits;

// Re-export commonly used types and traits
pub use clause::{hoist_op, normalize, wrap_matcher, BoolOp, Clause, ClauseArgs, Target, OP_KEY};
pub use error::{Error, Result};
pub use request::{CompileOptions, CompiledRequest, ExecutionMode};
pub use state::{QueryState, ScoreMode};
pub use traits::{Compiler, SearchOutcome, Searchable};
