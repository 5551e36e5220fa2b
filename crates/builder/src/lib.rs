//! Fluent query builder for quarry
//!
//! This crate provides:
//! - Query: the chainable, lazily-executed query builder
//! - scope: the process-wide registry of named and default query fragments
//!
//! Builders are created per owner type (any `quarry_core::Searchable`
//! implementor), mutated through chained calls, and executed at most once
//! per result access thanks to memoization.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod query;
pub mod scope;

pub use query::Query;
pub use scope::ScopeFn;
