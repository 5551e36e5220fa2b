//! Quarry - fluent query composition for document-oriented search backends
//!
//! Quarry lets calling code assemble a structured search request (filters,
//! full-text queries, scoring functions, facets/aggregations, sorting,
//! pagination) through chained method calls, and lazily materialize it into
//! results.
//!
//! # Quick Start
//!
//! ```ignore
//! use quarry::{scope, Query, Searchable};
//! use serde_json::json;
//!
//! // Reusable fragments, registered once at application wiring time
//! scope::define::<Article, _>("published", |q| {
//!     Ok(q.term(json!({"status": "published"})))
//! });
//!
//! // Compose, then execute lazily on first result access
//! let mut query = Query::<Article>::new()?
//!     .scope("published")?
//!     .match_query(json!({"title": "rust"}))
//!     .page(2)
//!     .per_page(10);
//!
//! let total = query.total()?;
//! for doc in query.iter()? {
//!     // ...
//! }
//! ```
//!
//! # Architecture
//!
//! The builder only accumulates tagged clauses; the boolean tree is built by
//! a request compiler behind the [`Compiler`] trait ([`BoolCompiler`] by
//! default), and the backend call lives behind the owner type's
//! [`Searchable::execute`] hook. The core never retries, wraps, or inspects
//! what the hook returns.

// Re-export the public API from the member crates
pub use quarry_builder::{scope, Query, ScopeFn};
pub use quarry_compile::BoolCompiler;
pub use quarry_core::{
    clause, config, BoolOp, Clause, ClauseArgs, CompileOptions, CompiledRequest, Compiler, Error,
    ExecutionMode, QueryState, Result, ScoreMode, SearchOutcome, Searchable, Target, OP_KEY,
};
