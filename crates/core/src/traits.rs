//! Boundary traits for the query layer's external collaborators
//!
//! This module defines the contracts the core needs from the outside world:
//! - Searchable: the owner type (configured identifiers + execution hook)
//! - SearchOutcome: what an executed search exposes to the accessors
//! - Compiler: translation of accumulated state into the backend's format
//!
//! The concrete wire call, retry policy, and result deserialization all live
//! behind [`Searchable::execute`]; the query layer neither retries nor wraps
//! what the hook returns.

use crate::error::Result;
use crate::request::{CompileOptions, CompiledRequest};
use crate::state::QueryState;
use serde_json::Value;

/// Outcome of one executed search
///
/// Implementations wrap whatever the backend returned and expose the accesses
/// the builder's convenience accessors need: total count, ordered documents,
/// first/last, and full materialization.
pub trait SearchOutcome {
    /// Materialized document type
    type Doc;

    /// Total hit count reported by the backend
    fn total(&self) -> u64;

    /// Ordered documents of this outcome
    fn docs(&self) -> &[Self::Doc];

    /// First document, if any
    fn first(&self) -> Option<&Self::Doc> {
        self.docs().first()
    }

    /// Last document, if any
    fn last(&self) -> Option<&Self::Doc> {
        self.docs().last()
    }

    /// Materialize all documents into an owned sequence
    fn to_vec(&self) -> Vec<Self::Doc>
    where
        Self::Doc: Clone,
    {
        self.docs().to_vec()
    }

    /// Raw projected field values, populated by field-extraction executions
    fn projected(&self) -> Vec<Value> {
        Vec::new()
    }
}

/// Owner type contract
///
/// A `Searchable` type names the backend resources it lives in and performs
/// the actual search call. One blocking call per execution; cancellation and
/// timeouts, if needed, belong inside the hook.
///
/// # Examples
///
/// ```ignore
/// struct Article;
///
/// impl Searchable for Article {
///     type Doc = serde_json::Value;
///     type Outcome = ArticleOutcome;
///
///     fn index_name() -> String {
///         "articles".to_string()
///     }
///
///     fn document_type() -> String {
///         "article".to_string()
///     }
///
///     fn execute(request: &CompiledRequest) -> Result<Self::Outcome> {
///         // hand request.body to the backend client
///     }
/// }
/// ```
pub trait Searchable: Sized + 'static {
    /// Materialized document type
    type Doc: 'static;

    /// Outcome type returned by the execution hook
    type Outcome: SearchOutcome<Doc = Self::Doc> + 'static;

    /// Configured default index identifier
    fn index_name() -> String;

    /// Configured default document-type identifier
    fn document_type() -> String;

    /// Perform the backend search call
    ///
    /// # Errors
    ///
    /// Returns whatever error the backend call produced; the query layer
    /// surfaces it unchanged and leaves the memoized result untouched.
    fn execute(request: &CompiledRequest) -> Result<Self::Outcome>;
}

/// Request compiler contract
///
/// A pure function from accumulated state (plus per-execution options) to a
/// compiled request: called once per execution, deterministic given identical
/// input. Implicit operator defaulting (unset tag ⇒ `must`) is resolved here,
/// since this is the component that builds the final boolean tree.
pub trait Compiler: Send + Sync {
    /// Translate accumulated state into a backend request
    fn compile(&self, state: &QueryState, options: &CompileOptions) -> CompiledRequest;
}
