//! The fluent query builder
//!
//! [`Query<T>`] accumulates tagged clauses, sorting, facets/aggregations,
//! scoring functions, field projection, and pagination for an owner type
//! `T`, then lazily compiles and executes on first access to a result.
//!
//! Every mutator consumes the builder and returns it, so calls chain:
//!
//! ```ignore
//! let mut query = Query::<Article>::new()?
//!     .term(json!({"status": "active"}))
//!     .match_query(json!({"title": "foo"}))
//!     .page(2)
//!     .per_page(10);
//! let total = query.total()?;
//! ```
//!
//! Execution is memoized: repeated accessors reuse the cached outcome, and
//! only [`Query::result`] busts the cache. A failed execution leaves the
//! builder unexecuted. The builder is a plain single-threaded value; the
//! only shared state it touches is the scope registry, read once at
//! construction.

use crate::scope;
use quarry_core::{
    clause, config, normalize, wrap_matcher, ClauseArgs, CompileOptions, Compiler, Error,
    QueryState, Result, ScoreMode, SearchOutcome, Searchable, Target,
};
use quarry_compile::BoolCompiler;
use serde_json::{json, Map, Value};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, trace};

// Shortcut methods share one shape: wrap the arguments under the matcher key
// and route them through the (named or default) container's own mutator, so
// container-specific behavior like the match-all discard still applies.
macro_rules! shortcuts {
    ($($name:ident / $name_in:ident => $matcher:literal @ $default:expr, $container:literal;)*) => {
        $(
            #[doc = concat!("Append a `", $matcher, "` clause to the `", $container, "` container")]
            pub fn $name(self, args: impl Into<ClauseArgs>) -> Self {
                self.$name_in($default, args)
            }

            #[doc = concat!("Append a `", $matcher, "` clause to an explicitly chosen container")]
            pub fn $name_in(self, target: Target, args: impl Into<ClauseArgs>) -> Self {
                self.dispatch(target, wrap_matcher($matcher, args.into()))
            }
        )*
    };
}

// ============================================================================
// Query
// ============================================================================

/// Chainable query builder for an owner type
///
/// Owns all accumulated state exclusively; one instance per logical query.
/// Not thread-safe and never shared: it lives for the duration of the
/// caller's composition plus one execution, though it may be kept around for
/// repeated access to the same memoized result.
pub struct Query<T: Searchable> {
    state: QueryState,
    compiler: Arc<dyn Compiler>,
    result: Option<T::Outcome>,
    _owner: PhantomData<T>,
}

impl<T: Searchable> Query<T> {
    // ========================================================================
    // Construction
    // ========================================================================

    /// Create a builder for the owner type and apply its default scope
    ///
    /// # Errors
    ///
    /// Propagates any error raised by the default scope body; a builder with
    /// a broken default scope is never handed out.
    pub fn new() -> Result<Self> {
        let query = Self::bare();
        match scope::default_for::<T>() {
            Some(body) => {
                trace!(owner = std::any::type_name::<T>(), "applying default scope");
                body(query)
            }
            None => Ok(query),
        }
    }

    /// Create a builder without applying the default scope
    ///
    /// Named scopes remain invocable through [`Query::scope`].
    pub fn unscoped() -> Self {
        Self::bare()
    }

    fn bare() -> Self {
        let state = QueryState {
            index: vec![T::index_name()],
            doc_type: vec![T::document_type()],
            ..QueryState::default()
        };
        Query {
            state,
            compiler: Arc::new(BoolCompiler::new()),
            result: None,
            _owner: PhantomData,
        }
    }

    /// Apply a named scope registered for the owner type
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownScope`] if no scope of that name is
    /// registered, or whatever error the scope body raised.
    pub fn scope(self, name: &str) -> Result<Self> {
        match scope::named::<T>(name) {
            Some(body) => body(self),
            None => Err(Error::UnknownScope(name.to_string())),
        }
    }

    /// Builder: swap the request compiler for this builder
    pub fn with_compiler(mut self, compiler: Arc<dyn Compiler>) -> Self {
        self.compiler = compiler;
        self
    }

    // ========================================================================
    // State access
    // ========================================================================

    /// The accumulated state
    pub fn state(&self) -> &QueryState {
        &self.state
    }

    /// Consume the builder, yielding the accumulated state
    pub fn into_state(self) -> QueryState {
        self.state
    }

    /// Whether a memoized result is cached
    pub fn executed(&self) -> bool {
        self.result.is_some()
    }

    // ========================================================================
    // Clause containers
    // ========================================================================

    /// Append normalized clauses to the `filter` container
    pub fn filter(mut self, args: impl Into<ClauseArgs>) -> Self {
        self.state.filter.extend(normalize(args));
        self
    }

    /// Append normalized clauses to the `filtered` container
    pub fn filtered(mut self, args: impl Into<ClauseArgs>) -> Self {
        self.state.filtered.extend(normalize(args));
        self
    }

    /// Append normalized clauses to the `query` container
    ///
    /// A leading match-all clause is discarded first: combined under implicit
    /// `must` with any further condition it is redundant, and the new
    /// condition takes over as the effective query.
    pub fn query(mut self, args: impl Into<ClauseArgs>) -> Self {
        if self
            .state
            .query
            .first()
            .map_or(false, clause::Clause::is_match_all)
        {
            self.state.query.clear();
        }
        self.state.query.extend(normalize(args));
        self
    }

    /// Reset the `query` container to a single match-all clause
    pub fn match_all(mut self) -> Self {
        self.state.query = normalize(json!({"match_all": {}}));
        self
    }

    // ========================================================================
    // Facets, aggregations, scoring
    // ========================================================================

    /// Shallow-merge facet definitions; existing names are overwritten
    pub fn facets(mut self, args: Value) -> Self {
        if let Value::Object(map) = args {
            for (name, definition) in map {
                self.state.facets.insert(name, definition);
            }
        }
        self
    }

    /// Shallow-merge aggregation definitions; existing names are overwritten
    pub fn aggs(mut self, args: Value) -> Self {
        if let Value::Object(map) = args {
            for (name, definition) in map {
                self.state.aggs.insert(name, definition);
            }
        }
        self
    }

    /// Replace the multi-match spec with `{query, fields}` plus options
    pub fn multi_match<S, I, F>(mut self, text: S, fields: I, options: Value) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        let mut spec = Map::new();
        spec.insert("query".into(), Value::String(text.into()));
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        spec.insert("fields".into(), json!(fields));
        if let Value::Object(extra) = options {
            for (key, value) in extra {
                spec.insert(key, value);
            }
        }
        self.state.multi_match = Some(Value::Object(spec));
        self
    }

    /// Accumulate scoring functions and overwrite the combination mode
    ///
    /// A single definition is appended; a sequence is concatenated. The
    /// score mode is overwritten unconditionally, including to unset.
    pub fn function_score(mut self, mode: Option<ScoreMode>, args: Value) -> Self {
        match args {
            Value::Object(map) => self.state.functions.push(Value::Object(map)),
            Value::Array(items) => self.state.functions.extend(items),
            _ => {}
        }
        self.state.score_mode = mode;
        self
    }

    // ========================================================================
    // Shortcuts
    // ========================================================================

    fn dispatch(self, target: Target, args: ClauseArgs) -> Self {
        match target {
            Target::Filtered => self.filtered(args),
            Target::Filter => self.filter(args),
            Target::Query => self.query(args),
        }
    }

    shortcuts! {
        terms / terms_in => "terms" @ Target::Filtered, "filtered";
        term / term_in => "term" @ Target::Filtered, "filtered";
        ids / ids_in => "ids" @ Target::Filtered, "filtered";
        range / range_in => "range" @ Target::Filtered, "filtered";
        match_query / match_query_in => "match" @ Target::Query, "query";
        common / common_in => "common" @ Target::Query, "query";
        prefix / prefix_in => "prefix" @ Target::Query, "query";
        wildcard / wildcard_in => "wildcard" @ Target::Query, "query";
        regexp / regexp_in => "regexp" @ Target::Query, "query";
        fuzzy / fuzzy_in => "fuzzy" @ Target::Query, "query";
    }

    // ========================================================================
    // Field projection
    // ========================================================================

    /// Project the named fields; clears a prior [`Query::no_fields`]
    pub fn fields<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.no_fields = false;
        self.state.fields.extend(names.into_iter().map(Into::into));
        self
    }

    /// Suppress all field projection; clears any accumulated fields
    ///
    /// Mutually exclusive with [`Query::fields`]: the last call wins.
    pub fn no_fields(mut self) -> Self {
        self.state.no_fields = true;
        self.state.fields.clear();
        self
    }

    // ========================================================================
    // Resource identifiers
    // ========================================================================

    /// Override the target index identifiers
    pub fn index<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.index = values.into_iter().map(Into::into).collect();
        self
    }

    /// Override the target document-type identifiers
    pub fn doc_type<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.doc_type = values.into_iter().map(Into::into).collect();
        self
    }

    // ========================================================================
    // Pagination
    // ========================================================================

    /// Set the 1-based page number
    pub fn page(mut self, value: u64) -> Self {
        self.state.page = Some(value);
        self
    }

    /// Set the page size
    pub fn per_page(mut self, value: u64) -> Self {
        self.state.per_page = Some(value);
        self
    }

    /// Set the absolute result offset
    pub fn from(mut self, value: u64) -> Self {
        self.state.from = Some(value);
        self
    }

    /// Set the result window size
    ///
    /// No cross-validation against `page`/`per_page`; combining them is
    /// permitted and left to the request compiler.
    pub fn size(mut self, value: u64) -> Self {
        self.state.size = Some(value);
        self
    }

    /// Force the result window to the configured large constant
    ///
    /// Chainable; does not execute.
    pub fn many(mut self) -> Self {
        self.state.size = Some(config::many_size());
        self
    }

    // ========================================================================
    // Sorting
    // ========================================================================

    /// Append one sort entry per key of the argument map
    pub fn sort_by(mut self, args: Value) -> Self {
        if let Value::Object(map) = args {
            for (key, value) in map {
                let mut entry = Map::new();
                entry.insert(key, value);
                self.state.sort.push(entry);
            }
        }
        self
    }

    /// Append, per key, a `{key: {"order": value}}` sort entry
    pub fn order(mut self, args: Value) -> Self {
        if let Value::Object(map) = args {
            for (key, value) in map {
                let mut entry = Map::new();
                entry.insert(key, json!({"order": value}));
                self.state.sort.push(entry);
            }
        }
        self
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Compile and execute, overwriting any memoized result
    ///
    /// This is the only cache-busting primitive: it always re-invokes the
    /// compiler and the execution hook, regardless of prior memoization.
    ///
    /// # Errors
    ///
    /// Surfaces the execution hook's error unchanged; on failure the prior
    /// cache (if any) has already been dropped and the builder is back in
    /// the unexecuted state.
    pub fn result(&mut self, options: CompileOptions) -> Result<&T::Outcome> {
        self.result = None;
        let outcome = self.execute_request(&options)?;
        Ok(self.result.insert(outcome))
    }

    /// Execute with `size` forced to 0 and return the reported total
    ///
    /// Does not materialize documents and does not touch the memoized
    /// result.
    ///
    /// # Errors
    ///
    /// Surfaces the execution hook's error unchanged.
    pub fn count(&mut self) -> Result<u64> {
        self.state.size = Some(0);
        let outcome = self.execute_request(&CompileOptions::default())?;
        Ok(outcome.total())
    }

    /// Project the named fields and execute in field-extraction mode
    ///
    /// Returns the raw projected values; does not touch the memoized result.
    ///
    /// # Errors
    ///
    /// Surfaces the execution hook's error unchanged.
    pub fn pluck<I, S>(&mut self, names: I) -> Result<Vec<Value>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.no_fields = false;
        self.state.fields.extend(names.into_iter().map(Into::into));
        let outcome = self.execute_request(&CompileOptions::extract_fields())?;
        Ok(outcome.projected())
    }

    /// Total hit count of the memoized outcome, executing if needed
    ///
    /// # Errors
    ///
    /// Surfaces the execution hook's error unchanged.
    pub fn total(&mut self) -> Result<u64> {
        Ok(self.materialize()?.total())
    }

    /// Ordered documents of the memoized outcome, executing if needed
    ///
    /// # Errors
    ///
    /// Surfaces the execution hook's error unchanged.
    pub fn docs(&mut self) -> Result<&[T::Doc]> {
        Ok(self.materialize()?.docs())
    }

    /// First document, executing if needed
    ///
    /// # Errors
    ///
    /// Surfaces the execution hook's error unchanged.
    pub fn first(&mut self) -> Result<Option<&T::Doc>> {
        Ok(self.materialize()?.first())
    }

    /// Last document, executing if needed
    ///
    /// # Errors
    ///
    /// Surfaces the execution hook's error unchanged.
    pub fn last(&mut self) -> Result<Option<&T::Doc>> {
        Ok(self.materialize()?.last())
    }

    /// Materialize all documents into an owned sequence, executing if needed
    ///
    /// # Errors
    ///
    /// Surfaces the execution hook's error unchanged.
    pub fn to_vec(&mut self) -> Result<Vec<T::Doc>>
    where
        T::Doc: Clone,
    {
        Ok(self.materialize()?.to_vec())
    }

    /// Iterate the memoized outcome's documents, executing if needed
    ///
    /// # Errors
    ///
    /// Surfaces the execution hook's error unchanged.
    pub fn iter(&mut self) -> Result<std::slice::Iter<'_, T::Doc>> {
        Ok(self.materialize()?.docs().iter())
    }

    fn materialize(&mut self) -> Result<&T::Outcome> {
        let outcome = match self.result.take() {
            Some(outcome) => outcome,
            None => self.execute_request(&CompileOptions::default())?,
        };
        Ok(self.result.insert(outcome))
    }

    fn execute_request(&self, options: &CompileOptions) -> Result<T::Outcome> {
        let request = self.compiler.compile(&self.state, options);
        debug!(
            index = ?request.index,
            mode = ?request.mode,
            filter = self.state.filter.len(),
            filtered = self.state.filtered.len(),
            query = self.state.query.len(),
            "executing search"
        );
        T::execute(&request)
    }
}

impl<T: Searchable> fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("state", &self.state)
            .field("executed", &self.result.is_some())
            .finish()
    }
}
