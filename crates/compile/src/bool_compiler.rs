//! Bool-tree compilation of accumulated query state
//!
//! [`BoolCompiler`] folds the three clause containers into the backend's
//! boolean request body:
//! - `query` clauses (plus the multi-match spec) become the scoring query,
//!   grouped by operator tag into `bool.must/should/must_not`
//! - `filtered` clauses become the filter side of a `filtered` envelope
//! - `filter` clauses become the top-level post filter
//! - root operator tags (`and`/`or`/`not`) group into their own filter nodes
//!
//! An unset operator tag resolves to `must` here; the clause model only
//! produces tagged clauses and never decides boolean composition.

use quarry_core::{BoolOp, Clause, CompileOptions, CompiledRequest, Compiler, ExecutionMode, QueryState};
use serde_json::{json, Map, Value};
use tracing::trace;

// ============================================================================
// BoolCompiler
// ============================================================================

/// The bundled request compiler
///
/// Pure and deterministic: identical state and options always compile to the
/// same request. Holds no configuration of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolCompiler;

impl BoolCompiler {
    /// Create a new compiler
    pub fn new() -> Self {
        BoolCompiler
    }
}

impl Compiler for BoolCompiler {
    fn compile(&self, state: &QueryState, options: &CompileOptions) -> CompiledRequest {
        let mut body = Map::new();

        // Scoring side: query clauses plus the multi-match spec, folded into
        // one node, then wrapped by function_score when functions are set.
        let mut query_clauses = state.query.clone();
        if let Some(spec) = &state.multi_match {
            query_clauses.push(Clause::new("multi_match", spec.clone(), None));
        }
        let base = fold(&query_clauses);
        let filtered = fold(&state.filtered);

        let query_node = match (base, filtered) {
            (base, Some(filter)) => {
                let mut envelope = Map::new();
                if let Some(query) = base {
                    envelope.insert("query".into(), query);
                }
                envelope.insert("filter".into(), filter);
                Some(json!({ "filtered": envelope }))
            }
            (base, None) => base,
        };

        let query_node = if state.functions.is_empty() {
            query_node
        } else {
            let mut scored = Map::new();
            if let Some(query) = query_node {
                scored.insert("query".into(), query);
            }
            scored.insert("functions".into(), Value::Array(state.functions.clone()));
            if let Some(mode) = state.score_mode {
                scored.insert("score_mode".into(), json!(mode.as_str()));
            }
            Some(json!({ "function_score": scored }))
        };

        if let Some(query) = query_node {
            body.insert("query".into(), query);
        }
        if let Some(filter) = fold(&state.filter) {
            body.insert("filter".into(), filter);
        }
        if !state.facets.is_empty() {
            body.insert("facets".into(), Value::Object(state.facets.clone()));
        }
        if !state.aggs.is_empty() {
            body.insert("aggs".into(), Value::Object(state.aggs.clone()));
        }
        if !state.sort.is_empty() {
            let entries = state.sort.iter().cloned().map(Value::Object).collect();
            body.insert("sort".into(), Value::Array(entries));
        }

        if state.no_fields {
            body.insert("fields".into(), json!([]));
        } else if !state.fields.is_empty() {
            body.insert("fields".into(), json!(state.fields));
        }
        if options.mode == ExecutionMode::ExtractFields && !body.contains_key("fields") {
            body.insert("fields".into(), json!([]));
        }

        let (from, size) = resolve_pagination(state);
        if let Some(from) = from {
            body.insert("from".into(), json!(from));
        }
        if let Some(size) = size {
            body.insert("size".into(), json!(size));
        }

        let index = options.index.clone().unwrap_or_else(|| state.index.clone());
        let doc_type = options
            .doc_type
            .clone()
            .unwrap_or_else(|| state.doc_type.clone());

        trace!(
            index = ?index,
            mode = ?options.mode,
            keys = body.len(),
            "compiled search request"
        );

        CompiledRequest {
            index,
            doc_type,
            body: Value::Object(body),
            mode: options.mode,
        }
    }
}

// ============================================================================
// Clause folding
// ============================================================================

/// Fold an ordered clause sequence into a single boolean node
///
/// Bool-tagged clauses (and untagged ones, which default to `must`) group
/// into a `bool` node; a lone untagged clause collapses to itself. Root tags
/// group into `and`/`or`/`not` filter nodes. Multiple resulting nodes are
/// conjoined under `and`. Returns None for an empty sequence.
fn fold(clauses: &[Clause]) -> Option<Value> {
    let mut must = Vec::new();
    let mut should = Vec::new();
    let mut must_not = Vec::new();
    let mut and_group = Vec::new();
    let mut or_group = Vec::new();
    let mut not_group = Vec::new();

    for clause in clauses {
        let node = Value::Object(clause.body.clone());
        match clause.op {
            None | Some(BoolOp::Must) => must.push(node),
            Some(BoolOp::Should) => should.push(node),
            Some(BoolOp::MustNot) => must_not.push(node),
            Some(BoolOp::And) => and_group.push(node),
            Some(BoolOp::Or) => or_group.push(node),
            Some(BoolOp::Not) => not_group.push(node),
        }
    }

    let mut nodes = Vec::new();

    if must.len() == 1 && should.is_empty() && must_not.is_empty() {
        // a lone conjunctive clause needs no bool wrapper
        if let Some(single) = must.pop() {
            nodes.push(single);
        }
    } else if !must.is_empty() || !should.is_empty() || !must_not.is_empty() {
        let mut bool_node = Map::new();
        if !must.is_empty() {
            bool_node.insert("must".into(), Value::Array(must));
        }
        if !should.is_empty() {
            bool_node.insert("should".into(), Value::Array(should));
        }
        if !must_not.is_empty() {
            bool_node.insert("must_not".into(), Value::Array(must_not));
        }
        nodes.push(json!({ "bool": bool_node }));
    }

    if !and_group.is_empty() {
        nodes.push(json!({ "and": and_group }));
    }
    if !or_group.is_empty() {
        nodes.push(json!({ "or": or_group }));
    }
    for node in not_group {
        nodes.push(json!({ "not": node }));
    }

    match nodes.len() {
        0 => None,
        1 => nodes.pop(),
        _ => Some(json!({ "and": nodes })),
    }
}

/// Resolve the pagination fields into an effective offset and window
///
/// Explicit `from`/`size` always win. `from` is derived from `page`/`per_page`
/// only when both are present (`page` is 1-based); `size` falls back to
/// `per_page`.
fn resolve_pagination(state: &QueryState) -> (Option<u64>, Option<u64>) {
    let derived_from = match (state.page, state.per_page) {
        (Some(page), Some(per_page)) => Some(page.saturating_sub(1) * per_page),
        _ => None,
    };
    (state.from.or(derived_from), state.size.or(state.per_page))
}

// ============================================================================
// Tests
// ============================================================================
