//! Accumulated builder state
//!
//! [`QueryState`] is the plain data handed to the request compiler: the three
//! clause containers plus sorting, facets/aggregations, scoring functions,
//! field projection, resource identifiers, and pagination. The builder owns
//! exactly one instance; the compiler only ever reads it.

use crate::clause::Clause;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

// ============================================================================
// ScoreMode
// ============================================================================

/// Combination mode for function-score results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreMode {
    /// Scores are multiplied
    Multiply,
    /// Scores are summed
    Sum,
    /// Scores are averaged
    Avg,
    /// First matching function wins
    First,
    /// Maximum score is used
    Max,
    /// Minimum score is used
    Min,
}

impl ScoreMode {
    /// Wire spelling of the mode
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreMode::Multiply => "multiply",
            ScoreMode::Sum => "sum",
            ScoreMode::Avg => "avg",
            ScoreMode::First => "first",
            ScoreMode::Max => "max",
            ScoreMode::Min => "min",
        }
    }
}

impl fmt::Display for ScoreMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// QueryState
// ============================================================================

/// Accumulated query state, owned exclusively by one builder instance
///
/// Clause containers and `sort` are ordered; insertion order is semantically
/// meaningful for the compiled bool structure. `facets` and `aggs` are
/// name-keyed with last-merge-wins on conflict.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryState {
    /// Post-query filter clauses
    pub filter: Vec<Clause>,
    /// Clauses folded into the filtered-query envelope
    pub filtered: Vec<Clause>,
    /// Scoring full-text clauses
    pub query: Vec<Clause>,
    /// Ordered sort entries (single-key field→direction maps)
    pub sort: Vec<Map<String, Value>>,
    /// Facet definitions by name
    pub facets: Map<String, Value>,
    /// Aggregation definitions by name
    pub aggs: Map<String, Value>,
    /// Scoring-function definitions, in insertion order
    pub functions: Vec<Value>,
    /// Combination mode for `functions`
    pub score_mode: Option<ScoreMode>,
    /// Multi-match spec (`{query, fields} + options`), last call wins
    pub multi_match: Option<Value>,
    /// Field names to project, in insertion order
    pub fields: Vec<String>,
    /// Suppress all field projection; mutually exclusive with `fields`
    pub no_fields: bool,
    /// Target index identifiers
    pub index: Vec<String>,
    /// Target document-type identifiers
    pub doc_type: Vec<String>,
    /// 1-based page number
    pub page: Option<u64>,
    /// Page size
    pub per_page: Option<u64>,
    /// Absolute result offset
    pub from: Option<u64>,
    /// Result window size; `count` forces 0, `many` forces the configured
    /// large constant
    pub size: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_empty() {
        let state = QueryState::default();
        assert!(state.filter.is_empty());
        assert!(state.filtered.is_empty());
        assert!(state.query.is_empty());
        assert!(state.sort.is_empty());
        assert!(state.facets.is_empty());
        assert!(state.aggs.is_empty());
        assert!(state.functions.is_empty());
        assert!(state.score_mode.is_none());
        assert!(state.multi_match.is_none());
        assert!(state.fields.is_empty());
        assert!(!state.no_fields);
        assert!(state.index.is_empty());
        assert!(state.doc_type.is_empty());
        assert!(state.page.is_none());
        assert!(state.per_page.is_none());
        assert!(state.from.is_none());
        assert!(state.size.is_none());
    }

    #[test]
    fn test_score_mode_spellings() {
        assert_eq!(ScoreMode::Multiply.as_str(), "multiply");
        assert_eq!(ScoreMode::Sum.as_str(), "sum");
        assert_eq!(ScoreMode::Avg.as_str(), "avg");
        assert_eq!(ScoreMode::First.as_str(), "first");
        assert_eq!(ScoreMode::Max.as_str(), "max");
        assert_eq!(ScoreMode::Min.as_str(), "min");
    }

    #[test]
    fn test_score_mode_serde_spelling_matches_wire() {
        let json = serde_json::to_value(ScoreMode::Sum).unwrap();
        assert_eq!(json, serde_json::json!("sum"));
    }
}
