//! Tagged boolean clauses and their normalization rules
//!
//! This module defines the clause representation shared by all three clause
//! containers (`filter`, `filtered`, `query`):
//! - BoolOp: the boolean operator tag carried alongside a clause
//! - Clause: a single condition (matcher body + optional operator tag)
//! - ClauseArgs: normalized input accepted by every clause-adding call
//! - Target: the three valid clause containers
//!
//! Argument maps may carry the reserved operator key [`OP_KEY`]; it is always
//! stripped out of the payload and hoisted to the clause tag. Bulk literal
//! input (an array of pre-built clause objects) bypasses tag inference.
//!
//! Clause order is insertion order and is semantically meaningful for the
//! compiled bool structure, which is why `serde_json` is built with the
//! `preserve_order` feature.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Reserved key inside an argument map that names the boolean operator.
///
/// The key never survives into a clause body; see [`hoist_op`].
pub const OP_KEY: &str = "_op";

// ============================================================================
// BoolOp
// ============================================================================

/// Boolean operator tag carried alongside a clause
///
/// An unset tag means an implicit `must` in boolean composition; that default
/// is resolved by the request compiler, never stored on the clause itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoolOp {
    /// Bool-query conjunction
    Must,
    /// Bool-query disjunction
    Should,
    /// Bool-query negation
    MustNot,
    /// Root-level filter conjunction
    And,
    /// Root-level filter disjunction
    Or,
    /// Root-level filter negation
    Not,
}

impl BoolOp {
    /// Wire spelling of the operator
    pub fn as_str(&self) -> &'static str {
        match self {
            BoolOp::Must => "must",
            BoolOp::Should => "should",
            BoolOp::MustNot => "must_not",
            BoolOp::And => "and",
            BoolOp::Or => "or",
            BoolOp::Not => "not",
        }
    }
}

impl fmt::Display for BoolOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BoolOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "must" => Ok(BoolOp::Must),
            "should" => Ok(BoolOp::Should),
            "must_not" => Ok(BoolOp::MustNot),
            "and" => Ok(BoolOp::And),
            "or" => Ok(BoolOp::Or),
            "not" => Ok(BoolOp::Not),
            other => Err(Error::InvalidOperator(other.to_string())),
        }
    }
}

// ============================================================================
// Target
// ============================================================================

/// The three valid clause containers
///
/// Static call sites use the enum directly. Dynamic (string-named) dispatch
/// goes through [`FromStr`], whose failure is the distinct
/// [`Error::InvalidTarget`] rather than an empty result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// Conditions folded into the filtered-query envelope
    Filtered,
    /// Post-query filter conditions
    Filter,
    /// Scoring full-text conditions
    Query,
}

impl Target {
    /// Container name as it appears in the accumulated state
    pub fn as_str(&self) -> &'static str {
        match self {
            Target::Filtered => "filtered",
            Target::Filter => "filter",
            Target::Query => "query",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "filtered" => Ok(Target::Filtered),
            "filter" => Ok(Target::Filter),
            "query" => Ok(Target::Query),
            other => Err(Error::InvalidTarget(other.to_string())),
        }
    }
}

// ============================================================================
// Clause
// ============================================================================

/// A single tagged condition
///
/// `body` maps a field-or-matcher key to its definition; `op` is the hoisted
/// boolean operator tag. Normalization never lets the reserved operator key
/// leak from an argument map into `body` (tag in ⇒ tag out-of-band); bulk
/// literal clauses are the caller's verbatim data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    /// Matcher payload
    pub body: Map<String, Value>,
    /// Hoisted operator tag; unset defaults to `must` downstream
    pub op: Option<BoolOp>,
}

impl Clause {
    /// Create a single-key clause
    pub fn new(key: impl Into<String>, value: Value, op: Option<BoolOp>) -> Self {
        let mut body = Map::new();
        body.insert(key.into(), value);
        Clause { body, op }
    }

    /// Create a literal clause from a pre-built body, with no operator tag
    pub fn literal(body: Map<String, Value>) -> Self {
        Clause { body, op: None }
    }

    /// The clause's leading matcher key, if any
    pub fn key(&self) -> Option<&str> {
        self.body.keys().next().map(String::as_str)
    }

    /// Whether this is a match-all clause
    pub fn is_match_all(&self) -> bool {
        self.body.contains_key("match_all")
    }
}

// ============================================================================
// ClauseArgs
// ============================================================================

/// Normalized input to a clause-adding call
///
/// `One` is a single argument map: every remaining key/value pair after
/// operator hoisting becomes its own clause carrying the hoisted tag.
/// `Many` is a sequence of pre-built clause objects taken verbatim, each with
/// the tag forced off: raw clause arrays are treated as already being in
/// final shape.
#[derive(Debug, Clone, PartialEq)]
pub enum ClauseArgs {
    /// A single argument map, subject to operator hoisting
    One(Map<String, Value>),
    /// Bulk literal clause bodies, tag inference bypassed
    Many(Vec<Map<String, Value>>),
}

impl From<Map<String, Value>> for ClauseArgs {
    fn from(map: Map<String, Value>) -> Self {
        ClauseArgs::One(map)
    }
}

impl From<Vec<Map<String, Value>>> for ClauseArgs {
    fn from(maps: Vec<Map<String, Value>>) -> Self {
        ClauseArgs::Many(maps)
    }
}

impl From<Value> for ClauseArgs {
    /// Objects become `One`, arrays become `Many` (non-object elements are
    /// discarded), anything else produces no clauses.
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => ClauseArgs::One(map),
            Value::Array(items) => ClauseArgs::Many(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::Object(map) => Some(map),
                        _ => None,
                    })
                    .collect(),
            ),
            _ => ClauseArgs::Many(Vec::new()),
        }
    }
}

// ============================================================================
// Normalization
// ============================================================================

/// Split the reserved operator key out of an argument map
///
/// Returns the hoisted tag and the remaining payload, preserving key order.
/// An unrecognized operator spelling is stripped all the same but resolves to
/// no tag.
pub fn hoist_op(map: Map<String, Value>) -> (Option<BoolOp>, Map<String, Value>) {
    let mut op = None;
    let mut body = Map::new();
    for (key, value) in map {
        if key == OP_KEY {
            op = value.as_str().and_then(|s| s.parse().ok());
        } else {
            body.insert(key, value);
        }
    }
    (op, body)
}

/// Normalize clause-adding arguments into an ordered clause sequence
///
/// A single map yields one clause per non-reserved key, each carrying the
/// hoisted operator tag. A sequence of maps yields one literal clause per
/// element with no tag. An empty map yields no clauses.
pub fn normalize(args: impl Into<ClauseArgs>) -> Vec<Clause> {
    match args.into() {
        ClauseArgs::One(map) => {
            let (op, body) = hoist_op(map);
            body.into_iter()
                .map(|(key, value)| Clause::new(key, value, op))
                .collect()
        }
        ClauseArgs::Many(maps) => maps.into_iter().map(Clause::literal).collect(),
    }
}

/// Rewrap arguments under a shortcut's matcher key
///
/// `{field: value, _op: tag}` becomes `{matcher: {field: value}, _op: tag}`,
/// so the downstream [`normalize`] produces a single clause keyed by the
/// matcher. Bulk input wraps each element with no tag.
pub fn wrap_matcher(matcher: &str, args: ClauseArgs) -> ClauseArgs {
    match args {
        ClauseArgs::One(map) => {
            let (op, body) = hoist_op(map);
            let mut wrapped = Map::new();
            wrapped.insert(matcher.to_string(), Value::Object(body));
            if let Some(op) = op {
                wrapped.insert(OP_KEY.to_string(), Value::String(op.as_str().to_string()));
            }
            ClauseArgs::One(wrapped)
        }
        ClauseArgs::Many(maps) => ClauseArgs::Many(
            maps.into_iter()
                .map(|map| {
                    let mut wrapped = Map::new();
                    wrapped.insert(matcher.to_string(), Value::Object(map));
                    wrapped
                })
                .collect(),
        ),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ========================================
    // BoolOp
    // ========================================

    #[test]
    fn test_bool_op_round_trip() {
        for op in [
            BoolOp::Must,
            BoolOp::Should,
            BoolOp::MustNot,
            BoolOp::And,
            BoolOp::Or,
            BoolOp::Not,
        ] {
            assert_eq!(op.as_str().parse::<BoolOp>().unwrap(), op);
        }
    }

    #[test]
    fn test_bool_op_parse_rejects_unknown() {
        let err = "maybe".parse::<BoolOp>().unwrap_err();
        assert!(matches!(err, Error::InvalidOperator(s) if s == "maybe"));
    }

    // ========================================
    // Target
    // ========================================

    #[test]
    fn test_target_parse() {
        assert_eq!("filtered".parse::<Target>().unwrap(), Target::Filtered);
        assert_eq!("filter".parse::<Target>().unwrap(), Target::Filter);
        assert_eq!("query".parse::<Target>().unwrap(), Target::Query);
    }

    #[test]
    fn test_target_parse_fails_loudly() {
        let err = "sort".parse::<Target>().unwrap_err();
        assert!(matches!(err, Error::InvalidTarget(s) if s == "sort"));
    }

    // ========================================
    // Hoisting
    // ========================================

    #[test]
    fn test_hoist_op_strips_reserved_key() {
        let map = json!({"status": "active", "_op": "must_not"});
        let Value::Object(map) = map else {
            panic!("expected object")
        };
        let (op, body) = hoist_op(map);
        assert_eq!(op, Some(BoolOp::MustNot));
        assert!(!body.contains_key(OP_KEY));
        assert_eq!(body.get("status"), Some(&json!("active")));
    }

    #[test]
    fn test_hoist_op_unknown_spelling_still_stripped() {
        let map = json!({"status": "active", "_op": "maybe"});
        let Value::Object(map) = map else {
            panic!("expected object")
        };
        let (op, body) = hoist_op(map);
        assert_eq!(op, None);
        assert!(!body.contains_key(OP_KEY));
    }

    #[test]
    fn test_hoist_op_preserves_key_order() {
        let map = json!({"zz": 1, "_op": "should", "aa": 2, "mm": 3});
        let Value::Object(map) = map else {
            panic!("expected object")
        };
        let (_, body) = hoist_op(map);
        let keys: Vec<&str> = body.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zz", "aa", "mm"]);
    }

    // ========================================
    // Normalization
    // ========================================

    #[test]
    fn test_normalize_single_map_one_clause_per_key() {
        let clauses = normalize(json!({"status": "active", "kind": "post"}));
        assert_eq!(clauses.len(), 2);
        assert_eq!(clauses[0].key(), Some("status"));
        assert_eq!(clauses[1].key(), Some("kind"));
        assert_eq!(clauses[0].op, None);
    }

    #[test]
    fn test_normalize_hoists_op_onto_every_clause() {
        let clauses = normalize(json!({"status": "active", "kind": "post", "_op": "should"}));
        assert_eq!(clauses.len(), 2);
        for clause in &clauses {
            assert_eq!(clause.op, Some(BoolOp::Should));
            assert!(!clause.body.contains_key(OP_KEY));
        }
    }

    #[test]
    fn test_normalize_bulk_literals_bypass_tag_inference() {
        let clauses = normalize(json!([
            {"term": {"status": "active"}, "_op": "must_not"},
            {"range": {"age": {"gte": 21}}}
        ]));
        assert_eq!(clauses.len(), 2);
        // bulk elements keep their bodies verbatim, tag forced off
        assert_eq!(clauses[0].op, None);
        assert!(clauses[0].body.contains_key(OP_KEY));
        assert_eq!(clauses[1].key(), Some("range"));
    }

    #[test]
    fn test_normalize_bulk_discards_non_objects() {
        let clauses = normalize(json!([{"term": {"a": 1}}, 42, "nope"]));
        assert_eq!(clauses.len(), 1);
    }

    #[test]
    fn test_normalize_empty_map_yields_nothing() {
        assert!(normalize(json!({})).is_empty());
    }

    #[test]
    fn test_normalize_scalar_yields_nothing() {
        assert!(normalize(json!(42)).is_empty());
    }

    // ========================================
    // Match-all detection
    // ========================================

    #[test]
    fn test_is_match_all() {
        let clauses = normalize(json!({"match_all": {}}));
        assert_eq!(clauses.len(), 1);
        assert!(clauses[0].is_match_all());

        let other = normalize(json!({"term": {"a": 1}}));
        assert!(!other[0].is_match_all());
    }

    // ========================================
    // Matcher wrapping
    // ========================================

    #[test]
    fn test_wrap_matcher_single() {
        let args = ClauseArgs::from(json!({"status": "active", "_op": "must_not"}));
        let clauses = normalize(wrap_matcher("term", args));
        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses[0].key(), Some("term"));
        assert_eq!(clauses[0].op, Some(BoolOp::MustNot));
        assert_eq!(
            clauses[0].body.get("term"),
            Some(&json!({"status": "active"}))
        );
    }

    #[test]
    fn test_wrap_matcher_multi_field_stays_one_clause() {
        let args = ClauseArgs::from(json!({"status": "active", "kind": "post"}));
        let clauses = normalize(wrap_matcher("term", args));
        assert_eq!(clauses.len(), 1);
        assert_eq!(
            clauses[0].body.get("term"),
            Some(&json!({"status": "active", "kind": "post"}))
        );
    }

    #[test]
    fn test_wrap_matcher_bulk() {
        let args = ClauseArgs::from(json!([{"a": 1}, {"b": 2}]));
        let clauses = normalize(wrap_matcher("ids", args));
        assert_eq!(clauses.len(), 2);
        assert_eq!(clauses[0].body.get("ids"), Some(&json!({"a": 1})));
        assert_eq!(clauses[1].body.get("ids"), Some(&json!({"b": 2})));
        assert_eq!(clauses[1].op, None);
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::{Map, Value};

    proptest! {
        /// The reserved operator key never survives into any clause body, and
        /// every non-reserved key produces exactly one clause.
        #[test]
        fn prop_op_key_never_survives(
            keys in proptest::collection::hash_set("[a-z]{1,8}", 0..6),
            op in proptest::option::of(proptest::sample::select(vec![
                "must", "should", "must_not", "and", "or", "not", "bogus",
            ])),
        ) {
            let mut map = Map::new();
            for key in &keys {
                map.insert(key.clone(), Value::Bool(true));
            }
            if let Some(op) = op {
                map.insert(OP_KEY.to_string(), Value::String(op.to_string()));
            }

            let clauses = normalize(ClauseArgs::One(map));
            prop_assert_eq!(clauses.len(), keys.len());
            for clause in &clauses {
                prop_assert!(!clause.body.contains_key(OP_KEY));
            }
        }
    }
}
