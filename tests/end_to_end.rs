//! End-to-end composition test through the root crate
//!
//! Wires a fake article backend, registers scopes, composes a realistic
//! query through the re-exported API, and checks the compiled request that
//! reaches the execution hook.

use parking_lot::Mutex;
use quarry::{
    scope, BoolOp, CompiledRequest, Error, Query, Result, ScoreMode, SearchOutcome, Searchable,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};

// ============================================================================
// Fake article backend
// ============================================================================

static CALLS: AtomicUsize = AtomicUsize::new(0);
static LAST_REQUEST: Mutex<Option<CompiledRequest>> = Mutex::new(None);

struct ArticleOutcome {
    docs: Vec<Value>,
}

impl SearchOutcome for ArticleOutcome {
    type Doc = Value;

    fn total(&self) -> u64 {
        self.docs.len() as u64
    }

    fn docs(&self) -> &[Value] {
        &self.docs
    }
}

struct Article;

impl Searchable for Article {
    type Doc = Value;
    type Outcome = ArticleOutcome;

    fn index_name() -> String {
        "articles".to_string()
    }

    fn document_type() -> String {
        "article".to_string()
    }

    fn execute(request: &CompiledRequest) -> Result<ArticleOutcome> {
        CALLS.fetch_add(1, Ordering::SeqCst);
        *LAST_REQUEST.lock() = Some(request.clone());
        Ok(ArticleOutcome {
            docs: vec![
                json!({"id": 1, "title": "Ownership in practice"}),
                json!({"id": 2, "title": "Borrowing at scale"}),
            ],
        })
    }
}

// ============================================================================
// End-to-end composition
// ============================================================================

#[test]
fn test_article_search_composes_and_executes_once() {
    scope::define_default::<Article, _>(|q| Ok(q.term(json!({"tenant": "acme"}))));
    scope::define::<Article, _>("published", |q| {
        Ok(q.term(json!({"status": "published"})))
    });

    let mut query = Query::<Article>::new()
        .unwrap()
        .scope("published")
        .unwrap()
        .match_query(json!({"title": "rust"}))
        .query(json!({"body": "ownership", "_op": "should"}))
        .facets(json!({"tags": {"terms": {"field": "tags"}}}))
        .order(json!({"published_at": "desc"}))
        .function_score(Some(ScoreMode::Sum), json!({"boost_factor": 2}))
        .fields(["title"])
        .page(1)
        .per_page(25);

    // operator tags were hoisted, never stored in clause bodies
    assert!(query
        .state()
        .query
        .iter()
        .all(|clause| !clause.body.contains_key(quarry::OP_KEY)));
    assert_eq!(query.state().query[1].op, Some(BoolOp::Should));

    let docs = query.to_vec().unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(query.total().unwrap(), 2);
    assert_eq!(query.first().unwrap().unwrap()["id"], json!(1));
    assert_eq!(CALLS.load(Ordering::SeqCst), 1);

    let request = LAST_REQUEST.lock().clone().unwrap();
    assert_eq!(request.index, vec!["articles".to_string()]);

    // default scope clause first, named scope clause second
    assert_eq!(
        request.body["query"]["filtered"]["filter"],
        json!({"bool": {"must": [
            {"term": {"tenant": "acme"}},
            {"term": {"status": "published"}}
        ]}})
    );
    assert_eq!(
        request.body["query"]["filtered"]["query"],
        json!({"function_score": {
            "query": {"bool": {
                "must": [{"match": {"title": "rust"}}],
                "should": [{"body": "ownership"}]
            }},
            "functions": [{"boost_factor": 2}],
            "score_mode": "sum"
        }})
    );
    assert_eq!(request.body["facets"], json!({"tags": {"terms": {"field": "tags"}}}));
    assert_eq!(request.body["sort"], json!([{"published_at": {"order": "desc"}}]));
    assert_eq!(request.body["fields"], json!(["title"]));
    assert_eq!(request.body["from"], json!(0));
    assert_eq!(request.body["size"], json!(25));
}

#[test]
fn test_unknown_scope_surfaces_distinctly() {
    let err = Query::<Article>::new().unwrap().scope("trending").unwrap_err();
    assert!(matches!(err, Error::UnknownScope(name) if name == "trending"));
}
