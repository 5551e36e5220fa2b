//! Compiled-request types crossing the execution boundary
//!
//! A [`CompiledRequest`] is what the request compiler hands to the owner
//! type's execution hook: resolved resource identifiers, the backend body,
//! and the execution mode. [`CompileOptions`] carries the per-execution
//! knobs the builder passes to the compiler.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// ExecutionMode
// ============================================================================

/// How the backend call's outcome is consumed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Materialize full documents
    #[default]
    Full,
    /// Only projected field values are of interest (backs `pluck`)
    ExtractFields,
}

// ============================================================================
// CompileOptions
// ============================================================================

/// Per-execution options handed to the compiler alongside builder state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompileOptions {
    /// Execution mode for this compilation
    pub mode: ExecutionMode,
    /// Override the state's index identifiers for this execution only
    pub index: Option<Vec<String>>,
    /// Override the state's document-type identifiers for this execution only
    pub doc_type: Option<Vec<String>>,
}

impl CompileOptions {
    /// Options for a field-extraction execution
    pub fn extract_fields() -> Self {
        CompileOptions {
            mode: ExecutionMode::ExtractFields,
            ..CompileOptions::default()
        }
    }
}

// ============================================================================
// CompiledRequest
// ============================================================================

/// A fully compiled search request, ready for the execution hook
///
/// Produced by the request compiler, deterministic given identical state and
/// options. The body's concrete wire shape is the compiler's business; the
/// builder never inspects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledRequest {
    /// Resolved index identifiers
    pub index: Vec<String>,
    /// Resolved document-type identifiers
    pub doc_type: Vec<String>,
    /// Backend request body
    pub body: Value,
    /// Execution mode the request was compiled under
    pub mode: ExecutionMode,
}
