//! Process-wide scope registry
//!
//! Scopes are reusable fragments of builder mutations, registered per owner
//! type: named scopes are invoked explicitly through [`Query::scope`], the
//! default scope is applied automatically at construction unless the builder
//! is created with [`Query::unscoped`].
//!
//! The registry is populated during application wiring and is read-only
//! thereafter: writes happen at startup, reads happen per builder
//! construction and take a brief shared lock. No scopes registered for a
//! type is a no-op, not an error.
//!
//! Uses `parking_lot::RwLock` instead of `std::sync::RwLock` to avoid
//! cascading panics from lock poisoning.

use crate::query::Query;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use quarry_core::{Result, Searchable};
use rustc_hash::FxHashMap;
use std::any::{Any, TypeId};
use std::sync::Arc;

/// A stored scope body: consumes the builder, returns the mutated builder
///
/// Bodies are fallible; an error from the default scope aborts construction.
pub type ScopeFn<T> = Arc<dyn Fn(Query<T>) -> Result<Query<T>> + Send + Sync>;

/// Scopes registered for a single owner type
///
/// Entries are type-erased because the registry spans all owner types; they
/// are downcast back to `ScopeFn<T>` at lookup.
#[derive(Default)]
struct TypeScopes {
    named: FxHashMap<String, Box<dyn Any + Send + Sync>>,
    default: Option<Box<dyn Any + Send + Sync>>,
}

/// Global scope registry (owner type -> its scopes)
static REGISTRY: Lazy<RwLock<FxHashMap<TypeId, TypeScopes>>> =
    Lazy::new(|| RwLock::new(FxHashMap::default()));

/// Register (or overwrite) a named scope for an owner type
pub fn define<T, F>(name: impl Into<String>, body: F)
where
    T: Searchable,
    F: Fn(Query<T>) -> Result<Query<T>> + Send + Sync + 'static,
{
    let scope: ScopeFn<T> = Arc::new(body);
    REGISTRY
        .write()
        .entry(TypeId::of::<T>())
        .or_default()
        .named
        .insert(name.into(), Box::new(scope));
}

/// Register (or overwrite) the default scope for an owner type
pub fn define_default<T, F>(body: F)
where
    T: Searchable,
    F: Fn(Query<T>) -> Result<Query<T>> + Send + Sync + 'static,
{
    let scope: ScopeFn<T> = Arc::new(body);
    REGISTRY
        .write()
        .entry(TypeId::of::<T>())
        .or_default()
        .default = Some(Box::new(scope));
}

/// Look up a named scope for an owner type
pub fn named<T: Searchable>(name: &str) -> Option<ScopeFn<T>> {
    let registry = REGISTRY.read();
    registry
        .get(&TypeId::of::<T>())?
        .named
        .get(name)?
        .downcast_ref::<ScopeFn<T>>()
        .cloned()
}

/// Look up the default scope for an owner type
pub fn default_for<T: Searchable>() -> Option<ScopeFn<T>> {
    let registry = REGISTRY.read();
    registry
        .get(&TypeId::of::<T>())?
        .default
        .as_ref()?
        .downcast_ref::<ScopeFn<T>>()
        .cloned()
}

/// Names of all scopes registered for an owner type, sorted
pub fn names<T: Searchable>() -> Vec<String> {
    let registry = REGISTRY.read();
    let mut names: Vec<String> = registry
        .get(&TypeId::of::<T>())
        .map(|scopes| scopes.named.keys().cloned().collect())
        .unwrap_or_default();
    names.sort();
    names
}
