//! Default request compiler for quarry
//!
//! This crate provides:
//! - BoolCompiler: the bundled `Compiler` implementation, translating
//!   accumulated builder state into the backend's bool-query JSON
//!
//! The builder treats the compiler as a replaceable collaborator behind the
//! `quarry_core::Compiler` trait; this is the implementation it uses unless
//! told otherwise.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bool_compiler;

pub use bool_compiler::BoolCompiler;
