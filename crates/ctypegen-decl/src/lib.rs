//! Declaration tree model for the ctypegen translation engine.
//!
//! This crate is the contract with the external front end that parses
//! source headers: a flat, ordered list of top-level declarations with
//! nested type references, loadable from TOML or JSON, plus the
//! name-membership filter that selects the declarations relevant to a
//! run.
//!
//! ## Modules
//!
//! - [`model`] — declaration tree types and (de)serialization
//! - [`filter`] — identifier-set relevance filter
//! - [`error`] — loading error types

pub mod error;
pub mod filter;
pub mod model;

pub use error::DeclError;
pub use filter::{is_identifier, NameFilter};
pub use model::{Decl, DeclTree, Enumerator, Member, Param, Signature, TypeRef};
