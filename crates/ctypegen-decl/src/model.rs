//! Declaration tree data model.
//!
//! A `DeclTree` is the contract with the front end that parses source
//! headers: a flat list of top-level declarations, each carrying its
//! name, kind, and nested type references. The translation engine is
//! driven entirely off this model and never looks at source text.
//!
//! Trees are usually loaded from a TOML or JSON file produced by the
//! front end, but can also be built programmatically.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DeclError, Result};
use crate::filter::NameFilter;

/// A reference to a type, as spelled in the source declaration.
///
/// `Named` carries the raw source spelling, which may itself include
/// trailing `*`/`&` markers and qualifiers; the engine normalizes it.
/// The structural variants wrap another reference explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TypeRef {
    /// A raw type spelling, e.g. `"unsigned int"` or `"const Node*"`.
    Named(String),
    /// Pointer to another type.
    Pointer(Box<TypeRef>),
    /// Reference to another type.
    Reference(Box<TypeRef>),
    /// Fixed-size array of another type.
    Array {
        element: Box<TypeRef>,
        extent: u64,
    },
    /// A function type (used by callable typedefs).
    Function(Box<Signature>),
}

/// A callable signature: return type plus ordered parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Signature {
    /// Return type.
    pub return_type: TypeRef,
    /// Parameters, in declaration order.
    #[serde(default)]
    pub parameters: Vec<Param>,
}

/// A single parameter of a callable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Param {
    /// Parameter name (may be absent for unnamed parameters).
    #[serde(default)]
    pub name: Option<String>,
    /// Parameter type.
    pub ty: TypeRef,
    /// Default value expression, carried verbatim and never evaluated.
    #[serde(default)]
    pub default: Option<String>,
}

/// A member of an aggregate declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Member {
    /// A data field.
    Field { name: String, ty: TypeRef },
    /// A member function.
    Method { name: String, signature: Signature },
    /// A constructor. Skipped by the engine.
    Constructor { signature: Signature },
}

/// One enumerator: name and explicit integral value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enumerator {
    pub name: String,
    pub value: i64,
}

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Decl {
    /// A type alias.
    Typedef { name: String, ty: TypeRef },
    /// An enumeration with explicit (name, value) pairs.
    Enum {
        name: String,
        #[serde(default)]
        enumerators: Vec<Enumerator>,
    },
    /// A structure or class.
    Struct {
        name: String,
        #[serde(default)]
        members: Vec<Member>,
    },
    /// A free function.
    Function { name: String, signature: Signature },
}

impl Decl {
    /// The declaration's name.
    pub fn name(&self) -> &str {
        match self {
            Decl::Typedef { name, .. }
            | Decl::Enum { name, .. }
            | Decl::Struct { name, .. }
            | Decl::Function { name, .. } => name,
        }
    }
}

/// A complete declaration tree, in source declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclTree {
    #[serde(default)]
    pub declarations: Vec<Decl>,
}

impl DeclTree {
    /// Parse a declaration tree from a TOML string.
    pub fn parse_toml(input: &str) -> Result<Self> {
        Ok(toml::from_str(input)?)
    }

    /// Parse a declaration tree from a JSON string.
    pub fn parse_json(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Load a declaration tree from a file, dispatching on extension.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::parse_toml(&content),
            Some("json") => Self::parse_json(&content),
            _ => Err(DeclError::UnsupportedExtension {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Keep only declarations whose names are in the filter.
    ///
    /// Declaration order is preserved.
    pub fn retain(&mut self, filter: &NameFilter) {
        self.declarations.retain(|d| filter.contains(d.name()));
    }

    /// Whether the tree holds no declarations.
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}
