//! Type descriptors: the resolved, canonical representation of one
//! source type or declaration.
//!
//! Descriptors live in the registry arena and refer to each other by
//! stable [`DescriptorId`] indices, so cyclic declaration graphs (a
//! structure holding a pointer to itself, or two structures pointing
//! at each other) are just indices and never an ownership problem.

use std::fmt;

use crate::scalar::pointer_alias;

/// Stable index of a descriptor in the registry arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DescriptorId(pub u32);

impl fmt::Display for DescriptorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What shape of source construct a descriptor stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Scalar,
    Pointer,
    Array,
    Reference,
    Function,
    Structure,
    Enumeration,
    Typedef,
    /// A by-value use of a name with no known mapping.
    Unresolved,
}

/// Canonical target spelling, composed structurally.
///
/// Rendering happens against the finished registry, which is what lets
/// [`Spelling::OpaquePointer`] decide between `ctypes.POINTER(Name)`
/// and the plain `ctypes.c_void_p` fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Spelling {
    /// A ctypes scalar identifier, e.g. `c_int`.
    Ctype(&'static str),
    /// A user declaration, by registry name.
    Name(String),
    /// `ctypes.POINTER(inner)`.
    PointerTo(Box<Spelling>),
    /// `inner * extent`.
    ArrayOf(Box<Spelling>, u64),
    /// Pointer to a named aggregate that may never be declared.
    OpaquePointer(String),
    /// A callable, by descriptor id; renders as
    /// `ctypes.CFUNCTYPE(restype, args...)` from the descriptor's
    /// return and parameter slots.
    Callable(DescriptorId),
    /// The `void` non-type; renders as `None`.
    Void,
    /// No mapping exists; renders as the `None` placeholder and is
    /// surfaced through the unresolved-slot query.
    Missing,
}

impl Spelling {
    /// Wrap one pointer layer around this spelling.
    ///
    /// Adopts the target's pointer-to-scalar convenience alias when one
    /// exists, unless `explicit` suppresses aliasing.
    pub fn wrap_pointer(self, explicit: bool) -> Spelling {
        match self {
            Spelling::Ctype(c) if !explicit => match pointer_alias(c) {
                Some(alias) => Spelling::Ctype(alias),
                None => Spelling::PointerTo(Box::new(Spelling::Ctype(c))),
            },
            Spelling::Void => Spelling::Ctype("c_void_p"),
            Spelling::Missing => Spelling::Missing,
            other => Spelling::PointerTo(Box::new(other)),
        }
    }

    /// Wrap this spelling as a fixed-size array element.
    pub fn wrap_array(self, extent: u64) -> Spelling {
        Spelling::ArrayOf(Box::new(self), extent)
    }

    /// Whether this spelling (at any nesting depth) failed to resolve.
    ///
    /// A `Callable` spelling is never missing on its own; holes in its
    /// return or parameter slots are surfaced through the per-slot
    /// unresolved query instead.
    pub fn is_missing(&self) -> bool {
        match self {
            Spelling::Missing => true,
            Spelling::PointerTo(inner) | Spelling::ArrayOf(inner, _) => inner.is_missing(),
            _ => false,
        }
    }
}

/// The resolved representation of one source type or declaration.
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    /// This descriptor's own arena index.
    pub id: DescriptorId,
    pub kind: Kind,
    /// Declaration name; anonymous type expressions have none.
    pub name: Option<String>,
    /// Normalized source spelling, kept for provenance comments.
    pub source: Option<String>,
    /// Canonical target spelling.
    pub spelling: Spelling,
    /// Accumulated pointer indirection depth.
    pub pointer_depth: u32,
    /// Fixed array extent, when array-wrapped.
    pub array_extent: Option<u64>,
    /// Whether the original was a reference rather than a value.
    pub is_reference: bool,
    /// Parameters, for Function kind, in declaration order.
    pub parameters: Vec<DescriptorId>,
    /// Return type, for Function kind.
    pub returns: Option<DescriptorId>,
    /// Named members, for Structure kind, in declaration order.
    pub members: Vec<(String, DescriptorId)>,
    /// (name, value) pairs, for Enumeration kind, in declaration order.
    pub enumerators: Vec<(String, i64)>,
    /// The single outstanding forward reference, if any.
    pub dependency: Option<DescriptorId>,
    /// Roots that must be patched once this descriptor is declared,
    /// in registration order.
    pub dependents: Vec<DescriptorId>,
    /// Whether the final form has been emitted.
    pub declared: bool,
    /// Non-owning back-link to the enclosing descriptor; the chain
    /// terminates at the root declaration.
    pub parent: Option<DescriptorId>,
}

impl TypeDescriptor {
    pub(crate) fn new(id: DescriptorId, kind: Kind, parent: Option<DescriptorId>) -> Self {
        TypeDescriptor {
            id,
            kind,
            name: None,
            source: None,
            spelling: Spelling::Missing,
            pointer_depth: 0,
            array_extent: None,
            is_reference: false,
            parameters: Vec::new(),
            returns: None,
            members: Vec::new(),
            enumerators: Vec::new(),
            dependency: None,
            dependents: Vec::new(),
            declared: false,
            parent,
        }
    }

    /// Whether this descriptor emits as a callable type.
    pub fn is_callable(&self) -> bool {
        matches!(self.kind, Kind::Function) || self.returns.is_some()
    }
}
