//! Declaration resolution.
//!
//! The resolver turns declarations into descriptors by recursive
//! descent: typedefs unwrap to their innermost aliased type, pointer
//! and array layers accumulate onto the spelling, structures and
//! functions recurse into members and parameters. Named declarations
//! are registered *before* their bodies are resolved, so a structure
//! holding a pointer to itself finds its own in-progress descriptor.
//!
//! The dependency tracker lives here too: whenever a leaf references a
//! named declaration that is not yet declared, the outermost enclosing
//! root acquires (at most) one dependency, and the referenced
//! descriptor records the reverse edge. References to names with no
//! descriptor at all go through the futures set and are wired up in
//! [`Resolver::finish`], once every declaration has been seen.

use ctypegen_decl::filter::is_identifier;
use ctypegen_decl::model::{Decl, Member, Signature, TypeRef};

use crate::clean::normalize;
use crate::descriptor::{DescriptorId, Kind, Spelling};
use crate::registry::{Futures, Registry};
use crate::scalar::scalar_target;

/// Recursive-descent resolver over one registry/futures pair.
pub struct Resolver<'a> {
    registry: &'a mut Registry,
    futures: &'a mut Futures,
    /// Suppress pointer-to-scalar convenience aliases.
    explicit: bool,
    /// (root, referenced name) pairs awaiting a declaration that had
    /// not been seen yet, in discovery order.
    pending: Vec<(DescriptorId, String)>,
}

impl<'a> Resolver<'a> {
    pub fn new(registry: &'a mut Registry, futures: &'a mut Futures, explicit: bool) -> Self {
        Resolver {
            registry,
            futures,
            explicit,
            pending: Vec::new(),
        }
    }

    /// Resolve one top-level declaration into a descriptor.
    ///
    /// Resolving the same name twice returns the identical descriptor
    /// (registry lookup-before-create).
    pub fn resolve_decl(&mut self, decl: &Decl) -> DescriptorId {
        if let Some(id) = self.registry.lookup(decl.name()) {
            return id;
        }
        match decl {
            Decl::Typedef { name, ty } => self.resolve_typedef(name, ty),
            Decl::Enum { name, enumerators } => {
                let id = self.registry.alloc(Kind::Enumeration, None);
                self.registry.bind(name, id);
                let d = self.registry.get_mut(id);
                d.spelling = Spelling::Ctype("c_int");
                d.enumerators = enumerators
                    .iter()
                    .map(|e| (e.name.clone(), e.value))
                    .collect();
                id
            }
            Decl::Struct { name, members } => {
                let id = self.registry.alloc(Kind::Structure, None);
                self.registry.bind(name, id);
                self.registry.get_mut(id).spelling = Spelling::Name(name.clone());
                for member in members {
                    match member {
                        Member::Field { name, ty } => {
                            if !is_identifier(name) {
                                continue;
                            }
                            let mid = self.resolve_type(ty, id);
                            self.registry.get_mut(id).members.push((name.clone(), mid));
                        }
                        Member::Method { name, signature } => {
                            if !is_identifier(name) {
                                continue;
                            }
                            let mid = self.registry.alloc(Kind::Function, Some(id));
                            self.resolve_signature(signature, mid);
                            self.registry.get_mut(id).members.push((name.clone(), mid));
                        }
                        Member::Constructor { .. } => {}
                    }
                }
                id
            }
            Decl::Function { name, signature } => {
                let id = self.registry.alloc(Kind::Function, None);
                self.registry.bind(name, id);
                self.resolve_signature(signature, id);
                id
            }
        }
    }

    /// Wire forward references whose declarations arrived later.
    ///
    /// Must run after the final `resolve_decl`; names that never got a
    /// declaration simply stay opaque.
    pub fn finish(mut self) {
        for (root, name) in std::mem::take(&mut self.pending) {
            if let Some(dep) = self.registry.lookup(&name) {
                if self.registry.get(dep).kind != Kind::Enumeration {
                    self.set_root_dependency(root, dep);
                }
            }
        }
    }

    fn resolve_typedef(&mut self, name: &str, ty: &TypeRef) -> DescriptorId {
        let id = self.registry.alloc(Kind::Typedef, None);
        self.registry.bind(name, id);
        let inner = self.resolve_type(ty, id);
        // Merge the aliased type into the typedef's own descriptor.
        let src = self.registry.get(inner).clone();
        let d = self.registry.get_mut(id);
        d.spelling = src.spelling;
        d.source = src.source;
        d.pointer_depth = src.pointer_depth;
        d.array_extent = src.array_extent;
        d.is_reference = src.is_reference;
        d.parameters = src.parameters;
        d.returns = src.returns;
        id
    }

    /// Resolve a nested type reference into an (anonymous) descriptor.
    fn resolve_type(&mut self, ty: &TypeRef, parent: DescriptorId) -> DescriptorId {
        match ty {
            TypeRef::Named(raw) => self.resolve_named(raw, 0, parent),
            TypeRef::Reference(inner) => {
                let id = self.resolve_type(inner, parent);
                let d = self.registry.get_mut(id);
                d.is_reference = true;
                d.kind = Kind::Reference;
                id
            }
            TypeRef::Pointer(inner) => {
                // Peel consecutive structural pointer layers.
                let mut layers: u32 = 1;
                let mut base: &TypeRef = inner;
                while let TypeRef::Pointer(next) = base {
                    layers += 1;
                    base = next;
                }
                if let TypeRef::Named(raw) = base {
                    return self.resolve_named(raw, layers, parent);
                }
                let id = self.registry.alloc(Kind::Pointer, Some(parent));
                let bid = self.resolve_type(base, id);
                let b = self.registry.get(bid).clone();
                let mut spelling = b.spelling;
                for _ in 0..layers {
                    spelling = spelling.wrap_pointer(self.explicit);
                }
                let d = self.registry.get_mut(id);
                d.spelling = spelling;
                d.source = b.source;
                d.pointer_depth = b.pointer_depth + layers;
                d.is_reference = b.is_reference;
                // A pointer to a callable keeps the signature, so a
                // function-pointer typedef can stub and patch like any
                // other callable.
                d.returns = b.returns;
                d.parameters = b.parameters;
                id
            }
            TypeRef::Array { element, extent } => {
                let id = self.registry.alloc(Kind::Array, Some(parent));
                let eid = self.resolve_type(element, id);
                let e = self.registry.get(eid).clone();
                let d = self.registry.get_mut(id);
                d.spelling = e.spelling.wrap_array(*extent);
                d.source = e.source;
                d.pointer_depth = e.pointer_depth;
                d.array_extent = Some(*extent);
                id
            }
            TypeRef::Function(sig) => {
                let id = self.registry.alloc(Kind::Function, Some(parent));
                self.resolve_signature(sig, id);
                id
            }
        }
    }

    /// Resolve return and parameter types onto a function descriptor.
    fn resolve_signature(&mut self, sig: &Signature, id: DescriptorId) {
        self.registry.get_mut(id).spelling = Spelling::Callable(id);
        let ret = self.resolve_type(&sig.return_type, id);
        self.registry.get_mut(id).returns = Some(ret);
        for param in &sig.parameters {
            let pid = self.resolve_type(&param.ty, id);
            self.registry.get_mut(id).parameters.push(pid);
        }
    }

    /// Resolve a leaf spelling, plus `extra_layers` structural pointer
    /// layers already peeled by the caller.
    fn resolve_named(&mut self, raw: &str, extra_layers: u32, parent: DescriptorId) -> DescriptorId {
        let normalized = normalize(raw);
        let mut s = normalized.as_str();
        let mut is_reference = false;
        if let Some(stripped) = s.strip_suffix('&') {
            s = stripped;
            is_reference = true;
        }

        let id = self.registry.alloc(Kind::Scalar, Some(parent));
        self.registry.get_mut(id).source = Some(normalized.clone());
        self.registry.get_mut(id).is_reference = is_reference;

        // Whole-spelling scalar hit first; this covers the pointer
        // convenience rows like `void*` and `char*`.
        if let Some(ct) = scalar_target(s) {
            let base_depth = if s == "void*" { 1 } else { 0 };
            let mut spelling = Spelling::Ctype(ct);
            for _ in 0..extra_layers {
                spelling = spelling.wrap_pointer(self.explicit);
            }
            let d = self.registry.get_mut(id);
            d.spelling = spelling;
            d.pointer_depth = base_depth + extra_layers;
            if extra_layers > 0 {
                d.kind = Kind::Pointer;
            }
            return id;
        }

        // Peel trailing indirection markers off the spelling itself.
        let mut layers = extra_layers;
        while let Some(stripped) = s.strip_suffix('*') {
            s = stripped;
            layers += 1;
        }
        let base = s.to_string();

        if base == "void" {
            let d = self.registry.get_mut(id);
            if layers > 0 {
                let mut spelling = Spelling::Ctype("c_void_p");
                for _ in 1..layers {
                    spelling = spelling.wrap_pointer(self.explicit);
                }
                d.spelling = spelling;
                d.pointer_depth = layers;
                d.kind = Kind::Pointer;
            } else {
                d.spelling = Spelling::Void;
            }
            return id;
        }

        if let Some(ct) = scalar_target(&base) {
            let mut spelling = Spelling::Ctype(ct);
            for _ in 0..layers {
                spelling = spelling.wrap_pointer(self.explicit);
            }
            let d = self.registry.get_mut(id);
            d.spelling = spelling;
            d.pointer_depth = layers;
            if layers > 0 {
                d.kind = Kind::Pointer;
            }
            return id;
        }

        if let Some(target) = self.registry.lookup(&base) {
            let target_kind = self.registry.get(target).kind;
            let target_declared = self.registry.get(target).declared;
            let mut spelling = Spelling::Name(base.clone());
            for _ in 0..layers {
                spelling = spelling.wrap_pointer(self.explicit);
            }
            let d = self.registry.get_mut(id);
            d.spelling = spelling;
            d.pointer_depth = layers;
            d.kind = if layers > 0 { Kind::Pointer } else { target_kind };
            // Enum references render as the integer representation and
            // never need the enum class to exist first.
            if target_kind != Kind::Enumeration && !target_declared {
                self.register_dependency(id, target);
            }
            return id;
        }

        // Unknown name. By pointer it is usable before (or without) a
        // definition; by value there is nothing to map to.
        if layers > 0 {
            self.futures.insert(&base);
            let mut spelling = Spelling::OpaquePointer(base.clone());
            for _ in 1..layers {
                spelling = spelling.wrap_pointer(self.explicit);
            }
            let root = self.root_of(id);
            self.pending.push((root, base));
            let d = self.registry.get_mut(id);
            d.spelling = spelling;
            d.pointer_depth = layers;
            d.kind = Kind::Pointer;
        } else {
            self.registry.get_mut(id).kind = Kind::Unresolved;
        }
        id
    }

    /// Record `referenced` as the dependency of `referrer`'s root.
    fn register_dependency(&mut self, referrer: DescriptorId, referenced: DescriptorId) {
        let root = self.root_of(referrer);
        self.set_root_dependency(root, referenced);
    }

    fn set_root_dependency(&mut self, root: DescriptorId, referenced: DescriptorId) {
        match self.registry.get(root).dependency {
            None => {
                self.registry.get_mut(root).dependency = Some(referenced);
                self.registry.get_mut(referenced).dependents.push(root);
            }
            Some(existing) if existing != referenced => {
                // Earlier-declared wins the single dependency slot.
                let old = self
                    .registry
                    .insertion_index(existing)
                    .unwrap_or(usize::MAX);
                let new = self
                    .registry
                    .insertion_index(referenced)
                    .unwrap_or(usize::MAX);
                if new < old {
                    self.registry
                        .get_mut(existing)
                        .dependents
                        .retain(|&d| d != root);
                    self.registry.get_mut(root).dependency = Some(referenced);
                    self.registry.get_mut(referenced).dependents.push(root);
                }
            }
            Some(_) => {}
        }
    }

    /// Walk parent back-links up to the outermost enclosing root.
    fn root_of(&self, id: DescriptorId) -> DescriptorId {
        let mut current = id;
        while let Some(parent) = self.registry.get(current).parent {
            current = parent;
        }
        current
    }
}
