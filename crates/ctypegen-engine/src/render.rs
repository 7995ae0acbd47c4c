//! Python module rendering.
//!
//! Turns a finished registry plus an emission plan into ctypes binding
//! source. Spellings are structural until this point; rendering is
//! where an opaque pointer becomes `ctypes.POINTER(Name)` when the
//! name acquired a declaration and `ctypes.c_void_p` when it never
//! did, and where enum references collapse to their integer
//! representation.

use std::fmt::Write;

use crate::descriptor::{DescriptorId, Kind, Spelling};
use crate::plan::{Phase, Plan};
use crate::registry::Registry;

/// Where generated comments go.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum CommentStyle {
    /// No comments at all.
    None,
    /// Trailing comment on the defining line.
    Inline,
    /// Comment line above each definition.
    Block,
    /// Block comments on definitions, inline comments on fields.
    #[default]
    Mixed,
}

impl CommentStyle {
    fn block_on_units(self) -> bool {
        matches!(self, CommentStyle::Block | CommentStyle::Mixed)
    }

    fn inline_on_units(self) -> bool {
        self == CommentStyle::Inline
    }

    fn inline_on_fields(self) -> bool {
        matches!(self, CommentStyle::Inline | CommentStyle::Mixed)
    }
}

/// Render the whole plan as one Python module.
pub fn render_module(registry: &Registry, plan: &Plan, style: CommentStyle) -> String {
    let mut blocks = Vec::new();
    let mut needs_intenum = false;
    for unit in &plan.units {
        if registry.get(unit.id).kind == Kind::Enumeration && unit.phase != Phase::Pre {
            needs_intenum = true;
        }
        let text = render_unit(registry, unit.id, &unit.name, unit.phase, style);
        if !text.is_empty() {
            blocks.push(text);
        }
    }

    let mut out = String::from("import ctypes\n");
    if needs_intenum {
        out.push_str("from enum import IntEnum\n");
    }
    for block in blocks {
        out.push('\n');
        out.push_str(&block);
    }
    out
}

fn render_unit(
    registry: &Registry,
    id: DescriptorId,
    name: &str,
    phase: Phase,
    style: CommentStyle,
) -> String {
    let d = registry.get(id);
    let body = match d.kind {
        Kind::Enumeration => render_enum(registry, id, name, phase),
        Kind::Structure => render_struct(registry, id, name, phase, style),
        _ if d.is_callable() => render_callable_unit(registry, id, name, phase),
        _ => render_alias(registry, id, name, phase),
    };
    if body.is_empty() {
        return body;
    }
    decorate(&body, registry, id, name, phase, style)
}

fn decorate(
    body: &str,
    registry: &Registry,
    id: DescriptorId,
    name: &str,
    phase: Phase,
    style: CommentStyle,
) -> String {
    let d = registry.get(id);
    let label = match d.kind {
        Kind::Structure => "Structure",
        Kind::Enumeration => "Enum",
        _ if d.is_callable() => "Function type",
        _ => "Type",
    };
    let tag = match phase {
        Phase::Pre => " (Pre-definition)",
        Phase::Post | Phase::Mixed => " (Post-definition)",
        _ => "",
    };
    let comment = format!("# {label} for {name}{tag}");
    if style.block_on_units() {
        format!("{comment}\n{body}")
    } else if style.inline_on_units() {
        match body.split_once('\n') {
            Some((first, rest)) => format!("{first}  {comment}\n{rest}"),
            None => format!("{body}  {comment}"),
        }
    } else {
        body.to_string()
    }
}

fn render_enum(registry: &Registry, id: DescriptorId, name: &str, phase: Phase) -> String {
    if phase == Phase::Pre {
        // An enum reference never waits on the class, so there is
        // nothing a stub would unblock.
        return String::new();
    }
    let d = registry.get(id);
    let mut out = format!("class {name}(IntEnum):\n");
    if d.enumerators.is_empty() {
        out.push_str("    pass\n");
        return out;
    }
    for (label, value) in &d.enumerators {
        let _ = writeln!(out, "    {label} = {value}");
    }
    out
}

fn render_struct(
    registry: &Registry,
    id: DescriptorId,
    name: &str,
    phase: Phase,
    style: CommentStyle,
) -> String {
    let d = registry.get(id);
    match phase {
        Phase::Pre => format!("class {name}(ctypes.Structure):\n    pass\n"),
        Phase::Complete => {
            if d.members.is_empty() {
                return format!("class {name}(ctypes.Structure):\n    pass\n");
            }
            let mut out = format!("class {name}(ctypes.Structure):\n    _fields_ = [\n");
            push_fields(&mut out, registry, id, "        ", style);
            out.push_str("    ]\n");
            out
        }
        _ => {
            let mut out = format!("{name}._fields_ = [\n");
            push_fields(&mut out, registry, id, "    ", style);
            out.push_str("]\n");
            out
        }
    }
}

fn push_fields(
    out: &mut String,
    registry: &Registry,
    id: DescriptorId,
    indent: &str,
    style: CommentStyle,
) {
    for (fname, mid) in &registry.get(id).members {
        let m = registry.get(*mid);
        let spelling = render_spelling(registry, &m.spelling);
        let _ = write!(out, "{indent}(\"{fname}\", {spelling}),");
        if style.inline_on_fields() {
            if let Some(source) = &m.source {
                let _ = write!(out, "  # {source}");
            }
        }
        out.push('\n');
    }
}

fn render_callable_unit(registry: &Registry, id: DescriptorId, name: &str, phase: Phase) -> String {
    let d = registry.get(id);
    match phase {
        Phase::Pre => format!("{name} = ctypes.CFUNCTYPE(None)\n"),
        Phase::Complete => {
            let mut spelling = render_callable_spelling(registry, id);
            for _ in 0..d.pointer_depth {
                spelling = format!("ctypes.POINTER({spelling})");
            }
            format!("{name} = {spelling}\n")
        }
        _ => {
            if d.pointer_depth > 0 {
                // Patch through the stub object rather than rebinding
                // the name, so earlier captures stay valid.
                let mut spelling = render_callable_spelling(registry, id);
                for _ in 1..d.pointer_depth {
                    spelling = format!("ctypes.POINTER({spelling})");
                }
                return format!("{name}.contents = {spelling}\n");
            }
            let restype = d
                .returns
                .map(|r| render_spelling(registry, &registry.get(r).spelling))
                .unwrap_or_else(|| "None".to_string());
            let args: Vec<String> = d
                .parameters
                .iter()
                .map(|p| render_spelling(registry, &registry.get(*p).spelling))
                .collect();
            format!(
                "{name}.restype = {restype}\n{name}.argtypes = [{}]\n",
                args.join(", ")
            )
        }
    }
}

fn render_alias(registry: &Registry, id: DescriptorId, name: &str, phase: Phase) -> String {
    if phase == Phase::Pre {
        // A plain alias cannot exist before its target spelling does.
        return String::new();
    }
    let spelling = render_spelling(registry, &registry.get(id).spelling);
    format!("{name} = {spelling}\n")
}

/// Render one callable as a `ctypes.CFUNCTYPE(...)` expression.
fn render_callable_spelling(registry: &Registry, id: DescriptorId) -> String {
    let d = registry.get(id);
    let restype = d
        .returns
        .map(|r| render_spelling(registry, &registry.get(r).spelling))
        .unwrap_or_else(|| "None".to_string());
    let mut parts = vec![restype];
    for p in &d.parameters {
        parts.push(render_spelling(registry, &registry.get(*p).spelling));
    }
    format!("ctypes.CFUNCTYPE({})", parts.join(", "))
}

/// Render a structural spelling against the finished registry.
pub fn render_spelling(registry: &Registry, spelling: &Spelling) -> String {
    match spelling {
        Spelling::Ctype(c) => format!("ctypes.{c}"),
        Spelling::Void | Spelling::Missing => "None".to_string(),
        Spelling::Callable(id) => render_callable_spelling(registry, *id),
        Spelling::Name(n) => match registry.lookup(n) {
            Some(id) if registry.get(id).kind == Kind::Enumeration => {
                "ctypes.c_int".to_string()
            }
            _ => n.clone(),
        },
        Spelling::PointerTo(inner) => {
            format!("ctypes.POINTER({})", render_spelling(registry, inner))
        }
        Spelling::ArrayOf(inner, extent) => {
            format!("{} * {extent}", render_spelling(registry, inner))
        }
        Spelling::OpaquePointer(n) => match registry.lookup(n) {
            Some(id) if registry.get(id).kind == Kind::Enumeration => {
                "ctypes.POINTER(ctypes.c_int)".to_string()
            }
            Some(_) => format!("ctypes.POINTER({n})"),
            None => "ctypes.c_void_p".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{plan, PhaseOverride};
    use crate::registry::Futures;
    use crate::resolve::Resolver;
    use ctypegen_decl::model::{Decl, Enumerator, Member, Signature, TypeRef};

    fn field(name: &str, spelling: &str) -> Member {
        Member::Field {
            name: name.to_string(),
            ty: TypeRef::Named(spelling.to_string()),
        }
    }

    fn render(decls: &[Decl], style: CommentStyle) -> String {
        let mut registry = Registry::new();
        let mut futures = Futures::new();
        let mut resolver = Resolver::new(&mut registry, &mut futures, false);
        for decl in decls {
            resolver.resolve_decl(decl);
        }
        resolver.finish();
        let plan = plan(&mut registry, PhaseOverride::Automatic);
        render_module(&registry, &plan, style)
    }

    #[test]
    fn plain_struct_renders_complete() {
        let decls = vec![Decl::Struct {
            name: "Point".to_string(),
            members: vec![field("x", "int"), field("y", "int")],
        }];
        let out = render(&decls, CommentStyle::None);
        assert_eq!(
            out,
            "import ctypes\n\n\
             class Point(ctypes.Structure):\n    \
             _fields_ = [\n        \
             (\"x\", ctypes.c_int),\n        \
             (\"y\", ctypes.c_int),\n    \
             ]\n"
        );
    }

    #[test]
    fn self_reference_stub_then_patch() {
        let decls = vec![Decl::Struct {
            name: "Node".to_string(),
            members: vec![field("data", "int"), field("next", "Node*")],
        }];
        let out = render(&decls, CommentStyle::None);
        assert_eq!(
            out,
            "import ctypes\n\n\
             class Node(ctypes.Structure):\n    pass\n\n\
             Node._fields_ = [\n    \
             (\"data\", ctypes.c_int),\n    \
             (\"next\", ctypes.POINTER(Node)),\n\
             ]\n"
        );
    }

    #[test]
    fn enum_renders_as_intenum() {
        let decls = vec![Decl::Enum {
            name: "Color".to_string(),
            enumerators: vec![
                Enumerator {
                    name: "RED".to_string(),
                    value: 0,
                },
                Enumerator {
                    name: "BLUE".to_string(),
                    value: 5,
                },
            ],
        }];
        let out = render(&decls, CommentStyle::None);
        assert_eq!(
            out,
            "import ctypes\nfrom enum import IntEnum\n\n\
             class Color(IntEnum):\n    RED = 0\n    BLUE = 5\n"
        );
    }

    #[test]
    fn enum_member_renders_as_c_int() {
        let decls = vec![
            Decl::Enum {
                name: "Color".to_string(),
                enumerators: vec![Enumerator {
                    name: "RED".to_string(),
                    value: 0,
                }],
            },
            Decl::Struct {
                name: "Pixel".to_string(),
                members: vec![field("color", "Color")],
            },
        ];
        let out = render(&decls, CommentStyle::None);
        assert!(out.contains("(\"color\", ctypes.c_int),"));
    }

    #[test]
    fn never_declared_pointer_falls_back_to_void() {
        let decls = vec![Decl::Struct {
            name: "S".to_string(),
            members: vec![field("h", "Handle*")],
        }];
        let out = render(&decls, CommentStyle::None);
        assert!(out.contains("(\"h\", ctypes.c_void_p),"));
    }

    #[test]
    fn unresolved_by_value_renders_none_placeholder() {
        let decls = vec![Decl::Struct {
            name: "S".to_string(),
            members: vec![field("m", "Mystery")],
        }];
        let out = render(&decls, CommentStyle::None);
        assert!(out.contains("(\"m\", None),"));
    }

    #[test]
    fn function_renders_cfunctype() {
        let decls = vec![Decl::Function {
            name: "add".to_string(),
            signature: Signature {
                return_type: TypeRef::Named("int".to_string()),
                parameters: vec![
                    ctypegen_decl::model::Param {
                        name: Some("a".to_string()),
                        ty: TypeRef::Named("int".to_string()),
                        default: None,
                    },
                    ctypegen_decl::model::Param {
                        name: Some("b".to_string()),
                        ty: TypeRef::Named("int".to_string()),
                        default: None,
                    },
                ],
            },
        }];
        let out = render(&decls, CommentStyle::None);
        assert!(out.contains("add = ctypes.CFUNCTYPE(ctypes.c_int, ctypes.c_int, ctypes.c_int)\n"));
    }

    #[test]
    fn split_function_patches_restype_and_argtypes() {
        let decls = vec![
            Decl::Function {
                name: "make_node".to_string(),
                signature: Signature {
                    return_type: TypeRef::Named("Node*".to_string()),
                    parameters: vec![],
                },
            },
            Decl::Struct {
                name: "Node".to_string(),
                members: vec![field("x", "int")],
            },
        ];
        let out = render(&decls, CommentStyle::None);
        assert!(out.contains("make_node = ctypes.CFUNCTYPE(None)\n"));
        assert!(out.contains("make_node.restype = ctypes.POINTER(Node)\n"));
        assert!(out.contains("make_node.argtypes = []\n"));
    }

    #[test]
    fn block_comments_label_units() {
        let decls = vec![Decl::Struct {
            name: "Node".to_string(),
            members: vec![field("next", "Node*")],
        }];
        let out = render(&decls, CommentStyle::Block);
        assert!(out.contains("# Structure for Node (Pre-definition)\nclass Node(ctypes.Structure):"));
        assert!(out.contains("# Structure for Node (Post-definition)\nNode._fields_ = ["));
    }

    #[test]
    fn inline_comments_trail_first_line() {
        let decls = vec![Decl::Struct {
            name: "Point".to_string(),
            members: vec![field("x", "int")],
        }];
        let out = render(&decls, CommentStyle::Inline);
        assert!(out.contains("class Point(ctypes.Structure):  # Structure for Point\n"));
        assert!(out.contains("(\"x\", ctypes.c_int),  # int\n"));
    }

    #[test]
    fn mixed_comments_block_units_inline_fields() {
        let decls = vec![Decl::Struct {
            name: "Point".to_string(),
            members: vec![field("x", "unsigned int")],
        }];
        let out = render(&decls, CommentStyle::Mixed);
        assert!(out.contains("# Structure for Point\nclass Point(ctypes.Structure):"));
        assert!(out.contains("(\"x\", ctypes.c_uint),  # unsigned int\n"));
    }

    #[test]
    fn empty_struct_renders_pass() {
        let decls = vec![Decl::Struct {
            name: "Opaque".to_string(),
            members: vec![],
        }];
        let out = render(&decls, CommentStyle::None);
        assert!(out.contains("class Opaque(ctypes.Structure):\n    pass\n"));
    }

    #[test]
    fn pointer_to_function_field_renders_wrapped_cfunctype() {
        let decls = vec![Decl::Struct {
            name: "Ops".to_string(),
            members: vec![Member::Field {
                name: "callback".to_string(),
                ty: TypeRef::Pointer(Box::new(TypeRef::Function(Box::new(Signature {
                    return_type: TypeRef::Named("int".to_string()),
                    parameters: vec![],
                })))),
            }],
        }];
        let out = render(&decls, CommentStyle::None);
        assert!(out.contains(
            "(\"callback\", ctypes.POINTER(ctypes.CFUNCTYPE(ctypes.c_int))),"
        ));
    }

    #[test]
    fn split_function_pointer_typedef_patches_contents() {
        // The typedef waits on Node, so it stubs first and patches
        // through the stub object instead of rebinding the name.
        let decls = vec![
            Decl::Typedef {
                name: "Callback".to_string(),
                ty: TypeRef::Pointer(Box::new(TypeRef::Function(Box::new(Signature {
                    return_type: TypeRef::Named("Node*".to_string()),
                    parameters: vec![],
                })))),
            },
            Decl::Struct {
                name: "Node".to_string(),
                members: vec![field("x", "int")],
            },
        ];
        let out = render(&decls, CommentStyle::None);
        assert!(out.contains("Callback = ctypes.CFUNCTYPE(None)\n"));
        assert!(out
            .contains("Callback.contents = ctypes.CFUNCTYPE(ctypes.POINTER(Node))\n"));
        assert!(!out.contains("Callback = ctypes.POINTER("));
    }

    #[test]
    fn typedef_alias_assignment() {
        let decls = vec![
            Decl::Struct {
                name: "Node".to_string(),
                members: vec![field("x", "int")],
            },
            Decl::Typedef {
                name: "NodePtr".to_string(),
                ty: TypeRef::Pointer(Box::new(TypeRef::Named("Node".to_string()))),
            },
        ];
        let out = render(&decls, CommentStyle::None);
        assert!(out.contains("NodePtr = ctypes.POINTER(Node)\n"));
    }
}
