//! Emission planning.
//!
//! Cyclic declaration graphs cannot be emitted declare-before-use in a
//! single pass. The planner walks the registry in insertion order and
//! splits each named root into at most two emission units: a `Pre`
//! stub that makes the name bindable, and a `Post` patch that fills in
//! the body once every referenced name exists. Roots with no
//! undeclared dependency emit as a single `Complete` unit, and each
//! completion cascades patches through the recorded dependents.

use serde::Serialize;

use crate::descriptor::{DescriptorId, Kind};
use crate::registry::Registry;

/// How much of a root one emission unit carries.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    /// Nothing emitted yet.
    Undefined,
    /// Forward stub only; the body comes later.
    Pre,
    /// Body patch for an earlier stub.
    Post,
    /// Stub and patch folded together for callables; renders like a
    /// patch but counts as a full definition.
    Mixed,
    /// Whole definition in one unit.
    Complete,
}

/// Caller control over the two-phase split.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PhaseOverride {
    /// Split only where an undeclared dependency forces it.
    #[default]
    Automatic,
    /// Stub every root, then patch every root.
    ForcedPre,
    /// Emit every root as a patch with no stubs.
    ForcedPost,
}

/// One scheduled emission step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Unit {
    pub id: DescriptorId,
    pub name: String,
    pub phase: Phase,
}

/// Ordered emission schedule over one registry.
#[derive(Clone, Debug, Default)]
pub struct Plan {
    pub units: Vec<Unit>,
}

/// Schedule every named root for emission.
///
/// Marks descriptors `declared` as their definitions land; the same
/// registry must not be planned twice.
pub fn plan(registry: &mut Registry, phase_override: PhaseOverride) -> Plan {
    let roots: Vec<DescriptorId> = registry.named().collect();
    let mut units = Vec::new();
    let mut stubbed = vec![false; registry.len()];

    if phase_override == PhaseOverride::ForcedPost {
        for &id in &roots {
            push_patch(registry, &mut units, id);
        }
        return Plan { units };
    }

    // First pass: complete what can be completed, stub the rest.
    for &id in &roots {
        let force_stub = phase_override == PhaseOverride::ForcedPre;
        if force_stub || has_undeclared_dependency(registry, id) {
            units.push(Unit {
                id,
                name: root_name(registry, id),
                phase: Phase::Pre,
            });
            stubbed[id.0 as usize] = true;
        } else {
            units.push(Unit {
                id,
                name: root_name(registry, id),
                phase: Phase::Complete,
            });
            registry.get_mut(id).declared = true;
            cascade(registry, &mut units, &stubbed, id);
        }
    }

    // Second pass: every stub now exists, so remaining bodies can land
    // in any order. Insertion order keeps the output stable.
    for &id in &roots {
        if !registry.get(id).declared {
            push_patch(registry, &mut units, id);
            cascade(registry, &mut units, &stubbed, id);
        }
    }

    Plan { units }
}

/// Patch every not-yet-declared dependent of a freshly declared root,
/// transitively.
fn cascade(registry: &mut Registry, units: &mut Vec<Unit>, stubbed: &[bool], start: DescriptorId) {
    let mut worklist = vec![start];
    while let Some(id) = worklist.pop() {
        let dependents = registry.get(id).dependents.clone();
        for dep in dependents {
            if stubbed[dep.0 as usize] && !registry.get(dep).declared {
                push_patch(registry, units, dep);
                worklist.push(dep);
            }
        }
    }
}

fn push_patch(registry: &mut Registry, units: &mut Vec<Unit>, id: DescriptorId) {
    let phase = if registry.get(id).kind == Kind::Function {
        Phase::Mixed
    } else {
        Phase::Post
    };
    units.push(Unit {
        id,
        name: root_name(registry, id),
        phase,
    });
    registry.get_mut(id).declared = true;
}

fn has_undeclared_dependency(registry: &Registry, id: DescriptorId) -> bool {
    match registry.get(id).dependency {
        Some(dep) => dep == id || !registry.get(dep).declared,
        None => false,
    }
}

fn root_name(registry: &Registry, id: DescriptorId) -> String {
    registry.get(id).name.clone().unwrap_or_default()
}

/// Names of member or parameter slots of a root that resolved to
/// nothing usable.
pub fn unresolved_slots(registry: &Registry, id: DescriptorId) -> Vec<String> {
    let d = registry.get(id);
    let mut slots = Vec::new();
    for (name, mid) in &d.members {
        if slot_missing(registry, *mid) {
            slots.push(name.clone());
        }
    }
    if let Some(ret) = d.returns {
        if slot_missing(registry, ret) {
            slots.push("return".to_string());
        }
    }
    for (i, pid) in d.parameters.iter().enumerate() {
        if slot_missing(registry, *pid) {
            slots.push(format!("arg{i}"));
        }
    }
    slots
}

/// Whether one slot failed to resolve. A callable slot has no spelling
/// of its own; it is unresolved iff its return or a parameter is.
fn slot_missing(registry: &Registry, id: DescriptorId) -> bool {
    let d = registry.get(id);
    if d.is_callable() {
        d.returns.is_some_and(|r| slot_missing(registry, r))
            || d.parameters.iter().any(|&p| slot_missing(registry, p))
    } else {
        d.spelling.is_missing()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Futures, Registry};
    use crate::resolve::Resolver;
    use ctypegen_decl::model::{Decl, Member, TypeRef};

    fn field(name: &str, spelling: &str) -> Member {
        Member::Field {
            name: name.to_string(),
            ty: TypeRef::Named(spelling.to_string()),
        }
    }

    fn strukt(name: &str, members: Vec<Member>) -> Decl {
        Decl::Struct {
            name: name.to_string(),
            members,
        }
    }

    fn planned(decls: &[Decl], phase_override: PhaseOverride) -> (Registry, Plan) {
        let mut registry = Registry::new();
        let mut futures = Futures::new();
        let mut resolver = Resolver::new(&mut registry, &mut futures, false);
        for decl in decls {
            resolver.resolve_decl(decl);
        }
        resolver.finish();
        let plan = plan(&mut registry, phase_override);
        (registry, plan)
    }

    fn phases(plan: &Plan) -> Vec<(&str, Phase)> {
        plan.units
            .iter()
            .map(|u| (u.name.as_str(), u.phase))
            .collect()
    }

    #[test]
    fn acyclic_roots_complete_in_order() {
        let decls = vec![
            strukt("A", vec![field("x", "int")]),
            strukt("B", vec![field("a", "A")]),
        ];
        let (_, plan) = planned(&decls, PhaseOverride::Automatic);
        assert_eq!(
            phases(&plan),
            vec![("A", Phase::Complete), ("B", Phase::Complete)]
        );
    }

    #[test]
    fn self_reference_splits_once() {
        let decls = vec![strukt("Node", vec![field("next", "Node*")])];
        let (_, plan) = planned(&decls, PhaseOverride::Automatic);
        assert_eq!(
            phases(&plan),
            vec![("Node", Phase::Pre), ("Node", Phase::Post)]
        );
    }

    #[test]
    fn mutual_cycle_stubs_then_patches() {
        let decls = vec![
            strukt("A", vec![field("b", "B*")]),
            strukt("B", vec![field("a", "A*")]),
        ];
        let (_, plan) = planned(&decls, PhaseOverride::Automatic);
        // A stubs (forward ref to B), B stubs (A not declared), then
        // the second pass patches A, which cascades into B.
        assert_eq!(
            phases(&plan),
            vec![
                ("A", Phase::Pre),
                ("B", Phase::Pre),
                ("A", Phase::Post),
                ("B", Phase::Post),
            ]
        );
    }

    #[test]
    fn completion_cascades_into_waiting_dependents() {
        // C waits on D; once D completes, C patches immediately.
        let decls = vec![
            strukt("C", vec![field("d", "D*")]),
            strukt("D", vec![field("x", "int")]),
        ];
        let (_, plan) = planned(&decls, PhaseOverride::Automatic);
        assert_eq!(
            phases(&plan),
            vec![
                ("C", Phase::Pre),
                ("D", Phase::Complete),
                ("C", Phase::Post),
            ]
        );
    }

    #[test]
    fn functions_patch_as_mixed() {
        let decls = vec![
            Decl::Function {
                name: "make_node".to_string(),
                signature: ctypegen_decl::model::Signature {
                    return_type: TypeRef::Named("Node*".to_string()),
                    parameters: vec![],
                },
            },
            strukt("Node", vec![field("x", "int")]),
        ];
        let (_, plan) = planned(&decls, PhaseOverride::Automatic);
        assert_eq!(
            phases(&plan),
            vec![
                ("make_node", Phase::Pre),
                ("Node", Phase::Complete),
                ("make_node", Phase::Mixed),
            ]
        );
    }

    #[test]
    fn forced_pre_stubs_everything_first() {
        let decls = vec![
            strukt("A", vec![field("x", "int")]),
            strukt("B", vec![field("a", "A")]),
        ];
        let (_, plan) = planned(&decls, PhaseOverride::ForcedPre);
        assert_eq!(
            phases(&plan),
            vec![
                ("A", Phase::Pre),
                ("B", Phase::Pre),
                ("A", Phase::Post),
                ("B", Phase::Post),
            ]
        );
    }

    #[test]
    fn forced_post_skips_stubs() {
        let decls = vec![strukt("A", vec![field("x", "int")])];
        let (_, plan) = planned(&decls, PhaseOverride::ForcedPost);
        assert_eq!(phases(&plan), vec![("A", Phase::Post)]);
    }

    #[test]
    fn every_root_ends_declared() {
        let decls = vec![
            strukt("A", vec![field("b", "B*")]),
            strukt("B", vec![field("c", "C*")]),
            strukt("C", vec![field("a", "A*")]),
        ];
        let (registry, plan) = planned(&decls, PhaseOverride::Automatic);
        for id in registry.named() {
            assert!(registry.get(id).declared);
        }
        // Three stubs plus three patches.
        assert_eq!(plan.units.len(), 6);
    }

    #[test]
    fn unresolved_slots_reported() {
        let decls = vec![strukt(
            "S",
            vec![field("ok", "int"), field("bad", "Mystery")],
        )];
        let (registry, _) = planned(&decls, PhaseOverride::Automatic);
        let s = registry.lookup("S").unwrap();
        assert_eq!(unresolved_slots(&registry, s), vec!["bad".to_string()]);
    }

    #[test]
    fn resolvable_method_member_is_not_a_slot() {
        let decls = vec![Decl::Struct {
            name: "Animal".to_string(),
            members: vec![Member::Method {
                name: "rename".to_string(),
                signature: ctypegen_decl::model::Signature {
                    return_type: TypeRef::Named("void".to_string()),
                    parameters: vec![ctypegen_decl::model::Param {
                        name: Some("name".to_string()),
                        ty: TypeRef::Named("const char*".to_string()),
                        default: None,
                    }],
                },
            }],
        }];
        let (registry, _) = planned(&decls, PhaseOverride::Automatic);
        let a = registry.lookup("Animal").unwrap();
        assert!(unresolved_slots(&registry, a).is_empty());
    }

    #[test]
    fn method_with_unmappable_parameter_is_a_slot() {
        let decls = vec![Decl::Struct {
            name: "Animal".to_string(),
            members: vec![Member::Method {
                name: "feed".to_string(),
                signature: ctypegen_decl::model::Signature {
                    return_type: TypeRef::Named("void".to_string()),
                    parameters: vec![ctypegen_decl::model::Param {
                        name: Some("what".to_string()),
                        ty: TypeRef::Named("Mystery".to_string()),
                        default: None,
                    }],
                },
            }],
        }];
        let (registry, _) = planned(&decls, PhaseOverride::Automatic);
        let a = registry.lookup("Animal").unwrap();
        assert_eq!(unresolved_slots(&registry, a), vec!["feed".to_string()]);
    }
}
