//! Translation of foreign declaration trees into Python ctypes
//! binding modules.
//!
//! The pipeline has three stages. The [`resolve::Resolver`] turns
//! declarations into interned [`descriptor::TypeDescriptor`]s inside a
//! [`registry::Registry`], recording one dependency edge per root
//! where a referenced name is not yet declared. [`plan::plan`] then
//! schedules emission, splitting cyclic roots into a stub and a patch
//! so every name exists before it is used. Finally
//! [`render::render_module`] prints the schedule as Python source.
//!
//! [`translate`] runs the whole pipeline over one [`DeclTree`].

pub mod clean;
pub mod descriptor;
pub mod plan;
pub mod registry;
pub mod render;
pub mod resolve;
pub mod scalar;

use serde::Serialize;

use ctypegen_decl::model::DeclTree;

pub use crate::plan::{Phase, PhaseOverride};
pub use crate::render::CommentStyle;

/// Knobs for one translation run.
#[derive(Copy, Clone, Debug, Default)]
pub struct TranslateOptions {
    /// Keep pointer-to-scalar spellings structural instead of using
    /// the `c_char_p` style convenience aliases.
    pub explicit: bool,
    pub comment_style: CommentStyle,
    pub phase_override: PhaseOverride,
}

/// A root whose definition has holes.
#[derive(Clone, Debug, Serialize)]
pub struct Warning {
    pub unit: String,
    /// Member, parameter, or return slots that resolved to nothing.
    pub slots: Vec<String>,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: unresolved {}", self.unit, self.slots.join(", "))
    }
}

/// One scheduled emission step, for reporting.
#[derive(Clone, Debug, Serialize)]
pub struct UnitReport {
    pub name: String,
    pub phase: Phase,
}

/// The output of one translation run.
#[derive(Clone, Debug, Serialize)]
pub struct Translation {
    /// The rendered Python module.
    pub module: String,
    /// Emission schedule, in output order.
    pub units: Vec<UnitReport>,
    pub warnings: Vec<Warning>,
}

/// Translate a declaration tree into a ctypes binding module.
///
/// Each call builds a fresh registry, so equal inputs produce
/// byte-identical output.
pub fn translate(tree: &DeclTree, options: &TranslateOptions) -> Translation {
    let mut registry = registry::Registry::new();
    let mut futures = registry::Futures::new();
    let mut resolver = resolve::Resolver::new(&mut registry, &mut futures, options.explicit);
    for decl in &tree.declarations {
        resolver.resolve_decl(decl);
    }
    resolver.finish();

    let plan = plan::plan(&mut registry, options.phase_override);
    let module = render::render_module(&registry, &plan, options.comment_style);

    let units = plan
        .units
        .iter()
        .map(|u| UnitReport {
            name: u.name.clone(),
            phase: u.phase,
        })
        .collect();

    let mut warnings = Vec::new();
    for id in registry.named() {
        let slots = plan::unresolved_slots(&registry, id);
        if !slots.is_empty() {
            if let Some(name) = registry.get(id).name.clone() {
                warnings.push(Warning { unit: name, slots });
            }
        }
    }

    Translation {
        module,
        units,
        warnings,
    }
}
