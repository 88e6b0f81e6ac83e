//! One interface model: types, declarations and composition with other units.

use rustc_hash::FxHashSet;

use crate::{Declarations, TypeId, TypePool};

/// Another interface this one builds on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncludedUnit {
    /// How the unit is named in diagnostics.
    pub label: String,
    /// Module name of the unit's generated C module, once it has one.
    pub module_name: Option<String>,
}

impl IncludedUnit {
    /// A unit that has already been turned into a C module.
    pub fn compiled(label: impl Into<String>, module_name: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            module_name: Some(module_name.into()),
        }
    }

    /// A unit that was never recompiled.
    pub fn pending(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            module_name: None,
        }
    }
}

/// The parsed model of a C interface, ready for recompilation.
#[derive(Clone, Debug, Default)]
pub struct Ffi {
    pub pool: TypePool,
    pub declarations: Declarations,
    /// Types owned by an included unit; never redefined here.
    included_types: FxHashSet<TypeId>,
    includes: Vec<IncludedUnit>,
    module_name: Option<String>,
}

impl Ffi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `ty` belongs to an included unit.
    pub fn mark_included(&mut self, ty: TypeId) {
        self.included_types.insert(ty);
    }

    #[inline]
    pub fn is_included(&self, ty: TypeId) -> bool {
        self.included_types.contains(&ty)
    }

    pub fn include(&mut self, unit: IncludedUnit) {
        self.includes.push(unit);
    }

    pub fn includes(&self) -> &[IncludedUnit] {
        &self.includes
    }

    /// This unit seen from a unit that includes it.
    pub fn as_included(&self, label: impl Into<String>) -> IncludedUnit {
        IncludedUnit {
            label: label.into(),
            module_name: self.module_name.clone(),
        }
    }

    /// Module name recorded by the last successful recompilation.
    pub fn module_name(&self) -> Option<&str> {
        self.module_name.as_deref()
    }

    pub fn set_module_name(&mut self, name: impl Into<String>) {
        self.module_name = Some(name.into());
    }
}
