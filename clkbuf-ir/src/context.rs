use crate::component::IdList;
use crate::Module;
use clkbuf_utils::{ClkbufResult, Error, Id};

/// The whole design under consideration: every blackbox and regular module,
/// keyed by name.
#[derive(Debug, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Design {
    pub modules: IdList<Module>,
}

impl Design {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_module(&mut self, module: Module) {
        self.modules.add(module);
    }

    pub fn find(&self, name: impl Into<Id>) -> Option<&Module> {
        self.modules.find(name)
    }

    pub fn find_mut(&mut self, name: impl Into<Id>) -> Option<&mut Module> {
        self.modules.find_mut(name)
    }

    /// The unique module marked `top`, if one exists.
    pub fn top(&self) -> Option<&Module> {
        self.modules.iter().find(|m| m.is_top)
    }

    pub fn top_name(&self) -> ClkbufResult<Id> {
        self.top()
            .map(|m| m.name)
            .ok_or_else(|| Error::malformed_structure("design has no module marked `top`"))
    }
}
