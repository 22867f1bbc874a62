//! Source attributes attached to AST constructs.

use serde::{Deserialize, Serialize};

/// An ordered list of `(* name = "value" *)` attribute pairs.
///
/// The runtime uses attributes as an out-of-band channel between lowering
/// passes and the interpreter; the only key the interpreter itself consults
/// is `__ignore` on initial constructs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Attributes {
    pairs: Vec<(String, String)>,
}

impl Attributes {
    /// Creates an empty attribute list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an attribute pair.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((name.into(), value.into()));
    }

    /// Returns the value of the first attribute with the given name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` if no attributes are present.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
