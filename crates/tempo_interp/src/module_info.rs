//! Module-level topology queries.

use tempo_ast::{DeclKind, ModuleDecl, Node, NodeId};

/// Read-only topology queries over a module's declarations.
pub struct ModuleInfo<'a> {
    module: &'a ModuleDecl,
}

impl<'a> ModuleInfo<'a> {
    /// Creates a query wrapper for a module.
    pub fn new(module: &'a ModuleDecl) -> Self {
        Self { module }
    }

    /// The declaration identifiers of all input ports, in declaration order.
    ///
    /// The resync driver notifies each of these to re-wake input-dependent
    /// logic after a backend swap.
    pub fn inputs(&self) -> Vec<NodeId> {
        self.module
            .items()
            .iter()
            .filter_map(|&item| match self.module.node(item) {
                Node::Decl {
                    kind: DeclKind::Input,
                    id,
                    ..
                } => Some(*id),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempo_ast::ModuleBuilder;

    #[test]
    fn inputs_in_declaration_order() {
        let mut b = ModuleBuilder::new("m");
        let clk = b.input("clk", 1);
        b.reg("q", 1);
        let d = b.input("d", 1);
        b.output("y", 1);
        let m = b.build();
        assert_eq!(ModuleInfo::new(&m).inputs(), vec![clk, d]);
    }

    #[test]
    fn inputs_excludes_other_kinds() {
        let mut b = ModuleBuilder::new("m");
        let a = b.input("a", 1);
        b.output("y", 1);
        b.wire("w", 1);
        let m = b.build();
        assert_eq!(ModuleInfo::new(&m).inputs(), vec![a]);
    }

    #[test]
    fn empty_module_has_no_inputs() {
        let m = ModuleBuilder::new("m").build();
        assert!(ModuleInfo::new(&m).inputs().is_empty());
    }
}
