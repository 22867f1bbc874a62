//! Name resolution over a module's flat declaration scope.

use crate::error::InterpError;
use std::collections::HashMap;
use tempo_ast::{ModuleDecl, Node, NodeId};

/// The resolved binding of every identifier node in a module.
///
/// Built once at kernel construction. Every identifier — declaration sites
/// included — maps to the declaration-site identifier that owns the name's
/// storage; that node is the canonical notify target and value-store key.
#[derive(Debug)]
pub struct Resolutions {
    table: Vec<Option<NodeId>>,
    by_name: HashMap<String, NodeId>,
}

impl Resolutions {
    /// Resolves every identifier in the module.
    ///
    /// Fails on duplicate declarations and on use sites whose name has no
    /// declaration — both lowering bugs in the front end.
    pub fn build(module: &ModuleDecl) -> Result<Self, InterpError> {
        let mut by_name = HashMap::new();
        for (_, node) in module.iter() {
            if let Node::Decl { id, .. } = node {
                let name = module
                    .node(*id)
                    .as_identifier()
                    .expect("declaration owns an identifier node")
                    .to_string();
                if by_name.insert(name.clone(), *id).is_some() {
                    return Err(InterpError::DuplicateDecl { name });
                }
            }
        }

        let mut table = vec![None; module.len()];
        for (nid, node) in module.iter() {
            if let Node::Identifier { name, .. } = node {
                let decl = by_name
                    .get(name)
                    .copied()
                    .ok_or_else(|| InterpError::Unresolved { name: name.clone() })?;
                table[nid.index()] = Some(decl);
            }
        }

        Ok(Self { table, by_name })
    }

    /// Returns the declaration identifier an identifier node binds to.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not an identifier node of the resolved module.
    pub fn get_resolution(&self, id: NodeId) -> NodeId {
        self.table[id.index()].expect("node is a resolved identifier")
    }

    /// Looks up a declaration identifier by name.
    pub fn decl(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempo_ast::ModuleBuilder;

    #[test]
    fn use_site_resolves_to_declaration() {
        let mut b = ModuleBuilder::new("m");
        let decl = b.reg("q", 1);
        let use_site = b.ident("q");
        let m = b.build();
        let r = Resolutions::build(&m).unwrap();
        assert_eq!(r.get_resolution(use_site), decl);
        assert_eq!(r.get_resolution(decl), decl);
        assert_eq!(r.decl("q"), Some(decl));
    }

    #[test]
    fn unresolved_name_is_an_error() {
        let mut b = ModuleBuilder::new("m");
        b.ident("ghost");
        let m = b.build();
        assert!(matches!(
            Resolutions::build(&m),
            Err(InterpError::Unresolved { .. })
        ));
    }

    #[test]
    fn duplicate_declaration_is_an_error() {
        let mut b = ModuleBuilder::new("m");
        b.reg("q", 1);
        b.wire("q", 1);
        let m = b.build();
        assert!(matches!(
            Resolutions::build(&m),
            Err(InterpError::DuplicateDecl { .. })
        ));
    }

    #[test]
    fn unknown_decl_lookup_is_none() {
        let m = ModuleBuilder::new("m").build();
        let r = Resolutions::build(&m).unwrap();
        assert_eq!(r.decl("clk"), None);
    }
}
