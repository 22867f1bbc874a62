//! Monitor installation: the notify fan-out walked at runtime.
//!
//! Runs once per module item at kernel construction and produces, for every
//! node, the set of nodes to schedule when that node is notified. Two kinds
//! of edges are installed:
//!
//! - **identifier fan-out** — a declaration identifier points at every
//!   event, wait statement, and continuous assign that must re-awake when
//!   the identifier's value changes;
//! - **completion edges** — a child statement points at the containing
//!   statement that must advance when the child's traversal finishes.
//!
//! Initial-construct bodies get no completion edge back to their construct
//! (run-once is the resync driver's job), and for-loop init/update
//! statements complete inline, so they get none either.

use crate::resolve::Resolutions;
use tempo_ast::{ModuleDecl, Node, NodeId};

/// Installs the monitor fan-out for one module.
pub struct Monitor<'a> {
    module: &'a ModuleDecl,
    resolve: &'a Resolutions,
    monitors: Vec<Vec<NodeId>>,
}

impl<'a> Monitor<'a> {
    /// Creates an installer with an empty fan-out table.
    pub fn new(module: &'a ModuleDecl, resolve: &'a Resolutions) -> Self {
        Self {
            module,
            resolve,
            monitors: vec![Vec::new(); module.len()],
        }
    }

    /// Installs monitors for one module item.
    pub fn init(&mut self, item: NodeId) {
        match self.module.node(item) {
            Node::InitialConstruct { stmt, .. } => {
                let stmt = *stmt;
                self.install_stmt(stmt);
            }
            Node::AlwaysConstruct { stmt } => {
                let stmt = *stmt;
                self.add(stmt, item);
                self.install_stmt(stmt);
            }
            Node::ContinuousAssign { assign } => {
                let assign = *assign;
                let Node::VariableAssign { rhs, .. } = self.module.node(assign) else {
                    return;
                };
                let mut leaves = Vec::new();
                self.collect_leaves(*rhs, &mut leaves);
                for leaf in leaves {
                    let decl = self.resolve.get_resolution(leaf);
                    self.add(decl, item);
                }
            }
            _ => {}
        }
    }

    /// Consumes the installer, returning the per-node fan-out table.
    pub fn into_table(self) -> Vec<Vec<NodeId>> {
        self.monitors
    }

    fn add(&mut self, on: NodeId, target: NodeId) {
        let set = &mut self.monitors[on.index()];
        if !set.contains(&target) {
            set.push(target);
        }
    }

    fn install_stmt(&mut self, s: NodeId) {
        match self.module.node(s).clone() {
            Node::SeqBlock { stmts } | Node::ParBlock { stmts } => {
                for child in stmts {
                    self.add(child, s);
                    self.install_stmt(child);
                }
            }
            Node::Conditional {
                then_stmt,
                else_stmt,
                ..
            } => {
                self.add(then_stmt, s);
                self.install_stmt(then_stmt);
                if let Some(else_stmt) = else_stmt {
                    self.add(else_stmt, s);
                    self.install_stmt(else_stmt);
                }
            }
            Node::Case { items, .. } => {
                for item in items {
                    self.add(item.stmt, s);
                    self.install_stmt(item.stmt);
                }
            }
            Node::For {
                init, update, body, ..
            } => {
                self.install_stmt(init);
                self.install_stmt(update);
                self.add(body, s);
                self.install_stmt(body);
            }
            Node::Repeat { body, .. } | Node::While { body, .. } => {
                self.add(body, s);
                self.install_stmt(body);
            }
            Node::Wait { cond, body } => {
                let mut leaves = Vec::new();
                self.collect_leaves(cond, &mut leaves);
                for leaf in leaves {
                    let decl = self.resolve.get_resolution(leaf);
                    self.add(decl, s);
                }
                self.add(body, s);
                self.install_stmt(body);
            }
            Node::TimingControl { ctrl, stmt } => {
                self.add(stmt, s);
                self.install_stmt(stmt);
                if let Node::EventControl { events } = self.module.node(ctrl).clone() {
                    self.add(ctrl, s);
                    for ev in events {
                        self.add(ev, ctrl);
                        if let Node::Event { expr, .. } = self.module.node(ev) {
                            let decl = self.resolve.get_resolution(*expr);
                            self.add(decl, ev);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    fn collect_leaves(&self, expr: NodeId, out: &mut Vec<NodeId>) {
        match self.module.node(expr) {
            Node::Identifier { dims, .. } => {
                out.push(expr);
                for &d in dims {
                    self.collect_leaves(d, out);
                }
            }
            Node::Unary { operand, .. } => self.collect_leaves(*operand, out),
            Node::Binary { lhs, rhs, .. } => {
                self.collect_leaves(*lhs, out);
                self.collect_leaves(*rhs, out);
            }
            Node::Ternary {
                cond,
                then_expr,
                else_expr,
            } => {
                self.collect_leaves(*cond, out);
                self.collect_leaves(*then_expr, out);
                self.collect_leaves(*else_expr, out);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempo_ast::{EdgeKind, ModuleBuilder};

    fn install(module: &ModuleDecl) -> (Resolutions, Vec<Vec<NodeId>>) {
        let resolve = Resolutions::build(module).unwrap();
        let mut monitor = Monitor::new(module, &resolve);
        for &item in module.items() {
            monitor.init(item);
        }
        let table = monitor.into_table();
        (resolve, table)
    }

    #[test]
    fn event_chain_wired_to_clock() {
        let mut b = ModuleBuilder::new("m");
        let clk = b.input("clk", 1);
        b.reg("q", 1);
        let d = b.number(1, 1);
        let q = b.ident("q");
        let nba = b.nonblocking(q, d);
        let tcs = b.at(EdgeKind::Posedge, "clk", nba);
        let always = b.always(tcs);
        let m = b.build();
        let (_, table) = install(&m);

        // clk's fan-out reaches an event node, which feeds its control,
        // which feeds the timing statement, which feeds the always.
        let ev = table[clk.index()][0];
        assert!(matches!(m.node(ev), Node::Event { .. }));
        let ec = table[ev.index()][0];
        assert!(matches!(m.node(ec), Node::EventControl { .. }));
        assert!(table[ec.index()].contains(&tcs));
        assert!(table[tcs.index()].contains(&always));
    }

    #[test]
    fn seq_children_point_at_block() {
        let mut b = ModuleBuilder::new("m");
        b.reg("a", 1);
        let one = b.number(1, 1);
        let a1 = b.ident("a");
        let s1 = b.blocking(a1, one);
        let fin = b.finish_task(None);
        let block = b.seq(vec![s1, fin]);
        b.initial(block);
        let m = b.build();
        let (_, table) = install(&m);
        assert!(table[s1.index()].contains(&block));
        assert!(table[fin.index()].contains(&block));
    }

    #[test]
    fn initial_body_has_no_edge_to_construct() {
        let mut b = ModuleBuilder::new("m");
        let fin = b.finish_task(None);
        let ic = b.initial(fin);
        let m = b.build();
        let (_, table) = install(&m);
        assert!(!table[fin.index()].contains(&ic));
    }

    #[test]
    fn continuous_assign_watches_rhs_reads() {
        let mut b = ModuleBuilder::new("m");
        let a = b.input("a", 1);
        let bb = b.input("b", 1);
        b.wire("y", 1);
        let ai = b.ident("a");
        let bi = b.ident("b");
        let and = b.binary(tempo_ast::BinaryOp::And, ai, bi);
        let y = b.ident("y");
        let ca = b.continuous_assign(y, and);
        let m = b.build();
        let (_, table) = install(&m);
        assert!(table[a.index()].contains(&ca));
        assert!(table[bb.index()].contains(&ca));
    }

    #[test]
    fn wait_watches_condition_and_body() {
        let mut b = ModuleBuilder::new("m");
        let flag = b.input("flag", 1);
        let cond = b.ident("flag");
        let fin = b.finish_task(None);
        let w = b.wait(cond, fin);
        b.initial(w);
        let m = b.build();
        let (_, table) = install(&m);
        assert!(table[flag.index()].contains(&w));
        assert!(table[fin.index()].contains(&w));
    }

    #[test]
    fn for_init_and_update_have_no_completion_edge() {
        let mut b = ModuleBuilder::new("m");
        b.reg("i", 8);
        let i0 = b.ident("i");
        let zero = b.number(0, 8);
        let init = b.blocking(i0, zero);
        let i1 = b.ident("i");
        let three = b.number(3, 8);
        let cond = b.binary(tempo_ast::BinaryOp::Lt, i1, three);
        let i2 = b.ident("i");
        let i3 = b.ident("i");
        let one = b.number(1, 8);
        let inc = b.binary(tempo_ast::BinaryOp::Add, i3, one);
        let update = b.blocking(i2, inc);
        let body = b.finish_task(None);
        let fs = b.for_loop(init, cond, update, body);
        b.initial(fs);
        let m = b.build();
        let (_, table) = install(&m);
        assert!(!table[init.index()].contains(&fs));
        assert!(!table[update.index()].contains(&fs));
        assert!(table[body.index()].contains(&fs));
    }

    #[test]
    fn duplicate_edges_collapse() {
        let mut b = ModuleBuilder::new("m");
        let a = b.input("a", 1);
        b.wire("y", 1);
        let a1 = b.ident("a");
        let a2 = b.ident("a");
        let or = b.binary(tempo_ast::BinaryOp::Or, a1, a2);
        let y = b.ident("y");
        let ca = b.continuous_assign(y, or);
        let m = b.build();
        let (_, table) = install(&m);
        assert_eq!(
            table[a.index()].iter().filter(|&&t| t == ca).count(),
            1
        );
    }
}
