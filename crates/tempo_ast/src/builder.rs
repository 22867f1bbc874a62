//! Ergonomic construction of lowered modules.
//!
//! The runtime's front end produces [`ModuleDecl`]s by lowering parsed
//! source; hosts and tests build them directly through this builder. Methods
//! that create module items (declarations and constructs) register them in
//! declaration order automatically.

use crate::attr::Attributes;
use crate::ids::NodeId;
use crate::module::ModuleDecl;
use crate::node::{BinaryOp, CaseItem, DeclKind, EdgeKind, Node, UnaryOp};
use tempo_common::Bits;

/// Builds a [`ModuleDecl`] node by node.
#[derive(Debug)]
pub struct ModuleBuilder {
    module: ModuleDecl,
}

impl ModuleBuilder {
    /// Starts a module with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            module: ModuleDecl::new(name),
        }
    }

    /// Finishes construction and returns the module.
    pub fn build(self) -> ModuleDecl {
        self.module
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        self.module.alloc(node)
    }

    // ---- Declarations ----

    fn decl(&mut self, kind: DeclKind, name: &str, width: u32, depth: u32, init: Option<Bits>) -> NodeId {
        let id = self.alloc(Node::Identifier {
            name: name.into(),
            dims: Vec::new(),
        });
        let decl = self.alloc(Node::Decl {
            kind,
            id,
            width,
            depth,
            init,
        });
        self.module.push_item(decl);
        id
    }

    /// Declares an input port; returns its identifier node.
    pub fn input(&mut self, name: &str, width: u32) -> NodeId {
        self.decl(DeclKind::Input, name, width, 1, None)
    }

    /// Declares an output port; returns its identifier node.
    pub fn output(&mut self, name: &str, width: u32) -> NodeId {
        self.decl(DeclKind::Output, name, width, 1, None)
    }

    /// Declares a register; returns its identifier node.
    pub fn reg(&mut self, name: &str, width: u32) -> NodeId {
        self.decl(DeclKind::Reg, name, width, 1, None)
    }

    /// Declares a register with a declaration-time initial value.
    pub fn reg_init(&mut self, name: &str, width: u32, init: u64) -> NodeId {
        self.decl(DeclKind::Reg, name, width, 1, Some(Bits::from_u64(init, width)))
    }

    /// Declares a memory of `depth` elements; returns its identifier node.
    pub fn memory(&mut self, name: &str, width: u32, depth: u32) -> NodeId {
        self.decl(DeclKind::Reg, name, width, depth, None)
    }

    /// Declares a net; returns its identifier node.
    pub fn wire(&mut self, name: &str, width: u32) -> NodeId {
        self.decl(DeclKind::Net, name, width, 1, None)
    }

    // ---- Expressions ----

    /// An identifier use site.
    pub fn ident(&mut self, name: &str) -> NodeId {
        self.alloc(Node::Identifier {
            name: name.into(),
            dims: Vec::new(),
        })
    }

    /// An identifier use site with subscripts (element index, then bit).
    pub fn ident_sub(&mut self, name: &str, dims: Vec<NodeId>) -> NodeId {
        self.alloc(Node::Identifier {
            name: name.into(),
            dims,
        })
    }

    /// A literal number of the given width.
    pub fn number(&mut self, value: u64, width: u32) -> NodeId {
        self.alloc(Node::Number {
            value: Bits::from_u64(value, width),
        })
    }

    /// A string literal.
    pub fn string(&mut self, value: &str) -> NodeId {
        self.alloc(Node::StringLit {
            value: value.into(),
        })
    }

    /// A unary expression.
    pub fn unary(&mut self, op: UnaryOp, operand: NodeId) -> NodeId {
        self.alloc(Node::Unary { op, operand })
    }

    /// A binary expression.
    pub fn binary(&mut self, op: BinaryOp, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.alloc(Node::Binary { op, lhs, rhs })
    }

    /// A ternary conditional expression.
    pub fn ternary(&mut self, cond: NodeId, then_expr: NodeId, else_expr: NodeId) -> NodeId {
        self.alloc(Node::Ternary {
            cond,
            then_expr,
            else_expr,
        })
    }

    // ---- Statements ----

    /// A sequential `begin … end` block.
    pub fn seq(&mut self, stmts: Vec<NodeId>) -> NodeId {
        self.alloc(Node::SeqBlock { stmts })
    }

    /// A parallel `fork … join` block.
    pub fn par(&mut self, stmts: Vec<NodeId>) -> NodeId {
        self.alloc(Node::ParBlock { stmts })
    }

    /// An `if`/`else` statement.
    pub fn conditional(&mut self, cond: NodeId, then_stmt: NodeId, else_stmt: Option<NodeId>) -> NodeId {
        self.alloc(Node::Conditional {
            cond,
            then_stmt,
            else_stmt,
        })
    }

    /// A `case` statement; an arm with an empty guard list is the default.
    pub fn case(&mut self, cond: NodeId, items: Vec<(Vec<NodeId>, NodeId)>) -> NodeId {
        let items = items
            .into_iter()
            .map(|(exprs, stmt)| CaseItem { exprs, stmt })
            .collect();
        self.alloc(Node::Case { cond, items })
    }

    /// A `for` loop.
    pub fn for_loop(&mut self, init: NodeId, cond: NodeId, update: NodeId, body: NodeId) -> NodeId {
        self.alloc(Node::For {
            init,
            cond,
            update,
            body,
        })
    }

    /// A `repeat (count)` loop.
    pub fn repeat_loop(&mut self, count: NodeId, body: NodeId) -> NodeId {
        self.alloc(Node::Repeat { count, body })
    }

    /// A `while` loop.
    pub fn while_loop(&mut self, cond: NodeId, body: NodeId) -> NodeId {
        self.alloc(Node::While { cond, body })
    }

    /// A `wait (cond)` statement.
    pub fn wait(&mut self, cond: NodeId, body: NodeId) -> NodeId {
        self.alloc(Node::Wait { cond, body })
    }

    /// A blocking assignment statement (`lhs = rhs;`).
    pub fn blocking(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        let assign = self.alloc(Node::VariableAssign { lhs, rhs });
        self.alloc(Node::BlockingAssign { ctrl: None, assign })
    }

    /// A nonblocking assignment statement (`lhs <= rhs;`).
    pub fn nonblocking(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        let assign = self.alloc(Node::VariableAssign { lhs, rhs });
        self.alloc(Node::NonblockingAssign { ctrl: None, assign })
    }

    /// A `$display(args…)` statement.
    pub fn display(&mut self, args: Vec<NodeId>) -> NodeId {
        self.alloc(Node::Display { args })
    }

    /// A `$write(args…)` statement.
    pub fn write(&mut self, args: Vec<NodeId>) -> NodeId {
        self.alloc(Node::Write { args })
    }

    /// A `$finish` statement.
    pub fn finish_task(&mut self, arg: Option<NodeId>) -> NodeId {
        self.alloc(Node::Finish { arg })
    }

    // ---- Timing ----

    /// A single event on an identifier expression.
    pub fn event(&mut self, edge: EdgeKind, expr: NodeId) -> NodeId {
        self.alloc(Node::Event { edge, expr })
    }

    /// An event control wrapping the given events.
    pub fn event_control(&mut self, events: Vec<NodeId>) -> NodeId {
        self.alloc(Node::EventControl { events })
    }

    /// A `#delay` control (rejected by the interpreter; used in tests).
    pub fn delay_control(&mut self, delay: NodeId) -> NodeId {
        self.alloc(Node::DelayControl { delay })
    }

    /// A timing-control statement with an explicit control node.
    pub fn timing(&mut self, ctrl: NodeId, stmt: NodeId) -> NodeId {
        self.alloc(Node::TimingControl { ctrl, stmt })
    }

    /// Shorthand for `@(edge name) stmt`.
    pub fn at(&mut self, edge: EdgeKind, name: &str, stmt: NodeId) -> NodeId {
        let expr = self.ident(name);
        let ev = self.event(edge, expr);
        let ec = self.event_control(vec![ev]);
        self.timing(ec, stmt)
    }

    // ---- Constructs ----

    /// An `initial` block module item.
    pub fn initial(&mut self, stmt: NodeId) -> NodeId {
        self.initial_with_attrs(stmt, Attributes::new())
    }

    /// An `initial` block with explicit attributes.
    pub fn initial_with_attrs(&mut self, stmt: NodeId, attrs: Attributes) -> NodeId {
        let item = self.alloc(Node::InitialConstruct { stmt, attrs });
        self.module.push_item(item);
        item
    }

    /// An `always` block module item.
    pub fn always(&mut self, stmt: NodeId) -> NodeId {
        let item = self.alloc(Node::AlwaysConstruct { stmt });
        self.module.push_item(item);
        item
    }

    /// A continuous assignment module item (`assign lhs = rhs;`).
    pub fn continuous_assign(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        let assign = self.alloc(Node::VariableAssign { lhs, rhs });
        let item = self.alloc(Node::ContinuousAssign { assign });
        self.module.push_item(item);
        item
    }
}
