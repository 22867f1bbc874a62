//! AST node variants for elaborated synthesizable modules.
//!
//! [`Node`] is a single tagged enum covering declarations, behavioral
//! constructs, statements, timing controls, events, and expressions. Keeping
//! every node class in one arena-wide enum lets the interpreter's scheduler
//! hold heterogeneous [`NodeId`]s in one queue and dispatch with one `match`.

use crate::attr::Attributes;
use crate::ids::NodeId;
use serde::{Deserialize, Serialize};
use tempo_common::Bits;

/// The storage class and port direction of a declared identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeclKind {
    /// A module input port.
    Input,
    /// A module output port.
    Output,
    /// A register (`reg`), including memories when `depth > 1`.
    Reg,
    /// A net (`wire`).
    Net,
}

/// The transition an event waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// `posedge` — fires when the signal is observed true.
    Posedge,
    /// `negedge` — fires when the signal is observed false.
    Negedge,
    /// An edge of either polarity.
    Anyedge,
}

/// A unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Bitwise NOT (`~`).
    Not,
    /// Logical NOT (`!`).
    LogicNot,
    /// Arithmetic negation (`-`).
    Neg,
    /// Reduction AND (`&`).
    RedAnd,
    /// Reduction OR (`|`).
    RedOr,
    /// Reduction XOR (`^`).
    RedXor,
}

/// A binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    /// Addition (`+`).
    Add,
    /// Subtraction (`-`).
    Sub,
    /// Multiplication (`*`).
    Mul,
    /// Division (`/`).
    Div,
    /// Modulo (`%`).
    Mod,
    /// Bitwise AND (`&`).
    And,
    /// Bitwise OR (`|`).
    Or,
    /// Bitwise XOR (`^`).
    Xor,
    /// Left shift (`<<`).
    Shl,
    /// Right shift (`>>`).
    Shr,
    /// Equality (`==`).
    Eq,
    /// Inequality (`!=`).
    Ne,
    /// Less than (`<`).
    Lt,
    /// Less than or equal (`<=`).
    Le,
    /// Greater than (`>`).
    Gt,
    /// Greater than or equal (`>=`).
    Ge,
    /// Logical AND (`&&`).
    LogicAnd,
    /// Logical OR (`||`).
    LogicOr,
}

/// One arm of a case statement.
///
/// An arm with an empty expression list is the `default` arm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseItem {
    /// The guard expressions; the arm matches when any equals the selector.
    pub exprs: Vec<NodeId>,
    /// The statement to run when this arm is selected.
    pub stmt: NodeId,
}

/// An AST node. Children are [`NodeId`] references into the owning module's
/// arena.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Node {
    // ---- Module items ----
    /// A variable declaration (port, register, memory, or net).
    ///
    /// The declaration owns an [`Node::Identifier`] child; that child is the
    /// canonical name-resolution target and the key for value storage.
    Decl {
        /// Storage class / port direction.
        kind: DeclKind,
        /// The declared identifier node.
        id: NodeId,
        /// Bit width of each element.
        width: u32,
        /// Element count; `1` for scalars, `> 1` for memories.
        depth: u32,
        /// Optional declaration-time initial value.
        init: Option<Bits>,
    },
    /// An `initial` block.
    InitialConstruct {
        /// The body statement.
        stmt: NodeId,
        /// Source attributes (`(* __ignore = "true" *)` suppresses the block).
        attrs: Attributes,
    },
    /// An `always` block.
    AlwaysConstruct {
        /// The body statement, usually a timing-control statement.
        stmt: NodeId,
    },
    /// A continuous assignment (`assign lhs = rhs;`).
    ContinuousAssign {
        /// The underlying variable assignment.
        assign: NodeId,
    },

    // ---- Statements ----
    /// A sequential `begin … end` block.
    SeqBlock {
        /// Statements in program order.
        stmts: Vec<NodeId>,
    },
    /// A parallel `fork … join` block.
    ParBlock {
        /// The forked statements.
        stmts: Vec<NodeId>,
    },
    /// An `if`/`else` statement.
    Conditional {
        /// The branch condition.
        cond: NodeId,
        /// Statement to run when the condition is true.
        then_stmt: NodeId,
        /// Optional statement to run when the condition is false.
        else_stmt: Option<NodeId>,
    },
    /// A `case` statement.
    Case {
        /// The selector expression.
        cond: NodeId,
        /// The arms, scanned in order; an empty-guard arm is the default.
        items: Vec<CaseItem>,
    },
    /// A `for` loop.
    For {
        /// The initialization statement.
        init: NodeId,
        /// The loop condition expression.
        cond: NodeId,
        /// The per-iteration update statement.
        update: NodeId,
        /// The loop body.
        body: NodeId,
    },
    /// A `repeat (n)` loop; the count is evaluated once on entry.
    Repeat {
        /// The repetition-count expression.
        count: NodeId,
        /// The loop body.
        body: NodeId,
    },
    /// A `while` loop.
    While {
        /// The loop condition expression.
        cond: NodeId,
        /// The loop body.
        body: NodeId,
    },
    /// A `wait (cond)` statement; dormant until the condition reads true.
    Wait {
        /// The wake condition expression.
        cond: NodeId,
        /// The statement to run once the condition holds.
        body: NodeId,
    },
    /// A timing-control statement (`@(…) stmt`).
    TimingControl {
        /// The event or delay control.
        ctrl: NodeId,
        /// The controlled statement.
        stmt: NodeId,
    },
    /// A blocking procedural assignment (`lhs = rhs;`).
    BlockingAssign {
        /// Optional intra-assignment timing control (unsupported).
        ctrl: Option<NodeId>,
        /// The underlying variable assignment.
        assign: NodeId,
    },
    /// A nonblocking procedural assignment (`lhs <= rhs;`).
    NonblockingAssign {
        /// Optional intra-assignment timing control (unsupported).
        ctrl: Option<NodeId>,
        /// The underlying variable assignment.
        assign: NodeId,
    },
    /// The value-transfer half of any assignment.
    VariableAssign {
        /// The target identifier expression (with optional subscripts).
        lhs: NodeId,
        /// The value expression.
        rhs: NodeId,
    },
    /// A `$display(…)` system task (newline-terminated output).
    Display {
        /// The argument expressions; a leading string literal is a format.
        args: Vec<NodeId>,
    },
    /// A `$write(…)` system task (no trailing newline).
    Write {
        /// The argument expressions; a leading string literal is a format.
        args: Vec<NodeId>,
    },
    /// A `$finish` system task.
    Finish {
        /// Optional status-code expression; defaults to zero.
        arg: Option<NodeId>,
    },

    // ---- Timing controls and events ----
    /// An event control (`@(ev, …)`).
    EventControl {
        /// The events, any of which releases the control.
        events: Vec<NodeId>,
    },
    /// A `#delay` control. Unsynthesizable; rejected at construction.
    DelayControl {
        /// The delay expression.
        delay: NodeId,
    },
    /// A single event in an event control's list.
    Event {
        /// The transition polarity.
        edge: EdgeKind,
        /// The watched expression; must be a plain identifier.
        expr: NodeId,
    },

    // ---- Expressions ----
    /// An identifier use or declaration site.
    Identifier {
        /// The source name.
        name: String,
        /// Subscripts at a use site: element index first, then bit index.
        dims: Vec<NodeId>,
    },
    /// A literal number.
    Number {
        /// The literal value; its width is the literal's width.
        value: Bits,
    },
    /// A string literal (format strings for display/write tasks).
    StringLit {
        /// The literal text.
        value: String,
    },
    /// A unary expression.
    Unary {
        /// The operator.
        op: UnaryOp,
        /// The operand.
        operand: NodeId,
    },
    /// A binary expression.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// The left operand.
        lhs: NodeId,
        /// The right operand.
        rhs: NodeId,
    },
    /// A ternary conditional expression (`cond ? a : b`).
    Ternary {
        /// The condition.
        cond: NodeId,
        /// Value when the condition is true.
        then_expr: NodeId,
        /// Value when the condition is false.
        else_expr: NodeId,
    },
}

impl Node {
    /// Returns the identifier name if this node is an identifier.
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Node::Identifier { name, .. } => Some(name),
            _ => None,
        }
    }
}
