//! Expression evaluation and value storage.
//!
//! [`ValueStore`] holds the element arrays of every declared variable,
//! indexed by the declaration identifier's raw node id. [`EvalContext`]
//! bundles the module and its resolutions and provides the pure read/write
//! primitives the kernel's dispatch loop is built on: [`eval`](EvalContext::eval),
//! [`dereference`](EvalContext::dereference), and [`assign`](EvalContext::assign).
//!
//! Out-of-range element accesses are lenient — reads yield zeros and writes
//! are dropped, the two-state rendering of an unknown slot.

use crate::resolve::Resolutions;
use tempo_ast::{BinaryOp, ModuleDecl, Node, NodeId, UnaryOp};
use tempo_common::Bits;

/// Per-declaration storage geometry.
#[derive(Debug, Clone, Copy, Default)]
struct SlotInfo {
    width: u32,
    depth: u32,
}

/// The element arrays of every declared variable in a module.
#[derive(Debug)]
pub struct ValueStore {
    vals: Vec<Vec<Bits>>,
    info: Vec<SlotInfo>,
}

impl ValueStore {
    /// Builds the store for a module, applying declaration initial values.
    pub fn build(module: &ModuleDecl) -> Self {
        let mut vals = vec![Vec::new(); module.len()];
        let mut info = vec![SlotInfo::default(); module.len()];
        for (_, node) in module.iter() {
            if let Node::Decl {
                id,
                width,
                depth,
                init,
                ..
            } = node
            {
                let value = match init {
                    Some(bits) => bits.resized(*width),
                    None => Bits::new(*width),
                };
                vals[id.index()] = vec![value; *depth as usize];
                info[id.index()] = SlotInfo {
                    width: *width,
                    depth: *depth,
                };
            }
        }
        Self { vals, info }
    }

    /// The declared bit width of a variable.
    pub fn width(&self, decl: NodeId) -> u32 {
        self.info[decl.index()].width
    }

    /// The declared element count of a variable.
    pub fn depth(&self, decl: NodeId) -> u32 {
        self.info[decl.index()].depth
    }

    /// The scalar value of a variable (element zero).
    ///
    /// # Panics
    ///
    /// Panics if `decl` is not a declaration identifier with storage.
    pub fn value(&self, decl: NodeId) -> &Bits {
        &self.vals[decl.index()][0]
    }

    /// The full element array of a variable.
    pub fn array(&self, decl: NodeId) -> &[Bits] {
        &self.vals[decl.index()]
    }

    /// Overwrites the element array of a variable.
    ///
    /// Elements are fitted to the declared width; surplus source elements
    /// are ignored and missing ones leave the current contents in place.
    pub fn set_array(&mut self, decl: NodeId, values: &[Bits]) {
        let width = self.width(decl);
        let slots = &mut self.vals[decl.index()];
        for (slot, value) in slots.iter_mut().zip(values) {
            *slot = value.resized(width);
        }
    }

    /// Reads through a dereferenced slot.
    pub fn read_slot(&self, decl: NodeId, slot: Slot) -> Bits {
        let info = self.info[decl.index()];
        if slot.element >= info.depth {
            return match slot.bit {
                Some(_) => Bits::new(1),
                None => Bits::new(info.width),
            };
        }
        let element = &self.vals[decl.index()][slot.element as usize];
        match slot.bit {
            Some(bit) if bit < info.width => Bits::from_bool(element.get(bit)),
            Some(_) => Bits::new(1),
            None => element.clone(),
        }
    }

    /// Deposits a value through a dereferenced slot, fitting it to the
    /// target's geometry.
    pub fn deposit(&mut self, decl: NodeId, slot: Slot, value: &Bits) {
        let info = self.info[decl.index()];
        if slot.element >= info.depth {
            return;
        }
        let element = &mut self.vals[decl.index()][slot.element as usize];
        match slot.bit {
            Some(bit) if bit < info.width => element.set(bit, value.to_bool()),
            Some(_) => {}
            None => *element = value.resized(info.width),
        }
    }
}

/// A fully dereferenced storage coordinate: element index plus optional bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    /// The element index; zero for scalars.
    pub element: u32,
    /// A bit select within the element, if present.
    pub bit: Option<u32>,
}

impl Slot {
    /// The whole-value slot of a scalar.
    pub fn whole() -> Self {
        Self {
            element: 0,
            bit: None,
        }
    }
}

/// The module and resolution tables expression evaluation runs against.
#[derive(Clone, Copy)]
pub struct EvalContext<'a> {
    /// The module under interpretation.
    pub module: &'a ModuleDecl,
    /// Its identifier resolutions.
    pub resolve: &'a Resolutions,
}

impl EvalContext<'_> {
    /// Evaluates an expression tree to a value.
    ///
    /// # Panics
    ///
    /// Panics if `expr` is not an expression node.
    pub fn eval(&self, store: &ValueStore, expr: NodeId) -> Bits {
        match self.module.node(expr) {
            Node::Number { value } => value.clone(),
            Node::StringLit { .. } => Bits::new(0),
            Node::Identifier { .. } => {
                let decl = self.resolve.get_resolution(expr);
                let slot = self.dereference(store, expr);
                store.read_slot(decl, slot)
            }
            Node::Unary { op, operand } => {
                let v = self.eval(store, *operand);
                match op {
                    UnaryOp::Not => !&v,
                    UnaryOp::LogicNot => Bits::from_bool(!v.to_bool()),
                    UnaryOp::Neg => Bits::new(v.width()).sub(&v),
                    UnaryOp::RedAnd => Bits::from_bool(v.all_ones()),
                    UnaryOp::RedOr => Bits::from_bool(v.to_bool()),
                    UnaryOp::RedXor => Bits::from_bool(v.parity()),
                }
            }
            Node::Binary { op, lhs, rhs } => {
                let a = self.eval(store, *lhs);
                let b = self.eval(store, *rhs);
                match op {
                    BinaryOp::Add => a.add(&b),
                    BinaryOp::Sub => a.sub(&b),
                    BinaryOp::Mul => a.mul(&b),
                    BinaryOp::Div => a.div(&b),
                    BinaryOp::Mod => a.rem(&b),
                    BinaryOp::And => &a & &b,
                    BinaryOp::Or => &a | &b,
                    BinaryOp::Xor => &a ^ &b,
                    BinaryOp::Shl => a.shl(shift_amount(&b)),
                    BinaryOp::Shr => a.shr(shift_amount(&b)),
                    BinaryOp::Eq => Bits::from_bool(a.same_value(&b)),
                    BinaryOp::Ne => Bits::from_bool(!a.same_value(&b)),
                    BinaryOp::Lt => Bits::from_bool(a.lt(&b)),
                    BinaryOp::Le => Bits::from_bool(!b.lt(&a)),
                    BinaryOp::Gt => Bits::from_bool(b.lt(&a)),
                    BinaryOp::Ge => Bits::from_bool(!a.lt(&b)),
                    BinaryOp::LogicAnd => Bits::from_bool(a.to_bool() && b.to_bool()),
                    BinaryOp::LogicOr => Bits::from_bool(a.to_bool() || b.to_bool()),
                }
            }
            Node::Ternary {
                cond,
                then_expr,
                else_expr,
            } => {
                if self.eval(store, *cond).to_bool() {
                    self.eval(store, *then_expr)
                } else {
                    self.eval(store, *else_expr)
                }
            }
            other => panic!("cannot evaluate non-expression node {other:?}"),
        }
    }

    /// Dereferences an identifier use into a storage coordinate, evaluating
    /// its subscripts against current values.
    ///
    /// The first subscript selects the element of a memory (or a bit of a
    /// scalar); a second subscript selects a bit of the chosen element.
    ///
    /// # Panics
    ///
    /// Panics if `lhs` is not an identifier node.
    pub fn dereference(&self, store: &ValueStore, lhs: NodeId) -> Slot {
        let Node::Identifier { dims, .. } = self.module.node(lhs) else {
            panic!("cannot dereference non-identifier node");
        };
        let decl = self.resolve.get_resolution(lhs);
        let mut slot = Slot::whole();
        let mut dims = dims.iter();
        if store.depth(decl) > 1 {
            if let Some(&d) = dims.next() {
                slot.element = self.eval_index(store, d);
            }
        }
        if let Some(&d) = dims.next() {
            slot.bit = Some(self.eval_index(store, d));
        }
        slot
    }

    /// Assigns a value through an identifier LHS and returns the resolved
    /// declaration identifier (the notify target).
    pub fn assign(&self, store: &mut ValueStore, lhs: NodeId, value: &Bits) -> NodeId {
        let decl = self.resolve.get_resolution(lhs);
        let slot = self.dereference(store, lhs);
        store.deposit(decl, slot, value);
        decl
    }

    fn eval_index(&self, store: &ValueStore, expr: NodeId) -> u32 {
        u32::try_from(self.eval(store, expr).to_u64()).unwrap_or(u32::MAX)
    }
}

fn shift_amount(b: &Bits) -> u32 {
    u32::try_from(b.to_u64()).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempo_ast::ModuleBuilder;

    fn context(module: &ModuleDecl) -> (Resolutions, ValueStore) {
        let resolve = Resolutions::build(module).unwrap();
        let store = ValueStore::build(module);
        (resolve, store)
    }

    #[test]
    fn literals_and_identifiers() {
        let mut b = ModuleBuilder::new("m");
        b.reg_init("a", 8, 42);
        let use_a = b.ident("a");
        let lit = b.number(7, 8);
        let m = b.build();
        let (resolve, store) = context(&m);
        let ctx = EvalContext {
            module: &m,
            resolve: &resolve,
        };
        assert_eq!(ctx.eval(&store, use_a).to_u64(), 42);
        assert_eq!(ctx.eval(&store, lit).to_u64(), 7);
    }

    #[test]
    fn binary_arithmetic_and_compare() {
        let mut b = ModuleBuilder::new("m");
        let three = b.number(3, 8);
        let five = b.number(5, 8);
        let sum = b.binary(BinaryOp::Add, three, five);
        let lt = b.binary(BinaryOp::Lt, three, five);
        let ge = b.binary(BinaryOp::Ge, three, five);
        let m = b.build();
        let (resolve, store) = context(&m);
        let ctx = EvalContext {
            module: &m,
            resolve: &resolve,
        };
        assert_eq!(ctx.eval(&store, sum).to_u64(), 8);
        assert!(ctx.eval(&store, lt).to_bool());
        assert!(!ctx.eval(&store, ge).to_bool());
    }

    #[test]
    fn unary_and_ternary() {
        let mut b = ModuleBuilder::new("m");
        let zero = b.number(0, 4);
        let x = b.number(0b1010, 4);
        let not = b.unary(UnaryOp::Not, x);
        let lnot = b.unary(UnaryOp::LogicNot, zero);
        let cond = b.number(1, 1);
        let tern = b.ternary(cond, x, zero);
        let m = b.build();
        let (resolve, store) = context(&m);
        let ctx = EvalContext {
            module: &m,
            resolve: &resolve,
        };
        assert_eq!(ctx.eval(&store, not).to_u64(), 0b0101);
        assert!(ctx.eval(&store, lnot).to_bool());
        assert_eq!(ctx.eval(&store, tern).to_u64(), 0b1010);
    }

    #[test]
    fn memory_element_access() {
        let mut b = ModuleBuilder::new("m");
        b.memory("mem", 8, 4);
        let idx = b.number(2, 8);
        let elem = b.ident_sub("mem", vec![idx]);
        let m = b.build();
        let (resolve, mut store) = context(&m);
        let ctx = EvalContext {
            module: &m,
            resolve: &resolve,
        };
        let decl = resolve.decl("mem").unwrap();
        store.deposit(
            decl,
            Slot {
                element: 2,
                bit: None,
            },
            &Bits::from_u64(0x5A, 8),
        );
        assert_eq!(ctx.eval(&store, elem).to_u64(), 0x5A);
    }

    #[test]
    fn bit_select_of_scalar() {
        let mut b = ModuleBuilder::new("m");
        b.reg_init("a", 8, 0b100);
        let two = b.number(2, 8);
        let bit = b.ident_sub("a", vec![two]);
        let m = b.build();
        let (resolve, store) = context(&m);
        let ctx = EvalContext {
            module: &m,
            resolve: &resolve,
        };
        let v = ctx.eval(&store, bit);
        assert_eq!(v.width(), 1);
        assert!(v.to_bool());
    }

    #[test]
    fn out_of_range_element_reads_zero() {
        let mut b = ModuleBuilder::new("m");
        b.memory("mem", 8, 2);
        let idx = b.number(9, 8);
        let elem = b.ident_sub("mem", vec![idx]);
        let m = b.build();
        let (resolve, store) = context(&m);
        let ctx = EvalContext {
            module: &m,
            resolve: &resolve,
        };
        assert!(ctx.eval(&store, elem).is_zero());
    }

    #[test]
    fn out_of_range_deposit_dropped() {
        let mut b = ModuleBuilder::new("m");
        b.memory("mem", 8, 2);
        let m = b.build();
        let (resolve, mut store) = context(&m);
        let decl = resolve.decl("mem").unwrap();
        store.deposit(
            decl,
            Slot {
                element: 5,
                bit: None,
            },
            &Bits::from_u64(1, 8),
        );
        assert!(store.array(decl).iter().all(Bits::is_zero));
    }

    #[test]
    fn assign_resizes_to_declared_width() {
        let mut b = ModuleBuilder::new("m");
        b.reg("a", 4);
        let lhs = b.ident("a");
        let m = b.build();
        let (resolve, mut store) = context(&m);
        let ctx = EvalContext {
            module: &m,
            resolve: &resolve,
        };
        let target = ctx.assign(&mut store, lhs, &Bits::from_u64(0xFF, 8));
        assert_eq!(store.value(target).to_u64(), 0xF);
        assert_eq!(store.value(target).width(), 4);
    }

    #[test]
    fn assign_bit_of_element() {
        let mut b = ModuleBuilder::new("m");
        b.memory("mem", 4, 2);
        let one = b.number(1, 4);
        let three = b.number(3, 4);
        let lhs = b.ident_sub("mem", vec![one, three]);
        let m = b.build();
        let (resolve, mut store) = context(&m);
        let ctx = EvalContext {
            module: &m,
            resolve: &resolve,
        };
        let decl = ctx.assign(&mut store, lhs, &Bits::from_bool(true));
        assert_eq!(store.array(decl)[1].to_u64(), 0b1000);
        assert!(store.array(decl)[0].is_zero());
    }

    #[test]
    fn set_array_fits_widths() {
        let mut b = ModuleBuilder::new("m");
        b.memory("mem", 4, 3);
        let m = b.build();
        let (resolve, mut store) = context(&m);
        let decl = resolve.decl("mem").unwrap();
        store.set_array(decl, &[Bits::from_u64(0xFF, 8), Bits::from_u64(2, 8)]);
        assert_eq!(store.array(decl)[0].to_u64(), 0xF);
        assert_eq!(store.array(decl)[1].to_u64(), 2);
        assert!(store.array(decl)[2].is_zero());
    }

    #[test]
    fn declaration_initials_applied() {
        let mut b = ModuleBuilder::new("m");
        b.reg_init("r", 8, 0xAA);
        b.reg("s", 8);
        let m = b.build();
        let (resolve, store) = context(&m);
        assert_eq!(store.value(resolve.decl("r").unwrap()).to_u64(), 0xAA);
        assert!(store.value(resolve.decl("s").unwrap()).is_zero());
    }
}
