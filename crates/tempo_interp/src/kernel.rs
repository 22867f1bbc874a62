//! The interpreter kernel: scheduling state, statement dispatch, and the
//! two-phase simulation cycle.
//!
//! [`InterpKernel`] owns one elaborated module and advances it through the
//! Verilog active/NBA regions. Scheduling works over three per-node side
//! tables sized to the module's arena: the `monitors` fan-out installed at
//! construction, the `on_active` queue-membership flags, and the `ctrl`
//! cooperative-execution cursors that let compound statements resume after a
//! child completes.
//!
//! The active queue is a LIFO: nodes that generate new activity drain
//! depth-first, which bounds the working set and fixes the observable order
//! of system tasks. Nonblocking assignments are captured — resolved target,
//! dereferenced slot, and RHS value — at evaluation time and flushed in
//! insertion order by [`update`](InterpKernel::update).

use crate::error::InterpError;
use crate::evaluator::{EvalContext, Slot, ValueStore};
use crate::interface::Interface;
use crate::module_info::ModuleInfo;
use crate::monitor::Monitor;
use crate::printf;
use crate::resolve::Resolutions;
use crate::snapshot::{Input, State, VId};
use log::trace;
use std::collections::HashMap;
use tempo_ast::{EdgeKind, ModuleDecl, Node, NodeId};
use tempo_common::Bits;

/// A nonblocking assignment captured during the active region.
///
/// The slot and value are fixed at capture time; a blocking assignment that
/// later rewrites the RHS or an index within the same region has no effect
/// on this record.
#[derive(Debug, Clone)]
pub struct PendingUpdate {
    /// The resolved target declaration identifier.
    pub target: NodeId,
    /// The dereferenced storage coordinate.
    pub slot: Slot,
    /// The captured RHS value.
    pub value: Bits,
}

/// The software interpreter for one elaborated module.
pub struct InterpKernel {
    module: ModuleDecl,
    resolve: Resolutions,
    store: ValueStore,
    /// Per-node notify fan-out, installed once at construction.
    monitors: Vec<Vec<NodeId>>,
    /// Queue-membership flag; `on_active[n] ⇔ n` is in `active`.
    on_active: Vec<bool>,
    /// Per-node cooperative execution cursor.
    ctrl: Vec<u32>,
    /// The LIFO active queue.
    active: Vec<NodeId>,
    /// Pending nonblocking assignments, in capture order.
    updates: Vec<PendingUpdate>,
    /// Input bindings, densely indexed by raw VId.
    reads: Vec<Option<NodeId>>,
    /// Output bindings, in registration order.
    writes: Vec<(NodeId, VId)>,
    /// State bindings for snapshot/restore.
    state: HashMap<VId, NodeId>,
    /// While set, NBA capture and system tasks are suppressed.
    silent: bool,
    there_were_tasks: bool,
}

impl InterpKernel {
    /// Builds an interpreter over a module.
    ///
    /// Resolves every identifier, rejects constructs outside the supported
    /// synthesizable subset, initializes value storage from declaration
    /// initials, and installs the monitor fan-out.
    pub fn new(module: ModuleDecl) -> Result<Self, InterpError> {
        let resolve = Resolutions::build(&module)?;
        let store = ValueStore::build(&module);
        validate(&module, &resolve, &store)?;

        let mut monitor = Monitor::new(&module, &resolve);
        for &item in module.items() {
            monitor.init(item);
        }
        let monitors = monitor.into_table();

        let len = module.len();
        Ok(Self {
            module,
            resolve,
            store,
            monitors,
            on_active: vec![false; len],
            ctrl: vec![0; len],
            active: Vec::new(),
            updates: Vec::new(),
            reads: Vec::new(),
            writes: Vec::new(),
            state: HashMap::new(),
            silent: false,
            there_were_tasks: false,
        })
    }

    // ---- Binding table ----

    /// Binds an input: values delivered for `vid` deposit into `id`.
    pub fn set_read(&mut self, id: NodeId, vid: VId) {
        let idx = vid.index();
        if idx >= self.reads.len() {
            self.reads.resize(idx + 1, None);
        }
        self.reads[idx] = Some(id);
    }

    /// Binds an output: `id`'s value is emitted as `vid` after every region.
    ///
    /// Emission follows registration order; duplicate registrations are the
    /// caller's responsibility.
    pub fn set_write(&mut self, id: NodeId, vid: VId) {
        self.writes.push((id, vid));
    }

    /// Binds a state element for snapshot/restore under `vid`.
    pub fn set_state(&mut self, id: NodeId, vid: VId) {
        self.state.insert(vid, id);
    }

    /// Looks up a declaration identifier by name.
    pub fn decl(&self, name: &str) -> Option<NodeId> {
        self.resolve.decl(name)
    }

    /// The current scalar value of a declaration identifier.
    pub fn value(&self, id: NodeId) -> &Bits {
        self.store.value(id)
    }

    // ---- Cycle operations ----

    /// Delivers an input value and wakes everything that watches it.
    ///
    /// # Panics
    ///
    /// Panics if no read binding was registered for `vid`.
    pub fn read(&mut self, vid: VId, value: &Bits) {
        let id = self.reads[vid.index()].expect("read binding registered for vid");
        let ctx = EvalContext {
            module: &self.module,
            resolve: &self.resolve,
        };
        ctx.assign(&mut self.store, id, value);
        self.notify(id);
    }

    /// Drains the active region to fixpoint and emits every output binding.
    pub fn evaluate(&mut self, iface: &mut dyn Interface) {
        self.there_were_tasks = false;
        self.drain_active(iface);
        self.emit_outputs(iface);
    }

    /// Returns `true` while nonblocking assignments are pending.
    pub fn there_are_updates(&self) -> bool {
        !self.updates.is_empty()
    }

    /// Flushes pending nonblocking assignments, then drains the activity
    /// they trigger and re-emits the outputs.
    ///
    /// The flush is simultaneous from the module's point of view: every
    /// deposit uses the slot and value captured when the assignment
    /// executed, and deposits land in capture order.
    pub fn update(&mut self, iface: &mut dyn Interface) {
        trace!("update: flushing {} nonblocking assignments", self.updates.len());
        // notify() only schedules, so the buffer cannot grow mid-flush.
        for i in 0..self.updates.len() {
            let u = self.updates[i].clone();
            self.store.deposit(u.target, u.slot, &u.value);
            self.notify(u.target);
        }
        self.updates.clear();

        self.there_were_tasks = false;
        self.drain_active(iface);
        self.emit_outputs(iface);
    }

    /// Reports whether any system task ran during the most recent
    /// [`evaluate`](Self::evaluate) or [`update`](Self::update).
    pub fn there_were_tasks(&self) -> bool {
        self.there_were_tasks
    }

    /// Re-primes internal signal state after a backend swap.
    ///
    /// Always constructs and continuous assigns run first so wire values
    /// become consistent with current state; the queue is then drained in
    /// silent mode (no NBA capture, no task output); finally the initial
    /// constructs are scheduled under normal semantics, to run in the next
    /// active region.
    pub fn resync(&mut self, iface: &mut dyn Interface) {
        trace!("resync: priming always constructs and continuous assigns");
        let items: Vec<NodeId> = self.module.items().to_vec();
        for &item in &items {
            if matches!(
                self.module.node(item),
                Node::AlwaysConstruct { .. } | Node::ContinuousAssign { .. }
            ) {
                self.schedule_now(iface, item);
            }
        }
        let inputs = ModuleInfo::new(&self.module).inputs();
        for id in inputs {
            self.notify(id);
        }

        self.silent = true;
        self.drain_active(iface);
        self.silent = false;

        trace!("resync: scheduling initial constructs");
        for &item in &items {
            if matches!(self.module.node(item), Node::InitialConstruct { .. }) {
                self.schedule_now(iface, item);
            }
        }
    }

    // ---- Snapshot and input bundles ----

    /// Captures every registered state element, keyed by VId.
    pub fn snapshot(&self) -> State {
        let mut s = State::new();
        for (&vid, &id) in &self.state {
            s.insert(vid, self.store.array(id).to_vec());
        }
        s
    }

    /// Restores registered state elements from a snapshot.
    ///
    /// VIds absent from the snapshot keep their current contents. No
    /// notification happens; callers follow with [`resync`](Self::resync).
    pub fn restore(&mut self, snapshot: &State) {
        for (&vid, &id) in &self.state {
            if let Some(values) = snapshot.get(vid) {
                self.store.set_array(id, values);
            }
        }
    }

    /// Captures the current value of every registered read binding.
    pub fn input(&self) -> Input {
        let mut bundle = Input::new();
        for (v, id) in self.reads.iter().enumerate() {
            if let Some(id) = id {
                bundle.insert(VId::from_raw(v as u32), self.store.value(*id).clone());
            }
        }
        bundle
    }

    /// Deposits read-binding values from a bundle.
    ///
    /// VIds absent from the bundle keep their current values. No
    /// notification happens; callers follow with [`resync`](Self::resync).
    pub fn set_input(&mut self, input: &Input) {
        for v in 0..self.reads.len() {
            let Some(id) = self.reads[v] else { continue };
            if let Some(value) = input.get(VId::from_raw(v as u32)) {
                let value = value.clone();
                let ctx = EvalContext {
                    module: &self.module,
                    resolve: &self.resolve,
                };
                ctx.assign(&mut self.store, id, &value);
            }
        }
    }

    // ---- Scheduling primitives ----

    fn schedule_active(&mut self, n: NodeId) {
        if !self.on_active[n.index()] {
            self.on_active[n.index()] = true;
            self.active.push(n);
        }
    }

    fn notify(&mut self, n: NodeId) {
        let mut i = 0;
        while i < self.monitors[n.index()].len() {
            let m = self.monitors[n.index()][i];
            self.schedule_active(m);
            i += 1;
        }
    }

    fn drain_active(&mut self, iface: &mut dyn Interface) {
        while let Some(n) = self.active.pop() {
            self.on_active[n.index()] = false;
            self.schedule_now(iface, n);
        }
    }

    fn emit_outputs(&self, iface: &mut dyn Interface) {
        for &(id, vid) in &self.writes {
            iface.write(vid, self.store.value(id));
        }
    }

    fn eval(&self, expr: NodeId) -> Bits {
        let ctx = EvalContext {
            module: &self.module,
            resolve: &self.resolve,
        };
        ctx.eval(&self.store, expr)
    }

    // ---- Statement dispatch ----

    /// Dispatches a node immediately, without queueing.
    fn schedule_now(&mut self, iface: &mut dyn Interface, n: NodeId) {
        match self.module.node(n) {
            Node::Decl { .. } => {}

            Node::InitialConstruct { stmt, attrs } => {
                let stmt = *stmt;
                let run = attrs.get("__ignore") != Some("true");
                if run {
                    self.schedule_active(stmt);
                }
            }

            &Node::AlwaysConstruct { stmt } => self.schedule_now(iface, stmt),

            &Node::ContinuousAssign { assign } => self.schedule_now(iface, assign),

            &Node::BlockingAssign { assign, .. } => {
                self.schedule_now(iface, assign);
                self.notify(n);
            }

            &Node::NonblockingAssign { assign, .. } => {
                if !self.silent {
                    let &Node::VariableAssign { lhs, rhs } = self.module.node(assign) else {
                        unreachable!("nonblocking assign wraps a variable assign");
                    };
                    let ctx = EvalContext {
                        module: &self.module,
                        resolve: &self.resolve,
                    };
                    let target = self.resolve.get_resolution(lhs);
                    let slot = ctx.dereference(&self.store, lhs);
                    let value = ctx.eval(&self.store, rhs);
                    self.updates.push(PendingUpdate {
                        target,
                        slot,
                        value,
                    });
                }
                self.notify(n);
            }

            &Node::VariableAssign { lhs, rhs } => {
                let ctx = EvalContext {
                    module: &self.module,
                    resolve: &self.resolve,
                };
                let value = ctx.eval(&self.store, rhs);
                let target = ctx.assign(&mut self.store, lhs, &value);
                self.notify(target);
            }

            Node::SeqBlock { stmts } => {
                let state = self.ctrl[n.index()] as usize;
                let item = stmts.get(state).copied();
                match item {
                    Some(item) => {
                        self.ctrl[n.index()] += 1;
                        self.schedule_now(iface, item);
                    }
                    None => {
                        self.ctrl[n.index()] = 0;
                        self.notify(n);
                    }
                }
            }

            Node::ParBlock { stmts } => {
                if self.ctrl[n.index()] == 0 {
                    let children = stmts.clone();
                    self.ctrl[n.index()] = children.len() as u32;
                    if children.is_empty() {
                        self.notify(n);
                    } else {
                        // Children go through the queue so every completion
                        // re-enters the join counter exactly once.
                        for c in children {
                            self.schedule_active(c);
                        }
                    }
                } else {
                    self.ctrl[n.index()] -= 1;
                    if self.ctrl[n.index()] == 0 {
                        self.notify(n);
                    }
                }
            }

            &Node::Conditional {
                cond,
                then_stmt,
                else_stmt,
            } => {
                if self.ctrl[n.index()] == 0 {
                    let branch = if self.eval(cond).to_bool() {
                        Some(then_stmt)
                    } else {
                        else_stmt
                    };
                    match branch {
                        Some(stmt) => {
                            self.ctrl[n.index()] = 1;
                            self.schedule_now(iface, stmt);
                        }
                        None => self.notify(n),
                    }
                } else {
                    self.ctrl[n.index()] = 0;
                    self.notify(n);
                }
            }

            Node::Case { cond, items } => {
                if self.ctrl[n.index()] == 0 {
                    self.ctrl[n.index()] = 1;
                    let selector = self.eval(*cond).to_u64();
                    let mut chosen = None;
                    'scan: for item in items {
                        for &e in &item.exprs {
                            if self.eval(e).to_u64() == selector {
                                chosen = Some(item.stmt);
                                break 'scan;
                            }
                        }
                        if item.exprs.is_empty() {
                            chosen = Some(item.stmt);
                            break 'scan;
                        }
                    }
                    let stmt = chosen.unwrap_or_else(|| {
                        panic!("case selector {selector} matched no arm and no default exists")
                    });
                    self.schedule_now(iface, stmt);
                } else {
                    self.ctrl[n.index()] = 0;
                    self.notify(n);
                }
            }

            &Node::For {
                init,
                cond,
                update,
                body,
            } => {
                if self.ctrl[n.index()] == 0 {
                    self.ctrl[n.index()] = 1;
                    self.schedule_now(iface, init);
                }
                if self.ctrl[n.index()] == 1 {
                    if self.eval(cond).to_bool() {
                        self.ctrl[n.index()] = 2;
                        self.schedule_now(iface, body);
                    } else {
                        self.ctrl[n.index()] = 0;
                        self.notify(n);
                    }
                } else {
                    // Body finished; run the update, then tail-chain the
                    // next iteration's condition check.
                    self.ctrl[n.index()] = 1;
                    self.schedule_now(iface, update);
                    self.schedule_now(iface, n);
                }
            }

            &Node::Repeat { count, body } => {
                if self.ctrl[n.index()] == 0 {
                    let c = u32::try_from(self.eval(count).to_u64()).unwrap_or(u32::MAX - 1);
                    self.ctrl[n.index()] = c + 1;
                }
                self.ctrl[n.index()] -= 1;
                if self.ctrl[n.index()] == 0 {
                    self.notify(n);
                } else {
                    self.schedule_now(iface, body);
                }
            }

            &Node::While { cond, body } => {
                if self.eval(cond).to_bool() {
                    self.schedule_now(iface, body);
                } else {
                    self.notify(n);
                }
            }

            &Node::Wait { cond, body } => {
                if self.ctrl[n.index()] == 0 {
                    // Dormant until a watched identifier wakes us.
                    if !self.eval(cond).to_bool() {
                        return;
                    }
                    self.ctrl[n.index()] = 1;
                    self.schedule_now(iface, body);
                } else {
                    self.ctrl[n.index()] = 0;
                    self.notify(n);
                }
            }

            &Node::TimingControl { stmt, .. } => match self.ctrl[n.index()] {
                0 => {
                    // Armed; waiting on the control.
                    self.ctrl[n.index()] = 1;
                }
                1 => {
                    self.ctrl[n.index()] = 2;
                    self.schedule_now(iface, stmt);
                }
                _ => {
                    self.ctrl[n.index()] = 0;
                    self.notify(n);
                }
            },

            Node::Display { args } => {
                if !self.silent {
                    let ctx = EvalContext {
                        module: &self.module,
                        resolve: &self.resolve,
                    };
                    let text = printf::format(&ctx, &self.store, args);
                    iface.display(&text);
                    self.there_were_tasks = true;
                }
                self.notify(n);
            }

            Node::Write { args } => {
                if !self.silent {
                    let ctx = EvalContext {
                        module: &self.module,
                        resolve: &self.resolve,
                    };
                    let text = printf::format(&ctx, &self.store, args);
                    iface.print(&text);
                    self.there_were_tasks = true;
                }
                self.notify(n);
            }

            &Node::Finish { arg } => {
                if !self.silent {
                    let code = arg.map(|a| self.eval(a).to_u64()).unwrap_or(0);
                    iface.finish(code);
                    self.there_were_tasks = true;
                }
                self.notify(n);
            }

            &Node::Event { edge, expr } => {
                let decl = self.resolve.get_resolution(expr);
                let high = self.store.value(decl).to_bool();
                if edge != EdgeKind::Negedge && high {
                    self.notify(n);
                } else if edge != EdgeKind::Posedge && !high {
                    self.notify(n);
                }
            }

            Node::EventControl { .. } => self.notify(n),

            Node::DelayControl { .. } => {
                unreachable!("delay controls are rejected at construction")
            }

            Node::Identifier { .. }
            | Node::Number { .. }
            | Node::StringLit { .. }
            | Node::Unary { .. }
            | Node::Binary { .. }
            | Node::Ternary { .. } => {
                unreachable!("expression nodes are never scheduled")
            }
        }
    }
}

/// Rejects modules outside the supported synthesizable subset.
fn validate(
    module: &ModuleDecl,
    resolve: &Resolutions,
    store: &ValueStore,
) -> Result<(), InterpError> {
    for (nid, node) in module.iter() {
        match node {
            Node::DelayControl { .. } => return Err(InterpError::DelayControl),
            Node::BlockingAssign { ctrl: Some(_), .. }
            | Node::NonblockingAssign { ctrl: Some(_), .. } => {
                return Err(InterpError::TimingControlledAssign)
            }
            Node::Event { expr, .. } => match module.node(*expr) {
                Node::Identifier { dims, .. } if dims.is_empty() => {}
                _ => return Err(InterpError::ComplexEventExpression),
            },
            Node::Identifier { name, dims } if !dims.is_empty() => {
                let depth = store.depth(resolve.get_resolution(nid));
                let allowed = if depth > 1 { 2 } else { 1 };
                if dims.len() > allowed {
                    return Err(InterpError::SubscriptDepth {
                        name: name.clone(),
                        dims: dims.len(),
                    });
                }
            }
            _ => {}
        }
    }
    Ok(())
}
