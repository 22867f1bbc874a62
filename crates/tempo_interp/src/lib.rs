//! Event-driven software interpreter core for the Tempo mixed-mode Verilog
//! runtime.
//!
//! The runtime can execute a module either on a synthesized backend or in
//! software; this crate is the software side. [`InterpKernel`] owns one
//! elaborated [`tempo_ast::ModuleDecl`] and advances it through the
//! two-phase Verilog simulation cycle: the caller delivers inputs with
//! [`read`](InterpKernel::read), drains the active region with
//! [`evaluate`](InterpKernel::evaluate), and flushes nonblocking assignments
//! with [`update`](InterpKernel::update) while
//! [`there_are_updates`](InterpKernel::there_are_updates) holds. System
//! tasks and output values surface through the host-supplied [`Interface`].
//!
//! Swapping a module in from another backend goes through
//! [`restore`](InterpKernel::restore) / [`set_input`](InterpKernel::set_input)
//! followed by [`resync`](InterpKernel::resync), which re-primes continuous
//! and always logic silently before initial blocks run.
//!
//! # Modules
//!
//! - `kernel` — scheduling state, statement dispatch, and the public cycle
//! - `evaluator` — expression evaluation and value storage
//! - `resolve` — identifier resolution over the module scope
//! - `monitor` — notify fan-out installation
//! - `module_info` — module topology queries
//! - `printf` — `$display`/`$write` formatting
//! - `interface` — the host callback trait
//! - `snapshot` — VId-keyed state and input bundles
//! - `error` — construction-time error types

#![warn(missing_docs)]

pub mod error;
pub mod evaluator;
pub mod interface;
pub mod kernel;
pub mod module_info;
pub mod monitor;
pub mod printf;
pub mod resolve;
pub mod snapshot;

pub use error::InterpError;
pub use evaluator::{EvalContext, Slot, ValueStore};
pub use interface::{ConsoleInterface, Interface, RecordingInterface};
pub use kernel::{InterpKernel, PendingUpdate};
pub use module_info::ModuleInfo;
pub use monitor::Monitor;
pub use resolve::Resolutions;
pub use snapshot::{Input, State, VId};
