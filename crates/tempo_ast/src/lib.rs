//! The elaborated-module AST consumed by the Tempo software interpreter.
//!
//! A [`ModuleDecl`] owns a dense arena of [`Node`]s addressed by opaque
//! [`NodeId`]s. The tree's topology is immutable once built; all mutable
//! per-node simulation state lives in side tables owned by the interpreter,
//! keyed by raw node id. This keeps the AST value-like: it can be cloned,
//! serialized, and re-simulated from scratch.
//!
//! Construction happens through [`ModuleBuilder`] — parsing and lowering are
//! the front end's job, not this crate's.

#![warn(missing_docs)]

pub mod attr;
pub mod builder;
pub mod ids;
pub mod module;
pub mod node;

pub use attr::Attributes;
pub use builder::ModuleBuilder;
pub use ids::NodeId;
pub use module::ModuleDecl;
pub use node::{BinaryOp, CaseItem, DeclKind, EdgeKind, Node, UnaryOp};
